use crate::discovery::FunctionRecord;

/// Outcome of asking the model for tests of one function.
///
/// Normally exactly one of `test_code` (non-empty) and `error` is set.
/// An empty completion leaves both empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub function: FunctionRecord,
    pub test_code: String,
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn success(function: FunctionRecord, test_code: String) -> Self {
        Self {
            function,
            test_code,
            error: None,
        }
    }

    pub fn failure(function: FunctionRecord, error: impl Into<String>) -> Self {
        Self {
            function,
            test_code: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn has_code(&self) -> bool {
        !self.test_code.trim().is_empty()
    }
}
