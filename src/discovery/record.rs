// src/discovery/record.rs

use std::path::PathBuf;

/// Prefix pytest uses to collect test functions.
pub const TEST_PREFIX: &str = "test_";

/// One parameter of a discovered function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: String,
    /// Annotation source text, e.g. `int` or `list[str]`.
    pub annotation: Option<String>,
}

impl ArgSpec {
    pub fn new(name: impl Into<String>, annotation: Option<&str>) -> Self {
        Self {
            name: name.into(),
            annotation: annotation.map(str::to_owned),
        }
    }
}

/// Metadata extracted for one function definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    pub file: PathBuf,
    pub name: String,
    pub args: Vec<ArgSpec>,
    pub docstring: Option<String>,
    /// 1-based line of the `def` keyword.
    pub line: usize,
    pub is_test: bool,
}

impl FunctionRecord {
    /// File stem of the source module, `module` when it has none.
    pub fn module_name(&self) -> &str {
        self.file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("module")
    }

    /// Name a pytest function covering this one is expected to have.
    pub fn expected_test_name(&self) -> String {
        format!("{TEST_PREFIX}{}", self.name)
    }

    pub fn location(&self) -> String {
        format!("{}:{}", self.file.display(), self.line)
    }
}

/// Loose test-function heuristic.
///
/// True when the name starts with `test_` or contains `test` in any case.
/// The substring rule also matches names like `retest` or `attestation`;
/// that imprecision is kept as-is.
pub fn is_test_name(name: &str) -> bool {
    name.starts_with(TEST_PREFIX) || name.to_lowercase().contains("test")
}
