//! discovery
//!
//! Scan → extract → filter. Produces the function records the
//! generator works on.

pub mod ast;
pub mod record;
pub mod scanner;
pub mod untested;

use std::path::PathBuf;

pub use ast::PythonExtractor;
pub use record::{is_test_name, ArgSpec, FunctionRecord};
pub use scanner::Scanner;
pub use untested::untested_functions;

use crate::error::DiscoveryError;

pub const PYTHON_EXTENSION: &str = "py";

/// Discovery over one project directory.
///
/// Files are visited at most once for the lifetime of the value, so a
/// repeated `discover` only picks up files not seen before.
pub struct FunctionDiscovery {
    scanner: Scanner,
    extractor: PythonExtractor,
    discovered: Vec<FunctionRecord>,
}

impl FunctionDiscovery {
    pub fn new(project_dir: impl Into<PathBuf>) -> Result<Self, DiscoveryError> {
        Ok(Self {
            scanner: Scanner::new(project_dir, PYTHON_EXTENSION),
            extractor: PythonExtractor::new()?,
            discovered: Vec::new(),
        })
    }

    pub fn with_excludes(mut self, patterns: &[String]) -> Result<Self, DiscoveryError> {
        self.scanner = self.scanner.with_excludes(patterns)?;
        Ok(self)
    }

    pub fn include_nested(mut self, yes: bool) -> Self {
        self.extractor = self.extractor.include_nested(yes);
        self
    }

    /// Scan up to `max_files` new files and extract their functions.
    ///
    /// Unreadable or syntactically invalid files are logged and skipped.
    pub fn discover(&mut self, max_files: Option<usize>) -> Result<&[FunctionRecord], DiscoveryError> {
        self.discovered.clear();

        for path in self.scanner.find_files(max_files)? {
            match self.extractor.extract_file(&path) {
                Ok(records) => {
                    tracing::debug!(path = %path.display(), functions = records.len(), "extracted");
                    self.discovered.extend(records);
                }
                Err(e) => {
                    tracing::warn!("skipping {}: {e}", path.display());
                }
            }
        }

        Ok(&self.discovered)
    }

    pub fn functions(&self) -> &[FunctionRecord] {
        &self.discovered
    }

    pub fn untested(&self) -> Vec<FunctionRecord> {
        untested_functions(&self.discovered)
    }
}
