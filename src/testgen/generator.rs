//! testgen/generator.rs
//!
//! Sequential test generation: one completion request per function.

use crate::discovery::FunctionRecord;
use crate::llm::backend::TextCompletion;
use crate::llm::prompt::build_prompt;
use crate::testgen::result::GenerationResult;

pub struct TestGenerator<B> {
    backend: B,
}

impl<B: TextCompletion> TestGenerator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Never fails: provider errors are folded into the result.
    pub fn generate_test(&self, function: &FunctionRecord) -> GenerationResult {
        let prompt = build_prompt(function);

        match self.backend.complete(&prompt) {
            Ok(raw) => GenerationResult::success(function.clone(), strip_code_fences(&raw)),
            Err(e) => {
                tracing::error!("Error generating tests for {}: {e}", function.name);
                GenerationResult::failure(function.clone(), e.to_string())
            }
        }
    }

    /// Results come back in input order.
    pub fn generate_tests(&self, functions: &[FunctionRecord]) -> Vec<GenerationResult> {
        functions
            .iter()
            .enumerate()
            .map(|(i, f)| {
                tracing::info!(
                    "[{}/{}] generating tests for {} ({})",
                    i + 1,
                    functions.len(),
                    f.name,
                    f.location()
                );
                self.generate_test(f)
            })
            .collect()
    }
}

/// Drop a leading ```` ```lang ```` line and a trailing fence line when the
/// completion starts with a fence; otherwise just trim.
pub fn strip_code_fences(raw: &str) -> String {
    if !raw.starts_with("```") {
        return raw.trim().to_string();
    }

    let mut lines: Vec<&str> = raw.lines().collect();
    if lines.first().is_some_and(|l| l.starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.trim().starts_with("```")) {
        lines.pop();
    }

    lines.join("\n").trim().to_string()
}
