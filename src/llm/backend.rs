use crate::error::ProviderError;
use crate::llm::prompt::LlmPrompt;

/// Text-completion capability: a prompt goes in, free-form text comes out.
///
/// Everything provider-specific (endpoints, headers, response shapes)
/// stays behind this trait.
pub trait TextCompletion {
    fn complete(&self, prompt: &LlmPrompt) -> Result<String, ProviderError>;
}

impl<T: TextCompletion + ?Sized> TextCompletion for &T {
    fn complete(&self, prompt: &LlmPrompt) -> Result<String, ProviderError> {
        (**self).complete(prompt)
    }
}

impl<T: TextCompletion + ?Sized> TextCompletion for Box<T> {
    fn complete(&self, prompt: &LlmPrompt) -> Result<String, ProviderError> {
        (**self).complete(prompt)
    }
}
