pub mod backend;
pub mod client;
pub mod prompt;

pub use backend::TextCompletion;
pub use client::LlmClient;
pub use prompt::{build_prompt, LlmPrompt};
