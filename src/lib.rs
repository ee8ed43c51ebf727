//! PyTest-Gen: finds Python functions without a matching pytest test and
//! asks an LLM to draft one.

pub mod commands;
pub mod config;
pub mod discovery;
pub mod error;
pub mod llm;
pub mod logger;
pub mod testgen;

pub use discovery::{ArgSpec, FunctionDiscovery, FunctionRecord};
pub use error::{ConfigError, DiscoveryError, ExtractError, GenerateError, ProviderError, WriteError};
pub use llm::{LlmPrompt, TextCompletion};
pub use testgen::GenerationResult;
