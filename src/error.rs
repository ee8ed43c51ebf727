//! error.rs
//!
//! Error types, one enum per failure domain.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single text-completion request.
///
/// Every variant is reported the same way by the generator; there is no
/// transient/permanent split.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0} response parse failure")]
    Decode(&'static str),

    /// Raised by backends other than the bundled HTTP client.
    #[error("{0}")]
    Other(String),
}

/// Why a single file yielded no records. Logged and skipped by discovery.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error in {path} at line {line}, column {column}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
    },

    #[error("parser returned no tree for {0}")]
    NoTree(PathBuf),
}

/// Fatal scan errors. Per-file problems are logged, not raised.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to load the Python grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid exclude pattern `{pattern}`: {source}")]
    ExcludePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key is required. Please provide --api-key or set OPENAI_API_KEY environment variable.")]
    MissingApiKey,

    #[error("invalid base URL `{url}`: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to read config file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write console output: {0}")]
    Console(#[source] std::io::Error),
}

/// Top-level error for the `generate` command.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Write(#[from] WriteError),
}
