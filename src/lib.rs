//! hret-agent - Hugging Face dataset Korean translation pipeline
//!
//! Downloads a dataset, translates its column names and cell values into
//! Korean through an LLM completion backend with whole-batch retry
//! semantics, generates dataset-module scaffolding from the result, and
//! optionally publishes the translated dataset.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod codegen;
pub mod core;
pub mod hub;
pub mod processors;

// Re-export key types for convenience
pub use crate::core::{
    backend::{CompletionBackend, HttpBackend},
    client::BatchTranslator,
    config::TranslatorConfig,
    errors::TranslationError,
    models::{BatchOutcome, BatchStatus, ChatMessage, CompletionOptions, DataTable},
};

pub use crate::hub::{datasets::HubClient, github::GithubClient};
pub use crate::processors::dataset::DatasetProcessor;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
