//! Dataset-module scaffold generation and persistence

pub mod prompts;

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::core::backend::CompletionBackend;
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ChatMessage, CompletionOptions, TranslationOutput};

pub use prompts::guide_prompt;

/// Generate dataset-module code from the guide prompt
///
/// One completion against the module model; unlike batch translation this
/// propagates failures to the caller.
pub async fn generate_module(
    backend: &dyn CompletionBackend,
    config: &TranslatorConfig,
    guide_prompt: &str,
) -> Result<String> {
    let options = CompletionOptions::default()
        .with_temperature(0.2)
        .with_max_tokens(2500);
    let payloads = vec![vec![ChatMessage::user(guide_prompt)]];

    let responses = backend
        .complete_batch(&config.module_model, &payloads, &options)
        .await
        .map_err(|e| {
            error!("Failed to generate module code: {}", e);
            e
        })?;

    let raw = responses
        .into_iter()
        .next()
        .ok_or_else(|| TranslationError::InvalidResponseError {
            message: "empty response from module model".to_string(),
        })?;

    let output = TranslationOutput::decode(raw);
    match output.text {
        Some(code) if !code.is_empty() => {
            info!("Module code generated successfully");
            Ok(code)
        }
        _ => Err(TranslationError::InvalidResponseError {
            message: "module response carries no content".to_string(),
        }),
    }
}

/// Save generated module code as `{safe_name}_translated.py`
pub async fn save_module(
    module_code: &str,
    dataset_name: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| TranslationError::FileError {
            path: output_dir.display().to_string(),
            message: e.to_string(),
        })?;

    let safe_name = dataset_name.replace('/', "_");
    let path = output_dir.join(format!("{}_translated.py", safe_name));

    tokio::fs::write(&path, module_code)
        .await
        .map_err(|e| TranslationError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    info!("Module code saved to {}", path.display());
    Ok(path)
}
