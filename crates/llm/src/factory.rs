//! Generation provider factory.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use docqa_core::config::GenerationSettings;
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a generation client from settings.
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown.
pub fn create_client(settings: &GenerationSettings) -> AppResult<Arc<dyn LlmClient>> {
    match settings.provider.to_lowercase().as_str() {
        "ollama" => {
            tracing::debug!(endpoint = %settings.endpoint, "Creating Ollama generation client");
            Ok(Arc::new(OllamaClient::with_base_url(&settings.endpoint)))
        }
        other => Err(AppError::Config(format!(
            "Unknown generation provider: {}",
            other
        ))),
    }
}
