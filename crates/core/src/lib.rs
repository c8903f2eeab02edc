//! DocQA core library.
//!
//! Foundations shared by every DocQA crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Settings loading and validation

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{Settings, SimilarityMetric, StoreBackend};
pub use error::{AppError, AppResult};
