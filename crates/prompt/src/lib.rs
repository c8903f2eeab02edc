//! Answer prompt management for DocQA.
//!
//! - Built-in grounded-answer template
//! - YAML prompt overrides
//! - Handlebars rendering of the `context` and `question` slots

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{PromptTemplate, DEFAULT_ANSWER_TEMPLATE};
pub use loader::{load_prompt, load_template};
pub use types::{PromptDefinition, PromptSlots};
