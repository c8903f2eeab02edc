//! Answer prompt rendering.

use crate::types::{PromptDefinition, PromptSlots};
use docqa_core::{AppError, AppResult};
use handlebars::Handlebars;

const TEMPLATE_NAME: &str = "answer";

/// Built-in grounded-answer prompt.
pub const DEFAULT_ANSWER_TEMPLATE: &str = r#"You are a precise and knowledgeable assistant.
Use ONLY the provided context to answer, and if you don't know, say "I don't know."
Do not use prior knowledge and do not make up facts that are not in the context.
Keep answers concise and factual.

Context:
{{context}}

Question:
{{question}}

Answer:
"#;

/// A compiled answer template with `context` and `question` slots.
pub struct PromptTemplate {
    id: String,
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for PromptTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptTemplate").field("id", &self.id).finish()
    }
}

impl PromptTemplate {
    /// Compile a template, rejecting it unless both slots are rendered.
    pub fn new(id: impl Into<String>, template: &str) -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Prompts are plain text, not HTML
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        let compiled = Self {
            id: id.into(),
            registry,
        };
        compiled.check_slots()?;

        Ok(compiled)
    }

    /// The built-in template that restricts answers to the supplied context.
    pub fn default_answer() -> AppResult<Self> {
        Self::new("answer.default", DEFAULT_ANSWER_TEMPLATE)
    }

    pub fn from_definition(definition: &PromptDefinition) -> AppResult<Self> {
        Self::new(definition.id.clone(), &definition.template)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Render the prompt. `question` is inserted verbatim.
    pub fn render(&self, context: &str, question: &str) -> AppResult<String> {
        let slots = PromptSlots { context, question };
        self.registry
            .render(TEMPLATE_NAME, &slots)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
    }

    fn check_slots(&self) -> AppResult<()> {
        const CONTEXT_MARK: &str = "\u{1}context\u{1}";
        const QUESTION_MARK: &str = "\u{1}question\u{1}";

        let probe = self.render(CONTEXT_MARK, QUESTION_MARK)?;
        for (slot, mark) in [("context", CONTEXT_MARK), ("question", QUESTION_MARK)] {
            if !probe.contains(mark) {
                return Err(AppError::Prompt(format!(
                    "Template '{}' does not use the '{{{{{}}}}}' slot",
                    self.id, slot
                )));
            }
        }
        Ok(())
    }
}
