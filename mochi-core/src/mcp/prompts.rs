//! Prompt templates served through `prompts/list` and `prompts/get`

use super::protocol::{McpPrompt, PromptArgument};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prompt template with `{{variable}}` placeholders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Template name
    pub name: String,
    /// Template content with {{variable}} placeholders
    pub template: String,
    /// Description of the template
    pub description: Option<String>,
    /// Declared arguments
    pub arguments: Vec<PromptArgument>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            description: None,
            arguments: Vec::new(),
        }
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare an argument
    pub fn with_argument(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.arguments.push(PromptArgument {
            name: name.into(),
            description: Some(description.into()),
            required,
        });
        self
    }

    /// Required arguments absent from `variables`
    pub fn missing_arguments(&self, variables: &HashMap<String, String>) -> Vec<&str> {
        self.arguments
            .iter()
            .filter(|arg| arg.required && !variables.contains_key(&arg.name))
            .map(|arg| arg.name.as_str())
            .collect()
    }

    /// Render the template with variable substitution.
    ///
    /// Only declared arguments are substituted, so other double-brace text
    /// in the template survives.
    pub fn render(&self, variables: &HashMap<String, String>) -> String {
        let mut result = self.template.clone();
        for arg in &self.arguments {
            if let Some(value) = variables.get(&arg.name) {
                let placeholder = format!("{{{{{}}}}}", arg.name);
                result = result.replace(&placeholder, value);
            }
        }
        result
    }

    /// Definition for `prompts/list`
    pub fn to_mcp(&self) -> McpPrompt {
        McpPrompt {
            name: self.name.clone(),
            description: self.description.clone(),
            arguments: self.arguments.clone(),
        }
    }
}

const WRITE_FLASHCARD: &str = "\
Draft one or more Mochi flashcards from the material below.

Follow these rules:
- Atomic: each card tests exactly one fact or idea. Split lists and compound facts into separate cards.
- Front and back: put the question first, then a line containing only ---, then the answer.
- Cloze: for definitions and fill-in facts, hide the key term in double braces instead, for example \"The capital of France is {{Paris}}.\" A cloze card has no --- separator.
- Concise: keep questions short and unambiguous, and answers to the minimum that is still correct.
- Self-contained: a card must make sense without the others or the source text.

When the cards are ready, use list-decks to choose a deck and create-card to save each one.

Material:
{{input}}";

/// The `write-flashcard` prompt
pub fn write_flashcard() -> PromptTemplate {
    PromptTemplate::new("write-flashcard", WRITE_FLASHCARD)
        .with_description("Draft well-formed flashcards from notes or a topic")
        .with_argument("input", "Notes, text, or a topic to turn into flashcards", true)
}

/// Every prompt the server ships with
pub fn mochi_prompts() -> Vec<PromptTemplate> {
    vec![write_flashcard()]
}
