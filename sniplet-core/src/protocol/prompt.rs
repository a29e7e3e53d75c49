//! User prompts and the fixed instruction prompts that precede them

use super::types::ChatMessage;
use thiserror::Error;

/// Styling instructions, always the first system message
pub const STYLE_PROMPT: &str = "You are a UI/UX expert.
Generate beautiful, modern, responsive interfaces using current best practices
(e.g. React + Tailwind CSS, accessibility, clean layouts, animations).";

/// Output-structure instructions, always the second system message
pub const STRUCTURE_PROMPT: &str = "When you generate code, split it into multiple files.
First list all file paths (e.g. src/App.tsx, src/components/Navbar.tsx).
Then for each file, output the path followed by the full contents in a code block.
Use React functional components, hooks, and Tailwind classes.";

/// Rejected prompt input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("Missing prompt")]
    Missing,
}

/// A user prompt that is known to be non-empty after trimming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    /// Trim `raw` and reject it when nothing is left
    pub fn parse(raw: &str) -> Result<Self, PromptError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PromptError::Missing);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Prompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build the ordered message set sent upstream: both system prompts, then the user prompt
pub fn compose_messages(prompt: &Prompt) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(STYLE_PROMPT),
        ChatMessage::system(STRUCTURE_PROMPT),
        ChatMessage::user(prompt.as_str()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::MessageRole;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("" ; "empty")]
    #[test_case("   " ; "spaces")]
    #[test_case("\n\t \r\n" ; "mixed whitespace")]
    fn test_blank_prompts_rejected(raw: &str) {
        assert_eq!(Prompt::parse(raw), Err(PromptError::Missing));
    }

    #[test]
    fn test_prompt_is_trimmed() {
        let prompt = Prompt::parse("  build a navbar \n").unwrap();
        assert_eq!(prompt.as_str(), "build a navbar");
    }

    #[test]
    fn test_instruction_text_has_no_surrounding_whitespace() {
        assert_eq!(STYLE_PROMPT, STYLE_PROMPT.trim());
        assert_eq!(STRUCTURE_PROMPT, STRUCTURE_PROMPT.trim());
        assert!(STYLE_PROMPT.starts_with("You are a UI/UX expert."));
        assert!(STRUCTURE_PROMPT.ends_with("Tailwind classes."));
    }

    proptest! {
        #[test]
        fn composed_set_order_is_fixed(raw in "\\PC*") {
            prop_assume!(!raw.trim().is_empty());
            let prompt = Prompt::parse(&raw).unwrap();
            let messages = compose_messages(&prompt);

            prop_assert_eq!(messages.len(), 3);
            prop_assert_eq!(messages[0].role, MessageRole::System);
            prop_assert_eq!(messages[0].content.as_str(), STYLE_PROMPT);
            prop_assert_eq!(messages[1].role, MessageRole::System);
            prop_assert_eq!(messages[1].content.as_str(), STRUCTURE_PROMPT);
            prop_assert_eq!(messages[2].role, MessageRole::User);
            prop_assert_eq!(messages[2].content.as_str(), raw.trim());
        }
    }
}
