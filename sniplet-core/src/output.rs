//! Accumulated generated text and its rendering

use regex::Regex;
use std::sync::OnceLock;

/// Shown instead of any partial output once a request failed
pub const ERROR_PLACEHOLDER: &str = "\n// Error fetching code. Please try again.";

const BOXED_OPEN: &str = "\\boxed{";

fn code_block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"```([a-z]*)\n([\s\S]*?)```").expect("code block pattern is a valid regex")
    })
}

/// Append-only text of one generation, reset for each new prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBuffer {
    text: String,
    failed: bool,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta in arrival order
    pub fn push(&mut self, delta: &str) {
        if !self.failed {
            self.text.push_str(delta);
        }
    }

    /// Start over for a new prompt
    pub fn reset(&mut self) {
        self.text.clear();
        self.failed = false;
    }

    /// Replace whatever was received with the error placeholder
    pub fn fail(&mut self) {
        self.text.clear();
        self.text.push_str(ERROR_PLACEHOLDER);
        self.failed = true;
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Raw accumulated text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Text for display, without a wrapping `\boxed{...}`
    pub fn formatted(&self) -> &str {
        strip_boxed(&self.text)
    }

    /// Code blocks of the formatted text, for copying
    pub fn code(&self) -> String {
        extract_code(self.formatted())
    }
}

/// Remove a `\boxed{` prefix and its closing brace when both are present
pub fn strip_boxed(text: &str) -> &str {
    text.strip_prefix(BOXED_OPEN)
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(text)
}

/// Bodies of all fenced code blocks joined by blank lines
///
/// Falls back to the whole input when it holds no complete code block.
pub fn extract_code(markdown: &str) -> String {
    let mut all = String::new();
    for cap in code_block_pattern().captures_iter(markdown) {
        all.push_str(&cap[2]);
        all.push_str("\n\n");
    }

    let trimmed = all.trim();
    if trimmed.is_empty() {
        markdown.to_string()
    } else {
        trimmed.to_string()
    }
}
