//! # Configuration module
//!
//! Module dedicated to the CSS inlining configuration.

/// The CSS inlining configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case", default)
)]
pub struct InlinerConfig {
    /// Synthesize a `text/plain` alternative for messages that do not
    /// already carry one.
    ///
    /// The plain text rendering is derived from the inlined HTML
    /// document. Messages with an existing text part are never
    /// touched by this option.
    pub generate_text_part: bool,
}

impl Default for InlinerConfig {
    fn default() -> Self {
        Self {
            generate_text_part: true,
        }
    }
}

impl InlinerConfig {
    /// Create a new configuration with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generate_text_part(mut self, b: bool) -> Self {
        self.generate_text_part = b;
        self
    }
}
