//! # Message inlining module
//!
//! Module dedicated to the processing entry point invoked by a
//! delivery or preview pipeline right before the message leaves it.

use tracing::debug;

use crate::{config::InlinerConfig, css::CssInliner, Result};

use super::{generate::PartGenerator, Located, Message, PartKind};

/// The message CSS inlining orchestrator.
///
/// Rewrites outgoing messages in place: the HTML (and optional AMP)
/// document is replaced by its inlined rendering, and a plain text
/// alternative is synthesized when enabled and missing. The CSS
/// engine itself comes from the given [`CssInliner`] implementation.
pub struct MessageInliner<I: CssInliner> {
    config: InlinerConfig,
    inliner: I,
}

impl<I: CssInliner> MessageInliner<I> {
    /// Create a new message inliner with default options.
    pub fn new(inliner: I) -> Self {
        Self {
            config: Default::default(),
            inliner,
        }
    }

    /// Customize the configuration.
    pub fn with_config(mut self, config: InlinerConfig) -> Self {
        self.config = config;
        self
    }

    /// Customize the plain text synthesis option.
    pub fn with_generate_text_part(mut self, b: bool) -> Self {
        self.config.generate_text_part = b;
        self
    }

    /// Process the given message right before delivery.
    pub fn process_for_delivery<'a>(&self, msg: &'a mut Message) -> Result<&'a mut Message> {
        self.process(msg)
    }

    /// Process the given message right before preview.
    pub fn process_for_preview<'a>(&self, msg: &'a mut Message) -> Result<&'a mut Message> {
        self.process(msg)
    }

    /// Inline CSS of the given message, in place.
    ///
    /// The same message is returned for chaining. A message carrying
    /// the skip flag is passed through untouched, except that the
    /// flag itself is cleared so it never reaches a recipient.
    /// Messages without any HTML or AMP document are left as they
    /// are.
    pub fn process<'a>(&self, msg: &'a mut Message) -> Result<&'a mut Message> {
        if msg.skip_inline() {
            debug!("skip header present, clearing it and bypassing css inlining");
            msg.set_skip_inline(false);
            return Ok(msg);
        }

        let mut generator = PartGenerator::new(&self.inliner, self.config.generate_text_part);

        // HTML before AMP: the ordering decides which pass builds the
        // alternative container when a text part must be synthesized
        if let Some(html) = msg.locate(PartKind::Html) {
            let bundled_amp = if generator.needs_text(msg) {
                msg.locate(PartKind::Amp)
            } else {
                None
            };

            let replacement = generator.replacement(msg, PartKind::Html)?;
            msg.splice(PartKind::Html, html, replacement);

            // the container already carries the AMP rendering: drop
            // the stale original so the message keeps a single
            // AMP-bearing part
            if let Some(Located::Child(id)) = bundled_amp {
                msg.remove_part(id);
            }
        }

        if let Some(amp) = msg.locate(PartKind::Amp) {
            let replacement = generator.replacement(msg, PartKind::Amp)?;
            msg.splice(PartKind::Amp, amp, replacement);
        }

        Ok(msg)
    }
}
