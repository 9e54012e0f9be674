//! # Part generation module
//!
//! Module dedicated to producing replacement parts: inlined HTML and
//! AMP leaves, synthesized plain text leaves and the alternative
//! container bundling them.

use tracing::debug;

use crate::{css::CssInliner, Result};

use super::{Message, Part, PartKind, MULTIPART_ALTERNATIVE, TEXT_AMP, TEXT_HTML, TEXT_PLAIN};

/// Charset meta tag that inliners tend to prepend, invalid in AMP
/// documents.
const AMP_CHARSET_META: &str =
    "<meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\">";

/// Replacement part generator.
///
/// One generator lives for the duration of a single processing run:
/// the synthesized text part is memoized here so the HTML and AMP
/// passes share one rendering instead of producing divergent copies.
pub(crate) struct PartGenerator<'a, I: CssInliner> {
    inliner: &'a I,
    generate_text_part: bool,
    text_part: Option<Part>,
}

impl<'a, I: CssInliner> PartGenerator<'a, I> {
    pub(crate) fn new(inliner: &'a I, generate_text_part: bool) -> Self {
        Self {
            inliner,
            generate_text_part,
            text_part: None,
        }
    }

    /// Whether a plain text alternative must be synthesized.
    ///
    /// Re-evaluated before every replacement: the AMP pass must
    /// observe the text part the HTML pass just spliced in.
    pub(crate) fn needs_text(&self, msg: &Message) -> bool {
        self.generate_text_part && msg.text_part().is_none()
    }

    /// Produce the replacement for the given document kind: an
    /// alternative container when a text part must be synthesized,
    /// the inlined leaf alone otherwise.
    pub(crate) fn replacement(&mut self, msg: &Message, kind: PartKind) -> Result<Part> {
        if self.needs_text(msg) {
            self.alternative_part(msg, kind)
        } else {
            self.leaf(msg, kind)
        }
    }

    /// Alternative container bundling every rendering the message
    /// has, in fixed order: text, then HTML, then AMP.
    fn alternative_part(&mut self, msg: &Message, kind: PartKind) -> Result<Part> {
        let mut parts = vec![self.text_leaf(msg, kind)?];

        if msg.locate(PartKind::Html).is_some() {
            parts.push(self.html_leaf(msg)?);
        }
        if msg.locate(PartKind::Amp).is_some() {
            parts.push(self.amp_leaf(msg)?);
        }

        Ok(Part::multipart(MULTIPART_ALTERNATIVE, parts))
    }

    fn leaf(&mut self, msg: &Message, kind: PartKind) -> Result<Part> {
        match kind {
            PartKind::Html => self.html_leaf(msg),
            PartKind::Amp => self.amp_leaf(msg),
        }
    }

    fn html_leaf(&self, msg: &Message) -> Result<Part> {
        let inlined = self.inliner.inline_css(&self.source(msg, PartKind::Html))?;

        // decoded bodies are UTF-8 strings, so generated parts always
        // advertise utf-8
        Ok(Part::text(format!("{TEXT_HTML}; charset=utf-8"), inlined))
    }

    fn amp_leaf(&self, msg: &Message) -> Result<Part> {
        let inlined = self
            .inliner
            .inline_css(&self.source(msg, PartKind::Amp))?
            .replace(AMP_CHARSET_META, "")
            // AMP disallows `!important` in styles
            .replace("!important", "")
            // AMP requires custom styles to carry the amp-custom marker
            .replace("<style>", "<style amp-custom>");

        Ok(Part::text(format!("{TEXT_AMP}; charset=utf-8"), inlined))
    }

    /// Synthesize the plain text leaf, at most once per run.
    fn text_leaf(&mut self, msg: &Message, kind: PartKind) -> Result<Part> {
        if let Some(part) = &self.text_part {
            return Ok(part.clone());
        }

        // the AMP document is the fallback source for messages
        // without any HTML part
        let source = match msg.locate(PartKind::Html) {
            Some(_) => self.source(msg, PartKind::Html),
            None => self.source(msg, kind),
        };
        let text = self.inliner.plain_text(&source)?;
        let part = Part::text(format!("{TEXT_PLAIN}; charset=utf-8"), text);
        self.text_part = Some(part.clone());

        Ok(part)
    }

    /// Decoded content of the located document of the given kind.
    fn source(&self, msg: &Message, kind: PartKind) -> String {
        match msg.locate(kind).and_then(|located| msg.located_text(located)) {
            Some(text) => text.to_owned(),
            None => {
                debug!("cannot read {} document, using empty body", kind.mime_type());
                String::new()
            }
        }
    }
}
