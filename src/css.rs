//! # CSS inlining interface
//!
//! Module dedicated to the CSS inlining collaborator. The library
//! never inlines CSS itself: it only decides which document to hand
//! to the inliner and how to splice the result back into the message.

use nanohtml2text::html2text;

use crate::Result;

/// Interface of the CSS inlining engine.
///
/// Implementors receive a decoded HTML document and return the same
/// document with its CSS rules expressed as per-element `style`
/// attributes. Failures should be wrapped into
/// [`Error::InlineCssError`](crate::Error::InlineCssError).
pub trait CssInliner {
    /// Inline CSS rules of the given HTML document into `style`
    /// attributes.
    fn inline_css(&self, html: &str) -> Result<String>;

    /// Render the plain text version of the given HTML document.
    ///
    /// Used to synthesize missing `text/plain` alternatives. The
    /// default implementation strips markup with [`html2text`].
    fn plain_text(&self, html: &str) -> Result<String> {
        Ok(html2text(html))
    }
}

impl<T: CssInliner + ?Sized> CssInliner for &T {
    fn inline_css(&self, html: &str) -> Result<String> {
        (**self).inline_css(html)
    }

    fn plain_text(&self, html: &str) -> Result<String> {
        (**self).plain_text(html)
    }
}
