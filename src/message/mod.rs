//! # Message module
//!
//! Module dedicated to the message content tree: the model itself,
//! the accessors that locate HTML, AMP and plain text documents
//! inside it, and the submodules that parse, rebuild, generate and
//! splice parts.

pub mod build;
pub(crate) mod generate;
pub(crate) mod header;
pub mod inliner;
pub mod parse;
pub(crate) mod splice;

use std::sync::atomic::{AtomicU64, Ordering};

/// Name of the header that disables CSS inlining for one message.
///
/// The header never reaches a recipient: processing clears it, even
/// when inlining is skipped because of it.
pub const SKIP_INLINE_HEADER: &str = "X-Skip-Premailer";

pub(crate) const TEXT_PLAIN: &str = "text/plain";
pub(crate) const TEXT_HTML: &str = "text/html";
pub(crate) const TEXT_AMP: &str = "text/x-amp-html";
pub(crate) const MULTIPART_ALTERNATIVE: &str = "multipart/alternative";

static NEXT_PART_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque identity handle of a [`Part`].
///
/// Replacement is identity-based: a message may hold several parts
/// sharing a content type, so lookups compare ids, never types.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PartId(u64);

impl PartId {
    fn next() -> Self {
        Self(NEXT_PART_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The document kind a replacement targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PartKind {
    Html,
    Amp,
}

impl PartKind {
    /// MIME type of the kind, matched by substring containment
    /// against content type strings.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Html => TEXT_HTML,
            Self::Amp => TEXT_AMP,
        }
    }
}

/// Handle to a located HTML or AMP document within a message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Located {
    /// The message itself is the document (no sub-parts).
    Whole,
    /// The document is the part carrying the given id.
    Child(PartId),
}

/// Content of a [`Part`].
#[derive(Clone, Debug)]
pub enum PartBody {
    /// Decoded textual content of a leaf part.
    Text(String),
    /// Raw content of a binary leaf, kept byte-identical across
    /// rebuilds.
    Binary(Vec<u8>),
    /// Ordered children of a container part.
    Multipart(Vec<Part>),
}

/// A node of the message content tree.
#[derive(Clone, Debug)]
pub struct Part {
    pub(crate) id: PartId,
    pub(crate) content_type: String,
    pub(crate) body: PartBody,
    pub(crate) filename: Option<String>,
    pub(crate) inline: bool,
}

impl Part {
    fn new(content_type: impl ToString, body: PartBody) -> Self {
        Self {
            id: PartId::next(),
            content_type: content_type.to_string(),
            body,
            filename: None,
            inline: false,
        }
    }

    /// Create a new leaf part with decoded textual content.
    pub fn text(content_type: impl ToString, body: impl ToString) -> Self {
        Self::new(content_type, PartBody::Text(body.to_string()))
    }

    /// Create a new leaf part with raw binary content.
    pub fn binary(content_type: impl ToString, data: impl Into<Vec<u8>>) -> Self {
        Self::new(content_type, PartBody::Binary(data.into()))
    }

    /// Create a new container part from the given children.
    pub fn multipart(content_type: impl ToString, parts: Vec<Part>) -> Self {
        Self::new(content_type, PartBody::Multipart(parts))
    }

    /// Mark the part as an attachment with the given file name.
    pub fn with_filename(mut self, filename: impl ToString) -> Self {
        self.filename = Some(filename.to_string());
        self
    }

    /// Mark the part as an inline attachment.
    pub fn with_inline(mut self) -> Self {
        self.inline = true;
        self
    }

    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &PartBody {
        &self.body
    }

    /// Decoded textual content, if the part is a text leaf.
    pub fn text_body(&self) -> Option<&str> {
        match &self.body {
            PartBody::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Children of the part, if it is a container.
    pub fn subparts(&self) -> Option<&[Part]> {
        match &self.body {
            PartBody::Multipart(parts) => Some(parts),
            _ => None,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn is_inline(&self) -> bool {
        self.inline
    }
}

/// An email message whose content tree is about to be rewritten.
///
/// The message is either pure (its own content type and body directly
/// represent a single document) or multipart (its content is the
/// ordered sequence of [`Part`]s). Processing mutates the message in
/// place and never re-creates it.
#[derive(Clone, Debug)]
pub struct Message {
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) skip_inline: bool,
    pub(crate) content_type: String,
    pub(crate) body: Option<String>,
    pub(crate) parts: Vec<Part>,
}

impl Message {
    /// Create a pure single-part message.
    pub fn pure(content_type: impl ToString, body: impl ToString) -> Self {
        Self {
            headers: Vec::new(),
            skip_inline: false,
            content_type: content_type.to_string(),
            body: Some(body.to_string()),
            parts: Vec::new(),
        }
    }

    /// Create a multipart message from the given parts.
    pub fn multipart(content_type: impl ToString, parts: Vec<Part>) -> Self {
        Self {
            headers: Vec::new(),
            skip_inline: false,
            content_type: content_type.to_string(),
            body: None,
            parts,
        }
    }

    /// Add a header, builder-style.
    pub fn with_header(mut self, key: impl ToString, val: impl ToString) -> Self {
        self.headers.push((key.to_string(), val.to_string()));
        self
    }

    /// Set the skip flag, builder-style.
    pub fn with_skip_inline(mut self, b: bool) -> Self {
        self.skip_inline = b;
        self
    }

    pub fn set_skip_inline(&mut self, b: bool) {
        self.skip_inline = b;
    }

    /// Whether the skip flag is set, bypassing CSS inlining.
    pub fn skip_inline(&self) -> bool {
        self.skip_inline
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of the given header, compared case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Pure content of the message, meaningful only without sub-parts.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Whether the message itself is a document of the given kind,
    /// with no sub-parts to search.
    pub fn is_pure(&self, kind: PartKind) -> bool {
        self.content_type.contains(kind.mime_type())
    }

    /// Locate the document of the given kind.
    ///
    /// Absence is a valid outcome, not an error: a message may carry
    /// neither kind, one, or both.
    pub fn locate(&self, kind: PartKind) -> Option<Located> {
        if self.is_pure(kind) {
            return Some(Located::Whole);
        }

        match kind {
            PartKind::Html => self.html_part().map(|part| Located::Child(part.id)),
            PartKind::Amp => self.amp_part().map(|part| Located::Child(part.id)),
        }
    }

    /// First `text/html` leaf of the part tree, attachments excluded.
    pub fn html_part(&self) -> Option<&Part> {
        find_first(&self.parts, TEXT_HTML)
    }

    /// First `text/plain` leaf of the part tree, attachments excluded.
    pub fn text_part(&self) -> Option<&Part> {
        find_first(&self.parts, TEXT_PLAIN)
    }

    /// First AMP part among the immediate children.
    pub fn amp_part(&self) -> Option<&Part> {
        self.parts
            .iter()
            .find(|part| part.content_type.contains(TEXT_AMP))
    }

    /// Find a part anywhere in the tree by id.
    pub fn part(&self, id: PartId) -> Option<&Part> {
        find_by_id(&self.parts, id)
    }

    /// Decoded content of the located document.
    pub(crate) fn located_text(&self, located: Located) -> Option<&str> {
        match located {
            Located::Whole => self.body.as_deref(),
            Located::Child(id) => self.part(id).and_then(Part::text_body),
        }
    }
}

fn find_first<'a>(parts: &'a [Part], mime_type: &str) -> Option<&'a Part> {
    for part in parts {
        match &part.body {
            PartBody::Multipart(children) => {
                if let Some(found) = find_first(children, mime_type) {
                    return Some(found);
                }
            }
            // attachments never count as a body alternative
            _ if part.filename.is_none() && part.content_type.contains(mime_type) => {
                return Some(part)
            }
            _ => (),
        }
    }

    None
}

fn find_by_id(parts: &[Part], id: PartId) -> Option<&Part> {
    for part in parts {
        if part.id == id {
            return Some(part);
        }
        if let PartBody::Multipart(children) = &part.body {
            if let Some(found) = find_by_id(children, id) {
                return Some(found);
            }
        }
    }

    None
}
