//! # Message building module
//!
//! Module dedicated to message model → raw MIME serialization, based
//! on [`mail_builder`].

use mail_builder::{
    headers::{content_type::ContentType, raw::Raw},
    mime::MimePart,
    MessageBuilder,
};

use crate::{Error, Result};

use super::{Message, Part, PartBody, SKIP_INLINE_HEADER};

impl Message {
    /// Turn the message into a [`MessageBuilder`], retained headers
    /// and content tree included.
    pub fn to_msg_builder(&self) -> MessageBuilder<'_> {
        let mut builder = MessageBuilder::new();

        for (key, val) in &self.headers {
            builder = builder.header(key.as_str(), Raw::new(val.as_str()));
        }
        if self.skip_inline {
            builder = builder.header(SKIP_INLINE_HEADER, Raw::new("true"));
        }

        builder.body(self.root_mime_part())
    }

    /// Write the message to raw MIME bytes.
    pub fn write_to_vec(&self) -> Result<Vec<u8>> {
        self.to_msg_builder()
            .write_to_vec()
            .map_err(Error::WriteMessageError)
    }

    /// Write the message to a raw MIME string.
    pub fn write_to_string(&self) -> Result<String> {
        self.to_msg_builder()
            .write_to_string()
            .map_err(Error::WriteMessageError)
    }

    fn root_mime_part(&self) -> MimePart<'_> {
        if self.parts.is_empty() {
            MimePart::new(
                builder_content_type(&self.content_type),
                self.body.as_deref().unwrap_or_default(),
            )
        } else {
            MimePart::new(
                builder_content_type(&self.content_type),
                self.parts.iter().map(to_mime_part).collect::<Vec<_>>(),
            )
        }
    }
}

fn to_mime_part(part: &Part) -> MimePart<'_> {
    let ctype = builder_content_type(&part.content_type);

    let mut mime = match &part.body {
        PartBody::Text(text) => MimePart::new(ctype, text.as_str()),
        PartBody::Binary(data) => MimePart::new(ctype, data.as_slice()),
        PartBody::Multipart(children) => MimePart::new(
            ctype,
            children.iter().map(to_mime_part).collect::<Vec<_>>(),
        ),
    };

    if let Some(filename) = &part.filename {
        mime = mime.attachment(filename.as_str());
    }
    if part.inline {
        mime = mime.inline();
    }

    mime
}

/// Split a `type/subtype; key=val` string into a builder content
/// type, so the builder does not re-append parameters it already has.
fn builder_content_type(raw: &str) -> ContentType<'_> {
    let mut chunks = raw.split(';');
    let mut ctype = ContentType::new(chunks.next().unwrap_or(raw).trim());

    for chunk in chunks {
        if let Some((key, val)) = chunk.split_once('=') {
            ctype = ctype.attribute(key.trim(), val.trim().trim_matches('"'));
        }
    }

    ctype
}
