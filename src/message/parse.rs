//! # Message parsing module
//!
//! Module dedicated to raw MIME → message model ingestion, based on
//! [`mail_parser`].

use mail_parser::{MessageParser, MessagePart, MimeHeaders, PartType};

use crate::{Error, Result};

use super::{header, Message, Part, SKIP_INLINE_HEADER};

/// Headers owned by the content tree: the builder re-emits them from
/// the rebuilt body, so they are not retained verbatim.
const STRUCTURAL_HEADERS: [&str; 3] = ["Content-Type", "Content-Transfer-Encoding", "MIME-Version"];

impl Message {
    /// Parse the given raw MIME bytes into a message.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let msg = MessageParser::new()
            .parse(bytes.as_ref())
            .ok_or(Error::ParseMessageError)?;

        let mut skip_inline = false;
        let mut headers = Vec::new();

        for h in msg.headers() {
            let key = h.name.as_str();
            if key.eq_ignore_ascii_case(SKIP_INLINE_HEADER) {
                skip_inline = true;
                continue;
            }
            if STRUCTURAL_HEADERS
                .iter()
                .any(|s| key.eq_ignore_ascii_case(s))
            {
                continue;
            }
            let val = header::render_value(key, &h.value);
            if !val.is_empty() {
                headers.push((key.to_owned(), val));
            }
        }

        let root = msg.root_part();
        let (content_type, body, parts) = match &root.body {
            PartType::Multipart(ids) => {
                let parts = ids
                    .iter()
                    .filter_map(|id| msg.part(*id))
                    .map(|part| convert_part(&msg, part))
                    .collect();
                (container_content_type(root), None, parts)
            }
            PartType::Text(text) => (
                leaf_content_type(root, super::TEXT_PLAIN),
                Some(text.to_string()),
                Vec::new(),
            ),
            PartType::Html(html) => (
                leaf_content_type(root, super::TEXT_HTML),
                Some(html.to_string()),
                Vec::new(),
            ),
            _ => (
                leaf_content_type(root, "application/octet-stream"),
                Some(String::from_utf8_lossy(root.contents()).into_owned()),
                Vec::new(),
            ),
        };

        Ok(Self {
            headers,
            skip_inline,
            content_type,
            body,
            parts,
        })
    }
}

fn convert_part(msg: &mail_parser::Message, part: &MessagePart) -> Part {
    match &part.body {
        PartType::Text(text) => {
            let converted = Part::text(leaf_content_type(part, super::TEXT_PLAIN), text);
            match attachment_filename(part) {
                Some(name) => converted.with_filename(name),
                None => converted,
            }
        }
        PartType::Html(html) => {
            let converted = Part::text(leaf_content_type(part, super::TEXT_HTML), html);
            match attachment_filename(part) {
                Some(name) => converted.with_filename(name),
                None => converted,
            }
        }
        PartType::Binary(data) => {
            let converted =
                Part::binary(leaf_content_type(part, "application/octet-stream"), data.to_vec());
            match part.attachment_name() {
                Some(name) => converted.with_filename(name),
                None => converted,
            }
        }
        PartType::InlineBinary(data) => {
            let converted =
                Part::binary(leaf_content_type(part, "application/octet-stream"), data.to_vec())
                    .with_inline();
            match part.attachment_name() {
                Some(name) => converted.with_filename(name),
                None => converted,
            }
        }
        PartType::Message(inner) => {
            let converted = Part::binary("message/rfc822", inner.raw_message.to_vec());
            match part.attachment_name() {
                Some(name) => converted.with_filename(name),
                None => converted,
            }
        }
        PartType::Multipart(ids) => Part::multipart(
            container_content_type(part),
            ids.iter()
                .filter_map(|id| msg.part(*id))
                .map(|sub| convert_part(msg, sub))
                .collect(),
        ),
    }
}

/// Content type of a leaf, with its charset parameter preserved.
fn leaf_content_type(part: &MessagePart, default: &str) -> String {
    match part.content_type() {
        Some(ctype) => {
            let mtype = match ctype.subtype() {
                Some(stype) => format!("{}/{stype}", ctype.ctype()),
                None => ctype.ctype().to_string(),
            };
            match ctype.attribute("charset") {
                Some(charset) => format!("{mtype}; charset={charset}"),
                None => mtype,
            }
        }
        None => default.to_string(),
    }
}

/// Content type of a container, boundary dropped: the builder
/// generates a fresh one for the rebuilt tree.
fn container_content_type(part: &MessagePart) -> String {
    match part.content_type() {
        Some(ctype) => match ctype.subtype() {
            Some(stype) => format!("{}/{stype}", ctype.ctype()),
            None => ctype.ctype().to_string(),
        },
        None => "multipart/mixed".to_string(),
    }
}

/// File name of a text leaf explicitly flagged as an attachment.
fn attachment_filename(part: &MessagePart) -> Option<String> {
    part.content_disposition()
        .filter(|disposition| disposition.ctype().eq_ignore_ascii_case("attachment"))
        .and_then(|_| part.attachment_name())
        .map(ToOwned::to_owned)
}
