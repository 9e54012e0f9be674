//! # Part splicing module
//!
//! Module dedicated to rewriting the message content tree in place:
//! replacing a located document with its inlined rendering, or
//! removing a part that a generated alternative container absorbed.

use tracing::debug;

use super::{Located, Message, Part, PartBody, PartId, PartKind};

impl Message {
    /// Replace the located document with the given replacement part.
    ///
    /// Sibling order is preserved. A replacement whose old part
    /// cannot be found anywhere in the tree is silently dropped.
    pub(crate) fn splice(&mut self, kind: PartKind, old: Located, new: Part) {
        match old {
            Located::Whole => self.splice_pure(kind, new),
            Located::Child(id) => {
                if replace_in_list(&mut self.parts, id, new).is_some() {
                    debug!("cannot find part {id:?}, skipping replacement");
                }
            }
        }
    }

    /// Rewrite a pure single-part message.
    ///
    /// A leaf replacement of the matching kind keeps the message
    /// pure. A container replacement promotes the message to a
    /// multipart one, the container children becoming its top-level
    /// parts.
    fn splice_pure(&mut self, kind: PartKind, new: Part) {
        if new.content_type.contains(kind.mime_type()) {
            self.body = match new.body {
                PartBody::Text(text) => Some(text),
                _ => None,
            };
            self.content_type = new.content_type;
        } else {
            self.body = None;
            self.content_type = new.content_type.clone();
            match new.body {
                PartBody::Multipart(children) => self.parts.extend(children),
                _ => self.parts.push(new),
            }
        }
    }

    /// Remove the part carrying the given id from the content tree.
    pub(crate) fn remove_part(&mut self, id: PartId) -> bool {
        remove_in_list(&mut self.parts, id)
    }
}

/// Replace the part carrying the given id, returning the replacement
/// back when no part matched.
///
/// The scan compares ids at the current level first, then recurses
/// into container children, stopping at the first success.
fn replace_in_list(parts: &mut [Part], id: PartId, new: Part) -> Option<Part> {
    if let Some(index) = parts.iter().position(|part| part.id == id) {
        parts[index] = new;
        return None;
    }

    let mut new = new;
    for part in parts.iter_mut() {
        if let PartBody::Multipart(children) = &mut part.body {
            match replace_in_list(children, id, new) {
                None => return None,
                Some(returned) => new = returned,
            }
        }
    }

    Some(new)
}

fn remove_in_list(parts: &mut Vec<Part>, id: PartId) -> bool {
    if let Some(index) = parts.iter().position(|part| part.id == id) {
        parts.remove(index);
        return true;
    }

    for part in parts.iter_mut() {
        if let PartBody::Multipart(children) = &mut part.body {
            if remove_in_list(children, id) {
                return true;
            }
        }
    }

    false
}
