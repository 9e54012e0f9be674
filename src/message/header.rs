//! # Message header internal module
//!
//! Helpers rendering [`mail_parser`] header values back to wire
//! strings, so headers survive the parse → process → rebuild
//! round-trip verbatim.

use std::borrow::Cow;

use mail_parser::{Addr, Address, ContentType, Group, HeaderValue};

/// Render a parsed header value to its wire string.
///
/// Identifier headers get their angle brackets back, address lists
/// their comma separators. Values that cannot be rendered (received
/// chains, empty values) come back empty and are dropped by the
/// caller.
pub(super) fn render_value(key: &str, val: &HeaderValue) -> String {
    match val {
        HeaderValue::Address(Address::List(addrs)) => render_addrs(addrs),
        HeaderValue::Address(Address::Group(groups)) => render_groups(groups),
        HeaderValue::Text(id) if is_id_header(key) => format!("<{id}>"),
        HeaderValue::Text(text) => text.to_string(),
        HeaderValue::TextList(texts) => render_texts(texts),
        HeaderValue::DateTime(datetime) => datetime.to_rfc822(),
        HeaderValue::ContentType(ctype) => render_content_type(ctype),
        HeaderValue::Received(_) => String::new(),
        HeaderValue::Empty => String::new(),
    }
}

fn is_id_header(key: &str) -> bool {
    [
        "Message-ID",
        "References",
        "In-Reply-To",
        "Return-Path",
        "Content-ID",
        "Resent-Message-ID",
    ]
    .iter()
    .any(|id| key.eq_ignore_ascii_case(id))
}

fn render_addr(addr: &Addr) -> String {
    let email = match &addr.address {
        Some(addr) => addr.to_string(),
        None => "unknown".into(),
    };

    match &addr.name {
        Some(name) => format!("{name} <{email}>"),
        None => email,
    }
}

fn render_addrs(addrs: &[Addr]) -> String {
    addrs.iter().fold(String::new(), |mut addrs, addr| {
        if !addrs.is_empty() {
            addrs.push_str(", ");
        }
        addrs.push_str(&render_addr(addr));
        addrs
    })
}

fn render_group(group: &Group) -> String {
    let name = match &group.name {
        Some(name) => name.to_string(),
        None => "unknown".into(),
    };

    let addrs = render_addrs(&group.addresses);
    format!("{name}:{addrs};")
}

fn render_groups(groups: &[Group]) -> String {
    groups.iter().fold(String::new(), |mut groups, group| {
        if !groups.is_empty() {
            groups.push(' ');
        }
        groups.push_str(&render_group(group));
        groups
    })
}

fn render_texts(texts: &[Cow<str>]) -> String {
    texts.iter().fold(String::new(), |mut texts, text| {
        if !texts.is_empty() {
            texts.push(' ');
        }
        texts.push_str(text);
        texts
    })
}

fn render_content_type(ctype: &ContentType) -> String {
    let attrs = ctype.attributes().unwrap_or_default().iter().fold(
        String::new(),
        |mut attrs, (key, val)| {
            attrs.push_str(&format!("; {key}={val}"));
            attrs
        },
    );
    let stype = ctype.subtype().unwrap_or("unknown");
    let ctype = ctype.ctype();

    format!("{ctype}/{stype}{attrs}")
}

#[cfg(test)]
mod tests {
    use mail_parser::{Addr, HeaderValue};

    #[test]
    fn render_addrs() {
        let addrs = [
            Addr {
                name: None,
                address: Some("test@localhost".into()),
            },
            Addr {
                name: Some("Test".into()),
                address: Some("test@localhost".into()),
            },
        ];

        assert_eq!(
            super::render_addrs(&addrs),
            "test@localhost, Test <test@localhost>"
        );
    }

    #[test]
    fn render_id_headers_with_brackets() {
        let val = HeaderValue::Text("id@localhost".into());

        assert_eq!(super::render_value("Message-ID", &val), "<id@localhost>");
        assert_eq!(super::render_value("Subject", &val), "id@localhost");
    }
}
