use std::cell::Cell;

use concat_with::concat_line;
use premail::{CssInliner, Message, MessageInliner, Part, PartKind, Result, SKIP_INLINE_HEADER};

/// Prefixes inlined documents with a marker, so tests can tell
/// replaced bodies from originals.
struct MarkingInliner;

impl CssInliner for MarkingInliner {
    fn inline_css(&self, html: &str) -> Result<String> {
        Ok(format!("<!--inlined-->{html}"))
    }

    fn plain_text(&self, _html: &str) -> Result<String> {
        Ok("plain rendering".into())
    }
}

/// Fails the test when invoked at all.
struct UnreachableInliner;

impl CssInliner for UnreachableInliner {
    fn inline_css(&self, _html: &str) -> Result<String> {
        panic!("inliner must not be invoked")
    }

    fn plain_text(&self, _html: &str) -> Result<String> {
        panic!("inliner must not be invoked")
    }
}

#[test_log::test]
fn skip_flag_bypasses_inlining_and_is_cleared() {
    let mut msg = Message::pure("text/html", "<p>hi</p>").with_skip_inline(true);

    MessageInliner::new(UnreachableInliner)
        .process(&mut msg)
        .unwrap();

    assert!(!msg.skip_inline());
    assert_eq!(msg.body(), Some("<p>hi</p>"));
    assert_eq!(msg.content_type(), "text/html");
}

#[test_log::test]
fn pure_html_message_without_text_generation() {
    let mut msg = Message::pure("text/html", "<p>hi</p>");

    MessageInliner::new(MarkingInliner)
        .with_generate_text_part(false)
        .process(&mut msg)
        .unwrap();

    assert_eq!(msg.body(), Some("<!--inlined--><p>hi</p>"));
    assert!(msg.content_type().contains("text/html"));
    assert!(msg.parts().is_empty());
}

#[test_log::test]
fn pure_html_message_with_text_generation() {
    let mut msg = Message::pure("text/html", "<p>hi</p>");

    MessageInliner::new(MarkingInliner).process(&mut msg).unwrap();

    assert!(msg.body().is_none());
    assert_eq!(msg.content_type(), "multipart/alternative");
    assert_eq!(msg.parts().len(), 2);
    assert_eq!(msg.parts()[0].content_type(), "text/plain; charset=utf-8");
    assert_eq!(msg.parts()[0].text_body(), Some("plain rendering"));
    assert_eq!(msg.parts()[1].content_type(), "text/html; charset=utf-8");
    assert_eq!(msg.parts()[1].text_body(), Some("<!--inlined--><p>hi</p>"));
}

#[test_log::test]
fn existing_text_part_stays_untouched_in_place() {
    let mut msg = Message::multipart(
        "multipart/alternative",
        vec![
            Part::text("text/plain", "already there"),
            Part::text("text/html", "<p>hi</p>"),
        ],
    );

    MessageInliner::new(MarkingInliner).process(&mut msg).unwrap();

    assert_eq!(msg.parts().len(), 2);
    assert_eq!(msg.parts()[0].text_body(), Some("already there"));
    assert_eq!(msg.parts()[1].text_body(), Some("<!--inlined--><p>hi</p>"));
}

#[test_log::test]
fn amp_part_is_rewritten_for_amp_validity() {
    let amp = Part::text(
        "text/x-amp-html",
        "<style>p { color: red !important; }</style><p>hi</p>",
    );
    let mut msg = Message::multipart("multipart/mixed", vec![amp]);

    MessageInliner::new(MarkingInliner)
        .with_generate_text_part(false)
        .process(&mut msg)
        .unwrap();

    let body = msg.parts()[0].text_body().unwrap();
    assert!(!body.contains("!important"));
    assert!(body.contains("<style amp-custom>"));
}

#[test_log::test]
fn already_inlined_body_is_replaced_verbatim() {
    struct QuoteNormalizingInliner;

    impl CssInliner for QuoteNormalizingInliner {
        fn inline_css(&self, html: &str) -> Result<String> {
            Ok(html.replace('\'', "\""))
        }
    }

    let mut msg = Message::pure("text/html", "<p style='color:red'>hi</p>");

    MessageInliner::new(QuoteNormalizingInliner)
        .with_generate_text_part(false)
        .process(&mut msg)
        .unwrap();

    assert_eq!(msg.body(), Some("<p style=\"color:red\">hi</p>"));
    assert!(msg.content_type().contains("text/html"));
    assert!(msg.parts().is_empty());
}

#[test_log::test]
fn duplicated_content_types_replace_the_located_part_only() {
    let mut msg = Message::multipart(
        "multipart/mixed",
        vec![
            Part::text("text/html", "<p>first</p>"),
            Part::text("text/html", "<p>second</p>"),
        ],
    );

    MessageInliner::new(MarkingInliner)
        .with_generate_text_part(false)
        .process(&mut msg)
        .unwrap();

    assert_eq!(msg.parts()[0].text_body(), Some("<!--inlined--><p>first</p>"));
    assert_eq!(msg.parts()[1].text_body(), Some("<p>second</p>"));
}

#[test_log::test]
fn html_and_amp_end_up_in_a_single_alternative_container() {
    let mut msg = Message::multipart(
        "multipart/mixed",
        vec![
            Part::text("text/html", "<p>html</p>"),
            Part::text("text/x-amp-html", "<p>amp</p>"),
        ],
    );

    MessageInliner::new(MarkingInliner).process(&mut msg).unwrap();

    assert_eq!(msg.parts().len(), 1);
    assert!(msg.amp_part().is_none());

    let children = msg.parts()[0].subparts().unwrap();
    assert_eq!(children.len(), 3);
    assert_eq!(children[0].content_type(), "text/plain; charset=utf-8");
    assert_eq!(children[1].text_body(), Some("<!--inlined--><p>html</p>"));
    assert_eq!(children[2].content_type(), "text/x-amp-html; charset=utf-8");
}

#[test_log::test]
fn html_and_amp_without_text_generation_are_replaced_independently() {
    let mut msg = Message::multipart(
        "multipart/mixed",
        vec![
            Part::text("text/html", "<p>html</p>"),
            Part::text("text/x-amp-html", "<p>amp</p>"),
        ],
    );

    MessageInliner::new(MarkingInliner)
        .with_generate_text_part(false)
        .process(&mut msg)
        .unwrap();

    assert_eq!(msg.parts().len(), 2);
    assert_eq!(msg.parts()[0].text_body(), Some("<!--inlined--><p>html</p>"));
    assert_eq!(msg.parts()[1].text_body(), Some("<!--inlined--><p>amp</p>"));
}

#[test_log::test]
fn plain_text_rendering_happens_at_most_once_per_run() {
    #[derive(Default)]
    struct CountingInliner {
        plain_text_calls: Cell<usize>,
    }

    impl CssInliner for CountingInliner {
        fn inline_css(&self, html: &str) -> Result<String> {
            Ok(html.to_owned())
        }

        fn plain_text(&self, _html: &str) -> Result<String> {
            self.plain_text_calls.set(self.plain_text_calls.get() + 1);
            Ok("plain".into())
        }
    }

    let inliner = CountingInliner::default();
    let mut msg = Message::multipart(
        "multipart/mixed",
        vec![
            Part::text("text/html", "<p>html</p>"),
            Part::text("text/x-amp-html", "<p>amp</p>"),
        ],
    );

    MessageInliner::new(&inliner).process(&mut msg).unwrap();

    assert_eq!(inliner.plain_text_calls.get(), 1);
}

#[test_log::test]
fn messages_without_any_document_are_left_alone() {
    let mut msg = Message::pure("text/plain", "hi");

    MessageInliner::new(UnreachableInliner)
        .process(&mut msg)
        .unwrap();

    assert_eq!(msg.body(), Some("hi"));
    assert_eq!(msg.content_type(), "text/plain");
}

#[test_log::test]
fn raw_message_round_trip_replaces_html_and_keeps_attachments() {
    let raw = concat_line!(
        "From: from@localhost",
        "To: to@localhost",
        "Subject: newsletter",
        "Content-Type: multipart/mixed; boundary=\"b\"",
        "",
        "--b",
        "Content-Type: text/html; charset=utf-8",
        "",
        "<p>hi</p>",
        "--b",
        "Content-Type: application/pdf; name=\"doc.pdf\"",
        "Content-Disposition: attachment; filename=\"doc.pdf\"",
        "",
        "%PDF-fake",
        "--b--",
    );

    let mut msg = Message::from_bytes(raw).unwrap();
    MessageInliner::new(MarkingInliner)
        .process_for_delivery(&mut msg)
        .unwrap();
    let rebuilt = Message::from_bytes(msg.write_to_vec().unwrap()).unwrap();

    assert_eq!(rebuilt.header("Subject"), Some("newsletter"));

    let html = rebuilt.html_part().unwrap();
    assert_eq!(html.text_body(), Some("<!--inlined--><p>hi</p>"));
    assert_eq!(rebuilt.text_part().unwrap().text_body(), Some("plain rendering"));

    let attachment = rebuilt
        .parts()
        .iter()
        .find(|part| part.filename() == Some("doc.pdf"))
        .unwrap();
    match attachment.body() {
        premail::PartBody::Binary(data) => assert!(data.starts_with(b"%PDF-fake")),
        other => panic!("unexpected attachment body: {other:?}"),
    }
}

#[test_log::test]
fn skip_header_never_reaches_the_wire() {
    let raw = concat_line!(
        "From: from@localhost",
        "To: to@localhost",
        "Subject: subject",
        "X-Skip-Premailer: true",
        "Content-Type: text/html",
        "",
        "<p>hi</p>",
    );

    let mut msg = Message::from_bytes(raw).unwrap();
    assert!(msg.skip_inline());

    MessageInliner::new(UnreachableInliner)
        .process_for_preview(&mut msg)
        .unwrap();
    let rebuilt = msg.write_to_string().unwrap();

    assert!(!rebuilt.contains(SKIP_INLINE_HEADER));
    assert!(rebuilt.contains("<p>hi</p>"));
}
