use crate::error::ParseError;
use crate::tokenizer::{parse, parse_with, ParseOptions};

#[test]
fn parses_nested_elements() {
    let root = parse("<div><span>hi</span></div>").unwrap();
    let root = root.borrow();
    assert_eq!(root.tag, "div");
    assert_eq!(root.children.len(), 1);

    let span = root.children[0].borrow();
    assert_eq!(span.tag, "span");
    assert_eq!(span.text, "hi");
    assert!(span.children.is_empty());
}

#[test]
fn parses_quoted_attributes() {
    let root = parse(r#"<a href="/home" target="_blank">home</a>"#).unwrap();
    let root = root.borrow();
    assert_eq!(root.tag, "a");
    assert_eq!(root.attribute("href"), Some("/home"));
    assert_eq!(root.attribute("target"), Some("_blank"));
    assert_eq!(root.text, "home");
}

#[test]
fn parses_unquoted_attribute_as_empty_value() {
    let root = parse("<input disabled>").unwrap();
    assert_eq!(root.borrow().attribute("disabled"), Some(""));
}

#[test]
fn normalizes_spacing_around_attribute_assignment() {
    let root = parse("<div   class = \"card\"  >x</div>").unwrap();
    let root = root.borrow();
    assert_eq!(root.attribute("class"), Some("card"));
    assert_eq!(root.text, "x");
}

#[test]
fn parses_self_closing_tag() {
    let root = parse("<div><br/><span>y</span></div>").unwrap();
    let root = root.borrow();
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[0].borrow().tag, "br");
    assert!(root.children[0].borrow().children.is_empty());
    assert_eq!(root.children[1].borrow().tag, "span");
}

#[test]
fn parses_self_closing_tag_with_attributes() {
    let root = parse(r#"<p><img src="x.png"/></p>"#).unwrap();
    let img = root.borrow().children[0].clone();
    assert_eq!(img.borrow().tag, "img");
    assert_eq!(img.borrow().attribute("src"), Some("x.png"));
}

#[test]
fn text_interleaved_with_children_accumulates_on_parent() {
    let root = parse("<div>a<span>b</span>c</div>").unwrap();
    assert_eq!(root.borrow().text, "ac");
    assert_eq!(root.borrow().children[0].borrow().text, "b");
}

#[test]
fn pretty_printed_input_parses_without_stray_text() {
    let source = "<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>";
    let root = parse(source).unwrap();
    let root = root.borrow();
    assert_eq!(root.tag, "ul");
    assert_eq!(root.text, "");
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[1].borrow().text, "two");
}

#[test]
fn mismatched_closing_tag_names_both_tags() {
    let err = parse("<div><span></div>").unwrap_err();
    assert_eq!(
        err,
        ParseError::TagMismatch {
            expected: "span".into(),
            found: "div".into(),
        }
    );
    let message = err.to_string();
    assert!(message.contains("span"));
    assert!(message.contains("div"));
}

#[test]
fn whitespace_inside_closing_tag_is_an_error() {
    let err = parse("<div>x</di v>").unwrap_err();
    assert!(matches!(err, ParseError::WhitespaceInClosingTag { .. }));
}

#[test]
fn closing_tag_with_nothing_open_is_an_error() {
    let err = parse("<a></a></b>").unwrap_err();
    assert_eq!(err, ParseError::StrayClosingTag { tag: "b".into() });
}

#[test]
fn input_without_any_element_is_an_error() {
    assert_eq!(parse("plain words").unwrap_err(), ParseError::EmptyDocument);
    assert_eq!(parse("").unwrap_err(), ParseError::EmptyDocument);
}

#[test]
fn unterminated_input_parses_leniently_by_default() {
    let root = parse("<div><span>hi").unwrap();
    let root = root.borrow();
    assert_eq!(root.tag, "div");
    assert_eq!(root.children[0].borrow().text, "hi");
}

#[test]
fn strict_mode_rejects_unterminated_input() {
    let err = parse_with("<div><span>hi", ParseOptions { strict: true }).unwrap_err();
    assert_eq!(
        err,
        ParseError::UnclosedTags {
            tags: vec!["div".into(), "span".into()],
        }
    );
}

#[test]
fn strict_mode_accepts_balanced_input() {
    let root = parse_with("<div>ok</div>", ParseOptions { strict: true }).unwrap();
    assert_eq!(root.borrow().text, "ok");
}

#[test]
fn root_is_first_tag_opened() {
    // A second top-level element is outside the tree the parser returns.
    let root = parse("<a>x</a><b>y</b>").unwrap();
    assert_eq!(root.borrow().tag, "a");
    assert!(root.borrow().children.is_empty());
}

#[test]
fn deeply_nested_structure() {
    let root = parse("<a><b><c><d>deep</d></c></b></a>").unwrap();
    let b = root.borrow().children[0].clone();
    let c = b.borrow().children[0].clone();
    let d = c.borrow().children[0].clone();
    assert_eq!(d.borrow().text, "deep");
}
