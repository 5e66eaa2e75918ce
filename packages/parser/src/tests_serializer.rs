use crate::ast::Node;
use crate::serializer::{serialize, QuoteStyle, SerializeOptions, Serializer};
use crate::tokenizer::parse;

#[test]
fn renders_tag_text_and_children() {
    let root = parse("<div><span>hi</span></div>").unwrap();
    assert_eq!(serialize(&root), "<div><span>hi</span></div>");
}

#[test]
fn renders_attributes_in_sorted_order() {
    let mut node = Node::new("a");
    node.set_attribute("target", "_blank");
    node.set_attribute("href", "/home");
    node.text.push_str("home");

    assert_eq!(
        serialize(&node.into_ref()),
        r#"<a href="/home" target="_blank">home</a>"#
    );
}

#[test]
fn single_quote_option() {
    let mut node = Node::new("a");
    node.set_attribute("href", "/home");

    let serializer = Serializer::with_options(SerializeOptions {
        quote: QuoteStyle::Single,
        ..Default::default()
    });
    assert_eq!(serializer.serialize(&node.into_ref()), "<a href='/home'></a>");
}

#[test]
fn self_close_empty_option() {
    let root = parse("<div><br/></div>").unwrap();

    assert_eq!(serialize(&root), "<div><br></br></div>");

    let serializer = Serializer::with_options(SerializeOptions {
        self_close_empty: true,
        ..Default::default()
    });
    assert_eq!(serializer.serialize(&root), "<div><br/></div>");
}

#[test]
fn options_do_not_change_tree_semantics() {
    let root = parse(r#"<p class="note">text</p>"#).unwrap();
    let single = Serializer::with_options(SerializeOptions {
        quote: QuoteStyle::Single,
        ..Default::default()
    })
    .serialize(&root);

    // Reparsing is impossible for single quotes (the tokenizer expects
    // double quotes), but the tree itself is untouched by rendering.
    assert_eq!(single, "<p class='note'>text</p>");
    assert_eq!(root.borrow().attribute("class"), Some("note"));
}

#[test]
fn parse_serialize_parse_is_stable() {
    let sources = [
        "<div><span>hi</span></div>",
        r#"<a href="/home">home</a>"#,
        "<ul><li>one</li><li>two</li></ul>",
        "<div>a<span>b</span>c</div>",
        r#"<section id="s"><p>x</p><p>y</p></section>"#,
    ];

    for source in sources {
        let first = parse(source).unwrap();
        let rendered = serialize(&first);
        let second = parse(&rendered).unwrap();
        assert_eq!(first, second, "round trip diverged for {source}");
    }
}

#[test]
fn serialize_is_deterministic() {
    let root = parse(r#"<div b="2" a="1" c="3">x</div>"#).unwrap();
    let once = serialize(&root);
    let twice = serialize(&root);
    assert_eq!(once, twice);
    assert_eq!(once, r#"<div a="1" b="2" c="3">x</div>"#);
}
