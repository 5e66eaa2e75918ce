use criterion::{black_box, criterion_group, criterion_main, Criterion};
use markweave_parser::{parse, serialize};

fn parse_simple_document(c: &mut Criterion) {
    let source = r#"<div class="card"><span>hello</span></div>"#;

    c.bench_function("parse_simple_document", |b| {
        b.iter(|| parse(black_box(source)))
    });
}

fn parse_attribute_heavy_document(c: &mut Criterion) {
    let source = r#"
        <form action="/submit" method="post" class="form" id="main">
            <input name="email" type="email" placeholder="email" required>
            <input name="name" type="text" placeholder="name">
            <button type="submit" class="btn primary">Send</button>
        </form>
    "#;

    c.bench_function("parse_attribute_heavy_document", |b| {
        b.iter(|| parse(black_box(source)))
    });
}

fn parse_large_document(c: &mut Criterion) {
    // Simulate a larger document with many sibling subtrees
    let mut source = String::from("<main>");
    for i in 0..200 {
        source.push_str(&format!(
            r#"<section id="s{i}"><h2>Title {i}</h2><p class="body">Paragraph {i}</p></section>"#
        ));
    }
    source.push_str("</main>");

    c.bench_function("parse_large_document", |b| {
        b.iter(|| parse(black_box(&source)))
    });
}

fn serialize_large_document(c: &mut Criterion) {
    let mut source = String::from("<main>");
    for i in 0..200 {
        source.push_str(&format!("<section><p>Paragraph {i}</p></section>"));
    }
    source.push_str("</main>");
    let root = parse(&source).unwrap();

    c.bench_function("serialize_large_document", |b| {
        b.iter(|| serialize(black_box(&root)))
    });
}

criterion_group!(
    benches,
    parse_simple_document,
    parse_attribute_heavy_document,
    parse_large_document,
    serialize_large_document
);
criterion_main!(benches);
