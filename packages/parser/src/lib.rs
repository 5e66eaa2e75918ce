pub mod ast;
pub mod error;
pub mod serializer;
pub mod tokenizer;

#[cfg(test)]
mod tests_serializer;
#[cfg(test)]
mod tests_tokenizer;

pub use ast::{Node, NodeRef};
pub use error::{ParseError, ParseResult};
pub use serializer::{serialize, QuoteStyle, SerializeOptions, Serializer};
pub use tokenizer::{parse, parse_with, ParseOptions, Tokenizer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let root = parse("<div><span>hi</span></div>").unwrap();
        assert_eq!(root.borrow().tag, "div");
        assert_eq!(root.borrow().children.len(), 1);
    }
}
