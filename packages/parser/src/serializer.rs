use crate::ast::NodeRef;

/// Attribute quoting style for rendered output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuoteStyle {
    #[default]
    Double,
    Single,
}

impl QuoteStyle {
    fn char(self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Single => '\'',
        }
    }
}

/// Rendering configuration. Options only affect the textual output, never
/// the meaning of the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    pub quote: QuoteStyle,
    /// Render nodes with no text and no children as `<tag/>`.
    pub self_close_empty: bool,
}

/// Serializer converts a node tree back to markup text.
///
/// Attributes are written in sorted-name order so that serializing the same
/// tree always yields the same text. Whitespace inside text content is kept
/// as the tokenizer normalized it.
pub struct Serializer {
    options: SerializeOptions,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            options: SerializeOptions::default(),
        }
    }

    pub fn with_options(options: SerializeOptions) -> Self {
        Self { options }
    }

    pub fn serialize(&self, root: &NodeRef) -> String {
        let mut output = String::new();
        self.write_node(root, &mut output);
        output
    }

    fn write_node(&self, node: &NodeRef, output: &mut String) {
        let node = node.borrow();
        let quote = self.options.quote.char();

        output.push('<');
        output.push_str(&node.tag);

        let mut attributes: Vec<_> = node.attributes.iter().collect();
        attributes.sort_by_key(|(name, _)| name.as_str());
        for (name, value) in attributes {
            output.push(' ');
            output.push_str(name);
            output.push('=');
            output.push(quote);
            output.push_str(value);
            output.push(quote);
        }

        if self.options.self_close_empty && node.text.is_empty() && node.children.is_empty() {
            output.push_str("/>");
            return;
        }

        output.push('>');
        output.push_str(&node.text);
        for child in &node.children {
            self.write_node(child, output);
        }
        output.push_str("</");
        output.push_str(&node.tag);
        output.push('>');
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize with default options.
pub fn serialize(root: &NodeRef) -> String {
    Serializer::new().serialize(root)
}
