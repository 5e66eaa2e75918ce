use crate::ast::{Node, NodeRef};
use crate::error::{ParseError, ParseResult};
use regex::Regex;
use std::sync::LazyLock;

/// Tokenizer configuration.
///
/// By default an unterminated document (open tags left on the stack at end
/// of input) still parses, yielding the tree built so far. `strict` turns
/// that into [`ParseError::UnclosedTags`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub strict: bool,
}

/// Parse markup with default (lenient) options.
pub fn parse(input: &str) -> ParseResult<NodeRef> {
    parse_with(input, ParseOptions::default())
}

/// Parse markup, returning the root node (the first tag opened).
pub fn parse_with(input: &str, options: ParseOptions) -> ParseResult<NodeRef> {
    Tokenizer::new(input, options).parse()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    TagStart,
    AttributeStart,
    AttributeValue,
    AttributeEnd,
    TagEnd,
    OpenTag,
    CloseTagStart,
    CloseTagEnd,
}

static NEWLINE_INDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ ]+").expect("valid regex"));
static NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n").expect("valid regex"));
static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ ]+").expect("valid regex"));
static OPEN_DELIM_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s+").expect("valid regex"));
static CLOSE_DELIM_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+>").expect("valid regex"));
static SELF_CLOSE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+/>").expect("valid regex"));
static ASSIGN_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s*=\s*""#).expect("valid regex"));

/// Collapse the input to canonical spacing so every transition rule below
/// can assume one space between tokens and none adjacent to delimiters.
fn normalize(input: &str) -> String {
    let s = NEWLINE_INDENT.replace_all(input, "");
    let s = NEWLINE.replace_all(&s, "");
    let s = SPACE_RUN.replace_all(&s, " ");
    let s = OPEN_DELIM_SPACE.replace_all(&s, "<");
    let s = CLOSE_DELIM_SPACE.replace_all(&s, ">");
    let s = SELF_CLOSE_SPACE.replace_all(&s, "/>");
    ASSIGN_SPACE.replace_all(&s, "=\"").into_owned()
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_empty(c: char) -> bool {
    c.is_whitespace()
}

/// Single-pass character state machine building the node tree.
///
/// Open tags push onto `stack`; a matching close pops it. The first node
/// opened becomes the root. There is no terminal state: scanning ends when
/// input is exhausted, and unless `strict` is set the stack is allowed to
/// be non-empty at that point.
pub struct Tokenizer {
    chars: Vec<char>,
    index: usize,
    state: State,
    stack: Vec<NodeRef>,
    root: Option<NodeRef>,
    current: Option<NodeRef>,
    tag_name: String,
    attribute_name: String,
    attribute_value: String,
    options: ParseOptions,
}

impl Tokenizer {
    pub fn new(input: &str, options: ParseOptions) -> Self {
        Self {
            chars: normalize(input).chars().collect(),
            index: 0,
            state: State::Init,
            stack: Vec::new(),
            root: None,
            current: None,
            tag_name: String::new(),
            attribute_name: String::new(),
            attribute_value: String::new(),
            options,
        }
    }

    pub fn parse(mut self) -> ParseResult<NodeRef> {
        while self.index < self.chars.len() {
            let s = self.chars[self.index];
            let pre = self.index.checked_sub(1).map(|i| self.chars[i]);
            let next = self.chars.get(self.index + 1).copied();
            let next2 = self.chars.get(self.index + 2).copied();

            match self.state {
                State::Init => self.on_init(s),
                State::TagStart => self.on_tag_start(s, next),
                State::AttributeStart => self.on_attribute_start(s, next, next2),
                State::AttributeValue => self.on_attribute_value(s, next),
                State::AttributeEnd => self.on_attribute_end(s, next),
                State::TagEnd => self.on_tag_end(s, pre),
                State::OpenTag => self.on_open_tag(s, next),
                State::CloseTagStart => self.on_close_tag_start(s, next)?,
                State::CloseTagEnd => self.on_close_tag_end(s)?,
            }

            self.index += 1;
        }

        if self.options.strict && !self.stack.is_empty() {
            let open = self
                .stack
                .iter()
                .map(|node| node.borrow().tag.clone())
                .collect();
            return Err(ParseError::unclosed_tags(open));
        }

        self.root.take().ok_or(ParseError::EmptyDocument)
    }

    fn on_init(&mut self, s: char) {
        if s == '<' {
            self.state = State::TagStart;
        }
    }

    /// Attach the tag just scanned as a child of the current open node (or
    /// as the root when nothing is open yet) and push it onto the stack.
    fn open_node(&mut self) {
        let node = Node::new(self.tag_name.clone()).into_ref();
        if self.root.is_none() {
            self.root = Some(node.clone());
        } else if let Some(parent) = self.current.clone() {
            parent.borrow_mut().children.push(node.clone());
        }
        self.current = Some(node.clone());
        self.stack.push(node);
    }

    fn on_tag_start(&mut self, s: char, next: Option<char>) {
        if is_letter(s) {
            self.tag_name.push(s);
        } else if is_empty(s) && next.is_some_and(is_letter) {
            self.open_node();
            self.state = State::AttributeStart;
        }
        if next == Some('>') {
            self.open_node();
            self.state = State::TagEnd;
        }
    }

    fn commit_attribute(&mut self) {
        if let Some(current) = &self.current {
            current.borrow_mut().attributes.insert(
                std::mem::take(&mut self.attribute_name),
                std::mem::take(&mut self.attribute_value),
            );
        } else {
            self.attribute_name.clear();
            self.attribute_value.clear();
        }
    }

    fn on_attribute_start(&mut self, s: char, next: Option<char>, next2: Option<char>) {
        if s != '=' {
            self.attribute_name.push(s);
        }

        let at_self_close = next == Some('/') && next2 == Some('>');
        if next == Some(' ') || next == Some('>') || at_self_close {
            self.commit_attribute();
        }

        if next == Some(' ') {
            self.state = State::AttributeEnd;
        } else if next == Some('>') || at_self_close {
            self.state = State::TagEnd;
        } else if next == Some('"') {
            self.state = State::AttributeValue;
        }
    }

    fn on_attribute_value(&mut self, s: char, next: Option<char>) {
        if s != '"' {
            self.attribute_value.push(s);
        }
        if next == Some('"') {
            self.commit_attribute();
            self.state = State::AttributeEnd;
        }
    }

    fn on_attribute_end(&mut self, s: char, next: Option<char>) {
        if is_empty(s) {
            self.state = State::AttributeStart;
        }
        if next == Some('>') {
            self.state = State::TagEnd;
        }
    }

    fn on_tag_end(&mut self, s: char, pre: Option<char>) {
        if pre == Some('/') && s == '>' {
            // Self-closing: re-enter close handling with the index rewound
            // one step so CloseTagEnd sees this same `>`.
            self.state = State::CloseTagEnd;
            self.index -= 1;
            return;
        }
        if s == '>' {
            self.tag_name.clear();
            self.state = State::OpenTag;
        }
    }

    fn on_open_tag(&mut self, s: char, next: Option<char>) {
        if s == '<' {
            if next == Some('/') {
                self.state = State::CloseTagStart;
            } else {
                self.state = State::TagStart;
            }
        } else if let Some(current) = &self.current {
            current.borrow_mut().text.push(s);
        }
    }

    fn on_close_tag_start(&mut self, s: char, next: Option<char>) -> ParseResult<()> {
        if is_letter(s) {
            self.tag_name.push(s);
        } else if is_empty(s) {
            return Err(ParseError::whitespace_in_closing_tag(self.tag_name.clone()));
        }

        if next == Some('>') {
            self.state = State::CloseTagEnd;
        }
        Ok(())
    }

    fn on_close_tag_end(&mut self, s: char) -> ParseResult<()> {
        if s != '>' {
            return Ok(());
        }

        let top = match self.stack.last() {
            Some(top) => top.clone(),
            None => return Err(ParseError::stray_closing_tag(self.tag_name.clone())),
        };

        if top.borrow().tag == self.tag_name {
            self.stack.pop();
            self.current = self.stack.last().cloned();
            self.tag_name.clear();
            self.state = State::OpenTag;
            Ok(())
        } else {
            let expected = top.borrow().tag.clone();
            Err(ParseError::tag_mismatch(expected, self.tag_name.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(
            normalize("<div   class = \"a\"  >  hi  </div >"),
            "<div class=\"a\"> hi </div>"
        );
    }

    #[test]
    fn normalize_strips_pretty_printed_newlines() {
        assert_eq!(
            normalize("<div>\n  <span>x</span>\n</div>"),
            "<div><span>x</span></div>"
        );
    }

    #[test]
    fn normalize_self_close_spacing() {
        assert_eq!(normalize("<br  />"), "<br/>");
    }
}
