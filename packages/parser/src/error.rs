use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("closing tag </{found}> does not match open tag <{expected}>")]
    TagMismatch { expected: String, found: String },

    #[error("whitespace inside closing tag name: {tag:?}")]
    WhitespaceInClosingTag { tag: String },

    #[error("closing tag </{tag}> with no tag open")]
    StrayClosingTag { tag: String },

    #[error("input contains no element")]
    EmptyDocument,

    #[error("unclosed tags at end of input: {}", tags.join(", "))]
    UnclosedTags { tags: Vec<String> },
}

impl ParseError {
    pub fn tag_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TagMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn whitespace_in_closing_tag(tag: impl Into<String>) -> Self {
        Self::WhitespaceInClosingTag { tag: tag.into() }
    }

    pub fn stray_closing_tag(tag: impl Into<String>) -> Self {
        Self::StrayClosingTag { tag: tag.into() }
    }

    pub fn unclosed_tags(tags: Vec<String>) -> Self {
        Self::UnclosedTags { tags }
    }
}
