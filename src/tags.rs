//! Marker delimiter configuration.
//!
//! A marker is `prefix name suffix`, where `name` is one or more ASCII word
//! characters and may be padded with whitespace. Three delimiter pairs are
//! configured, one per marker kind:
//!
//! ```text
//! open          {{name}}
//! close         {{/name}}
//! self-closing  {{name/}}
//! ```
//!
//! Delimiters are literal text. Every regex metacharacter they contain is
//! escaped before being spliced into a pattern.

use crate::error::{ErrorKind, InterpolateError};
use crate::parser::TokenKind;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

const NAME: &str = r"[A-Za-z0-9_]+";

/// A `(prefix, suffix)` pair surrounding a marker name.
///
/// Serialized as a two element array, e.g. `["{{", "/}}"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct TagPair {
    pub prefix: String,
    pub suffix: String,
}

impl TagPair {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    fn is_empty(&self) -> bool {
        self.prefix.is_empty() || self.suffix.is_empty()
    }

    /// Pattern source for this pair; `capture` wraps the name in group 1.
    fn pattern(&self, capture: bool) -> String {
        let name = if capture {
            format!("({})", NAME)
        } else {
            NAME.to_string()
        };
        format!(
            r"{}\s*{}\s*{}",
            regex::escape(&self.prefix),
            name,
            regex::escape(&self.suffix)
        )
    }
}

impl From<(String, String)> for TagPair {
    fn from((prefix, suffix): (String, String)) -> Self {
        Self { prefix, suffix }
    }
}

impl From<TagPair> for (String, String) {
    fn from(pair: TagPair) -> Self {
        (pair.prefix, pair.suffix)
    }
}

/// Delimiters for the three marker kinds.
///
/// Pairs are optional so that partial configurations (for example a JSON file
/// that omits `close`) can be represented and rejected by [`Tags::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    #[serde(default)]
    pub open: Option<TagPair>,
    #[serde(default)]
    pub close: Option<TagPair>,
    #[serde(default)]
    pub self_closing: Option<TagPair>,
}

impl Default for Tags {
    fn default() -> Self {
        Self::new(
            TagPair::new("{{", "}}"),
            TagPair::new("{{/", "}}"),
            TagPair::new("{{", "/}}"),
        )
    }
}

lazy_static! {
    /// The default double-brace configuration.
    pub static ref DEFAULT_TAGS: Tags = Tags::default();
    static ref DEFAULT_PATTERNS: TagPatterns =
        TagPatterns::compile(&DEFAULT_TAGS).expect("default tags are valid");
}

impl Tags {
    pub fn new(open: TagPair, close: TagPair, self_closing: TagPair) -> Self {
        Self {
            open: Some(open),
            close: Some(close),
            self_closing: Some(self_closing),
        }
    }

    /// The pair for a marker kind. `TokenKind::Text` has no delimiters.
    pub fn pair(&self, kind: TokenKind) -> Option<&TagPair> {
        match kind {
            TokenKind::Open => self.open.as_ref(),
            TokenKind::Close => self.close.as_ref(),
            TokenKind::SelfClosing => self.self_closing.as_ref(),
            TokenKind::Text => None,
        }
    }

    /// Check that all three pairs are present with non-empty delimiters.
    pub fn validate(&self) -> Result<(), InterpolateError> {
        self.pairs().map(|_| ())
    }

    /// The pairs in classification order: close, self-closing, open.
    fn pairs(&self) -> Result<[(TokenKind, &TagPair); 3], InterpolateError> {
        let get = |kind: TokenKind, label: &str| match self.pair(kind) {
            Some(pair) if !pair.is_empty() => Ok((kind, pair)),
            Some(_) => Err(InterpolateError::new(
                ErrorKind::InvalidTags,
                format!("`{}` tag pair has an empty delimiter", label),
            )),
            None => Err(InterpolateError::new(
                ErrorKind::InvalidTags,
                format!("`{}` tag pair is missing", label),
            )),
        };
        Ok([
            get(TokenKind::Close, "close")?,
            get(TokenKind::SelfClosing, "self_closing")?,
            get(TokenKind::Open, "open")?,
        ])
    }
}

/// Compiled patterns for one [`Tags`] configuration.
#[derive(Debug, Clone)]
pub struct TagPatterns {
    /// Alternation of all three marker shapes, used to split the source.
    split: Regex,
    /// Anchored capturing patterns, in classification order.
    classify: [(TokenKind, Regex); 3],
}

impl TagPatterns {
    pub fn compile(tags: &Tags) -> Result<Self, InterpolateError> {
        let pairs = tags.pairs()?;

        let combined = pairs
            .iter()
            .map(|(_, pair)| format!("(?:{})", pair.pattern(false)))
            .collect::<Vec<_>>()
            .join("|");
        let split = build_regex(&combined)?;

        let [close, self_closing, open] = pairs;
        let anchored = |(kind, pair): (TokenKind, &TagPair)| {
            build_regex(&format!("^{}$", pair.pattern(true))).map(|re| (kind, re))
        };

        Ok(Self {
            split,
            classify: [anchored(close)?, anchored(self_closing)?, anchored(open)?],
        })
    }

    /// Patterns for `tags`, reusing the precompiled default set when possible.
    pub fn for_tags(tags: &Tags) -> Result<Cow<'static, TagPatterns>, InterpolateError> {
        if *tags == *DEFAULT_TAGS {
            Ok(Cow::Borrowed(&*DEFAULT_PATTERNS))
        } else {
            Self::compile(tags).map(Cow::Owned)
        }
    }

    pub fn split(&self) -> &Regex {
        &self.split
    }

    /// Identify a split piece as a marker, returning its kind and bare name.
    pub fn classify<'s>(&self, piece: &'s str) -> Option<(TokenKind, &'s str)> {
        self.classify.iter().find_map(|(kind, re)| {
            re.captures(piece)
                .and_then(|caps| caps.get(1))
                .map(|name| (*kind, name.as_str()))
        })
    }
}

fn build_regex(source: &str) -> Result<Regex, InterpolateError> {
    Regex::new(source).map_err(|err| {
        InterpolateError::new(
            ErrorKind::InvalidTags,
            format!("tag pattern failed to compile: {}", err),
        )
    })
}
