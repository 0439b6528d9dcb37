use crate::error::InterpolateError;
use crate::tags::{TagPatterns, Tags};
use serde::Serialize;
use std::borrow::Cow;

/// Position in the mixed string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Byte offset in source
    pub byte: usize,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub col: usize,
}

impl Position {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move past `text`, which must start at this position.
    fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
        }
        self.byte += text.len();
    }
}

/// Span in the mixed string (a range from start position to end position)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// What a piece of the mixed string turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    /// Literal text, kept verbatim (may be empty)
    #[serde(rename = "string")]
    Text,
    /// `{{name}}`
    Open,
    /// `{{/name}}`
    Close,
    /// `{{name/}}`
    SelfClosing,
}

impl TokenKind {
    pub fn is_marker(&self) -> bool {
        !matches!(self, TokenKind::Text)
    }
}

/// A classified piece of the mixed string.
///
/// For markers `value` is the bare name; for text it is the literal piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Token {
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Text, value)
    }

    pub fn open(name: impl Into<String>) -> Self {
        Self::new(TokenKind::Open, name)
    }

    pub fn close(name: impl Into<String>) -> Self {
        Self::new(TokenKind::Close, name)
    }

    pub fn self_closing(name: impl Into<String>) -> Self {
        Self::new(TokenKind::SelfClosing, name)
    }

    fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            span: Span::default(),
        }
    }

    fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Splits a mixed string into text and marker tokens
pub struct Tokenizer<'a> {
    source: &'a str,
    patterns: Cow<'static, TagPatterns>,
    position: Position,
}

impl<'a> Tokenizer<'a> {
    /// Fails only when `tags` is not a usable configuration.
    pub fn new(source: &'a str, tags: &Tags) -> Result<Self, InterpolateError> {
        Ok(Self {
            source,
            patterns: TagPatterns::for_tags(tags)?,
            position: Position::new(),
        })
    }

    /// Text and marker pieces alternate, starting and ending with text:
    /// `text, marker, text, ..., marker, text`. Empty text pieces are kept.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let source = self.source;
        self.position = Position::new();
        let markers: Vec<_> = self
            .patterns
            .split()
            .find_iter(source)
            .map(|m| m.range())
            .collect();

        let mut tokens = Vec::with_capacity(markers.len() * 2 + 1);
        let mut last = 0;
        for marker in markers {
            tokens.push(self.piece(&source[last..marker.start]));
            tokens.push(self.piece(&source[marker.clone()]));
            last = marker.end;
        }
        tokens.push(self.piece(&source[last..]));

        tracing::trace!(
            tokens = tokens.len(),
            markers = tokens.iter().filter(|t| t.kind.is_marker()).count(),
            "tokenized mixed string"
        );
        tokens
    }

    /// Classify one piece and advance past it.
    fn piece(&mut self, piece: &str) -> Token {
        let start = self.position;
        self.position.advance(piece);
        let span = Span {
            start,
            end: self.position,
        };

        // Anything that is not a whole marker stays literal text
        let token = match self.patterns.classify(piece) {
            Some((kind, name)) => Token::new(kind, name),
            None => Token::text(piece),
        };
        token.with_span(span)
    }
}

/// Tokenize a mixed string with the given delimiters
pub fn tokenize(source: &str, tags: &Tags) -> Result<Vec<Token>, InterpolateError> {
    Ok(Tokenizer::new(source, tags)?.tokenize())
}
