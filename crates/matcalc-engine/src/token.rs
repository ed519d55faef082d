use crate::catalog::Command;
use matcalc_core::Value;
use rowan::{TextRange, TextSize};
use std::fmt;
use std::ops::Range;

/// Text collected from the source together with the source range of every character.
///
/// Whitespace runs are collapsed while reading, so the text is not a plain slice of the
/// input and ranges have to be tracked per character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawText {
    text: String,
    ranges: Vec<TextRange>,
}

impl RawText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ch: char, range: TextRange) {
        self.text.push(ch);
        self.ranges.push(range);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Source range from the first to the last character; empty text gives an empty range.
    pub fn range(&self) -> TextRange {
        match (self.ranges.first(), self.ranges.last()) {
            (Some(first), Some(last)) => first.cover(*last),
            _ => TextRange::default(),
        }
    }

    fn char_index(&self, byte: usize) -> usize {
        self.text[..byte].chars().count()
    }

    /// The sub-text covering the byte range `bytes` of [`RawText::as_str`].
    pub fn slice(&self, bytes: Range<usize>) -> RawText {
        let first = self.char_index(bytes.start);
        let last = self.char_index(bytes.end);
        RawText {
            text: self.text[bytes].to_string(),
            ranges: self.ranges[first..last].to_vec(),
        }
    }

    pub fn trim(&self) -> RawText {
        let trimmed = self.text.trim_start();
        let start = self.text.len() - trimmed.len();
        let end = start + trimmed.trim_end().len();
        self.slice(start..end)
    }

    /// Removes and returns the last character if it is `ch`.
    pub fn pop_if(&mut self, ch: char) -> Option<(char, TextRange)> {
        if !self.text.ends_with(ch) {
            return None;
        }
        self.text.pop();
        self.ranges.pop().map(|range| (ch, range))
    }

    pub fn take(&mut self) -> RawText {
        std::mem::take(self)
    }
}

/// A unit of work for the reducer.
#[derive(Debug, Clone)]
pub enum Token<'c> {
    /// Text nothing has been recognized in yet.
    Literal(RawText),
    /// A number read straight from the input.
    Numeric { value: f64, range: TextRange },
    /// An occurrence of a command's literal text, waiting for its operands.
    Matched {
        command: &'c Command,
        pattern: usize,
        range: TextRange,
    },
    /// A finished value; `None` for things like empty parentheses.
    Computed {
        value: Option<Value>,
        range: TextRange,
    },
}

impl Token<'_> {
    pub fn range(&self) -> TextRange {
        match self {
            Token::Literal(raw) => raw.range(),
            Token::Numeric { range, .. }
            | Token::Matched { range, .. }
            | Token::Computed { range, .. } => *range,
        }
    }

    /// Whether the token already holds its final value.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Token::Numeric { .. } | Token::Computed { .. })
    }

    /// The value of a resolved token.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Token::Numeric { value, .. } => Some(Value::Number(value)),
            Token::Computed { value, .. } => value,
            Token::Literal(_) | Token::Matched { .. } => None,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(raw) => write!(f, "Literal({:?})", raw.as_str()),
            Token::Numeric { value, .. } => write!(f, "Numeric({})", value),
            Token::Matched {
                command, pattern, ..
            } => match command.patterns.get(*pattern) {
                Some(p) => write!(f, "Matched({})", p.literal),
                None => write!(f, "Matched({})", command.title),
            },
            Token::Computed { value: Some(v), .. } => write!(f, "Computed({})", v),
            Token::Computed { value: None, .. } => f.write_str("Computed(none)"),
        }
    }
}

/// Single-character range at `offset`.
pub(crate) fn char_range(offset: TextSize, ch: char) -> TextRange {
    TextRange::at(offset, TextSize::of(ch))
}
