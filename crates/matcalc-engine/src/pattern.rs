//! Command patterns such as `i/det {m:Matrix}` or `{a:Basic} + {b:Basic}`.
//!
//! A pattern is an optional flag prefix ending in `/`, an optional left placeholder, the
//! literal operator text and an optional right placeholder. A placeholder is written
//! `{name:kind}` and a trailing `?` on the kind makes it nullable.

use crate::error::EvalError;
use matcalc_core::{ComputationError, Matrix, Value};
use std::fmt;
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unknown flag `{0}`")]
    UnknownFlag(char),
    #[error("unknown operand kind `{0}`")]
    UnknownKind(String),
    #[error("placeholder is missing its closing brace")]
    Unclosed,
    #[error("malformed placeholder `{{{0}}}`")]
    MalformedPlaceholder(String),
    #[error("pattern has no literal text")]
    EmptyLiteral,
    #[error("unexpected text after the right placeholder: `{0}`")]
    TrailingText(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Match the literal text ignoring case.
    pub case_insensitive: bool,
}

/// What an operand is cast to before a command sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// A bare identifier taken from unresolved text, never evaluated.
    Name,
    /// An integral `Number`.
    Int,
    /// A non-negative integral `Number`.
    UInt,
    /// The payload of a `Number`.
    Double,
    /// A `Matrix`, or a `Solution` standing in for one.
    Matrix,
    Number,
    List,
    /// Any value.
    Basic,
}

impl OperandKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "name" => OperandKind::Name,
            "int" => OperandKind::Int,
            "uint" => OperandKind::UInt,
            "double" => OperandKind::Double,
            "Matrix" => OperandKind::Matrix,
            "Number" => OperandKind::Number,
            "List" => OperandKind::List,
            "Basic" => OperandKind::Basic,
            _ => return None,
        };
        Some(kind)
    }

    pub fn tag(self) -> &'static str {
        match self {
            OperandKind::Name => "name",
            OperandKind::Int => "int",
            OperandKind::UInt => "uint",
            OperandKind::Double => "double",
            OperandKind::Matrix => "Matrix",
            OperandKind::Number => "Number",
            OperandKind::List => "List",
            OperandKind::Basic => "Basic",
        }
    }
}

/// An operand as found next to a matched operator, before casting.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Name(String),
    Value(Value),
}

/// An operand after casting to its placeholder's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Name(String),
    Int(i64),
    UInt(u64),
    Double(f64),
    Value(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub kind: OperandKind,
    pub nullable: bool,
}

impl Placeholder {
    /// Parses `{name:kind}` or `{name:kind?}` at the start of `text`.
    ///
    /// Returns `None` when `text` does not start with a brace, otherwise the placeholder and
    /// the rest of the text.
    fn parse(text: &str) -> Result<Option<(Self, &str)>, PatternError> {
        let Some(body) = text.strip_prefix('{') else {
            return Ok(None);
        };
        let end = body.find('}').ok_or(PatternError::Unclosed)?;
        let inner = &body[..end];

        let (name, tag) = inner
            .split_once(':')
            .ok_or_else(|| PatternError::MalformedPlaceholder(inner.to_string()))?;
        if name.is_empty() {
            return Err(PatternError::MalformedPlaceholder(inner.to_string()));
        }
        let (tag, nullable) = match tag.strip_suffix('?') {
            Some(tag) => (tag, true),
            None => (tag, false),
        };
        let kind =
            OperandKind::from_tag(tag).ok_or_else(|| PatternError::UnknownKind(tag.to_string()))?;

        let placeholder = Placeholder {
            name: name.to_string(),
            kind,
            nullable,
        };
        Ok(Some((placeholder, &body[end + 1..])))
    }

    /// Casts a bound operand to this placeholder's kind.
    pub fn cast(&self, operand: Operand) -> Result<Arg, EvalError> {
        let value = match (self.kind, operand) {
            (OperandKind::Name, Operand::Name(name)) => return Ok(Arg::Name(name)),
            (OperandKind::Name, Operand::Value(value)) => {
                return Err(self.mismatch("a name", value));
            }
            (_, Operand::Name(name)) => {
                return Err(EvalError::Internal(format!(
                    "name `{}` bound to the {} operand `{}`",
                    name,
                    self.kind.tag(),
                    self.name
                )));
            }
            (_, Operand::Value(value)) => value,
        };

        match (self.kind, value) {
            (OperandKind::Int, Value::Number(x)) => integral(x).map(|x| Arg::Int(x as i64)),
            (OperandKind::UInt, Value::Number(x)) => {
                let x = integral(x)?;
                if x < 0.0 {
                    return Err(ComputationError::new(format!("{} is negative", x))
                        .with_incorrect(x)
                        .into());
                }
                Ok(Arg::UInt(x as u64))
            }
            (OperandKind::Double, Value::Number(x)) => Ok(Arg::Double(x)),
            (OperandKind::Number, value @ Value::Number(_))
            | (OperandKind::Matrix, value @ (Value::Matrix(_) | Value::Solution(_)))
            | (OperandKind::List, value @ Value::List(_))
            | (OperandKind::Basic, value) => Ok(Arg::Value(value)),
            (OperandKind::Int | OperandKind::UInt | OperandKind::Double, value) => {
                Err(self.mismatch("a Number", value))
            }
            (kind, value) => Err(self.mismatch(&format!("a {}", kind.tag()), value)),
        }
    }

    fn mismatch(&self, expected: &str, found: Value) -> EvalError {
        ComputationError::new(format!(
            "operand `{}` must be {}, found {}",
            self.name,
            expected,
            found.kind()
        ))
        .with_incorrect(found)
        .into()
    }
}

fn integral(x: f64) -> Result<f64, EvalError> {
    if x.fract() != 0.0 || !x.is_finite() {
        return Err(ComputationError::new(format!("{} is not an integer", x))
            .with_incorrect(x)
            .into());
    }
    Ok(x)
}

/// `<name>` for a required operand, `[name]` for a nullable one, with the kind shown unless
/// any value is accepted.
impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            OperandKind::Basic => self.name.clone(),
            kind => format!("{} {}", kind.tag(), self.name),
        };
        if self.nullable {
            write!(f, "[{}]", label)
        } else {
            write!(f, "<{}>", label)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub flags: Flags,
    pub left: Option<Placeholder>,
    pub literal: String,
    pub right: Option<Placeholder>,
}

impl Pattern {
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let mut flags = Flags::default();
        let mut rest = text;
        if let Some((prefix, body)) = text.split_once('/') {
            for letter in prefix.chars() {
                match letter {
                    'i' => flags.case_insensitive = true,
                    other => return Err(PatternError::UnknownFlag(other)),
                }
            }
            rest = body;
        }

        let left = match Placeholder::parse(rest)? {
            Some((placeholder, tail)) => {
                rest = tail;
                Some(placeholder)
            }
            None => None,
        };

        let literal_end = rest.find('{').unwrap_or(rest.len());
        let literal = rest[..literal_end].trim().to_string();
        if literal.is_empty() {
            return Err(PatternError::EmptyLiteral);
        }
        rest = &rest[literal_end..];

        let right = match Placeholder::parse(rest)? {
            Some((placeholder, tail)) => {
                rest = tail;
                Some(placeholder)
            }
            None => None,
        };

        if !rest.is_empty() {
            return Err(PatternError::TrailingText(rest.to_string()));
        }

        Ok(Pattern {
            flags,
            left,
            literal,
            right,
        })
    }

    /// Byte range of the first occurrence of the literal in `haystack`.
    ///
    /// A literal that starts or ends with a word character only matches where it does not
    /// continue a word of `haystack`: `T` is not found in `DeT`, nor `E` in `Eva`.
    pub fn find_in(&self, haystack: &str) -> Option<Range<usize>> {
        haystack
            .char_indices()
            .filter_map(|(start, _)| self.match_at(haystack, start))
            .find(|bytes| self.on_word_boundary(haystack, bytes))
    }

    fn match_at(&self, haystack: &str, start: usize) -> Option<Range<usize>> {
        let mut candidate = haystack[start..].chars();
        let mut end = start;
        for expected in self.literal.chars() {
            let actual = candidate.next()?;
            let same = if self.flags.case_insensitive {
                same_letter(actual, expected)
            } else {
                actual == expected
            };
            if !same {
                return None;
            }
            end += actual.len_utf8();
        }
        Some(start..end)
    }

    fn on_word_boundary(&self, haystack: &str, bytes: &Range<usize>) -> bool {
        let glued = |edge: Option<char>, neighbour: Option<char>| {
            matches!((edge, neighbour), (Some(a), Some(b)) if is_word(a) && is_word(b))
        };
        let before = haystack[..bytes.start].chars().next_back();
        let after = haystack[bytes.end..].chars().next();
        !glued(self.literal.chars().next(), before)
            && !glued(self.literal.chars().next_back(), after)
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(left) = &self.left {
            parts.push(left.to_string());
        }
        parts.push(self.literal.clone());
        if let Some(right) = &self.right {
            parts.push(right.to_string());
        }
        f.write_str(&parts.join(" "))
    }
}

/// Named arguments assembled for one command invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    entries: Vec<(String, Option<Arg>)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, arg: Option<Arg>) {
        self.entries.push((name.into(), arg));
    }

    /// The argument bound to `name`; `None` when it was absent or never declared.
    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, arg)| arg.as_ref())
    }

    fn require(&self, name: &str) -> Result<&Arg, EvalError> {
        self.get(name)
            .ok_or_else(|| EvalError::Internal(format!("argument `{}` was not bound", name)))
    }

    fn wrong_kind(name: &str, arg: &Arg) -> EvalError {
        EvalError::Internal(format!("argument `{}` has an unexpected kind: {:?}", name, arg))
    }

    pub fn value(&self, name: &str) -> Result<&Value, EvalError> {
        match self.require(name)? {
            Arg::Value(value) => Ok(value),
            other => Err(Self::wrong_kind(name, other)),
        }
    }

    pub fn opt_value(&self, name: &str) -> Result<Option<&Value>, EvalError> {
        match self.get(name) {
            None => Ok(None),
            Some(Arg::Value(value)) => Ok(Some(value)),
            Some(other) => Err(Self::wrong_kind(name, other)),
        }
    }

    pub fn matrix(&self, name: &str) -> Result<&Matrix, EvalError> {
        let value = self.value(name)?;
        value
            .as_matrix()
            .ok_or_else(|| Self::wrong_kind(name, &Arg::Value(value.clone())))
    }

    pub fn name(&self, name: &str) -> Result<&str, EvalError> {
        match self.require(name)? {
            Arg::Name(text) => Ok(text),
            other => Err(Self::wrong_kind(name, other)),
        }
    }

    pub fn double(&self, name: &str) -> Result<f64, EvalError> {
        match self.require(name)? {
            Arg::Double(x) => Ok(*x),
            other => Err(Self::wrong_kind(name, other)),
        }
    }

    pub fn opt_uint(&self, name: &str) -> Result<Option<u64>, EvalError> {
        match self.get(name) {
            None => Ok(None),
            Some(Arg::UInt(n)) => Ok(Some(*n)),
            Some(other) => Err(Self::wrong_kind(name, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder(name: &str, kind: OperandKind, nullable: bool) -> Placeholder {
        Placeholder {
            name: name.to_string(),
            kind,
            nullable,
        }
    }

    #[test]
    fn test_parse_binary() {
        let p = Pattern::parse("{a:Basic} + {b:Basic}").unwrap();
        assert_eq!(p.literal, "+");
        assert!(!p.flags.case_insensitive);
        assert_eq!(p.left, Some(placeholder("a", OperandKind::Basic, false)));
        assert_eq!(p.right, Some(placeholder("b", OperandKind::Basic, false)));
    }

    #[test]
    fn test_parse_flags_and_prefix_only() {
        let p = Pattern::parse("i/det {m:Matrix}").unwrap();
        assert!(p.flags.case_insensitive);
        assert_eq!(p.left, None);
        assert_eq!(p.literal, "det");

        let p = Pattern::parse("/{a:Basic} / {b:Basic}").unwrap();
        assert!(!p.flags.case_insensitive);
        assert_eq!(p.literal, "/");
    }

    #[test]
    fn test_parse_nullable_and_bare() {
        let p = Pattern::parse("{m:Number?} E {n:uint?}").unwrap();
        assert_eq!(p.left, Some(placeholder("m", OperandKind::Number, true)));
        assert_eq!(p.right, Some(placeholder("n", OperandKind::UInt, true)));

        let p = Pattern::parse("[]").unwrap();
        assert_eq!(p.literal, "[]");
        assert!(p.left.is_none() && p.right.is_none());

        let p = Pattern::parse("{m:Matrix}T").unwrap();
        assert_eq!(p.literal, "T");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Pattern::parse("x/det"), Err(PatternError::UnknownFlag('x')));
        assert_eq!(
            Pattern::parse("{a:Real} + {b:Basic}"),
            Err(PatternError::UnknownKind("Real".into()))
        );
        assert_eq!(Pattern::parse("{a:Basic + 1"), Err(PatternError::Unclosed));
        assert_eq!(
            Pattern::parse("{a} + {b:Basic}"),
            Err(PatternError::MalformedPlaceholder("a".into()))
        );
        assert_eq!(
            Pattern::parse("{a:Basic}{b:Basic}"),
            Err(PatternError::EmptyLiteral)
        );
        assert_eq!(
            Pattern::parse("{a:Basic} + {b:Basic} !"),
            Err(PatternError::TrailingText(" !".into()))
        );
    }

    #[test]
    fn test_find_in() {
        let det = Pattern::parse("i/det {m:Matrix}").unwrap();
        assert_eq!(det.find_in("x DeT y"), Some(2..5));
        assert_eq!(det.find_in("de t"), None);

        let tr = Pattern::parse("Tr {m:Matrix}").unwrap();
        assert_eq!(tr.find_in("tr"), None);
        assert_eq!(tr.find_in("  Tr"), Some(2..4));
    }

    #[test]
    fn test_find_in_respects_words() {
        let transpose = Pattern::parse("{m:Matrix}T").unwrap();
        assert_eq!(transpose.find_in("DeT"), None);
        assert_eq!(transpose.find_in("T"), Some(0..1));
        assert_eq!(transpose.find_in("DeT T"), Some(4..5));

        let identity = Pattern::parse("{m:Number?} E {n:uint?}").unwrap();
        assert_eq!(identity.find_in("Eva ="), None);
        assert_eq!(identity.find_in("+ E"), Some(2..3));

        let join = Pattern::parse("{a:Matrix} | {b:Matrix}").unwrap();
        assert_eq!(join.find_in("a|b"), Some(1..2));
    }

    #[test]
    fn test_cast_integers() {
        let n = placeholder("n", OperandKind::UInt, false);
        assert_eq!(
            n.cast(Operand::Value(Value::Number(3.0))).unwrap(),
            Arg::UInt(3)
        );
        assert!(n.cast(Operand::Value(Value::Number(-3.0))).is_err());
        assert!(n.cast(Operand::Value(Value::Number(2.5))).is_err());

        let i = placeholder("i", OperandKind::Int, false);
        assert_eq!(
            i.cast(Operand::Value(Value::Number(-3.0))).unwrap(),
            Arg::Int(-3)
        );
    }

    #[test]
    fn test_cast_kind_mismatch() {
        let m = placeholder("m", OperandKind::Matrix, false);
        let err = m.cast(Operand::Value(Value::Number(1.0))).unwrap_err();
        assert_eq!(err.to_string(), "operand `m` must be a Matrix, found Number");

        let name = placeholder("name", OperandKind::Name, false);
        assert!(name.cast(Operand::Value(Value::Number(1.0))).is_err());
        assert_eq!(
            name.cast(Operand::Name("x".into())).unwrap(),
            Arg::Name("x".into())
        );

        let number = placeholder("m", OperandKind::Number, false);
        assert!(number.cast(Operand::Value(Value::IdentityMatrix(1.0))).is_err());
    }

    #[test]
    fn test_display() {
        let p = Pattern::parse("{m:Number?} E {n:uint?}").unwrap();
        assert_eq!(p.to_string(), "[Number m] E [uint n]");
        let p = Pattern::parse("{a:Basic} + {b:Basic}").unwrap();
        assert_eq!(p.to_string(), "<a> + <b>");
    }

    #[test]
    fn test_args_lookup() {
        let mut args = Args::new();
        args.insert("a", Some(Arg::Value(Value::Number(1.0))));
        args.insert("b", None);
        assert_eq!(args.value("a").unwrap(), &Value::Number(1.0));
        assert_eq!(args.opt_value("b").unwrap(), None);
        assert!(matches!(args.value("b"), Err(EvalError::Internal(_))));
        assert!(args.name("a").is_err());
    }
}
