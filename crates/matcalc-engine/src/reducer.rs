//! Pattern stage: repeatedly marks command literals in the remaining text and binds them to
//! their neighbouring operands, one precedence tier at a time.

use crate::catalog::{Catalog, Command};
use crate::error::{EvalError, ParseError};
use crate::pattern::{Args, Operand, OperandKind, Pattern, Placeholder};
use crate::session::Scope;
use crate::token::{RawText, Token};
use matcalc_core::Value;
use rowan::TextRange;

/// Reduces one bracket level to its value.
///
/// Succeeds once no tokens remain (no value) or a single resolved token is left. Fails with
/// [`ParseError::TooComplex`] when a pass changes nothing or the iteration limit runs out.
pub(crate) fn reduce<'c>(
    scope: &mut Scope<'c>,
    tokens: Vec<Token<'c>>,
) -> Result<Option<Value>, EvalError> {
    let mut reducer = Reducer {
        catalog: scope.catalog(),
        tokens,
    };

    for iteration in 0..scope.max_iterations() {
        if let Some(result) = reducer.finished() {
            return Ok(result);
        }
        log::debug!("reduction pass {} over {} tokens", iteration, reducer.tokens.len());
        if !reducer.pass(scope)? {
            break;
        }
    }

    match reducer.finished() {
        Some(result) => Ok(result),
        None => Err(ParseError::TooComplex {
            span: reducer.span(),
        }
        .into()),
    }
}

struct Reducer<'c> {
    catalog: &'c Catalog,
    tokens: Vec<Token<'c>>,
}

/// An operand removed from next to a matched literal.
struct Taken {
    /// `None` for a resolved token without a value, such as `()`.
    operand: Option<Operand>,
    range: TextRange,
    /// Text left over after a name was cut from a literal.
    rest: Option<RawText>,
}

impl<'c> Reducer<'c> {
    fn finished(&mut self) -> Option<Option<Value>> {
        if self.tokens.is_empty() {
            return Some(None);
        }
        if self.tokens.len() == 1 && self.tokens[0].is_resolved() {
            return self.tokens.pop().map(Token::into_value);
        }
        None
    }

    fn span(&self) -> Option<TextRange> {
        self.tokens
            .iter()
            .map(Token::range)
            .reduce(|a, b| a.cover(b))
    }

    /// Runs every tier once. Returns whether anything changed.
    fn pass(&mut self, scope: &mut Scope<'c>) -> Result<bool, EvalError> {
        let catalog = self.catalog;
        let mut changed = false;
        for tier in catalog.tiers() {
            for command in tier {
                changed |= self.mark(command);
            }
            changed |= self.sweep(scope)?;

            let before = self.tokens.len();
            self.tokens
                .retain(|token| !matches!(token, Token::Literal(raw) if raw.is_blank()));
            changed |= self.tokens.len() != before;
        }

        if log::log_enabled!(log::Level::Trace) {
            let tokens: Vec<String> = self.tokens.iter().map(ToString::to_string).collect();
            log::trace!("after pass: [{}]", tokens.join(", "));
        }
        Ok(changed)
    }

    /// Splits literal tokens around every occurrence of one of the command's literals.
    fn mark(&mut self, command: &'c Command) -> bool {
        let mut changed = false;
        let mut marked = Vec::with_capacity(self.tokens.len());

        for token in self.tokens.drain(..) {
            let Token::Literal(mut rest) = token else {
                marked.push(token);
                continue;
            };

            while let Some((pattern, bytes)) = first_hit(&command.patterns, rest.as_str()) {
                let before = rest.slice(0..bytes.start).trim();
                let hit = rest.slice(bytes.clone());
                let after = rest.slice(bytes.end..rest.as_str().len()).trim();

                log::debug!(
                    "marked `{}` ({}) at {:?}",
                    hit.as_str(),
                    command.title,
                    hit.range()
                );
                if !before.is_empty() {
                    marked.push(Token::Literal(before));
                }
                marked.push(Token::Matched {
                    command,
                    pattern,
                    range: hit.range(),
                });
                rest = after;
                changed = true;
            }

            if !rest.is_empty() {
                marked.push(Token::Literal(rest));
            }
        }

        self.tokens = marked;
        changed
    }

    /// Computes every marked command, left to right.
    fn sweep(&mut self, scope: &mut Scope<'c>) -> Result<bool, EvalError> {
        let mut changed = false;
        let mut i = 0;
        while i < self.tokens.len() {
            let (command, pattern, range) = match &self.tokens[i] {
                Token::Matched {
                    command,
                    pattern,
                    range,
                } => (*command, *pattern, *range),
                _ => {
                    i += 1;
                    continue;
                }
            };
            let pattern = command.patterns.get(pattern).ok_or_else(|| {
                EvalError::Internal(format!("`{}` has no pattern {}", command.title, pattern))
            })?;

            let mut args = Args::new();
            let mut span = range;
            let mut first = i;
            let mut last = i;
            let mut leading = None;
            let mut trailing = None;

            if let Some(placeholder) = &pattern.left {
                let taken = match i.checked_sub(1) {
                    Some(j) => self.take(j, placeholder),
                    None => None,
                };
                let operand = match taken {
                    Some(taken) => {
                        first = i - 1;
                        span = span.cover(taken.range);
                        leading = taken.rest;
                        taken.operand
                    }
                    None => None,
                };
                args.insert(
                    placeholder.name.clone(),
                    bind(placeholder, operand, pattern, range)?,
                );
            }

            if let Some(placeholder) = &pattern.right {
                let taken = if i + 1 < self.tokens.len() {
                    self.take(i + 1, placeholder)
                } else {
                    None
                };
                let operand = match taken {
                    Some(taken) => {
                        last = i + 1;
                        span = span.cover(taken.range);
                        trailing = taken.rest;
                        taken.operand
                    }
                    None => None,
                };
                args.insert(
                    placeholder.name.clone(),
                    bind(placeholder, operand, pattern, range)?,
                );
            }

            log::debug!("computing {} over {:?}", command.title, span);
            let value = command.compute(scope, &args)?;
            if let Some(value) = &value {
                scope.warn_if_extreme(value);
            }

            let mut replacement = Vec::with_capacity(3);
            if let Some(rest) = leading {
                replacement.push(Token::Literal(rest));
            }
            let computed_at = first + replacement.len();
            replacement.push(Token::Computed { value, range: span });
            if let Some(rest) = trailing {
                replacement.push(Token::Literal(rest));
            }
            self.tokens.splice(first..=last, replacement);

            changed = true;
            i = computed_at + 1;
        }
        Ok(changed)
    }

    /// Takes the operand held by the token at `index`, if it can fill `placeholder`.
    ///
    /// Resolved tokens give their value up. Literal text only fills a name placeholder, with
    /// its leading identifier.
    fn take(&mut self, index: usize, placeholder: &Placeholder) -> Option<Taken> {
        match &mut self.tokens[index] {
            Token::Numeric { value, range } => Some(Taken {
                operand: Some(Operand::Value(Value::Number(*value))),
                range: *range,
                rest: None,
            }),
            Token::Computed { value, range } => Some(Taken {
                operand: value.take().map(Operand::Value),
                range: *range,
                rest: None,
            }),
            Token::Literal(raw) if placeholder.kind == OperandKind::Name => {
                let (name, rest) = split_identifier(raw)?;
                Some(Taken {
                    operand: Some(Operand::Name(name.as_str().to_string())),
                    range: name.range(),
                    rest: (!rest.is_blank()).then_some(rest),
                })
            }
            Token::Literal(_) | Token::Matched { .. } => None,
        }
    }
}

/// Leftmost occurrence of any of the patterns; on a tie the earlier pattern wins.
fn first_hit(patterns: &[Pattern], text: &str) -> Option<(usize, std::ops::Range<usize>)> {
    patterns
        .iter()
        .enumerate()
        .filter_map(|(index, pattern)| pattern.find_in(text).map(|bytes| (index, bytes)))
        .min_by_key(|(index, bytes)| (bytes.start, *index))
}

/// Splits the leading identifier off `raw`. `None` when the text does not start with one.
fn split_identifier(raw: &RawText) -> Option<(RawText, RawText)> {
    let text = raw.trim();
    let end = text
        .as_str()
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.as_str().len());
    if end == 0 {
        return None;
    }
    Some((text.slice(0..end), text.slice(end..text.as_str().len())))
}

fn bind(
    placeholder: &Placeholder,
    operand: Option<Operand>,
    pattern: &Pattern,
    span: TextRange,
) -> Result<Option<crate::pattern::Arg>, EvalError> {
    match operand {
        Some(operand) => placeholder.cast(operand).map(Some),
        None if placeholder.nullable => Ok(None),
        None => Err(ParseError::MissingOperand {
            operator: pattern.literal.clone(),
            span: Some(span),
        }
        .into()),
    }
}
