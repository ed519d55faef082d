//! Bracket stage: reads characters into numbers and raw text and folds every parenthesized
//! group into a single computed token as soon as it closes.

use crate::error::{EvalError, ParseError};
use crate::reducer::reduce;
use crate::session::Scope;
use crate::token::{char_range, RawText, Token};
use matcalc_core::Value;
use rowan::{TextRange, TextSize};

/// Tokens of one bracket level.
struct Frame<'c> {
    tokens: Vec<Token<'c>>,
    number: RawText,
    raw: RawText,
    was_whitespace: bool,
    /// The `(` that opened this level; `None` at the top.
    open: Option<TextRange>,
}

impl<'c> Frame<'c> {
    fn new(open: Option<TextRange>) -> Self {
        Self {
            tokens: Vec::new(),
            number: RawText::new(),
            raw: RawText::new(),
            was_whitespace: false,
            open,
        }
    }

    fn push_char(&mut self, ch: char, range: TextRange) -> Result<(), ParseError> {
        if ch.is_whitespace() {
            if self.was_whitespace {
                return Ok(());
            }
            self.was_whitespace = true;
        } else {
            self.was_whitespace = false;
        }

        let separator = ch == '.' || ch == ',';
        if ch.is_ascii_digit() || (separator && !self.number.is_empty()) {
            self.flush_raw();
            self.number.push(ch, range);
        } else {
            self.flush_number()?;
            self.raw.push(ch, range);
        }
        Ok(())
    }

    fn flush_number(&mut self) -> Result<(), ParseError> {
        if self.number.is_empty() {
            return Ok(());
        }
        let mut number = self.number.take();
        // `1, 2` separates list items: the comma goes back to the raw text.
        if let Some((ch, range)) = number.pop_if(',') {
            self.raw.push(ch, range);
        }

        let value = number
            .as_str()
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| ParseError::MalformedNumber {
                text: number.as_str().to_string(),
                span: Some(number.range()),
            })?;
        self.tokens.push(Token::Numeric {
            value,
            range: number.range(),
        });
        Ok(())
    }

    fn flush_raw(&mut self) {
        if !self.raw.is_empty() {
            self.tokens.push(Token::Literal(self.raw.take()));
        }
    }

    fn flush(&mut self) -> Result<(), ParseError> {
        self.flush_number()?;
        self.flush_raw();
        Ok(())
    }
}

struct Tokenizer<'c> {
    root: Frame<'c>,
    nested: Vec<Frame<'c>>,
}

impl<'c> Tokenizer<'c> {
    fn current(&mut self) -> &mut Frame<'c> {
        match self.nested.last_mut() {
            Some(frame) => frame,
            None => &mut self.root,
        }
    }

    fn open(&mut self, range: TextRange) -> Result<(), ParseError> {
        self.current().flush()?;
        self.nested.push(Frame::new(Some(range)));
        Ok(())
    }

    fn close(&mut self, range: TextRange, scope: &mut Scope<'c>) -> Result<(), EvalError> {
        let Some(mut frame) = self.nested.pop() else {
            return Err(ParseError::UnbalancedBrackets { span: Some(range) }.into());
        };
        frame.flush()?;
        let span = frame.open.map_or(range, |open| open.cover(range));
        let value = reduce(scope, frame.tokens)?;
        self.current().tokens.push(Token::Computed { value, range: span });
        Ok(())
    }

    fn finish(mut self, scope: &mut Scope<'c>) -> Result<Option<Value>, EvalError> {
        if let Some(frame) = self.nested.last() {
            return Err(ParseError::UnbalancedBrackets { span: frame.open }.into());
        }
        self.root.flush()?;
        reduce(scope, self.root.tokens)
    }
}

/// Evaluates a whole expression.
pub(crate) fn evaluate_source(
    scope: &mut Scope<'_>,
    source: &str,
) -> Result<Option<Value>, EvalError> {
    let mut tokenizer = Tokenizer {
        root: Frame::new(None),
        nested: Vec::new(),
    };

    for (offset, ch) in source.char_indices() {
        let offset = TextSize::try_from(offset)
            .map_err(|_| EvalError::Internal("input is too long".to_string()))?;
        let range = char_range(offset, ch);
        match ch {
            '(' => tokenizer.open(range)?,
            ')' => tokenizer.close(range, scope)?,
            _ => tokenizer.current().push_char(ch, range)?,
        }
    }

    tokenizer.finish(scope)
}
