//! # matcalc engine
//!
//! Turns expression text into [`Value`](matcalc_core::Value)s.
//!
//! ## Overview
//!
//! Evaluation runs in two stages:
//!
//! 1. The **tokenizer** reads the input once, splitting it into numbers and raw text and
//!    evaluating every parenthesized group as soon as its closing bracket is seen.
//! 2. The **reducer** takes one bracket level at a time and walks the [`Catalog`] tier by
//!    tier, from the tightest binding commands (variables, `[]`) down to assignment. Each
//!    command's literal text is marked in the remaining raw text and bound to the operands
//!    right next to it.
//!
//! Variables live in an [`Environment`]; [`Context`] provides layers that a [`Session`]
//! uses to make each evaluation all-or-nothing. Commands that need a user (reading or
//! generating a matrix) go through the [`Host`] trait.
//!
//! ## Example
//!
//! ```
//! use matcalc_engine::{evaluate, Context};
//! use matcalc_core::Value;
//!
//! let mut ctx = Context::new();
//! evaluate("a = 3", &mut ctx).unwrap();
//! assert_eq!(evaluate("$a * 2 + 1", &mut ctx).unwrap(), Some(Value::Number(7.0)));
//! ```

pub mod catalog;
pub mod environment;
pub mod error;
pub mod host;
pub mod pattern;
mod reducer;
pub mod session;
pub mod token;
mod tokenizer;

pub use catalog::{Catalog, Command};
pub use environment::{Context, Environment, LAST_RESULT};
pub use error::{EvalError, ParseError};
pub use host::{matrix_from_text, Detached, Evaluate, Host};
pub use pattern::{Arg, Args, OperandKind, Pattern, PatternError, Placeholder};
pub use rowan::{TextRange, TextSize};
pub use session::{evaluate, EvalOptions, Evaluator, Scope, Session};
