//! # matcalc core
//!
//! Values and numeric kernels for the matcalc expression engine.
//!
//! ## Overview
//!
//! - [`Value`] is the closed set of things an expression can evaluate to: plain numbers,
//!   scaled identity matrices of unspecified size, dense matrices, lists and solutions of
//!   linear systems.
//! - [`algebra`] defines the operators over pairs of values.
//! - [`gauss`] implements Gauss–Jordan elimination and the operations built on it
//!   (canonical form, inverse, determinant, trace, solve).
//! - [`grid`] turns any value into a table of display cells.
//!
//! ## Example
//!
//! ```
//! use matcalc_core::{Matrix, Value};
//!
//! let a = Value::Matrix(Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap());
//! let doubled = a.add(&a).unwrap();
//! assert_eq!(doubled, a.multiply(&Value::Number(2.0)).unwrap());
//! ```

pub mod algebra;
pub mod error;
pub mod gauss;
pub mod grid;
pub mod matrix;
pub mod solution;
pub mod value;

pub use error::{ComputationError, CoreError, Result};
pub use gauss::{Gauss, GaussResult, ZERO_TOLERANCE};
pub use grid::{format_number, Grid, GridStyle};
pub use matrix::Matrix;
pub use solution::{Solution, SolutionSet};
pub use value::{Value, ValueKind};
