use crate::catalog::Catalog;
use crate::environment::{Context, Environment, LAST_RESULT};
use crate::error::EvalError;
use crate::host::{Detached, Host};
use crate::tokenizer;
use matcalc_core::{Matrix, Value};
use serde::{Deserialize, Serialize};

/// Tunables of the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalOptions {
    /// Reduction passes allowed per bracket level before giving up.
    pub max_iterations: usize,
    /// Smallest non-zero magnitude that does not trigger the precision warning.
    pub warn_below: f64,
    /// Largest magnitude that does not trigger the precision warning.
    pub warn_above: f64,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            warn_below: 1e-4,
            warn_above: 1e3,
        }
    }
}

/// What a command can reach while it runs.
pub struct Scope<'a> {
    env: &'a mut dyn Environment,
    host: &'a mut dyn Host,
    catalog: &'a Catalog,
    options: &'a EvalOptions,
    warned: &'a mut bool,
}

impl<'a> Scope<'a> {
    pub fn environment(&mut self) -> &mut dyn Environment {
        &mut *self.env
    }

    /// Evaluates `source` against the same environment.
    pub fn evaluate(&mut self, source: &str) -> Result<Option<Value>, EvalError> {
        tokenizer::evaluate_source(self, source)
    }

    /// Asks the host for a hand-entered matrix.
    ///
    /// Entries are evaluated in the current environment, but cannot start another
    /// interactive command themselves. Errors from the entries carry no source range,
    /// since they do not point into the expression being evaluated.
    pub fn read_matrix(&mut self) -> Result<Matrix, EvalError> {
        let mut detached = Detached;
        let mut nested = Scope {
            env: &mut *self.env,
            host: &mut detached,
            catalog: self.catalog,
            options: self.options,
            warned: &mut *self.warned,
        };
        let matrix = self
            .host
            .read_matrix(&mut |text: &str| nested.evaluate(text))
            .map_err(EvalError::without_span)?;
        log::debug!("read a {} x {} matrix", matrix.rows(), matrix.cols());
        Ok(matrix)
    }

    /// Asks the host for a random matrix.
    pub fn random_matrix(&mut self) -> Result<Matrix, EvalError> {
        let mut detached = Detached;
        let mut nested = Scope {
            env: &mut *self.env,
            host: &mut detached,
            catalog: self.catalog,
            options: self.options,
            warned: &mut *self.warned,
        };
        let matrix = self
            .host
            .random_matrix(&mut |text: &str| nested.evaluate(text))
            .map_err(EvalError::without_span)?;
        log::debug!("generated a {} x {} matrix", matrix.rows(), matrix.cols());
        Ok(matrix)
    }

    pub(crate) fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub(crate) fn max_iterations(&self) -> usize {
        self.options.max_iterations
    }

    /// Raises the precision warning once per evaluator.
    pub(crate) fn warn_if_extreme(&mut self, value: &Value) {
        if *self.warned {
            return;
        }
        let checked = matches!(
            value,
            Value::Number(_) | Value::IdentityMatrix(_) | Value::Matrix(_)
        );
        let (low, high) = (self.options.warn_below, self.options.warn_above);
        if checked && value.is_extreme(low, high) {
            *self.warned = true;
            self.host.warn_extreme_magnitude(low, high);
        }
    }
}

/// Evaluates expressions; remembers whether the precision warning was already shown.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    options: EvalOptions,
    warned: bool,
}

impl Evaluator {
    pub fn new(options: EvalOptions) -> Self {
        Self {
            options,
            warned: false,
        }
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    pub fn has_warned(&self) -> bool {
        self.warned
    }

    pub fn evaluate(
        &mut self,
        source: &str,
        env: &mut dyn Environment,
        host: &mut dyn Host,
    ) -> Result<Option<Value>, EvalError> {
        let catalog = Catalog::standard()?;
        let mut scope = Scope {
            env,
            host,
            catalog,
            options: &self.options,
            warned: &mut self.warned,
        };
        scope.evaluate(source)
    }
}

/// Evaluates `source` with default options and no interactive host.
///
/// The result is `None` for input without a value, such as blank text or `()`. Assignments
/// are kept only when the whole evaluation succeeds. Unlike [`Session::run`], `_` is not
/// updated.
pub fn evaluate(source: &str, context: &mut Context) -> Result<Option<Value>, EvalError> {
    context.snapshot();
    let result = Evaluator::default().evaluate(source, context, &mut Detached);
    if result.is_ok() {
        context.save();
    } else {
        context.rollback();
    }
    result
}

/// A sequence of evaluations over one [`Context`].
///
/// Each [`Session::run`] happens in a snapshot of the variables: a successful evaluation
/// stores its result in `_` and keeps its assignments, a failed one leaves the variables
/// exactly as they were.
pub struct Session<H> {
    context: Context,
    evaluator: Evaluator,
    host: H,
}

impl<H: Host> Session<H> {
    pub fn new(host: H, options: EvalOptions) -> Self {
        Self {
            context: Context::new(),
            evaluator: Evaluator::new(options),
            host,
        }
    }

    pub fn run(&mut self, source: &str) -> Result<Option<Value>, EvalError> {
        self.context.snapshot();
        let result = self
            .evaluator
            .evaluate(source, &mut self.context, &mut self.host);
        match &result {
            Ok(value) => {
                self.context.set_variable(LAST_RESULT, value.clone());
                self.context.save();
            }
            Err(err) => {
                log::debug!("evaluation failed, discarding its changes: {}", err);
                self.context.rollback();
            }
        }
        result
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }
}
