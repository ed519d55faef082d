use crate::error::EvalError;
use matcalc_core::{ComputationError, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Name of the variable holding the last result.
pub const LAST_RESULT: &str = "_";

/// Variable storage seen by the evaluator.
pub trait Environment {
    /// Fails with a computation error when `name` is not bound.
    fn get_variable(&self, name: &str) -> Result<Value, EvalError>;
    /// Binds `name`, or removes the binding when `value` is `None`.
    fn set_variable(&mut self, name: &str, value: Option<Value>);
}

/// Layered variables with transactional updates.
///
/// [`Context::snapshot`] opens a layer on top of the current ones. Reads fall through the
/// layers from the top; writes, including removals, only touch the top layer until
/// [`Context::save`] folds it into the layer below or [`Context::rollback`] drops it.
#[derive(Debug, Clone)]
pub struct Context {
    /// `None` entries are removals that hide a binding from a lower layer.
    layers: Vec<BTreeMap<String, Option<Value>>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            layers: vec![BTreeMap::new()],
        }
    }

    /// Number of open layers, the base layer included.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn snapshot(&mut self) {
        self.layers.push(BTreeMap::new());
    }

    /// Folds the top layer into the one below. Does nothing on the base layer.
    pub fn save(&mut self) {
        if self.layers.len() < 2 {
            return;
        }
        let Some(top) = self.layers.pop() else {
            return;
        };
        let base = self.layers.len() == 1;
        if let Some(below) = self.layers.last_mut() {
            for (name, value) in top {
                match value {
                    None if base => {
                        below.remove(&name);
                    }
                    value => {
                        below.insert(name, value);
                    }
                }
            }
        }
    }

    /// Drops the top layer and everything written to it. Does nothing on the base layer.
    pub fn rollback(&mut self) {
        if self.layers.len() > 1 {
            self.layers.pop();
        }
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.get(name))
            .and_then(Option::as_ref)
    }

    /// Visible variable names in sorted order, without the last-result variable.
    pub fn list_variables(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for layer in &self.layers {
            for (name, value) in layer {
                if value.is_some() {
                    names.insert(name.as_str());
                } else {
                    names.remove(name.as_str());
                }
            }
        }
        names
            .into_iter()
            .filter(|name| *name != LAST_RESULT)
            .map(str::to_string)
            .collect()
    }
}

impl Environment for Context {
    fn get_variable(&self, name: &str) -> Result<Value, EvalError> {
        self.lookup(name)
            .cloned()
            .ok_or_else(|| ComputationError::new(format!("no such variable: `{}`", name)).into())
    }

    fn set_variable(&mut self, name: &str, value: Option<Value>) {
        let base = self.layers.len() == 1;
        let Some(top) = self.layers.last_mut() else {
            return;
        };
        match value {
            None if base => {
                top.remove(name);
            }
            value => {
                top.insert(name.to_string(), value);
            }
        }
    }
}
