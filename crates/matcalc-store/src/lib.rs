use matcalc_core::Value;
use matcalc_engine::{Context, Environment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Named values written to and read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VariableStore {
    pub variables: BTreeMap<String, Value>,
}

/// Variables picked out of a store or an environment, with the names that were asked for
/// but not found.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pub store: VariableStore,
    pub missing: Vec<String>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Copies variables out of `context`: the listed names, or every visible variable when
    /// `names` is empty.
    pub fn capture(context: &Context, names: &[String]) -> Selection {
        let wanted = if names.is_empty() {
            context.list_variables()
        } else {
            names.to_vec()
        };

        let mut selection = Selection::default();
        for name in wanted {
            match context.get_variable(&name) {
                Ok(value) => selection.store.insert(name, value),
                Err(_) => selection.missing.push(name),
            }
        }
        selection
    }

    /// The listed variables of this store, or all of them when `names` is empty.
    pub fn select(self, names: &[String]) -> Selection {
        if names.is_empty() {
            return Selection {
                store: self,
                missing: Vec::new(),
            };
        }

        let mut variables = self.variables;
        let mut selection = Selection::default();
        for name in names {
            match variables.remove(name) {
                Some(value) => selection.store.insert(name.clone(), value),
                None => selection.missing.push(name.clone()),
            }
        }
        selection
    }

    /// Binds every stored variable in `env`, replacing existing bindings.
    pub fn restore(self, env: &mut dyn Environment) {
        for (name, value) in self.variables {
            env.set_variable(&name, Some(value));
        }
    }

    /// Returns the default store file: `<data_dir>/matcalc/variables.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("matcalc").join("variables.json"))
    }

    pub fn save_to_path(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Saved {} variables to {:?}", self.len(), path);
        Ok(())
    }

    pub fn load_from_path(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let store = serde_json::from_str::<VariableStore>(&content).map_err(|e| {
            log::warn!("Failed to parse {:?}: {}", path, e);
            std::io::Error::new(std::io::ErrorKind::InvalidData, e)
        })?;
        log::info!("Loaded {} variables from {:?}", store.len(), path);
        Ok(store)
    }
}
