use anyhow::Context as _;
use matcalc_engine::EvalOptions;
use std::path::{Path, PathBuf};

/// Returns the default config file path: `<config_dir>/matcalc/config.json`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("matcalc").join("config.json"))
}

/// Reads evaluator options.
///
/// An explicitly given file has to exist and parse. The default file is optional: when it
/// is missing or broken the built-in defaults are used.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<EvalOptions> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        let options = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {:?}", path))?;
        log::debug!("Loaded options from {:?}", path);
        return Ok(options);
    }

    Ok(default_path()
        .and_then(|path| load_from_path(&path))
        .unwrap_or_default())
}

fn load_from_path(path: &Path) -> Option<EvalOptions> {
    if path.exists() {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<EvalOptions>(&content) {
                Ok(options) => {
                    log::debug!("Loaded options from {:?}", path);
                    return Some(options);
                }
                Err(e) => log::warn!("Failed to parse config {:?}: {}", path, e),
            },
            Err(e) => log::warn!("Failed to read config {:?}: {}", path, e),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"warn_above": 1e6}"#).unwrap();

        let options = load(Some(&path)).unwrap();
        assert_eq!(options.warn_above, 1e6);
        assert_eq!(options.max_iterations, EvalOptions::default().max_iterations);
    }

    #[test]
    fn test_explicit_config_must_be_valid() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&temp_dir.path().join("missing.json"))).is_err());

        let broken = temp_dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(load(Some(&broken)).is_err());
    }

    #[test]
    fn test_broken_default_file_is_ignored() {
        let temp_dir = tempfile::tempdir().unwrap();
        let broken = temp_dir.path().join("config.json");
        std::fs::write(&broken, "[]").unwrap();
        assert!(load_from_path(&broken).is_none());
        assert!(load_from_path(&temp_dir.path().join("missing.json")).is_none());
    }
}
