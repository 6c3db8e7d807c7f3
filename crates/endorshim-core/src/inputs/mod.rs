pub mod action;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use action::{ActionInputs, Auth};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Input '{key}' does not meet YAML 1.2 \"Core Schema\" specification: {value}\nSupport boolean input list: `true | True | TRUE | false | False | FALSE`")]
    InvalidBoolean { key: String, value: String },

    #[error("Failed to read inputs file '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse inputs file '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Input '{key}' in '{}' must be a string, boolean or integer", path.display())]
    UnsupportedValue { path: PathBuf, key: String },
}

/// A flat source of action inputs. Keys are the action's input names.
pub trait InputSource {
    /// Raw value, `None` when the source does not define the key.
    fn get(&self, key: &str) -> Option<String>;
}

/// Inputs handed to the step as `INPUT_<KEY>` variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvInputs;

impl EnvInputs {
    pub fn variable_name(key: &str) -> String {
        format!("INPUT_{}", key.replace(' ', "_").to_uppercase())
    }
}

impl InputSource for EnvInputs {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(Self::variable_name(key)).ok()
    }
}

/// In-memory inputs, loaded from a TOML table or built in tests.
#[derive(Debug, Clone, Default)]
pub struct MapInputs {
    values: HashMap<String, String>,
}

impl MapInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Load a flat TOML table of strings, booleans and integers.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let content = std::fs::read_to_string(path).map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    fn from_toml(content: &str, path: &Path) -> Result<Self, InputError> {
        let table: toml::Table = content.parse().map_err(|e: toml::de::Error| InputError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut values = HashMap::new();
        for (key, value) in table {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Integer(i) => i.to_string(),
                _ => {
                    return Err(InputError::UnsupportedValue {
                        path: path.to_path_buf(),
                        key,
                    })
                }
            };
            values.insert(key, text);
        }
        Ok(Self { values })
    }
}

impl InputSource for MapInputs {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Sources consulted in order; the first that defines a key wins.
#[derive(Default)]
pub struct LayeredInputs {
    layers: Vec<Box<dyn InputSource>>,
}

impl LayeredInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, source: impl InputSource + 'static) -> Self {
        self.layers.push(Box::new(source));
        self
    }
}

impl InputSource for LayeredInputs {
    fn get(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }
}

/// Trimmed value of `key`, or `None` when missing or blank.
pub fn read(source: &dyn InputSource, key: &str) -> Option<String> {
    source
        .get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// YAML 1.2 core schema booleans. `None` for anything else.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_core_schema() {
        for value in ["true", "True", "TRUE"] {
            assert_eq!(parse_bool(value), Some(true));
        }
        for value in ["false", "False", "FALSE"] {
            assert_eq!(parse_bool(value), Some(false));
        }
        for value in ["yes", "1", "tRue", "on", ""] {
            assert_eq!(parse_bool(value), None, "{value}");
        }
    }

    #[test]
    fn test_env_variable_name() {
        assert_eq!(EnvInputs::variable_name("api_key"), "INPUT_API_KEY");
        assert_eq!(EnvInputs::variable_name("log level"), "INPUT_LOG_LEVEL");
    }

    #[test]
    fn test_read_trims_and_drops_blank() {
        let inputs = MapInputs::new().with("namespace", "  acme  ").with("tags", "   ");
        assert_eq!(read(&inputs, "namespace").as_deref(), Some("acme"));
        assert_eq!(read(&inputs, "tags"), None);
        assert_eq!(read(&inputs, "missing"), None);
    }

    #[test]
    fn test_layers_first_hit_wins() {
        let inputs = LayeredInputs::new()
            .push(MapInputs::new().with("namespace", "from-file"))
            .push(MapInputs::new().with("namespace", "from-env").with("api_key", "k"));

        assert_eq!(inputs.get("namespace").as_deref(), Some("from-file"));
        assert_eq!(inputs.get("api_key").as_deref(), Some("k"));
        assert_eq!(inputs.get("api_secret"), None);
    }

    #[test]
    fn test_load_toml_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inputs.toml");
        std::fs::write(
            &path,
            "namespace = \"acme\"\nscan_secrets = true\nendorctl_version = \"v1.2.3\"\nretries = 3\n",
        )
        .unwrap();

        let inputs = MapInputs::load(&path).unwrap();
        assert_eq!(inputs.get("namespace").as_deref(), Some("acme"));
        assert_eq!(inputs.get("scan_secrets").as_deref(), Some("true"));
        assert_eq!(inputs.get("retries").as_deref(), Some("3"));
    }

    #[test]
    fn test_load_rejects_nested_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inputs.toml");
        std::fs::write(&path, "[auth]\napi_key = \"k\"\n").unwrap();

        let err = MapInputs::load(&path).unwrap_err();
        assert!(matches!(err, InputError::UnsupportedValue { ref key, .. } if key == "auth"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = MapInputs::load(Path::new("/nonexistent/inputs.toml")).unwrap_err();
        assert!(matches!(err, InputError::Read { .. }));
    }
}
