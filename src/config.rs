use crate::error::ModelError;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};

/// Options for [`ModelReader`](crate::parser::ModelReader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReaderOptions {
    /// Files whose name starts with this prefix are left out of the index.
    pub hidden_prefix: String,
    /// Starting text for the name of a referring entity that has no name of
    /// its own, e.g. `"Entity with hrefs to: "`. Without it the composed
    /// name is just `file→name`.
    pub unnamed_reference_prefix: Option<String>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            hidden_prefix: ".".to_string(),
            unnamed_reference_prefix: None,
        }
    }
}

impl ReaderOptions {
    /// Load options from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Utf8Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path.as_std_path()).map_err(|source| ModelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ModelError::ConfigFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_hidden(&self, file_name: &str) -> bool {
        !self.hidden_prefix.is_empty() && file_name.starts_with(&self.hidden_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let opts: ReaderOptions =
            serde_json::from_str(r#"{"unnamedReferencePrefix": "Entity with hrefs to: "}"#).unwrap();
        assert_eq!(opts.hidden_prefix, ".");
        assert_eq!(opts.unnamed_reference_prefix.as_deref(), Some("Entity with hrefs to: "));
        assert!(opts.is_hidden(".DS_Store"));
        assert!(!opts.is_hidden("default.repository"));
    }
}
