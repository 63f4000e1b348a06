//! Tree-wide settings.
//!
//! Loaded from YAML or JSON; every field has a default so a partial file
//! (or no file at all) is fine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;


/// 256-byte key buffer, minus its terminator.
pub const DEFAULT_MAX_KEY_LEN: usize = 255;


/// Settings shared by every subset in a [`ConfigTree`](crate::ConfigTree).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    /// Longest scope or qualified key, in bytes. Longer strings are
    /// truncated at the nearest char boundary below this limit.
    pub max_key_len: usize,
}

impl Default for TreeSettings {
    fn default() -> Self {
        TreeSettings {
            max_key_len: DEFAULT_MAX_KEY_LEN,
        }
    }
}

impl TreeSettings {
    /// Parse settings from a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: TreeSettings = serde_yaml::from_str(content)?;
        settings.validate()
    }

    /// Parse settings from a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self, SettingsError> {
        let settings: TreeSettings = serde_json::from_str(content)?;
        settings.validate()
    }

    /// Load settings from a file. `.json` files are read as JSON, anything
    /// else as YAML.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    fn validate(self) -> Result<Self, SettingsError> {
        if self.max_key_len == 0 {
            return Err(SettingsError::Invalid {
                field: "max_key_len",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(self)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_key_len_is_255() {
        assert_eq!(TreeSettings::default().max_key_len, 255);
    }

    #[test]
    fn yaml_overrides_field() {
        let s = TreeSettings::from_yaml_str("max_key_len: 64\n").unwrap();
        assert_eq!(s.max_key_len, 64);
    }

    #[test]
    fn empty_yaml_mapping_uses_defaults() {
        let s = TreeSettings::from_yaml_str("{}").unwrap();
        assert_eq!(s, TreeSettings::default());
    }

    #[test]
    fn json_parses() {
        let s = TreeSettings::from_json_str(r#"{"max_key_len": 32}"#).unwrap();
        assert_eq!(s.max_key_len, 32);
    }

    #[test]
    fn zero_length_rejected() {
        let err = TreeSettings::from_yaml_str("max_key_len: 0").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "max_key_len", .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = std::env::temp_dir().join(format!("scopeconf_settings_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let yaml = dir.join("tree.yaml");
        let json = dir.join("tree.json");
        std::fs::write(&yaml, "max_key_len: 100\n").unwrap();
        std::fs::write(&json, r#"{"max_key_len": 50}"#).unwrap();

        assert_eq!(TreeSettings::load(&yaml).unwrap().max_key_len, 100);
        assert_eq!(TreeSettings::load(&json).unwrap().max_key_len, 50);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = TreeSettings::load(Path::new("/nonexistent/scopeconf.yaml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
