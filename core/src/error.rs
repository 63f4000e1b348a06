//! Error types for the store, the subset layer and settings loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::ItemId;
use crate::subset::SubsetId;


/// Result alias used throughout the subset layer.
pub type Result<T> = std::result::Result<T, ConfigError>;


/// Failures reported by an [`ItemStore`](crate::store::ItemStore).
///
/// The display text is the human-readable message a caller would show
/// next to the failing command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("no such config item: {0:?}")]
    NoSuchItem(ItemId),

    #[error("config item already exists: {0}")]
    Duplicate(String),

    #[error("type mismatch for '{key}': expected {expected}, got {got}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },

    #[error("value for '{key}' out of range: {value} not in {min}..={max}")]
    OutOfRange {
        key: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// An inherited item whose ancestor has already been removed.
    #[error("inherited item '{0}' has lost its parent")]
    DanglingParent(String),
}


/// Failures reported by the subset layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown subset: {0:?}")]
    UnknownSubset(SubsetId),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// No subset up to the root defines the named item.
    #[error("unknown config item: {0}")]
    Unresolved(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A dump could not be rendered.
    #[error("cannot render dump: {0}")]
    Render(String),
}


/// Failures while loading [`TreeSettings`](crate::settings::TreeSettings).
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid setting {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}
