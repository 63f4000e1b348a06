//! Hierarchical configuration subsets.
//!
//! A [`ConfigTree`] holds one shared item table and a tree of named
//! subsets. Each subset is a scoped view over that table: reads fall back
//! to ancestor scopes, writes materialize inherited copies on demand, and
//! every real change is announced on the subset's notification channel.

pub mod error;
pub mod notify;
pub mod settings;
pub mod store;
pub mod subset;

pub use error::{ConfigError, SettingsError, StoreError};
pub use notify::{Event, EventConfig, EventKind, NotifierId, NotifyHub, ObserverId};
pub use settings::TreeSettings;
pub use store::{ItemDef, ItemFlags, ItemId, ItemKind, ItemStore, MemoryStore, SetStatus, StoreValue};
pub use subset::{ConfigTree, DumpEntry, SubsetId, SubsetNode};
