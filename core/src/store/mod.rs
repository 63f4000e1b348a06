//! The shared item table behind every subset.
//!
//! The subset layer only talks to the table through [`ItemStore`]; the
//! in-memory [`MemoryStore`] is the implementation used by default.

pub mod memory;

pub use memory::{ItemDef, ItemKind, MemoryStore};

use bitflags::bitflags;
use serde_json::Value;

use crate::error::StoreError;


/// Native item values. `serde_json::Value` covers every item kind.
pub type StoreValue = Value;


/// Handle to one item in a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) usize);

impl ItemId {
    pub fn index(self) -> usize {
        self.0
    }
}


bitflags! {
    /// Type flags carried by every item.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ItemFlags: u8 {
        /// Scoped copy of an ancestor item, linked to it.
        const INHERITED = 1 << 0;
    }
}


/// Outcome of a successful write or reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetStatus {
    /// The stored value changed.
    Changed,
    /// The write was accepted but the value was already current.
    NoChange,
}

impl SetStatus {
    pub fn is_change(self) -> bool {
        matches!(self, SetStatus::Changed)
    }
}


/// Keyed table of configuration items, addressed by fully-qualified name.
pub trait ItemStore {
    /// Exact lookup; never creates.
    fn lookup_exact(&self, key: &str) -> Option<ItemId>;

    /// Qualified name of an item.
    fn key(&self, item: ItemId) -> Option<&str>;

    fn flags(&self, item: ItemId) -> Option<ItemFlags>;

    /// The item an inherited item is linked to. `None` for root items.
    fn inherits_from(&self, item: ItemId) -> Option<ItemId>;

    /// Whether an inherited item carries a value of its own rather than
    /// following its parent. Always `false` for root items.
    fn is_overridden(&self, item: ItemId) -> bool;

    fn native_get(&self, item: ItemId) -> Result<StoreValue, StoreError>;

    fn native_set(&mut self, item: ItemId, value: StoreValue) -> Result<SetStatus, StoreError>;

    fn string_get(&self, item: ItemId) -> Result<String, StoreError>;

    fn string_set(&mut self, item: ItemId, value: &str) -> Result<SetStatus, StoreError>;

    /// Return an item to its parent's value, or its initial value if it
    /// has no parent.
    fn reset(&mut self, item: ItemId) -> Result<SetStatus, StoreError>;

    /// Register a new inherited copy of `parent` under `key`.
    fn create_inherited(&mut self, parent: ItemId, key: &str) -> Result<ItemId, StoreError>;

    /// Drop the inherited item at `key`. Anything else is left alone.
    fn remove_inherited(&mut self, key: &str);

    /// Every key currently in the table, in order.
    fn snapshot_keys(&self) -> Vec<String>;
}
