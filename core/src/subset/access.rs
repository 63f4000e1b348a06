//! Get, set and reset through a subset.
//!
//! Every write that actually changes a value raises one `ConfigSet` event
//! on the subset's channel. Writes the store reports as no-change raise
//! nothing.

use super::resolve::check_name;
use super::tree::{ConfigTree, SubsetId};
use crate::error::{ConfigError, Result};
use crate::notify::{EventConfig, EventKind};
use crate::store::{ItemId, ItemStore, SetStatus, StoreValue};


impl<S: ItemStore> ConfigTree<S> {
    /// Native value of an already-resolved item.
    pub fn native_get(&self, subset: SubsetId, item: ItemId) -> Result<StoreValue> {
        self.check_item(subset, item)?;
        Ok(self.store.native_get(item)?)
    }

    /// Native value of `name` as seen from `subset`.
    ///
    /// Looks at `subset`'s own scope, then each ancestor's, and returns the
    /// first hit. Read-only: nothing is materialized. `None` when no scope
    /// up to the root defines the item.
    pub fn native_get_by_name(&self, subset: SubsetId, name: &str) -> Result<Option<StoreValue>> {
        self.node(subset)?;
        check_name(name)?;
        for node in self.chain(subset) {
            if let Some(item) = self.store.lookup_exact(&self.qualify(node, name)) {
                return Ok(Some(self.store.native_get(item)?));
            }
        }
        Ok(None)
    }

    pub fn native_set(&mut self, subset: SubsetId, item: ItemId, value: StoreValue) -> Result<SetStatus> {
        self.check_item(subset, item)?;
        let status = self.store.native_set(item, value)?;
        self.announce(subset, item, status);
        Ok(status)
    }

    /// Set `name` at `subset`'s scope, materializing the inherited item
    /// first if this scope has never overridden it.
    pub fn native_set_by_name(&mut self, subset: SubsetId, name: &str, value: StoreValue) -> Result<SetStatus> {
        let item = self
            .create_var(subset, name)?
            .ok_or_else(|| ConfigError::Unresolved(name.to_string()))?;
        self.native_set(subset, item, value)
    }

    pub fn string_get(&self, subset: SubsetId, item: ItemId) -> Result<String> {
        self.check_item(subset, item)?;
        Ok(self.store.string_get(item)?)
    }

    pub fn string_set(&mut self, subset: SubsetId, item: ItemId, value: &str) -> Result<SetStatus> {
        self.check_item(subset, item)?;
        let status = self.store.string_set(item, value)?;
        self.announce(subset, item, status);
        Ok(status)
    }

    /// Return `item` to its parent's (or initial) value. Emits nothing;
    /// whatever the store does on reset is all that happens.
    pub fn reset(&mut self, subset: SubsetId, item: ItemId) -> Result<SetStatus> {
        self.check_item(subset, item)?;
        Ok(self.store.reset(item)?)
    }

    // -------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------

    fn check_item(&self, subset: SubsetId, item: ItemId) -> Result<()> {
        self.node(subset)?;
        if self.store.key(item).is_none() {
            return Err(ConfigError::InvalidArgument("unknown item"));
        }
        Ok(())
    }

    fn announce(&mut self, subset: SubsetId, item: ItemId, status: SetStatus) {
        if !status.is_change() {
            return;
        }
        let Some(notifier) = self.subset(subset).map(|n| n.notifier()) else {
            return;
        };
        let Some(canonical_key) = self.canonical_key(item) else {
            return;
        };
        let event = EventConfig { subset, canonical_key, item };
        self.notify.send(notifier, EventKind::ConfigSet, &event);
    }
}
