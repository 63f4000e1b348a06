//! Finding and materializing inherited items along the subset chain.

use tracing::trace;

use super::tree::{ConfigTree, SubsetId};
use crate::error::{ConfigError, Result};
use crate::store::{ItemFlags, ItemId, ItemStore};


impl<S: ItemStore> ConfigTree<S> {
    /// Find the item `name` defined exactly at `subset`'s scope.
    ///
    /// Never creates anything and never looks at ancestors.
    pub fn lookup(&self, subset: SubsetId, name: &str) -> Result<Option<ItemId>> {
        let node = self.node(subset)?;
        check_name(name)?;
        Ok(self.store.lookup_exact(&self.qualify(node, name)))
    }

    /// Make sure `name` exists at `subset`'s scope, creating inherited
    /// copies as needed.
    ///
    /// Walks up from `subset` to the nearest ancestor that defines the
    /// item, then creates a copy at every scope in between, top-down, each
    /// linked to the copy one level up. Returns `None` when no scope up to
    /// the root defines it. Idempotent.
    pub fn create_var(&mut self, subset: SubsetId, name: &str) -> Result<Option<ItemId>> {
        self.node(subset)?;
        check_name(name)?;

        let mut missing = Vec::new();
        let mut found = None;
        for node in self.chain(subset) {
            let key = self.qualify(node, name);
            if let Some(item) = self.store.lookup_exact(&key) {
                found = Some(item);
                break;
            }
            missing.push(key);
        }

        let Some(mut item) = found else {
            return Ok(None);
        };
        for key in missing.into_iter().rev() {
            // unnamed subsets share their parent's keys
            if let Some(existing) = self.store.lookup_exact(&key) {
                item = existing;
                continue;
            }
            item = self.store.create_inherited(item, &key)?;
            trace!(key = %key, "inherited item created");
        }
        Ok(Some(item))
    }

    /// Key of the non-inherited item at the end of `item`'s inheritance
    /// chain. `None` if `item` is not in the store.
    pub fn canonical_key(&self, item: ItemId) -> Option<String> {
        let mut current = item;
        while self
            .store
            .flags(current)
            .is_some_and(|f| f.contains(ItemFlags::INHERITED))
        {
            match self.store.inherits_from(current) {
                Some(parent) if self.store.key(parent).is_some() => current = parent,
                _ => break,
            }
        }
        self.store.key(current).map(str::to_string)
    }
}


pub(crate) fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ConfigError::InvalidArgument("empty item name"));
    }
    Ok(())
}
