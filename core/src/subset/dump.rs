//! Listing the items that live under a subset's scope.

use serde::{Deserialize, Serialize};

use super::scope;
use super::tree::{ConfigTree, SubsetId};
use crate::error::{ConfigError, Result};
use crate::store::{ItemFlags, ItemStore};


/// One row of a scope dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpEntry {
    pub key: String,
    pub value: String,
    pub inherited: bool,
    /// Set locally instead of following the parent item.
    pub overridden: bool,
    /// Key of the root item this one ultimately inherits from.
    pub canonical_key: String,
}


impl<S: ItemStore> ConfigTree<S> {
    /// Every item under `subset`'s scope, sorted by key. An unnamed
    /// subset's scope covers the whole store. Items whose value cannot be
    /// read are skipped.
    pub fn dump_scope(&self, subset: SubsetId) -> Result<Vec<DumpEntry>> {
        let node = self.node(subset)?;
        let prefix = if node.scope().is_empty() {
            String::new()
        } else {
            scope::prefix(node.scope())
        };

        let mut entries = Vec::new();
        for key in self.store.snapshot_keys() {
            if !key.starts_with(&prefix) {
                continue;
            }
            let Some(item) = self.store.lookup_exact(&key) else {
                continue;
            };
            let Ok(value) = self.store.string_get(item) else {
                continue;
            };
            let inherited = self
                .store
                .flags(item)
                .is_some_and(|f| f.contains(ItemFlags::INHERITED));
            let overridden = self.store.is_overridden(item);
            let canonical_key = self.canonical_key(item).unwrap_or_else(|| key.clone());
            entries.push(DumpEntry { key, value, inherited, overridden, canonical_key });
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// [`dump_scope`](Self::dump_scope) rendered as a YAML sequence.
    pub fn dump_scope_yaml(&self, subset: SubsetId) -> Result<String> {
        let entries = self.dump_scope(subset)?;
        serde_yaml::to_string(&entries).map_err(|e| ConfigError::Render(e.to_string()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ItemDef, MemoryStore};
    use serde_json::json;

    fn tree() -> (ConfigTree, SubsetId, SubsetId) {
        let mut t = ConfigTree::new(MemoryStore::new());
        t.store_mut().register("timeout", ItemDef::number(30)).unwrap();
        t.store_mut().register("beep", ItemDef::bool(true)).unwrap();
        let root = t.create_subset(None, None, None).unwrap();
        let acct = t.create_subset(Some("acct1"), Some(root), None).unwrap();
        (t, root, acct)
    }

    #[test]
    fn dump_named_scope() {
        let (mut t, _, acct) = tree();
        t.native_set_by_name(acct, "timeout", json!(60)).unwrap();
        t.create_var(acct, "beep").unwrap();

        let rows = t.dump_scope(acct).unwrap();
        assert_eq!(
            rows,
            vec![
                DumpEntry {
                    key: "acct1:beep".into(),
                    value: "yes".into(),
                    inherited: true,
                    overridden: false,
                    canonical_key: "beep".into(),
                },
                DumpEntry {
                    key: "acct1:timeout".into(),
                    value: "60".into(),
                    inherited: true,
                    overridden: true,
                    canonical_key: "timeout".into(),
                },
            ]
        );
    }

    #[test]
    fn dump_root_covers_everything() {
        let (mut t, root, acct) = tree();
        t.create_var(acct, "timeout").unwrap();
        let keys: Vec<String> = t.dump_scope(root).unwrap().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["acct1:timeout", "beep", "timeout"]);
    }

    #[test]
    fn dump_ignores_sibling_with_shared_prefix() {
        let (mut t, root, acct) = tree();
        let other = t.create_subset(Some("acct10"), Some(root), None).unwrap();
        t.create_var(other, "timeout").unwrap();
        assert!(t.dump_scope(acct).unwrap().is_empty());
    }

    #[test]
    fn yaml_dump_marks_overridden_rows() {
        let (mut t, _, acct) = tree();
        t.native_set_by_name(acct, "timeout", json!(60)).unwrap();
        t.create_var(acct, "beep").unwrap();

        let yaml = t.dump_scope_yaml(acct).unwrap();
        let rows: Vec<DumpEntry> = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].overridden, "acct1:beep only follows its parent");
        assert!(rows[1].overridden, "acct1:timeout has its own value");
        assert!(yaml.contains("key: acct1:timeout"));
        assert!(yaml.contains("overridden: true"));
        assert!(yaml.contains("overridden: false"));
    }

    #[test]
    fn yaml_dump_of_unknown_subset_fails() {
        let (mut t, _, acct) = tree();
        t.destroy_subset(acct).unwrap();
        assert_eq!(t.dump_scope_yaml(acct), Err(ConfigError::UnknownSubset(acct)));
    }
}
