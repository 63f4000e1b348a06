//! Subset nodes and the tree that owns them.

use tracing::debug;

use super::scope;
use crate::error::{ConfigError, Result};
use crate::notify::{NotifierId, NotifyHub};
use crate::settings::TreeSettings;
use crate::store::{ItemFlags, ItemStore, MemoryStore};


/// Handle to a subset in a [`ConfigTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubsetId(usize);

impl SubsetId {
    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        SubsetId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}


/// One scope in the namespace tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetNode {
    name: Option<String>,
    scope: String,
    parent: Option<SubsetId>,
    notifier: NotifierId,
}

impl SubsetNode {
    /// Local, unqualified name. `None` for an unnamed (root) subset.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Fully-qualified scope; empty for an unnamed subset.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn parent(&self) -> Option<SubsetId> {
        self.parent
    }

    /// The subset's own notification channel.
    pub fn notifier(&self) -> NotifierId {
        self.notifier
    }
}


/// A shared item store plus every subset viewing it.
///
/// Parent links are plain handles: a subset never keeps its parent alive.
/// Subset slots are not reused, so the handle of a destroyed subset stays
/// invalid for the life of the tree.
#[derive(Debug)]
pub struct ConfigTree<S: ItemStore = MemoryStore> {
    pub(crate) store: S,
    pub(crate) subsets: Vec<Option<SubsetNode>>,
    pub(crate) notify: NotifyHub,
    pub(crate) settings: TreeSettings,
}

impl<S: ItemStore> ConfigTree<S> {
    pub fn new(store: S) -> Self {
        Self::with_settings(store, TreeSettings::default())
    }

    pub fn with_settings(store: S, settings: TreeSettings) -> Self {
        ConfigTree {
            store,
            subsets: Vec::new(),
            notify: NotifyHub::new(),
            settings,
        }
    }

    /// Create a subset.
    ///
    /// `parent` is the scope to inherit from; `notify_parent` is where the
    /// new subset's channel forwards events. The two are independent.
    /// Empty names count as absent.
    pub fn create_subset(
        &mut self,
        name: Option<&str>,
        parent: Option<SubsetId>,
        notify_parent: Option<NotifierId>,
    ) -> Result<SubsetId> {
        let parent_scope = match parent {
            Some(p) => Some(self.node(p)?.scope.as_str()),
            None => None,
        };
        let name = name.filter(|n| !n.is_empty());
        let scope = match name {
            Some(n) => scope::compose(parent_scope, n, self.settings.max_key_len),
            None => String::new(),
        };

        let notifier = self.notify.channel_new(notify_parent);
        let id = SubsetId(self.subsets.len());
        debug!(subset = id.0, scope = %scope, "subset created");
        self.subsets.push(Some(SubsetNode {
            name: name.map(str::to_string),
            scope,
            parent,
            notifier,
        }));
        Ok(id)
    }

    /// Destroy a subset.
    ///
    /// Every inherited item under the subset's scope is removed from the
    /// store first; items of the parent and sibling scopes are untouched.
    /// Returns how many items were swept. The scan visits every key in the
    /// store.
    pub fn destroy_subset(&mut self, id: SubsetId) -> Result<usize> {
        let node = self
            .subsets
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(ConfigError::UnknownSubset(id))?;

        let mut swept = 0;
        if node.name.is_some() {
            let prefix = scope::prefix(&node.scope);
            for key in self.store.snapshot_keys() {
                if !key.starts_with(&prefix) {
                    continue;
                }
                let inherited = self
                    .store
                    .lookup_exact(&key)
                    .and_then(|item| self.store.flags(item))
                    .is_some_and(|f| f.contains(ItemFlags::INHERITED));
                if inherited {
                    self.store.remove_inherited(&key);
                    swept += 1;
                }
            }
        }

        self.notify.channel_free(node.notifier);
        debug!(subset = id.0, scope = %node.scope, swept, "subset destroyed");
        Ok(swept)
    }

    /// Look up a live subset.
    pub fn subset(&self, id: SubsetId) -> Option<&SubsetNode> {
        self.subsets.get(id.0).and_then(|s| s.as_ref())
    }

    /// All live subsets, in creation order.
    pub fn subsets(&self) -> impl Iterator<Item = (SubsetId, &SubsetNode)> {
        self.subsets
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|n| (SubsetId(i), n)))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn notify(&self) -> &NotifyHub {
        &self.notify
    }

    pub fn notify_mut(&mut self) -> &mut NotifyHub {
        &mut self.notify
    }

    pub fn settings(&self) -> &TreeSettings {
        &self.settings
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // -------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------

    pub(crate) fn node(&self, id: SubsetId) -> Result<&SubsetNode> {
        self.subset(id).ok_or(ConfigError::UnknownSubset(id))
    }

    /// The subset and its live ancestors, nearest first. A destroyed
    /// ancestor ends the walk.
    pub(crate) fn chain(&self, id: SubsetId) -> impl Iterator<Item = &SubsetNode> {
        std::iter::successors(self.subset(id), move |n| n.parent.and_then(|p| self.subset(p)))
    }

    pub(crate) fn qualify(&self, node: &SubsetNode, name: &str) -> String {
        scope::qualify(&node.scope, name, self.settings.max_key_len)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ItemDef, MemoryStore};

    fn tree() -> ConfigTree {
        ConfigTree::new(MemoryStore::new())
    }

    #[test]
    fn root_has_empty_scope() {
        let mut t = tree();
        let root = t.create_subset(None, None, None).unwrap();
        let node = t.subset(root).unwrap();
        assert_eq!(node.name(), None);
        assert_eq!(node.scope(), "");
        assert_eq!(node.parent(), None);
    }

    #[test]
    fn scope_composes_from_parent() {
        let mut t = tree();
        let root = t.create_subset(None, None, None).unwrap();
        let acct = t.create_subset(Some("acct1"), Some(root), None).unwrap();
        let inbox = t.create_subset(Some("inbox"), Some(acct), None).unwrap();
        assert_eq!(t.subset(acct).unwrap().scope(), "acct1");
        assert_eq!(t.subset(inbox).unwrap().scope(), "acct1:inbox");
        assert_eq!(t.subset(inbox).unwrap().name(), Some("inbox"));
        assert_eq!(t.subset(inbox).unwrap().parent(), Some(acct));
    }

    #[test]
    fn empty_name_is_unnamed() {
        let mut t = tree();
        let s = t.create_subset(Some(""), None, None).unwrap();
        assert_eq!(t.subset(s).unwrap().name(), None);
        assert_eq!(t.subset(s).unwrap().scope(), "");
    }

    #[test]
    fn scope_respects_configured_limit() {
        let mut t = ConfigTree::with_settings(MemoryStore::new(), TreeSettings { max_key_len: 8 });
        let a = t.create_subset(Some("account"), None, None).unwrap();
        let b = t.create_subset(Some("inbox"), Some(a), None).unwrap();
        assert_eq!(t.subset(b).unwrap().scope(), "account:");
    }

    #[test]
    fn stale_parent_rejected() {
        let mut t = tree();
        let a = t.create_subset(Some("a"), None, None).unwrap();
        t.destroy_subset(a).unwrap();
        assert_eq!(
            t.create_subset(Some("b"), Some(a), None).unwrap_err(),
            ConfigError::UnknownSubset(a)
        );
    }

    #[test]
    fn notifier_parent_is_caller_supplied() {
        let mut t = tree();
        let app = t.notify_mut().channel_new(None);
        let root = t.create_subset(None, None, None).unwrap();
        let acct = t.create_subset(Some("acct1"), Some(root), Some(app)).unwrap();

        let acct_notifier = t.subset(acct).unwrap().notifier();
        let root_notifier = t.subset(root).unwrap().notifier();
        assert_eq!(t.notify().parent(acct_notifier), Some(app));
        assert_ne!(t.notify().parent(acct_notifier), Some(root_notifier));
    }

    #[test]
    fn destroy_frees_notifier_and_handle() {
        let mut t = tree();
        let a = t.create_subset(Some("a"), None, None).unwrap();
        let notifier = t.subset(a).unwrap().notifier();
        assert_eq!(t.destroy_subset(a).unwrap(), 0);
        assert!(t.subset(a).is_none());
        assert!(!t.notify().contains(notifier));
        assert_eq!(t.destroy_subset(a).unwrap_err(), ConfigError::UnknownSubset(a));
    }

    #[test]
    fn destroy_root_skips_sweep() {
        let mut t = tree();
        let timeout = t.store_mut().register("timeout", ItemDef::number(30)).unwrap();
        t.store_mut().create_inherited(timeout, "x:timeout").unwrap();
        let root = t.create_subset(None, None, None).unwrap();
        assert_eq!(t.destroy_subset(root).unwrap(), 0);
        assert_eq!(t.store().len(), 2);
    }

    #[test]
    fn subsets_lists_live_nodes() {
        let mut t = tree();
        let a = t.create_subset(Some("a"), None, None).unwrap();
        let b = t.create_subset(Some("b"), None, None).unwrap();
        t.destroy_subset(a).unwrap();
        let ids: Vec<SubsetId> = t.subsets().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![b]);
    }

    #[test]
    fn chain_stops_at_destroyed_ancestor() {
        let mut t = tree();
        let a = t.create_subset(Some("a"), None, None).unwrap();
        let b = t.create_subset(Some("b"), Some(a), None).unwrap();
        let c = t.create_subset(Some("c"), Some(b), None).unwrap();
        assert_eq!(t.chain(c).count(), 3);
        t.destroy_subset(b).unwrap();
        let scopes: Vec<&str> = t.chain(c).map(|n| n.scope()).collect();
        assert_eq!(scopes, vec!["a:b:c"]);
    }
}
