//! Config subsets: scoped views over one shared item table.
//!
//! A subset named `acct1` sees the item `timeout` as `acct1:timeout`.
//! Until that key exists, reads fall back to the parent scope; the first
//! write creates it as an inherited copy of the parent's item and
//! overrides it locally. Destroying a subset sweeps its inherited items.

pub mod access;
pub mod dump;
pub mod resolve;
pub mod scope;
pub mod tree;

pub use dump::DumpEntry;
pub use tree::{ConfigTree, SubsetId, SubsetNode};
