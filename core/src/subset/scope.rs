//! Scope name composition.
//!
//! Scopes are colon-joined: a subset `acct1` under an unnamed root has
//! scope `acct1`, a subset `inbox` under that has `acct1:inbox`, and the
//! item `timeout` as seen from there is `acct1:inbox:timeout`. Composed
//! strings are capped at a byte limit and truncated deterministically.

use tracing::warn;


/// Joins scope segments and item names.
pub const SEPARATOR: char = ':';


/// Compose a child scope from its parent's scope and its local name.
///
/// An absent or empty parent scope yields `name` alone.
pub fn compose(parent_scope: Option<&str>, name: &str, max_len: usize) -> String {
    let mut out = match parent_scope {
        Some(parent) if !parent.is_empty() => {
            let mut s = String::with_capacity(parent.len() + 1 + name.len());
            s.push_str(parent);
            s.push(SEPARATOR);
            s.push_str(name);
            s
        }
        _ => name.to_string(),
    };
    if truncate(&mut out, max_len) {
        warn!(scope = %out, max_len, "scope name truncated");
    }
    out
}

/// Fully-qualified key of `item` as seen from `scope`.
pub fn qualify(scope: &str, item: &str, max_len: usize) -> String {
    compose(Some(scope), item, max_len)
}

/// Prefix shared by every key that lives under `scope`.
pub fn prefix(scope: &str) -> String {
    let mut p = String::with_capacity(scope.len() + 1);
    p.push_str(scope);
    p.push(SEPARATOR);
    p
}

/// Cut `s` to at most `max_len` bytes, backing off to a char boundary.
/// Returns whether anything was removed.
pub fn truncate(s: &mut String, max_len: usize) -> bool {
    if s.len() <= max_len {
        return false;
    }
    let mut cut = max_len;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
    true
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_without_parent() {
        assert_eq!(compose(None, "acct1", 255), "acct1");
    }

    #[test]
    fn compose_with_empty_parent() {
        assert_eq!(compose(Some(""), "acct1", 255), "acct1");
    }

    #[test]
    fn compose_with_parent() {
        assert_eq!(compose(Some("acct1"), "inbox", 255), "acct1:inbox");
        assert_eq!(compose(Some("acct1:inbox"), "sent", 255), "acct1:inbox:sent");
    }

    #[test]
    fn qualify_item() {
        assert_eq!(qualify("", "timeout", 255), "timeout");
        assert_eq!(qualify("acct1", "timeout", 255), "acct1:timeout");
    }

    #[test]
    fn prefix_appends_separator() {
        assert_eq!(prefix("acct1"), "acct1:");
        assert_eq!(prefix("a:b"), "a:b:");
    }

    #[test]
    fn long_names_truncate_to_limit() {
        let name = "x".repeat(300);
        let scope = compose(None, &name, 255);
        assert_eq!(scope.len(), 255);

        let joined = compose(Some("abc"), "defgh", 6);
        assert_eq!(joined, "abc:de");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 'é' is two bytes; a cut through its middle backs off
        let mut s = String::from("aé");
        assert!(truncate(&mut s, 2));
        assert_eq!(s, "a");

        let mut short = String::from("ok");
        assert!(!truncate(&mut short, 2));
        assert_eq!(short, "ok");
    }

    #[test]
    fn truncation_is_deterministic() {
        let long = "ab".repeat(200);
        assert_eq!(compose(Some("p"), &long, 100), compose(Some("p"), &long, 100));
    }
}
