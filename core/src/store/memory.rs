//! In-memory item table.
//!
//! Items live in slots addressed by [`ItemId`], with an ordered key index
//! on the side. Inherited items carry no value of their own until one is
//! written; reads fall through the parent link until a value turns up.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ItemFlags, ItemId, ItemStore, SetStatus, StoreValue};
use crate::error::StoreError;


/// Value type of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Bool,
    Number,
    String,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Bool => "bool",
            ItemKind::Number => "number",
            ItemKind::String => "string",
        }
    }
}


/// Definition of a root (non-inherited) item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub kind: ItemKind,
    pub initial: StoreValue,
    /// Inclusive bounds, numbers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(i64, i64)>,
}

impl ItemDef {
    pub fn bool(initial: bool) -> Self {
        ItemDef { kind: ItemKind::Bool, initial: Value::Bool(initial), range: None }
    }

    pub fn number(initial: i64) -> Self {
        ItemDef { kind: ItemKind::Number, initial: Value::from(initial), range: None }
    }

    pub fn string(initial: &str) -> Self {
        ItemDef { kind: ItemKind::String, initial: Value::String(initial.to_string()), range: None }
    }

    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }
}


#[derive(Debug, Clone)]
struct ItemRecord {
    key: String,
    kind: ItemKind,
    flags: ItemFlags,
    range: Option<(i64, i64)>,
    /// What `reset` restores on a root item. Null for inherited items.
    initial: Value,
    /// Always set on root items; `None` on an inherited item that still
    /// follows its parent.
    value: Option<Value>,
    parent: Option<ItemId>,
}


/// The default [`ItemStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Slots are never reused, so a stale `ItemId` stays stale.
    slots: Vec<Option<ItemRecord>>,
    index: BTreeMap<String, ItemId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a root item at `key`.
    pub fn register(&mut self, key: &str, def: ItemDef) -> Result<ItemId, StoreError> {
        if self.index.contains_key(key) {
            return Err(StoreError::Duplicate(key.to_string()));
        }
        let initial = check_value(key, def.kind, def.range, def.initial)?;
        let id = self.insert(ItemRecord {
            key: key.to_string(),
            kind: def.kind,
            flags: ItemFlags::empty(),
            range: def.range,
            initial: initial.clone(),
            value: Some(initial),
            parent: None,
        });
        Ok(id)
    }

    /// Effective value at `key`, if the key exists.
    pub fn get(&self, key: &str) -> Option<StoreValue> {
        let id = self.lookup_exact(key)?;
        self.effective(id).ok()
    }

    pub fn kind(&self, item: ItemId) -> Option<ItemKind> {
        self.record(item).ok().map(|r| r.kind)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // -------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------

    fn insert(&mut self, record: ItemRecord) -> ItemId {
        let id = ItemId(self.slots.len());
        self.index.insert(record.key.clone(), id);
        self.slots.push(Some(record));
        id
    }

    fn record(&self, item: ItemId) -> Result<&ItemRecord, StoreError> {
        self.slots
            .get(item.0)
            .and_then(|s| s.as_ref())
            .ok_or(StoreError::NoSuchItem(item))
    }

    fn record_mut(&mut self, item: ItemId) -> Result<&mut ItemRecord, StoreError> {
        self.slots
            .get_mut(item.0)
            .and_then(|s| s.as_mut())
            .ok_or(StoreError::NoSuchItem(item))
    }

    /// Follow parent links until some item holds a value.
    fn effective(&self, item: ItemId) -> Result<Value, StoreError> {
        let start = self.record(item)?;
        let mut rec = start;
        loop {
            if let Some(v) = &rec.value {
                return Ok(v.clone());
            }
            rec = match rec.parent.and_then(|p| self.record(p).ok()) {
                Some(parent) => parent,
                None => return Err(StoreError::DanglingParent(start.key.clone())),
            };
        }
    }
}


impl ItemStore for MemoryStore {
    fn lookup_exact(&self, key: &str) -> Option<ItemId> {
        self.index.get(key).copied()
    }

    fn key(&self, item: ItemId) -> Option<&str> {
        self.record(item).ok().map(|r| r.key.as_str())
    }

    fn flags(&self, item: ItemId) -> Option<ItemFlags> {
        self.record(item).ok().map(|r| r.flags)
    }

    fn inherits_from(&self, item: ItemId) -> Option<ItemId> {
        self.record(item).ok().and_then(|r| r.parent)
    }

    fn is_overridden(&self, item: ItemId) -> bool {
        self.record(item)
            .map(|r| r.flags.contains(ItemFlags::INHERITED) && r.value.is_some())
            .unwrap_or(false)
    }

    fn native_get(&self, item: ItemId) -> Result<StoreValue, StoreError> {
        self.effective(item)
    }

    fn native_set(&mut self, item: ItemId, value: StoreValue) -> Result<SetStatus, StoreError> {
        let rec = self.record(item)?;
        let value = check_value(&rec.key, rec.kind, rec.range, value)?;
        if self.effective(item)? == value {
            return Ok(SetStatus::NoChange);
        }
        self.record_mut(item)?.value = Some(value);
        Ok(SetStatus::Changed)
    }

    fn string_get(&self, item: ItemId) -> Result<String, StoreError> {
        Ok(render(&self.effective(item)?))
    }

    fn string_set(&mut self, item: ItemId, value: &str) -> Result<SetStatus, StoreError> {
        let rec = self.record(item)?;
        let parsed = parse_as(&rec.key, rec.kind, value)?;
        self.native_set(item, parsed)
    }

    fn reset(&mut self, item: ItemId) -> Result<SetStatus, StoreError> {
        let before = self.effective(item)?;
        let rec = self.record_mut(item)?;
        if rec.flags.contains(ItemFlags::INHERITED) {
            rec.value = None;
        } else {
            rec.value = Some(rec.initial.clone());
        }
        let after = self.effective(item)?;
        Ok(if before == after { SetStatus::NoChange } else { SetStatus::Changed })
    }

    fn create_inherited(&mut self, parent: ItemId, key: &str) -> Result<ItemId, StoreError> {
        if self.index.contains_key(key) {
            return Err(StoreError::Duplicate(key.to_string()));
        }
        let base = self.record(parent)?;
        let record = ItemRecord {
            key: key.to_string(),
            kind: base.kind,
            flags: ItemFlags::INHERITED,
            range: base.range,
            initial: Value::Null,
            value: None,
            parent: Some(parent),
        };
        Ok(self.insert(record))
    }

    fn remove_inherited(&mut self, key: &str) {
        let Some(id) = self.lookup_exact(key) else {
            return;
        };
        let inherited = self
            .flags(id)
            .is_some_and(|f| f.contains(ItemFlags::INHERITED));
        if inherited {
            self.index.remove(key);
            if let Some(slot) = self.slots.get_mut(id.0) {
                *slot = None;
            }
        }
    }

    fn snapshot_keys(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }
}


// ---------------------------------------------------------------------------
// Value checking and conversion
// ---------------------------------------------------------------------------

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_value(
    key: &str,
    kind: ItemKind,
    range: Option<(i64, i64)>,
    value: Value,
) -> Result<Value, StoreError> {
    let got = value_type(&value);
    let mismatch = || StoreError::TypeMismatch {
        key: key.to_string(),
        expected: kind.as_str(),
        got,
    };
    match kind {
        ItemKind::Bool if value.is_boolean() => Ok(value),
        ItemKind::String if value.is_string() => Ok(value),
        ItemKind::Number => {
            let n = value.as_i64().ok_or_else(mismatch)?;
            if let Some((min, max)) = range {
                if n < min || n > max {
                    return Err(StoreError::OutOfRange { key: key.to_string(), value: n, min, max });
                }
            }
            Ok(Value::from(n))
        }
        _ => Err(mismatch()),
    }
}

fn parse_as(key: &str, kind: ItemKind, raw: &str) -> Result<Value, StoreError> {
    let invalid = || StoreError::InvalidValue { key: key.to_string(), value: raw.to_string() };
    match kind {
        ItemKind::String => Ok(Value::String(raw.to_string())),
        ItemKind::Number => raw.trim().parse::<i64>().map(Value::from).map_err(|_| invalid()),
        ItemKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "on" => Ok(Value::Bool(true)),
            "no" | "false" | "off" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
