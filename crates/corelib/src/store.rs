//! Per-node key/value store (§4.7).
//!
//! Keyed by `RingId` (the hashed ring position), each slot holds a short
//! collision list of `(path, value)` pairs, short by construction, since
//! a cryptographic hash over a keyspace much larger than the number of
//! stored paths makes collisions rare; a linear scan per list is fine.

use crate::error::{Error, Result};
use crate::ring::{Keyspace, RingId};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct LocalStore {
    entries: BTreeMap<RingId, Vec<(String, Value)>>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self { entries: BTreeMap::new() }
    }

    pub fn exists(&self, key: RingId, path: &str) -> bool {
        self.find(key, path).is_some()
    }

    pub fn get(&self, key: RingId, path: &str) -> Result<Value> {
        self.find(key, path)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    /// Reject with `Duplicate` if `path` already has a value at `key`.
    pub fn put(&mut self, key: RingId, path: &str, value: Value) -> Result<()> {
        let list = self.entries.entry(key).or_default();
        if list.iter().any(|(p, _)| p == path) {
            return Err(Error::Duplicate(path.to_string()));
        }
        list.push((path.to_string(), value));
        Ok(())
    }

    /// Returns and removes the value, or `NotFound`.
    pub fn pop(&mut self, key: RingId, path: &str) -> Result<Value> {
        let list = self
            .entries
            .get_mut(&key)
            .ok_or_else(|| Error::NotFound(path.to_string()))?;
        let idx = list
            .iter()
            .position(|(p, _)| p == path)
            .ok_or_else(|| Error::NotFound(path.to_string()))?;
        let (_, value) = list.remove(idx);
        if list.is_empty() {
            self.entries.remove(&key);
        }
        Ok(value)
    }

    /// The submap of entries with keys in the closed arc `[a, b]`.
    pub fn content(&self, keyspace: &Keyspace, a: RingId, b: RingId) -> Vec<(RingId, Vec<(String, Value)>)> {
        self.entries
            .iter()
            .filter(|(k, _)| keyspace.between(a, **k, b))
            .map(|(k, list)| (*k, list.clone()))
            .collect()
    }

    /// Remove exactly the entries with keys in the closed arc `[a, b]`.
    pub fn delete(&mut self, keyspace: &Keyspace, a: RingId, b: RingId) {
        self.entries.retain(|k, _| !keyspace.between(a, *k, b));
    }

    /// Absorb a batch of entries transferred in from a peer (join, §4.5
    /// step 7). A path already present locally is left untouched rather
    /// than overwritten; this is the same no-overwrite discipline as
    /// `put`, but silent rather than an error, since arc transfer is not
    /// a client-initiated write.
    pub fn absorb(&mut self, key: RingId, incoming: Vec<(String, Value)>) {
        let list = self.entries.entry(key).or_default();
        for (path, value) in incoming {
            if !list.iter().any(|(p, _)| *p == path) {
                list.push((path, value));
            }
        }
    }

    /// All paths stored on this node, for `list` (C8).
    pub fn paths(&self) -> Vec<String> {
        self.entries
            .values()
            .flat_map(|list| list.iter().map(|(p, _)| p.clone()))
            .collect()
    }

    fn find(&self, key: RingId, path: &str) -> Option<&(String, Value)> {
        self.entries.get(&key)?.iter().find(|(p, _)| p == path)
    }
}
