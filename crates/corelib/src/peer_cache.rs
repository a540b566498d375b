//! The routing table a node builds up from lookup chains (§4.3).

use crate::ring::{Keyspace, RingId};
use std::collections::BTreeMap;

/// `ring-id -> host` directory, insert-idempotent, pruned on dead peers.
///
/// Backed by a `BTreeMap` rather than a hash map: nearest-entry selection
/// (`closest_to`) is the only read path that matters for lookup, and a
/// sorted map lets a future iteration narrow the scan instead of a full
/// linear pass; today it is still a linear pass, kept simple per §5.
#[derive(Clone, Debug, Default)]
pub struct PeerCache {
    peers: BTreeMap<RingId, String>,
}

impl PeerCache {
    pub fn new() -> Self {
        Self { peers: BTreeMap::new() }
    }

    /// Insert or overwrite the host bound to `id`. Idempotent: a rejoin
    /// at the same id simply replaces the stale host string.
    pub fn insert(&mut self, id: RingId, host: String) {
        self.peers.insert(id, host);
    }

    pub fn remove(&mut self, id: RingId) {
        self.peers.remove(&id);
    }

    pub fn contains(&self, id: RingId) -> bool {
        self.peers.contains_key(&id)
    }

    pub fn get(&self, id: RingId) -> Option<&str> {
        self.peers.get(&id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RingId, &str)> {
        self.peers.iter().map(|(id, host)| (*id, host.as_str()))
    }

    /// The cached `(id, host)` minimizing `distance(id, key)`; ties break
    /// by numerically smallest id (guaranteed by the `BTreeMap` iteration
    /// order once distances tie).
    pub fn closest_to(&self, keyspace: &Keyspace, key: RingId) -> Option<(RingId, String)> {
        self.peers
            .iter()
            .min_by_key(|(id, _)| (keyspace.distance(**id, key), **id))
            .map(|(id, host)| (*id, host.clone()))
    }

    /// Merge a chain of hosts (e.g. a lookup result) into the cache,
    /// hashing each host to derive its id.
    pub fn merge_hosts<'a>(&mut self, keyspace: &Keyspace, hosts: impl IntoIterator<Item = &'a str>) {
        for host in hosts {
            let id = crate::hash::hash(keyspace, host, 0);
            self.insert(id, host.to_string());
        }
    }
}
