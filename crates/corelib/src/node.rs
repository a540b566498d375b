//! Per-process node state (§3/C4): host identity, predecessor, peer
//! cache, local store, and the join state machine, all guarded by a
//! single lock.

use crate::config::RingConfig;
use crate::hash::hash;
use crate::peer_cache::PeerCache;
use crate::ring::{Keyspace, RingId};
use crate::store::LocalStore;
use parking_lot::Mutex;

/// `(ring-id, host)` pair, used both for a node's own predecessor and
/// for peer-cache entries merged from lookup chains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predecessor {
    pub id: RingId,
    pub host: String,
}

/// Where a node is in the join protocol of §4.5.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Alone on the ring, predecessor is self.
    Alone,
    /// A `join` is in flight; reverted to `Alone` on failure.
    Joining,
    /// Joined a ring with at least one other member (or was told to
    /// absorb one via `update_predecessor`).
    Member,
}

/// Everything the single per-node mutex guards (§4.4/§5): predecessor,
/// peer cache, local store, and join status travel together because a
/// join transitions all four atomically.
#[derive(Clone, Debug)]
pub struct Inner {
    pub status: Status,
    pub predecessor: Predecessor,
    pub peer_cache: PeerCache,
    pub local_store: LocalStore,
}

/// One node's complete state. `host`/`id`/`keyspace`/`config` are fixed
/// at construction and never mutated; everything else lives behind the
/// lock in `inner`.
pub struct NodeState {
    pub host: String,
    pub id: RingId,
    pub keyspace: Keyspace,
    pub config: RingConfig,
    pub inner: Mutex<Inner>,
}

impl NodeState {
    /// A freshly constructed node is alone on the ring: its own
    /// predecessor, an empty peer cache, an empty store.
    pub fn new(host: impl Into<String>, config: RingConfig) -> Self {
        let host = host.into();
        let keyspace = config.keyspace();
        let id = hash(&keyspace, host.as_str(), 0);
        Self {
            inner: Mutex::new(Inner {
                status: Status::Alone,
                predecessor: Predecessor { id, host: host.clone() },
                peer_cache: PeerCache::new(),
                local_store: LocalStore::new(),
            }),
            host,
            id,
            keyspace,
            config,
        }
    }

    pub fn hash_path(&self, path: &str, salt: u64) -> RingId {
        hash(&self.keyspace, path, salt)
    }

    pub fn status(&self) -> Status {
        self.inner.lock().status
    }

    pub fn predecessor(&self) -> Predecessor {
        self.inner.lock().predecessor.clone()
    }

    /// True iff `self` owns `key` under the current predecessor, i.e.
    /// `key` lies in `(predecessor.id, self.id]`.
    pub fn owns(&self, key: RingId) -> bool {
        let inner = self.inner.lock();
        self.keyspace.between(inner.predecessor.id, key, self.id)
    }

    /// Apply an incoming `update_predecessor(host)` per the acceptance
    /// rule of §4.5: accepted unconditionally while alone-with-self, and
    /// while a member only if the new id lies in `(old_pid, self.id)`.
    /// Idempotent when `host` already is the predecessor (§8 invariant 6).
    pub fn accept_predecessor(&self, host: &str) -> bool {
        let new_id = hash(&self.keyspace, host, 0);
        let mut inner = self.inner.lock();

        if inner.predecessor.host == host {
            return true;
        }

        let alone_with_self = inner.status == Status::Alone && inner.predecessor.id == self.id;
        let accepted = alone_with_self
            || (new_id != self.id
                && new_id != inner.predecessor.id
                && self.keyspace.between(inner.predecessor.id, new_id, self.id));

        if accepted {
            inner.predecessor = Predecessor { id: new_id, host: host.to_string() };
            inner.status = Status::Member;
            inner.peer_cache.insert(new_id, host.to_string());
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(host: &str) -> NodeState {
        NodeState::new(host, RingConfig::new(16, 3))
    }

    #[test]
    fn alone_node_is_its_own_predecessor() {
        let n = node("127.0.0.1:5000");
        let pred = n.predecessor();
        assert_eq!(pred.id, n.id);
        assert_eq!(pred.host, n.host);
        assert_eq!(n.status(), Status::Alone);
    }

    #[test]
    fn alone_node_accepts_any_predecessor() {
        let n = node("127.0.0.1:5000");
        assert!(n.accept_predecessor("127.0.0.1:5001"));
        assert_eq!(n.status(), Status::Member);
    }

    #[test]
    fn idempotent_update_predecessor_is_a_no_op() {
        let n = node("127.0.0.1:5000");
        n.accept_predecessor("127.0.0.1:5001");
        let before = n.predecessor();
        assert!(n.accept_predecessor("127.0.0.1:5001"));
        assert_eq!(n.predecessor(), before);
    }

    #[test]
    fn member_rejects_predecessor_outside_the_arc() {
        let n = node("127.0.0.1:5000");
        n.accept_predecessor("127.0.0.1:5001");
        let pred_before = n.predecessor();
        // self's own id can never be an acceptable new predecessor id.
        let rejected = n.accept_predecessor(&n.host.clone());
        assert!(!rejected);
        assert_eq!(n.predecessor(), pred_before);
    }
}
