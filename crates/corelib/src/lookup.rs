//! Iterative resolution of the successor of a key across peers (§4.6).

use crate::hash::hash;
use crate::node::NodeState;
use crate::ring::RingId;
use crate::transport::{Chain, Transport};

/// `lookup(key) -> chain`. The node's lock is taken and released once per
/// peer attempt (not held across the outgoing RPC) so a slow peer cannot
/// block other operations on this node; each RPC still carries its own
/// bounded timeout (§5), and eviction re-checks presence before removing.
pub async fn lookup(node: &NodeState, transport: &dyn Transport, key: RingId) -> Chain {
    {
        let inner = node.inner.lock();
        if node.keyspace.between(inner.predecessor.id, key, node.id) {
            return vec![Some(node.host.clone())];
        }
    }

    loop {
        let predecessor_host = node.inner.lock().predecessor.host.clone();
        let candidate = node.inner.lock().peer_cache.closest_to(&node.keyspace, key);

        let (pid, phost) = match candidate {
            Some(c) => c,
            // Peer cache empty: degenerate "I am the only reachable node" answer.
            None => return vec![Some(node.host.clone())],
        };

        match transport.lookup(&phost, key).await {
            Ok(sub_chain) => {
                let mut inner = node.inner.lock();
                for host in sub_chain.iter().flatten() {
                    let id = hash(&node.keyspace, host.as_str(), 0);
                    inner.peer_cache.insert(id, host.clone());
                }
                drop(inner);

                let mut chain = sub_chain;
                chain.push(Some(node.host.clone()));
                return chain;
            }
            Err(_) => {
                if phost == predecessor_host {
                    tracing::warn!(dead = %phost, "predecessor unreachable during lookup");
                    return vec![None, Some(node.host.clone())];
                }
                tracing::debug!(evicted = %phost, "evicting dead peer from cache");
                let mut inner = node.inner.lock();
                if inner.peer_cache.get(pid) == Some(phost.as_str()) {
                    inner.peer_cache.remove(pid);
                }
            }
        }
    }
}
