//! Joining an existing ring and absorbing an arc of responsibility (§4.5).

use crate::error::{Error, Result};
use crate::hash::hash;
use crate::node::{Inner, NodeState, Predecessor, Status};
use crate::transport::Transport;

/// Run the join protocol against bootstrap peer `boot`. On success the
/// node is `Member` and holds the arc of keys transferred from its new
/// successor; on failure the node's state is reverted to exactly what it
/// was before the call (still `Alone`), except when the failure occurs
/// during the best-effort step 7 transfer, which never reverts the join.
pub async fn join(node: &NodeState, transport: &dyn Transport, boot: &str) -> Result<()> {
    if boot == node.host {
        return Err(Error::InvalidRequest("cannot join self".to_string()));
    }

    let snapshot: Inner = node.inner.lock().clone();
    node.inner.lock().status = Status::Joining;

    match join_inner(node, transport, boot).await {
        Ok(successor) => {
            transfer_content(node, transport, &successor).await;
            Ok(())
        }
        Err(err) => {
            *node.inner.lock() = snapshot;
            Err(err)
        }
    }
}

/// Steps 1-6: returns the new successor's host on success.
async fn join_inner(node: &NodeState, transport: &dyn Transport, boot: &str) -> Result<String> {
    transport.probe(boot).await?;

    let chain = transport.lookup(boot, node.id).await?;
    let successor = chain
        .first()
        .cloned()
        .flatten()
        .ok_or_else(|| Error::Unreachable(boot.to_string()))?;

    if hash(&node.keyspace, successor.as_str(), 0) == node.id {
        return Err(Error::IdCollision(successor));
    }

    {
        let mut inner = node.inner.lock();
        for host in chain.iter().flatten() {
            let id = hash(&node.keyspace, host.as_str(), 0);
            inner.peer_cache.insert(id, host.clone());
        }
    }

    let pred_host = transport.predecessor(&successor).await?;
    let pred_id = hash(&node.keyspace, pred_host.as_str(), 0);

    {
        let mut inner = node.inner.lock();
        inner.predecessor = Predecessor { id: pred_id, host: pred_host.clone() };
        inner.peer_cache.insert(pred_id, pred_host);
    }

    transport
        .update_predecessor(&successor, &node.host)
        .await
        .map_err(|_| Error::Raced(format!("successor {successor} died mid-join")))?;

    node.inner.lock().status = Status::Member;
    Ok(successor)
}

/// Step 7: fetch and absorb the transferred arc, then ask the successor
/// to drop it. Best-effort: failures here are logged, not propagated;
/// the join already succeeded.
async fn transfer_content(node: &NodeState, transport: &dyn Transport, successor: &str) {
    let (pred_id, self_id) = (node.inner.lock().predecessor.id, node.id);

    let batch = match transport.content(successor, pred_id, self_id).await {
        Ok(batch) => batch,
        Err(err) => {
            tracing::warn!(%successor, %err, "content transfer failed during join");
            return;
        }
    };

    if batch.is_empty() {
        return;
    }

    {
        let mut inner = node.inner.lock();
        for (key, entries) in batch {
            inner.local_store.absorb(key, entries);
        }
    }

    if let Err(err) = transport.delete(successor, pred_id, self_id).await {
        tracing::warn!(%successor, %err, "successor failed to delete transferred arc; benign duplicate remains");
    }
}
