//! `ReplicatedStore`: the replicated view over a single node's ring
//! position (§4.8). Each operation resolves an owner via lookup and
//! either serves locally or forwards to that owner with the replica
//! count `n` preserved, the forwarded call runs this same algorithm on
//! the remote, so a single iterative loop per call is enough; nothing
//! here re-enters its own handler recursively (§9 Design Notes).

use corelib::error::{Error, Result};
use corelib::lookup::lookup;
use corelib::node::NodeState;
use corelib::ring::RingId;
use corelib::transport::Transport;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct ReplicatedStore {
    pub node: Arc<NodeState>,
    pub transport: Arc<dyn Transport>,
}

impl ReplicatedStore {
    pub fn new(node: Arc<NodeState>, transport: Arc<dyn Transport>) -> Self {
        Self { node, transport }
    }

    /// `n` defaults to `R` and is clamped to `1..=R` (§4.8).
    fn clamp_n(&self, n: Option<u32>) -> Result<u32> {
        let replicas = self.node.config.replicas;
        match n {
            None => Ok(replicas),
            Some(0) => Err(Error::InvalidRequest("n must be at least 1".to_string())),
            Some(n) if n > replicas => Ok(replicas),
            Some(n) => Ok(n),
        }
    }

    fn salt_for(&self, n: u32) -> u64 {
        (self.node.config.replicas - n + 1) as u64
    }

    /// Resolve the owner of `path` at replica count `n`, or `None` if the
    /// successor is presently unreachable.
    async fn resolve(&self, path: &str, n: u32) -> (RingId, Option<String>) {
        let key = self.node.hash_path(path, self.salt_for(n));
        let chain = lookup(&self.node, self.transport.as_ref(), key).await;
        (key, chain.first().cloned().flatten())
    }

    pub async fn exists(&self, path: &str, n: Option<u32>) -> Result<bool> {
        let mut n = self.clamp_n(n)?;
        loop {
            let (key, owner) = self.resolve(path, n).await;
            match owner {
                None if n > 1 => n -= 1,
                None => return Err(Error::Unavailable),
                Some(host) if host == self.node.host => {
                    if self.node.inner.lock().local_store.exists(key, path) {
                        return Ok(true);
                    }
                    if n == 1 {
                        return Ok(false);
                    }
                    n -= 1;
                }
                Some(host) => return self.transport.exists(&host, path, n).await,
            }
        }
    }

    pub async fn get(&self, path: &str, n: Option<u32>) -> Result<Value> {
        let mut n = self.clamp_n(n)?;
        loop {
            let (key, owner) = self.resolve(path, n).await;
            match owner {
                None if n > 1 => n -= 1,
                None => return Err(Error::Unavailable),
                Some(host) if host == self.node.host => {
                    let local = self.node.inner.lock().local_store.get(key, path);
                    match local {
                        Ok(value) => return Ok(value),
                        Err(Error::NotFound(_)) if n > 1 => n -= 1,
                        Err(err) => return Err(err),
                    }
                }
                Some(host) => return self.transport.get(&host, path, n).await,
            }
        }
    }

    pub async fn put(&self, path: &str, value: Value, n: Option<u32>) -> Result<()> {
        let mut n = self.clamp_n(n)?;
        loop {
            let (key, owner) = self.resolve(path, n).await;
            match owner {
                None if n > 1 => n -= 1,
                None => return Err(Error::Unavailable),
                Some(host) if host == self.node.host => {
                    let result = self.node.inner.lock().local_store.put(key, path, value.clone());
                    if result.is_ok() {
                        self.fill_forward_put(path, value, n);
                    }
                    return result;
                }
                Some(host) => return self.transport.put(&host, path, value, n).await,
            }
        }
    }

    pub async fn remove(&self, path: &str, n: Option<u32>) -> Result<Value> {
        let mut n = self.clamp_n(n)?;
        loop {
            let (key, owner) = self.resolve(path, n).await;
            match owner {
                None if n > 1 => n -= 1,
                None => return Err(Error::Unavailable),
                Some(host) if host == self.node.host => {
                    let result = self.node.inner.lock().local_store.pop(key, path);
                    if result.is_ok() {
                        self.fill_forward_remove(path, n);
                    }
                    return result;
                }
                Some(host) => return self.transport.remove(&host, path, n).await,
            }
        }
    }

    pub async fn copy(&self, src: &str, dst: &str, n: Option<u32>) -> Result<()> {
        let n = self.clamp_n(n)?;
        let value = self.get(src, Some(n)).await?;
        self.put(dst, value, Some(n)).await
    }

    /// DFS over the union of all reachable nodes' peer caches, collecting
    /// the union of stored paths. Best-effort: a node that fails to
    /// respond is silently skipped (§4.8).
    pub async fn list(&self) -> Vec<String> {
        let mut visited = std::collections::HashSet::new();
        let mut frontier = Vec::new();
        let mut paths: BTreeSet<String> = BTreeSet::new();

        visited.insert(self.node.host.clone());
        paths.extend(self.node.inner.lock().local_store.paths());
        frontier.extend(self.node.inner.lock().peer_cache.iter().map(|(_, h)| h.to_string()));

        while let Some(host) = frontier.pop() {
            if !visited.insert(host.clone()) {
                continue;
            }
            // `a == b` asks for the whole ring per the between() full-ring
            // exception (§4.1); any identical pair dumps everything.
            let batch = match self.transport.content(&host, RingId(0), RingId(0)).await {
                Ok(batch) => batch,
                Err(err) => {
                    tracing::debug!(%host, %err, "skipping unreachable node during list");
                    continue;
                }
            };
            for (_, entries) in batch {
                paths.extend(entries.into_iter().map(|(p, _)| p));
            }
            if let Ok(peers) = self.transport.network(&host).await {
                for (_, phost) in peers {
                    if !visited.contains(&phost) {
                        frontier.push(phost);
                    }
                }
            }
        }

        paths.into_iter().collect()
    }

    /// Fire-and-forget `put` at the remaining, not-yet-filled salts
    /// `i+1..R` after a successful placement at salt `i` (current `n`).
    /// Failures there are swallowed: the first successful placement is
    /// the commit point (§4.8).
    fn fill_forward_put(&self, path: &str, value: Value, n: u32) {
        for next_n in (1..n).rev() {
            let transport = Arc::clone(&self.transport);
            let node = Arc::clone(&self.node);
            let path = path.to_string();
            let value = value.clone();
            tokio::spawn(async move {
                let store = ReplicatedStore { node, transport };
                if let Err(err) = store.put(&path, value, Some(next_n)).await {
                    tracing::debug!(%path, %err, "fill-forward put at a later salt failed");
                }
            });
        }
    }

    /// Fire-and-forget `remove` at the remaining salts, only triggered
    /// when the local removal actually took a value (§4.8); avoids
    /// amplifying `NotFound` calls across replicas that never had it.
    fn fill_forward_remove(&self, path: &str, n: u32) {
        for next_n in (1..n).rev() {
            let transport = Arc::clone(&self.transport);
            let node = Arc::clone(&self.node);
            let path = path.to_string();
            tokio::spawn(async move {
                let store = ReplicatedStore { node, transport };
                if let Err(err) = store.remove(&path, Some(next_n)).await {
                    tracing::debug!(%path, %err, "fill-forward remove at a later salt failed");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::config::RingConfig;
    use corelib::error::Result as CoreResult;
    use corelib::transport::{Chain, ContentBatch};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    struct FakeTransport {
        nodes: HashMap<String, Arc<NodeState>>,
        unreachable: StdMutex<std::collections::HashSet<String>>,
        // Self-reference so trait methods taking `&self` can still hand
        // out an owned `Arc<dyn Transport>` to a nested `ReplicatedStore`
        // (needed for its fire-and-forget `tokio::spawn` calls).
        self_ref: std::sync::OnceLock<std::sync::Weak<FakeTransport>>,
    }

    impl FakeTransport {
        fn guard(&self, host: &str) -> CoreResult<()> {
            if self.unreachable.lock().unwrap().contains(host) {
                Err(Error::Unreachable(host.to_string()))
            } else {
                Ok(())
            }
        }

        fn node(&self, host: &str) -> &Arc<NodeState> {
            self.nodes.get(host).expect("unknown host")
        }

        fn as_arc(&self) -> Arc<dyn Transport> {
            self.self_ref.get().unwrap().upgrade().unwrap() as Arc<dyn Transport>
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn probe(&self, host: &str) -> CoreResult<()> {
            self.guard(host)
        }

        async fn lookup(&self, host: &str, key: RingId) -> CoreResult<Chain> {
            self.guard(host)?;
            Ok(Box::pin(corelib::lookup::lookup(self.node(host), self, key)).await)
        }

        async fn predecessor(&self, host: &str) -> CoreResult<String> {
            self.guard(host)?;
            Ok(self.node(host).predecessor().host)
        }

        async fn update_predecessor(&self, host: &str, new_predecessor: &str) -> CoreResult<()> {
            self.guard(host)?;
            self.node(host).accept_predecessor(new_predecessor);
            Ok(())
        }

        async fn content(&self, host: &str, a: RingId, b: RingId) -> CoreResult<ContentBatch> {
            self.guard(host)?;
            let node = self.node(host);
            let inner = node.inner.lock();
            Ok(inner.local_store.content(&node.keyspace, a, b))
        }

        async fn delete(&self, host: &str, a: RingId, b: RingId) -> CoreResult<()> {
            self.guard(host)?;
            let node = self.node(host);
            let keyspace = node.keyspace;
            node.inner.lock().local_store.delete(&keyspace, a, b);
            Ok(())
        }

        async fn network(&self, host: &str) -> CoreResult<Vec<(RingId, String)>> {
            self.guard(host)?;
            Ok(self.node(host).inner.lock().peer_cache.iter().map(|(id, h)| (id, h.to_string())).collect())
        }

        async fn exists(&self, host: &str, path: &str, n: u32) -> CoreResult<bool> {
            self.guard(host)?;
            let store = ReplicatedStore::new(Arc::clone(self.node(host)), self.as_arc());
            store.exists(path, Some(n)).await
        }

        async fn get(&self, host: &str, path: &str, n: u32) -> CoreResult<Value> {
            self.guard(host)?;
            let store = ReplicatedStore::new(Arc::clone(self.node(host)), self.as_arc());
            store.get(path, Some(n)).await
        }

        async fn put(&self, host: &str, path: &str, value: Value, n: u32) -> CoreResult<()> {
            self.guard(host)?;
            let store = ReplicatedStore::new(Arc::clone(self.node(host)), self.as_arc());
            store.put(path, value, Some(n)).await
        }

        async fn remove(&self, host: &str, path: &str, n: u32) -> CoreResult<Value> {
            self.guard(host)?;
            let store = ReplicatedStore::new(Arc::clone(self.node(host)), self.as_arc());
            store.remove(path, Some(n)).await
        }
    }

    fn config(replicas: u32) -> RingConfig {
        RingConfig::new(16, replicas)
    }

    fn harness(hosts: &[&str], replicas: u32) -> Arc<FakeTransport> {
        let mut nodes = HashMap::new();
        for host in hosts {
            nodes.insert(host.to_string(), Arc::new(NodeState::new(*host, config(replicas))));
        }
        let t = Arc::new(FakeTransport {
            nodes,
            unreachable: StdMutex::new(Default::default()),
            self_ref: std::sync::OnceLock::new(),
        });
        let _ = t.self_ref.set(Arc::downgrade(&t));
        t
    }

    fn store(t: &Arc<FakeTransport>, host: &str) -> ReplicatedStore {
        ReplicatedStore::new(Arc::clone(t.node(host)), Arc::clone(t) as Arc<dyn Transport>)
    }

    #[tokio::test]
    async fn put_then_get_round_trips_on_a_single_node() {
        let t = harness(&["127.0.0.1:5000"], 3);
        let s = store(&t, "127.0.0.1:5000");
        s.put("/a", Value::from(42), None).await.unwrap();
        assert_eq!(s.get("/a", None).await.unwrap(), Value::from(42));
    }

    #[tokio::test]
    async fn remove_then_get_is_not_found() {
        let t = harness(&["127.0.0.1:5000"], 1);
        let s = store(&t, "127.0.0.1:5000");
        s.put("/a", Value::from(1), None).await.unwrap();
        s.remove("/a", None).await.unwrap();
        assert!(matches!(s.get("/a", None).await.unwrap_err(), Error::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_put_is_rejected() {
        let t = harness(&["127.0.0.1:5000"], 1);
        let s = store(&t, "127.0.0.1:5000");
        s.put("/k", Value::from(1), None).await.unwrap();
        let err = s.put("/k", Value::from(2), None).await.unwrap_err();
        assert!(matches!(err, Error::Duplicate(_)));
        assert_eq!(s.get("/k", None).await.unwrap(), Value::from(1));
    }

    #[tokio::test]
    async fn n_is_clamped_to_replication_factor() {
        let t = harness(&["127.0.0.1:5000"], 3);
        let s = store(&t, "127.0.0.1:5000");
        s.put("/a", Value::from(1), Some(99)).await.unwrap();
        assert_eq!(s.get("/a", Some(99)).await.unwrap(), Value::from(1));
    }

    #[tokio::test]
    async fn zero_n_is_an_invalid_request() {
        let t = harness(&["127.0.0.1:5000"], 3);
        let s = store(&t, "127.0.0.1:5000");
        let err = s.get("/a", Some(0)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn list_returns_sorted_unique_paths_across_joined_nodes() {
        let t = harness(&["127.0.0.1:5000", "127.0.0.1:5001"], 3);
        {
            let a = t.node("127.0.0.1:5000");
            let b = t.node("127.0.0.1:5001");
            corelib::membership::join(b, t.as_ref(), &a.host).await.unwrap();
        }
        let a = store(&t, "127.0.0.1:5000");
        let b = store(&t, "127.0.0.1:5001");
        a.put("/alpha", Value::from(1), Some(1)).await.unwrap();
        b.put("/beta", Value::from(2), Some(1)).await.unwrap();

        let mut from_a = a.list().await;
        let mut from_b = b.list().await;
        from_a.sort();
        from_b.sort();
        assert_eq!(from_a, vec!["/alpha".to_string(), "/beta".to_string()]);
        assert_eq!(from_a, from_b);
    }

    #[tokio::test]
    async fn copy_moves_a_value_between_paths() {
        let t = harness(&["127.0.0.1:5000"], 1);
        let s = store(&t, "127.0.0.1:5000");
        s.put("/src", Value::from("v"), None).await.unwrap();
        s.copy("/src", "/dst", None).await.unwrap();
        assert_eq!(s.get("/dst", None).await.unwrap(), Value::from("v"));
    }
}
