//! The transport-agnostic RPC contract the core issues against a remote
//! host (§4.9/C9). `corelib` depends only on this trait, never on a
//! concrete transport, so the ring/lookup/membership algorithms can be
//! exercised against an in-memory fake; `streaming::HttpTransport` is the
//! one production implementation, issuing these as HTTP calls with a
//! bounded timeout (§5).

use crate::error::Result;
use crate::ring::RingId;
use async_trait::async_trait;
use serde_json::Value;

/// Lookup's return value: a sequence of hosts traversed, ending at the
/// responder. `None` is the sentinel meaning "the successor is presently
/// unreachable" (§4.6).
pub type Chain = Vec<Option<String>>;

/// The submap shape returned by `content` (§4.7).
pub type ContentBatch = Vec<(RingId, Vec<(String, Value)>)>;

#[async_trait]
pub trait Transport: Send + Sync {
    /// A liveness probe; `Err` means `host` is unreachable.
    async fn probe(&self, host: &str) -> Result<()>;

    /// `lookup(key)` issued against `host`.
    async fn lookup(&self, host: &str, key: RingId) -> Result<Chain>;

    /// `host`'s current predecessor address.
    async fn predecessor(&self, host: &str) -> Result<String>;

    /// Notify `host` to set its predecessor to `new_predecessor`.
    async fn update_predecessor(&self, host: &str, new_predecessor: &str) -> Result<()>;

    /// Fetch `host`'s local-store submap over the closed arc `[a, b]`.
    async fn content(&self, host: &str, a: RingId, b: RingId) -> Result<ContentBatch>;

    /// Ask `host` to delete its local-store entries over the closed arc
    /// `[a, b]`.
    async fn delete(&self, host: &str, a: RingId, b: RingId) -> Result<()>;

    /// `host`'s peer cache, as `(id, host)` pairs, used by `list`'s
    /// traversal (C8) to discover further nodes to visit.
    async fn network(&self, host: &str) -> Result<Vec<(RingId, String)>>;

    /// Forwarded replicated operations (§4.8); `n` is the number of
    /// remaining salts the remote should try.
    async fn exists(&self, host: &str, path: &str, n: u32) -> Result<bool>;
    async fn get(&self, host: &str, path: &str, n: u32) -> Result<Value>;
    async fn put(&self, host: &str, path: &str, value: Value, n: u32) -> Result<()>;
    async fn remove(&self, host: &str, path: &str, n: u32) -> Result<Value>;
}
