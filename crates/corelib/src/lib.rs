//! Core of the Chord-like ring overlay: ring arithmetic, hashing, peer
//! cache, node state, join/membership, lookup, and the local key/value
//! store (§2, components C1-C7). Replicated operations (C8) and the
//! concrete transport (C9) live in the sibling `replication` and
//! `streaming` crates; this crate depends only on the `Transport` trait.

pub mod config;
pub mod error;
pub mod hash;
pub mod lookup;
pub mod membership;
pub mod node;
pub mod peer_cache;
pub mod ring;
pub mod store;
pub mod transport;

pub use config::RingConfig;
pub use error::{Error, Result};
pub use hash::hash;
pub use node::{NodeState, Predecessor, Status};
pub use peer_cache::PeerCache;
pub use ring::{Keyspace, RingId};
pub use store::LocalStore;
pub use transport::{Chain, ContentBatch, Transport};
