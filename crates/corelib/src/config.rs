//! Ring-wide constants every node in a ring must agree on (§6).

use crate::ring::Keyspace;

/// Keyspace width and replication degree, carried at runtime (rather than
/// as compile-time constants) so tests can exercise multiple `m`/`r`
/// combinations in one process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingConfig {
    pub m: u32,
    pub replicas: u32,
}

impl RingConfig {
    pub fn new(m: u32, replicas: u32) -> Self {
        assert!(replicas >= 1, "replication factor must be at least 1, got {replicas}");
        Self { m, replicas }
    }

    pub fn keyspace(&self) -> Keyspace {
        Keyspace::new(self.m)
    }
}

impl Default for RingConfig {
    /// Matches the CLI defaults of §6: 16-bit keyspace, 3 replicas.
    fn default() -> Self {
        Self::new(16, 3)
    }
}
