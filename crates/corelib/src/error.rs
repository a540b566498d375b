//! Error types for the core library.

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the ring overlay and local store.
///
/// These are the kinds a caller needs to branch on (lookup self-healing,
/// replicated-operation salt fallthrough, HTTP status mapping); anything
/// more specific belongs in the message carried by a variant, not in a
/// new variant.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// An RPC timed out or the peer returned a non-success response.
    #[error("unreachable: {0}")]
    Unreachable(String),

    /// A replicated operation exhausted all `R` salts without finding a
    /// reachable owner.
    #[error("no reachable owner for path after exhausting all replicas")]
    Unavailable,

    /// Two distinct hosts hash to the same ring-id.
    #[error("id collision with host {0}")]
    IdCollision(String),

    /// A required peer changed identity between two steps of a protocol
    /// (e.g. the successor died mid-join).
    #[error("raced: {0}")]
    Raced(String),

    /// `put` of a path that already has a value.
    #[error("duplicate path: {0}")]
    Duplicate(String),

    /// `get`/`pop`/`remove` target absent at every tried salt.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed path, non-integer key, `n <= 0`, etc.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// True for errors that should make a lookup evict the offending peer
    /// and a replicated operation fall through to the next salt.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Error::Unreachable(_))
    }
}
