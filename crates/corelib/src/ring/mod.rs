//! Ring keyspace arithmetic.
//!
//! Every other component builds on the modular distance and interval
//! predicate defined here: peer selection picks the closest cached id,
//! lookup decides whether `self` owns a key, the local store answers
//! range queries, and membership computes arc ownership, all in terms
//! of `Keyspace::distance`/`Keyspace::between`.

pub mod position;

pub use position::{Keyspace, RingId};
