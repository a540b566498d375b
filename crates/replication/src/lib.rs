//! Replicated key/value semantics layered over the ring (§4.8/C8):
//! `exists`/`get`/`put`/`remove` over up to `R` replica positions, plus
//! `copy` and `list`.

pub mod ops;

pub use ops::ReplicatedStore;
