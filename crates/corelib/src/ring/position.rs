//! Ring position arithmetic.
//!
//! A position on the ring is a 64-bit integer interpreted modulo `2^m` for
//! some keyspace width `m`. This module carries the modular distance and
//! interval predicate that every other component (peer selection, lookup,
//! local-store range queries, arc-ownership checks) is built from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position on the hash ring, already reduced modulo the keyspace size.
///
/// Plain newtype over `u64` rather than an arbitrary-precision integer:
/// the source represents keys as unbounded Python ints (`m` up to 256 in
/// one variant), but a 64-bit word comfortably covers any ring this
/// implementation is meant to run (`m <= 64`, see `Keyspace`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct RingId(pub u64);

impl fmt::Display for RingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keyspace parameters shared by every node in a ring: `m` bits wide,
/// `S = 2^m` positions, `[0, S)`.
///
/// All nodes in a ring must agree on `m`; nothing here enforces that
/// beyond the CLI accepting it once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keyspace {
    m: u32,
    mask: u64,
}

impl Keyspace {
    /// Build a keyspace of `m` bits, `1 <= m <= 64`.
    pub fn new(m: u32) -> Self {
        assert!((1..=64).contains(&m), "keyspace width must be in 1..=64, got {m}");
        let mask = if m == 64 { u64::MAX } else { (1u64 << m) - 1 };
        Self { m, mask }
    }

    /// Number of bits in the keyspace.
    pub fn bits(&self) -> u32 {
        self.m
    }

    /// Reduce an arbitrary 64-bit value into `[0, S)`.
    pub fn reduce(&self, raw: u64) -> RingId {
        RingId(raw & self.mask)
    }

    /// Clockwise distance `(b - a) mod S`.
    ///
    /// The source expresses this recursively (`distance(a,b) = S -
    /// distance(b,a)` when `a > b`); the equivalent closed form on a
    /// masked integer is a single wrapping subtraction.
    pub fn distance(&self, a: RingId, b: RingId) -> u64 {
        b.0.wrapping_sub(a.0) & self.mask
    }

    /// True iff `b` lies on the closed clockwise arc from `a` to `c`:
    /// `a == c`, or `b != a` and `distance(a,b) + distance(b,c) ==
    /// distance(a,c)`.
    pub fn between(&self, a: RingId, b: RingId, c: RingId) -> bool {
        a == c
            || (b != a
                && (self.distance(a, b).wrapping_add(self.distance(b, c)) & self.mask)
                    == self.distance(a, c))
    }
}
