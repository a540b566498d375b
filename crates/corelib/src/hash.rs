//! Deterministic hashing from strings/integers onto the ring.
//!
//! `hash` is the single point where application-level identifiers (paths,
//! hosts, integer keys) become `RingId`s. A `salt` mixed ahead of the
//! input spreads the `R` replica placements of a path to statistically
//! independent positions around the ring (§4.2).

use crate::ring::{Keyspace, RingId};
use sha1::{Digest, Sha1};

/// Anything `hash` can be pointed at: a path, a host string, or an
/// integer key arriving over the wire as decimal ASCII.
pub trait Hashable {
    fn hash_bytes(&self) -> Vec<u8>;
}

impl Hashable for str {
    fn hash_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl Hashable for String {
    fn hash_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl Hashable for u64 {
    fn hash_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

/// `hash(x, salt)` = `SHA-1(decimal(salt) || bytes(x))` reduced into the
/// keyspace. `salt = 0` is the plain primary placement; replica
/// placements use `salt in 1..=R-1`.
pub fn hash<T: Hashable + ?Sized>(keyspace: &Keyspace, x: &T, salt: u64) -> RingId {
    let mut hasher = Sha1::new();
    hasher.update(salt.to_string().as_bytes());
    hasher.update(x.hash_bytes());
    let digest = hasher.finalize();

    let mut tail = [0u8; 8];
    tail.copy_from_slice(&digest[12..20]);
    keyspace.reduce(u64::from_be_bytes(tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let ks = Keyspace::new(16);
        assert_eq!(hash(&ks, "/a", 0), hash(&ks, "/a", 0));
    }

    #[test]
    fn salt_changes_position() {
        let ks = Keyspace::new(20);
        let positions: Vec<_> = (0u64..4).map(|s| hash(&ks, "/same-path", s)).collect();
        assert!(positions.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn reduced_into_keyspace() {
        let ks = Keyspace::new(10);
        for salt in 0u64..8 {
            let id = hash(&ks, "/x", salt);
            assert!(id.0 < (1u64 << 10));
        }
    }

    #[test]
    fn integers_and_strings_share_the_function() {
        let ks = Keyspace::new(16);
        assert_eq!(hash(&ks, &42u64, 0), hash(&ks, "42", 0));
    }
}
