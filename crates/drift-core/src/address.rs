use rand_core::{OsRng, RngCore};

use crate::hasher::Hasher;

/// A device's opaque 32-byte address, plus the hash that actually travels
/// on the wire.
///
/// `hashed` is always `H(value)` for the hash function the engine was
/// constructed with; nothing ever places `value` itself on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub value: [u8; 32],
    pub hashed: [u8; 32],
    pub is_own: bool,
    pub name: Option<String>,
}

impl Address {
    /// Generate a fresh, uniformly random address.
    pub fn generate(hasher: &dyn Hasher, is_own: bool) -> Self {
        let mut value = [0u8; 32];
        OsRng.fill_bytes(&mut value);
        let hashed = hasher.hash(&value);
        Self {
            value,
            hashed,
            is_own,
            name: None,
        }
    }

    /// Reconstruct an address from its persisted raw value, recomputing
    /// (and verifying) the hash.
    pub fn from_value(hasher: &dyn Hasher, value: [u8; 32], is_own: bool, name: Option<String>) -> Self {
        let hashed = hasher.hash(&value);
        Self {
            value,
            hashed,
            is_own,
            name,
        }
    }

    /// An 8-character base58-ish advertisement tag derived from a fresh
    /// random address, per the `advertise(tag)` transport contract (§6.1).
    /// Uses the same random-32-bytes-then-hash shape as address
    /// generation, truncated and base58-encoded.
    pub fn fresh_advertisement_tag() -> String {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        base58_encode(&seed[..6])
            .chars()
            .take(8)
            .collect()
    }
}

const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

fn base58_encode(bytes: &[u8]) -> String {
    let mut digits: Vec<u8> = vec![0];
    for &byte in bytes {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }
    for &byte in bytes {
        if byte == 0 {
            digits.push(0);
        } else {
            break;
        }
    }
    digits
        .iter()
        .rev()
        .map(|&d| BASE58_ALPHABET[d as usize] as char)
        .collect()
}
