use sha2::{Digest, Sha256};

/// The concrete digest `drift_core::Hasher` this daemon supplies to the
/// engine. The core crate stays generic; this is the one place the curve
/// choice is nailed down.
pub struct Sha256Hasher;

impl drift_core::Hasher for Sha256Hasher {
    fn hash(&self, input: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(input);
        hasher.finalize().into()
    }
}
