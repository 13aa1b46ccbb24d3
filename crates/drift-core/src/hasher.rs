/// The cryptographic hash `H` the engine calls to derive wire-safe
/// identifiers from raw addresses and notification contents.
///
/// Key derivation and hashing primitives live outside this crate; it only
/// ever calls this trait, never a concrete digest. Embedders supply a
/// real digest (SHA-256, say) at construction.
pub trait Hasher {
    fn hash(&self, input: &[u8]) -> [u8; 32];
}
