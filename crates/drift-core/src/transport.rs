//! The transport contract the engine is generic over.
//!
//! The radio transport itself — connection establishment, advertisement,
//! MTU negotiation, link-layer retransmits — lives outside this crate;
//! `drift-core` only needs this narrow surface. Kept as a generic bound
//! rather than a trait object, favoring concrete generic transports on
//! the hot path over `dyn` dispatch.
pub trait Transport {
    /// MTU for a single frame; must be `>= MIN_NOTIFICATION_LENGTH`.
    fn max_notification_length(&self) -> usize;

    /// Attempt to send one frame. `true` on accepted, `false` on
    /// back-pressure (not an error — drives session-driver suspension).
    fn send(&mut self, bytes: &[u8]) -> bool;

    /// Fire-and-forget 32-byte acknowledgement to the current peer.
    fn acknowledge(&mut self, hashed_id: [u8; 32]);

    /// Tear down the current peer session.
    fn disconnect(&mut self);

    /// Republish presence under a fresh tag, called after every store
    /// insertion.
    fn advertise(&mut self, tag: &str);
}
