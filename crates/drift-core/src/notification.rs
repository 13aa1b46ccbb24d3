use crate::control::ControlByte;
use crate::hasher::Hasher;

/// `1 (controlByte) + 32 (hashedID) + 32 (hashedDestinationAddress) + 32
/// (hashedSourceAddress) + 8 (sentTimestamp)`.
pub const MIN_NOTIFICATION_LENGTH: usize = 105;

/// In-memory and persistent entity carrying one routed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub control_byte: ControlByte,
    pub hashed_id: [u8; 32],
    pub hashed_destination_address: [u8; 32],
    pub hashed_source_address: [u8; 32],
    pub sent_timestamp: u64,
    pub message: String,
}

impl Notification {
    /// Construct a new notification, deriving `hashed_id` from
    /// `(hashed_source_address, sent_timestamp, message)` via `hasher`.
    pub fn create(
        hasher: &dyn Hasher,
        control_byte: ControlByte,
        hashed_destination_address: [u8; 32],
        hashed_source_address: [u8; 32],
        sent_timestamp: u64,
        message: String,
    ) -> Self {
        let hashed_id = Self::derive_hashed_id(hasher, &hashed_source_address, sent_timestamp, &message);
        Self {
            control_byte,
            hashed_id,
            hashed_destination_address,
            hashed_source_address,
            sent_timestamp,
            message,
        }
    }

    pub fn derive_hashed_id(
        hasher: &dyn Hasher,
        hashed_source_address: &[u8; 32],
        sent_timestamp: u64,
        message: &str,
    ) -> [u8; 32] {
        let mut buf = Vec::with_capacity(32 + 8 + message.len());
        buf.extend_from_slice(hashed_source_address);
        buf.extend_from_slice(&sent_timestamp.to_be_bytes());
        buf.extend_from_slice(message.as_bytes());
        hasher.hash(&buf)
    }

    /// A record is transmittable iff its destination control hasn't
    /// collapsed to terminal (0). Delivered-to-us and otherwise-terminal
    /// notifications stay in the store for duplicate suppression but are
    /// never re-queued for transmission.
    pub fn is_transmittable(&self) -> bool {
        self.control_byte.destination_control() != crate::control::DC_TERMINAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ControlByte, DC_FLOOD, PROTOCOL_EPIDEMIC};

    struct Sha256Stub;
    impl Hasher for Sha256Stub {
        fn hash(&self, input: &[u8]) -> [u8; 32] {
            use sha2::{Digest, Sha256};
            let mut hasher = Sha256::new();
            hasher.update(input);
            hasher.finalize().into()
        }
    }

    #[test]
    fn hashed_id_is_deterministic_given_same_inputs() {
        let hasher = Sha256Stub;
        let cb = ControlByte::new(PROTOCOL_EPIDEMIC, DC_FLOOD, 0).unwrap();
        let n1 = Notification::create(&hasher, cb, [1u8; 32], [2u8; 32], 1000, "hi".into());
        let n2 = Notification::create(&hasher, cb, [9u8; 32], [2u8; 32], 1000, "hi".into());
        assert_eq!(n1.hashed_id, n2.hashed_id, "destination doesn't feed hashed_id");
    }

    #[test]
    fn hashed_id_changes_with_message() {
        let hasher = Sha256Stub;
        let cb = ControlByte::new(PROTOCOL_EPIDEMIC, DC_FLOOD, 0).unwrap();
        let n1 = Notification::create(&hasher, cb, [1u8; 32], [2u8; 32], 1000, "hi".into());
        let n2 = Notification::create(&hasher, cb, [1u8; 32], [2u8; 32], 1000, "bye".into());
        assert_ne!(n1.hashed_id, n2.hashed_id);
    }

    #[test]
    fn terminal_control_is_not_transmittable() {
        let hasher = Sha256Stub;
        let mut cb = ControlByte::new(PROTOCOL_EPIDEMIC, DC_FLOOD, 0).unwrap();
        let mut n = Notification::create(&hasher, cb, [1u8; 32], [2u8; 32], 1000, "hi".into());
        assert!(n.is_transmittable());
        cb = cb.with_destination_control(crate::control::DC_TERMINAL).unwrap();
        n.control_byte = cb;
        assert!(!n.is_transmittable());
    }
}
