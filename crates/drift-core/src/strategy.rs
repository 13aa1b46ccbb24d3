//! The per-protocol accept/transmit state machine.
//!
//! Modeled as a tagged-sum Strategy variant rather than a subclass chain:
//! the three protocols share no mutable state of their own beyond
//! Spray-and-Wait's initial copy budget, and the engine (not the
//! strategy) owns the store, address, receive set, and transmit queue.

use crate::control::{ControlByte, DC_DIRECT, DC_FLOOD, DC_TERMINAL, PROTOCOL_DIRECT, PROTOCOL_EPIDEMIC, PROTOCOL_SPRAY_AND_WAIT};
use crate::error::Error;
use crate::hasher::Hasher;
use crate::notification::Notification;

/// Spray-and-Wait's copy budget must be in `[1, 15]`.
pub const MAX_COPIES: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    Epidemic,
    SprayAndWait { initial_copies: u8 },
}

impl Strategy {
    pub fn spray_and_wait(initial_copies: u8) -> Result<Self, Error> {
        if initial_copies == 0 || initial_copies > MAX_COPIES {
            return Err(Error::InvalidControlByte {
                protocol: PROTOCOL_SPRAY_AND_WAIT,
                destination_control: DC_FLOOD,
                sequence_number: initial_copies,
            });
        }
        Ok(Self::SprayAndWait { initial_copies })
    }

    pub fn protocol_value(&self) -> u8 {
        match self {
            Strategy::Direct => PROTOCOL_DIRECT,
            Strategy::Epidemic => PROTOCOL_EPIDEMIC,
            Strategy::SprayAndWait { .. } => PROTOCOL_SPRAY_AND_WAIT,
        }
    }

    /// `create(dest, msg)` — build a fresh outbound notification.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &self,
        hasher: &dyn Hasher,
        hashed_destination_address: [u8; 32],
        hashed_source_address: [u8; 32],
        sent_timestamp: u64,
        message: String,
    ) -> Notification {
        let control_byte = match self {
            Strategy::Direct => ControlByte::new(PROTOCOL_DIRECT, DC_DIRECT, 0),
            Strategy::Epidemic => ControlByte::new(PROTOCOL_EPIDEMIC, DC_FLOOD, 0),
            Strategy::SprayAndWait { initial_copies } => {
                ControlByte::new(PROTOCOL_SPRAY_AND_WAIT, DC_FLOOD, *initial_copies)
            }
        }
        .expect("strategy-constructed control bytes are always in range");

        Notification::create(
            hasher,
            control_byte,
            hashed_destination_address,
            hashed_source_address,
            sent_timestamp,
            message,
        )
    }

    /// `accept(notification)` — should this received notification be
    /// stored at all?
    pub fn accept(&self, own_hashed_address: &[u8; 32], notification: &Notification) -> bool {
        let dc = notification.control_byte.destination_control();
        let is_for_us = notification.hashed_destination_address == *own_hashed_address;
        match self {
            Strategy::Direct => dc == DC_DIRECT && is_for_us,
            Strategy::Epidemic => dc == DC_FLOOD,
            Strategy::SprayAndWait { .. } => dc == DC_FLOOD || is_for_us,
        }
    }

    /// Spray-and-Wait acceptance immediately asks the transport to
    /// acknowledge; Direct and Epidemic never do.
    pub fn requests_acknowledgement_on_accept(&self) -> bool {
        matches!(self, Strategy::SprayAndWait { .. })
    }

    /// `transmit_mutate(notification)` — the control byte to put on the
    /// wire for this hop. The stored record is untouched; Spray-and-Wait
    /// only mutates its stored sequence number on acknowledgement receipt.
    pub fn transmit_mutate(&self, notification: &Notification) -> ControlByte {
        match self {
            Strategy::Direct | Strategy::Epidemic => notification.control_byte,
            Strategy::SprayAndWait { .. } => {
                let cb = notification.control_byte;
                let halved = cb.sequence_number() / 2;
                match cb.with_sequence_number(halved) {
                    Ok(mutated) if halved >= 1 => mutated,
                    _ => cb
                        .with_destination_control(DC_DIRECT)
                        .expect("dc=2 is always in range"),
                }
            }
        }
    }

    /// `receiveAcknowledgement(hashedID)` applied to the stored
    /// notification it addresses. Returns `true` if the protocol supports
    /// acknowledgements and mutated the record, `false` for Direct/Epidemic
    /// where acknowledgements are unsupported.
    pub fn apply_acknowledgement(&self, notification: &mut Notification) -> bool {
        match self {
            Strategy::Direct | Strategy::Epidemic => false,
            Strategy::SprayAndWait { .. } => {
                let cb = notification.control_byte;
                let halved = cb.sequence_number() / 2;
                notification.control_byte = if halved >= 1 {
                    cb.with_sequence_number(halved).expect("halved >= 1 is in range")
                } else {
                    cb.with_destination_control(DC_DIRECT).expect("dc=2 is always in range")
                };
                true
            }
        }
    }

    /// Whether an incoming notification is addressed to `own_hashed_address`
    /// and should transition to `Delivered` (dc=0) and land in the inbox.
    pub fn is_delivery(own_hashed_address: &[u8; 32], notification: &Notification) -> bool {
        notification.hashed_destination_address == *own_hashed_address
    }

    pub fn mark_delivered(notification: &mut Notification) {
        notification.control_byte = notification
            .control_byte
            .with_destination_control(DC_TERMINAL)
            .expect("dc=0 is always in range");
    }
}
