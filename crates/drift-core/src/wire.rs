//! Frame framing and parsing.
//!
//! A data frame is `controlByte(1) | hashedID(32) | hashedDestination(32) |
//! hashedSource(32) | sentTimestamp(8) | message(N)`. The end-of-session
//! sentinel is a 105-byte frame of all zero bytes (its control byte packs
//! to zero, and the rest of the frame is ignored on receipt).

use crate::control::ControlByte;
use crate::error::Error;
use crate::notification::{Notification, MIN_NOTIFICATION_LENGTH};

/// Result of parsing one frame off the wire.
pub enum Frame {
    /// The end-of-session sentinel; the rest of the frame is ignored.
    Sentinel,
    Data(Notification),
}

/// Parse a raw frame. Frames under [`MIN_NOTIFICATION_LENGTH`] are
/// rejected with [`Error::FrameTooShort`] (the caller drops them without
/// tearing down the session); malformed UTF-8 in the message body decodes
/// to an empty string rather than an error.
pub fn parse(bytes: &[u8]) -> Result<Frame, Error> {
    if bytes.len() < MIN_NOTIFICATION_LENGTH {
        return Err(Error::FrameTooShort(bytes.len()));
    }

    let control_byte = ControlByte::unpack(bytes[0])?;
    if control_byte.is_sentinel() {
        return Ok(Frame::Sentinel);
    }

    let mut hashed_id = [0u8; 32];
    hashed_id.copy_from_slice(&bytes[1..33]);
    let mut hashed_destination_address = [0u8; 32];
    hashed_destination_address.copy_from_slice(&bytes[33..65]);
    let mut hashed_source_address = [0u8; 32];
    hashed_source_address.copy_from_slice(&bytes[65..97]);
    let mut timestamp_bytes = [0u8; 8];
    timestamp_bytes.copy_from_slice(&bytes[97..105]);
    let sent_timestamp = u64::from_be_bytes(timestamp_bytes);
    let message = String::from_utf8(bytes[105..].to_vec()).unwrap_or_default();

    Ok(Frame::Data(Notification {
        control_byte,
        hashed_id,
        hashed_destination_address,
        hashed_source_address,
        sent_timestamp,
        message,
    }))
}

/// Serialize a notification to its wire frame.
pub fn encode(notification: &Notification) -> Vec<u8> {
    let message_bytes = notification.message.as_bytes();
    let mut buf = Vec::with_capacity(MIN_NOTIFICATION_LENGTH + message_bytes.len());
    buf.push(notification.control_byte.pack());
    buf.extend_from_slice(&notification.hashed_id);
    buf.extend_from_slice(&notification.hashed_destination_address);
    buf.extend_from_slice(&notification.hashed_source_address);
    buf.extend_from_slice(&notification.sent_timestamp.to_be_bytes());
    buf.extend_from_slice(message_bytes);
    buf
}

/// The end-of-session sentinel: exactly [`MIN_NOTIFICATION_LENGTH`] zero
/// bytes (a zero control byte already packs to `destination_control == 0`).
pub fn sentinel_frame() -> Vec<u8> {
    vec![0u8; MIN_NOTIFICATION_LENGTH]
}
