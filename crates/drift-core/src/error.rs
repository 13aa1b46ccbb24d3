use thiserror::Error;

/// Errors surfaced across the engine.
///
/// Per the receive-path rules, most of these are absorbed internally and
/// never reach an embedder; `InvalidControlByte` is the one variant that
/// can legitimately propagate out of a user-facing call such as
/// `Engine::set_number_of_copies`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("control byte field out of range: protocol={protocol}, destination_control={destination_control}, sequence_number={sequence_number}")]
    InvalidControlByte {
        protocol: u8,
        destination_control: u8,
        sequence_number: u8,
    },

    #[error("frame too short: {0} bytes (minimum {min})", min = crate::notification::MIN_NOTIFICATION_LENGTH)]
    FrameTooShort(usize),

    /// Not currently constructed: the protocol-mismatch receive-path check
    /// (§4.2 step 4) returns a `Dropped` outcome directly rather than this
    /// `Err` variant, since a mismatch is expected, silently-dropped input,
    /// not a propagated error. Kept for the §7 error-kind inventory.
    #[error("protocol mismatch: frame carries protocol {frame}, engine runs {engine}")]
    ProtocolMismatch { frame: u8, engine: u8 },

    #[error("store persistence failure: {0}")]
    StorePersistence(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
