use crate::error::Error;

/// Protocol tag carried in bits [7..6] of a [`ControlByte`].
pub const PROTOCOL_DIRECT: u8 = 0;
pub const PROTOCOL_EPIDEMIC: u8 = 1;
pub const PROTOCOL_SPRAY_AND_WAIT: u8 = 2;

/// `destinationControlValue` carried in bits [5..4].
pub const DC_TERMINAL: u8 = 0;
pub const DC_FLOOD: u8 = 1;
pub const DC_DIRECT: u8 = 2;

const PROTOCOL_MAX: u8 = 2;
const DC_MAX: u8 = 2;
const SEQUENCE_MAX: u8 = 15;

/// One-octet header packing protocol, destination-control, and
/// sequence-number fields.
///
/// The source's stated layout (4 bits protocol / 2 bits destination-control
/// / 4 bits sequence-number) doesn't fit one octet — 10 bits in 8. This
/// implementation uses the 2/2/4 split: `protocol` in bits [7..6] (values
/// 0-2 fit comfortably in 2 bits), `destination_control` in bits [5..4]
/// (values 0-2), `sequence_number` in bits [3..0] (the full 0-15 range
/// Spray-and-Wait actually needs). Peers must agree on this layout; the
/// field semantics, not the exact bit positions, are what matters on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlByte {
    protocol: u8,
    destination_control: u8,
    sequence_number: u8,
}

impl ControlByte {
    pub fn new(protocol: u8, destination_control: u8, sequence_number: u8) -> Result<Self, Error> {
        if protocol > PROTOCOL_MAX || destination_control > DC_MAX || sequence_number > SEQUENCE_MAX
        {
            return Err(Error::InvalidControlByte {
                protocol,
                destination_control,
                sequence_number,
            });
        }
        Ok(Self {
            protocol,
            destination_control,
            sequence_number,
        })
    }

    pub fn protocol(&self) -> u8 {
        self.protocol
    }

    pub fn destination_control(&self) -> u8 {
        self.destination_control
    }

    pub fn sequence_number(&self) -> u8 {
        self.sequence_number
    }

    pub fn is_sentinel(&self) -> bool {
        self.destination_control == DC_TERMINAL
    }

    pub fn pack(&self) -> u8 {
        (self.protocol << 6) | (self.destination_control << 4) | self.sequence_number
    }

    pub fn unpack(byte: u8) -> Result<Self, Error> {
        let protocol = (byte >> 6) & 0b11;
        let destination_control = (byte >> 4) & 0b11;
        let sequence_number = byte & 0b1111;
        Self::new(protocol, destination_control, sequence_number)
    }

    /// The end-of-session sentinel control byte: all fields zero.
    pub fn sentinel() -> Self {
        Self {
            protocol: 0,
            destination_control: DC_TERMINAL,
            sequence_number: 0,
        }
    }

    pub fn with_destination_control(&self, destination_control: u8) -> Result<Self, Error> {
        Self::new(self.protocol, destination_control, self.sequence_number)
    }

    pub fn with_sequence_number(&self, sequence_number: u8) -> Result<Self, Error> {
        Self::new(self.protocol, self.destination_control, sequence_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trip_for_every_valid_combination() {
        for protocol in 0..=PROTOCOL_MAX {
            for dc in 0..=DC_MAX {
                for seq in 0..=SEQUENCE_MAX {
                    let cb = ControlByte::new(protocol, dc, seq).unwrap();
                    let byte = cb.pack();
                    let back = ControlByte::unpack(byte).unwrap();
                    assert_eq!(cb, back);
                }
            }
        }
    }

    #[test]
    fn rejects_out_of_range_protocol() {
        assert!(ControlByte::new(3, 0, 0).is_err());
    }

    #[test]
    fn rejects_out_of_range_destination_control() {
        assert!(ControlByte::new(0, 3, 0).is_err());
    }

    #[test]
    fn rejects_out_of_range_sequence_number() {
        assert!(ControlByte::new(0, 1, 16).is_err());
    }

    #[test]
    fn sentinel_has_zero_destination_control() {
        assert_eq!(ControlByte::sentinel().destination_control(), DC_TERMINAL);
        assert!(ControlByte::sentinel().is_sentinel());
    }

    #[test]
    fn sequence_number_supports_full_four_bit_range() {
        let cb = ControlByte::new(PROTOCOL_SPRAY_AND_WAIT, DC_FLOOD, 15).unwrap();
        assert_eq!(cb.sequence_number(), 15);
    }
}
