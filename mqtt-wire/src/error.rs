use crate::PacketType;

/// Error during serialization or deserialization
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Variable byte integer out of range = {0}, must be between 0 and 268435455")]
    VarIntOutOfRange(i64),
    #[error("Flags for {packet_type:?} must be {expected:#06b}, got {actual:#06b}")]
    InvalidFlags {
        packet_type: PacketType,
        expected: u8,
        actual: u8,
    },
    #[error("Flags value {0:#x} does not fit in 4 bits")]
    FlagsOverflow(u8),
    #[error("Invalid QoS level = {0}")]
    InvalidQoS(u8),
    #[error("Remaining length {declared} does not match body of {actual} bytes")]
    RemainingLengthMismatch { declared: usize, actual: usize },
    #[error("Variable byte integer at offset {offset} continues past 4 bytes")]
    MalformedVarInt { offset: usize },
    #[error("Flags at offset {offset} for {packet_type:?} must be {expected:#06b}, got {actual:#06b}")]
    MalformedFlags {
        offset: usize,
        packet_type: PacketType,
        expected: u8,
        actual: u8,
    },
    #[error("Publish flags {flags:#06b} at offset {offset} carry reserved QoS 3")]
    MalformedPublishQoS { offset: usize, flags: u8 },
    /// More bytes required to finish decoding. `needed` is the minimum
    /// number of additional bytes required to proceed further.
    #[error("Insufficient number of bytes at offset {offset}, {needed} more bytes required")]
    InsufficientBytes { offset: usize, needed: usize },
    #[error("Invalid packet type = {0:#x}")]
    InvalidPacketType(u8),
    #[error("Invalid packet type = {nibble:#x} at offset {offset}")]
    MalformedPacketType { offset: usize, nibble: u8 },
    #[error("Invalid property identifier = {0:#04x}")]
    InvalidPropertyType(u32),
    #[error("Invalid property identifier = {identifier:#04x} at offset {offset}")]
    MalformedPropertyType { offset: usize, identifier: u32 },
    #[error("Max Payload size of {max:?} has been exceeded by packet of {pkt_size:?} bytes")]
    PayloadSizeLimitExceeded { pkt_size: u32, max: u32 },
    #[error("Cannot send packet of size '{pkt_size:?}'. It's greater than the maximum packet size of: '{max:?}'")]
    OutgoingPacketTooLarge { pkt_size: u32, max: u32 },
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value handed to an encoder is outside its domain
    InvalidArgument,
    /// Decoded bytes violate the shape the protocol mandates
    MalformedEncoding,
    /// The input ended before a value could be completed
    TruncatedInput,
    UnknownPacketType,
    UnknownPropertyIdentifier,
    /// A frame exceeds the configured size limit
    PacketTooLarge,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::VarIntOutOfRange(_)
            | Error::InvalidFlags { .. }
            | Error::FlagsOverflow(_)
            | Error::InvalidQoS(_)
            | Error::RemainingLengthMismatch { .. } => ErrorKind::InvalidArgument,
            Error::MalformedVarInt { .. }
            | Error::MalformedFlags { .. }
            | Error::MalformedPublishQoS { .. } => ErrorKind::MalformedEncoding,
            Error::InsufficientBytes { .. } => ErrorKind::TruncatedInput,
            Error::InvalidPacketType(_) | Error::MalformedPacketType { .. } => {
                ErrorKind::UnknownPacketType
            }
            Error::InvalidPropertyType(_) | Error::MalformedPropertyType { .. } => {
                ErrorKind::UnknownPropertyIdentifier
            }
            Error::PayloadSizeLimitExceeded { .. } | Error::OutgoingPacketTooLarge { .. } => {
                ErrorKind::PacketTooLarge
            }
            Error::Io(_) => ErrorKind::Io,
        }
    }
}
