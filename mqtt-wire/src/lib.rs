//! MQTT wire format primitives
//!
//! This crate implements the parts of the MQTT control packet format that
//! every packet shares, for both MQTT 3.1.1 and MQTT 5.0:
//!
//! - the Variable Byte Integer encoding ([`VarInt`])
//! - the fixed header: packet type, flags and remaining length ([`FixedHeader`])
//! - the MQTT 5.0 property identifier registry ([`property`])
//!
//! [`Codec`] uses the fixed header to split a byte stream into frames.
//! Parsing the variable header and payload of each packet kind is left to
//! higher layers.

mod codec;
mod error;
mod header;
mod packet;
pub mod property;
pub mod varint;

pub use codec::{Codec, Frame};
pub use error::{Error, ErrorKind};
pub use header::FixedHeader;
pub use packet::{PacketKind, PacketType, PublishFlags};
pub use property::{PropertyDescriptor, PropertyType, ValueKind};
pub use varint::VarInt;

/// Quality of Service levels for packet delivery.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Hash)]
#[allow(clippy::enum_variant_names)]
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl TryFrom<u8> for QoS {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            qos => Err(Error::InvalidQoS(qos)),
        }
    }
}
