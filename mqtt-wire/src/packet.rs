//! Packet kinds and the flag nibble of the fixed header.
//!
//! Every MQTT control packet starts with a byte whose upper four bits name
//! the [`PacketType`] and whose lower four bits hold flags. For every type
//! except PUBLISH the flags are fixed by the protocol. PUBLISH splits them
//! into the duplicate, QoS and retain fields represented by [`PublishFlags`].
//!
//! [`PacketKind`] combines both: it is a closed enumeration of the packet
//! kinds in which only the `Publish` variant carries flags, so a value of
//! this type can never hold flags the protocol forbids.

use crate::{Error, QoS};

/// MQTT packet types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    /// Connection request
    Connect = 1,
    /// Connect acknowledgment
    ConnAck,
    /// Publish message
    Publish,
    /// Publish acknowledgment (QoS 1)
    PubAck,
    /// Publish received (QoS 2 delivery part 1)
    PubRec,
    /// Publish release (QoS 2 delivery part 2)
    PubRel,
    /// Publish complete (QoS 2 delivery part 3)
    PubComp,
    /// Subscribe request
    Subscribe,
    /// Subscribe acknowledgment
    SubAck,
    /// Unsubscribe request
    Unsubscribe,
    /// Unsubscribe acknowledgment
    UnsubAck,
    /// PING request
    PingReq,
    /// PING response
    PingResp,
    /// Disconnect notification
    Disconnect,
    /// Authentication exchange
    Auth,
}

impl PacketType {
    /// All packet types in type code order
    pub const ALL: [PacketType; 15] = [
        PacketType::Connect,
        PacketType::ConnAck,
        PacketType::Publish,
        PacketType::PubAck,
        PacketType::PubRec,
        PacketType::PubRel,
        PacketType::PubComp,
        PacketType::Subscribe,
        PacketType::SubAck,
        PacketType::Unsubscribe,
        PacketType::UnsubAck,
        PacketType::PingReq,
        PacketType::PingResp,
        PacketType::Disconnect,
        PacketType::Auth,
    ];

    /// The 4-bit type code carried in the upper nibble of the control field
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The flags the protocol mandates for this type.
    ///
    /// Returns `None` for PUBLISH, whose flags vary per message.
    pub const fn fixed_flags(self) -> Option<u8> {
        match self {
            PacketType::Publish => None,
            PacketType::PubRel | PacketType::Subscribe | PacketType::Unsubscribe => Some(0b0010),
            _ => Some(0b0000),
        }
    }
}

impl TryFrom<u8> for PacketType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PacketType::Connect),
            2 => Ok(PacketType::ConnAck),
            3 => Ok(PacketType::Publish),
            4 => Ok(PacketType::PubAck),
            5 => Ok(PacketType::PubRec),
            6 => Ok(PacketType::PubRel),
            7 => Ok(PacketType::PubComp),
            8 => Ok(PacketType::Subscribe),
            9 => Ok(PacketType::SubAck),
            10 => Ok(PacketType::Unsubscribe),
            11 => Ok(PacketType::UnsubAck),
            12 => Ok(PacketType::PingReq),
            13 => Ok(PacketType::PingResp),
            14 => Ok(PacketType::Disconnect),
            15 => Ok(PacketType::Auth),
            x => Err(Error::InvalidPacketType(x)),
        }
    }
}

/// Flags of a PUBLISH fixed header
///
/// ```text
///   3       2       1       0
/// +-------+---------------+--------+
/// |  DUP  |   QoS level   | RETAIN |
/// +-------+---------------+--------+
/// ```
///
/// Values are immutable, the `with_*` methods return an updated copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PublishFlags(u8);

impl PublishFlags {
    const DUP_SHIFT: u8 = 3;
    const DUP_MASK: u8 = 0b1;
    const QOS_SHIFT: u8 = 1;
    const QOS_MASK: u8 = 0b11;
    const RETAIN_SHIFT: u8 = 0;
    const RETAIN_MASK: u8 = 0b1;

    pub const fn new(dup: bool, qos: QoS, retain: bool) -> Self {
        PublishFlags(
            ((dup as u8) << Self::DUP_SHIFT)
                | ((qos as u8) << Self::QOS_SHIFT)
                | ((retain as u8) << Self::RETAIN_SHIFT),
        )
    }

    /// Interpret a raw flag nibble
    ///
    /// # Errors
    /// Fails when `bits` does not fit in four bits or encodes QoS 3.
    pub fn from_bits(bits: u8) -> Result<Self, Error> {
        if bits > 0x0F {
            return Err(Error::FlagsOverflow(bits));
        }

        QoS::try_from((bits >> Self::QOS_SHIFT) & Self::QOS_MASK)?;
        Ok(PublishFlags(bits))
    }

    /// The raw flag nibble
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn dup(self) -> bool {
        (self.0 >> Self::DUP_SHIFT) & Self::DUP_MASK != 0
    }

    pub fn qos(self) -> QoS {
        match (self.0 >> Self::QOS_SHIFT) & Self::QOS_MASK {
            0 => QoS::AtMostOnce,
            1 => QoS::AtLeastOnce,
            // 3 is rejected by every constructor
            _ => QoS::ExactlyOnce,
        }
    }

    pub const fn retain(self) -> bool {
        (self.0 >> Self::RETAIN_SHIFT) & Self::RETAIN_MASK != 0
    }

    pub const fn with_dup(self, dup: bool) -> Self {
        self.set(Self::DUP_SHIFT, Self::DUP_MASK, dup as u8)
    }

    pub const fn with_qos(self, qos: QoS) -> Self {
        self.set(Self::QOS_SHIFT, Self::QOS_MASK, qos as u8)
    }

    pub const fn with_retain(self, retain: bool) -> Self {
        self.set(Self::RETAIN_SHIFT, Self::RETAIN_MASK, retain as u8)
    }

    const fn set(self, shift: u8, mask: u8, value: u8) -> Self {
        PublishFlags((self.0 & !(mask << shift)) | ((value & mask) << shift))
    }
}

/// The kind of a control packet, as far as the fixed header is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    Connect,
    ConnAck,
    Publish(PublishFlags),
    PubAck,
    PubRec,
    PubRel,
    PubComp,
    Subscribe,
    SubAck,
    Unsubscribe,
    UnsubAck,
    PingReq,
    PingResp,
    Disconnect,
    Auth,
}

impl PacketKind {
    /// Build a kind from a packet type and a caller supplied flag nibble
    ///
    /// # Errors
    /// Fails when the flags differ from the value mandated for `packet_type`,
    /// or, for PUBLISH, when they encode QoS 3.
    pub fn new(packet_type: PacketType, flags: u8) -> Result<Self, Error> {
        match packet_type.fixed_flags() {
            None => Ok(PacketKind::Publish(PublishFlags::from_bits(flags)?)),
            Some(expected) if expected == flags => Ok(Self::fixed(packet_type)),
            Some(expected) => Err(Error::InvalidFlags {
                packet_type,
                expected,
                actual: flags,
            }),
        }
    }

    /// Kind for a packet type with fixed flags. PUBLISH maps to default flags.
    pub const fn fixed(packet_type: PacketType) -> Self {
        match packet_type {
            PacketType::Connect => PacketKind::Connect,
            PacketType::ConnAck => PacketKind::ConnAck,
            PacketType::Publish => PacketKind::Publish(PublishFlags(0)),
            PacketType::PubAck => PacketKind::PubAck,
            PacketType::PubRec => PacketKind::PubRec,
            PacketType::PubRel => PacketKind::PubRel,
            PacketType::PubComp => PacketKind::PubComp,
            PacketType::Subscribe => PacketKind::Subscribe,
            PacketType::SubAck => PacketKind::SubAck,
            PacketType::Unsubscribe => PacketKind::Unsubscribe,
            PacketType::UnsubAck => PacketKind::UnsubAck,
            PacketType::PingReq => PacketKind::PingReq,
            PacketType::PingResp => PacketKind::PingResp,
            PacketType::Disconnect => PacketKind::Disconnect,
            PacketType::Auth => PacketKind::Auth,
        }
    }

    pub const fn packet_type(&self) -> PacketType {
        match self {
            PacketKind::Connect => PacketType::Connect,
            PacketKind::ConnAck => PacketType::ConnAck,
            PacketKind::Publish(_) => PacketType::Publish,
            PacketKind::PubAck => PacketType::PubAck,
            PacketKind::PubRec => PacketType::PubRec,
            PacketKind::PubRel => PacketType::PubRel,
            PacketKind::PubComp => PacketType::PubComp,
            PacketKind::Subscribe => PacketType::Subscribe,
            PacketKind::SubAck => PacketType::SubAck,
            PacketKind::Unsubscribe => PacketType::Unsubscribe,
            PacketKind::UnsubAck => PacketType::UnsubAck,
            PacketKind::PingReq => PacketType::PingReq,
            PacketKind::PingResp => PacketType::PingResp,
            PacketKind::Disconnect => PacketType::Disconnect,
            PacketKind::Auth => PacketType::Auth,
        }
    }

    /// The flag nibble written to the wire
    pub const fn flags(&self) -> u8 {
        match self {
            PacketKind::Publish(flags) => flags.bits(),
            kind => match kind.packet_type().fixed_flags() {
                Some(flags) => flags,
                None => 0,
            },
        }
    }

    /// The first byte of the fixed header
    pub const fn control_field(&self) -> u8 {
        (self.packet_type().code() << 4) | self.flags()
    }

    pub const fn publish_flags(&self) -> Option<PublishFlags> {
        match self {
            PacketKind::Publish(flags) => Some(*flags),
            _ => None,
        }
    }
}

impl From<PublishFlags> for PacketKind {
    fn from(flags: PublishFlags) -> Self {
        PacketKind::Publish(flags)
    }
}
