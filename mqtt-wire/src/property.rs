//! Registry of MQTT 5.0 property identifiers
//!
//! A property consists of an identifier, encoded as a Variable Byte Integer,
//! followed by a value whose encoding is fixed per identifier. This module
//! only resolves identifiers to their [`PropertyDescriptor`]. Reading and
//! writing property values is up to the packet layer built on top of it.

use crate::PacketType::{self, *};
use crate::{Error, VarInt};

/// Data representation of a property value
///
/// See [specification](https://docs.oasis-open.org/mqtt/mqtt/v5.0/os/mqtt-v5.0-os.html#_Toc3901006).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Byte,
    TwoByteInteger,
    FourByteInteger,
    VariableByteInteger,
    Utf8String,
    Utf8StringPair,
    BinaryData,
}

impl ValueKind {
    /// Encoded width of the value, for fixed width kinds
    pub const fn fixed_len(self) -> Option<usize> {
        match self {
            ValueKind::Byte => Some(1),
            ValueKind::TwoByteInteger => Some(2),
            ValueKind::FourByteInteger => Some(4),
            _ => None,
        }
    }
}

/// Identifiers of the different properties used in MQTT 5.0
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    PayloadFormatIndicator = 1,
    MessageExpiryInterval = 2,
    ContentType = 3,
    ResponseTopic = 8,
    CorrelationData = 9,
    SubscriptionIdentifier = 11,
    SessionExpiryInterval = 17,
    AssignedClientIdentifier = 18,
    ServerKeepAlive = 19,
    AuthenticationMethod = 21,
    AuthenticationData = 22,
    RequestProblemInformation = 23,
    WillDelayInterval = 24,
    RequestResponseInformation = 25,
    ResponseInformation = 26,
    ServerReference = 28,
    ReasonString = 31,
    ReceiveMaximum = 33,
    TopicAliasMaximum = 34,
    TopicAlias = 35,
    MaximumQos = 36,
    RetainAvailable = 37,
    UserProperty = 38,
    MaximumPacketSize = 39,
    WildcardSubscriptionAvailable = 40,
    SubscriptionIdentifierAvailable = 41,
    SharedSubscriptionAvailable = 42,
}

/// Static information about one property identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub property: PropertyType,
    pub name: &'static str,
    pub value_kind: ValueKind,
    /// Packets whose variable header may carry the property
    pub packets: &'static [PacketType],
    /// Whether the property may appear in the Will Properties of CONNECT
    pub will: bool,
}

impl PropertyDescriptor {
    pub const fn identifier(&self) -> u8 {
        self.property as u8
    }
}

const CONNACK_ONLY: &[PacketType] = &[ConnAck];
const CONNECT_ONLY: &[PacketType] = &[Connect];
const CONNECT_CONNACK: &[PacketType] = &[Connect, ConnAck];
const AUTHENTICATION: &[PacketType] = &[Connect, ConnAck, Auth];

macro_rules! descriptor {
    ($property:ident, $name:literal, $kind:ident, $packets:expr, $will:literal) => {
        PropertyDescriptor {
            property: PropertyType::$property,
            name: $name,
            value_kind: ValueKind::$kind,
            packets: $packets,
            will: $will,
        }
    };
    ($property:ident, $name:literal, $kind:ident, $packets:expr) => {
        descriptor!($property, $name, $kind, $packets, false)
    };
}

// Sorted by identifier
#[rustfmt::skip]
static PROPERTIES: [PropertyDescriptor; 27] = [
    descriptor!(PayloadFormatIndicator, "Payload Format Indicator", Byte, &[Publish], true),
    descriptor!(MessageExpiryInterval, "Message Expiry Interval", FourByteInteger, &[Publish], true),
    descriptor!(ContentType, "Content Type", Utf8String, &[Publish], true),
    descriptor!(ResponseTopic, "Response Topic", Utf8String, &[Publish], true),
    descriptor!(CorrelationData, "Correlation Data", BinaryData, &[Publish], true),
    descriptor!(SubscriptionIdentifier, "Subscription Identifier", VariableByteInteger, &[Publish, Subscribe]),
    descriptor!(SessionExpiryInterval, "Session Expiry Interval", FourByteInteger, &[Connect, ConnAck, Disconnect]),
    descriptor!(AssignedClientIdentifier, "Assigned Client Identifier", Utf8String, CONNACK_ONLY),
    descriptor!(ServerKeepAlive, "Server Keep Alive", TwoByteInteger, CONNACK_ONLY),
    descriptor!(AuthenticationMethod, "Authentication Method", Utf8String, AUTHENTICATION),
    descriptor!(AuthenticationData, "Authentication Data", BinaryData, AUTHENTICATION),
    descriptor!(RequestProblemInformation, "Request Problem Information", Byte, CONNECT_ONLY),
    descriptor!(WillDelayInterval, "Will Delay Interval", FourByteInteger, &[], true),
    descriptor!(RequestResponseInformation, "Request Response Information", Byte, CONNECT_ONLY),
    descriptor!(ResponseInformation, "Response Information", Utf8String, CONNACK_ONLY),
    descriptor!(ServerReference, "Server Reference", Utf8String, &[ConnAck, Disconnect]),
    descriptor!(ReasonString, "Reason String", Utf8String, &[ConnAck, PubAck, PubRec, PubRel, PubComp, SubAck, UnsubAck, Disconnect, Auth]),
    descriptor!(ReceiveMaximum, "Receive Maximum", TwoByteInteger, CONNECT_CONNACK),
    descriptor!(TopicAliasMaximum, "Topic Alias Maximum", TwoByteInteger, CONNECT_CONNACK),
    descriptor!(TopicAlias, "Topic Alias", TwoByteInteger, &[Publish]),
    descriptor!(MaximumQos, "Maximum QoS", Byte, CONNACK_ONLY),
    descriptor!(RetainAvailable, "Retain Available", Byte, CONNACK_ONLY),
    descriptor!(UserProperty, "User Property", Utf8StringPair, &[Connect, ConnAck, Publish, PubAck, PubRec, PubRel, PubComp, Subscribe, SubAck, Unsubscribe, UnsubAck, Disconnect, Auth], true),
    descriptor!(MaximumPacketSize, "Maximum Packet Size", FourByteInteger, CONNECT_CONNACK),
    descriptor!(WildcardSubscriptionAvailable, "Wildcard Subscription Available", Byte, CONNACK_ONLY),
    descriptor!(SubscriptionIdentifierAvailable, "Subscription Identifier Available", Byte, CONNACK_ONLY),
    descriptor!(SharedSubscriptionAvailable, "Shared Subscription Available", Byte, CONNACK_ONLY),
];

/// All known properties in identifier order
pub fn registry() -> &'static [PropertyDescriptor] {
    &PROPERTIES
}

/// Resolve a property identifier
pub fn lookup(identifier: u8) -> Result<&'static PropertyDescriptor, Error> {
    PROPERTIES
        .binary_search_by_key(&identifier, PropertyDescriptor::identifier)
        .map(|index| &PROPERTIES[index])
        .map_err(|_| Error::InvalidPropertyType(identifier as u32))
}

impl PropertyType {
    pub fn descriptor(self) -> &'static PropertyDescriptor {
        // every variant has an entry, see `registry_is_complete`
        &PROPERTIES[PROPERTIES.partition_point(|d| d.identifier() < self as u8)]
    }

    pub fn value_kind(self) -> ValueKind {
        self.descriptor().value_kind
    }

    /// Whether the property may appear in the variable header of `packet_type`
    pub fn allowed_in(self, packet_type: PacketType) -> bool {
        self.descriptor().packets.contains(&packet_type)
    }

    /// Read a property identifier that starts at `offset` in `buf`
    ///
    /// Identifiers are Variable Byte Integers on the wire. Returns the
    /// property and the number of bytes consumed.
    pub fn read(buf: &[u8], offset: usize) -> Result<(PropertyType, usize), Error> {
        let id = VarInt::read(buf, offset)?;
        let property = u8::try_from(id.value())
            .ok()
            .and_then(|identifier| lookup(identifier).ok())
            .map(|descriptor| descriptor.property)
            .ok_or(Error::MalformedPropertyType {
                offset,
                identifier: id.into(),
            })?;

        Ok((property, id.length()))
    }
}

impl TryFrom<u8> for PropertyType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        lookup(value).map(|descriptor| descriptor.property)
    }
}
