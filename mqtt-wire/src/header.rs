//! Functionality for dealing with fixed headers of MQTT packets.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{Error, PacketKind, PacketType, PublishFlags, VarInt};

/// Fixed header of an MQTT Control Packet
///
/// See [specification](https://docs.oasis-open.org/mqtt/mqtt/v5.0/os/mqtt-v5.0-os.html#_Toc3901021).
///
/// ```text
///           7                          3                          0
///           +--------------------------+--------------------------+
/// byte 1    | MQTT Control Packet Type |   Flags for each type    |
///           +--------------------------+--------------------------+
/// bytes 2.. |            Remaining Length (1 to 4 bytes)          |
///           +-----------------------------------------------------+
/// ```
///
/// The remaining length is taken as given. Checking it against the body
/// that follows is left to whoever assembles the full packet.
///
/// Equality compares the encoded width of the remaining length too, so a
/// header decoded from a non-minimal encoding such as `C0 80 00` is not
/// equal to one built with [`VarInt::constant(0)`](VarInt::constant).
/// Compare [`FixedHeader::remaining_len`] values when only the length matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedHeader {
    kind: PacketKind,
    /// Remaining length of the packet.
    ///
    /// This does not include the fixed header bytes.
    /// It represents the variable header + payload.
    remaining_len: VarInt,
}

impl FixedHeader {
    pub const fn new(kind: PacketKind, remaining_len: VarInt) -> FixedHeader {
        FixedHeader {
            kind,
            remaining_len,
        }
    }

    /// Build a header from raw parts supplied by a caller
    ///
    /// # Errors
    /// Fails when `flags` conflict with the flags mandated for `packet_type`,
    /// when PUBLISH flags carry QoS 3, or when `remaining_len` can not be
    /// encoded as a variable byte integer.
    pub fn from_parts(
        packet_type: PacketType,
        flags: u8,
        remaining_len: usize,
    ) -> Result<FixedHeader, Error> {
        let kind = PacketKind::new(packet_type, flags)?;
        Ok(Self::new(kind, VarInt::new(remaining_len)?))
    }

    pub const fn kind(&self) -> PacketKind {
        self.kind
    }

    pub const fn packet_type(&self) -> PacketType {
        self.kind.packet_type()
    }

    /// Get the flag bits from the control field
    #[inline]
    pub const fn flags(&self) -> u8 {
        self.kind.flags()
    }

    /// The PUBLISH flags, if this is the header of a PUBLISH packet
    pub const fn publish_flags(&self) -> Option<PublishFlags> {
        self.kind.publish_flags()
    }

    /// Contains the packet type and several flags
    #[inline]
    pub const fn control_field(&self) -> u8 {
        self.kind.control_field()
    }

    pub const fn remaining_len(&self) -> VarInt {
        self.remaining_len
    }

    /// Returns the size of the fixed header
    #[inline]
    pub const fn size(&self) -> usize {
        1 + self.remaining_len.length()
    }

    /// Returns the size of full packet (fixed header + variable header + payload)
    ///
    /// Fixed header is enough to get the size of a frame in the stream
    #[inline]
    pub const fn packet_size(&self) -> usize {
        self.size() + self.remaining_len.value()
    }

    /// Write the fixed header to the stream, returning the bytes written
    pub fn write(&self, stream: &mut BytesMut) -> usize {
        stream.put_u8(self.control_field());
        1 + self.remaining_len.write(stream)
    }

    /// Serialize the fixed header into a fresh buffer
    pub fn to_bytes(&self) -> Bytes {
        let mut stream = BytesMut::with_capacity(self.size());
        self.write(&mut stream);
        stream.freeze()
    }

    /// Read a fixed header that starts at `offset` in `buf`
    ///
    /// The number of bytes consumed is [`FixedHeader::size`].
    pub fn read(buf: &[u8], offset: usize) -> Result<FixedHeader, Error> {
        let byte1 = *buf.get(offset).ok_or(Error::InsufficientBytes {
            offset,
            // control field and at least one byte of remaining length
            needed: offset.saturating_add(2).saturating_sub(buf.len()).max(1),
        })?;

        let nibble = byte1 >> 4;
        let flags = byte1 & 0x0F;
        let packet_type = PacketType::try_from(nibble)
            .map_err(|_| Error::MalformedPacketType { offset, nibble })?;

        let kind = match PacketKind::new(packet_type, flags) {
            Ok(kind) => kind,
            Err(Error::InvalidFlags {
                packet_type,
                expected,
                actual,
            }) => {
                return Err(Error::MalformedFlags {
                    offset,
                    packet_type,
                    expected,
                    actual,
                });
            }
            Err(_) => return Err(Error::MalformedPublishQoS { offset, flags }),
        };

        let remaining_len = VarInt::read(buf, offset.saturating_add(1))?;
        Ok(Self::new(kind, remaining_len))
    }

    /// Checks if the stream has enough bytes to frame a packet and returns fixed header
    /// only if a packet can be framed with existing bytes in the `stream`.
    ///
    /// The header is expected at the start of `stream`, which is not modified.
    pub fn check(stream: &[u8], max_packet_size: u32) -> Result<Self, Error> {
        let fixed_header = Self::read(stream, 0)?;

        // Don't let rogue connections attack with huge payloads.
        // Disconnect them before reading all that data
        if fixed_header.remaining_len > max_packet_size as usize {
            return Err(Error::PayloadSizeLimitExceeded {
                pkt_size: fixed_header.remaining_len.into(),
                max: max_packet_size,
            });
        }

        // If the current call fails due to insufficient bytes in the stream,
        // after calculating remaining length, we extend the stream
        let frame_length = fixed_header.packet_size();
        if stream.len() < frame_length {
            return Err(Error::InsufficientBytes {
                offset: stream.len(),
                needed: frame_length - stream.len(),
            });
        }

        Ok(fixed_header)
    }
}
