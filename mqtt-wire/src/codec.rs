use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{Error, FixedHeader, VarInt};

/// One control packet split at its fixed header
///
/// The body (variable header and payload) is carried as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FixedHeader,
    pub body: Bytes,
}

impl Frame {
    /// Creates a frame whose remaining length is taken from `body`
    pub fn new<B: Into<Bytes>>(kind: crate::PacketKind, body: B) -> Result<Self, Error> {
        let body = body.into();
        let header = FixedHeader::new(kind, VarInt::new(body.len())?);
        Ok(Frame { header, body })
    }

    /// Size of the frame on the wire
    pub fn size(&self) -> usize {
        self.header.size() + self.body.len()
    }
}

/// A type that implements the [Encoder] and [Decoder] traits for MQTT frames.
#[derive(Debug, Clone)]
pub struct Codec {
    /// Maximum packet size allowed by client
    pub max_incoming_size: u32,
    /// Maximum packet size allowed by broker
    pub max_outgoing_size: u32,
}

impl Codec {
    /// Largest frame MQTT can express: control field, four bytes of remaining length and the body
    pub const MAX_FRAME_SIZE: u32 = 1 + 4 + VarInt::MAX as u32;

    /// Creates a new codec with specified maximum sizes
    pub fn new(max_incoming_size: u32, max_outgoing_size: u32) -> Self {
        Self {
            max_incoming_size,
            max_outgoing_size,
        }
    }
}

/// Both limits are the protocol maximum. A peer announcing a large remaining
/// length makes the decoder reserve buffer space for the whole frame up
/// front, so servers facing untrusted peers should pick a smaller
/// `max_incoming_size` with [`Codec::new`].
impl Default for Codec {
    fn default() -> Self {
        Self::new(Self::MAX_FRAME_SIZE, Self::MAX_FRAME_SIZE)
    }
}

impl Decoder for Codec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let header = match FixedHeader::check(src, self.max_incoming_size) {
            Ok(header) => header,
            Err(Error::InsufficientBytes { needed, .. }) => {
                // Get more packets to construct the incomplete packet
                src.reserve(needed);
                return Ok(None);
            }
            Err(e) => {
                log::debug!("Rejecting incoming frame: {e}");
                return Err(e);
            }
        };

        let mut frame = src.split_to(header.packet_size());
        // skip the fixed header, we have already parsed it
        let _ = frame.split_to(header.size());
        log::trace!(
            "Decoded {:?} frame, remaining length = {}",
            header.packet_type(),
            header.remaining_len().value()
        );

        Ok(Some(Frame {
            header,
            body: frame.freeze(),
        }))
    }
}

impl Encoder<Frame> for Codec {
    type Error = Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let declared = item.header.remaining_len().value();
        if declared != item.body.len() {
            return Err(Error::RemainingLengthMismatch {
                declared,
                actual: item.body.len(),
            });
        }

        let size = item.header.packet_size();
        if size > self.max_outgoing_size as usize {
            log::debug!(
                "Refusing to send {:?} frame of {size} bytes",
                item.header.packet_type()
            );
            return Err(Error::OutgoingPacketTooLarge {
                pkt_size: size as u32,
                max: self.max_outgoing_size,
            });
        }

        dst.reserve(size);
        item.header.write(dst);
        dst.extend_from_slice(&item.body);
        log::trace!("Encoded {:?} frame of {size} bytes", item.header.packet_type());

        Ok(())
    }
}
