use bytes::BytesMut;
use pretty_assertions::assert_eq;
use tokio_util::codec::{Decoder, Encoder};

use mqtt_wire::{
    property, varint, Codec, Error, ErrorKind, FixedHeader, Frame, PacketKind, PacketType,
    PublishFlags, QoS, VarInt,
};

#[test]
fn varint_round_trip() {
    let step = VarInt::MAX / 0x7F;
    let samples = (0..=VarInt::MAX)
        .step_by(step)
        .chain([127, 128, 16_383, 16_384, 2_097_151, 2_097_152, VarInt::MAX]);

    for value in samples {
        let encoded = varint::encode(value).unwrap();
        assert_eq!(
            varint::decode(&encoded, 0).unwrap(),
            (value as u32, encoded.len())
        );
        assert_eq!(varint::encoded_len(value), Some(encoded.len()));
    }
}

#[test]
fn varint_boundaries() {
    let cases: [(usize, &[u8]); 6] = [
        (0, &[0x00]),
        (127, &[0x7F]),
        (128, &[0x80, 0x01]),
        (16_383, &[0xFF, 0x7F]),
        (16_384, &[0x80, 0x80, 0x01]),
        (268_435_455, &[0xFF, 0xFF, 0xFF, 0x7F]),
    ];
    for (value, bytes) in cases {
        assert_eq!(&varint::encode(value).unwrap()[..], bytes);
    }
}

#[test]
fn varint_rejections() {
    let err = VarInt::try_from(-1i64).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = varint::encode(268_435_456).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = varint::decode(&[0x80, 0x80, 0x80, 0x80, 0x01], 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
    let err = varint::decode(&[0xFF, 0xFF], 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TruncatedInput);
}

#[test]
fn fixed_kind_header_round_trip() {
    for packet_type in PacketType::ALL {
        let Some(fixed) = packet_type.fixed_flags() else {
            continue;
        };

        for remaining_len in [0, 1, 127, 128, 16_383] {
            let header = FixedHeader::from_parts(packet_type, fixed, remaining_len).unwrap();
            let encoded = header.to_bytes();
            assert_eq!(encoded[0], (packet_type as u8) << 4 | fixed);

            let decoded = FixedHeader::read(&encoded, 0).unwrap();
            assert_eq!(decoded, header);
            assert_eq!(decoded.flags(), fixed);
            assert_eq!(decoded.remaining_len().value(), remaining_len);
            assert_eq!(
                decoded.size(),
                1 + varint::encoded_len(remaining_len).unwrap()
            );
            assert_eq!(decoded.size(), encoded.len());
        }
    }
}

#[test]
fn publish_header_round_trip() {
    let flags = PublishFlags::new(true, QoS::ExactlyOnce, true);
    let header = FixedHeader::new(PacketKind::Publish(flags), VarInt::constant(16_384));
    let encoded = header.to_bytes();
    assert_eq!(encoded[0] & 0x0F, 0b1101);

    let decoded = FixedHeader::read(&encoded, 0).unwrap();
    let flags = decoded.publish_flags().unwrap();
    assert!(flags.dup());
    assert_eq!(flags.qos(), QoS::ExactlyOnce);
    assert!(flags.retain());
    assert_eq!(decoded.size(), 4);
}

#[test]
fn publish_flag_nibbles() {
    for nibble in 0u8..16 {
        let bytes = [0x30 | nibble, 0x00];
        let qos = (nibble >> 1) & 0b11;

        if qos == 3 {
            assert!(
                matches!(
                    FixedHeader::read(&bytes, 0),
                    Err(Error::MalformedPublishQoS { offset: 0, flags }) if flags == nibble
                ),
                "{nibble:#06b}"
            );
            continue;
        }

        let header = FixedHeader::read(&bytes, 0).unwrap();
        let flags = header.publish_flags().unwrap();
        assert_eq!(flags.bits(), nibble);
        assert_eq!(flags.dup(), nibble & 0b1000 != 0, "{nibble:#06b}");
        assert_eq!(flags.qos() as u8, qos, "{nibble:#06b}");
        assert_eq!(flags.retain(), nibble & 0b0001 != 0, "{nibble:#06b}");

        let rebuilt = PublishFlags::new(flags.dup(), flags.qos(), flags.retain());
        assert_eq!(rebuilt, flags);
        let header = FixedHeader::new(rebuilt.into(), VarInt::constant(0));
        assert_eq!(&header.to_bytes()[..], &bytes[..]);
    }
}

#[test]
fn header_rejections() {
    let err = FixedHeader::from_parts(PacketType::Subscribe, 0b0000, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = FixedHeader::from_parts(PacketType::Publish, 0b0110, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = FixedHeader::read(&[0x80, 0x00], 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
    let err = FixedHeader::read(&[0x36, 0x00], 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
    let err = FixedHeader::read(&[0x0F, 0x00], 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownPacketType);
    let err = FixedHeader::read(&[0x30, 0x80], 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TruncatedInput);
}

#[test]
fn property_lookup() {
    assert_eq!(
        property::lookup(0x01).unwrap().value_kind,
        mqtt_wire::ValueKind::Byte
    );
    let err = property::lookup(0x04).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownPropertyIdentifier);
}

#[test]
fn codec_round_trip() {
    let mut codec = Codec::default();
    let mut stream = BytesMut::new();

    let frames = vec![
        Frame::new(PacketKind::Connect, vec![0u8; 300]).unwrap(),
        Frame::new(
            PublishFlags::new(false, QoS::AtLeastOnce, true).into(),
            b"\x00\x03a/b\x00\x07hello".to_vec(),
        )
        .unwrap(),
        Frame::new(PacketKind::PingResp, Vec::new()).unwrap(),
    ];
    for frame in frames.clone() {
        codec.encode(frame, &mut stream).unwrap();
    }

    let total: usize = frames.iter().map(Frame::size).sum();
    assert_eq!(stream.len(), total);

    // feed the stream one byte at a time
    let mut src = BytesMut::new();
    let mut decoded = Vec::new();
    for byte in stream.iter() {
        src.extend_from_slice(&[*byte]);
        while let Some(frame) = codec.decode(&mut src).unwrap() {
            decoded.push(frame);
        }
    }

    assert_eq!(decoded, frames);
}
