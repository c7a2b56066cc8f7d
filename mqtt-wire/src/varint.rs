//! Variable Byte Integer codec

use bytes::{BufMut, Bytes, BytesMut};

use crate::Error;

/// Variable Byte Integer
///
/// An unsigned integer that is encoded in one to four bytes.
///
/// In MQTT 3.1.1, it is used only for the `Remaining Length` in the fixed header.
/// In MQTT 5.0, it is formalized and used in multiple places.
///
/// See [specification](https://docs.oasis-open.org/mqtt/mqtt/v5.0/os/mqtt-v5.0-os.html#_Toc3901011).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarInt {
    value: u32,
    length: u8,
}

impl PartialOrd<usize> for VarInt {
    fn partial_cmp(&self, other: &usize) -> Option<std::cmp::Ordering> {
        Some(self.value().cmp(other))
    }
}

impl PartialEq<usize> for VarInt {
    fn eq(&self, other: &usize) -> bool {
        self.value().eq(other)
    }
}

impl From<VarInt> for u32 {
    fn from(val: VarInt) -> Self {
        val.value
    }
}

impl TryFrom<usize> for VarInt {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        VarInt::new(value)
    }
}

impl TryFrom<u32> for VarInt {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        VarInt::new(value as usize)
    }
}

impl TryFrom<i64> for VarInt {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match usize::try_from(value) {
            Ok(v) => VarInt::new(v),
            Err(_) => Err(Error::VarIntOutOfRange(value)),
        }
    }
}

impl VarInt {
    /// The largest value a variable byte integer can hold
    pub const MAX: usize = 268_435_455;

    /// Creates a new variable byte integer
    ///
    /// # Errors
    /// This will return an error if the value is too large to be encoded
    pub fn new(value: usize) -> Result<Self, Error> {
        match encoded_len(value) {
            Some(length) => Ok(Self {
                value: value as u32,
                length: length as u8,
            }),
            None => Err(Error::VarIntOutOfRange(
                i64::try_from(value).unwrap_or(i64::MAX),
            )),
        }
    }

    /// Creates a variable byte integer with a compile-time-known value
    ///
    /// # Panics
    /// If this function executes at runtime, it will panic with a value greater than `268_435_455`.
    pub const fn constant(value: usize) -> Self {
        let length = match encoded_len(value) {
            Some(length) => length,
            None => panic!("value should be < 268_435_456"),
        };
        Self {
            value: value as u32,
            length: length as u8,
        }
    }

    /// The numeric value of the variable byte integer
    pub const fn value(&self) -> usize {
        self.value as usize
    }

    /// The number of bytes required to encode this variable byte integer
    pub const fn length(&self) -> usize {
        self.length as usize
    }

    /// Read a variable byte integer that starts at `offset` in `buf`
    ///
    /// The returned value knows how many bytes it occupied, see [`VarInt::length`].
    pub fn read(buf: &[u8], offset: usize) -> Result<Self, Error> {
        let stream = buf.get(offset..).unwrap_or_default();
        let mut value: u32 = 0;
        let mut length = 0;
        let mut shift = 0;

        // Use continuation bit at position 7 to continue reading next byte to frame 'length'.
        // Stream 0b1xxx_xxxx 0b1yyy_yyyy 0b1zzz_zzzz 0b0www_wwww will
        // be framed as number 0bwww_wwww_zzz_zzzz_yyy_yyyy_xxx_xxxx
        for &byte in stream {
            value += ((byte & 0b0111_1111) as u32) << shift;
            length += 1;
            shift += 7;

            // stop when continuation bit is 0
            if (byte & 0b1000_0000) == 0 {
                return Ok(Self { value, length });
            }

            // A fourth byte with the continuation bit set can never terminate
            if length >= 4 {
                return Err(Error::MalformedVarInt { offset });
            }
        }

        let next = offset.saturating_add(length as usize);
        Err(Error::InsufficientBytes {
            offset: next,
            needed: next.saturating_add(1).saturating_sub(buf.len()).max(1),
        })
    }

    /// Write a variable byte integer to the stream
    ///
    /// Returns the number of bytes written.
    pub fn write(&self, stream: &mut BytesMut) -> usize {
        let mut x = self.value;

        loop {
            let mut byte = (x % 128) as u8;
            x >>= 7;
            if x > 0 {
                byte |= 128;
            }

            stream.put_u8(byte);
            if x == 0 {
                break;
            }
        }

        self.length()
    }
}

/// Number of bytes needed to encode `value`, or `None` when it exceeds [`VarInt::MAX`]
pub const fn encoded_len(value: usize) -> Option<usize> {
    match value {
        0..=127 => Some(1),
        128..=16_383 => Some(2),
        16_384..=2_097_151 => Some(3),
        2_097_152..=VarInt::MAX => Some(4),
        _ => None,
    }
}

/// Encode `value` into a fresh buffer of one to four bytes
pub fn encode(value: usize) -> Result<Bytes, Error> {
    let varint = VarInt::new(value)?;
    let mut stream = BytesMut::with_capacity(varint.length());
    varint.write(&mut stream);
    Ok(stream.freeze())
}

/// Decode the variable byte integer at `offset`, returning its value and the bytes consumed
pub fn decode(buf: &[u8], offset: usize) -> Result<(u32, usize), Error> {
    let varint = VarInt::read(buf, offset)?;
    Ok((varint.into(), varint.length()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCase {
        bytes: Vec<u8>,
        value: usize,
        length: usize,
    }

    #[rustfmt::skip]
    fn test_cases() -> Vec<TestCase> {
        vec![
            TestCase { bytes: vec![0x00], value: 0, length: 1 },
            TestCase { bytes: vec![0x7F], value: 127, length: 1 },
            TestCase { bytes: vec![0x80, 0x01], value: 128, length: 2 },
            TestCase { bytes: vec![0xFF, 0x7F], value: 16_383, length: 2 },
            TestCase { bytes: vec![0x80, 0x80, 0x01], value: 16_384, length: 3 },
            TestCase { bytes: vec![0xFF, 0xFF, 0x7F], value: 2_097_151, length: 3 },
            TestCase { bytes: vec![0x80, 0x80, 0x80, 0x01], value: 2_097_152, length: 4 },
            TestCase { bytes: vec![0xFF, 0xFF, 0xFF, 0x7F], value: 268_435_455, length: 4 },
        ]
    }

    #[test]
    fn test_varint_read() {
        for case in test_cases() {
            let varint = VarInt::read(&case.bytes, 0).unwrap();
            assert_eq!(varint.value(), case.value);
            assert_eq!(varint.length(), case.length);
        }
    }

    #[test]
    fn test_varint_read_at_offset() {
        let stream = [0xAA, 0xBB, 0x80, 0x01, 0xCC];
        assert_eq!(decode(&stream, 2).unwrap(), (128, 2));
    }

    #[test]
    fn test_varint_read_unsufficient() {
        assert!(matches!(
            VarInt::read(&[0x80, 0x80], 0),
            Err(Error::InsufficientBytes { offset: 2, needed: 1 })
        ));
        assert!(matches!(
            VarInt::read(&[], 0),
            Err(Error::InsufficientBytes { offset: 0, needed: 1 })
        ));
        assert!(matches!(
            VarInt::read(&[0x01], 3),
            Err(Error::InsufficientBytes { offset: 3, needed: 3 })
        ));
    }

    #[test]
    fn test_varint_read_offset_past_end() {
        match VarInt::read(&[], usize::MAX) {
            Err(Error::InsufficientBytes { offset, needed }) => {
                assert_eq!(offset, usize::MAX);
                assert!(needed >= 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            decode(&[0x80], usize::MAX),
            Err(Error::InsufficientBytes { .. })
        ));
    }

    #[test]
    fn test_varint_read_malformed() {
        assert!(matches!(
            VarInt::read(&[0x80, 0x80, 0x80, 0x80], 0),
            Err(Error::MalformedVarInt { offset: 0 })
        ));
        assert!(matches!(
            VarInt::read(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x01], 1),
            Err(Error::MalformedVarInt { offset: 1 })
        ));
    }

    #[test]
    fn test_varint_write() {
        for case in test_cases() {
            let mut stream = BytesMut::new();
            let varint = VarInt::new(case.value).unwrap();
            assert_eq!(varint.length(), case.length);
            assert_eq!(varint.write(&mut stream), case.length);
            assert_eq!(stream, case.bytes);
            assert_eq!(encode(case.value).unwrap(), case.bytes);
        }
    }

    #[test]
    fn test_varint_out_of_range() {
        assert!(matches!(
            VarInt::new(268_435_456),
            Err(Error::VarIntOutOfRange(268_435_456))
        ));
        assert!(matches!(
            VarInt::try_from(-1i64),
            Err(Error::VarIntOutOfRange(-1))
        ));
        assert!(matches!(
            VarInt::try_from(u32::MAX),
            Err(Error::VarIntOutOfRange(_))
        ));
        assert!(encode(268_435_456).is_err());
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(encoded_len(0), Some(1));
        assert_eq!(encoded_len(16_384), Some(3));
        assert_eq!(encoded_len(VarInt::MAX + 1), None);
        assert_eq!(VarInt::constant(2_097_152).length(), 4);
    }
}
