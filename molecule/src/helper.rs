//! Adapters for codecs which produce raw bytes of their own, to be embedded where a schema declares `byte`,
//! `array Foo [byte; n]` or `vector Foo <byte>`.

use crate::bytes::{assert_buffer_length, assert_min_buffer_length};
use crate::codec::{create_bytes_codec, BytesCodec, Codec, FixedLength};
use crate::header::{read_u32, to_u32, WORD};

/// `array Foo [byte; byte_length]`: the packed form of `codec` has to be exactly `byte_length` bytes long.
pub fn byte_array_of(codec: BytesCodec, byte_length: usize) -> BytesCodec {
    BytesCodec::fixed(FixedLength::new(codec, byte_length))
}

/// A single `byte`.
pub fn byte_of(codec: BytesCodec) -> BytesCodec {
    byte_array_of(codec, 1)
}

/// `vector Foo <byte>`: the packed form of `codec`, prefixed with its length.
pub fn byte_vec_of(codec: BytesCodec) -> BytesCodec {
    let inner = codec.clone();
    create_bytes_codec(
        codec.name(),
        move |value| {
            let payload = codec.pack(value)?;
            let len = to_u32(payload.len())?;
            let mut buf = Vec::with_capacity(WORD + payload.len());
            buf.extend_from_slice(&len.to_le_bytes());
            buf.extend(payload);
            Ok(buf)
        },
        move |buf| {
            assert_min_buffer_length(buf, WORD)?;
            let len = read_u32(buf, 0).unwrap_or_default();
            assert_buffer_length(&buf[WORD..], len).map_err(|e| {
                tracing::trace!(len, body = buf.len() - WORD, "length prefix disagrees with body");
                e
            })?;
            inner.unpack(&buf[WORD..])
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::bytify_value;
    use crate::error::ErrorKind;
    use crate::number::{UINT16, UINT8};
    use crate::value::Value;

    fn raw() -> BytesCodec {
        create_bytes_codec("Raw", |v| Ok(bytify_value(v)?), |b| Ok(Value::Bytes(b.to_vec())))
    }

    #[test]
    fn bytes() {
        assert_eq!(vec![1], byte_of(UINT8.into()).pack(&Value::from(1u8)).unwrap());
        assert!(matches!(byte_of(UINT16.into()).pack(&Value::from(1u8)).unwrap_err().kind(), ErrorKind::Length { expected: 1, actual: 2 }));
        assert_eq!(Some(3), byte_array_of(raw(), 3).byte_length());
        assert!(byte_array_of(raw(), 3).pack(&Value::from("0x1234")).is_err());
    }

    #[test]
    fn length_prefixed() {
        let codec = byte_vec_of(raw());
        assert!(!codec.is_fixed());
        let packed = codec.pack(&Value::from("0x123456")).unwrap();
        assert_eq!(vec![3, 0, 0, 0, 0x12, 0x34, 0x56], packed);
        assert_eq!(Value::Bytes(vec![0x12, 0x34, 0x56]), codec.unpack(&packed).unwrap());
        assert!(matches!(codec.unpack(&[3, 0, 0, 0, 0x12, 0x34]).unwrap_err().kind(), ErrorKind::Length { expected: 3, actual: 2 }));
        assert!(matches!(codec.unpack(&[0, 0, 0]).unwrap_err().kind(), ErrorKind::MinLength { expected: 4, actual: 3 }));
    }
}
