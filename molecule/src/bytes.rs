//! Conversions between the accepted byte representations. Anything that can be turned into bytes is `BytesLike`:
//! a `0x` prefixed hex string with an even number of digits, a slice of integers within 0-255 or a raw byte slice.

use crate::error::ErrorKind;
use crate::value::Value;
use num_traits::ToPrimitive;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BytesLike<'a> {
    Hex(&'a str),
    Array(&'a [i64]),
    Raw(&'a [u8]),
}

impl<'a> From<&'a str> for BytesLike<'a> {
    fn from(v: &'a str) -> Self {
        BytesLike::Hex(v)
    }
}

impl<'a> From<&'a String> for BytesLike<'a> {
    fn from(v: &'a String) -> Self {
        BytesLike::Hex(v)
    }
}

impl<'a> From<&'a [i64]> for BytesLike<'a> {
    fn from(v: &'a [i64]) -> Self {
        BytesLike::Array(v)
    }
}

impl<'a> From<&'a [u8]> for BytesLike<'a> {
    fn from(v: &'a [u8]) -> Self {
        BytesLike::Raw(v)
    }
}

impl<'a> From<&'a Vec<u8>> for BytesLike<'a> {
    fn from(v: &'a Vec<u8>) -> Self {
        BytesLike::Raw(v)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for BytesLike<'a> {
    fn from(v: &'a [u8; N]) -> Self {
        BytesLike::Raw(v)
    }
}

/// Convert a `BytesLike` into an owned byte buffer.
pub fn bytify<'a, B: Into<BytesLike<'a>>>(bytes: B) -> Result<Vec<u8>, ErrorKind> {
    match bytes.into() {
        BytesLike::Hex(hex) => bytify_hex(hex),
        BytesLike::Array(xs) => xs.iter()
            .map(|&x| u8::try_from(x).map_err(|_| ErrorKind::Format(format!("array element {} is not within 0-255", x))))
            .collect(),
        BytesLike::Raw(raw) => Ok(raw.to_vec()),
    }
}

fn bytify_hex(hex: &str) -> Result<Vec<u8>, ErrorKind> {
    assert_hex_string(hex, None)?;
    hex::decode(&hex[2..]).map_err(|e| ErrorKind::Format(e.to_string()))
}

/// Bytes-like conversion for the dynamic data model: `Value::Bytes`, a hex `Value::Str` or a `Value::Array` of
/// integers within 0-255.
pub fn bytify_value(value: &Value) -> Result<Vec<u8>, ErrorKind> {
    match value {
        Value::Bytes(b) => Ok(b.clone()),
        Value::Str(s) => bytify_hex(s),
        Value::Array(items) => items.iter()
            .map(|item| match item {
                Value::Int(i) => i.to_u8().ok_or_else(|| ErrorKind::Format(format!("array element {} is not within 0-255", i))),
                other => Err(ErrorKind::Type { expected: "integer", found: other.typename() }),
            })
            .collect(),
        other => Err(ErrorKind::Type { expected: "bytes", found: other.typename() }),
    }
}

/// Render bytes as an even length, lowercase hex string prefixed with `0x`.
///
/// ```
/// assert_eq!("0x010203", molecule::hexify(&[1, 2, 3]));
/// assert_eq!("0x", molecule::hexify(&[]));
/// ```
pub fn hexify<B: AsRef<[u8]> + ?Sized>(bytes: &B) -> String {
    format!("0x{}", hex::encode(bytes.as_ref()))
}

/// Concatenate all chunks, preserving their order.
pub fn concat<I, B>(chunks: I) -> Vec<u8>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    chunks.into_iter().fold(Vec::new(), |mut acc, chunk| {
        acc.extend_from_slice(chunk.as_ref());
        acc
    })
}

/// Validate a `0x` prefixed hex string with an even number of digits. With `byte_length`, the string must encode
/// exactly that many bytes.
pub fn assert_hex_string(s: &str, byte_length: Option<usize>) -> Result<(), ErrorKind> {
    let digits = s.strip_prefix("0x").ok_or_else(|| ErrorKind::Format(format!("hex string {} is missing the 0x prefix", s)))?;
    if digits.len() % 2 != 0 {
        return Err(ErrorKind::Format(format!("hex string {} has an odd number of digits", s)));
    }
    if let Some(c) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ErrorKind::Format(format!("invalid character {:?} in hex string", c)));
    }
    match byte_length {
        Some(len) if digits.len() != len * 2 => Err(ErrorKind::Format(format!("hex string encodes {} bytes, expected {}", digits.len() / 2, len))),
        _ => Ok(()),
    }
}

/// Validate a `0x` prefixed hex number such as `0x1f`. Leading zeros are allowed, odd digit counts as well. With
/// `byte_length`, at most `2 * byte_length` digits are accepted.
pub fn assert_hex_decimal(s: &str, byte_length: Option<usize>) -> Result<(), ErrorKind> {
    let digits = s.strip_prefix("0x").ok_or_else(|| ErrorKind::Format(format!("hex number {} is missing the 0x prefix", s)))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ErrorKind::Format(format!("invalid hex number {}", s)));
    }
    match byte_length {
        Some(len) if digits.len() > len * 2 => Err(ErrorKind::Format(format!("hex number {} does not fit into {} bytes", s, len))),
        _ => Ok(()),
    }
}

/// Every character has to fit into a single byte.
pub fn assert_utf8_string(s: &str) -> Result<(), ErrorKind> {
    match s.chars().find(|&c| c as u32 > 0xff) {
        Some(c) => Err(ErrorKind::Format(format!("character {:?} does not fit into a single byte", c))),
        None => Ok(()),
    }
}

pub fn assert_buffer_length(buf: &[u8], length: usize) -> Result<(), ErrorKind> {
    if buf.len() != length {
        Err(ErrorKind::Length { expected: length, actual: buf.len() })
    } else {
        Ok(())
    }
}

pub fn assert_min_buffer_length(buf: &[u8], length: usize) -> Result<(), ErrorKind> {
    if buf.len() < length {
        Err(ErrorKind::MinLength { expected: length, actual: buf.len() })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytify_inputs() {
        assert_eq!(Ok(vec![0x12, 0x34]), bytify("0x1234"));
        assert_eq!(Ok(vec![0xab, 0xcd]), bytify("0xABcd"));
        assert_eq!(Ok(vec![]), bytify("0x"));
        assert_eq!(Ok(vec![0, 1, 255]), bytify(&[0i64, 1, 255][..]));
        assert_eq!(Ok(vec![9, 8]), bytify(&[9u8, 8]));
        assert_eq!(Ok(vec![9, 8]), bytify(&vec![9u8, 8]));
    }

    #[test]
    fn bytify_rejects() {
        assert!(matches!(bytify("1234"), Err(ErrorKind::Format(_))));
        assert!(matches!(bytify("0x123"), Err(ErrorKind::Format(_))));
        assert!(matches!(bytify("0x12zz"), Err(ErrorKind::Format(_))));
        assert!(matches!(bytify(&[1i64, 256][..]), Err(ErrorKind::Format(_))));
        assert!(matches!(bytify(&[-1i64][..]), Err(ErrorKind::Format(_))));
    }

    #[test]
    fn hexify_roundtrip() {
        let samples: [&[u8]; 4] = [&[], &[0], &[0xde, 0xad, 0xbe, 0xef], &[0xff; 65]];
        for sample in samples.iter() {
            assert_eq!(Ok(sample.to_vec()), bytify(hexify(*sample).as_str()));
        }
    }

    #[test]
    fn concat_preserves_order() {
        assert_eq!(vec![1, 2, 3, 4, 5], concat([&[1u8, 2][..], &[], &[3, 4, 5]]));
        assert_eq!(Vec::<u8>::new(), concat(Vec::<Vec<u8>>::new()));
    }

    #[test]
    fn values() {
        assert_eq!(Ok(vec![1, 2]), bytify_value(&Value::Bytes(vec![1, 2])));
        assert_eq!(Ok(vec![1, 2]), bytify_value(&Value::Str("0x0102".into())));
        assert_eq!(Ok(vec![1, 2]), bytify_value(&Value::Array(vec![Value::from(1u8), Value::from(2u8)])));
        assert!(matches!(bytify_value(&Value::Array(vec![Value::from(256u16)])), Err(ErrorKind::Format(_))));
        assert!(matches!(bytify_value(&Value::None), Err(ErrorKind::Type { expected: "bytes", found: "none" })));
    }

    #[test]
    fn hex_assertions() {
        assert!(assert_hex_string("0x1234", Some(2)).is_ok());
        assert!(assert_hex_string("0x1234", Some(3)).is_err());
        assert!(assert_hex_decimal("0x1", None).is_ok());
        assert!(assert_hex_decimal("0x", None).is_err());
        assert!(assert_hex_decimal("0x123", Some(1)).is_err());
        assert!(assert_utf8_string("abc").is_ok());
        assert!(assert_utf8_string("ǅ").is_err());
        assert!(assert_buffer_length(&[0; 3], 4).is_err());
        assert!(assert_min_buffer_length(&[0; 3], 2).is_ok());
    }
}
