//! The codec contract every layout composes against.
//!
//! A `Codec` turns a packable value into its packed form and an unpackable input back into its logical value. For the
//! molecule layouts the packed side is always a byte buffer and the logical side is always a [`Value`], which is what
//! [`ValueCodec`] pins down. Whether a codec always produces the same number of bytes is a separate capability,
//! [`Fixed`], and [`BytesCodec`] carries that distinction as an enum tag so schemas can branch on it while they are
//! being constructed instead of on every call.

use crate::bytes::{assert_buffer_length, bytify, BytesLike};
use crate::error::Result;
use crate::value::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

pub trait Codec {
    type Packed;
    type Unpacked;
    type Packable: ?Sized;
    type Unpackable: ?Sized;

    fn pack(&self, packable: &Self::Packable) -> Result<Self::Packed>;
    fn unpack(&self, unpackable: &Self::Unpackable) -> Result<Self::Unpacked>;
}

/// Codecs whose packed form is always exactly `byte_length` bytes long.
pub trait Fixed {
    fn byte_length(&self) -> usize;
}

/// A codec between bytes on the wire and `Value`s in memory.
pub trait ValueCodec: Codec<Packed = Vec<u8>, Unpacked = Value, Packable = Value, Unpackable = [u8]> + Send + Sync {
    /// Mnemonic used in error messages
    fn name(&self) -> Cow<'static, str>;
}

pub trait FixedValueCodec: ValueCodec + Fixed {}

impl<T: ValueCodec + Fixed> FixedValueCodec for T {}

/// A shareable handle to any molecule codec. Cloning is cheap, codecs are immutable and may be used from any number
/// of threads at once.
#[derive(Clone)]
pub enum BytesCodec {
    Fixed(Arc<dyn FixedValueCodec>),
    Dynamic(Arc<dyn ValueCodec>),
}

impl BytesCodec {

    pub fn fixed<C: FixedValueCodec + 'static>(codec: C) -> Self {
        BytesCodec::Fixed(Arc::new(codec))
    }

    pub fn dynamic<C: ValueCodec + 'static>(codec: C) -> Self {
        BytesCodec::Dynamic(Arc::new(codec))
    }

    /// `Some` exactly for fixed codecs.
    pub fn byte_length(&self) -> Option<usize> {
        match self {
            BytesCodec::Fixed(c) => Some(c.byte_length()),
            BytesCodec::Dynamic(_) => None,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, BytesCodec::Fixed(_))
    }

    pub fn name(&self) -> Cow<'static, str> {
        match self {
            BytesCodec::Fixed(c) => c.name(),
            BytesCodec::Dynamic(c) => c.name(),
        }
    }

    /// Unpack anything bytes-like, e.g. a hex payload as received over RPC.
    pub fn unpack_bytes_like<'a, B: Into<BytesLike<'a>>>(&self, bytes: B) -> Result<Value> {
        let buf = bytify(bytes).map_err(|e| e.expecting(self.name()))?;
        self.unpack(&buf)
    }

}

impl Codec for BytesCodec {
    type Packed = Vec<u8>;
    type Unpacked = Value;
    type Packable = Value;
    type Unpackable = [u8];

    fn pack(&self, packable: &Value) -> Result<Vec<u8>> {
        match self {
            BytesCodec::Fixed(c) => c.pack(packable),
            BytesCodec::Dynamic(c) => c.pack(packable),
        }
    }

    fn unpack(&self, unpackable: &[u8]) -> Result<Value> {
        match self {
            BytesCodec::Fixed(c) => c.unpack(unpackable),
            BytesCodec::Dynamic(c) => c.unpack(unpackable),
        }
    }
}

impl ValueCodec for BytesCodec {
    fn name(&self) -> Cow<'static, str> {
        BytesCodec::name(self)
    }
}

impl fmt::Debug for BytesCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BytesCodec::Fixed(c) => write!(f, "Fixed({}, {} bytes)", c.name(), c.byte_length()),
            BytesCodec::Dynamic(c) => write!(f, "Dynamic({})", c.name()),
        }
    }
}

type PackFn = dyn Fn(&Value) -> Result<Vec<u8>> + Send + Sync;
type UnpackFn = dyn Fn(&[u8]) -> Result<Value> + Send + Sync;

/// A codec assembled from a pair of functions.
pub struct FnCodec {
    name: Cow<'static, str>,
    pack: Box<PackFn>,
    unpack: Box<UnpackFn>,
}

impl FnCodec {
    pub fn new<P, U>(name: impl Into<Cow<'static, str>>, pack: P, unpack: U) -> Self
    where
        P: Fn(&Value) -> Result<Vec<u8>> + Send + Sync + 'static,
        U: Fn(&[u8]) -> Result<Value> + Send + Sync + 'static,
    {
        FnCodec { name: name.into(), pack: Box::new(pack), unpack: Box::new(unpack) }
    }
}

impl Codec for FnCodec {
    type Packed = Vec<u8>;
    type Unpacked = Value;
    type Packable = Value;
    type Unpackable = [u8];

    fn pack(&self, packable: &Value) -> Result<Vec<u8>> {
        (self.pack)(packable).map_err(|e| e.or_expecting(self.name.clone()))
    }

    fn unpack(&self, unpackable: &[u8]) -> Result<Value> {
        (self.unpack)(unpackable).map_err(|e| e.or_expecting(self.name.clone()))
    }
}

impl ValueCodec for FnCodec {
    fn name(&self) -> Cow<'static, str> {
        self.name.clone()
    }
}

/// Wraps a codec so that packing must produce and unpacking must receive exactly `byte_length` bytes. A packer
/// producing the wrong amount means the schema itself is broken, but schemas are written by hand, so it is checked
/// on every call anyway.
pub struct FixedLength<C> {
    inner: C,
    byte_length: usize,
}

impl<C: ValueCodec> FixedLength<C> {
    pub fn new(inner: C, byte_length: usize) -> Self {
        FixedLength { inner, byte_length }
    }
}

impl<C: ValueCodec> Codec for FixedLength<C> {
    type Packed = Vec<u8>;
    type Unpacked = Value;
    type Packable = Value;
    type Unpackable = [u8];

    fn pack(&self, packable: &Value) -> Result<Vec<u8>> {
        let packed = self.inner.pack(packable)?;
        assert_buffer_length(&packed, self.byte_length).map_err(|e| e.expecting(self.inner.name()))?;
        Ok(packed)
    }

    fn unpack(&self, unpackable: &[u8]) -> Result<Value> {
        assert_buffer_length(unpackable, self.byte_length).map_err(|e| e.expecting(self.inner.name()))?;
        self.inner.unpack(unpackable)
    }
}

impl<C: ValueCodec> ValueCodec for FixedLength<C> {
    fn name(&self) -> Cow<'static, str> {
        self.inner.name()
    }
}

impl<C> Fixed for FixedLength<C> {
    fn byte_length(&self) -> usize {
        self.byte_length
    }
}

/// Create a variable length codec from a pack and an unpack function.
pub fn create_bytes_codec<P, U>(name: impl Into<Cow<'static, str>>, pack: P, unpack: U) -> BytesCodec
where
    P: Fn(&Value) -> Result<Vec<u8>> + Send + Sync + 'static,
    U: Fn(&[u8]) -> Result<Value> + Send + Sync + 'static,
{
    BytesCodec::dynamic(FnCodec::new(name, pack, unpack))
}

/// Create a codec which always packs into and unpacks from exactly `byte_length` bytes.
pub fn create_fixed_bytes_codec<P, U>(name: impl Into<Cow<'static, str>>, byte_length: usize, pack: P, unpack: U) -> BytesCodec
where
    P: Fn(&Value) -> Result<Vec<u8>> + Send + Sync + 'static,
    U: Fn(&[u8]) -> Result<Value> + Send + Sync + 'static,
{
    BytesCodec::fixed(FixedLength::new(FnCodec::new(name, pack, unpack), byte_length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::bytify_value;
    use crate::error::ErrorKind;

    fn raw(len: usize) -> BytesCodec {
        create_fixed_bytes_codec("Raw", len, |v| Ok(bytify_value(v)?), |b| Ok(Value::Bytes(b.to_vec())))
    }

    #[test]
    fn fixed_length_is_enforced() {
        let codec = raw(2);
        assert_eq!(Some(2), codec.byte_length());
        assert_eq!(Ok(vec![1, 2]), codec.pack(&Value::Bytes(vec![1, 2])));
        let error = codec.pack(&Value::Bytes(vec![1, 2, 3])).unwrap_err();
        assert_eq!(&ErrorKind::Length { expected: 2, actual: 3 }, error.kind());
        assert_eq!(Some("Raw"), error.expected_type());
        assert!(matches!(codec.unpack(&[1]).unwrap_err().kind(), ErrorKind::Length { expected: 2, actual: 1 }));
    }

    #[test]
    fn bytes_like_unpack() {
        let codec = create_bytes_codec("Raw", |v| Ok(bytify_value(v)?), |b| Ok(Value::Bytes(b.to_vec())));
        assert!(!codec.is_fixed());
        assert_eq!(Ok(Value::Bytes(vec![0xab])), codec.unpack_bytes_like("0xab"));
        assert_eq!(Ok(Value::Bytes(vec![0xab])), codec.unpack_bytes_like(&[0xabu8]));
        assert!(matches!(codec.unpack_bytes_like("ab").unwrap_err().kind(), ErrorKind::Format(_)));
    }

    #[test]
    fn closures_get_named() {
        let codec = create_bytes_codec("Failing", |_| Err(ErrorKind::Message("nope".into()).into()), |_| Ok(Value::None));
        assert_eq!("Expect type Failing in input but got error: nope", codec.pack(&Value::None).unwrap_err().to_string());
        assert_eq!("Dynamic(Failing)", format!("{:?}", codec));
        assert_eq!("Fixed(Raw, 3 bytes)", format!("{:?}", raw(3)));
    }
}
