//! Higher order codecs. None of these define a wire format, they lift an existing codec over maps, sequences and
//! optional values, or adapt what it packs to and unpacks from. They work with any `Codec`, not just the byte based
//! ones, and pass error paths through like the layouts do.

use crate::codec::{Codec, ValueCodec};
use crate::error::{ErrorKind, Result};
use crate::track::Track;
use std::borrow::{Borrow, Cow};
use std::collections::BTreeMap;
use std::marker::PhantomData;

type Owned<T> = <T as ToOwned>::Owned;

/// Applies one codec per key. Every key of the shape has to be present.
pub struct ObjectCodec<C> {
    shape: Vec<(String, C)>,
}

pub fn create_object_codec<C, K, I>(shape: I) -> ObjectCodec<C>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, C)>,
{
    ObjectCodec { shape: shape.into_iter().map(|(k, c)| (k.into(), c)).collect() }
}

impl<C> Codec for ObjectCodec<C>
where
    C: Codec,
    C::Packable: ToOwned,
    C::Unpackable: ToOwned,
{
    type Packed = BTreeMap<String, C::Packed>;
    type Unpacked = BTreeMap<String, C::Unpacked>;
    type Packable = BTreeMap<String, Owned<C::Packable>>;
    type Unpackable = BTreeMap<String, Owned<C::Unpackable>>;

    fn pack(&self, packable: &Self::Packable) -> Result<Self::Packed> {
        self.shape.iter()
            .map(|(key, codec)| {
                let item = packable.get(key).ok_or_else(|| ErrorKind::Missing(key.clone()))?;
                codec.pack(Borrow::<C::Packable>::borrow(item)).in_field(key).map(|packed| (key.clone(), packed))
            })
            .collect()
    }

    fn unpack(&self, unpackable: &Self::Unpackable) -> Result<Self::Unpacked> {
        self.shape.iter()
            .map(|(key, codec)| {
                let item = unpackable.get(key).ok_or_else(|| ErrorKind::Missing(key.clone()))?;
                codec.unpack(Borrow::<C::Unpackable>::borrow(item)).in_field(key).map(|unpacked| (key.clone(), unpacked))
            })
            .collect()
    }
}

/// Applies a codec to every item of a sequence.
pub struct ArrayCodec<C> {
    item: C,
}

pub fn create_array_codec<C: Codec>(item: C) -> ArrayCodec<C> {
    ArrayCodec { item }
}

impl<C> Codec for ArrayCodec<C>
where
    C: Codec,
    C::Packable: ToOwned,
    C::Unpackable: ToOwned,
{
    type Packed = Vec<C::Packed>;
    type Unpacked = Vec<C::Unpacked>;
    type Packable = Vec<Owned<C::Packable>>;
    type Unpackable = Vec<Owned<C::Unpackable>>;

    fn pack(&self, packable: &Self::Packable) -> Result<Self::Packed> {
        packable.iter().enumerate().map(|(i, item)| self.item.pack(Borrow::<C::Packable>::borrow(item)).in_index(i)).collect()
    }

    fn unpack(&self, unpackable: &Self::Unpackable) -> Result<Self::Unpacked> {
        unpackable.iter().enumerate().map(|(i, item)| self.item.unpack(Borrow::<C::Unpackable>::borrow(item)).in_index(i)).collect()
    }
}

/// Lets absent values pass through untouched. Unlike `option` this has no representation on the wire.
pub struct NullableCodec<C> {
    inner: C,
}

pub fn create_nullable_codec<C: Codec>(inner: C) -> NullableCodec<C> {
    NullableCodec { inner }
}

impl<C> Codec for NullableCodec<C>
where
    C: Codec,
    C::Packable: ToOwned,
    C::Unpackable: ToOwned,
{
    type Packed = Option<C::Packed>;
    type Unpacked = Option<C::Unpacked>;
    type Packable = Option<Owned<C::Packable>>;
    type Unpackable = Option<Owned<C::Unpackable>>;

    fn pack(&self, packable: &Self::Packable) -> Result<Self::Packed> {
        packable.as_ref().map(|item| self.inner.pack(Borrow::<C::Packable>::borrow(item))).transpose()
    }

    fn unpack(&self, unpackable: &Self::Unpackable) -> Result<Self::Unpacked> {
        unpackable.as_ref().map(|item| self.inner.unpack(Borrow::<C::Unpackable>::borrow(item))).transpose()
    }
}

/// A codec whose packed form is post-processed by `after_pack`, with `before_unpack` undoing that again before
/// unpacking. The two have to be inverses of each other.
pub struct EnhancedCodec<C, P, U: ?Sized, A, B> {
    codec: C,
    after_pack: A,
    before_unpack: B,
    _marker: PhantomData<fn(&U) -> P>,
}

pub fn enhance_pack<C, P, U, A, B>(codec: C, after_pack: A, before_unpack: B) -> EnhancedCodec<C, P, U, A, B>
where
    C: Codec,
    C::Unpackable: ToOwned,
    U: ?Sized,
    A: Fn(C::Packed) -> Result<P>,
    B: Fn(&U) -> Result<Owned<C::Unpackable>>,
{
    EnhancedCodec { codec, after_pack, before_unpack, _marker: PhantomData }
}

impl<C, P, U, A, B> Codec for EnhancedCodec<C, P, U, A, B>
where
    C: Codec,
    C::Unpackable: ToOwned,
    U: ?Sized,
    A: Fn(C::Packed) -> Result<P>,
    B: Fn(&U) -> Result<Owned<C::Unpackable>>,
{
    type Packed = P;
    type Unpacked = C::Unpacked;
    type Packable = C::Packable;
    type Unpackable = U;

    fn pack(&self, packable: &C::Packable) -> Result<P> {
        (self.after_pack)(self.codec.pack(packable)?)
    }

    fn unpack(&self, unpackable: &U) -> Result<C::Unpacked> {
        let prepared = (self.before_unpack)(unpackable)?;
        self.codec.unpack(Borrow::<C::Unpackable>::borrow(&prepared))
    }
}

/// Enhanced byte codecs are byte codecs again, so they can be wrapped into a `BytesCodec` and nested into layouts.
impl<C, A, B> ValueCodec for EnhancedCodec<C, Vec<u8>, [u8], A, B>
where
    C: ValueCodec,
    A: Fn(Vec<u8>) -> Result<Vec<u8>> + Send + Sync,
    B: Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync,
{
    fn name(&self) -> Cow<'static, str> {
        self.codec.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::concat;
    use crate::codec::BytesCodec;
    use crate::layout::{r#struct, table};
    use crate::number::{UINT32, UINT32_BE, UINT64, UINT8};
    use crate::value::Value;

    // 1 <=> "1"
    struct NumToStr;

    impl Codec for NumToStr {
        type Packed = String;
        type Unpacked = u64;
        type Packable = u64;
        type Unpackable = str;

        fn pack(&self, packable: &u64) -> Result<String> {
            Ok(packable.to_string())
        }

        fn unpack(&self, unpackable: &str) -> Result<u64> {
            unpackable.parse().map_err(|_| ErrorKind::Message(format!("not a number: {}", unpackable)).into())
        }
    }

    fn wrap_bracket(unwrapped: String) -> Result<String> {
        Ok(format!("[{}]", unwrapped))
    }

    fn unwrap_bracket(wrapped: &str) -> Result<String> {
        wrapped.strip_prefix('[').and_then(|s| s.strip_suffix(']'))
            .map(str::to_owned)
            .ok_or_else(|| ErrorKind::Message(format!("not wrapped: {}", wrapped)).into())
    }

    #[test]
    fn object_codec() {
        let codec = create_object_codec([("n1", NumToStr), ("n2", NumToStr)]);
        let unpacked: BTreeMap<String, u64> = [("n1".to_owned(), 1), ("n2".to_owned(), 2)].into_iter().collect();
        let packed: BTreeMap<String, String> = [("n1".to_owned(), "1".to_owned()), ("n2".to_owned(), "2".to_owned())].into_iter().collect();
        assert_eq!(packed, codec.pack(&unpacked).unwrap());
        assert_eq!(unpacked, codec.unpack(&packed).unwrap());

        let mut broken = packed.clone();
        broken.insert("n2".to_owned(), "two".to_owned());
        let error = codec.unpack(&broken).unwrap_err();
        assert_eq!("input.n2", error.path());
        broken.remove("n1");
        assert!(matches!(codec.unpack(&broken).unwrap_err().kind(), ErrorKind::Missing(key) if key == "n1"));
    }

    #[test]
    fn array_codec() {
        let codec = create_array_codec(NumToStr);
        assert_eq!(vec!["1".to_owned(), "2".to_owned()], codec.pack(&vec![1, 2]).unwrap());
        assert_eq!(vec![1, 2], codec.unpack(&vec!["1".to_owned(), "2".to_owned()]).unwrap());
        assert_eq!("input[1]", codec.unpack(&vec!["1".to_owned(), "x".to_owned()]).unwrap_err().path());
    }

    #[test]
    fn enhanced() {
        let wrap1 = enhance_pack(NumToStr, wrap_bracket, unwrap_bracket);
        assert_eq!("[1]", wrap1.pack(&1).unwrap());
        assert_eq!(1, wrap1.unpack("[1]").unwrap());

        let wrap2 = enhance_pack(wrap1, wrap_bracket, unwrap_bracket);
        assert_eq!("[[1]]", wrap2.pack(&1).unwrap());
        assert_eq!(1, wrap2.unpack("[[1]]").unwrap());
        assert!(wrap2.unpack("[1]").is_err());
    }

    #[test]
    fn enhanced_bytes_nest() {
        let framed = BytesCodec::dynamic(enhance_pack(
            BytesCodec::from(UINT8),
            |packed: Vec<u8>| Ok(concat([&[0xff][..], &packed[..]])),
            |buf: &[u8]| buf.get(1..).map(<[u8]>::to_vec).ok_or_else(|| ErrorKind::MinLength { expected: 1, actual: 0 }.into()),
        ));
        assert_eq!("Uint8", framed.name());
        let codec = crate::layout::dynvec(framed);
        let packed = codec.pack(&Value::Array(vec![Value::from(7u8)])).unwrap();
        assert_eq!(vec![10, 0, 0, 0, 8, 0, 0, 0, 0xff, 7], packed);
        assert_eq!(Value::Array(vec![Value::from(7u8)]), codec.unpack(&packed).unwrap());
    }

    #[test]
    fn nullable() {
        let codec = create_nullable_codec(UINT32);
        assert_eq!(None, codec.pack(&None).unwrap());
        assert_eq!(None, codec.unpack(&None).unwrap());
        assert_eq!(Some(vec![0x78, 0x56, 0x34, 0x12]), codec.pack(&Some(Value::from(0x12345678u32))).unwrap());
        assert_eq!(Some(Value::from(0x12345678u32)), codec.unpack(&Some(vec![0x78, 0x56, 0x34, 0x12])).unwrap());
    }

    // rollup_type_hash | withdrawal_lock_args | owner_lock_len (u32 big-endian) | owner_lock
    #[test]
    fn mixed_framing() {
        let hash = || crate::helper::byte_array_of(crate::codec::create_bytes_codec(
            "Byte32",
            |v| Ok(crate::bytes::bytify_value(v)?),
            |b| Ok(Value::Bytes(b.to_vec())),
        ), 32);
        let lock_args = r#struct([
            ("withdrawal_block_hash", hash()),
            ("withdrawal_block_number", UINT64.into()),
            ("owner_lock_hash", hash()),
        ], &["withdrawal_block_hash", "withdrawal_block_number", "owner_lock_hash"]).unwrap();
        let script = table([("code_hash", hash()), ("hash_type", BytesCodec::from(UINT8))], &["code_hash", "hash_type"]).unwrap();
        let lock_args_len = lock_args.byte_length().unwrap_or_default();
        let order = ["rollup_type_hash", "withdrawal_lock_args", "owner_lock_len", "owner_lock"];
        let object = create_object_codec([
            ("rollup_type_hash", hash()),
            ("withdrawal_lock_args", lock_args),
            ("owner_lock_len", UINT32_BE.into()),
            ("owner_lock", script),
        ]);
        let codec = enhance_pack(
            object,
            move |packed: BTreeMap<String, Vec<u8>>| Ok(concat(order.iter().filter_map(|k| packed.get(*k)))),
            move |buf: &[u8]| {
                let mut parts = BTreeMap::new();
                let mut offset = 0;
                for (key, len) in [("rollup_type_hash", 32), ("withdrawal_lock_args", lock_args_len), ("owner_lock_len", 4)] {
                    let part = buf.get(offset..offset + len).ok_or(ErrorKind::MinLength { expected: offset + len, actual: buf.len() })?;
                    parts.insert(key.to_owned(), part.to_vec());
                    offset += len;
                }
                parts.insert("owner_lock".to_owned(), buf[offset..].to_vec());
                Ok(parts)
            },
        );
        let lock = Value::object([("code_hash", Value::Bytes(vec![3; 32])), ("hash_type", Value::from(1u8))]);
        let lock_len = 4 + 8 + 32 + 1;
        let input: BTreeMap<String, Value> = [
            ("rollup_type_hash", Value::Bytes(vec![1; 32])),
            ("withdrawal_lock_args", Value::object([
                ("withdrawal_block_hash", Value::Bytes(vec![2; 32])),
                ("withdrawal_block_number", Value::from(7u64)),
                ("owner_lock_hash", Value::Bytes(vec![4; 32])),
            ])),
            ("owner_lock_len", Value::from(lock_len as u32)),
            ("owner_lock", lock),
        ].into_iter().map(|(k, v)| (k.to_owned(), v)).collect();

        let packed = codec.pack(&input).unwrap();
        assert_eq!(32 + 72 + 4 + lock_len, packed.len());
        assert_eq!(&[0, 0, 0, lock_len as u8], &packed[104..108]);
        assert_eq!(input, codec.unpack(&packed).unwrap());
        assert!(matches!(codec.unpack(&packed[..50]).unwrap_err().kind(), ErrorKind::MinLength { .. }));
    }
}
