//! The molecule layouts. `array` and `struct` are fixed-size and carry no header at all, everything else is
//! dynamic-size:
//!
//! | Layout   | Header                                           | Body                                  |
//! |----------|--------------------------------------------------|---------------------------------------|
//! | `array`  |                                                  | item-0 \| item-1 \| ... \| item-N     |
//! | `struct` |                                                  | field-0 \| field-1 \| ... \| field-N  |
//! | `fixvec` | item count                                       | item-0 \| item-1 \| ... \| item-N     |
//! | `dynvec` | full size \| offset-0 \| offset-1 \| ... \| offset-N | item-0 \| item-1 \| ... \| item-N |
//! | `table`  | full size \| offset-0 \| offset-1 \| ... \| offset-N | field-0 \| field-1 \| ... \| field-N |
//! | `option` |                                                  | item, or zero bytes for none          |
//! | `union`  | item type id                                     | item                                  |
//!
//! All header words are little-endian `u32`s. Constructors which can be handed an inconsistent schema return a
//! `SchemaError`, the returned codecs never fail for reasons other than their input.

use crate::bytes::{assert_buffer_length, assert_min_buffer_length};
use crate::codec::{BytesCodec, Codec, Fixed, ValueCodec};
use crate::error::{ErrorKind, Result, SchemaError};
use crate::header::{pack_dynamic, read_u32, to_u32, Count, Header, WORD};
use crate::track::Track;
use crate::value::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

static NONE: Value = Value::None;

macro_rules! value_codec {
    ($layout:ty) => {
        impl Codec for $layout {
            type Packed = Vec<u8>;
            type Unpacked = Value;
            type Packable = Value;
            type Unpackable = [u8];

            fn pack(&self, packable: &Value) -> Result<Vec<u8>> {
                self.pack_value(packable)
            }

            fn unpack(&self, unpackable: &[u8]) -> Result<Value> {
                self.unpack_value(unpackable)
            }
        }

        impl ValueCodec for $layout {
            fn name(&self) -> Cow<'static, str> {
                Cow::Owned(self.name.clone())
            }
        }
    };
}

/// Check that the keys of a shape and the declared field order name the same fields.
pub fn check_shape<'a, I: IntoIterator<Item = &'a str>>(shape: I, fields: &[&str]) -> std::result::Result<(), SchemaError> {
    let shape: BTreeSet<&str> = shape.into_iter().collect();
    let order: BTreeSet<&str> = fields.iter().copied().collect();
    let missing_fields: Vec<String> = shape.difference(&order).map(|f| f.to_string()).collect();
    let missing_shape: Vec<String> = order.difference(&shape).map(|f| f.to_string()).collect();
    if missing_fields.is_empty() && missing_shape.is_empty() {
        Ok(())
    } else {
        Err(rejected(SchemaError::ShapeMismatch { missing_fields, missing_shape }))
    }
}

fn rejected(error: SchemaError) -> SchemaError {
    tracing::debug!(%error, "schema rejected");
    error
}

/// Pair every field in `fields` with its codec from `shape`, in declaration order.
fn ordered_shape<K, I>(shape: I, fields: &[&str]) -> std::result::Result<Vec<(String, BytesCodec)>, SchemaError>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, BytesCodec)>,
{
    let mut codecs = BTreeMap::new();
    for (key, codec) in shape {
        let key = key.into();
        if codecs.contains_key(&key) {
            return Err(rejected(SchemaError::DuplicateField(key)));
        }
        codecs.insert(key, codec);
    }
    let mut seen = BTreeSet::new();
    if let Some(field) = fields.iter().find(|&&f| !seen.insert(f)) {
        return Err(rejected(SchemaError::DuplicateField(field.to_string())));
    }
    check_shape(codecs.keys().map(String::as_str), fields)?;
    Ok(fields.iter().filter_map(|&f| codecs.remove_entry(f)).collect())
}

fn require_fixed(field: &str, codec: &BytesCodec) -> std::result::Result<usize, SchemaError> {
    codec.byte_length().ok_or_else(|| rejected(SchemaError::NotFixed(field.to_owned())))
}

/// The items of an array-like value. Byte buffers count as arrays of integers.
fn items(value: &Value) -> std::result::Result<Cow<'_, [Value]>, ErrorKind> {
    match value {
        Value::Array(items) => Ok(Cow::Borrowed(items)),
        Value::Bytes(bytes) => Ok(Cow::Owned(bytes.iter().map(|&b| Value::from(b)).collect())),
        other => Err(ErrorKind::Type { expected: "array", found: other.typename() }),
    }
}

fn fields(value: &Value) -> std::result::Result<&BTreeMap<String, Value>, ErrorKind> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(ErrorKind::Type { expected: "object", found: other.typename() }),
    }
}

/// A fixed number of fixed-size items, without any header.
pub struct ArrayLayout {
    name: String,
    item: BytesCodec,
    item_length: usize,
    count: usize,
}

impl ArrayLayout {

    fn pack_value(&self, value: &Value) -> Result<Vec<u8>> {
        let items = items(value).map_err(|e| e.expecting(self.name.clone()))?;
        if items.len() != self.count {
            return Err(ErrorKind::Count { expected: self.count, actual: items.len() }.expecting(self.name.clone()));
        }
        let mut buf = Vec::with_capacity(self.byte_length());
        for (i, item) in items.iter().enumerate() {
            buf.extend(self.item.pack(item).in_index(i)?);
        }
        assert_buffer_length(&buf, self.byte_length()).map_err(|e| e.expecting(self.name.clone()))?;
        Ok(buf)
    }

    fn unpack_value(&self, buf: &[u8]) -> Result<Value> {
        assert_buffer_length(buf, self.byte_length()).map_err(|e| e.expecting(self.name.clone()))?;
        (0..self.count)
            .map(|i| self.item.unpack(&buf[i * self.item_length..(i + 1) * self.item_length]).in_index(i))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

}

value_codec!(ArrayLayout);

impl Fixed for ArrayLayout {
    fn byte_length(&self) -> usize {
        self.item_length * self.count
    }
}

/// `count` consecutive items of the fixed-size `item` codec.
pub fn array(item: BytesCodec, count: usize) -> std::result::Result<BytesCodec, SchemaError> {
    let name = format!("array<{}, {}>", item.name(), count);
    let item_length = require_fixed(&item.name(), &item)?;
    Ok(BytesCodec::fixed(ArrayLayout { name, item, item_length, count }))
}

/// Named fixed-size fields, packed back to back in declaration order.
pub struct StructLayout {
    name: String,
    fields: Vec<(String, BytesCodec, usize)>,
    byte_length: usize,
}

impl StructLayout {

    fn pack_value(&self, value: &Value) -> Result<Vec<u8>> {
        let object = fields(value).map_err(|e| e.expecting(self.name.clone()))?;
        let mut buf = Vec::with_capacity(self.byte_length);
        for (field, codec, _) in &self.fields {
            buf.extend(codec.pack(object.get(field).unwrap_or(&NONE)).in_field(field)?);
        }
        assert_buffer_length(&buf, self.byte_length).map_err(|e| e.expecting(self.name.clone()))?;
        Ok(buf)
    }

    fn unpack_value(&self, buf: &[u8]) -> Result<Value> {
        assert_buffer_length(buf, self.byte_length).map_err(|e| e.expecting(self.name.clone()))?;
        let mut offset = 0;
        let mut object = BTreeMap::new();
        for (field, codec, len) in &self.fields {
            object.insert(field.clone(), codec.unpack(&buf[offset..offset + len]).in_field(field)?);
            offset += len;
        }
        Ok(Value::Object(object))
    }

}

value_codec!(StructLayout);

impl Fixed for StructLayout {
    fn byte_length(&self) -> usize {
        self.byte_length
    }
}

/// A struct over `shape`, serialized in the order given by `fields`. Every field must be fixed-size.
pub fn r#struct<K, I>(shape: I, fields: &[&str]) -> std::result::Result<BytesCodec, SchemaError>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, BytesCodec)>,
{
    let fields = ordered_shape(shape, fields)?
        .into_iter()
        .map(|(field, codec)| require_fixed(&field, &codec).map(|len| (field, codec, len)))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let byte_length = fields.iter().map(|(_, _, len)| len).sum();
    let name = format!("struct({})", fields.iter().map(|(f, _, _)| f.as_str()).collect::<Vec<_>>().join(", "));
    Ok(BytesCodec::fixed(StructLayout { name, fields, byte_length }))
}

/// A vector of fixed-size items, prefixed with the item count.
pub struct FixvecLayout {
    name: String,
    item: BytesCodec,
    item_length: usize,
}

impl FixvecLayout {

    fn pack_value(&self, value: &Value) -> Result<Vec<u8>> {
        let items = items(value).map_err(|e| e.expecting(self.name.clone()))?;
        let count = to_u32(items.len()).map_err(|e| e.expecting(self.name.clone()))?;
        let mut buf = Vec::with_capacity(WORD + items.len() * self.item_length);
        buf.extend_from_slice(&count.to_le_bytes());
        for (i, item) in items.iter().enumerate() {
            buf.extend(self.item.pack(item).in_index(i)?);
        }
        to_u32(buf.len()).map_err(|e| e.expecting(self.name.clone()))?;
        Ok(buf)
    }

    fn unpack_value(&self, buf: &[u8]) -> Result<Value> {
        assert_min_buffer_length(buf, WORD).map_err(|e| e.expecting(self.name.clone()))?;
        let count = read_u32(buf, 0).unwrap_or_default();
        let body = &buf[WORD..];
        if count.checked_mul(self.item_length) != Some(body.len()) {
            tracing::trace!(count, item_length = self.item_length, body = body.len(), "fixvec count disagrees with body");
            return Err(ErrorKind::Length { expected: count.saturating_mul(self.item_length), actual: body.len() }
                .expecting(self.name.clone()));
        }
        body.chunks_exact(self.item_length)
            .enumerate()
            .map(|(i, chunk)| self.item.unpack(chunk).in_index(i))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

}

value_codec!(FixvecLayout);

pub fn fixvec(item: BytesCodec) -> std::result::Result<BytesCodec, SchemaError> {
    let item_length = require_fixed(&item.name(), &item)?;
    if item_length == 0 {
        return Err(rejected(SchemaError::ZeroSized(item.name().into_owned())));
    }
    let name = format!("fixvec<{}>", item.name());
    Ok(BytesCodec::dynamic(FixvecLayout { name, item, item_length }))
}

/// A vector of items of any size, located through an offset table.
pub struct DynvecLayout {
    name: String,
    item: BytesCodec,
}

impl DynvecLayout {

    fn pack_value(&self, value: &Value) -> Result<Vec<u8>> {
        let items = items(value).map_err(|e| e.expecting(self.name.clone()))?;
        let bodies = items.iter()
            .enumerate()
            .map(|(i, item)| self.item.pack(item).in_index(i))
            .collect::<Result<Vec<_>>>()?;
        pack_dynamic(&bodies).map_err(|e| e.expecting(self.name.clone()))
    }

    fn unpack_value(&self, buf: &[u8]) -> Result<Value> {
        let header = Header::decode(buf, Count::Inferred).map_err(|e| e.expecting(self.name.clone()))?;
        header.ranges()
            .enumerate()
            .map(|(i, range)| self.item.unpack(&buf[range]).in_index(i))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

}

value_codec!(DynvecLayout);

pub fn dynvec(item: BytesCodec) -> BytesCodec {
    let name = format!("dynvec<{}>", item.name());
    BytesCodec::dynamic(DynvecLayout { name, item })
}

/// A `fixvec` for fixed-size items, a `dynvec` otherwise. The choice is made here, once, so packing and unpacking
/// always agree on the wire format.
pub fn vector(item: BytesCodec) -> std::result::Result<BytesCodec, SchemaError> {
    if item.is_fixed() {
        fixvec(item)
    } else {
        Ok(dynvec(item))
    }
}

/// Named fields of any size, located through an offset table.
pub struct TableLayout {
    name: String,
    fields: Vec<(String, BytesCodec)>,
}

impl TableLayout {

    fn pack_value(&self, value: &Value) -> Result<Vec<u8>> {
        let object = fields(value).map_err(|e| e.expecting(self.name.clone()))?;
        let bodies = self.fields.iter()
            .map(|(field, codec)| codec.pack(object.get(field).unwrap_or(&NONE)).in_field(field))
            .collect::<Result<Vec<_>>>()?;
        pack_dynamic(&bodies).map_err(|e| e.expecting(self.name.clone()))
    }

    fn unpack_value(&self, buf: &[u8]) -> Result<Value> {
        let header = Header::decode(buf, Count::Exactly(self.fields.len())).map_err(|e| e.expecting(self.name.clone()))?;
        if header.is_empty() {
            return Ok(Value::Object(BTreeMap::new()));
        }
        let mut object = BTreeMap::new();
        for ((field, codec), range) in self.fields.iter().zip(header.ranges()) {
            object.insert(field.clone(), codec.unpack(&buf[range]).in_field(field)?);
        }
        Ok(Value::Object(object))
    }

}

value_codec!(TableLayout);

/// A table over `shape`, serialized in the order given by `fields`.
pub fn table<K, I>(shape: I, fields: &[&str]) -> std::result::Result<BytesCodec, SchemaError>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, BytesCodec)>,
{
    let fields = ordered_shape(shape, fields)?;
    let name = format!("table({})", fields.iter().map(|(f, _)| f.as_str()).collect::<Vec<_>>().join(", "));
    Ok(BytesCodec::dynamic(TableLayout { name, fields }))
}

/// How union variants are numbered on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnionIds {
    /// Variants are numbered by their position, starting at zero
    Order(Vec<String>),
    /// Every variant carries an explicit id
    Ids(Vec<(String, u32)>),
}

impl UnionIds {

    pub fn order(fields: &[&str]) -> Self {
        UnionIds::Order(fields.iter().map(|f| f.to_string()).collect())
    }

    pub fn ids<'a, I: IntoIterator<Item = (&'a str, u32)>>(ids: I) -> Self {
        UnionIds::Ids(ids.into_iter().map(|(f, id)| (f.to_owned(), id)).collect())
    }

}

/// One of several variants, prefixed by the id of the variant.
pub struct UnionLayout {
    name: String,
    variants: Vec<(String, u32, BytesCodec)>,
}

impl UnionLayout {

    fn variant(value: &Value) -> std::result::Result<(&str, &Value), ErrorKind> {
        match value {
            Value::Union(variant, inner) => Ok((variant.as_str(), inner.as_ref())),
            Value::Object(fields) => match fields.get("type").unwrap_or(&NONE) {
                Value::Str(variant) => Ok((variant.as_str(), fields.get("value").unwrap_or(&NONE))),
                other => Err(ErrorKind::Type { expected: "string", found: other.typename() }),
            },
            other => Err(ErrorKind::Type { expected: "union", found: other.typename() }),
        }
    }

    fn pack_value(&self, value: &Value) -> Result<Vec<u8>> {
        let (variant, inner) = Self::variant(value).map_err(|e| e.expecting(self.name.clone()))?;
        let (_, id, codec) = self.variants.iter()
            .find(|(name, _, _)| name == variant)
            .ok_or_else(|| ErrorKind::UnknownVariant(variant.to_owned()).expecting(self.name.clone()))?;
        let mut buf = id.to_le_bytes().to_vec();
        buf.extend(codec.pack(inner).in_field(variant)?);
        Ok(buf)
    }

    fn unpack_value(&self, buf: &[u8]) -> Result<Value> {
        assert_min_buffer_length(buf, WORD).map_err(|e| e.expecting(self.name.clone()))?;
        let id = read_u32(buf, 0).unwrap_or_default();
        let (variant, _, codec) = self.variants.iter()
            .find(|(_, candidate, _)| *candidate as usize == id)
            .ok_or_else(|| {
                tracing::trace!(id, "unknown union id");
                ErrorKind::UnknownVariant(id.to_string()).expecting(self.name.clone())
            })?;
        let inner = codec.unpack(&buf[WORD..]).in_field(variant)?;
        Ok(Value::Union(variant.clone(), Box::new(inner)))
    }

}

value_codec!(UnionLayout);

/// A tagged union over `shape`. With `UnionIds::Order` the ids are the positions of the variants, with
/// `UnionIds::Ids` every variant gets its explicit id, which must be unique.
pub fn union<K, I>(shape: I, ids: UnionIds) -> std::result::Result<BytesCodec, SchemaError>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, BytesCodec)>,
{
    let variants: Vec<(String, u32, BytesCodec)> = match ids {
        UnionIds::Order(order) => {
            let order: Vec<&str> = order.iter().map(String::as_str).collect();
            ordered_shape(shape, &order)?
                .into_iter()
                .enumerate()
                .map(|(i, (field, codec))| (field, i as u32, codec))
                .collect()
        },
        UnionIds::Ids(ids) => {
            let mut codecs = BTreeMap::new();
            for (key, codec) in shape {
                let key = key.into();
                if codecs.contains_key(&key) {
                    return Err(rejected(SchemaError::DuplicateField(key)));
                }
                codecs.insert(key, codec);
            }
            let mut seen = BTreeSet::new();
            let mut variants = Vec::with_capacity(ids.len());
            for (field, id) in ids {
                if !seen.insert(id) {
                    return Err(rejected(SchemaError::DuplicateUnionId(id)));
                }
                let codec = codecs.remove(&field).ok_or_else(|| rejected(SchemaError::UnknownUnionField(field.clone())))?;
                variants.push((field, id, codec));
            }
            variants
        },
    };
    let name = format!("Union({})", variants.iter().map(|(f, _, _)| f.as_str()).collect::<Vec<_>>().join(" | "));
    Ok(BytesCodec::dynamic(UnionLayout { name, variants }))
}

/// Either nothing at all or exactly the bytes of the inner codec.
pub struct OptionLayout {
    name: String,
    item: BytesCodec,
}

impl OptionLayout {

    fn pack_value(&self, value: &Value) -> Result<Vec<u8>> {
        match value {
            Value::None => Ok(Vec::new()),
            value => self.item.pack(value).in_option(),
        }
    }

    fn unpack_value(&self, buf: &[u8]) -> Result<Value> {
        if buf.is_empty() {
            Ok(Value::None)
        } else {
            self.item.unpack(buf)
        }
    }

}

value_codec!(OptionLayout);

pub fn option(item: BytesCodec) -> BytesCodec {
    let name = format!("option<{}>", item.name());
    BytesCodec::dynamic(OptionLayout { name, item })
}
