use serde::de::{self, DeserializeOwned, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde::de::value::StringDeserializer;
use molecule::{bytify_value, hexify, Value};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::collections::btree_map;

use crate::error::{Error, Result};

/// Drives a `Deserialize` from an unpacked `Value`.
pub struct Deserializer {
    value: Value,
}

impl Deserializer {
    pub fn new(value: Value) -> Self {
        Deserializer { value }
    }

    fn unexpected(&self, expected: &'static str) -> Error {
        Error::Unexpected(expected, self.value.typename())
    }

    // Integers wider than 64 bit are also accepted as hex strings
    fn int(self) -> Result<BigInt> {
        match self.value {
            Value::Int(i) => Ok(i),
            Value::Str(s) if s.starts_with("0x") && s.len() > 2 => BigInt::parse_bytes(s[2..].as_bytes(), 16)
                .ok_or(Error::Int(s)),
            other => Err(Error::Unexpected("integer", other.typename())),
        }
    }
}

pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(Deserializer::new(value))
}

macro_rules! deserialize_int {
    ($($method:ident => $visit:ident, $to:ident;)*) => {
        $(fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            let i = self.int()?;
            match i.$to() {
                Some(v) => visitor.$visit(v),
                None => Err(Error::Int(i.to_string())),
            }
        })*
    };
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::None => visitor.visit_none(),
            Value::Int(i) => match (i.to_u64(), i.to_i64(), i.to_u128()) {
                (Some(u), _, _) => visitor.visit_u64(u),
                (None, Some(s), _) => visitor.visit_i64(s),
                (None, None, Some(w)) => visitor.visit_u128(w),
                _ => Err(Error::Int(i.to_string())),
            },
            Value::Bytes(b) => visitor.visit_byte_buf(b),
            Value::Str(s) => visitor.visit_string(s),
            Value::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Object(fields) => visitor.visit_map(MapDeserializer::new(fields)),
            Value::Union(variant, inner) => visitor.visit_enum(EnumDeserializer { variant, value: Some(*inner) }),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let unexpected = self.unexpected("bool");
        match self.int()?.to_u8() {
            Some(0) => visitor.visit_bool(false),
            Some(1) => visitor.visit_bool(true),
            _ => Err(unexpected),
        }
    }

    deserialize_int! {
        deserialize_i8 => visit_i8, to_i8;
        deserialize_i16 => visit_i16, to_i16;
        deserialize_i32 => visit_i32, to_i32;
        deserialize_i64 => visit_i64, to_i64;
        deserialize_i128 => visit_i128, to_i128;
        deserialize_u8 => visit_u8, to_u8;
        deserialize_u16 => visit_u16, to_u16;
        deserialize_u32 => visit_u32, to_u32;
        deserialize_u64 => visit_u64, to_u64;
        deserialize_u128 => visit_u128, to_u128;
    }

    fn deserialize_f32<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Float)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Float)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match &self.value {
            Value::Str(s) if s.chars().count() == 1 => visitor.visit_char(s.chars().next().unwrap_or_default()),
            _ => Err(self.unexpected("char")),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    // Byte strings are rendered as hex so hashes can be plain `String`s on the typed side
    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Str(s) => visitor.visit_string(s),
            Value::Bytes(b) => visitor.visit_string(hexify(&b)),
            other => Err(Error::Unexpected("string", other.typename())),
        }
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Bytes(b) => visitor.visit_byte_buf(b),
            ref other @ (Value::Str(_) | Value::Array(_)) => visitor.visit_byte_buf(bytify_value(other).map_err(Error::Hex)?),
            other => Err(Error::Unexpected("bytes", other.typename())),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::None => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::None => visitor.visit_unit(),
            other => Err(Error::Unexpected("none", other.typename())),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Bytes(b) => visitor.visit_seq(SeqDeserializer::new(b.into_iter().map(Value::from).collect())),
            other => Err(Error::Unexpected("array", other.typename())),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(self, _name: &'static str, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Object(fields) => visitor.visit_map(MapDeserializer::new(fields)),
            other => Err(Error::Unexpected("object", other.typename())),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(self, _name: &'static str, _fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(self, _name: &'static str, _variants: &'static [&'static str], visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Str(variant) => visitor.visit_enum(EnumDeserializer { variant, value: None }),
            Value::Union(variant, inner) => visitor.visit_enum(EnumDeserializer { variant, value: Some(*inner) }),
            other => Err(Error::Unexpected("union", other.typename())),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(items: Vec<Value>) -> Self {
        SeqDeserializer { iter: items.into_iter() }
    }
}

impl<'de> SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        match self.iter.next() {
            Some(value) => seed.deserialize(Deserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: btree_map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(fields: std::collections::BTreeMap<String, Value>) -> Self {
        MapDeserializer { iter: fields.into_iter(), value: None }
    }
}

impl<'de> MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                let key: StringDeserializer<Error> = key.into_deserializer();
                seed.deserialize(key).map(Some)
            },
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let value = self.value.take().unwrap_or(Value::None);
        seed.deserialize(Deserializer::new(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, VariantDeserializer)> {
        let variant: StringDeserializer<Error> = self.variant.into_deserializer();
        Ok((seed.deserialize(variant)?, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None | Some(Value::None) => Ok(()),
            Some(other) => Err(Error::Unexpected("unit variant", other.typename())),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(Deserializer::new(self.value.unwrap_or(Value::None)))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        match self.value {
            Some(Value::Array(items)) => visitor.visit_seq(SeqDeserializer::new(items)),
            Some(other) => Err(Error::Unexpected("tuple variant", other.typename())),
            None => Err(Error::Unexpected("tuple variant", "unit variant")),
        }
    }

    fn struct_variant<V: Visitor<'de>>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        match self.value {
            Some(Value::Object(fields)) => visitor.visit_map(MapDeserializer::new(fields)),
            Some(other) => Err(Error::Unexpected("struct variant", other.typename())),
            None => Err(Error::Unexpected("struct variant", "unit variant")),
        }
    }
}
