//! The logical side of a molecule codec is the `Value`. Layouts pack values into bytes and unpack bytes into values;
//! the shape of a value mirrors the shape of its schema: structs and tables become objects, arrays and vectors become
//! arrays, unions become tagged values and empty options become `Value::None`.

use num_bigint::BigInt;
use std::collections::BTreeMap;

/// The possible values according to the molecule data model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Absence of a value, which is what an empty option unpacks to
    None,
    /// Unsigned integers of any width. Signed so that negative inputs can be represented and rejected.
    Int(BigInt),
    Bytes(Vec<u8>),
    /// Enumeration names and textual input such as hex strings
    Str(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// A union value tagged with the name of its variant
    Union(String, Box<Value>),
}

impl Value {

    pub fn typename(&self) -> &'static str {
        match *self {
            Self::None        => "none",
            Self::Int(_)      => "integer",
            Self::Bytes(_)    => "bytes",
            Self::Str(_)      => "string",
            Self::Array(_)    => "array",
            Self::Object(_)   => "object",
            Self::Union(_, _) => "union",
        }
    }

    pub fn union(variant: impl Into<String>, value: impl Into<Value>) -> Self {
        Value::Union(variant.into(), Box::new(value.into()))
    }

    pub fn object<K: Into<String>, I: IntoIterator<Item = (K, Value)>>(fields: I) -> Self {
        Value::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Look up a field of an object. Anything else has no fields.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    fn indent(inner: String) -> Vec<String> {
        inner.lines().map(|line| format!("  {}", line)).collect()
    }

}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(BigInt::from(v))
            }
        })*
    };
}

from_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128);

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None         => f.write_str("none"),
            Value::Int(v)       => write!(f, "{}", v),
            Value::Bytes(v)     => f.write_str(&crate::bytes::hexify(v)),
            Value::Str(v)       => write!(f, "\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")),
            Value::Array(v) if v.is_empty() => f.write_str("[]"),
            Value::Array(v)     => write!(f, "[\n{}\n]", v.iter()
                .flat_map(|item| Self::indent(format!("{},", item)))
                .collect::<Vec<String>>().join("\n")),
            Value::Object(v) if v.is_empty() => f.write_str("{}"),
            Value::Object(v)    => write!(f, "{{\n{}\n}}", v.iter()
                .flat_map(|(k, item)| Self::indent(format!("{}: {},", k, item)))
                .collect::<Vec<String>>().join("\n")),
            Value::Union(t, v)  => write!(f, "{}({})", t, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Value;

    #[test]
    fn display_nested() {
        let value = Value::object([
            ("args", Value::Bytes(vec![0x12, 0x34])),
            ("hash_type", Value::from("type")),
            ("index", Value::from(7u32)),
            ("deps", Value::Array(vec![])),
        ]);
        assert_eq!("{\n  args: 0x1234,\n  deps: [],\n  hash_type: \"type\",\n  index: 7,\n}", value.to_string());
    }

    #[test]
    fn display_union_and_none() {
        assert_eq!("B(5)", Value::union("B", 5u8).to_string());
        assert_eq!("none", Value::from(None::<u8>).to_string());
    }

    #[test]
    fn accessors() {
        let value = Value::object([("lock", Value::None)]);
        assert!(value.get("lock").map_or(false, Value::is_none));
        assert_eq!(None, value.get("type"));
        assert_eq!(None, Value::from(1u8).get("lock"));
        assert_eq!("object", value.typename());
    }
}
