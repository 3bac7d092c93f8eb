//! Conveniently move your Rust data structures in and out of molecule schemas.
//!
//! Molecule is not self-describing, so unlike most serde formats this crate does not produce bytes directly. Instead,
//! [`to_value`] turns a `Serialize` into the dynamic [`molecule::Value`] which a schema codec then packs, and
//! [`from_value`] goes the other way. [`Typed`] binds both steps to a codec. Structs and maps become objects, sequences
//! and tuples arrays, unit variants their name and data-carrying variants unions. Byte strings deserialize into either
//! `Vec<u8>` or a `0x` prefixed `String`, whichever the target asks for.
//!
//! # Examples
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use molecule::{option, table, BytesCodec, Codec, UINT32, UINT8};
//! use molecule_serde::Typed;
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Output {
//!     capacity: u32,
//!     flag: Option<u8>,
//! }
//!
//! let codec = Typed::<Output>::new(table([
//!     ("capacity", BytesCodec::from(UINT32)),
//!     ("flag", option(UINT8.into())),
//! ], &["capacity", "flag"]).unwrap());
//!
//! let output = Output { capacity: 1000, flag: None };
//! let bytes = codec.pack(&output).unwrap();
//! assert_eq!(bytes, [
//!     0x10, 0x00, 0x00, 0x00, // total size
//!     0x0c, 0x00, 0x00, 0x00, // offset of capacity
//!     0x10, 0x00, 0x00, 0x00, // offset of flag
//!     0xe8, 0x03, 0x00, 0x00, // capacity, flag is empty
//! ]);
//! assert_eq!(output, codec.unpack(&bytes).unwrap());
//! ```

mod de;
mod error;
mod ser;
mod typed;

pub use de::*;
pub use error::*;
pub use ser::*;
pub use typed::*;

#[cfg(test)]
mod tests {

    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Enum {
        UnitVariant,
        NewtypeVariant(bool),
        TupleVariant(u8, u16),
        StructVariant {
            a: u8,
            b: u8,
            c: u8,
        }
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Struct {
        field: u8,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct UnitStruct;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct NewtypeStruct(String);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct TupleStruct(char, char, char);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Test {
        bool: bool,
        i8: i8,
        i16: i16,
        i32: i32,
        i64: i64,
        u8: u8,
        u16: u16,
        u32: u32,
        u64: u64,
        u128: u128,
        char: char,
        str: String,
        #[serde(with = "serde_bytes")]
        bytes: Vec<u8>,
        none: Option<u8>,
        some: Option<u8>,
        unit: (),
        unit_struct: UnitStruct,
        newtype_struct: NewtypeStruct,
        tuple_struct: TupleStruct,
        seq: Vec<String>,
        tuple: (u16, u16, u16),
        map: HashMap<String, u32>,
        r#struct: Struct,
        unit_variant: Enum,
        newtype_variant: Enum,
        tuple_variant: Enum,
        struct_variant: Enum,
    }

    #[test]
    fn roundtrip() {
        let message = Test {
            bool: true,
            i8: -1,
            i16: -20,
            i32: -7000,
            i64: i64::MIN,
            u8: 1,
            u16: 20,
            u32: 7000,
            u64: u64::MAX,
            u128: u128::MAX,
            char: 'x',
            str: "Test".to_string(),
            bytes: vec![0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0],
            none: None,
            some: Some(0),
            unit: (),
            unit_struct: UnitStruct,
            newtype_struct: NewtypeStruct("Qapla'".to_string()),
            tuple_struct: TupleStruct('a', 'b', 'c'),
            seq: vec![
                "Elen".to_string(),
                "síla".to_string(),
                "lúmenn'".to_string(),
                "omentielvo".to_string(),
            ],
            tuple: (0, 0, 0),
            map: [
                ("Enterprise".to_string(), 1701),
                ("Voyager".to_string(), 74656),
            ].into_iter().collect(),
            r#struct: Struct {
                field: 42,
            },
            unit_variant: Enum::UnitVariant,
            newtype_variant: Enum::NewtypeVariant(false),
            tuple_variant: Enum::TupleVariant(1, 999),
            struct_variant: Enum::StructVariant {
                a: 255,
                b: 0,
                c: 33,
            }
        };
        let value = to_value(&message).unwrap();
        assert_eq!(Some(&molecule::Value::Bytes(message.bytes.clone())), value.get("bytes"));
        assert_eq!(Some(&molecule::Value::from("UnitVariant")), value.get("unit_variant"));
        assert_eq!(message, from_value::<Test>(value).unwrap());
    }

    #[test]
    fn through_json() {
        let value = to_value(&Struct { field: 42 }).unwrap();
        let json = serde_json::to_string(&SerializeValue(&value)).unwrap();
        assert_eq!(r#"{"field":42}"#, json);
        let back: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, to_value(&back).unwrap());
    }
}
