use molecule::{BytesCodec, Codec, ErrorKind};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::marker::PhantomData;

use crate::de::from_value;
use crate::error::Error;
use crate::ser::to_value;

/// A schema codec bound to a Rust type: packs any `T` by way of its `Value` and unpacks straight back into `T`.
pub struct Typed<T> {
    codec: BytesCodec,
    target: PhantomData<fn() -> T>,
}

impl<T> Typed<T> {
    pub fn new(codec: BytesCodec) -> Self {
        Typed { codec, target: PhantomData }
    }

    pub fn codec(&self) -> &BytesCodec {
        &self.codec
    }

    fn fail(&self, e: Error) -> molecule::Error {
        match e {
            Error::Codec(inner) => inner,
            other => ErrorKind::Message(other.to_string()).expecting(self.codec.name()),
        }
    }
}

impl<T> Clone for Typed<T> {
    fn clone(&self) -> Self {
        Typed::new(self.codec.clone())
    }
}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Typed({:?})", self.codec)
    }
}

impl<T: Serialize + DeserializeOwned> Codec for Typed<T> {
    type Packed = Vec<u8>;
    type Unpacked = T;
    type Packable = T;
    type Unpackable = [u8];

    fn pack(&self, packable: &T) -> molecule::Result<Vec<u8>> {
        let value = to_value(packable).map_err(|e| self.fail(e))?;
        self.codec.pack(&value)
    }

    fn unpack(&self, unpackable: &[u8]) -> molecule::Result<T> {
        let value = self.codec.unpack(unpackable)?;
        from_value(value).map_err(|e| self.fail(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use molecule::{table, BytesCodec, UINT32, UINT8};
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Entry {
        index: u32,
        flag: u8,
    }

    fn entry() -> Typed<Entry> {
        Typed::new(table([("index", BytesCodec::from(UINT32)), ("flag", UINT8.into())], &["index", "flag"]).unwrap())
    }

    #[test]
    fn typed_table() {
        let codec = entry();
        let packed = codec.pack(&Entry { index: 7, flag: 1 }).unwrap();
        assert_eq!(vec![0x11, 0, 0, 0, 0x0c, 0, 0, 0, 0x10, 0, 0, 0, 7, 0, 0, 0, 1], packed);
        assert_eq!(Entry { index: 7, flag: 1 }, codec.unpack(&packed).unwrap());
    }

    #[test]
    fn type_mismatch_names_codec() {
        let codec: Typed<String> = Typed::new(UINT8.into());
        let error = codec.unpack(&[7]).unwrap_err();
        assert_eq!(Some("Uint8"), error.expected_type());
        assert!(error.to_string().contains("Unexpected value: expected string, found integer"));
    }
}
