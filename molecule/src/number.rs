//! Fixed-width unsigned integers. Every width comes in a little- and a big-endian flavor, the unsuffixed aliases are
//! little-endian since that is what molecule uses throughout.

use crate::bytes::{assert_buffer_length, assert_hex_decimal};
use crate::codec::{BytesCodec, Codec, Fixed, ValueCodec};
use crate::error::{ErrorKind, Result};
use crate::value::Value;
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// An unsigned integer codec occupying exactly `byte_length` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uint {
    byte_length: usize,
    endian: Endian,
}

pub const UINT8: Uint = Uint::new(1, Endian::Little);

pub const UINT16_LE: Uint = Uint::new(2, Endian::Little);
pub const UINT16_BE: Uint = Uint::new(2, Endian::Big);
pub const UINT16: Uint = UINT16_LE;

pub const UINT32_LE: Uint = Uint::new(4, Endian::Little);
pub const UINT32_BE: Uint = Uint::new(4, Endian::Big);
pub const UINT32: Uint = UINT32_LE;

pub const UINT64_LE: Uint = Uint::new(8, Endian::Little);
pub const UINT64_BE: Uint = Uint::new(8, Endian::Big);
pub const UINT64: Uint = UINT64_LE;

pub const UINT128_LE: Uint = Uint::new(16, Endian::Little);
pub const UINT128_BE: Uint = Uint::new(16, Endian::Big);
pub const UINT128: Uint = UINT128_LE;

pub const UINT256_LE: Uint = Uint::new(32, Endian::Little);
pub const UINT256_BE: Uint = Uint::new(32, Endian::Big);
pub const UINT256: Uint = UINT256_LE;

pub const UINT512_LE: Uint = Uint::new(64, Endian::Little);
pub const UINT512_BE: Uint = Uint::new(64, Endian::Big);
pub const UINT512: Uint = UINT512_LE;

impl Uint {

    pub const fn new(byte_length: usize, endian: Endian) -> Self {
        Uint { byte_length, endian }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// The largest representable value, `2^(8 * byte_length) - 1`
    pub fn max(&self) -> BigInt {
        (BigInt::one() << (8 * self.byte_length)) - 1
    }

    /// Pack an integer, failing with `ErrorKind::Range` if it is negative or too large.
    pub fn pack_int(&self, value: &BigInt) -> Result<Vec<u8>> {
        let max = self.max();
        if value < &BigInt::zero() || value > &max {
            return Err(ErrorKind::Range { min: BigInt::zero(), max, got: value.clone() }.expecting(self.name()));
        }
        let (_, mut bytes) = value.to_bytes_le();
        bytes.resize(self.byte_length, 0);
        if self.endian == Endian::Big {
            bytes.reverse();
        }
        Ok(bytes)
    }

    pub fn unpack_int(&self, buf: &[u8]) -> Result<BigInt> {
        assert_buffer_length(buf, self.byte_length).map_err(|e| e.expecting(self.name()))?;
        Ok(BigInt::from(match self.endian {
            Endian::Little => BigUint::from_bytes_le(buf),
            Endian::Big => BigUint::from_bytes_be(buf),
        }))
    }

    fn to_int(&self, value: &Value) -> Result<BigInt> {
        match value {
            Value::Int(i) => Ok(i.clone()),
            Value::Str(s) => {
                assert_hex_decimal(s, None).map_err(|e| e.expecting(self.name()))?;
                BigInt::parse_bytes(s[2..].as_bytes(), 16)
                    .ok_or_else(|| ErrorKind::Format(format!("invalid hex number {}", s)).expecting(self.name()))
            },
            other => Err(ErrorKind::Type { expected: "integer", found: other.typename() }.expecting(self.name())),
        }
    }

}

impl Codec for Uint {
    type Packed = Vec<u8>;
    type Unpacked = Value;
    type Packable = Value;
    type Unpackable = [u8];

    fn pack(&self, packable: &Value) -> Result<Vec<u8>> {
        self.pack_int(&self.to_int(packable)?)
    }

    fn unpack(&self, unpackable: &[u8]) -> Result<Value> {
        self.unpack_int(unpackable).map(Value::Int)
    }
}

impl ValueCodec for Uint {
    fn name(&self) -> Cow<'static, str> {
        match (self.byte_length, self.endian) {
            (1, _) => Cow::Borrowed("Uint8"),
            (n, Endian::Little) => Cow::Owned(format!("Uint{}LE", n * 8)),
            (n, Endian::Big) => Cow::Owned(format!("Uint{}BE", n * 8)),
        }
    }
}

impl Fixed for Uint {
    fn byte_length(&self) -> usize {
        self.byte_length
    }
}

impl From<Uint> for BytesCodec {
    fn from(codec: Uint) -> Self {
        BytesCodec::fixed(codec)
    }
}
