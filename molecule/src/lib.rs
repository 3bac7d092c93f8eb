//! Schema-driven packing and unpacking of the molecule binary format.
//!
//! A schema is assembled once from the layout constructors and then used as an immutable `BytesCodec` from any number
//! of threads. Packing turns a [`Value`] into canonical bytes, unpacking validates untrusted bytes and turns them back
//! into a `Value`. Every failure carries the access path to the offending field, e.g. `input.outputs[2].lock.args`.
//!
//! # Layouts
//!
//! `array` and `struct` are fixed-size: their byte length follows from the schema alone and nothing but the items is
//! written. `fixvec` prefixes fixed-size items with their count, `dynvec` and `table` locate their items through an
//! offset table, see [`Header`]. A `union` is the `u32` id of its variant followed by the variant, an `option` is
//! either nothing at all or its inner value. All header words are little-endian `u32`s, so no encoded value may
//! exceed 4 GiB.
//!
//! # A note on integers
//!
//! Molecule integers go up to 512 bit. `Value::Int` holds a `BigInt`, which is signed so that negative input can be
//! represented and rejected with a proper `ErrorKind::Range` instead of failing to convert somewhere upstream.
//!
//! # Examples
//!
//! ```
//! use molecule::*;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let codec = table([
//!     ("index", BytesCodec::from(UINT32)),
//!     ("args", vector(UINT8.into())?),
//! ], &["index", "args"])?;
//! let value = Value::object([
//!     ("index", Value::from(7u32)),
//!     ("args", Value::Array(vec![Value::from(0x12u8), Value::from(0x34u8)])),
//! ]);
//! let buf = codec.pack(&value)?;
//! assert_eq!(buf, [
//!     0x16, 0x00, 0x00, 0x00, // total size
//!     0x0c, 0x00, 0x00, 0x00, // offset of index
//!     0x10, 0x00, 0x00, 0x00, // offset of args
//!     0x07, 0x00, 0x00, 0x00, // index
//!     0x02, 0x00, 0x00, 0x00, // args: item count
//!     0x12, 0x34,             // args: items
//! ]);
//! assert_eq!(value, codec.unpack(&buf)?);
//!
//! let error = codec.pack(&Value::object([("index", Value::from(-1))])).unwrap_err();
//! assert_eq!("input.index", error.path());
//! # Ok(())
//! # }
//! ```

mod bytes;
mod codec;
mod error;
mod header;
mod helper;
mod layout;
mod nested;
mod number;
mod track;
mod value;

pub use bytes::*;
pub use codec::*;
pub use error::*;
pub use header::*;
pub use helper::*;
pub use layout::*;
pub use nested::*;
pub use number::*;
pub use track::*;
pub use value::*;
