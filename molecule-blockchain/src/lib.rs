//! The CKB on-chain data structures as molecule schemas.
//!
//! [`Blockchain`] holds one codec per structure of `blockchain.mol`, working on dynamic [`molecule::Value`]s. The
//! types in this crate mirror the same structures as plain Rust structs and pack and unpack through [`Schema`].
//!
//! # Examples
//!
//! ```
//! use molecule_blockchain::{blockchain, HashType, Schema, Script};
//!
//! let chain = blockchain().unwrap();
//! let script = Script {
//!     code_hash: format!("0x{}", "00".repeat(32)),
//!     hash_type: HashType::Type,
//!     args: "0x1234".to_owned(),
//! };
//! let bytes = script.pack(chain).unwrap();
//! assert_eq!(&bytes[..16], [
//!     0x37, 0x00, 0x00, 0x00, // total size
//!     0x10, 0x00, 0x00, 0x00, // offset of code_hash
//!     0x30, 0x00, 0x00, 0x00, // offset of hash_type
//!     0x31, 0x00, 0x00, 0x00, // offset of args
//! ]);
//! assert_eq!(&bytes[48..], [
//!     0x01,                   // hash_type
//!     0x02, 0x00, 0x00, 0x00, // args: length
//!     0x12, 0x34,             // args: bytes
//! ]);
//! assert_eq!(script, Script::unpack(chain, &bytes).unwrap());
//! ```

mod schema;
mod types;

pub use schema::*;
pub use types::*;
