//! Strongly typed counterparts of the schemas. Hashes and byte strings are `0x` prefixed hex `String`s, the way
//! RPC clients pass them around.

use molecule::{BytesCodec, Codec};
use molecule_serde::Typed;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::schema::Blockchain;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HashType {
    Data,
    Type,
    Data1,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DepType {
    Code,
    DepGroup,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub code_hash: String,
    pub hash_type: HashType,
    pub args: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutPoint {
    pub tx_hash: String,
    pub index: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CellInput {
    pub since: u64,
    pub previous_output: OutPoint,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CellOutput {
    pub capacity: u64,
    pub lock: Script,
    #[serde(rename = "type")]
    pub type_: Option<Script>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CellDep {
    pub out_point: OutPoint,
    pub dep_type: DepType,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub version: u32,
    pub cell_deps: Vec<CellDep>,
    pub header_deps: Vec<String>,
    pub inputs: Vec<CellInput>,
    pub outputs: Vec<CellOutput>,
    pub outputs_data: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub raw: RawTransaction,
    pub witnesses: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawHeader {
    pub version: u32,
    pub compact_target: u32,
    pub timestamp: u64,
    pub number: u64,
    pub epoch: u64,
    pub parent_hash: String,
    pub transactions_root: String,
    pub proposals_hash: String,
    pub extra_hash: String,
    pub dao: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub raw: RawHeader,
    pub nonce: u128,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UncleBlock {
    pub header: Header,
    pub proposals: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: Header,
    pub uncles: Vec<UncleBlock>,
    pub transactions: Vec<Transaction>,
    pub proposals: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockV1 {
    pub header: Header,
    pub uncles: Vec<UncleBlock>,
    pub transactions: Vec<Transaction>,
    pub proposals: Vec<String>,
    pub extension: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CellbaseWitness {
    pub lock: Script,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct WitnessArgs {
    pub lock: Option<String>,
    pub input_type: Option<String>,
    pub output_type: Option<String>,
}

/// A Rust type with a schema of its own.
pub trait Schema: Serialize + DeserializeOwned {
    fn codec(chain: &Blockchain) -> &BytesCodec;

    fn typed(chain: &Blockchain) -> Typed<Self> {
        Typed::new(Self::codec(chain).clone())
    }

    fn pack(&self, chain: &Blockchain) -> molecule::Result<Vec<u8>> {
        Self::typed(chain).pack(self)
    }

    fn unpack(chain: &Blockchain, buf: &[u8]) -> molecule::Result<Self> {
        Self::typed(chain).unpack(buf)
    }
}

macro_rules! schema {
    ($($t:ty => $field:ident,)*) => {
        $(impl Schema for $t {
            fn codec(chain: &Blockchain) -> &BytesCodec {
                &chain.$field
            }
        })*
    };
}

schema! {
    HashType => hash_type,
    DepType => dep_type,
    Script => script,
    OutPoint => out_point,
    CellInput => cell_input,
    CellOutput => cell_output,
    CellDep => cell_dep,
    RawTransaction => raw_transaction,
    Transaction => transaction,
    RawHeader => raw_header,
    Header => header,
    UncleBlock => uncle_block,
    Block => block,
    BlockV1 => block_v1,
    CellbaseWitness => cellbase_witness,
    WitnessArgs => witness_args,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::blockchain;

    fn hash(byte: u8) -> String {
        format!("0x{}", format!("{:02x}", byte).repeat(32))
    }

    fn script(args: &str) -> Script {
        Script { code_hash: hash(0x9b), hash_type: HashType::Type, args: args.to_owned() }
    }

    fn transaction() -> Transaction {
        Transaction {
            raw: RawTransaction {
                version: 0,
                cell_deps: vec![CellDep { out_point: OutPoint { tx_hash: hash(0x71), index: 0 }, dep_type: DepType::DepGroup }],
                header_deps: vec![],
                inputs: vec![CellInput { since: 0, previous_output: OutPoint { tx_hash: hash(0xa1), index: 7 } }],
                outputs: vec![
                    CellOutput { capacity: 61_0000_0000, lock: script("0x36c329ed630d6ce750712a477543672adab57f4c"), type_: None },
                    CellOutput { capacity: u64::MAX, lock: script("0x"), type_: Some(script("0x01")) },
                ],
                outputs_data: vec!["0x".to_owned(), "0x1234".to_owned()],
            },
            witnesses: vec![format!("0x{}", "00".repeat(85))],
        }
    }

    #[test]
    fn out_point() {
        let chain = blockchain().unwrap();
        let packed = OutPoint { tx_hash: hash(0xff), index: 0x0102 }.pack(chain).unwrap();
        assert_eq!(36, packed.len());
        assert_eq!(&[0x02, 0x01, 0, 0], &packed[32..]);
    }

    #[test]
    fn transaction_roundtrip() {
        let chain = blockchain().unwrap();
        let tx = transaction();
        let packed = tx.pack(chain).unwrap();
        assert_eq!(tx, Transaction::unpack(chain, &packed).unwrap());
    }

    #[test]
    fn witness_args() {
        let chain = blockchain().unwrap();
        let witness = WitnessArgs { lock: Some(format!("0x{}", "00".repeat(65))), ..Default::default() };
        let packed = witness.pack(chain).unwrap();
        assert_eq!(0x55, packed.len());
        assert_eq!(witness, WitnessArgs::unpack(chain, &packed).unwrap());
        assert_eq!(WitnessArgs::default(), WitnessArgs::unpack(chain, &[0x10, 0, 0, 0, 0x10, 0, 0, 0, 0x10, 0, 0, 0, 0x10, 0, 0, 0]).unwrap());
    }

    #[test]
    fn header() {
        let chain = blockchain().unwrap();
        let header = Header {
            raw: RawHeader {
                version: 0,
                compact_target: 0x1a08a97e,
                timestamp: 1_557_310_743_000,
                number: 1,
                epoch: 0x0708_0000_0000_01,
                parent_hash: hash(1),
                transactions_root: hash(2),
                proposals_hash: hash(0),
                extra_hash: hash(0),
                dao: hash(3),
            },
            nonce: u128::MAX - 1,
        };
        let packed = header.pack(chain).unwrap();
        assert_eq!(208, packed.len());
        assert_eq!(header, Header::unpack(chain, &packed).unwrap());
    }

    #[test]
    fn unknown_hash_type_byte() {
        let chain = blockchain().unwrap();
        let mut packed = script("0x").pack(chain).unwrap();
        packed[48] = 9;
        let error = Script::unpack(chain, &packed).unwrap_err();
        assert_eq!("input.hash_type", error.path());
        assert_eq!(Some("HashType"), error.expected_type());
    }
}
