//! The on-chain structures of `blockchain.mol`, expressed as layout compositions.

use molecule::*;
use once_cell::sync::Lazy;

type SchemaResult<T> = std::result::Result<T, SchemaError>;

fn raw_bytes(name: &'static str) -> BytesCodec {
    create_bytes_codec(name, |value| Ok(bytify_value(value)?), |buf| Ok(Value::Str(hexify(buf))))
}

/// `n` bytes packed from any bytes-like value and unpacked as a `0x` hex string.
pub fn create_fixed_hex_bytes_codec(byte_length: usize) -> BytesCodec {
    create_fixed_bytes_codec(
        format!("Byte{}", byte_length),
        byte_length,
        |value| Ok(bytify_value(value)?),
        |buf| Ok(Value::Str(hexify(buf))),
    )
}

/// A single byte standing for one of `variants`, packed from and unpacked to the variant name.
fn byte_enum(name: &'static str, variants: &'static [(&'static str, u8)]) -> BytesCodec {
    byte_of(create_bytes_codec(
        name,
        move |value| {
            let variant = value.as_str().ok_or(ErrorKind::Type { expected: "string", found: value.typename() })?;
            variants.iter()
                .find(|(candidate, _)| *candidate == variant)
                .map(|(_, id)| vec![*id])
                .ok_or_else(|| ErrorKind::UnknownVariant(variant.to_owned()).into())
        },
        move |buf| {
            let id = buf.first().copied().unwrap_or_default();
            variants.iter()
                .find(|(_, candidate)| *candidate == id)
                .map(|(variant, _)| Value::from(*variant))
                .ok_or_else(|| ErrorKind::UnknownVariant(id.to_string()).into())
        },
    ))
}

pub const HASH_TYPES: &[(&str, u8)] = &[("data", 0), ("type", 1), ("data1", 2)];
pub const DEP_TYPES: &[(&str, u8)] = &[("code", 0), ("dep_group", 1)];

/// `WitnessArgs` whose three members carry the packed form of arbitrary codecs, e.g. the witness layout of a
/// particular lock script.
pub fn witness_args_of(lock: BytesCodec, input_type: BytesCodec, output_type: BytesCodec) -> SchemaResult<BytesCodec> {
    table([
        ("lock", option(byte_vec_of(lock))),
        ("input_type", option(byte_vec_of(input_type))),
        ("output_type", option(byte_vec_of(output_type))),
    ], &["lock", "input_type", "output_type"])
}

/// Every schema of the chain, built once.
#[derive(Debug, Clone)]
pub struct Blockchain {
    pub bytes: BytesCodec,
    pub bytes_opt: BytesCodec,
    pub bytes_vec: BytesCodec,
    pub byte32: BytesCodec,
    pub byte32_vec: BytesCodec,
    pub hash_type: BytesCodec,
    pub dep_type: BytesCodec,
    pub script: BytesCodec,
    pub script_opt: BytesCodec,
    pub out_point: BytesCodec,
    pub cell_input: BytesCodec,
    pub cell_input_vec: BytesCodec,
    pub cell_output: BytesCodec,
    pub cell_output_vec: BytesCodec,
    pub cell_dep: BytesCodec,
    pub cell_dep_vec: BytesCodec,
    pub raw_transaction: BytesCodec,
    pub transaction: BytesCodec,
    pub transaction_vec: BytesCodec,
    pub raw_header: BytesCodec,
    pub header: BytesCodec,
    pub proposal_short_id: BytesCodec,
    pub proposal_short_id_vec: BytesCodec,
    pub uncle_block: BytesCodec,
    pub uncle_block_vec: BytesCodec,
    pub block: BytesCodec,
    pub block_v1: BytesCodec,
    pub cellbase_witness: BytesCodec,
    pub witness_args: BytesCodec,
}

impl Blockchain {

    pub fn new() -> SchemaResult<Self> {
        let bytes = byte_vec_of(raw_bytes("Bytes"));
        let bytes_opt = option(bytes.clone());
        let bytes_vec = vector(bytes.clone())?;
        let byte32 = create_fixed_hex_bytes_codec(32);
        let byte32_vec = vector(byte32.clone())?;
        let hash_type = byte_enum("HashType", HASH_TYPES);
        let dep_type = byte_enum("DepType", DEP_TYPES);

        let script = table([
            ("code_hash", byte32.clone()),
            ("hash_type", hash_type.clone()),
            ("args", bytes.clone()),
        ], &["code_hash", "hash_type", "args"])?;
        let script_opt = option(script.clone());

        let out_point = r#struct([
            ("tx_hash", byte32.clone()),
            ("index", UINT32.into()),
        ], &["tx_hash", "index"])?;
        let cell_input = r#struct([
            ("since", BytesCodec::from(UINT64)),
            ("previous_output", out_point.clone()),
        ], &["since", "previous_output"])?;
        let cell_input_vec = vector(cell_input.clone())?;
        let cell_output = table([
            ("capacity", BytesCodec::from(UINT64)),
            ("lock", script.clone()),
            ("type", script_opt.clone()),
        ], &["capacity", "lock", "type"])?;
        let cell_output_vec = vector(cell_output.clone())?;
        let cell_dep = r#struct([
            ("out_point", out_point.clone()),
            ("dep_type", dep_type.clone()),
        ], &["out_point", "dep_type"])?;
        let cell_dep_vec = vector(cell_dep.clone())?;

        let raw_transaction = table([
            ("version", BytesCodec::from(UINT32)),
            ("cell_deps", cell_dep_vec.clone()),
            ("header_deps", byte32_vec.clone()),
            ("inputs", cell_input_vec.clone()),
            ("outputs", cell_output_vec.clone()),
            ("outputs_data", bytes_vec.clone()),
        ], &["version", "cell_deps", "header_deps", "inputs", "outputs", "outputs_data"])?;
        let transaction = table([
            ("raw", raw_transaction.clone()),
            ("witnesses", bytes_vec.clone()),
        ], &["raw", "witnesses"])?;
        let transaction_vec = vector(transaction.clone())?;

        let raw_header = r#struct([
            ("version", BytesCodec::from(UINT32)),
            ("compact_target", UINT32.into()),
            ("timestamp", UINT64.into()),
            ("number", UINT64.into()),
            ("epoch", UINT64.into()),
            ("parent_hash", byte32.clone()),
            ("transactions_root", byte32.clone()),
            ("proposals_hash", byte32.clone()),
            ("extra_hash", byte32.clone()),
            ("dao", byte32.clone()),
        ], &[
            "version", "compact_target", "timestamp", "number", "epoch",
            "parent_hash", "transactions_root", "proposals_hash", "extra_hash", "dao",
        ])?;
        let header = r#struct([
            ("raw", raw_header.clone()),
            ("nonce", UINT128.into()),
        ], &["raw", "nonce"])?;

        let proposal_short_id = create_fixed_hex_bytes_codec(10);
        let proposal_short_id_vec = vector(proposal_short_id.clone())?;
        let uncle_block = table([
            ("header", header.clone()),
            ("proposals", proposal_short_id_vec.clone()),
        ], &["header", "proposals"])?;
        let uncle_block_vec = vector(uncle_block.clone())?;
        let block = table([
            ("header", header.clone()),
            ("uncles", uncle_block_vec.clone()),
            ("transactions", transaction_vec.clone()),
            ("proposals", proposal_short_id_vec.clone()),
        ], &["header", "uncles", "transactions", "proposals"])?;
        let block_v1 = table([
            ("header", header.clone()),
            ("uncles", uncle_block_vec.clone()),
            ("transactions", transaction_vec.clone()),
            ("proposals", proposal_short_id_vec.clone()),
            ("extension", bytes.clone()),
        ], &["header", "uncles", "transactions", "proposals", "extension"])?;

        let cellbase_witness = table([
            ("lock", script.clone()),
            ("message", bytes.clone()),
        ], &["lock", "message"])?;
        let witness_args = witness_args_of(raw_bytes("Bytes"), raw_bytes("Bytes"), raw_bytes("Bytes"))?;

        tracing::debug!("blockchain schemas built");
        Ok(Blockchain {
            bytes, bytes_opt, bytes_vec, byte32, byte32_vec, hash_type, dep_type, script, script_opt, out_point,
            cell_input, cell_input_vec, cell_output, cell_output_vec, cell_dep, cell_dep_vec, raw_transaction,
            transaction, transaction_vec, raw_header, header, proposal_short_id, proposal_short_id_vec, uncle_block,
            uncle_block_vec, block, block_v1, cellbase_witness, witness_args,
        })
    }

    /// All schemas by their `blockchain.mol` name.
    pub fn schemas(&self) -> [(&'static str, &BytesCodec); 29] {
        [
            ("Bytes", &self.bytes),
            ("BytesOpt", &self.bytes_opt),
            ("BytesVec", &self.bytes_vec),
            ("Byte32", &self.byte32),
            ("Byte32Vec", &self.byte32_vec),
            ("HashType", &self.hash_type),
            ("DepType", &self.dep_type),
            ("Script", &self.script),
            ("ScriptOpt", &self.script_opt),
            ("OutPoint", &self.out_point),
            ("CellInput", &self.cell_input),
            ("CellInputVec", &self.cell_input_vec),
            ("CellOutput", &self.cell_output),
            ("CellOutputVec", &self.cell_output_vec),
            ("CellDep", &self.cell_dep),
            ("CellDepVec", &self.cell_dep_vec),
            ("RawTransaction", &self.raw_transaction),
            ("Transaction", &self.transaction),
            ("TransactionVec", &self.transaction_vec),
            ("RawHeader", &self.raw_header),
            ("Header", &self.header),
            ("ProposalShortId", &self.proposal_short_id),
            ("ProposalShortIdVec", &self.proposal_short_id_vec),
            ("UncleBlock", &self.uncle_block),
            ("UncleBlockVec", &self.uncle_block_vec),
            ("Block", &self.block),
            ("BlockV1", &self.block_v1),
            ("CellbaseWitness", &self.cellbase_witness),
            ("WitnessArgs", &self.witness_args),
        ]
    }

    /// Look up a schema by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&BytesCodec> {
        self.schemas().into_iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, codec)| codec)
    }

}

static BLOCKCHAIN: Lazy<SchemaResult<Blockchain>> = Lazy::new(Blockchain::new);

/// The shared instance of all schemas.
pub fn blockchain() -> SchemaResult<&'static Blockchain> {
    BLOCKCHAIN.as_ref().map_err(Clone::clone)
}
