mod input;

use anyhow::{anyhow, Context, Result};
use molecule::{hexify, Codec};
use molecule_blockchain::blockchain;
use molecule_serde::SerializeValue;
use std::io::{self, Read};
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

/// Decode and print molecule encoded CKB structures
#[derive(StructOpt)]
#[structopt(name = "mq", author = "Liv Fischer")]
struct Opt {
    /// read JSON and encode it into molecule instead
    #[structopt(short, long)]
    encode: bool,
    /// the payload to decode is base64 rather than hex
    #[structopt(long)]
    base64: bool,
    /// print decoded values as JSON
    #[structopt(long)]
    json: bool,
    /// log at debug level unless RUST_LOG says otherwise
    #[structopt(short, long)]
    verbose: bool,
    /// schema name, e.g. Script, WitnessArgs or Transaction
    schema: String,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(if opt.verbose { "debug" } else { "warn" })))
        .init();
    let chain = blockchain().context("Failed to build schemas")?;
    let codec = chain.get(&opt.schema).ok_or_else(|| anyhow!(
        "unknown schema {}, expected one of {}",
        opt.schema,
        chain.schemas().iter().map(|(name, _)| *name).collect::<Vec<_>>().join(", "),
    ))?;
    tracing::debug!(schema = %codec.name(), "selected schema");
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer).context("Failed to read stdin")?;
    if opt.encode {
        let value = input::value(&buffer)?;
        let packed = codec.pack(&value).context("Encoding error")?;
        println!("{}", hexify(&packed));
    } else {
        let payload = input::payload(&buffer, opt.base64)?;
        let value = codec.unpack(&payload).context("Decoding error")?;
        if opt.json {
            println!("{}", serde_json::to_string_pretty(&SerializeValue(&value))?);
        } else {
            println!("{}", &value);
        }
    }
    Ok(())
}
