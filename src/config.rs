use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use crate::{logging::Format, network::NetworkParams, types::ComposeRequest};

#[derive(Debug, Clone, Parser)]
#[clap(
    version = "0.1.0",
    about = "UTXO transaction composer",
    long_about = r#"Selects inputs, sizes and prices a transaction from a JSON compose request"#
)]
pub struct Config {
    #[clap(
        long,
        env = "COMPOSE_REQUEST",
        help = "Path of the JSON compose request, read from stdin when omitted"
    )]
    pub request: Option<PathBuf>,

    #[clap(
        long,
        env = "COMPOSE_NETWORK",
        help = "Network whose address format applies (bitcoin, testnet, regtest, litecoin, dogecoin, zcash), overrides the request"
    )]
    pub network: Option<NetworkParams>,

    #[clap(
        long,
        env = "LOG_FORMAT",
        help = "Log output format",
        value_enum,
        default_value = "plain"
    )]
    pub log_format: Format,

    #[clap(
        long,
        env = "LOG_LEVEL",
        help = "Maximum log level (e.g. info, debug, trace)",
        default_value = "info"
    )]
    pub log_level: Level,

    #[clap(long, env = "SEED", help = "Seed for random sorting, for reproducible output")]
    pub seed: Option<u64>,

    #[clap(long, help = "Pretty-print the JSON outcome")]
    pub pretty: bool,
}

impl Config {
    /// Reads the request named by `--request`, or stdin, and applies overrides.
    pub fn load_request(&self) -> Result<ComposeRequest> {
        let raw = match &self.request {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            None => {
                let mut raw = String::new();
                io::stdin()
                    .read_to_string(&mut raw)
                    .context("failed to read request from stdin")?;
                raw
            }
        };
        let mut request: ComposeRequest =
            serde_json::from_str(&raw).context("invalid compose request")?;
        if let Some(network) = &self.network {
            request.network = network.clone();
        }
        Ok(request)
    }
}
