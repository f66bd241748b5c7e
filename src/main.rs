use anyhow::Result;
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use tracing::info;
use utxo_compose::{compose, compose_with_rng, config::Config, logging};

fn main() -> Result<()> {
    let config = Config::parse();
    logging::setup(config.log_format, config.log_level);
    let request = config.load_request()?;
    info!(
        "Composing {} outputs from {} candidates on {}",
        request.requested_outputs.len(),
        request.candidate_inputs.len(),
        request.network
    );
    let outcome = match config.seed {
        Some(seed) => compose_with_rng(&request, &mut StdRng::seed_from_u64(seed)),
        None => compose(&request),
    };
    let json = if config.pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{}", json);
    Ok(())
}
