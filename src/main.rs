//! Proximity analysis binary.
//!
//! Geocodes an address list and checks each coordinate against the
//! protected-area dataset, writing one CSV row per resolved address.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use laurel::geocode::GeocodeClient;
use laurel::proximity::DEFAULT_BUFFER_DEGREES;
use laurel::{logging, pipeline, Config};

#[derive(Parser, Debug)]
#[command(name = "laurel")]
#[command(about = "Check addresses for proximity to protected ecological areas")]
struct Args {
    /// Address list: JSON array of {id, address} objects
    #[arg(long, default_value = "addresses.json")]
    addresses: PathBuf,

    /// Protected-area dataset (GeoJSON FeatureCollection, WGS84)
    #[arg(long, default_value = "protected_areas.geojson")]
    areas: PathBuf,

    /// Output CSV path
    #[arg(long, default_value = "proximity_results.csv")]
    output: PathBuf,

    /// Proximity radius in WGS84 degrees (0.01 approximates 1 km)
    #[arg(long, default_value_t = DEFAULT_BUFFER_DEGREES)]
    radius: f64,

    /// Log file path
    #[arg(long, default_value = "natura2000_analysis.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _guard = logging::init(&args.log_file)?;
    info!("Laurel proximity analysis started");

    let result = analyze(args).await;

    if let Err(e) = &result {
        error!("Run failed: {:#}", e);
    }
    // Final diagnostic on both success and failure paths
    info!("Run finished");

    result
}

async fn analyze(args: Args) -> Result<()> {
    let config = Config {
        addresses_path: args.addresses,
        areas_path: args.areas,
        output_path: args.output,
        radius_degrees: args.radius,
        api_key: Config::api_key_from_env()?,
    };

    let resolver = GeocodeClient::new(config.api_key.clone());
    pipeline::run(&config, &resolver).await?;
    Ok(())
}
