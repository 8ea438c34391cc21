use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use wifimap_scan::create_provider;

mod config;
mod grpc;
mod measure;
mod scanner;
mod store;

use config::{load_config, DEFAULT_CONFIG_PATH};
use scanner::ScanService;
use store::ProjectStore;

#[derive(Parser, Debug)]
#[command(name = "wifimap-surveyd")]
#[command(about = "Wi-Fi survey daemon: scans, channel advice and sample heat maps")]
struct Args {
    /// Path to wifimap.toml
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Listen address, overrides [server] address
    #[arg(long, short = 'a')]
    address: Option<String>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    simple_logger::SimpleLogger::new().env().init().ok();

    let args = Args::parse();
    let version = env!("CARGO_PKG_VERSION");

    log::info!("Wifimap Survey Daemon: v{}", version);

    let mut config = load_config(&args.config)?;
    if let Some(address) = args.address {
        config.server.address = address;
    }

    let provider = create_provider(&config.scan.provider_config());
    log::info!(
        "Scan provider: {} (interface {}, cache {} ms)",
        provider.name(),
        config.scan.interface,
        config.scan.cache_ttl_ms
    );

    let scanner = Arc::new(ScanService::new(Arc::from(provider), config.scan.cache_ttl_ms));

    let store = match &config.storage.path {
        Some(path) => ProjectStore::open(path)?,
        None => {
            log::warn!("No [storage] path configured, samples are kept in memory only");
            ProjectStore::in_memory()
        }
    };

    grpc::start_server(config, scanner, store).await
}
