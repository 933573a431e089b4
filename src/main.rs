// src/main.rs
use anyhow::Result as AnyhowResult;
use circulating_supply_api::cache::{FileStore, MemoryStore, SupplyCache, SupplyStore};
use circulating_supply_api::service::SystemClock;
use circulating_supply_api::supply::{Erc20Reader, SupplyCalculator, SupplyReader};
use circulating_supply_api::{Config, ERC20, SupplyService, server, utils};
use ethers::providers::{Http, Provider};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> AnyhowResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let provider = Arc::new(Provider::<Http>::try_from(config.rpc_url.as_str())?);
    let contract = ERC20::new(config.token_address, provider);
    let reader: Arc<dyn SupplyReader> = Arc::new(Erc20Reader::new(
        contract,
        Duration::from_secs(config.rpc_timeout_secs),
    ));

    let store: Arc<dyn SupplyStore> = match &config.cache_file {
        Some(path) => {
            info!(path = %path.display(), collection = %config.cache_collection, "using file cache store");
            Arc::new(FileStore::new(path, config.cache_collection.clone()))
        }
        None => {
            info!("CACHE_FILE not set, using in-memory cache store");
            Arc::new(MemoryStore::new())
        }
    };

    let contract_key = utils::address_key(&config.token_address);
    info!(
        contract = %contract_key,
        excluded = config.excluded_addresses.len(),
        decimals = config.decimals,
        ttl_secs = config.cache_ttl_secs,
        read_policy = %config.cache_read_policy,
        "starting circulating supply service"
    );

    let service = Arc::new(SupplyService::new(
        contract_key,
        config.excluded_addresses.clone(),
        SupplyCache::new(store, config.cache_ttl_ms()),
        SupplyCalculator::new(reader, config.decimals),
        Box::new(SystemClock),
        config.cache_read_policy,
    ));

    let app = server::router(service);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
