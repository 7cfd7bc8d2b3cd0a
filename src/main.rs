use alloy_network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use eyre::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use flash_liquidator::config::BotConfig;
use flash_liquidator::context::BotContext;
use flash_liquidator::history::HistoryStore;
use flash_liquidator::scheduler;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Aave v3 flash liquidation bot");

    let config = BotConfig::from_env()?;
    info!("Configuration loaded");

    let signer: PrivateKeySigner = config.private_key.parse()?;
    let operator = signer.address();
    info!("Operator account: {operator}");

    let wallet = EthereumWallet::from(signer);
    let url = url::Url::parse(&config.rpc_url)?;
    let provider = ProviderBuilder::new()
        .wallet(wallet)
        .on_builtin(url.as_str())
        .await?;
    let provider = Arc::new(provider);

    // The gateway must be reachable before the scheduling loop starts.
    let current_block = provider
        .get_block_number()
        .await
        .map_err(|e| eyre::eyre!("cannot reach RPC endpoint {}: {}", config.rpc_url, e))?;
    info!("Connected to {} at block {}", config.rpc_url, current_block);

    let history = HistoryStore::connect(&config.database_url).await?;

    let ctx = BotContext::new(provider, config, operator)?;
    if let Err(e) = ctx.verify_owner().await {
        warn!("Could not verify executor contract ownership: {e:#}");
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down after the current cycle");
            let _ = stop_tx.send(true);
        }
    });

    scheduler::run(&ctx, &history, stop_rx).await?;

    info!("Shut down cleanly");
    Ok(())
}
