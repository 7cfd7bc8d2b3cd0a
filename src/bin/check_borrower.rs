use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::ProviderBuilder;
use alloy_signer_local::PrivateKeySigner;
use clap::{Parser, Subcommand};
use eyre::Result;
use std::sync::Arc;

use flash_liquidator::config::BotConfig;
use flash_liquidator::context::BotContext;
use flash_liquidator::monitoring::{discovery, evaluator};

#[derive(Parser)]
#[command(name = "check-borrower")]
#[command(about = "One-shot diagnostics for the liquidation pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one discovery pass and list the candidate addresses
    Scan,

    /// Evaluate a single address against the pool
    Evaluate {
        /// Borrower address to check
        #[arg(long)]
        address: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = BotConfig::from_env()?;
    let signer: PrivateKeySigner = config.private_key.parse()?;
    let operator = signer.address();
    let wallet = EthereumWallet::from(signer);
    let url = url::Url::parse(&config.rpc_url)?;
    let provider = ProviderBuilder::new()
        .wallet(wallet)
        .on_builtin(url.as_str())
        .await?;
    let provider = Arc::new(provider);

    let ctx = BotContext::new(provider, config, operator)?;

    match cli.command {
        Commands::Scan => {
            let scan = discovery::discover_borrowers(&ctx).await?;
            println!("{} candidate address(es):", scan.addresses.len());
            for address in &scan.addresses {
                println!("  {address}");
            }
            for (kind, reason) in &scan.skipped {
                println!("skipped {} events: {}", kind.name(), reason);
            }
        }
        Commands::Evaluate { address } => {
            let borrower: Address = address.parse()?;
            match evaluator::evaluate_borrower(&ctx, borrower).await {
                Some(info) => {
                    println!("Address:       {}", info.address);
                    println!("Health factor: {:.4}", info.health_factor);
                    println!("Collateral:    {:.4}", info.total_collateral);
                    println!("Debt:          {:.4}", info.total_debt);
                    println!(
                        "Status:        {}",
                        if info.can_be_liquidated {
                            "CAN BE LIQUIDATED"
                        } else {
                            "safe"
                        }
                    );
                }
                None => println!("No active position for {borrower}"),
            }
        }
    }

    Ok(())
}
