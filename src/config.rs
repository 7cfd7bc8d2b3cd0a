use alloy_primitives::{Address, U256};
use eyre::Result;
use tracing::warn;

/// Runtime configuration, resolved once at startup from the process
/// environment. Missing required values are fatal; malformed optional
/// values fall back to defaults with a warning.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub rpc_url: String,
    pub private_key: String,
    /// Aave V3 pool being monitored.
    pub pool_address: Address,
    /// Deployed flash-loan liquidation contract.
    pub bot_address: Address,
    pub collateral_asset: Address,
    pub debt_asset: Address,
    pub faucet_address: Option<Address>,
    pub check_interval_secs: u64,
    pub lookback_blocks: u64,
    pub debt_asset_decimals: u8,
    /// Minimum native balance the executor must hold before execution.
    pub min_gas_reserve_wei: U256,
    /// Amount transferred from the operator when the reserve is short.
    pub gas_topup_wei: U256,
    /// Human-scaled debt-asset amount requested from the faucet per top-up.
    pub faucet_mint_amount: u64,
    /// Degraded candidate source used when the event scan is unreachable.
    pub fallback_borrowers: Vec<Address>,
    pub database_url: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let rpc_url = std::env::var("RPC_URL")
            .map_err(|_| eyre::eyre!("RPC_URL environment variable not set"))?;

        let private_key = std::env::var("PRIVATE_KEY")
            .map_err(|_| eyre::eyre!("PRIVATE_KEY environment variable not set"))?;

        let pool_address = required_address("POOL_ADDRESS")?;
        let bot_address = required_address("BOT_ADDRESS")?;
        let collateral_asset = required_address("COLLATERAL_ASSET")?;
        let debt_asset = required_address("DEBT_ASSET")?;

        let faucet_address = match std::env::var("FAUCET_ADDRESS") {
            Ok(addr_str) => match addr_str.parse::<Address>() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    warn!("Invalid FAUCET_ADDRESS '{}': {}. Using None.", addr_str, e);
                    None
                }
            },
            Err(_) => None,
        };

        let check_interval_secs = match std::env::var("CHECK_INTERVAL_SECS") {
            Ok(interval_str) => match interval_str.parse::<u64>() {
                Ok(0) => {
                    warn!("CHECK_INTERVAL_SECS cannot be 0. Using default 60 seconds.");
                    60
                }
                Ok(interval) => interval,
                Err(e) => {
                    warn!(
                        "Invalid CHECK_INTERVAL_SECS '{}': {}. Using default 60 seconds.",
                        interval_str, e
                    );
                    60
                }
            },
            Err(_) => 60,
        };

        let lookback_blocks = match std::env::var("LOOKBACK_BLOCKS") {
            Ok(blocks_str) => match blocks_str.parse::<u64>() {
                Ok(blocks) => blocks,
                Err(e) => {
                    warn!(
                        "Invalid LOOKBACK_BLOCKS '{}': {}. Using default 10000.",
                        blocks_str, e
                    );
                    10_000
                }
            },
            Err(_) => 10_000,
        };

        let debt_asset_decimals = match std::env::var("DEBT_ASSET_DECIMALS") {
            Ok(dec_str) => match dec_str.parse::<u8>() {
                Ok(dec) if dec <= 18 => dec,
                Ok(dec) => {
                    warn!("DEBT_ASSET_DECIMALS {} out of range. Using default 6.", dec);
                    6
                }
                Err(e) => {
                    warn!(
                        "Invalid DEBT_ASSET_DECIMALS '{}': {}. Using default 6.",
                        dec_str, e
                    );
                    6
                }
            },
            Err(_) => 6,
        };

        let min_gas_reserve_wei = match std::env::var("MIN_GAS_RESERVE_WEI") {
            Ok(wei_str) => match wei_str.parse::<U256>() {
                Ok(wei) => wei,
                Err(e) => {
                    warn!(
                        "Invalid MIN_GAS_RESERVE_WEI '{}': {}. Using default 0.01 ETH.",
                        wei_str, e
                    );
                    U256::from(10_000_000_000_000_000u64)
                }
            },
            Err(_) => U256::from(10_000_000_000_000_000u64), // 0.01 ETH
        };

        let gas_topup_wei = match std::env::var("GAS_TOPUP_WEI") {
            Ok(wei_str) => match wei_str.parse::<U256>() {
                Ok(wei) => wei,
                Err(e) => {
                    warn!(
                        "Invalid GAS_TOPUP_WEI '{}': {}. Using default 0.5 ETH.",
                        wei_str, e
                    );
                    U256::from(500_000_000_000_000_000u64)
                }
            },
            Err(_) => U256::from(500_000_000_000_000_000u64), // 0.5 ETH
        };

        let faucet_mint_amount = match std::env::var("FAUCET_MINT_AMOUNT") {
            Ok(amount_str) => match amount_str.parse::<u64>() {
                Ok(amount) => amount,
                Err(e) => {
                    warn!(
                        "Invalid FAUCET_MINT_AMOUNT '{}': {}. Using default 50000.",
                        amount_str, e
                    );
                    50_000
                }
            },
            Err(_) => 50_000,
        };

        let fallback_borrowers = match std::env::var("FALLBACK_BORROWERS") {
            Ok(list) => parse_address_list(&list),
            Err(_) => Vec::new(),
        };

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:flash_liquidator.db".to_string());

        Ok(Self {
            rpc_url,
            private_key,
            pool_address,
            bot_address,
            collateral_asset,
            debt_asset,
            faucet_address,
            check_interval_secs,
            lookback_blocks,
            debt_asset_decimals,
            min_gas_reserve_wei,
            gas_topup_wei,
            faucet_mint_amount,
            fallback_borrowers,
            database_url,
        })
    }
}

fn required_address(name: &str) -> Result<Address> {
    let raw = std::env::var(name)
        .map_err(|_| eyre::eyre!("{} environment variable not set", name))?;
    raw.parse::<Address>()
        .map_err(|e| eyre::eyre!("{} is not a valid address ('{}'): {}", name, raw, e))
}

fn parse_address_list(list: &str) -> Vec<Address> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<Address>() {
            Ok(addr) => Some(addr),
            Err(e) => {
                warn!("Skipping invalid fallback borrower '{}': {}", s, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_list_parsing_skips_garbage() {
        let parsed = parse_address_list(
            "0x0000000000000000000000000000000000000001, nonsense ,0x0000000000000000000000000000000000000002,",
        );
        let one: Address = "0x0000000000000000000000000000000000000001".parse().unwrap();
        let two: Address = "0x0000000000000000000000000000000000000002".parse().unwrap();
        assert_eq!(parsed, vec![one, two]);
    }

    #[test]
    fn empty_address_list_is_empty() {
        assert!(parse_address_list("").is_empty());
    }
}
