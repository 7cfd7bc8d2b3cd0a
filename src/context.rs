use alloy_contract::{ContractInstance, Interface};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use eyre::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::contracts;

/// Everything a cycle stage needs: the shared provider, the resolved
/// configuration, and connected contract handles. Stages are functions of
/// (context, current chain state); nothing here mutates between cycles.
pub struct BotContext<P> {
    pub provider: Arc<P>,
    pub config: BotConfig,
    /// Operator account backing the signer; receives swept profits and
    /// funds gas top-ups.
    pub operator: Address,
    pub pool: ContractInstance<alloy_transport::BoxTransport, Arc<P>>,
    pub liquidator: ContractInstance<alloy_transport::BoxTransport, Arc<P>>,
    pub debt_token: ContractInstance<alloy_transport::BoxTransport, Arc<P>>,
    pub faucet: Option<ContractInstance<alloy_transport::BoxTransport, Arc<P>>>,
}

impl<P> BotContext<P>
where
    P: Provider + 'static,
{
    pub fn new(provider: Arc<P>, config: BotConfig, operator: Address) -> Result<Self> {
        let pool = Interface::new(contracts::pool_abi()?)
            .connect(config.pool_address, provider.clone());
        let liquidator = Interface::new(contracts::liquidator_abi()?)
            .connect(config.bot_address, provider.clone());
        let debt_token = Interface::new(contracts::erc20_abi()?)
            .connect(config.debt_asset, provider.clone());
        let faucet = match config.faucet_address {
            Some(addr) => Some(Interface::new(contracts::faucet_abi()?).connect(addr, provider.clone())),
            None => None,
        };

        Ok(Self {
            provider,
            config,
            operator,
            pool,
            liquidator,
            debt_token,
            faucet,
        })
    }

    /// Current debt-asset balance of an account.
    pub async fn debt_asset_balance(&self, holder: Address) -> Result<U256> {
        let args = [DynSolValue::Address(holder)];
        let call = self.debt_token.function("balanceOf", &args)?;
        let ret = call.call().await?;
        contracts::parse_uint(&ret, 0)
    }

    /// Read the liquidation contract's owner and warn when it is not the
    /// operator. The contract rejects unauthorized calls on-chain anyway;
    /// this only surfaces the misconfiguration before the first cycle.
    pub async fn verify_owner(&self) -> Result<()> {
        let call = self.liquidator.function("owner", &[])?;
        let ret = call.call().await?;
        let owner = contracts::parse_address(&ret, 0)?;

        if owner == self.operator {
            info!("Executor contract owner verified: {owner}");
        } else {
            warn!(
                "Executor contract is owned by {owner}, but the operator is {}. \
                 Mutating calls will be rejected on-chain.",
                self.operator
            );
        }
        Ok(())
    }
}
