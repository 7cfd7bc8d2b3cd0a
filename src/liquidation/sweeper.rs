use alloy_dyn_abi::DynSolValue;
use alloy_provider::Provider;
use alloy_rpc_types::TransactionReceipt;
use alloy_sol_types::SolEvent;
use tracing::{debug, info, warn};

use crate::context::BotContext;
use crate::models::ProfitsWithdrawn;

/// Withdraw accumulated debt-asset proceeds from the executor contract to
/// the operator. A zero balance is a no-op; every failure is logged and
/// swallowed so a failed sweep never demotes the liquidation outcome.
pub async fn sweep_profits<P>(ctx: &BotContext<P>)
where
    P: Provider + 'static,
{
    let balance = match ctx.debt_asset_balance(ctx.config.bot_address).await {
        Ok(balance) => balance,
        Err(e) => {
            warn!("Skipping profit sweep, could not read executor balance: {e:#}");
            return;
        }
    };

    if balance.is_zero() {
        debug!("No proceeds to sweep");
        return;
    }

    info!("Withdrawing {} debt-asset units from the executor...", balance);

    let args = [DynSolValue::Address(ctx.config.debt_asset)];
    let call = match ctx.liquidator.function("withdrawAllProfits", &args) {
        Ok(call) => call,
        Err(e) => {
            warn!("Could not build profit withdrawal call: {e}");
            return;
        }
    };

    let pending = match call.send().await {
        Ok(pending) => pending,
        Err(e) => {
            warn!("Profit withdrawal submission failed: {e}");
            return;
        }
    };

    match pending.get_receipt().await {
        Ok(receipt) if receipt.status() => match swept_amount(&receipt) {
            Some(amount) => info!("Swept {} debt-asset units to the operator", amount),
            None => info!("Profit withdrawal confirmed"),
        },
        Ok(_) => warn!("Profit withdrawal transaction reverted"),
        Err(e) => warn!("Profit withdrawal confirmation failed: {e}"),
    }
}

/// Amount reported by the contract's ProfitsWithdrawn event, when present.
fn swept_amount(receipt: &TransactionReceipt) -> Option<alloy_primitives::U256> {
    receipt.inner.logs().iter().find_map(|log| {
        let primitive_log = alloy_primitives::Log {
            address: log.address(),
            data: alloy_primitives::LogData::new_unchecked(
                log.topics().to_vec(),
                log.data().data.clone(),
            ),
        };
        ProfitsWithdrawn::decode_log(&primitive_log, true)
            .ok()
            .map(|ev| ev.amount)
    })
}
