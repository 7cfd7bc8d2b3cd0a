use alloy_dyn_abi::DynSolValue;
use alloy_primitives::U256;
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use tracing::{info, warn};

use crate::context::BotContext;

/// Make sure the executor contract can fund a liquidation attempt covering
/// `required` debt-asset units. Returns plain readiness; every failure path
/// is logged and mapped to `false`, never an error.
pub async fn prepare_capital<P>(ctx: &BotContext<P>, required: U256) -> bool
where
    P: Provider + 'static,
{
    info!("Preparing executor for liquidation...");

    let balance = match ctx.debt_asset_balance(ctx.config.bot_address).await {
        Ok(balance) => balance,
        Err(e) => {
            warn!("Could not read executor debt-asset balance: {e:#}");
            return false;
        }
    };

    info!(
        "Executor debt-asset balance: {} units, required: {} units",
        balance, required
    );

    let balance = if balance < required {
        info!("Executor balance too low, attempting faucet top-up...");
        if let Err(e) = mint_from_faucet(ctx).await {
            warn!("Faucet top-up failed: {e:#}");
        }
        match ctx.debt_asset_balance(ctx.config.bot_address).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!("Could not re-read executor balance after top-up: {e:#}");
                return false;
            }
        }
    } else {
        balance
    };

    if balance < required {
        warn!(
            "Executor still underfunded after top-up ({} < {} units), not ready",
            balance, required
        );
        return false;
    }

    if !ensure_gas_reserve(ctx).await {
        return false;
    }

    info!("Executor is ready");
    true
}

/// Request test tokens from the configured faucet and wait for inclusion.
async fn mint_from_faucet<P>(ctx: &BotContext<P>) -> eyre::Result<()>
where
    P: Provider + 'static,
{
    let faucet = ctx
        .faucet
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no faucet configured"))?;

    let amount = U256::from(ctx.config.faucet_mint_amount)
        * U256::from(10u128.pow(ctx.config.debt_asset_decimals as u32));

    let args = [
        DynSolValue::Address(ctx.config.debt_asset),
        DynSolValue::Address(ctx.config.bot_address),
        DynSolValue::Uint(amount, 256),
    ];

    let call = faucet.function("mint", &args)?;
    let pending = call.send().await?;
    let receipt = pending.get_receipt().await?;

    if !receipt.status() {
        return Err(eyre::eyre!("faucet mint transaction reverted"));
    }

    info!(
        "Minted {} {}-decimal units of the debt asset to the executor",
        amount, ctx.config.debt_asset_decimals
    );
    Ok(())
}

/// Top up the executor's native balance from the operator when it is below
/// the configured reserve, waiting for the transfer to settle.
async fn ensure_gas_reserve<P>(ctx: &BotContext<P>) -> bool
where
    P: Provider + 'static,
{
    let native_balance = match ctx.provider.get_balance(ctx.config.bot_address).await {
        Ok(balance) => balance,
        Err(e) => {
            warn!("Could not read executor native balance: {e:#}");
            return false;
        }
    };

    if native_balance >= ctx.config.min_gas_reserve_wei {
        return true;
    }

    info!(
        "Executor native balance {} wei below reserve {} wei, sending gas funds...",
        native_balance, ctx.config.min_gas_reserve_wei
    );

    let tx = TransactionRequest {
        from: Some(ctx.operator),
        to: Some(ctx.config.bot_address.into()),
        value: Some(ctx.config.gas_topup_wei),
        ..Default::default()
    };

    match ctx.provider.send_transaction(tx).await {
        Ok(pending) => match pending.get_receipt().await {
            Ok(receipt) if receipt.status() => {
                info!("Gas top-up of {} wei settled", ctx.config.gas_topup_wei);
                true
            }
            Ok(_) => {
                warn!("Gas top-up transaction reverted");
                false
            }
            Err(e) => {
                warn!("Gas top-up confirmation failed: {e:#}");
                false
            }
        },
        Err(e) => {
            warn!("Gas top-up submission failed: {e:#}");
            false
        }
    }
}
