use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use thiserror::Error;
use tracing::info;

use crate::context::BotContext;

/// A liquidation that landed on-chain with success status.
#[derive(Debug, Clone)]
pub struct Liquidated {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub gas_used: u128,
}

/// Why a liquidation attempt produced no successful transaction. Callers
/// log these; they never terminate the scheduler.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Request failed local validation; nothing was submitted.
    #[error("liquidation request rejected: {0}")]
    Rejected(String),
    /// Transaction was included but reverted.
    #[error("liquidation transaction {tx_hash} reverted on-chain")]
    Reverted { tx_hash: String },
    /// Submission or confirmation failed at the gateway.
    #[error("liquidation submission failed: {0}")]
    Submission(String),
}

/// Call the liquidation contract's flash-loan entry point for `borrower`,
/// covering `debt_to_cover` units of the debt asset, and await inclusion.
pub async fn execute_liquidation<P>(
    ctx: &BotContext<P>,
    borrower: Address,
    debt_to_cover: U256,
) -> Result<Liquidated, ExecuteError>
where
    P: Provider + 'static,
{
    validate_request(
        borrower,
        ctx.config.collateral_asset,
        ctx.config.debt_asset,
        debt_to_cover,
    )?;

    info!(
        "Executing liquidation: borrower={}, collateral={}, debt={}, cover={} units",
        borrower, ctx.config.collateral_asset, ctx.config.debt_asset, debt_to_cover
    );

    let args = [
        DynSolValue::Address(borrower),
        DynSolValue::Address(ctx.config.collateral_asset),
        DynSolValue::Address(ctx.config.debt_asset),
        DynSolValue::Uint(debt_to_cover, 256),
    ];

    let call = ctx
        .liquidator
        .function("liquidateWithFlashLoan", &args)
        .map_err(|e| ExecuteError::Submission(e.to_string()))?;

    let pending = call
        .send()
        .await
        .map_err(|e| ExecuteError::Submission(e.to_string()))?;

    let tx_hash = format!("{:#x}", pending.tx_hash());
    info!("Liquidation transaction sent: {tx_hash}");

    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| ExecuteError::Submission(e.to_string()))?;

    if receipt.status() {
        info!(
            "Liquidation confirmed in block {:?}, gas used {}",
            receipt.block_number, receipt.gas_used
        );
        Ok(Liquidated {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    } else {
        Err(ExecuteError::Reverted { tx_hash })
    }
}

/// Reject obviously invalid requests before anything reaches the chain.
pub fn validate_request(
    borrower: Address,
    collateral_asset: Address,
    debt_asset: Address,
    debt_to_cover: U256,
) -> Result<(), ExecuteError> {
    if borrower.is_zero() {
        return Err(ExecuteError::Rejected("borrower address is zero".to_string()));
    }
    if collateral_asset.is_zero() || debt_asset.is_zero() {
        return Err(ExecuteError::Rejected("asset address is zero".to_string()));
    }
    if debt_to_cover.is_zero() {
        return Err(ExecuteError::Rejected("debt to cover is zero".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn zero_borrower_is_rejected() {
        let err = validate_request(Address::ZERO, addr(1), addr(2), U256::from(1u64)).unwrap_err();
        assert!(matches!(err, ExecuteError::Rejected(_)));
    }

    #[test]
    fn zero_asset_is_rejected() {
        assert!(validate_request(addr(1), Address::ZERO, addr(2), U256::from(1u64)).is_err());
        assert!(validate_request(addr(1), addr(2), Address::ZERO, U256::from(1u64)).is_err());
    }

    #[test]
    fn zero_amount_is_rejected() {
        let err = validate_request(addr(1), addr(2), addr(3), U256::ZERO).unwrap_err();
        assert!(matches!(err, ExecuteError::Rejected(_)));
    }

    #[test]
    fn well_formed_request_passes_validation() {
        assert!(validate_request(addr(1), addr(2), addr(3), U256::from(5_000_000_000u64)).is_ok());
    }
}
