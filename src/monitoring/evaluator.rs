use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use tracing::debug;

use crate::context::BotContext;
use crate::contracts;
use crate::models::{wad_to_f64, BorrowerInfo};

/// Fetch a borrower's aggregate account data and classify the position.
///
/// Returns `None` both for zero-debt positions and for any read failure:
/// discovery produces noise (contracts, addresses with no position) and a
/// candidate that cannot be evaluated is simply not a signal.
pub async fn evaluate_borrower<P>(ctx: &BotContext<P>, borrower: Address) -> Option<BorrowerInfo>
where
    P: Provider + 'static,
{
    let args = [DynSolValue::Address(borrower)];
    let call = match ctx.pool.function("getUserAccountData", &args) {
        Ok(call) => call,
        Err(e) => {
            debug!("Could not build account-data call for {borrower}: {e}");
            return None;
        }
    };

    let ret = match call.call().await {
        Ok(ret) => ret,
        Err(e) => {
            debug!("No account data for {borrower}: {e}");
            return None;
        }
    };

    // getUserAccountData returns (totalCollateralBase, totalDebtBase,
    // availableBorrowsBase, currentLiquidationThreshold, ltv, healthFactor).
    let total_collateral = contracts::parse_uint(&ret, 0).ok()?;
    let total_debt = contracts::parse_uint(&ret, 1).ok()?;
    let health_factor = contracts::parse_uint(&ret, 5).ok()?;

    borrower_info_from_account_data(borrower, total_collateral, total_debt, health_factor)
}

/// Classify a raw account-data triple. Zero debt means "no signal", not a
/// safe position. The liquidation threshold is strictly below 1.0.
pub fn borrower_info_from_account_data(
    address: Address,
    total_collateral: U256,
    total_debt: U256,
    health_factor: U256,
) -> Option<BorrowerInfo> {
    if total_debt.is_zero() {
        return None;
    }

    let health_factor = wad_to_f64(health_factor);
    Some(BorrowerInfo {
        address,
        health_factor,
        total_collateral: wad_to_f64(total_collateral),
        total_debt: wad_to_f64(total_debt),
        can_be_liquidated: health_factor < 1.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAD: u128 = 1_000_000_000_000_000_000;

    fn wad(units: u128) -> U256 {
        U256::from(units)
    }

    #[test]
    fn zero_debt_yields_no_signal() {
        let info = borrower_info_from_account_data(
            Address::from([1u8; 20]),
            wad(10 * WAD),
            U256::ZERO,
            U256::MAX,
        );
        assert!(info.is_none());
    }

    #[test]
    fn liquidatable_iff_health_factor_strictly_below_one() {
        let address = Address::from([2u8; 20]);

        let unhealthy =
            borrower_info_from_account_data(address, wad(10 * WAD), wad(9 * WAD), wad(WAD - 1))
                .unwrap();
        assert!(unhealthy.can_be_liquidated);

        let boundary =
            borrower_info_from_account_data(address, wad(10 * WAD), wad(9 * WAD), wad(WAD))
                .unwrap();
        assert!(!boundary.can_be_liquidated);

        let healthy =
            borrower_info_from_account_data(address, wad(10 * WAD), wad(2 * WAD), wad(4 * WAD))
                .unwrap();
        assert!(!healthy.can_be_liquidated);
    }

    #[test]
    fn values_are_human_scaled() {
        let info = borrower_info_from_account_data(
            Address::from([3u8; 20]),
            wad(12 * WAD),
            wad(10_000 * WAD),
            wad(920_000_000_000_000_000),
        )
        .unwrap();

        assert_eq!(info.total_collateral, 12.0);
        assert_eq!(info.total_debt, 10_000.0);
        assert_eq!(info.health_factor, 0.92);
        assert!(info.can_be_liquidated);
    }

    #[test]
    fn max_health_factor_is_safe() {
        let info = borrower_info_from_account_data(
            Address::from([4u8; 20]),
            wad(10 * WAD),
            wad(WAD),
            U256::MAX,
        )
        .unwrap();
        assert_eq!(info.health_factor, f64::INFINITY);
        assert!(!info.can_be_liquidated);
    }
}
