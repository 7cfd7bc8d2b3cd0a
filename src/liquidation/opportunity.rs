use alloy_primitives::U256;

use crate::models::{to_asset_units, BorrowerInfo, LiquidationOpportunity};

/// Assumed liquidation bonus used for the advisory profit estimate.
// TODO: read the actual liquidation bonus from the pool's reserve
// configuration and price the debt asset via the protocol oracle instead
// of this fixed estimate.
const BONUS_RATE: f64 = 0.05;

/// Assumed USD price of one debt unit in the profit estimate.
const DEBT_UNIT_PRICE_USD: f64 = 2000.0;

/// At most half of a position's debt is covered per liquidation call.
pub const CLOSE_FACTOR_BPS: u64 = 5_000;

/// Advisory profit estimate for ranking only; may diverge from the bonus
/// actually realized on-chain.
pub fn estimate_profit(total_debt: f64) -> f64 {
    total_debt * BONUS_RATE * DEBT_UNIT_PRICE_USD
}

/// Turn fresh borrower snapshots into liquidation opportunities, most
/// profitable first. Ties keep their original relative order.
pub fn rank_opportunities(borrowers: Vec<BorrowerInfo>) -> Vec<LiquidationOpportunity> {
    let mut opportunities: Vec<LiquidationOpportunity> = borrowers
        .into_iter()
        .filter(|info| info.can_be_liquidated)
        .map(|info| LiquidationOpportunity {
            borrower: info.address,
            health_factor: info.health_factor,
            collateral: info.total_collateral,
            debt: info.total_debt,
            potential_profit: estimate_profit(info.total_debt),
        })
        .collect();

    // sort_by is stable, so equal profits preserve input order.
    opportunities.sort_by(|a, b| b.potential_profit.total_cmp(&a.potential_profit));
    opportunities
}

/// Debt amount to cover for an opportunity, in on-chain units of the debt
/// asset: half the outstanding debt, by policy.
pub fn debt_to_cover_units(total_debt: f64, debt_asset_decimals: u8) -> U256 {
    let covered = total_debt * (CLOSE_FACTOR_BPS as f64 / 10_000.0);
    to_asset_units(covered, debt_asset_decimals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    fn borrower(byte: u8, health_factor: f64, debt: f64) -> BorrowerInfo {
        BorrowerInfo {
            address: Address::from([byte; 20]),
            health_factor,
            total_collateral: debt * 1.1,
            total_debt: debt,
            can_be_liquidated: health_factor < 1.0,
        }
    }

    #[test]
    fn ranking_is_descending_by_profit() {
        // Profits scale linearly with debt: debts 10/50/30 rank as 50/30/10.
        let input = vec![
            borrower(1, 0.95, 10.0),
            borrower(2, 0.90, 50.0),
            borrower(3, 0.85, 30.0),
        ];

        let ranked = rank_opportunities(input);
        let debts: Vec<f64> = ranked.iter().map(|o| o.debt).collect();
        assert_eq!(debts, vec![50.0, 30.0, 10.0]);

        for pair in ranked.windows(2) {
            assert!(pair[0].potential_profit >= pair[1].potential_profit);
        }
    }

    #[test]
    fn ranking_is_stable_on_ties() {
        let input = vec![
            borrower(1, 0.99, 20.0),
            borrower(2, 0.50, 20.0),
            borrower(3, 0.75, 20.0),
        ];

        let ranked = rank_opportunities(input);
        let order: Vec<u8> = ranked.iter().map(|o| o.borrower[0]).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn safe_positions_are_filtered_out() {
        let input = vec![
            borrower(1, 1.2, 100.0),
            borrower(2, 0.8, 40.0),
            borrower(3, 1.0, 60.0),
        ];

        let ranked = rank_opportunities(input);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].borrower, Address::from([2u8; 20]));
    }

    #[test]
    fn empty_input_is_the_normal_idle_case() {
        assert!(rank_opportunities(Vec::new()).is_empty());
    }

    #[test]
    fn profit_estimate_is_deterministic() {
        // 10_000 debt units * 5% bonus * $2000/unit
        assert!((estimate_profit(10_000.0) - 1_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn unhealthy_position_flows_through_to_a_covered_amount() {
        // Borrower at health factor 0.92 with 10_000 units of debt: ranked
        // with a $1,000,000 estimate, covering 5_000 units (6 decimals).
        let info = crate::monitoring::evaluator::borrower_info_from_account_data(
            Address::from([9u8; 20]),
            U256::from(11_000u128 * 10u128.pow(18)),
            U256::from(10_000u128 * 10u128.pow(18)),
            U256::from(920_000_000_000_000_000u128),
        )
        .unwrap();
        assert!(info.can_be_liquidated);

        let ranked = rank_opportunities(vec![info]);
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].potential_profit - 1_000_000.0).abs() < 1e-6);
        assert_eq!(
            debt_to_cover_units(ranked[0].debt, 6),
            U256::from(5_000_000_000u64)
        );
    }

    #[test]
    fn half_of_debt_is_covered() {
        assert_eq!(
            debt_to_cover_units(10_000.0, 6),
            U256::from(5_000_000_000u64)
        );
        assert_eq!(debt_to_cover_units(0.0, 6), U256::ZERO);
    }
}
