use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;

// Aave V3 pool events that indicate position changes, plus the profit
// withdrawal event emitted by the liquidation contract.
sol! {
    event Supply(
        address indexed reserve,
        address user,
        address indexed onBehalfOf,
        uint256 amount,
        uint16 indexed referralCode
    );

    event Borrow(
        address indexed reserve,
        address user,
        address indexed onBehalfOf,
        uint256 amount,
        uint8 interestRateMode,
        uint256 borrowRate,
        uint16 indexed referralCode
    );

    event Repay(
        address indexed reserve,
        address indexed user,
        address indexed repayer,
        uint256 amount,
        bool useATokens
    );

    event Withdraw(
        address indexed reserve,
        address indexed user,
        address indexed to,
        uint256 amount
    );

    event ProfitsWithdrawn(
        address indexed asset,
        uint256 amount,
        address indexed recipient
    );
}

/// Snapshot of a borrower's aggregate position, freshly read from the pool.
/// Never cached across cycles; positions move every block.
#[derive(Debug, Clone)]
pub struct BorrowerInfo {
    pub address: Address,
    pub health_factor: f64,
    pub total_collateral: f64,
    pub total_debt: f64,
    pub can_be_liquidated: bool,
}

/// A liquidatable position with an advisory profit estimate used only for
/// ranking within the current cycle.
#[derive(Debug, Clone)]
pub struct LiquidationOpportunity {
    pub borrower: Address,
    pub health_factor: f64,
    pub collateral: f64,
    pub debt: f64,
    pub potential_profit: f64,
}

/// Terminal state of one scheduler cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// No candidate addresses were found in the scan window.
    Idle,
    /// Candidates were evaluated but none is below the liquidation threshold.
    NoOpportunity,
    /// Capital preparation failed; execution was skipped.
    NotReady,
    /// Liquidation landed on-chain with success status.
    Executed { tx_hash: String },
    /// Liquidation was attempted and rejected or reverted.
    ExecutionFailed,
}

impl std::fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleOutcome::Idle => write!(f, "idle (no candidates)"),
            CycleOutcome::NoOpportunity => write!(f, "no liquidation opportunities"),
            CycleOutcome::NotReady => write!(f, "executor not funded, execution skipped"),
            CycleOutcome::Executed { tx_hash } => write!(f, "liquidation executed ({tx_hash})"),
            CycleOutcome::ExecutionFailed => write!(f, "liquidation attempt failed"),
        }
    }
}

impl CycleOutcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            CycleOutcome::Idle => "idle",
            CycleOutcome::NoOpportunity => "no_opportunity",
            CycleOutcome::NotReady => "not_ready",
            CycleOutcome::Executed { .. } => "executed",
            CycleOutcome::ExecutionFailed => "execution_failed",
        }
    }
}

/// Convert a WAD (18-decimal fixed point) chain value to a display/compare
/// float. `U256::MAX` (the pool's "no debt" health factor) maps to infinity.
pub fn wad_to_f64(value: U256) -> f64 {
    if value > U256::from(u128::MAX) {
        f64::INFINITY
    } else {
        value.to::<u128>() as f64 / 1e18
    }
}

/// Convert a human-scaled amount to on-chain units of an asset with the
/// given number of decimals.
pub fn to_asset_units(amount: f64, decimals: u8) -> U256 {
    if amount <= 0.0 {
        return U256::ZERO;
    }
    U256::from((amount * 10f64.powi(decimals as i32)).round() as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wad_conversion_scales_by_1e18() {
        assert_eq!(wad_to_f64(U256::from(10u128.pow(18))), 1.0);
        assert_eq!(wad_to_f64(U256::from(920_000_000_000_000_000u128)), 0.92);
        assert_eq!(wad_to_f64(U256::ZERO), 0.0);
    }

    #[test]
    fn wad_conversion_saturates_to_infinity() {
        assert_eq!(wad_to_f64(U256::MAX), f64::INFINITY);
    }

    #[test]
    fn asset_unit_conversion_uses_decimals() {
        assert_eq!(to_asset_units(5_000.0, 6), U256::from(5_000_000_000u64));
        assert_eq!(to_asset_units(1.5, 18), U256::from(1_500_000_000_000_000_000u128));
        assert_eq!(to_asset_units(0.0, 6), U256::ZERO);
    }
}
