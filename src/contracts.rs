use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::U256;
use eyre::Result;

/// Minimal pool ABI: only the aggregate account-data read path is consumed.
pub fn pool_abi() -> Result<JsonAbi> {
    let abi_json = r#"[
        {
            "inputs": [{"internalType": "address", "name": "user", "type": "address"}],
            "name": "getUserAccountData",
            "outputs": [
                {"internalType": "uint256", "name": "totalCollateralBase", "type": "uint256"},
                {"internalType": "uint256", "name": "totalDebtBase", "type": "uint256"},
                {"internalType": "uint256", "name": "availableBorrowsBase", "type": "uint256"},
                {"internalType": "uint256", "name": "currentLiquidationThreshold", "type": "uint256"},
                {"internalType": "uint256", "name": "ltv", "type": "uint256"},
                {"internalType": "uint256", "name": "healthFactor", "type": "uint256"}
            ],
            "stateMutability": "view",
            "type": "function"
        }
    ]"#;

    let abi: JsonAbi = serde_json::from_str(abi_json)?;
    Ok(abi)
}

/// Public surface of the deployed AaveV3LiquidationBot contract.
pub fn liquidator_abi() -> Result<JsonAbi> {
    let abi_json = r#"[
        {
            "inputs": [],
            "name": "owner",
            "outputs": [{"internalType": "address", "name": "", "type": "address"}],
            "stateMutability": "view",
            "type": "function"
        },
        {
            "inputs": [
                {"internalType": "address", "name": "borrower", "type": "address"},
                {"internalType": "address", "name": "collateralAsset", "type": "address"},
                {"internalType": "address", "name": "debtAsset", "type": "address"},
                {"internalType": "uint256", "name": "debtAmount", "type": "uint256"}
            ],
            "name": "liquidateWithFlashLoan",
            "outputs": [],
            "stateMutability": "nonpayable",
            "type": "function"
        },
        {
            "inputs": [
                {"internalType": "address", "name": "asset", "type": "address"},
                {"internalType": "uint256", "name": "amount", "type": "uint256"}
            ],
            "name": "withdrawProfits",
            "outputs": [],
            "stateMutability": "nonpayable",
            "type": "function"
        },
        {
            "inputs": [{"internalType": "address", "name": "asset", "type": "address"}],
            "name": "withdrawAllProfits",
            "outputs": [],
            "stateMutability": "nonpayable",
            "type": "function"
        },
        {
            "inputs": [],
            "name": "withdrawETH",
            "outputs": [],
            "stateMutability": "nonpayable",
            "type": "function"
        },
        {
            "anonymous": false,
            "inputs": [
                {"indexed": true, "internalType": "address", "name": "asset", "type": "address"},
                {"indexed": false, "internalType": "uint256", "name": "amount", "type": "uint256"},
                {"indexed": true, "internalType": "address", "name": "recipient", "type": "address"}
            ],
            "name": "ProfitsWithdrawn",
            "type": "event"
        }
    ]"#;

    let abi: JsonAbi = serde_json::from_str(abi_json)?;
    Ok(abi)
}

/// ERC-20 surface used for balance checks.
pub fn erc20_abi() -> Result<JsonAbi> {
    let abi_json = r#"[
        {
            "inputs": [{"internalType": "address", "name": "account", "type": "address"}],
            "name": "balanceOf",
            "outputs": [{"internalType": "uint256", "name": "", "type": "uint256"}],
            "stateMutability": "view",
            "type": "function"
        }
    ]"#;

    let abi: JsonAbi = serde_json::from_str(abi_json)?;
    Ok(abi)
}

/// Test-token faucet used to top up the executor's debt-asset balance.
pub fn faucet_abi() -> Result<JsonAbi> {
    let abi_json = r#"[
        {
            "inputs": [
                {"internalType": "address", "name": "token", "type": "address"},
                {"internalType": "address", "name": "to", "type": "address"},
                {"internalType": "uint256", "name": "amount", "type": "uint256"}
            ],
            "name": "mint",
            "outputs": [],
            "stateMutability": "nonpayable",
            "type": "function"
        }
    ]"#;

    let abi: JsonAbi = serde_json::from_str(abi_json)?;
    Ok(abi)
}

/// Pull a uint out of a decoded return tuple.
pub fn parse_uint(values: &[DynSolValue], index: usize) -> Result<U256> {
    if let Some(DynSolValue::Uint(value, _)) = values.get(index) {
        Ok(*value)
    } else {
        Err(eyre::eyre!("failed to parse uint at return index {}", index))
    }
}

/// Pull an address out of a decoded return tuple.
pub fn parse_address(values: &[DynSolValue], index: usize) -> Result<alloy_primitives::Address> {
    if let Some(DynSolValue::Address(addr)) = values.get(index) {
        Ok(*addr)
    } else {
        Err(eyre::eyre!("failed to parse address at return index {}", index))
    }
}
