use alloy_primitives::{Address, B256};
use alloy_provider::Provider;
use alloy_rpc_types::{BlockNumberOrTag, Filter, Log};
use alloy_sol_types::SolEvent;
use eyre::Result;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::context::BotContext;
use crate::models::{Borrow, Repay, Supply, Withdraw};

/// The four pool events that change a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Supply,
    Borrow,
    Repay,
    Withdraw,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Supply,
        EventKind::Borrow,
        EventKind::Repay,
        EventKind::Withdraw,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Supply => "Supply",
            EventKind::Borrow => "Borrow",
            EventKind::Repay => "Repay",
            EventKind::Withdraw => "Withdraw",
        }
    }

    pub fn signature_hash(&self) -> B256 {
        match self {
            EventKind::Supply => Supply::SIGNATURE_HASH,
            EventKind::Borrow => Borrow::SIGNATURE_HASH,
            EventKind::Repay => Repay::SIGNATURE_HASH,
            EventKind::Withdraw => Withdraw::SIGNATURE_HASH,
        }
    }
}

/// Outcome of scanning one event kind. A skipped kind never aborts the
/// scan of the others.
#[derive(Debug, Clone)]
pub enum EventScan {
    Found(HashSet<Address>),
    Skipped { kind: EventKind, reason: String },
}

/// Aggregated discovery result for one cycle.
#[derive(Debug, Clone, Default)]
pub struct BorrowerScan {
    pub addresses: HashSet<Address>,
    pub skipped: Vec<(EventKind, String)>,
}

/// Scan the recent block window for accounts that touched the pool.
///
/// Errors only when the gateway itself is unreachable (the block-height
/// read fails); per-kind log failures are folded into `skipped`.
pub async fn discover_borrowers<P>(ctx: &BotContext<P>) -> Result<BorrowerScan>
where
    P: Provider + 'static,
{
    let current_block = ctx.provider.get_block_number().await?;
    let (from_block, to_block) = clip_window(current_block, ctx.config.lookback_blocks);

    info!(
        "Scanning blocks {} to {} for pool interactions",
        from_block, to_block
    );

    let mut scans = Vec::with_capacity(EventKind::ALL.len());
    for kind in EventKind::ALL {
        scans.push(scan_event_kind(ctx, kind, from_block, to_block).await);
    }

    let scan = merge_scans(scans);
    for (kind, reason) in &scan.skipped {
        warn!("Could not fetch {} events: {}", kind.name(), reason);
    }
    info!("Discovered {} candidate addresses", scan.addresses.len());

    Ok(scan)
}

async fn scan_event_kind<P>(
    ctx: &BotContext<P>,
    kind: EventKind,
    from_block: u64,
    to_block: u64,
) -> EventScan
where
    P: Provider + 'static,
{
    let filter = Filter::new()
        .address(ctx.config.pool_address)
        .event_signature(kind.signature_hash())
        .from_block(BlockNumberOrTag::Number(from_block))
        .to_block(BlockNumberOrTag::Number(to_block));

    match ctx.provider.get_logs(&filter).await {
        Ok(logs) => {
            let mut addresses = HashSet::new();
            for log in &logs {
                if let Some(account) = account_from_log(kind, log) {
                    addresses.insert(account);
                }
            }
            debug!(
                "Found {} {} events ({} distinct accounts)",
                logs.len(),
                kind.name(),
                addresses.len()
            );
            EventScan::Found(addresses)
        }
        Err(e) => EventScan::Skipped {
            kind,
            reason: e.to_string(),
        },
    }
}

/// Extract the account a log concerns: the position holder (`onBehalfOf`)
/// for Supply/Borrow, the `user` for Repay/Withdraw. Undecodable logs are
/// discovery noise and dropped.
fn account_from_log(kind: EventKind, log: &Log) -> Option<Address> {
    // Convert alloy_rpc_types::Log to alloy_primitives::Log for decoding
    let primitive_log = alloy_primitives::Log {
        address: log.address(),
        data: alloy_primitives::LogData::new_unchecked(
            log.topics().to_vec(),
            log.data().data.clone(),
        ),
    };
    account_from_primitive_log(kind, &primitive_log)
}

fn account_from_primitive_log(
    kind: EventKind,
    log: &alloy_primitives::Log,
) -> Option<Address> {
    match kind {
        EventKind::Supply => Supply::decode_log(log, true).ok().map(|ev| ev.onBehalfOf),
        EventKind::Borrow => Borrow::decode_log(log, true).ok().map(|ev| ev.onBehalfOf),
        EventKind::Repay => Repay::decode_log(log, true).ok().map(|ev| ev.user),
        EventKind::Withdraw => Withdraw::decode_log(log, true).ok().map(|ev| ev.user),
    }
}

/// Bound the scan window to `lookback` blocks, clipped at genesis.
pub fn clip_window(current_block: u64, lookback: u64) -> (u64, u64) {
    (current_block.saturating_sub(lookback), current_block)
}

/// Union the per-kind results, keeping skip reasons for reporting.
pub fn merge_scans(scans: Vec<EventScan>) -> BorrowerScan {
    let mut result = BorrowerScan::default();
    for scan in scans {
        match scan {
            EventScan::Found(addresses) => result.addresses.extend(addresses),
            EventScan::Skipped { kind, reason } => result.skipped.push((kind, reason)),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{LogData, U256};

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn topic_from_address(address: Address) -> B256 {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(address.as_slice());
        B256::from(bytes)
    }

    fn topic_from_u64(value: u64) -> B256 {
        B256::from(U256::from(value))
    }

    #[test]
    fn window_is_clipped_at_genesis() {
        assert_eq!(clip_window(100_000, 10_000), (90_000, 100_000));
        assert_eq!(clip_window(5_000, 10_000), (0, 5_000));
        assert_eq!(clip_window(0, 10_000), (0, 0));
    }

    #[test]
    fn merge_unions_found_sets() {
        let scans = vec![
            EventScan::Found([addr(1), addr(2)].into_iter().collect()),
            EventScan::Found([addr(2), addr(3)].into_iter().collect()),
            EventScan::Found(HashSet::new()),
        ];

        let merged = merge_scans(scans);
        assert_eq!(merged.addresses.len(), 3);
        assert!(merged.skipped.is_empty());
    }

    #[test]
    fn merge_keeps_skip_reasons() {
        let scans = vec![
            EventScan::Found([addr(1)].into_iter().collect()),
            EventScan::Skipped {
                kind: EventKind::Repay,
                reason: "filter not supported".to_string(),
            },
        ];

        let merged = merge_scans(scans);
        assert_eq!(merged.addresses.len(), 1);
        assert_eq!(merged.skipped.len(), 1);
        assert_eq!(merged.skipped[0].0, EventKind::Repay);
    }

    #[test]
    fn empty_scan_is_a_valid_idle_outcome() {
        let merged = merge_scans(vec![
            EventScan::Found(HashSet::new()),
            EventScan::Found(HashSet::new()),
            EventScan::Found(HashSet::new()),
            EventScan::Found(HashSet::new()),
        ]);
        assert!(merged.addresses.is_empty());
        assert!(merged.skipped.is_empty());
    }

    #[test]
    fn event_kinds_have_distinct_signatures() {
        let hashes: HashSet<B256> = EventKind::ALL.iter().map(|k| k.signature_hash()).collect();
        assert_eq!(hashes.len(), 4);
    }

    #[test]
    fn supply_logs_resolve_the_position_holder() {
        let reserve = addr(0xAA);
        let caller = addr(0xBB);
        let holder = addr(0xCC);

        // Supply(reserve indexed, user, onBehalfOf indexed, amount, referralCode indexed)
        let mut data = Vec::new();
        data.extend_from_slice(topic_from_address(caller).as_slice());
        data.extend_from_slice(&U256::from(1_000u64).to_be_bytes::<32>());

        let log = alloy_primitives::Log {
            address: addr(0x01),
            data: LogData::new_unchecked(
                vec![
                    Supply::SIGNATURE_HASH,
                    topic_from_address(reserve),
                    topic_from_address(holder),
                    topic_from_u64(0),
                ],
                data.into(),
            ),
        };

        assert_eq!(
            account_from_primitive_log(EventKind::Supply, &log),
            Some(holder)
        );
    }

    #[test]
    fn withdraw_logs_resolve_the_user() {
        let reserve = addr(0xAA);
        let user = addr(0xDD);
        let to = addr(0xEE);

        // Withdraw(reserve indexed, user indexed, to indexed, amount)
        let log = alloy_primitives::Log {
            address: addr(0x01),
            data: LogData::new_unchecked(
                vec![
                    Withdraw::SIGNATURE_HASH,
                    topic_from_address(reserve),
                    topic_from_address(user),
                    topic_from_address(to),
                ],
                U256::from(42u64).to_be_bytes::<32>().to_vec().into(),
            ),
        };

        assert_eq!(
            account_from_primitive_log(EventKind::Withdraw, &log),
            Some(user)
        );
    }

    #[test]
    fn mismatched_logs_are_dropped_as_noise() {
        // A Withdraw-shaped log does not decode as a Supply event.
        let log = alloy_primitives::Log {
            address: addr(0x01),
            data: LogData::new_unchecked(
                vec![
                    Withdraw::SIGNATURE_HASH,
                    topic_from_address(addr(0xAA)),
                    topic_from_address(addr(0xDD)),
                    topic_from_address(addr(0xEE)),
                ],
                U256::from(42u64).to_be_bytes::<32>().to_vec().into(),
            ),
        };

        assert_eq!(account_from_primitive_log(EventKind::Supply, &log), None);
    }
}
