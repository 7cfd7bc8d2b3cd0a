use alloy_provider::Provider;
use eyre::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::context::BotContext;
use crate::history::HistoryStore;
use crate::liquidation::{executor, opportunity, preparer, sweeper};
use crate::models::CycleOutcome;
use crate::monitoring::{discovery, evaluator};

/// Per-cycle summary persisted to the history log.
#[derive(Debug, Serialize)]
struct CycleSummary {
    candidates: usize,
    evaluated: usize,
    opportunities: usize,
    outcome: &'static str,
}

/// Run discovery/evaluation/execution cycles until a stop is requested.
///
/// Cycles are strictly sequential: a cycle always runs to completion
/// (including awaiting confirmations) before the inter-cycle wait starts,
/// and the stop signal is only honored between cycles. Any error escaping
/// a cycle is logged here and the loop continues.
pub async fn run<P>(
    ctx: &BotContext<P>,
    history: &HistoryStore,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()>
where
    P: Provider + 'static,
{
    let interval = Duration::from_secs(ctx.config.check_interval_secs);
    let mut cycle: u64 = 0;

    info!(
        "Scheduler started, checking every {}s. Press Ctrl+C to stop.",
        ctx.config.check_interval_secs
    );

    loop {
        if *shutdown.borrow() {
            break;
        }

        cycle += 1;
        info!("--- Cycle {} ---", cycle);

        match run_cycle(ctx, history, cycle).await {
            Ok(outcome) => info!("Cycle {} complete: {}", cycle, outcome),
            Err(e) => {
                error!("Cycle {} failed: {e:#}", cycle);
                if let Err(db_err) = history
                    .log_cycle_event(cycle, "cycle_error", Some(&format!("{e:#}")))
                    .await
                {
                    warn!("Could not record cycle error: {db_err:#}");
                }
            }
        }

        info!("Next check in {}s", ctx.config.check_interval_secs);
        tokio::select! {
            _ = sleep(interval) => {}
            _ = shutdown.changed() => {
                info!("Stop requested, finishing up");
                break;
            }
        }
    }

    Ok(())
}

/// One full pass: discover -> evaluate -> rank -> prepare -> execute ->
/// sweep. Only the single top-ranked opportunity is acted on; the rest are
/// re-evaluated fresh next cycle.
async fn run_cycle<P>(
    ctx: &BotContext<P>,
    history: &HistoryStore,
    cycle: u64,
) -> Result<CycleOutcome>
where
    P: Provider + 'static,
{
    let candidates = gather_candidates(ctx).await;
    if candidates.is_empty() {
        let outcome = CycleOutcome::Idle;
        record_summary(history, cycle, &candidates, 0, 0, &outcome).await;
        return Ok(outcome);
    }

    info!("Checking {} addresses for opportunities...", candidates.len());

    let mut borrowers = Vec::new();
    for (index, address) in candidates.iter().enumerate() {
        if let Some(info) = evaluator::evaluate_borrower(ctx, *address).await {
            info!(
                "{}: health factor {:.4}, collateral {:.4}, debt {:.4} -> {}",
                info.address,
                info.health_factor,
                info.total_collateral,
                info.total_debt,
                if info.can_be_liquidated { "CAN BE LIQUIDATED" } else { "safe" }
            );
            borrowers.push(info);
        }
        if (index + 1) % 10 == 0 {
            info!("Checked {} of {} addresses...", index + 1, candidates.len());
        }
    }
    let evaluated = borrowers.len();

    let opportunities = opportunity::rank_opportunities(borrowers);
    if opportunities.is_empty() {
        info!("No liquidation opportunities found");
        let outcome = CycleOutcome::NoOpportunity;
        record_summary(history, cycle, &candidates, evaluated, 0, &outcome).await;
        return Ok(outcome);
    }

    info!("Found {} liquidation opportunity(ies)", opportunities.len());
    let best = &opportunities[0];
    info!(
        "Best opportunity: borrower {}, health factor {:.4}, potential profit ${:.2}",
        best.borrower, best.health_factor, best.potential_profit
    );

    let debt_to_cover =
        opportunity::debt_to_cover_units(best.debt, ctx.config.debt_asset_decimals);

    let outcome = if !preparer::prepare_capital(ctx, debt_to_cover).await {
        warn!("Could not prepare executor, skipping this cycle");
        record_attempt(history, best, debt_to_cover, None, "not_ready").await;
        CycleOutcome::NotReady
    } else {
        match executor::execute_liquidation(ctx, best.borrower, debt_to_cover).await {
            Ok(done) => {
                info!("Liquidation successful: {}", done.tx_hash);
                sweeper::sweep_profits(ctx).await;
                record_attempt(history, best, debt_to_cover, Some(&done.tx_hash), "executed").await;
                CycleOutcome::Executed { tx_hash: done.tx_hash }
            }
            Err(e) => {
                error!("Liquidation failed: {e}");
                record_attempt(history, best, debt_to_cover, None, "failed").await;
                CycleOutcome::ExecutionFailed
            }
        }
    };

    record_summary(history, cycle, &candidates, evaluated, opportunities.len(), &outcome).await;
    Ok(outcome)
}

/// Discovery with the degraded fallback: when the gateway cannot even be
/// scanned, substitute the configured known accounts instead of failing
/// the cycle.
async fn gather_candidates<P>(ctx: &BotContext<P>) -> HashSet<alloy_primitives::Address>
where
    P: Provider + 'static,
{
    match discovery::discover_borrowers(ctx).await {
        Ok(scan) => scan.addresses,
        Err(e) => {
            warn!(
                "Could not scan pool events ({e:#}), using {} fallback account(s)",
                ctx.config.fallback_borrowers.len()
            );
            ctx.config.fallback_borrowers.iter().copied().collect()
        }
    }
}

async fn record_attempt(
    history: &HistoryStore,
    best: &crate::models::LiquidationOpportunity,
    debt_to_cover: alloy_primitives::U256,
    tx_hash: Option<&str>,
    outcome: &str,
) {
    if let Err(e) = history
        .record_attempt(best.borrower, best.health_factor, debt_to_cover, tx_hash, outcome)
        .await
    {
        warn!("Could not record liquidation attempt: {e:#}");
    }
}

async fn record_summary(
    history: &HistoryStore,
    cycle: u64,
    candidates: &HashSet<alloy_primitives::Address>,
    evaluated: usize,
    opportunities: usize,
    outcome: &CycleOutcome,
) {
    let summary = CycleSummary {
        candidates: candidates.len(),
        evaluated,
        opportunities,
        outcome: outcome.as_label(),
    };
    let details = serde_json::to_string(&summary).unwrap_or_default();
    if let Err(e) = history
        .log_cycle_event(cycle, "cycle_complete", Some(&details))
        .await
    {
        warn!("Could not record cycle summary: {e:#}");
    }
}
