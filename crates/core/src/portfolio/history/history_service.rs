//! Reconstruction of dated holdings from the deal log.

use chrono::NaiveDate;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::history_model::PortfolioSnapshot;
use super::history_traits::SnapshotRepositoryTrait;
use crate::constants::CASH_TICKER;
use crate::deals::{Deal, DealRepositoryTrait, TradeSide};
use crate::errors::Result;
use crate::portfolio::holdings::{HoldingsRepositoryTrait, Position, RiskBucket};

type Holdings = BTreeMap<String, Decimal>;

/// Replays `deals` on top of the `initial` positions.
///
/// Deals are grouped by manager and execution date. Each date's deals are
/// applied in log order (sells floor at zero), zero rows are pruned, and one
/// snapshot per remaining ticker is emitted for that date. CASH rows are not
/// part of the history. Output is ordered by manager, date, then ticker.
pub fn reconstruct_history(initial: &[Position], deals: &[Deal]) -> Vec<PortfolioSnapshot> {
    let mut start: BTreeMap<&str, Holdings> = BTreeMap::new();
    for position in initial.iter().filter(|p| !p.is_cash()) {
        *start
            .entry(position.manager_id.as_str())
            .or_default()
            .entry(position.ticker.clone())
            .or_default() += position.quantity;
    }

    let mut grouped: BTreeMap<&str, BTreeMap<NaiveDate, Vec<&Deal>>> = BTreeMap::new();
    for deal in deals.iter().filter(|d| d.ticker != CASH_TICKER) {
        grouped
            .entry(deal.manager_id.as_str())
            .or_default()
            .entry(deal.execution_date)
            .or_default()
            .push(deal);
    }

    let mut snapshots = Vec::new();
    for (manager_id, by_date) in grouped {
        let mut holdings = start.remove(manager_id).unwrap_or_default();
        for (date, day_deals) in by_date {
            for deal in day_deals {
                let entry = holdings.entry(deal.ticker.clone()).or_default();
                *entry = match deal.side {
                    TradeSide::Buy => *entry + deal.quantity,
                    TradeSide::Sell => (*entry - deal.quantity).max(Decimal::ZERO),
                };
            }
            holdings.retain(|_, quantity| *quantity > Decimal::ZERO);

            snapshots.extend(holdings.iter().map(|(ticker, quantity)| PortfolioSnapshot {
                manager_id: manager_id.to_string(),
                ticker: ticker.clone(),
                quantity: *quantity,
                snapshot_date: date,
            }));
        }
    }
    snapshots
}

/// Positions held before any of `deals` executed.
///
/// Undoes each deal's signed quantity from the current rows. Tickers that were
/// sold out are restored from the deal log; CASH is left out.
pub fn unwind_deals(current: &[Position], deals: &[Deal]) -> Vec<Position> {
    let mut net: BTreeMap<(String, String), Decimal> = BTreeMap::new();
    for deal in deals.iter().filter(|d| d.ticker != CASH_TICKER) {
        *net.entry((deal.manager_id.clone(), deal.ticker.clone()))
            .or_default() += deal.signed_quantity();
    }

    let mut initial = Vec::new();
    for position in current.iter().filter(|p| !p.is_cash()) {
        let key = (position.manager_id.clone(), position.ticker.clone());
        let traded = net.remove(&key).unwrap_or_default();
        initial.push(Position {
            quantity: position.quantity - traded,
            ..position.clone()
        });
    }
    for ((manager_id, ticker), traded) in net {
        let Some(first) = deals
            .iter()
            .find(|d| d.manager_id == manager_id && d.ticker == ticker)
        else {
            continue;
        };
        initial.push(Position {
            risk_bucket: first.risk_bucket,
            ticker,
            quantity: -traded,
            manager_id,
            last_updated: first.execution_date,
            spot_price: first.price,
        });
    }

    initial
        .into_iter()
        .filter_map(|mut position| {
            if position.quantity < Decimal::ZERO {
                warn!(
                    "Deal log oversells {} for {}; starting it at zero",
                    position.ticker, position.manager_id
                );
                position.quantity = Decimal::ZERO;
            }
            (position.quantity > Decimal::ZERO).then_some(position)
        })
        .collect()
}

pub struct HistoryService {
    holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
    deal_repository: Arc<dyn DealRepositoryTrait>,
    snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
    /// Buckets whose deals are recorded without moving their positions.
    ledger_only: BTreeSet<RiskBucket>,
}

impl HistoryService {
    pub fn new(
        holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
        deal_repository: Arc<dyn DealRepositoryTrait>,
        snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
    ) -> Self {
        Self {
            holdings_repository,
            deal_repository,
            snapshot_repository,
            ledger_only: BTreeSet::new(),
        }
    }

    /// Treats `bucket`'s stored positions as its state before any deal.
    pub fn with_ledger_only_bucket(mut self, bucket: RiskBucket) -> Self {
        self.ledger_only.insert(bucket);
        self
    }

    /// Computes the bucket's history without persisting it.
    pub fn reconstruct(&self, bucket: RiskBucket) -> Result<Vec<PortfolioSnapshot>> {
        let (initial, deals) = self.load(bucket)?;
        Ok(reconstruct_history(&initial, &deals))
    }

    /// Recomputes the bucket's history and replaces the stored snapshots of
    /// every manager involved.
    pub async fn rebuild(&self, bucket: RiskBucket) -> Result<usize> {
        let (initial, deals) = self.load(bucket)?;
        let snapshots = reconstruct_history(&initial, &deals);

        let manager_ids: Vec<String> = initial
            .iter()
            .map(|p| p.manager_id.clone())
            .chain(deals.iter().map(|d| d.manager_id.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if manager_ids.is_empty() {
            debug!("No managers hold {} positions, nothing to rebuild", bucket);
            return Ok(0);
        }

        let written = self
            .snapshot_repository
            .replace_snapshots_for_managers(&manager_ids, snapshots)
            .await?;
        info!(
            "Rebuilt {} history: {} snapshots for {} managers",
            bucket,
            written,
            manager_ids.len()
        );
        Ok(written)
    }

    fn load(&self, bucket: RiskBucket) -> Result<(Vec<Position>, Vec<Deal>)> {
        let current = self.holdings_repository.get_positions(bucket)?;
        let mut deals = self.deal_repository.get_deals_by_bucket(bucket)?;
        deals.sort_by_key(|d| d.execution_date);
        if self.ledger_only.contains(&bucket) {
            return Ok((current, deals));
        }
        Ok((unwind_deals(&current, &deals), deals))
    }
}
