//! Store profitability status: each operating store lands in exactly one
//! of four buckets by the sign of its direct profit and the direction of
//! change against the same month a year earlier.
//!
//! When the snapshot ships a pre-bucketed status file, its buckets are
//! reported as-is; the per-store rows are still derived.

use crate::{
    config::EntityProfile,
    error::ReportResult,
    period::Span,
    rules::{SelectionBasis, Selector},
    section::{ReportInput, ReportSection, SectionOutput},
    snapshot::StoreStatusBuckets,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    ProfitImproving,
    ProfitDeteriorating,
    LossImproving,
    LossDeteriorating,
}

impl StoreStatus {
    pub fn classify(direct_profit: f64, prior_direct_profit: f64) -> Self {
        let improving = direct_profit >= prior_direct_profit;
        match (direct_profit > 0.0, improving) {
            (true, true) => StoreStatus::ProfitImproving,
            (true, false) => StoreStatus::ProfitDeteriorating,
            (false, true) => StoreStatus::LossImproving,
            (false, false) => StoreStatus::LossDeteriorating,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketOrigin {
    Provided,
    Derived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStatusRow {
    pub code: String,
    pub store_name: String,
    pub direct_profit: f64,
    pub prior_direct_profit: f64,
    pub change: f64,
    pub status: StoreStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStatusReport {
    pub origin: BucketOrigin,
    pub buckets: StoreStatusBuckets,
    pub rows: Vec<StoreStatusRow>,
}

/// Classify every open store in the regional scope.
pub fn status_rows(profile: &EntityProfile, input: &ReportInput) -> Vec<StoreStatusRow> {
    let selector = Selector::new(profile, profile.region_geo, profile.area_channel);
    let now = selector.select(&input.dashboard, &input.areas, Span::Current, SelectionBasis::Sales);
    let before = selector.select(&input.dashboard, &input.areas, Span::Previous, SelectionBasis::Sales);

    now.stores
        .iter()
        .filter(|s| !s.closed)
        .map(|s| {
            let prior = before.get(&s.code).map(|p| p.direct_profit).unwrap_or(0.0);
            StoreStatusRow {
                code: s.code.clone(),
                store_name: s.store_name.clone(),
                direct_profit: s.direct_profit,
                prior_direct_profit: prior,
                change: s.direct_profit - prior,
                status: StoreStatus::classify(s.direct_profit, prior),
            }
        })
        .collect()
}

pub fn bucket(rows: &[StoreStatusRow]) -> StoreStatusBuckets {
    let mut buckets = StoreStatusBuckets::default();
    for row in rows {
        let list = match row.status {
            StoreStatus::ProfitImproving => &mut buckets.profit_improving,
            StoreStatus::ProfitDeteriorating => &mut buckets.profit_deteriorating,
            StoreStatus::LossImproving => &mut buckets.loss_improving,
            StoreStatus::LossDeteriorating => &mut buckets.loss_deteriorating,
        };
        list.push(row.code.clone());
    }
    buckets
}

pub struct StoreStatusSection;

impl ReportSection for StoreStatusSection {
    fn name(&self) -> &'static str {
        "store_status"
    }

    fn compute(&self, profile: &EntityProfile, input: &ReportInput) -> ReportResult<SectionOutput> {
        let rows = status_rows(profile, input);
        let (origin, buckets) = match &input.status {
            Some(provided) => (BucketOrigin::Provided, provided.clone()),
            None => (BucketOrigin::Derived, bucket(&rows)),
        };

        log::info!(
            "{} {}: {} profit-improving, {} profit-deteriorating, {} loss-improving, {} loss-deteriorating ({:?})",
            input.entity,
            input.period,
            buckets.profit_improving.len(),
            buckets.profit_deteriorating.len(),
            buckets.loss_improving.len(),
            buckets.loss_deteriorating.len(),
            origin
        );

        Ok(SectionOutput::StoreStatus(StoreStatusReport { origin, buckets, rows }))
    }
}
