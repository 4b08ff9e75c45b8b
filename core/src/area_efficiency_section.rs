//! Area efficiency section: sales per pyeong for the entity's headline
//! store scope, monthly and year-to-date, against the prior year.
//!
//! Per-area figures are in whole currency per pyeong, in the same units as
//! the regional aggregates.

use crate::{
    aggregate::aggregate_all,
    config::EntityProfile,
    error::ReportResult,
    metrics,
    period::Span,
    rules::{Exclusion, ExclusionReason, SelectionBasis, Selector},
    section::{ReportInput, ReportSection, SectionOutput},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaMetric {
    pub span: Span,
    pub days: u32,
    pub store_count: usize,
    pub total_sales: f64,
    pub total_area: f64,
    pub sales_per_area: f64,
    pub daily_sales_per_area: f64,
    pub prior_days: u32,
    pub prior_store_count: usize,
    pub prior_total_sales: f64,
    pub prior_total_area: f64,
    pub prior_sales_per_area: f64,
    pub prior_daily_sales_per_area: f64,
    /// YOY of the per-area figure.
    pub yoy: f64,
    /// YOY of the area-weighted sales total.
    pub sales_yoy: f64,
    pub excluded: Vec<Exclusion>,
    pub prior_excluded: Vec<Exclusion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreEfficiencyLine {
    pub code: String,
    pub store_name: String,
    pub channel: String,
    pub sales: f64,
    pub prior_sales: f64,
    pub sales_yoy: f64,
    pub area: f64,
    pub sales_per_area: f64,
    pub daily_sales_per_area: f64,
    pub excluded: Option<ExclusionReason>,
    pub merged: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaEfficiency {
    pub current_month: AreaMetric,
    pub cumulative: AreaMetric,
    /// Current-month lines, one per location, sorted by code.
    pub stores: Vec<StoreEfficiencyLine>,
}

/// Per-area metric for `span` against the same span a year earlier.
///
/// Each side is its own area-weighted selection, so the liquidation rule
/// reads that side's own sales.
pub fn area_metric(profile: &EntityProfile, input: &ReportInput, span: Span) -> AreaMetric {
    let selector = Selector::area_scope(profile);
    let prior_span = span.prior_year();

    let now = selector.select(&input.dashboard, &input.areas, span, SelectionBasis::Area);
    let before = selector.select(&input.dashboard, &input.areas, prior_span, SelectionBasis::Area);

    let now_agg = aggregate_all(&now.stores, "current");
    let before_agg = aggregate_all(&before.stores, "prior");

    let days = input.period.days(span);
    let prior_days = input.period.days(prior_span);

    let spa = metrics::sales_per_area(now_agg.total_sales, now_agg.total_area);
    let prior_spa =
        metrics::sales_per_area(before_agg.total_sales, before_agg.total_area);

    AreaMetric {
        span,
        days,
        store_count: now_agg.store_count,
        total_sales: now_agg.total_sales,
        total_area: now_agg.total_area,
        sales_per_area: spa,
        daily_sales_per_area: metrics::daily_sales_per_area(spa, days),
        prior_days,
        prior_store_count: before_agg.store_count,
        prior_total_sales: before_agg.total_sales,
        prior_total_area: before_agg.total_area,
        prior_sales_per_area: prior_spa,
        prior_daily_sales_per_area: metrics::daily_sales_per_area(prior_spa, prior_days),
        yoy: metrics::yoy(spa, prior_spa),
        sales_yoy: metrics::yoy(now_agg.total_sales, before_agg.total_sales),
        excluded: now.excluded,
        prior_excluded: before.excluded,
    }
}

/// Current-month per-store lines for the headline scope.
pub fn store_lines(profile: &EntityProfile, input: &ReportInput) -> Vec<StoreEfficiencyLine> {
    let selector = Selector::area_scope(profile);
    let now = selector.select(&input.dashboard, &input.areas, Span::Current, SelectionBasis::Sales);
    let before = selector.select(&input.dashboard, &input.areas, Span::Previous, SelectionBasis::Sales);
    let days = input.period.days(Span::Current);

    now.stores
        .iter()
        .map(|store| {
            let prior_sales = before.get(&store.code).map(|s| s.sales).unwrap_or(0.0);
            let spa = metrics::sales_per_area(store.sales, store.area);
            StoreEfficiencyLine {
                code: store.code.clone(),
                store_name: store.store_name.clone(),
                channel: store.channel.clone(),
                sales: store.sales,
                prior_sales,
                sales_yoy: metrics::yoy(store.sales, prior_sales),
                area: store.area,
                sales_per_area: spa,
                daily_sales_per_area: metrics::daily_sales_per_area(spa, days),
                excluded: now.is_excluded(&store.code),
                merged: store.merged.clone(),
            }
        })
        .collect()
}

pub struct AreaEfficiencySection;

impl ReportSection for AreaEfficiencySection {
    fn name(&self) -> &'static str {
        "area_efficiency"
    }

    fn compute(&self, profile: &EntityProfile, input: &ReportInput) -> ReportResult<SectionOutput> {
        let current_month = area_metric(profile, input, Span::Current);
        let cumulative = area_metric(profile, input, Span::Cumulative);
        let stores = store_lines(profile, input);

        log::info!(
            "{} {}: {:.0}/pyeong ({:.0}/day) YOY {:.1}%, YTD {:.0}/pyeong YOY {:.1}%",
            input.entity,
            input.period,
            current_month.sales_per_area,
            current_month.daily_sales_per_area,
            current_month.yoy,
            cumulative.sales_per_area,
            cumulative.yoy
        );

        Ok(SectionOutput::AreaEfficiency(AreaEfficiency {
            current_month,
            cumulative,
            stores,
        }))
    }
}
