//! Regional comparison: area-weighted profitability per region in the
//! profile's fixed region order.

use crate::{
    aggregate::{aggregate_by, GroupedAggregates},
    config::{EntityProfile, RegionKey},
    error::ReportResult,
    metrics,
    period::Span,
    rules::{SelectedStore, SelectionBasis, Selector},
    section::{ReportInput, ReportSection, SectionOutput},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionYoy {
    pub region: String,
    pub sales_yoy: f64,
    pub sales_per_area_yoy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionBreakdown {
    pub key: RegionKey,
    pub current_month: GroupedAggregates,
    pub prior_month: GroupedAggregates,
    pub cumulative: GroupedAggregates,
    pub prior_cumulative: GroupedAggregates,
    /// Month-over-prior-year, same order as the groups.
    pub month_yoy: Vec<RegionYoy>,
    pub cumulative_yoy: Vec<RegionYoy>,
}

/// Group label for `store` under the profile's region key.
pub fn region_of(profile: &EntityProfile, input: &ReportInput, store: &SelectedStore) -> Option<String> {
    let label = match profile.region_key {
        RegionKey::Country => Some(store.country.clone()),
        RegionKey::LocationRegion => input.locations.get(&store.code).map(|l| l.region.clone()),
        RegionKey::LocationCity => input.locations.get(&store.code).map(|l| l.city.clone()),
    };
    label.filter(|l| !l.is_empty())
}

/// Regional aggregates for one span.
pub fn regions_for(profile: &EntityProfile, input: &ReportInput, span: Span) -> GroupedAggregates {
    let selector = Selector::new(profile, profile.region_geo, profile.area_channel);
    let selection = selector.select(&input.dashboard, &input.areas, span, SelectionBasis::Area);
    aggregate_by(&selection.stores, &profile.regions, |s| region_of(profile, input, s))
}

fn compare(now: &GroupedAggregates, before: &GroupedAggregates) -> Vec<RegionYoy> {
    now.groups
        .iter()
        .zip(before.groups.iter())
        .map(|(n, b)| RegionYoy {
            region: n.region.clone(),
            sales_yoy: metrics::yoy(n.total_sales, b.total_sales),
            sales_per_area_yoy: metrics::yoy(n.sales_per_area, b.sales_per_area),
        })
        .collect()
}

pub struct RegionSection;

impl ReportSection for RegionSection {
    fn name(&self) -> &'static str {
        "region_breakdown"
    }

    fn compute(&self, profile: &EntityProfile, input: &ReportInput) -> ReportResult<SectionOutput> {
        let current_month = regions_for(profile, input, Span::Current);
        let prior_month = regions_for(profile, input, Span::Previous);
        let cumulative = regions_for(profile, input, Span::Cumulative);
        let prior_cumulative = regions_for(profile, input, Span::PreviousCumulative);

        let month_yoy = compare(&current_month, &prior_month);
        let cumulative_yoy = compare(&cumulative, &prior_cumulative);

        for (agg, yoy) in current_month.groups.iter().zip(&month_yoy) {
            log::info!(
                "{} {} {}: {} stores, eff {:.1}%, sales YOY {:.1}%",
                input.entity,
                input.period,
                agg.region,
                agg.store_count,
                agg.efficiency_score,
                yoy.sales_yoy
            );
        }

        Ok(SectionOutput::RegionBreakdown(RegionBreakdown {
            key: profile.region_key,
            current_month,
            prior_month,
            cumulative,
            prior_cumulative,
            month_yoy,
            cumulative_yoy,
        }))
    }
}
