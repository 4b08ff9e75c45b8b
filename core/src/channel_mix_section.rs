//! Sales by channel: share of brand sales per channel and YOY.

use crate::{
    aggregate::aggregate_by,
    config::{ChannelScope, EntityProfile},
    error::ReportResult,
    metrics,
    period::Span,
    rules::{SelectedStore, SelectionBasis, Selector, ONLINE_CHANNEL},
    section::{ReportInput, ReportSection, SectionOutput},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelShare {
    pub channel: String,
    pub store_count: usize,
    pub sales: f64,
    pub prior_sales: f64,
    pub share: f64,
    pub prior_share: f64,
    pub yoy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelTable {
    pub span: Span,
    pub channels: Vec<ChannelShare>,
    pub total_sales: f64,
    pub prior_total_sales: f64,
    pub total_yoy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMix {
    pub current_month: ChannelTable,
    pub cumulative: ChannelTable,
}

/// Channel label after applying the online code prefixes.
pub fn effective_channel(profile: &EntityProfile, store: &SelectedStore) -> String {
    let prefixed = profile
        .online_code_prefixes
        .iter()
        .any(|p| !p.is_empty() && store.code.starts_with(p.as_str()));
    if prefixed {
        ONLINE_CHANNEL.to_string()
    } else {
        store.channel.clone()
    }
}

pub fn channel_table(profile: &EntityProfile, input: &ReportInput, span: Span) -> ChannelTable {
    let selector = Selector::new(profile, profile.region_geo, ChannelScope::All);
    let prior_span = span.prior_year();
    let now = selector.select(&input.dashboard, &input.areas, span, SelectionBasis::Sales);
    let before = selector.select(&input.dashboard, &input.areas, prior_span, SelectionBasis::Sales);

    let key = |s: &SelectedStore| Some(effective_channel(profile, s));
    let now = aggregate_by(&now.stores, &profile.channels, key);
    let before = aggregate_by(&before.stores, &profile.channels, key);

    let total = now.total.total_sales;
    let prior_total = before.total.total_sales;

    let channels = now
        .groups
        .iter()
        .zip(before.groups.iter())
        .map(|(n, b)| ChannelShare {
            channel: n.region.clone(),
            store_count: n.store_count,
            sales: n.total_sales,
            prior_sales: b.total_sales,
            share: metrics::share(n.total_sales, total),
            prior_share: metrics::share(b.total_sales, prior_total),
            yoy: metrics::yoy(n.total_sales, b.total_sales),
        })
        .collect();

    ChannelTable {
        span,
        channels,
        total_sales: total,
        prior_total_sales: prior_total,
        total_yoy: metrics::yoy(total, prior_total),
    }
}

pub struct ChannelMixSection;

impl ReportSection for ChannelMixSection {
    fn name(&self) -> &'static str {
        "channel_mix"
    }

    fn compute(&self, profile: &EntityProfile, input: &ReportInput) -> ReportResult<SectionOutput> {
        let current_month = channel_table(profile, input, Span::Current);
        let cumulative = channel_table(profile, input, Span::Cumulative);

        log::info!(
            "{} {}: channel sales {:.0} (YOY {:.1}%) across {} channels",
            input.entity,
            input.period,
            current_month.total_sales,
            current_month.total_yoy,
            current_month.channels.len()
        );

        Ok(SectionOutput::ChannelMix(ChannelMix { current_month, cumulative }))
    }
}
