//! Report section trait and the shared input every section reads.
//!
//! RULE: Every section implements ReportSection.
//! Sections are pure: they read the `ReportInput` and return one
//! `SectionOutput`. They never load files and never see each other's output.

use crate::{
    area_efficiency_section::AreaEfficiency,
    channel_mix_section::ChannelMix,
    config::EntityProfile,
    error::ReportResult,
    period::ReportPeriod,
    profit_loss_section::ProfitLossSummary,
    region_section::RegionBreakdown,
    snapshot::{DashboardSnapshot, PlSnapshot, StoreAreas, StoreLocations, StoreStatusBuckets},
    source::DatasetOrigin,
    store_status_section::StoreStatusReport,
    types::Entity,
};
use serde::{Deserialize, Serialize};

/// Everything loaded for one entity and one period.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub entity:    Entity,
    pub period:    ReportPeriod,
    pub dashboard: DashboardSnapshot,
    pub pl:        Option<PlSnapshot>,
    pub areas:     StoreAreas,
    pub locations: StoreLocations,
    pub status:    Option<StoreStatusBuckets>,
    pub origins:   Vec<DatasetOrigin>,
}

impl ReportInput {
    /// An input built directly from in-memory data, with nothing optional.
    pub fn new(entity: Entity, period: ReportPeriod, dashboard: DashboardSnapshot, areas: StoreAreas) -> Self {
        Self {
            entity,
            period,
            dashboard: dashboard.normalize(),
            pl: None,
            areas,
            locations: StoreLocations::new(),
            status: None,
            origins: Vec::new(),
        }
    }

    pub fn with_pl(mut self, pl: PlSnapshot) -> Self {
        self.pl = Some(pl);
        self
    }

    pub fn with_locations(mut self, locations: StoreLocations) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_status(mut self, status: StoreStatusBuckets) -> Self {
        self.status = Some(status);
        self
    }
}

/// Output of one section. Variants are appended, never reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum SectionOutput {
    AreaEfficiency(AreaEfficiency),
    RegionBreakdown(RegionBreakdown),
    ChannelMix(ChannelMix),
    ProfitLoss(ProfitLossSummary),
    StoreStatus(StoreStatusReport),
    /// The section had nothing to compute from (e.g. no P&L file).
    Skipped { name: String, reason: String },
}

/// The contract every report section fulfils.
pub trait ReportSection: Send + Sync {
    /// Unique stable name for this section.
    fn name(&self) -> &'static str;

    fn compute(&self, profile: &EntityProfile, input: &ReportInput) -> ReportResult<SectionOutput>;
}
