//! The report engine: runs every section over one entity/period input.
//!
//! SECTION ORDER (fixed, documented, never reordered):
//!   1. Area efficiency
//!   2. Region breakdown
//!   3. Channel mix
//!   4. Profit & loss
//!   5. Store status
//!
//! RULES:
//!   - Sections execute in registration order.
//!   - Every section reads the same immutable `ReportInput`.
//!   - No section reads another section's output.

use crate::{
    area_efficiency_section::{AreaEfficiency, AreaEfficiencySection},
    channel_mix_section::{ChannelMix, ChannelMixSection},
    config::ReportConfig,
    error::ReportResult,
    period::ReportPeriod,
    profit_loss_section::{ProfitLossSection, ProfitLossSummary},
    region_section::{RegionBreakdown, RegionSection},
    section::{ReportInput, ReportSection, SectionOutput},
    source::{DatasetOrigin, SnapshotLoader},
    store_status_section::{StoreStatusReport, StoreStatusSection},
    types::Entity,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityReport {
    pub entity:   Entity,
    pub period:   ReportPeriod,
    pub label:    String,
    pub sections: Vec<SectionOutput>,
    pub origins:  Vec<DatasetOrigin>,
}

impl EntityReport {
    pub fn area_efficiency(&self) -> Option<&AreaEfficiency> {
        self.sections.iter().find_map(|s| match s {
            SectionOutput::AreaEfficiency(a) => Some(a),
            _ => None,
        })
    }

    pub fn regions(&self) -> Option<&RegionBreakdown> {
        self.sections.iter().find_map(|s| match s {
            SectionOutput::RegionBreakdown(r) => Some(r),
            _ => None,
        })
    }

    pub fn channel_mix(&self) -> Option<&ChannelMix> {
        self.sections.iter().find_map(|s| match s {
            SectionOutput::ChannelMix(c) => Some(c),
            _ => None,
        })
    }

    pub fn profit_loss(&self) -> Option<&ProfitLossSummary> {
        self.sections.iter().find_map(|s| match s {
            SectionOutput::ProfitLoss(p) => Some(p),
            _ => None,
        })
    }

    pub fn store_status(&self) -> Option<&StoreStatusReport> {
        self.sections.iter().find_map(|s| match s {
            SectionOutput::StoreStatus(s) => Some(s),
            _ => None,
        })
    }

    /// Names of sections that had nothing to compute from.
    pub fn skipped(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter_map(|s| match s {
                SectionOutput::Skipped { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

pub struct ReportEngine {
    config:   ReportConfig,
    sections: Vec<Box<dyn ReportSection>>,
}

impl ReportEngine {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            sections: Vec::new(),
        }
    }

    /// Build an engine with every section registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: ReportConfig) -> Self {
        let mut engine = ReportEngine::new(config);

        // SECTION ORDER: fixed, documented, never reordered.
        engine.register(Box::new(AreaEfficiencySection));
        engine.register(Box::new(RegionSection));
        engine.register(Box::new(ChannelMixSection));
        engine.register(Box::new(ProfitLossSection));
        engine.register(Box::new(StoreStatusSection));
        engine
    }

    /// Register a section. Call in the documented order.
    pub fn register(&mut self, section: Box<dyn ReportSection>) {
        self.sections.push(section);
    }

    pub fn section_names(&self) -> Vec<&'static str> {
        self.sections.iter().map(|s| s.name()).collect()
    }

    /// Run every registered section over `input`.
    pub fn run(&self, input: &ReportInput) -> ReportResult<EntityReport> {
        let profile = self.config.profile(input.entity)?;

        let mut outputs = Vec::with_capacity(self.sections.len());
        for section in &self.sections {
            let output = section.compute(profile, input)?;
            if let SectionOutput::Skipped { reason, .. } = &output {
                log::warn!("{} {}: {} skipped: {reason}", input.entity, input.period, section.name());
            }
            outputs.push(output);
        }

        Ok(EntityReport {
            entity:   input.entity,
            period:   input.period,
            label:    profile.label.clone(),
            sections: outputs,
            origins:  input.origins.clone(),
        })
    }

    /// Load `entity`/`period` through `loader` and run the report.
    pub fn load_and_run(
        &self,
        loader: &SnapshotLoader,
        entity: Entity,
        period: ReportPeriod,
    ) -> ReportResult<EntityReport> {
        let input = loader.load_input(entity, period)?;
        self.run(&input)
    }
}
