//! Retail report core: store aggregation, per-area metrics and P&L
//! ratios for the monthly management dashboard.

pub mod aggregate;
pub mod area_efficiency_section;
pub mod channel_mix_section;
pub mod config;
pub mod error;
pub mod metrics;
pub mod numeric;
pub mod period;
pub mod profit_loss_section;
pub mod region_section;
pub mod report;
pub mod rules;
pub mod section;
pub mod snapshot;
pub mod source;
pub mod store_status_section;
pub mod types;
