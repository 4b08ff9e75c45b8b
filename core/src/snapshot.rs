//! Snapshot files: typed views of the per-entity JSON exports.
//!
//! A snapshot is replaced wholesale every reporting period and is never
//! mutated after load. Sections the report does not compute from (inventory,
//! season sales, item detail) are kept as raw JSON so that a consumer can
//! still pass them through.

use crate::{
    numeric::{lenient_bool, lenient_f64, lenient_f64_map, null_as_default},
    period::Span,
    types::StoreCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

// ── Store records ──────────────────────────────────────────────────

/// Figures for one store over one span. Every field reads leniently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodFigures {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub net_sales: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub tag_sales: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub direct_profit: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rent: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub labor_cost: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Filled from the map key on load when the file omits it.
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: StoreCode,
    #[serde(default, deserialize_with = "null_as_default")]
    pub store_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channel: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub closed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current: PeriodFigures,
    #[serde(default, deserialize_with = "null_as_default")]
    pub previous: PeriodFigures,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cumulative: PeriodFigures,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prev_cumulative: PeriodFigures,
}

impl StoreRecord {
    pub fn figures(&self, span: Span) -> &PeriodFigures {
        match span {
            Span::Current => &self.current,
            Span::Previous => &self.previous,
            Span::Cumulative => &self.cumulative,
            Span::PreviousCumulative => &self.prev_cumulative,
        }
    }
}

// ── Dashboard file ─────────────────────────────────────────────────

/// `{entity}-dashboard-data[-{period}].json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub store_summary: BTreeMap<StoreCode, StoreRecord>,
    #[serde(default)]
    pub ending_inventory: Value,
    #[serde(default)]
    pub country_channel_summary: Value,
    #[serde(default)]
    pub store_monthly_trends: Value,
    #[serde(default)]
    pub season_sales: Value,
    #[serde(default)]
    pub store_item_all: Value,
}

impl DashboardSnapshot {
    /// Build a snapshot from bare records, keyed by their codes.
    pub fn from_records(records: impl IntoIterator<Item = StoreRecord>) -> Self {
        let store_summary = records
            .into_iter()
            .map(|r| (r.code.clone(), r))
            .collect();
        Self {
            store_summary,
            ..Self::default()
        }
    }

    /// Make every record's `code` agree with its map key.
    pub fn normalize(mut self) -> Self {
        for (code, record) in self.store_summary.iter_mut() {
            if record.code != *code {
                record.code = code.clone();
            }
        }
        self
    }

    pub fn stores(&self) -> impl Iterator<Item = &StoreRecord> {
        self.store_summary.values()
    }

    pub fn store(&self, code: &str) -> Option<&StoreRecord> {
        self.store_summary.get(code)
    }
}

// ── Reference files ────────────────────────────────────────────────

/// `{entity}-store-areas.json`: store code → floor area in pyeong.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct StoreAreas {
    areas: HashMap<StoreCode, f64>,
}

impl<'de> Deserialize<'de> for StoreAreas {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        lenient_f64_map(deserializer).map(Self::new)
    }
}

impl StoreAreas {
    pub fn new(areas: HashMap<StoreCode, f64>) -> Self {
        Self { areas }
    }

    /// Floor area for `code`. Missing, zero and negative all read as 0.
    pub fn area(&self, code: &str) -> f64 {
        self.areas.get(code).copied().filter(|a| *a > 0.0).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

impl FromIterator<(StoreCode, f64)> for StoreAreas {
    fn from_iter<I: IntoIterator<Item = (StoreCode, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreLocation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lng: f64,
}

/// `{entity}-store-locations.json`
pub type StoreLocations = HashMap<StoreCode, StoreLocation>;

/// `{entity}-store-status.json`: stores pre-sorted into profitability buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStatusBuckets {
    #[serde(default, deserialize_with = "null_as_default")]
    pub profit_improving: Vec<StoreCode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profit_deteriorating: Vec<StoreCode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loss_improving: Vec<StoreCode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loss_deteriorating: Vec<StoreCode>,
}

impl StoreStatusBuckets {
    pub fn total(&self) -> usize {
        self.profit_improving.len()
            + self.profit_deteriorating.len()
            + self.loss_improving.len()
            + self.loss_deteriorating.len()
    }
}

// ── P&L file ───────────────────────────────────────────────────────

/// One P&L line. Only the first three fields are always exported; the
/// rest feed the profit waterfall when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlLine {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub net_sales: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub tag_sales: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub operating_profit: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cogs: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub gross_profit: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub direct_cost: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub direct_profit: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sga: f64,
}

/// Sub-entity breakdowns inside one P&L granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlSegment {
    Total,
    Hk,
    Mc,
    Offline,
    Discovery,
}

impl PlSegment {
    /// Display order of the summary table.
    pub const ORDER: [PlSegment; 5] = [
        PlSegment::Total,
        PlSegment::Hk,
        PlSegment::Mc,
        PlSegment::Offline,
        PlSegment::Discovery,
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlPeriod {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: PlLine,
    #[serde(default)]
    pub hk: Option<PlLine>,
    #[serde(default)]
    pub mc: Option<PlLine>,
    #[serde(default)]
    pub offline: Option<PlLine>,
    #[serde(default)]
    pub discovery: Option<PlLine>,
}

impl PlPeriod {
    pub fn segment(&self, segment: PlSegment) -> Option<&PlLine> {
        match segment {
            PlSegment::Total => Some(&self.total),
            PlSegment::Hk => self.hk.as_ref(),
            PlSegment::Mc => self.mc.as_ref(),
            PlSegment::Offline => self.offline.as_ref(),
            PlSegment::Discovery => self.discovery.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlCumulative {
    #[serde(flatten)]
    pub period: PlPeriod,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prev_cumulative: PlPeriod,
}

/// `{entity}-pl-data[-{period}].json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_month: PlPeriod,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prev_month: PlPeriod,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cumulative: PlCumulative,
}

impl PlSnapshot {
    /// The P&L block for `span`.
    pub fn period(&self, span: Span) -> &PlPeriod {
        match span {
            Span::Current => &self.current_month,
            Span::Previous => &self.prev_month,
            Span::Cumulative => &self.cumulative.period,
            Span::PreviousCumulative => &self.cumulative.prev_cumulative,
        }
    }
}
