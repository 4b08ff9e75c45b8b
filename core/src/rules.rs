//! Store selection: which codes count toward an aggregate, and with
//! which figures.
//!
//! Order of operations for each candidate store:
//!   1. brand filter
//!   2. satellite codes are folded into their parent and skipped
//!   3. geography and channel filters (on the parent's own record)
//!   4. liquidation threshold, on the merged sales of the span being read
//!   5. zero-area exclusion (area-weighted selections only)
//!
//! A per-area metric must take its numerator and its denominator from the
//! same `Selection`. Current and prior-year figures are separate selections
//! because the liquidation rule reads each span's own sales.

use crate::{
    config::{ChannelScope, EntityProfile, GeoScope},
    metrics::UNITS_PER_THOUSAND,
    period::Span,
    snapshot::{DashboardSnapshot, StoreAreas, StoreRecord},
    types::StoreCode,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const ONLINE_CHANNEL: &str = "Online";
pub const MACAU_COUNTRY: &str = "MC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionBasis {
    /// Every filtered store. Stores without a qualifying area carry area 0.
    Sales,
    /// Only stores that contribute floor area.
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Closed and selling below the liquidation threshold per pyeong.
    Liquidating,
    /// No floor area on file.
    NoArea,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub code:   StoreCode,
    pub reason: ExclusionReason,
}

/// One store as it enters an aggregate, satellites already folded in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedStore {
    pub code:          StoreCode,
    pub store_name:    String,
    pub country:       String,
    pub channel:       String,
    pub closed:        bool,
    pub sales:         f64,
    pub tag_sales:     f64,
    /// 0 when the store does not count toward area totals.
    pub area:          f64,
    pub direct_profit: f64,
    pub rent:          f64,
    pub labor_cost:    f64,
    /// Satellite codes whose figures were added into this entry.
    pub merged:        Vec<StoreCode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub span:     Span,
    pub basis:    SelectionBasis,
    pub stores:   Vec<SelectedStore>,
    /// Stores that passed the filters but were kept out of area totals.
    pub excluded: Vec<Exclusion>,
}

impl Selection {
    pub fn codes(&self) -> Vec<&str> {
        self.stores.iter().map(|s| s.code.as_str()).collect()
    }

    pub fn get(&self, code: &str) -> Option<&SelectedStore> {
        self.stores.iter().find(|s| s.code == code)
    }

    pub fn total_sales(&self) -> f64 {
        self.stores.iter().map(|s| s.sales).sum()
    }

    pub fn total_area(&self) -> f64 {
        self.stores.iter().map(|s| s.area).sum()
    }

    pub fn is_excluded(&self, code: &str) -> Option<ExclusionReason> {
        self.excluded.iter().find(|e| e.code == code).map(|e| e.reason)
    }
}

// ── Filters ────────────────────────────────────────────────────────

pub fn geo_matches(geo: GeoScope, record: &StoreRecord) -> bool {
    let code = record.code.as_str();
    match geo {
        GeoScope::HkAndMacau => code.starts_with('M'),
        GeoScope::HkOnly => code.starts_with('M') && !code.starts_with("MC"),
        GeoScope::MacauOnly => record.country == MACAU_COUNTRY,
        GeoScope::All => true,
    }
}

/// Online by channel label or by code prefix (e.g. `TE` in Taiwan).
pub fn is_online(record: &StoreRecord, online_prefixes: &[String]) -> bool {
    record.channel == ONLINE_CHANNEL
        || online_prefixes
            .iter()
            .any(|p| !p.is_empty() && record.code.starts_with(p.as_str()))
}

pub fn channel_matches(channel: ChannelScope, record: &StoreRecord, online_prefixes: &[String]) -> bool {
    match channel {
        ChannelScope::Offline => !is_online(record, online_prefixes),
        ChannelScope::Online => is_online(record, online_prefixes),
        ChannelScope::All => true,
    }
}

/// True when a closed store's per-area sales fall under `threshold`
/// (thousand-currency per pyeong). Stores without area never qualify.
pub fn is_liquidating(closed: bool, net_sales: f64, area: f64, threshold: f64) -> bool {
    if !closed || area <= 0.0 {
        return false;
    }
    let provisional = (net_sales / UNITS_PER_THOUSAND) / area;
    provisional < threshold
}

// ── Selector ───────────────────────────────────────────────────────

/// Applies one profile's rules under a chosen geography and channel scope.
#[derive(Debug, Clone)]
pub struct Selector<'a> {
    profile: &'a EntityProfile,
    geo:     GeoScope,
    channel: ChannelScope,
}

impl<'a> Selector<'a> {
    pub fn new(profile: &'a EntityProfile, geo: GeoScope, channel: ChannelScope) -> Self {
        Self { profile, geo, channel }
    }

    /// The scope of the profile's headline per-area metric.
    pub fn area_scope(profile: &'a EntityProfile) -> Self {
        Self::new(profile, profile.area_geo, profile.area_channel)
    }

    pub fn matches(&self, record: &StoreRecord) -> bool {
        record.brand == self.profile.brand
            && geo_matches(self.geo, record)
            && channel_matches(self.channel, record, &self.profile.online_code_prefixes)
    }

    pub fn select(
        &self,
        dashboard: &DashboardSnapshot,
        areas: &StoreAreas,
        span: Span,
        basis: SelectionBasis,
    ) -> Selection {
        let satellites = self.satellites_by_parent(dashboard);
        let folded: HashMap<&str, &str> = satellites
            .iter()
            .flat_map(|(parent, sats)| sats.iter().map(move |s| (s.code.as_str(), *parent)))
            .collect();

        let mut stores = Vec::new();
        let mut excluded = Vec::new();

        for record in dashboard.stores() {
            if record.brand != self.profile.brand {
                continue;
            }
            if folded.contains_key(record.code.as_str()) {
                continue;
            }
            if !self.matches(record) {
                continue;
            }

            let own = record.figures(span);
            let mut store = SelectedStore {
                code:          record.code.clone(),
                store_name:    record.store_name.clone(),
                country:       record.country.clone(),
                channel:       record.channel.clone(),
                closed:        record.closed,
                sales:         own.net_sales,
                tag_sales:     own.tag_sales,
                area:          0.0,
                direct_profit: own.direct_profit,
                rent:          own.rent,
                labor_cost:    own.labor_cost,
                merged:        Vec::new(),
            };
            if let Some(sats) = satellites.get(record.code.as_str()) {
                for sat in sats {
                    let f = sat.figures(span);
                    store.sales += f.net_sales;
                    store.tag_sales += f.tag_sales;
                    store.direct_profit += f.direct_profit;
                    store.rent += f.rent;
                    store.labor_cost += f.labor_cost;
                    store.merged.push(sat.code.clone());
                }
            }

            let area = areas.area(&store.code);
            let exclusion = if area <= 0.0 {
                Some(ExclusionReason::NoArea)
            } else if is_liquidating(store.closed, store.sales, area, self.profile.liquidation_threshold) {
                log::debug!(
                    "{}: {} closed with {:.3}k/pyeong in {:?}, treated as liquidating",
                    self.profile.entity,
                    store.code,
                    store.sales / UNITS_PER_THOUSAND / area,
                    span
                );
                Some(ExclusionReason::Liquidating)
            } else {
                None
            };

            match exclusion {
                None => {
                    store.area = area;
                    stores.push(store);
                }
                Some(reason) => {
                    excluded.push(Exclusion { code: store.code.clone(), reason });
                    if basis == SelectionBasis::Sales {
                        stores.push(store);
                    }
                }
            }
        }

        Selection { span, basis, stores, excluded }
    }

    /// Parent code → satellite records, for rules whose parent is present.
    fn satellites_by_parent<'d>(
        &self,
        dashboard: &'d DashboardSnapshot,
    ) -> BTreeMap<&'d str, Vec<&'d StoreRecord>> {
        let mut map: BTreeMap<&'d str, Vec<&'d StoreRecord>> = BTreeMap::new();
        for rule in &self.profile.merge_rules {
            let Some(sat) = dashboard.store(&rule.satellite) else {
                continue;
            };
            if sat.brand != self.profile.brand {
                continue;
            }
            match dashboard.store_summary.get_key_value(&rule.parent) {
                Some((parent_code, parent)) if parent.brand == self.profile.brand => {
                    map.entry(parent_code.as_str()).or_default().push(sat);
                }
                _ => log::warn!(
                    "{}: satellite {} has no parent {} in this snapshot; kept standalone",
                    self.profile.entity,
                    rule.satellite,
                    rule.parent
                ),
            }
        }
        map
    }
}
