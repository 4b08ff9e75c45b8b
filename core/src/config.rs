use crate::{
    error::{ReportError, ReportResult},
    types::{Entity, StoreCode},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Store scope rules ──────────────────────────────────────────────

/// Which stores count geographically. Prefix rules follow the store-code
/// convention: `M` = Hong Kong or Macau, `MC` = Macau.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoScope {
    /// Code starts with `M`.
    HkAndMacau,
    /// Code starts with `M` but not `MC`.
    HkOnly,
    /// `country == "MC"`.
    MacauOnly,
    /// Every store in the entity's set.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelScope {
    /// `channel != "Online"` and no online code prefix.
    Offline,
    Online,
    All,
}

/// A satellite store code whose sales roll into a parent location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRule {
    pub satellite: StoreCode,
    pub parent:    StoreCode,
}

/// Discount rate = (tag - net × multiplier) / tag × 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountPolicy {
    pub net_sales_multiplier: f64,
}

impl DiscountPolicy {
    pub const PLAIN: DiscountPolicy = DiscountPolicy { net_sales_multiplier: 1.0 };
}

/// How stores are grouped into regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKey {
    /// The record's `country` field.
    Country,
    /// `region` from the store-locations file.
    LocationRegion,
    /// `city` from the store-locations file.
    LocationCity,
}

// ── Entity profile ─────────────────────────────────────────────────

/// Every entity-specific constant the report formulas depend on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityProfile {
    pub entity: Entity,
    pub label: String,
    /// Only records of this brand participate.
    pub brand: String,
    /// Scope of the headline per-area metric.
    pub area_geo: GeoScope,
    pub area_channel: ChannelScope,
    /// Codes with these prefixes are online stores whatever their channel says.
    #[serde(default)]
    pub online_code_prefixes: Vec<String>,
    #[serde(default)]
    pub merge_rules: Vec<MergeRule>,
    /// Closed stores below this many thousand-currency per pyeong are
    /// treated as liquidating and drop out of area totals.
    pub liquidation_threshold: f64,
    pub discount: DiscountPolicy,
    pub region_key: RegionKey,
    /// Store scope of the regional comparison.
    pub region_geo: GeoScope,
    /// Fixed display order of regions.
    pub regions: Vec<String>,
    /// Fixed display order of channels.
    pub channels: Vec<String>,
}

impl EntityProfile {
    pub fn hong_kong() -> Self {
        Self {
            entity: Entity::Hk,
            label: "Hong Kong / Macau".into(),
            brand: "MLB".into(),
            area_geo: GeoScope::HkOnly,
            area_channel: ChannelScope::Offline,
            online_code_prefixes: vec![],
            merge_rules: vec![MergeRule {
                satellite: "M10A".into(),
                parent:    "M10".into(),
            }],
            liquidation_threshold: 1.0,
            discount: DiscountPolicy::PLAIN,
            region_key: RegionKey::Country,
            region_geo: GeoScope::HkAndMacau,
            regions: vec!["HK".into(), "MC".into()],
            channels: default_channels(),
        }
    }

    pub fn taiwan() -> Self {
        Self {
            entity: Entity::Tw,
            label: "Taiwan".into(),
            brand: "MLB".into(),
            area_geo: GeoScope::All,
            area_channel: ChannelScope::Offline,
            online_code_prefixes: vec!["TE".into()],
            merge_rules: vec![],
            liquidation_threshold: 1.0,
            discount: DiscountPolicy { net_sales_multiplier: 1.05 },
            region_key: RegionKey::LocationRegion,
            region_geo: GeoScope::All,
            regions: vec!["North".into(), "Central".into(), "South".into()],
            channels: default_channels(),
        }
    }
}

fn default_channels() -> Vec<String> {
    vec!["Retail".into(), "Outlet".into(), "Online".into()]
}

// ── Config file ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct ProfilesFile {
    profiles: Vec<EntityProfile>,
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub profiles: HashMap<Entity, EntityProfile>,
}

impl ReportConfig {
    /// Load from `{data_dir}/config/report_profiles.json`.
    /// Entities the file does not mention keep their built-in profile.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/config/report_profiles.json");
        Self::load_file(&path)
    }

    pub fn load_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: ProfilesFile = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;

        let mut config = Self::builtin();
        for profile in file.profiles {
            if profile.regions.is_empty() {
                anyhow::bail!("{path}: profile '{}' has no regions", profile.entity);
            }
            config.profiles.insert(profile.entity, profile);
        }
        Ok(config)
    }

    /// Hard-coded profiles for both entities. Used in tests and when no
    /// config file is supplied.
    pub fn builtin() -> Self {
        let profiles = [EntityProfile::hong_kong(), EntityProfile::taiwan()]
            .into_iter()
            .map(|p| (p.entity, p))
            .collect();
        Self { profiles }
    }

    pub fn profile(&self, entity: Entity) -> ReportResult<&EntityProfile> {
        self.profiles
            .get(&entity)
            .ok_or_else(|| ReportError::ProfileNotFound { entity: entity.to_string() })
    }
}
