//! Data sources and the snapshot fallback chain.
//!
//! RULE: Only this module reads snapshot files.
//! Sections receive a fully loaded `ReportInput` and never touch a source.
//!
//! For a periodic dataset the loader tries, in order:
//!   1. `{entity}-{dataset}-{YYMM}.json` from the primary source
//!   2. `{entity}-{dataset}.json` from the primary source
//!   3. the same two names from the fallback source, when one is configured
//!
//! A file that exists but does not parse counts as a failed attempt.
//! There is no retry: once the chain is exhausted the dataset is
//! unavailable. Independent datasets are loaded in parallel.

use crate::{
    error::{ReportError, ReportResult},
    period::ReportPeriod,
    section::ReportInput,
    snapshot::{DashboardSnapshot, PlSnapshot, StoreAreas, StoreLocations, StoreStatusBuckets},
    types::Entity,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Anything that can hand back the raw text of a named file.
pub trait DataSource: Send + Sync {
    /// Stable name used in logs and error messages.
    fn name(&self) -> &str;

    /// Return the file's contents, or `FileNotFound` / an I/O error.
    fn read(&self, file_name: &str) -> ReportResult<String>;
}

// ── Sources ────────────────────────────────────────────────────────

/// Files under a directory on disk.
pub struct DirSource {
    name: String,
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            name: format!("dir:{}", root.display()),
            root,
        }
    }
}

impl DataSource for DirSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, file_name: &str) -> ReportResult<String> {
        let path = self.root.join(file_name);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ReportError::FileNotFound {
                source_name: self.name.clone(),
                name:        file_name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Files held in memory. Used by tests and by callers that already have
/// the JSON text.
#[derive(Default)]
pub struct MemorySource {
    name:  String,
    files: HashMap<String, String>,
}

impl MemorySource {
    pub fn new(name: &str) -> Self {
        Self {
            name:  name.to_string(),
            files: HashMap::new(),
        }
    }

    pub fn with_file(mut self, file_name: &str, content: impl Into<String>) -> Self {
        self.files.insert(file_name.to_string(), content.into());
        self
    }
}

impl DataSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, file_name: &str) -> ReportResult<String> {
        self.files
            .get(file_name)
            .cloned()
            .ok_or_else(|| ReportError::FileNotFound {
                source_name: self.name.clone(),
                name:        file_name.to_string(),
            })
    }
}

/// Default snapshots compiled into the binary, the last link in the chain.
pub struct BundledSource;

const BUNDLED_FILES: &[(&str, &str)] = &[
    ("hk-dashboard-data.json", include_str!("../bundled/hk-dashboard-data.json")),
    ("hk-pl-data.json", include_str!("../bundled/hk-pl-data.json")),
    ("hk-store-areas.json", include_str!("../bundled/hk-store-areas.json")),
    ("hk-store-locations.json", include_str!("../bundled/hk-store-locations.json")),
    ("tw-dashboard-data.json", include_str!("../bundled/tw-dashboard-data.json")),
    ("tw-pl-data.json", include_str!("../bundled/tw-pl-data.json")),
    ("tw-store-areas.json", include_str!("../bundled/tw-store-areas.json")),
    ("tw-store-locations.json", include_str!("../bundled/tw-store-locations.json")),
];

impl DataSource for BundledSource {
    fn name(&self) -> &str {
        "bundled"
    }

    fn read(&self, file_name: &str) -> ReportResult<String> {
        BUNDLED_FILES
            .iter()
            .find(|(name, _)| *name == file_name)
            .map(|(_, content)| content.to_string())
            .ok_or_else(|| ReportError::FileNotFound {
                source_name: "bundled".into(),
                name:        file_name.to_string(),
            })
    }
}

// ── Datasets ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Dashboard,
    ProfitLoss,
    StoreAreas,
    StoreLocations,
    StoreStatus,
}

impl Dataset {
    pub fn stem(&self) -> &'static str {
        match self {
            Dataset::Dashboard => "dashboard-data",
            Dataset::ProfitLoss => "pl-data",
            Dataset::StoreAreas => "store-areas",
            Dataset::StoreLocations => "store-locations",
            Dataset::StoreStatus => "store-status",
        }
    }

    /// Periodic datasets carry a `-{YYMM}` suffix.
    pub fn is_periodic(&self) -> bool {
        matches!(self, Dataset::Dashboard | Dataset::ProfitLoss)
    }

    /// File names to try, most specific first.
    pub fn candidates(&self, entity: Entity, period: ReportPeriod) -> Vec<String> {
        let base = format!("{}-{}", entity.code(), self.stem());
        if self.is_periodic() {
            vec![format!("{base}-{}.json", period.code()), format!("{base}.json")]
        } else {
            vec![format!("{base}.json")]
        }
    }
}

/// Where a dataset was finally read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetOrigin {
    pub dataset: Dataset,
    pub source:  String,
    pub file:    String,
    /// True when the period-specific file was not the one used.
    pub fell_back: bool,
}

#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value:  T,
    pub origin: DatasetOrigin,
}

// ── Loader ─────────────────────────────────────────────────────────

pub struct SnapshotLoader {
    primary:  Box<dyn DataSource>,
    fallback: Option<Box<dyn DataSource>>,
}

impl SnapshotLoader {
    pub fn new(primary: Box<dyn DataSource>) -> Self {
        Self { primary, fallback: None }
    }

    /// Directory source with the bundled snapshots as last resort.
    pub fn with_bundled(primary: Box<dyn DataSource>) -> Self {
        Self {
            primary,
            fallback: Some(Box::new(BundledSource)),
        }
    }

    pub fn fallback(mut self, source: Box<dyn DataSource>) -> Self {
        self.fallback = Some(source);
        self
    }

    /// Walk the fallback chain for one dataset.
    pub fn fetch<T: DeserializeOwned>(
        &self,
        dataset: Dataset,
        entity: Entity,
        period: ReportPeriod,
    ) -> ReportResult<Loaded<T>> {
        let candidates = dataset.candidates(entity, period);
        let sources = std::iter::once(self.primary.as_ref()).chain(self.fallback.as_deref());

        let mut tried = Vec::new();
        for (source_idx, source) in sources.enumerate() {
            for (file_idx, file) in candidates.iter().enumerate() {
                tried.push(format!("{}/{}", source.name(), file));
                let content = match source.read(file) {
                    Ok(c) => c,
                    Err(ReportError::FileNotFound { .. }) => {
                        log::debug!("{entity} {dataset:?}: {file} not in {}", source.name());
                        continue;
                    }
                    Err(e) => {
                        log::warn!("{entity} {dataset:?}: reading {file} from {} failed: {e}", source.name());
                        continue;
                    }
                };
                match serde_json::from_str::<T>(&content) {
                    Ok(value) => {
                        let fell_back = source_idx > 0 || (dataset.is_periodic() && file_idx > 0);
                        if fell_back {
                            log::warn!(
                                "{entity} {dataset:?}: no data for {period}, using {} from {}",
                                file,
                                source.name()
                            );
                        }
                        return Ok(Loaded {
                            value,
                            origin: DatasetOrigin {
                                dataset,
                                source: source.name().to_string(),
                                file: file.clone(),
                                fell_back,
                            },
                        });
                    }
                    Err(e) => {
                        log::warn!("{entity} {dataset:?}: {file} from {} is malformed: {e}", source.name());
                    }
                }
            }
        }

        Err(ReportError::DataUnavailable {
            dataset: format!("{entity} {}", dataset.stem()),
            tried,
        })
    }

    /// Load every dataset a report needs. The dashboard is required; the
    /// others degrade to empty when unavailable.
    pub fn load_input(&self, entity: Entity, period: ReportPeriod) -> ReportResult<ReportInput> {
        let (dashboard, pl, areas, locations, status) = std::thread::scope(|s| {
            let dashboard = s.spawn(|| self.fetch::<DashboardSnapshot>(Dataset::Dashboard, entity, period));
            let pl = s.spawn(|| self.fetch::<PlSnapshot>(Dataset::ProfitLoss, entity, period));
            let areas = s.spawn(|| self.fetch::<StoreAreas>(Dataset::StoreAreas, entity, period));
            let locations =
                s.spawn(|| self.fetch::<StoreLocations>(Dataset::StoreLocations, entity, period));
            let status =
                s.spawn(|| self.fetch::<StoreStatusBuckets>(Dataset::StoreStatus, entity, period));
            (
                join(dashboard.join()),
                join(pl.join()),
                join(areas.join()),
                join(locations.join()),
                join(status.join()),
            )
        });

        let dashboard = dashboard?;
        let mut origins = vec![dashboard.origin];

        let pl = optional(pl, &mut origins);
        let areas = optional(areas, &mut origins).unwrap_or_default();
        let locations = optional(locations, &mut origins).unwrap_or_default();
        let status = optional(status, &mut origins);

        log::info!(
            "{entity} {period}: loaded {} stores, {} areas, {} locations",
            dashboard.value.store_summary.len(),
            areas.len(),
            locations.len()
        );

        Ok(ReportInput {
            entity,
            period,
            dashboard: dashboard.value.normalize(),
            pl,
            areas,
            locations,
            status,
            origins,
        })
    }
}

type JoinResult<T> = std::thread::Result<ReportResult<Loaded<T>>>;

fn join<T>(result: JoinResult<T>) -> ReportResult<Loaded<T>> {
    result.unwrap_or_else(|_| Err(anyhow::anyhow!("loader thread panicked").into()))
}

fn optional<T>(result: ReportResult<Loaded<T>>, origins: &mut Vec<DatasetOrigin>) -> Option<T> {
    match result {
        Ok(loaded) => {
            origins.push(loaded.origin);
            Some(loaded.value)
        }
        Err(e) => {
            log::warn!("{e}; continuing without it");
            None
        }
    }
}
