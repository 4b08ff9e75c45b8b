//! Shared primitive types used across the whole report pipeline.

use crate::error::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A store code, unique within one entity's store set.
pub type StoreCode = String;

/// Legal entity a snapshot belongs to. The lowercase code is the file prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Hk,
    Tw,
}

impl Entity {
    pub fn code(&self) -> &'static str {
        match self {
            Entity::Hk => "hk",
            Entity::Tw => "tw",
        }
    }

    pub fn all() -> [Entity; 2] {
        [Entity::Hk, Entity::Tw]
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Entity {
    type Err = ReportError;

    fn from_str(s: &str) -> ReportResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hk" => Ok(Entity::Hk),
            "tw" => Ok(Entity::Tw),
            other => Err(ReportError::UnknownEntity { code: other.to_string() }),
        }
    }
}
