// Configuration - where the workbooks live and how to read them
//
// Resolution order: built-in defaults, then a JSON config file, then the
// ORG_HIERARCHY_* environment variables, then CLI flags (applied by the
// binaries).

use crate::hierarchy::DuplicateUnitPolicy;
use crate::pipeline::LoadOptions;
use crate::schema::Schema;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_UNITS: &str = "ORG_HIERARCHY_UNITS";
pub const ENV_PERSONNEL: &str = "ORG_HIERARCHY_PERSONNEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Unit/fleet/building/commander workbook (JSON export or CSV directory)
    pub units_workbook: PathBuf,

    /// Personnel workbook (JSON export or CSV directory)
    pub personnel_workbook: PathBuf,

    pub duplicate_policy: DuplicateUnitPolicy,

    pub schema: Schema,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            units_workbook: PathBuf::from("data/dados-gerais.json"),
            personnel_workbook: PathBuf::from("data/pessoal.json"),
            duplicate_policy: DuplicateUnitPolicy::default(),
            schema: Schema::default(),
        }
    }
}

impl Config {
    /// Read a JSON config file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Config::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var_os(ENV_UNITS).map(PathBuf::from),
            std::env::var_os(ENV_PERSONNEL).map(PathBuf::from),
        )
    }

    pub fn with_overrides(mut self, units: Option<PathBuf>, personnel: Option<PathBuf>) -> Self {
        if let Some(path) = units {
            self.units_workbook = path;
        }
        if let Some(path) = personnel {
            self.personnel_workbook = path;
        }
        self
    }

    pub fn options(&self) -> LoadOptions {
        LoadOptions {
            schema: self.schema.clone(),
            duplicate_policy: self.duplicate_policy,
        }
    }
}
