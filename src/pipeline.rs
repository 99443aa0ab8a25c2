// ⚙️ Pipeline - normalize -> index -> build -> finalize
//
// Pure and synchronous: all row sets must be in memory before the tree is
// built. Running it twice on the same tables yields equal trees.

use crate::entities::{Area, Unit};
use crate::finalize::finalize;
use crate::hierarchy::{build_tree, DuplicateUnitPolicy};
use crate::index::CrossIndex;
use crate::normalize::{normalize_rows, Row};
use crate::report::LoadReport;
use crate::schema::{Schema, SheetNames};
use crate::source::Workbook;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// INPUTS
// ============================================================================

/// The five row sets the pipeline consumes, as read from the sources
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTables {
    pub units: Vec<Row>,
    pub fleet: Vec<Row>,
    pub buildings: Vec<Row>,
    pub commanders: Vec<Row>,
    pub personnel: Vec<Row>,
}

impl SourceTables {
    /// Pick the sheets out of the unit and personnel workbooks
    pub fn from_workbooks(units: &Workbook, personnel: &Workbook, sheets: &SheetNames) -> Self {
        let tables = SourceTables {
            units: units.sheet(&sheets.units).to_vec(),
            fleet: units.sheet(&sheets.fleet).to_vec(),
            buildings: units.sheet(&sheets.buildings).to_vec(),
            commanders: units.sheet(&sheets.commanders).to_vec(),
            personnel: personnel.sheet(&sheets.personnel).to_vec(),
        };

        tracing::debug!(
            units = tables.units.len(),
            fleet = tables.fleet.len(),
            buildings = tables.buildings.len(),
            commanders = tables.commanders.len(),
            personnel = tables.personnel.len(),
            "source sheets selected"
        );

        tables
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub schema: Schema,
    pub duplicate_policy: DuplicateUnitPolicy,
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Finalized tree plus what it took to build it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hierarchy {
    pub areas: Vec<Area>,
    pub report: LoadReport,
    pub loaded_at: DateTime<Utc>,
}

impl Hierarchy {
    pub fn empty() -> Self {
        Hierarchy {
            areas: Vec::new(),
            report: LoadReport::default(),
            loaded_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn area(&self, id: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }

    /// All units carrying this join key, in tree order
    pub fn units_by_id<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Unit> + 'a {
        self.areas
            .iter()
            .flat_map(|a| a.units())
            .filter(move |u| u.id == id)
    }

    pub fn unit_count(&self) -> usize {
        self.areas.iter().map(|a| a.units().count()).sum()
    }
}

// ============================================================================
// BUILD
// ============================================================================

/// Run the whole pipeline over in-memory tables
pub fn build_hierarchy(tables: &SourceTables, options: &LoadOptions) -> Hierarchy {
    let schema = &options.schema;

    let units = normalize_rows(&tables.units);
    let index = CrossIndex::build(
        &normalize_rows(&tables.fleet),
        &normalize_rows(&tables.personnel),
        &normalize_rows(&tables.buildings),
        &normalize_rows(&tables.commanders),
        schema,
    );

    let (areas, report) = build_tree(&units, &index, schema, options.duplicate_policy);
    let areas = finalize(areas);

    Hierarchy {
        areas,
        report,
        loaded_at: Utc::now(),
    }
}
