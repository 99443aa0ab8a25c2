// 🚚 Loader - the public "load organizational hierarchy" operation
//
// Fetches both workbooks concurrently, then runs the pipeline. A workbook
// that cannot be fetched fails the whole load: the caller gets an empty tree
// and the error, never a panic or a half-built tree.

use crate::config::Config;
use crate::entities::Area;
use crate::error::LoadError;
use crate::pipeline::{build_hierarchy, Hierarchy, LoadOptions, SourceTables};
use crate::source::{open_workbook, WorkbookSource};

/// Result of one load attempt
#[derive(Debug)]
pub struct LoadOutcome {
    pub hierarchy: Hierarchy,
    /// Set when a workbook could not be fetched; `hierarchy` is then empty
    pub error: Option<LoadError>,
}

impl LoadOutcome {
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_areas(self) -> Vec<Area> {
        self.hierarchy.areas
    }
}

/// Load from any pair of sources
pub async fn load_hierarchy<U, P>(units: &U, personnel: &P, options: &LoadOptions) -> LoadOutcome
where
    U: WorkbookSource,
    P: WorkbookSource,
{
    tracing::info!(
        units = %units.describe(),
        personnel = %personnel.describe(),
        "loading organizational hierarchy"
    );

    let (unit_book, personnel_book) = tokio::join!(units.fetch(), personnel.fetch());

    let (unit_book, personnel_book) = match (unit_book, personnel_book) {
        (Ok(u), Ok(p)) => (u, p),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, "workbook fetch failed; returning empty hierarchy");
            return LoadOutcome {
                hierarchy: Hierarchy::empty(),
                error: Some(e),
            };
        }
    };

    let tables = SourceTables::from_workbooks(&unit_book, &personnel_book, &options.schema.sheets);
    let hierarchy = build_hierarchy(&tables, options);

    tracing::info!(
        areas = hierarchy.areas.len(),
        units = hierarchy.report.units_built,
        vehicles = hierarchy.report.vehicles_attached,
        people = hierarchy.report.people_attached,
        "hierarchy loaded"
    );
    if hierarchy.report.has_gaps() {
        tracing::warn!(report = %hierarchy.report.summary(), "some rows were not placed");
    }

    LoadOutcome {
        hierarchy,
        error: None,
    }
}

/// Load using the workbook paths and options of a config
pub async fn load_from_config(config: &Config) -> LoadOutcome {
    let units = open_workbook(&config.units_workbook);
    let personnel = open_workbook(&config.personnel_workbook);
    load_hierarchy(&units, &personnel, &config.options()).await
}

/// Finalized, sorted area list; empty when either workbook is unavailable
pub async fn load_organization_hierarchy(config: &Config) -> Vec<Area> {
    load_from_config(config).await.into_areas()
}
