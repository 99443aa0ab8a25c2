// 📋 Load Report - what the pipeline skipped or could not place
//
// Rows are never rejected loudly: a unit without an ID is dropped, a fleet row
// pointing at an unknown unit is never retrieved. The counters here make
// those silent paths visible to the caller.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Rows read from the unit sheet
    pub unit_rows: usize,
    /// Units placed in the tree
    pub units_built: usize,
    /// Unit rows dropped because their join key was empty
    pub skipped_without_id: usize,
    /// Unit rows repeating an ID already seen in this load
    pub duplicate_unit_ids: usize,
    /// Repeated rows dropped under the strict-unique policy
    pub duplicates_rejected: usize,

    pub vehicles_attached: usize,
    pub people_attached: usize,

    /// Fleet/personnel rows with no owning-unit column at all
    pub fleet_rows_without_unit: usize,
    pub personnel_rows_without_unit: usize,

    /// Fleet/personnel rows whose unit never appears in the unit sheet
    pub orphan_fleet_rows: usize,
    pub orphan_personnel_rows: usize,

    /// Units placed under the unknown-city sentinel
    pub unknown_cities: usize,
}

impl LoadReport {
    pub fn summary(&self) -> String {
        format!(
            "Units: {}/{} built ({} without ID, {} duplicate IDs), Vehicles: {}, People: {}, Orphans: {} fleet / {} personnel",
            self.units_built,
            self.unit_rows,
            self.skipped_without_id,
            self.duplicate_unit_ids,
            self.vehicles_attached,
            self.people_attached,
            self.orphan_fleet_rows,
            self.orphan_personnel_rows,
        )
    }

    /// True when any row was skipped, rejected or left unplaced
    pub fn has_gaps(&self) -> bool {
        self.skipped_without_id > 0
            || self.duplicates_rejected > 0
            || self.fleet_rows_without_unit > 0
            || self.personnel_rows_without_unit > 0
            || self.orphan_fleet_rows > 0
            || self.orphan_personnel_rows > 0
    }

    /// Share of unit rows that made it into the tree (1.0 for an empty sheet)
    pub fn unit_coverage(&self) -> f64 {
        if self.unit_rows == 0 {
            1.0
        } else {
            self.units_built as f64 / self.unit_rows as f64
        }
    }
}
