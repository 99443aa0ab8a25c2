// 🌳 Hierarchy Builder
//
// One pass over the unit rows, in source order, growing the
// Area -> City -> Building -> Unit tree and hanging fleet and personnel off
// each unit. No row can fail the pass: missing fields fall back to sentinels,
// units without an ID are skipped and counted.

use crate::entities::{Area, Person, Unit, Vehicle};
use crate::index::CrossIndex;
use crate::normalize::{join_key, CellValue, Row};
use crate::report::LoadReport;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// DUPLICATE POLICY
// ============================================================================

/// What to do when a unit ID shows up on more than one row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateUnitPolicy {
    /// Every row becomes its own Unit entry
    #[default]
    PermitDuplicates,

    /// First row wins; later rows with the same ID are dropped
    StrictUnique,
}

// ============================================================================
// BUILDER
// ============================================================================

pub struct HierarchyBuilder<'a> {
    schema: &'a Schema,
    index: &'a CrossIndex,
    policy: DuplicateUnitPolicy,

    areas: Vec<Area>,
    /// Area join key -> position in `areas`
    area_positions: HashMap<String, usize>,
    seen_units: HashSet<String>,
    report: LoadReport,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(schema: &'a Schema, index: &'a CrossIndex, policy: DuplicateUnitPolicy) -> Self {
        HierarchyBuilder {
            schema,
            index,
            policy,
            areas: Vec::new(),
            area_positions: HashMap::new(),
            seen_units: HashSet::new(),
            report: LoadReport::default(),
        }
    }

    /// Place one normalized unit row into the tree
    pub fn push_row(&mut self, row: &Row) {
        self.report.unit_rows += 1;

        let schema = self.schema;
        let cols = &schema.units;
        let sentinels = &schema.sentinels;

        let unit_key = cols.id.key(row);
        if unit_key.is_empty() {
            self.report.skipped_without_id += 1;
            tracing::trace!(row = self.report.unit_rows, "unit row without ID skipped");
            return;
        }

        if !self.seen_units.insert(unit_key.clone()) {
            self.report.duplicate_unit_ids += 1;
            if self.policy == DuplicateUnitPolicy::StrictUnique {
                self.report.duplicates_rejected += 1;
                tracing::debug!(unit = %unit_key, "duplicate unit ID rejected");
                return;
            }
        }

        let area_id = cols.area.text_or(row, &sentinels.no_area);
        let building_name = cols.building.text_or(row, &sentinels.no_building);
        let unit_name = cols
            .name
            .text_or(row, &format!("{} {}", sentinels.unit_name_prefix, unit_key));
        let hierarchy = cols.hierarchy.text_or(row, &sentinels.no_hierarchy);
        let city_name = self.city_for(row, &building_name);
        let area_pos = self.area_position(&area_id);

        let unit = Unit {
            original_id: cols.original_id.text(row),
            name: unit_name,
            hierarchy,
            area_id: self.areas[area_pos].id.clone(),
            building_id: building_name.clone(),
            fleet: self.vehicles_for(&unit_key),
            people: self.people_for(&unit_key),
            id: unit_key,
        };

        self.report.units_built += 1;
        self.report.vehicles_attached += unit.fleet.len();
        self.report.people_attached += unit.people.len();

        self.areas[area_pos]
            .city_mut_or_insert(&city_name)
            .building_mut_or_insert(&building_name)
            .units
            .push(unit);
    }

    /// Unit row's own city, then the building sheet's, then the sentinel
    fn city_for(&mut self, row: &Row, building_name: &str) -> String {
        let schema = self.schema;

        let own = schema.units.city.text(row);
        if !own.is_empty() {
            return own;
        }

        let from_building = self
            .index
            .building(building_name)
            .map(|b| schema.buildings.city.text(b))
            .unwrap_or_default();
        if !from_building.is_empty() {
            return from_building;
        }

        self.report.unknown_cities += 1;
        schema.sentinels.unknown_city.clone()
    }

    /// Areas are matched on the join key, so "01" and 1 are one Area; the
    /// first spelling seen becomes its id
    fn area_position(&mut self, area_id: &str) -> usize {
        let area_key = join_key(&CellValue::Text(area_id.to_string()));
        if let Some(&pos) = self.area_positions.get(&area_key) {
            return pos;
        }

        let schema = self.schema;
        let cmd_cols = &schema.commanders;
        let commander = self.index.commander(&area_key);
        let delegate_pc = commander
            .map(|row| cmd_cols.delegate_pc.text(row))
            .unwrap_or_default();
        let commander_pm = commander
            .map(|row| cmd_cols.commander_pm.text(row))
            .unwrap_or_default();

        let name = format!("{} {}", schema.sentinels.area_name_prefix, area_id);
        self.areas.push(Area::new(
            area_id.to_string(),
            name,
            delegate_pc,
            commander_pm,
        ));

        let pos = self.areas.len() - 1;
        self.area_positions.insert(area_key, pos);
        pos
    }

    fn vehicles_for(&self, unit_key: &str) -> Vec<Vehicle> {
        let cols = &self.schema.fleet;
        let sentinels = &self.schema.sentinels;

        self.index
            .fleet_for(unit_key)
            .iter()
            .enumerate()
            .map(|(i, row)| Vehicle {
                id: cols.id.text_or(row, &format!("fleet-{}-{}", unit_key, i)),
                model: cols.model.text_or(row, &sentinels.vehicle_model),
                plate: cols.plate.text_or(row, &sentinels.vehicle_plate),
                kind: cols.kind.text_or(row, &sentinels.vehicle_kind),
                unit_id: unit_key.to_string(),
            })
            .collect()
    }

    fn people_for(&self, unit_key: &str) -> Vec<Person> {
        let cols = &self.schema.personnel;
        let sentinels = &self.schema.sentinels;

        self.index
            .people_for(unit_key)
            .iter()
            .enumerate()
            .map(|(i, row)| Person {
                id: cols.id.text_or(row, &format!("person-{}-{}", unit_key, i)),
                name: cols.name.text_or(row, &sentinels.person_name),
                role: cols.role.text_or(row, &sentinels.person_role),
                unit_id: unit_key.to_string(),
            })
            .collect()
    }

    /// Close the pass. Areas come back in first-seen order; sorting is the
    /// finalizer's job.
    pub fn finish(mut self) -> (Vec<Area>, LoadReport) {
        self.report.fleet_rows_without_unit = self.index.fleet_without_unit();
        self.report.personnel_rows_without_unit = self.index.personnel_without_unit();
        self.report.orphan_fleet_rows = self.index.orphan_fleet_rows(&self.seen_units);
        self.report.orphan_personnel_rows = self.index.orphan_personnel_rows(&self.seen_units);

        (self.areas, self.report)
    }
}

/// Build the unsorted tree from normalized unit rows
pub fn build_tree(
    units: &[Row],
    index: &CrossIndex,
    schema: &Schema,
    policy: DuplicateUnitPolicy,
) -> (Vec<Area>, LoadReport) {
    let mut builder = HierarchyBuilder::new(schema, index, policy);
    for row in units {
        builder.push_row(row);
    }
    builder.finish()
}

// ============================================================================
// TESTS
// ============================================================================
