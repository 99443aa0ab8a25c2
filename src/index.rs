// 🔗 Cross-Reference Indexer
//
// Four lookup tables built once per load from independently sourced sheets.
// No referential integrity is enforced: a fleet row pointing at a unit that
// never shows up is simply never retrieved.

use crate::normalize::{ColumnChain, Row};
use crate::schema::Schema;
use std::collections::{HashMap, HashSet};

// ============================================================================
// GROUPING HELPERS
// ============================================================================

/// Group rows by key, preserving source order within each group.
/// Returns the groups plus the number of rows that had no key.
pub fn group_by_key(rows: &[Row], chain: &ColumnChain) -> (HashMap<String, Vec<Row>>, usize) {
    let mut groups: HashMap<String, Vec<Row>> = HashMap::new();
    let mut unkeyed = 0;

    for row in rows {
        let key = chain.key(row);
        if key.is_empty() {
            unkeyed += 1;
            continue;
        }
        groups.entry(key).or_default().push(row.clone());
    }

    (groups, unkeyed)
}

/// One row per key; later rows overwrite earlier ones
pub fn last_by_key<F>(rows: &[Row], key_of: F) -> HashMap<String, Row>
where
    F: Fn(&Row) -> String,
{
    let mut out = HashMap::new();

    for row in rows {
        let key = key_of(row);
        if !key.is_empty() {
            out.insert(key, row.clone());
        }
    }

    out
}

// ============================================================================
// CROSS INDEX
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CrossIndex {
    fleet_by_unit: HashMap<String, Vec<Row>>,
    personnel_by_unit: HashMap<String, Vec<Row>>,
    building_by_name: HashMap<String, Row>,
    commander_by_area: HashMap<String, Row>,

    /// Rows that could not be indexed for lack of an owning-unit key
    fleet_without_unit: usize,
    personnel_without_unit: usize,
}

impl CrossIndex {
    /// Build all four tables. Input rows must already be normalized.
    pub fn build(
        fleet: &[Row],
        personnel: &[Row],
        buildings: &[Row],
        commanders: &[Row],
        schema: &Schema,
    ) -> Self {
        let (fleet_by_unit, fleet_without_unit) = group_by_key(fleet, &schema.fleet.unit);
        let (personnel_by_unit, personnel_without_unit) =
            group_by_key(personnel, &schema.personnel.unit);

        let building_by_name = last_by_key(buildings, |row| schema.buildings.name.text(row));
        let commander_by_area = last_by_key(commanders, |row| schema.commanders.area.key(row));

        tracing::debug!(
            fleet_groups = fleet_by_unit.len(),
            personnel_groups = personnel_by_unit.len(),
            buildings = building_by_name.len(),
            commanders = commander_by_area.len(),
            "cross index built"
        );

        CrossIndex {
            fleet_by_unit,
            personnel_by_unit,
            building_by_name,
            commander_by_area,
            fleet_without_unit,
            personnel_without_unit,
        }
    }

    /// Vehicle rows owned by a unit key; empty for unknown keys
    pub fn fleet_for(&self, unit_key: &str) -> &[Row] {
        self.fleet_by_unit
            .get(unit_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Personnel rows owned by a unit key; empty for unknown keys
    pub fn people_for(&self, unit_key: &str) -> &[Row] {
        self.personnel_by_unit
            .get(unit_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn building(&self, name: &str) -> Option<&Row> {
        self.building_by_name.get(name)
    }

    /// Commander row for an area, keyed by the area's join key
    pub fn commander(&self, area_key: &str) -> Option<&Row> {
        self.commander_by_area.get(area_key)
    }

    pub fn fleet_without_unit(&self) -> usize {
        self.fleet_without_unit
    }

    pub fn personnel_without_unit(&self) -> usize {
        self.personnel_without_unit
    }

    /// Fleet rows whose unit key is not in `claimed`
    pub fn orphan_fleet_rows(&self, claimed: &HashSet<String>) -> usize {
        count_unclaimed(&self.fleet_by_unit, claimed)
    }

    /// Personnel rows whose unit key is not in `claimed`
    pub fn orphan_personnel_rows(&self, claimed: &HashSet<String>) -> usize {
        count_unclaimed(&self.personnel_by_unit, claimed)
    }
}

fn count_unclaimed(groups: &HashMap<String, Vec<Row>>, claimed: &HashSet<String>) -> usize {
    groups
        .iter()
        .filter(|(key, _)| !claimed.contains(*key))
        .map(|(_, rows)| rows.len())
        .sum()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize_rows, CellValue};

    fn rows(data: &[&[(&str, &str)]]) -> Vec<Row> {
        let raw: Vec<Row> = data
            .iter()
            .map(|cells| {
                cells
                    .iter()
                    .map(|(k, v)| (k.to_string(), CellValue::from(*v)))
                    .collect()
            })
            .collect();
        normalize_rows(&raw)
    }

    #[test]
    fn test_fleet_grouped_by_normalized_unit_key() {
        let fleet = rows(&[
            &[("ID_UNIDADE", "042"), ("PLACA", "AAA1111")],
            &[("id_unidade", "42"), ("PLACA", "BBB2222")],
            &[("id_unidade", "7"), ("PLACA", "CCC3333")],
        ]);
        let index = CrossIndex::build(&fleet, &[], &[], &[], &Schema::default());

        assert_eq!(index.fleet_for("42").len(), 2);
        assert_eq!(index.fleet_for("7").len(), 1);
    }

    #[test]
    fn test_unit_key_synonym_fallback() {
        let fleet = rows(&[
            &[("unidade_id", "5"), ("PLACA", "AAA1111")],
            &[("id_unidade", "5"), ("unidade_id", "6"), ("PLACA", "BBB2222")],
        ]);
        let index = CrossIndex::build(&fleet, &[], &[], &[], &Schema::default());

        assert_eq!(index.fleet_for("5").len(), 2);
        assert!(index.fleet_for("6").is_empty());
    }

    #[test]
    fn test_absent_key_returns_empty_group() {
        let index = CrossIndex::build(&[], &[], &[], &[], &Schema::default());
        assert!(index.fleet_for("999").is_empty());
        assert!(index.people_for("999").is_empty());
        assert!(index.building("Sede").is_none());
        assert!(index.commander("1").is_none());
    }

    #[test]
    fn test_rows_without_unit_are_counted() {
        let fleet = rows(&[&[("PLACA", "AAA1111")], &[("id_unidade", "1")]]);
        let personnel = rows(&[&[("NOME", "Maria")]]);
        let index = CrossIndex::build(&fleet, &personnel, &[], &[], &Schema::default());

        assert_eq!(index.fleet_without_unit(), 1);
        assert_eq!(index.personnel_without_unit(), 1);
    }

    #[test]
    fn test_building_and_commander_last_write_wins() {
        let buildings = rows(&[
            &[("PREDIO", "Sede"), ("CIDADE", "Teresina")],
            &[("PREDIO", " Sede "), ("CIDADE", "Parnaíba")],
        ]);
        let commanders = rows(&[
            &[("AISP", "01"), ("RESPONSAVEL_PM", "Cel. A")],
            &[("AISP", "1"), ("RESPONSAVEL_PM", "Cel. B")],
        ]);
        let index = CrossIndex::build(&[], &[], &buildings, &commanders, &Schema::default());

        let sede = index.building("Sede").unwrap();
        assert_eq!(sede.get("cidade"), Some(&CellValue::from("Parnaíba")));

        let cmd = index.commander("1").unwrap();
        assert_eq!(cmd.get("responsavel_pm"), Some(&CellValue::from("Cel. B")));
    }

    #[test]
    fn test_orphan_counts() {
        let fleet = rows(&[
            &[("id_unidade", "1")],
            &[("id_unidade", "2")],
            &[("id_unidade", "2")],
        ]);
        let index = CrossIndex::build(&fleet, &[], &[], &[], &Schema::default());

        let claimed: HashSet<String> = ["1".to_string()].into_iter().collect();
        assert_eq!(index.orphan_fleet_rows(&claimed), 2);
        assert_eq!(index.orphan_personnel_rows(&claimed), 0);
    }
}
