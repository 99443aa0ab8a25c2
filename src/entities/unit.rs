// 🚓 Unit entities - Unit + its fleet and personnel

use serde::{Deserialize, Serialize};

/// Organizational unit, the leaf container of the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    /// Join key (numeric-normalized)
    pub id: String,

    /// Identifier as formatted in the source sheet, for display
    pub original_id: String,

    pub name: String,

    /// Immediate-superior label; "---" when none recorded
    pub hierarchy: String,

    #[serde(rename = "aisp")]
    pub area_id: String,
    pub building_id: String,

    pub fleet: Vec<Vehicle>,
    pub people: Vec<Person>,
}

impl Unit {
    pub fn vehicle_count(&self) -> usize {
        self.fleet.len()
    }

    pub fn headcount(&self) -> usize {
        self.people.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub model: String,
    pub plate: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub unit_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    pub role: String,
    pub unit_id: String,
}
