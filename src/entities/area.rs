// 🗺️ Territory entities - Area -> City -> Building
//
// The three container levels of the tree. Lookups are linear scans: an area
// holds a handful of cities and a city a handful of buildings.

use super::unit::Unit;
use serde::{Deserialize, Serialize};

// ============================================================================
// AREA
// ============================================================================

/// Top-level territorial grouping (AISP)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: String,
    pub name: String,

    /// Police-civil delegate; "" when no commander row exists
    #[serde(rename = "delegatePC")]
    pub delegate_pc: String,

    /// Police-military commander; "" when no commander row exists
    #[serde(rename = "commanderPM")]
    pub commander_pm: String,

    pub cities: Vec<City>,
}

impl Area {
    pub fn new(id: String, name: String, delegate_pc: String, commander_pm: String) -> Self {
        Area {
            id,
            name,
            delegate_pc,
            commander_pm,
            cities: Vec::new(),
        }
    }

    /// Find a city by name, comparing case- and whitespace-folded
    pub fn city(&self, name: &str) -> Option<&City> {
        let key = fold_name(name);
        self.cities.iter().find(|c| fold_name(&c.name) == key)
    }

    pub fn city_mut_or_insert(&mut self, name: &str) -> &mut City {
        let key = fold_name(name);
        match self.cities.iter().position(|c| fold_name(&c.name) == key) {
            Some(idx) => &mut self.cities[idx],
            None => {
                self.cities.push(City::new(name.to_string()));
                let last = self.cities.len() - 1;
                &mut self.cities[last]
            }
        }
    }

    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.cities.iter().flat_map(|c| c.buildings.iter())
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.buildings().flat_map(|b| b.units.iter())
    }

    pub fn has_commander_data(&self) -> bool {
        !self.delegate_pc.is_empty() || !self.commander_pm.is_empty()
    }
}

// ============================================================================
// CITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub buildings: Vec<Building>,
}

impl City {
    pub fn new(name: String) -> Self {
        City {
            name,
            buildings: Vec::new(),
        }
    }

    pub fn building(&self, name: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.name == name)
    }

    pub fn building_mut_or_insert(&mut self, name: &str) -> &mut Building {
        match self.buildings.iter().position(|b| b.name == name) {
            Some(idx) => &mut self.buildings[idx],
            None => {
                self.buildings
                    .push(Building::new(name.to_string(), self.name.clone()));
                let last = self.buildings.len() - 1;
                &mut self.buildings[last]
            }
        }
    }
}

// ============================================================================
// BUILDING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Same value as `name`
    pub id: String,
    pub name: String,
    /// Owning city's name
    pub city: String,
    pub units: Vec<Unit>,
}

impl Building {
    pub fn new(name: String, city: String) -> Self {
        Building {
            id: name.clone(),
            name,
            city,
            units: Vec::new(),
        }
    }
}

/// Case- and whitespace-insensitive form of a display name
pub fn fold_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
