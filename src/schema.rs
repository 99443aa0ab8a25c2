// 📐 Shape Layer - Sheet and column schema
//
// Source spreadsheets rename columns between releases. Every logical field
// is declared once here as a ColumnChain; nothing else in the crate spells
// a column name.

use crate::normalize::ColumnChain;
use serde::{Deserialize, Serialize};

// ============================================================================
// SHEET NAMES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    /// Unit workbook
    pub units: String,
    pub fleet: String,
    pub buildings: String,
    pub commanders: String,

    /// Personnel workbook
    pub personnel: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        SheetNames {
            units: "UNIDADES".to_string(),
            fleet: "FROTA".to_string(),
            buildings: "PRÉDIOS".to_string(),
            commanders: "RESPONSÁVEIS POR AISP".to_string(),
            personnel: "PESSOAL".to_string(),
        }
    }
}

// ============================================================================
// COLUMN CHAINS
// ============================================================================

/// Columns of the unit sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitColumns {
    pub id: ColumnChain,
    pub original_id: ColumnChain,
    pub area: ColumnChain,
    pub building: ColumnChain,
    pub name: ColumnChain,
    pub hierarchy: ColumnChain,
    pub city: ColumnChain,
}

impl Default for UnitColumns {
    fn default() -> Self {
        UnitColumns {
            id: ColumnChain::new(&["id_unidade", "id"]),
            original_id: ColumnChain::new(&["id"]),
            area: ColumnChain::new(&["aisp"]),
            building: ColumnChain::new(&["predio", "prédio"]),
            name: ColumnChain::new(&["nome", "unidade"]),
            hierarchy: ColumnChain::new(&["hierarquia", "hierarquia imediata", "dominio"]),
            city: ColumnChain::new(&["cidade"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetColumns {
    pub unit: ColumnChain,
    pub id: ColumnChain,
    pub model: ColumnChain,
    pub plate: ColumnChain,
    pub kind: ColumnChain,
}

impl Default for FleetColumns {
    fn default() -> Self {
        FleetColumns {
            unit: ColumnChain::new(&["id_unidade", "unidade_id"]),
            id: ColumnChain::new(&["id", "placa"]),
            model: ColumnChain::new(&["modelo"]),
            plate: ColumnChain::new(&["placa"]),
            kind: ColumnChain::new(&["tipo"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonnelColumns {
    pub unit: ColumnChain,
    pub id: ColumnChain,
    pub name: ColumnChain,
    pub role: ColumnChain,
}

impl Default for PersonnelColumns {
    fn default() -> Self {
        PersonnelColumns {
            unit: ColumnChain::new(&["id_unidade", "unidade_id"]),
            id: ColumnChain::new(&["id", "matricula", "matrícula"]),
            name: ColumnChain::new(&["nome"]),
            role: ColumnChain::new(&["cargo", "funcao", "função"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingColumns {
    pub name: ColumnChain,
    pub city: ColumnChain,
}

impl Default for BuildingColumns {
    fn default() -> Self {
        BuildingColumns {
            name: ColumnChain::new(&["predio", "prédio"]),
            city: ColumnChain::new(&["cidade"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommanderColumns {
    pub area: ColumnChain,
    pub commander_pm: ColumnChain,
    pub delegate_pc: ColumnChain,
}

impl Default for CommanderColumns {
    fn default() -> Self {
        CommanderColumns {
            area: ColumnChain::new(&["aisp"]),
            commander_pm: ColumnChain::new(&["responsavel_pm", "pm"]),
            delegate_pc: ColumnChain::new(&["responsavel_pc", "pc"]),
        }
    }
}

// ============================================================================
// SENTINELS
// ============================================================================

/// Placeholders substituted for absent source fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sentinels {
    pub no_area: String,
    pub no_building: String,
    pub unknown_city: String,
    pub no_hierarchy: String,
    pub vehicle_model: String,
    pub vehicle_plate: String,
    pub vehicle_kind: String,
    pub person_name: String,
    pub person_role: String,
    /// Prefix of the generated display name ("Unit 42")
    pub unit_name_prefix: String,
    /// Prefix of the area display name ("AISP 3")
    pub area_name_prefix: String,
}

impl Default for Sentinels {
    fn default() -> Self {
        Sentinels {
            no_area: "No Area".to_string(),
            no_building: "No Building".to_string(),
            unknown_city: "Unknown".to_string(),
            no_hierarchy: "---".to_string(),
            vehicle_model: "Vehicle".to_string(),
            vehicle_plate: "—".to_string(),
            vehicle_kind: "Patrol Vehicle".to_string(),
            person_name: "Unnamed".to_string(),
            person_role: "---".to_string(),
            unit_name_prefix: "Unit".to_string(),
            area_name_prefix: "AISP".to_string(),
        }
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub sheets: SheetNames,
    pub units: UnitColumns,
    pub fleet: FleetColumns,
    pub personnel: PersonnelColumns,
    pub buildings: BuildingColumns,
    pub commanders: CommanderColumns,
    pub sentinels: Sentinels,
}
