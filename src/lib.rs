// Organizational Hierarchy - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod normalize;      // Row Normalizer - canonical keys and join keys
pub mod schema;         // Sheet names, column chains, sentinels
pub mod index;          // Cross-Reference Indexer
pub mod entities;       // Area / City / Building / Unit / Vehicle / Person
pub mod hierarchy;      // Hierarchy Builder
pub mod finalize;       // Tree Finalizer - ordering contracts
pub mod report;         // Load report counters
pub mod pipeline;       // normalize -> index -> build -> finalize
pub mod source;         // Workbook sources (JSON export, CSV directory)
pub mod loader;         // Async load entry points
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use normalize::{
    CellValue, ColumnChain, Row,
    join_key, norm_text, normalize_key, normalize_row, normalize_rows,
};
pub use schema::{
    Schema, SheetNames, Sentinels,
    UnitColumns, FleetColumns, PersonnelColumns, BuildingColumns, CommanderColumns,
};
pub use index::CrossIndex;
pub use entities::{Area, City, Building, Unit, Vehicle, Person};
pub use hierarchy::{HierarchyBuilder, DuplicateUnitPolicy, build_tree};
pub use finalize::{finalize, natural_cmp, collate_cmp};
pub use report::LoadReport;
pub use pipeline::{Hierarchy, LoadOptions, SourceTables, build_hierarchy};
pub use source::{
    Workbook, WorkbookSource, WorkbookFile,
    JsonWorkbook, CsvWorkbook, XlsxWorkbook, MemoryWorkbook, open_workbook,
};
pub use loader::{LoadOutcome, load_hierarchy, load_from_config, load_organization_hierarchy};
pub use config::Config;
pub use error::LoadError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
