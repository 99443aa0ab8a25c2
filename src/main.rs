use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Use library instead of local modules
use org_hierarchy::{load_from_config, logging, Config, DuplicateUnitPolicy, Hierarchy};

#[derive(Parser)]
#[command(name = "org-hierarchy", version, about = "Territory -> city -> building -> unit viewer")]
struct Cli {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Unit workbook (xlsx/ods file, JSON export or directory of CSV sheets)
    #[arg(long, global = true)]
    units: Option<PathBuf>,

    /// Personnel workbook (xlsx/ods file, JSON export or directory of CSV sheets)
    #[arg(long, global = true)]
    personnel: Option<PathBuf>,

    /// Drop repeated unit IDs instead of keeping every row
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the indented hierarchy (default)
    Tree,
    /// Dump the finalized tree as JSON
    Json,
    /// Print the load report
    Report,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("warn");
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?.with_env_overrides(),
        None => Config::from_env(),
    };
    let mut config = config.with_overrides(cli.units.clone(), cli.personnel.clone());
    if cli.strict {
        config.duplicate_policy = DuplicateUnitPolicy::StrictUnique;
    }

    let outcome = load_from_config(&config).await;
    if let Some(err) = &outcome.error {
        eprintln!("❌ Could not load hierarchy: {}", err);
        eprintln!("   units:     {}", config.units_workbook.display());
        eprintln!("   personnel: {}", config.personnel_workbook.display());
        std::process::exit(1);
    }

    let hierarchy = outcome.hierarchy;
    match cli.command.unwrap_or(Command::Tree) {
        Command::Tree => print_tree(&hierarchy),
        Command::Json => {
            let json = serde_json::to_string_pretty(&hierarchy.areas)
                .context("Failed to serialize hierarchy")?;
            println!("{}", json);
        }
        Command::Report => print_report(&hierarchy),
    }

    Ok(())
}

fn print_tree(hierarchy: &Hierarchy) {
    if hierarchy.is_empty() {
        println!("No units found in the source workbooks.");
        return;
    }

    for area in &hierarchy.areas {
        println!("🗺️  {} ({} cities)", area.name, area.cities.len());
        if area.has_commander_data() {
            println!(
                "    PM: {}  |  PC: {}",
                display_or_dash(&area.commander_pm),
                display_or_dash(&area.delegate_pc)
            );
        }
        for city in &area.cities {
            println!("  🏙️  {}", city.name);
            for building in &city.buildings {
                println!("    🏢 {}", building.name);
                for unit in &building.units {
                    println!(
                        "      • [{}] {}  ({} vehicles, {} people)",
                        unit.original_id,
                        unit.name,
                        unit.vehicle_count(),
                        unit.headcount()
                    );
                }
            }
        }
    }

    println!("\n{}", hierarchy.report.summary());
}

fn print_report(hierarchy: &Hierarchy) {
    let r = &hierarchy.report;

    println!("📋 Load report ({})", hierarchy.loaded_at.to_rfc3339());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Unit rows:                  {}", r.unit_rows);
    println!("Units built:                {} ({:.1}%)", r.units_built, r.unit_coverage() * 100.0);
    println!("Skipped (no ID):            {}", r.skipped_without_id);
    println!("Duplicate unit IDs:         {}", r.duplicate_unit_ids);
    println!("Duplicates rejected:        {}", r.duplicates_rejected);
    println!("Vehicles attached:          {}", r.vehicles_attached);
    println!("People attached:            {}", r.people_attached);
    println!("Fleet rows, no unit:        {}", r.fleet_rows_without_unit);
    println!("Personnel rows, no unit:    {}", r.personnel_rows_without_unit);
    println!("Orphan fleet rows:          {}", r.orphan_fleet_rows);
    println!("Orphan personnel rows:      {}", r.orphan_personnel_rows);
    println!("Units in unknown city:      {}", r.unknown_cities);

    if r.has_gaps() {
        println!("\n⚠️  Some source rows were not placed in the tree");
    } else {
        println!("\n✅ Every row accounted for");
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "—"
    } else {
        value
    }
}
