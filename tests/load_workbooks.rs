// End-to-end loads from workbooks on disk

use org_hierarchy::{
    load_hierarchy, load_organization_hierarchy, Config, CsvWorkbook, DuplicateUnitPolicy,
    JsonWorkbook, LoadOptions,
};
use std::fs;
use std::path::Path;

const UNITS_JSON: &str = r#"{
    "UNIDADES": [
        {"ID": "042", "AISP": "10", "CIDADE": "Zeta", "PREDIO": "Quartel", "NOME": "2º BPM", "HIERARQUIA IMEDIATA": "CPM"},
        {"ID": 7, "AISP": "2", "PREDIO": "Sede", "NOME": "Delegacia Regional"},
        {"ID": "", "AISP": "2", "NOME": "Sem ID"},
        {"id_unidade": "8", "AISP": "1", "CIDADE": "Alpha", "PREDIO": "Anexo"},
        {"ID": "7", "AISP": "2", "PREDIO": "Sede", "NOME": "Delegacia Regional (2)"}
    ],
    "FROTA": [
        {"ID_UNIDADE": 42, "MODELO": "Hilux", "PLACA": "PIA1234", "TIPO": "Viatura"},
        {"id_unidade": "42"},
        {"id_unidade": "999", "MODELO": "Orphan"}
    ],
    "PRÉDIOS": [
        {"PREDIO": "Sede", "CIDADE": "Parnaíba"}
    ],
    "RESPONSÁVEIS POR AISP": [
        {"AISP": "2", "RESPONSAVEL_PM": "Cel. Lima", "RESPONSAVEL_PC": "Dr. Rocha"}
    ]
}"#;

const PERSONNEL_JSON: &str = r#"{
    "PESSOAL": [
        {"ID_UNIDADE": "0007", "NOME": "Ana Costa", "CARGO": "Escrivã"},
        {"ID_UNIDADE": "8", "NOME": "João Lima"}
    ]
}"#;

fn write_json_workbooks(dir: &Path) -> (JsonWorkbook, JsonWorkbook) {
    let units = dir.join("dados-gerais.json");
    let personnel = dir.join("pessoal.json");
    fs::write(&units, UNITS_JSON).unwrap();
    fs::write(&personnel, PERSONNEL_JSON).unwrap();
    (JsonWorkbook::new(units), JsonWorkbook::new(personnel))
}

#[tokio::test]
async fn test_json_workbooks_build_sorted_tree() {
    let dir = tempfile::tempdir().unwrap();
    let (units, personnel) = write_json_workbooks(dir.path());

    let outcome = load_hierarchy(&units, &personnel, &LoadOptions::default()).await;
    assert!(!outcome.is_failure());
    let h = outcome.hierarchy;

    let ids: Vec<&str> = h.areas.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "10"]);

    // zero-padded unit joins numeric fleet key
    let unit42 = h.units_by_id("42").next().unwrap();
    assert_eq!(unit42.original_id, "042");
    assert_eq!(unit42.hierarchy, "CPM");
    assert_eq!(unit42.fleet.len(), 2);
    assert_eq!(unit42.fleet[1].model, "Vehicle");

    // city from building sheet, commander data present
    let area2 = h.area("2").unwrap();
    assert_eq!(area2.cities[0].name, "Parnaíba");
    assert_eq!(area2.commander_pm, "Cel. Lima");
    assert_eq!(area2.delegate_pc, "Dr. Rocha");

    // no commander row: empty fields, area still present
    let area10 = h.area("10").unwrap();
    assert_eq!(area10.commander_pm, "");
    assert_eq!(area10.delegate_pc, "");

    // duplicates kept by default, both carry personnel
    let sevens: Vec<_> = h.units_by_id("7").collect();
    assert_eq!(sevens.len(), 2);
    assert_eq!(sevens[0].people[0].role, "Escrivã");

    let unit8 = h.units_by_id("8").next().unwrap();
    assert_eq!(unit8.people[0].role, "---");

    assert_eq!(h.report.unit_rows, 5);
    assert_eq!(h.report.units_built, 4);
    assert_eq!(h.report.skipped_without_id, 1);
    assert_eq!(h.report.duplicate_unit_ids, 1);
    assert_eq!(h.report.orphan_fleet_rows, 1);
}

#[tokio::test]
async fn test_strict_policy_drops_repeated_units() {
    let dir = tempfile::tempdir().unwrap();
    let (units, personnel) = write_json_workbooks(dir.path());

    let options = LoadOptions {
        duplicate_policy: DuplicateUnitPolicy::StrictUnique,
        ..Default::default()
    };
    let h = load_hierarchy(&units, &personnel, &options).await.hierarchy;

    let sevens: Vec<_> = h.units_by_id("7").collect();
    assert_eq!(sevens.len(), 1);
    assert_eq!(sevens[0].name, "Delegacia Regional");
    assert_eq!(h.report.duplicates_rejected, 1);
}

#[tokio::test]
async fn test_csv_and_json_workbooks_agree() {
    let dir = tempfile::tempdir().unwrap();

    let json_units = dir.path().join("units.json");
    let json_personnel = dir.path().join("personnel.json");
    fs::write(
        &json_units,
        r#"{"UNIDADES": [{"ID": "3", "AISP": "1", "CIDADE": "Picos", "PREDIO": "Sede"}],
            "FROTA": [{"id_unidade": "3", "PLACA": "AAA1111"}]}"#,
    )
    .unwrap();
    fs::write(&json_personnel, r#"{"PESSOAL": [{"id_unidade": "3", "NOME": "Ana"}]}"#).unwrap();

    let csv_units = dir.path().join("units");
    let csv_personnel = dir.path().join("personnel");
    fs::create_dir(&csv_units).unwrap();
    fs::create_dir(&csv_personnel).unwrap();
    fs::write(csv_units.join("UNIDADES.csv"), "ID,AISP,CIDADE,PREDIO\n003,1,Picos,Sede\n").unwrap();
    fs::write(csv_units.join("FROTA.csv"), "id_unidade,PLACA\n3,AAA1111\n").unwrap();
    fs::write(csv_personnel.join("PESSOAL.csv"), "id_unidade,NOME\n3,Ana\n").unwrap();

    let options = LoadOptions::default();
    let from_json = load_hierarchy(
        &JsonWorkbook::new(&json_units),
        &JsonWorkbook::new(&json_personnel),
        &options,
    )
    .await
    .hierarchy;
    let from_csv = load_hierarchy(
        &CsvWorkbook::new(&csv_units),
        &CsvWorkbook::new(&csv_personnel),
        &options,
    )
    .await
    .hierarchy;

    // original_id keeps source formatting, everything else matches
    let json_unit = from_json.units_by_id("3").next().unwrap();
    let csv_unit = from_csv.units_by_id("3").next().unwrap();
    assert_eq!(json_unit.original_id, "3");
    assert_eq!(csv_unit.original_id, "003");
    assert_eq!(json_unit.fleet, csv_unit.fleet);
    assert_eq!(json_unit.people, csv_unit.people);
    assert_eq!(from_json.report, from_csv.report);
}

#[tokio::test]
async fn test_unreadable_workbook_yields_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let units = dir.path().join("dados-gerais.json");
    fs::write(&units, b"PK\x03\x04 not json").unwrap();

    let config =
        Config::default().with_overrides(Some(units), Some(dir.path().join("missing.json")));
    let areas = load_organization_hierarchy(&config).await;
    assert!(areas.is_empty());
}

#[tokio::test]
async fn test_reload_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let (units, personnel) = write_json_workbooks(dir.path());
    let options = LoadOptions::default();

    let first = load_hierarchy(&units, &personnel, &options).await.hierarchy;
    let second = load_hierarchy(&units, &personnel, &options).await.hierarchy;
    assert_eq!(first.areas, second.areas);
}
