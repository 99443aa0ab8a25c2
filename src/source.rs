// 📂 Workbook Sources
//
// A workbook is a set of named sheets, each a list of rows. Workbooks arrive
// as a spreadsheet file (xlsx/xls/ods via calamine), a JSON export
// (`{"SHEET": [{"col": value}, ...]}`) or a directory with one CSV per sheet.
// Fetching is the only place a load suspends.

use crate::error::{LoadError, Result};
use crate::normalize::{CellValue, Row};
use calamine::{Data, Range, Reader};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};

// ============================================================================
// WORKBOOK
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: BTreeMap<String, Vec<Row>>,
}

impl Workbook {
    pub fn new() -> Self {
        Workbook::default()
    }

    pub fn with_sheet(mut self, name: &str, rows: Vec<Row>) -> Self {
        self.sheets.insert(name.to_string(), rows);
        self
    }

    pub fn insert_sheet(&mut self, name: String, rows: Vec<Row>) {
        self.sheets.insert(name, rows);
    }

    /// Rows of a sheet; a missing sheet is an empty table
    ///
    /// Exact name first, then a trimmed case-insensitive match, since sheet
    /// names drift the same way column names do. Several folded matches
    /// resolve to the first name in sorted order.
    pub fn sheet(&self, name: &str) -> &[Row] {
        if let Some(rows) = self.sheets.get(name) {
            return rows;
        }

        let wanted = name.trim().to_lowercase();
        self.sheets
            .iter()
            .find(|(sheet, _)| sheet.trim().to_lowercase() == wanted)
            .map(|(_, rows)| rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }
}

// ============================================================================
// SOURCE TRAIT
// ============================================================================

/// Anything that can produce a workbook
pub trait WorkbookSource: Send + Sync {
    /// Human-readable origin, for logs
    fn describe(&self) -> String;

    /// Retrieve and decode the whole workbook
    fn fetch(&self) -> impl Future<Output = Result<Workbook>> + Send;
}

/// Workbook already in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook(pub Workbook);

impl WorkbookSource for MemoryWorkbook {
    fn describe(&self) -> String {
        "in-memory workbook".to_string()
    }

    fn fetch(&self) -> impl Future<Output = Result<Workbook>> + Send {
        let workbook = self.0.clone();
        async move { Ok(workbook) }
    }
}

// ============================================================================
// JSON WORKBOOK
// ============================================================================

#[derive(Debug, Clone)]
pub struct JsonWorkbook {
    path: PathBuf,
}

impl JsonWorkbook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonWorkbook { path: path.into() }
    }
}

impl WorkbookSource for JsonWorkbook {
    fn describe(&self) -> String {
        format!("JSON workbook {}", self.path.display())
    }

    fn fetch(&self) -> impl Future<Output = Result<Workbook>> + Send {
        let path = self.path.clone();
        async move {
            let bytes = tokio::fs::read(&path).await.map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            parse_json_workbook(&bytes, &path)
        }
    }
}

/// Decode a JSON workbook export
///
/// Sheets that are not arrays are ignored, as are array items that are not
/// objects; neither is fatal.
pub fn parse_json_workbook(bytes: &[u8], path: &Path) -> Result<Workbook> {
    use serde_json::Value;

    let root: Value = serde_json::from_slice(bytes).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let sheets = match root {
        Value::Object(sheets) => sheets,
        _ => {
            return Err(LoadError::Layout {
                path: path.to_path_buf(),
                message: "top level must be an object of sheets".to_string(),
            })
        }
    };

    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let Value::Array(items) = rows else {
            tracing::warn!(sheet = %name, "sheet is not an array of rows; ignored");
            continue;
        };

        let rows: Vec<Row> = items
            .iter()
            .filter_map(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .map(|(k, v)| (k.clone(), CellValue::from(v)))
                    .collect()
            })
            .collect();

        workbook.insert_sheet(name, rows);
    }

    Ok(workbook)
}

// ============================================================================
// CSV DIRECTORY WORKBOOK
// ============================================================================

/// A directory holding one `<SHEET>.csv` per sheet
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvWorkbook { dir: dir.into() }
    }
}

impl WorkbookSource for CsvWorkbook {
    fn describe(&self) -> String {
        format!("CSV workbook {}", self.dir.display())
    }

    fn fetch(&self) -> impl Future<Output = Result<Workbook>> + Send {
        let dir = self.dir.clone();
        async move {
            let io_err = |path: &Path| {
                let path = path.to_path_buf();
                move |source| LoadError::Io { path, source }
            };

            let mut entries = tokio::fs::read_dir(&dir).await.map_err(io_err(dir.as_path()))?;
            let mut workbook = Workbook::new();

            while let Some(entry) = entries.next_entry().await.map_err(io_err(dir.as_path()))? {
                let path = entry.path();
                let is_csv = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false);
                if !is_csv {
                    continue;
                }

                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let name = name.to_string();

                let bytes = tokio::fs::read(&path).await.map_err(io_err(path.as_path()))?;
                let rows = parse_csv_sheet(&bytes, &path)?;
                workbook.insert_sheet(name, rows);
            }

            Ok(workbook)
        }
    }
}

/// Decode one CSV sheet. Header row gives the column names; blank cells
/// become `CellValue::Empty`. Bytes that are not UTF-8 (Windows-1252
/// exports) are replaced rather than failing the sheet.
pub fn parse_csv_sheet(bytes: &[u8], path: &Path) -> Result<Vec<Row>> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    let mut rows = Vec::new();

    for record in reader.byte_records() {
        let record = record.map_err(csv_err)?;

        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| {
                let cell = String::from_utf8_lossy(cell);
                let value = if cell.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(cell.into_owned())
                };
                (header.clone(), value)
            })
            .collect();

        rows.push(row);
    }

    Ok(rows)
}

// ============================================================================
// SPREADSHEET WORKBOOK
// ============================================================================

/// An xlsx/xlsm/xlsb/xls/ods file, every worksheet read
#[derive(Debug, Clone)]
pub struct XlsxWorkbook {
    path: PathBuf,
}

impl XlsxWorkbook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        XlsxWorkbook { path: path.into() }
    }
}

impl WorkbookSource for XlsxWorkbook {
    fn describe(&self) -> String {
        format!("spreadsheet {}", self.path.display())
    }

    fn fetch(&self) -> impl Future<Output = Result<Workbook>> + Send {
        let path = self.path.clone();
        async move {
            let task_path = path.clone();
            tokio::task::spawn_blocking(move || read_spreadsheet(&task_path))
                .await
                .map_err(|e| LoadError::Layout {
                    path,
                    message: format!("spreadsheet reader task failed: {}", e),
                })?
        }
    }
}

/// Decode every worksheet of a spreadsheet file. A worksheet that cannot be
/// read is skipped; a file that cannot be opened fails.
pub fn read_spreadsheet(path: &Path) -> Result<Workbook> {
    let mut sheets = calamine::open_workbook_auto(path).map_err(|source| {
        LoadError::Spreadsheet {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let mut workbook = Workbook::new();
    for name in sheets.sheet_names() {
        match sheets.worksheet_range(&name) {
            Ok(range) => workbook.insert_sheet(name, rows_from_range(&range)),
            Err(error) => {
                tracing::warn!(sheet = %name, %error, "worksheet unreadable; ignored");
            }
        }
    }

    Ok(workbook)
}

/// First row of the range gives the column names
pub fn rows_from_range(range: &Range<Data>) -> Vec<Row> {
    let mut lines = range.rows();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header.iter().map(|h| h.to_string()).collect();

    lines
        .map(|cells| {
            headers
                .iter()
                .zip(cells)
                .filter(|(header, _)| !header.trim().is_empty())
                .map(|(header, cell)| (header.clone(), cell_from_data(cell)))
                .collect()
        })
        .collect()
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

// ============================================================================
// PATH-BASED SOURCE
// ============================================================================

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Workbook chosen by what the path points at
#[derive(Debug, Clone)]
pub enum WorkbookFile {
    Json(JsonWorkbook),
    Csv(CsvWorkbook),
    Xlsx(XlsxWorkbook),
}

/// Directory -> CSV sheets, spreadsheet extension -> calamine, anything
/// else -> JSON export
pub fn open_workbook(path: impl AsRef<Path>) -> WorkbookFile {
    let path = path.as_ref();
    let is_spreadsheet = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| SPREADSHEET_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false);

    if path.is_dir() {
        WorkbookFile::Csv(CsvWorkbook::new(path))
    } else if is_spreadsheet {
        WorkbookFile::Xlsx(XlsxWorkbook::new(path))
    } else {
        WorkbookFile::Json(JsonWorkbook::new(path))
    }
}

impl WorkbookSource for WorkbookFile {
    fn describe(&self) -> String {
        match self {
            WorkbookFile::Json(w) => w.describe(),
            WorkbookFile::Csv(w) => w.describe(),
            WorkbookFile::Xlsx(w) => w.describe(),
        }
    }

    fn fetch(&self) -> impl Future<Output = Result<Workbook>> + Send {
        let this = self.clone();
        async move {
            match this {
                WorkbookFile::Json(w) => w.fetch().await,
                WorkbookFile::Csv(w) => w.fetch().await,
                WorkbookFile::Xlsx(w) => w.fetch().await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_workbook() {
        let json = r#"{
            "UNIDADES": [
                {"ID": 42, "AISP": "1", "NOME": "1º BPM", "OBS": null},
                "not a row"
            ],
            "NOTAS": "ignored"
        }"#;
        let wb = parse_json_workbook(json.as_bytes(), Path::new("dados.json")).unwrap();

        let units = wb.sheet("UNIDADES");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].get("ID"), Some(&CellValue::Number(42.0)));
        assert_eq!(units[0].get("OBS"), Some(&CellValue::Empty));
        assert_eq!(units[0].get("NOME"), Some(&CellValue::Text("1º BPM".into())));
        assert_eq!(wb.sheet_names(), vec!["UNIDADES"]);
    }

    #[test]
    fn test_parse_json_workbook_rejects_non_object_root() {
        let err = parse_json_workbook(b"[1, 2]", Path::new("x.json")).unwrap_err();
        assert!(matches!(err, LoadError::Layout { .. }));
        assert_eq!(err.path(), Path::new("x.json"));
    }

    #[test]
    fn test_parse_json_workbook_rejects_garbage() {
        let err = parse_json_workbook(b"PK\x03\x04", Path::new("x.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
    }

    #[test]
    fn test_parse_csv_sheet() {
        let csv = "ID,AISP,CIDADE\n042,1,Teresina\n7,, \n";
        let rows = parse_csv_sheet(csv.as_bytes(), Path::new("UNIDADES.csv")).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("ID"), Some(&CellValue::Text("042".into())));
        assert_eq!(rows[1].get("AISP"), Some(&CellValue::Empty));
        assert_eq!(rows[1].get("CIDADE"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_parse_csv_sheet_tolerates_latin1() {
        let csv = b"ID,AISP,CIDADE\n1,1,Parna\xEDba\n2,1,Picos\n";
        let rows = parse_csv_sheet(csv, Path::new("UNIDADES.csv")).unwrap();

        assert_eq!(rows.len(), 2);
        let Some(CellValue::Text(city)) = rows[0].get("CIDADE") else {
            panic!("city cell missing");
        };
        assert!(city.starts_with("Parna"));
        assert!(city.ends_with("ba"));
        assert_eq!(rows[1].get("CIDADE"), Some(&CellValue::Text("Picos".into())));
    }

    #[tokio::test]
    async fn test_csv_workbook_with_latin1_sheet_loads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("UNIDADES.csv"),
            b"ID,AISP,CIDADE\n1,1,Parna\xEDba\n2,1,Picos\n",
        )
        .unwrap();

        let wb = CsvWorkbook::new(dir.path()).fetch().await.unwrap();
        assert_eq!(wb.sheet("UNIDADES").len(), 2);
    }

    #[test]
    fn test_rows_from_range() {
        let mut range = Range::new((0, 0), (2, 2));
        range.set_value((0, 0), Data::String("ID".into()));
        range.set_value((0, 1), Data::String("AISP".into()));
        range.set_value((0, 2), Data::String("ATIVO".into()));
        range.set_value((1, 0), Data::Float(42.0));
        range.set_value((1, 1), Data::String("01".into()));
        range.set_value((1, 2), Data::Bool(true));
        range.set_value((2, 0), Data::Int(7));
        range.set_value((2, 1), Data::String("  ".into()));

        let rows = rows_from_range(&range);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("ID"), Some(&CellValue::Number(42.0)));
        assert_eq!(rows[0].get("AISP"), Some(&CellValue::Text("01".into())));
        assert_eq!(rows[0].get("ATIVO"), Some(&CellValue::Bool(true)));
        assert_eq!(rows[1].get("ID"), Some(&CellValue::Number(7.0)));
        assert_eq!(rows[1].get("AISP"), Some(&CellValue::Empty));
        assert_eq!(rows[1].get("ATIVO"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_rows_from_empty_range() {
        let range: Range<Data> = Range::empty();
        assert!(rows_from_range(&range).is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_spreadsheet_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dados.xlsx");
        std::fs::write(&path, "not a zip archive").unwrap();

        let source = open_workbook(&path);
        assert!(matches!(source, WorkbookFile::Xlsx(_)));
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, LoadError::Spreadsheet { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn test_open_workbook_picks_source_by_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(open_workbook(dir.path()), WorkbookFile::Csv(_)));
        assert!(matches!(open_workbook("dados.XLSX"), WorkbookFile::Xlsx(_)));
        assert!(matches!(open_workbook("dados.ods"), WorkbookFile::Xlsx(_)));
        assert!(matches!(open_workbook("dados.json"), WorkbookFile::Json(_)));
    }

    #[test]
    fn test_missing_sheet_is_empty() {
        let wb = Workbook::new();
        assert!(wb.sheet("FROTA").is_empty());
    }

    #[test]
    fn test_sheet_lookup_ignores_case() {
        let wb = Workbook::new().with_sheet(" Frota ", vec![Row::new()]);
        assert_eq!(wb.sheet("FROTA").len(), 1);
    }

    #[test]
    fn test_sheet_lookup_picks_first_sorted_fold_match() {
        let wb = Workbook::new()
            .with_sheet("frota ", vec![Row::new(), Row::new()])
            .with_sheet("Frota", vec![Row::new()]);

        for _ in 0..8 {
            assert_eq!(wb.sheet("FROTA").len(), 1);
        }
        assert_eq!(wb.sheet_names(), vec!["Frota", "frota "]);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = JsonWorkbook::new("/nonexistent/dados.json");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[tokio::test]
    async fn test_csv_workbook_reads_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("FROTA.csv"), "id_unidade,PLACA\n1,AAA1111\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let wb = CsvWorkbook::new(dir.path()).fetch().await.unwrap();
        assert_eq!(wb.sheet_names(), vec!["FROTA"]);
        assert_eq!(wb.sheet("FROTA").len(), 1);
    }
}
