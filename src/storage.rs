// Storage Gateway - canonical CSV store plus CSV/JSON interchange

use crate::models::{CandidateRecord, Operation, OperationKind, IMPORT_FALLBACK_DATE};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the canonical store.
pub const DEFAULT_DATA_FILE: &str = "data.csv";

// ============================================================================
// EXCHANGE FORMAT
// ============================================================================

/// Interchange format for export/import. Unlike the canonical store, an
/// interchange file does not need to preserve id continuity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeFormat {
    Csv,
    Json,
}

impl ExchangeFormat {
    /// Human-readable name for display.
    pub fn name(&self) -> &str {
        match self {
            ExchangeFormat::Csv => "CSV",
            ExchangeFormat::Json => "JSON",
        }
    }

    /// Guess the format from a file extension (`.csv` / `.json`).
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "csv" => Some(ExchangeFormat::Csv),
            "json" => Some(ExchangeFormat::Json),
            _ => None,
        }
    }
}

// ============================================================================
// STORAGE
// ============================================================================

/// Gateway between the in-memory ledger and the filesystem.
///
/// Two responsibilities, kept separate: the canonical store (`load`/`save`,
/// one file that is the source of truth across runs, id continuity
/// included) and interchange (`export`/`import`, arbitrary paths, ids
/// treated as placeholders).
///
/// No recoverable condition escapes as an error: load/import degrade to
/// empty results and save/export report failure as `false`. A single bad
/// row must never cost the rest of a file's worth of history, so row-level
/// corruption is skipped, not fatal.
pub struct Storage {
    data_file: PathBuf,
}

impl Storage {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Storage {
            data_file: data_file.into(),
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Load the canonical store.
    ///
    /// A missing file is not an error: it yields an empty ledger with
    /// `next_id = 1`. Rows that fail to parse (missing column, bad number,
    /// unknown kind label) are skipped one by one; a total read failure
    /// degrades to the empty result as well. `next_id` is `max(id) + 1`
    /// over whatever loaded, or 1.
    pub fn load(&self) -> (Vec<Operation>, u64) {
        if !self.data_file.exists() {
            return (Vec::new(), 1);
        }

        let operations = match read_operations(&self.data_file) {
            Ok(operations) => operations,
            Err(_) => return (Vec::new(), 1),
        };

        let next_id = operations.iter().map(|op| op.id).max().unwrap_or(0) + 1;
        (operations, next_id)
    }

    /// Write the full operation sequence to the canonical store.
    ///
    /// The data goes to a temporary file first and is renamed into place,
    /// so a failed write never leaves a half-written store behind.
    pub fn save(&self, operations: &[Operation]) -> bool {
        write_store_atomic(&self.data_file, operations).is_ok()
    }

    /// Write the given sequence to an arbitrary path in the chosen
    /// interchange format. Same contract as `save`: boolean result, no
    /// propagated error.
    pub fn export(&self, operations: &[Operation], path: &Path, format: ExchangeFormat) -> bool {
        let result = match format {
            ExchangeFormat::Csv => write_csv(path, operations),
            ExchangeFormat::Json => write_json(path, operations),
        };
        result.is_ok()
    }

    /// Parse an arbitrary file into candidate records.
    ///
    /// Candidates are loosely typed, not validated operations: `amount` is
    /// the one field that must parse, everything else is defaulted (blank
    /// category/description, sentinel date, `expense` kind, placeholder id
    /// 0). Malformed records are skipped individually; a missing file or a
    /// total parse failure yields an empty list.
    pub fn import(&self, path: &Path, format: ExchangeFormat) -> Vec<CandidateRecord> {
        if !path.exists() {
            return Vec::new();
        }

        let result = match format {
            ExchangeFormat::Csv => import_csv(path),
            ExchangeFormat::Json => import_json(path),
        };
        result.unwrap_or_default()
    }
}

impl Default for Storage {
    fn default() -> Self {
        Storage::new(DEFAULT_DATA_FILE)
    }
}

// ============================================================================
// CANONICAL STORE I/O
// ============================================================================

fn read_operations(path: &Path) -> Result<Vec<Operation>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut operations = Vec::new();
    for row in reader.deserialize::<Operation>() {
        // Row-level corruption loses that row only, never the whole file.
        match row {
            Ok(operation) => operations.push(operation),
            Err(_) => continue,
        }
    }

    Ok(operations)
}

fn write_store_atomic(path: &Path, operations: &[Operation]) -> Result<()> {
    let tmp = path.with_extension("tmp");

    let written = write_csv(&tmp, operations)
        .and_then(|_| fs::rename(&tmp, path).context("failed to replace canonical store"));
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn write_csv(path: &Path, operations: &[Operation]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    // The header row (id,amount,category,date,type,description) comes from
    // the Operation field order on the first serialize call.
    for operation in operations {
        writer
            .serialize(operation)
            .context("failed to write operation row")?;
    }
    writer.flush().context("failed to flush CSV writer")?;
    Ok(())
}

fn write_json(path: &Path, operations: &[Operation]) -> Result<()> {
    // serde_json leaves non-ASCII text unescaped, so categories and
    // descriptions stay readable in the exported file.
    let body = serde_json::to_string_pretty(operations).context("failed to serialize operations")?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

// ============================================================================
// IMPORT
// ============================================================================

/// Row shape accepted by CSV import. Every column is optional so sparse
/// files still yield candidates; a cell that is present but unparseable
/// fails the whole row, which the read loop then skips.
#[derive(Debug, Deserialize)]
struct RawCsvRow {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn import_csv(path: &Path) -> Result<Vec<CandidateRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut candidates = Vec::new();
    for row in reader.deserialize::<RawCsvRow>() {
        let Ok(row) = row else { continue };
        if let Some(candidate) = candidate_from_csv_row(row) {
            candidates.push(candidate);
        }
    }
    Ok(candidates)
}

fn candidate_from_csv_row(row: RawCsvRow) -> Option<CandidateRecord> {
    let amount = row.amount?;
    Some(CandidateRecord {
        id: row.id.unwrap_or(0),
        amount,
        category: row.category.unwrap_or_default(),
        date: non_blank_or_sentinel(row.date),
        kind: kind_or_default(row.kind.as_deref()),
        description: row.description.unwrap_or_default(),
    })
}

fn import_json(path: &Path) -> Result<Vec<CandidateRecord>> {
    let body =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let data: Value = serde_json::from_str(&body).context("failed to parse JSON document")?;

    // Anything but a top-level array has no records to offer.
    let Value::Array(items) = data else {
        return Ok(Vec::new());
    };

    Ok(items.iter().filter_map(candidate_from_json_value).collect())
}

fn candidate_from_json_value(item: &Value) -> Option<CandidateRecord> {
    let amount = number_field(item, "amount")?;
    Some(CandidateRecord {
        id: number_field(item, "id").map(|id| id as u64).unwrap_or(0),
        amount,
        category: string_field(item, "category").unwrap_or_default(),
        date: non_blank_or_sentinel(string_field(item, "date")),
        kind: kind_or_default(string_field(item, "type").as_deref()),
        description: string_field(item, "description").unwrap_or_default(),
    })
}

/// Numeric field that also accepts numbers spelled as strings, which some
/// exporters produce.
fn number_field(item: &Value, key: &str) -> Option<f64> {
    match item.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn string_field(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
}

fn non_blank_or_sentinel(date: Option<String>) -> String {
    date.filter(|date| !date.is_empty())
        .unwrap_or_else(|| IMPORT_FALLBACK_DATE.to_string())
}

/// Unknown labels fall back to expense on import; the canonical loader
/// never gets here because its rows fail to deserialize instead.
fn kind_or_default(label: Option<&str>) -> OperationKind {
    label
        .and_then(|label| OperationKind::from_label(label.trim()).ok())
        .unwrap_or(OperationKind::Expense)
}

// ============================================================================
// TESTS
// ============================================================================
