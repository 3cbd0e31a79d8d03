//! ERP identification-type reference table
//!
//! Maps an ERP legal name ("RAZON SOCIAL DE LA ERP") to its identification
//! type code ("TIPO IDENTIFICACION ERP"). The table is loaded once per run,
//! never mutated afterwards, and shared behind an `Arc`.

use anyhow::{anyhow, Context};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;
use tracing::{debug, info, warn};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::config::{MatchMode, ReferenceProfile};
use crate::error::{CircularError, PipelineResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub legal_name: String,
    pub id_type: String,
}

/// Immutable lookup from legal name to identification type code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTable {
    entries: Vec<ReferenceEntry>,
    index: HashMap<String, usize>,
    match_mode: MatchMode,
    duplicates: usize,
}

impl ReferenceTable {
    /// Build a table; the first entry of a duplicated legal name wins
    pub fn from_entries<I>(entries: I, match_mode: MatchMode) -> Self
    where
        I: IntoIterator<Item = ReferenceEntry>,
    {
        let mut table = ReferenceTable {
            entries: Vec::new(),
            index: HashMap::new(),
            match_mode,
            duplicates: 0,
        };

        for entry in entries {
            let key = match_key(&entry.legal_name, match_mode);
            if key.is_empty() {
                continue;
            }
            if let Some(&first) = table.index.get(&key) {
                warn!(
                    "Duplicate reference entry for '{}' ignored (keeping type '{}')",
                    entry.legal_name, table.entries[first].id_type
                );
                table.duplicates += 1;
                continue;
            }
            table.index.insert(key, table.entries.len());
            table.entries.push(entry);
        }

        table
    }

    pub fn lookup(&self, legal_name: &str) -> Option<&str> {
        self.index
            .get(&match_key(legal_name, self.match_mode))
            .map(|&idx| self.entries[idx].id_type.as_str())
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries skipped because their legal name was already present
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }
}

/// Join key for a legal name under the given match mode
pub fn match_key(name: &str, mode: MatchMode) -> String {
    match mode {
        MatchMode::Exact => name.trim().to_string(),
        MatchMode::Relaxed => {
            let upper = name.to_uppercase();
            let mut out = String::with_capacity(upper.len());
            for ch in upper.nfkd() {
                if is_combining_mark(ch) {
                    continue;
                }
                if ch.is_alphanumeric() || ch.is_whitespace() {
                    out.push(ch);
                } else if ch == '-' {
                    out.push(' ');
                }
            }
            out.split_whitespace().collect::<Vec<_>>().join(" ")
        }
    }
}

/// Load the reference table described by the profile.
///
/// Spreadsheets (xlsx, xlsm, xls, ods) are read with calamine, CSV files
/// with the csv reader. Any failure is fatal for the run.
pub fn load_reference(profile: &ReferenceProfile) -> PipelineResult<ReferenceTable> {
    let path = profile.path.as_path();
    info!("Loading ERP reference table: {:?}", path);

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let rows = match extension.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => read_spreadsheet_rows(path, profile.sheet.as_deref()),
        "csv" | "txt" => read_csv_rows(path, profile.delimiter),
        other => Err(anyhow!(
            "Unsupported reference format: '{}'. Supported formats: .xlsx, .xls, .ods, .csv",
            other
        )),
    }
    .map_err(|e| CircularError::reference_load(path, e))?;

    let entries = extract_entries(&rows, profile).map_err(|e| CircularError::reference_load(path, e))?;
    let table = ReferenceTable::from_entries(entries, profile.match_mode);

    info!(
        "Loaded {} reference entries ({} duplicates ignored)",
        table.len(),
        table.duplicates()
    );
    Ok(table)
}

fn read_spreadsheet_rows(path: &Path, sheet: Option<&str>) -> anyhow::Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path).context("Failed to open reference workbook")?;

    let range = match sheet {
        Some(name) => workbook
            .worksheet_range(name)
            .with_context(|| format!("Failed to read sheet '{}'", name))?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| anyhow!("Reference workbook has no sheets"))?
            .context("Failed to read first sheet")?,
    };

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn read_csv_rows(path: &Path, delimiter: char) -> anyhow::Result<Vec<Vec<String>>> {
    let bytes = std::fs::read(path).context("Failed to read reference CSV")?;
    let (text, _) = super::decode_input(&bytes);

    let mut reader = ReaderBuilder::new()
        .delimiter(super::csv_delimiter(delimiter))
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to read reference CSV record")?;
        rows.push(record.iter().map(|f| f.trim().to_string()).collect());
    }
    Ok(rows)
}

/// Render a cell as text; whole floats lose their ".0"
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

fn extract_entries(
    rows: &[Vec<String>],
    profile: &ReferenceProfile,
) -> anyhow::Result<Vec<ReferenceEntry>> {
    let header_pos = rows
        .iter()
        .position(|row| {
            row.iter().any(|c| c.trim() == profile.name_column)
                && row.iter().any(|c| c.trim() == profile.id_type_column)
        })
        .ok_or_else(|| {
            anyhow!(
                "Reference table must have columns '{}' and '{}'",
                profile.name_column,
                profile.id_type_column
            )
        })?;

    let header = &rows[header_pos];
    let name_idx = header
        .iter()
        .position(|c| c.trim() == profile.name_column)
        .ok_or_else(|| anyhow!("Missing '{}' column", profile.name_column))?;
    let type_idx = header
        .iter()
        .position(|c| c.trim() == profile.id_type_column)
        .ok_or_else(|| anyhow!("Missing '{}' column", profile.id_type_column))?;
    debug!(
        "Reference header at row {}: name column {}, type column {}",
        header_pos + 1,
        name_idx,
        type_idx
    );

    let entries = rows[header_pos + 1..]
        .iter()
        .filter_map(|row| {
            let legal_name = row.get(name_idx).map(|s| s.trim()).unwrap_or("");
            if legal_name.is_empty() {
                return None;
            }
            Some(ReferenceEntry {
                legal_name: legal_name.to_string(),
                id_type: row.get(type_idx).map(|s| s.trim()).unwrap_or("").to_string(),
            })
        })
        .collect();

    Ok(entries)
}

#[derive(Debug)]
struct CachedReference {
    path: PathBuf,
    mtime: SystemTime,
    match_mode: MatchMode,
    table: Arc<ReferenceTable>,
}

/// Keeps the last loaded reference table while its file is unchanged.
///
/// Callers only ever get shared immutable access to the table.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    slot: Mutex<Option<CachedReference>>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&self, profile: &ReferenceProfile) -> PipelineResult<Arc<ReferenceTable>> {
        let mtime = std::fs::metadata(&profile.path)
            .and_then(|m| m.modified())
            .map_err(|e| CircularError::reference_load(&profile.path, e))?;

        let mut guard = self.guard();
        if let Some(cached) = guard.as_ref() {
            if cached.path == profile.path
                && cached.mtime == mtime
                && cached.match_mode == profile.match_mode
            {
                debug!("Reusing cached reference table for {:?}", profile.path);
                return Ok(Arc::clone(&cached.table));
            }
        }

        let table = Arc::new(load_reference(profile)?);
        *guard = Some(CachedReference {
            path: profile.path.clone(),
            mtime,
            match_mode: profile.match_mode,
            table: Arc::clone(&table),
        });
        Ok(table)
    }

    fn guard(&self) -> MutexGuard<'_, Option<CachedReference>> {
        // The slot only ever holds a fully built table, so a poisoned lock is still usable
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
