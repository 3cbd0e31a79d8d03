// Import module - receivables CSV and ERP reference loaders

pub mod receivables;
pub mod reference;
pub mod validation;

use anyhow::{anyhow, Context, Result};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::delimiter_byte;

pub use receivables::{ingest, RawRecord, ValidatedTable};
pub use reference::{load_reference, ReferenceCache, ReferenceTable};
pub use validation::{DateWarning, ValidationReport};

/// Decode an exported file into text.
///
/// A byte-order mark wins; otherwise valid UTF-8 is used as-is and anything
/// else is read as Windows-1252, which is what Excel writes on
/// Spanish-locale machines.
pub fn decode_input(bytes: &[u8]) -> (String, &'static Encoding) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (text.into_owned(), encoding);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), UTF_8),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            (text.into_owned(), WINDOWS_1252)
        }
    }
}

/// Delimiter byte for the csv readers, ',' when the configured one is not ASCII
pub(crate) fn csv_delimiter(delimiter: char) -> u8 {
    delimiter_byte(delimiter).unwrap_or_else(|| {
        warn!("Delimiter '{}' is not a single ASCII character, using ','", delimiter);
        b','
    })
}

/// Read a receivables export from disk and decode it
pub fn read_input_file<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let path = file_path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| anyhow!("File has no extension"))?
        .to_lowercase();

    if !matches!(extension.as_str(), "csv" | "txt") {
        return Err(anyhow!(
            "Unsupported file format: {}. Supported formats: .csv, .txt",
            extension
        ));
    }

    info!("Reading receivables file: {:?}", path);
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let (text, encoding) = decode_input(&bytes);
    debug!("Decoded {:?} as {}", path, encoding.name());
    Ok(text)
}
