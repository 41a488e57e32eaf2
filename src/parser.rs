//! Decoder for local ridership CSV exports.
//!
//! Exports from the Seoul open data portal arrive in UTF-8 or CP949 depending
//! on where they were downloaded, so the bytes are tried against an ordered
//! list of encodings before the CSV itself is parsed.

use encoding_rs::{EUC_KR, Encoding, UTF_8};
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{AnalysisError, AnalysisResult};
use crate::records::RawTable;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads `path` and parses it as a headed CSV table.
///
/// # Errors
///
/// - [`AnalysisError::SourceUnavailable`] if the file is missing or unreadable.
/// - [`AnalysisError::EncodingUnresolved`] if no label in `encodings` decodes it.
/// - [`AnalysisError::SchemaMismatch`] if the decoded text is not valid CSV.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_table(path: impl AsRef<Path>, encodings: &[String]) -> AnalysisResult<RawTable> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        AnalysisError::source_unavailable(format!("cannot read '{}': {e}", path.display()))
    })?;

    let text = decode(&bytes, encodings).ok_or_else(|| AnalysisError::EncodingUnresolved {
        path: path.display().to_string(),
        tried: encodings.join(", "),
    })?;

    parse_table(&text)
}

/// Looks up a WHATWG encoding label. `cp949` is not a WHATWG label but is
/// what Korean exports are usually called, so it maps to EUC-KR (which
/// encoding_rs implements as the windows-949 superset).
pub fn resolve_encoding(label: &str) -> Option<&'static Encoding> {
    let label = label.trim();
    if label.eq_ignore_ascii_case("cp949") {
        return Some(EUC_KR);
    }
    Encoding::for_label(label.as_bytes())
}

/// Decodes `bytes` with the first encoding that yields no malformed sequences.
pub fn decode<'a>(bytes: &'a [u8], encodings: &[String]) -> Option<Cow<'a, str>> {
    for label in encodings {
        let Some(encoding) = resolve_encoding(label) else {
            warn!(label = %label, "Unknown encoding label, skipping");
            continue;
        };

        let body = if encoding == UTF_8 {
            bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
        } else {
            bytes
        };

        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(body) {
            debug!(label = %label, encoding = encoding.name(), "Decoded file");
            return Some(text);
        }
        debug!(label = %label, "Encoding rejected input");
    }
    None
}

/// Parses headed CSV text into a [`RawTable`]. Short rows are padded with empty cells.
pub fn parse_table(text: &str) -> AnalysisResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| AnalysisError::schema_mismatch(format!("unreadable header row: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();

    let mut table = RawTable::new(headers);
    for (row_idx0, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| {
            // +2: 1-based, plus the header row.
            AnalysisError::schema_mismatch(format!("malformed row {}: {e}", row_idx0 + 2))
        })?;
        let mut values: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
        values.resize(table.columns.len(), String::new());
        table.push_row(values);
    }

    debug!(rows = table.len(), columns = table.columns.len(), "Parsed CSV table");
    Ok(table)
}
