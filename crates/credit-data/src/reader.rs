//! Delimited source loading.
//!
//! Reads each source with its own encoding and delimiter and returns the
//! untouched strings as a [`RawTable`]. No schema checks happen here; the
//! cleaners own that.

use std::borrow::Cow;
use std::path::Path;

use credit_core::error::{PipelineError, Result};
use credit_core::sources::{SourceEncoding, SourceSet, SourceSpec};
use credit_core::table::RawTable;
use encoding_rs::Encoding;
use tracing::debug;

// ── Public API ────────────────────────────────────────────────────────────────

/// The three raw inputs of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSources {
    pub potential: RawTable,
    pub sales: RawTable,
    pub summary: RawTable,
}

/// Read one source into a [`RawTable`].
///
/// Fails with [`PipelineError::SourceRead`] when the file is missing, is not
/// valid in its declared encoding, has no header row, or contains a row whose
/// field count differs from the header.
pub fn load_source(spec: &SourceSpec) -> Result<RawTable> {
    let bytes = std::fs::read(&spec.path)
        .map_err(|e| PipelineError::source_read(&spec.name, &spec.path, e))?;

    let text = decode(&bytes, spec.encoding).ok_or_else(|| {
        PipelineError::source_read(
            &spec.name,
            &spec.path,
            format!("content is not valid {:?}", spec.encoding),
        )
    })?;

    let table = parse_delimited(&spec.name, &spec.path, &text, spec.delimiter)?;

    debug!(
        "Loaded source '{}' from {}: {} columns, {} rows",
        spec.name,
        spec.path.display(),
        table.headers.len(),
        table.len()
    );

    Ok(table)
}

/// Read all three sources, one after another.
///
/// The runtime reads them concurrently with [`load_source`]; this helper is
/// for callers that do not need that.
pub fn load_sources(set: &SourceSet) -> Result<RawSources> {
    Ok(RawSources {
        potential: load_source(&set.potential)?,
        sales: load_source(&set.sales)?,
        summary: load_source(&set.summary)?,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Decode `bytes`, dropping a leading byte-order mark.
///
/// Returns `None` when the input contains sequences that are malformed in the
/// declared encoding. Single-byte encodings never fail. ISO-8859-1 maps every
/// byte to the code point of the same value, so 0x80-0x9F stay C1 controls
/// rather than taking their Windows-1252 glyphs.
fn decode(bytes: &[u8], encoding: SourceEncoding) -> Option<Cow<'_, str>> {
    let codec: &'static Encoding = match encoding {
        SourceEncoding::Utf8 => encoding_rs::UTF_8,
        SourceEncoding::Windows1252 => encoding_rs::WINDOWS_1252,
        SourceEncoding::Latin1 => {
            return Some(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()));
        }
    };
    let (text, had_errors) = codec.decode_with_bom_removal(bytes);
    if had_errors {
        None
    } else {
        Some(text)
    }
}

fn parse_delimited(name: &str, path: &Path, text: &str, delimiter: u8) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::source_read(name, path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(PipelineError::source_read(name, path, "no header row"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| PipelineError::source_read(name, path, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(name, headers, rows))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
