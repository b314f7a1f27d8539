//! Descriptors for the three raw inputs of a pipeline run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Text encoding a source file is exported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceEncoding {
    Utf8,
    /// ISO-8859-1. Decoded with the Windows-1252 table, which agrees with
    /// Latin-1 on every printable code point.
    Latin1,
    Windows1252,
}

/// Where a raw table lives and how to read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Logical name used in logs and errors.
    pub name: String,
    pub path: PathBuf,
    /// Field delimiter byte.
    pub delimiter: u8,
    pub encoding: SourceEncoding,
}

impl SourceSpec {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        delimiter: u8,
        encoding: SourceEncoding,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            delimiter,
            encoding,
        }
    }
}

/// The three sources consumed by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSet {
    pub potential: SourceSpec,
    pub sales: SourceSpec,
    pub summary: SourceSpec,
}

impl SourceSet {
    /// Sources under `data_dir` with the given file names and the export
    /// conventions of each feed: potential is `;`/Latin-1, sales is
    /// `,`/UTF-8, summary is `;`/Windows-1252.
    pub fn in_dir(data_dir: &Path, potential: &str, sales: &str, summary: &str) -> Self {
        Self {
            potential: SourceSpec::new(
                "potential",
                data_dir.join(potential),
                b';',
                SourceEncoding::Latin1,
            ),
            sales: SourceSpec::new("sales", data_dir.join(sales), b',', SourceEncoding::Utf8),
            summary: SourceSpec::new(
                "summary",
                data_dir.join(summary),
                b';',
                SourceEncoding::Windows1252,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_applies_feed_conventions() {
        let set = SourceSet::in_dir(Path::new("/data"), "p.csv", "s.csv", "r.csv");

        assert_eq!(set.potential.path, PathBuf::from("/data/p.csv"));
        assert_eq!(set.potential.delimiter, b';');
        assert_eq!(set.potential.encoding, SourceEncoding::Latin1);

        assert_eq!(set.sales.delimiter, b',');
        assert_eq!(set.sales.encoding, SourceEncoding::Utf8);

        assert_eq!(set.summary.name, "summary");
        assert_eq!(set.summary.encoding, SourceEncoding::Windows1252);
    }
}
