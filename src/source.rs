//! Tabular source reading.
//!
//! Strict mode reads RFC 4180 CSV and rejects ragged rows. Permissive mode
//! tolerates a byte-order mark, stray whitespace around header names, and
//! rows with fewer or more cells than the header.
use crate::error::{Error, Result};
use csv::StringRecord;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    #[default]
    Strict,
    Permissive,
}

/// How the filename column is located in the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnMatch {
    #[default]
    Exact,
    /// First header (in column order) containing the name.
    Substring,
}

pub struct TabularSource {
    path: PathBuf,
    headers: Vec<String>,
    reader: csv::Reader<File>,
}

impl TabularSource {
    pub fn open(path: &Path, strictness: Strictness) -> Result<Self> {
        let file = File::open(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => Error::config(format!(
                "The input file name {} does not exist",
                path.display()
            )),
            _ => Error::read_source(path, err),
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(strictness == Strictness::Permissive)
            .from_reader(file);

        let raw = reader
            .headers()
            .map_err(|err| Error::read_source(path, err))?;
        let headers: Vec<String> = raw
            .iter()
            .map(|header| match strictness {
                Strictness::Strict => header.to_string(),
                Strictness::Permissive => {
                    header.trim_start_matches(BYTE_ORDER_MARK).trim().to_string()
                }
            })
            .collect();

        for (idx, header) in headers.iter().enumerate() {
            if headers[..idx].contains(header) {
                return Err(Error::config(format!(
                    "The CSV file contains the column {header} more than once"
                )));
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            reader,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data records in file order.
    pub fn records(&mut self) -> impl Iterator<Item = Result<StringRecord>> + '_ {
        let path = self.path.clone();
        self.reader
            .records()
            .map(move |record| record.map_err(|err| Error::read_source(&path, err)))
    }
}

/// Locate the filename column, once, for the whole run.
pub fn resolve_column(headers: &[String], name: &str, mode: ColumnMatch) -> Result<usize> {
    let found = match mode {
        ColumnMatch::Exact => headers.iter().position(|header| header == name),
        ColumnMatch::Substring => headers.iter().position(|header| header.contains(name)),
    };
    found.ok_or_else(|| {
        Error::config(format!(
            "The CSV file does not contain a column with the name {name}"
        ))
    })
}

/// Cell value by column index. Short rows read as empty in permissive mode.
pub fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn write_csv(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("input.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn exact_match_ignores_similar_headers() {
        let headers = headers(&["file name", "filename", "dc:title"]);
        assert_eq!(
            resolve_column(&headers, "filename", ColumnMatch::Exact).unwrap(),
            1
        );
        assert!(resolve_column(&headers, "file", ColumnMatch::Exact)
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn substring_match_takes_first_header_in_column_order() {
        let headers = headers(&["dc:title", "original filename", "filename"]);
        assert_eq!(
            resolve_column(&headers, "filename", ColumnMatch::Substring).unwrap(),
            1
        );
    }

    #[test]
    fn strict_source_rejects_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "filename,dc:title\na,One\nb\n");
        let mut source = TabularSource::open(&path, Strictness::Strict).unwrap();
        let results: Vec<_> = source.records().collect();
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::Transform { .. })));
    }

    #[test]
    fn permissive_source_strips_bom_and_tolerates_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "\u{feff} filename ,dc:title\na\n");
        let mut source = TabularSource::open(&path, Strictness::Permissive).unwrap();
        assert_eq!(source.headers(), &["filename", "dc:title"]);
        let record = source.records().next().unwrap().unwrap();
        assert_eq!(cell(&record, 0), "a");
        assert_eq!(cell(&record, 1), "");
    }

    #[test]
    fn quoted_fields_keep_embedded_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "filename,dc:title\na,\"One, Two\"\n");
        let mut source = TabularSource::open(&path, Strictness::Strict).unwrap();
        let record = source.records().next().unwrap().unwrap();
        assert_eq!(cell(&record, 1), "One, Two");
    }

    #[test]
    fn duplicate_headers_are_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "filename,dc:title,dc:title\n");
        let err = TabularSource::open(&path, Strictness::Strict).err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn missing_input_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TabularSource::open(&dir.path().join("absent.csv"), Strictness::Strict)
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }
}
