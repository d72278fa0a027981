//! Row transformer: one metadata document per CSV row.
//!
//! Rows are handled strictly in order. A row's document is on disk before
//! its remote update starts, and documents already written stay on disk
//! when a later row fails.
use crate::document::{self, RootElement};
use crate::error::{Error, Result};
use crate::source::{cell, resolve_column, ColumnMatch, Strictness, TabularSource};
use crate::update::{IdentifierColumns, RemoteSummary, RowOutcome, Updater};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub output_dir: PathBuf,
    pub column: String,
    pub column_match: ColumnMatch,
    pub strictness: Strictness,
    pub root: RootElement,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub documents: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteSummary>,
}

pub fn document_path(output_dir: &Path, name: &str) -> PathBuf {
    output_dir.join(format!("{name}.{}", document::EXTENSION))
}

pub fn transform(
    input: &Path,
    options: &TransformOptions,
    updater: Option<&Updater>,
) -> Result<RunSummary> {
    if !options.output_dir.is_dir() {
        return Err(Error::config(format!(
            "The output directory {} does not exist",
            options.output_dir.display()
        )));
    }

    let mut source = TabularSource::open(input, options.strictness)?;
    let headers = source.headers().to_vec();
    let name_column = resolve_column(&headers, &options.column, options.column_match)?;
    tracing::debug!(
        input = %source.path().display(),
        column = %headers[name_column],
        "filename column resolved"
    );

    let identifiers = IdentifierColumns::from_headers(&headers);
    if updater.is_some() && identifiers.is_empty() {
        println!("No fileref or assetid column found; documents will not be uploaded");
    }

    let mut summary = RunSummary {
        documents: 0,
        remote: updater.map(|_| RemoteSummary::default()),
    };

    for record in source.records() {
        let record = record?;
        let fields = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.as_str(), cell(&record, idx)));
        let rendered = document::render(&options.root, fields);

        let path = document_path(&options.output_dir, cell(&record, name_column));
        fs::write(&path, &rendered).map_err(|err| Error::write_document(&path, err))?;
        summary.documents += 1;
        tracing::debug!(path = %path.display(), "document written");

        if let (Some(updater), Some(remote)) = (updater, summary.remote.as_mut()) {
            let outcome = match identifiers.select(|idx| cell(&record, idx)) {
                Some((kind, reference)) => updater.update_row(kind, reference, &rendered),
                None => RowOutcome::NoIdentifier,
            };
            remote.record(outcome);
        }
    }

    Ok(summary)
}
