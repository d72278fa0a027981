//! Repository updater: attach generated documents to Preservica entities.
//!
//! Each row selects a `MetadataSink` from its identifier column:
//! `fileref*` rows go to the legacy v5 entity API, `assetid*` rows to the
//! current v6 information-object API. Every step is idempotent: an entity
//! that already carries a fragment in the target namespace is never
//! written to.
//!
//! Remote failures stay local to the row. They are logged and counted, and
//! the run carries on with the next row.
use crate::error::{Error, Result};
use crate::repository::{HttpResponse, RepositoryClient, TransportError};
use serde::Serialize;

mod current;
mod legacy;

pub use current::CurrentSink;
pub use legacy::LegacySink;

pub const LEGACY_IDENTIFIER_PREFIX: &str = "fileref";
pub const CURRENT_IDENTIFIER_PREFIX: &str = "assetid";

/// One remote API shape: fetch the entity, inspect it, write to it.
pub trait MetadataSink {
    /// Short label for operator messages.
    fn api(&self) -> &'static str;

    /// Entity XML, or `None` when the repository has no such entity.
    fn fetch(&self, client: &dyn RepositoryClient, reference: &str) -> Result<Option<String>>;

    fn has_metadata(&self, reference: &str, entity: &str, namespace: &str) -> Result<bool>;

    fn apply_update(
        &self,
        client: &dyn RepositoryClient,
        reference: &str,
        entity: &str,
        namespace: &str,
        document: &str,
    ) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Legacy,
    Current,
}

/// Identifier columns found in the header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentifierColumns {
    legacy: Option<usize>,
    current: Option<usize>,
}

impl IdentifierColumns {
    pub fn from_headers(headers: &[String]) -> Self {
        let find = |prefix: &str| headers.iter().position(|header| header.starts_with(prefix));
        Self {
            legacy: find(LEGACY_IDENTIFIER_PREFIX),
            current: find(CURRENT_IDENTIFIER_PREFIX),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.legacy.is_none() && self.current.is_none()
    }

    /// The identifier for a row; a non-empty `fileref` wins over `assetid`.
    pub fn select<'r>(
        &self,
        cell: impl Fn(usize) -> &'r str,
    ) -> Option<(IdentifierKind, &'r str)> {
        let pick = |idx: Option<usize>, kind| {
            idx.map(|idx| cell(idx).trim())
                .filter(|value| !value.is_empty())
                .map(|value| (kind, value))
        };
        pick(self.legacy, IdentifierKind::Legacy)
            .or_else(|| pick(self.current, IdentifierKind::Current))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Updated,
    AlreadyPresent,
    NotFound,
    Failed,
    NoIdentifier,
}

/// Per-outcome counters for the remote phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoteSummary {
    pub updated: usize,
    pub already_present: usize,
    pub not_found: usize,
    pub failed: usize,
    pub no_identifier: usize,
}

impl RemoteSummary {
    pub fn record(&mut self, outcome: RowOutcome) {
        let counter = match outcome {
            RowOutcome::Updated => &mut self.updated,
            RowOutcome::AlreadyPresent => &mut self.already_present,
            RowOutcome::NotFound => &mut self.not_found,
            RowOutcome::Failed => &mut self.failed,
            RowOutcome::NoIdentifier => &mut self.no_identifier,
        };
        *counter += 1;
    }
}

pub struct Updater {
    client: Box<dyn RepositoryClient>,
    namespace: String,
}

impl Updater {
    pub fn new(client: Box<dyn RepositoryClient>, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    /// Ensure the entity behind `reference` carries `document`.
    pub fn update_row(&self, kind: IdentifierKind, reference: &str, document: &str) -> RowOutcome {
        let sink: &dyn MetadataSink = match kind {
            IdentifierKind::Legacy => &LegacySink,
            IdentifierKind::Current => &CurrentSink,
        };
        match self.sync(sink, reference, document) {
            Ok(RowOutcome::AlreadyPresent) => {
                println!(
                    "{} {reference} already has {} metadata, skipping",
                    sink.api(),
                    self.namespace
                );
                RowOutcome::AlreadyPresent
            }
            Ok(RowOutcome::NotFound) => {
                println!("{} {reference} was not found in the repository", sink.api());
                RowOutcome::NotFound
            }
            Ok(RowOutcome::Updated) => {
                tracing::info!(api = sink.api(), reference, "metadata added");
                RowOutcome::Updated
            }
            Ok(other) => other,
            Err(err) => {
                tracing::warn!(api = sink.api(), error = %err, "remote update skipped");
                RowOutcome::Failed
            }
        }
    }

    fn sync(&self, sink: &dyn MetadataSink, reference: &str, document: &str) -> Result<RowOutcome> {
        check_reference(reference)?;
        let client = self.client.as_ref();
        let Some(entity) = sink.fetch(client, reference)? else {
            return Ok(RowOutcome::NotFound);
        };
        if sink.has_metadata(reference, &entity, &self.namespace)? {
            return Ok(RowOutcome::AlreadyPresent);
        }
        sink.apply_update(client, reference, &entity, &self.namespace, document)?;
        Ok(RowOutcome::Updated)
    }
}

/// References are spliced into request paths as one segment, so only
/// unreserved URL characters are accepted.
fn check_reference(reference: &str) -> Result<()> {
    let unreserved = reference
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'));
    if unreserved && reference != "." && reference != ".." {
        Ok(())
    } else {
        Err(Error::lookup(reference, "reference is not a valid URL path segment"))
    }
}

/// Shared GET handling: 404 is "not found", other failures are lookup errors.
fn fetch_entity(
    client: &dyn RepositoryClient,
    path: &str,
    reference: &str,
) -> Result<Option<String>> {
    let response = client
        .get(path)
        .map_err(|err| Error::lookup(reference, err.to_string()))?;
    if response.status == 404 {
        return Ok(None);
    }
    if !response.is_success() {
        return Err(Error::lookup(reference, format!("HTTP {}", response.status)));
    }
    Ok(Some(response.body))
}

fn ensure_written(
    result: std::result::Result<HttpResponse, TransportError>,
    reference: &str,
) -> Result<()> {
    let response = result.map_err(|err| Error::update(reference, err.to_string()))?;
    if !response.is_success() {
        return Err(Error::update(reference, format!("HTTP {}", response.status)));
    }
    Ok(())
}

fn parse_entity<'a>(reference: &str, entity: &'a str) -> Result<roxmltree::Document<'a>> {
    roxmltree::Document::parse(entity)
        .map_err(|err| Error::lookup(reference, format!("entity is not valid XML: {err}")))
}
