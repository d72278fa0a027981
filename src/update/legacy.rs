//! v5 entity API: the document is spliced into the digital file record.
use super::{ensure_written, fetch_entity, parse_entity, MetadataSink};
use crate::error::{Error, Result};
use crate::repository::RepositoryClient;

const ANCHOR_ELEMENT: &str = "Directory";
const METADATA_ELEMENT: &str = "Metadata";
const SCHEMA_ATTRIBUTE: &str = "schemaURI";

pub struct LegacySink;

impl MetadataSink for LegacySink {
    fn api(&self) -> &'static str {
        "fileref"
    }

    fn fetch(&self, client: &dyn RepositoryClient, reference: &str) -> Result<Option<String>> {
        fetch_entity(client, &format!("entity/entities/{reference}"), reference)
    }

    fn has_metadata(&self, reference: &str, entity: &str, namespace: &str) -> Result<bool> {
        let doc = parse_entity(reference, entity)?;
        Ok(doc.descendants().any(|node| {
            node.is_element()
                && node.tag_name().name() == METADATA_ELEMENT
                && node.attribute(SCHEMA_ATTRIBUTE) == Some(namespace)
        }))
    }

    fn apply_update(
        &self,
        client: &dyn RepositoryClient,
        reference: &str,
        entity: &str,
        namespace: &str,
        document: &str,
    ) -> Result<()> {
        let updated = insert_metadata(reference, entity, namespace, document)?;
        tracing::debug!(reference, bytes = updated.len(), "pushing updated digital file");
        ensure_written(
            client.put(&format!("entity/digitalFiles/{reference}"), &updated),
            reference,
        )
    }
}

/// Entity text with a `Metadata` wrapper around `document` placed right
/// after the first `Directory` element.
fn insert_metadata(
    reference: &str,
    entity: &str,
    namespace: &str,
    document: &str,
) -> Result<String> {
    let doc = parse_entity(reference, entity)?;
    let anchor = doc
        .descendants()
        .find(|node| node.is_element() && node.tag_name().name() == ANCHOR_ELEMENT)
        .ok_or_else(|| Error::update(reference, "entity has no Directory element"))?;

    let generated = roxmltree::Document::parse(document).map_err(|err| {
        Error::update(reference, format!("generated document is not well-formed: {err}"))
    })?;
    let fragment = &document[generated.root_element().range()];

    // Reuse the anchor's prefix so the wrapper lands in the same namespace.
    let anchor_text = &entity[anchor.range()];
    let wrapper = match element_prefix(anchor_text) {
        Some(prefix) => format!("{prefix}:{METADATA_ELEMENT}"),
        None => METADATA_ELEMENT.to_string(),
    };

    let end = anchor.range().end;
    let mut updated = String::with_capacity(entity.len() + fragment.len() + 64);
    updated.push_str(&entity[..end]);
    updated.push_str(&format!(
        "<{wrapper} {SCHEMA_ATTRIBUTE}=\"{}\">{fragment}</{wrapper}>",
        escape_attribute(namespace)
    ));
    updated.push_str(&entity[end..]);
    Ok(updated)
}

/// Prefix of the qualified name at the start of `<prefix:Name ...>`.
fn element_prefix(element_text: &str) -> Option<&str> {
    let name = element_text
        .trim_start_matches('<')
        .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .next()?;
    name.split_once(':').map(|(prefix, _)| prefix)
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}
