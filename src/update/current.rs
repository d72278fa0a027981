//! v6 information-object API: the document is posted as a new fragment.
use super::{ensure_written, fetch_entity, parse_entity, MetadataSink};
use crate::error::Result;
use crate::repository::RepositoryClient;

const METADATA_ELEMENT: &str = "Metadata";
const SCHEMA_ATTRIBUTE: &str = "schema";

pub struct CurrentSink;

impl MetadataSink for CurrentSink {
    fn api(&self) -> &'static str {
        "assetid"
    }

    fn fetch(&self, client: &dyn RepositoryClient, reference: &str) -> Result<Option<String>> {
        fetch_entity(
            client,
            &format!("entity/information-objects/{reference}"),
            reference,
        )
    }

    fn has_metadata(&self, reference: &str, entity: &str, namespace: &str) -> Result<bool> {
        let doc = parse_entity(reference, entity)?;
        Ok(doc
            .descendants()
            .filter(|node| node.is_element() && node.tag_name().name() == METADATA_ELEMENT)
            .flat_map(|metadata| metadata.children())
            .any(|fragment| {
                fragment.is_element() && fragment.attribute(SCHEMA_ATTRIBUTE) == Some(namespace)
            }))
    }

    fn apply_update(
        &self,
        client: &dyn RepositoryClient,
        reference: &str,
        _entity: &str,
        _namespace: &str,
        document: &str,
    ) -> Result<()> {
        ensure_written(
            client.post(
                &format!("entity/information-objects/{reference}/metadata"),
                document,
            ),
            reference,
        )
    }
}
