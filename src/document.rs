//! Dublin Core document rendering for a single row.
//!
//! Values are written verbatim. Markup-reserved characters in a cell end up
//! in the output unescaped, so such a row yields a document that is not
//! well-formed.
use std::fmt::Write;

pub const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
pub const DCTERMS_NAMESPACE: &str = "http://purl.org/dc/terms/";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// File extension of every generated document.
pub const EXTENSION: &str = "metadata";

const PROLOG: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";
const RECOGNIZED_PREFIXES: [&str; 2] = ["dc:", "dcterms:"];

/// Naming of the document root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootElement {
    pub name: String,
    pub prefix: String,
    pub namespace: String,
}

impl Default for RootElement {
    fn default() -> Self {
        Self {
            name: "dc".to_string(),
            prefix: "dc".to_string(),
            namespace: DC_NAMESPACE.to_string(),
        }
    }
}

impl RootElement {
    fn qualified_name(&self) -> String {
        format!("{}:{}", self.prefix, self.name)
    }

    fn opening_tag(&self) -> String {
        let mut tag = format!(
            "<{} xmlns:{}=\"{}\"",
            self.qualified_name(),
            self.prefix,
            self.namespace
        );
        // A fixed declaration is dropped when the configured prefix already
        // binds it, so the root never repeats an attribute.
        for (prefix, uri) in [("dcterms", DCTERMS_NAMESPACE), ("xsi", XSI_NAMESPACE)] {
            if self.prefix != prefix {
                let _ = write!(tag, " xmlns:{prefix}=\"{uri}\"");
            }
        }
        if self.prefix != "dc" {
            let _ = write!(tag, " xmlns:dc=\"{DC_NAMESPACE}\"");
        }
        tag.push('>');
        tag
    }
}

/// True for headers in the Dublin Core or DC Terms vocabularies.
pub fn is_recognized(header: &str) -> bool {
    RECOGNIZED_PREFIXES
        .iter()
        .any(|prefix| header.starts_with(prefix))
}

/// Element name for a closing tag: header text up to the first space.
pub fn closing_name(header: &str) -> &str {
    header.split(' ').next().unwrap_or(header)
}

/// Render one document from `(header, value)` pairs in column order.
///
/// Only recognized fields are emitted; values are trimmed and empty values
/// become self-closing elements.
pub fn render<'a, I>(root: &RootElement, fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::new();
    out.push_str(PROLOG);
    out.push('\n');
    out.push_str(&root.opening_tag());
    out.push('\n');

    for (header, value) in fields {
        if !is_recognized(header) {
            continue;
        }
        let value = value.trim();
        if value.is_empty() {
            let _ = writeln!(out, "\t<{header} />");
        } else {
            let _ = writeln!(out, "\t<{header}>{value}</{}>", closing_name(header));
        }
    }

    let _ = write!(out, "</{}>", root.qualified_name());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dc_root() -> RootElement {
        RootElement::default()
    }

    #[test]
    fn renders_only_recognized_fields_in_column_order() {
        let doc = render(
            &dc_root(),
            [
                ("title", "report1"),
                ("dcterms:created", "2018-01-01"),
                ("dc:title", "My Report"),
                ("dcx:title", "ignored"),
                ("DC:creator", "ignored"),
                ("dc:creator", "Jane"),
            ],
        );
        let lines: Vec<&str> = doc.lines().collect();
        assert_eq!(lines[0], PROLOG);
        assert_eq!(
            &lines[2..],
            &[
                "\t<dcterms:created>2018-01-01</dcterms:created>",
                "\t<dc:title>My Report</dc:title>",
                "\t<dc:creator>Jane</dc:creator>",
                "</dc:dc>",
            ]
        );
        assert!(!doc.contains("ignored"));
        assert!(!doc.contains("report1"));
    }

    #[test]
    fn empty_values_are_self_closing_after_trim() {
        let doc = render(&dc_root(), [("dc:subject", "   "), ("dc:rights", "")]);
        assert!(doc.contains("\t<dc:subject />\n"));
        assert!(doc.contains("\t<dc:rights />\n"));
    }

    #[test]
    fn closing_tag_drops_attribute_text_from_header() {
        let doc = render(&dc_root(), [("dc:title xml:lang=\"en\"", " Title ")]);
        assert!(doc.contains("\t<dc:title xml:lang=\"en\">Title</dc:title>\n"));
    }

    #[test]
    fn values_are_not_escaped() {
        let doc = render(&dc_root(), [("dc:title", "Fish & Chips")]);
        assert!(doc.contains("<dc:title>Fish & Chips</dc:title>"));
    }

    #[test]
    fn default_root_declares_namespaces_without_repeating_dc() {
        let doc = render(&dc_root(), std::iter::empty());
        let root_line = doc.lines().nth(1).unwrap();
        assert_eq!(
            root_line,
            "<dc:dc xmlns:dc=\"http://purl.org/dc/elements/1.1/\" \
             xmlns:dcterms=\"http://purl.org/dc/terms/\" \
             xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">"
        );
        assert!(doc.ends_with("</dc:dc>"));
    }

    #[test]
    fn custom_root_adds_dc_declaration() {
        let root = RootElement {
            name: "record".to_string(),
            prefix: "oai".to_string(),
            namespace: "http://www.openarchives.org/OAI/2.0/".to_string(),
        };
        let doc = render(&root, [("dc:title", "T")]);
        let root_line = doc.lines().nth(1).unwrap();
        assert!(root_line.starts_with(
            "<oai:record xmlns:oai=\"http://www.openarchives.org/OAI/2.0/\" \
             xmlns:dcterms=\"http://purl.org/dc/terms/\""
        ));
        assert!(root_line.contains("xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\""));
        assert!(root_line.ends_with(" xmlns:dc=\"http://purl.org/dc/elements/1.1/\">"));
        assert!(doc.ends_with("</oai:record>"));
    }

    fn root_line(doc: &str) -> &str {
        doc.lines().nth(1).unwrap()
    }

    fn declaration_count(line: &str, prefix: &str) -> usize {
        line.matches(&format!(" xmlns:{prefix}=")).count()
    }

    #[test]
    fn dc_namespace_under_another_prefix_still_binds_dc() {
        let root = RootElement {
            name: "dc".to_string(),
            prefix: "oai_dc".to_string(),
            namespace: DC_NAMESPACE.to_string(),
        };
        let doc = render(&root, [("dc:title", "T")]);
        assert_eq!(declaration_count(root_line(&doc), "dc"), 1);
        assert_eq!(declaration_count(root_line(&doc), "oai_dc"), 1);

        let parsed = roxmltree::Document::parse(&doc).unwrap();
        let title = parsed
            .descendants()
            .find(|node| node.tag_name().name() == "title")
            .unwrap();
        assert_eq!(title.tag_name().namespace(), Some(DC_NAMESPACE));
    }

    #[test]
    fn dc_prefix_with_custom_namespace_declares_dc_once() {
        let root = RootElement {
            name: "record".to_string(),
            prefix: "dc".to_string(),
            namespace: "urn:example:records".to_string(),
        };
        let doc = render(&root, [("dc:title", "T")]);
        let line = root_line(&doc);
        assert_eq!(declaration_count(line, "dc"), 1);
        assert!(line.contains(" xmlns:dc=\"urn:example:records\""));
        assert_eq!(declaration_count(line, "dcterms"), 1);
        assert_eq!(declaration_count(line, "xsi"), 1);
        roxmltree::Document::parse(&doc).unwrap();
    }

    #[test]
    fn fixed_prefixes_are_not_declared_twice() {
        for prefix in ["dcterms", "xsi"] {
            let root = RootElement {
                name: "record".to_string(),
                prefix: prefix.to_string(),
                namespace: "urn:example:records".to_string(),
            };
            let doc = render(&root, [("dc:title", "T"), ("dcterms:issued", "2018")]);
            let line = root_line(&doc);
            for declared in ["dc", "dcterms", "xsi"] {
                assert_eq!(declaration_count(line, declared), 1, "{prefix}: {line}");
            }
            roxmltree::Document::parse(&doc).unwrap();
        }
    }

    #[test]
    fn rendered_document_is_well_formed() {
        let doc = render(
            &dc_root(),
            [("dc:title", "A"), ("dcterms:issued", ""), ("dc:creator", "B")],
        );
        let parsed = roxmltree::Document::parse(&doc).unwrap();
        let root = parsed.root_element();
        assert_eq!(root.tag_name().namespace(), Some(DC_NAMESPACE));
        assert_eq!(root.children().filter(|node| node.is_element()).count(), 3);
    }
}
