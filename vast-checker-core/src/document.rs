//! Candidate documents: parsing and root namespace coercion.
use std::fmt;
use std::path::Path;

use libxml::{
    parser::{Parser, ParserOptions},
    tree::{Document, Namespace, Node},
};
use serde::Serialize;
use thiserror::Error;

/// Prefix bound to the target namespace when the root does not declare it.
const COERCED_PREFIX: &str = "vast";

/// Errors emitted while loading or preparing a candidate document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("XML parse error: {0}")]
    XmlParse(String),
    #[error("document has no root element")]
    MissingRoot,
    #[error("failed to move root element into {namespace}: {reason}")]
    Namespace { namespace: String, reason: String },
}

/// Element name with an optional namespace URI.
///
/// Displays in Clark notation: `{http://www.iab.com/VAST}Ad`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualifiedName {
    pub namespace: Option<String>,
    pub local_name: String,
}

impl QualifiedName {
    pub fn new(namespace: Option<&str>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
            local_name: local_name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// A parsed XML document waiting to be validated.
pub struct CandidateDocument {
    document: Document,
    original_name: QualifiedName,
}

impl fmt::Debug for CandidateDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateDocument")
            .field("original_name", &self.original_name)
            .finish_non_exhaustive()
    }
}

impl CandidateDocument {
    /// Parse a candidate document from an XML string.
    ///
    /// # Examples
    /// ```rust
    /// use vast_checker_core::document::CandidateDocument;
    ///
    /// let mut doc = CandidateDocument::from_xml(r#"<VAST version="4.2"/>"#)?;
    /// doc.coerce_namespace("http://www.iab.com/VAST")?;
    /// assert_eq!(doc.root_name()?.to_string(), "{http://www.iab.com/VAST}VAST");
    /// # Ok::<(), vast_checker_core::document::DocumentError>(())
    /// ```
    pub fn from_xml(xml: &str) -> Result<Self, DocumentError> {
        Self::from_bytes(xml.as_bytes())
    }

    /// Parse a candidate document from raw bytes.
    ///
    /// The character encoding is left to libxml, which honours a BOM or the
    /// XML declaration, so Latin-1 and UTF-16 documents load as they are.
    pub fn from_bytes(xml: &[u8]) -> Result<Self, DocumentError> {
        // recovery mode would hand back a partial tree for malformed input
        let options = ParserOptions {
            recover: false,
            ..Default::default()
        };
        let document = Parser::default()
            .parse_string_with_options(xml, options)
            .map_err(|e| DocumentError::XmlParse(format!("{e:?}")))?;
        Self::from_document(document)
    }

    /// Parse a candidate document from a file on disk.
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let xml = std::fs::read(path).map_err(|source| DocumentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&xml)
    }

    fn from_document(document: Document) -> Result<Self, DocumentError> {
        let root = document
            .get_root_element()
            .ok_or(DocumentError::MissingRoot)?;
        let original_name = node_name(&root);
        Ok(Self {
            document,
            original_name,
        })
    }

    /// Root element name as it was parsed, before any coercion.
    pub fn original_name(&self) -> &QualifiedName {
        &self.original_name
    }

    pub fn original_namespace(&self) -> Option<&str> {
        self.original_name.namespace.as_deref()
    }

    /// Effective name of the root element right now.
    pub fn root_name(&self) -> Result<QualifiedName, DocumentError> {
        let root = self
            .document
            .get_root_element()
            .ok_or(DocumentError::MissingRoot)?;
        Ok(node_name(&root))
    }

    /// Move the root element into `namespace`, keeping its local name.
    ///
    /// Only the root is touched; descendants keep whatever namespace they
    /// were parsed with.
    pub fn coerce_namespace(&mut self, namespace: &str) -> Result<(), DocumentError> {
        let mut root = self
            .document
            .get_root_element()
            .ok_or(DocumentError::MissingRoot)?;
        if root
            .get_namespace()
            .is_some_and(|ns| ns.get_href() == namespace)
        {
            return Ok(());
        }

        let ns = match declared_namespace(&root, namespace) {
            Some(ns) => ns,
            None => {
                let prefix = free_prefix(&root);
                Namespace::new(&prefix, namespace, &mut root).map_err(|e| {
                    DocumentError::Namespace {
                        namespace: namespace.to_string(),
                        reason: e.to_string(),
                    }
                })?
            }
        };
        root.set_namespace(&ns)
            .map_err(|e| DocumentError::Namespace {
                namespace: namespace.to_string(),
                reason: e.to_string(),
            })
    }

    pub(crate) fn as_document(&self) -> &Document {
        &self.document
    }
}

fn node_name(node: &Node) -> QualifiedName {
    let namespace = node.get_namespace().map(|ns| ns.get_href());
    QualifiedName::new(namespace.as_deref(), node.get_name())
}

fn declared_namespace(root: &Node, href: &str) -> Option<Namespace> {
    root.get_namespace_declarations()
        .into_iter()
        .find(|ns| ns.get_href() == href && !ns.get_prefix().is_empty())
}

fn free_prefix(root: &Node) -> String {
    let taken = root
        .get_namespace_declarations()
        .into_iter()
        .map(|ns| ns.get_prefix())
        .collect::<Vec<_>>();
    let mut prefix = COERCED_PREFIX.to_string();
    let mut suffix = 0;
    while taken.contains(&prefix) {
        suffix += 1;
        prefix = format!("{COERCED_PREFIX}{suffix}");
    }
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    const VAST_NS: &str = "http://www.iab.com/VAST";

    #[test]
    fn unqualified_root_is_moved_into_namespace() {
        let mut doc = CandidateDocument::from_xml(r#"<Ad id="1"><AdSystem>x</AdSystem></Ad>"#)
            .expect("parse");
        assert_eq!(doc.original_namespace(), None);

        doc.coerce_namespace(VAST_NS).expect("coerce");

        let name = doc.root_name().expect("root");
        assert_eq!(name.namespace.as_deref(), Some(VAST_NS));
        assert_eq!(name.local_name, "Ad");
        assert_eq!(name.to_string(), "{http://www.iab.com/VAST}Ad");
    }

    #[test]
    fn foreign_namespace_is_replaced_and_remembered() {
        let mut doc =
            CandidateDocument::from_xml(r#"<x:VAST xmlns:x="urn:other" version="4.2"/>"#)
                .expect("parse");
        assert_eq!(doc.original_namespace(), Some("urn:other"));

        doc.coerce_namespace(VAST_NS).expect("coerce");

        assert_eq!(
            doc.root_name().expect("root"),
            QualifiedName::new(Some(VAST_NS), "VAST")
        );
        assert_eq!(doc.original_namespace(), Some("urn:other"));
    }

    #[test]
    fn already_qualified_root_is_left_alone() {
        let xml = format!(r#"<VAST xmlns="{VAST_NS}" version="4.2"/>"#);
        let mut doc = CandidateDocument::from_xml(&xml).expect("parse");
        doc.coerce_namespace(VAST_NS).expect("coerce");
        assert_eq!(doc.root_name().expect("root").namespace.as_deref(), Some(VAST_NS));
    }

    #[test]
    fn taken_prefix_is_not_reused() {
        let mut doc = CandidateDocument::from_xml(r#"<VAST xmlns:vast="urn:other" version="4.2"/>"#)
            .expect("parse");
        doc.coerce_namespace(VAST_NS).expect("coerce");
        assert_eq!(doc.root_name().expect("root").namespace.as_deref(), Some(VAST_NS));
    }

    #[test]
    fn latin1_bytes_are_decoded_by_declaration() {
        let xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<VAST version=\"4.2\"><Ad id=\"1\"><AdTitle>Caf\xE9</AdTitle></Ad></VAST>";
        let doc = CandidateDocument::from_bytes(xml).expect("parse latin-1");
        assert_eq!(doc.original_name().local_name, "VAST");
    }

    #[test]
    fn utf16_bytes_with_bom_are_decoded() {
        let xml = utf16_le_with_bom(r#"<VAST version="4.2"/>"#);
        let doc = CandidateDocument::from_bytes(&xml).expect("parse utf-16");
        assert_eq!(doc.original_name().local_name, "VAST");
    }

    fn utf16_le_with_bom(text: &str) -> Vec<u8> {
        std::iter::once(0xFEFF_u16)
            .chain(text.encode_utf16())
            .flat_map(u16::to_le_bytes)
            .collect()
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let err = CandidateDocument::from_xml("<VAST><Ad></VAST>").unwrap_err();
        assert!(matches!(err, DocumentError::XmlParse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = CandidateDocument::from_file(Path::new("no/such/file.xml")).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
    }
}
