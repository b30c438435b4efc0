//! XML parsing and canonicalization.
//!
//! Tokens are parsed with `roxmltree` and canonicalized with
//! `bergshamra-c14n`. Parsing refuses document type declarations, so no
//! entity is ever expanded, and limits element nesting to [`MAX_DEPTH`].

use bergshamra_c14n::C14nMode;
use bergshamra_xml::nodeset::NodeSet;
use roxmltree::{Document, Edge, Node, ParsingOptions};
use thiserror::Error;

use crate::types::canonicalization_algorithms;

/// Maximum element nesting accepted by [`parse`].
pub const MAX_DEPTH: usize = 64;

/// Errors raised while parsing or canonicalizing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum XmlError {
    /// The parser rejected the input.
    #[error("{0}")]
    Syntax(String),

    /// The document contains a document type declaration.
    #[error("document type declarations are not allowed")]
    DocType,

    /// Elements are nested deeper than [`MAX_DEPTH`].
    #[error("elements nested deeper than {0}")]
    TooDeep(usize),

    /// The canonicalizer rejected the input.
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),
}

impl From<roxmltree::Error> for XmlError {
    fn from(error: roxmltree::Error) -> Self {
        match error {
            roxmltree::Error::DtdDetected => Self::DocType,
            other => Self::Syntax(other.to_string()),
        }
    }
}

/// Parses `text` into a document.
pub fn parse(text: &str) -> Result<Document<'_>, XmlError> {
    let options = ParsingOptions {
        allow_dtd: false,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(text, options)?;

    let mut depth = 0usize;
    for edge in document.root().traverse() {
        match edge {
            Edge::Open(node) if node.is_element() => {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(XmlError::TooDeep(MAX_DEPTH));
                }
            }
            Edge::Close(node) if node.is_element() => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(document)
}

/// Element helpers shared by the readers.
pub trait NodeExt<'a, 'input: 'a> {
    /// Returns true if the element has the given expanded name.
    fn is(self, namespace: &str, local_name: &str) -> bool;

    /// Iterates over child elements.
    fn child_elements(self) -> impl Iterator<Item = Node<'a, 'input>>;

    /// Returns the first child element with the given expanded name.
    fn find_child(self, namespace: &str, local_name: &str) -> Option<Node<'a, 'input>>;

    /// Returns the concatenated text of the direct text children.
    fn text_content(self) -> String;

    /// Returns the concatenated text of all descendants.
    fn deep_text(self) -> String;

    /// Returns the name with the prefix in scope for its namespace.
    fn qualified_name(self) -> String;

    /// Resolves a `prefix:local` value against the in-scope namespaces.
    fn resolve_qname<'q>(self, qname: &'q str) -> Option<(Option<&'a str>, &'q str)>;
}

impl<'a, 'input: 'a> NodeExt<'a, 'input> for Node<'a, 'input> {
    fn is(self, namespace: &str, local_name: &str) -> bool {
        self.is_element() && self.has_tag_name((namespace, local_name))
    }

    fn child_elements(self) -> impl Iterator<Item = Node<'a, 'input>> {
        self.children().filter(Node::is_element)
    }

    fn find_child(self, namespace: &str, local_name: &str) -> Option<Node<'a, 'input>> {
        self.child_elements().find(|e| e.is(namespace, local_name))
    }

    fn text_content(self) -> String {
        self.children()
            .filter(Node::is_text)
            .filter_map(|node| node.text())
            .collect()
    }

    fn deep_text(self) -> String {
        self.descendants()
            .filter(Node::is_text)
            .filter_map(|node| node.text())
            .collect()
    }

    fn qualified_name(self) -> String {
        let name = self.tag_name();
        match name.namespace().and_then(|ns| self.lookup_prefix(ns)) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", name.name()),
            _ => name.name().to_string(),
        }
    }

    fn resolve_qname<'q>(self, qname: &'q str) -> Option<(Option<&'a str>, &'q str)> {
        let qname = qname.trim();
        match qname.split_once(':') {
            Some((prefix, local)) => self
                .lookup_namespace_uri(Some(prefix))
                .map(|ns| (Some(ns), local)),
            None => Some((self.lookup_namespace_uri(None), qname)),
        }
    }
}

/// Canonicalization algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanonicalizationMethod {
    /// Exclusive C14N without comments (recommended).
    #[default]
    ExclusiveC14N,
    /// Exclusive C14N with comments.
    ExclusiveC14NWithComments,
    /// C14N without comments.
    C14N,
    /// C14N with comments.
    C14NWithComments,
}

impl CanonicalizationMethod {
    /// Returns the URI for this canonicalization algorithm.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::ExclusiveC14N => canonicalization_algorithms::EXCLUSIVE_C14N,
            Self::ExclusiveC14NWithComments => {
                canonicalization_algorithms::EXCLUSIVE_C14N_WITH_COMMENTS
            }
            Self::C14N => canonicalization_algorithms::C14N,
            Self::C14NWithComments => canonicalization_algorithms::C14N_WITH_COMMENTS,
        }
    }

    /// Parses a canonicalization algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            canonicalization_algorithms::EXCLUSIVE_C14N => Some(Self::ExclusiveC14N),
            canonicalization_algorithms::EXCLUSIVE_C14N_WITH_COMMENTS => {
                Some(Self::ExclusiveC14NWithComments)
            }
            canonicalization_algorithms::C14N => Some(Self::C14N),
            canonicalization_algorithms::C14N_WITH_COMMENTS => Some(Self::C14NWithComments),
            _ => None,
        }
    }

    /// Returns true for the exclusive variants.
    #[must_use]
    pub const fn is_exclusive(&self) -> bool {
        matches!(self, Self::ExclusiveC14N | Self::ExclusiveC14NWithComments)
    }

    /// Returns the same algorithm with comments removed.
    #[must_use]
    pub const fn without_comments(self) -> Self {
        match self {
            Self::ExclusiveC14N | Self::ExclusiveC14NWithComments => Self::ExclusiveC14N,
            Self::C14N | Self::C14NWithComments => Self::C14N,
        }
    }
}

/// Canonicalizes the subtree rooted at `node`.
///
/// Comments are never part of the node set, as for same-document
/// references. `inclusive_prefixes` only matters for the exclusive methods.
pub fn canonicalize(
    node: Node<'_, '_>,
    method: CanonicalizationMethod,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, XmlError> {
    let mode = C14nMode::from_uri(method.uri())
        .ok_or_else(|| XmlError::Canonicalization(method.uri().to_string()))?;
    let node_set = NodeSet::tree_without_comments(node);
    bergshamra_c14n::canonicalize_doc(node.document(), mode, Some(&node_set), inclusive_prefixes)
        .map_err(|e| XmlError::Canonicalization(e.to_string()))
}
