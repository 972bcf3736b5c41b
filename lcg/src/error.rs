//! Widget construction errors.

use lcgdom::{Document, DomError, NodeId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// The root element (or a part the widget cannot live without) is missing.
    #[error("element not found: {0}")]
    ElementNotFound(String),
    /// The element exists but no widget instance is bound to it.
    #[error("element {0} is not bound to a widget")]
    NotAWidget(NodeId),
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// How a widget constructor is told which element to attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRef<'a> {
    /// Element id, looked up in the document.
    Id(&'a str),
    Node(NodeId),
}

impl ElementRef<'_> {
    pub fn resolve(self, document: &Document) -> Result<NodeId, WidgetError> {
        match self {
            ElementRef::Id(id) => document
                .by_id(id)
                .ok_or_else(|| WidgetError::ElementNotFound(format!("#{id}"))),
            ElementRef::Node(node) if document.contains_node(node) => Ok(node),
            ElementRef::Node(node) => Err(DomError::UnknownNode(node).into()),
        }
    }
}

impl<'a> From<&'a str> for ElementRef<'a> {
    fn from(id: &'a str) -> Self {
        ElementRef::Id(id)
    }
}

impl From<NodeId> for ElementRef<'_> {
    fn from(node: NodeId) -> Self {
        ElementRef::Node(node)
    }
}
