//! Loading server-rendered HTML into a [`Document`].

use kuchiki::traits::*;
use kuchiki::NodeRef;

use crate::element::{Document, Node, NodeId};

impl Document {
    /// Parse an HTML fragment or page.
    ///
    /// The children of the parsed `body` become children of the document
    /// root. Comments, doctypes and processing instructions are dropped;
    /// whitespace-only text between elements is kept as text nodes.
    pub fn parse_html(html: &str) -> Self {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_html(root, html);
        log::trace!("[dom] parsed {} bytes of HTML", html.len());
        doc
    }

    /// Parse an HTML fragment and append its nodes to `parent`.
    ///
    /// Returns the top-level nodes that were appended.
    pub fn append_html(&mut self, parent: NodeId, html: &str) -> Vec<NodeId> {
        let parsed = kuchiki::parse_html().one(html);
        let Ok(body) = parsed.select_first("body") else {
            log::warn!("[dom] parsed HTML has no body element");
            return Vec::new();
        };
        let top: Vec<NodeRef> = body.as_node().children().collect();
        top.into_iter()
            .filter_map(|child| self.adopt(parent, child))
            .collect()
    }

    /// Move a parsed node and its subtree under `parent`.
    fn adopt(&mut self, parent: NodeId, source: NodeRef) -> Option<NodeId> {
        if source.as_element().is_none() && source.as_text().is_none() {
            source.detach();
            return None;
        }
        let children: Vec<NodeRef> = source.children().collect();
        let node = self.insert(Node::adopt(source));
        self.append_child(parent, node);
        for child in children {
            self.adopt(node, child);
        }
        Some(node)
    }
}
