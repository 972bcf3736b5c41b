//! The element arena.
//!
//! A [`Document`] owns every node. Widgets hold [`NodeId`] handles and go
//! through the document for every read and mutation, which keeps graph
//! algorithms in the widgets free of borrowed DOM references.
//!
//! Each arena node wraps a kuchiki node and the arena mirrors the kuchiki
//! tree, so CSS selectors are matched by kuchiki against the same structure.

mod node;

use kuchiki::{ElementData, NodeDataRef, Selectors};

pub use node::NodeId;
pub(crate) use node::Node;

use crate::error::DomError;
use crate::layout::BoxModel;

#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    focused: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a `body` root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::element("body")],
            root: NodeId(0),
            focused: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a detached element. Attach it with [`Document::append_child`].
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.insert(Node::element(tag))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.insert(Node::text(text))
    }

    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(parent).is_none() || self.node(child).is_none() || parent == child {
            return;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if let (Some(p), Some(c)) = (self.node(parent), self.node(child)) {
            p.dom.append(c.dom.clone());
        }
    }

    /// Insert `child` as the first child of `parent`, detaching it first.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(parent).is_none() || self.node(child).is_none() || parent == child {
            return;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.insert(0, child);
        }
        if let (Some(p), Some(c)) = (self.node(parent), self.node(child)) {
            p.dom.prepend(c.dom.clone());
        }
    }

    /// Remove `node` from its parent. The node stays in the arena.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != node);
        }
        if let Some(n) = self.node_mut(node) {
            n.parent = None;
            n.dom.detach();
        }
        if self.focused.is_some_and(|f| !self.is_attached(f)) {
            self.focused = None;
        }
    }

    /// Detach all children of `node`, returning them in order.
    pub fn remove_children(&mut self, node: NodeId) -> Vec<NodeId> {
        let children = self.children(node).to_vec();
        for child in &children {
            self.detach(*child);
        }
        children
    }

    // -------------------------------------------------------------------------
    // Tree access
    // -------------------------------------------------------------------------

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Element children of `node`, skipping text nodes.
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    /// Element children of `node` with the given tag.
    pub fn children_with_tag(&self, node: NodeId, tag: &str) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|c| self.tag(*c) == tag)
            .collect()
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(Node::is_element)
    }

    /// Lowercase tag name, empty for text nodes and unknown handles.
    pub fn tag(&self, node: NodeId) -> &str {
        self.node(node).map(Node::tag).unwrap_or("")
    }

    /// All descendants of `node` in document order, excluding `node`.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(node, &mut out);
        out
    }

    fn collect_descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(node) {
            out.push(*child);
            self.collect_descendants(*child, out);
        }
    }

    /// `node` followed by its ancestors up to the top of its tree.
    pub fn ancestors_inclusive(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.node(node).map(|_| node);
        while let Some(id) = current {
            out.push(id);
            current = self.parent(id);
        }
        out
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors_inclusive(node).contains(&ancestor)
    }

    /// Whether `node` is reachable from the document root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(self.root, node)
    }

    /// Find an attached element by its `id` attribute.
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        if self.id(self.root) == Some(id) {
            return Some(self.root);
        }
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.id(*n) == Some(id))
    }

    // -------------------------------------------------------------------------
    // Selectors
    // -------------------------------------------------------------------------

    /// First descendant of `scope` matching `selector`.
    pub fn select_first(&self, scope: NodeId, selector: &Selectors) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|n| self.matches(*n, selector))
    }

    /// All descendants of `scope` matching `selector`, in document order.
    pub fn select_all(&self, scope: NodeId, selector: &Selectors) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| self.matches(*n, selector))
            .collect()
    }

    /// `node` or its nearest ancestor matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selectors) -> Option<NodeId> {
        self.ancestors_inclusive(node)
            .into_iter()
            .find(|n| self.matches(*n, selector))
    }

    /// Whether `node` is an element matched by `selector`.
    pub fn matches(&self, node: NodeId, selector: &Selectors) -> bool {
        self.element_ref(node)
            .is_some_and(|element| selector.matches(&element))
    }

    fn element_ref(&self, node: NodeId) -> Option<NodeDataRef<ElementData>> {
        self.node(node)?.dom.clone().into_element_ref()
    }

    /// Like [`Document::select_first`] with a selector string.
    ///
    /// An invalid selector is logged and treated as matching nothing.
    pub fn query(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        compile_or_log(selector).and_then(|s| self.select_first(scope, &s))
    }

    /// Like [`Document::select_all`] with a selector string.
    pub fn query_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        compile_or_log(selector)
            .map(|s| self.select_all(scope, &s))
            .unwrap_or_default()
    }

    /// Like [`Document::closest`] with a selector string.
    pub fn closest_matching(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        compile_or_log(selector).and_then(|s| self.closest(node, &s))
    }

    // -------------------------------------------------------------------------
    // Attributes
    // -------------------------------------------------------------------------

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)
            .and_then(|n| n.attributes.get(name))
            .map(String::as_str)
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(n) = self.node_mut(node) {
            n.set_attribute(name, value.into());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) -> Option<String> {
        self.node_mut(node)?.remove_attribute(name)
    }

    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.attr(node, "id")
    }

    // -------------------------------------------------------------------------
    // Classes
    // -------------------------------------------------------------------------

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node) {
            n.add_class(class);
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node) {
            n.remove_class(class);
        }
    }

    /// The `class` attribute as written, or `None` when the element has no classes.
    pub fn class_name(&self, node: NodeId) -> Option<String> {
        self.node(node)
            .filter(|n| !n.classes.is_empty())
            .map(|n| n.classes.join(" "))
    }

    // -------------------------------------------------------------------------
    // Visibility
    // -------------------------------------------------------------------------

    pub fn show(&mut self, node: NodeId) {
        if let Some(n) = self.node_mut(node) {
            n.hidden = false;
        }
    }

    pub fn hide(&mut self, node: NodeId) {
        if let Some(n) = self.node_mut(node) {
            n.hidden = true;
        }
        if self.focused.is_some_and(|f| !self.is_visible(f)) {
            self.focused = None;
        }
    }

    /// Whether the node itself was hidden.
    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.node(node).is_none_or(|n| n.hidden)
    }

    /// Whether neither the node nor any of its ancestors is hidden.
    pub fn is_visible(&self, node: NodeId) -> bool {
        self.node(node).is_some()
            && self
                .ancestors_inclusive(node)
                .into_iter()
                .all(|n| !self.is_hidden(n))
    }

    // -------------------------------------------------------------------------
    // Text
    // -------------------------------------------------------------------------

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        self.node(node)
            .map(|n| n.dom.text_contents())
            .unwrap_or_default()
    }

    /// Replace the children of `node` with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.remove_children(node);
        let t = self.create_text(text);
        self.append_child(node, t);
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    pub fn layout(&self, node: NodeId) -> BoxModel {
        self.node(node).map(|n| n.layout).unwrap_or_default()
    }

    pub fn set_layout(&mut self, node: NodeId, layout: BoxModel) {
        if let Some(n) = self.node_mut(node) {
            n.layout = layout;
        }
    }

    pub fn update_layout(&mut self, node: NodeId, f: impl FnOnce(&mut BoxModel)) {
        if let Some(n) = self.node_mut(node) {
            f(&mut n.layout);
        }
    }

    // -------------------------------------------------------------------------
    // Focus
    // -------------------------------------------------------------------------

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Move input focus to `node`.
    ///
    /// Fails when the node is unknown, detached or not visible; focus is
    /// left where it was in that case.
    pub fn focus(&mut self, node: NodeId) -> Result<(), DomError> {
        if self.node(node).is_none() {
            return Err(DomError::UnknownNode(node));
        }
        if !self.is_attached(node) {
            return Err(DomError::Detached(node));
        }
        if !self.is_visible(node) {
            return Err(DomError::Hidden(node));
        }
        self.focused = Some(node);
        Ok(())
    }

    /// Clear focus. Returns true if something was focused.
    pub fn blur(&mut self) -> bool {
        self.focused.take().is_some()
    }
}

/// Compile a CSS selector list.
pub fn compile_selector(selector: &str) -> Result<Selectors, DomError> {
    Selectors::compile(selector).map_err(|()| DomError::InvalidSelector {
        selector: selector.to_string(),
        reason: "not a supported CSS selector".to_string(),
    })
}

fn compile_or_log(selector: &str) -> Option<Selectors> {
    match compile_selector(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            log::warn!("[dom] {e}");
            None
        }
    }
}
