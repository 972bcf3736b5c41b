use std::collections::BTreeMap;

use html5ever::{LocalName, Namespace, QualName};
use kuchiki::NodeRef;

use crate::layout::BoxModel;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Opaque handle to a node in a [`Document`](super::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the document arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#node-{}", self.0)
    }
}

/// Arena record of a single node.
///
/// `dom` is the kuchiki node selectors match against. Attributes are kept
/// here as well so reads can hand out `&str`; every write goes to both.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub dom: NodeRef,
    /// Includes `class` while `classes` is non-empty.
    pub attributes: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Set by `hide()`, cleared by `show()`.
    pub hidden: bool,
    pub layout: BoxModel,
}

impl Node {
    pub fn element(tag: &str) -> Self {
        Self::adopt(NodeRef::new_element(html_name(tag), std::iter::empty()))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::adopt(NodeRef::new_text(text))
    }

    /// Wrap an existing kuchiki node, reading its attributes.
    pub fn adopt(dom: NodeRef) -> Self {
        let mut attributes = BTreeMap::new();
        let mut classes = Vec::new();
        if let Some(element) = dom.as_element() {
            for (name, attribute) in element.attributes.borrow().map.iter() {
                if &*name.local == "class" {
                    classes = split_classes(&attribute.value);
                } else {
                    attributes.insert(name.local.to_string(), attribute.value.clone());
                }
            }
        }
        let node = Self {
            dom,
            attributes,
            classes,
            parent: None,
            children: Vec::new(),
            hidden: false,
            layout: BoxModel::default(),
        };
        node.with_classes_written()
    }

    fn with_classes_written(mut self) -> Self {
        self.write_classes();
        self
    }

    pub fn is_element(&self) -> bool {
        self.dom.as_element().is_some()
    }

    /// Lowercase tag name; empty for text nodes.
    pub fn tag(&self) -> &str {
        self.dom
            .as_element()
            .map(|e| &*e.name.local)
            .unwrap_or("")
    }

    pub fn set_attribute(&mut self, name: &str, value: String) {
        if name == "class" {
            self.classes = split_classes(&value);
            self.write_classes();
            return;
        }
        self.write_attribute(name, Some(&value));
        self.attributes.insert(name.to_string(), value);
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        if name == "class" {
            self.classes.clear();
        }
        self.write_attribute(name, None);
        self.attributes.remove(name)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
            self.write_classes();
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        if self.classes.len() != before {
            self.write_classes();
        }
    }

    fn write_classes(&mut self) {
        if self.classes.is_empty() {
            self.write_attribute("class", None);
            self.attributes.remove("class");
        } else {
            let joined = self.classes.join(" ");
            self.write_attribute("class", Some(&joined));
            self.attributes.insert("class".to_string(), joined);
        }
    }

    fn write_attribute(&self, name: &str, value: Option<&str>) {
        let Some(element) = self.dom.as_element() else {
            return;
        };
        let mut attributes = element.attributes.borrow_mut();
        match value {
            Some(value) => {
                attributes.insert(name, value.to_string());
            }
            None => {
                attributes.remove(name);
            }
        }
    }
}

fn split_classes(value: &str) -> Vec<String> {
    let mut classes: Vec<String> = Vec::new();
    for class in value.split_whitespace() {
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }
    classes
}

fn html_name(tag: &str) -> QualName {
    QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from(tag.to_ascii_lowercase()),
    )
}
