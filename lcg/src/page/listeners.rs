//! Event subscriptions of widgets.

use lcgdom::{EventKind, NodeId};

use crate::widget::WidgetId;

/// Handle for removing a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Listener {
    id: ListenerId,
    /// `None` for document-level subscriptions.
    node: Option<NodeId>,
    kind: EventKind,
    widget: WidgetId,
}

/// Subscriptions in registration order, which is also delivery order.
#[derive(Debug, Default)]
pub struct Listeners {
    entries: Vec<Listener>,
    next: u64,
}

impl Listeners {
    fn add(&mut self, node: Option<NodeId>, kind: EventKind, widget: WidgetId) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        self.entries.push(Listener {
            id,
            node,
            kind,
            widget,
        });
        id
    }

    pub fn listen(&mut self, node: NodeId, kind: EventKind, widget: WidgetId) -> ListenerId {
        self.add(Some(node), kind, widget)
    }

    pub fn listen_document(&mut self, kind: EventKind, widget: WidgetId) -> ListenerId {
        self.add(None, kind, widget)
    }

    /// Returns false if the subscription was already gone.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|l| l.id != id);
        self.entries.len() != before
    }

    /// Drop every subscription of `widget` on the given nodes.
    pub fn remove_nodes(&mut self, widget: WidgetId, nodes: &[NodeId]) {
        self.entries
            .retain(|l| l.widget != widget || l.node.is_none_or(|n| !nodes.contains(&n)));
    }

    /// Drop every subscription of `widget`.
    pub fn remove_widget(&mut self, widget: WidgetId) {
        self.entries.retain(|l| l.widget != widget);
    }

    /// Widgets listening for `kind` on `node`, in registration order.
    pub fn on_node(&self, node: NodeId, kind: EventKind) -> Vec<WidgetId> {
        self.entries
            .iter()
            .filter(|l| l.node == Some(node) && l.kind == kind)
            .map(|l| l.widget)
            .collect()
    }

    pub fn on_document(&self, kind: EventKind) -> Vec<WidgetId> {
        self.entries
            .iter()
            .filter(|l| l.node.is_none() && l.kind == kind)
            .map(|l| l.widget)
            .collect()
    }

    /// Number of document-level subscriptions.
    pub fn document_count(&self) -> usize {
        self.entries.iter().filter(|l| l.node.is_none()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
