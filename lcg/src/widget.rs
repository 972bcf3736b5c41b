//! The widget trait and widget identity.

use std::any::Any;

use lcgdom::{Event, NodeId};

use crate::page::Page;

/// Unique identifier for a widget instance on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub(crate) usize);

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__widget_{}", self.0)
    }
}

/// Work one widget asks of another, delivered by the runtime after the
/// current listener returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetRequest {
    /// Pop the menu up next to `invoker`. With `from_event` set, the event
    /// being dispatched positions the menu.
    Popup {
        invoker: NodeId,
        from_event: bool,
        selected_index: Option<usize>,
    },
    Dismiss,
}

/// A widget bound to one root element.
///
/// The runtime owns mounted widgets and routes events to them: every event
/// whose propagation path contains a node the widget listens on, plus
/// document-level events the widget subscribed to.
pub trait Widget: Any {
    fn id(&self) -> WidgetId;

    /// Root element.
    fn element(&self) -> NodeId;

    /// Handle an event. `current` is the listened-on node the event reached,
    /// `None` for document-level listeners.
    fn handle_event(&mut self, event: &mut Event, current: Option<NodeId>, page: &mut Page);

    /// Handle a request from another widget.
    fn handle_request(&mut self, request: WidgetRequest, event: Option<&mut Event>, page: &mut Page) {
        let _ = (event, page);
        log::debug!("[widget] {} ignores {request:?}", self.id());
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
