//! Buttons running a callback.

use lcgdom::{Event, EventKind, NodeId};

use crate::callback::{Callback, CallbackFn};
use crate::error::{ElementRef, WidgetError};
use crate::page::Page;
use crate::widget::{Widget, WidgetId};

/// Runs a callback when any `button` inside the element is clicked. The
/// callback receives the widget element as the invoking element.
pub struct Button {
    id: WidgetId,
    element: NodeId,
    callback: Option<CallbackFn>,
}

impl std::fmt::Debug for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button")
            .field("id", &self.id)
            .field("element", &self.element)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl Button {
    /// A named callback is resolved now; if it is not registered the buttons
    /// stay inert.
    pub fn new<'a>(page: &mut Page, element: impl Into<ElementRef<'a>>, callback: Option<Callback>) -> Result<Self, WidgetError> {
        let element = element.into().resolve(&page.document)?;
        let id = page.register_widget(element);
        let callback = callback.and_then(|c| c.resolve(page.callbacks()));
        if callback.is_some() {
            for button in page.document.query_all(element, "button") {
                page.listen(button, EventKind::Click, id);
            }
        }
        Ok(Self { id, element, callback })
    }
}

impl Widget for Button {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn element(&self) -> NodeId {
        self.element
    }

    fn handle_event(&mut self, event: &mut Event, current: Option<NodeId>, page: &mut Page) {
        if current.is_none() || event.kind != EventKind::Click {
            return;
        }
        if let Some(callback) = self.callback.clone() {
            callback(page, event, Some(self.element), &[]);
        }
        event.prevent_default();
        event.stop_propagation();
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
