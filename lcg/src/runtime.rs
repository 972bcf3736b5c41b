//! Event dispatch.
//!
//! Events bubble from their target up through its ancestors. At each node
//! the widgets listening there run in registration order; when one of them
//! stops propagation the remaining ancestors and the document-level
//! listeners are skipped. Requests widgets leave on the page are delivered
//! right after the listener that made them, while the event is still live,
//! and deferred tasks run once the whole dispatch is over.

use std::collections::HashMap;

use lcgdom::{CookieError, Event, NodeId};

use crate::config::PageConfig;
use crate::page::Page;
use crate::widget::{Widget, WidgetId, WidgetRequest};

pub struct Runtime {
    pub page: Page,
    widgets: HashMap<WidgetId, Box<dyn Widget>>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&WidgetId> = self.widgets.keys().collect();
        ids.sort();
        f.debug_struct("Runtime")
            .field("page", &self.page)
            .field("widgets", &ids)
            .finish()
    }
}

impl Runtime {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            widgets: HashMap::new(),
        }
    }

    pub fn from_html(html: &str, config: PageConfig) -> Result<Self, CookieError> {
        Ok(Self::new(Page::from_html(html, config)?))
    }

    /// Hand a constructed widget to the runtime so it receives events.
    ///
    /// Work the constructor deferred (initial focus, panel switches) runs
    /// right away.
    pub fn mount<W: Widget>(&mut self, widget: W) -> WidgetId {
        let id = widget.id();
        log::debug!("[runtime] mount {id} on {}", widget.element());
        self.widgets.insert(id, Box::new(widget));
        self.process_requests(None);
        self.page.run_pending();
        id
    }

    pub fn unmount(&mut self, id: WidgetId) -> Option<Box<dyn Widget>> {
        let widget = self.widgets.remove(&id)?;
        if self.page.open_popup() == Some(id) {
            self.page.dismiss_popup();
        }
        self.page.forget_widget(id);
        Some(widget)
    }

    pub fn widget<W: Widget>(&self, id: WidgetId) -> Option<&W> {
        self.widgets.get(&id)?.as_any().downcast_ref()
    }

    pub fn widget_mut<W: Widget>(&mut self, id: WidgetId) -> Option<&mut W> {
        self.widgets.get_mut(&id)?.as_any_mut().downcast_mut()
    }

    /// Run `f` against a mounted widget and the page, then deliver requests
    /// and run deferred tasks.
    pub fn with_widget<W: Widget, R>(&mut self, id: WidgetId, f: impl FnOnce(&mut W, &mut Page) -> R) -> Option<R> {
        let widget = self.widgets.get_mut(&id)?.as_any_mut().downcast_mut::<W>()?;
        let result = f(widget, &mut self.page);
        self.process_requests(None);
        self.page.run_pending();
        Some(result)
    }

    /// Queue a request for `widget` and deliver it.
    pub fn request(&mut self, widget: WidgetId, request: WidgetRequest) {
        self.page.request(widget, request);
        self.process_requests(None);
        self.page.run_pending();
    }

    /// Dispatch `event` and run the tasks it caused. Returns the event so the
    /// caller can inspect `default_prevented` and friends.
    pub fn dispatch(&mut self, mut event: Event) -> Event {
        self.dispatch_handlers(&mut event);
        self.page.run_pending();
        event
    }

    /// Dispatch `event` without running deferred tasks, as if the next turn of
    /// the event loop had not come yet.
    pub fn dispatch_handlers(&mut self, event: &mut Event) {
        log::trace!("[runtime] {:?} on {}", event.kind, event.target);
        for node in self.page.document.ancestors_inclusive(event.target) {
            for widget in self.page.listeners().on_node(node, event.kind) {
                self.deliver(widget, event, Some(node));
            }
            if event.propagation_stopped() {
                return;
            }
        }
        for widget in self.page.listeners().on_document(event.kind) {
            self.deliver(widget, event, None);
        }
    }

    /// Run deferred tasks.
    pub fn run_pending(&mut self) -> usize {
        self.page.run_pending()
    }

    fn deliver(&mut self, id: WidgetId, event: &mut Event, current: Option<NodeId>) {
        let Some(widget) = self.widgets.get_mut(&id) else {
            log::debug!("[runtime] {id} is not mounted; dropping {:?}", event.kind);
            return;
        };
        widget.handle_event(event, current, &mut self.page);
        self.process_requests(Some(event));
    }

    fn process_requests(&mut self, mut event: Option<&mut Event>) {
        loop {
            let requests = self.page.take_requests();
            if requests.is_empty() {
                return;
            }
            for (id, request) in requests {
                match self.widgets.get_mut(&id) {
                    Some(widget) => widget.handle_request(request, event.as_deref_mut(), &mut self.page),
                    None => log::warn!("[runtime] request {request:?} for unmounted {id}"),
                }
            }
        }
    }
}
