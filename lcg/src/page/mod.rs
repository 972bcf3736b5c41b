//! The page a set of widgets lives on.
//!
//! `Page` bundles the document with everything the browser would otherwise
//! provide ambiently: the cookie jar, the location, the viewport, the
//! "next turn of the event loop" task queue and event subscriptions. It also
//! holds the cross-widget state: the single open popup, notebook activation
//! callbacks and the element-to-widget map.

mod listeners;

use std::collections::HashMap;
use std::time::Duration;

use lcgdom::{
    CookieError, CookieStore, Cookies, Document, Event, EventKind, NodeId, Overflow, TaskError, TaskQueue,
};
use url::Url;

use crate::callback::{CallbackFlow, CallbackFn, CallbackRegistry};
use crate::config::{PageConfig, Viewport};
use crate::notebook::ActivationRegistry;
use crate::popup::PopupCoordinator;
use crate::widget::{WidgetId, WidgetRequest};

pub use listeners::{ListenerId, Listeners};

/// Upper bound on deferred tasks run by a single [`Page::run_pending`].
const MAX_TASKS_PER_DRAIN: usize = 10_000;

/// End state of an animated geometry change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    pub top: Option<i32>,
    pub height: Option<i32>,
    pub overflow_y: Option<Overflow>,
    pub duration: Duration,
}

impl Transition {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }

    pub fn top(mut self, top: i32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn height(mut self, height: i32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn overflow_y(mut self, overflow: Overflow) -> Self {
        self.overflow_y = Some(overflow);
        self
    }
}

pub struct Page {
    pub document: Document,
    config: PageConfig,
    cookies: Box<dyn CookieStore>,
    tasks: TaskQueue<Page>,
    listeners: Listeners,
    instances: HashMap<NodeId, WidgetId>,
    next_widget: usize,
    requests: Vec<(WidgetId, WidgetRequest)>,
    callbacks: CallbackRegistry,
    navigations: Vec<Url>,
    task_errors: Vec<TaskError>,
    pub(crate) popups: PopupCoordinator,
    pub(crate) activations: ActivationRegistry,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("location", &self.config.location)
            .field("widgets", &self.instances.len())
            .field("listeners", &self.listeners.len())
            .field("tasks", &self.tasks)
            .field("popups", &self.popups)
            .finish()
    }
}

impl Page {
    /// Create a page around `document`.
    ///
    /// Fails if the configured cookie path is not usable.
    pub fn new(document: Document, config: PageConfig) -> Result<Self, CookieError> {
        let mut cookies = Cookies::new(config.cookie_path.as_deref(), config.cookie_domain.as_deref())?;
        if let Some(initial) = &config.initial_cookies {
            cookies.seed(initial);
        }
        Ok(Self {
            document,
            config,
            cookies: Box::new(cookies),
            tasks: TaskQueue::new(),
            listeners: Listeners::default(),
            instances: HashMap::new(),
            next_widget: 0,
            requests: Vec::new(),
            callbacks: CallbackRegistry::default(),
            navigations: Vec::new(),
            task_errors: Vec::new(),
            popups: PopupCoordinator::default(),
            activations: ActivationRegistry::default(),
        })
    }

    /// Parse `html` and create a page around it.
    pub fn from_html(html: &str, config: PageConfig) -> Result<Self, CookieError> {
        Self::new(Document::parse_html(html), config)
    }

    /// Replace the cookie store, e.g. with one backed by a real browser.
    pub fn with_cookie_store(mut self, store: impl CookieStore + 'static) -> Self {
        self.cookies = Box::new(store);
        self
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn location(&self) -> Option<&Url> {
        self.config.location.as_ref()
    }

    pub fn set_location(&mut self, location: Url) {
        self.config.location = Some(location);
    }

    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.config.viewport = viewport;
    }

    pub fn cookies(&self) -> &dyn CookieStore {
        self.cookies.as_ref()
    }

    pub fn cookies_mut(&mut self) -> &mut dyn CookieStore {
        self.cookies.as_mut()
    }

    // =========================================================================
    // Widget instances
    // =========================================================================

    /// Allocate an id for a widget rooted at `element` and bind the element
    /// to it. A later widget on the same element replaces the binding.
    pub fn register_widget(&mut self, element: NodeId) -> WidgetId {
        let id = WidgetId(self.next_widget);
        self.next_widget += 1;
        if let Some(previous) = self.instances.insert(element, id) {
            log::debug!("[page] {element} rebound from {previous} to {id}");
        }
        id
    }

    /// The widget bound to `element`, if any.
    pub fn widget_instance_of(&self, element: NodeId) -> Option<WidgetId> {
        self.instances.get(&element).copied()
    }

    /// The widget bound to the element with the given id.
    pub fn widget_instance_by_id(&self, id: &str) -> Option<WidgetId> {
        self.document.by_id(id).and_then(|node| self.widget_instance_of(node))
    }

    pub(crate) fn forget_widget(&mut self, widget: WidgetId) {
        self.instances.retain(|_, w| *w != widget);
        self.listeners.remove_widget(widget);
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    pub fn listen(&mut self, node: NodeId, kind: EventKind, widget: WidgetId) -> ListenerId {
        self.listeners.listen(node, kind, widget)
    }

    pub fn listen_document(&mut self, kind: EventKind, widget: WidgetId) -> ListenerId {
        self.listeners.listen_document(kind, widget)
    }

    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Drop the subscriptions `widget` holds on `node` and its descendants.
    pub fn unlisten_subtree(&mut self, node: NodeId, widget: WidgetId) {
        let mut nodes = self.document.descendants(node);
        nodes.push(node);
        self.listeners.remove_nodes(widget, &nodes);
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Ask `widget` to do something once the current handler has returned.
    pub fn request(&mut self, widget: WidgetId, request: WidgetRequest) {
        self.requests.push((widget, request));
    }

    pub(crate) fn take_requests(&mut self) -> Vec<(WidgetId, WidgetRequest)> {
        std::mem::take(&mut self.requests)
    }

    // =========================================================================
    // Deferred tasks
    // =========================================================================

    /// Run `task` after the current event has been handled.
    pub fn defer(&mut self, label: &'static str, task: impl FnOnce(&mut Page) + 'static) {
        self.tasks.defer(label, task);
    }

    /// Move focus to `target` on the next turn.
    ///
    /// The target may not be focusable yet: a panel being shown or a menu
    /// still sliding open. Deferring gives the current handler a chance to
    /// finish those changes. Refusals are logged and otherwise ignored.
    pub fn set_focus(&mut self, target: Option<NodeId>) {
        let Some(node) = target else {
            return;
        };
        self.defer("focus", move |page| {
            if let Err(e) = page.document.focus(node) {
                log::debug!("[focus] {e}");
            }
        });
    }

    /// Animate `node` towards `transition` and run `done` when finished.
    ///
    /// The end geometry is applied when the completion task runs, so until
    /// then the element keeps the start state set by the caller.
    pub fn transition(&mut self, node: NodeId, transition: Transition, done: impl FnOnce(&mut Page) + 'static) {
        self.transition_while(node, transition, |_| true, done);
    }

    /// Like [`Page::transition`], but the completion does nothing unless
    /// `live` still holds when it runs. A superseded animation must not
    /// overwrite the geometry of the one that replaced it.
    pub fn transition_while(
        &mut self,
        node: NodeId,
        transition: Transition,
        live: impl FnOnce(&Page) -> bool + 'static,
        done: impl FnOnce(&mut Page) + 'static,
    ) {
        log::trace!("[page] transition {node} over {:?}", transition.duration);
        self.defer("transition", move |page| {
            if !live(page) {
                log::debug!("[page] transition of {node} superseded");
                return;
            }
            page.document.update_layout(node, |layout| {
                if let Some(top) = transition.top {
                    layout.rect.y = top;
                }
                if let Some(height) = transition.height {
                    layout.rect.height = height;
                }
                if let Some(overflow) = transition.overflow_y {
                    layout.overflow_y = overflow;
                }
            });
            done(page);
        });
    }

    /// Run deferred tasks until the queue is empty, including tasks the
    /// running ones schedule. Returns the number of tasks run.
    ///
    /// A panicking task is logged and recorded; the remaining tasks still run.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while ran < MAX_TASKS_PER_DRAIN {
            let Some(task) = self.tasks.pop() else {
                return ran;
            };
            if let Err(e) = task.run(self) {
                log::error!("[page] {e}");
                self.task_errors.push(e);
            }
            ran += 1;
        }
        log::warn!("[page] {} tasks still pending after {ran} runs", self.tasks.len());
        ran
    }

    pub fn pending_tasks(&self) -> Vec<&'static str> {
        self.tasks.labels()
    }

    /// Failures of deferred tasks so far.
    pub fn task_errors(&self) -> &[TaskError] {
        &self.task_errors
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Follow a link. Relative targets resolve against the location.
    pub fn navigate(&mut self, href: &str) {
        let target = match self.location() {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };
        match target {
            Ok(url) => {
                log::info!("[page] navigate to {url}");
                self.config.location = Some(url.clone());
                self.navigations.push(url);
            }
            Err(e) => log::warn!("[page] cannot navigate to {href:?}: {e}"),
        }
    }

    /// Every location navigated to, oldest first.
    pub fn navigations(&self) -> &[Url] {
        &self.navigations
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    /// Make `f` available to widgets under `name`.
    pub fn register_callback(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&mut Page, &mut Event, Option<NodeId>, &[String]) -> CallbackFlow + 'static,
    ) {
        self.callbacks.register(name, f);
    }

    pub fn callback(&self, name: &str) -> Option<CallbackFn> {
        self.callbacks.get(name)
    }

    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    // =========================================================================
    // Popups
    // =========================================================================

    /// The widget whose popup is open, if any.
    pub fn open_popup(&self) -> Option<WidgetId> {
        self.popups.active()
    }

    /// Close the open popup: drop its document listeners, hide it, and hand
    /// focus back to the element it was invoked from.
    pub fn dismiss_popup(&mut self) -> Option<WidgetId> {
        let open = self.popups.take()?;
        for listener in &open.listeners {
            self.listeners.remove(*listener);
        }
        self.document.hide(open.element);
        self.document
            .update_layout(open.element, |layout| layout.rect.height = open.height);
        if let Some(invoker) = open.invoker {
            self.document.set_attr(invoker, "aria-expanded", "false");
            self.set_focus(Some(invoker));
        }
        log::debug!("[popup] dismissed {}", open.widget);
        Some(open.widget)
    }
}
