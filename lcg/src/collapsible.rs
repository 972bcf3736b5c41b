//! Collapsible sections and panes.
//!
//! A heading toggles the visibility of the content below it. Sections use
//! their first heading element and `div.section-content`; panes use the
//! link in `.pane-title` and `.pane-content`.

use lcgdom::{Event, EventKind, NodeId};

use crate::error::{ElementRef, WidgetError};
use crate::page::{Page, Transition};
use crate::widget::{Widget, WidgetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapsibleKind {
    Section,
    Pane,
}

impl CollapsibleKind {
    fn heading(self, page: &mut Page, element: NodeId) -> Option<NodeId> {
        match self {
            CollapsibleKind::Section => {
                let heading = page.document.query(element, "h1,h2,h3,h4,h5,h6,h7,h8")?;
                page.document.add_class(heading, "collapsible-section-heading");
                if let Some(backref) = page.document.query(heading, "a.backref") {
                    page.document.set_attr(backref, "href", "");
                }
                Some(heading)
            }
            CollapsibleKind::Pane => page.document.query(element, ".pane-title a"),
        }
    }

    fn content(self, page: &Page, element: NodeId) -> Option<NodeId> {
        match self {
            CollapsibleKind::Section => page.document.query(element, "div.section-content"),
            CollapsibleKind::Pane => page.document.query(element, ".pane-content"),
        }
    }
}

#[derive(Debug)]
pub struct Collapsible {
    id: WidgetId,
    element: NodeId,
    kind: CollapsibleKind,
    heading: NodeId,
    content: NodeId,
}

impl Collapsible {
    pub fn section<'a>(page: &mut Page, element: impl Into<ElementRef<'a>>, collapsed: bool) -> Result<Self, WidgetError> {
        Self::new(page, element.into(), CollapsibleKind::Section, collapsed)
    }

    pub fn pane<'a>(page: &mut Page, element: impl Into<ElementRef<'a>>, collapsed: bool) -> Result<Self, WidgetError> {
        Self::new(page, element.into(), CollapsibleKind::Pane, collapsed)
    }

    fn new(page: &mut Page, element: ElementRef<'_>, kind: CollapsibleKind, collapsed: bool) -> Result<Self, WidgetError> {
        let element = element.resolve(&page.document)?;
        let heading = kind
            .heading(page, element)
            .ok_or_else(|| WidgetError::ElementNotFound(format!("{kind:?} heading")))?;
        let content = kind
            .content(page, element)
            .ok_or_else(|| WidgetError::ElementNotFound(format!("{kind:?} content")))?;
        let id = page.register_widget(element);

        let doc = &mut page.document;
        let icon = doc.create_element("span");
        doc.add_class(icon, "icon");
        doc.append_child(heading, icon);
        if collapsed {
            doc.add_class(element, "collapsed");
            doc.hide(content);
        } else {
            doc.add_class(element, "expanded");
        }
        if doc.id(content).is_none() {
            let root_id = doc.id(element).map_or_else(|| id.to_string(), str::to_string);
            doc.set_attr(content, "id", format!("{root_id}-collapsible-content"));
        }
        let content_id = doc.id(content).unwrap_or_default().to_string();
        doc.set_attr(heading, "aria-expanded", if collapsed { "false" } else { "true" });
        doc.set_attr(heading, "aria-controls", content_id);
        page.listen(heading, EventKind::Click, id);
        Ok(Self {
            id,
            element,
            kind,
            heading,
            content,
        })
    }

    pub fn kind(&self) -> CollapsibleKind {
        self.kind
    }

    pub fn heading(&self) -> NodeId {
        self.heading
    }

    pub fn content(&self) -> NodeId {
        self.content
    }

    pub fn expanded(&self, page: &Page) -> bool {
        page.document.has_class(self.element, "expanded")
    }

    pub fn expand(&mut self, page: &mut Page) {
        page.document.remove_class(self.element, "collapsed");
        page.document.add_class(self.element, "expanded");
        page.document.set_attr(self.heading, "aria-expanded", "true");
        page.document.show(self.content);
    }

    pub fn collapse(&mut self, page: &mut Page) {
        page.document.remove_class(self.element, "expanded");
        page.document.add_class(self.element, "collapsed");
        page.document.set_attr(self.heading, "aria-expanded", "false");
        let (element, content) = (self.element, self.content);
        let duration = page.config().transition_duration;
        // Hidden once the slide finishes, unless expanded again meanwhile.
        page.transition(content, Transition::new(duration), move |page| {
            if page.document.has_class(element, "collapsed") {
                page.document.hide(content);
            }
        });
    }

    pub fn toggle(&mut self, page: &mut Page) {
        if page.document.has_class(self.element, "collapsed") {
            self.expand(page);
        } else {
            self.collapse(page);
        }
    }
}

impl Widget for Collapsible {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn element(&self) -> NodeId {
        self.element
    }

    fn handle_event(&mut self, event: &mut Event, current: Option<NodeId>, page: &mut Page) {
        if current == Some(self.heading) && event.kind == EventKind::Click {
            self.toggle(page);
            event.prevent_default();
            event.stop_propagation();
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
