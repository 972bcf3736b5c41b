//! Control invoking a popup menu.

use lcgdom::{Event, EventKind, NodeId};

use crate::error::{ElementRef, WidgetError};
use crate::keys::{CommandResult, Key, KeyCombo, KeyHandler, Keymap};
use crate::page::Page;
use crate::widget::{Widget, WidgetId, WidgetRequest};

/// Wires a `.invoke-menu` control to the `.popup-menu-widget` inside the
/// same element.
///
/// The menu widget must have been constructed first; the control finds it
/// through the page's element-to-widget map.
pub struct PopupMenuCtrl {
    id: WidgetId,
    element: NodeId,
    keymap: Keymap<Self>,
    menu: WidgetId,
    ctrl: NodeId,
}

impl std::fmt::Debug for PopupMenuCtrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopupMenuCtrl")
            .field("id", &self.id)
            .field("menu", &self.menu)
            .field("ctrl", &self.ctrl)
            .finish()
    }
}

impl PopupMenuCtrl {
    /// With `context_selector`, a right click anywhere inside the closest
    /// ancestor matching it pops the menu up as well.
    pub fn new<'a>(
        page: &mut Page,
        element: impl Into<ElementRef<'a>>,
        context_selector: Option<&str>,
    ) -> Result<Self, WidgetError> {
        let element = element.into().resolve(&page.document)?;
        let menu_element = page
            .document
            .query(element, ".popup-menu-widget")
            .ok_or_else(|| WidgetError::ElementNotFound(".popup-menu-widget".to_string()))?;
        let menu = page
            .widget_instance_of(menu_element)
            .ok_or(WidgetError::NotAWidget(menu_element))?;
        let ctrl = page
            .document
            .query(element, ".invoke-menu")
            .ok_or_else(|| WidgetError::ElementNotFound(".invoke-menu".to_string()))?;
        let id = page.register_widget(element);

        page.listen(ctrl, EventKind::Click, id);
        page.listen(ctrl, EventKind::KeyDown, id);
        if let Some(arrow) = page.document.query(ctrl, ".popup-arrow") {
            page.listen(arrow, EventKind::Click, id);
        }
        let doc = &mut page.document;
        doc.set_attr(ctrl, "role", "button");
        doc.set_attr(ctrl, "aria-haspopup", "true");
        doc.set_attr(ctrl, "aria-expanded", "false");
        if let Some(menu_id) = doc.id(menu_element).map(str::to_string) {
            doc.set_attr(ctrl, "aria-controls", menu_id);
        }
        if let Some(selector) = context_selector {
            match page.document.closest_matching(element, selector) {
                Some(area) => {
                    page.listen(area, EventKind::ContextMenu, id);
                }
                None => log::debug!("[popup] no {selector:?} around {element} for context menus"),
            }
        }
        Ok(Self {
            id,
            element,
            keymap: Self::define_keymap(),
            menu,
            ctrl,
        })
    }

    fn define_keymap() -> Keymap<Self> {
        Keymap::new()
            .bind(KeyCombo::key(Key::Enter), Self::cmd_activate)
            .bind(KeyCombo::key(Key::Space), Self::cmd_activate)
    }

    /// The widget of the controlled menu.
    pub fn menu(&self) -> WidgetId {
        self.menu
    }

    pub fn ctrl(&self) -> NodeId {
        self.ctrl
    }

    fn cmd_activate(&mut self, _event: &mut Event, _target: NodeId, page: &mut Page) -> CommandResult {
        page.request(
            self.menu,
            WidgetRequest::Popup {
                invoker: self.ctrl,
                from_event: false,
                selected_index: None,
            },
        );
        CommandResult::Handled
    }
}

impl KeyHandler for PopupMenuCtrl {
    fn keymap(&self) -> &Keymap<Self> {
        &self.keymap
    }
}

impl Widget for PopupMenuCtrl {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn element(&self) -> NodeId {
        self.element
    }

    fn handle_event(&mut self, event: &mut Event, current: Option<NodeId>, page: &mut Page) {
        if current.is_none() {
            return;
        }
        match event.kind {
            EventKind::Click | EventKind::ContextMenu => {
                if event.kind == EventKind::ContextMenu {
                    event.prevent_default();
                }
                page.request(
                    self.menu,
                    WidgetRequest::Popup {
                        invoker: self.ctrl,
                        from_event: true,
                        selected_index: None,
                    },
                );
            }
            EventKind::KeyDown => {
                self.on_key_down(event, page);
            }
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
