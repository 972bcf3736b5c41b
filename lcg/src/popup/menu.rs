//! Popup menu built from item descriptions.

use std::collections::HashMap;

use lcgdom::{Event, NodeId};

use super::{Direction, PopupMenuBase, PopupState};
use crate::callback::{Callback, CallbackFlow};
use crate::error::{ElementRef, WidgetError};
use crate::keys::{CommandResult, Key, KeyCombo, KeyHandler, Keymap};
use crate::menu::{self, ItemIndex, Menu, MenuBehavior};
use crate::page::Page;
use crate::widget::{Widget, WidgetId, WidgetRequest};

/// Description of one popup menu entry.
#[derive(Debug, Clone)]
pub struct PopupMenuItem {
    pub label: String,
    pub tooltip: Option<String>,
    /// Followed after the callback unless the callback suppresses it.
    pub uri: Option<String>,
    pub enabled: bool,
    pub callback: Option<Callback>,
    /// Passed to the callback after the event and the invoking element.
    pub callback_args: Vec<String>,
    /// CSS class of the item icon.
    pub icon: Option<String>,
    pub css_class: Option<String>,
}

impl PopupMenuItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tooltip: None,
            uri: None,
            enabled: true,
            callback: None,
            callback_args: Vec::new(),
            icon: None,
            css_class: None,
        }
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn callback_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.callback_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn css_class(mut self, class: impl Into<String>) -> Self {
        self.css_class = Some(class.into());
        self
    }
}

/// A popup menu.
///
/// The element starts out empty and hidden; the markup is generated the
/// first time the menu pops up (or on [`PopupMenu::create`]), so pages can
/// carry many menus cheaply.
pub struct PopupMenu {
    id: WidgetId,
    menu: Menu,
    keymap: Keymap<Self>,
    state: PopupState,
    items: Vec<PopupMenuItem>,
    /// Anchor node to position in `items`.
    item_specs: HashMap<NodeId, usize>,
    close_button_label: Option<String>,
    close_button: Option<NodeId>,
    invoker: Option<NodeId>,
}

impl std::fmt::Debug for PopupMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopupMenu")
            .field("id", &self.id)
            .field("items", &self.items)
            .field("state", &self.state)
            .field("invoker", &self.invoker)
            .finish()
    }
}

impl PopupMenu {
    pub fn new<'a>(
        page: &mut Page,
        element: impl Into<ElementRef<'a>>,
        items: Vec<PopupMenuItem>,
        close_button_label: Option<&str>,
    ) -> Result<Self, WidgetError> {
        let element = element.into().resolve(&page.document)?;
        let id = page.register_widget(element);
        let mut popup = Self {
            id,
            menu: Menu::new(id, element),
            keymap: Self::define_keymap(),
            state: PopupState::default(),
            items,
            item_specs: HashMap::new(),
            close_button_label: close_button_label.map(str::to_string),
            close_button: None,
            invoker: None,
        };
        // Server-rendered markup is used as is.
        if let Some(list) = page.document.query(element, "ul") {
            menu::build(&mut popup, Some(list), page);
        }
        page.document.hide(element);
        Ok(popup)
    }

    fn define_keymap() -> Keymap<Self> {
        Keymap::new()
            .bind(KeyCombo::key(Key::Up), menu::cmd_previous::<Self>)
            .bind(KeyCombo::key(Key::Down), menu::cmd_next::<Self>)
            .bind(KeyCombo::key(Key::Enter), menu::cmd_activate::<Self>)
            .bind(KeyCombo::key(Key::Space), menu::cmd_activate::<Self>)
            .bind(KeyCombo::key(Key::Escape), super::cmd_quit::<Self>)
    }

    pub fn items(&self) -> &[PopupMenuItem] {
        &self.items
    }

    /// The close button, once created.
    pub fn close_button(&self) -> Option<NodeId> {
        self.close_button
    }

    /// The element the menu was last invoked from.
    pub fn invoker(&self) -> Option<NodeId> {
        self.invoker
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    /// Replace the items. Generated markup is dropped and rebuilt on the
    /// next popup.
    pub fn update(&mut self, page: &mut Page, items: Vec<PopupMenuItem>) {
        self.items = items;
        let element = self.menu.element();
        if page.document.element_children(element).is_empty() {
            return;
        }
        page.unlisten_subtree(element, self.id);
        page.document.remove_children(element);
        self.menu.clear();
        self.menu.set_descendant_holder(element);
        self.item_specs.clear();
        self.close_button = None;
    }

    /// Generate the menu markup unless the element already has content.
    pub fn create(&mut self, page: &mut Page) {
        let element = self.menu.element();
        if !page.document.element_children(element).is_empty() {
            return;
        }
        let doc = &mut page.document;
        doc.remove_children(element);
        let ul = doc.create_element("ul");
        doc.set_attr(ul, "role", "menu");
        doc.append_child(element, ul);
        if self.items.iter().any(|item| item.icon.is_some()) {
            doc.add_class(element, "with-icons");
        }
        // The list, not the root, is the menu for assistive technology;
        // otherwise the close button would count as an item.
        for attr in ["aria-label", "aria-activedescendant"] {
            if let Some(value) = doc.remove_attr(element, attr) {
                doc.set_attr(ul, attr, value);
            }
        }
        self.menu.set_descendant_holder(ul);

        for (position, entry) in self.items.iter().enumerate() {
            let li = doc.create_element("li");
            let anchor = doc.create_element("a");
            doc.set_attr(anchor, "href", entry.uri.as_deref().unwrap_or("#"));
            let label = doc.create_element("span");
            doc.add_class(label, "label");
            doc.set_text(label, entry.label.as_str());
            doc.append_child(anchor, label);
            if let Some(tooltip) = &entry.tooltip {
                doc.set_attr(anchor, "title", tooltip.as_str());
            }
            if entry.enabled {
                doc.add_class(li, "active");
            }
            if let Some(icon) = &entry.icon {
                let span = doc.create_element("span");
                doc.set_attr(span, "class", format!("icon {icon}"));
                doc.prepend_child(anchor, span);
            }
            if let Some(class) = &entry.css_class {
                for class in class.split_whitespace() {
                    doc.add_class(li, class);
                }
            }
            doc.append_child(li, anchor);
            doc.append_child(ul, li);
            self.item_specs.insert(anchor, position);
        }

        if let Some(label) = self.close_button_label.clone() {
            let close = doc.create_element("a");
            doc.set_attr(close, "href", "#");
            doc.set_attr(close, "title", label.as_str());
            doc.add_class(close, "close-menu");
            doc.set_attr(close, "role", "button");
            doc.set_text(close, label);
            doc.append_child(element, close);
            page.listen(close, lcgdom::EventKind::Click, self.id);
            self.close_button = Some(close);
        }
        menu::build(self, Some(ul), page);
        log::debug!("[popup] {} created with {} items", self.id, self.items.len());
    }

    /// Pop the menu up next to `element` (the trigger's target without one).
    ///
    /// A pointer-triggered menu opens at the pointer, clamped to the
    /// element; otherwise it opens at the element's edge and is marked
    /// `keyboard-navigated`. The menu flips left when it would leave the
    /// viewport and opens upwards when there is no room below.
    pub fn popup(
        &mut self,
        page: &mut Page,
        mut trigger: Option<&mut Event>,
        element: Option<NodeId>,
        selected_index: Option<usize>,
    ) {
        if let Some(event) = trigger.as_deref_mut() {
            event.stop_propagation();
        }
        let Some(invoker) = element.or_else(|| trigger.as_ref().map(|e| e.target)) else {
            log::warn!("[popup] {} invoked without an element", self.id);
            return;
        };
        self.create(page);
        let root = self.menu.element();
        let anchor = page.document.layout(invoker);
        let (left, top) = anchor.offset();
        let menu_box = page.document.layout(root);
        let viewport = page.viewport();
        let direction = Direction::choose(top, anchor.height(), menu_box.height(), &viewport);

        let pointer = trigger.as_ref().filter(|e| e.detail == 1);
        let (mut x, y) = match pointer {
            Some(e) => {
                page.document.remove_class(root, "keyboard-navigated");
                ((e.page_x - left).min(anchor.width()), (e.page_y - top).min(anchor.height()))
            }
            None => {
                page.document.add_class(root, "keyboard-navigated");
                let y = match direction {
                    Direction::Up => 0,
                    Direction::Down => anchor.height(),
                };
                (0, y)
            }
        };
        if left + x + menu_box.width() > viewport.right() {
            x -= menu_box.width();
        }
        self.state.ignore_next_click = trigger.as_ref().is_some_and(|e| !e.is_primary_click());
        self.invoker = Some(invoker);
        self.popup_at(page, Some(invoker), x, y, direction, selected_index);
    }

    fn run_callback(&self, event: &mut Event, item: ItemIndex, page: &mut Page) -> CallbackFlow {
        let Some(entry) = self
            .item_specs
            .get(&self.menu.item(item).node)
            .and_then(|i| self.items.get(*i))
        else {
            return CallbackFlow::Continue;
        };
        let Some(callback) = entry.callback.as_ref().and_then(|c| c.resolve(page.callbacks())) else {
            return CallbackFlow::Continue;
        };
        let args = entry.callback_args.clone();
        callback(page, event, self.invoker, &args)
    }

    fn item_uri(&self, item: ItemIndex) -> Option<String> {
        let position = self.item_specs.get(&self.menu.item(item).node)?;
        self.items.get(*position)?.uri.clone()
    }
}

impl MenuBehavior for PopupMenu {
    fn menu(&self) -> &Menu {
        &self.menu
    }

    fn menu_mut(&mut self) -> &mut Menu {
        &mut self.menu
    }

    fn init_item(&mut self, item: ItemIndex, page: &mut Page) {
        page.document.set_attr(self.menu.item(item).node, "role", "menuitem");
    }

    /// Disabled items ignore activation. Enabled ones close the menu, run
    /// the callback and then follow the URI.
    fn activate(&mut self, event: &mut Event, item: ItemIndex, page: &mut Page) -> CommandResult {
        if !page.document.has_class(self.menu.item(item).li, "active") {
            return CommandResult::Handled;
        }
        self.dismiss(page);
        let flow = self.run_callback(event, item, page);
        if flow == CallbackFlow::Continue {
            if let Some(uri) = self.item_uri(item) {
                page.navigate(&uri);
            }
        }
        CommandResult::Handled
    }
}

impl PopupMenuBase for PopupMenu {
    fn popup_state(&self) -> &PopupState {
        &self.state
    }

    fn popup_state_mut(&mut self) -> &mut PopupState {
        &mut self.state
    }
}

impl KeyHandler for PopupMenu {
    fn keymap(&self) -> &Keymap<Self> {
        &self.keymap
    }
}

impl Widget for PopupMenu {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn element(&self) -> NodeId {
        self.menu.element()
    }

    fn handle_event(&mut self, event: &mut Event, current: Option<NodeId>, page: &mut Page) {
        let Some(current) = current else {
            self.on_document_event(event, page);
            return;
        };
        if Some(current) == self.close_button {
            self.dismiss(page);
            event.prevent_default();
            event.stop_propagation();
            return;
        }
        if event.kind == lcgdom::EventKind::KeyDown {
            page.document.add_class(self.menu.element(), "keyboard-navigated");
        }
        menu::handle_item_event(self, event, current, page);
    }

    fn handle_request(&mut self, request: WidgetRequest, event: Option<&mut Event>, page: &mut Page) {
        match request {
            WidgetRequest::Popup {
                invoker,
                from_event,
                selected_index,
            } => {
                let trigger = if from_event { event } else { None };
                self.popup(page, trigger, Some(invoker), selected_index);
            }
            WidgetRequest::Dismiss => self.dismiss(page),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
