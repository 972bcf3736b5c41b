//! Single-select dropdown list opened from a button.

use lcgdom::{Event, EventKind, NodeId};

use super::{Direction, PopupMenuBase, PopupState};
use crate::error::{ElementRef, WidgetError};
use crate::keys::{CommandResult, Key, KeyCombo, KeyHandler, Keymap};
use crate::menu::{self, ItemIndex, Menu, MenuBehavior};
use crate::page::Page;
use crate::widget::{Widget, WidgetId, WidgetRequest};

/// Called with the activated option and its anchor.
pub type SelectionCallback = Box<dyn FnMut(&mut Page, ItemIndex, NodeId)>;

/// Index of the option to preselect, asked every time the list opens.
pub type SelectedIndexFn = Box<dyn Fn(&Page) -> usize>;

const OPEN_KEYS: [KeyCombo; 3] = [
    KeyCombo::key(Key::Enter),
    KeyCombo::key(Key::Space),
    KeyCombo::key(Key::Down).alt(),
];

pub struct DropdownSelection {
    id: WidgetId,
    menu: Menu,
    keymap: Keymap<Self>,
    state: PopupState,
    button: NodeId,
    on_activate: SelectionCallback,
    selected_index: SelectedIndexFn,
}

impl std::fmt::Debug for DropdownSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropdownSelection")
            .field("id", &self.id)
            .field("menu", &self.menu)
            .field("button", &self.button)
            .field("state", &self.state)
            .finish()
    }
}

impl DropdownSelection {
    /// Build a listbox on `element`, opened by `button`. Without
    /// `selected_index` the first option is preselected.
    pub fn new<'a>(
        page: &mut Page,
        element: impl Into<ElementRef<'a>>,
        button: impl Into<ElementRef<'a>>,
        on_activate: SelectionCallback,
        selected_index: Option<SelectedIndexFn>,
    ) -> Result<Self, WidgetError> {
        let element = element.into().resolve(&page.document)?;
        let button = button.into().resolve(&page.document)?;
        let id = page.register_widget(element);
        let mut dropdown = Self {
            id,
            menu: Menu::new(id, element),
            keymap: Self::define_keymap(),
            state: PopupState::default(),
            button,
            on_activate,
            selected_index: selected_index.unwrap_or_else(|| Box::new(|_| 0)),
        };
        let list = page.document.query(element, "ul");
        menu::build(&mut dropdown, list, page);

        let doc = &mut page.document;
        doc.set_attr(element, "role", "listbox");
        doc.hide(element);
        doc.set_attr(button, "tabindex", "0");
        doc.set_attr(button, "role", "button");
        doc.set_attr(button, "aria-haspopup", "true");
        doc.set_attr(button, "aria-expanded", "false");
        if let Some(list_id) = doc.id(element).map(str::to_string) {
            doc.set_attr(button, "aria-controls", list_id);
        }
        page.listen(button, EventKind::Click, id);
        page.listen(button, EventKind::KeyDown, id);
        Ok(dropdown)
    }

    fn define_keymap() -> Keymap<Self> {
        Keymap::new()
            .bind(KeyCombo::key(Key::Up), menu::cmd_previous::<Self>)
            .bind(KeyCombo::key(Key::Down), menu::cmd_next::<Self>)
            .bind(KeyCombo::key(Key::Enter), menu::cmd_activate::<Self>)
            .bind(KeyCombo::key(Key::Space), menu::cmd_activate::<Self>)
            .bind(KeyCombo::key(Key::Escape), super::cmd_quit::<Self>)
    }

    pub fn button(&self) -> NodeId {
        self.button
    }

    /// Open the list under (or above) the button, as wide as the button.
    pub fn dropdown(&mut self, page: &mut Page) {
        let element = self.menu.element();
        let menu_box = page.document.layout(element);
        let button = page.document.layout(self.button);
        let (_, top) = button.offset();
        let direction = Direction::choose(top, button.height(), menu_box.height(), &page.viewport());
        let y = match direction {
            Direction::Up => 0,
            Direction::Down => button.height(),
        };
        let border = menu_box.outer_width() - menu_box.inner_width();
        page.document
            .update_layout(element, |layout| layout.rect.width = button.width() - border);
        let selected = (self.selected_index)(&*page);
        self.popup_at(page, Some(self.button), 0, y, direction, Some(selected));
    }

    fn on_button_event(&mut self, event: &mut Event, page: &mut Page) {
        match event.kind {
            EventKind::Click => {
                if page.document.attr(self.button, "aria-expanded") == Some("true") {
                    self.dismiss(page);
                } else {
                    self.dropdown(page);
                }
            }
            EventKind::KeyDown => {
                let opens = KeyCombo::from_event(event).is_some_and(|combo| OPEN_KEYS.contains(&combo));
                if !opens {
                    return;
                }
                self.dropdown(page);
            }
            _ => return,
        }
        event.prevent_default();
        event.stop_propagation();
    }
}

impl MenuBehavior for DropdownSelection {
    fn menu(&self) -> &Menu {
        &self.menu
    }

    fn menu_mut(&mut self) -> &mut Menu {
        &mut self.menu
    }

    fn init_list(&mut self, list: NodeId, _parent: Option<ItemIndex>, page: &mut Page) {
        page.document.set_attr(list, "role", "presentation");
    }

    fn init_item(&mut self, item: ItemIndex, page: &mut Page) {
        let node = self.menu.item(item).node;
        page.document.set_attr(node, "role", "option");
        page.listen(node, EventKind::MouseOver, self.id);
    }

    /// Selection follows the keyboard and the pointer, and focus follows
    /// selection.
    fn select_item(&mut self, item: ItemIndex, page: &mut Page) {
        let previous = self.menu.selected();
        self.menu.select(item, &mut page.document);
        if let Some(previous) = previous.filter(|p| *p != item) {
            page.document.remove_class(self.menu.item(previous).li, "selected");
        }
        page.document.add_class(self.menu.item(item).li, "selected");
        page.set_focus(Some(self.menu.item(item).node));
    }

    fn activate(&mut self, _event: &mut Event, item: ItemIndex, page: &mut Page) -> CommandResult {
        self.dismiss(page);
        let node = self.menu.item(item).node;
        (self.on_activate)(page, item, node);
        CommandResult::Handled
    }
}

impl PopupMenuBase for DropdownSelection {
    fn popup_state(&self) -> &PopupState {
        &self.state
    }

    fn popup_state_mut(&mut self) -> &mut PopupState {
        &mut self.state
    }
}

impl KeyHandler for DropdownSelection {
    fn keymap(&self) -> &Keymap<Self> {
        &self.keymap
    }
}

impl Widget for DropdownSelection {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn element(&self) -> NodeId {
        self.menu.element()
    }

    fn handle_event(&mut self, event: &mut Event, current: Option<NodeId>, page: &mut Page) {
        match current {
            None => self.on_document_event(event, page),
            Some(node) if node == self.button => self.on_button_event(event, page),
            Some(node) if event.kind == EventKind::MouseOver => {
                if let Some(item) = self.menu.item_by_node(node) {
                    self.select_item(item, page);
                }
            }
            Some(node) => {
                menu::handle_item_event(self, event, node, page);
            }
        }
    }

    fn handle_request(&mut self, request: WidgetRequest, _event: Option<&mut Event>, page: &mut Page) {
        match request {
            WidgetRequest::Popup { .. } => self.dropdown(page),
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
