//! Tabbed notebook.
//!
//! Each tab links to its content panel by fragment (`href="#panel-id"`).
//! Selecting a tab hides the previous panel, shows the new one, remembers
//! the choice in a cookie and runs the activation callbacks registered for
//! the panel.

use std::collections::HashMap;

use lcgdom::{Event, NodeId};

use crate::error::{ElementRef, WidgetError};
use crate::keys::{CommandResult, Key, KeyCombo, KeyHandler, Keymap};
use crate::menu::{self, ItemIndex, Menu, MenuBehavior};
use crate::page::Page;
use crate::widget::{Widget, WidgetId};

/// Cookie remembering the most recently switched tab as `<class>:<panel id>`.
pub const NOTEBOOK_COOKIE: &str = "lcg_last_notebook_tab";

pub type ActivationCallback = Box<dyn FnMut(&mut Page)>;

struct Activation {
    callback: ActivationCallback,
    repeat: bool,
}

/// Activation callbacks by panel id.
///
/// Lives on the page rather than on a notebook because code inside a panel
/// usually registers before the notebook around it has been built.
#[derive(Default)]
pub struct ActivationRegistry {
    panels: HashMap<String, Vec<Activation>>,
}

impl std::fmt::Debug for ActivationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self.panels.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        f.debug_struct("ActivationRegistry").field("panels", &counts).finish()
    }
}

impl ActivationRegistry {
    pub fn register(&mut self, panel_id: &str, callback: ActivationCallback, repeat: bool) {
        self.panels
            .entry(panel_id.to_string())
            .or_default()
            .push(Activation { callback, repeat });
    }

    /// Number of callbacks still registered for the panel.
    pub fn count(&self, panel_id: &str) -> usize {
        self.panels.get(panel_id).map_or(0, Vec::len)
    }

    /// Run the panel's callbacks newest first and drop the one-shot ones.
    ///
    /// Callbacks registered while this runs are kept for the next
    /// activation.
    fn fire(page: &mut Page, panel_id: &str) {
        let Some(callbacks) = page.activations.panels.remove(panel_id) else {
            return;
        };
        log::debug!("[notebook] {} activation callbacks for #{panel_id}", callbacks.len());
        let mut kept = Vec::new();
        for mut activation in callbacks.into_iter().rev() {
            (activation.callback)(page);
            if activation.repeat {
                kept.push(activation);
            }
        }
        kept.reverse();
        let entry = page.activations.panels.entry(panel_id.to_string()).or_default();
        let added = std::mem::replace(entry, kept);
        entry.extend(added);
        if entry.is_empty() {
            page.activations.panels.remove(panel_id);
        }
    }
}

pub struct Notebook {
    id: WidgetId,
    menu: Menu,
    keymap: Keymap<Self>,
    panels: HashMap<ItemIndex, NodeId>,
}

impl std::fmt::Debug for Notebook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notebook")
            .field("id", &self.id)
            .field("menu", &self.menu)
            .field("panels", &self.panels)
            .finish()
    }
}

impl Notebook {
    /// Build a notebook on `element`, which contains the tab list and
    /// (usually) the panels.
    pub fn new<'a>(page: &mut Page, element: impl Into<ElementRef<'a>>) -> Result<Self, WidgetError> {
        let element = element.into().resolve(&page.document)?;
        let id = page.register_widget(element);
        let mut notebook = Self {
            id,
            menu: Menu::new(id, element),
            keymap: Self::define_keymap(),
            panels: HashMap::new(),
        };
        let list = page.document.query(element, "ul");
        menu::build(&mut notebook, list, page);
        Ok(notebook)
    }

    fn define_keymap() -> Keymap<Self> {
        Keymap::new()
            .bind(KeyCombo::key(Key::Left), menu::cmd_previous::<Self>)
            .bind(KeyCombo::key(Key::Right), menu::cmd_next::<Self>)
            .bind(KeyCombo::key(Key::Enter), menu::cmd_activate::<Self>)
            .bind(KeyCombo::key(Key::Space), menu::cmd_activate::<Self>)
    }

    /// Register `callback` to run when the panel with id `panel_id` is
    /// shown. It also runs for the initially shown panel when the notebook
    /// is built. One-shot callbacks (`repeat == false`) run only the first
    /// time.
    pub fn on_activation(page: &mut Page, panel_id: &str, callback: impl FnMut(&mut Page) + 'static, repeat: bool) {
        page.activations.register(panel_id, Box::new(callback), repeat);
    }

    /// The content panel of `item`.
    pub fn panel(&self, item: ItemIndex) -> Option<NodeId> {
        self.panels.get(&item).copied()
    }

    pub fn selected_panel(&self) -> Option<NodeId> {
        self.menu.selected().and_then(|item| self.panel(item))
    }

    /// The tab whose panel has id `panel_id` and lies inside the notebook.
    pub fn item_for_panel(&self, page: &Page, panel_id: &str) -> Option<ItemIndex> {
        let panel = page.document.by_id(panel_id)?;
        if !page.document.contains(self.menu.element(), panel) {
            return None;
        }
        self.panels
            .iter()
            .find(|(_, p)| **p == panel)
            .map(|(item, _)| *item)
    }

    /// Select the tab `item` and show its panel.
    pub fn select(&mut self, item: ItemIndex, page: &mut Page) {
        self.select_item(item, page);
    }

    fn current_location_selected_item(&self, page: &Page) -> Option<ItemIndex> {
        let fragment = page.location()?.fragment()?;
        if fragment.is_empty() {
            return None;
        }
        self.item_for_panel(page, fragment)
    }

    fn last_saved_selected_item(&self, page: &Page) -> Option<ItemIndex> {
        let class = page.document.class_name(self.menu.element())?;
        let saved = page.cookies().get(NOTEBOOK_COOKIE)?;
        let (saved_class, panel_id) = saved.split_once(':')?;
        if saved_class != class {
            return None;
        }
        self.item_for_panel(page, panel_id)
    }

    fn remember(&self, panel: NodeId, page: &mut Page) {
        let Some(class) = page.document.class_name(self.menu.element()) else {
            return;
        };
        let Some(panel_id) = page.document.id(panel).map(str::to_string) else {
            return;
        };
        if let Err(e) = page.cookies_mut().set(NOTEBOOK_COOKIE, &format!("{class}:{panel_id}")) {
            log::warn!("[notebook] cannot remember tab: {e}");
        }
    }
}

impl MenuBehavior for Notebook {
    fn menu(&self) -> &Menu {
        &self.menu
    }

    fn menu_mut(&mut self) -> &mut Menu {
        &mut self.menu
    }

    fn init_list(&mut self, list: NodeId, _parent: Option<ItemIndex>, page: &mut Page) {
        page.document.set_attr(list, "role", "tablist");
    }

    fn init_item(&mut self, item: ItemIndex, page: &mut Page) {
        let (node, item_id) = {
            let item = self.menu.item(item);
            (item.node, item.id.clone())
        };
        page.document.set_attr(node, "role", "tab");
        let href = page.document.attr(node, "href").unwrap_or_default().to_string();
        let panel = href
            .find('#')
            .map(|i| &href[i + 1..])
            .and_then(|id| page.document.by_id(id));
        let Some(panel) = panel else {
            log::warn!("[notebook] tab {item_id} has no panel ({href:?})");
            return;
        };
        for heading in page.document.query_all(panel, "h1,h2,h3,h4,h5,h6") {
            page.document.hide(heading);
        }
        page.document.hide(panel);
        page.document.add_class(panel, "notebook-page");
        page.document.set_attr(panel, "role", "tabpanel");
        if page.document.id(panel).is_none() {
            page.document.set_attr(panel, "id", format!("{item_id}-tabpanel"));
        }
        let panel_id = page.document.id(panel).unwrap_or_default().to_string();
        page.document.set_attr(node, "aria-controls", panel_id);
        self.panels.insert(item, panel);
    }

    /// Markup "current" marker, then the location fragment, then the saved
    /// cookie, then the first tab.
    fn initially_selected_item(&self, page: &Page) -> Option<ItemIndex> {
        page.document
            .query(self.menu.element(), ".notebook-switcher li a.current")
            .and_then(|node| self.menu.item_by_node(node))
            .or_else(|| self.current_location_selected_item(page))
            .or_else(|| self.last_saved_selected_item(page))
            .or_else(|| self.menu.first())
    }

    fn select_item(&mut self, item: ItemIndex, page: &mut Page) {
        let previous = self.menu.selected();
        self.menu.select(item, &mut page.document);
        if previous == Some(item) {
            return;
        }
        if let Some(previous) = previous {
            page.document.remove_class(self.menu.item(previous).node, "current");
            if let Some(panel) = self.panel(previous) {
                page.document.hide(panel);
            }
        }
        page.document.add_class(self.menu.item(item).node, "current");
        let Some(panel) = self.panel(item) else {
            return;
        };
        self.remember(panel, page);
        page.document.show(panel);
        log::debug!("[notebook] {} shows {panel}", self.id);
        if let Some(panel_id) = page.document.id(panel).map(str::to_string) {
            ActivationRegistry::fire(page, &panel_id);
        }
    }

    fn activate(&mut self, _event: &mut Event, item: ItemIndex, page: &mut Page) -> CommandResult {
        self.select_item(item, page);
        page.set_focus(self.panel(item));
        CommandResult::Handled
    }
}

impl KeyHandler for Notebook {
    fn keymap(&self) -> &Keymap<Self> {
        &self.keymap
    }
}

impl Widget for Notebook {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn element(&self) -> NodeId {
        self.menu.element()
    }

    fn handle_event(&mut self, event: &mut Event, current: Option<NodeId>, page: &mut Page) {
        if let Some(current) = current {
            menu::handle_item_event(self, event, current, page);
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
