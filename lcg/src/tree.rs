//! Foldable tree menu.
//!
//! Items whose `li` carries the `foldable` class and holds a nested list
//! can be collapsed and expanded. The fold state lives in [`Fold`] values;
//! [`FoldableTree::render_item`] reflects it into classes and ARIA
//! attributes.

use std::collections::HashMap;

use lcgdom::{Document, Event, EventKind, NodeId};

use crate::error::{ElementRef, WidgetError};
use crate::keys::{CommandResult, Key, KeyCombo, KeyHandler, Keymap};
use crate::menu::{self, ItemIndex, Menu, MenuBehavior};
use crate::page::Page;
use crate::widget::{Widget, WidgetId};

/// Fold state of a tree item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fold {
    /// Not foldable; children, if any, are always shown.
    #[default]
    Fixed,
    Collapsed,
    Expanded,
}

#[derive(Debug, Clone, Copy)]
struct FoldParts {
    submenu: NodeId,
    expander: Option<NodeId>,
}

pub struct FoldableTree {
    id: WidgetId,
    menu: Menu,
    keymap: Keymap<Self>,
    folds: HashMap<ItemIndex, Fold>,
    parts: HashMap<ItemIndex, FoldParts>,
    expanders: HashMap<NodeId, ItemIndex>,
    toggle_button: Option<NodeId>,
    /// Direction last requested with the toggle button.
    expanded_all: bool,
}

impl std::fmt::Debug for FoldableTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoldableTree")
            .field("id", &self.id)
            .field("menu", &self.menu)
            .field("folds", &self.folds)
            .field("expanded_all", &self.expanded_all)
            .finish()
    }
}

impl FoldableTree {
    /// Build a tree on `element`. With a tooltip, a tree having at least one
    /// foldable item gets an "expand all / collapse all" button.
    pub fn new<'a>(
        page: &mut Page,
        element: impl Into<ElementRef<'a>>,
        toggle_button_tooltip: Option<&str>,
    ) -> Result<Self, WidgetError> {
        let element = element.into().resolve(&page.document)?;
        let id = page.register_widget(element);
        let mut tree = Self {
            id,
            menu: Menu::new(id, element),
            keymap: Self::define_keymap(),
            folds: HashMap::new(),
            parts: HashMap::new(),
            expanders: HashMap::new(),
            toggle_button: None,
            expanded_all: false,
        };
        let list = page.document.query(element, "ul");
        menu::build(&mut tree, list, page);
        page.document.set_attr(element, "role", "tree");
        if let (Some(list), Some(tooltip)) = (list, toggle_button_tooltip) {
            if tree.is_foldable() {
                let button = page.document.create_element("button");
                page.document.add_class(button, "toggle-menu-expansion");
                page.document.set_attr(button, "title", tooltip);
                page.document.append_child(list, button);
                page.listen(button, EventKind::Click, id);
                tree.toggle_button = Some(button);
            }
        }
        Ok(tree)
    }

    // Arrow keys are doubled with Ctrl-Shift- for screen readers which
    // swallow plain arrows.
    fn define_keymap() -> Keymap<Self> {
        Keymap::new()
            .bind(KeyCombo::key(Key::Up), Self::cmd_up)
            .bind(KeyCombo::key(Key::Up).ctrl().shift(), Self::cmd_up)
            .bind(KeyCombo::key(Key::Down), Self::cmd_down)
            .bind(KeyCombo::key(Key::Down).ctrl().shift(), Self::cmd_down)
            .bind(KeyCombo::key(Key::Up).shift(), menu::cmd_focus_previous::<Self>)
            .bind(KeyCombo::key(Key::Down).shift(), menu::cmd_focus_next::<Self>)
            .bind(KeyCombo::key(Key::Right), Self::cmd_expand)
            .bind(KeyCombo::key(Key::Right).shift(), Self::cmd_expand)
            .bind(KeyCombo::key(Key::Right).ctrl().shift(), Self::cmd_expand)
            .bind(KeyCombo::key(Key::Left), Self::cmd_collapse)
            .bind(KeyCombo::key(Key::Left).shift(), Self::cmd_collapse)
            .bind(KeyCombo::key(Key::Left).ctrl().shift(), Self::cmd_collapse)
            .bind(KeyCombo::key(Key::Escape), Self::cmd_quit)
            .bind(KeyCombo::key(Key::Enter), menu::cmd_activate::<Self>)
            .bind(KeyCombo::key(Key::Space), menu::cmd_activate::<Self>)
    }

    /// Whether any item can be folded.
    pub fn is_foldable(&self) -> bool {
        self.folds.values().any(|f| *f != Fold::Fixed)
    }

    pub fn fold(&self, item: ItemIndex) -> Fold {
        self.folds.get(&item).copied().unwrap_or_default()
    }

    pub fn is_expanded(&self, item: ItemIndex) -> bool {
        self.fold(item) == Fold::Expanded
    }

    /// Direction last requested with the toggle button.
    pub fn all_expanded(&self) -> bool {
        self.expanded_all
    }

    pub fn toggle_button(&self) -> Option<NodeId> {
        self.toggle_button
    }

    /// Whether the children of `item` are on screen.
    fn shows_children(&self, item: ItemIndex) -> bool {
        !self.menu.item(item).children.is_empty() && self.fold(item) != Fold::Collapsed
    }

    /// Reflect the fold state of `item` into the document.
    pub fn render_item(&self, item: ItemIndex, document: &mut Document) {
        let expanded = match self.fold(item) {
            Fold::Fixed => return,
            Fold::Collapsed => false,
            Fold::Expanded => true,
        };
        let Some(parts) = self.parts.get(&item) else {
            return;
        };
        let entry = self.menu.item(item);
        if expanded {
            document.remove_class(entry.li, "collapsed");
            document.add_class(entry.li, "expanded");
        } else {
            document.remove_class(entry.li, "expanded");
            document.add_class(entry.li, "collapsed");
        }
        let flag = if expanded { "true" } else { "false" };
        document.set_attr(parts.submenu, "aria-hidden", if expanded { "false" } else { "true" });
        document.set_attr(entry.node, "aria-expanded", flag);
        if let Some(expander) = parts.expander {
            document.set_attr(expander, "aria-expanded", flag);
            let label_attr = if expanded {
                "data-collapse-label"
            } else {
                "data-expand-label"
            };
            if let Some(label) = document.attr(expander, label_attr).map(str::to_string) {
                document.set_attr(expander, "title", label.as_str());
                if let Some(span) = document.query(expander, ".label") {
                    document.set_text(span, label);
                }
            }
        }
    }

    fn set_fold(&mut self, item: ItemIndex, fold: Fold, page: &mut Page) {
        self.folds.insert(item, fold);
        self.render_item(item, &mut page.document);
    }

    /// Collapse `item`. Ancestors are left alone. Returns whether the state
    /// changed.
    pub fn collapse_item(&mut self, item: ItemIndex, page: &mut Page) -> bool {
        if self.fold(item) != Fold::Expanded {
            return false;
        }
        self.set_fold(item, Fold::Collapsed, page);
        true
    }

    pub fn toggle_expansion(&mut self, item: ItemIndex, page: &mut Page) {
        if self.fold(item) == Fold::Collapsed {
            self.expand_item(item, page);
        } else {
            self.collapse_item(item, page);
        }
    }

    /// Apply the same transition to `item`, its descendants and every
    /// following sibling, in document order.
    pub fn expand_recursively(&mut self, item: ItemIndex, expand: bool, page: &mut Page) {
        let mut current = Some(item);
        while let Some(item) = current {
            if expand {
                self.expand_item(item, page);
            } else {
                self.collapse_item(item, page);
            }
            if let Some(first) = self.menu.item(item).children.first().copied() {
                self.expand_recursively(first, expand, page);
            }
            current = self.menu.item(item).next;
        }
    }

    /// Flip between expanding and collapsing the whole tree.
    pub fn toggle_full_expansion(&mut self, page: &mut Page) {
        self.expanded_all = !self.expanded_all;
        if let Some(first) = self.menu.first() {
            self.expand_recursively(first, self.expanded_all, page);
        }
        if let Some(button) = self.toggle_button {
            if self.expanded_all {
                page.document.add_class(button, "expanded");
            } else {
                page.document.remove_class(button, "expanded");
            }
        }
        log::debug!("[tree] {} expanded_all={}", self.id, self.expanded_all);
    }

    // =========================================================================
    // Commands
    // =========================================================================

    fn cmd_up(&mut self, _event: &mut Event, target: NodeId, page: &mut Page) -> CommandResult {
        let Some(item) = menu::target_item(self, target, page) else {
            return CommandResult::Handled;
        };
        let destination = match self.menu.item(item).prev {
            Some(mut prev) => {
                while self.shows_children(prev) {
                    match self.menu.last_child(prev) {
                        Some(last) => prev = last,
                        None => break,
                    }
                }
                Some(prev)
            }
            None => self.menu.item(item).parent,
        };
        menu::focus_item(self, destination, page)
    }

    fn cmd_down(&mut self, _event: &mut Event, target: NodeId, page: &mut Page) -> CommandResult {
        let Some(item) = menu::target_item(self, target, page) else {
            return CommandResult::Handled;
        };
        let destination = if self.shows_children(item) {
            self.menu.item(item).children.first().copied()
        } else {
            self.menu.next_after_subtree(item)
        };
        menu::focus_item(self, destination, page)
    }

    fn cmd_expand(&mut self, _event: &mut Event, target: NodeId, page: &mut Page) -> CommandResult {
        let Some(item) = menu::target_item(self, target, page) else {
            return CommandResult::Handled;
        };
        if !self.expand_item(item, page) {
            let first = self.menu.item(item).children.first().copied();
            if first.is_some() {
                return menu::focus_item(self, first, page);
            }
        }
        CommandResult::Handled
    }

    fn cmd_collapse(&mut self, _event: &mut Event, target: NodeId, page: &mut Page) -> CommandResult {
        let Some(item) = menu::target_item(self, target, page) else {
            return CommandResult::Handled;
        };
        if !self.collapse_item(item, page) {
            let parent = self.menu.item(item).parent;
            return menu::focus_item(self, parent, page);
        }
        CommandResult::Handled
    }

    /// Leave the tree for the main content heading.
    fn cmd_quit(&mut self, _event: &mut Event, _target: NodeId, page: &mut Page) -> CommandResult {
        let heading = page.document.by_id(&page.config().main_heading_id);
        if heading.is_none() {
            log::debug!("[tree] no #{} to quit to", page.config().main_heading_id);
        }
        page.set_focus(heading);
        CommandResult::Handled
    }
}

impl MenuBehavior for FoldableTree {
    fn menu(&self) -> &Menu {
        &self.menu
    }

    fn menu_mut(&mut self) -> &mut Menu {
        &mut self.menu
    }

    fn init_list(&mut self, list: NodeId, _parent: Option<ItemIndex>, page: &mut Page) {
        page.document.set_attr(list, "role", "group");
    }

    fn init_item(&mut self, item: ItemIndex, page: &mut Page) {
        let (node, li, item_id) = {
            let entry = self.menu.item(item);
            (entry.node, entry.li, entry.id.clone())
        };
        let doc = &mut page.document;
        doc.set_attr(node, "role", "treeitem");
        if let Some(icon) = doc.query(node, ".icon") {
            doc.set_attr(icon, "role", "presentation");
        }
        if let Some(label) = doc.query(node, ".label") {
            let label_id = format!("{item_id}-label");
            doc.set_attr(label, "id", label_id.as_str());
            doc.set_attr(node, "aria-labelledby", label_id);
        }
        if !doc.has_class(li, "foldable") {
            return;
        }
        let Some(submenu) = doc.query(li, "ul") else {
            log::warn!("[tree] foldable item {item_id} has no nested list");
            return;
        };
        if doc.id(submenu).is_none() {
            doc.set_attr(submenu, "id", format!("{item_id}-submenu"));
        }
        let submenu_id = doc.id(submenu).unwrap_or_default().to_string();
        doc.set_attr(node, "aria-controls", submenu_id.as_str());
        let expander = doc.query(li, ".expander");
        if let Some(expander) = expander {
            doc.set_attr(expander, "aria-controls", submenu_id);
            page.listen(expander, EventKind::Click, self.id);
            self.expanders.insert(expander, item);
        }
        let fold = if page.document.has_class(li, "expanded") {
            Fold::Expanded
        } else {
            Fold::Collapsed
        };
        self.parts.insert(item, FoldParts { submenu, expander });
        self.set_fold(item, fold, page);
    }

    /// Expand `item` and all its ancestors. Returns whether `item` itself
    /// changed.
    fn expand_item(&mut self, item: ItemIndex, page: &mut Page) -> bool {
        let changed = self.fold(item) == Fold::Collapsed;
        if changed {
            self.set_fold(item, Fold::Expanded, page);
        }
        if let Some(parent) = self.menu.item(item).parent {
            self.expand_item(parent, page);
        }
        changed
    }

    /// Follow the item's link.
    fn activate(&mut self, _event: &mut Event, item: ItemIndex, page: &mut Page) -> CommandResult {
        let node = self.menu.item(item).node;
        match page.document.attr(node, "href").map(str::to_string) {
            Some(href) => page.navigate(&href),
            None => log::debug!("[tree] item {} has no link", self.menu.item(item).id),
        }
        CommandResult::Handled
    }

    /// A click outside the label (on the fold triangle) toggles instead of
    /// following the link.
    fn on_item_click(&mut self, event: &mut Event, item: ItemIndex, page: &mut Page) {
        if page.document.closest_matching(event.target, ".label").is_none() {
            self.toggle_expansion(item, page);
        } else {
            self.activate(event, item, page);
        }
        event.prevent_default();
        event.stop_propagation();
    }
}

impl KeyHandler for FoldableTree {
    fn keymap(&self) -> &Keymap<Self> {
        &self.keymap
    }
}

impl Widget for FoldableTree {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn element(&self) -> NodeId {
        self.menu.element()
    }

    fn handle_event(&mut self, event: &mut Event, current: Option<NodeId>, page: &mut Page) {
        let Some(current) = current else {
            return;
        };
        if Some(current) == self.toggle_button && event.kind == EventKind::Click {
            self.toggle_full_expansion(page);
        } else if let Some(item) = self.expanders.get(&current).copied() {
            if event.kind == EventKind::Click {
                self.toggle_expansion(item, page);
                event.prevent_default();
                event.stop_propagation();
            }
        } else {
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
