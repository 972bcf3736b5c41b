//! Menus built from nested `ul > li > a` markup.
//!
//! [`Menu`] is the item graph shared by all menu widgets: an arena of
//! [`MenuItem`]s linked to their siblings, parent and children by index,
//! plus the selection. [`MenuBehavior`] is what each menu variant provides
//! on top of it, and [`build`] walks the markup once to create the items.

mod item;

use std::collections::HashMap;

use lcgdom::{Document, Event, EventKind, NodeId};

use crate::keys::{CommandResult, KeyHandler};
use crate::page::Page;
use crate::widget::WidgetId;

pub use item::{ItemIndex, MenuItem};

#[derive(Debug, Clone)]
pub struct Menu {
    widget: WidgetId,
    element: NodeId,
    items: Vec<MenuItem>,
    top: Vec<ItemIndex>,
    by_node: HashMap<NodeId, ItemIndex>,
    selected: Option<ItemIndex>,
    /// Element carrying `aria-activedescendant`.
    descendant_holder: NodeId,
}

impl Menu {
    pub fn new(widget: WidgetId, element: NodeId) -> Self {
        Self {
            widget,
            element,
            items: Vec::new(),
            top: Vec::new(),
            by_node: HashMap::new(),
            selected: None,
            descendant_holder: element,
        }
    }

    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn item(&self, index: ItemIndex) -> &MenuItem {
        &self.items[index.0]
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Indices of all items in document order.
    pub fn indices(&self) -> impl Iterator<Item = ItemIndex> + '_ {
        (0..self.items.len()).map(ItemIndex)
    }

    pub fn top_level(&self) -> &[ItemIndex] {
        &self.top
    }

    pub fn first(&self) -> Option<ItemIndex> {
        self.top.first().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected(&self) -> Option<ItemIndex> {
        self.selected
    }

    pub fn descendant_holder(&self) -> NodeId {
        self.descendant_holder
    }

    /// Use `node` instead of the root element for `aria-activedescendant`.
    pub fn set_descendant_holder(&mut self, node: NodeId) {
        self.descendant_holder = node;
    }

    /// The item whose anchor is `node`.
    pub fn item_by_node(&self, node: NodeId) -> Option<ItemIndex> {
        self.by_node.get(&node).copied()
    }

    /// The item whose anchor is `node` or contains it.
    pub fn item_at(&self, document: &Document, node: NodeId) -> Option<ItemIndex> {
        document
            .ancestors_inclusive(node)
            .into_iter()
            .take_while(|n| *n != self.element)
            .find_map(|n| self.item_by_node(n))
    }

    pub fn item_by_id(&self, id: &str) -> Option<ItemIndex> {
        self.indices().find(|i| self.item(*i).id == id)
    }

    /// The item marked current in the markup (`a.current`).
    pub fn marked_current(&self, document: &Document) -> Option<ItemIndex> {
        document
            .query(self.element, "a.current")
            .and_then(|node| self.item_by_node(node))
    }

    pub fn last_child(&self, index: ItemIndex) -> Option<ItemIndex> {
        self.item(index).children.last().copied()
    }

    /// The item following `index` when walking out of its subtree: its next
    /// sibling, or the next sibling of the nearest ancestor having one.
    pub fn next_after_subtree(&self, index: ItemIndex) -> Option<ItemIndex> {
        let mut current = Some(index);
        while let Some(i) = current {
            if let Some(next) = self.item(i).next {
                return Some(next);
            }
            current = self.item(i).parent;
        }
        None
    }

    /// Ancestors of `index`, nearest first.
    pub fn ancestors(&self, index: ItemIndex) -> Vec<ItemIndex> {
        let mut result = Vec::new();
        let mut current = self.item(index).parent;
        while let Some(i) = current {
            result.push(i);
            current = self.item(i).parent;
        }
        result
    }

    /// Mark `index` as the selected item.
    ///
    /// Updates `aria-activedescendant` on the descendant holder, moves the
    /// roving `tabindex="0"` to the item and flips `aria-selected` on items
    /// that carry the attribute. Selecting the selected item again changes
    /// nothing.
    pub fn select(&mut self, index: ItemIndex, document: &mut Document) {
        let previous = self.selected.filter(|p| *p != index);
        let item = &self.items[index.0];
        document.set_attr(self.descendant_holder, "aria-activedescendant", item.id.as_str());
        document.set_attr(item.node, "tabindex", "0");
        if document.has_attr(item.node, "aria-selected") {
            document.set_attr(item.node, "aria-selected", "true");
        }
        if let Some(previous) = previous {
            let old = self.items[previous.0].node;
            document.set_attr(old, "tabindex", "-1");
            if document.has_attr(old, "aria-selected") {
                document.set_attr(old, "aria-selected", "false");
            }
        }
        self.selected = Some(index);
    }

    /// Forget all items, e.g. before rebuilding from new markup.
    pub fn clear(&mut self) {
        self.items.clear();
        self.top.clear();
        self.by_node.clear();
        self.selected = None;
    }

    fn push(&mut self, item: MenuItem) -> ItemIndex {
        let index = ItemIndex(self.items.len());
        if let Some(prev) = item.prev {
            self.items[prev.0].next = Some(index);
        }
        self.by_node.insert(item.node, index);
        self.items.push(item);
        index
    }
}

// =============================================================================
// MenuBehavior
// =============================================================================

/// Hooks and shared operations of every menu variant.
pub trait MenuBehavior {
    fn menu(&self) -> &Menu;
    fn menu_mut(&mut self) -> &mut Menu;

    /// Called for every list before its items are built. `parent` is `None`
    /// for the top-level list.
    fn init_list(&mut self, list: NodeId, parent: Option<ItemIndex>, page: &mut Page) {
        let _ = (list, parent, page);
    }

    /// Called once per item after its nested items have been built.
    fn init_item(&mut self, item: ItemIndex, page: &mut Page) {
        let _ = (item, page);
    }

    /// The item selected after building: the one marked current, else the
    /// first.
    fn initially_selected_item(&self, page: &Page) -> Option<ItemIndex> {
        self.menu()
            .marked_current(&page.document)
            .or_else(|| self.menu().first())
    }

    fn select_item(&mut self, item: ItemIndex, page: &mut Page) {
        self.menu_mut().select(item, &mut page.document);
    }

    /// Make `item` visible by unfolding its ancestors. Returns true if any
    /// state changed. Menus without folding have nothing to do.
    fn expand_item(&mut self, item: ItemIndex, page: &mut Page) -> bool {
        let _ = (item, page);
        false
    }

    /// Activate `item` (Enter, Space or a click).
    fn activate(&mut self, event: &mut Event, item: ItemIndex, page: &mut Page) -> CommandResult {
        let _ = (event, item, page);
        CommandResult::Handled
    }

    fn on_item_click(&mut self, event: &mut Event, item: ItemIndex, page: &mut Page) {
        self.activate(event, item, page);
        event.prevent_default();
        event.stop_propagation();
    }

    /// Focus the selected item, unfolding it first.
    fn focus(&mut self, page: &mut Page) {
        let Some(selected) = self.menu().selected() else {
            return;
        };
        self.expand_item(selected, page);
        page.set_focus(Some(self.menu().item(selected).node));
    }
}

/// Build the items of `list` (the menu's first `ul`) and select the
/// initial item.
///
/// A menu without a list is valid and simply has no items. An `li` without
/// a direct `a` child is skipped.
pub fn build<B: MenuBehavior>(widget: &mut B, list: Option<NodeId>, page: &mut Page) {
    let Some(list) = list else {
        log::warn!("[menu] {} has no list; menu is empty", widget.menu().widget());
        return;
    };
    let top = build_list(widget, list, None, page);
    widget.menu_mut().top = top;
    log::debug!(
        "[menu] {} built with {} items",
        widget.menu().widget(),
        widget.menu().len()
    );
    if let Some(selected) = widget.initially_selected_item(page) {
        widget.select_item(selected, page);
    }
}

fn build_list<B: MenuBehavior>(
    widget: &mut B,
    list: NodeId,
    parent: Option<ItemIndex>,
    page: &mut Page,
) -> Vec<ItemIndex> {
    widget.init_list(list, parent, page);
    let base_id = match parent {
        Some(parent) => widget.menu().item(parent).id.clone(),
        None => {
            let root = widget.menu().element();
            match page.document.id(root) {
                Some(id) => format!("{id}-item"),
                None => format!("{}-item", widget.menu().widget()),
            }
        }
    };
    let owner = widget.menu().widget();
    let mut items: Vec<ItemIndex> = Vec::new();
    for li in page.document.children_with_tag(list, "li") {
        page.document.set_attr(li, "role", "presentation");
        let Some(anchor) = page.document.children_with_tag(li, "a").first().copied() else {
            log::warn!("[menu] {owner}: list item {li} has no link; skipped");
            continue;
        };
        let id = format!("{base_id}.{}", items.len() + 1);
        page.document.set_attr(anchor, "id", id.as_str());
        page.document.set_attr(anchor, "aria-selected", "false");
        page.document.set_attr(anchor, "tabindex", "-1");
        page.listen(anchor, EventKind::KeyDown, owner);
        page.listen(anchor, EventKind::Click, owner);
        let index = widget.menu_mut().push(MenuItem {
            id,
            node: anchor,
            li,
            prev: items.last().copied(),
            next: None,
            parent,
            children: Vec::new(),
        });
        if let Some(sublist) = page.document.query(li, "ul") {
            let children = build_list(widget, sublist, Some(index), page);
            widget.menu_mut().items[index.0].children = children;
        }
        widget.init_item(index, page);
        items.push(index);
    }
    items
}

/// Route an item key press or click to the widget.
///
/// Returns false if `current` is not an item anchor of this menu.
pub fn handle_item_event<B: MenuBehavior + KeyHandler>(
    widget: &mut B,
    event: &mut Event,
    current: NodeId,
    page: &mut Page,
) -> bool {
    let Some(item) = widget.menu().item_by_node(current) else {
        return false;
    };
    match event.kind {
        EventKind::KeyDown => {
            widget.on_key_down(event, page);
        }
        EventKind::Click => widget.on_item_click(event, item, page),
        _ => return false,
    }
    true
}

// =============================================================================
// Shared commands
// =============================================================================

/// The item a command was triggered on, falling back to the selection.
pub fn target_item<B: MenuBehavior>(widget: &B, target: NodeId, page: &Page) -> Option<ItemIndex> {
    widget
        .menu()
        .item_at(&page.document, target)
        .or_else(|| widget.menu().selected())
}

/// Select and focus `item`.
pub fn move_to<B: MenuBehavior>(widget: &mut B, item: Option<ItemIndex>, page: &mut Page) -> CommandResult {
    if let Some(item) = item {
        widget.select_item(item, page);
        page.set_focus(Some(widget.menu().item(item).node));
    }
    CommandResult::Handled
}

/// Focus `item`, leaving the selection where it is.
pub fn focus_item<B: MenuBehavior>(widget: &B, item: Option<ItemIndex>, page: &mut Page) -> CommandResult {
    if let Some(item) = item {
        page.set_focus(Some(widget.menu().item(item).node));
    }
    CommandResult::Handled
}

/// Focus the previous sibling without selecting it.
pub fn cmd_focus_previous<B: MenuBehavior>(widget: &mut B, _event: &mut Event, target: NodeId, page: &mut Page) -> CommandResult {
    let prev = target_item(widget, target, page).and_then(|i| widget.menu().item(i).prev);
    focus_item(widget, prev, page)
}

/// Focus the next sibling without selecting it.
pub fn cmd_focus_next<B: MenuBehavior>(widget: &mut B, _event: &mut Event, target: NodeId, page: &mut Page) -> CommandResult {
    let next = target_item(widget, target, page).and_then(|i| widget.menu().item(i).next);
    focus_item(widget, next, page)
}

/// Move to the previous sibling.
pub fn cmd_previous<B: MenuBehavior>(widget: &mut B, _event: &mut Event, target: NodeId, page: &mut Page) -> CommandResult {
    let prev = target_item(widget, target, page).and_then(|i| widget.menu().item(i).prev);
    move_to(widget, prev, page)
}

/// Move to the next sibling.
pub fn cmd_next<B: MenuBehavior>(widget: &mut B, _event: &mut Event, target: NodeId, page: &mut Page) -> CommandResult {
    let next = target_item(widget, target, page).and_then(|i| widget.menu().item(i).next);
    move_to(widget, next, page)
}

/// Activate the target item.
pub fn cmd_activate<B: MenuBehavior>(widget: &mut B, event: &mut Event, target: NodeId, page: &mut Page) -> CommandResult {
    match target_item(widget, target, page) {
        Some(item) => widget.activate(event, item, page),
        None => CommandResult::PassThrough,
    }
}
