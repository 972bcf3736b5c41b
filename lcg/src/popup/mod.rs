//! Popup menus.
//!
//! Popups are menus shown on demand next to the element that invoked them.
//! At most one is open per page: [`PopupCoordinator`] holds it, and opening
//! another popup dismisses the current one first. While a popup is open it
//! listens to clicks and touches on the whole document so an interaction
//! outside of it closes it.

mod ctrl;
mod dropdown;
mod menu;

use lcgdom::{Event, EventKind, NodeId, Overflow};

use crate::config::Viewport;
use crate::keys::CommandResult;
use crate::menu::{ItemIndex, MenuBehavior};
use crate::page::{ListenerId, Page, Transition};
use crate::widget::{Widget, WidgetId};

pub use ctrl::PopupMenuCtrl;
pub use dropdown::{DropdownSelection, SelectedIndexFn, SelectionCallback};
pub use menu::{PopupMenu, PopupMenuItem};

/// Which way a popup grows from its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Bottom edge stays at the anchor point.
    Up,
    /// Top edge stays at the anchor point.
    #[default]
    Down,
}

impl Direction {
    /// Open upwards only when opening downwards would run past the bottom of
    /// the viewport and there is room above the invoking element.
    pub fn choose(anchor_top: i32, anchor_height: i32, menu_height: i32, viewport: &Viewport) -> Self {
        if anchor_top + anchor_height + menu_height > viewport.bottom() && anchor_top > menu_height {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

/// The open popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPopup {
    pub widget: WidgetId,
    pub element: NodeId,
    pub invoker: Option<NodeId>,
    /// Document-level listeners removed on dismissal.
    pub listeners: Vec<ListenerId>,
    /// Distinguishes successive openings of the same widget.
    pub generation: u64,
    /// Height the popup opens to, restored when it closes.
    pub height: i32,
}

/// The single open-popup slot of a page.
#[derive(Debug, Default)]
pub struct PopupCoordinator {
    active: Option<OpenPopup>,
    generation: u64,
}

impl PopupCoordinator {
    pub fn active(&self) -> Option<WidgetId> {
        self.active.as_ref().map(|open| open.widget)
    }

    pub fn open_popup(&self) -> Option<&OpenPopup> {
        self.active.as_ref()
    }

    pub fn is_open(&self, widget: WidgetId) -> bool {
        self.active() == Some(widget)
    }

    /// Whether the opening numbered `generation` is still the open popup.
    pub fn is_current(&self, widget: WidgetId, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|open| open.widget == widget && open.generation == generation)
    }

    fn open(&mut self, widget: WidgetId, element: NodeId, invoker: Option<NodeId>, listeners: Vec<ListenerId>, height: i32) -> u64 {
        self.generation += 1;
        self.active = Some(OpenPopup {
            widget,
            element,
            invoker,
            listeners,
            generation: self.generation,
            height,
        });
        self.generation
    }

    pub(crate) fn take(&mut self) -> Option<OpenPopup> {
        self.active.take()
    }
}

/// Pointer state of a popup between events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopupState {
    /// The click that opened the popup may still arrive; don't treat it as a
    /// dismissal.
    pub ignore_next_click: bool,
    pub touch_moved: bool,
}

/// Behavior shared by popup menu variants.
pub trait PopupMenuBase: MenuBehavior + Widget + Sized {
    fn popup_state(&self) -> &PopupState;
    fn popup_state_mut(&mut self) -> &mut PopupState;

    fn is_open(&self, page: &Page) -> bool {
        page.popups.is_open(self.id())
    }

    /// Show the menu at `(x, y)` relative to `anchor` (page origin without
    /// one), growing in `direction`.
    ///
    /// If a popup is open it is dismissed first; if that popup was this one
    /// the call only closes it. Focus moves to the selected item once the
    /// opening transition has finished.
    fn popup_at(&mut self, page: &mut Page, anchor: Option<NodeId>, x: i32, y: i32, direction: Direction, selected_index: Option<usize>) {
        if let Some(active) = page.popups.active() {
            page.dismiss_popup();
            if active == self.id() {
                return;
            }
        }
        let element = self.element();
        let selected = selected_index
            .and_then(|i| self.menu().top_level().get(i).copied())
            .or_else(|| first_enabled(self, page))
            .or_else(|| self.menu().first());
        if let Some(selected) = selected {
            self.select_item(selected, page);
        }

        let (anchor_x, anchor_y) = anchor.map_or((0, 0), |a| page.document.layout(a).offset());
        let left = anchor_x + x;
        let top = anchor_y + y;
        let height = page.document.layout(element).height();
        // Start from a known geometry: collapsed at the anchor point.
        page.document.update_layout(element, |layout| {
            layout.rect.x = left;
            layout.rect.y = top;
            layout.rect.height = 0;
            layout.overflow_y = Overflow::Hidden;
        });
        page.document.show(element);

        let widget = self.id();
        let listeners = [
            EventKind::TouchStart,
            EventKind::TouchMove,
            EventKind::TouchEnd,
            EventKind::Click,
        ]
        .into_iter()
        .map(|kind| page.listen_document(kind, widget))
        .collect();
        let generation = page.popups.open(widget, element, anchor, listeners, height);
        if let Some(anchor) = anchor {
            page.document.set_attr(anchor, "aria-expanded", "true");
        }
        log::debug!("[popup] {widget} opens {direction:?} at ({left}, {top})");

        let focus = selected.map(|s| self.menu().item(s).node);
        let duration = page.config().transition_duration;
        let transition = match direction {
            Direction::Up => Transition::new(duration).height(height).top(top - height),
            Direction::Down => Transition::new(duration).height(height),
        }
        .overflow_y(Overflow::Auto);
        page.transition_while(
            element,
            transition,
            move |page| page.popups.is_current(widget, generation),
            move |page| page.set_focus(focus),
        );
    }

    /// Close the menu. A menu that is not the open popup is just hidden.
    fn dismiss(&mut self, page: &mut Page) {
        if page.popups.is_open(self.id()) {
            page.dismiss_popup();
        } else {
            page.document.hide(self.element());
        }
    }

    /// Document-level click and touch handling while open.
    fn on_document_event(&mut self, event: &mut Event, page: &mut Page) {
        if !self.is_open(page) {
            return;
        }
        let outside = !page.document.contains(self.element(), event.target);
        match event.kind {
            EventKind::TouchStart => self.popup_state_mut().touch_moved = false,
            EventKind::TouchMove => self.popup_state_mut().touch_moved = true,
            EventKind::TouchEnd => {
                if self.popup_state().touch_moved {
                    return;
                }
                if outside {
                    self.dismiss(page);
                } else if let Some(item) = self.menu().item_at(&page.document, event.target) {
                    self.activate(event, item, page);
                }
                event.prevent_default();
                event.stop_propagation();
            }
            EventKind::Click => {
                if self.popup_state().ignore_next_click && !outside {
                    self.popup_state_mut().ignore_next_click = false;
                    return;
                }
                self.dismiss(page);
                if outside {
                    event.prevent_default();
                    event.stop_propagation();
                }
            }
            _ => {}
        }
    }
}

/// First item whose `li` is marked `active`.
fn first_enabled<B: MenuBehavior>(widget: &B, page: &Page) -> Option<ItemIndex> {
    widget
        .menu()
        .top_level()
        .iter()
        .copied()
        .find(|i| page.document.has_class(widget.menu().item(*i).li, "active"))
}

/// Escape.
pub fn cmd_quit<B: PopupMenuBase>(widget: &mut B, _event: &mut Event, _target: NodeId, page: &mut Page) -> CommandResult {
    widget.dismiss(page);
    CommandResult::Handled
}
