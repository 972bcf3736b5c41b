//! Accessible menus for LCG documents.
//!
//! Widgets attach to server-rendered markup: a [`Notebook`](notebook::Notebook)
//! turns a tab list into tabs with panels, a
//! [`FoldableTree`](tree::FoldableTree) makes a nested list navigable and
//! foldable, and [`PopupMenu`](popup::PopupMenu) /
//! [`DropdownSelection`](popup::DropdownSelection) are menus shown on
//! demand. All of them keep ARIA roles and states, the roving tabindex and
//! keyboard focus in sync with their state.
//!
//! ```ignore
//! let mut runtime = Runtime::from_html(html, PageConfig::new())?;
//! let notebook = Notebook::new(&mut runtime.page, "tabs")?;
//! let id = runtime.mount(notebook);
//! ```

pub mod button;
pub mod callback;
pub mod collapsible;
pub mod config;
pub mod error;
pub mod keys;
pub mod menu;
pub mod notebook;
pub mod page;
pub mod popup;
pub mod runtime;
pub mod tree;
pub mod widget;

pub use lcgdom;
pub use runtime::Runtime;

pub mod prelude {
    pub use crate::button::Button;
    pub use crate::callback::{Callback, CallbackFlow};
    pub use crate::collapsible::{Collapsible, CollapsibleKind};
    pub use crate::config::{PageConfig, Viewport};
    pub use crate::error::{ElementRef, WidgetError};
    pub use crate::keys::{event_key, CommandResult, Key, KeyCombo, KeyHandler, Keymap};
    pub use crate::menu::{ItemIndex, Menu, MenuBehavior, MenuItem};
    pub use crate::notebook::{Notebook, NOTEBOOK_COOKIE};
    pub use crate::page::{Page, Transition};
    pub use crate::popup::{
        Direction, DropdownSelection, PopupMenu, PopupMenuBase, PopupMenuCtrl, PopupMenuItem,
    };
    pub use crate::runtime::Runtime;
    pub use crate::tree::{Fold, FoldableTree};
    pub use crate::widget::{Widget, WidgetId, WidgetRequest};
    pub use lcgdom::{BoxModel, CookieStore, Document, Edges, Event, EventKind, Modifiers, MouseButton, NodeId, Rect};
}
