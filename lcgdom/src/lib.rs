pub mod cookie;
pub mod element;
pub mod error;
pub mod event;
pub mod layout;
mod parse;
pub mod task;

pub use cookie::{CookieStore, Cookies};
pub use element::{compile_selector, Document, NodeId};
pub use error::{extract_panic_message, CookieError, DomError, TaskError};
pub use event::{Event, EventKind, Modifiers, MouseButton};
pub use kuchiki::Selectors;
pub use layout::{BoxModel, Edges, Overflow, Rect};
pub use task::{Deferred, Task, TaskQueue};
