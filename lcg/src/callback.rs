//! Item callbacks.
//!
//! Popup menu items and buttons run a callback when activated. A callback
//! is either a closure or the name of one registered on the page, which is
//! how markup generated on the server refers to client code.

use std::collections::HashMap;
use std::rc::Rc;

use lcgdom::{Event, NodeId};

use crate::page::Page;

/// Whether the default action (following the item's link) should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackFlow {
    #[default]
    Continue,
    /// Skip the default action.
    Suppress,
}

/// Signature of an item callback: the triggering event, the element the
/// menu was invoked from and the item's extra arguments.
pub type CallbackFn = Rc<dyn Fn(&mut Page, &mut Event, Option<NodeId>, &[String]) -> CallbackFlow>;

#[derive(Clone)]
pub enum Callback {
    Function(CallbackFn),
    /// Looked up in the page's [`CallbackRegistry`] when invoked.
    Named(String),
}

impl Callback {
    pub fn new(f: impl Fn(&mut Page, &mut Event, Option<NodeId>, &[String]) -> CallbackFlow + 'static) -> Self {
        Callback::Function(Rc::new(f))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Callback::Named(name.into())
    }

    /// Resolve to a callable, consulting the registry for named callbacks.
    pub fn resolve(&self, registry: &CallbackRegistry) -> Option<CallbackFn> {
        match self {
            Callback::Function(f) => Some(f.clone()),
            Callback::Named(name) => {
                let found = registry.get(name);
                if found.is_none() {
                    log::warn!("[callback] no callback registered as {name:?}");
                }
                found
            }
        }
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callback::Function(_) => f.write_str("Callback::Function(..)"),
            Callback::Named(name) => f.debug_tuple("Callback::Named").field(name).finish(),
        }
    }
}

/// Named callbacks available to markup-driven widgets.
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<String, CallbackFn>,
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.callbacks.keys().collect();
        names.sort();
        f.debug_struct("CallbackRegistry").field("names", &names).finish()
    }
}

impl CallbackRegistry {
    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&mut Page, &mut Event, Option<NodeId>, &[String]) -> CallbackFlow + 'static,
    ) {
        self.callbacks.insert(name.into(), Rc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<CallbackFn> {
        self.callbacks.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }
}
