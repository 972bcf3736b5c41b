use lcgdom::NodeId;

/// Position of an item in its menu's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemIndex(pub(crate) usize);

impl ItemIndex {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One menu entry: an `li` with its `a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Generated DOM id, `<root id>-item.1.2` style.
    pub id: String,
    /// The anchor. This is the focusable element.
    pub node: NodeId,
    pub li: NodeId,
    pub prev: Option<ItemIndex>,
    pub next: Option<ItemIndex>,
    pub parent: Option<ItemIndex>,
    pub children: Vec<ItemIndex>,
}
