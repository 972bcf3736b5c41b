//! Box geometry attached to every element.
//!
//! Nothing here computes layout. The host (or a test) records where an
//! element sits on the page and the widgets read it back to place popups.

mod edges;
mod rect;

pub use edges::Edges;
pub use rect::Rect;

/// Vertical overflow behaviour of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Auto,
}

/// Content box plus the padding and border around it.
///
/// `rect` is the content box in page coordinates, so `rect.width` is what
/// CSS calls `width()`, `inner_width()` adds padding and `outer_width()`
/// adds the border on top of that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxModel {
    pub rect: Rect,
    pub padding: Edges,
    pub border: Edges,
    pub overflow_y: Overflow,
}

impl BoxModel {
    pub const fn new(rect: Rect) -> Self {
        Self {
            rect,
            padding: Edges::all(0),
            border: Edges::all(0),
            overflow_y: Overflow::Visible,
        }
    }

    pub fn padding(mut self, padding: Edges) -> Self {
        self.padding = padding;
        self
    }

    pub fn border(mut self, border: Edges) -> Self {
        self.border = border;
        self
    }

    pub const fn width(&self) -> i32 {
        self.rect.width
    }

    pub const fn height(&self) -> i32 {
        self.rect.height
    }

    pub const fn inner_width(&self) -> i32 {
        self.rect.width + self.padding.horizontal_sum()
    }

    pub const fn outer_width(&self) -> i32 {
        self.inner_width() + self.border.horizontal_sum()
    }

    /// Offset of the content box from the page origin, like jQuery's `offset()`.
    pub const fn offset(&self) -> (i32, i32) {
        (self.rect.x, self.rect.y)
    }
}
