mod edges;
mod rect;

pub use edges::Insets;
pub use rect::{Point, Rect, Size};
