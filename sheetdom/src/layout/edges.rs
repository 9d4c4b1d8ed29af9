/// Insets applied to the four edges of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Insets {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn all(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub const fn vertical(top: f32, bottom: f32) -> Self {
        Self::new(top, 0.0, bottom, 0.0)
    }

    pub const fn top(value: f32) -> Self {
        Self::new(value, 0.0, 0.0, 0.0)
    }

    pub const fn bottom(value: f32) -> Self {
        Self::new(0.0, 0.0, value, 0.0)
    }

    pub fn with_top(mut self, value: f32) -> Self {
        self.top = value;
        self
    }

    pub fn with_bottom(mut self, value: f32) -> Self {
        self.bottom = value;
        self
    }

    pub fn horizontal_total(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical_total(&self) -> f32 {
        self.top + self.bottom
    }
}
