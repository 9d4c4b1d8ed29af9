use crate::layout::{Point, Rect};

/// Layered hit regions. Later layers sit on top of earlier ones.
#[derive(Debug, Clone)]
pub struct HitMap<K> {
    layers: Vec<(K, Rect)>,
}

impl<K> Default for HitMap<K> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<K: Copy + PartialEq> HitMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Add a layer above everything pushed so far. Empty rects never hit.
    pub fn push(&mut self, key: K, rect: Rect) {
        if !rect.is_empty() {
            self.layers.push((key, rect));
        }
    }

    /// Topmost layer containing the point.
    pub fn hit_test(&self, point: Point) -> Option<K> {
        self.layers
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(point))
            .map(|(key, _)| *key)
    }

    /// Whether any layer with this key contains the point, even if covered.
    pub fn contains(&self, key: K, point: Point) -> bool {
        self.layers
            .iter()
            .any(|(k, rect)| *k == key && rect.contains(point))
    }

    pub fn rect(&self, key: K) -> Option<Rect> {
        self.layers
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, rect)| *rect)
    }
}
