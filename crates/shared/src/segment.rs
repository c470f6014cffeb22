//! Segment-form walls: a centerline on the floor plane plus thickness and height.

use crate::wall::{Appearance, Wall};

/// Толщина стены по умолчанию
pub const DEFAULT_THICKNESS: f64 = 0.2;

/// Высота стены по умолчанию
pub const DEFAULT_HEIGHT: f64 = 2.0;

/// Отрезок стены на плоскости пола (x, z)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSegment {
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub thickness: f64,
    pub height: f64,
}

impl WallSegment {
    pub fn new(start: [f64; 2], end: [f64; 2]) -> Self {
        Self {
            start,
            end,
            thickness: DEFAULT_THICKNESS,
            height: DEFAULT_HEIGHT,
        }
    }

    /// Override thickness; non-positive values keep the default
    pub fn with_thickness(mut self, thickness: Option<f64>) -> Self {
        if let Some(t) = thickness.filter(|t| *t > 0.0) {
            self.thickness = t;
        }
        self
    }

    /// Override height; non-positive values keep the default
    pub fn with_height(mut self, height: Option<f64>) -> Self {
        if let Some(h) = height.filter(|h| *h > 0.0) {
            self.height = h;
        }
        self
    }

    pub fn length(&self) -> f64 {
        let dx = self.end[0] - self.start[0];
        let dy = self.end[1] - self.start[1];
        (dx * dx + dy * dy).sqrt()
    }

    pub fn angle(&self) -> f64 {
        (self.end[1] - self.start[1]).atan2(self.end[0] - self.start[0])
    }

    pub fn midpoint(&self) -> [f64; 2] {
        [
            (self.start[0] + self.end[0]) / 2.0,
            (self.start[1] + self.end[1]) / 2.0,
        ]
    }

    /// Box standing on the floor, long axis along the segment.
    ///
    /// A zero-length segment yields a zero-width box; callers filter those
    /// out with [`Wall::is_solid`].
    pub fn to_wall(&self) -> Wall {
        let [cx, cz] = self.midpoint();
        Wall {
            id: None,
            position: [cx, self.height / 2.0, cz],
            size: [self.length(), self.height, self.thickness],
            rotation: [0.0, -self.angle(), 0.0],
            appearance: Appearance::default(),
        }
    }
}
