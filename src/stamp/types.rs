//! Geometry and pointer types shared by the copy-stamp pipeline

use serde::{Deserialize, Serialize};

/// A point in scene (drawing-space) coordinates, independent of zoom/pan
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenePoint {
    pub x: f32,
    pub y: f32,
}

impl ScenePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// A point in rendered pixel coordinates of the backing surface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderedPoint {
    pub x: f32,
    pub y: f32,
}

impl RenderedPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in scene coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SceneRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn origin(&self) -> ScenePoint {
        ScenePoint::new(self.left, self.top)
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Grow outward so every edge lands on a whole scene pixel
    pub fn align_outward(&self) -> Self {
        let left = self.left.floor();
        let top = self.top.floor();
        Self {
            left,
            top,
            width: self.right().ceil() - left,
            height: self.bottom().ceil() - top,
        }
    }

    /// Pixel dimensions of a raster covering this rect at scene scale
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.round().max(0.0) as u32,
            self.height.round().max(0.0) as u32,
        )
    }
}

/// Axis-aligned rectangle in rendered pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderedRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl RenderedRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Modifier keys held while a pointer event fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        meta: false,
        alt: false,
        shift: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Ctrl (or Cmd on macOS) marks the clone source
    pub fn is_anchor_gesture(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer notification from the host, already mapped into scene space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub point: ScenePoint,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            point: ScenePoint::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(x: f32, y: f32, modifiers: Modifiers) -> Self {
        Self {
            point: ScenePoint::new(x, y),
            modifiers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_outward_snaps_to_whole_pixels() {
        let rect = SceneRect::new(10.4, 20.6, 5.2, 3.1).align_outward();
        assert_eq!(rect, SceneRect::new(10.0, 20.0, 6.0, 4.0));
        assert_eq!(rect.pixel_size(), (6, 4));
    }

    #[test]
    fn empty_rects() {
        assert!(SceneRect::new(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(SceneRect::new(0.0, 0.0, 5.0, f32::NAN).is_empty());
        assert!(!SceneRect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn anchor_gesture_accepts_ctrl_or_meta() {
        assert!(Modifiers::CTRL.is_anchor_gesture());
        assert!(Modifiers {
            meta: true,
            ..Modifiers::NONE
        }
        .is_anchor_gesture());
        assert!(!Modifiers {
            alt: true,
            shift: true,
            ..Modifiers::NONE
        }
        .is_anchor_gesture());
    }
}
