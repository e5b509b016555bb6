//! Host surface interface - the drawable canvas the copy-stamp tool works on
//!
//! The host owns the rendered scene, its zoom/pan transform, pointer events
//! and stroke-path generation. The tool only talks to it through these traits.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tiny_skia::Pixmap;

use super::compositor::LayerDescriptor;
use super::error::SurfaceError;
use super::path::StrokePath;
use super::types::{PointerEvent, RenderedRect, SceneRect};

/// Identifier of an object placed on the host surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// Something the host surface can place in its scene and draw.
pub trait Drawable: Send + Sync {
    /// Object name used by the host for bookkeeping
    fn name(&self) -> &'static str;

    /// Scene-space area covered by the object
    fn bounds(&self) -> SceneRect;

    fn visible(&self) -> bool {
        true
    }

    /// Whether pointer hit-testing may resolve to this object
    fn hit_testable(&self) -> bool {
        true
    }

    /// Whether the object takes part in exported/serialized output
    fn exportable(&self) -> bool {
        true
    }

    /// Rasterize at the given zoom, anchored at `bounds()` origin scaled by zoom
    fn render(&self, zoom: f32) -> Option<Pixmap>;
}

pub type SceneObject = Arc<dyn Drawable>;

/// Pointer cursor shapes the host can display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorStyle {
    #[default]
    Default,
    Crosshair,
    None,
}

/// Cursor and selection behavior of the host surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionMode {
    pub default_cursor: CursorStyle,
    pub hover_cursor: CursorStyle,
    pub move_cursor: CursorStyle,
    pub drawing_cursor: CursorStyle,
    pub selection: bool,
}

impl InteractionMode {
    /// Mode used while the copy stamp is active: the indicator replaces the cursor
    pub const STAMPING: Self = Self {
        default_cursor: CursorStyle::None,
        hover_cursor: CursorStyle::None,
        move_cursor: CursorStyle::None,
        drawing_cursor: CursorStyle::None,
        selection: false,
    };
}

impl Default for InteractionMode {
    fn default() -> Self {
        Self {
            default_cursor: CursorStyle::Default,
            hover_cursor: CursorStyle::Default,
            move_cursor: CursorStyle::Default,
            drawing_cursor: CursorStyle::Crosshair,
            selection: true,
        }
    }
}

/// Free-drawing brush configuration pushed to the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushConfig {
    pub width: f32,
    /// RGBA; the raw stroke is always fully transparent
    pub color: [u8; 4],
}

impl BrushConfig {
    pub fn transparent(width: f32) -> Self {
        Self {
            width,
            color: [0, 0, 0, 0],
        }
    }
}

/// A stroke path the host finished generating
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedPath {
    pub path: StrokePath,
    /// The host's own rendered (transparent) path object, if it added one
    pub object: Option<ObjectId>,
}

/// Notifications delivered from the host to the tool
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PathCreated(FinishedPath),
}

/// The host's drawable surface.
///
/// All methods are synchronous; anything slow the tool derives from them
/// (image decoding, compositing) runs off the event handler.
pub trait DrawableSurface: Send + Sync + 'static {
    fn zoom(&self) -> f32;

    /// Pan offset of the viewport transform, in rendered pixels
    fn pan(&self) -> (f32, f32);

    /// Serialize the visible content (or a rendered sub-rectangle) to a
    /// `data:image/png;base64,` URL. Objects that are hidden or not
    /// exportable must be left out.
    fn to_data_url(&self, region: Option<RenderedRect>) -> Result<String, SurfaceError>;

    fn add_object(&self, object: SceneObject) -> ObjectId;

    fn remove_object(&self, id: ObjectId);

    fn bring_to_front(&self, id: ObjectId);

    fn configure_brush(&self, brush: BrushConfig);

    fn set_drawing_mode(&self, enabled: bool);

    fn interaction_mode(&self) -> InteractionMode;

    fn set_interaction_mode(&self, mode: InteractionMode);

    /// Path built from the points collected so far in the current stroke
    fn current_path(&self) -> Option<StrokePath>;

    fn request_render(&self) {}
}

/// Receiver of committed clone layers (the host's `addObject` listener)
pub trait CommitSink: Send + Sync + 'static {
    fn add_object(&self, descriptor: LayerDescriptor);
}

impl CommitSink for tokio::sync::mpsc::UnboundedSender<LayerDescriptor> {
    fn add_object(&self, descriptor: LayerDescriptor) {
        if self.send(descriptor).is_err() {
            tracing::warn!("[CopyStamp] Commit listener dropped, clone layer descriptor discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamping_mode_hides_every_cursor() {
        let mode = InteractionMode::STAMPING;
        assert!(!mode.selection);
        assert_eq!(mode.drawing_cursor, CursorStyle::None);
        assert_eq!(InteractionMode::default().drawing_cursor, CursorStyle::Crosshair);
    }

    #[test]
    fn channel_sink_forwards_descriptors() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let descriptor = LayerDescriptor::example();
        tx.add_object(descriptor.clone());
        assert_eq!(rx.try_recv().ok(), Some(descriptor));
    }
}
