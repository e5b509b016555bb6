//! Copy-stamp (clone) tool
//!
//! Samples pixels around a source anchor and paints them along the user's
//! stroke, offset by the stroke's displacement from its start point.

mod compositor;
mod coordinate_mapper;
mod cursor;
mod engine;
mod error;
mod mask;
mod path;
mod raster;
mod session;
mod settings;
mod snapshot;
mod surface;
mod types;

#[cfg(test)]
mod test_support;

pub use compositor::{
    compose, compose_with, source_region, ClonedImage, CloneRequest, LayerDescriptor, LayerKind,
    COMMITTED_LAYER_NAME, PREVIEW_LAYER_NAME,
};
pub use coordinate_mapper::CoordinateMapper;
pub use cursor::{CursorIndicator, CursorUpdate, CURSOR_NAME, DEFAULT_BORDER_BASE};
pub use engine::{CopyStamp, DropReason, StampOutcome};
pub use error::{CaptureError, CompositionError, LoadError, StampError, SurfaceError};
pub use mask::{render_mask, StrokeMask};
pub use path::{LineCap, LineJoin, StrokePath, StrokeStyle};
pub use raster::{
    decode_data_url, decode_data_url_to_pixmap, encode_data_url, image_to_pixmap,
    pixmap_to_image,
};
pub use session::{OperationSlot, SlotGuard, StampPhase, StrokeSession};
pub use settings::{BrushSettings, CopyStampConfig, DEFAULT_BRUSH_WIDTH};
pub use snapshot::{SnapshotResult, SourceSnapshot};
pub use surface::{
    BrushConfig, CommitSink, CursorStyle, Drawable, DrawableSurface, FinishedPath,
    InteractionMode, ObjectId, SceneObject, SurfaceEvent,
};
pub use types::{
    Modifiers, PointerEvent, RenderedPoint, RenderedRect, ScenePoint, SceneRect,
};
