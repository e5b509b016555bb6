//! Clone compositor
//!
//! Combines the stroke's source snapshot with the stroke mask into a
//! positioned image:
//! 1. offset = bounding-box origin - stroke start; the source region is the
//!    bounding box moved to `anchor + offset`
//! 2. that region is mapped into rendered pixels and cropped out of the
//!    snapshot, scaled back to the bounding box's scene-pixel size
//! 3. the stroke outline is rasterized into a mask
//! 4. cropped pixels are kept only where the mask is opaque (destination-in)
//! 5. the result is wrapped as a locked, non-interactive image at the box origin

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tiny_skia::{BlendMode, FilterQuality, Pixmap, PixmapPaint, Transform};

use super::coordinate_mapper::CoordinateMapper;
use super::error::{CompositionError, StampError};
use super::mask::render_mask;
use super::path::StrokePath;
use super::raster::{encode_data_url, image_to_pixmap, pixmap_to_image};
use super::snapshot::SourceSnapshot;
use super::surface::{Drawable, DrawableSurface, ObjectId};
use super::types::{ScenePoint, SceneRect};

pub const COMMITTED_LAYER_NAME: &str = "copyStampClonedImage";
pub const PREVIEW_LAYER_NAME: &str = "copyStampPreview";

/// Whether a cloned image is a scratch preview or the committed result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Preview,
    Committed,
}

impl LayerKind {
    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Preview => PREVIEW_LAYER_NAME,
            LayerKind::Committed => COMMITTED_LAYER_NAME,
        }
    }
}

/// Cloned pixels positioned in the scene. Immutable once built.
#[derive(Debug, Clone)]
pub struct ClonedImage {
    kind: LayerKind,
    left: f32,
    top: f32,
    image: RgbaImage,
}

impl ClonedImage {
    pub fn new(kind: LayerKind, left: f32, top: f32, image: RgbaImage) -> Self {
        Self {
            kind,
            left,
            top,
            image,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn origin(&self) -> ScenePoint {
        ScenePoint::new(self.left, self.top)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Serializable properties handed to the host's `addObject` listener
    pub fn descriptor(&self, id: ObjectId) -> Result<LayerDescriptor, StampError> {
        let src = encode_data_url(&self.image).map_err(|e| StampError::Encode(e.to_string()))?;
        Ok(LayerDescriptor {
            id,
            name: self.kind.name().to_string(),
            left: self.left,
            top: self.top,
            width: self.image.width(),
            height: self.image.height(),
            selectable: false,
            evented: false,
            lock_movement_x: true,
            lock_movement_y: true,
            src,
        })
    }
}

impl Drawable for ClonedImage {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn bounds(&self) -> SceneRect {
        SceneRect::new(
            self.left,
            self.top,
            self.image.width() as f32,
            self.image.height() as f32,
        )
    }

    fn hit_testable(&self) -> bool {
        false
    }

    fn render(&self, zoom: f32) -> Option<Pixmap> {
        let pixmap = image_to_pixmap(&self.image)?;
        if (zoom - 1.0).abs() < f32::EPSILON {
            return Some(pixmap);
        }
        let width = (self.image.width() as f32 * zoom).round().max(1.0) as u32;
        let height = (self.image.height() as f32 * zoom).round().max(1.0) as u32;
        let mut scaled = Pixmap::new(width, height)?;
        scaled.draw_pixmap(
            0,
            0,
            pixmap.as_ref(),
            &PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..PixmapPaint::default()
            },
            Transform::from_scale(zoom, zoom),
            None,
        );
        Some(scaled)
    }
}

/// Committed layer properties for the host's scene and undo bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDescriptor {
    pub id: ObjectId,
    pub name: String,
    pub left: f32,
    pub top: f32,
    pub width: u32,
    pub height: u32,
    pub selectable: bool,
    pub evented: bool,
    pub lock_movement_x: bool,
    pub lock_movement_y: bool,
    /// PNG data URL of the cloned pixels
    pub src: String,
}

#[cfg(test)]
impl LayerDescriptor {
    pub(crate) fn example() -> Self {
        Self {
            id: ObjectId(7),
            name: COMMITTED_LAYER_NAME.to_string(),
            left: 10.0,
            top: 20.0,
            width: 4,
            height: 4,
            selectable: false,
            evented: false,
            lock_movement_x: true,
            lock_movement_y: true,
            src: "data:image/png;base64,".to_string(),
        }
    }
}

/// Everything a composition needs besides the snapshot pixels
#[derive(Debug, Clone, Copy)]
pub struct CloneRequest<'a> {
    pub path: Option<&'a StrokePath>,
    pub anchor: Option<ScenePoint>,
    pub stroke_start: Option<ScenePoint>,
    pub brush_width: f32,
    pub kind: LayerKind,
}

impl<'a> CloneRequest<'a> {
    fn validate(&self) -> Result<(&'a StrokePath, ScenePoint, ScenePoint), CompositionError> {
        let path = self.path.ok_or(CompositionError::MissingPath)?;
        let anchor = self.anchor.ok_or(CompositionError::MissingAnchor)?;
        let start = self.stroke_start.ok_or(CompositionError::MissingStrokeStart)?;
        Ok((path, anchor, start))
    }
}

/// Compose a clone against the stroke's snapshot.
///
/// Preconditions are checked before waiting on the snapshot. Zoom and pan are
/// read from the surface after the snapshot resolves.
pub async fn compose<S: DrawableSurface + ?Sized>(
    surface: &S,
    request: CloneRequest<'_>,
    snapshot: Option<&SourceSnapshot>,
) -> Result<ClonedImage, CompositionError> {
    let (path, anchor, start) = request.validate()?;
    let snapshot = snapshot.ok_or(CompositionError::MissingSnapshot)?;
    let pixels = snapshot.resolve().await?;

    let mapper = CoordinateMapper::from_surface(surface);
    compose_with(
        &pixels,
        path,
        anchor,
        start,
        mapper,
        request.brush_width,
        request.kind,
    )
}

/// Synchronous core of [`compose`]
pub fn compose_with(
    snapshot: &Pixmap,
    path: &StrokePath,
    anchor: ScenePoint,
    stroke_start: ScenePoint,
    mapper: CoordinateMapper,
    brush_width: f32,
    kind: LayerKind,
) -> Result<ClonedImage, CompositionError> {
    let bounds = path
        .bounding_rect(brush_width)
        .ok_or(CompositionError::MissingPath)?;
    let source = source_region(bounds, anchor, stroke_start);
    let region = mapper.rect_to_rendered(source);
    if region.is_empty() {
        return Err(CompositionError::EmptyRegion);
    }

    let (width, height) = bounds.pixel_size();
    let mut cloned = Pixmap::new(width, height).ok_or(CompositionError::EmptyRegion)?;
    let crop = Transform::from_translate(-region.left, -region.top)
        .post_scale(width as f32 / region.width, height as f32 / region.height);
    cloned.draw_pixmap(
        0,
        0,
        snapshot.as_ref(),
        &PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        },
        crop,
        None,
    );

    let mask = render_mask(path, bounds, brush_width)?;
    cloned.draw_pixmap(
        0,
        0,
        mask.pixmap().as_ref(),
        &PixmapPaint {
            blend_mode: BlendMode::DestinationIn,
            ..PixmapPaint::default()
        },
        Transform::identity(),
        None,
    );

    Ok(ClonedImage::new(
        kind,
        bounds.left,
        bounds.top,
        pixmap_to_image(&cloned),
    ))
}

/// Scene region to clone from: the bounding box shifted by how far it sits
/// from the stroke start, relative to the anchor.
pub fn source_region(bounds: SceneRect, anchor: ScenePoint, stroke_start: ScenePoint) -> SceneRect {
    let offset_x = bounds.left - stroke_start.x;
    let offset_y = bounds.top - stroke_start.y;
    SceneRect::new(
        anchor.x + offset_x,
        anchor.y + offset_y,
        bounds.width,
        bounds.height,
    )
}
