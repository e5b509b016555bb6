//! Stroke mask renderer
//!
//! Rasterizes the outline of a stroke path into an opacity mask covering the
//! path's bounding box. Only the stroked outline contributes coverage; the
//! path's own fill and color are never used, so a closed loop yields a ring,
//! not a filled polygon.

use tiny_skia::{Paint, Pixmap, Transform};

use super::error::CompositionError;
use super::path::StrokePath;
use super::types::SceneRect;

/// Opacity raster aligned to bounding-box-local coordinates
#[derive(Debug, Clone)]
pub struct StrokeMask {
    pixmap: Pixmap,
}

impl StrokeMask {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Coverage (0-255) at a mask-local pixel; 0 outside the mask
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        self.pixmap
            .pixel(x, y)
            .map(|pixel| pixel.alpha())
            .unwrap_or(0)
    }

    /// Mask as an opaque-black, alpha-coverage pixmap for compositing
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

/// Render `path` as a black stroke into a mask sized to `bounds`.
///
/// The stroke width comes from the path style (falling back to
/// `brush_width`); cap and join come from the path style as well.
pub fn render_mask(
    path: &StrokePath,
    bounds: SceneRect,
    brush_width: f32,
) -> Result<StrokeMask, CompositionError> {
    let geometry = path
        .geometry(brush_width)
        .ok_or(CompositionError::MissingPath)?;
    let (width, height) = bounds.pixel_size();
    let mut pixmap = Pixmap::new(width, height).ok_or(CompositionError::EmptyRegion)?;

    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, 255);
    paint.anti_alias = true;

    let stroke = path.style.to_skia(brush_width);
    let transform = Transform::from_translate(-bounds.left, -bounds.top);
    pixmap.stroke_path(&geometry, &paint, &stroke, transform, None);

    Ok(StrokeMask { pixmap })
}
