//! Brush cursor indicator
//!
//! A circle of the brush radius that follows the pointer. Once a source
//! anchor exists it can show a live crop of the source pixels inside the
//! circle. It never takes part in hit-testing or exported output.

use parking_lot::RwLock;
use std::sync::Arc;
use tiny_skia::{
    FillRule, FilterQuality, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

use super::surface::Drawable;
use super::types::{ScenePoint, SceneRect};

pub const CURSOR_NAME: &str = "copyStampCursor";

/// Default ring width base; the ring gets thinner as zoom grows
pub const DEFAULT_BORDER_BASE: f32 = 7.0;

#[derive(Debug, Clone)]
struct CursorState {
    center: ScenePoint,
    radius: f32,
    visible: bool,
    has_source: bool,
    show_image: bool,
    fill: Option<Arc<Pixmap>>,
}

/// Partial update applied by the tool on pointer and brush changes
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorUpdate {
    pub radius: f32,
    pub has_source: bool,
    /// Moving the cursor also makes it visible
    pub position: Option<ScenePoint>,
    pub show_image: Option<bool>,
}

#[derive(Debug)]
pub struct CursorIndicator {
    state: RwLock<CursorState>,
    border_base: f32,
}

impl CursorIndicator {
    /// Hidden until the first pointer position arrives
    pub fn new(radius: f32) -> Self {
        Self::with_border_base(radius, DEFAULT_BORDER_BASE)
    }

    pub fn with_border_base(radius: f32, border_base: f32) -> Self {
        Self {
            state: RwLock::new(CursorState {
                center: ScenePoint::default(),
                radius,
                visible: false,
                has_source: false,
                show_image: true,
                fill: None,
            }),
            border_base,
        }
    }

    pub fn update(&self, update: CursorUpdate) {
        let mut state = self.state.write();
        state.radius = update.radius;
        state.has_source = update.has_source;
        if let Some(position) = update.position {
            state.center = position;
            state.visible = true;
        }
        if let Some(show_image) = update.show_image {
            state.show_image = show_image;
        }
    }

    /// Set visibility, returning the previous value
    pub fn replace_visible(&self, visible: bool) -> bool {
        std::mem::replace(&mut self.state.write().visible, visible)
    }

    pub fn set_fill(&self, fill: Option<Arc<Pixmap>>) {
        self.state.write().fill = fill;
    }

    pub fn is_visible(&self) -> bool {
        self.state.read().visible
    }

    pub fn radius(&self) -> f32 {
        self.state.read().radius
    }

    pub fn center(&self) -> ScenePoint {
        self.state.read().center
    }

    pub fn has_source(&self) -> bool {
        self.state.read().has_source
    }

    pub fn shows_image(&self) -> bool {
        self.state.read().show_image
    }

    pub fn has_fill(&self) -> bool {
        self.state.read().fill.is_some()
    }

    /// Outer ring width in scene units at the given zoom
    pub fn border_width(&self, zoom: f32) -> f32 {
        (self.border_base - zoom).max(1.0)
    }
}

impl Drawable for CursorIndicator {
    fn name(&self) -> &'static str {
        CURSOR_NAME
    }

    fn bounds(&self) -> SceneRect {
        let state = self.state.read();
        SceneRect::new(
            state.center.x - state.radius,
            state.center.y - state.radius,
            state.radius * 2.0,
            state.radius * 2.0,
        )
    }

    fn visible(&self) -> bool {
        self.is_visible()
    }

    fn hit_testable(&self) -> bool {
        false
    }

    fn exportable(&self) -> bool {
        false
    }

    /// The raster is centered on the cursor and includes the outer ring,
    /// which spills half a border width past `bounds()`.
    fn render(&self, zoom: f32) -> Option<Pixmap> {
        let state = self.state.read().clone();
        let radius = state.radius;
        let border = self.border_width(zoom);
        let extent = radius + border * 0.5;
        let size = (extent * 2.0 * zoom).ceil().max(1.0) as u32;

        let mut pixmap = Pixmap::new(size, size)?;
        let transform = Transform::from_translate(extent, extent).post_scale(zoom, zoom);
        let circle = PathBuilder::from_circle(0.0, 0.0, radius)?;

        if let (true, true, Some(fill)) = (state.has_source, state.show_image, &state.fill) {
            let fill: &Pixmap = fill;
            let mut clip = Mask::new(size, size)?;
            clip.fill_path(&circle, FillRule::Winding, true, transform);
            let fill_transform = Transform::from_scale(
                radius * 2.0 / fill.width() as f32,
                radius * 2.0 / fill.height() as f32,
            )
            .post_translate(-radius, -radius)
            .post_concat(transform);
            pixmap.draw_pixmap(
                0,
                0,
                fill.as_ref(),
                &PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                },
                fill_transform,
                Some(&clip),
            );
        }

        let mut paint = Paint::default();
        paint.anti_alias = true;

        paint.set_color_rgba8(255, 255, 255, 255);
        let outer = Stroke {
            width: border,
            ..Stroke::default()
        };
        pixmap.stroke_path(&circle, &paint, &outer, transform, None);

        let inner_radius = radius - border * 0.5;
        if let Some(inner_circle) = PathBuilder::from_circle(0.0, 0.0, inner_radius) {
            paint.set_color_rgba8(0, 0, 0, 255);
            let inner = Stroke {
                width: (border - 1.0).max(1.0),
                ..Stroke::default()
            };
            pixmap.stroke_path(&inner_circle, &paint, &inner, transform, None);
        }

        Some(pixmap)
    }
}
