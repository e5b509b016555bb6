use super::surface::DrawableSurface;
use super::types::{RenderedPoint, RenderedRect, ScenePoint, SceneRect};

/// Zoom/pan transform between scene and rendered pixel space.
///
/// Always build a fresh mapper from the surface right before mapping; zoom and
/// pan may change between two events of the same stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    zoom: f32,
    pan_x: f32,
    pan_y: f32,
}

impl CoordinateMapper {
    pub fn new(zoom: f32, pan_x: f32, pan_y: f32) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    pub fn from_surface<S: DrawableSurface + ?Sized>(surface: &S) -> Self {
        let (pan_x, pan_y) = surface.pan();
        Self::new(surface.zoom(), pan_x, pan_y)
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn to_rendered(&self, point: ScenePoint) -> RenderedPoint {
        RenderedPoint::new(
            point.x * self.zoom + self.pan_x,
            point.y * self.zoom + self.pan_y,
        )
    }

    pub fn to_scene(&self, point: RenderedPoint) -> ScenePoint {
        if !self.zoom.is_finite() || self.zoom.abs() < f32::EPSILON {
            return ScenePoint::new(point.x - self.pan_x, point.y - self.pan_y);
        }
        ScenePoint::new(
            (point.x - self.pan_x) / self.zoom,
            (point.y - self.pan_y) / self.zoom,
        )
    }

    pub fn rect_to_rendered(&self, rect: SceneRect) -> RenderedRect {
        let origin = self.to_rendered(rect.origin());
        RenderedRect::new(
            origin.x,
            origin.y,
            rect.width * self.zoom,
            rect.height * self.zoom,
        )
    }

    /// Rendered square of side `2 * radius` (scene units) centered on `center`
    pub fn square_around(&self, center: ScenePoint, radius: f32) -> RenderedRect {
        let mapped = self.to_rendered(center);
        let half = radius * self.zoom;
        RenderedRect::new(mapped.x - half, mapped.y - half, half * 2.0, half * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{a} != {b}");
    }

    #[test]
    fn identity_transform_keeps_points() {
        let mapper = CoordinateMapper::new(1.0, 0.0, 0.0);
        assert_eq!(
            mapper.to_rendered(ScenePoint::new(12.0, 34.0)),
            RenderedPoint::new(12.0, 34.0)
        );
    }

    #[test]
    fn zoom_then_pan() {
        let mapper = CoordinateMapper::new(2.0, 10.0, -5.0);
        assert_eq!(
            mapper.to_rendered(ScenePoint::new(3.0, 4.0)),
            RenderedPoint::new(16.0, 3.0)
        );
        assert_eq!(
            mapper.rect_to_rendered(SceneRect::new(1.0, 1.0, 20.0, 10.0)),
            RenderedRect::new(12.0, -3.0, 40.0, 20.0)
        );
    }

    #[test]
    fn round_trips_across_zoom_and_pan() {
        for &zoom in &[0.1_f32, 0.5, 1.0, 1.75, 4.0, 12.5] {
            for &(px, py) in &[(0.0_f32, 0.0_f32), (-120.5, 33.25), (800.0, -640.0)] {
                let mapper = CoordinateMapper::new(zoom, px, py);
                for &(x, y) in &[(0.0_f32, 0.0_f32), (100.0, 100.0), (-37.5, 512.25)] {
                    let point = ScenePoint::new(x, y);
                    let back = mapper.to_scene(mapper.to_rendered(point));
                    assert_close(back.x, x);
                    assert_close(back.y, y);
                }
            }
        }
    }

    #[test]
    fn square_around_scales_with_zoom() {
        let mapper = CoordinateMapper::new(2.0, 4.0, 6.0);
        let square = mapper.square_around(ScenePoint::new(50.0, 50.0), 10.0);
        assert_eq!(square, RenderedRect::new(84.0, 86.0, 40.0, 40.0));
    }
}
