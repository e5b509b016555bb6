//! Freehand stroke paths as produced by the host's pencil brush

use serde::{Deserialize, Serialize};
use tiny_skia::{LineCap as SkiaCap, LineJoin as SkiaJoin, Path, PathBuilder, Stroke};

use super::types::{ScenePoint, SceneRect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
    Bevel,
}

/// Stroke style attached to a path by the host brush
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeStyle {
    /// `None` falls back to the tool's brush width
    pub width: Option<f32>,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    /// RGBA stroke color as rendered by the host
    pub color: [u8; 4],
    /// RGBA fill color, if any
    pub fill: Option<[u8; 4]>,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: None,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            color: [0, 0, 0, 0],
            fill: None,
        }
    }
}

impl StrokeStyle {
    pub fn with_width(width: f32) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    /// Stroke width to use, falling back to the brush width
    pub fn resolved_width(&self, brush_width: f32) -> f32 {
        match self.width {
            Some(width) if width.is_finite() && width > 0.0 => width,
            _ => brush_width,
        }
    }

    pub fn to_skia(&self, brush_width: f32) -> Stroke {
        Stroke {
            width: self.resolved_width(brush_width),
            line_cap: match self.line_cap {
                LineCap::Butt => SkiaCap::Butt,
                LineCap::Round => SkiaCap::Round,
                LineCap::Square => SkiaCap::Square,
            },
            line_join: match self.line_join {
                LineJoin::Miter => SkiaJoin::Miter,
                LineJoin::Round => SkiaJoin::Round,
                LineJoin::Bevel => SkiaJoin::Bevel,
            },
            ..Stroke::default()
        }
    }
}

/// A freehand stroke: the sampled pointer positions plus the brush style.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StrokePath {
    pub points: Vec<ScenePoint>,
    pub style: StrokeStyle,
}

impl StrokePath {
    pub fn new(points: Vec<ScenePoint>, style: StrokeStyle) -> Self {
        Self { points, style }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smoothed outline geometry in scene coordinates.
    ///
    /// Each sample acts as the control point of a quadratic segment ending at
    /// the midpoint to the next sample; the last sample is reached with a
    /// straight line. Returns `None` for an empty path.
    pub fn geometry(&self, brush_width: f32) -> Option<Path> {
        let mut points = self.points.clone();
        match points.len() {
            0 => return None,
            1 => points.push(points[0]),
            _ => {}
        }

        // A dot would collapse to nothing; nudge it wide enough to stroke.
        if points.len() == 2 && points[0] == points[1] {
            let nudge = self.style.resolved_width(brush_width) / 1000.0;
            points[0].x -= nudge;
            points[1].x += nudge;
        }

        let mut builder = PathBuilder::new();
        builder.move_to(points[0].x, points[0].y);
        for pair in points.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            if current != next {
                let mid = current.midpoint(next);
                builder.quad_to(current.x, current.y, mid.x, mid.y);
            }
        }
        if let Some(last) = points.last() {
            builder.line_to(last.x, last.y);
        }
        builder.finish()
    }

    /// Bounding box of the stroked path (half the stroke width outside the
    /// centerline), aligned outward to whole scene pixels.
    pub fn bounding_rect(&self, brush_width: f32) -> Option<SceneRect> {
        let geometry = self.geometry(brush_width)?;
        let bounds = geometry.bounds();
        let half = self.style.resolved_width(brush_width) * 0.5;
        let rect = SceneRect::new(
            bounds.left() - half,
            bounds.top() - half,
            bounds.width() + half * 2.0,
            bounds.height() + half * 2.0,
        )
        .align_outward();
        if rect.is_empty() {
            None
        } else {
            Some(rect)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn path(points: &[(f32, f32)], width: f32) -> StrokePath {
        StrokePath::new(
            points.iter().map(|&(x, y)| ScenePoint::new(x, y)).collect(),
            StrokeStyle::with_width(width),
        )
    }

    #[test]
    fn empty_path_has_no_geometry() {
        assert!(path(&[], 4.0).geometry(4.0).is_none());
        assert!(path(&[], 4.0).bounding_rect(4.0).is_none());
    }

    #[test]
    fn bounds_include_half_the_stroke_width() {
        let rect = path(&[(102.0, 102.0), (118.0, 118.0)], 4.0)
            .bounding_rect(4.0)
            .unwrap();
        assert_eq!(rect, SceneRect::new(100.0, 100.0, 20.0, 20.0));
    }

    #[test]
    fn single_point_becomes_a_dot() {
        let rect = path(&[(50.0, 50.0)], 10.0).bounding_rect(10.0).unwrap();
        assert_eq!(rect, SceneRect::new(44.0, 45.0, 12.0, 10.0));
    }

    #[test]
    fn missing_style_width_uses_brush_width() {
        let stroke = StrokePath::new(
            vec![ScenePoint::new(10.0, 10.0), ScenePoint::new(30.0, 10.0)],
            StrokeStyle::default(),
        );
        let rect = stroke.bounding_rect(8.0).unwrap();
        assert_eq!(rect, SceneRect::new(6.0, 6.0, 28.0, 8.0));
        assert_eq!(stroke.style.to_skia(8.0).width, 8.0);
    }

    #[test]
    fn repeated_samples_are_skipped() {
        let stroke = path(&[(0.0, 0.0), (0.0, 0.0), (10.0, 0.0)], 2.0);
        assert!(stroke.geometry(2.0).is_some());
    }
}
