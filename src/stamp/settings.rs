//! Copy-stamp tool configuration

use serde::{Deserialize, Serialize};

use super::cursor::DEFAULT_BORDER_BASE;

/// Default brush diameter in scene pixels
pub const DEFAULT_BRUSH_WIDTH: f32 = 20.0;

/// Per-call brush settings passed to `start` / `set_brush`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BrushSettings {
    pub width: Option<f32>,
}

impl BrushSettings {
    pub fn with_width(width: f32) -> Self {
        Self { width: Some(width) }
    }

    /// Requested width if usable, otherwise `current`
    pub fn resolve_width(&self, current: f32) -> f32 {
        match self.width {
            Some(width) if width.is_finite() && width > 0.0 => width,
            _ => current,
        }
    }
}

/// Tool-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CopyStampConfig {
    /// Brush width used until `set_brush` changes it
    pub default_brush_width: f32,
    /// Show a crop of the source pixels inside the cursor circle
    pub cursor_preview: bool,
    /// Cursor ring width at zoom 0; the ring is `base - zoom` wide
    pub cursor_border_base: f32,
}

impl Default for CopyStampConfig {
    fn default() -> Self {
        Self {
            default_brush_width: DEFAULT_BRUSH_WIDTH,
            cursor_preview: true,
            cursor_border_base: DEFAULT_BORDER_BASE,
        }
    }
}

impl CopyStampConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
