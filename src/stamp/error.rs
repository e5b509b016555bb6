//! Copy-stamp error types

use thiserror::Error;

/// A generated data URL could not be turned into a raster
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Malformed data URL")]
    MalformedDataUrl,

    #[error("Base64 decode error: {0}")]
    Base64(String),

    #[error("Image decode error: {0}")]
    Image(String),

    #[error("Decoded image has no pixels")]
    EmptyImage,
}

/// Failure reported by the host surface's serialize-to-raster operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Surface serialization failed: {0}")]
    Serialize(String),

    #[error("Requested region is empty")]
    EmptyRegion,
}

/// Snapshot capture failed; the stroke that needed it is unusable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Capture error: {0}")]
    Serialize(#[from] SurfaceError),

    #[error("Capture error: {0}")]
    Decode(#[from] LoadError),

    #[error("Capture abandoned before decode finished")]
    Abandoned,
}

/// A clone could not be composed; no layer may be produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    #[error("No stroke path to clone into")]
    MissingPath,

    #[error("No source anchor set")]
    MissingAnchor,

    #[error("No stroke start point")]
    MissingStrokeStart,

    #[error("Source snapshot not available")]
    MissingSnapshot,

    #[error("Source snapshot failed: {0}")]
    Snapshot(#[from] CaptureError),

    #[error("Clone region is empty")]
    EmptyRegion,
}

/// Any failure surfaced by a copy-stamp operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StampError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error("Layer encode error: {0}")]
    Encode(String),
}

impl From<StampError> for String {
    fn from(err: StampError) -> Self {
        err.to_string()
    }
}
