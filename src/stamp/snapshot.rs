//! Source snapshot cache
//!
//! A snapshot is a raster copy of the visible surface used as the clone's
//! pixel source. Serialization happens synchronously on the host; decoding
//! the resulting data URL runs on the blocking pool. Every clone of a
//! [`SourceSnapshot`] observes the same pending or resolved value, so all
//! previews and the final composite of a stroke share one capture.

use std::sync::Arc;
use tiny_skia::Pixmap;
use tokio::sync::watch;

use super::cursor::CursorIndicator;
use super::error::{CaptureError, SurfaceError};
use super::raster::decode_data_url_to_pixmap;
use super::surface::DrawableSurface;
use super::types::RenderedRect;

pub type SnapshotResult = Result<Arc<Pixmap>, CaptureError>;

/// Memoized, read-only capture of the surface
#[derive(Debug, Clone)]
pub struct SourceSnapshot {
    slot: watch::Receiver<Option<SnapshotResult>>,
}

impl SourceSnapshot {
    /// Capture the whole visible surface, keeping the cursor out of it
    pub fn capture<S: DrawableSurface + ?Sized>(
        surface: &S,
        cursor: Option<&CursorIndicator>,
    ) -> Self {
        Self::from_serialized(with_cursor_hidden(cursor, || surface.to_data_url(None)))
    }

    /// Capture a rendered sub-rectangle (used for the cursor preview fill)
    pub fn capture_region<S: DrawableSurface + ?Sized>(
        surface: &S,
        region: RenderedRect,
        cursor: Option<&CursorIndicator>,
    ) -> Self {
        if region.is_empty() {
            return Self::resolved(Err(SurfaceError::EmptyRegion.into()));
        }
        Self::from_serialized(with_cursor_hidden(cursor, || {
            surface.to_data_url(Some(region))
        }))
    }

    /// A snapshot whose value is already known
    pub fn resolved(result: SnapshotResult) -> Self {
        let (_tx, slot) = watch::channel(Some(result));
        Self { slot }
    }

    fn from_serialized(serialized: Result<String, SurfaceError>) -> Self {
        let url = match serialized {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!("[CopyStamp] Surface serialization failed: {}", err);
                return Self::resolved(Err(err.into()));
            }
        };

        let (tx, slot) = watch::channel(None);
        tokio::task::spawn_blocking(move || {
            let result = decode_data_url_to_pixmap(&url)
                .map(Arc::new)
                .map_err(CaptureError::from);
            match &result {
                Ok(pixmap) => tracing::debug!(
                    "[CopyStamp] Snapshot decoded: {}x{}",
                    pixmap.width(),
                    pixmap.height()
                ),
                Err(err) => tracing::warn!("[CopyStamp] Snapshot decode failed: {}", err),
            }
            // Nobody listening any more means the stroke was discarded.
            let _ = tx.send(Some(result));
        });
        Self { slot }
    }

    /// A snapshot resolved by whoever holds the sender
    #[cfg(test)]
    pub(crate) fn pending() -> (watch::Sender<Option<SnapshotResult>>, Self) {
        let (tx, slot) = watch::channel(None);
        (tx, Self { slot })
    }

    /// Wait for the capture to finish
    pub async fn resolve(&self) -> SnapshotResult {
        let mut slot = self.slot.clone();
        let value = match slot.wait_for(Option::is_some).await {
            Ok(value) => (*value).clone(),
            Err(_) => None,
        };
        value.unwrap_or(Err(CaptureError::Abandoned))
    }
}

fn with_cursor_hidden<T>(cursor: Option<&CursorIndicator>, capture: impl FnOnce() -> T) -> T {
    let Some(cursor) = cursor else {
        return capture();
    };
    let was_visible = cursor.replace_visible(false);
    let result = capture();
    cursor.replace_visible(was_visible);
    result
}
