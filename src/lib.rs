//! Copy-stamp clone tool for a zoomable, pannable drawing surface
//!
//! The host editor implements [`stamp::DrawableSurface`] and forwards pointer
//! and path events to a [`stamp::CopyStamp`]; committed clones come back
//! through a [`stamp::CommitSink`].

pub mod stamp;

pub use stamp::{
    BrushSettings, CommitSink, CopyStamp, CopyStampConfig, DrawableSurface, LayerDescriptor,
    StampError, StampOutcome, SurfaceEvent,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the fmt subscriber, filtered by `RUST_LOG` (default `copystamp=debug`).
///
/// Does nothing if the host already installed a global subscriber.
pub fn init_logging() {
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "copystamp=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Copy stamp logging initialized");
    }
}
