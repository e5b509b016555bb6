//! Copy-stamp tool engine
//!
//! Ctrl/Meta + pointer-down anchors the source, a plain pointer-down opens a
//! stroke and captures the source snapshot, pointer moves refresh a single
//! scratch preview, and the host's path-created event commits the final
//! clone. Event handlers are async; the state lock is never held across an
//! await point. Results that arrive after `end()` or after the stroke was
//! replaced are dropped without touching the surface.

use parking_lot::Mutex;
use std::sync::Arc;

use super::compositor::{compose, CloneRequest, LayerDescriptor, LayerKind};
use super::coordinate_mapper::CoordinateMapper;
use super::cursor::{CursorIndicator, CursorUpdate};
use super::error::{CompositionError, StampError};
use super::session::{OperationSlot, StampPhase, StrokeSession};
use super::settings::{BrushSettings, CopyStampConfig, DEFAULT_BRUSH_WIDTH};
use super::snapshot::{SnapshotResult, SourceSnapshot};
use super::surface::{
    BrushConfig, CommitSink, DrawableSurface, FinishedPath, InteractionMode, ObjectId,
    SurfaceEvent,
};
use super::types::{PointerEvent, ScenePoint};

/// Why a pointer move did not produce a preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Another preview update is still running
    InFlight,
    NoStroke,
    StrokeComplete,
    /// Moves with the anchor modifier held never preview
    AnchorGesture,
}

/// What handling one surface event did
#[derive(Debug, Clone, PartialEq)]
pub enum StampOutcome {
    /// Tool is not active
    Ignored,
    AnchorSet,
    /// Plain pointer-down without an anchor
    NoAnchor,
    StrokeOpened { stroke: u64 },
    Previewed,
    FrameDropped(DropReason),
    Committed(LayerDescriptor),
    /// Path finished with no open stroke to clone into
    NothingToCommit,
    /// Result arrived after the tool ended or the stroke was replaced
    Discarded,
    Failed(StampError),
}

#[derive(Debug)]
struct CursorHandle {
    id: ObjectId,
    indicator: Arc<CursorIndicator>,
}

#[derive(Debug)]
struct ToolState {
    active: bool,
    phase: StampPhase,
    /// Bumped by `start` and `end`; work begun under another epoch is stale
    epoch: u64,
    /// Bumped on every anchor change; gates the cursor preview fill
    anchor_generation: u64,
    next_stroke: u64,
    brush_width: f32,
    anchor: Option<ScenePoint>,
    session: Option<StrokeSession>,
    cursor: Option<CursorHandle>,
    saved_mode: Option<InteractionMode>,
}

impl ToolState {
    fn new(brush_width: f32) -> Self {
        Self {
            active: false,
            phase: StampPhase::Idle,
            epoch: 0,
            anchor_generation: 0,
            next_stroke: 1,
            brush_width,
            anchor: None,
            session: None,
            cursor: None,
            saved_mode: None,
        }
    }

    fn resting_phase(&self) -> StampPhase {
        if self.anchor.is_some() {
            StampPhase::SourceSet
        } else {
            StampPhase::Idle
        }
    }

    fn cursor_indicator(&self) -> Option<Arc<CursorIndicator>> {
        self.cursor.as_ref().map(|cursor| Arc::clone(&cursor.indicator))
    }
}

struct Inner<S: DrawableSurface> {
    surface: Arc<S>,
    sink: Arc<dyn CommitSink>,
    config: CopyStampConfig,
    state: Mutex<ToolState>,
    preview_slot: OperationSlot,
    finalize_slot: OperationSlot,
}

/// The copy-stamp tool bound to one host surface
pub struct CopyStamp<S: DrawableSurface> {
    inner: Arc<Inner<S>>,
}

impl<S: DrawableSurface> Clone for CopyStamp<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DrawableSurface> CopyStamp<S> {
    pub fn new(surface: Arc<S>, sink: Arc<dyn CommitSink>, config: CopyStampConfig) -> Self {
        let brush_width = BrushSettings::with_width(config.default_brush_width)
            .resolve_width(DEFAULT_BRUSH_WIDTH);
        Self {
            inner: Arc::new(Inner {
                surface,
                sink,
                config,
                state: Mutex::new(ToolState::new(brush_width)),
                preview_slot: OperationSlot::new("preview"),
                finalize_slot: OperationSlot::new("finalize"),
            }),
        }
    }

    pub fn surface(&self) -> &Arc<S> {
        &self.inner.surface
    }

    pub fn is_active(&self) -> bool {
        self.inner.state.lock().active
    }

    pub fn phase(&self) -> StampPhase {
        self.inner.state.lock().phase
    }

    pub fn anchor(&self) -> Option<ScenePoint> {
        self.inner.state.lock().anchor
    }

    pub fn brush_width(&self) -> f32 {
        self.inner.state.lock().brush_width
    }

    /// The cursor indicator while the tool is active
    pub fn cursor(&self) -> Option<Arc<CursorIndicator>> {
        self.inner.state.lock().cursor_indicator()
    }

    /// Activate the tool: add the cursor, take over the host's cursor and
    /// selection behavior and apply the brush.
    pub fn start(&self, settings: Option<BrushSettings>) {
        let surface = &self.inner.surface;
        let mut state = self.inner.state.lock();
        if state.active {
            tracing::debug!("[CopyStamp] start while active, reapplying brush");
            drop(state);
            self.set_brush(settings.unwrap_or_default());
            return;
        }

        state.active = true;
        state.epoch += 1;
        state.phase = StampPhase::Idle;
        state.brush_width = settings
            .unwrap_or_default()
            .resolve_width(state.brush_width);

        let indicator = Arc::new(CursorIndicator::with_border_base(
            state.brush_width / 2.0,
            self.inner.config.cursor_border_base,
        ));
        let id = surface.add_object(indicator.clone());
        state.cursor = Some(CursorHandle { id, indicator });

        surface.configure_brush(BrushConfig::transparent(state.brush_width));
        state.saved_mode = Some(surface.interaction_mode());
        surface.set_interaction_mode(InteractionMode::STAMPING);

        self.inner.refresh_cursor(&state, None, None);
        tracing::info!(
            "[CopyStamp] Started, brush width {:.1}",
            state.brush_width
        );
    }

    /// Change the brush width; the cursor radius follows
    pub fn set_brush(&self, settings: BrushSettings) {
        let mut state = self.inner.state.lock();
        state.brush_width = settings.resolve_width(state.brush_width);
        self.inner
            .surface
            .configure_brush(BrushConfig::transparent(state.brush_width));
        self.inner.refresh_cursor(&state, None, None);
        tracing::debug!("[CopyStamp] Brush width {:.1}", state.brush_width);
    }

    /// Deactivate the tool. Operations still in flight finish without
    /// adding anything to the surface.
    pub fn end(&self) {
        let surface = &self.inner.surface;
        let mut state = self.inner.state.lock();
        if !state.active {
            return;
        }

        state.active = false;
        state.epoch += 1;
        state.anchor_generation += 1;
        surface.set_drawing_mode(false);

        if let Some(preview) = state.session.take().and_then(|session| session.preview) {
            surface.remove_object(preview);
        }
        if let Some(cursor) = state.cursor.take() {
            cursor.indicator.replace_visible(false);
            surface.remove_object(cursor.id);
        }
        state.anchor = None;
        state.phase = StampPhase::Idle;

        let mode = state.saved_mode.take().unwrap_or_default();
        surface.set_interaction_mode(mode);
        surface.request_render();
        tracing::info!("[CopyStamp] Ended");
    }

    /// Dispatch one host event
    pub async fn handle(&self, event: SurfaceEvent) -> StampOutcome {
        match event {
            SurfaceEvent::PointerDown(event) => self.pointer_down(event).await,
            SurfaceEvent::PointerMove(event) => self.pointer_move(event).await,
            SurfaceEvent::PathCreated(finished) => self.path_created(finished).await,
        }
    }

    pub async fn pointer_down(&self, event: PointerEvent) -> StampOutcome {
        if event.modifiers.is_anchor_gesture() {
            return self.set_anchor(event.point);
        }

        {
            let state = self.inner.state.lock();
            if !state.active {
                return StampOutcome::Ignored;
            }
            if state.anchor.is_none() {
                tracing::debug!("[CopyStamp] Pointer down without a source anchor");
                return StampOutcome::NoAnchor;
            }
        }

        // The next snapshot must see the previous stroke's committed clone.
        self.inner.finalize_slot.settle().await;

        let surface = &self.inner.surface;
        let mut state = self.inner.state.lock();
        if !state.active {
            return StampOutcome::Ignored;
        }
        if state.anchor.is_none() {
            return StampOutcome::NoAnchor;
        }

        if let Some(stale) = state.session.take() {
            tracing::debug!("[CopyStamp] Stroke {} replaced before finishing", stale.id);
            if let Some(preview) = stale.preview {
                surface.remove_object(preview);
            }
        }

        let stroke = state.next_stroke;
        state.next_stroke += 1;
        let cursor = state.cursor_indicator();
        let snapshot = SourceSnapshot::capture(surface.as_ref(), cursor.as_deref());
        state.session = Some(StrokeSession::new(stroke, event.point, snapshot));
        state.phase = StampPhase::Stroking;

        self.inner.refresh_cursor(&state, Some(event.point), Some(false));
        tracing::debug!(
            "[CopyStamp] Stroke {} opened at ({:.1}, {:.1})",
            stroke,
            event.point.x,
            event.point.y
        );
        StampOutcome::StrokeOpened { stroke }
    }

    pub async fn pointer_move(&self, event: PointerEvent) -> StampOutcome {
        {
            let state = self.inner.state.lock();
            if !state.active {
                return StampOutcome::Ignored;
            }
            self.inner.refresh_cursor(&state, Some(event.point), None);
        }

        if event.modifiers.is_anchor_gesture() {
            return StampOutcome::FrameDropped(DropReason::AnchorGesture);
        }

        let Some(_slot) = self.inner.preview_slot.try_acquire() else {
            tracing::trace!(
                "[CopyStamp] {} busy, frame dropped",
                self.inner.preview_slot.name()
            );
            return StampOutcome::FrameDropped(DropReason::InFlight);
        };

        let (epoch, stroke, start, anchor, brush_width, snapshot) = {
            let mut state = self.inner.state.lock();
            let anchor = state.anchor;
            let Some(session) = state.session.as_ref() else {
                return StampOutcome::FrameDropped(DropReason::NoStroke);
            };
            if session.complete {
                return StampOutcome::FrameDropped(DropReason::StrokeComplete);
            }
            let claimed = (
                state.epoch,
                session.id,
                session.start,
                anchor,
                state.brush_width,
                session.snapshot.clone(),
            );
            state.phase = StampPhase::Previewing;
            claimed
        };

        let surface = &self.inner.surface;
        let path = surface.current_path();
        let request = CloneRequest {
            path: path.as_ref(),
            anchor,
            stroke_start: Some(start),
            brush_width,
            kind: LayerKind::Preview,
        };
        let result = compose(surface.as_ref(), request, Some(&snapshot)).await;

        let mut state = self.inner.state.lock();
        let current = state.epoch == epoch;
        let Some(session) = state
            .session
            .as_mut()
            .filter(|session| current && session.id == stroke && !session.complete)
        else {
            tracing::debug!("[CopyStamp] Preview for stroke {} discarded", stroke);
            return StampOutcome::Discarded;
        };

        let outcome = match result {
            Ok(image) => {
                // Swap, never stack: the old preview goes before the new one lands.
                if let Some(old) = session.preview.take() {
                    surface.remove_object(old);
                }
                session.preview = Some(surface.add_object(Arc::new(image)));
                StampOutcome::Previewed
            }
            Err(err @ CompositionError::MissingPath) => {
                tracing::trace!("[CopyStamp] No path points yet");
                StampOutcome::Failed(err.into())
            }
            Err(err) => {
                tracing::warn!("[CopyStamp] Preview failed: {}", err);
                StampOutcome::Failed(err.into())
            }
        };
        state.phase = StampPhase::Stroking;
        self.inner.refresh_cursor(&state, None, None);
        outcome
    }

    pub async fn path_created(&self, finished: FinishedPath) -> StampOutcome {
        let (epoch, stroke) = {
            let mut state = self.inner.state.lock();
            if !state.active {
                return StampOutcome::Ignored;
            }
            let epoch = state.epoch;
            let stroke = state.session.as_mut().map(|session| {
                session.complete = true;
                session.id
            });
            if stroke.is_some() {
                state.phase = StampPhase::Finalizing;
            }
            (epoch, stroke)
        };

        let surface = &self.inner.surface;
        let Some(stroke) = stroke else {
            self.inner.remove_raw_path(&finished);
            tracing::debug!("[CopyStamp] Path created with no open stroke");
            return StampOutcome::NothingToCommit;
        };

        let _finalizing = self.inner.finalize_slot.acquire().await;
        if self.inner.preview_slot.is_busy() {
            tracing::trace!("[CopyStamp] Stroke {} waits for the running preview", stroke);
        }
        let _preview = self.inner.preview_slot.acquire().await;

        let (start, anchor, brush_width, snapshot) = {
            let mut state = self.inner.state.lock();
            if state.epoch != epoch {
                self.inner.remove_raw_path(&finished);
                return StampOutcome::Discarded;
            }
            let anchor = state.anchor;
            let brush_width = state.brush_width;
            let Some(session) = state
                .session
                .as_mut()
                .filter(|session| session.id == stroke)
            else {
                self.inner.remove_raw_path(&finished);
                tracing::debug!("[CopyStamp] Stroke {} cleared before finalizing", stroke);
                return StampOutcome::NothingToCommit;
            };
            if let Some(preview) = session.preview.take() {
                surface.remove_object(preview);
            }
            let claimed = (session.start, anchor, brush_width, session.snapshot.clone());
            if let Some(cursor) = &state.cursor {
                cursor.indicator.replace_visible(false);
            }
            claimed
        };

        let request = CloneRequest {
            path: Some(&finished.path),
            anchor,
            stroke_start: Some(start),
            brush_width,
            kind: LayerKind::Committed,
        };
        let result = compose(surface.as_ref(), request, Some(&snapshot)).await;
        let result = result.map_err(StampError::from).and_then(|image| {
            let image = Arc::new(image);
            Ok((image.clone(), image.descriptor(ObjectId(0))?))
        });

        let mut state = self.inner.state.lock();
        self.inner.remove_raw_path(&finished);
        if state.epoch != epoch {
            tracing::debug!("[CopyStamp] Final clone for stroke {} discarded", stroke);
            return StampOutcome::Discarded;
        }

        if state.session.as_ref().is_some_and(|session| session.id == stroke) {
            state.session = None;
        }
        state.phase = state.resting_phase();
        if let Some(cursor) = &state.cursor {
            cursor.indicator.replace_visible(true);
        }

        let outcome = match result {
            Ok((image, descriptor)) => {
                let id = surface.add_object(image);
                let descriptor = LayerDescriptor { id, ..descriptor };
                self.inner.sink.add_object(descriptor.clone());
                tracing::info!(
                    "[CopyStamp] Stroke {} committed: {}x{} at ({:.1}, {:.1})",
                    stroke,
                    descriptor.width,
                    descriptor.height,
                    descriptor.left,
                    descriptor.top
                );
                StampOutcome::Committed(descriptor)
            }
            Err(err) => {
                tracing::warn!("[CopyStamp] Stroke {} not committed: {}", stroke, err);
                StampOutcome::Failed(err)
            }
        };
        self.inner.refresh_cursor(&state, None, Some(false));
        outcome
    }

    fn set_anchor(&self, point: ScenePoint) -> StampOutcome {
        let surface = &self.inner.surface;
        let mut state = self.inner.state.lock();
        if !state.active {
            return StampOutcome::Ignored;
        }

        if state.phase.has_open_stroke() {
            tracing::debug!("[CopyStamp] Re-anchoring drops the open stroke");
        }
        state.anchor = Some(point);
        state.anchor_generation += 1;
        if let Some(stale) = state.session.take() {
            if let Some(preview) = stale.preview {
                surface.remove_object(preview);
            }
        }
        state.phase = StampPhase::SourceSet;
        surface.set_drawing_mode(true);
        self.inner.refresh_cursor(&state, Some(point), Some(true));
        tracing::debug!("[CopyStamp] Source anchor ({:.1}, {:.1})", point.x, point.y);

        if self.inner.config.cursor_preview {
            if let Some(cursor) = state.cursor_indicator() {
                cursor.set_fill(None);
                let region = CoordinateMapper::from_surface(surface.as_ref())
                    .square_around(point, state.brush_width / 2.0);
                let capture =
                    SourceSnapshot::capture_region(surface.as_ref(), region, Some(cursor.as_ref()));
                let generation = state.anchor_generation;
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move {
                    let result = capture.resolve().await;
                    inner.apply_cursor_fill(generation, result);
                });
            }
        }
        StampOutcome::AnchorSet
    }

    #[cfg(test)]
    pub(crate) fn replace_snapshot(&self, snapshot: SourceSnapshot) {
        if let Some(session) = self.inner.state.lock().session.as_mut() {
            session.snapshot = snapshot;
        }
    }

    #[cfg(test)]
    pub(crate) fn hold_preview_slot(&self) -> super::session::SlotGuard<'_> {
        self.inner
            .preview_slot
            .try_acquire()
            .unwrap_or_else(|| panic!("preview slot already held"))
    }
}

impl<S: DrawableSurface> Inner<S> {
    /// Sync the cursor with the tool state, optionally moving it, and keep
    /// it above every other object.
    fn refresh_cursor(
        &self,
        state: &ToolState,
        position: Option<ScenePoint>,
        show_image: Option<bool>,
    ) {
        let Some(cursor) = &state.cursor else {
            return;
        };
        cursor.indicator.update(CursorUpdate {
            radius: state.brush_width / 2.0,
            has_source: state.anchor.is_some(),
            position,
            show_image,
        });
        self.surface.bring_to_front(cursor.id);
        self.surface.request_render();
    }

    fn apply_cursor_fill(&self, generation: u64, result: SnapshotResult) {
        let state = self.state.lock();
        if !state.active || state.anchor_generation != generation {
            return;
        }
        let Some(cursor) = &state.cursor else {
            return;
        };
        match result {
            Ok(pixels) => {
                cursor.indicator.set_fill(Some(pixels));
                self.surface.request_render();
            }
            Err(err) => tracing::warn!("[CopyStamp] Cursor preview unavailable: {}", err),
        }
    }

    fn remove_raw_path(&self, finished: &FinishedPath) {
        if let Some(object) = finished.object {
            self.surface.remove_object(object);
        }
    }
}
