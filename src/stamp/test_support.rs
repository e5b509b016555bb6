//! In-memory host surface for tests

use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use tiny_skia::{Pixmap, PixmapPaint, Transform};

use super::coordinate_mapper::CoordinateMapper;
use super::cursor::CURSOR_NAME;
use super::error::SurfaceError;
use super::path::StrokePath;
use super::raster::{encode_data_url, image_to_pixmap, pixmap_to_image};
use super::surface::{
    BrushConfig, DrawableSurface, InteractionMode, ObjectId, SceneObject,
};
use super::types::RenderedRect;

/// Pixel (x, y) is `[x, y, 128, 255]`, so crops can be located by color
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 128, 255]))
}

#[derive(Debug, Clone, Copy)]
struct View {
    zoom: f32,
    pan_x: f32,
    pan_y: f32,
}

/// Surface whose rendered background is a fixed image. Exportable, visible
/// objects are drawn on top of it when serializing.
pub struct MockSurface {
    background: RgbaImage,
    view: Mutex<View>,
    objects: Mutex<Vec<(ObjectId, SceneObject)>>,
    next_id: AtomicU64,
    captures: AtomicUsize,
    fail_next: AtomicBool,
    corrupt_next: AtomicBool,
    cursor_seen: Mutex<Option<bool>>,
    brush: Mutex<Option<BrushConfig>>,
    drawing_mode: AtomicBool,
    mode: Mutex<InteractionMode>,
    path: Mutex<Option<StrokePath>>,
    renders: AtomicUsize,
}

impl MockSurface {
    pub fn new(background: RgbaImage) -> Self {
        Self {
            background,
            view: Mutex::new(View {
                zoom: 1.0,
                pan_x: 0.0,
                pan_y: 0.0,
            }),
            objects: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            captures: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            corrupt_next: AtomicBool::new(false),
            cursor_seen: Mutex::new(None),
            brush: Mutex::new(None),
            drawing_mode: AtomicBool::new(false),
            mode: Mutex::new(InteractionMode::default()),
            path: Mutex::new(None),
            renders: AtomicUsize::new(0),
        }
    }

    pub fn gradient(width: u32, height: u32) -> Self {
        Self::new(gradient_image(width, height))
    }

    pub fn set_view(&self, zoom: f32, pan_x: f32, pan_y: f32) {
        *self.view.lock() = View { zoom, pan_x, pan_y };
    }

    /// Path returned by `current_path` for the stroke in progress
    pub fn set_path(&self, path: Option<StrokePath>) {
        *self.path.lock() = path;
    }

    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    pub fn render_requests(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// Visibility of the cursor object during the most recent serialization
    pub fn cursor_visible_during_capture(&self) -> Option<bool> {
        *self.cursor_seen.lock()
    }

    pub fn fail_next_capture(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Next serialization returns a data URL whose payload is not base64
    pub fn corrupt_next_capture(&self) {
        self.corrupt_next.store(true, Ordering::SeqCst);
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.objects
            .lock()
            .iter()
            .filter(|(_, object)| object.name() == name)
            .count()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.lock().iter().any(|(other, _)| *other == id)
    }

    /// Name of the front-most object
    pub fn top_name(&self) -> Option<&'static str> {
        self.objects.lock().last().map(|(_, object)| object.name())
    }

    pub fn brush(&self) -> Option<BrushConfig> {
        *self.brush.lock()
    }

    pub fn drawing_mode(&self) -> bool {
        self.drawing_mode.load(Ordering::SeqCst)
    }

    fn render_scene(&self) -> Option<Pixmap> {
        let mut scene = image_to_pixmap(&self.background)?;
        let view = *self.view.lock();
        let mapper = CoordinateMapper::new(view.zoom, view.pan_x, view.pan_y);

        let objects = self.objects.lock();
        let cursor = objects
            .iter()
            .find(|(_, object)| object.name() == CURSOR_NAME)
            .map(|(_, object)| object.visible());
        *self.cursor_seen.lock() = cursor;

        for (_, object) in objects.iter() {
            if !object.visible() || !object.exportable() {
                continue;
            }
            let Some(raster) = object.render(view.zoom) else {
                continue;
            };
            let origin = mapper.to_rendered(object.bounds().origin());
            scene.draw_pixmap(
                origin.x.round() as i32,
                origin.y.round() as i32,
                raster.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
        Some(scene)
    }
}

impl DrawableSurface for MockSurface {
    fn zoom(&self) -> f32 {
        self.view.lock().zoom
    }

    fn pan(&self) -> (f32, f32) {
        let view = *self.view.lock();
        (view.pan_x, view.pan_y)
    }

    fn to_data_url(&self, region: Option<RenderedRect>) -> Result<String, SurfaceError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        let scene = self
            .render_scene()
            .ok_or_else(|| SurfaceError::Serialize("empty background".into()))?;

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SurfaceError::Serialize("mock failure".into()));
        }
        if self.corrupt_next.swap(false, Ordering::SeqCst) {
            return Ok("data:image/png;base64,@@not-base64@@".into());
        }

        let mut image = pixmap_to_image(&scene);
        if let Some(region) = region {
            let x = region.left.round().max(0.0) as u32;
            let y = region.top.round().max(0.0) as u32;
            let width = region.width.round() as u32;
            let height = region.height.round() as u32;
            image = image::imageops::crop_imm(&image, x, y, width, height).to_image();
            if image.width() == 0 || image.height() == 0 {
                return Err(SurfaceError::EmptyRegion);
            }
        }
        encode_data_url(&image).map_err(|e| SurfaceError::Serialize(e.to_string()))
    }

    fn add_object(&self, object: SceneObject) -> ObjectId {
        let id = ObjectId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.objects.lock().push((id, object));
        id
    }

    fn remove_object(&self, id: ObjectId) {
        self.objects.lock().retain(|(other, _)| *other != id);
    }

    fn bring_to_front(&self, id: ObjectId) {
        let mut objects = self.objects.lock();
        if let Some(index) = objects.iter().position(|(other, _)| *other == id) {
            let entry = objects.remove(index);
            objects.push(entry);
        }
    }

    fn configure_brush(&self, brush: BrushConfig) {
        *self.brush.lock() = Some(brush);
    }

    fn set_drawing_mode(&self, enabled: bool) {
        self.drawing_mode.store(enabled, Ordering::SeqCst);
    }

    fn interaction_mode(&self) -> InteractionMode {
        *self.mode.lock()
    }

    fn set_interaction_mode(&self, mode: InteractionMode) {
        *self.mode.lock() = mode;
    }

    fn current_path(&self) -> Option<StrokePath> {
        self.path.lock().clone()
    }

    fn request_render(&self) {
        self.renders.fetch_add(1, Ordering::SeqCst);
    }
}
