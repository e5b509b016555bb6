//! Raster conversions between the host's data URLs, straight-alpha RGBA
//! images and premultiplied tiny-skia pixmaps.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use tiny_skia::{ColorU8, Pixmap};

use super::error::LoadError;

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// Decode a `data:image/...;base64,` URL into an RGBA image
pub fn decode_data_url(url: &str) -> Result<RgbaImage, LoadError> {
    let (header, payload) = url.split_once(',').ok_or(LoadError::MalformedDataUrl)?;
    if !header.starts_with(DATA_URL_PREFIX) || !header.ends_with(BASE64_MARKER) {
        return Err(LoadError::MalformedDataUrl);
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| LoadError::Base64(e.to_string()))?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| LoadError::Image(e.to_string()))?
        .to_rgba8();

    if image.width() == 0 || image.height() == 0 {
        return Err(LoadError::EmptyImage);
    }
    Ok(image)
}

/// Encode an RGBA image as a PNG data URL
pub fn encode_data_url(image: &RgbaImage) -> image::ImageResult<String> {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}

/// Decode a data URL straight into a premultiplied pixmap
pub fn decode_data_url_to_pixmap(url: &str) -> Result<Pixmap, LoadError> {
    let image = decode_data_url(url)?;
    image_to_pixmap(&image).ok_or(LoadError::EmptyImage)
}

/// Returns `None` for zero-sized images
pub fn image_to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

pub fn pixmap_to_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    image
}
