//! Photo decoding and scaling.
//!
//! Produces an RGBA8 image that fits the display while preserving aspect
//! ratio. Decode failures are recoverable: the caller logs and skips the
//! photo.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use fast_image_resize as fir;
use image::RgbaImage;
use tracing::debug;

use crate::error::Error;
use crate::render::geometry::DeviceGeometry;

/// Load `path` and scale it to fit the device.
///
/// # Errors
/// [`Error::Decode`] for any failure along the decode/resize pipeline.
pub fn load_scaled(path: &Path, geometry: &DeviceGeometry) -> Result<RgbaImage, Error> {
    decode_and_fit(path, geometry).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source: source.into(),
    })
}

fn decode_and_fit(path: &Path, geometry: &DeviceGeometry) -> Result<RgbaImage> {
    let img = decode_rgba8_apply_exif(path)?;
    let (w, h) = fit_within(geometry.width, geometry.height, img.width(), img.height());
    if (w, h) == img.dimensions() {
        return Ok(img);
    }
    resize_rgba(&img, w, h)
}

/// Contain-fit: `scale = min(dw/iw, dh/ih)`, output dimensions truncated
/// toward zero. At least one output dimension touches the device bound
/// (within the floor rounding), and both stay inside it.
#[must_use]
pub fn fit_within(dev_w: u32, dev_h: u32, img_w: u32, img_h: u32) -> (u32, u32) {
    let iw = f64::from(img_w.max(1));
    let ih = f64::from(img_h.max(1));
    let scale = (f64::from(dev_w) / iw).min(f64::from(dev_h) / ih);
    let w = (iw * scale) as u32;
    let h = (ih * scale) as u32;
    (w.max(1), h.max(1))
}

// Decodes to RGBA8 and applies EXIF orientation when present. Orientation
// handling is best-effort; missing or unknown metadata leaves the decoded
// orientation as-is.
fn decode_rgba8_apply_exif(path: &Path) -> Result<RgbaImage> {
    let img = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    let mut img = img.to_rgba8();

    let orientation = read_orientation(path).unwrap_or(1);
    match orientation {
        1 => {}
        2 => img = image::imageops::flip_horizontal(&img),
        3 => img = image::imageops::rotate180(&img),
        4 => img = image::imageops::flip_vertical(&img),
        5 => {
            img = image::imageops::rotate90(&img);
            img = image::imageops::flip_horizontal(&img);
        }
        6 => img = image::imageops::rotate90(&img),
        7 => {
            img = image::imageops::rotate270(&img);
            img = image::imageops::flip_horizontal(&img);
        }
        8 => img = image::imageops::rotate270(&img),
        _ => {}
    }

    Ok(img)
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)?;
    debug!("exif orientation {} for {}", value, path.display());
    Some(value as u16)
}

fn resize_rgba(source: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage> {
    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .context("creating resize source view")?;
    let mut dst = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options =
        fir::ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst, Some(&options))
        .context("resize failed")?;
    RgbaImage::from_raw(target_w, target_h, dst.into_vec())
        .ok_or_else(|| anyhow!("failed to construct resized RGBA image"))
}
