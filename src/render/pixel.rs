//! Conversion from decoded RGBA pixels into the device's packed layout.

use image::RgbaImage;

use crate::error::Error;
use crate::render::geometry::DeviceGeometry;

/// Pixel data already in device-native byte order, ready for the compositor.
#[derive(Debug, Clone)]
pub struct DeviceImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Render `image` into the device's packed pixel format.
///
/// # Errors
/// [`Error::UnsupportedDepth`] for depths other than 16/32. Geometry
/// discovery already rules those out; this is defensive only.
pub fn to_device(image: &RgbaImage, geometry: &DeviceGeometry) -> Result<DeviceImage, Error> {
    let data = match geometry.bits_per_pixel {
        32 => bgra_bytes(image),
        16 => rgb565_bytes(image),
        other => return Err(Error::UnsupportedDepth(other)),
    };
    Ok(DeviceImage {
        width: image.width(),
        height: image.height(),
        data,
    })
}

/// One device pixel of the given color, used to build solid fill rows.
pub fn solid_pixel(color: [u8; 3], geometry: &DeviceGeometry) -> Result<Vec<u8>, Error> {
    let [r, g, b] = color;
    match geometry.bits_per_pixel {
        32 => Ok(vec![b, g, r, 255]),
        16 => Ok(pack_rgb565(r, g, b).to_le_bytes().to_vec()),
        other => Err(Error::UnsupportedDepth(other)),
    }
}

// The device scans out B,G,R,A — the reverse of the decoded channel order.
fn bgra_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.as_raw().len());
    for px in image.as_raw().chunks_exact(4) {
        out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
    }
    out
}

fn rgb565_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.as_raw().len() / 2);
    for px in image.as_raw().chunks_exact(4) {
        out.extend_from_slice(&pack_rgb565(px[0], px[1], px[2]).to_le_bytes());
    }
    out
}

/// Pack 8-bit channels into 5-6-5, truncating (not rounding) the low bits.
#[must_use]
pub const fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    (((r >> 3) as u16) << 11) | (((g >> 2) as u16) << 5) | ((b >> 3) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn geometry(bits_per_pixel: u32) -> DeviceGeometry {
        DeviceGeometry {
            width: 16,
            height: 16,
            bits_per_pixel,
            stride: 16 * (bits_per_pixel as usize / 8),
        }
    }

    #[test]
    fn red_becomes_bgra() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]));
        let out = to_device(&img, &geometry(32)).unwrap();
        assert_eq!(out.data, vec![0, 0, 255, 255]);
    }

    #[test]
    fn rgb565_truncation_vectors() {
        assert_eq!(pack_rgb565(255, 255, 255), 0xFFFF);
        assert_eq!(pack_rgb565(0, 0, 0), 0x0000);
        // Below the truncation threshold every channel collapses to zero.
        assert_eq!(pack_rgb565(7, 3, 7), 0);
        // One step above it, each channel keeps exactly its lowest bit.
        assert_eq!(pack_rgb565(8, 4, 8), (1 << 11) | (1 << 5) | 1);
    }

    #[test]
    fn rgb565_words_are_little_endian() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]));
        let out = to_device(&img, &geometry(16)).unwrap();
        // 0xF800 on the wire: low byte first.
        assert_eq!(out.data, vec![0x00, 0xF8]);
    }

    #[test]
    fn solid_pixel_matches_depth() {
        assert_eq!(solid_pixel([10, 20, 30], &geometry(32)).unwrap(), vec![
            30, 20, 10, 255
        ]);
        assert_eq!(
            solid_pixel([255, 255, 255], &geometry(16)).unwrap(),
            vec![0xFF, 0xFF]
        );
    }

    #[test]
    fn unsupported_depth_is_rejected() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        assert!(matches!(
            to_device(&img, &geometry(24)),
            Err(Error::UnsupportedDepth(24))
        ));
    }
}
