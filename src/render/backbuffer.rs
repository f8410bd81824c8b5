//! Off-device compositing buffer.
//!
//! The back buffer is fully drawn before any flip, so the device never
//! shows a half-composited frame. It is exclusively owned by the render
//! thread; nothing else reads or writes it.

use crate::error::Error;
use crate::render::geometry::DeviceGeometry;
use crate::render::pixel::{self, DeviceImage};

#[derive(Debug)]
pub struct BackBuffer {
    geometry: DeviceGeometry,
    data: Vec<u8>,
}

impl BackBuffer {
    #[must_use]
    pub fn new(geometry: DeviceGeometry) -> Self {
        Self {
            data: vec![0; geometry.buffer_len()],
            geometry,
        }
    }

    /// Write a solid color across every scanline. Stride padding beyond the
    /// visible width is zeroed.
    pub fn fill(&mut self, color: [u8; 3]) -> Result<(), Error> {
        let px = pixel::solid_pixel(color, &self.geometry)?;
        let mut row = Vec::with_capacity(self.geometry.stride);
        for _ in 0..self.geometry.width {
            row.extend_from_slice(&px);
        }
        row.resize(self.geometry.stride, 0);
        for y in 0..self.geometry.height as usize {
            let offset = y * self.geometry.stride;
            self.data[offset..offset + row.len()].copy_from_slice(&row);
        }
        Ok(())
    }

    /// Copy device-format scanlines in at the given top-left offset.
    ///
    /// Portions outside the visible area are clipped per axis; a partially
    /// off-screen image is partially drawn, not rejected.
    pub fn draw_at(&mut self, image: &DeviceImage, x: i64, y: i64) {
        let bpp = self.geometry.bytes_per_pixel() as i64;
        let screen_w = i64::from(self.geometry.width);
        let screen_h = i64::from(self.geometry.height);
        let img_w = i64::from(image.width);
        let img_row_len = img_w * bpp;

        for row in 0..i64::from(image.height) {
            let dy = y + row;
            if dy < 0 || dy >= screen_h {
                continue;
            }
            // columns of the image that land on screen
            let first_col = (-x).max(0);
            let last_col = img_w.min(screen_w - x);
            if last_col <= first_col {
                continue;
            }
            let src_offset = (row * img_row_len + first_col * bpp) as usize;
            let src_len = ((last_col - first_col) * bpp) as usize;
            let dst_offset = (dy * self.geometry.stride as i64 + (x + first_col) * bpp) as usize;
            self.data[dst_offset..dst_offset + src_len]
                .copy_from_slice(&image.data[src_offset..src_offset + src_len]);
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub const fn geometry(&self) -> &DeviceGeometry {
        &self.geometry
    }
}
