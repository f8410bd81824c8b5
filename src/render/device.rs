//! The memory-mapped device region and the flip primitive.
//!
//! Device memory is shared with the display hardware, so it is only ever
//! written through [`FramebufferDevice::flip`] as a whole-buffer copy.
//! There is no vsync wait; a single tear mid-copy is possible, but never a
//! half-composited frame.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use memmap2::{MmapMut, MmapOptions};
use tracing::debug;

use crate::error::Error;
use crate::render::backbuffer::BackBuffer;
use crate::render::geometry::DeviceGeometry;

/// The publish side of double buffering. The framebuffer is the real
/// implementation; tests substitute a recording presenter.
pub trait Present {
    /// Make the composed back buffer visible.
    fn present(&mut self, back: &BackBuffer);
}

pub struct FramebufferDevice {
    map: MmapMut,
    len: usize,
    // Keep the fd alive for the lifetime of the mapping.
    _file: File,
}

impl FramebufferDevice {
    /// Open and map the device node for the given geometry.
    ///
    /// # Errors
    /// [`Error::DeviceUnavailable`] if the node cannot be opened or mapped.
    pub fn open(path: &Path, geometry: &DeviceGeometry) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                Error::DeviceUnavailable(format!("opening {}: {e}", path.display()))
            })?;
        let len = geometry.buffer_len();
        // Char devices report zero metadata length, so the mapping length
        // must come from the resolved geometry.
        let map = unsafe { MmapOptions::new().len(len).map_mut(&file) }.map_err(|e| {
            Error::DeviceUnavailable(format!("mapping {}: {e}", path.display()))
        })?;
        debug!(len, "mapped framebuffer {}", path.display());
        Ok(Self {
            map,
            len,
            _file: file,
        })
    }

    /// Copy the fully composed back buffer into device memory in one pass.
    pub fn flip(&mut self, back: &BackBuffer) {
        let n = self.len.min(back.as_bytes().len());
        self.map[..n].copy_from_slice(&back.as_bytes()[..n]);
    }
}

impl Present for FramebufferDevice {
    fn present(&mut self, back: &BackBuffer) {
        self.flip(back);
    }
}

/// Hide the console cursor so it does not blink over the slideshow.
/// Every step is best-effort; consoles we cannot touch are skipped.
pub fn hide_console_cursor() {
    // Stop fbcon blinking at the kernel level.
    let _ = std::fs::write("/sys/class/graphics/fbcon/cursor_blink", "0");
    for tty in ["/dev/tty0", "/dev/tty1", "/dev/console"] {
        if let Ok(mut f) = OpenOptions::new().write(true).open(tty) {
            let _ = f.write_all(b"\x1b[?25l\x1b[?1c");
        }
    }
}

/// Restore the console cursor on shutdown.
pub fn show_console_cursor() {
    let _ = std::fs::write("/sys/class/graphics/fbcon/cursor_blink", "1");
    for tty in ["/dev/tty0", "/dev/tty1", "/dev/console"] {
        if let Ok(mut f) = OpenOptions::new().write(true).open(tty) {
            let _ = f.write_all(b"\x1b[?25h\x1b[?0c");
        }
    }
}
