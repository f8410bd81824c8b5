//! Framebuffer geometry discovery.
//!
//! Tries an ordered list of strategies: `fbset` output first, then the raw
//! sysfs attribute files. First success wins; exhausting both is fatal.

use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::error::Error;

const SYSFS_FB0: &str = "/sys/class/graphics/fb0";

/// Visible geometry of the target device. Immutable after discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceGeometry {
    pub width: u32,
    pub height: u32,
    /// Packed pixel depth; only 16 and 32 are renderable.
    pub bits_per_pixel: u32,
    /// Bytes per scanline, which may exceed `width * bytes_per_pixel`
    /// due to hardware alignment padding.
    pub stride: usize,
}

impl DeviceGeometry {
    #[must_use]
    pub const fn bytes_per_pixel(&self) -> usize {
        (self.bits_per_pixel / 8) as usize
    }

    /// Length of the mapped region and of the back buffer.
    #[must_use]
    pub const fn buffer_len(&self) -> usize {
        self.stride * self.height as usize
    }

    /// Top-left offset that centers an `inner_w x inner_h` image. Integer
    /// floor division biases odd remainders one pixel toward the top-left.
    #[must_use]
    pub const fn centered_origin(&self, inner_w: u32, inner_h: u32) -> (i64, i64) {
        (
            (self.width as i64 - inner_w as i64) / 2,
            (self.height as i64 - inner_h as i64) / 2,
        )
    }

    fn validated(self) -> Result<Self, Error> {
        match self.bits_per_pixel {
            16 | 32 => Ok(self),
            other => Err(Error::UnsupportedDepth(other)),
        }
    }
}

/// Discover the geometry of `fb0`.
///
/// # Errors
/// [`Error::DeviceUnavailable`] when every strategy fails, or
/// [`Error::UnsupportedDepth`] for renderable-geometry violations.
pub fn resolve() -> Result<DeviceGeometry, Error> {
    resolve_with_sysfs(Path::new(SYSFS_FB0))
}

fn resolve_with_sysfs(sysfs: &Path) -> Result<DeviceGeometry, Error> {
    match fbset_strategy(sysfs) {
        Ok(geometry) => return geometry.validated(),
        Err(err) => debug!("fbset discovery failed: {err:#}"),
    }
    match sysfs_strategy(sysfs) {
        Ok(geometry) => geometry.validated(),
        Err(err) => Err(Error::DeviceUnavailable(format!(
            "geometry discovery exhausted: {err:#}"
        ))),
    }
}

/// Discovery from sysfs attribute files only, for callers (and tests) that
/// want to bypass the external tool.
///
/// # Errors
/// [`Error::DeviceUnavailable`] when an attribute is missing or malformed.
pub fn resolve_from_sysfs(sysfs: &Path) -> Result<DeviceGeometry, Error> {
    match sysfs_strategy(sysfs) {
        Ok(geometry) => geometry.validated(),
        Err(err) => Err(Error::DeviceUnavailable(format!("{err:#}"))),
    }
}

/// Primary strategy: `fbset -s` reports the visible mode. Stride comes from
/// the same output when present, otherwise from sysfs.
fn fbset_strategy(sysfs: &Path) -> Result<DeviceGeometry> {
    let output = Command::new("fbset")
        .arg("-s")
        .output()
        .context("running fbset")?;
    if !output.status.success() {
        return Err(anyhow!("fbset exited with {}", output.status));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let (width, height, bits_per_pixel) =
        parse_fbset_geometry(&stdout).ok_or_else(|| anyhow!("no geometry line in fbset output"))?;
    let stride = match parse_fbset_line_length(&stdout) {
        Some(stride) => stride,
        None => read_sysfs_u64(sysfs, "stride").context("reading stride")? as usize,
    };
    Ok(DeviceGeometry {
        width,
        height,
        bits_per_pixel,
        stride,
    })
}

/// Fallback strategy: raw attribute files under `/sys/class/graphics/fb0`.
fn sysfs_strategy(sysfs: &Path) -> Result<DeviceGeometry> {
    let size = fs::read_to_string(sysfs.join("virtual_size")).context("reading virtual_size")?;
    let (width, height) =
        parse_virtual_size(&size).ok_or_else(|| anyhow!("malformed virtual_size {size:?}"))?;
    let bits_per_pixel = read_sysfs_u64(sysfs, "bits_per_pixel").context("reading bits_per_pixel")?
        as u32;
    let stride = read_sysfs_u64(sysfs, "stride").context("reading stride")? as usize;
    Ok(DeviceGeometry {
        width,
        height,
        bits_per_pixel,
        stride,
    })
}

fn read_sysfs_u64(sysfs: &Path, name: &str) -> Result<u64> {
    let text = fs::read_to_string(sysfs.join(name))?;
    text.trim()
        .parse()
        .with_context(|| format!("malformed {name} {text:?}"))
}

/// Pick `xres`, `yres`, and depth out of a `geometry` line:
/// `geometry <xres> <yres> <vxres> <vyres> <depth>`.
fn parse_fbset_geometry(output: &str) -> Option<(u32, u32, u32)> {
    let line = output.lines().find(|l| l.contains("geometry"))?;
    let mut parts = line.split_whitespace();
    if parts.next()? != "geometry" {
        return None;
    }
    let xres = parts.next()?.parse().ok()?;
    let yres = parts.next()?.parse().ok()?;
    let _vxres: u32 = parts.next()?.parse().ok()?;
    let _vyres: u32 = parts.next()?.parse().ok()?;
    let depth = parts.next()?.parse().ok()?;
    Some((xres, yres, depth))
}

/// Some fbset builds include a `LineLength : <bytes>` information line.
fn parse_fbset_line_length(output: &str) -> Option<usize> {
    let line = output.lines().find(|l| l.contains("LineLength"))?;
    line.split(':').nth(1)?.trim().parse().ok()
}

/// `virtual_size` holds `<width>,<height>`.
fn parse_virtual_size(text: &str) -> Option<(u32, u32)> {
    let (w, h) = text.trim().split_once(',')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}
