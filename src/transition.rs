//! Transitions between photos: an immediate cut, or a frame-paced
//! crossfade of alpha-blended intermediate frames.

use std::time::{Duration, Instant};

use image::{Rgba, RgbaImage, imageops};
use tokio_util::sync::CancellationToken;

use crate::config::{TransitionEffect, TransitionOptions};
use crate::error::Error;
use crate::render::backbuffer::BackBuffer;
use crate::render::device::Present;
use crate::render::geometry::DeviceGeometry;
use crate::render::pixel;

/// Letterbox color around photos that do not cover the whole screen.
pub const BACKGROUND: [u8; 3] = [0, 0, 0];

/// Compose `image` centered on a cleared back buffer and present it.
pub fn show_image(
    device: &mut impl Present,
    back: &mut BackBuffer,
    image: &RgbaImage,
) -> Result<(), Error> {
    back.fill(BACKGROUND)?;
    let converted = pixel::to_device(image, back.geometry())?;
    let (x, y) = back.geometry().centered_origin(converted.width, converted.height);
    back.draw_at(&converted, x, y);
    device.present(back);
    Ok(())
}

/// Transition from `old` (the image currently on screen, if any) to `new`
/// using the configured effect.
pub fn run(
    device: &mut impl Present,
    back: &mut BackBuffer,
    old: Option<&RgbaImage>,
    new: &RgbaImage,
    opts: &TransitionOptions,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    match opts.effect {
        TransitionEffect::Cut => show_image(device, back, new),
        TransitionEffect::Fade => crossfade(device, back, old, new, opts, cancel),
    }
}

fn crossfade(
    device: &mut impl Present,
    back: &mut BackBuffer,
    old: Option<&RgbaImage>,
    new: &RgbaImage,
    opts: &TransitionOptions,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    // First photo shown: nothing to blend against.
    let Some(old) = old else {
        return show_image(device, back, new);
    };

    let geometry = *back.geometry();
    let total = total_frames(opts.duration, opts.frame_rate);
    let budget = Duration::from_secs_f64(1.0 / f64::from(opts.frame_rate));

    // Both endpoints pre-positioned onto screen-sized canvases so the blend
    // is a flat per-byte lerp.
    let old_screen = compose_screen(old, &geometry);
    let new_screen = compose_screen(new, &geometry);

    for frame in 0..=total {
        if cancel.is_cancelled() {
            // Shutdown or skip: abort early, leaving the last-drawn frame.
            return Ok(());
        }
        let started = Instant::now();
        let alpha = frame as f32 / total as f32;
        let blended = blend(&old_screen, &new_screen, alpha);
        let converted = pixel::to_device(&blended, &geometry)?;
        back.fill(BACKGROUND)?;
        back.draw_at(&converted, 0, 0);
        device.present(back);

        // Sleep out the rest of this frame's budget. An overrun presents
        // immediately with no sleep; every blend step still renders.
        if let Some(remaining) = budget.checked_sub(started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    // Re-present the exact final image so no rounding residue survives.
    show_image(device, back, new)
}

fn total_frames(duration: Duration, frame_rate: u32) -> u32 {
    ((duration.as_secs_f64() * f64::from(frame_rate)) as u32).max(1)
}

/// Center `image` on a screen-sized canvas padded with the background color.
fn compose_screen(image: &RgbaImage, geometry: &DeviceGeometry) -> RgbaImage {
    let [r, g, b] = BACKGROUND;
    let mut canvas =
        RgbaImage::from_pixel(geometry.width, geometry.height, Rgba([r, g, b, 255]));
    let (x, y) = geometry.centered_origin(image.width(), image.height());
    imageops::replace(&mut canvas, image, x, y);
    canvas
}

/// Per-channel lerp of two same-sized canvases.
fn blend(old: &RgbaImage, new: &RgbaImage, alpha: f32) -> RgbaImage {
    debug_assert_eq!(old.dimensions(), new.dimensions());
    let alpha = alpha.clamp(0.0, 1.0);
    let mut out = old.clone();
    let dst: &mut [u8] = &mut out;
    let src: &[u8] = new;
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = (f32::from(*d) * (1.0 - alpha) + f32::from(s) * alpha).round() as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingPresenter {
        presents: usize,
    }

    impl Present for CountingPresenter {
        fn present(&mut self, _back: &BackBuffer) {
            self.presents += 1;
        }
    }

    fn geometry() -> DeviceGeometry {
        DeviceGeometry {
            width: 4,
            height: 4,
            bits_per_pixel: 32,
            stride: 16,
        }
    }

    fn solid(w: u32, h: u32, value: u8) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([value, value, value, 255]))
    }

    fn fast_fade() -> TransitionOptions {
        TransitionOptions {
            effect: TransitionEffect::Fade,
            duration: Duration::from_millis(100),
            frame_rate: 30,
        }
    }

    #[test]
    fn blend_midpoint_is_half_mix() {
        let old = solid(2, 2, 0);
        let new = solid(2, 2, 255);
        let total = 30u32;
        let mid = blend(&old, &new, 15.0 / total as f32);
        for px in mid.pixels() {
            for c in &px.0[..3] {
                assert!((127..=128).contains(c), "channel {c} not near half");
            }
        }
    }

    #[test]
    fn blend_endpoints_reproduce_inputs() {
        let old = solid(2, 2, 10);
        let new = solid(2, 2, 200);
        assert_eq!(blend(&old, &new, 0.0), old);
        assert_eq!(blend(&old, &new, 1.0), new);
    }

    #[test]
    fn total_frames_defaults_to_thirty() {
        assert_eq!(total_frames(Duration::from_secs(1), 30), 30);
        assert_eq!(total_frames(Duration::from_millis(500), 30), 15);
        // Degenerate configs still render at least one step.
        assert_eq!(total_frames(Duration::ZERO, 30), 1);
    }

    #[test]
    fn compose_screen_centers_with_top_left_bias() {
        let canvas = compose_screen(&solid(2, 2, 255), &geometry());
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(1, 1).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(2, 2).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(3, 3).0, [0, 0, 0, 255]);
    }

    #[test]
    fn crossfade_presents_every_blend_plus_final_frame() {
        let mut presenter = CountingPresenter { presents: 0 };
        let mut back = BackBuffer::new(geometry());
        let cancel = CancellationToken::new();
        let opts = fast_fade();
        let total = total_frames(opts.duration, opts.frame_rate) as usize;
        crossfade(
            &mut presenter,
            &mut back,
            Some(&solid(2, 2, 0)),
            &solid(2, 2, 255),
            &opts,
            &cancel,
        )
        .unwrap();
        // total + 1 inclusive blend steps, then the exact final image.
        assert_eq!(presenter.presents, total + 2);
    }

    #[test]
    fn cancelled_crossfade_stops_without_forcing_a_final_frame() {
        let mut presenter = CountingPresenter { presents: 0 };
        let mut back = BackBuffer::new(geometry());
        let cancel = CancellationToken::new();
        cancel.cancel();
        crossfade(
            &mut presenter,
            &mut back,
            Some(&solid(2, 2, 0)),
            &solid(2, 2, 255),
            &fast_fade(),
            &cancel,
        )
        .unwrap();
        assert_eq!(presenter.presents, 0);
    }

    #[test]
    fn first_photo_skips_straight_to_display() {
        let mut presenter = CountingPresenter { presents: 0 };
        let mut back = BackBuffer::new(geometry());
        let cancel = CancellationToken::new();
        crossfade(
            &mut presenter,
            &mut back,
            None,
            &solid(2, 2, 255),
            &fast_fade(),
            &cancel,
        )
        .unwrap();
        assert_eq!(presenter.presents, 1);
    }

    #[test]
    fn cut_presents_once() {
        let mut presenter = CountingPresenter { presents: 0 };
        let mut back = BackBuffer::new(geometry());
        let cancel = CancellationToken::new();
        let opts = TransitionOptions {
            effect: TransitionEffect::Cut,
            ..fast_fade()
        };
        run(
            &mut presenter,
            &mut back,
            Some(&solid(2, 2, 0)),
            &solid(2, 2, 255),
            &opts,
            &cancel,
        )
        .unwrap();
        assert_eq!(presenter.presents, 1);
    }
}
