//! The frame-buffer display engine: device lifecycle plus the slideshow
//! scheduler loop.
//!
//! The engine is single-threaded and blocking; the only thing another
//! thread may touch is the photo mailbox (and the cancellation token).

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use image::RgbaImage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Config, TransitionOptions};
use crate::error::Error;
use crate::loader;
use crate::mailbox::PhotoMailbox;
use crate::playlist::Playlist;
use crate::render::backbuffer::BackBuffer;
use crate::render::device::{self, FramebufferDevice};
use crate::render::geometry;
use crate::transition;

/// How often the waiting sub-state re-checks the mailbox.
const WAIT_POLL: Duration = Duration::from_secs(1);

/// Granularity at which long sleeps notice cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(200);

/// Capability contract shared by display backends. Chosen once at process
/// start; this crate ships the frame-buffer implementation.
pub trait DisplayBackend {
    /// Open the device and prepare buffers. Must succeed before any other
    /// call; failure is fatal to the process.
    fn initialize(&mut self) -> Result<(), Error>;

    /// Install the initial photo list.
    fn set_photos(&mut self, photos: Vec<PathBuf>);

    /// Hand out the publish side of the photo mailbox, for a background
    /// producer to push replacement lists into the running slideshow.
    fn photo_updates(&self) -> PhotoMailbox;

    /// Run the slideshow loop until cancelled. Blocking.
    fn run_slideshow(&mut self) -> Result<(), Error>;

    /// Clear the screen; the message itself goes to the log side channel.
    fn show_message(&mut self, message: &str) -> Result<(), Error>;

    /// Stop, restore console state, and release the device. Safe to call
    /// even if initialization partially failed.
    fn shutdown(&mut self);
}

// Device handle and back buffer live and die together.
struct RenderState {
    device: FramebufferDevice,
    back: BackBuffer,
}

pub struct FramebufferEngine {
    device_path: PathBuf,
    interval: Duration,
    transition: TransitionOptions,
    shuffle: bool,
    splash: Option<PathBuf>,
    cancel: CancellationToken,
    mailbox: PhotoMailbox,
    playlist: Playlist,
    state: Option<RenderState>,
    /// Last composited photo, blended from during the next transition.
    current: Option<RgbaImage>,
}

impl FramebufferEngine {
    #[must_use]
    pub fn new(cfg: &Config, cancel: CancellationToken) -> Self {
        Self {
            device_path: cfg.framebuffer.clone(),
            interval: cfg.slideshow_interval,
            transition: cfg.transition,
            shuffle: cfg.shuffle,
            splash: cfg.splash.clone(),
            cancel,
            mailbox: PhotoMailbox::new(),
            playlist: Playlist::new(),
            state: None,
            current: None,
        }
    }

    /// Display the configured boot image while the first scan runs.
    /// Best-effort: any failure falls back to a black screen.
    pub fn show_splash(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if let Some(path) = self.splash.clone() {
            match loader::load_scaled(&path, state.back.geometry()) {
                Ok(img) => {
                    if transition::show_image(&mut state.device, &mut state.back, &img).is_ok() {
                        return;
                    }
                }
                Err(err) => debug!(error = %err, "splash unavailable"),
            }
        }
        if state.back.fill(transition::BACKGROUND).is_ok() {
            state.device.flip(&state.back);
        }
    }

    fn pick_up_updates(&mut self) {
        if let Some(update) = self.mailbox.consume() {
            debug!(count = update.len(), "picked up photo list update");
            let mut rng = rand::rng();
            self.playlist
                .replace(update, self.shuffle.then_some(&mut rng));
        }
    }
}

impl DisplayBackend for FramebufferEngine {
    fn initialize(&mut self) -> Result<(), Error> {
        let geometry = geometry::resolve()?;
        info!(
            width = geometry.width,
            height = geometry.height,
            bpp = geometry.bits_per_pixel,
            stride = geometry.stride,
            "framebuffer geometry"
        );
        let device = FramebufferDevice::open(&self.device_path, &geometry)?;
        let mut back = BackBuffer::new(geometry);
        device::hide_console_cursor();
        back.fill(transition::BACKGROUND)?;
        let mut state = RenderState { device, back };
        state.device.flip(&state.back);
        self.state = Some(state);
        Ok(())
    }

    fn set_photos(&mut self, photos: Vec<PathBuf>) {
        let mut rng = rand::rng();
        self.playlist
            .install(photos, self.shuffle.then_some(&mut rng));
    }

    fn photo_updates(&self) -> PhotoMailbox {
        self.mailbox.clone()
    }

    fn run_slideshow(&mut self) -> Result<(), Error> {
        if self.state.is_none() {
            return Err(Error::DeviceUnavailable(
                "run_slideshow called before initialize".into(),
            ));
        }
        info!(
            photos = self.playlist.len(),
            interval = %humantime::format_duration(self.interval),
            "starting slideshow"
        );

        while !self.cancel.is_cancelled() {
            self.pick_up_updates();

            if self.playlist.is_empty() {
                debug!("no photos to display; waiting");
                sleep_cancellable(&self.cancel, WAIT_POLL);
                continue;
            }

            if let Some(path) = self.playlist.current().cloned() {
                info!(
                    "showing photo {}/{}: {}",
                    self.playlist.position() + 1,
                    self.playlist.len(),
                    path.display()
                );
                let state = self
                    .state
                    .as_mut()
                    .ok_or_else(|| Error::DeviceUnavailable("render state lost".into()))?;
                match loader::load_scaled(&path, state.back.geometry()) {
                    Ok(new_img) => {
                        transition::run(
                            &mut state.device,
                            &mut state.back,
                            self.current.as_ref(),
                            &new_img,
                            &self.transition,
                            &self.cancel,
                        )?;
                        self.current = Some(new_img);
                    }
                    // Skip the photo; the previous frame stays on screen.
                    Err(err) => warn!(error = %err, "skipping undecodable photo"),
                }
            }

            sleep_cancellable(&self.cancel, self.interval);

            let mut rng = rand::rng();
            self.playlist.advance(self.shuffle.then_some(&mut rng));
        }
        Ok(())
    }

    fn show_message(&mut self, message: &str) -> Result<(), Error> {
        // Text is never drawn to the device; the log is the side channel.
        info!("{message}");
        if let Some(state) = self.state.as_mut() {
            state.back.fill(transition::BACKGROUND)?;
            state.device.flip(&state.back);
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.cancel.cancel();
        device::show_console_cursor();
        // Dropping the state unmaps the device region and closes the fd.
        self.state = None;
        self.current = None;
    }
}

/// Sleep up to `total`, waking early when the token is cancelled.
pub(crate) fn sleep_cancellable(cancel: &CancellationToken, total: Duration) {
    let deadline = Instant::now() + total;
    while !cancel.is_cancelled() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(CANCEL_POLL));
    }
}
