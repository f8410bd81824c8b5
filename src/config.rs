//! YAML configuration for the frame-buffer slideshow.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Framebuffer device node.
    #[serde(default = "Config::default_framebuffer")]
    pub framebuffer: PathBuf,

    /// Directories scanned for photos.
    #[serde(default)]
    pub photo_dirs: Vec<PathBuf>,

    /// Dwell time per photo.
    #[serde(default = "Config::default_interval", with = "humantime_serde")]
    pub slideshow_interval: Duration,

    #[serde(default)]
    pub transition: TransitionOptions,

    /// Shuffle the playlist (and reshuffle on each full pass).
    #[serde(default = "Config::default_shuffle")]
    pub shuffle: bool,

    /// How often the background source rescans the photo directories.
    #[serde(default = "Config::default_rescan_interval", with = "humantime_serde")]
    pub rescan_interval: Duration,

    /// Optional boot image shown while the first scan runs.
    #[serde(default)]
    pub splash: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransitionOptions {
    #[serde(default)]
    pub effect: TransitionEffect,

    /// Crossfade length. Ignored for `cut`.
    #[serde(default = "TransitionOptions::default_duration", with = "humantime_serde")]
    pub duration: Duration,

    /// Crossfade pacing in frames per second.
    #[serde(default = "TransitionOptions::default_frame_rate")]
    pub frame_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionEffect {
    #[default]
    Fade,
    Cut,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            effect: TransitionEffect::default(),
            duration: Self::default_duration(),
            frame_rate: Self::default_frame_rate(),
        }
    }
}

impl TransitionOptions {
    fn default_duration() -> Duration {
        Duration::from_secs(1)
    }

    const fn default_frame_rate() -> u32 {
        30
    }
}

impl Config {
    fn default_framebuffer() -> PathBuf {
        PathBuf::from("/dev/fb0")
    }

    fn default_interval() -> Duration {
        Duration::from_secs(30)
    }

    const fn default_shuffle() -> bool {
        true
    }

    fn default_rescan_interval() -> Duration {
        Duration::from_secs(30)
    }

    /// Cross-field validation, run once after loading.
    ///
    /// # Errors
    /// Returns a descriptive error for the first violated rule.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.slideshow_interval.is_zero(),
            "slideshow-interval must be positive"
        );
        ensure!(
            self.transition.frame_rate > 0,
            "transition frame-rate must be positive"
        );
        ensure!(
            !self.rescan_interval.is_zero(),
            "rescan-interval must be positive"
        );
        ensure!(
            !self.photo_dirs.is_empty(),
            "at least one photo directory must be configured"
        );
        Ok(())
    }
}

/// Load a [`Config`] from a YAML file.
pub fn from_yaml_file(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let cfg: Config = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    Ok(cfg)
}
