//! Ordered photo list driven by the slideshow scheduler.

use std::path::PathBuf;

use rand::Rng;
use rand::seq::SliceRandom;

/// The photo list plus the scheduler's position in it.
///
/// The list is only ever replaced wholesale (initial install or a mailbox
/// pickup), never edited element-wise.
#[derive(Debug, Default, Clone)]
pub struct Playlist {
    items: Vec<PathBuf>,
    idx: usize,
}

impl Playlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial install: keep only paths that exist, optionally shuffle,
    /// and start over from the front.
    pub fn install<R: Rng>(&mut self, items: Vec<PathBuf>, shuffle: Option<&mut R>) {
        self.items = items.into_iter().filter(|p| p.exists()).collect();
        if let Some(rng) = shuffle {
            self.items.shuffle(rng);
        }
        self.idx = 0;
    }

    /// Wholesale replacement from a mailbox pickup.
    ///
    /// The position is clamped into the new list's bounds; a previously
    /// empty playlist stays at index 0 so the first photo is not skipped.
    pub fn replace<R: Rng>(&mut self, items: Vec<PathBuf>, shuffle: Option<&mut R>) {
        self.items = items;
        if let Some(rng) = shuffle {
            self.items.shuffle(rng);
        }
        self.idx = self.idx.min(self.items.len().saturating_sub(1));
    }

    /// Borrow the photo at the current position.
    #[must_use]
    pub fn current(&self) -> Option<&PathBuf> {
        self.items.get(self.idx)
    }

    /// Step to the next photo, wrapping at the end. On wrap, reshuffle in
    /// place when an rng is supplied; mid-pass order is never disturbed.
    pub fn advance<R: Rng>(&mut self, reshuffle_on_wrap: Option<&mut R>) {
        if self.items.is_empty() {
            return;
        }
        self.idx = (self.idx + 1) % self.items.len();
        if self.idx == 0
            && let Some(rng) = reshuffle_on_wrap
        {
            self.items.shuffle(rng);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Zero-based position, for log lines.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.idx
    }

    #[must_use]
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.items
    }
}
