//! Single-slot hand-off from a background producer to the render loop.
//!
//! Not a queue: only the freshest value matters for a slideshow, so a
//! publish overwrites any unconsumed predecessor and the producer never
//! blocks on a slow consumer.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// A lock-guarded slot holding at most one pending value.
///
/// Clones share the same slot, so a producer thread can keep a handle
/// while the consumer polls its own.
#[derive(Debug, Default)]
pub struct Mailbox<T> {
    slot: Arc<Mutex<Option<T>>>,
}

/// The hand-off used by the slideshow: a full replacement photo list.
pub type PhotoMailbox = Mailbox<Vec<PathBuf>>;

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Mailbox<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Producer side: overwrite the pending slot. Last write wins.
    pub fn publish(&self, value: T) {
        let mut slot = self.slot.lock().expect("mailbox mutex poisoned");
        *slot = Some(value);
    }

    /// Consumer side: take and clear the pending slot, if any.
    pub fn consume(&self) -> Option<T> {
        let mut slot = self.slot.lock().expect("mailbox mutex poisoned");
        slot.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_empty_yields_none() {
        let mb: Mailbox<u32> = Mailbox::new();
        assert_eq!(mb.consume(), None);
    }

    #[test]
    fn last_publish_before_consume_wins() {
        let mb: Mailbox<Vec<u32>> = Mailbox::new();
        mb.publish(vec![1]);
        mb.publish(vec![2, 3]);
        assert_eq!(mb.consume(), Some(vec![2, 3]));
        assert_eq!(mb.consume(), None);
    }

    #[test]
    fn clones_share_the_slot() {
        let producer: Mailbox<&str> = Mailbox::new();
        let consumer = producer.clone();
        producer.publish("fresh");
        assert_eq!(consumer.consume(), Some("fresh"));
        assert_eq!(producer.consume(), None);
    }
}
