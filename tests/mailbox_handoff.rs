//! The producer/consumer hand-off as the scheduler performs it: consume a
//! pending list, replace the playlist wholesale, clamp the position.

use std::path::PathBuf;

use fbframe::mailbox::PhotoMailbox;
use fbframe::playlist::Playlist;
use rand::rngs::StdRng;

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

#[test]
fn publish_twice_keeps_only_the_freshest_list() {
    let mailbox = PhotoMailbox::new();
    mailbox.publish(paths(&["stale.jpg"]));
    mailbox.publish(paths(&["a.jpg", "b.jpg"]));

    assert_eq!(mailbox.consume(), Some(paths(&["a.jpg", "b.jpg"])));
    assert_eq!(mailbox.consume(), None);
}

#[test]
fn waiting_scheduler_starts_at_the_first_photo() {
    let mailbox = PhotoMailbox::new();
    let mut playlist = Playlist::new();

    // Waiting sub-state: nothing pending, nothing to show.
    assert_eq!(mailbox.consume(), None);
    assert!(playlist.is_empty());

    // A background publish of three photos arrives.
    mailbox.publish(paths(&["a.jpg", "b.jpg", "c.jpg"]));
    if let Some(update) = mailbox.consume() {
        playlist.replace::<StdRng>(update, None);
    }

    // The first photo is shown, not skipped.
    assert_eq!(playlist.position(), 0);
    assert_eq!(playlist.current(), Some(&PathBuf::from("a.jpg")));
}

#[test]
fn pickup_mid_show_clamps_to_the_shorter_list() {
    let mailbox = PhotoMailbox::new();
    let mut playlist = Playlist::new();
    playlist.replace::<StdRng>(paths(&["a", "b", "c", "d", "e"]), None);
    playlist.advance::<StdRng>(None);
    playlist.advance::<StdRng>(None);
    playlist.advance::<StdRng>(None);
    assert_eq!(playlist.position(), 3);

    mailbox.publish(paths(&["x", "y"]));
    let update = mailbox.consume().unwrap();
    playlist.replace::<StdRng>(update, None);
    assert_eq!(playlist.position(), 1);
}
