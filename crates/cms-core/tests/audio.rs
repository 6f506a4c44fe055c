//! Register writes and mixer pulls meeting through a live session.

mod common;

use std::rc::Rc;

use cms_core::{CmsConfig, EmulatedClock, IoBus, ManualClock, chip::MS_PER_RENDER};
use common::{FakeMixer, card};

const BASE: u16 = 0x220;

#[test]
fn writes_render_pending_audio_before_taking_effect() {
    let (mut card, _) = card();
    let mut io = IoBus::new();
    let mut mixer = FakeMixer::default();
    let clock = Rc::new(ManualClock::new(0.0));
    card.open(CmsConfig::default(), &mut io, &mut mixer, clock.clone());

    clock.advance(0.5);
    io.write(BASE, 100);
    let silent_part = card.queued_frames().unwrap_or_default();
    assert!((23..=25).contains(&silent_part), "queued {silent_part}");

    clock.advance(0.5);
    io.write(BASE + 1, 0x00);
    let queued = card.queued_frames().unwrap_or_default();
    assert!((47..=49).contains(&queued), "queued {queued}");

    let last = card.last_rendered_ms().unwrap_or_default();
    assert!((1.0..1.0 + MS_PER_RENDER).contains(&last), "datum {last}");

    let frames = mixer.pull(queued);
    assert_eq!(frames.len(), queued);
    assert!(frames[..silent_part].iter().all(|f| f.left == 0.0 && f.right == 0.0));
    assert!(frames.iter().all(|f| f.left == f.right));
    assert!(
        frames[silent_part..].iter().any(|f| f.left > 3_000.0),
        "level change never reached the output"
    );
}

#[test]
fn pull_returns_exactly_the_requested_count() {
    let (mut card, _) = card();
    let mut io = IoBus::new();
    let mut mixer = FakeMixer::default();
    let clock = Rc::new(ManualClock::new(0.0));
    card.open(CmsConfig::default(), &mut io, &mut mixer, clock.clone());

    assert!(mixer.pull(0).is_empty());
    assert_eq!(mixer.pull(1_000).len(), 1_000);

    clock.advance(2.0);
    io.write(BASE, 10);
    let queued = card.queued_frames().unwrap_or_default();
    assert!(queued > 0);

    // Fewer than queued: the remainder stays for the next pull.
    assert_eq!(mixer.pull(10).len(), 10);
    assert_eq!(card.queued_frames(), Some(queued - 10));

    clock.advance(0.25);
    assert_eq!(mixer.pull(queued + 64).len(), queued + 64);
    assert_eq!(card.queued_frames(), Some(0));
    assert_eq!(card.last_rendered_ms(), Some(2.25));
}

#[test]
fn sleeping_channel_does_not_burst_on_wake() {
    let (mut card, _) = card();
    let mut io = IoBus::new();
    let mut mixer = FakeMixer::default();
    let clock = Rc::new(ManualClock::new(10.0));
    card.open(CmsConfig::default(), &mut io, &mut mixer, clock.clone());
    assert_eq!(card.last_rendered_ms(), Some(10.0));

    mixer.channel().asleep.set(true);
    clock.advance(500.0);
    io.write(BASE + 1, 0x1c);

    assert!(!mixer.channel().asleep.get());
    assert_eq!(card.queued_frames(), Some(0));
    assert_eq!(card.last_rendered_ms(), Some(510.0));

    clock.advance(0.5);
    io.write(BASE + 1, 0x1c);
    let queued = card.queued_frames().unwrap_or_default();
    assert!((23..=25).contains(&queued), "queued {queued}");
}

#[test]
fn standalone_card_serves_a_pull_after_a_write() {
    let (mut card, log) = card();
    let mut io = IoBus::new();
    let mut mixer = FakeMixer::default();
    let clock = Rc::new(ManualClock::new(3.0));
    card.open(CmsConfig::default(), &mut io, &mut mixer, clock.clone());

    clock.advance(0.1);
    io.write(BASE, 0x40);
    assert_eq!(log.borrow().len(), 1);

    clock.advance(64.0 * MS_PER_RENDER);
    let frames = mixer.pull(64);

    assert_eq!(frames.len(), 64);
    assert_eq!(card.last_rendered_ms(), Some(clock.now_ms()));
}
