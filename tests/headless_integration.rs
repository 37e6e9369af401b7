use std::sync::mpsc;
use std::time::Duration;

use assert_matches::assert_matches;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dazi::{
    app::{App, Screen},
    article::BundledArticles,
    config::MemoryPreferencesStore,
    countdown::Countdown,
    runtime::{FixedTicker, Runner, TestEventSource, TypingEvent},
    session::{CharState, EndReason, Session, SessionEvent},
};

fn key(c: char) -> TypingEvent {
    TypingEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Headless integration using the runtime + App without a TTY
#[test]
fn headless_typing_flow_completes() {
    let mut app = App::new(
        Box::new(BundledArticles),
        Box::new(MemoryPreferencesStore::default()),
        None,
    );
    app.load_custom("hi");

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    tx.send(key('h')).unwrap();
    tx.send(key('i')).unwrap();

    for _ in 0..100u32 {
        match runner.step() {
            TypingEvent::Tick => app.on_tick(),
            TypingEvent::Resize => {}
            TypingEvent::Key(key) => app.handle_key(key),
        }
        if app.session.is_ended() {
            break;
        }
    }

    assert_eq!(app.session.end_reason(), Some(EndReason::TextComplete));
    assert_eq!(app.screen, Screen::Stats);
    let snap = app.final_snapshot().unwrap();
    assert_eq!(snap.accuracy_rate(), 100.0);
    assert_eq!(snap.completion_rate(), 100.0);
}

#[test]
fn headless_countdown_expires_by_ticks() {
    let mut session = Session::new(Countdown::new(true, 0, 0, 1));
    session.load("a long enough text");
    assert!(session.record_keystroke('a'));

    let (_tx, rx) = mpsc::channel::<TypingEvent>();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(20)),
    );

    // up to ~3s of wall clock
    for _ in 0..150u32 {
        if let TypingEvent::Tick = runner.step() {
            session.tick();
        }
        if session.is_ended() {
            break;
        }
    }

    assert_eq!(session.end_reason(), Some(EndReason::CountdownExpired));
    assert_eq!(session.remaining_secs(), 0);

    let events = session.drain_events();
    assert_matches!(events.first(), Some(SessionEvent::Started(_)));
    assert_matches!(
        events.last(),
        Some(SessionEvent::Ended {
            reason: EndReason::CountdownExpired,
            ..
        })
    );

    // nothing moves after the end
    assert!(!session.record_keystroke(' '));
    session.tick();
    assert!(session.drain_events().is_empty());
}

#[test]
fn headless_backspace_and_retype() {
    let mut session = Session::default();
    session.load("abc");

    session.record_keystroke('a');
    session.record_keystroke('x');
    assert_eq!(session.states()[1], CharState::Incorrect);

    assert!(session.record_backspace());
    assert_eq!(session.cursor(), 1);
    assert_eq!(session.states()[1], CharState::NotTyped);

    session.record_keystroke('b');
    session.record_keystroke('c');
    assert_eq!(session.end_reason(), Some(EndReason::TextComplete));
    assert_eq!(session.snapshot().backspace_count, 1);
    assert_eq!(session.snapshot().accuracy_rate(), 100.0);
}
