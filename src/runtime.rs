use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::debug;

/// Everything the main loop reacts to
#[derive(Clone, Debug)]
pub enum TypingEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal input
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout`; `Err(Timeout)` when nothing arrived.
    fn recv_timeout(&self, timeout: Duration) -> Result<TypingEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<TypingEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => tx.send(TypingEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => tx.send(TypingEvent::Resize),
                Ok(_) => Ok(()),
                Err(err) => {
                    debug!(%err, "terminal event reader stopped");
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TypingEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed source for tests
pub struct TestEventSource {
    rx: Receiver<TypingEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TypingEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TypingEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Interleaves input with periodic ticks.
///
/// A tick is produced once per interval even while input keeps arriving, so a
/// fast typist cannot stall the countdown.
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    last_tick: Cell<Instant>,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
            last_tick: Cell::new(Instant::now()),
        }
    }

    /// Next input event, or `Tick` once the interval has run out.
    pub fn step(&self) -> TypingEvent {
        let deadline = self.last_tick.get() + self.ticker.interval();
        let now = Instant::now();
        if now >= deadline {
            self.last_tick.set(now);
            return TypingEvent::Tick;
        }

        match self.event_source.recv_timeout(deadline - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                self.last_tick.set(Instant::now());
                TypingEvent::Tick
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );

        assert_matches!(runner.step(), TypingEvent::Tick);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(TypingEvent::Resize).unwrap();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_secs(1)),
        );

        assert_matches!(runner.step(), TypingEvent::Resize);
    }

    #[test]
    fn ticks_even_when_input_is_continuous() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..1000 {
            tx.send(TypingEvent::Resize).unwrap();
        }
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );

        std::thread::sleep(Duration::from_millis(10));
        assert_matches!(runner.step(), TypingEvent::Tick);
        assert_matches!(runner.step(), TypingEvent::Resize);
    }

    #[test]
    fn disconnected_source_ticks() {
        let (tx, rx) = mpsc::channel::<TypingEvent>();
        drop(tx);
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );

        assert_matches!(runner.step(), TypingEvent::Tick);
    }
}
