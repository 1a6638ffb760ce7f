//! Virtual repeating timers
//!
//! The round runs two independent tickers: the spawn ticker and the countdown
//! poll. Nothing here reads a clock; the owner asks for the next due firing
//! and consumes firings in time order, so every tick observes the state left
//! by the previous one.

/// Which ticker fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Spawn,
    Countdown,
}

/// A single firing of a ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub kind: TimerKind,
    /// Scheduled fire time (host ms)
    pub at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Repeating {
    period_ms: u64,
    next_at_ms: u64,
}

impl Repeating {
    /// `None` when the first firing would overflow the timestamp range
    fn new(period_ms: u64, now_ms: u64) -> Option<Self> {
        let period_ms = period_ms.max(1);
        Some(Self {
            period_ms,
            next_at_ms: now_ms.checked_add(period_ms)?,
        })
    }
}

/// Spawn and countdown tickers, each cancelable
#[derive(Debug, Clone, Default)]
pub struct TimerService {
    spawn: Option<Repeating>,
    countdown: Option<Repeating>,
}

impl TimerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the spawn ticker; first firing at `now + interval`.
    /// A ticker whose next firing would pass `u64::MAX` is dropped.
    pub fn start_spawning(&mut self, interval_ms: u64, now_ms: u64) {
        self.spawn = Repeating::new(interval_ms, now_ms);
    }

    /// Install (or replace) the countdown ticker
    pub fn start_countdown(&mut self, interval_ms: u64, now_ms: u64) {
        self.countdown = Repeating::new(interval_ms, now_ms);
    }

    /// Cancel both tickers. Safe to call when nothing is running.
    pub fn stop_all(&mut self) {
        self.spawn = None;
        self.countdown = None;
    }

    pub fn is_active(&self) -> bool {
        self.spawn.is_some() || self.countdown.is_some()
    }

    /// Earliest pending firing. Spawn wins ties (it is installed first).
    pub fn next_fire(&self) -> Option<TimerTick> {
        let spawn = self.spawn.map(|t| TimerTick {
            kind: TimerKind::Spawn,
            at_ms: t.next_at_ms,
        });
        let countdown = self.countdown.map(|t| TimerTick {
            kind: TimerKind::Countdown,
            at_ms: t.next_at_ms,
        });
        match (spawn, countdown) {
            (Some(s), Some(c)) => Some(if c.at_ms < s.at_ms { c } else { s }),
            (s, c) => s.or(c),
        }
    }

    /// Consume the earliest firing if it is due at or before `now_ms`
    pub fn fire_due(&mut self, now_ms: u64) -> Option<TimerTick> {
        let tick = self.next_fire().filter(|t| t.at_ms <= now_ms)?;
        let slot = match tick.kind {
            TimerKind::Spawn => &mut self.spawn,
            TimerKind::Countdown => &mut self.countdown,
        };
        *slot = slot.and_then(|timer| {
            Some(Repeating {
                next_at_ms: timer.next_at_ms.checked_add(timer.period_ms)?,
                ..timer
            })
        });
        Some(tick)
    }
}
