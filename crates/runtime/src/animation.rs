use foundation::time::{clamp_year, Clamped, Year, FIRST_YEAR, LAST_YEAR};
use tracing::debug;

use crate::timer::RepeatingTimer;

/// Period of one animation step at 1× speed.
pub const DEFAULT_BASE_INTERVAL_MS: f64 = 700.0;

/// Years moved by the decade step buttons.
pub const DECADE: Year = 10;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum PlaybackSpeed {
    #[default]
    X1,
    X2,
    X5,
    X10,
}

impl PlaybackSpeed {
    pub const ALL: [PlaybackSpeed; 4] = [
        PlaybackSpeed::X1,
        PlaybackSpeed::X2,
        PlaybackSpeed::X5,
        PlaybackSpeed::X10,
    ];

    pub fn multiplier(self) -> u32 {
        match self {
            PlaybackSpeed::X1 => 1,
            PlaybackSpeed::X2 => 2,
            PlaybackSpeed::X5 => 5,
            PlaybackSpeed::X10 => 10,
        }
    }

    pub fn from_multiplier(multiplier: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.multiplier() == multiplier)
    }
}

/// Drives `current_year` forward while playing.
///
/// One timer at most: it exists only while playing and is replaced, never
/// duplicated, on speed changes. Manual jumps do not pause playback; callers
/// that want exclusivity pause first.
#[derive(Debug, Clone)]
pub struct AnimationScheduler {
    year: Year,
    speed: PlaybackSpeed,
    base_interval_ms: f64,
    timer: Option<RepeatingTimer>,
    disposed: bool,
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new(FIRST_YEAR, DEFAULT_BASE_INTERVAL_MS)
    }
}

impl AnimationScheduler {
    pub fn new(start: Year, base_interval_ms: f64) -> Self {
        Self {
            year: clamp_year(start).value,
            speed: PlaybackSpeed::default(),
            base_interval_ms,
            timer: None,
            disposed: false,
        }
    }

    pub fn year(&self) -> Year {
        self.year
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn is_playing(&self) -> bool {
        self.timer.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Tick period for the current speed.
    pub fn period_ms(&self) -> f64 {
        self.base_interval_ms / f64::from(self.speed.multiplier())
    }

    /// Starts playback. Returns `false` if already playing or disposed.
    pub fn play(&mut self) -> bool {
        if self.disposed || self.timer.is_some() {
            return false;
        }
        self.timer = Some(RepeatingTimer::new(self.period_ms()));
        debug!(year = self.year, period_ms = self.period_ms(), "playback started");
        true
    }

    /// Stops playback. Returns `false` if nothing was playing.
    pub fn pause(&mut self) -> bool {
        if self.timer.take().is_none() {
            return false;
        }
        debug!(year = self.year, "playback paused");
        true
    }

    /// Play/pause toggle. Returns the new playing state.
    pub fn toggle(&mut self) -> bool {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
        self.is_playing()
    }

    /// Changes speed; a running timer is restarted with the new period.
    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        if self.speed == speed {
            return;
        }
        self.speed = speed;
        if self.timer.is_some() {
            self.timer = Some(RepeatingTimer::new(self.period_ms()));
            debug!(
                multiplier = speed.multiplier(),
                period_ms = self.period_ms(),
                "playback timer restarted"
            );
        }
    }

    /// Feeds elapsed time to the timer and applies every completed tick.
    ///
    /// Ordering contract: the returned years are the ones committed, in order,
    /// one per tick. A tick past [`LAST_YEAR`] stops playback and commits
    /// nothing; remaining ticks of the same call are dropped with the timer.
    pub fn advance(&mut self, dt_ms: f64) -> Vec<Year> {
        let mut committed = Vec::new();
        let Some(timer) = self.timer.as_mut() else {
            return committed;
        };
        let ticks = timer.advance(dt_ms);
        for _ in 0..ticks {
            let next = self.year + 1;
            if next > LAST_YEAR {
                self.timer = None;
                debug!(year = self.year, "playback reached the last year");
                break;
            }
            self.year = next;
            committed.push(next);
        }
        committed
    }

    pub fn jump_to_year(&mut self, year: Year) -> Clamped<Year> {
        let clamped = clamp_year(year);
        self.year = clamped.value;
        clamped
    }

    /// Moves by `delta` years, clamped to the dataset range.
    pub fn step(&mut self, delta: Year) -> Clamped<Year> {
        self.jump_to_year(self.year.saturating_add(delta))
    }

    pub fn step_forward(&mut self) -> Clamped<Year> {
        self.step(DECADE)
    }

    pub fn step_back(&mut self) -> Clamped<Year> {
        self.step(-DECADE)
    }

    pub fn go_to_start(&mut self) -> Year {
        self.year = FIRST_YEAR;
        self.year
    }

    pub fn go_to_end(&mut self) -> Year {
        self.year = LAST_YEAR;
        self.year
    }

    /// Parses a typed year and applies it.
    ///
    /// Leading integer digits are read like a lenient integer parse. Text
    /// without digits or a year before [`FIRST_YEAR`] lands on `FIRST_YEAR`;
    /// a year after [`LAST_YEAR`] lands on `LAST_YEAR`. Both report
    /// `corrected = true`.
    pub fn validate_and_set_year(&mut self, input: &str) -> Clamped<Year> {
        let clamped = match parse_leading_int(input) {
            Some(year) => clamp_year(year),
            None => Clamped::corrected(FIRST_YEAR),
        };
        self.year = clamped.value;
        clamped
    }

    /// Stops playback for good. Later `play` calls are ignored.
    pub fn dispose(&mut self) {
        self.timer = None;
        self.disposed = true;
    }
}

fn parse_leading_int(input: &str) -> Option<Year> {
    let s = input.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Too many digits to be a year: saturate so clamping still applies.
    let magnitude = digits[..end].parse::<Year>().unwrap_or(Year::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
