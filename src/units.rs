//! Physical time quantities.
//!
//! Every timestamp in this crate is a [`Time`]: an `f64` magnitude tagged
//! with a [`TimeUnit`]. Mixed units are accepted everywhere and
//! auto-converted — comparisons and arithmetic normalize to milliseconds
//! first, so `Time::s(1.2)` and `Time::ms(1200.0)` are interchangeable.
use std::fmt;
use std::ops::{Add, Sub};

// ── Unit tag ─────────────────────────────────────────────────────────────

/// Physical unit of a [`Time`] magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    /// Conversion factor from this unit to milliseconds.
    #[inline]
    pub fn to_ms(self) -> f64 {
        match self {
            TimeUnit::Milliseconds => 1.0,
            TimeUnit::Seconds => 1000.0,
        }
    }

    /// Unit symbol as printed by `Display`.
    pub fn symbol(self) -> &'static str {
        match self {
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
        }
    }
}

// ── Time ─────────────────────────────────────────────────────────────────

/// A point in (trial-relative) time: magnitude plus unit.
///
/// Equality and ordering are unit-insensitive:
///
/// ```
/// use ecotrial::Time;
///
/// assert_eq!(Time::s(1.2), Time::ms(1200.0));
/// assert!(Time::ms(500.0) < Time::s(1.0));
/// assert_eq!(Time::s(0.2).as_ms(), 200.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Time {
    magnitude: f64,
    unit: TimeUnit,
}

impl Time {
    /// A time in milliseconds.
    #[inline]
    pub fn ms(magnitude: f64) -> Time {
        Time { magnitude, unit: TimeUnit::Milliseconds }
    }

    /// A time in seconds.
    #[inline]
    pub fn s(magnitude: f64) -> Time {
        Time { magnitude, unit: TimeUnit::Seconds }
    }

    /// A time in the given unit.
    #[inline]
    pub fn new(magnitude: f64, unit: TimeUnit) -> Time {
        Time { magnitude, unit }
    }

    #[inline]
    pub fn magnitude(self) -> f64 {
        self.magnitude
    }

    #[inline]
    pub fn unit(self) -> TimeUnit {
        self.unit
    }

    /// Magnitude expressed in milliseconds.
    #[inline]
    pub fn as_ms(self) -> f64 {
        self.magnitude * self.unit.to_ms()
    }

    /// Magnitude expressed in seconds.
    #[inline]
    pub fn as_secs(self) -> f64 {
        self.as_ms() / 1000.0
    }

    /// The same instant re-expressed in `unit`.
    pub fn convert_to(self, unit: TimeUnit) -> Time {
        Time { magnitude: self.as_ms() / unit.to_ms(), unit }
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Time) -> bool {
        self.as_ms() == other.as_ms()
    }
}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Time) -> Option<std::cmp::Ordering> {
        self.as_ms().partial_cmp(&other.as_ms())
    }
}

impl Add for Time {
    type Output = Time;

    /// Sum, expressed in the left operand's unit.
    fn add(self, rhs: Time) -> Time {
        Time::ms(self.as_ms() + rhs.as_ms()).convert_to(self.unit)
    }
}

impl Sub for Time {
    type Output = Time;

    /// Difference, expressed in the left operand's unit.
    fn sub(self, rhs: Time) -> Time {
        Time::ms(self.as_ms() - rhs.as_ms()).convert_to(self.unit)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit.symbol())
    }
}

// ── TimeSpan ─────────────────────────────────────────────────────────────

/// A closed `start..stop` interval of actual frame times.
///
/// Index queries on [`crate::CellsTrial`] return the *frame-aligned* span —
/// the sample times of the first and last selected rows, not the bounds the
/// caller asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    pub start: Time,
    pub stop: Time,
}

impl TimeSpan {
    #[inline]
    pub fn new(start: Time, stop: Time) -> TimeSpan {
        TimeSpan { start, stop }
    }

    /// `stop - start`, in the start's unit.
    pub fn duration(self) -> Time {
        self.stop - self.start
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.stop)
    }
}
