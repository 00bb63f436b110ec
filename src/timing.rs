//! Per-trial event timings.
//!
//! Each trial passes through six phases in a fixed order:
//!
//! ```text
//! trial_start ≤ offer_on ≤ offer_off ≤ go ≤ choice ≤ trial_end
//! ```
//!
//! [`EventTiming`] stores the six timestamps and enforces that ordering at
//! construction; it never mutates afterwards. [`EventField`] enumerates the
//! six legal field names so that deferred [`crate::FrameSeq`] windows can
//! name an event without open-ended reflection.
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::units::Time;

// ── EventField ───────────────────────────────────────────────────────────

/// Identifier of one of the six [`EventTiming`] fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    TrialStart,
    OfferOn,
    OfferOff,
    Go,
    Choice,
    TrialEnd,
}

impl EventField {
    /// All six fields, in trial order.
    pub const ALL: [EventField; 6] = [
        EventField::TrialStart,
        EventField::OfferOn,
        EventField::OfferOff,
        EventField::Go,
        EventField::Choice,
        EventField::TrialEnd,
    ];

    /// Field name as it appears in data files and display output.
    pub fn name(self) -> &'static str {
        match self {
            EventField::TrialStart => "trial_start",
            EventField::OfferOn => "offer_on",
            EventField::OfferOff => "offer_off",
            EventField::Go => "go",
            EventField::Choice => "choice",
            EventField::TrialEnd => "trial_end",
        }
    }
}

impl FromStr for EventField {
    type Err = Error;

    /// Parse a field name; anything but the six legal names is an error.
    ///
    /// ```
    /// use ecotrial::EventField;
    ///
    /// assert_eq!("offer_on".parse::<EventField>().unwrap(), EventField::OfferOn);
    /// assert!("offer_onn".parse::<EventField>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<EventField> {
        EventField::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| Error::UnknownEventField(s.to_string()))
    }
}

impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── EventTiming ──────────────────────────────────────────────────────────

/// The six key timestamps of one trial. Immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventTiming {
    trial_start: Time,
    offer_on: Time,
    offer_off: Time,
    go: Time,
    choice: Time,
    trial_end: Time,
}

impl EventTiming {
    /// Build a timing record, validating monotonic (non-decreasing) order.
    ///
    /// Units may be mixed; ordering is checked after unit normalization.
    /// A violated ordering names both offending fields:
    ///
    /// ```
    /// use ecotrial::{EventTiming, Time};
    ///
    /// let et = EventTiming::new(
    ///     Time::ms(0.0), Time::ms(100.0), Time::ms(400.0),
    ///     Time::ms(450.0), Time::ms(837.0), Time::s(1.2),
    /// ).unwrap();
    /// assert_eq!(et.trial_end(), Time::ms(1200.0));
    ///
    /// let bad = EventTiming::new(
    ///     Time::ms(0.0), Time::ms(400.0), Time::ms(100.0),
    ///     Time::ms(450.0), Time::ms(837.0), Time::s(1.2),
    /// );
    /// assert!(bad.is_err());
    /// ```
    pub fn new(
        trial_start: Time,
        offer_on: Time,
        offer_off: Time,
        go: Time,
        choice: Time,
        trial_end: Time,
    ) -> Result<EventTiming> {
        let et = EventTiming { trial_start, offer_on, offer_off, go, choice, trial_end };
        for pair in EventField::ALL.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (ta, tb) = (et.get(a), et.get(b));
            if !ta.as_ms().is_finite() {
                return Err(Error::Validation(format!("{a} is not a finite time ({ta})")));
            }
            if !(ta <= tb) {
                return Err(Error::Validation(format!(
                    "{b} ({tb}) precedes {a} ({ta})"
                )));
            }
        }
        if !et.trial_end.as_ms().is_finite() {
            return Err(Error::Validation(format!(
                "trial_end is not a finite time ({})",
                et.trial_end
            )));
        }
        Ok(et)
    }

    /// Timestamp of the given field.
    pub fn get(&self, field: EventField) -> Time {
        match field {
            EventField::TrialStart => self.trial_start,
            EventField::OfferOn => self.offer_on,
            EventField::OfferOff => self.offer_off,
            EventField::Go => self.go,
            EventField::Choice => self.choice,
            EventField::TrialEnd => self.trial_end,
        }
    }

    pub fn trial_start(&self) -> Time {
        self.trial_start
    }

    pub fn offer_on(&self) -> Time {
        self.offer_on
    }

    pub fn offer_off(&self) -> Time {
        self.offer_off
    }

    pub fn go(&self) -> Time {
        self.go
    }

    pub fn choice(&self) -> Time {
        self.choice
    }

    pub fn trial_end(&self) -> Time {
        self.trial_end
    }
}

impl fmt::Display for EventTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventTiming(")?;
        for (i, field) in EventField::ALL.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", field, self.get(field))?;
        }
        write!(f, ")")
    }
}
