//! Cellular responses for a single trial, indexed by time.
//!
//! [`CellsTrial`] pairs a strictly increasing axis of frame times with a
//! dFoF matrix (one row per frame, one column per cell) and answers two
//! kinds of read-only range query, both returning the *frame-aligned* time
//! span together with an independent copy of the selected rows:
//!
//! 1. a time window `start..stop`, each bound snapped to the nearest
//!    recorded frame;
//! 2. a [`FrameSeq`] — a fixed number of consecutive frames from a start
//!    time, where the start may be deferred to a named [`EventField`] and
//!    resolved per trial. This is how one reusable window template (say,
//!    "10 frames from offer-on") is applied across every trial of a
//!    session.
use std::fmt;

use ndarray::{s, Array2, Axis};

use crate::error::{Error, Result};
use crate::timing::{EventField, EventTiming};
use crate::units::{Time, TimeSpan};

// ── FrameSeq ─────────────────────────────────────────────────────────────

/// A sequence of `nframes` consecutive frames starting at the frame nearest
/// a given time.
///
/// The deferred form names an [`EventTiming`] field instead of a concrete
/// time; [`FrameSeq::resolve`] substitutes the field's value for a specific
/// trial. Resolution is pure and may be repeated against different timings:
///
/// ```
/// use ecotrial::{EventField, EventTiming, FrameSeq, Time};
///
/// let fs = FrameSeq::at_event(EventField::Go, 5);
/// let et = EventTiming::new(
///     Time::ms(0.0), Time::ms(100.0), Time::ms(400.0),
///     Time::ms(450.0), Time::ms(837.0), Time::s(1.2),
/// ).unwrap();
/// assert_eq!(fs.resolve(&et), FrameSeq::starting(Time::ms(450.0), 5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameSeq {
    /// Concrete window: `nframes` frames starting nearest `start`.
    At { start: Time, nframes: usize },
    /// Deferred window: the start is a named event, resolved per trial.
    AtEvent { event: EventField, nframes: usize },
}

impl FrameSeq {
    /// Window of `nframes` frames starting nearest `start`.
    pub fn starting(start: Time, nframes: usize) -> FrameSeq {
        FrameSeq::At { start, nframes }
    }

    /// Deferred window anchored to `event`, to be resolved per trial.
    pub fn at_event(event: EventField, nframes: usize) -> FrameSeq {
        FrameSeq::AtEvent { event, nframes }
    }

    /// Substitute the named event's time from `timing`, yielding a concrete
    /// window. Already-concrete windows pass through unchanged.
    pub fn resolve(self, timing: &EventTiming) -> FrameSeq {
        match self {
            FrameSeq::At { .. } => self,
            FrameSeq::AtEvent { event, nframes } => {
                FrameSeq::At { start: timing.get(event), nframes }
            }
        }
    }

    pub fn nframes(self) -> usize {
        match self {
            FrameSeq::At { nframes, .. } | FrameSeq::AtEvent { nframes, .. } => nframes,
        }
    }

    /// The concrete start time, if resolved.
    pub fn start(self) -> Option<Time> {
        match self {
            FrameSeq::At { start, .. } => Some(start),
            FrameSeq::AtEvent { .. } => None,
        }
    }

    pub fn is_concrete(self) -> bool {
        matches!(self, FrameSeq::At { .. })
    }
}

// ── CellsTrial ───────────────────────────────────────────────────────────

/// Cellular responses for one trial: frame times plus a dFoF matrix with
/// one row per frame time and one column per cell.
///
/// The time axis is normalized to milliseconds at construction and the
/// container is immutable afterwards; queries return owned copies, never
/// views into shared storage.
///
/// ```
/// use ecotrial::{CellsTrial, FrameSeq, Time};
/// use ndarray::array;
///
/// let dfof = array![
///     [ 0.1, 0.8],
///     [-0.1, 0.7],
///     [ 0.2, 0.6],
///     [ 0.1, 0.5],
///     [ 0.0, 0.4],
/// ];
/// let t: Vec<Time> = (1..=5).map(|i| Time::ms(100.0 * i as f64)).collect();
/// let ct = CellsTrial::new(&t, dfof).unwrap();
///
/// // Time-window query: bounds snap to the nearest recorded frames.
/// let (span, df) = ct.window(Time::ms(175.0), Time::ms(310.0)).unwrap();
/// assert_eq!((span.start, span.stop), (Time::ms(200.0), Time::ms(300.0)));
/// assert_eq!(df.nrows(), 2);
///
/// // FrameSeq query: 3 frames starting nearest 175 ms.
/// let (span, df) = ct.frames(FrameSeq::starting(Time::ms(175.0), 3)).unwrap();
/// assert_eq!((span.start, span.stop), (Time::ms(200.0), Time::ms(400.0)));
/// assert_eq!(df.nrows(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CellsTrial {
    /// Frame times in milliseconds, strictly increasing.
    t_ms: Vec<f64>,
    /// dFoF responses, shape `[n_timepoints, n_cells]`.
    dfof: Array2<f64>,
}

impl CellsTrial {
    /// Build a trial container, validating the axis/matrix pairing.
    ///
    /// Requirements: at least one frame, finite strictly increasing times,
    /// and `t.len() == dfof.nrows()`.
    pub fn new(t: &[Time], dfof: Array2<f64>) -> Result<CellsTrial> {
        if t.is_empty() {
            return Err(Error::Validation("empty frame-time axis".into()));
        }
        let t_ms: Vec<f64> = t.iter().map(|ti| ti.as_ms()).collect();
        for (i, &ti) in t_ms.iter().enumerate() {
            if !ti.is_finite() {
                return Err(Error::Validation(format!("frame time {i} is not finite")));
            }
            if i > 0 && ti <= t_ms[i - 1] {
                return Err(Error::Validation(format!(
                    "frame times not strictly increasing at index {i} ({} ms after {} ms)",
                    ti,
                    t_ms[i - 1]
                )));
            }
        }
        if t_ms.len() != dfof.nrows() {
            return Err(Error::Validation(format!(
                "{} frame times but {} dFoF rows",
                t_ms.len(),
                dfof.nrows()
            )));
        }
        Ok(CellsTrial { t_ms, dfof })
    }

    /// Number of recorded frames (rows).
    pub fn n_timepoints(&self) -> usize {
        self.t_ms.len()
    }

    /// Number of cells (columns).
    pub fn n_cells(&self) -> usize {
        self.dfof.ncols()
    }

    /// Frame time of row `i`. Panics if `i` is out of bounds.
    pub fn time_at(&self, i: usize) -> Time {
        Time::ms(self.t_ms[i])
    }

    /// Read-only view of the full response matrix.
    pub fn dfof(&self) -> &Array2<f64> {
        &self.dfof
    }

    /// Full recorded span, first to last frame.
    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.time_at(0), self.time_at(self.t_ms.len() - 1))
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// Rows between `start` and `stop`, each bound snapped to the nearest
    /// recorded frame time, all cells.
    ///
    /// A bound exactly midway between two frames resolves outward: `start`
    /// to the earlier frame, `stop` to the later one. Reversed bounds or a
    /// window entirely outside the recorded span are [`Error::OutOfRange`].
    pub fn window(&self, start: Time, stop: Time) -> Result<(TimeSpan, Array2<f64>)> {
        let (i0, i1) = self.window_rows(start, stop)?;
        Ok((self.row_span(i0, i1), self.dfof.slice(s![i0..=i1, ..]).to_owned()))
    }

    /// [`CellsTrial::window`] restricted to the given cell columns
    /// (zero-based). An out-of-bounds cell index is [`Error::OutOfRange`].
    pub fn window_cells(
        &self,
        start: Time,
        stop: Time,
        cells: &[usize],
    ) -> Result<(TimeSpan, Array2<f64>)> {
        let (i0, i1) = self.window_rows(start, stop)?;
        Ok((self.row_span(i0, i1), self.select(i0, i1, cells)?))
    }

    /// The frame nearest `seq`'s start plus the following `nframes - 1`
    /// frames, all cells.
    ///
    /// A start exactly midway between two frames resolves to the *earlier*
    /// frame. Fails with [`Error::OutOfRange`] when fewer than `nframes`
    /// frames remain from the resolved start, and with
    /// [`Error::Validation`] when `seq` is still deferred.
    pub fn frames(&self, seq: FrameSeq) -> Result<(TimeSpan, Array2<f64>)> {
        let (i0, i1) = self.frame_rows(seq)?;
        Ok((self.row_span(i0, i1), self.dfof.slice(s![i0..=i1, ..]).to_owned()))
    }

    /// [`CellsTrial::frames`] restricted to the given cell columns.
    pub fn frames_cells(&self, seq: FrameSeq, cells: &[usize]) -> Result<(TimeSpan, Array2<f64>)> {
        let (i0, i1) = self.frame_rows(seq)?;
        Ok((self.row_span(i0, i1), self.select(i0, i1, cells)?))
    }

    // ── Internals ────────────────────────────────────────────────────────

    /// Index of the frame nearest `target_ms`; equidistant targets take the
    /// later frame iff `later_on_tie`.
    fn nearest(&self, target_ms: f64, later_on_tie: bool) -> usize {
        let t = &self.t_ms;
        let i = t.partition_point(|&x| x < target_ms);
        if i == 0 {
            return 0;
        }
        if i == t.len() {
            return t.len() - 1;
        }
        let before = target_ms - t[i - 1];
        let after = t[i] - target_ms;
        if after < before || (after == before && later_on_tie) {
            i
        } else {
            i - 1
        }
    }

    fn window_rows(&self, start: Time, stop: Time) -> Result<(usize, usize)> {
        let (a, b) = (start.as_ms(), stop.as_ms());
        if !a.is_finite() || !b.is_finite() {
            return Err(Error::OutOfRange("window bound is not a finite time".into()));
        }
        if a > b {
            return Err(Error::OutOfRange(format!(
                "window start {start} exceeds stop {stop}"
            )));
        }
        let (first, last) = (self.t_ms[0], self.t_ms[self.t_ms.len() - 1]);
        if b < first || a > last {
            return Err(Error::OutOfRange(format!(
                "window {start}..{stop} lies outside the recorded span {}",
                self.span()
            )));
        }
        Ok((self.nearest(a, false), self.nearest(b, true)))
    }

    fn frame_rows(&self, seq: FrameSeq) -> Result<(usize, usize)> {
        let (start, nframes) = match seq {
            FrameSeq::At { start, nframes } => (start, nframes),
            FrameSeq::AtEvent { event, .. } => {
                return Err(Error::Validation(format!(
                    "frame sequence anchored to `{event}` must be resolved \
                     against an EventTiming before indexing"
                )))
            }
        };
        if nframes == 0 {
            return Err(Error::OutOfRange("zero-length frame sequence".into()));
        }
        if !start.as_ms().is_finite() {
            return Err(Error::OutOfRange("start is not a finite time".into()));
        }
        let i0 = self.nearest(start.as_ms(), false);
        let remaining = self.t_ms.len() - i0;
        if nframes > remaining {
            return Err(Error::OutOfRange(format!(
                "{nframes} frames requested from {} but only {remaining} remain",
                self.time_at(i0)
            )));
        }
        Ok((i0, i0 + nframes - 1))
    }

    fn row_span(&self, i0: usize, i1: usize) -> TimeSpan {
        TimeSpan::new(self.time_at(i0), self.time_at(i1))
    }

    fn select(&self, i0: usize, i1: usize, cells: &[usize]) -> Result<Array2<f64>> {
        for &c in cells {
            if c >= self.n_cells() {
                return Err(Error::OutOfRange(format!(
                    "cell index {c} out of range for {} cells",
                    self.n_cells()
                )));
            }
        }
        Ok(self.dfof.slice(s![i0..=i1, ..]).select(Axis(1), cells))
    }
}

impl fmt::Display for CellsTrial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cells with {} timepoints", self.n_cells(), self.n_timepoints())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// 5 frames at 0,100,…,400 ms; 2 cells; dfof[i, c] = 10·i + c.
    fn trial() -> CellsTrial {
        let t: Vec<Time> = (0..5).map(|i| Time::ms(100.0 * i as f64)).collect();
        let dfof = Array2::from_shape_fn((5, 2), |(i, c)| (10 * i + c) as f64);
        CellsTrial::new(&t, dfof).unwrap()
    }

    #[test]
    fn window_snaps_to_nearest_frames() {
        let ct = trial();
        let (span, df) = ct.window(Time::ms(175.0), Time::ms(310.0)).unwrap();
        assert_eq!(span, TimeSpan::new(Time::ms(200.0), Time::ms(300.0)));
        assert_eq!(df, array![[20.0, 21.0], [30.0, 31.0]]);
    }

    #[test]
    fn window_accepts_mixed_units() {
        let ct = trial();
        let (span, _) = ct.window(Time::s(0.175), Time::s(0.31)).unwrap();
        assert_eq!(span, TimeSpan::new(Time::ms(200.0), Time::ms(300.0)));
    }

    #[test]
    fn window_tie_widens_both_ends() {
        // 150 ms is midway between 100 and 200; 250 between 200 and 300.
        let ct = trial();
        let (span, df) = ct.window(Time::ms(150.0), Time::ms(250.0)).unwrap();
        assert_eq!(span, TimeSpan::new(Time::ms(100.0), Time::ms(300.0)));
        assert_eq!(df.nrows(), 3);
    }

    #[test]
    fn window_clamps_to_recorded_span() {
        let ct = trial();
        let (span, df) = ct.window(Time::ms(-500.0), Time::ms(5000.0)).unwrap();
        assert_eq!(span, ct.span());
        assert_eq!(df.nrows(), 5);
    }

    #[test]
    fn window_outside_span_is_out_of_range() {
        let ct = trial();
        assert!(matches!(
            ct.window(Time::ms(600.0), Time::ms(900.0)),
            Err(Error::OutOfRange(_))
        ));
        assert!(matches!(
            ct.window(Time::ms(-300.0), Time::ms(-100.0)),
            Err(Error::OutOfRange(_))
        ));
    }

    #[test]
    fn window_reversed_bounds_rejected() {
        let ct = trial();
        assert!(matches!(
            ct.window(Time::ms(300.0), Time::ms(100.0)),
            Err(Error::OutOfRange(_))
        ));
    }

    #[test]
    fn frames_from_nearest_start() {
        let ct = trial();
        let (span, df) = ct.frames(FrameSeq::starting(Time::ms(175.0), 3)).unwrap();
        assert_eq!(span, TimeSpan::new(Time::ms(200.0), Time::ms(400.0)));
        assert_eq!(df, array![[20.0, 21.0], [30.0, 31.0], [40.0, 41.0]]);
    }

    #[test]
    fn frames_tie_prefers_earlier() {
        // 150 ms is midway between 100 and 200 → start at 100.
        let ct = trial();
        let (span, _) = ct.frames(FrameSeq::starting(Time::ms(150.0), 2)).unwrap();
        assert_eq!(span.start, Time::ms(100.0));
    }

    #[test]
    fn frames_exhausting_the_trial_is_out_of_range() {
        // Nearest to 390 is 400 (index 4): only 1 frame remains.
        let ct = trial();
        assert!(matches!(
            ct.frames(FrameSeq::starting(Time::ms(390.0), 3)),
            Err(Error::OutOfRange(_))
        ));
        // Exactly filling the tail is fine.
        let (span, _) = ct.frames(FrameSeq::starting(Time::ms(290.0), 2)).unwrap();
        assert_eq!(span.stop, Time::ms(400.0));
    }

    #[test]
    fn frames_zero_length_rejected() {
        let ct = trial();
        assert!(matches!(
            ct.frames(FrameSeq::starting(Time::ms(0.0), 0)),
            Err(Error::OutOfRange(_))
        ));
    }

    #[test]
    fn frames_deferred_must_be_resolved_first() {
        let ct = trial();
        let err = ct.frames(FrameSeq::at_event(EventField::Go, 3)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn resolve_is_pure_and_repeatable() {
        let fs = FrameSeq::at_event(EventField::OfferOn, 10);
        let et1 = EventTiming::new(
            Time::ms(0.0),
            Time::ms(2003.0),
            Time::ms(4820.0),
            Time::ms(5000.0),
            Time::ms(5800.0),
            Time::ms(7000.0),
        )
        .unwrap();
        let et2 = EventTiming::new(
            Time::ms(0.0),
            Time::ms(2002.0),
            Time::ms(4812.0),
            Time::ms(5000.0),
            Time::ms(5800.0),
            Time::ms(7000.0),
        )
        .unwrap();
        assert_eq!(fs.resolve(&et1).start(), Some(Time::ms(2003.0)));
        assert_eq!(fs.resolve(&et2).start(), Some(Time::ms(2002.0)));
        // The template itself is unchanged.
        assert!(!fs.is_concrete());
        assert_eq!(fs.nframes(), 10);
    }

    #[test]
    fn cell_subset_selects_columns() {
        let ct = trial();
        let (_, df) = ct
            .window_cells(Time::ms(0.0), Time::ms(400.0), &[1])
            .unwrap();
        assert_eq!(df, array![[1.0], [11.0], [21.0], [31.0], [41.0]]);

        let (_, df) = ct
            .frames_cells(FrameSeq::starting(Time::ms(0.0), 2), &[1, 0])
            .unwrap();
        assert_eq!(df, array![[1.0, 0.0], [11.0, 10.0]]);
    }

    #[test]
    fn bad_cell_index_is_out_of_range() {
        let ct = trial();
        assert!(matches!(
            ct.window_cells(Time::ms(0.0), Time::ms(400.0), &[2]),
            Err(Error::OutOfRange(_))
        ));
    }

    #[test]
    fn construction_invariants() {
        let dfof = Array2::<f64>::zeros((3, 2));
        // Length mismatch.
        let t: Vec<Time> = (0..2).map(|i| Time::ms(i as f64)).collect();
        assert!(matches!(
            CellsTrial::new(&t, dfof.clone()),
            Err(Error::Validation(_))
        ));
        // Non-increasing times.
        let t = [Time::ms(0.0), Time::ms(100.0), Time::ms(100.0)];
        assert!(matches!(
            CellsTrial::new(&t, dfof.clone()),
            Err(Error::Validation(_))
        ));
        // Empty axis.
        assert!(matches!(
            CellsTrial::new(&[], Array2::<f64>::zeros((0, 2))),
            Err(Error::Validation(_))
        ));
        // Mixed units normalize before the monotonicity check.
        let t = [Time::ms(900.0), Time::s(1.0), Time::ms(1100.0)];
        assert!(CellsTrial::new(&t, dfof).is_ok());
    }

    #[test]
    fn display_counts_cells_then_timepoints() {
        assert_eq!(trial().to_string(), "2 cells with 5 timepoints");
    }
}
