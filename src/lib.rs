//! # ecotrial — trial-structured data for economic-choice experiments
//!
//! `ecotrial` imports behavioral and calcium-imaging data from the legacy
//! MATLAB `.mat` session files used in economic decision-making
//! experiments, and exposes them through a small set of indexed container
//! types. It is a deserialization-plus-lookup layer: read once, then query.
//!
//! ## Data flow
//!
//! ```text
//! session.mat
//!   │
//!   ├─ mat::MatFile::open()   native Level 5 reader (no MATLAB)
//!   └─ parse_mat()            per-trial assembly, fail-fast
//!        │
//!        ├─→ TrialMap<CellsTrial>    frame times × dFoF matrix per trial
//!        ├─→ TrialMap<TrialResult>   offers (nA, nB, leftA) + choice
//!        └─→ TrialMap<EventTiming>   trial_start … trial_end timestamps
//! ```
//!
//! The three maps share one key set (the trial indices, in file order), so
//! `cts[idx]`, `trs[idx]`, and `ets[idx]` always describe the same trial.
//!
//! ## Quick start
//!
//! ```no_run
//! use ecotrial::{parse_mat, EventField, FrameSeq};
//!
//! let (cts, trs, ets) = parse_mat("data/session.mat").unwrap();
//!
//! // One reusable window template: 10 frames starting at offer-on,
//! // resolved per trial against that trial's own event times.
//! let window = FrameSeq::at_event(EventField::OfferOn, 10);
//! for (idx, et) in ets.iter() {
//!     let (span, dfof) = cts[idx].frames(window.resolve(et)).unwrap();
//!     println!("trial {idx}: {} → {} rows, {}", trs[idx], dfof.nrows(), span);
//! }
//! ```
//!
//! ## Querying a single trial
//!
//! [`CellsTrial`] supports two query modes, both returning the
//! frame-aligned time span plus an owned submatrix: a time window
//! (`window(start, stop)`, bounds snapped to the nearest recorded frames)
//! and a frame sequence (`frames(FrameSeq)`, a fixed number of consecutive
//! frames from a start time). See the type-level docs for the snapping and
//! tie rules.
//!
//! All timestamps are [`Time`] values — an `f64` magnitude tagged with a
//! [`TimeUnit`]. Mixed units are auto-converted; `Time::s(1.2)` and
//! `Time::ms(1200.0)` compare equal.

pub mod cells;
pub mod collection;
pub mod error;
pub mod import;
pub mod mat;
pub mod timing;
pub mod trial;
pub mod units;

// ── Crate-root re-exports ─────────────────────────────────────────────────
//
// Everything a downstream user is likely to need is available directly as
// `ecotrial::Foo` without having to know the internal module layout.

pub use cells::{CellsTrial, FrameSeq};
pub use collection::TrialMap;
pub use error::{Error, Result};
pub use import::{
    assemble, parse_mat, parse_mat_with, positive_cells, ImportOptions, TrialData,
    POSITIVE_CELLS_VAR,
};
pub use mat::{MatFile, MatVar};
pub use timing::{EventField, EventTiming};
pub use trial::{Choice, TrialResult, TrialType};
pub use units::{Time, TimeSpan, TimeUnit};
