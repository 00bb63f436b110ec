//! Import entry points: MAT-file → trial collections.
//!
//! [`parse_mat`] reads a session file and assembles three parallel
//! [`TrialMap`]s — cellular responses, behavioral results, event timings —
//! sharing one key set, in file order. Assembly fails fast: malformed data
//! for any trial aborts the import with the trial index and field name,
//! never a silently shortened collection.
//!
//! # Expected variables
//!
//! All per-trial variables have a common length T; times are expressed in
//! [`ImportOptions::time_unit`] (milliseconds unless overridden).
//!
//! | variable      | shape      | meaning                                    |
//! |---------------|------------|--------------------------------------------|
//! | `trialindex`  | 1×T double | positive, unique trial indices             |
//! | `frametimes`  | 1×T cell   | per trial: 1×Nᵢ double, strictly increasing|
//! | `dFoF`        | 1×T cell   | per trial: Nᵢ×C double                     |
//! | `nA`, `nB`    | 1×T double | non-negative integer offer counts          |
//! | `leftA`       | 1×T double | 1 iff option A was presented on the left   |
//! | `choseA`      | 1×T double | 1 = chose A, 0 = chose B, NaN = no choice  |
//! | `trial_start` … `trial_end` | 1×T double | the six event times per trial|
//! | `idx_positive_cells` | 1×P double | optional, see [`positive_cells`]    |
use std::path::Path;

use log::{debug, info};

use crate::cells::CellsTrial;
use crate::collection::TrialMap;
use crate::error::{Error, Result};
use crate::mat::{MatFile, MatVar};
use crate::timing::{EventField, EventTiming};
use crate::trial::{Choice, TrialResult};
use crate::units::{Time, TimeUnit};

/// Optional variable holding one-based indices of "positive" cells.
pub const POSITIVE_CELLS_VAR: &str = "idx_positive_cells";

/// The three parallel collections produced by an import.
pub type TrialData = (TrialMap<CellsTrial>, TrialMap<TrialResult>, TrialMap<EventTiming>);

// ── Options ──────────────────────────────────────────────────────────────

/// Import configuration.
///
/// All fields are `pub`, so non-default setups use struct-update syntax:
///
/// ```
/// use ecotrial::{ImportOptions, TimeUnit};
///
/// let opts = ImportOptions {
///     time_unit: TimeUnit::Seconds, // rig exported times in seconds
///     ..ImportOptions::default()
/// };
/// # let _ = opts;
/// ```
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Unit of every time value stored in the file.
    ///
    /// Default: [`TimeUnit::Milliseconds`].
    pub time_unit: TimeUnit,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions { time_unit: TimeUnit::Milliseconds }
    }
}

// ── Entry points ─────────────────────────────────────────────────────────

/// Parse the trial data in `path`.
///
/// Returns `(cells, results, timings)`, each keyed by trial index in file
/// order; the three maps always share exactly the same key set.
///
/// Declared failure modes: [`Error::Io`] (file not found or unreadable),
/// [`Error::Format`] / [`Error::MissingVariable`] (malformed structure),
/// [`Error::Trial`] (per-trial data rejected).
pub fn parse_mat<P: AsRef<Path>>(path: P) -> Result<TrialData> {
    let mat = MatFile::open(path)?;
    assemble(&mat, &ImportOptions::default())
}

/// Like [`parse_mat`], but also runs `extract` over the raw parsed file and
/// returns its derived value alongside the collections.
///
/// The callback is a pure transform: it receives `&MatFile` (so it cannot
/// mutate the raw structure) and any auxiliary inputs it needs travel in
/// its captures. [`positive_cells`] is the stock example:
///
/// ```no_run
/// use ecotrial::{parse_mat_with, positive_cells};
///
/// let (cts, trs, ets, positive) =
///     parse_mat_with("data/session.mat", positive_cells).unwrap();
/// assert_eq!(cts.indices(), ets.indices());
/// println!("{} positive cells", positive.len());
/// # let _ = trs;
/// ```
pub fn parse_mat_with<P, F, X>(path: P, extract: F) -> Result<(TrialMap<CellsTrial>, TrialMap<TrialResult>, TrialMap<EventTiming>, X)>
where
    P: AsRef<Path>,
    F: FnOnce(&MatFile) -> Result<X>,
{
    let mat = MatFile::open(path)?;
    let (cts, trs, ets) = assemble(&mat, &ImportOptions::default())?;
    let extra = extract(&mat)?;
    Ok((cts, trs, ets, extra))
}

/// Assemble trial collections from an already-parsed file.
///
/// This is the two-step form of [`parse_mat`] for callers that need
/// non-default [`ImportOptions`] or want to run extra extractions over the
/// same [`MatFile`].
pub fn assemble(mat: &MatFile, opts: &ImportOptions) -> Result<TrialData> {
    let indices = numeric_vector(mat, "trialindex")?;
    let n = indices.len();

    let n_a = numeric_vector(mat, "nA")?;
    let n_b = numeric_vector(mat, "nB")?;
    let left_a = numeric_vector(mat, "leftA")?;
    let chose_a = numeric_vector(mat, "choseA")?;
    for (name, values) in [("nA", n_a), ("nB", n_b), ("leftA", left_a), ("choseA", chose_a)] {
        check_len(name, values.len(), n)?;
    }

    let frame_cells = cell_vector(mat, "frametimes")?;
    check_len("frametimes", frame_cells.len(), n)?;
    let dfof_cells = cell_vector(mat, "dFoF")?;
    check_len("dFoF", dfof_cells.len(), n)?;

    let mut event_values: Vec<&[f64]> = Vec::with_capacity(EventField::ALL.len());
    for field in EventField::ALL {
        let values = numeric_vector(mat, field.name())?;
        check_len(field.name(), values.len(), n)?;
        event_values.push(values);
    }

    let mut cts = TrialMap::new();
    let mut trs = TrialMap::new();
    let mut ets = TrialMap::new();
    let mut n_cells: Option<usize> = None;

    for j in 0..n {
        let index = trial_index(indices[j], j)?;
        if cts.contains(index) {
            return Err(Error::Format(format!("duplicate trial index {index}")));
        }

        // Event timing.
        let mut times = [Time::ms(0.0); 6];
        for (k, field) in EventField::ALL.into_iter().enumerate() {
            times[k] = Time::new(event_values[k][j], opts.time_unit);
        }
        let timing = EventTiming::new(times[0], times[1], times[2], times[3], times[4], times[5])
            .map_err(|e| trial_err(index, "events", e))?;

        // Offer and choice.
        let result = TrialResult::new(
            offer_count(n_a[j]).map_err(|r| reason_err(index, "nA", r))?,
            offer_count(n_b[j]).map_err(|r| reason_err(index, "nB", r))?,
            flag(left_a[j]).map_err(|r| reason_err(index, "leftA", r))?,
            choice(chose_a[j]).map_err(|r| reason_err(index, "choseA", r))?,
        );

        // Cellular responses.
        let t: Vec<Time> = frame_cells[j]
            .vector()
            .ok_or_else(|| {
                reason_err(index, "frametimes", format!("not a numeric vector ({})", frame_cells[j].kind_name()))
            })?
            .iter()
            .map(|&v| Time::new(v, opts.time_unit))
            .collect();
        let dfof = dfof_cells[j]
            .to_matrix()
            .map_err(|e| trial_err(index, "dFoF", e))?;
        let cells = CellsTrial::new(&t, dfof).map_err(|e| trial_err(index, "dFoF", e))?;

        match n_cells {
            None => n_cells = Some(cells.n_cells()),
            Some(c) if c != cells.n_cells() => {
                return Err(reason_err(
                    index,
                    "dFoF",
                    format!("{} cells, but earlier trials recorded {c}", cells.n_cells()),
                ))
            }
            Some(_) => {}
        }

        debug!("trial {index}: {cells}, {result}");
        cts.insert(index, cells);
        trs.insert(index, result);
        ets.insert(index, timing);
    }

    info!("imported {n} trials ({} cells per trial)", n_cells.unwrap_or(0));
    Ok((cts, trs, ets))
}

/// Extract the vector of positive-cell indices from the raw file.
///
/// The file stores MATLAB's one-based indices; the returned values are
/// zero-based column indices into each trial's dFoF matrix.
pub fn positive_cells(mat: &MatFile) -> Result<Vec<usize>> {
    let values = numeric_vector(mat, POSITIVE_CELLS_VAR)?;
    values
        .iter()
        .map(|&v| {
            if v.is_finite() && v.fract() == 0.0 && v >= 1.0 {
                Ok(v as usize - 1)
            } else {
                Err(Error::Format(format!(
                    "`{POSITIVE_CELLS_VAR}` entry {v} is not a positive integer"
                )))
            }
        })
        .collect()
}

// ── Field decoding helpers ───────────────────────────────────────────────

fn numeric_vector<'a>(mat: &'a MatFile, name: &'static str) -> Result<&'a [f64]> {
    let var = mat.require(name)?;
    var.vector().ok_or_else(|| {
        Error::Format(format!(
            "variable `{name}` is not a numeric vector ({} array, dims {:?})",
            var.kind_name(),
            var.dims()
        ))
    })
}

fn cell_vector<'a>(mat: &'a MatFile, name: &'static str) -> Result<&'a [MatVar]> {
    let var = mat.require(name)?;
    var.cells().ok_or_else(|| {
        Error::Format(format!(
            "variable `{name}` is not a cell array ({} array, dims {:?})",
            var.kind_name(),
            var.dims()
        ))
    })
}

fn check_len(name: &str, len: usize, expected: usize) -> Result<()> {
    if len != expected {
        return Err(Error::Format(format!(
            "variable `{name}` has {len} entries, expected {expected} (length of `trialindex`)"
        )));
    }
    Ok(())
}

fn trial_index(value: f64, position: usize) -> Result<i64> {
    if value.is_finite() && value.fract() == 0.0 && value >= 1.0 {
        Ok(value as i64)
    } else {
        Err(Error::Format(format!(
            "`trialindex` entry {position} is not a positive integer (got {value})"
        )))
    }
}

fn offer_count(value: f64) -> std::result::Result<u32, String> {
    if value.is_finite() && value.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&value) {
        Ok(value as u32)
    } else {
        Err(format!("not a non-negative integer count (got {value})"))
    }
}

fn flag(value: f64) -> std::result::Result<bool, String> {
    match value {
        v if v == 0.0 => Ok(false),
        v if v == 1.0 => Ok(true),
        v => Err(format!("not a 0/1 flag (got {v})")),
    }
}

fn choice(value: f64) -> std::result::Result<Choice, String> {
    if value.is_nan() {
        Ok(Choice::NoChoice)
    } else if value == 1.0 {
        Ok(Choice::A)
    } else if value == 0.0 {
        Ok(Choice::B)
    } else {
        Err(format!("not 0, 1, or NaN (got {value})"))
    }
}

/// Wrap a nested error as a per-trial parse failure, unwrapping the
/// validation prefix so messages read naturally.
fn trial_err(index: i64, field: &'static str, source: Error) -> Error {
    let reason = match source {
        Error::Validation(msg) | Error::Format(msg) => msg,
        other => other.to_string(),
    };
    Error::Trial { index, field, reason }
}

fn reason_err(index: i64, field: &'static str, reason: String) -> Error {
    Error::Trial { index, field, reason }
}
