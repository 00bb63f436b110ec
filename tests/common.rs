/// Shared helpers: synthesize little-endian Level 5 MAT-file bytes for the
/// integration suite, the same way the unit tests of the element reader
/// synthesize single elements.
use std::io::Write;

use ecotrial::mat::constants::*;
use tempfile::NamedTempFile;

// ── Low-level byte builders ──────────────────────────────────────────────

#[allow(unused)]
pub fn header() -> Vec<u8> {
    let mut h = vec![b' '; HEADER_LEN];
    let text = b"MATLAB 5.0 MAT-file, ecotrial integration fixture";
    h[..text.len()].copy_from_slice(text);
    h[VERSION_OFFSET..VERSION_OFFSET + 2].copy_from_slice(&0x0100_u16.to_le_bytes());
    h[ENDIAN_OFFSET..ENDIAN_OFFSET + 2].copy_from_slice(&ENDIAN_LE);
    h
}

#[allow(unused)]
pub fn full_element(dtype: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&dtype.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    while out.len() % 8 != 0 {
        out.push(0);
    }
    out
}

fn doubles(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn matrix_payload(name: &str, class: u32, dims: &[i32], data_el: &[u8]) -> Vec<u8> {
    let mut flags = Vec::new();
    flags.extend_from_slice(&class.to_le_bytes());
    flags.extend_from_slice(&0_u32.to_le_bytes());
    let mut dim_bytes = Vec::new();
    for &d in dims {
        dim_bytes.extend_from_slice(&d.to_le_bytes());
    }
    let mut out = full_element(MI_UINT32, &flags);
    out.extend(full_element(MI_INT32, &dim_bytes));
    out.extend(full_element(MI_INT8, name.as_bytes()));
    out.extend_from_slice(data_el);
    out
}

/// Complete `miMATRIX` element holding a double array (column-major data).
#[allow(unused)]
pub fn numeric_var(name: &str, rows: usize, cols: usize, data: &[f64]) -> Vec<u8> {
    assert_eq!(data.len(), rows * cols, "fixture data/dims mismatch");
    let payload = matrix_payload(
        name,
        MX_DOUBLE_CLASS,
        &[rows as i32, cols as i32],
        &full_element(MI_DOUBLE, &doubles(data)),
    );
    full_element(MI_MATRIX, &payload)
}

/// Complete `miMATRIX` element holding a 1×N cell array of double matrices.
#[allow(unused)]
pub fn cell_var(name: &str, items: &[(usize, usize, Vec<f64>)]) -> Vec<u8> {
    let mut contents = Vec::new();
    for (rows, cols, data) in items {
        contents.extend(numeric_var("", *rows, *cols, data));
    }
    let mut flags = Vec::new();
    flags.extend_from_slice(&MX_CELL_CLASS.to_le_bytes());
    flags.extend_from_slice(&0_u32.to_le_bytes());
    let mut dim_bytes = Vec::new();
    for d in [1_i32, items.len() as i32] {
        dim_bytes.extend_from_slice(&d.to_le_bytes());
    }
    let mut payload = full_element(MI_UINT32, &flags);
    payload.extend(full_element(MI_INT32, &dim_bytes));
    payload.extend(full_element(MI_INT8, name.as_bytes()));
    payload.extend(contents);
    full_element(MI_MATRIX, &payload)
}

/// A char variable, which the reader retains opaquely.
#[allow(unused)]
pub fn char_var(name: &str, text: &str) -> Vec<u8> {
    let payload = matrix_payload(
        name,
        MX_CHAR_CLASS,
        &[1, text.len() as i32],
        &full_element(MI_UINT8, text.as_bytes()),
    );
    full_element(MI_MATRIX, &payload)
}

/// Write fixture bytes to a real temp file (kept alive by the handle).
#[allow(unused)]
pub fn write_tmp(bytes: &[u8]) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("create temp file");
    f.write_all(bytes).expect("write fixture");
    f.flush().expect("flush fixture");
    f
}

// ── Session fixture ──────────────────────────────────────────────────────

/// One trial's worth of raw variables.
#[derive(Debug, Clone)]
pub struct TrialSpec {
    pub index: f64,
    pub n_a: f64,
    pub n_b: f64,
    pub left_a: f64,
    pub chose_a: f64,
    /// trial_start, offer_on, offer_off, go, choice, trial_end (ms).
    pub events: [f64; 6],
    /// Frame times (ms), strictly increasing.
    pub t: Vec<f64>,
    pub n_cells: usize,
}

/// A whole session file; mutate the specs to produce malformed variants.
#[derive(Debug, Clone)]
pub struct Session {
    pub trials: Vec<TrialSpec>,
    pub positive_cells: Option<Vec<f64>>,
}

/// Deterministic dFoF value for trial `index`, row `row`, cell `col`.
#[allow(unused)]
pub fn dfof_value(index: f64, row: usize, col: usize) -> f64 {
    index * 1000.0 + (row * 10) as f64 + col as f64
}

impl Session {
    /// Canonical two-trial fixture with indices `{3, 201}`, in that order.
    pub fn two_trials() -> Session {
        Session {
            trials: vec![
                TrialSpec {
                    index: 3.0,
                    n_a: 0.0,
                    n_b: 2.0,
                    left_a: 1.0,
                    chose_a: 1.0,
                    events: [0.0, 2003.0, 4820.0, 5213.0, 5825.0, 7500.0],
                    t: (0..7).map(|i| 500.0 * i as f64).collect(),
                    n_cells: 2,
                },
                TrialSpec {
                    index: 201.0,
                    n_a: 2.0,
                    n_b: 0.0,
                    left_a: 0.0,
                    chose_a: 1.0,
                    events: [0.0, 2002.0, 4812.0, 5210.0, 5600.0, 7400.0],
                    t: (0..6).map(|i| 500.0 * i as f64).collect(),
                    n_cells: 2,
                },
            ],
            positive_cells: Some(vec![1.0, 2.0]),
        }
    }

    /// Serialize every variable of the vocabulary.
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes_without("")
    }

    /// Serialize, omitting the variable named `skip` (for missing-field
    /// tests).
    pub fn bytes_without(&self, skip: &str) -> Vec<u8> {
        let n = self.trials.len();
        let mut buf = header();

        let push = |name: &str, element: Vec<u8>, buf: &mut Vec<u8>| {
            if name != skip {
                buf.extend(element);
            }
        };

        let scalars = |f: &dyn Fn(&TrialSpec) -> f64| -> Vec<f64> {
            self.trials.iter().map(f).collect()
        };

        push("trialindex", numeric_var("trialindex", 1, n, &scalars(&|t| t.index)), &mut buf);
        push("nA", numeric_var("nA", 1, n, &scalars(&|t| t.n_a)), &mut buf);
        push("nB", numeric_var("nB", 1, n, &scalars(&|t| t.n_b)), &mut buf);
        push("leftA", numeric_var("leftA", 1, n, &scalars(&|t| t.left_a)), &mut buf);
        push("choseA", numeric_var("choseA", 1, n, &scalars(&|t| t.chose_a)), &mut buf);

        for (k, name) in ["trial_start", "offer_on", "offer_off", "go", "choice", "trial_end"]
            .into_iter()
            .enumerate()
        {
            push(name, numeric_var(name, 1, n, &scalars(&|t| t.events[k])), &mut buf);
        }

        let frames: Vec<(usize, usize, Vec<f64>)> = self
            .trials
            .iter()
            .map(|t| (1, t.t.len(), t.t.clone()))
            .collect();
        push("frametimes", cell_var("frametimes", &frames), &mut buf);

        let dfof: Vec<(usize, usize, Vec<f64>)> = self
            .trials
            .iter()
            .map(|t| {
                let rows = t.t.len();
                // Column-major, as MATLAB stores it.
                let mut data = Vec::with_capacity(rows * t.n_cells);
                for col in 0..t.n_cells {
                    for row in 0..rows {
                        data.push(dfof_value(t.index, row, col));
                    }
                }
                (rows, t.n_cells, data)
            })
            .collect();
        push("dFoF", cell_var("dFoF", &dfof), &mut buf);

        if let Some(cells) = &self.positive_cells {
            push(
                "idx_positive_cells",
                numeric_var("idx_positive_cells", 1, cells.len(), cells),
                &mut buf,
            );
        }

        buf
    }
}
