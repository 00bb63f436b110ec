//! MAT-file (Level 5) reader.
//!
//! Reads the legacy binary `.mat` container produced by MATLAB and used by
//! the acquisition rigs to export trial data. The file is read once, in
//! full, and parsed from the in-memory buffer; the handle is released on
//! every exit path including parse failure.
//!
//! Supported subset, bounded honestly:
//! - little-endian, uncompressed Level 5 files (`save -v6`);
//! - numeric arrays of any integer/float element type, widened to `f64`
//!   with column-major dimensions preserved;
//! - cell arrays of the above (arbitrarily nested).
//!
//! Big-endian and Level 4 files, compressed (v7+) elements, and complex
//! variables are rejected with descriptive errors. Char/struct/sparse
//! variables are retained as opaque [`MatVar::Other`] entries so their
//! presence never breaks an import that does not need them.
//!
//! # Quick start
//! ```no_run
//! use ecotrial::mat::MatFile;
//!
//! let mat = MatFile::open("data/session.mat").unwrap();
//! let (dims, values) = mat.require("nA").unwrap().numeric().unwrap();
//! println!("{} offers, first = {}", dims.iter().product::<usize>(), values[0]);
//! ```
pub mod constants;
pub mod element;

use std::path::Path;

use log::debug;
use ndarray::{Array2, ShapeBuilder};

use crate::error::{Error, Result};

use constants::*;
use element::{array_name, dimensions, numeric_f64, read_element};

// ── MatVar ───────────────────────────────────────────────────────────────

/// One variable parsed from a MAT-file.
///
/// Numeric payloads keep MATLAB's column-major element order; use
/// [`MatVar::to_matrix`] to reinterpret as a 2-D array.
#[derive(Debug, Clone, PartialEq)]
pub enum MatVar {
    Numeric { dims: Vec<usize>, data: Vec<f64> },
    Cells { dims: Vec<usize>, elems: Vec<MatVar> },
    /// A class this reader does not decode (char, struct, sparse, …).
    Other { class: u32, dims: Vec<usize> },
}

impl MatVar {
    pub fn dims(&self) -> &[usize] {
        match self {
            MatVar::Numeric { dims, .. }
            | MatVar::Cells { dims, .. }
            | MatVar::Other { dims, .. } => dims,
        }
    }

    /// Total element count (product of extents).
    pub fn len(&self) -> usize {
        self.dims().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensions and flat column-major data, for numeric variables.
    pub fn numeric(&self) -> Option<(&[usize], &[f64])> {
        match self {
            MatVar::Numeric { dims, data } => Some((dims, data)),
            _ => None,
        }
    }

    /// Flat data of a numeric vector (at most one extent greater than one).
    pub fn vector(&self) -> Option<&[f64]> {
        match self {
            MatVar::Numeric { dims, data }
                if dims.iter().filter(|&&d| d > 1).count() <= 1 =>
            {
                Some(data)
            }
            _ => None,
        }
    }

    /// Cell contents in column-major order, for cell variables.
    pub fn cells(&self) -> Option<&[MatVar]> {
        match self {
            MatVar::Cells { elems, .. } => Some(elems),
            _ => None,
        }
    }

    /// Reinterpret a 2-D numeric variable as an `Array2<f64>`.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        match self {
            MatVar::Numeric { dims, data } if dims.len() == 2 => {
                Array2::from_shape_vec((dims[0], dims[1]).f(), data.clone())
                    .map_err(|e| Error::Format(format!("matrix shape mismatch: {e}")))
            }
            MatVar::Numeric { dims, .. } => Err(Error::Format(format!(
                "expected a 2-D numeric array, got {} dimensions",
                dims.len()
            ))),
            other => Err(Error::Format(format!(
                "expected a numeric array, got a {} variable",
                other.kind_name()
            ))),
        }
    }

    /// Short class description for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            MatVar::Numeric { .. } => "numeric",
            MatVar::Cells { .. } => "cell",
            MatVar::Other { class, .. } => class_name(*class),
        }
    }
}

// ── MatFile ──────────────────────────────────────────────────────────────

/// A fully parsed MAT-file: named variables in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct MatFile {
    vars: Vec<(String, MatVar)>,
}

impl MatFile {
    /// Read and parse the file at `path` in one scoped read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<MatFile> {
        let bytes = std::fs::read(path.as_ref())?;
        let mat = MatFile::from_bytes(&bytes)?;
        debug!(
            "parsed {} with {} variables",
            path.as_ref().display(),
            mat.vars.len()
        );
        Ok(mat)
    }

    /// Parse an in-memory MAT-file image.
    pub fn from_bytes(bytes: &[u8]) -> Result<MatFile> {
        check_header(bytes)?;
        let mut vars = Vec::new();
        let mut pos = HEADER_LEN;
        while pos < bytes.len() {
            let (el, next) = read_element(bytes, pos)?;
            match el.dtype {
                MI_MATRIX => {
                    let (name, var) = parse_matrix(el.data)?;
                    vars.push((name, var));
                }
                MI_COMPRESSED => {
                    return Err(Error::Format(
                        "compressed element (MATLAB v7+); re-save the file with `save -v6`"
                            .into(),
                    ))
                }
                other => {
                    return Err(Error::Format(format!(
                        "unexpected top-level element type {other} at offset {pos}"
                    )))
                }
            }
            pos = next;
        }
        Ok(MatFile { vars })
    }

    pub fn get(&self, name: &str) -> Option<&MatVar> {
        self.vars.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Like [`MatFile::get`], but a missing variable is an error.
    pub fn require(&self, name: &str) -> Result<&MatVar> {
        self.get(name)
            .ok_or_else(|| Error::MissingVariable(name.to_string()))
    }

    /// Variable names in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

// ── Header ───────────────────────────────────────────────────────────────

fn check_header(bytes: &[u8]) -> Result<()> {
    if bytes.len() < HEADER_LEN {
        return Err(Error::Format(format!(
            "file holds {} bytes, shorter than the {HEADER_LEN}-byte MAT header",
            bytes.len()
        )));
    }
    if bytes[..4] == [0, 0, 0, 0] {
        // Level 4 files begin with a numeric type code, typically zero.
        return Err(Error::Format(
            "legacy Level 4 MAT-file; re-save as Level 5 (`save -v6`)".into(),
        ));
    }
    let endian: [u8; 2] = bytes[ENDIAN_OFFSET..ENDIAN_OFFSET + 2].try_into().unwrap();
    if endian == ENDIAN_BE {
        return Err(Error::Format("big-endian MAT-file is not supported".into()));
    }
    if endian != ENDIAN_LE {
        return Err(Error::Format(format!(
            "bad endian indicator {:?} (not a Level 5 MAT-file?)",
            endian
        )));
    }
    let version = u16::from_le_bytes(bytes[VERSION_OFFSET..VERSION_OFFSET + 2].try_into().unwrap());
    if version != 0x0100 {
        return Err(Error::Format(format!(
            "unsupported MAT version {version:#06x} (expected 0x0100)"
        )));
    }
    Ok(())
}

// ── miMATRIX parsing ─────────────────────────────────────────────────────

/// Parse one `miMATRIX` payload into `(name, variable)`.
fn parse_matrix(bytes: &[u8]) -> Result<(String, MatVar)> {
    let (flags_el, pos) = read_element(bytes, 0)?;
    if flags_el.dtype != MI_UINT32 || flags_el.data.len() < 8 {
        return Err(Error::Format("malformed array-flags subelement".into()));
    }
    let word = u32::from_le_bytes(flags_el.data[0..4].try_into().unwrap());
    let class = word & 0xFF;
    if word & FLAG_COMPLEX != 0 {
        return Err(Error::Format("complex variables are not supported".into()));
    }

    let (dims_el, pos) = read_element(bytes, pos)?;
    let dims = dimensions(&dims_el)?;

    let (name_el, pos) = read_element(bytes, pos)?;
    let name = array_name(&name_el)?;

    let count: usize = dims.iter().product();
    let var = match class {
        MX_DOUBLE_CLASS | MX_SINGLE_CLASS | MX_INT8_CLASS | MX_UINT8_CLASS
        | MX_INT16_CLASS | MX_UINT16_CLASS | MX_INT32_CLASS | MX_UINT32_CLASS
        | MX_INT64_CLASS | MX_UINT64_CLASS => {
            let (data_el, _) = read_element(bytes, pos)?;
            let data = numeric_f64(&data_el)?;
            if data.len() != count {
                return Err(Error::Format(format!(
                    "variable `{name}`: {} values for dimensions {dims:?}",
                    data.len()
                )));
            }
            MatVar::Numeric { dims, data }
        }
        MX_CELL_CLASS => {
            let mut elems = Vec::with_capacity(count);
            let mut pos = pos;
            while pos < bytes.len() {
                let (cell_el, next) = read_element(bytes, pos)?;
                if cell_el.dtype != MI_MATRIX {
                    return Err(Error::Format(format!(
                        "variable `{name}`: cell contents have element type {} \
                         (expected miMATRIX)",
                        cell_el.dtype
                    )));
                }
                let (_, var) = parse_matrix(cell_el.data)?;
                elems.push(var);
                pos = next;
            }
            if elems.len() != count {
                return Err(Error::Format(format!(
                    "variable `{name}`: {} cells for dimensions {dims:?}",
                    elems.len()
                )));
            }
            MatVar::Cells { dims, elems }
        }
        other => MatVar::Other { class: other, dims },
    };
    Ok((name, var))
}
