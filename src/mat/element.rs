//! MAT data-element I/O.
//!
//! An element is the smallest structural unit of a Level 5 file:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  type : u32  │  size : u32  │   ← 8-byte tag
//! ├─────────────────────────────────────────────┤
//! │  <size bytes of payload, padded to 8>       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Payloads of 1–4 bytes may instead use the *small data element* format:
//! the tag's upper 16 bits carry the size, the lower 16 the type, and the
//! payload sits in the tag's remaining 4 bytes (8 bytes total, no padding).
//!
//! The whole file is read into memory up front, so these readers work on
//! byte slices and offsets rather than a seekable stream.
use crate::error::{Error, Result};

use super::constants::*;

/// One decoded data element, borrowing its payload from the file buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    pub dtype: u32,
    pub data: &'a [u8],
}

/// Decode the element starting at `pos`; returns it together with the
/// offset of the next element (payload padding already skipped).
pub fn read_element(bytes: &[u8], pos: usize) -> Result<(Element<'_>, usize)> {
    let tag = bytes
        .get(pos..pos + 8)
        .ok_or_else(|| Error::Format(format!("truncated element tag at offset {pos}")))?;
    let word = u32::from_le_bytes(tag[0..4].try_into().unwrap());

    // Small data element: size packed into the tag's upper 16 bits.
    if word >> 16 != 0 {
        let dtype = word & 0xFFFF;
        let size = (word >> 16) as usize;
        if size > 4 {
            return Err(Error::Format(format!(
                "small element at offset {pos} claims {size} bytes (max 4)"
            )));
        }
        return Ok((Element { dtype, data: &tag[4..4 + size] }, pos + 8));
    }

    let dtype = word;
    let size = u32::from_le_bytes(tag[4..8].try_into().unwrap()) as usize;
    let data = bytes.get(pos + 8..pos + 8 + size).ok_or_else(|| {
        Error::Format(format!(
            "element at offset {pos} claims {size} payload bytes beyond end of file"
        ))
    })?;
    // Payloads are padded to the next 8-byte boundary.
    let next = pos + 8 + size.div_ceil(8) * 8;
    Ok((Element { dtype, data }, next))
}

/// Widen any numeric element payload to `f64`, little-endian.
///
/// MATLAB stores arrays with the smallest type that preserves the values
/// (a double array of small integers may arrive as `miUINT8`), so the
/// element type here is independent of the array class.
pub fn numeric_f64(el: &Element<'_>) -> Result<Vec<f64>> {
    fn exact<const W: usize>(el: &Element<'_>) -> Result<Vec<[u8; W]>> {
        if el.data.len() % W != 0 {
            return Err(Error::Format(format!(
                "numeric element payload of {} bytes is not a multiple of {W}",
                el.data.len()
            )));
        }
        Ok(el.data.chunks_exact(W).map(|c| c.try_into().unwrap()).collect())
    }

    Ok(match el.dtype {
        MI_INT8 => el.data.iter().map(|&b| b as i8 as f64).collect(),
        MI_UINT8 => el.data.iter().map(|&b| b as f64).collect(),
        MI_INT16 => exact::<2>(el)?.into_iter().map(|b| i16::from_le_bytes(b) as f64).collect(),
        MI_UINT16 => exact::<2>(el)?.into_iter().map(|b| u16::from_le_bytes(b) as f64).collect(),
        MI_INT32 => exact::<4>(el)?.into_iter().map(|b| i32::from_le_bytes(b) as f64).collect(),
        MI_UINT32 => exact::<4>(el)?.into_iter().map(|b| u32::from_le_bytes(b) as f64).collect(),
        MI_SINGLE => exact::<4>(el)?.into_iter().map(|b| f32::from_le_bytes(b) as f64).collect(),
        MI_DOUBLE => exact::<8>(el)?.into_iter().map(f64::from_le_bytes).collect(),
        MI_INT64 => exact::<8>(el)?.into_iter().map(|b| i64::from_le_bytes(b) as f64).collect(),
        MI_UINT64 => exact::<8>(el)?.into_iter().map(|b| u64::from_le_bytes(b) as f64).collect(),
        other => {
            return Err(Error::Format(format!(
                "element type {other} is not numeric"
            )))
        }
    })
}

/// Decode an array-name subelement (`miINT8`, Latin-1, possibly empty).
pub fn array_name(el: &Element<'_>) -> Result<String> {
    if el.dtype != MI_INT8 {
        return Err(Error::Format(format!(
            "array name has element type {} (expected miINT8)",
            el.dtype
        )));
    }
    Ok(el.data.iter().map(|&b| b as char).collect())
}

/// Decode a dimensions subelement (`miINT32`) into usize extents.
pub fn dimensions(el: &Element<'_>) -> Result<Vec<usize>> {
    if el.dtype != MI_INT32 {
        return Err(Error::Format(format!(
            "dimensions array has element type {} (expected miINT32)",
            el.dtype
        )));
    }
    if el.data.len() % 4 != 0 {
        return Err(Error::Format("dimensions payload is not a multiple of 4 bytes".into()));
    }
    el.data
        .chunks_exact(4)
        .map(|c| {
            let d = i32::from_le_bytes(c.try_into().unwrap());
            usize::try_from(d)
                .map_err(|_| Error::Format(format!("negative array dimension {d}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_element(dtype: u32, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&dtype.to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        while out.len() % 8 != 0 {
            out.push(0);
        }
        out
    }

    fn small_element(dtype: u32, payload: &[u8]) -> Vec<u8> {
        assert!(payload.len() <= 4);
        let word = dtype | ((payload.len() as u32) << 16);
        let mut out = word.to_le_bytes().to_vec();
        out.extend_from_slice(payload);
        out.resize(8, 0);
        out
    }

    #[test]
    fn full_element_round_trip_with_padding() {
        let mut buf = full_element(MI_DOUBLE, &42.5_f64.to_le_bytes());
        buf.extend(full_element(MI_INT32, &7_i32.to_le_bytes()));

        let (el, next) = read_element(&buf, 0).unwrap();
        assert_eq!(el.dtype, MI_DOUBLE);
        assert_eq!(numeric_f64(&el).unwrap(), vec![42.5]);
        assert_eq!(next, 16);

        let (el, _) = read_element(&buf, next).unwrap();
        assert_eq!(numeric_f64(&el).unwrap(), vec![7.0]);
    }

    #[test]
    fn small_element_round_trip() {
        let buf = small_element(MI_UINT16, &[0x39, 0x05]); // 1337
        let (el, next) = read_element(&buf, 0).unwrap();
        assert_eq!(el.dtype, MI_UINT16);
        assert_eq!(next, 8);
        assert_eq!(numeric_f64(&el).unwrap(), vec![1337.0]);
    }

    #[test]
    fn payload_pads_to_eight() {
        // 4-byte payload in full format → 8 tag + 4 data + 4 pad.
        let buf = full_element(MI_SINGLE, &1.5_f32.to_le_bytes());
        let (_, next) = read_element(&buf, 0).unwrap();
        assert_eq!(next, 16);
    }

    #[test]
    fn truncated_tag_and_payload_rejected() {
        assert!(matches!(read_element(&[0u8; 4], 0), Err(Error::Format(_))));

        let mut buf = Vec::new();
        buf.extend_from_slice(&MI_DOUBLE.to_le_bytes());
        buf.extend_from_slice(&64_u32.to_le_bytes()); // claims 64 bytes
        buf.extend_from_slice(&[0u8; 8]); // provides 8
        assert!(matches!(read_element(&buf, 0), Err(Error::Format(_))));
    }

    #[test]
    fn widening_covers_integer_types() {
        let buf = full_element(MI_INT16, &(-7_i16).to_le_bytes());
        let (el, _) = read_element(&buf, 0).unwrap();
        assert_eq!(numeric_f64(&el).unwrap(), vec![-7.0]);

        let buf = full_element(MI_UINT8, &[200]);
        let (el, _) = read_element(&buf, 0).unwrap();
        assert_eq!(numeric_f64(&el).unwrap(), vec![200.0]);
    }

    #[test]
    fn name_and_dimensions_decode() {
        let buf = full_element(MI_INT8, b"dFoF");
        let (el, _) = read_element(&buf, 0).unwrap();
        assert_eq!(array_name(&el).unwrap(), "dFoF");

        let mut dims = Vec::new();
        dims.extend_from_slice(&5_i32.to_le_bytes());
        dims.extend_from_slice(&2_i32.to_le_bytes());
        let buf = full_element(MI_INT32, &dims);
        let (el, _) = read_element(&buf, 0).unwrap();
        assert_eq!(dimensions(&el).unwrap(), vec![5, 2]);
    }
}
