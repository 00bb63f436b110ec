//! MAT-file Level 5 format constants.
//!
//! Names follow the MathWorks "MAT-File Format" document (`mi*` data types,
//! `mx*` array classes) so the reader can be cross-referenced with the
//! published layout.
//!
//! A Level 5 file is a 128-byte header followed by a flat sequence of
//! **data elements**, each an 8-byte tag (`u32` type, `u32` byte count)
//! plus payload, padded to an 8-byte boundary. Payloads of 1–4 bytes may
//! use the *small data element* format, packing type, size, and data into
//! the 8 tag bytes. A `miMATRIX` element nests further elements (array
//! flags, dimensions, name, data) inside its payload.

#![allow(dead_code)]

/// Total header length: 116 bytes of text, 8 reserved, version, endian tag.
pub const HEADER_LEN: usize = 128;
/// Byte offset of the u16 version field (0x0100 for Level 5).
pub const VERSION_OFFSET: usize = 124;
/// Byte offset of the 2-byte endian indicator.
pub const ENDIAN_OFFSET: usize = 126;
/// Endian indicator as written by a little-endian producer.
pub const ENDIAN_LE: [u8; 2] = *b"IM";
/// Endian indicator as written by a big-endian producer.
pub const ENDIAN_BE: [u8; 2] = *b"MI";

// ── Data element types (`mi*`) ────────────────────────────────────────────

pub const MI_INT8: u32 = 1;
pub const MI_UINT8: u32 = 2;
pub const MI_INT16: u32 = 3;
pub const MI_UINT16: u32 = 4;
pub const MI_INT32: u32 = 5;
pub const MI_UINT32: u32 = 6;
pub const MI_SINGLE: u32 = 7;
pub const MI_DOUBLE: u32 = 9;
pub const MI_INT64: u32 = 12;
pub const MI_UINT64: u32 = 13;
/// Container element holding one named array.
pub const MI_MATRIX: u32 = 14;
/// zlib-deflated element (MATLAB v7+ default); rejected by this reader.
pub const MI_COMPRESSED: u32 = 15;
pub const MI_UTF8: u32 = 16;
pub const MI_UTF16: u32 = 17;
pub const MI_UTF32: u32 = 18;

// ── Array classes (`mx*`, first byte of the array-flags subelement) ───────

pub const MX_CELL_CLASS: u32 = 1;
pub const MX_STRUCT_CLASS: u32 = 2;
pub const MX_OBJECT_CLASS: u32 = 3;
pub const MX_CHAR_CLASS: u32 = 4;
pub const MX_SPARSE_CLASS: u32 = 5;
pub const MX_DOUBLE_CLASS: u32 = 6;
pub const MX_SINGLE_CLASS: u32 = 7;
pub const MX_INT8_CLASS: u32 = 8;
pub const MX_UINT8_CLASS: u32 = 9;
pub const MX_INT16_CLASS: u32 = 10;
pub const MX_UINT16_CLASS: u32 = 11;
pub const MX_INT32_CLASS: u32 = 12;
pub const MX_UINT32_CLASS: u32 = 13;
pub const MX_INT64_CLASS: u32 = 14;
pub const MX_UINT64_CLASS: u32 = 15;

/// Complex-data bit in the array-flags byte.
pub const FLAG_COMPLEX: u32 = 0x0800;
/// Logical-array bit in the array-flags byte.
pub const FLAG_LOGICAL: u32 = 0x0200;

/// Human-readable name of an array class, for error messages.
pub fn class_name(class: u32) -> &'static str {
    match class {
        MX_CELL_CLASS => "cell",
        MX_STRUCT_CLASS => "struct",
        MX_OBJECT_CLASS => "object",
        MX_CHAR_CLASS => "char",
        MX_SPARSE_CLASS => "sparse",
        MX_DOUBLE_CLASS => "double",
        MX_SINGLE_CLASS => "single",
        MX_INT8_CLASS => "int8",
        MX_UINT8_CLASS => "uint8",
        MX_INT16_CLASS => "int16",
        MX_UINT16_CLASS => "uint16",
        MX_INT32_CLASS => "int32",
        MX_UINT32_CLASS => "uint32",
        MX_INT64_CLASS => "int64",
        MX_UINT64_CLASS => "uint64",
        _ => "unknown",
    }
}
