// src/fits/error.rs
// ============================================================================
// FITS ERROR - Errores del contenedor (archivo ilegible o corrupto)
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FitsError {
    #[error("Cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Truncated file: need {needed} bytes at offset {offset}, file has {len}")]
    Truncated { offset: usize, needed: usize, len: usize },

    #[error("HDU {hdu}: no END card found")]
    MissingEnd { hdu: usize },

    #[error("HDU {hdu}: missing required keyword {key}")]
    MissingKeyword { hdu: usize, key: String },

    #[error("HDU {hdu}: invalid value for {key}: {value}")]
    InvalidKeyword { hdu: usize, key: String, value: String },

    #[error("HDU {hdu} is not a binary table ({kind})")]
    NotATable { hdu: usize, kind: String },

    #[error("HDU {hdu} is not an image ({kind})")]
    NotAnImage { hdu: usize, kind: String },

    #[error("HDU index {index} out of range (file has {count} HDUs)")]
    NoSuchHdu { index: usize, count: usize },

    #[error("Column {column}: unsupported TFORM '{tform}'")]
    UnsupportedColumn { column: String, tform: String },

    #[error("Column {column}: heap descriptor out of bounds (offset {offset}, count {count})")]
    HeapBounds { column: String, offset: i64, count: i64 },

    #[error("HDU {hdu}: {what} size overflows")]
    SizeOverflow { hdu: usize, what: &'static str },

    #[error("Row {index} out of range (table has {nrows} rows)")]
    NoSuchRow { index: usize, nrows: usize },

    #[error("Unsupported BITPIX: {0}")]
    UnsupportedBitpix(i64),

    #[error("Invalid keyword name '{0}'")]
    InvalidKeywordName(String),
}

pub type FitsResult<T> = std::result::Result<T, FitsError>;
