// src/lib.rs
// ============================================================================
// FITSTOOLS - Verificador de IMPHTTAB y utilidades FITS
// ============================================================================

pub mod compare;
pub mod fits;
pub mod impht;
pub mod tools;

// Re-exports principales
pub use compare::{compare_files, CompareError, CompareOptions};
pub use fits::{FitsError, FitsFile, Header, HeaderValue, Row, Value};
pub use impht::{
    check_extension, check_file, check_files, CheckError, CheckOptions, ExtensionReport, FileReport, Finding,
    FindingKind, MalformedRowError, Outcome,
};
