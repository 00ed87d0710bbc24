// src/impht/header.rs
// ============================================================================
// HEADER VALIDATOR - Keywords obligatorias del header primario de IMPHTTAB
// ============================================================================

use serde::Serialize;

use super::finding::{Finding, FindingKind};
use super::CheckError;
use crate::fits::Header;

/// Keywords que todo IMPHTTAB debe tener en el header primario
pub const REQUIRED_KEYS: &[&str] = &[
    "SIMPLE",
    "BITPIX",
    "NAXIS",
    "EXTEND",
    "DATE",
    "FILENAME",
    "FILETYPE",
    "NEXTEND",
    "PHOTZPT",
    "PARNUM",
    "DBTABLE",
    "INSTRUME",
    "DETECTOR",
    "SYNSWVER",
    "MKTABVER",
    "GRAPHTAB",
    "COMPTAB",
    "USEAFTER",
    "PEDIGREE",
    "DESCRIP",
];

/// Configuración leída una vez del header primario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableConfig {
    /// NEXTEND
    pub num_ext: i64,
    /// PARNUM
    pub num_par: usize,
}

/// Reporta cada keyword obligatoria ausente
pub fn check_header_keys<S: AsRef<str>>(header: &Header, required: &[S]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for key in required {
        let key: &str = key.as_ref();
        if !header.contains(key) {
            findings.push(Finding::file(FindingKind::MissingHeaderKey { key: key.to_string() }));
        }
    }
    findings
}

/// Lee NEXTEND y PARNUM; su ausencia es fatal para el archivo
pub fn read_config(header: &Header) -> Result<TableConfig, CheckError> {
    let num_ext = read_int(header, "NEXTEND")?;
    let num_par = read_int(header, "PARNUM")?;

    if num_par < 0 {
        return Err(CheckError::InvalidConfiguration {
            key: "PARNUM".to_string(),
            value: num_par.to_string(),
            reason: "must not be negative",
        });
    }

    Ok(TableConfig {
        num_ext,
        num_par: num_par as usize,
    })
}

fn read_int(header: &Header, key: &str) -> Result<i64, CheckError> {
    let value = header
        .get(key)
        .ok_or_else(|| CheckError::MissingConfiguration { key: key.to_string() })?;

    value.as_int().ok_or_else(|| CheckError::InvalidConfiguration {
        key: key.to_string(),
        value: value.to_string(),
        reason: "not an integer",
    })
}

/// NEXTEND frente al número real de extensiones (sin el primario)
pub fn check_extension_count(config: &TableConfig, actual: usize) -> Option<Finding> {
    if config.num_ext != actual as i64 {
        Some(Finding::file(FindingKind::ExtensionCount {
            declared: config.num_ext,
            actual,
        }))
    } else {
        None
    }
}
