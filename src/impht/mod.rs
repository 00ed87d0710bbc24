// src/impht/mod.rs
// ============================================================================
// IMPHTTAB CHECKER - Consistencia de tablas de fotometría
// ============================================================================
//
// Orden de ejecución por archivo:
//
//   1. Keywords obligatorias del header primario   → findings
//   2. NEXTEND / PARNUM                             → fatal si faltan
//   3. NEXTEND vs extensiones reales                → finding
//   4. Por extensión, por fila:
//        OBSMODE → longitud de fila → bloques de parámetros
//
// Los findings se acumulan. Los errores fatales sólo cortan su ámbito:
// CheckError el archivo, MalformedRowError la extensión.
//
// ============================================================================

pub mod finding;
pub mod header;
pub mod params;
pub mod report;
pub mod rows;

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::fits::{FitsError, FitsFile, Row, Value};

pub use finding::{ExtensionId, Finding, FindingKind};
pub use header::{TableConfig, REQUIRED_KEYS};
pub use params::SlotLayout;

// ============================================================================
// ERRORES
// ============================================================================

/// Error fatal para un archivo completo
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("missing configuration: header keyword {key} is absent")]
    MissingConfiguration { key: String },

    #[error("invalid configuration: header keyword {key} = {value} ({reason})")]
    InvalidConfiguration {
        key: String,
        value: String,
        reason: &'static str,
    },

    #[error(transparent)]
    Container(#[from] FitsError),
}

/// Fila sin alguna de las columnas que su clasificación exige.
/// Aborta la extensión, no el archivo.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("extension {extension} row {row} is missing columns: {}", .missing.join(", "))]
pub struct MalformedRowError {
    pub extension: ExtensionId,
    pub row: usize,
    pub missing: Vec<String>,
}

// ============================================================================
// OPCIONES Y REPORTES
// ============================================================================

#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Keywords exigidas en el header primario
    pub required_keys: Vec<String>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            required_keys: REQUIRED_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Resultado de una extensión
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionReport {
    pub id: ExtensionId,
    pub rows: usize,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<MalformedRowError>,
}

/// Resultado de un archivo
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<TableConfig>,
    /// Findings del header primario
    pub header: Vec<Finding>,
    pub extensions: Vec<ExtensionReport>,
    #[serde(serialize_with = "serialize_fatal", skip_serializing_if = "Option::is_none")]
    pub fatal: Option<CheckError>,
}

/// Cómo terminó la comprobación de un archivo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Clean,
    Findings,
    Aborted,
}

impl FileReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            config: None,
            header: Vec::new(),
            extensions: Vec::new(),
            fatal: None,
        }
    }

    /// Todos los findings en orden archivo → extensión → fila
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.header
            .iter()
            .chain(self.extensions.iter().flat_map(|e| e.findings.iter()))
    }

    pub fn finding_count(&self) -> usize {
        self.findings().count()
    }

    pub fn outcome(&self) -> Outcome {
        let aborted = self.fatal.is_some() || self.extensions.iter().any(|e| e.aborted.is_some());
        if aborted {
            Outcome::Aborted
        } else if self.finding_count() > 0 {
            Outcome::Findings
        } else {
            Outcome::Clean
        }
    }
}

fn serialize_fatal<S: Serializer>(fatal: &Option<CheckError>, serializer: S) -> Result<S::Ok, S::Error> {
    match fatal {
        Some(err) => serializer.serialize_str(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

// ============================================================================
// ENTRADA
// ============================================================================

/// Comprueba varios archivos en paralelo; el orden del resultado es el de `paths`
pub fn check_files<P: AsRef<Path> + Sync>(paths: &[P], options: &CheckOptions) -> Vec<FileReport> {
    paths
        .par_iter()
        .map(|p| check_file(p.as_ref(), options))
        .collect()
}

/// Comprueba un archivo. Nunca falla: los errores fatales quedan en `fatal`.
pub fn check_file(path: &Path, options: &CheckOptions) -> FileReport {
    log::info!("Checking {}", path.display());

    let mut report = FileReport::new(path);
    if let Err(err) = check_into(path, options, &mut report) {
        log::warn!("{}: {}", path.display(), err);
        report.fatal = Some(err);
    }
    report
}

fn check_into(path: &Path, options: &CheckOptions, report: &mut FileReport) -> Result<(), CheckError> {
    let fits = FitsFile::open(path)?;
    let primary = &fits.primary().header;

    report.header = header::check_header_keys(primary, &options.required_keys);

    let config = header::read_config(primary)?;
    report.config = Some(config);

    let extensions = fits.len() - 1;
    report
        .header
        .extend(header::check_extension_count(&config, extensions));

    for index in 1..fits.len() {
        let hdu = fits.hdu(index)?;
        let id = ExtensionId::new(index, hdu.name());
        let rows = fits.table(index)?.rows()?;
        log::debug!("Extension {}: {} rows", id, rows.len());

        let ext = check_extension(id, &rows, config.num_par);
        if let Some(err) = &ext.aborted {
            log::warn!("{}: {}", path.display(), err);
        }
        report.extensions.push(ext);
    }

    Ok(())
}

/// Comprueba las filas de una extensión
pub fn check_extension(id: ExtensionId, rows: &[Row], num_par: usize) -> ExtensionReport {
    let mut report = ExtensionReport {
        id,
        rows: rows.len(),
        findings: Vec::new(),
        aborted: None,
    };

    if let Err(err) = check_rows(&report.id, rows, num_par, &mut report.findings) {
        report.aborted = Some(err);
    }
    report
}

fn check_rows(
    id: &ExtensionId,
    rows: &[Row],
    num_par: usize,
    findings: &mut Vec<Finding>,
) -> Result<(), MalformedRowError> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let reference = self::rows::reference_prefix(&required_text(first, id, 0, "OBSMODE")?);

    for (index, row) in rows.iter().enumerate() {
        let obsmode = required_text(row, id, index, "OBSMODE")?;
        let datacol = required_text(row, id, index, "DATACOL")?;

        findings.extend(self::rows::check_obsmode(&obsmode, &reference, id, index));
        findings.extend(self::rows::check_row_shape(row, num_par, id, index));

        if datacol.trim().is_empty() {
            findings.push(Finding::at_row(id, index, FindingKind::BlankDataColumn));
            continue;
        }

        let layout = SlotLayout::classify(&datacol, num_par);
        findings.extend(params::check_parameter_block(row, &layout, num_par, id, index)?);
    }

    Ok(())
}

/// Valor textual de OBSMODE / DATACOL; ausentes abortan la extensión
fn required_text(row: &Row, id: &ExtensionId, index: usize, column: &str) -> Result<String, MalformedRowError> {
    match row.get(column) {
        Some(Value::Text(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => {
            let missing = ["OBSMODE", "DATACOL"]
                .into_iter()
                .filter(|c| row.get(c).is_none())
                .map(String::from)
                .collect();
            Err(MalformedRowError {
                extension: id.clone(),
                row: index,
                missing,
            })
        }
    }
}
