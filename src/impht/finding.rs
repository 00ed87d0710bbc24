// src/impht/finding.rs
// ============================================================================
// FINDINGS - Inconsistencias detectadas (no fatales, se acumulan)
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::fits::Value;

/// Identidad de una extensión: índice en el archivo + EXTNAME
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionId {
    pub index: usize,
    pub name: String,
}

impl ExtensionId {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self { index, name: name.into() }
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.index)
        } else {
            write!(f, "{} ({})", self.index, self.name)
        }
    }
}

/// Tipo de inconsistencia con sus valores esperado/actual
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingKind {
    MissingHeaderKey { key: String },
    ExtensionCount { declared: i64, actual: usize },
    ObsmodePrefix { actual: String, reference: String },
    BlankObsmode,
    RowLength { expected: usize, actual: usize },
    BlankDataColumn,
    UnexpectedZero { column: String },
    ExpectedZero { column: String, actual: Value },
    ExpectedZeroArray { column: String, actual: Value },
    NotAnArray { column: String, actual: Value },
    NotANumber { column: String, actual: Value },
    NotAString { column: String, actual: Value },
    ExpectedBlank { column: String, actual: String },
    UnexpectedBlank { column: String },
    DataLength { column: String, expected: i64, actual: usize },
    ValuesLength { column: String, expected: i64, actual: usize },
}

impl FindingKind {
    /// Columna implicada, si la hay
    pub fn column(&self) -> Option<&str> {
        match self {
            FindingKind::UnexpectedZero { column }
            | FindingKind::ExpectedZero { column, .. }
            | FindingKind::ExpectedZeroArray { column, .. }
            | FindingKind::NotAnArray { column, .. }
            | FindingKind::NotANumber { column, .. }
            | FindingKind::NotAString { column, .. }
            | FindingKind::ExpectedBlank { column, .. }
            | FindingKind::UnexpectedBlank { column }
            | FindingKind::DataLength { column, .. }
            | FindingKind::ValuesLength { column, .. } => Some(column),
            FindingKind::ObsmodePrefix { .. } | FindingKind::BlankObsmode => Some("OBSMODE"),
            FindingKind::BlankDataColumn => Some("DATACOL"),
            _ => None,
        }
    }
}

/// Una inconsistencia localizada (extensión / fila)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<ExtensionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(flatten)]
    pub kind: FindingKind,
}

impl Finding {
    /// Finding a nivel de archivo (header primario)
    pub fn file(kind: FindingKind) -> Self {
        Self { extension: None, row: None, kind }
    }

    pub fn at_row(extension: &ExtensionId, row: usize, kind: FindingKind) -> Self {
        Self {
            extension: Some(extension.clone()),
            row: Some(row),
            kind,
        }
    }

    pub fn column(&self) -> Option<&str> {
        self.kind.column()
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ext = self
            .extension
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let row = self.row.unwrap_or_default();

        match &self.kind {
            FindingKind::MissingHeaderKey { key } => {
                write!(f, "Header does not have key {}", key)
            }
            FindingKind::ExtensionCount { declared, actual } => write!(
                f,
                "Number of image extensions is {} and does not match header keyword {}.",
                actual, declared
            ),
            FindingKind::ObsmodePrefix { actual, reference } => write!(
                f,
                "obsmode for row {} of extension {}: {} does not start with row 0 prefix {}",
                row, ext, actual, reference
            ),
            FindingKind::BlankObsmode => {
                write!(f, "Obsmode column is empty for extension {} row {}", ext, row)
            }
            FindingKind::RowLength { expected, actual } => write!(
                f,
                "Row {} of extension {} should have length {} but has length {}",
                row, ext, expected, actual
            ),
            FindingKind::BlankDataColumn => {
                write!(f, "Column DATACOL of extension {} row {} is blank.", ext, row)
            }
            FindingKind::UnexpectedZero { column } => write!(
                f,
                "Column {} of extension {} row {} is zero and shouldn't be.",
                column, ext, row
            ),
            FindingKind::ExpectedZero { column, actual } => write!(
                f,
                "Column {} of extension {} row {} is not 0. {} instead.",
                column, ext, row, actual
            ),
            FindingKind::ExpectedZeroArray { column, actual } => write!(
                f,
                "Column {} of extension {} row {} is not [0]. {} instead.",
                column, ext, row, actual
            ),
            FindingKind::NotAnArray { column, actual } => write!(
                f,
                "Column {} of extension {} row {} is not an array. {} instead.",
                column, ext, row, actual
            ),
            FindingKind::NotANumber { column, actual } => write!(
                f,
                "Column {} of extension {} row {} is not a number. {} instead.",
                column, ext, row, actual
            ),
            FindingKind::NotAString { column, actual } => write!(
                f,
                "Column {} of extension {} row {} is not a string. {} instead.",
                column, ext, row, actual
            ),
            FindingKind::ExpectedBlank { column, actual } => write!(
                f,
                "Column {} of extension {} row {} has value {} when it should be blank.",
                column, ext, row, actual
            ),
            FindingKind::UnexpectedBlank { column } => write!(
                f,
                "Column {} of extension {} row {} is blank when it shouldn't be.",
                column, ext, row
            ),
            FindingKind::DataLength { column, expected, actual } => write!(
                f,
                "Column {} of extension {} row {} should have length {}. Has length {} instead.",
                column, ext, row, expected, actual
            ),
            FindingKind::ValuesLength { column, expected, actual } => write!(
                f,
                "Length of column {} of extension {} row {} should be {}. {} instead.",
                column, ext, row, expected, actual
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_row_finding() {
        let ext = ExtensionId::new(1, "PHOTFLAM");
        let finding = Finding::at_row(
            &ext,
            4,
            FindingKind::DataLength { column: "PHOTFLAM2".into(), expected: 6, actual: 4 },
        );
        assert_eq!(
            finding.to_string(),
            "Column PHOTFLAM2 of extension 1 (PHOTFLAM) row 4 should have length 6. Has length 4 instead."
        );
        assert_eq!(finding.column(), Some("PHOTFLAM2"));
    }

    #[test]
    fn test_serialize_is_flat() {
        let finding = Finding::file(FindingKind::MissingHeaderKey { key: "PARNUM".into() });
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "missing_header_key", "key": "PARNUM"}));
    }
}
