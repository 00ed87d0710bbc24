// src/impht/rows.rs
// ============================================================================
// ROW CHECKS - OBSMODE y longitud de fila
// ============================================================================

use super::finding::{ExtensionId, Finding, FindingKind};
use crate::fits::Row;

/// Columnas fijas de cada fila además de los bloques de parámetros:
/// OBSMODE, DATACOL, <family> y dos más de la tabla (p.ej. PEDIGREE, DESCRIP)
pub const FIXED_COLUMNS: usize = 5;

/// Prefijo de referencia: primer componente del OBSMODE de la fila 0
pub fn reference_prefix(obsmode: &str) -> String {
    obsmode
        .trim()
        .split(',')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Longitud esperada de una fila con `num_par` parámetros
pub fn expected_row_len(num_par: usize) -> usize {
    FIXED_COLUMNS + 4 * num_par
}

/// OBSMODE: empieza por el prefijo de la fila 0 y no está en blanco
pub fn check_obsmode(obsmode: &str, reference: &str, extension: &ExtensionId, row: usize) -> Vec<Finding> {
    let mut findings = Vec::new();

    // Sólo la referencia se recorta; un OBSMODE con espacios delante no cumple
    if !obsmode.starts_with(reference) {
        findings.push(Finding::at_row(
            extension,
            row,
            FindingKind::ObsmodePrefix {
                actual: obsmode.to_string(),
                reference: reference.to_string(),
            },
        ));
    }
    if obsmode.trim().is_empty() {
        findings.push(Finding::at_row(extension, row, FindingKind::BlankObsmode));
    }

    findings
}

pub fn check_row_shape(row: &Row, num_par: usize, extension: &ExtensionId, index: usize) -> Option<Finding> {
    let expected = expected_row_len(num_par);
    if row.len() != expected {
        Some(Finding::at_row(
            extension,
            index,
            FindingKind::RowLength { expected, actual: row.len() },
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fits::Value;

    fn ext() -> ExtensionId {
        ExtensionId::new(2, "PHOTPLAM")
    }

    #[test]
    fn test_reference_prefix() {
        assert_eq!(reference_prefix("acs,wfc1,f555w"), "acs");
        assert_eq!(reference_prefix("  wfc3 "), "wfc3");
        assert_eq!(reference_prefix(""), "");
    }

    #[test]
    fn test_obsmode_prefix() {
        assert!(check_obsmode("acs,hrc,f555w", "acs", &ext(), 3).is_empty());

        let findings = check_obsmode("wfc3,uvis1", "acs", &ext(), 3);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].row, Some(3));
        assert_eq!(
            findings[0].kind,
            FindingKind::ObsmodePrefix { actual: "wfc3,uvis1".into(), reference: "acs".into() }
        );
    }

    #[test]
    fn test_blank_obsmode() {
        let kinds: Vec<_> = check_obsmode("   ", "acs", &ext(), 1)
            .into_iter()
            .map(|f| f.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                FindingKind::ObsmodePrefix { actual: "   ".into(), reference: "acs".into() },
                FindingKind::BlankObsmode,
            ]
        );
    }

    #[test]
    fn test_leading_space_breaks_prefix() {
        let reference = reference_prefix("  acs,wfc1");
        assert_eq!(reference, "acs");
        assert!(check_obsmode("acs,wfc1,f555w", &reference, &ext(), 0).is_empty());

        let findings = check_obsmode(" acs,wfc1,f814w", &reference, &ext(), 4);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].kind,
            FindingKind::ObsmodePrefix { actual: " acs,wfc1,f814w".into(), reference: "acs".into() }
        );
    }

    #[test]
    fn test_row_shape_boundaries() {
        let row_of = |n: usize| Row::from_pairs((0..n).map(|i| (format!("C{}", i), Value::Int(0))));

        assert_eq!(expected_row_len(2), 13);
        assert!(check_row_shape(&row_of(13), 2, &ext(), 0).is_none());
        for n in [12, 14] {
            let finding = check_row_shape(&row_of(n), 2, &ext(), 0).unwrap();
            assert_eq!(finding.kind, FindingKind::RowLength { expected: 13, actual: n });
        }
    }
}
