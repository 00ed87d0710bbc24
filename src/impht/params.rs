// src/impht/params.rs
// ============================================================================
// PARAMETER BLOCKS - Consistencia de los slots NELEMi / PARiNAMES / PARiVALUES
// ============================================================================
//
// DATACOL decide qué slot está activo:
//
//   DATACOL = "PHOTFLAM"   → Plain: PHOTFLAM escalar != 0, todo lo demás a cero
//   DATACOL = "PHOTFLAM2"  → Array(2): PHOTFLAM == 0, slots 1..2 poblados,
//                            len(PHOTFLAM2) == NELEM1 × NELEM2
//
// Cualquier DATACOL que termine en un dígito 1..=PARNUM es Array.
//
// ============================================================================

use serde::Serialize;

use super::finding::{ExtensionId, Finding, FindingKind};
use super::MalformedRowError;
use crate::fits::{Row, Value};

/// Clasificación de una fila según DATACOL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum SlotLayout {
    /// Valor escalar en la columna `family`
    Plain { family: String },
    /// Array en `<family><active>`
    Array { family: String, active: usize },
}

impl SlotLayout {
    pub fn classify(datacol: &str, num_par: usize) -> Self {
        let datacol = datacol.trim();

        let slot = datacol
            .chars()
            .last()
            .and_then(|c| c.to_digit(10))
            .map(|d| d as usize)
            .filter(|d| (1..=num_par).contains(d));

        match slot {
            Some(active) => SlotLayout::Array {
                // el dígito es ASCII: cortar el último byte es seguro
                family: datacol[..datacol.len() - 1].to_string(),
                active,
            },
            None => SlotLayout::Plain {
                family: datacol.to_string(),
            },
        }
    }

    /// Nombre base de la familia de columnas
    pub fn family(&self) -> &str {
        match self {
            SlotLayout::Plain { family } | SlotLayout::Array { family, .. } => family,
        }
    }

    /// Slot activo (None en el caso plain)
    pub fn active(&self) -> Option<usize> {
        match self {
            SlotLayout::Plain { .. } => None,
            SlotLayout::Array { active, .. } => Some(*active),
        }
    }

    /// Columnas que la comprobación necesita leer
    pub fn required_columns(&self, num_par: usize) -> Vec<String> {
        let family = self.family();
        let mut columns = vec![family.to_string()];
        for i in 1..=num_par {
            columns.push(data_column(family, i));
            columns.push(names_column(i));
            columns.push(values_column(i));
            columns.push(nelem_column(i));
        }
        columns
    }
}

fn data_column(family: &str, i: usize) -> String {
    format!("{}{}", family, i)
}

fn names_column(i: usize) -> String {
    format!("PAR{}NAMES", i)
}

fn values_column(i: usize) -> String {
    format!("PAR{}VALUES", i)
}

fn nelem_column(i: usize) -> String {
    format!("NELEM{}", i)
}

/// Comprueba los bloques de parámetros de una fila.
///
/// Devuelve las inconsistencias encontradas, o `MalformedRowError` si a la fila
/// le falta alguna columna que su clasificación exige.
pub fn check_parameter_block(
    row: &Row,
    layout: &SlotLayout,
    num_par: usize,
    extension: &ExtensionId,
    row_index: usize,
) -> Result<Vec<Finding>, MalformedRowError> {
    let missing: Vec<String> = layout
        .required_columns(num_par)
        .into_iter()
        .filter(|c| row.get(c).is_none())
        .collect();

    if !missing.is_empty() {
        return Err(MalformedRowError {
            extension: extension.clone(),
            row: row_index,
            missing,
        });
    }

    let mut checker = RowChecker {
        row,
        extension,
        row_index,
        findings: Vec::new(),
    };

    match layout {
        SlotLayout::Plain { family } => checker.check_plain(family, num_par),
        SlotLayout::Array { family, active } => checker.check_array(family, *active, num_par),
    }

    Ok(checker.findings)
}

struct RowChecker<'a> {
    row: &'a Row,
    extension: &'a ExtensionId,
    row_index: usize,
    findings: Vec<Finding>,
}

impl RowChecker<'_> {
    fn check_plain(&mut self, family: &str, num_par: usize) {
        self.expect_nonzero(family);

        for i in 1..=num_par {
            self.expect_zero_array(&data_column(family, i));
        }
        for i in 1..=num_par {
            self.expect_blank(&names_column(i));
        }
        for i in 1..=num_par {
            self.expect_zero_array(&values_column(i));
        }
        for i in 1..=num_par {
            self.expect_zero(&nelem_column(i));
        }
    }

    fn check_array(&mut self, family: &str, active: usize, num_par: usize) {
        self.expect_zero(family);

        // NELEM1..NELEMnp: distintos de cero, su producto es la longitud de los datos
        let mut product: Option<i64> = Some(1);
        let mut nelems = Vec::with_capacity(active);
        for i in 1..=active {
            let nelem = self.read_count(&nelem_column(i));
            if nelem == Some(0) {
                self.push(FindingKind::UnexpectedZero { column: nelem_column(i) });
            }
            product = match (product, nelem) {
                (Some(p), Some(n)) => Some(p.saturating_mul(n)),
                _ => None,
            };
            nelems.push(nelem);
        }

        let datacol = data_column(family, active);
        if let (Some(expected), Some(actual)) = (product, self.array_len(&datacol)) {
            if expected != actual as i64 {
                self.push(FindingKind::DataLength { column: datacol.clone(), expected, actual });
            }
        }

        for i in active + 1..=num_par {
            self.expect_zero(&nelem_column(i));
        }

        for i in (1..=num_par).filter(|&i| i != active) {
            self.expect_zero_array(&data_column(family, i));
        }

        for i in 1..=active {
            self.expect_named(&names_column(i));
        }
        for i in active + 1..=num_par {
            self.expect_blank(&names_column(i));
        }

        for (i, nelem) in (1..=active).zip(nelems) {
            let column = values_column(i);
            if let (Some(expected), Some(actual)) = (nelem, self.array_len(&column)) {
                if expected != actual as i64 {
                    self.push(FindingKind::ValuesLength { column, expected, actual });
                }
            }
        }
        for i in active + 1..=num_par {
            self.expect_zero_array(&values_column(i));
        }
    }

    // ------------------------------------------------------------------------
    // Comprobaciones por columna
    // ------------------------------------------------------------------------

    fn push(&mut self, kind: FindingKind) {
        self.findings.push(Finding::at_row(self.extension, self.row_index, kind));
    }

    /// Las columnas existen: check_parameter_block lo verifica antes
    fn value(&self, column: &str) -> Value {
        self.row.get(column).cloned().unwrap_or(Value::Text(String::new()))
    }

    fn expect_nonzero(&mut self, column: &str) {
        let value = self.value(column);
        match value.as_f64() {
            Some(v) if v == 0.0 => self.push(FindingKind::UnexpectedZero { column: column.to_string() }),
            Some(_) => {}
            None => self.push(FindingKind::NotANumber { column: column.to_string(), actual: value }),
        }
    }

    fn expect_zero(&mut self, column: &str) {
        let value = self.value(column);
        match value.as_f64() {
            Some(v) if v == 0.0 => {}
            Some(_) => self.push(FindingKind::ExpectedZero { column: column.to_string(), actual: value }),
            None => self.push(FindingKind::NotANumber { column: column.to_string(), actual: value }),
        }
    }

    fn expect_zero_array(&mut self, column: &str) {
        let value = self.value(column);
        if value.as_array().is_none() {
            self.push(FindingKind::NotAnArray { column: column.to_string(), actual: value });
        } else if !value.is_zero_array() {
            self.push(FindingKind::ExpectedZeroArray { column: column.to_string(), actual: value });
        }
    }

    fn expect_blank(&mut self, column: &str) {
        let value = self.value(column);
        match value.as_str() {
            Some(s) if s.trim().is_empty() => {}
            Some(s) => self.push(FindingKind::ExpectedBlank {
                column: column.to_string(),
                actual: s.to_string(),
            }),
            None => self.push(FindingKind::NotAString { column: column.to_string(), actual: value }),
        }
    }

    fn expect_named(&mut self, column: &str) {
        let value = self.value(column);
        match value.as_str() {
            Some(s) if s.trim().is_empty() => {
                self.push(FindingKind::UnexpectedBlank { column: column.to_string() })
            }
            Some(_) => {}
            None => self.push(FindingKind::NotAString { column: column.to_string(), actual: value }),
        }
    }

    /// NELEMi como entero; reporta NotANumber si no lo es
    fn read_count(&mut self, column: &str) -> Option<i64> {
        let value = self.value(column);
        let count = value.as_int();
        if count.is_none() {
            self.push(FindingKind::NotANumber { column: column.to_string(), actual: value });
        }
        count
    }

    /// Longitud de un array; reporta NotAnArray si es escalar
    fn array_len(&mut self, column: &str) -> Option<usize> {
        let value = self.value(column);
        match value.as_array() {
            Some(a) => Some(a.len()),
            None => {
                self.push(FindingKind::NotAnArray { column: column.to_string(), actual: value });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero() -> Value {
        Value::Array(vec![0.0])
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn ext() -> ExtensionId {
        ExtensionId::new(1, "PHOTFLAM")
    }

    /// Fila plain válida para P slots
    fn plain_row(num_par: usize) -> Row {
        let mut row = Row::new();
        row.push("OBSMODE", text("acs,wfc1,f555w"));
        row.push("DATACOL", text("PHOTFLAM"));
        row.push("PHOTFLAM", Value::Double(2.5));
        for i in 1..=num_par {
            row.push(format!("PHOTFLAM{}", i), zero());
        }
        for i in 1..=num_par {
            row.push(format!("PAR{}VALUES", i), zero());
        }
        for i in 1..=num_par {
            row.push(format!("PAR{}NAMES", i), text(""));
        }
        for i in 1..=num_par {
            row.push(format!("NELEM{}", i), Value::Int(0));
        }
        row
    }

    /// Escenario P=2, DATACOL = PHOTFLAM2 con NELEM 2 × 2
    fn array_row(nelem2: i64) -> Row {
        Row::from_pairs([
            ("OBSMODE", text("acs,wfc1,mjd#")),
            ("DATACOL", text("PHOTFLAM2")),
            ("PHOTFLAM", Value::Double(0.0)),
            ("PHOTFLAM1", zero()),
            ("PHOTFLAM2", Value::Array(vec![1.0, 2.0, 3.0, 4.0])),
            ("PAR1VALUES", Value::Array(vec![4000.0, 5000.0])),
            ("PAR2VALUES", Value::Array((0..nelem2).map(|x| x as f64).collect())),
            ("PAR1NAMES", text("WAVELENGTH")),
            ("PAR2NAMES", text("ANGLE")),
            ("NELEM1", Value::Int(2)),
            ("NELEM2", Value::Int(nelem2)),
        ])
    }

    fn check(row: &Row, num_par: usize) -> Vec<Finding> {
        let datacol = row.get("DATACOL").and_then(Value::as_str).unwrap();
        let layout = SlotLayout::classify(datacol, num_par);
        check_parameter_block(row, &layout, num_par, &ext(), 0).unwrap()
    }

    fn kinds(findings: &[Finding]) -> Vec<FindingKind> {
        findings.iter().map(|f| f.kind.clone()).collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(SlotLayout::classify("PHOTFLAM", 2), SlotLayout::Plain { family: "PHOTFLAM".into() });
        assert_eq!(
            SlotLayout::classify("PHOTFLAM2", 2),
            SlotLayout::Array { family: "PHOTFLAM".into(), active: 2 }
        );
        assert_eq!(
            SlotLayout::classify("PHOTPLAM1 ", 3),
            SlotLayout::Array { family: "PHOTPLAM".into(), active: 1 }
        );
        // dígito fuera de rango: plain con el nombre completo
        assert_eq!(SlotLayout::classify("PHOTFLAM3", 2), SlotLayout::Plain { family: "PHOTFLAM3".into() });
        assert_eq!(SlotLayout::classify("PHOTFLAM0", 2), SlotLayout::Plain { family: "PHOTFLAM0".into() });
        assert_eq!(SlotLayout::classify("", 2), SlotLayout::Plain { family: String::new() });
    }

    #[test]
    fn test_required_columns() {
        let layout = SlotLayout::classify("PHOTBW1", 1);
        assert_eq!(
            layout.required_columns(1),
            vec!["PHOTBW", "PHOTBW1", "PAR1NAMES", "PAR1VALUES", "NELEM1"]
        );
    }

    #[test]
    fn test_plain_scenario_has_no_findings() {
        assert!(check(&plain_row(2), 2).is_empty());
    }

    #[test]
    fn test_plain_single_parameter_table() {
        assert!(check(&plain_row(1), 1).is_empty());
    }

    #[test]
    fn test_plain_zero_value() {
        let row = Row::from_pairs(plain_row(2).iter().map(|(k, v)| {
            let v = if k == "PHOTFLAM" { Value::Double(0.0) } else { v.clone() };
            (k.to_string(), v)
        }));
        assert_eq!(kinds(&check(&row, 2)), vec![FindingKind::UnexpectedZero { column: "PHOTFLAM".into() }]);
    }

    #[test]
    fn test_plain_reports_offending_columns() {
        let row = Row::from_pairs(plain_row(2).iter().map(|(k, v)| {
            let v = match k {
                "PHOTFLAM2" => Value::Array(vec![1.0, 2.0]),
                "PAR1NAMES" => text("WAVELENGTH"),
                "PAR2VALUES" => Value::Double(0.0),
                "NELEM1" => Value::Int(3),
                _ => v.clone(),
            };
            (k.to_string(), v)
        }));

        assert_eq!(
            kinds(&check(&row, 2)),
            vec![
                FindingKind::ExpectedZeroArray {
                    column: "PHOTFLAM2".into(),
                    actual: Value::Array(vec![1.0, 2.0]),
                },
                FindingKind::ExpectedBlank { column: "PAR1NAMES".into(), actual: "WAVELENGTH".into() },
                FindingKind::NotAnArray { column: "PAR2VALUES".into(), actual: Value::Double(0.0) },
                FindingKind::ExpectedZero { column: "NELEM1".into(), actual: Value::Int(3) },
            ]
        );
    }

    #[test]
    fn test_array_scenario_has_no_findings() {
        assert!(check(&array_row(2), 2).is_empty());
    }

    #[test]
    fn test_array_product_mismatch_is_single_finding() {
        let findings = check(&array_row(3), 2);
        assert_eq!(
            kinds(&findings),
            vec![FindingKind::DataLength { column: "PHOTFLAM2".into(), expected: 6, actual: 4 }]
        );
    }

    #[test]
    fn test_array_zero_nelem_and_product_fire_independently() {
        let row = Row::from_pairs(array_row(2).iter().map(|(k, v)| {
            let v = if k == "NELEM1" { Value::Int(0) } else { v.clone() };
            (k.to_string(), v)
        }));
        let findings = kinds(&check(&row, 2));
        assert!(findings.contains(&FindingKind::UnexpectedZero { column: "NELEM1".into() }));
        assert!(findings.contains(&FindingKind::DataLength {
            column: "PHOTFLAM2".into(),
            expected: 0,
            actual: 4,
        }));
        assert!(findings.contains(&FindingKind::ValuesLength {
            column: "PAR1VALUES".into(),
            expected: 0,
            actual: 2,
        }));
    }

    #[test]
    fn test_array_first_slot_of_three() {
        let row = Row::from_pairs([
            ("DATACOL", text("PHOTFLAM1")),
            ("PHOTFLAM", Value::Double(0.0)),
            ("PHOTFLAM1", Value::Array(vec![1.0, 2.0, 3.0])),
            ("PHOTFLAM2", zero()),
            ("PHOTFLAM3", zero()),
            ("PAR1NAMES", text("MJD#")),
            ("PAR2NAMES", text("")),
            ("PAR3NAMES", text("")),
            ("PAR1VALUES", Value::Array(vec![52000.0, 53000.0, 54000.0])),
            ("PAR2VALUES", zero()),
            ("PAR3VALUES", zero()),
            ("NELEM1", Value::Int(3)),
            ("NELEM2", Value::Int(0)),
            ("NELEM3", Value::Int(0)),
        ]);
        assert!(check(&row, 3).is_empty());
    }

    #[test]
    fn test_array_inactive_slots_must_be_empty() {
        let row = Row::from_pairs([
            ("DATACOL", text("PHOTFLAM1")),
            ("PHOTFLAM", Value::Double(1.0)),
            ("PHOTFLAM1", Value::Array(vec![1.0, 2.0])),
            ("PHOTFLAM2", Value::Array(vec![5.0])),
            ("PAR1NAMES", text("")),
            ("PAR2NAMES", text("ANGLE")),
            ("PAR1VALUES", Value::Array(vec![1.0, 2.0])),
            ("PAR2VALUES", Value::Array(vec![1.0, 2.0])),
            ("NELEM1", Value::Int(2)),
            ("NELEM2", Value::Int(2)),
        ]);
        assert_eq!(
            kinds(&check(&row, 2)),
            vec![
                FindingKind::ExpectedZero { column: "PHOTFLAM".into(), actual: Value::Double(1.0) },
                FindingKind::ExpectedZero { column: "NELEM2".into(), actual: Value::Int(2) },
                FindingKind::ExpectedZeroArray {
                    column: "PHOTFLAM2".into(),
                    actual: Value::Array(vec![5.0]),
                },
                FindingKind::UnexpectedBlank { column: "PAR1NAMES".into() },
                FindingKind::ExpectedBlank { column: "PAR2NAMES".into(), actual: "ANGLE".into() },
                FindingKind::ExpectedZeroArray {
                    column: "PAR2VALUES".into(),
                    actual: Value::Array(vec![1.0, 2.0]),
                },
            ]
        );
    }

    #[test]
    fn test_scalar_data_column_is_not_an_array() {
        let row = Row::from_pairs(array_row(2).iter().map(|(k, v)| {
            let v = if k == "PHOTFLAM2" { Value::Double(4.0) } else { v.clone() };
            (k.to_string(), v)
        }));
        assert_eq!(
            kinds(&check(&row, 2)),
            vec![FindingKind::NotAnArray { column: "PHOTFLAM2".into(), actual: Value::Double(4.0) }]
        );
    }

    #[test]
    fn test_missing_columns_are_collected() {
        let row = Row::from_pairs([("DATACOL", text("PHOTFLAM")), ("PHOTFLAM", Value::Double(1.0))]);
        let layout = SlotLayout::classify("PHOTFLAM", 1);
        let err = check_parameter_block(&row, &layout, 1, &ext(), 7).unwrap_err();
        assert_eq!(err.row, 7);
        assert_eq!(err.missing, vec!["PHOTFLAM1", "PAR1NAMES", "PAR1VALUES", "NELEM1"]);
    }

    #[test]
    fn test_idempotent() {
        let row = array_row(3);
        assert_eq!(check(&row, 2), check(&row, 2));
    }
}
