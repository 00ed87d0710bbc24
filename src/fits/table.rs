// src/fits/table.rs
// ============================================================================
// BINTABLE - Columnas TFORMn, filas y arrays de longitud variable (heap)
// ============================================================================

use std::fmt;
use std::sync::LazyLock;

use byteorder::{BigEndian, ByteOrder};
use regex::Regex;
use serde::Serialize;

use super::error::{FitsError, FitsResult};
use super::header::{format_float, Header};

/// Máximo de columnas (TFIELDS) que admite el estándar
const MAX_FIELDS: usize = 999;

static TFORM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d*)([LXBIJKAEDCMPQ])([LXBIJKAEDCM])?(?:\((\d*)\))?\s*$").unwrap()
});

// ============================================================================
// VALORES
// ============================================================================

/// Valor de una celda. Columnas con repeat 1 dan escalares,
/// repeat > 1 y descriptores P/Q dan arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Logical(bool),
    Int(i64),
    Real(f32),
    Double(f64),
    Array(Vec<f64>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Escalar numérico
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Real(f) => Some(f64::from(*f)),
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Escalar entero (floats sólo si no tienen parte fraccionaria)
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => self.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64),
        }
    }

    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// `[0]`: array de un elemento igual a cero
    pub fn is_zero_array(&self) -> bool {
        matches!(self.as_array(), Some([x]) if *x == 0.0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Logical(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Int(i) => write!(f, "{}", i),
            Value::Real(v) => {
                let s = v.to_string();
                if s.contains(['.', 'e', 'N', 'i']) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "{}.0", s)
                }
            }
            Value::Double(v) => write!(f, "{}", format_float(*v)),
            Value::Array(a) => {
                write!(f, "[")?;
                for (i, x) in a.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", format_float(*x))?;
                }
                write!(f, "]")
            }
        }
    }
}

// ============================================================================
// FILAS
// ============================================================================

/// Fila: mapping ordenado nombre de columna → valor
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Self {
            columns: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.columns.push((name.into(), value));
    }

    /// Busca una columna (case-insensitive, como los nombres TTYPE)
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.columns.get(index).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ============================================================================
// TFORM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Logical,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Real,
    Double,
}

impl ColumnType {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "L" => Some(ColumnType::Logical),
            "B" => Some(ColumnType::Byte),
            "I" => Some(ColumnType::Short),
            "J" => Some(ColumnType::Int),
            "K" => Some(ColumnType::Long),
            "A" => Some(ColumnType::Char),
            "E" => Some(ColumnType::Real),
            "D" => Some(ColumnType::Double),
            _ => None,
        }
    }

    pub fn size(self) -> usize {
        match self {
            ColumnType::Logical | ColumnType::Byte | ColumnType::Char => 1,
            ColumnType::Short => 2,
            ColumnType::Int | ColumnType::Real => 4,
            ColumnType::Long | ColumnType::Double => 8,
        }
    }
}

/// Descriptor de array de longitud variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    /// 2 × int32 (count, offset)
    P,
    /// 2 × int64 (count, offset)
    Q,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TForm {
    pub repeat: usize,
    pub kind: ColumnType,
    pub variable: Option<Descriptor>,
}

impl TForm {
    pub fn parse(column: &str, tform: &str) -> FitsResult<Self> {
        let unsupported = || FitsError::UnsupportedColumn {
            column: column.to_string(),
            tform: tform.to_string(),
        };

        let caps = TFORM_RE.captures(tform).ok_or_else(unsupported)?;
        let repeat = match caps.get(1).map(|m| m.as_str()) {
            Some("") | None => 1,
            Some(n) => n.parse().map_err(|_| unsupported())?,
        };
        let code = &caps[2];

        let (kind, variable) = match code {
            "P" | "Q" => {
                let elem = caps.get(3).map(|m| m.as_str()).ok_or_else(unsupported)?;
                let kind = ColumnType::from_code(elem).ok_or_else(unsupported)?;
                let descriptor = if code == "P" { Descriptor::P } else { Descriptor::Q };
                (kind, Some(descriptor))
            }
            _ => (ColumnType::from_code(code).ok_or_else(unsupported)?, None),
        };

        let form = Self { repeat, kind, variable };
        form.unit_size().checked_mul(repeat).ok_or_else(unsupported)?;
        Ok(form)
    }

    fn unit_size(&self) -> usize {
        match self.variable {
            Some(Descriptor::P) => 8,
            Some(Descriptor::Q) => 16,
            None => self.kind.size(),
        }
    }

    /// Ancho en bytes dentro de la fila (acotado en `parse`)
    pub fn width(&self) -> usize {
        self.repeat * self.unit_size()
    }
}

// ============================================================================
// TABLA
// ============================================================================

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub form: TForm,
    offset: usize,
}

/// Vista de una extensión BINTABLE sobre los bytes de su data unit
pub struct BinTable<'a> {
    columns: Vec<Column>,
    row_len: usize,
    nrows: usize,
    heap_start: usize,
    data: &'a [u8],
}

impl<'a> BinTable<'a> {
    pub fn new(hdu: usize, header: &Header, data: &'a [u8]) -> FitsResult<Self> {
        let row_len = header.require_len("NAXIS1", hdu)?;
        let nrows = header.require_len("NAXIS2", hdu)?;
        let tfields = header.require_len("TFIELDS", hdu)?;
        if tfields > MAX_FIELDS {
            return Err(FitsError::InvalidKeyword {
                hdu,
                key: "TFIELDS".to_string(),
                value: tfields.to_string(),
            });
        }

        let overflow = || FitsError::SizeOverflow { hdu, what: "table" };
        let table_len = row_len.checked_mul(nrows).ok_or_else(overflow)?;
        let heap_start = header.len_or("THEAP", hdu, table_len)?;

        let mut columns = Vec::with_capacity(tfields);
        let mut offset: usize = 0;
        for n in 1..=tfields {
            let name = header
                .get_str(&format!("TTYPE{}", n))
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| format!("COL{}", n));
            let tform = header
                .get_str(&format!("TFORM{}", n))
                .ok_or_else(|| FitsError::MissingKeyword { hdu, key: format!("TFORM{}", n) })?;
            let form = TForm::parse(&name, tform)?;
            let width = form.width();
            columns.push(Column { name, form, offset });
            offset = offset.checked_add(width).ok_or_else(overflow)?;
        }

        if offset != row_len {
            return Err(FitsError::InvalidKeyword {
                hdu,
                key: "NAXIS1".to_string(),
                value: format!("{} (columns span {} bytes)", row_len, offset),
            });
        }

        if table_len > data.len() {
            return Err(FitsError::Truncated {
                offset: 0,
                needed: table_len,
                len: data.len(),
            });
        }

        log::debug!("HDU {}: BINTABLE {} rows × {} columns", hdu, nrows, columns.len());

        Ok(Self { columns, row_len, nrows, heap_start, data })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Decodifica la fila `index`
    pub fn row(&self, index: usize) -> FitsResult<Row> {
        if index >= self.nrows {
            return Err(FitsError::NoSuchRow { index, nrows: self.nrows });
        }
        // index < nrows: cabe en los bytes validados por `new`
        let start = index * self.row_len;
        let bytes = &self.data[start..start + self.row_len];

        let mut row = Row::new();
        for column in &self.columns {
            let cell = &bytes[column.offset..column.offset + column.form.width()];
            let value = match column.form.variable {
                Some(descriptor) => self.read_heap(column, descriptor, cell)?,
                None => decode_cell(column.form.kind, column.form.repeat, cell),
            };
            row.push(column.name.clone(), value);
        }
        Ok(row)
    }

    pub fn rows(&self) -> FitsResult<Vec<Row>> {
        (0..self.nrows).map(|i| self.row(i)).collect()
    }

    fn read_heap(&self, column: &Column, descriptor: Descriptor, cell: &[u8]) -> FitsResult<Value> {
        let (count, offset) = match descriptor {
            Descriptor::P => (
                i64::from(BigEndian::read_i32(&cell[0..4])),
                i64::from(BigEndian::read_i32(&cell[4..8])),
            ),
            Descriptor::Q => (BigEndian::read_i64(&cell[0..8]), BigEndian::read_i64(&cell[8..16])),
        };

        let kind = column.form.kind;
        let span = heap_span(self.heap_start, count, offset, kind.size())
            .filter(|&(_, end)| end <= self.data.len())
            .ok_or_else(|| FitsError::HeapBounds {
                column: column.name.clone(),
                offset,
                count,
            })?;

        let bytes = &self.data[span.0..span.1];
        Ok(match kind {
            ColumnType::Char => Value::Text(decode_text(bytes)),
            _ => Value::Array(decode_numbers(kind, bytes)),
        })
    }
}

/// Rango `[start, end)` de un descriptor dentro de la data unit.
/// `None` si count u offset son negativos o la aritmética desborda.
fn heap_span(heap_start: usize, count: i64, offset: i64, size: usize) -> Option<(usize, usize)> {
    let count = usize::try_from(count).ok()?;
    let offset = usize::try_from(offset).ok()?;
    let start = heap_start.checked_add(offset)?;
    let end = start.checked_add(count.checked_mul(size)?)?;
    Some((start, end))
}

fn decode_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}

/// Elementos numéricos consecutivos; el texto se decodifica con `decode_text`
fn decode_numbers(kind: ColumnType, bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(kind.size())
        .map(|b| match kind {
            ColumnType::Logical => if b[0] == b'T' { 1.0 } else { 0.0 },
            ColumnType::Byte => f64::from(b[0]),
            ColumnType::Short => f64::from(BigEndian::read_i16(b)),
            ColumnType::Int => f64::from(BigEndian::read_i32(b)),
            ColumnType::Long => BigEndian::read_i64(b) as f64,
            ColumnType::Real => f64::from(BigEndian::read_f32(b)),
            ColumnType::Double => BigEndian::read_f64(b),
            // El texto pasa por decode_text antes de llegar aquí
            ColumnType::Char => unreachable!(),
        })
        .collect()
}

fn decode_cell(kind: ColumnType, repeat: usize, cell: &[u8]) -> Value {
    if kind == ColumnType::Char {
        return Value::Text(decode_text(cell));
    }
    if repeat != 1 {
        return Value::Array(decode_numbers(kind, cell));
    }
    match kind {
        ColumnType::Logical => Value::Logical(cell[0] == b'T'),
        ColumnType::Byte => Value::Int(i64::from(cell[0])),
        ColumnType::Short => Value::Int(i64::from(BigEndian::read_i16(cell))),
        ColumnType::Int => Value::Int(i64::from(BigEndian::read_i32(cell))),
        ColumnType::Long => Value::Int(BigEndian::read_i64(cell)),
        ColumnType::Real => Value::Real(BigEndian::read_f32(cell)),
        ColumnType::Double => Value::Double(BigEndian::read_f64(cell)),
        ColumnType::Char => unreachable!(),
    }
}
