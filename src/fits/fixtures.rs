// src/fits/fixtures.rs
// ============================================================================
// FIXTURES (tests) - Construye archivos FITS reales en disco
// ============================================================================

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use tempfile::NamedTempFile;

use super::header::{padded_len, Header, HeaderValue};
use super::table::{ColumnType, Descriptor, TForm, Value};

/// Header primario mínimo + keywords extra
pub fn primary_header(extra: &[(&str, HeaderValue)]) -> Header {
    let mut header = Header::new();
    header.set("SIMPLE", HeaderValue::Logical(true)).unwrap();
    header.set("BITPIX", HeaderValue::Int(8)).unwrap();
    header.set("NAXIS", HeaderValue::Int(0)).unwrap();
    header.set("EXTEND", HeaderValue::Logical(true)).unwrap();
    for (key, value) in extra {
        header.set(key, value.clone()).unwrap();
    }
    header
}

/// Tabla binaria con columnas fijas y de longitud variable (P)
pub struct TableBuilder {
    name: String,
    columns: Vec<(String, String)>,
    rows: Vec<Vec<Value>>,
}

impl TableBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn column(mut self, name: &str, tform: &str) -> Self {
        self.columns.push((name.to_string(), tform.to_string()));
        self
    }

    pub fn row(mut self, values: Vec<Value>) -> Self {
        assert_eq!(values.len(), self.columns.len());
        self.rows.push(values);
        self
    }

    /// Header + data unit (con heap), ambos con padding
    pub fn to_bytes(&self) -> Vec<u8> {
        let forms: Vec<TForm> = self
            .columns
            .iter()
            .map(|(n, f)| TForm::parse(n, f).unwrap())
            .collect();
        let row_len: usize = forms.iter().map(TForm::width).sum();

        let mut table = Vec::new();
        let mut heap = Vec::new();
        for row in &self.rows {
            for (value, form) in row.iter().zip(&forms) {
                match form.variable {
                    Some(Descriptor::P) => {
                        let start = heap.len();
                        let count = encode_values(&mut heap, form.kind, None, value);
                        table.write_i32::<BigEndian>(count as i32).unwrap();
                        table.write_i32::<BigEndian>(start as i32).unwrap();
                    }
                    Some(Descriptor::Q) => {
                        let start = heap.len();
                        let count = encode_values(&mut heap, form.kind, None, value);
                        table.write_i64::<BigEndian>(count as i64).unwrap();
                        table.write_i64::<BigEndian>(start as i64).unwrap();
                    }
                    None => {
                        encode_values(&mut table, form.kind, Some(form.repeat), value);
                    }
                }
            }
        }

        let mut header = Header::new();
        header.set("XTENSION", HeaderValue::Str("BINTABLE".into())).unwrap();
        header.set("BITPIX", HeaderValue::Int(8)).unwrap();
        header.set("NAXIS", HeaderValue::Int(2)).unwrap();
        header.set("NAXIS1", HeaderValue::Int(row_len as i64)).unwrap();
        header.set("NAXIS2", HeaderValue::Int(self.rows.len() as i64)).unwrap();
        header.set("PCOUNT", HeaderValue::Int(heap.len() as i64)).unwrap();
        header.set("GCOUNT", HeaderValue::Int(1)).unwrap();
        header.set("TFIELDS", HeaderValue::Int(self.columns.len() as i64)).unwrap();
        for (i, (name, tform)) in self.columns.iter().enumerate() {
            header.set(&format!("TTYPE{}", i + 1), HeaderValue::Str(name.clone())).unwrap();
            header.set(&format!("TFORM{}", i + 1), HeaderValue::Str(tform.clone())).unwrap();
        }
        header.set("EXTNAME", HeaderValue::Str(self.name.clone())).unwrap();

        let mut bytes = header.to_bytes();
        table.extend(heap);
        let data_len = padded_len(table.len());
        table.resize(data_len, 0);
        bytes.extend(table);
        bytes
    }
}

/// Escribe `value` con el tipo de la columna; devuelve el número de elementos
fn encode_values(out: &mut Vec<u8>, kind: ColumnType, repeat: Option<usize>, value: &Value) -> usize {
    if kind == ColumnType::Char {
        let text = value.as_str().unwrap_or_default().as_bytes().to_vec();
        let width = repeat.unwrap_or(text.len());
        let mut cell = text;
        cell.resize(width, b' ');
        out.extend_from_slice(&cell[..width]);
        return width;
    }

    let numbers: Vec<f64> = match value {
        Value::Array(a) => a.clone(),
        Value::Logical(b) => vec![if *b { 1.0 } else { 0.0 }],
        other => vec![other.as_f64().unwrap()],
    };
    let numbers = match repeat {
        Some(r) => {
            let mut n = numbers;
            n.resize(r, 0.0);
            n
        }
        None => numbers,
    };

    for x in &numbers {
        match kind {
            ColumnType::Logical => out.push(if *x != 0.0 { b'T' } else { b'F' }),
            ColumnType::Byte => out.push(*x as u8),
            ColumnType::Short => out.write_i16::<BigEndian>(*x as i16).unwrap(),
            ColumnType::Int => out.write_i32::<BigEndian>(*x as i32).unwrap(),
            ColumnType::Long => out.write_i64::<BigEndian>(*x as i64).unwrap(),
            ColumnType::Real => out.write_f32::<BigEndian>(*x as f32).unwrap(),
            ColumnType::Double => out.write_f64::<BigEndian>(*x).unwrap(),
            ColumnType::Char => unreachable!(),
        }
    }
    numbers.len()
}

/// Bytes de un archivo: primario sin datos + tablas
pub fn fits_bytes(primary: &Header, tables: &[TableBuilder]) -> Vec<u8> {
    let mut bytes = primary.to_bytes();
    for table in tables {
        bytes.extend(table.to_bytes());
    }
    bytes
}

pub fn write_fits(primary: &Header, tables: &[TableBuilder]) -> NamedTempFile {
    write_bytes(&fits_bytes(primary, tables))
}

pub fn write_bytes(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

/// Bytes de un HDU primario con imagen BITPIX=16
pub fn image_bytes(shape: &[usize], pixels: &[i16]) -> Vec<u8> {
    let mut header = Header::new();
    header.set("SIMPLE", HeaderValue::Logical(true)).unwrap();
    header.set("BITPIX", HeaderValue::Int(16)).unwrap();
    header.set("NAXIS", HeaderValue::Int(shape.len() as i64)).unwrap();
    for (i, n) in shape.iter().enumerate() {
        header.set(&format!("NAXIS{}", i + 1), HeaderValue::Int(*n as i64)).unwrap();
    }

    let mut bytes = header.to_bytes();
    let mut data = Vec::new();
    for p in pixels {
        data.write_i16::<BigEndian>(*p).unwrap();
    }
    data.resize(padded_len(data.len()), 0);
    bytes.extend(data);
    bytes
}

pub fn write_image(shape: &[usize], pixels: &[i16]) -> NamedTempFile {
    write_bytes(&image_bytes(shape, pixels))
}
