// src/fits/mod.rs
// ============================================================================
// FITS READER - Lectura de HDUs (header + data) sobre un archivo mapeado
// ============================================================================
//
// Estructura de un archivo FITS:
//   [primary header][primary data][ext header][ext data]...
//
// Headers y data units se rellenan hasta múltiplos de 2880 bytes.
// Todos los valores binarios son big-endian.
//
// ============================================================================

pub mod error;
pub mod header;
pub mod table;
pub mod writer;

#[cfg(test)]
pub(crate) mod fixtures;

use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder};
use memmap2::Mmap;

pub use error::{FitsError, FitsResult};
pub use header::{Card, Header, HeaderValue, BLOCK_SIZE};
pub use table::{BinTable, Row, Value};

use header::padded_len;

/// Tipo de HDU según XTENSION
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HduKind {
    Primary,
    Image,
    BinTable,
    AsciiTable,
    Other(String),
}

impl std::fmt::Display for HduKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HduKind::Primary => write!(f, "PRIMARY"),
            HduKind::Image => write!(f, "IMAGE"),
            HduKind::BinTable => write!(f, "BINTABLE"),
            HduKind::AsciiTable => write!(f, "TABLE"),
            HduKind::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Un HDU: header parseado + posición de su data unit en el archivo
#[derive(Debug, Clone)]
pub struct Hdu {
    pub index: usize,
    pub header: Header,
    header_offset: usize,
    data_offset: usize,
    data_len: usize,
}

impl Hdu {
    pub fn kind(&self) -> HduKind {
        if self.index == 0 {
            return HduKind::Primary;
        }
        match self.header.get_str("XTENSION").map(str::trim) {
            Some("IMAGE") => HduKind::Image,
            Some("BINTABLE") => HduKind::BinTable,
            Some("TABLE") => HduKind::AsciiTable,
            Some(other) => HduKind::Other(other.to_string()),
            None => HduKind::Other(String::new()),
        }
    }

    /// EXTNAME, o PRIMARY para el HDU 0
    pub fn name(&self) -> String {
        match self.header.get_str("EXTNAME") {
            Some(name) => name.trim().to_uppercase(),
            None if self.index == 0 => "PRIMARY".to_string(),
            None => String::new(),
        }
    }

    /// Bytes de datos (sin padding)
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Bytes ocupados en disco (header + data con padding)
    pub fn file_bytes(&self) -> usize {
        (self.data_offset - self.header_offset) + padded_len(self.data_len)
    }

    pub fn header_offset(&self) -> usize {
        self.header_offset
    }

    pub fn data_offset(&self) -> usize {
        self.data_offset
    }

    /// NAXIS1..NAXISn
    pub fn shape(&self) -> Vec<usize> {
        let naxis = self.header.get_int("NAXIS").unwrap_or(0).max(0) as usize;
        (1..=naxis)
            .map(|n| self.header.get_int(&format!("NAXIS{}", n)).unwrap_or(0).max(0) as usize)
            .collect()
    }
}

/// Pixels de un HDU imagen, sin BSCALE/BZERO
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub shape: Vec<usize>,
    pub pixels: Vec<f64>,
}

/// Archivo FITS abierto en sólo lectura
pub struct FitsFile {
    path: PathBuf,
    mmap: Mmap,
    hdus: Vec<Hdu>,
}

impl FitsFile {
    /// Abre un archivo y recorre todos sus HDUs
    pub fn open(path: impl AsRef<Path>) -> FitsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| FitsError::Open {
            path: path.clone(),
            source,
        })?;

        let len = file.metadata()?.len() as usize;
        if len < BLOCK_SIZE {
            return Err(FitsError::Truncated { offset: 0, needed: BLOCK_SIZE, len });
        }

        // Sólo lectura: nadie modifica el archivo mientras está mapeado
        let mmap = unsafe { Mmap::map(&file)? };
        let hdus = scan_hdus(&mmap)?;

        log::debug!("{}: {} HDUs", path.display(), hdus.len());

        Ok(Self { path, mmap, hdus })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.hdus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hdus.is_empty()
    }

    pub fn hdus(&self) -> &[Hdu] {
        &self.hdus
    }

    pub fn hdu(&self, index: usize) -> FitsResult<&Hdu> {
        self.hdus.get(index).ok_or(FitsError::NoSuchHdu {
            index,
            count: self.hdus.len(),
        })
    }

    pub fn primary(&self) -> &Hdu {
        &self.hdus[0]
    }

    /// Bytes de la data unit (incluye el heap de las tablas)
    pub fn data(&self, hdu: &Hdu) -> &[u8] {
        &self.mmap[hdu.data_offset..hdu.data_offset + hdu.data_len]
    }

    /// Vista de tabla binaria del HDU `index`
    pub fn table(&self, index: usize) -> FitsResult<BinTable<'_>> {
        let hdu = self.hdu(index)?;
        match hdu.kind() {
            HduKind::BinTable => BinTable::new(index, &hdu.header, self.data(hdu)),
            kind => Err(FitsError::NotATable { hdu: index, kind: kind.to_string() }),
        }
    }

    /// Pixels del HDU `index` (primario o IMAGE)
    pub fn image(&self, index: usize) -> FitsResult<Image> {
        let hdu = self.hdu(index)?;
        let kind = hdu.kind();
        if !matches!(kind, HduKind::Primary | HduKind::Image) {
            return Err(FitsError::NotAnImage { hdu: index, kind: kind.to_string() });
        }

        let bitpix = hdu.header.require_int("BITPIX", index)?;
        let size = element_size(bitpix)?;
        let shape = hdu.shape();
        let overflow = || FitsError::SizeOverflow { hdu: index, what: "image" };
        let count = if shape.is_empty() {
            0
        } else {
            shape
                .iter()
                .try_fold(1usize, |acc, &n| acc.checked_mul(n))
                .ok_or_else(overflow)?
        };
        let needed = count.checked_mul(size).ok_or_else(overflow)?;
        let data = self.data(hdu);
        if needed > data.len() {
            return Err(FitsError::Truncated {
                offset: hdu.data_offset,
                needed,
                len: data.len(),
            });
        }

        let pixels = (0..count)
            .map(|i| {
                let b = &data[i * size..(i + 1) * size];
                match bitpix {
                    8 => f64::from(b[0]),
                    16 => f64::from(BigEndian::read_i16(b)),
                    32 => f64::from(BigEndian::read_i32(b)),
                    64 => BigEndian::read_i64(b) as f64,
                    -32 => f64::from(BigEndian::read_f32(b)),
                    _ => BigEndian::read_f64(b),
                }
            })
            .collect();

        Ok(Image { shape, pixels })
    }
}

/// Recorre la secuencia header/data de todo el archivo
fn scan_hdus(bytes: &[u8]) -> FitsResult<Vec<Hdu>> {
    let mut hdus = Vec::new();
    let mut offset = 0;

    while offset + BLOCK_SIZE <= bytes.len() {
        let index = hdus.len();
        let rest = &bytes[offset..];

        // Relleno al final del archivo: no es un HDU
        if index > 0 && rest[..BLOCK_SIZE].iter().all(|&b| b == 0 || b == b' ') {
            log::debug!("Trailing padding at offset {}", offset);
            break;
        }

        let (header, used) = Header::parse(rest, index).map_err(|e| match e {
            FitsError::Truncated { needed, .. } => FitsError::Truncated {
                offset,
                needed,
                len: bytes.len(),
            },
            other => other,
        })?;

        let data_len = data_unit_len(&header, index)?;
        let data_offset = offset + used;
        let data_end = data_offset.checked_add(data_len).filter(|&end| end <= bytes.len());
        if data_end.is_none() {
            return Err(FitsError::Truncated {
                offset: data_offset,
                needed: data_len,
                len: bytes.len(),
            });
        }

        log::debug!(
            "HDU {}: header at {}, {} data bytes at {}",
            index, offset, data_len, data_offset
        );

        hdus.push(Hdu {
            index,
            header,
            header_offset: offset,
            data_offset,
            data_len,
        });

        offset = data_offset + padded_len(data_len);
    }

    if hdus.is_empty() {
        return Err(FitsError::MissingEnd { hdu: 0 });
    }
    Ok(hdus)
}

/// Máximo de ejes (NAXISn) que admite el estándar
const MAX_AXES: i64 = 999;

/// Bytes por elemento según BITPIX
fn element_size(bitpix: i64) -> FitsResult<usize> {
    match bitpix {
        8 => Ok(1),
        16 => Ok(2),
        32 | -32 => Ok(4),
        64 | -64 => Ok(8),
        other => Err(FitsError::UnsupportedBitpix(other)),
    }
}

/// |BITPIX|/8 × GCOUNT × (PCOUNT + NAXIS1 × ... × NAXISn)
fn data_unit_len(header: &Header, hdu: usize) -> FitsResult<usize> {
    let size = element_size(header.require_int("BITPIX", hdu)?)?;
    let naxis = header.require_int("NAXIS", hdu)?;
    if !(0..=MAX_AXES).contains(&naxis) {
        return Err(FitsError::InvalidKeyword {
            hdu,
            key: "NAXIS".to_string(),
            value: naxis.to_string(),
        });
    }
    if naxis == 0 {
        return Ok(0);
    }

    let overflow = || FitsError::SizeOverflow { hdu, what: "data unit" };
    let mut elements: usize = 1;
    for n in 1..=naxis {
        let len = header.require_len(&format!("NAXIS{}", n), hdu)?;
        elements = elements.checked_mul(len).ok_or_else(overflow)?;
    }

    let pcount = header.len_or("PCOUNT", hdu, 0)?;
    let gcount = header.len_or("GCOUNT", hdu, 1)?;

    pcount
        .checked_add(elements)
        .and_then(|n| n.checked_mul(gcount))
        .and_then(|n| n.checked_mul(size))
        .ok_or_else(overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fits::fixtures::{primary_header, write_fits, TableBuilder};

    #[test]
    fn test_open_primary_and_table() {
        let table = TableBuilder::new("COMP")
            .column("WAVELENGTH", "1E")
            .column("THROUGHPUT", "1E")
            .row(vec![Value::Real(1000.0), Value::Real(0.5)])
            .row(vec![Value::Real(2000.0), Value::Real(0.25)]);
        let file = write_fits(&primary_header(&[]), &[table]);

        let fits = FitsFile::open(file.path()).unwrap();
        assert_eq!(fits.len(), 2);
        assert_eq!(fits.primary().kind(), HduKind::Primary);
        assert_eq!(fits.hdu(1).unwrap().kind(), HduKind::BinTable);
        assert_eq!(fits.hdu(1).unwrap().name(), "COMP");

        let t = fits.table(1).unwrap();
        assert_eq!(t.nrows(), 2);
        let rows = t.rows().unwrap();
        assert_eq!(rows[1].get("throughput"), Some(&Value::Real(0.25)));
    }

    #[test]
    fn test_variable_length_columns() {
        let table = TableBuilder::new("PHOTFLAM")
            .column("DATACOL", "12A")
            .column("PHOTFLAM1", "PD()")
            .row(vec![Value::Text("PHOTFLAM1".into()), Value::Array(vec![1.0, 2.0, 3.0])])
            .row(vec![Value::Text("PHOTFLAM".into()), Value::Array(vec![0.0])]);
        let file = write_fits(&primary_header(&[]), &[table]);

        let fits = FitsFile::open(file.path()).unwrap();
        let rows = fits.table(1).unwrap().rows().unwrap();
        assert_eq!(rows[0].get("PHOTFLAM1"), Some(&Value::Array(vec![1.0, 2.0, 3.0])));
        assert!(rows[1].get("PHOTFLAM1").unwrap().is_zero_array());
        assert_eq!(rows[1].get("DATACOL").and_then(Value::as_str), Some("PHOTFLAM"));
    }

    #[test]
    fn test_table_on_primary_is_error() {
        let file = write_fits(&primary_header(&[]), &[]);
        let fits = FitsFile::open(file.path()).unwrap();
        assert!(matches!(fits.table(0), Err(FitsError::NotATable { .. })));
        assert!(matches!(fits.hdu(3), Err(FitsError::NoSuchHdu { .. })));
    }

    #[test]
    fn test_open_garbage_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not a fits file").unwrap();
        assert!(FitsFile::open(file.path()).is_err());
    }

    /// Imagen 2×2 válida con `key` reescrita
    fn corrupt_image(key: &str, value: i64) -> tempfile::NamedTempFile {
        let bytes = crate::fits::fixtures::image_bytes(&[2, 2], &[1, 2, 3, 4]);
        let bytes = writer::set_keyword_in(&bytes, 0, key, HeaderValue::Int(value)).unwrap();
        crate::fits::fixtures::write_bytes(&bytes)
    }

    #[test]
    fn test_negative_axis_is_container_error() {
        let file = corrupt_image("NAXIS1", -2);
        assert!(matches!(
            FitsFile::open(file.path()),
            Err(FitsError::InvalidKeyword { hdu: 0, ref key, .. }) if key == "NAXIS1"
        ));

        let file = corrupt_image("NAXIS", -1);
        assert!(matches!(
            FitsFile::open(file.path()),
            Err(FitsError::InvalidKeyword { ref key, .. }) if key == "NAXIS"
        ));
    }

    #[test]
    fn test_oversized_axis_is_container_error() {
        let file = corrupt_image("NAXIS2", i64::MAX);
        assert!(matches!(FitsFile::open(file.path()), Err(FitsError::SizeOverflow { hdu: 0, .. })));

        let file = corrupt_image("NAXIS2", 10_000);
        assert!(matches!(FitsFile::open(file.path()), Err(FitsError::Truncated { .. })));
    }

    #[test]
    fn test_bad_bitpix_and_gcount() {
        let file = corrupt_image("BITPIX", 12);
        assert!(matches!(FitsFile::open(file.path()), Err(FitsError::UnsupportedBitpix(12))));

        let file = corrupt_image("GCOUNT", -1);
        assert!(matches!(
            FitsFile::open(file.path()),
            Err(FitsError::InvalidKeyword { ref key, .. }) if key == "GCOUNT"
        ));
    }

    #[test]
    fn test_read_image() {
        let file = crate::fits::fixtures::write_image(&[2, 2], &[1, -2, 3, 4]);
        let fits = FitsFile::open(file.path()).unwrap();
        let image = fits.image(0).unwrap();
        assert_eq!(image.shape, vec![2, 2]);
        assert_eq!(image.pixels, vec![1.0, -2.0, 3.0, 4.0]);
        assert_eq!(fits.primary().data_len(), 8);
        assert_eq!(fits.primary().file_bytes(), 2 * BLOCK_SIZE);
    }
}
