// src/compare/mod.rs
// ============================================================================
// COMPFITS - ¿Son iguales dos archivos FITS?
// ============================================================================
//
// Comparaciones en orden, la primera que falla corta:
//
//   1. Número de HDUs
//   2. Nombres de HDU (mismo orden)
//   3. Tamaños: bytes de datos y bytes en disco por HDU
//   4. Por HDU: keywords (ordenadas) y después sus valores
//   5. Datos de imagen: forma y valores
//
// ============================================================================

use std::path::Path;

use thiserror::Error;

use crate::fits::{FitsError, FitsFile, Header, HduKind};

/// Keywords cuyo valor cambia legítimamente entre copias
pub const DEFAULT_IGNORE: &[&str] = &["IRAF-TLM", "DATE"];

#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub ignore_keys: Vec<String>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            ignore_keys: DEFAULT_IGNORE.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error("{more} has more extensions than {fewer} ({len1} vs {len2}).")]
    Length {
        more: &'static str,
        fewer: &'static str,
        len1: usize,
        len2: usize,
    },

    #[error("Fits file extensions do not have the same names.\n\tFits1 names: {names1:?}\n\tFits2 names: {names2:?}")]
    ExtensionNames { names1: Vec<String>, names2: Vec<String> },

    #[error("Fits file extensions do not have the same sizes.\n\tFits1 sizes: {size1:?}\n\tFits2 sizes: {size2:?}\n\tFits1 filebytes: {filebytes1:?}\n\tFits2 filebytes: {filebytes2:?}")]
    Size {
        size1: Vec<usize>,
        size2: Vec<usize>,
        filebytes1: Vec<usize>,
        filebytes2: Vec<usize>,
    },

    #[error("Fits files do not have the same header keys for extension {ext}.\nHeader keys in Fits1 but not Fits2:\n\t{extra1:?}\nHeader keys in Fits2 but not Fits1:\n\t{extra2:?}")]
    HeaderKeys {
        ext: usize,
        extra1: Vec<String>,
        extra2: Vec<String>,
    },

    #[error("Fits files have different values for some keys for extension number {ext}.\nHeader keys with different values:\n\t{keys:?}")]
    HeaderValues { ext: usize, keys: Vec<String> },

    #[error("Data arrays for fits extension {ext} do not have matching shapes.\nFits1 shape: {shape1:?}\nFits2 shape: {shape2:?}")]
    DataShape {
        ext: usize,
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Data arrays for fits extension {ext} are not equal ({differing} differing elements).")]
    DataValues { ext: usize, differing: usize },
}

/// Ejecuta todas las comparaciones
pub fn compare_files(a: impl AsRef<Path>, b: impl AsRef<Path>, options: &CompareOptions) -> Result<(), CompareError> {
    let fits1 = FitsFile::open(a)?;
    let fits2 = FitsFile::open(b)?;

    compare_length(&fits1, &fits2)?;
    compare_names(&fits1, &fits2)?;
    compare_sizes(&fits1, &fits2)?;
    for ext in 0..fits1.len() {
        let h1 = &fits1.hdus()[ext].header;
        let h2 = &fits2.hdus()[ext].header;
        compare_header_keys(h1, h2, ext)?;
        compare_header_values(h1, h2, ext, &options.ignore_keys)?;
    }
    compare_data(&fits1, &fits2)
}

pub fn compare_length(fits1: &FitsFile, fits2: &FitsFile) -> Result<(), CompareError> {
    let (len1, len2) = (fits1.len(), fits2.len());
    if len1 != len2 {
        let (more, fewer) = if len1 > len2 { ("Fits1", "Fits2") } else { ("Fits2", "Fits1") };
        return Err(CompareError::Length { more, fewer, len1, len2 });
    }
    Ok(())
}

pub fn compare_names(fits1: &FitsFile, fits2: &FitsFile) -> Result<(), CompareError> {
    let names1: Vec<String> = fits1.hdus().iter().map(|h| h.name()).collect();
    let names2: Vec<String> = fits2.hdus().iter().map(|h| h.name()).collect();
    if names1 != names2 {
        return Err(CompareError::ExtensionNames { names1, names2 });
    }
    Ok(())
}

pub fn compare_sizes(fits1: &FitsFile, fits2: &FitsFile) -> Result<(), CompareError> {
    let size1: Vec<usize> = fits1.hdus().iter().map(|h| h.data_len()).collect();
    let size2: Vec<usize> = fits2.hdus().iter().map(|h| h.data_len()).collect();
    let filebytes1: Vec<usize> = fits1.hdus().iter().map(|h| h.file_bytes()).collect();
    let filebytes2: Vec<usize> = fits2.hdus().iter().map(|h| h.file_bytes()).collect();

    if size1 != size2 || filebytes1 != filebytes2 {
        return Err(CompareError::Size {
            size1,
            size2,
            filebytes1,
            filebytes2,
        });
    }
    Ok(())
}

pub fn compare_header_keys(h1: &Header, h2: &Header, ext: usize) -> Result<(), CompareError> {
    let mut keys1 = h1.keywords();
    let mut keys2 = h2.keywords();
    keys1.sort_unstable();
    keys2.sort_unstable();

    if keys1 != keys2 {
        let extra1 = keys1.iter().filter(|k| !keys2.contains(*k)).map(|k| k.to_string()).collect();
        let extra2 = keys2.iter().filter(|k| !keys1.contains(*k)).map(|k| k.to_string()).collect();
        return Err(CompareError::HeaderKeys { ext, extra1, extra2 });
    }
    Ok(())
}

pub fn compare_header_values<S: AsRef<str>>(
    h1: &Header,
    h2: &Header,
    ext: usize,
    ignore: &[S],
) -> Result<(), CompareError> {
    let keys: Vec<String> = h1
        .keywords()
        .into_iter()
        .filter(|k| !ignore.iter().any(|i| i.as_ref().eq_ignore_ascii_case(k)))
        .filter(|k| h1.get(k) != h2.get(k))
        .map(String::from)
        .collect();

    if !keys.is_empty() {
        return Err(CompareError::HeaderValues { ext, keys });
    }
    Ok(())
}

/// Sólo HDUs imagen (o primarios) con datos en ambos archivos
pub fn compare_data(fits1: &FitsFile, fits2: &FitsFile) -> Result<(), CompareError> {
    for (ext, (hdu1, hdu2)) in fits1.hdus().iter().zip(fits2.hdus()).enumerate() {
        let is_image = |kind: HduKind| matches!(kind, HduKind::Primary | HduKind::Image);
        if !is_image(hdu1.kind()) || !is_image(hdu2.kind()) || hdu1.data_len() == 0 || hdu2.data_len() == 0 {
            continue;
        }

        let image1 = fits1.image(ext)?;
        let image2 = fits2.image(ext)?;
        if image1.shape != image2.shape {
            return Err(CompareError::DataShape {
                ext,
                shape1: image1.shape,
                shape2: image2.shape,
            });
        }

        let differing = image1
            .pixels
            .iter()
            .zip(&image2.pixels)
            .filter(|(a, b)| a != b)
            .count();
        if differing > 0 {
            return Err(CompareError::DataValues { ext, differing });
        }
        log::debug!("HDU {}: {} pixels equal", ext, image1.pixels.len());
    }
    Ok(())
}
