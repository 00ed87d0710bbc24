// src/fits/writer.rs
// ============================================================================
// HEADER WRITER - Modifica una keyword y reescribe el archivo
// ============================================================================
//
// Las cards no tocadas se copian tal cual. Si el header crece un bloque,
// el resto del archivo se desplaza 2880 bytes.
//
// ============================================================================

use std::fs;
use std::path::Path;

use super::error::{FitsError, FitsResult};
use super::header::HeaderValue;
use super::scan_hdus;

/// Asigna `key = value` en el header del HDU `ext`
pub fn set_keyword(path: impl AsRef<Path>, ext: usize, key: &str, value: HeaderValue) -> FitsResult<()> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| FitsError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let updated = set_keyword_in(&bytes, ext, key, value)?;
    fs::write(path, updated)?;
    Ok(())
}

/// Versión en memoria de [`set_keyword`]
pub fn set_keyword_in(bytes: &[u8], ext: usize, key: &str, value: HeaderValue) -> FitsResult<Vec<u8>> {
    let hdus = scan_hdus(bytes)?;
    let count = hdus.len();
    let hdu = hdus
        .into_iter()
        .nth(ext)
        .ok_or(FitsError::NoSuchHdu { index: ext, count })?;

    let (header_offset, data_offset) = (hdu.header_offset(), hdu.data_offset());
    let old_len = data_offset - header_offset;
    let mut header = hdu.header;
    header.set(key, value)?;
    let new_header = header.to_bytes();

    if new_header.len() != old_len {
        log::debug!(
            "HDU {}: header grows from {} to {} bytes",
            ext, old_len, new_header.len()
        );
    }

    let mut out = Vec::with_capacity(bytes.len() - old_len + new_header.len());
    out.extend_from_slice(&bytes[..header_offset]);
    out.extend_from_slice(&new_header);
    out.extend_from_slice(&bytes[data_offset..]);
    Ok(out)
}
