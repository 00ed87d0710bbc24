// src/tools/throughput.rs
// ============================================================================
// COMPTOASCII - Tabla de throughput de componente → texto
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::fits::FitsFile;

const WIDTH: usize = 20;

/// `<dir>/<stem>.txt` para la tabla `path`
pub fn output_name(path: &Path, dir: &Path) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default();
    let mut name = stem.to_os_string();
    name.push(".txt");
    dir.join(name)
}

/// Texto con columnas WAVELENGTH y THROUGHPUT de la extensión 1
pub fn render(path: &Path) -> Result<String> {
    let fits = FitsFile::open(path)?;
    let table = fits
        .table(1)
        .with_context(|| format!("{}: extension 1", path.display()))?;

    let mut text = format!("{:<w$}{:<w$}\n", "wavelength", "throughput", w = WIDTH);
    for (i, row) in table.rows()?.iter().enumerate() {
        let wave = row
            .get("WAVELENGTH")
            .with_context(|| format!("{}: row {} has no WAVELENGTH", path.display(), i))?;
        let thru = row
            .get("THROUGHPUT")
            .with_context(|| format!("{}: row {} has no THROUGHPUT", path.display(), i))?;
        text.push_str(&format!("{:<w$}{:<w$}\n", wave.to_string(), thru.to_string(), w = WIDTH));
    }
    Ok(text)
}

/// Escribe la tabla en `dir` y devuelve la ruta creada
pub fn comp_to_ascii(path: &Path, dir: &Path) -> Result<PathBuf> {
    let out = output_name(path, dir);
    let text = render(path)?;
    fs::write(&out, text).with_context(|| format!("Writing {}", out.display()))?;
    Ok(out)
}
