// src/tools/asn.rs
// ============================================================================
// LISTASN - Contenido de las tablas de asociación (*_asn.fits)
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::fits::FitsFile;

const ASN_SUFFIX: &str = "_asn.fits";
const WIDTH: usize = 16;

/// `*_asn.fits` en `dir`, ordenados por nombre
pub fn find_asns(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Listing {}", dir.display()))? {
        let path = entry?.path();
        let is_asn = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(ASN_SUFFIX));
        if is_asn && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// MEMNAME / MEMTYPE / MEMPRSNT: las tres primeras columnas de la extensión 1
pub fn list_asn(path: &Path, out: &mut impl Write) -> Result<()> {
    let fits = FitsFile::open(path)?;
    let table = fits
        .table(1)
        .with_context(|| format!("{}: extension 1", path.display()))?;
    let rows = table.rows()?;

    writeln!(out)?;
    writeln!(out, "{}", path.display())?;
    writeln!(out, "{:<w$}{:<w$}Present", "File", "Type", w = WIDTH)?;
    for (i, row) in rows.iter().enumerate() {
        let cell = |n: usize| {
            row.value_at(n)
                .map(ToString::to_string)
                .with_context(|| format!("{}: row {} has fewer than 3 columns", path.display(), i))
        };
        writeln!(out, "{:<w$}{:<w$}{}", cell(0)?, cell(1)?, cell(2)?, w = WIDTH)?;
    }
    Ok(())
}
