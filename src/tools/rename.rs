// src/tools/rename.rs
// ============================================================================
// MVORIG / MVREF - Renombrado por lotes
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// `f` → `f.orig`
pub fn orig_name(name: &str) -> String {
    format!("{}.orig", name)
}

/// `x.fits` → `x_ref.fits`: "_ref" antes de los últimos 5 caracteres
pub fn ref_name(name: &str) -> String {
    let split = name
        .char_indices()
        .rev()
        .nth(4)
        .map(|(i, _)| i)
        .unwrap_or(0);
    format!("{}_ref{}", &name[..split], &name[split..])
}

/// Mueve cada archivo existente; los que no existen se reportan y se saltan.
/// Devuelve cuántos se movieron.
pub fn move_files<S: AsRef<str>>(files: &[S], rename: fn(&str) -> String, out: &mut impl Write) -> Result<usize> {
    let mut moved = 0;
    for file in files {
        let file = file.as_ref();
        if !Path::new(file).exists() {
            writeln!(out, "File does not exist: {}", file)?;
            continue;
        }
        let target = rename(file);
        writeln!(out, "Moving file {} to {}", file, target)?;
        fs::rename(file, &target).with_context(|| format!("Moving {} to {}", file, target))?;
        moved += 1;
    }
    Ok(moved)
}
