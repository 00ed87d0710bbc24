// src/tools/corr.rs
// ============================================================================
// LISTCORR - CRCORR / RPTCORR del header primario
// ============================================================================

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::fits::FitsFile;

pub fn list_corr(path: &Path, out: &mut impl Write) -> Result<()> {
    let fits = FitsFile::open(path)?;
    let header = &fits.primary().header;

    let lookup = |key: &str| {
        header
            .get(key)
            .map(ToString::to_string)
            .with_context(|| format!("{}: keyword {} not found", path.display(), key))
    };
    let crcorr = lookup("CRCORR")?;
    let rptcorr = lookup("RPTCORR")?;

    writeln!(out)?;
    writeln!(out, "{}", path.display())?;
    writeln!(out, "CRCORR     {}", crcorr)?;
    writeln!(out, "RPTCORR    {}", rptcorr)?;
    Ok(())
}
