// src/bin/listcorr.rs
// ============================================================================
// LISTCORR - CRCORR y RPTCORR de cada archivo
// ============================================================================

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use fitstools::tools::{corr, init_logging};

#[derive(Parser)]
#[command(name = "listcorr")]
#[command(about = "Show CRCORR and RPTCORR from FITS headers")]
#[command(version = "0.1.0")]
struct Args {
    /// FITS files
    #[arg(required = true)]
    fits_files: Vec<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut stdout = io::stdout().lock();
    for file in &args.fits_files {
        corr::list_corr(file, &mut stdout)?;
    }
    Ok(())
}
