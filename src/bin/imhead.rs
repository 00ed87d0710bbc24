// src/bin/imhead.rs
// ============================================================================
// IMHEAD - Imprime un header FITS o keywords sueltas
// ============================================================================
//
// Uso:
//   imhead jb1f98q1q_raw.fits
//   imhead -e 1 jb1f98q1q_raw.fits
//   imhead jb1f98q1q_raw.fits -k expstart -k expend
//
// ============================================================================

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use fitstools::tools::{headers, init_logging};

#[derive(Parser)]
#[command(name = "imhead")]
#[command(about = "Print a FITS header or keyword")]
#[command(version = "0.1.0")]
struct Args {
    /// FITS files
    #[arg(required = true)]
    fits_files: Vec<PathBuf>,

    /// Extension number
    #[arg(short, long, default_value_t = 0)]
    ext: usize,

    /// Keyword to print (repeatable)
    #[arg(short, long = "key")]
    key: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut stdout = io::stdout().lock();
    for file in &args.fits_files {
        headers::print_header(file, args.ext, &args.key, &mut stdout)?;
    }
    Ok(())
}
