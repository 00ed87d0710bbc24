// src/bin/mvref.rs
// ============================================================================
// MVREF - Renombra archivos (_ref.fits)
// ============================================================================

use std::io;

use anyhow::Result;
use clap::Parser;

use fitstools::tools::{init_logging, rename};

#[derive(Parser)]
#[command(name = "mvref")]
#[command(about = "Rename input files to the _ref.fits form")]
#[command(version = "0.1.0")]
struct Args {
    /// Files to move
    #[arg(required = true)]
    files: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let moved = rename::move_files(&args.files, rename::ref_name, &mut io::stdout().lock())?;
    log::info!("{} of {} files moved", moved, args.files.len());
    Ok(())
}
