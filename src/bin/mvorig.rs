// src/bin/mvorig.rs
// ============================================================================
// MVORIG - Renombra archivos (.orig)
// ============================================================================

use std::io;

use anyhow::Result;
use clap::Parser;

use fitstools::tools::{init_logging, rename};

#[derive(Parser)]
#[command(name = "mvorig")]
#[command(about = "Rename input files to the .orig form")]
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

    let moved = rename::move_files(&args.files, rename::orig_name, &mut io::stdout().lock())?;
    log::info!("{} of {} files moved", moved, args.files.len());
    Ok(())
}
