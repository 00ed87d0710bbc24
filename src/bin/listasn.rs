// src/bin/listasn.rs
// ============================================================================
// LISTASN - Tablas de asociación dadas, o *_asn.fits del directorio actual
// ============================================================================

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use fitstools::tools::{asn, init_logging};

#[derive(Parser)]
#[command(name = "listasn")]
#[command(about = "Show the members of association tables")]
#[command(version = "0.1.0")]
struct Args {
    /// Association tables (default: *_asn.fits in the current directory)
    asn_files: Vec<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let files = if args.asn_files.is_empty() {
        asn::find_asns(Path::new("."))?
    } else {
        args.asn_files
    };

    let mut stdout = io::stdout().lock();
    for file in &files {
        asn::list_asn(file, &mut stdout)?;
    }
    Ok(())
}
