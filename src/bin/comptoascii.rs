// src/bin/comptoascii.rs
// ============================================================================
// COMPTOASCII - Tabla de throughput a texto en el directorio actual
// ============================================================================

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use fitstools::tools::{init_logging, throughput};

#[derive(Parser)]
#[command(name = "comptoascii")]
#[command(about = "Convert a component throughput table to an ASCII file")]
#[command(version = "0.1.0")]
struct Args {
    /// Component table with WAVELENGTH and THROUGHPUT columns
    table: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let out = throughput::output_name(&args.table, Path::new("."));
    println!("Saving data to {}", out.display());
    throughput::comp_to_ascii(&args.table, Path::new("."))?;
    Ok(())
}
