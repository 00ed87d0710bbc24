// src/bin/compfits.rs
// ============================================================================
// COMPFITS - Compara headers y datos de dos archivos FITS
// ============================================================================
//
// Uso: compfits a.fits b.fits [--ignore KEY]...
//
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use fitstools::compare::{compare_files, CompareOptions};
use fitstools::tools::init_logging;

#[derive(Parser)]
#[command(name = "compfits")]
#[command(about = "Compare the headers and data of two FITS files")]
#[command(version = "0.1.0")]
struct Args {
    fits1: PathBuf,
    fits2: PathBuf,

    /// Additional header keyword whose value may differ
    #[arg(long = "ignore", value_name = "KEY")]
    ignore: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut options = CompareOptions::default();
    options.ignore_keys.extend(args.ignore);

    match compare_files(&args.fits1, &args.fits2, &options) {
        Ok(()) => {
            println!("All sameness tests passed for files:");
            println!("\t{}", args.fits1.display());
            println!("\t{}", args.fits2.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{}", err);
            ExitCode::FAILURE
        }
    }
}
