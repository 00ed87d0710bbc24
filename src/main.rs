// src/main.rs
// ============================================================================
// CHECKIMPHT CLI
// ============================================================================
//
// Uso:
//   checkimpht acs_wfc1_imp.fits
//   checkimpht *_imp.fits --json
//   checkimpht wfc3_uvis_imp.fits --strict -v
//
// Exit codes:
//   0 → todos los archivos comprobados por completo
//   1 → con --strict, algún archivo tiene findings
//   2 → algún archivo o extensión abortado por error fatal
//
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use fitstools::impht::{check_files, report, CheckOptions, Outcome};
use fitstools::tools::init_logging;

#[derive(Parser, Debug)]
#[command(name = "checkimpht")]
#[command(about = "Check IMPHTTAB photometry tables for internal consistency")]
#[command(version = "0.1.0")]
struct Args {
    /// IMPHTTAB files to check
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Exit with status 1 when any finding is reported
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let reports = check_files(&args.files, &CheckOptions::default());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for (i, r) in reports.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print!("{}", report::render_text(r));
        }
    }

    let outcomes: Vec<Outcome> = reports.iter().map(|r| r.outcome()).collect();
    let code = if outcomes.contains(&Outcome::Aborted) {
        2
    } else if args.strict && outcomes.contains(&Outcome::Findings) {
        1
    } else {
        0
    };
    Ok(ExitCode::from(code))
}
