// src/bin/hedit.rs
// ============================================================================
// HEDIT - Añade o modifica una keyword
// ============================================================================
//
// Uso:
//   hedit jb1f98q1q_raw.fits EXPSTART 58000 -i
//   hedit *.fits FLATCORR PERFORM
//   hedit jb1f98q1q_raw.fits SOMEKEY SOMEVALUE --ext 1
//
// ============================================================================

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser};

use fitstools::tools::headers::{self, ValueType};
use fitstools::tools::init_logging;

#[derive(Parser)]
#[command(name = "hedit")]
#[command(about = "Add or modify a header value")]
#[command(version = "0.1.0")]
#[command(group(ArgGroup::new("type").args(["str", "float", "int", "bool"])))]
struct Args {
    /// FITS files followed by KEYWORD and NEW_VALUE
    #[arg(required = true, num_args = 3.., value_name = "FITS_FILES... KEYWORD NEW_VALUE")]
    args: Vec<String>,

    /// Extension number
    #[arg(short, long, default_value_t = 0)]
    ext: usize,

    /// Store value as string (default)
    #[arg(short, long)]
    str: bool,

    /// Store value as float
    #[arg(short, long)]
    float: bool,

    /// Store value as integer
    #[arg(short, long)]
    int: bool,

    /// Store value as boolean (True/False)
    #[arg(short, long)]
    bool: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn value_type(&self) -> ValueType {
        if self.float {
            ValueType::Float
        } else if self.int {
            ValueType::Int
        } else if self.bool {
            ValueType::Bool
        } else {
            ValueType::Str
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // num_args = 3.. garantiza archivos + keyword + valor
    let (files, rest) = args.args.split_at(args.args.len() - 2);
    let (keyword, raw) = (&rest[0], &rest[1]);
    let value = headers::parse_value(raw, args.value_type())?;

    let mut stdout = io::stdout().lock();
    for file in files {
        headers::edit_header(&PathBuf::from(file), args.ext, keyword, &value, &mut stdout)?;
    }
    Ok(())
}
