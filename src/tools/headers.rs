// src/tools/headers.rs
// ============================================================================
// IMHEAD / HEDIT - Leer y modificar keywords
// ============================================================================

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::fits::{writer, FitsFile, HeaderValue};

/// Tipo con el que hedit guarda el valor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueType {
    #[default]
    Str,
    Float,
    Int,
    Bool,
}

/// Convierte el texto de la línea de comandos al tipo pedido
pub fn parse_value(raw: &str, kind: ValueType) -> Result<HeaderValue> {
    let value = match kind {
        ValueType::Str => HeaderValue::Str(raw.to_string()),
        ValueType::Float => HeaderValue::Float(
            raw.trim()
                .parse()
                .with_context(|| format!("'{}' is not a float", raw))?,
        ),
        ValueType::Int => HeaderValue::Int(
            raw.trim()
                .parse()
                .with_context(|| format!("'{}' is not an integer", raw))?,
        ),
        ValueType::Bool => match raw {
            "True" => HeaderValue::Logical(true),
            "False" => HeaderValue::Logical(false),
            _ => bail!("Boolean values must be either 'True' or 'False'."),
        },
    };
    Ok(value)
}

/// imhead: header completo de `ext`, o sólo las cards de `keys`
pub fn print_header(path: &Path, ext: usize, keys: &[String], out: &mut impl Write) -> Result<()> {
    let fits = FitsFile::open(path)?;
    let hdu = fits
        .hdu(ext)
        .with_context(|| format!("Reading {}", path.display()))?;

    if keys.is_empty() {
        for card in hdu.header.cards() {
            writeln!(out, "{}", card)?;
        }
        return Ok(());
    }

    for key in keys {
        let card = hdu
            .header
            .card(key)
            .with_context(|| format!("{}[{}]: keyword {} not found", path.display(), ext, key.to_uppercase()))?;
        writeln!(out, "{}", card)?;
    }
    Ok(())
}

/// hedit: asigna `key = value` en el HDU `ext`
pub fn edit_header(path: &Path, ext: usize, key: &str, value: &HeaderValue, out: &mut impl Write) -> Result<()> {
    let shown = match value {
        HeaderValue::Logical(b) => if *b { "True".to_string() } else { "False".to_string() },
        other => other.to_string(),
    };
    writeln!(out, "{}[{}]: {} -> {}", path.display(), ext, key, shown)?;
    writer::set_keyword(path, ext, key, value.clone())
        .with_context(|| format!("Updating {} in {}", key, path.display()))?;
    Ok(())
}
