// src/tools/mod.rs
// ============================================================================
// TOOLS - Utilidades de línea de comandos sobre archivos FITS
// ============================================================================
//
// Cada herramienta escribe su salida en un `impl Write` para poder
// probarla; los binarios de src/bin le pasan stdout.
//
//   headers     → imhead, hedit
//   throughput  → comptoascii
//   corr        → listcorr
//   asn         → listasn
//   rename      → mvorig, mvref
//
// ============================================================================

pub mod asn;
pub mod corr;
pub mod headers;
pub mod rename;
pub mod throughput;

/// Inicializa env_logger (warn por defecto, debug con -v)
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
