//! Diagnostic output setup.

use tracing_subscriber::EnvFilter;

/// Crates whose events are shown.
const TARGETS: &[&str] = &[
    "quill",
    "quill_core",
    "quill_serial",
    "quill_cache",
    "quill_config",
    "quill_pipeline",
];

/// The filter used when `RUST_LOG` is not set.
pub fn default_directives(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the global subscriber. Logs go to stderr; stdout carries
/// documents written to `-`.
pub fn setup_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug)
        .init();
}
