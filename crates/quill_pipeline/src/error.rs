//! Error types for pipeline resolution and execution.

use std::path::PathBuf;

use quill_cache::CacheError;
use quill_core::ProverError;
use quill_serial::SerialError;

/// Errors that can occur while resolving or running a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No suffix rule matched an input or output path.
    #[error("{kind}: Not sure what to do with '{path}'.\nTry passing {flag}?")]
    CannotInfer {
        /// `input` or `output`.
        kind: &'static str,
        /// The path that could not be classified.
        path: String,
        /// The flag that would settle it.
        flag: &'static str,
    },

    /// `--frontend` named no known frontend.
    #[error("unknown frontend '{tag}'")]
    UnknownFrontend {
        /// The rejected tag.
        tag: String,
    },

    /// `--backend` named no known backend.
    #[error("unknown backend '{tag}'")]
    UnknownBackend {
        /// The rejected tag.
        tag: String,
    },

    /// The frontend has no pipeline for the backend.
    #[error(
        "argument --backend: Frontend '{frontend}' does not support backend '{backend}': \
         expecting one of {supported}"
    )]
    UnsupportedBackend {
        /// Frontend tag.
        frontend: String,
        /// Backend tag.
        backend: String,
        /// Supported backends, quoted and comma-separated.
        supported: String,
    },

    /// A step received state it cannot consume.
    #[error("step {step} cannot consume {found}")]
    UnexpectedState {
        /// Name of the step.
        step: &'static str,
        /// Kind of payload it got.
        found: &'static str,
    },

    /// A step needs a prover language the frontend does not have.
    #[error("{step} needs an input language, but the frontend has none")]
    NoInputLanguage {
        /// Name of the step.
        step: &'static str,
    },

    /// A step read a context field it does not declare.
    #[error("step {step} reads undeclared input {field}")]
    UndeclaredInput {
        /// Name of the step.
        step: &'static str,
        /// Name of the field.
        field: &'static str,
    },

    /// No collaborator is available for a rendering step.
    #[error("{step} is not available in this build")]
    Unavailable {
        /// Name of the step.
        step: &'static str,
    },

    /// A collaborator failed.
    #[error("{step} failed: {reason}")]
    Render {
        /// Name of the step.
        step: &'static str,
        /// Description of the failure.
        reason: String,
    },

    /// Reading or writing a document failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON input could not be parsed, or output could not be printed.
    #[error("JSON error for {path}: {source}")]
    Json {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Encoding annotations failed.
    #[error(transparent)]
    Serial(#[from] SerialError),

    /// The cache could not be opened, read or written.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The prover could not be found or failed.
    #[error(transparent)]
    Prover(#[from] ProverError),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}
