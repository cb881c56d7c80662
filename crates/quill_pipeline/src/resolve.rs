//! Choosing the pipeline for each input.

use std::path::Path;

use crate::error::PipelineError;
use crate::step::Step;
use crate::table::{Backend, Frontend};

/// The pipeline chosen for one document.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    /// How the input is read.
    pub frontend: Frontend,
    /// What it is turned into.
    pub backend: Backend,
    /// The steps, in execution order.
    pub steps: Vec<Step>,
}

/// One input of a run, paired with its pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct Job {
    /// Input path as given, or `-` for stdin.
    pub input: String,
    /// Its pipeline.
    pub resolved: Resolved,
}

/// Infers the frontend from an input path.
pub fn infer_frontend(path: &str) -> Result<Frontend, PipelineError> {
    Frontend::from_path(path).ok_or_else(|| PipelineError::CannotInfer {
        kind: "input",
        path: path.to_string(),
        flag: "--frontend",
    })
}

/// Infers the backend from the output path, or uses the frontend's default.
pub fn infer_backend(frontend: Frontend, output: Option<&Path>) -> Result<Backend, PipelineError> {
    let Some(output) = output else {
        return Ok(frontend.default_backend());
    };
    let output = output.to_string_lossy();
    Backend::from_path(&output).ok_or_else(|| PipelineError::CannotInfer {
        kind: "output",
        path: output.into_owned(),
        flag: "--backend",
    })
}

/// Resolves the pipeline for `path`.
///
/// Explicit choices win over inference. Fails if the frontend has no
/// pipeline for the backend.
pub fn resolve(
    path: &str,
    frontend: Option<Frontend>,
    backend: Option<Backend>,
    output: Option<&Path>,
) -> Result<Resolved, PipelineError> {
    let frontend = match frontend {
        Some(frontend) => frontend,
        None => infer_frontend(path)?,
    };
    let backend = match backend {
        Some(backend) => backend,
        None => infer_backend(frontend, output)?,
    };
    let steps = frontend
        .pipeline(backend)
        .ok_or_else(|| PipelineError::UnsupportedBackend {
            frontend: frontend.tag().to_string(),
            backend: backend.tag().to_string(),
            supported: frontend
                .supported_backends()
                .iter()
                .map(|b| format!("'{b}'"))
                .collect::<Vec<_>>()
                .join(", "),
        })?;
    tracing::debug!(path, %frontend, %backend, "Resolved pipeline");
    Ok(Resolved {
        frontend,
        backend,
        steps,
    })
}

/// Resolves every input of a run before any of them is processed.
///
/// Input from stdin (`-`) is classified by `stdin_filename` when given.
pub fn plan(
    inputs: &[String],
    frontend: Option<Frontend>,
    backend: Option<Backend>,
    output: Option<&Path>,
    stdin_filename: Option<&Path>,
) -> Result<Vec<Job>, PipelineError> {
    inputs
        .iter()
        .map(|input| {
            let name = match stdin_filename {
                Some(name) if input == "-" => name.to_string_lossy().into_owned(),
                _ => input.clone(),
            };
            let resolved = resolve(&name, frontend, backend, output)?;
            Ok(Job {
                input: input.clone(),
                resolved,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_choices_skip_inference() {
        let r = resolve("notes.txt", Some(Frontend::Coq), Some(Backend::Json), None).unwrap();
        assert_eq!((r.frontend, r.backend), (Frontend::Coq, Backend::Json));
        assert_eq!(r.steps.len(), 6);
    }

    #[test]
    fn backend_follows_output_suffix() {
        let r = resolve("a.v", None, None, Some(Path::new("out/a.tex"))).unwrap();
        assert_eq!(r.backend, Backend::Latex);
    }

    #[test]
    fn unknown_input_suffix() {
        let err = resolve("notes.txt", None, None, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "input: Not sure what to do with 'notes.txt'.\nTry passing --frontend?"
        );
    }

    #[test]
    fn unknown_output_suffix() {
        let err = resolve("a.v", None, None, Some(Path::new("a.pdf"))).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::CannotInfer { kind: "output", flag: "--backend", .. }
        ));
    }

    #[test]
    fn unsupported_backend_lists_alternatives() {
        let err = resolve("a.md", None, Some(Backend::Json), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "argument --backend: Frontend 'md' does not support backend 'json': \
             expecting one of 'webpage', 'latex', 'lint'"
        );
    }

    #[test]
    fn plan_fails_before_any_document_runs() {
        let inputs = vec!["a.v".to_string(), "b.txt".to_string()];
        assert!(plan(&inputs, None, None, None, None).is_err());
    }

    #[test]
    fn plan_classifies_stdin_by_its_name() {
        let inputs = vec!["-".to_string()];
        let jobs = plan(&inputs, None, None, None, Some(Path::new("doc.v.json"))).unwrap();
        assert_eq!(jobs[0].input, "-");
        assert_eq!(jobs[0].resolved.frontend, Frontend::CoqJson);

        assert!(plan(&inputs, None, None, None, None).is_err());
    }
}
