//! Per-document execution context.

use std::path::{Path, PathBuf};

use quill_config::Settings;

use crate::error::PipelineError;
use crate::resolve::Resolved;
use crate::table::{Backend, Frontend};

/// Everything a step may read about the document being processed.
///
/// Built once per document and read-only while its steps run.
#[derive(Debug, Clone)]
pub struct ExecutionContext<'s> {
    /// Run-wide settings.
    pub settings: &'s Settings,
    /// Path the input is read from, or the name reported for stdin.
    pub fpath: PathBuf,
    /// Base name of the input, `-` for stdin.
    pub fname: String,
    /// Frontend of the resolved pipeline.
    pub frontend: Frontend,
    /// Backend of the resolved pipeline.
    pub backend: Backend,
    /// Prover language, if the frontend has one.
    pub input_language: Option<&'static str>,
    /// Directory outputs are written to.
    pub output_directory: PathBuf,
}

impl<'s> ExecutionContext<'s> {
    /// Builds the context for `input` (`-` for stdin).
    pub fn build(
        input: &str,
        resolved: &Resolved,
        settings: &'s Settings,
    ) -> Result<Self, PipelineError> {
        let (fpath, fname) = if input == "-" {
            let fpath = settings
                .stdin_filename
                .clone()
                .unwrap_or_else(|| PathBuf::from("-"));
            (fpath, "-".to_string())
        } else {
            let fpath = PathBuf::from(input);
            let fname = fpath
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.to_string());
            (fpath, fname)
        };

        let output_directory = match &settings.output_directory {
            Some(dir) => dir.clone(),
            None if fname == "-" => PathBuf::from("."),
            None => parent_directory(&fpath)?,
        };

        Ok(ExecutionContext {
            settings,
            fpath,
            fname,
            frontend: resolved.frontend,
            backend: resolved.backend,
            input_language: resolved.frontend.input_language(),
            output_directory,
        })
    }

    /// Whether the input comes from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.fname == "-"
    }

    /// Where [`Step::WriteFile`](crate::Step::WriteFile) puts its output:
    /// `None` for stdout.
    pub fn output_path(&self, ext: &str, strip: &[&str]) -> Option<PathBuf> {
        match &self.settings.output {
            Some(output) if output.as_os_str() == "-" => None,
            Some(output) => Some(output.clone()),
            None if self.reads_stdin() => None,
            None => Some(output_beside(&self.fname, &self.output_directory, ext, strip)),
        }
    }
}

/// `<output_directory>/<fname minus strip><ext>`.
pub(crate) fn output_beside(
    fname: &str,
    output_directory: &Path,
    ext: &str,
    strip: &[&str],
) -> PathBuf {
    let stem = strip_suffixes(fname, strip);
    output_directory.join(format!("{stem}{ext}"))
}

fn parent_directory(fpath: &Path) -> Result<PathBuf, PipelineError> {
    let absolute = std::path::absolute(fpath).map_err(|e| PipelineError::io(fpath, e))?;
    Ok(absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(absolute))
}

/// Removes the longest tail of `name` made up entirely of `suffixes`.
///
/// The tail is any sequence of the suffixes, in any order and with
/// repeats. Which suffix matches at the very end does not matter: with
/// `b.c`, `.c` and `ab`, `xab.c` becomes `x`, not `xa`.
pub(crate) fn strip_suffixes<'a>(name: &'a str, suffixes: &[&str]) -> &'a str {
    // ends_here[i]: name[i..] is a concatenation of suffixes.
    let mut ends_here = vec![false; name.len() + 1];
    ends_here[name.len()] = true;
    for i in (0..name.len()).rev() {
        if !name.is_char_boundary(i) {
            continue;
        }
        ends_here[i] = suffixes
            .iter()
            .any(|s| !s.is_empty() && name[i..].starts_with(s) && ends_here[i + s.len()]);
    }
    let cut = (0..=name.len()).find(|&i| ends_here[i]).unwrap_or(name.len());
    &name[..cut]
}
