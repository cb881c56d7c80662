//! Collaborators that render annotated documents.
//!
//! HTML and LaTeX generation, the literate document processor and asset
//! handling live outside this crate. The executor reaches them through
//! [`Renderer`]; every method defaults to [`PipelineError::Unavailable`], so
//! an implementation only provides the steps it supports.

use std::path::Path;

use quill_cache::Compression;
use quill_config::{CopyMode, HtmlDialect, LatexDialect, MarkPoint, WebpageStyle};
use quill_core::{GeneratorInfo, Value};

use crate::error::PipelineError;
use crate::table::{Backend, Frontend};

/// Inputs of [`Renderer::dump_html_standalone`].
#[derive(Debug)]
pub struct StandaloneRequest<'a> {
    /// Base name of the input, used as the page title.
    pub fname: &'a str,
    /// Generator shown in the banner.
    pub generator: GeneratorInfo,
    /// Page layout.
    pub webpage_style: WebpageStyle,
    /// Minify the page.
    pub html_minification: bool,
    /// Include the generator banner.
    pub include_banner: bool,
    /// Include version numbers in the banner.
    pub include_vernums: bool,
    /// Extra classes for the page root, collected by earlier steps.
    pub html_classes: &'a [String],
    /// Assets the page refers to; the renderer adds to it.
    pub assets: &'a mut Vec<String>,
}

/// Inputs of [`Renderer::gen_docutils`].
#[derive(Debug)]
pub struct DocutilsRequest<'a> {
    /// Path of the document.
    pub fpath: &'a Path,
    /// How the document is read.
    pub frontend: Frontend,
    /// What it is turned into.
    pub backend: Backend,
    /// HTML dialect.
    pub html_dialect: HtmlDialect,
    /// LaTeX engine.
    pub latex_dialect: LatexDialect,
    /// Page layout.
    pub webpage_style: WebpageStyle,
    /// Include the generator banner.
    pub include_banner: bool,
    /// Include version numbers in the banner.
    pub include_vernums: bool,
    /// Assets the output refers to; the renderer adds to it.
    pub assets: &'a mut Vec<String>,
}

fn unavailable<T>(step: &'static str) -> Result<T, PipelineError> {
    Err(PipelineError::Unavailable { step })
}

/// Rendering collaborators used by pipeline steps.
#[allow(unused_variables)]
pub trait Renderer {
    /// Post-processes annotations before rendering.
    fn apply_transforms(
        &mut self,
        annotated: Value,
        input_language: &str,
    ) -> Result<Value, PipelineError> {
        unavailable("apply_transforms")
    }

    /// Renders one HTML snippet per chunk.
    fn gen_html_snippets(
        &mut self,
        annotated: &Value,
        fname: &str,
        input_language: &str,
        html_minification: bool,
    ) -> Result<Vec<String>, PipelineError> {
        unavailable("gen_html_snippets")
    }

    /// Renders one LaTeX snippet per chunk.
    fn gen_latex_snippets(
        &mut self,
        annotated: &Value,
        input_language: &str,
    ) -> Result<Vec<String>, PipelineError> {
        unavailable("gen_latex_snippets")
    }

    /// Renders annotations interleaved with coqdoc comments.
    fn gen_html_snippets_with_coqdoc(
        &mut self,
        annotated: &Value,
        fname: &str,
        input_language: &str,
        html_minification: bool,
        html_classes: &mut Vec<String>,
    ) -> Result<Vec<String>, PipelineError> {
        unavailable("gen_html_snippets_with_coqdoc")
    }

    /// Wraps snippets into a standalone page.
    fn dump_html_standalone(
        &mut self,
        snippets: &[String],
        request: StandaloneRequest<'_>,
    ) -> Result<String, PipelineError> {
        unavailable("dump_html_standalone")
    }

    /// Prepares the literate document processor.
    fn register_docutils(
        &mut self,
        long_line_threshold: usize,
        cache_directory: Option<&Path>,
        cache_compression: Compression,
    ) -> Result<(), PipelineError> {
        unavailable("register_docutils")
    }

    /// Renders a literate document.
    fn gen_docutils(
        &mut self,
        source: &str,
        request: DocutilsRequest<'_>,
    ) -> Result<String, PipelineError> {
        unavailable("gen_docutils")
    }

    /// Lints a literate document, returning a JSON report.
    fn lint_docutils(
        &mut self,
        source: &str,
        fpath: &Path,
        frontend: Frontend,
    ) -> Result<String, PipelineError> {
        unavailable("lint_docutils")
    }

    /// Converts code with literate comments to reStructuredText.
    fn code_to_rst(
        &mut self,
        code: &str,
        fpath: &Path,
        mark_point: Option<&MarkPoint>,
        input_language: &str,
    ) -> Result<String, PipelineError> {
        unavailable("code_to_rst")
    }

    /// Converts reStructuredText with code blocks to code.
    fn rst_to_code(
        &mut self,
        rst: &str,
        fpath: &Path,
        mark_point: Option<&MarkPoint>,
        backend: Backend,
    ) -> Result<String, PipelineError> {
        unavailable("rst_to_code")
    }

    /// Places `assets` in `output_directory`. Not called for
    /// [`CopyMode::None`] or when there is nothing to place.
    fn copy_assets(
        &mut self,
        assets: &[String],
        mode: CopyMode,
        output_directory: &Path,
    ) -> Result<(), PipelineError> {
        unavailable("copy_assets")
    }
}

/// A renderer with no collaborators: every rendering step fails with
/// [`PipelineError::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRenderer;

impl Renderer for UnavailableRenderer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_names_the_step() {
        let mut renderer = UnavailableRenderer;
        let err = renderer
            .gen_latex_snippets(&Value::list(vec![]), "coq")
            .unwrap_err();
        assert_eq!(err.to_string(), "gen_latex_snippets is not available in this build");
        assert!(matches!(
            renderer.lint_docutils("", Path::new("a.rst"), Frontend::Rst),
            Err(PipelineError::Unavailable { step: "lint_docutils" })
        ));
    }
}
