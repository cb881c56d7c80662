//! Pipeline steps and the state threaded between them.

use std::fmt;
use std::path::PathBuf;

use quill_core::Value;
use quill_serial::Wire;

use crate::inputs::Field;

/// One stage of a pipeline.
///
/// Every step consumes the [`Payload`] produced by the previous one and the
/// context fields listed by [`Step::inputs`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Read the input as text (stdin for `-`).
    ReadPlain,
    /// Read the input as a JSON array of chunk strings.
    ReadJson,
    /// Use the whole text as a single chunk.
    ParsePlain,
    /// Run the chunks through the prover, via the cache.
    AnnotateChunks,
    /// Post-process annotations (collaborator).
    ApplyTransforms,
    /// Render annotations to HTML snippets (collaborator).
    GenHtmlSnippets,
    /// Render annotations to LaTeX snippets (collaborator).
    GenLatexSnippets,
    /// Render annotations and coqdoc comments to HTML (collaborator).
    GenHtmlSnippetsWithCoqdoc,
    /// Wrap HTML snippets into a standalone page (collaborator).
    DumpHtmlStandalone,
    /// Concatenate HTML snippets with block-end markers.
    DumpHtmlSnippets,
    /// Concatenate LaTeX snippets with block-end markers.
    DumpLatexSnippets,
    /// Encode annotations with the configured serializer.
    EncodeJson,
    /// Pretty-print a wire tree.
    DumpJson,
    /// Set up the document processor (collaborator).
    RegisterDocutils,
    /// Render a literate document (collaborator).
    GenDocutils,
    /// Lint a literate document (collaborator).
    LintDocutils,
    /// Convert code with literate comments to reST (collaborator).
    CodeToRst,
    /// Convert reST with code blocks to code (collaborator).
    RstToCode,
    /// Place assets next to the output (collaborator).
    CopyAssets,
    /// Write the result next to the input, to `--output`, or to stdout.
    WriteFile {
        /// Extension appended to the output name.
        ext: &'static str,
        /// Suffixes removed from the end of the input name first.
        strip: &'static [&'static str],
    },
}

impl Step {
    /// The step's name, as shown in logs.
    pub fn name(self) -> &'static str {
        match self {
            Step::ReadPlain => "read_plain",
            Step::ReadJson => "read_json",
            Step::ParsePlain => "parse_plain",
            Step::AnnotateChunks => "annotate_chunks",
            Step::ApplyTransforms => "apply_transforms",
            Step::GenHtmlSnippets => "gen_html_snippets",
            Step::GenLatexSnippets => "gen_latex_snippets",
            Step::GenHtmlSnippetsWithCoqdoc => "gen_html_snippets_with_coqdoc",
            Step::DumpHtmlStandalone => "dump_html_standalone",
            Step::DumpHtmlSnippets => "dump_html_snippets",
            Step::DumpLatexSnippets => "dump_latex_snippets",
            Step::EncodeJson => "encode_json",
            Step::DumpJson => "dump_json",
            Step::RegisterDocutils => "register_docutils",
            Step::GenDocutils => "gen_docutils",
            Step::LintDocutils => "lint_docutils",
            Step::CodeToRst => "code_to_rst",
            Step::RstToCode => "rst_to_code",
            Step::CopyAssets => "copy_assets",
            Step::WriteFile { .. } => "write_file",
        }
    }

    /// Context fields the step reads.
    ///
    /// The executor only lets a step read these, through [`StepInputs`].
    ///
    /// [`StepInputs`]: crate::inputs::StepInputs
    pub fn inputs(self) -> &'static [Field] {
        use Field::*;
        match self {
            Step::ReadPlain | Step::ReadJson => &[Fpath, Fname],
            Step::ParsePlain
            | Step::DumpHtmlSnippets
            | Step::DumpLatexSnippets
            | Step::DumpJson => &[],
            Step::AnnotateChunks => &[
                Fpath,
                InputLanguage,
                ProverConfigs,
                CacheDirectory,
                CacheCompression,
            ],
            Step::ApplyTransforms | Step::GenLatexSnippets => &[InputLanguage],
            Step::GenHtmlSnippets => &[Fname, InputLanguage, HtmlMinification],
            Step::GenHtmlSnippetsWithCoqdoc => {
                &[Fname, InputLanguage, HtmlMinification, HtmlClasses]
            }
            Step::DumpHtmlStandalone => &[
                Fname,
                InputLanguage,
                WebpageStyle,
                HtmlMinification,
                IncludeBanner,
                IncludeVernums,
                HtmlClasses,
                Assets,
            ],
            Step::EncodeJson => &[JsonSerializer],
            Step::RegisterDocutils => &[LongLineThreshold, CacheDirectory, CacheCompression],
            Step::GenDocutils => &[
                Fpath,
                Frontend,
                Backend,
                HtmlDialect,
                LatexDialect,
                WebpageStyle,
                IncludeBanner,
                IncludeVernums,
                Assets,
            ],
            Step::LintDocutils => &[Fpath, Frontend],
            Step::CodeToRst => &[Fpath, MarkPoint, InputLanguage],
            Step::RstToCode => &[Fpath, MarkPoint, Backend],
            Step::CopyAssets => &[Assets, CopyAssets, OutputDirectory],
            Step::WriteFile { .. } => &[Fname, Output, OutputDirectory],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::WriteFile { ext, .. } => write!(f, "write_file({ext})"),
            other => f.write_str(other.name()),
        }
    }
}

/// The state passed from one step to the next.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// Before the first step.
    Empty,
    /// Document text: source, rendered page, lint report.
    Text(String),
    /// Source chunks, one prover session.
    Chunks(Vec<String>),
    /// One annotation per chunk, as a list value.
    Annotated(Value),
    /// Serializer output.
    Wire(Wire),
    /// Rendered per-chunk snippets.
    Snippets(Vec<String>),
    /// The output was written, to a file or to stdout (`None`).
    Written(Option<PathBuf>),
}

impl Payload {
    /// Short description used in state mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Empty => "nothing",
            Payload::Text(_) => "text",
            Payload::Chunks(_) => "chunks",
            Payload::Annotated(_) => "annotations",
            Payload::Wire(_) => "wire tree",
            Payload::Snippets(_) => "snippets",
            Payload::Written(_) => "written output",
        }
    }
}
