//! Frontends, backends and the static pipeline table.

use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;
use crate::step::Step;

/// How an input document is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Frontend {
    /// JSON array of Coq fragments.
    CoqJson,
    /// JSON array of Lean 3 fragments.
    Lean3Json,
    /// Plain Coq source.
    Coq,
    /// Lean 3 source.
    Lean3,
    /// Coq source with reStructuredText in comments.
    CoqRst,
    /// Coq source with coqdoc comments.
    Coqdoc,
    /// reStructuredText document with embedded code.
    Rst,
    /// Markdown document with embedded code.
    Md,
}

/// What an input document is turned into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Annotations as a JSON wire tree.
    Json,
    /// One HTML snippet per fragment.
    SnippetsHtml,
    /// One LaTeX snippet per fragment.
    SnippetsLatex,
    /// Annotate and discard (warms the cache).
    Null,
    /// A standalone HTML page.
    Webpage,
    /// Lint report as JSON.
    Lint,
    /// reStructuredText.
    Rst,
    /// A LaTeX document.
    Latex,
    /// Coq source.
    Coq,
    /// Coq source with reStructuredText in comments.
    CoqRst,
    /// Lean 3 source. Inferred from `.lean` outputs; no frontend produces it.
    Lean3,
}

/// Frontends by input suffix, first match wins.
const FRONTENDS_BY_SUFFIX: &[(&str, Frontend)] = &[
    (".v.json", Frontend::CoqJson),
    (".lean3.json", Frontend::Lean3Json),
    (".v", Frontend::CoqRst),
    (".lean", Frontend::Lean3),
    (".lean3", Frontend::Lean3),
    (".rst", Frontend::Rst),
    (".md", Frontend::Md),
];

/// Backends by output suffix, first match wins.
const BACKENDS_BY_SUFFIX: &[(&str, Backend)] = &[
    (".lint.json", Backend::Lint),
    (".snippets.html", Backend::SnippetsHtml),
    (".snippets.tex", Backend::SnippetsLatex),
    (".v.html", Backend::Webpage),
    (".v.tex", Backend::Latex),
    (".v", Backend::Coq),
    (".lean", Backend::Lean3),
    (".json", Backend::Json),
    (".rst", Backend::Rst),
    (".html", Backend::Webpage),
    (".tex", Backend::Latex),
];

const LEAN_SNIPPETS: &[&str] = &[".lean", ".lean3"];
const LEAN_JSON_SNIPPETS: &[&str] = &[".lean", ".lean3", ".json"];
const RST_STRIP: &[&str] = &[".v", ".lean", ".lean3", ".rst"];
const MD_STRIP: &[&str] = &[".v", ".lean", ".lean3", ".md"];

impl Frontend {
    /// Every frontend, in the order they are listed to users.
    pub const ALL: [Frontend; 8] = [
        Frontend::CoqJson,
        Frontend::Lean3Json,
        Frontend::Coq,
        Frontend::Lean3,
        Frontend::CoqRst,
        Frontend::Coqdoc,
        Frontend::Rst,
        Frontend::Md,
    ];

    /// The short tag naming this frontend.
    pub fn tag(self) -> &'static str {
        match self {
            Frontend::CoqJson => "coq.json",
            Frontend::Lean3Json => "lean3.json",
            Frontend::Coq => "coq",
            Frontend::Lean3 => "lean3",
            Frontend::CoqRst => "coq+rst",
            Frontend::Coqdoc => "coqdoc",
            Frontend::Rst => "rst",
            Frontend::Md => "md",
        }
    }

    /// Infers the frontend from an input path.
    pub fn from_path(path: &str) -> Option<Self> {
        FRONTENDS_BY_SUFFIX
            .iter()
            .find(|(suffix, _)| path.ends_with(suffix))
            .map(|&(_, frontend)| frontend)
    }

    /// Backend used when neither `--backend` nor an output path says otherwise.
    pub fn default_backend(self) -> Backend {
        match self {
            Frontend::CoqJson | Frontend::Lean3Json => Backend::Json,
            _ => Backend::Webpage,
        }
    }

    /// The prover language of this frontend's code, if it has any.
    pub fn input_language(self) -> Option<&'static str> {
        match self {
            Frontend::Coq | Frontend::Coqdoc | Frontend::CoqRst | Frontend::CoqJson => {
                Some("coq")
            }
            Frontend::Lean3 | Frontend::Lean3Json => Some("lean3"),
            Frontend::Rst | Frontend::Md => None,
        }
    }

    /// Backends this frontend has a pipeline for.
    pub fn supported_backends(self) -> &'static [Backend] {
        use Backend::*;
        match self {
            Frontend::CoqJson | Frontend::Lean3Json => &[Json, SnippetsHtml, SnippetsLatex],
            Frontend::Coq => &[Null, Webpage, SnippetsHtml, SnippetsLatex, Lint, Rst, Json],
            Frontend::Lean3 => &[Null, Webpage, SnippetsHtml, SnippetsLatex, Json],
            Frontend::CoqRst => &[Webpage, Latex, Lint, Rst],
            Frontend::Coqdoc => &[Webpage],
            Frontend::Rst => &[Webpage, Latex, Lint, Coq, CoqRst],
            Frontend::Md => &[Webpage, Latex, Lint],
        }
    }

    /// The steps turning this frontend's input into `backend`'s output, or
    /// `None` if the pair has no pipeline.
    pub fn pipeline(self, backend: Backend) -> Option<Vec<Step>> {
        use Step::*;
        let write = |ext: &'static str, strip: &'static [&'static str]| WriteFile { ext, strip };
        let steps = match (self, backend) {
            (Frontend::CoqJson | Frontend::Lean3Json, Backend::Json) => vec![
                ReadJson,
                AnnotateChunks,
                EncodeJson,
                DumpJson,
                write(".io.json", &[".json"]),
            ],
            (Frontend::CoqJson | Frontend::Lean3Json, Backend::SnippetsHtml) => vec![
                ReadJson,
                AnnotateChunks,
                ApplyTransforms,
                GenHtmlSnippets,
                DumpHtmlSnippets,
                write(".snippets.html", self.json_snippet_strip()),
            ],
            (Frontend::CoqJson | Frontend::Lean3Json, Backend::SnippetsLatex) => vec![
                ReadJson,
                AnnotateChunks,
                ApplyTransforms,
                GenLatexSnippets,
                DumpLatexSnippets,
                write(".snippets.tex", self.json_snippet_strip()),
            ],
            (Frontend::Coq | Frontend::Lean3, Backend::Null) => {
                vec![ReadPlain, ParsePlain, AnnotateChunks]
            }
            (Frontend::Coq | Frontend::Lean3, Backend::Webpage) => vec![
                ReadPlain,
                ParsePlain,
                AnnotateChunks,
                ApplyTransforms,
                GenHtmlSnippets,
                DumpHtmlStandalone,
                CopyAssets,
                write(".html", &[]),
            ],
            (Frontend::Coq | Frontend::Lean3, Backend::SnippetsHtml) => vec![
                ReadPlain,
                ParsePlain,
                AnnotateChunks,
                ApplyTransforms,
                GenHtmlSnippets,
                DumpHtmlSnippets,
                write(".snippets.html", self.source_snippet_strip()),
            ],
            (Frontend::Coq | Frontend::Lean3, Backend::SnippetsLatex) => vec![
                ReadPlain,
                ParsePlain,
                AnnotateChunks,
                ApplyTransforms,
                GenLatexSnippets,
                DumpLatexSnippets,
                write(".snippets.tex", self.source_snippet_strip()),
            ],
            (Frontend::Coq, Backend::Lint) => vec![
                ReadPlain,
                RegisterDocutils,
                LintDocutils,
                write(".lint.json", &[".v"]),
            ],
            (Frontend::Coq, Backend::Rst) => vec![ReadPlain, CodeToRst, write(".rst", &[])],
            (Frontend::Coq | Frontend::Lean3, Backend::Json) => vec![
                ReadPlain,
                ParsePlain,
                AnnotateChunks,
                EncodeJson,
                DumpJson,
                write(".io.json", &[]),
            ],
            (Frontend::CoqRst, Backend::Webpage) => docutils(".html", &[".v", ".rst"]),
            (Frontend::CoqRst, Backend::Latex) => docutils(".tex", &[".v", ".rst"]),
            (Frontend::CoqRst, Backend::Lint) => lint(&[".v", ".rst"]),
            (Frontend::CoqRst, Backend::Rst) => {
                vec![ReadPlain, CodeToRst, write(".v.rst", &[".v", ".rst"])]
            }
            (Frontend::Coqdoc, Backend::Webpage) => vec![
                ReadPlain,
                ParsePlain,
                AnnotateChunks,
                GenHtmlSnippetsWithCoqdoc,
                DumpHtmlStandalone,
                CopyAssets,
                write(".html", &[".v"]),
            ],
            (Frontend::Rst, Backend::Webpage) => docutils(".html", RST_STRIP),
            (Frontend::Rst, Backend::Latex) => docutils(".tex", RST_STRIP),
            (Frontend::Rst, Backend::Lint) => lint(RST_STRIP),
            (Frontend::Rst, Backend::Coq | Backend::CoqRst) => {
                vec![ReadPlain, RstToCode, write(".v", RST_STRIP)]
            }
            (Frontend::Md, Backend::Webpage) => docutils(".html", MD_STRIP),
            (Frontend::Md, Backend::Latex) => docutils(".tex", MD_STRIP),
            (Frontend::Md, Backend::Lint) => lint(MD_STRIP),
            _ => return None,
        };
        Some(steps)
    }

    fn json_snippet_strip(self) -> &'static [&'static str] {
        match self {
            Frontend::Lean3Json => LEAN_JSON_SNIPPETS,
            _ => &[".v", ".json"],
        }
    }

    fn source_snippet_strip(self) -> &'static [&'static str] {
        match self {
            Frontend::Lean3 => LEAN_SNIPPETS,
            _ => &[".v"],
        }
    }
}

fn docutils(ext: &'static str, strip: &'static [&'static str]) -> Vec<Step> {
    vec![
        Step::ReadPlain,
        Step::RegisterDocutils,
        Step::GenDocutils,
        Step::CopyAssets,
        Step::WriteFile { ext, strip },
    ]
}

fn lint(strip: &'static [&'static str]) -> Vec<Step> {
    vec![
        Step::ReadPlain,
        Step::RegisterDocutils,
        Step::LintDocutils,
        Step::WriteFile {
            ext: ".lint.json",
            strip,
        },
    ]
}

impl Backend {
    /// Every backend, in the order they are listed to users.
    pub const ALL: [Backend; 11] = [
        Backend::Json,
        Backend::SnippetsHtml,
        Backend::SnippetsLatex,
        Backend::Null,
        Backend::Webpage,
        Backend::Lint,
        Backend::Rst,
        Backend::Latex,
        Backend::Coq,
        Backend::CoqRst,
        Backend::Lean3,
    ];

    /// The short tag naming this backend.
    pub fn tag(self) -> &'static str {
        match self {
            Backend::Json => "json",
            Backend::SnippetsHtml => "snippets-html",
            Backend::SnippetsLatex => "snippets-latex",
            Backend::Null => "null",
            Backend::Webpage => "webpage",
            Backend::Lint => "lint",
            Backend::Rst => "rst",
            Backend::Latex => "latex",
            Backend::Coq => "coq",
            Backend::CoqRst => "coq+rst",
            Backend::Lean3 => "lean3",
        }
    }

    /// Infers the backend from an output path.
    pub fn from_path(path: &str) -> Option<Self> {
        BACKENDS_BY_SUFFIX
            .iter()
            .find(|(suffix, _)| path.ends_with(suffix))
            .map(|&(_, backend)| backend)
    }
}

impl fmt::Display for Frontend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Frontend {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frontend::ALL
            .into_iter()
            .find(|f| f.tag() == s)
            .ok_or_else(|| PipelineError::UnknownFrontend { tag: s.to_string() })
    }
}

impl FromStr for Backend {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|b| b.tag() == s)
            .ok_or_else(|| PipelineError::UnknownBackend { tag: s.to_string() })
    }
}
