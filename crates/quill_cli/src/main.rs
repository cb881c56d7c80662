//! Quill CLI: annotate proof scripts with prover output.
//!
//! Takes Coq or Lean 3 sources, literate documents (reStructuredText,
//! Markdown) or JSON arrays of code fragments, runs the code through the
//! prover (via a per-document cache) and writes JSON, HTML, LaTeX or reST.

#![warn(missing_docs)]

mod logging;
mod run;

use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use quill_config::{CopyMode, HtmlDialect, LatexDialect, WebpageStyle};
use quill_pipeline::{Backend, Frontend};

/// Annotate segments of Coq code with responses and goals.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about = "Annotate proof scripts with prover output")]
pub struct Cli {
    /// Input files; `-` reads stdin.
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<String>,

    /// File name to report (and infer the frontend from) for stdin.
    #[arg(long, value_name = "STDIN_FILENAME")]
    pub stdin_filename: Option<PathBuf>,

    /// Choose a frontend (default: inferred from each input's extension).
    #[arg(long, value_enum)]
    pub frontend: Option<FrontendArg>,

    /// Choose a backend (default: inferred from --output, or the frontend's default).
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Set the output file (default: computed based on INPUT); `-` for stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Set the output directory (default: same as each INPUT).
    #[arg(long)]
    pub output_directory: Option<PathBuf>,

    /// How to place assets next to generated webpages.
    #[arg(long, value_enum)]
    pub copy_assets: Option<CopyModeArg>,

    /// Mark a point in the output with a given marker.
    #[arg(long, num_args = 2, value_names = ["POINT", "MARKER"])]
    pub mark_point: Option<Vec<String>>,

    /// Do not insert a header with the generator's name in the output.
    #[arg(long)]
    pub no_header: bool,

    /// Omit version numbers from the header.
    #[arg(long)]
    pub no_version_numbers: bool,

    /// Cache prover results in DIRECTORY.
    #[arg(long, value_name = "DIRECTORY")]
    pub cache_directory: Option<PathBuf>,

    /// Compress cache files (`xz` if given without a value).
    #[arg(
        long,
        num_args = 0..=1,
        default_missing_value = "xz",
        value_parser = ["none", "gzip", "xz"]
    )]
    pub cache_compression: Option<String>,

    /// Layout of standalone webpages.
    #[arg(long, value_enum)]
    pub webpage_style: Option<WebpageStyleArg>,

    /// Minify generated HTML.
    #[arg(long)]
    pub html_minification: bool,

    /// HTML dialect to emit.
    #[arg(long, value_enum)]
    pub html_dialect: Option<HtmlDialectArg>,

    /// LaTeX engine to target.
    #[arg(long, value_enum)]
    pub latex_dialect: Option<LatexDialectArg>,

    /// Pass an argument to the Coq prover (repeatable).
    #[arg(long = "sertop-arg", value_name = "SERAPI_ARG", allow_hyphen_values = true)]
    pub sertop_args: Vec<String>,

    /// Add DIR to the ML load path.
    #[arg(short = 'I', long = "ml-include-path", value_name = "DIR")]
    pub include_dirs: Vec<String>,

    /// Bind DIR to logical path COQDIR, without recursive imports.
    #[arg(short = 'Q', long = "load-path", num_args = 2, value_names = ["DIR", "COQDIR"])]
    pub load_paths: Vec<String>,

    /// Bind DIR to logical path COQDIR, recursively.
    #[arg(short = 'R', long = "rec-load-path", num_args = 2, value_names = ["DIR", "COQDIR"])]
    pub rec_load_paths: Vec<String>,

    /// Lines longer than this are reported by the linter.
    #[arg(long)]
    pub long_line_threshold: Option<usize>,

    /// Serializer for JSON output.
    #[arg(long, value_parser = ["plain", "dedup", "full-dedup"])]
    pub json_serializer: Option<String>,

    /// Path to a `quill.toml` (default: `./quill.toml` if present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print debug-level diagnostics.
    #[arg(long)]
    pub debug: bool,

    /// Print the chain of causes of a fatal error.
    #[arg(long)]
    pub traceback: bool,
}

/// Frontend selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FrontendArg {
    /// JSON array of Coq fragments.
    #[value(name = "coq.json")]
    CoqJson,
    /// JSON array of Lean 3 fragments.
    #[value(name = "lean3.json")]
    Lean3Json,
    /// Plain Coq source.
    Coq,
    /// Lean 3 source.
    Lean3,
    /// Coq with reStructuredText comments.
    #[value(name = "coq+rst")]
    CoqRst,
    /// Coq with coqdoc comments.
    Coqdoc,
    /// reStructuredText.
    Rst,
    /// Markdown.
    Md,
}

/// Backend selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Annotations as JSON.
    Json,
    /// HTML snippets.
    SnippetsHtml,
    /// LaTeX snippets.
    SnippetsLatex,
    /// Annotate only.
    Null,
    /// Standalone webpage.
    Webpage,
    /// Lint report.
    Lint,
    /// reStructuredText.
    Rst,
    /// LaTeX document.
    Latex,
    /// Coq source.
    Coq,
    /// Coq with reStructuredText comments.
    #[value(name = "coq+rst")]
    CoqRst,
}

/// Asset placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CopyModeArg {
    /// Copy files.
    Copy,
    /// Symbolic links.
    Symlink,
    /// Hard links.
    Hardlink,
    /// Leave assets out.
    None,
}

/// Webpage layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum WebpageStyleArg {
    /// Centered column.
    Centered,
    /// Goals float next to the code.
    Floating,
    /// Full window.
    Windowed,
}

/// HTML dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum HtmlDialectArg {
    /// HTML 4.
    Html4,
    /// HTML 5.
    Html5,
}

/// LaTeX engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LatexDialectArg {
    /// pdfLaTeX.
    Pdflatex,
    /// XeLaTeX.
    Xelatex,
    /// LuaLaTeX.
    Lualatex,
}

impl From<FrontendArg> for Frontend {
    fn from(arg: FrontendArg) -> Self {
        match arg {
            FrontendArg::CoqJson => Frontend::CoqJson,
            FrontendArg::Lean3Json => Frontend::Lean3Json,
            FrontendArg::Coq => Frontend::Coq,
            FrontendArg::Lean3 => Frontend::Lean3,
            FrontendArg::CoqRst => Frontend::CoqRst,
            FrontendArg::Coqdoc => Frontend::Coqdoc,
            FrontendArg::Rst => Frontend::Rst,
            FrontendArg::Md => Frontend::Md,
        }
    }
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Json => Backend::Json,
            BackendArg::SnippetsHtml => Backend::SnippetsHtml,
            BackendArg::SnippetsLatex => Backend::SnippetsLatex,
            BackendArg::Null => Backend::Null,
            BackendArg::Webpage => Backend::Webpage,
            BackendArg::Lint => Backend::Lint,
            BackendArg::Rst => Backend::Rst,
            BackendArg::Latex => Backend::Latex,
            BackendArg::Coq => Backend::Coq,
            BackendArg::CoqRst => Backend::CoqRst,
        }
    }
}

impl From<CopyModeArg> for CopyMode {
    fn from(arg: CopyModeArg) -> Self {
        match arg {
            CopyModeArg::Copy => CopyMode::Copy,
            CopyModeArg::Symlink => CopyMode::Symlink,
            CopyModeArg::Hardlink => CopyMode::Hardlink,
            CopyModeArg::None => CopyMode::None,
        }
    }
}

impl From<WebpageStyleArg> for WebpageStyle {
    fn from(arg: WebpageStyleArg) -> Self {
        match arg {
            WebpageStyleArg::Centered => WebpageStyle::Centered,
            WebpageStyleArg::Floating => WebpageStyle::Floating,
            WebpageStyleArg::Windowed => WebpageStyle::Windowed,
        }
    }
}

impl From<HtmlDialectArg> for HtmlDialect {
    fn from(arg: HtmlDialectArg) -> Self {
        match arg {
            HtmlDialectArg::Html4 => HtmlDialect::Html4,
            HtmlDialectArg::Html5 => HtmlDialect::Html5,
        }
    }
}

impl From<LatexDialectArg> for LatexDialect {
    fn from(arg: LatexDialectArg) -> Self {
        match arg {
            LatexDialectArg::Pdflatex => LatexDialect::Pdflatex,
            LatexDialectArg::Xelatex => LatexDialect::Xelatex,
            LatexDialectArg::Lualatex => LatexDialect::Lualatex,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::setup_logging(cli.debug);

    match run::run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            if cli.traceback {
                let mut cause = e.source();
                while let Some(err) = cause {
                    eprintln!("  caused by: {err}");
                    cause = err.source();
                }
            }
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_single_input() {
        let cli = Cli::parse_from(["quill", "intro.v"]);
        assert_eq!(cli.inputs, vec!["intro.v"]);
        assert!(cli.frontend.is_none());
        assert!(cli.backend.is_none());
        assert!(cli.cache_compression.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["quill"]).is_err());
    }

    #[test]
    fn parse_tagged_frontend_and_backend() {
        let cli = Cli::parse_from([
            "quill",
            "--frontend",
            "coq+rst",
            "--backend",
            "snippets-latex",
            "a.v",
        ]);
        assert_eq!(cli.frontend, Some(FrontendArg::CoqRst));
        assert_eq!(cli.backend, Some(BackendArg::SnippetsLatex));
        assert_eq!(Frontend::from(FrontendArg::CoqJson).tag(), "coq.json");
        assert!(Cli::try_parse_from(["quill", "--backend", "lean3", "a.v"]).is_err());
    }

    #[test]
    fn cache_compression_value_is_optional() {
        let cli = Cli::parse_from(["quill", "a.v", "--cache-compression"]);
        assert_eq!(cli.cache_compression.as_deref(), Some("xz"));

        let cli = Cli::parse_from(["quill", "--cache-compression", "gzip", "a.v"]);
        assert_eq!(cli.cache_compression.as_deref(), Some("gzip"));

        assert!(Cli::try_parse_from(["quill", "--cache-compression", "zip", "a.v"]).is_err());
    }

    #[test]
    fn parse_load_paths() {
        let cli = Cli::parse_from([
            "quill", "-R", "theories", "Lib", "-Q", "src", "Src", "-R", "vendor", "V", "-I",
            "plugins", "a.v",
        ]);
        assert_eq!(cli.rec_load_paths, vec!["theories", "Lib", "vendor", "V"]);
        assert_eq!(cli.load_paths, vec!["src", "Src"]);
        assert_eq!(cli.include_dirs, vec!["plugins"]);
        assert_eq!(cli.inputs, vec!["a.v"]);
    }

    #[test]
    fn parse_sertop_args() {
        let cli = Cli::parse_from([
            "quill",
            "--sertop-arg=--async-workers=0",
            "--sertop-arg",
            "-noinit",
            "a.v",
        ]);
        assert_eq!(cli.sertop_args, vec!["--async-workers=0", "-noinit"]);
    }

    #[test]
    fn parse_mark_point() {
        let cli = Cli::parse_from(["quill", "--mark-point", "12", "⊙", "a.v"]);
        assert_eq!(cli.mark_point, Some(vec!["12".to_string(), "⊙".to_string()]));
    }

    #[test]
    fn parse_output_flags() {
        let cli = Cli::parse_from([
            "quill",
            "-o",
            "-",
            "--copy-assets",
            "symlink",
            "--no-header",
            "--webpage-style",
            "windowed",
            "--html-dialect",
            "html5",
            "--latex-dialect",
            "xelatex",
            "--json-serializer",
            "full-dedup",
            "a.v",
        ]);
        assert_eq!(cli.output, Some(PathBuf::from("-")));
        assert_eq!(cli.copy_assets, Some(CopyModeArg::Symlink));
        assert!(cli.no_header);
        assert!(!cli.no_version_numbers);
        assert_eq!(WebpageStyle::from(cli.webpage_style.unwrap()), WebpageStyle::Windowed);
        assert_eq!(HtmlDialect::from(cli.html_dialect.unwrap()), HtmlDialect::Html5);
        assert_eq!(LatexDialect::from(cli.latex_dialect.unwrap()), LatexDialect::Xelatex);
        assert_eq!(cli.json_serializer.as_deref(), Some("full-dedup"));
    }

    #[test]
    fn parse_debugging_flags() {
        let cli = Cli::parse_from(["quill", "--debug", "--traceback", "a.v"]);
        assert!(cli.debug);
        assert!(cli.traceback);
    }
}
