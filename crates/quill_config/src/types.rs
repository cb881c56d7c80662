//! Configuration types deserialized from `quill.toml`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// The contents of a `quill.toml` file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Where and how prover results are cached.
    #[serde(default)]
    pub cache: CacheSection,
    /// Extra prover arguments, keyed by input language (`coq`, `lean3`).
    #[serde(default)]
    pub prover: BTreeMap<String, ProverSection>,
    /// HTML output settings.
    #[serde(default)]
    pub html: HtmlSection,
    /// LaTeX output settings.
    #[serde(default)]
    pub latex: LatexSection,
    /// Output placement and contents.
    #[serde(default)]
    pub output: OutputSection,
    /// Lint settings.
    #[serde(default)]
    pub lint: LintSection,
}

/// The `[cache]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    /// Cache root. Caching is disabled when absent.
    pub directory: Option<PathBuf>,
    /// One of `none`, `gzip`, `xz`.
    pub compression: Option<String>,
}

/// A `[prover.<lang>]` section.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProverSection {
    /// Arguments passed to the prover before any given on the command line.
    #[serde(default)]
    pub args: Vec<String>,
}

/// The `[html]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HtmlSection {
    /// Minify generated HTML.
    pub minification: Option<bool>,
    /// HTML dialect to emit.
    pub dialect: Option<HtmlDialect>,
    /// Page layout of standalone webpages.
    pub webpage_style: Option<WebpageStyle>,
}

/// The `[latex]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatexSection {
    /// LaTeX engine the output targets.
    pub dialect: Option<LatexDialect>,
}

/// The `[output]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Directory outputs are written to (defaults to each input's directory).
    pub directory: Option<PathBuf>,
    /// How assets are placed next to outputs.
    pub copy_assets: Option<CopyMode>,
    /// Include the generator banner.
    pub include_banner: Option<bool>,
    /// Include version numbers in the banner.
    pub include_vernums: Option<bool>,
    /// Serializer used for JSON output: `plain`, `dedup` or `full-dedup`.
    pub json_serializer: Option<String>,
}

/// The `[lint]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LintSection {
    /// Lines longer than this are reported.
    pub long_line_threshold: Option<usize>,
}

macro_rules! named_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $tag:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// The name used in `quill.toml` and on the command line.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

named_enum! {
    /// Layout of standalone webpages.
    WebpageStyle {
        /// Contents centered in a fixed-width column (default).
        #[default]
        Centered => "centered",
        /// Goals float next to the code.
        Floating => "floating",
        /// Contents fill the window.
        Windowed => "windowed",
    }
}

named_enum! {
    /// HTML dialect of generated pages.
    HtmlDialect {
        /// HTML 4 (default).
        #[default]
        Html4 => "html4",
        /// HTML 5.
        Html5 => "html5",
    }
}

named_enum! {
    /// LaTeX engine targeted by generated documents.
    LatexDialect {
        /// pdfLaTeX (default).
        #[default]
        Pdflatex => "pdflatex",
        /// XeLaTeX.
        Xelatex => "xelatex",
        /// LuaLaTeX.
        Lualatex => "lualatex",
    }
}

named_enum! {
    /// How assets (CSS, JS) are placed next to outputs.
    CopyMode {
        /// Copy files (default).
        #[default]
        Copy => "copy",
        /// Symbolic links.
        Symlink => "symlink",
        /// Hard links.
        Hardlink => "hardlink",
        /// Leave assets out.
        None => "none",
    }
}
