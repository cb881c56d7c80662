//! Settings resolution: merging `quill.toml` with command-line overrides.

use std::collections::BTreeMap;
use std::path::PathBuf;

use quill_cache::Compression;
use quill_core::ProverConfig;
use quill_serial::SerializerKind;

use crate::error::ConfigError;
use crate::types::{CopyMode, FileConfig, HtmlDialect, LatexDialect, WebpageStyle};

/// Default for [`Settings::long_line_threshold`].
pub const DEFAULT_LONG_LINE_THRESHOLD: usize = 72;

/// Compression used when `--cache-compression` is given without a value.
pub const IMPLIED_COMPRESSION: &str = "xz";

/// Settings given on the command line. `None` (or `false`, or empty) means
/// the flag was not given and the file or built-in default applies.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// `--cache-directory`.
    pub cache_directory: Option<PathBuf>,
    /// `--cache-compression [NAME]`.
    pub cache_compression: Option<String>,
    /// `--sertop-arg`, repeated.
    pub sertop_args: Vec<String>,
    /// `-I DIR`, repeated.
    pub include_dirs: Vec<String>,
    /// `-R DIR COQDIR`, repeated.
    pub rec_load_paths: Vec<(String, String)>,
    /// `-Q DIR COQDIR`, repeated.
    pub load_paths: Vec<(String, String)>,
    /// `--webpage-style`.
    pub webpage_style: Option<WebpageStyle>,
    /// `--html-minification`.
    pub html_minification: bool,
    /// `--html-dialect`.
    pub html_dialect: Option<HtmlDialect>,
    /// `--latex-dialect`.
    pub latex_dialect: Option<LatexDialect>,
    /// `-o`/`--output`.
    pub output: Option<PathBuf>,
    /// `--output-directory`.
    pub output_directory: Option<PathBuf>,
    /// `--copy-assets`.
    pub copy_assets: Option<CopyMode>,
    /// `--no-header`.
    pub no_header: bool,
    /// `--no-version-numbers`.
    pub no_version_numbers: bool,
    /// `--json-serializer`.
    pub json_serializer: Option<String>,
    /// `--long-line-threshold`.
    pub long_line_threshold: Option<usize>,
    /// `--mark-point POINT MARKER`, already parsed.
    pub mark_point: Option<MarkPoint>,
    /// `--stdin-filename`.
    pub stdin_filename: Option<PathBuf>,
}

/// A position in the input to highlight in generated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkPoint {
    /// Character offset.
    pub point: usize,
    /// Text inserted at the point.
    pub marker: String,
}

/// Fully resolved settings shared by every document of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Cache root; `None` disables caching.
    pub cache_directory: Option<PathBuf>,
    /// Compression of newly written cache files.
    pub cache_compression: Compression,
    /// Prover configuration by input language.
    pub prover_configs: BTreeMap<String, ProverConfig>,
    /// Layout of standalone webpages.
    pub webpage_style: WebpageStyle,
    /// Minify generated HTML.
    pub html_minification: bool,
    /// HTML dialect.
    pub html_dialect: HtmlDialect,
    /// LaTeX engine.
    pub latex_dialect: LatexDialect,
    /// Explicit output file (single input only).
    pub output: Option<PathBuf>,
    /// Output directory; per-input default when `None`.
    pub output_directory: Option<PathBuf>,
    /// How assets are placed next to outputs.
    pub copy_assets: CopyMode,
    /// Include the generator banner.
    pub include_banner: bool,
    /// Include version numbers in the banner.
    pub include_vernums: bool,
    /// Serializer for JSON output.
    pub json_serializer: SerializerKind,
    /// Long-line lint threshold.
    pub long_line_threshold: usize,
    /// Point to mark in the output, if any.
    pub mark_point: Option<MarkPoint>,
    /// Name reported for input read from stdin.
    pub stdin_filename: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            cache_directory: None,
            cache_compression: Compression::None,
            prover_configs: default_prover_configs(),
            webpage_style: WebpageStyle::default(),
            html_minification: false,
            html_dialect: HtmlDialect::default(),
            latex_dialect: LatexDialect::default(),
            output: None,
            output_directory: None,
            copy_assets: CopyMode::default(),
            include_banner: true,
            include_vernums: true,
            json_serializer: SerializerKind::default(),
            long_line_threshold: DEFAULT_LONG_LINE_THRESHOLD,
            mark_point: None,
            stdin_filename: None,
        }
    }
}

impl Settings {
    /// Prover configuration for `language` (no arguments if unconfigured).
    pub fn prover_config(&self, language: &str) -> ProverConfig {
        self.prover_configs
            .get(language)
            .cloned()
            .unwrap_or_default()
    }
}

fn default_prover_configs() -> BTreeMap<String, ProverConfig> {
    ["coq", "lean3"]
        .into_iter()
        .map(|lang| (lang.to_string(), ProverConfig::default()))
        .collect()
}

/// Merges file settings with command-line overrides.
///
/// Command-line values win. Prover arguments accumulate instead: for `coq`,
/// file arguments come first, then `--sertop-arg` values, then the `-I`,
/// `-R` and `-Q` paths in that order.
pub fn merge(file: &FileConfig, overrides: Overrides) -> Result<Settings, ConfigError> {
    let cache_compression = overrides
        .cache_compression
        .or_else(|| file.cache.compression.clone())
        .map(|name| {
            name.parse::<Compression>()
                .map_err(|e| ConfigError::ValidationError(format!("argument --cache-compression: {e}")))
        })
        .transpose()?
        .unwrap_or_default();

    let json_serializer = overrides
        .json_serializer
        .or_else(|| file.output.json_serializer.clone())
        .map(|name| {
            name.parse::<SerializerKind>()
                .map_err(|e| ConfigError::ValidationError(format!("argument --json-serializer: {e}")))
        })
        .transpose()?
        .unwrap_or_default();

    let long_line_threshold = overrides
        .long_line_threshold
        .or(file.lint.long_line_threshold)
        .unwrap_or(DEFAULT_LONG_LINE_THRESHOLD);

    let mut prover_configs = default_prover_configs();
    for (lang, section) in &file.prover {
        prover_configs.insert(lang.clone(), ProverConfig::with_args(section.args.clone()));
    }
    let coq = prover_configs.entry("coq".to_string()).or_default();
    coq.args.extend(overrides.sertop_args);
    for dir in overrides.include_dirs {
        coq.args.extend(["-I".to_string(), dir]);
    }
    for (dir, coqdir) in overrides.rec_load_paths {
        coq.args.extend(["-R".to_string(), format!("{dir},{coqdir}")]);
    }
    for (dir, coqdir) in overrides.load_paths {
        coq.args.extend(["-Q".to_string(), format!("{dir},{coqdir}")]);
    }

    Ok(Settings {
        cache_directory: overrides
            .cache_directory
            .or_else(|| file.cache.directory.clone()),
        cache_compression,
        prover_configs,
        webpage_style: overrides
            .webpage_style
            .or(file.html.webpage_style)
            .unwrap_or_default(),
        html_minification: overrides.html_minification
            || file.html.minification.unwrap_or(false),
        html_dialect: overrides
            .html_dialect
            .or(file.html.dialect)
            .unwrap_or_default(),
        latex_dialect: overrides
            .latex_dialect
            .or(file.latex.dialect)
            .unwrap_or_default(),
        output: overrides.output,
        output_directory: overrides
            .output_directory
            .or_else(|| file.output.directory.clone()),
        copy_assets: overrides
            .copy_assets
            .or(file.output.copy_assets)
            .unwrap_or_default(),
        include_banner: !overrides.no_header && file.output.include_banner.unwrap_or(true),
        include_vernums: !overrides.no_version_numbers
            && file.output.include_vernums.unwrap_or(true),
        json_serializer,
        long_line_threshold,
        mark_point: overrides.mark_point,
        stdin_filename: overrides.stdin_filename,
    })
}

/// Checks the combination of inputs, `--output` and `--stdin-filename`.
pub fn validate_inputs(
    inputs: &[String],
    output: Option<&std::path::Path>,
    stdin_filename: Option<&std::path::Path>,
) -> Result<(), ConfigError> {
    if inputs.len() > 1 && output.is_some() {
        return Err(ConfigError::ValidationError(
            "argument --output: Not valid with multiple inputs".to_string(),
        ));
    }
    if stdin_filename.is_some() && !inputs.iter().any(|i| i == "-") {
        return Err(ConfigError::ValidationError(
            "argument --stdin-filename: input must be '-'".to_string(),
        ));
    }
    Ok(())
}

/// Parses the `POINT MARKER` pair of `--mark-point`.
pub fn parse_mark_point(point: &str, marker: &str) -> Result<MarkPoint, ConfigError> {
    let point = point.parse().map_err(|_| {
        ConfigError::ValidationError(format!(
            "argument --mark-point: Expecting a number, not '{point}'"
        ))
    })?;
    Ok(MarkPoint {
        point,
        marker: marker.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;
    use std::path::Path;

    #[test]
    fn defaults_without_file_or_flags() {
        let settings = Settings::default();
        assert!(settings.cache_directory.is_none());
        assert_eq!(settings.cache_compression, Compression::None);
        assert_eq!(settings.webpage_style, WebpageStyle::Centered);
        assert_eq!(settings.html_dialect, HtmlDialect::Html4);
        assert_eq!(settings.latex_dialect, LatexDialect::Pdflatex);
        assert_eq!(settings.copy_assets, CopyMode::Copy);
        assert!(settings.include_banner);
        assert!(settings.include_vernums);
        assert_eq!(settings.long_line_threshold, 72);
        assert_eq!(settings.json_serializer, SerializerKind::Plain);
        assert_eq!(settings.prover_config("coq"), ProverConfig::default());
        assert_eq!(settings.prover_config("lean3"), ProverConfig::default());
    }

    #[test]
    fn empty_merge_matches_defaults() {
        let settings = merge(&FileConfig::default(), Overrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn coq_arguments_accumulate_in_order() {
        let overrides = Overrides {
            sertop_args: vec!["--async=off".to_string()],
            include_dirs: vec!["plugins".to_string()],
            rec_load_paths: vec![("theories".to_string(), "Lib".to_string())],
            load_paths: vec![("extra".to_string(), "Extra".to_string())],
            ..Overrides::default()
        };
        let file = load_config_from_str("[prover.coq]\nargs = [\"-noinit\"]\n").unwrap();
        let settings = merge(&file, overrides).unwrap();
        assert_eq!(
            settings.prover_config("coq").args,
            vec![
                "-noinit",
                "--async=off",
                "-I",
                "plugins",
                "-R",
                "theories,Lib",
                "-Q",
                "extra,Extra"
            ]
        );
        assert!(settings.prover_config("lean3").args.is_empty());
    }

    #[test]
    fn command_line_wins_over_file() {
        let file = load_config_from_str(
            r#"
[cache]
directory = "from-file"
compression = "gzip"

[html]
webpage_style = "floating"

[lint]
long_line_threshold = 100
"#,
        )
        .unwrap();
        let overrides = Overrides {
            cache_directory: Some(PathBuf::from("from-cli")),
            cache_compression: Some(IMPLIED_COMPRESSION.to_string()),
            long_line_threshold: Some(80),
            ..Overrides::default()
        };
        let settings = merge(&file, overrides).unwrap();
        assert_eq!(settings.cache_directory.as_deref(), Some(Path::new("from-cli")));
        assert_eq!(settings.cache_compression, Compression::Xz);
        assert_eq!(settings.webpage_style, WebpageStyle::Floating);
        assert_eq!(settings.long_line_threshold, 80);
    }

    #[test]
    fn negative_flags_turn_off_file_values() {
        let file = load_config_from_str("[output]\ninclude_banner = true\n").unwrap();
        let overrides = Overrides {
            no_header: true,
            no_version_numbers: true,
            ..Overrides::default()
        };
        let settings = merge(&file, overrides).unwrap();
        assert!(!settings.include_banner);
        assert!(!settings.include_vernums);
    }

    #[test]
    fn unknown_serializer_flag_errors() {
        let overrides = Overrides {
            json_serializer: Some("yaml".to_string()),
            ..Overrides::default()
        };
        assert!(merge(&FileConfig::default(), overrides).is_err());
    }

    #[test]
    fn output_with_multiple_inputs_errors() {
        let inputs = vec!["a.v".to_string(), "b.v".to_string()];
        let err = validate_inputs(&inputs, Some(Path::new("out.html")), None).unwrap_err();
        assert!(err.to_string().contains("--output"));
        assert!(validate_inputs(&inputs[..1], Some(Path::new("out.html")), None).is_ok());
    }

    #[test]
    fn stdin_filename_requires_dash() {
        let inputs = vec!["a.v".to_string()];
        assert!(validate_inputs(&inputs, None, Some(Path::new("x.v"))).is_err());
        let inputs = vec!["-".to_string()];
        assert!(validate_inputs(&inputs, None, Some(Path::new("x.v"))).is_ok());
    }

    #[test]
    fn mark_point_must_be_a_number() {
        assert_eq!(
            parse_mark_point("12", "⊙").unwrap(),
            MarkPoint {
                point: 12,
                marker: "⊙".to_string()
            }
        );
        let err = parse_mark_point("twelve", "⊙").unwrap_err();
        assert!(err.to_string().contains("Expecting a number"));
    }
}
