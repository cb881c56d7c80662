//! What a step may read.
//!
//! Every [`Step`] declares the context [`Field`]s it reads through
//! [`Step::inputs`]. The executor hands each step a [`StepInputs`] view
//! instead of the whole [`ExecutionContext`]: reading a field the step did
//! not declare fails with [`PipelineError::UndeclaredInput`], and every read
//! is recorded so declarations can be checked against actual use.

use std::cell::Cell;
use std::fmt;
use std::path::{Path, PathBuf};

use quill_cache::Compression;
use quill_config::{CopyMode, HtmlDialect, LatexDialect, MarkPoint, WebpageStyle};
use quill_core::ProverConfig;
use quill_serial::SerializerKind;

use crate::context::{output_beside, ExecutionContext};
use crate::error::PipelineError;
use crate::step::Step;
use crate::table::{Backend, Frontend};

/// A per-document value a step can read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Path the input is read from.
    Fpath,
    /// Base name of the input, `-` for stdin.
    Fname,
    /// Frontend of the resolved pipeline.
    Frontend,
    /// Backend of the resolved pipeline.
    Backend,
    /// Prover language of the frontend.
    InputLanguage,
    /// Directory outputs are written to.
    OutputDirectory,
    /// Prover configuration by language.
    ProverConfigs,
    /// Cache root.
    CacheDirectory,
    /// Compression of written cache files.
    CacheCompression,
    /// Serializer for JSON output.
    JsonSerializer,
    /// Minify generated HTML.
    HtmlMinification,
    /// Layout of standalone pages.
    WebpageStyle,
    /// HTML dialect.
    HtmlDialect,
    /// LaTeX engine.
    LatexDialect,
    /// Include the generator banner.
    IncludeBanner,
    /// Include version numbers in the banner.
    IncludeVernums,
    /// Long-line lint threshold.
    LongLineThreshold,
    /// Point to mark in the output.
    MarkPoint,
    /// How assets are placed.
    CopyAssets,
    /// Explicit output file.
    Output,
    /// Assets collected by earlier steps.
    Assets,
    /// Page classes collected by earlier steps.
    HtmlClasses,
}

impl Field {
    /// The field's name, as shown in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Field::Fpath => "fpath",
            Field::Fname => "fname",
            Field::Frontend => "frontend",
            Field::Backend => "backend",
            Field::InputLanguage => "input_language",
            Field::OutputDirectory => "output_directory",
            Field::ProverConfigs => "prover_configs",
            Field::CacheDirectory => "cache_directory",
            Field::CacheCompression => "cache_compression",
            Field::JsonSerializer => "json_serializer",
            Field::HtmlMinification => "html_minification",
            Field::WebpageStyle => "webpage_style",
            Field::HtmlDialect => "html_dialect",
            Field::LatexDialect => "latex_dialect",
            Field::IncludeBanner => "include_banner",
            Field::IncludeVernums => "include_vernums",
            Field::LongLineThreshold => "long_line_threshold",
            Field::MarkPoint => "mark_point",
            Field::CopyAssets => "copy_assets",
            Field::Output => "output",
            Field::Assets => "assets",
            Field::HtmlClasses => "html_classes",
        }
    }

    fn bit(self) -> u32 {
        1 << self as u32
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values collected by steps of one document for later steps.
#[derive(Debug, Default)]
pub(crate) struct Collected {
    pub(crate) assets: Vec<String>,
    pub(crate) html_classes: Vec<String>,
}

/// The fields of one document that one step declared.
pub struct StepInputs<'c, 's> {
    step: Step,
    ctx: &'c ExecutionContext<'s>,
    collected: &'c mut Collected,
    read: Cell<u32>,
}

impl<'c, 's: 'c> StepInputs<'c, 's> {
    pub(crate) fn new(
        step: Step,
        ctx: &'c ExecutionContext<'s>,
        collected: &'c mut Collected,
    ) -> Self {
        Self {
            step,
            ctx,
            collected,
            read: Cell::new(0),
        }
    }

    /// The step this view was built for.
    pub fn step(&self) -> Step {
        self.step
    }

    /// Fields read so far, in declaration order of [`Field`].
    pub fn read_fields(&self) -> Vec<Field> {
        ALL_FIELDS
            .iter()
            .copied()
            .filter(|f| self.read.get() & f.bit() != 0)
            .collect()
    }

    fn read(&self, field: Field) -> Result<(), PipelineError> {
        if !self.step.inputs().contains(&field) {
            return Err(PipelineError::UndeclaredInput {
                step: self.step.name(),
                field: field.name(),
            });
        }
        self.read.set(self.read.get() | field.bit());
        Ok(())
    }

    /// Path the input is read from.
    pub fn fpath(&self) -> Result<&'c Path, PipelineError> {
        self.read(Field::Fpath)?;
        Ok(&self.ctx.fpath)
    }

    /// Base name of the input.
    pub fn fname(&self) -> Result<&'c str, PipelineError> {
        self.read(Field::Fname)?;
        Ok(&self.ctx.fname)
    }

    /// Whether the input comes from stdin.
    pub fn reads_stdin(&self) -> Result<bool, PipelineError> {
        Ok(self.fname()? == "-")
    }

    /// Frontend of the resolved pipeline.
    pub fn frontend(&self) -> Result<Frontend, PipelineError> {
        self.read(Field::Frontend)?;
        Ok(self.ctx.frontend)
    }

    /// Backend of the resolved pipeline.
    pub fn backend(&self) -> Result<Backend, PipelineError> {
        self.read(Field::Backend)?;
        Ok(self.ctx.backend)
    }

    /// Prover language; an error if the frontend has none.
    pub fn input_language(&self) -> Result<&'static str, PipelineError> {
        self.read(Field::InputLanguage)?;
        self.ctx
            .input_language
            .ok_or(PipelineError::NoInputLanguage {
                step: self.step.name(),
            })
    }

    /// Directory outputs are written to.
    pub fn output_directory(&self) -> Result<&'c Path, PipelineError> {
        self.read(Field::OutputDirectory)?;
        Ok(&self.ctx.output_directory)
    }

    /// Prover configuration for `language`.
    pub fn prover_config(&self, language: &str) -> Result<ProverConfig, PipelineError> {
        self.read(Field::ProverConfigs)?;
        Ok(self.ctx.settings.prover_config(language))
    }

    /// Cache root; `None` disables caching.
    pub fn cache_directory(&self) -> Result<Option<&'c Path>, PipelineError> {
        self.read(Field::CacheDirectory)?;
        Ok(self.ctx.settings.cache_directory.as_deref())
    }

    /// Compression of written cache files.
    pub fn cache_compression(&self) -> Result<Compression, PipelineError> {
        self.read(Field::CacheCompression)?;
        Ok(self.ctx.settings.cache_compression)
    }

    /// Serializer for JSON output.
    pub fn json_serializer(&self) -> Result<SerializerKind, PipelineError> {
        self.read(Field::JsonSerializer)?;
        Ok(self.ctx.settings.json_serializer)
    }

    /// Minify generated HTML.
    pub fn html_minification(&self) -> Result<bool, PipelineError> {
        self.read(Field::HtmlMinification)?;
        Ok(self.ctx.settings.html_minification)
    }

    /// Layout of standalone pages.
    pub fn webpage_style(&self) -> Result<WebpageStyle, PipelineError> {
        self.read(Field::WebpageStyle)?;
        Ok(self.ctx.settings.webpage_style)
    }

    /// HTML dialect.
    pub fn html_dialect(&self) -> Result<HtmlDialect, PipelineError> {
        self.read(Field::HtmlDialect)?;
        Ok(self.ctx.settings.html_dialect)
    }

    /// LaTeX engine.
    pub fn latex_dialect(&self) -> Result<LatexDialect, PipelineError> {
        self.read(Field::LatexDialect)?;
        Ok(self.ctx.settings.latex_dialect)
    }

    /// Include the generator banner.
    pub fn include_banner(&self) -> Result<bool, PipelineError> {
        self.read(Field::IncludeBanner)?;
        Ok(self.ctx.settings.include_banner)
    }

    /// Include version numbers in the banner.
    pub fn include_vernums(&self) -> Result<bool, PipelineError> {
        self.read(Field::IncludeVernums)?;
        Ok(self.ctx.settings.include_vernums)
    }

    /// Long-line lint threshold.
    pub fn long_line_threshold(&self) -> Result<usize, PipelineError> {
        self.read(Field::LongLineThreshold)?;
        Ok(self.ctx.settings.long_line_threshold)
    }

    /// Point to mark in the output, if any.
    pub fn mark_point(&self) -> Result<Option<&'c MarkPoint>, PipelineError> {
        self.read(Field::MarkPoint)?;
        Ok(self.ctx.settings.mark_point.as_ref())
    }

    /// How assets are placed.
    pub fn copy_assets(&self) -> Result<CopyMode, PipelineError> {
        self.read(Field::CopyAssets)?;
        Ok(self.ctx.settings.copy_assets)
    }

    /// Explicit output file.
    pub fn output(&self) -> Result<Option<&'c Path>, PipelineError> {
        self.read(Field::Output)?;
        Ok(self.ctx.settings.output.as_deref())
    }

    /// Where the output goes: `None` for stdout.
    pub fn output_path(&self, ext: &str, strip: &[&str]) -> Result<Option<PathBuf>, PipelineError> {
        match self.output()? {
            Some(output) if output.as_os_str() == "-" => Ok(None),
            Some(output) => Ok(Some(output.to_path_buf())),
            None if self.reads_stdin()? => Ok(None),
            None => Ok(Some(output_beside(
                self.fname()?,
                self.output_directory()?,
                ext,
                strip,
            ))),
        }
    }

    /// Assets collected so far.
    pub fn assets(&self) -> Result<&[String], PipelineError> {
        self.read(Field::Assets)?;
        Ok(&self.collected.assets)
    }

    /// Assets collected so far, for adding to.
    pub fn assets_mut(&mut self) -> Result<&mut Vec<String>, PipelineError> {
        self.read(Field::Assets)?;
        Ok(&mut self.collected.assets)
    }

    /// Page classes collected so far.
    pub fn html_classes(&self) -> Result<&[String], PipelineError> {
        self.read(Field::HtmlClasses)?;
        Ok(&self.collected.html_classes)
    }

    /// Page classes collected so far, for adding to.
    pub fn html_classes_mut(&mut self) -> Result<&mut Vec<String>, PipelineError> {
        self.read(Field::HtmlClasses)?;
        Ok(&mut self.collected.html_classes)
    }
}

const ALL_FIELDS: [Field; 22] = [
    Field::Fpath,
    Field::Fname,
    Field::Frontend,
    Field::Backend,
    Field::InputLanguage,
    Field::OutputDirectory,
    Field::ProverConfigs,
    Field::CacheDirectory,
    Field::CacheCompression,
    Field::JsonSerializer,
    Field::HtmlMinification,
    Field::WebpageStyle,
    Field::HtmlDialect,
    Field::LatexDialect,
    Field::IncludeBanner,
    Field::IncludeVernums,
    Field::LongLineThreshold,
    Field::MarkPoint,
    Field::CopyAssets,
    Field::Output,
    Field::Assets,
    Field::HtmlClasses,
];
