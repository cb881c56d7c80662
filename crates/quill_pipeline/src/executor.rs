//! Running resolved pipelines.
//!
//! Each step sees the document only through a [`StepInputs`] view limited
//! to the fields it declares.

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use serde::Serialize;

use quill_cache::CacheSet;
use quill_config::{CopyMode, Settings};
use quill_core::{GeneratorInfo, ProverFactory, Value};
use quill_serial::{Sharing, Wire};

use crate::context::ExecutionContext;
use crate::error::PipelineError;
use crate::inputs::{Collected, StepInputs};
use crate::render::{DocutilsRequest, Renderer, StandaloneRequest};
use crate::resolve::Job;
use crate::step::{Payload, Step};

/// Appended to every snippet by `dump_html_snippets`.
pub const HTML_BLOCK_END: &str = "<!-- alectryon-block-end -->\n";

/// Appended to every snippet by `dump_latex_snippets`.
pub const LATEX_BLOCK_END: &str = "\n%% alectryon-block-end\n";

/// Runs pipelines, one document at a time.
pub struct Executor<'a> {
    provers: &'a dyn ProverFactory,
    renderer: &'a mut dyn Renderer,
    stdin: &'a mut dyn Read,
    stdout: &'a mut dyn Write,
}

impl<'a> Executor<'a> {
    /// Creates an executor reading `-` from `stdin` and writing `-` to `stdout`.
    pub fn new(
        provers: &'a dyn ProverFactory,
        renderer: &'a mut dyn Renderer,
        stdin: &'a mut dyn Read,
        stdout: &'a mut dyn Write,
    ) -> Self {
        Self {
            provers,
            renderer,
            stdin,
            stdout,
        }
    }

    /// Runs every job in order, stopping at the first failure.
    ///
    /// The configured output directory is created first.
    pub fn process(
        &mut self,
        jobs: &[Job],
        settings: &Settings,
    ) -> Result<Vec<Payload>, PipelineError> {
        if let Some(dir) = &settings.output_directory {
            fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
        }
        jobs.iter().map(|job| self.run(job, settings)).collect()
    }

    /// Runs the steps of one job and returns the final state.
    pub fn run(&mut self, job: &Job, settings: &Settings) -> Result<Payload, PipelineError> {
        let ctx = ExecutionContext::build(&job.input, &job.resolved, settings)?;
        tracing::info!(
            input = %job.input,
            frontend = %ctx.frontend,
            backend = %ctx.backend,
            "Processing document"
        );
        let mut collected = Collected::default();
        let mut state = Payload::Empty;
        for &step in &job.resolved.steps {
            tracing::debug!(step = %step, inputs = ?step.inputs(), "Running step");
            let mut inputs = StepInputs::new(step, &ctx, &mut collected);
            state = self.run_step(state, &mut inputs)?;
        }
        Ok(state)
    }

    fn run_step(
        &mut self,
        state: Payload,
        inputs: &mut StepInputs<'_, '_>,
    ) -> Result<Payload, PipelineError> {
        match (inputs.step(), state) {
            (Step::ReadPlain, Payload::Empty) => self.read_input(inputs).map(Payload::Text),
            (Step::ReadJson, Payload::Empty) => {
                let text = self.read_input(inputs)?;
                let path = inputs.fpath()?;
                serde_json::from_str(&text)
                    .map(Payload::Chunks)
                    .map_err(|source| PipelineError::Json {
                        path: path.to_path_buf(),
                        source,
                    })
            }
            (Step::ParsePlain, Payload::Text(text)) => Ok(Payload::Chunks(vec![text])),
            (Step::AnnotateChunks, Payload::Chunks(chunks)) => {
                self.annotate(&chunks, inputs).map(Payload::Annotated)
            }
            (Step::ApplyTransforms, Payload::Annotated(annotated)) => self
                .renderer
                .apply_transforms(annotated, inputs.input_language()?)
                .map(Payload::Annotated),
            (Step::GenHtmlSnippets, Payload::Annotated(annotated)) => self
                .renderer
                .gen_html_snippets(
                    &annotated,
                    inputs.fname()?,
                    inputs.input_language()?,
                    inputs.html_minification()?,
                )
                .map(Payload::Snippets),
            (Step::GenLatexSnippets, Payload::Annotated(annotated)) => self
                .renderer
                .gen_latex_snippets(&annotated, inputs.input_language()?)
                .map(Payload::Snippets),
            (Step::GenHtmlSnippetsWithCoqdoc, Payload::Annotated(annotated)) => {
                let fname = inputs.fname()?;
                let lang = inputs.input_language()?;
                let minify = inputs.html_minification()?;
                self.renderer
                    .gen_html_snippets_with_coqdoc(
                        &annotated,
                        fname,
                        lang,
                        minify,
                        inputs.html_classes_mut()?,
                    )
                    .map(Payload::Snippets)
            }
            (Step::DumpHtmlStandalone, Payload::Snippets(snippets)) => {
                let generator = self.generator(inputs)?;
                let html_classes = inputs.html_classes()?.to_vec();
                let request = StandaloneRequest {
                    fname: inputs.fname()?,
                    generator,
                    webpage_style: inputs.webpage_style()?,
                    html_minification: inputs.html_minification()?,
                    include_banner: inputs.include_banner()?,
                    include_vernums: inputs.include_vernums()?,
                    html_classes: &html_classes,
                    assets: inputs.assets_mut()?,
                };
                self.renderer
                    .dump_html_standalone(&snippets, request)
                    .map(Payload::Text)
            }
            (Step::DumpHtmlSnippets, Payload::Snippets(snippets)) => {
                Ok(Payload::Text(join_blocks(&snippets, HTML_BLOCK_END)))
            }
            (Step::DumpLatexSnippets, Payload::Snippets(snippets)) => {
                Ok(Payload::Text(join_blocks(&snippets, LATEX_BLOCK_END)))
            }
            (Step::EncodeJson, Payload::Annotated(annotated)) => {
                let serializer = inputs.json_serializer()?.build(Sharing::Shared);
                Ok(Payload::Wire(serializer.encode(&annotated)?))
            }
            (Step::DumpJson, Payload::Wire(wire)) => dump_json(&wire).map(Payload::Text),
            (Step::RegisterDocutils, state) => {
                self.renderer.register_docutils(
                    inputs.long_line_threshold()?,
                    inputs.cache_directory()?,
                    inputs.cache_compression()?,
                )?;
                Ok(state)
            }
            (Step::GenDocutils, Payload::Text(source)) => {
                let request = DocutilsRequest {
                    fpath: inputs.fpath()?,
                    frontend: inputs.frontend()?,
                    backend: inputs.backend()?,
                    html_dialect: inputs.html_dialect()?,
                    latex_dialect: inputs.latex_dialect()?,
                    webpage_style: inputs.webpage_style()?,
                    include_banner: inputs.include_banner()?,
                    include_vernums: inputs.include_vernums()?,
                    assets: inputs.assets_mut()?,
                };
                self.renderer
                    .gen_docutils(&source, request)
                    .map(Payload::Text)
            }
            (Step::LintDocutils, Payload::Text(source)) => self
                .renderer
                .lint_docutils(&source, inputs.fpath()?, inputs.frontend()?)
                .map(Payload::Text),
            (Step::CodeToRst, Payload::Text(code)) => self
                .renderer
                .code_to_rst(
                    &code,
                    inputs.fpath()?,
                    inputs.mark_point()?,
                    inputs.input_language()?,
                )
                .map(Payload::Text),
            (Step::RstToCode, Payload::Text(rst)) => self
                .renderer
                .rst_to_code(&rst, inputs.fpath()?, inputs.mark_point()?, inputs.backend()?)
                .map(Payload::Text),
            (Step::CopyAssets, state) => {
                let mode = inputs.copy_assets()?;
                let assets = inputs.assets()?;
                if mode == CopyMode::None || assets.is_empty() {
                    tracing::debug!(mode = %mode, "No assets to place");
                } else {
                    self.renderer
                        .copy_assets(assets, mode, inputs.output_directory()?)?;
                }
                Ok(state)
            }
            (Step::WriteFile { ext, strip }, Payload::Text(contents)) => {
                let path = inputs.output_path(ext, strip)?;
                self.write_output(path, &contents).map(Payload::Written)
            }
            (step, state) => Err(PipelineError::UnexpectedState {
                step: step.name(),
                found: state.kind(),
            }),
        }
    }

    fn read_input(&mut self, inputs: &StepInputs<'_, '_>) -> Result<String, PipelineError> {
        if inputs.reads_stdin()? {
            let mut text = String::new();
            self.stdin
                .read_to_string(&mut text)
                .map_err(|e| PipelineError::io("-", e))?;
            return Ok(text);
        }
        let fpath = inputs.fpath()?;
        fs::read_to_string(fpath).map_err(|e| PipelineError::io(fpath, e))
    }

    /// Annotates `chunks` through the document's cache.
    ///
    /// The cache is persisted even when the prover fails; the prover's error
    /// takes precedence over a failure to persist.
    fn annotate(
        &mut self,
        chunks: &[String],
        inputs: &StepInputs<'_, '_>,
    ) -> Result<Value, PipelineError> {
        let lang = inputs.input_language()?;
        let mut prover = self.provers.prover(lang)?;
        let config = inputs.prover_config(lang)?;
        let mut cache = CacheSet::open(
            inputs.cache_directory()?,
            inputs.fpath()?,
            Some(inputs.cache_compression()?.name()),
        )?;
        let annotated = cache.entry(lang).update(chunks, prover.as_mut(), &config);
        let closed = cache.close();
        let annotated = annotated?;
        closed?;
        Ok(annotated)
    }

    /// Generator shown in page banners.
    fn generator(&self, inputs: &StepInputs<'_, '_>) -> Result<GeneratorInfo, PipelineError> {
        if !inputs.include_banner()? {
            return Ok(GeneratorInfo::placeholder());
        }
        match inputs.input_language() {
            Ok(lang) => Ok(self.provers.prover(lang)?.version_info()?),
            Err(PipelineError::NoInputLanguage { .. }) => Ok(GeneratorInfo::placeholder()),
            Err(e) => Err(e),
        }
    }

    /// Writes `contents` to `path`, or to stdout for `None`.
    fn write_output(
        &mut self,
        path: Option<PathBuf>,
        contents: &str,
    ) -> Result<Option<PathBuf>, PipelineError> {
        match path {
            None => {
                self.stdout
                    .write_all(contents.as_bytes())
                    .and_then(|()| self.stdout.flush())
                    .map_err(|e| PipelineError::io("-", e))?;
                Ok(None)
            }
            Some(path) => {
                fs::write(&path, contents).map_err(|e| PipelineError::io(&path, e))?;
                tracing::info!(path = %path.display(), "Wrote output");
                Ok(Some(path))
            }
        }
    }
}

fn join_blocks(snippets: &[String], marker: &str) -> String {
    snippets.iter().map(|s| format!("{s}{marker}")).collect()
}

/// Pretty-prints `wire` with four-space indentation.
fn dump_json(wire: &Wire) -> Result<String, PipelineError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    wire.serialize(&mut serializer)
        .map_err(|e| PipelineError::Render {
            step: "dump_json",
            reason: e.to_string(),
        })?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
