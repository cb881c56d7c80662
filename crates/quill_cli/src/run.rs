//! The document loop: settings, resolution, execution.

use std::error::Error;
use std::io::{self, Read, Write};
use std::path::Path;

use quill_config::{find_config, merge, parse_mark_point, validate_inputs, ConfigError, Overrides};
use quill_core::PassthroughFactory;
use quill_pipeline::{plan, Executor, UnavailableRenderer};

use crate::Cli;

/// Runs `quill` with the process's working directory and standard streams.
pub fn run(cli: &Cli) -> Result<i32, Box<dyn Error>> {
    let cwd = std::env::current_dir()?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    execute(cli, &cwd, &mut stdin.lock(), &mut stdout.lock())
}

/// Resolves every input, then processes them in order.
///
/// No document is touched if any input fails to resolve.
pub fn execute(
    cli: &Cli,
    cwd: &Path,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
) -> Result<i32, Box<dyn Error>> {
    validate_inputs(
        &cli.inputs,
        cli.output.as_deref(),
        cli.stdin_filename.as_deref(),
    )?;
    let file = find_config(cli.config.as_deref(), cwd)?;
    let settings = merge(&file, overrides(cli)?)?;

    let jobs = plan(
        &cli.inputs,
        cli.frontend.map(Into::into),
        cli.backend.map(Into::into),
        settings.output.as_deref(),
        settings.stdin_filename.as_deref(),
    )?;

    let mut renderer = UnavailableRenderer;
    let mut executor = Executor::new(&PassthroughFactory, &mut renderer, stdin, stdout);
    executor.process(&jobs, &settings)?;
    tracing::debug!(documents = jobs.len(), "Done");
    Ok(0)
}

/// Collects the command-line side of the settings.
fn overrides(cli: &Cli) -> Result<Overrides, ConfigError> {
    let mark_point = match cli.mark_point.as_deref() {
        Some([point, marker]) => Some(parse_mark_point(point, marker)?),
        _ => None,
    };
    Ok(Overrides {
        cache_directory: cli.cache_directory.clone(),
        cache_compression: cli.cache_compression.clone(),
        sertop_args: cli.sertop_args.clone(),
        include_dirs: cli.include_dirs.clone(),
        rec_load_paths: pairs(&cli.rec_load_paths),
        load_paths: pairs(&cli.load_paths),
        webpage_style: cli.webpage_style.map(Into::into),
        html_minification: cli.html_minification,
        html_dialect: cli.html_dialect.map(Into::into),
        latex_dialect: cli.latex_dialect.map(Into::into),
        output: cli.output.clone(),
        output_directory: cli.output_directory.clone(),
        copy_assets: cli.copy_assets.map(Into::into),
        no_header: cli.no_header,
        no_version_numbers: cli.no_version_numbers,
        json_serializer: cli.json_serializer.clone(),
        long_line_threshold: cli.long_line_threshold,
        mark_point,
        stdin_filename: cli.stdin_filename.clone(),
    })
}

/// Groups the flattened values of a two-valued flag.
fn pairs(values: &[String]) -> Vec<(String, String)> {
    values
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}
