//! Documents through the executor, with the cache enabled.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use quill_cache::Compression;
use quill_config::Settings;
use quill_core::{
    GeneratorInfo, Prover, ProverConfig, ProverError, ProverFactory, Text, Value,
};
use quill_pipeline::{plan, Executor, Payload, UnavailableRenderer};

struct CountingProver {
    calls: Rc<Cell<usize>>,
}

impl Prover for CountingProver {
    fn version_info(&self) -> Result<GeneratorInfo, ProverError> {
        Ok(GeneratorInfo::new("counting", "1.0"))
    }

    fn annotate(
        &mut self,
        chunks: &[String],
        _config: &ProverConfig,
    ) -> Result<Vec<Value>, ProverError> {
        self.calls.set(self.calls.get() + 1);
        Ok(chunks
            .iter()
            .map(|c| Value::list(vec![Value::from(Text::new(c.as_str()))]))
            .collect())
    }
}

#[derive(Default)]
struct CountingFactory {
    calls: Rc<Cell<usize>>,
}

impl ProverFactory for CountingFactory {
    fn prover(&self, _language: &str) -> Result<Box<dyn Prover>, ProverError> {
        Ok(Box::new(CountingProver {
            calls: Rc::clone(&self.calls),
        }))
    }
}

struct FailingFactory;

impl ProverFactory for FailingFactory {
    fn prover(&self, _language: &str) -> Result<Box<dyn Prover>, ProverError> {
        Err(ProverError::Failed {
            prover: "sertop".to_string(),
            reason: "not installed".to_string(),
        })
    }
}

fn run(factory: &dyn ProverFactory, input: &Path, settings: &Settings) -> Payload {
    let inputs = vec![input.to_string_lossy().into_owned()];
    let jobs = plan(&inputs, None, None, None, None).unwrap();
    let mut renderer = UnavailableRenderer;
    let (mut stdin, mut stdout) = (std::io::empty(), Vec::new());
    let mut executor = Executor::new(factory, &mut renderer, &mut stdin, &mut stdout);
    let mut out = executor.process(&jobs, settings).unwrap();
    out.remove(0)
}

fn write_chunks(path: &Path, chunks: &[&str]) {
    fs::write(path, serde_json::to_string(chunks).unwrap()).unwrap();
}

fn cached_settings(root: &Path) -> (Settings, PathBuf) {
    let cache = root.join("_cache");
    let settings = Settings {
        cache_directory: Some(cache.clone()),
        cache_compression: Compression::Xz,
        output_directory: Some(root.join("_build")),
        ..Settings::default()
    };
    (settings, cache)
}

#[test]
fn prover_runs_only_when_chunks_change() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("intro.v.json");
    let (settings, cache) = cached_settings(dir.path());
    let factory = CountingFactory::default();

    write_chunks(&input, &["Lemma foo: True.", "Proof. trivial. Qed."]);
    run(&factory, &input, &settings);
    assert_eq!(factory.calls.get(), 1);

    run(&factory, &input, &settings);
    assert_eq!(factory.calls.get(), 1);

    write_chunks(&input, &["Lemma foo: True.", "Proof. trivial. Qed.", ""]);
    run(&factory, &input, &settings);
    assert_eq!(factory.calls.get(), 2);

    let cache_files: Vec<_> = fs::read_dir(&cache)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(cache_files, ["intro.v.json.cache.xz"]);
}

#[test]
fn json_output_is_indented_by_four_spaces() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("intro.v.json");
    let (settings, _) = cached_settings(dir.path());
    write_chunks(&input, &["Check 1."]);

    let out = run(&CountingFactory::default(), &input, &settings);
    let written = dir.path().join("_build").join("intro.v.io.json");
    assert_eq!(out, Payload::Written(Some(written.clone())));

    let text = fs::read_to_string(written).unwrap();
    assert!(text.starts_with("[\n    [\n        {\n"));
    let wire: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        wire,
        serde_json::json!([[{"_type": "text", "contents": "Check 1."}]])
    );
}

#[test]
fn output_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("a.v.json");
    write_chunks(&input, &["Check 1."]);
    let settings = Settings {
        output_directory: Some(dir.path().join("deep").join("out")),
        ..Settings::default()
    };
    run(&CountingFactory::default(), &input, &settings);
    assert!(dir.path().join("deep/out/a.v.io.json").is_file());
}

#[test]
fn prover_failure_writes_no_cache() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("intro.v.json");
    let (settings, cache) = cached_settings(dir.path());
    write_chunks(&input, &["Check 1."]);

    let inputs = vec![input.to_string_lossy().into_owned()];
    let jobs = plan(&inputs, None, None, None, None).unwrap();
    let mut renderer = UnavailableRenderer;
    let (mut stdin, mut stdout) = (std::io::empty(), Vec::new());
    let err = Executor::new(&FailingFactory, &mut renderer, &mut stdin, &mut stdout)
        .process(&jobs, &settings)
        .unwrap_err();

    assert!(err.to_string().contains("not installed"));
    assert!(!cache.join("intro.v.json.cache.xz").exists());
}
