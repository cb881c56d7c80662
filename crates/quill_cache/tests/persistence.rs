//! Cache files across open/close cycles.

use std::fs;
use std::path::{Path, PathBuf};

use quill_cache::{CacheSet, Compression, FileCacheSet};
use quill_core::{GeneratorInfo, Prover, ProverConfig, ProverError, Text, Value};

struct CountingProver {
    calls: usize,
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
        self.calls += 1;
        Ok(chunks
            .iter()
            .map(|c| Value::list(vec![Value::from(Text::new(c.as_str()))]))
            .collect())
    }
}

fn setup() -> (tempfile::TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("cache");
    let doc = dir.path().join("docs").join("intro.v");
    fs::create_dir_all(doc.parent().unwrap()).unwrap();
    fs::write(&doc, "Lemma foo: True.\nProof. trivial. Qed.\n").unwrap();
    (dir, root, doc)
}

fn chunks(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn annotate_once(root: &Path, doc: &Path, compression: &str, prover: &mut CountingProver) {
    let mut set = CacheSet::open(Some(root), doc, Some(compression)).unwrap();
    set.entry("coq")
        .update(&chunks(&["Check 1."]), prover, &ProverConfig::default())
        .unwrap();
    set.close().unwrap();
}

fn variants(root: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(root.join("docs"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn reopening_without_changes_leaves_file_untouched() {
    let (_dir, root, doc) = setup();
    let mut prover = CountingProver { calls: 0 };
    annotate_once(&root, &doc, "gzip", &mut prover);

    let path = root.join("docs/intro.v.cache.gz");
    let bytes = fs::read(&path).unwrap();
    let mtime = fs::metadata(&path).unwrap().modified().unwrap();

    // A hit, then a plain open/close.
    annotate_once(&root, &doc, "gzip", &mut prover);
    let mut set = FileCacheSet::open(&root, &doc, Compression::Gzip).unwrap();
    set.entry("coq");
    set.close().unwrap();

    assert_eq!(prover.calls, 1);
    assert_eq!(fs::read(&path).unwrap(), bytes);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), mtime);
}

#[test]
fn changing_compression_leaves_exactly_one_file() {
    let (_dir, root, doc) = setup();
    let mut prover = CountingProver { calls: 0 };
    annotate_once(&root, &doc, "none", &mut prover);
    assert_eq!(variants(&root), ["intro.v.cache"]);

    annotate_once(&root, &doc, "xz", &mut prover);
    assert_eq!(variants(&root), ["intro.v.cache.xz"]);

    annotate_once(&root, &doc, "gzip", &mut prover);
    assert_eq!(variants(&root), ["intro.v.cache.gz"]);

    // Recompression alone never re-runs the prover.
    assert_eq!(prover.calls, 1);
}

#[test]
fn prover_runs_only_when_chunks_change() {
    let (_dir, root, doc) = setup();
    let mut prover = CountingProver { calls: 0 };
    let config = ProverConfig::default();
    let run = |prover: &mut CountingProver, items: &[&str]| {
        let mut set = CacheSet::open(Some(root.as_path()), &doc, None).unwrap();
        let out = set.entry("coq").update(&chunks(items), prover, &config);
        set.close().unwrap();
        out.unwrap()
    };

    let first = run(&mut prover, &["Lemma foo: True.", "Proof. trivial. Qed."]);
    assert_eq!(prover.calls, 1);
    let second = run(&mut prover, &["Lemma foo: True.", "Proof. trivial. Qed."]);
    assert_eq!(prover.calls, 1);
    assert_eq!(first, second);
    run(&mut prover, &["Lemma foo: True.", "Proof. trivial. Qed.", ""]);
    assert_eq!(prover.calls, 2);
}

#[test]
fn languages_share_one_file() {
    let (_dir, root, doc) = setup();
    let mut prover = CountingProver { calls: 0 };
    let mut set = FileCacheSet::open(&root, &doc, Compression::None).unwrap();
    for lang in ["coq", "lean3"] {
        set.entry(lang)
            .update(&chunks(&["x"]), &mut prover, &ProverConfig::default())
            .unwrap();
    }
    set.close().unwrap();
    assert_eq!(variants(&root), ["intro.v.cache"]);

    let text = fs::read_to_string(root.join("docs/intro.v.cache")).unwrap();
    let js: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(js["caches"].as_object().unwrap().len(), 2);
    assert_eq!(js["caches"]["coq"]["config"], serde_json::json!({"args": []}));
}
