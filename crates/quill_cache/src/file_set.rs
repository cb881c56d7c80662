//! The per-document cache file and its scoped lifetime.
//!
//! A [`FileCacheSet`] is opened right before annotating a document and
//! persisted right after, on every exit path: [`FileCacheSet::close`]
//! reports write errors, and dropping an unclosed set persists it as a
//! fallback (logging any error, since `Drop` cannot return one).

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::compression::Compression;
use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::format::{self, CacheRecord};

/// Suffix appended to the document path to name its cache file.
const CACHE_EXT: &str = ".cache";

/// All cache entries of one document, backed by one file on disk.
#[derive(Debug)]
pub struct FileCacheSet {
    /// Cache file path without the compression suffix.
    cache_file: PathBuf,
    /// Cache file path relative to the cache root, for log events.
    rel_file: String,
    wanted: Compression,
    on_disk: Option<Compression>,
    /// The file as last read or written, for change detection.
    loaded: Option<serde_json::Value>,
    entries: BTreeMap<String, CacheEntry>,
    closed: bool,
}

impl FileCacheSet {
    /// Opens the cache file of `doc_path` under `cache_root`.
    ///
    /// The cache file lives at `<cache_root>/<rel>.cache`, where `<rel>` is
    /// the document path relative to the deepest common ancestor of the
    /// resolved cache root and document. Missing directories are created.
    /// An unreadable or damaged file is logged and treated as absent.
    pub fn open(
        cache_root: &Path,
        doc_path: &Path,
        compression: Compression,
    ) -> Result<Self, CacheError> {
        let (cache_file, rel_file) = cache_file_path(cache_root, doc_path)?;
        if let Some(dir) = cache_file.parent() {
            fs::create_dir_all(dir).map_err(|e| CacheError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        tracing::debug!(document = %doc_path.display(), cache_file = %cache_file.display(), "Opening cache");

        let (on_disk, loaded) = read_any(&cache_file);
        let mut entries = BTreeMap::new();
        if let Some(js) = &loaded {
            match format::records(js) {
                Ok(Some(records)) => {
                    for (lang, record) in records {
                        entries.insert(lang, CacheEntry::loaded(rel_file.clone(), record));
                    }
                }
                Ok(None) => {
                    tracing::info!(cache_file = %rel_file, "Outdated metadata; discarding cache");
                }
                Err(e) => {
                    tracing::warn!(cache_file = %rel_file, error = %e, "Ignoring unreadable cache");
                }
            }
        }

        Ok(Self {
            cache_file,
            rel_file,
            wanted: compression,
            on_disk,
            loaded,
            entries,
            closed: false,
        })
    }

    /// Path of the cache file, without compression suffix.
    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// The compression the file was found under, if any.
    pub fn on_disk_compression(&self) -> Option<Compression> {
        self.on_disk
    }

    /// Returns the entry for `lang`, creating an empty one if needed.
    pub fn entry(&mut self, lang: &str) -> &mut CacheEntry {
        let label = &self.rel_file;
        self.entries
            .entry(lang.to_string())
            .or_insert_with(|| CacheEntry::empty(label.clone()))
    }

    /// Persists pending changes and releases the set.
    pub fn close(mut self) -> Result<(), CacheError> {
        self.closed = true;
        self.persist()
    }

    /// Writes the file if its contents or compression changed.
    ///
    /// Nothing is written while no entry is populated, whether or not a
    /// file exists: an outdated or unreadable file stays on disk as it is
    /// until a prover run replaces it. Entries loaded from the file count
    /// as populated.
    pub fn persist(&mut self) -> Result<(), CacheError> {
        let populated: Vec<(&String, &CacheRecord)> = self
            .entries
            .iter()
            .filter_map(|(lang, entry)| entry.record().map(|r| (lang, r)))
            .collect();
        if populated.is_empty() {
            return Ok(());
        }
        let snapshot = format::snapshot(populated)?;
        if self.loaded.as_ref() != Some(&snapshot) || self.recompression_needed() {
            self.force_write(snapshot)?;
        }
        Ok(())
    }

    fn recompression_needed(&self) -> bool {
        let needed = self.on_disk != Some(self.wanted);
        if needed {
            tracing::info!(
                cache_file = %self.rel_file,
                was = self.on_disk.map_or("none", Compression::name),
                now = self.wanted.name(),
                "Recompression requested; rewriting cache file"
            );
        }
        needed
    }

    fn force_write(&mut self, snapshot: serde_json::Value) -> Result<(), CacheError> {
        for compression in Compression::ALL {
            let path = compression.apply_to(&self.cache_file);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(CacheError::Io { path, source: e }),
            }
        }
        let text = serde_json::to_string_pretty(&snapshot).map_err(|e| {
            CacheError::Serialization {
                reason: e.to_string(),
            }
        })?;
        let path = self.wanted.apply_to(&self.cache_file);
        let bytes = self.wanted.compress(&text, &path)?;
        fs::write(&path, bytes).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })?;
        tracing::info!(cache_file = %self.rel_file, compression = %self.wanted, "Wrote cache");
        self.loaded = Some(snapshot);
        self.on_disk = Some(self.wanted);
        Ok(())
    }
}

impl Drop for FileCacheSet {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.persist() {
            tracing::warn!(cache_file = %self.rel_file, error = %e, "Failed to persist cache");
        }
    }
}

/// Reads the first existing variant of `cache_file`, probing compressions
/// in order. Damaged files are logged and reported as unparsed.
fn read_any(cache_file: &Path) -> (Option<Compression>, Option<serde_json::Value>) {
    for compression in Compression::ALL {
        let path = compression.apply_to(cache_file);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::warn!(cache_file = %path.display(), error = %e, "Ignoring unreadable cache");
                return (Some(compression), None);
            }
        };
        let parsed = compression
            .decompress(&bytes, &path)
            .and_then(|text| {
                serde_json::from_str(&text).map_err(|e| CacheError::Serialization {
                    reason: e.to_string(),
                })
            });
        return match parsed {
            Ok(js) => (Some(compression), Some(js)),
            Err(e) => {
                tracing::warn!(cache_file = %path.display(), error = %e, "Ignoring unreadable cache");
                (Some(compression), None)
            }
        };
    }
    (None, None)
}

/// Derives the cache file path (and its root-relative form) for a document.
fn cache_file_path(cache_root: &Path, doc_path: &Path) -> Result<(PathBuf, String), CacheError> {
    fs::create_dir_all(cache_root).map_err(|e| CacheError::Io {
        path: cache_root.to_path_buf(),
        source: e,
    })?;
    let root = fs::canonicalize(cache_root).map_err(|e| CacheError::Io {
        path: cache_root.to_path_buf(),
        source: e,
    })?;
    let doc = fs::canonicalize(doc_path)
        .or_else(|_| std::path::absolute(doc_path))
        .map_err(|e| CacheError::Io {
            path: doc_path.to_path_buf(),
            source: e,
        })?;

    let common: PathBuf = root
        .components()
        .zip(doc.components())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a)
        .collect();
    let rel: PathBuf = doc
        .components()
        .skip(common.components().count())
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();

    let mut rel_file = rel.into_os_string();
    rel_file.push(CACHE_EXT);
    let rel_file = PathBuf::from(rel_file);
    Ok((
        cache_root.join(&rel_file),
        rel_file.to_string_lossy().into_owned(),
    ))
}

/// The cache of one document: file-backed, or disabled.
#[derive(Debug)]
pub enum CacheSet {
    /// Entries are loaded from and persisted to a cache file.
    File(FileCacheSet),
    /// No cache directory was configured: every entry starts empty and
    /// nothing touches the disk.
    Disabled {
        /// Entry handed out (after being reset) for every language.
        scratch: CacheEntry,
    },
}

impl CacheSet {
    /// Opens the cache of `doc_path`, or a disabled set if `cache_root`
    /// is `None`.
    ///
    /// `compression` defaults to `none`; an unknown name is an error even
    /// when the cache is disabled.
    pub fn open(
        cache_root: Option<&Path>,
        doc_path: &Path,
        compression: Option<&str>,
    ) -> Result<Self, CacheError> {
        let compression: Compression = compression.unwrap_or("none").parse()?;
        match cache_root {
            Some(root) => FileCacheSet::open(root, doc_path, compression).map(CacheSet::File),
            None => Ok(CacheSet::Disabled {
                scratch: CacheEntry::empty("<no cache>"),
            }),
        }
    }

    /// Returns the entry for `lang`.
    pub fn entry(&mut self, lang: &str) -> &mut CacheEntry {
        match self {
            CacheSet::File(set) => set.entry(lang),
            CacheSet::Disabled { scratch } => {
                *scratch = CacheEntry::empty("<no cache>");
                scratch
            }
        }
    }

    /// Persists pending changes (if file-backed) and releases the set.
    pub fn close(self) -> Result<(), CacheError> {
        match self {
            CacheSet::File(set) => set.close(),
            CacheSet::Disabled { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{GeneratorInfo, ProverConfig, Text, Value};

    fn populate(set: &mut FileCacheSet, lang: &str, chunk: &str) {
        set.entry(lang)
            .put(
                &[chunk.to_string()],
                &ProverConfig::default(),
                &Value::list(vec![Value::from(Text::new(chunk))]),
                GeneratorInfo::new("test", "0"),
            )
            .unwrap();
    }

    fn doc_in(dir: &Path) -> PathBuf {
        let doc = dir.join("src").join("doc.v");
        fs::create_dir_all(doc.parent().unwrap()).unwrap();
        fs::write(&doc, "Lemma foo: True.").unwrap();
        doc
    }

    #[test]
    fn cache_path_mirrors_document_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("_cache");
        let doc = doc_in(dir.path());
        let set = FileCacheSet::open(&root, &doc, Compression::None).unwrap();
        assert_eq!(set.cache_file(), root.join("src").join("doc.v.cache"));
        assert!(root.join("src").is_dir());
    }

    #[test]
    fn untouched_set_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("_cache");
        let doc = doc_in(dir.path());
        let mut set = FileCacheSet::open(&root, &doc, Compression::None).unwrap();
        set.entry("coq");
        set.close().unwrap();
        assert!(!root.join("src/doc.v.cache").exists());
    }

    #[test]
    fn populated_entry_is_persisted_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("_cache");
        let doc = doc_in(dir.path());

        let mut set = FileCacheSet::open(&root, &doc, Compression::None).unwrap();
        populate(&mut set, "coq", "Check 1.");
        set.close().unwrap();

        let text = fs::read_to_string(root.join("src/doc.v.cache")).unwrap();
        assert!(text.starts_with("{\n  \"metadata\""));

        let mut set = FileCacheSet::open(&root, &doc, Compression::None).unwrap();
        assert_eq!(set.on_disk_compression(), Some(Compression::None));
        let hit = set
            .entry("coq")
            .get(&["Check 1.".to_string()], &ProverConfig::default())
            .unwrap();
        assert!(hit.is_some());
    }

    #[test]
    fn drop_persists_unclosed_set() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("_cache");
        let doc = doc_in(dir.path());
        {
            let mut set = FileCacheSet::open(&root, &doc, Compression::Gzip).unwrap();
            populate(&mut set, "coq", "x");
        }
        assert!(root.join("src/doc.v.cache.gz").exists());
    }

    #[test]
    fn entries_are_written_sorted_by_language() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("_cache");
        let doc = doc_in(dir.path());
        let mut set = FileCacheSet::open(&root, &doc, Compression::None).unwrap();
        populate(&mut set, "lean3", "a");
        populate(&mut set, "coq", "b");
        set.close().unwrap();

        let text = fs::read_to_string(root.join("src/doc.v.cache")).unwrap();
        let js: serde_json::Value = serde_json::from_str(&text).unwrap();
        let langs: Vec<_> = js["caches"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(langs, ["coq", "lean3"]);
    }

    #[test]
    fn outdated_version_discards_every_language() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("_cache");
        let doc = doc_in(dir.path());
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(
            root.join("src/doc.v.cache"),
            r#"{"metadata": {"cache_version": "1"}, "caches": {"coq": {}}}"#,
        )
        .unwrap();

        let mut set = FileCacheSet::open(&root, &doc, Compression::None).unwrap();
        assert!(!set.entry("coq").is_populated());
    }

    #[test]
    fn outdated_file_is_kept_until_an_entry_is_populated() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("_cache");
        let doc = doc_in(dir.path());
        fs::create_dir_all(root.join("src")).unwrap();
        let outdated = r#"{"metadata": {"cache_version": "1"}, "caches": {"coq": {}}}"#;
        fs::write(root.join("src/doc.v.cache"), outdated).unwrap();

        let mut set = FileCacheSet::open(&root, &doc, Compression::Gzip).unwrap();
        set.entry("coq");
        set.close().unwrap();
        assert_eq!(fs::read_to_string(root.join("src/doc.v.cache")).unwrap(), outdated);
        assert!(!root.join("src/doc.v.cache.gz").exists());

        let mut set = FileCacheSet::open(&root, &doc, Compression::None).unwrap();
        populate(&mut set, "coq", "x");
        set.close().unwrap();
        let text = fs::read_to_string(root.join("src/doc.v.cache")).unwrap();
        let js: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(js["metadata"], format::metadata());
    }

    #[test]
    fn corrupt_file_is_treated_as_absent_then_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("_cache");
        let doc = doc_in(dir.path());
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/doc.v.cache"), "{ not json").unwrap();

        let mut set = FileCacheSet::open(&root, &doc, Compression::None).unwrap();
        assert!(!set.entry("coq").is_populated());
        populate(&mut set, "coq", "x");
        set.close().unwrap();
        let text = fs::read_to_string(root.join("src/doc.v.cache")).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&text).is_ok());
    }

    #[test]
    fn disabled_set_never_touches_disk() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_in(dir.path());
        let mut set = CacheSet::open(None, &doc, None).unwrap();
        set.entry("coq")
            .put(
                &["x".to_string()],
                &ProverConfig::default(),
                &Value::list(vec![]),
                GeneratorInfo::placeholder(),
            )
            .unwrap();
        assert!(!set.entry("coq").is_populated());
        set.close().unwrap();
        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn unknown_compression_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_in(dir.path());
        let err = CacheSet::open(Some(dir.path()), &doc, Some("lz4")).unwrap_err();
        assert!(matches!(err, CacheError::UnsupportedCompression { .. }));
    }
}
