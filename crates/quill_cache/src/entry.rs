//! One cached prover run: the (document, language) unit of the cache.

use quill_core::{GeneratorInfo, Prover, ProverConfig, Value};
use quill_serial::{PlainSerializer, Serializer};

use crate::error::CacheError;
use crate::format::CacheRecord;

/// The cached annotation of one document in one input language.
///
/// An entry starts empty, is populated by the first successful annotation
/// and is then overwritten wholesale whenever its inputs change. Stored
/// annotations use the plain serializer.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    label: String,
    record: Option<CacheRecord>,
}

impl CacheEntry {
    /// Creates an empty entry. `label` names the cache file in log events.
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            record: None,
        }
    }

    /// Creates an entry from a record read from disk.
    pub fn loaded(label: impl Into<String>, record: CacheRecord) -> Self {
        Self {
            label: label.into(),
            record: Some(record),
        }
    }

    /// The stored record, if the entry has been populated.
    pub fn record(&self) -> Option<&CacheRecord> {
        self.record.as_ref()
    }

    /// Returns `true` once the entry holds an annotation.
    pub fn is_populated(&self) -> bool {
        self.record.is_some()
    }

    /// Identity of the prover that produced the stored annotation.
    ///
    /// Entries that were never populated report [`GeneratorInfo::placeholder`].
    pub fn generator(&self) -> GeneratorInfo {
        self.record
            .as_ref()
            .map(|r| r.generator.clone())
            .unwrap_or_else(GeneratorInfo::placeholder)
    }

    /// Returns the stored annotation if it was produced from exactly these
    /// chunks and this configuration.
    pub fn get(
        &self,
        chunks: &[String],
        config: &ProverConfig,
    ) -> Result<Option<Value>, CacheError> {
        let Some(record) = &self.record else {
            return Ok(None);
        };
        let config = normalize_config(config)?;
        if record.config != config {
            tracing::info!(
                cache_file = %self.label,
                stored = %record.config,
                requested = %config,
                "Outdated configuration; recomputing"
            );
            return Ok(None);
        }
        if record.chunks != chunks {
            tracing::info!(cache_file = %self.label, "Outdated contents; recomputing");
            return Ok(None);
        }
        tracing::debug!(cache_file = %self.label, chunks = chunks.len(), "Cache hit");
        Ok(Some(PlainSerializer.decode(&record.annotated)?))
    }

    /// Replaces the entry with a new run.
    pub fn put(
        &mut self,
        chunks: &[String],
        config: &ProverConfig,
        annotated: &Value,
        generator: GeneratorInfo,
    ) -> Result<(), CacheError> {
        self.record = Some(CacheRecord {
            generator,
            config: normalize_config(config)?,
            chunks: chunks.to_vec(),
            annotated: PlainSerializer.encode(annotated)?,
        });
        Ok(())
    }

    /// Returns the cached annotation, running `prover` only on a miss.
    ///
    /// A failing prover leaves the entry untouched.
    pub fn update(
        &mut self,
        chunks: &[String],
        prover: &mut dyn Prover,
        config: &ProverConfig,
    ) -> Result<Value, CacheError> {
        if let Some(annotated) = self.get(chunks, config)? {
            return Ok(annotated);
        }
        let annotated = Value::list(prover.annotate(chunks, config)?);
        let generator = prover.version_info()?;
        tracing::info!(
            cache_file = %self.label,
            generator = %generator,
            chunks = chunks.len(),
            "Annotated with prover"
        );
        self.put(chunks, config, &annotated, generator)?;
        Ok(annotated)
    }
}

/// The configuration in the form it is stored and compared in.
fn normalize_config(config: &ProverConfig) -> Result<serde_json::Value, CacheError> {
    serde_json::to_value(config).map_err(|e| CacheError::Serialization {
        reason: e.to_string(),
    })
}
