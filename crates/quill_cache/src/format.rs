//! On-disk layout of a cache file.
//!
//! ```json
//! {
//!   "metadata": {"cache_version": "2"},
//!   "caches": {
//!     "coq": {
//!       "generator": ["Coq+SerAPI", "0.13.0"],
//!       "config": {"args": []},
//!       "chunks": ["Lemma foo: True."],
//!       "annotated": [...]
//!     }
//!   }
//! }
//! ```
//!
//! Files whose metadata differs from [`metadata`] are discarded as a whole.

use std::collections::BTreeMap;

use quill_core::GeneratorInfo;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::CacheError;

/// Version of the cache layout. Bump whenever the record layout or any
/// entity's field list changes.
pub const CACHE_VERSION: &str = "2";

/// The stored result of one prover run for one (document, language) pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Prover that produced `annotated`.
    pub generator: GeneratorInfo,
    /// Normalized prover configuration at the time of the run.
    pub config: serde_json::Value,
    /// The chunks that were annotated.
    pub chunks: Vec<String>,
    /// The annotation, as a plain-serialized wire tree.
    pub annotated: serde_json::Value,
}

/// The metadata block every valid cache file carries.
pub fn metadata() -> serde_json::Value {
    json!({ "cache_version": CACHE_VERSION })
}

/// Builds the JSON tree of a cache file from its populated records.
pub fn snapshot<'a>(
    records: impl IntoIterator<Item = (&'a String, &'a CacheRecord)>,
) -> Result<serde_json::Value, CacheError> {
    let mut caches = serde_json::Map::new();
    for (lang, record) in records {
        let value = serde_json::to_value(record).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        caches.insert(lang.clone(), value);
    }
    Ok(json!({ "metadata": metadata(), "caches": caches }))
}

/// Extracts the records of a parsed cache file.
///
/// Returns `Ok(None)` when the metadata does not match the current version,
/// which invalidates every language in the file. A language whose record is
/// `null` was never populated and is left out.
pub fn records(
    file: &serde_json::Value,
) -> Result<Option<BTreeMap<String, CacheRecord>>, CacheError> {
    if file.get("metadata") != Some(&metadata()) {
        return Ok(None);
    }
    let caches = file.get("caches").cloned().unwrap_or_else(|| json!({}));
    let records: BTreeMap<String, Option<CacheRecord>> =
        serde_json::from_value(caches).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
    Ok(Some(
        records
            .into_iter()
            .filter_map(|(lang, record)| record.map(|r| (lang, r)))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CacheRecord {
        CacheRecord {
            generator: GeneratorInfo::new("Coq+SerAPI", "0.13.0"),
            config: json!({"args": []}),
            chunks: vec!["Lemma foo: True.".to_string()],
            annotated: json!([[{"_type": "text", "contents": "Lemma foo: True."}]]),
        }
    }

    #[test]
    fn snapshot_layout() {
        let lang = "coq".to_string();
        let rec = record();
        let js = snapshot([(&lang, &rec)]).unwrap();
        assert_eq!(js["metadata"], json!({"cache_version": "2"}));
        assert_eq!(js["caches"]["coq"]["generator"], json!(["Coq+SerAPI", "0.13.0"]));
        let keys: Vec<_> = js["caches"]["coq"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["generator", "config", "chunks", "annotated"]);
    }

    #[test]
    fn records_roundtrip_through_snapshot() {
        let lang = "coq".to_string();
        let rec = record();
        let js = snapshot([(&lang, &rec)]).unwrap();
        let back = records(&js).unwrap().unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back["coq"], rec);
    }

    #[test]
    fn version_mismatch_invalidates_file() {
        let js = json!({"metadata": {"cache_version": "1"}, "caches": {}});
        assert!(records(&js).unwrap().is_none());
        let js = json!({"metadata": {"cache_version": "2", "extra": true}, "caches": {}});
        assert!(records(&js).unwrap().is_none());
    }

    #[test]
    fn null_record_is_absent() {
        let lang = "coq".to_string();
        let rec = record();
        let mut js = snapshot([(&lang, &rec)]).unwrap();
        js["caches"]["lean3"] = serde_json::Value::Null;
        let back = records(&js).unwrap().unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), ["coq"]);
    }

    #[test]
    fn malformed_record_is_an_error() {
        let js = json!({"metadata": {"cache_version": "2"}, "caches": {"coq": {"chunks": 3}}});
        assert!(matches!(records(&js), Err(CacheError::Serialization { .. })));
    }
}
