//! Identity of the prover that produced an annotation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name and version of a prover, recorded alongside every cached run.
///
/// Serialized as a two-element array `[name, version]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct GeneratorInfo {
    /// Prover name (e.g. `"Coq+SerAPI"`).
    pub name: String,
    /// Prover version string.
    pub version: String,
}

impl GeneratorInfo {
    /// Creates a generator identity.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Identity reported for cache entries that predate generator tracking.
    pub fn placeholder() -> Self {
        Self::new("Coq+SerAPI", "??")
    }

    /// Formats the identity, optionally omitting the version.
    pub fn display(&self, include_version_info: bool) -> String {
        if include_version_info {
            format!("{} v{}", self.name, self.version)
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for GeneratorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

impl From<(String, String)> for GeneratorInfo {
    fn from((name, version): (String, String)) -> Self {
        Self { name, version }
    }
}

impl From<GeneratorInfo> for (String, String) {
    fn from(g: GeneratorInfo) -> Self {
        (g.name, g.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_version() {
        let g = GeneratorInfo::new("Lean3", "3.4.2");
        assert_eq!(g.display(true), "Lean3 v3.4.2");
        assert_eq!(g.display(false), "Lean3");
        assert_eq!(g.to_string(), "Lean3 v3.4.2");
    }

    #[test]
    fn serializes_as_pair() {
        let g = GeneratorInfo::new("Coq+SerAPI", "8.13.0");
        let json = serde_json::to_string(&g).unwrap();
        assert_eq!(json, r#"["Coq+SerAPI","8.13.0"]"#);
        let back: GeneratorInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn placeholder_identity() {
        let g = GeneratorInfo::placeholder();
        assert_eq!(g.name, "Coq+SerAPI");
        assert_eq!(g.version, "??");
    }
}
