//! The contract between Quill and an external prover.
//!
//! Provers are black boxes: Quill hands them the chunks of a document and a
//! normalized configuration and gets back one annotation per chunk. The
//! protocol used to talk to the actual prover process lives behind the
//! [`Prover`] trait.

use serde::{Deserialize, Serialize};

use crate::entity::Text;
use crate::generator::GeneratorInfo;
use crate::value::Value;

/// How a prover is invoked for one input language.
///
/// Serializes to `{"args": [...]}`, which is the form compared against cached
/// configurations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProverConfig {
    /// Extra command-line arguments for the prover process.
    #[serde(default)]
    pub args: Vec<String>,
}

impl ProverConfig {
    /// Creates a configuration with the given arguments.
    pub fn with_args<S: Into<String>>(args: impl IntoIterator<Item = S>) -> Self {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Errors raised by provers or prover lookup.
#[derive(Debug, thiserror::Error)]
pub enum ProverError {
    /// No prover is registered for the requested input language.
    #[error("unsupported language: {language}")]
    UnsupportedLanguage {
        /// The requested language tag.
        language: String,
    },

    /// The prover ran but failed to annotate the document.
    #[error("prover {prover} failed: {reason}")]
    Failed {
        /// Prover name.
        prover: String,
        /// Description of the failure.
        reason: String,
    },
}

/// An external prover capable of annotating chunks of code.
pub trait Prover {
    /// Returns the prover's name and version.
    fn version_info(&self) -> Result<GeneratorInfo, ProverError>;

    /// Annotates `chunks`, all executed in the same prover session.
    ///
    /// Returns one value per chunk, each typically a list of [`Text`] and
    /// sentence entities.
    fn annotate(
        &mut self,
        chunks: &[String],
        config: &ProverConfig,
    ) -> Result<Vec<Value>, ProverError>;
}

/// Looks up the prover for an input language.
pub trait ProverFactory {
    /// Returns a fresh prover for `language`.
    fn prover(&self, language: &str) -> Result<Box<dyn Prover>, ProverError>;
}

/// A prover that echoes each chunk back as a single text fragment.
///
/// Useful to exercise the pipeline end to end when no real prover is
/// installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughProver;

impl Prover for PassthroughProver {
    fn version_info(&self) -> Result<GeneratorInfo, ProverError> {
        Ok(GeneratorInfo::new("passthrough", env!("CARGO_PKG_VERSION")))
    }

    fn annotate(
        &mut self,
        chunks: &[String],
        _config: &ProverConfig,
    ) -> Result<Vec<Value>, ProverError> {
        Ok(chunks
            .iter()
            .map(|chunk| Value::list(vec![Value::from(Text::new(chunk.as_str()))]))
            .collect())
    }
}

/// Factory handing out [`PassthroughProver`]s for the known languages.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughFactory;

impl ProverFactory for PassthroughFactory {
    fn prover(&self, language: &str) -> Result<Box<dyn Prover>, ProverError> {
        match language {
            "coq" | "lean3" => Ok(Box::new(PassthroughProver)),
            other => Err(ProverError::UnsupportedLanguage {
                language: other.to_string(),
            }),
        }
    }
}
