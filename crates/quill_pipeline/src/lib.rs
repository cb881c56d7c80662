//! Pipelines: how an input document becomes an output file.
//!
//! A pipeline is the ordered list of [`Step`]s registered for one
//! ([`Frontend`], [`Backend`]) pair. [`resolve`] picks the pair for a
//! document (explicitly, or from file suffixes) and the [`Executor`] runs the
//! steps in order, threading a [`Payload`] from one step to the next. Each
//! step reads only the [`Field`]s of the per-document [`ExecutionContext`]
//! it declares, through a [`StepInputs`] view.
//!
//! Prover calls go through the cache; rendering to HTML, LaTeX and reST is
//! delegated to a [`Renderer`].

#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod executor;
pub mod inputs;
pub mod render;
pub mod resolve;
pub mod step;
pub mod table;

pub use context::ExecutionContext;
pub use error::PipelineError;
pub use executor::Executor;
pub use inputs::{Field, StepInputs};
pub use render::{DocutilsRequest, Renderer, StandaloneRequest, UnavailableRenderer};
pub use resolve::{infer_backend, infer_frontend, plan, resolve, Job, Resolved};
pub use step::{Payload, Step};
pub use table::{Backend, Frontend};
