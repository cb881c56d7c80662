//! Shared foundational types for the Quill documentation toolchain.
//!
//! This crate provides the in-memory annotation graph ([`Value`] and the
//! closed set of [`Entity`] variants), the generator identity recorded with
//! every cached prover run, and the contract that external provers implement.

#![warn(missing_docs)]

pub mod entity;
pub mod generator;
pub mod prover;
pub mod value;

pub use entity::{
    Entity, EntityKind, Goal, Goals, Hypothesis, Message, Messages, RichSentence, Sentence, Text,
};
pub use generator::GeneratorInfo;
pub use prover::{
    PassthroughFactory, PassthroughProver, Prover, ProverConfig, ProverError, ProverFactory,
};
pub use value::Value;
