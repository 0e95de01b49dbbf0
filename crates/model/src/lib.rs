//! declgen-model: Type Model document types and deserialization.
//!
//! Provides typed structs for the language-neutral Type Model (records,
//! sum types, enums, function signatures, literals) and a single
//! [`from_model`] entry point that deserializes a `serde_json::Value`
//! document into a [`ModelDocument`].
//!
//! The model is constructed once per generation run and is read-only
//! thereafter; [`validate`] checks the structural invariants (unique
//! field/variant/enum names, reference resolution, no nested optionals)
//! before any code generation consumes it.

pub mod deserialize;
pub mod types;
pub mod validate;

pub use deserialize::{from_model, ModelError};
pub use types::*;
pub use validate::validate;

/// Model document format version accepted by this crate (e.g. "1.0").
pub const MODEL_VERSION: &str = "1.0";
