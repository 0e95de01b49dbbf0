use declgen_model::ModelError;

/// All errors the generation pipeline can report. Every variant carries
/// the declaration it occurred in so diagnostics are actionable without
/// source-level debugging.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodegenError {
    /// A map node supplied a key type other than the string primitive.
    #[error("declaration '{declaration}': map keys must be string-like, got {key}")]
    UnsupportedKeyType { declaration: String, key: String },

    /// Two structurally different declarations would share an output name.
    #[error("name collision on '{name}': {detail}")]
    NameCollision { name: String, detail: String },

    /// A reference names no declared root. The model validator catches
    /// this up front; synthesis re-checks before emitting any name.
    #[error("unresolved reference '{name}' in '{referrer}'")]
    UnresolvedReference { name: String, referrer: String },

    /// Linked packaging only: a hoisted declaration is claimed by more
    /// than one home unit.
    #[error(
        "no unique home unit for '{name}': claimed by {}; declare it as a root type in one source",
        candidates.join(", ")
    )]
    HomeAssignmentAmbiguity {
        name: String,
        candidates: Vec<String>,
    },

    /// The model document failed invariant validation.
    #[error("invalid model: {0}")]
    InvalidModel(#[from] ModelError),
}
