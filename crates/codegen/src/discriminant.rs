//! Discriminant resolution for sum types.
//!
//! Discriminant emission is a caller-supplied switch, never inferred from
//! the model. When enabled, every variant interface gains exactly one
//! synthetic field whose type is the string literal of the variant's bare
//! name, appended after the variant's declared fields.

use declgen_model::RecordType;

use crate::decl::{string_literal, Member};
use crate::error::CodegenError;

/// The synthetic tag member for one variant.
pub fn tag_member(field: &str, variant: &str) -> Member {
    Member::Property {
        name: field.to_string(),
        ty: string_literal(variant),
        optional: false,
    }
}

/// A variant that already declares a field with the configured tag name
/// cannot carry the discriminant.
pub fn check_collision(variant: &RecordType, field: &str) -> Result<(), CodegenError> {
    if variant.fields.iter().any(|f| f.name == field) {
        return Err(CodegenError::NameCollision {
            name: field.to_string(),
            detail: format!(
                "variant '{}' already declares a field named like the discriminant",
                variant.name
            ),
        });
    }
    Ok(())
}
