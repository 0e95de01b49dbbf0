//! Model-level invariant validation.
//!
//! Runs after parsing and before any code generation:
//!
//! - field names unique within each record (variants included);
//! - variant names unique within each sum type;
//! - enum values unique (duplicates are rejected, not deduplicated);
//! - optionals never nest, whether spelled as `optional` wrapping
//!   `optional` or as an `optional: true` field typed `optional`;
//! - every `ref` resolves to a root declared somewhere in the model;
//! - every output declaration name is claimed by exactly one structure.
//!   The claim set spans roots, hoisted inline records, and the `I`-prefixed
//!   interfaces synthesized for sum variants; identical re-declarations are
//!   allowed, mismatched ones are a [`ModelError::NameCollision`].

use crate::deserialize::ModelError;
use crate::types::*;
use std::collections::{BTreeMap, BTreeSet};

/// Validate a parsed model document. Returns the first violation found.
pub fn validate(model: &ModelDocument) -> Result<(), ModelError> {
    let mut source_names = BTreeSet::new();
    for source in &model.sources {
        if !source_names.insert(source.name.as_str()) {
            return Err(ModelError::Invalid {
                context: "document".to_string(),
                message: format!("duplicate source unit '{}'", source.name),
            });
        }
    }

    check_decl_names(model)?;

    let roots = index_roots(model);

    for source in &model.sources {
        for named in &source.types {
            validate_named(named, &roots)?;
        }
    }

    Ok(())
}

/// Index roots by name for `ref` resolution. Same-name roots are
/// structurally identical past [`check_decl_names`], so first wins.
fn index_roots(model: &ModelDocument) -> BTreeMap<&str, &NamedType> {
    let mut roots: BTreeMap<&str, &NamedType> = BTreeMap::new();
    for source in &model.sources {
        for named in &source.types {
            roots.entry(named.name()).or_insert(named);
        }
    }
    roots
}

/// One site in the model that produces an output declaration under a given
/// name. Hoisted inline records and sum variant interfaces claim names
/// alongside roots, so all three participate in the uniqueness check.
enum DeclShape<'a> {
    Root(&'a NamedType),
    Inline(&'a RecordType),
    Variant(&'a RecordType),
}

/// Check that every output declaration name resolves to one structure.
fn check_decl_names(model: &ModelDocument) -> Result<(), ModelError> {
    let mut decls: BTreeMap<String, DeclShape<'_>> = BTreeMap::new();
    for source in &model.sources {
        for named in &source.types {
            claim(named.name().to_string(), DeclShape::Root(named), &mut decls)?;
            collect_hoisted_named(named, &mut decls)?;
        }
    }
    Ok(())
}

fn claim<'a>(
    name: String,
    shape: DeclShape<'a>,
    decls: &mut BTreeMap<String, DeclShape<'a>>,
) -> Result<(), ModelError> {
    match decls.get(&name) {
        Some(existing) if !shapes_match(existing, &shape) => {
            Err(ModelError::NameCollision { name })
        }
        Some(_) => Ok(()),
        None => {
            decls.insert(name, shape);
            Ok(())
        }
    }
}

fn shapes_match(a: &DeclShape, b: &DeclShape) -> bool {
    match (a, b) {
        (DeclShape::Root(x), DeclShape::Root(y)) => x == y,
        (DeclShape::Inline(x), DeclShape::Inline(y)) => x == y,
        (DeclShape::Variant(x), DeclShape::Variant(y)) => x == y,
        // A record root and an identical inline record produce the same
        // interface, so they may share a name.
        (DeclShape::Root(NamedType::Record(x)), DeclShape::Inline(y))
        | (DeclShape::Inline(y), DeclShape::Root(NamedType::Record(x))) => x == *y,
        // A variant interface may gain a discriminant member at generation
        // time, so a variant name shared with any other origin collides
        // even when the declared fields agree.
        _ => false,
    }
}

fn collect_hoisted_named<'a>(
    named: &'a NamedType,
    decls: &mut BTreeMap<String, DeclShape<'a>>,
) -> Result<(), ModelError> {
    match named {
        NamedType::Record(rec) => collect_hoisted_fields(rec, decls),
        NamedType::Sum(sum) => {
            for variant in &sum.variants {
                claim(
                    format!("I{}", variant.name),
                    DeclShape::Variant(variant),
                    decls,
                )?;
                collect_hoisted_fields(variant, decls)?;
            }
            Ok(())
        }
        NamedType::Enum(_) => Ok(()),
        NamedType::Function {
            params, returns, ..
        } => {
            for param in params {
                collect_hoisted_node(&param.ty, decls)?;
            }
            collect_hoisted_node(returns, decls)
        }
    }
}

fn collect_hoisted_fields<'a>(
    rec: &'a RecordType,
    decls: &mut BTreeMap<String, DeclShape<'a>>,
) -> Result<(), ModelError> {
    for field in &rec.fields {
        collect_hoisted_node(&field.ty, decls)?;
    }
    Ok(())
}

fn collect_hoisted_node<'a>(
    node: &'a TypeNode,
    decls: &mut BTreeMap<String, DeclShape<'a>>,
) -> Result<(), ModelError> {
    match node {
        TypeNode::Primitive(_) | TypeNode::Literal(_) | TypeNode::Ref(_) => Ok(()),
        TypeNode::Optional(inner) | TypeNode::Sequence(inner) => {
            collect_hoisted_node(inner, decls)
        }
        TypeNode::Map { key, value } => {
            collect_hoisted_node(key, decls)?;
            collect_hoisted_node(value, decls)
        }
        TypeNode::Tuple(elements) => {
            for element in elements {
                collect_hoisted_node(element, decls)?;
            }
            Ok(())
        }
        TypeNode::Function { params, returns } => {
            for param in params {
                collect_hoisted_node(&param.ty, decls)?;
            }
            collect_hoisted_node(returns, decls)
        }
        TypeNode::Record(rec) => {
            claim(rec.name.clone(), DeclShape::Inline(rec), decls)?;
            collect_hoisted_fields(rec, decls)
        }
    }
}

fn validate_named(
    named: &NamedType,
    roots: &BTreeMap<&str, &NamedType>,
) -> Result<(), ModelError> {
    match named {
        NamedType::Record(rec) => validate_record(rec, roots),
        NamedType::Sum(sum) => {
            let mut seen = BTreeSet::new();
            for variant in &sum.variants {
                if !seen.insert(variant.name.as_str()) {
                    return Err(ModelError::DuplicateVariant {
                        declaration: sum.name.clone(),
                        variant: variant.name.clone(),
                    });
                }
                validate_record(variant, roots)?;
            }
            Ok(())
        }
        NamedType::Enum(en) => {
            let mut seen = BTreeSet::new();
            for value in &en.values {
                if !seen.insert(value.as_str()) {
                    return Err(ModelError::DuplicateEnumValue {
                        declaration: en.name.clone(),
                        value: value.clone(),
                    });
                }
            }
            Ok(())
        }
        NamedType::Function {
            name,
            params,
            returns,
        } => {
            for param in params {
                validate_node(&param.ty, name, roots)?;
            }
            validate_node(returns, name, roots)
        }
    }
}

fn validate_record(
    rec: &RecordType,
    roots: &BTreeMap<&str, &NamedType>,
) -> Result<(), ModelError> {
    let mut seen = BTreeSet::new();
    for field in &rec.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(ModelError::DuplicateField {
                declaration: rec.name.clone(),
                field: field.name.clone(),
            });
        }
        // An optional-flagged field typed `optional` is the flag applied
        // twice: reject it the same way as a literal nested optional.
        if field.optional && matches!(field.ty, TypeNode::Optional(_)) {
            return Err(ModelError::NestedOptional {
                context: format!("record '{}' field '{}'", rec.name, field.name),
            });
        }
        validate_node(&field.ty, &rec.name, roots)?;
    }
    Ok(())
}

fn validate_node(
    node: &TypeNode,
    declaration: &str,
    roots: &BTreeMap<&str, &NamedType>,
) -> Result<(), ModelError> {
    match node {
        TypeNode::Primitive(_) | TypeNode::Literal(_) => Ok(()),
        TypeNode::Optional(inner) => {
            if matches!(inner.as_ref(), TypeNode::Optional(_)) {
                return Err(ModelError::NestedOptional {
                    context: format!("declaration '{}'", declaration),
                });
            }
            validate_node(inner, declaration, roots)
        }
        TypeNode::Sequence(item) => validate_node(item, declaration, roots),
        TypeNode::Map { key, value } => {
            // Non-string keys are a generation-time error with richer
            // context; the model walk only descends.
            validate_node(key, declaration, roots)?;
            validate_node(value, declaration, roots)
        }
        TypeNode::Tuple(elements) => {
            for element in elements {
                validate_node(element, declaration, roots)?;
            }
            Ok(())
        }
        TypeNode::Function { params, returns } => {
            for param in params {
                validate_node(&param.ty, declaration, roots)?;
            }
            validate_node(returns, declaration, roots)
        }
        TypeNode::Record(rec) => validate_record(rec, roots),
        TypeNode::Ref(name) => {
            if roots.contains_key(name.as_str()) {
                Ok(())
            } else {
                Err(ModelError::UnresolvedReference {
                    name: name.clone(),
                    referrer: declaration.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_model;

    fn parse(sources: serde_json::Value) -> ModelDocument {
        from_model(&serde_json::json!({
            "id": "test",
            "declgen": "1.0",
            "sources": sources
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_model_passes() {
        let model = parse(serde_json::json!([{
            "name": "main",
            "types": [
                {"kind": "record", "name": "INode", "fields": [
                    {"name": "value", "type": {"kind": "primitive", "name": "string"}},
                    {"name": "next", "type": {"kind": "ref", "name": "INode"}, "optional": true}
                ]}
            ]
        }]));
        assert!(validate(&model).is_ok());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let model = parse(serde_json::json!([{
            "name": "main",
            "types": [{"kind": "record", "name": "IFoo", "fields": [
                {"name": "x", "type": {"kind": "primitive", "name": "string"}},
                {"name": "x", "type": {"kind": "primitive", "name": "number"}}
            ]}]
        }]));
        let err = validate(&model).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateField { field, .. } if field == "x"));
    }

    #[test]
    fn test_duplicate_variant_rejected() {
        let model = parse(serde_json::json!([{
            "name": "main",
            "types": [{"kind": "sum", "name": "S", "variants": [
                {"name": "A", "fields": []},
                {"name": "A", "fields": []}
            ]}]
        }]));
        let err = validate(&model).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateVariant { variant, .. } if variant == "A"));
    }

    #[test]
    fn test_duplicate_enum_value_rejected() {
        let model = parse(serde_json::json!([{
            "name": "main",
            "types": [{"kind": "enum", "name": "E", "values": ["A", "B", "A"]}]
        }]));
        let err = validate(&model).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateEnumValue { value, .. } if value == "A"));
    }

    #[test]
    fn test_nested_optional_rejected() {
        let model = parse(serde_json::json!([{
            "name": "main",
            "types": [{"kind": "record", "name": "IFoo", "fields": [
                {"name": "x", "type": {"kind": "optional", "inner": {
                    "kind": "optional", "inner": {"kind": "primitive", "name": "string"}
                }}}
            ]}]
        }]));
        let err = validate(&model).unwrap_err();
        assert!(matches!(err, ModelError::NestedOptional { .. }));
    }

    #[test]
    fn test_optional_flag_on_optional_type_rejected() {
        let model = parse(serde_json::json!([{
            "name": "main",
            "types": [{"kind": "record", "name": "IFoo", "fields": [
                {"name": "x", "optional": true, "type": {
                    "kind": "optional", "inner": {"kind": "primitive", "name": "string"}
                }}
            ]}]
        }]));
        let err = validate(&model).unwrap_err();
        assert!(matches!(err, ModelError::NestedOptional { .. }));
    }

    #[test]
    fn test_unresolved_reference_rejected() {
        let model = parse(serde_json::json!([{
            "name": "main",
            "types": [{"kind": "record", "name": "IFoo", "fields": [
                {"name": "x", "type": {"kind": "ref", "name": "IMissing"}}
            ]}]
        }]));
        let err = validate(&model).unwrap_err();
        assert_eq!(
            err,
            ModelError::UnresolvedReference {
                name: "IMissing".to_string(),
                referrer: "IFoo".to_string()
            }
        );
    }

    #[test]
    fn test_same_name_identical_roots_allowed() {
        let shared = serde_json::json!({"kind": "record", "name": "IShared", "fields": [
            {"name": "id", "type": {"kind": "primitive", "name": "string"}}
        ]});
        let model = parse(serde_json::json!([
            {"name": "alpha", "types": [shared.clone()]},
            {"name": "beta", "types": [shared]}
        ]));
        assert!(validate(&model).is_ok());
    }

    #[test]
    fn test_same_name_different_roots_rejected() {
        let model = parse(serde_json::json!([
            {"name": "alpha", "types": [{"kind": "record", "name": "IShared", "fields": [
                {"name": "id", "type": {"kind": "primitive", "name": "string"}}
            ]}]},
            {"name": "beta", "types": [{"kind": "record", "name": "IShared", "fields": [
                {"name": "id", "type": {"kind": "primitive", "name": "number"}}
            ]}]}
        ]));
        let err = validate(&model).unwrap_err();
        assert_eq!(
            err,
            ModelError::NameCollision {
                name: "IShared".to_string()
            }
        );
    }

    #[test]
    fn test_same_name_different_inline_records_rejected() {
        let model = parse(serde_json::json!([{
            "name": "main",
            "types": [{"kind": "record", "name": "IFoo", "fields": [
                {"name": "a", "type": {"kind": "record", "name": "IBar", "fields": [
                    {"name": "x", "type": {"kind": "primitive", "name": "string"}}
                ]}},
                {"name": "b", "type": {"kind": "record", "name": "IBar", "fields": [
                    {"name": "x", "type": {"kind": "primitive", "name": "number"}}
                ]}}
            ]}]
        }]));
        let err = validate(&model).unwrap_err();
        assert_eq!(
            err,
            ModelError::NameCollision {
                name: "IBar".to_string()
            }
        );
    }

    #[test]
    fn test_identical_inline_records_allowed() {
        let inner = serde_json::json!({"kind": "record", "name": "IBar", "fields": [
            {"name": "x", "type": {"kind": "primitive", "name": "string"}}
        ]});
        let model = parse(serde_json::json!([{
            "name": "main",
            "types": [{"kind": "record", "name": "IFoo", "fields": [
                {"name": "a", "type": inner.clone()},
                {"name": "b", "type": inner}
            ]}]
        }]));
        assert!(validate(&model).is_ok());
    }

    #[test]
    fn test_inline_record_matching_root_allowed() {
        let model = parse(serde_json::json!([{
            "name": "main",
            "types": [
                {"kind": "record", "name": "IBar", "fields": [
                    {"name": "x", "type": {"kind": "primitive", "name": "string"}}
                ]},
                {"kind": "record", "name": "IFoo", "fields": [
                    {"name": "a", "type": {"kind": "record", "name": "IBar", "fields": [
                        {"name": "x", "type": {"kind": "primitive", "name": "string"}}
                    ]}}
                ]}
            ]
        }]));
        assert!(validate(&model).is_ok());
    }

    #[test]
    fn test_variant_interface_name_clashing_with_root_rejected() {
        let model = parse(serde_json::json!([{
            "name": "main",
            "types": [
                {"kind": "record", "name": "IBar", "fields": [
                    {"name": "x", "type": {"kind": "primitive", "name": "string"}}
                ]},
                {"kind": "sum", "name": "S", "variants": [
                    {"name": "Bar", "fields": [
                        {"name": "y", "type": {"kind": "primitive", "name": "number"}}
                    ]}
                ]}
            ]
        }]));
        let err = validate(&model).unwrap_err();
        assert_eq!(
            err,
            ModelError::NameCollision {
                name: "IBar".to_string()
            }
        );
    }

    #[test]
    fn test_variant_interface_name_clashing_with_inline_record_rejected() {
        let model = parse(serde_json::json!([{
            "name": "main",
            "types": [
                {"kind": "sum", "name": "S", "variants": [
                    {"name": "Bar", "fields": []}
                ]},
                {"kind": "record", "name": "IFoo", "fields": [
                    {"name": "a", "type": {"kind": "record", "name": "IBar", "fields": []}}
                ]}
            ]
        }]));
        let err = validate(&model).unwrap_err();
        assert_eq!(
            err,
            ModelError::NameCollision {
                name: "IBar".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_source_names_rejected() {
        let model = parse(serde_json::json!([
            {"name": "main", "types": []},
            {"name": "main", "types": []}
        ]));
        let err = validate(&model).unwrap_err();
        assert!(matches!(err, ModelError::Invalid { .. }));
    }
}
