//! Deserialization from model JSON documents into typed structs.
//!
//! The main entry point is [`from_model`], which takes a
//! `&serde_json::Value` and produces a [`ModelDocument`]. Parsing is a
//! hand-rolled walk with `kind` dispatch so every error can name the
//! declaration and member it occurred in.

use crate::types::*;
use std::fmt;

/// Errors during model document deserialization and validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The document or a declaration is missing a required field.
    MissingField { field: String, context: String },
    /// A `kind` tag names no known node or declaration kind.
    UnknownKind { kind: String, context: String },
    /// The document shape is invalid (wrong JSON type, bad value).
    Invalid { context: String, message: String },
    /// A record declares the same field name twice.
    DuplicateField { declaration: String, field: String },
    /// A sum type declares the same variant name twice.
    DuplicateVariant { declaration: String, variant: String },
    /// An enum declares the same value twice.
    DuplicateEnumValue { declaration: String, value: String },
    /// An optional wraps another optional.
    NestedOptional { context: String },
    /// A reference names no root declared in the model.
    UnresolvedReference { name: String, referrer: String },
    /// Two roots share a name but are structurally different.
    NameCollision { name: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::MissingField { field, context } => {
                write!(f, "{}: missing required field '{}'", context, field)
            }
            ModelError::UnknownKind { kind, context } => {
                write!(f, "{}: unknown kind '{}'", context, kind)
            }
            ModelError::Invalid { context, message } => {
                write!(f, "{}: {}", context, message)
            }
            ModelError::DuplicateField { declaration, field } => {
                write!(f, "record '{}': duplicate field '{}'", declaration, field)
            }
            ModelError::DuplicateVariant {
                declaration,
                variant,
            } => {
                write!(
                    f,
                    "sum type '{}': duplicate variant '{}'",
                    declaration, variant
                )
            }
            ModelError::DuplicateEnumValue { declaration, value } => {
                write!(f, "enum '{}': duplicate value '{}'", declaration, value)
            }
            ModelError::NestedOptional { context } => {
                write!(f, "{}: optional may not wrap another optional", context)
            }
            ModelError::UnresolvedReference { name, referrer } => {
                write!(f, "unresolved reference '{}' in '{}'", name, referrer)
            }
            ModelError::NameCollision { name } => {
                write!(
                    f,
                    "name collision: '{}' is declared more than once with different structure",
                    name
                )
            }
        }
    }
}

impl std::error::Error for ModelError {}

/// Deserialize a model JSON document into typed structs.
///
/// Walks the `sources` array and each source's `types` array, dispatching
/// on the `kind` field. Unknown kinds are a hard error: the model contract
/// is closed, unlike forward-compatible wire formats.
pub fn from_model(doc: &serde_json::Value) -> Result<ModelDocument, ModelError> {
    let id = required_str(doc, "id", "document")?;
    let version = doc
        .get("declgen")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let sources_arr = doc
        .get("sources")
        .and_then(|s| s.as_array())
        .ok_or_else(|| ModelError::MissingField {
            field: "sources".to_string(),
            context: "document".to_string(),
        })?;

    let mut sources = Vec::with_capacity(sources_arr.len());
    for obj in sources_arr {
        sources.push(parse_source(obj)?);
    }

    Ok(ModelDocument {
        id,
        version,
        sources,
    })
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn required_str(
    obj: &serde_json::Value,
    field: &str,
    context: &str,
) -> Result<String, ModelError> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ModelError::MissingField {
            field: field.to_string(),
            context: context.to_string(),
        })
}

fn required_array<'a>(
    obj: &'a serde_json::Value,
    field: &str,
    context: &str,
) -> Result<&'a Vec<serde_json::Value>, ModelError> {
    obj.get(field)
        .and_then(|v| v.as_array())
        .ok_or_else(|| ModelError::MissingField {
            field: field.to_string(),
            context: context.to_string(),
        })
}

fn parse_source(obj: &serde_json::Value) -> Result<SourceUnit, ModelError> {
    let name = required_str(obj, "name", "source")?;
    let module = obj
        .get("module")
        .and_then(|m| m.as_str())
        .map(|s| s.to_string());

    let context = format!("source '{}'", name);
    let types_arr = required_array(obj, "types", &context)?;
    let mut types = Vec::with_capacity(types_arr.len());
    for t in types_arr {
        types.push(parse_named_type(t, &context)?);
    }

    Ok(SourceUnit {
        name,
        module,
        types,
    })
}

fn parse_named_type(obj: &serde_json::Value, context: &str) -> Result<NamedType, ModelError> {
    let kind = obj.get("kind").and_then(|k| k.as_str()).unwrap_or("");
    match kind {
        "record" => Ok(NamedType::Record(parse_record(obj, context)?)),
        "sum" => Ok(NamedType::Sum(parse_sum(obj, context)?)),
        "enum" => Ok(NamedType::Enum(parse_enum(obj, context)?)),
        "function" => {
            let name = required_str(obj, "name", context)?;
            let fn_context = format!("function '{}'", name);
            let params = parse_params(obj, &fn_context)?;
            let returns = obj.get("returns").ok_or_else(|| ModelError::MissingField {
                field: "returns".to_string(),
                context: fn_context.clone(),
            })?;
            Ok(NamedType::Function {
                params,
                returns: parse_type_node(returns, &fn_context)?,
                name,
            })
        }
        other => Err(ModelError::UnknownKind {
            kind: other.to_string(),
            context: context.to_string(),
        }),
    }
}

fn parse_record(obj: &serde_json::Value, context: &str) -> Result<RecordType, ModelError> {
    let name = required_str(obj, "name", context)?;
    let rec_context = format!("record '{}'", name);

    let fields_arr = required_array(obj, "fields", &rec_context)?;
    let mut fields = Vec::with_capacity(fields_arr.len());
    for fobj in fields_arr {
        let fname = required_str(fobj, "name", &rec_context)?;
        let field_context = format!("{} field '{}'", rec_context, fname);
        let ty = fobj.get("type").ok_or_else(|| ModelError::MissingField {
            field: "type".to_string(),
            context: field_context.clone(),
        })?;
        let optional = fobj
            .get("optional")
            .and_then(|o| o.as_bool())
            .unwrap_or(false);
        fields.push(Field {
            name: fname,
            ty: parse_type_node(ty, &field_context)?,
            optional,
        });
    }

    Ok(RecordType { name, fields })
}

fn parse_sum(obj: &serde_json::Value, context: &str) -> Result<SumType, ModelError> {
    let name = required_str(obj, "name", context)?;
    let sum_context = format!("sum type '{}'", name);

    let variants_arr = required_array(obj, "variants", &sum_context)?;
    let mut variants = Vec::with_capacity(variants_arr.len());
    for vobj in variants_arr {
        variants.push(parse_record(vobj, &sum_context)?);
    }

    Ok(SumType { name, variants })
}

fn parse_enum(obj: &serde_json::Value, context: &str) -> Result<EnumType, ModelError> {
    let name = required_str(obj, "name", context)?;
    let enum_context = format!("enum '{}'", name);

    let values_arr = required_array(obj, "values", &enum_context)?;
    let mut values = Vec::with_capacity(values_arr.len());
    for v in values_arr {
        let s = v.as_str().ok_or_else(|| ModelError::Invalid {
            context: enum_context.clone(),
            message: "enum values must be strings".to_string(),
        })?;
        values.push(s.to_string());
    }

    Ok(EnumType { name, values })
}

fn parse_params(obj: &serde_json::Value, context: &str) -> Result<Vec<Param>, ModelError> {
    let params_arr = required_array(obj, "params", context)?;
    let mut params = Vec::with_capacity(params_arr.len());
    for pobj in params_arr {
        let name = required_str(pobj, "name", context)?;
        let param_context = format!("{} param '{}'", context, name);
        let ty = pobj.get("type").ok_or_else(|| ModelError::MissingField {
            field: "type".to_string(),
            context: param_context.clone(),
        })?;
        params.push(Param {
            name,
            ty: parse_type_node(ty, &param_context)?,
        });
    }
    Ok(params)
}

fn parse_type_node(obj: &serde_json::Value, context: &str) -> Result<TypeNode, ModelError> {
    let kind = obj.get("kind").and_then(|k| k.as_str()).unwrap_or("");
    match kind {
        "primitive" => {
            let name = required_str(obj, "name", context)?;
            let p = match name.as_str() {
                "string" => Primitive::String,
                "number" => Primitive::Number,
                "boolean" => Primitive::Boolean,
                "null" => Primitive::Null,
                "void" => Primitive::Void,
                other => {
                    return Err(ModelError::Invalid {
                        context: context.to_string(),
                        message: format!("unknown primitive '{}'", other),
                    })
                }
            };
            Ok(TypeNode::Primitive(p))
        }
        "optional" => {
            let inner = obj.get("inner").ok_or_else(|| ModelError::MissingField {
                field: "inner".to_string(),
                context: context.to_string(),
            })?;
            Ok(TypeNode::Optional(Box::new(parse_type_node(
                inner, context,
            )?)))
        }
        "sequence" => {
            let item = obj.get("item").ok_or_else(|| ModelError::MissingField {
                field: "item".to_string(),
                context: context.to_string(),
            })?;
            Ok(TypeNode::Sequence(Box::new(parse_type_node(
                item, context,
            )?)))
        }
        "map" => {
            let key = obj.get("key").ok_or_else(|| ModelError::MissingField {
                field: "key".to_string(),
                context: context.to_string(),
            })?;
            let value = obj.get("value").ok_or_else(|| ModelError::MissingField {
                field: "value".to_string(),
                context: context.to_string(),
            })?;
            Ok(TypeNode::Map {
                key: Box::new(parse_type_node(key, context)?),
                value: Box::new(parse_type_node(value, context)?),
            })
        }
        "tuple" => {
            let elements_arr = required_array(obj, "elements", context)?;
            let mut elements = Vec::with_capacity(elements_arr.len());
            for e in elements_arr {
                elements.push(parse_type_node(e, context)?);
            }
            Ok(TypeNode::Tuple(elements))
        }
        "function" => {
            let params = parse_params(obj, context)?;
            let returns = obj.get("returns").ok_or_else(|| ModelError::MissingField {
                field: "returns".to_string(),
                context: context.to_string(),
            })?;
            Ok(TypeNode::Function {
                params,
                returns: Box::new(parse_type_node(returns, context)?),
            })
        }
        "record" => Ok(TypeNode::Record(parse_record(obj, context)?)),
        "literal" => {
            let value = obj.get("value").ok_or_else(|| ModelError::MissingField {
                field: "value".to_string(),
                context: context.to_string(),
            })?;
            let lit = match value {
                serde_json::Value::String(s) => LiteralValue::Str(s.clone()),
                serde_json::Value::Number(n) => LiteralValue::Num(n.clone()),
                serde_json::Value::Null => LiteralValue::Null,
                _ => {
                    return Err(ModelError::Invalid {
                        context: context.to_string(),
                        message: "literal value must be a string, number or null".to_string(),
                    })
                }
            };
            Ok(TypeNode::Literal(lit))
        }
        "ref" => {
            let name = required_str(obj, "name", context)?;
            Ok(TypeNode::Ref(name))
        }
        other => Err(ModelError::UnknownKind {
            kind: other.to_string(),
            context: context.to_string(),
        }),
    }
}
