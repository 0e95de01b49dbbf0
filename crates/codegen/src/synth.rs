//! Declaration synthesis: maps Type Model nodes to declarations plus the
//! reference form an enclosing node uses.
//!
//! Synthesis descends each root once. Inline records are hoisted into
//! their own declarations and referenced by name; `ref` nodes resolve to
//! the referenced root and pull its transitive closure into the registry
//! without re-descending into anything already claimed there, which is
//! what lets recursive types terminate.

use std::collections::BTreeMap;

use declgen_model::{
    LiteralValue, ModelDocument, NamedType, Param, Primitive, RecordType, TypeNode,
};

use crate::decl::{string_literal, Declaration, Member};
use crate::discriminant;
use crate::error::CodegenError;
use crate::registry::{DeclEntry, Registry};

/// Per-run synthesis context: the root index and the discriminant switch.
pub struct Synthesizer<'a> {
    index: BTreeMap<&'a str, &'a NamedType>,
    discriminant: Option<&'a str>,
}

impl<'a> Synthesizer<'a> {
    pub fn new(model: &'a ModelDocument, discriminant: Option<&'a str>) -> Self {
        let mut index = BTreeMap::new();
        for source in &model.sources {
            for named in &source.types {
                // Same-name roots are structurally identical past
                // validation, so first wins.
                index.entry(named.name()).or_insert(named);
            }
        }
        Synthesizer {
            index,
            discriminant,
        }
    }

    /// Synthesize one root and everything it transitively needs into the
    /// registry. Idempotent per name.
    pub fn synth_root(&self, named: &NamedType, reg: &mut Registry) -> Result<(), CodegenError> {
        match named {
            NamedType::Record(rec) => self.synth_record(rec, &rec.name, None, reg),
            NamedType::Sum(sum) => {
                if !reg.begin(&sum.name) {
                    return Ok(());
                }
                let mut arms = Vec::with_capacity(sum.variants.len());
                for variant in &sum.variants {
                    let iface = format!("I{}", variant.name);
                    let tag = match self.discriminant {
                        Some(field) => {
                            discriminant::check_collision(variant, field)?;
                            Some(discriminant::tag_member(field, &variant.name))
                        }
                        None => None,
                    };
                    self.synth_record(variant, &iface, tag, reg)?;
                    arms.push(iface);
                }
                reg.insert(DeclEntry {
                    refs: arms.clone(),
                    decl: Declaration::Union {
                        name: sum.name.clone(),
                        arms,
                    },
                })
            }
            NamedType::Enum(en) => {
                if !reg.begin(&en.name) {
                    return Ok(());
                }
                let arms = en.values.iter().map(|v| string_literal(v)).collect();
                reg.insert(DeclEntry {
                    decl: Declaration::Union {
                        name: en.name.clone(),
                        arms,
                    },
                    refs: vec![],
                })
            }
            NamedType::Function {
                name,
                params,
                returns,
            } => {
                if !reg.begin(name) {
                    return Ok(());
                }
                let mut refs = Vec::new();
                let params = self.param_refs(params, name, reg, &mut refs)?;
                let returns = self.type_ref(returns, name, reg, &mut refs)?;
                reg.insert(DeclEntry {
                    decl: Declaration::FunctionAlias {
                        name: name.clone(),
                        params,
                        returns,
                    },
                    refs,
                })
            }
        }
    }

    /// Hoist a record into an interface declaration named `decl_name`,
    /// appending `tag` (the discriminant member) when supplied.
    fn synth_record(
        &self,
        rec: &RecordType,
        decl_name: &str,
        tag: Option<Member>,
        reg: &mut Registry,
    ) -> Result<(), CodegenError> {
        if !reg.begin(decl_name) {
            return Ok(());
        }
        let mut refs = Vec::new();
        let mut members = Vec::with_capacity(rec.fields.len() + 1);
        for field in &rec.fields {
            // `optional: true` and a type wrapped in `optional` both mean
            // the presence marker; neither becomes a nullable union.
            let (ty_node, optional) = match &field.ty {
                TypeNode::Optional(inner) => (inner.as_ref(), true),
                other => (other, field.optional),
            };
            let member = match ty_node {
                TypeNode::Function { params, returns } if !optional => Member::Method {
                    name: field.name.clone(),
                    params: self.param_refs(params, decl_name, reg, &mut refs)?,
                    returns: self.type_ref(returns, decl_name, reg, &mut refs)?,
                },
                _ => Member::Property {
                    name: field.name.clone(),
                    ty: self.type_ref(ty_node, decl_name, reg, &mut refs)?,
                    optional,
                },
            };
            members.push(member);
        }
        if let Some(tag) = tag {
            members.push(tag);
        }
        reg.insert(DeclEntry {
            decl: Declaration::Interface {
                name: decl_name.to_string(),
                members,
            },
            refs,
        })
    }

    fn param_refs(
        &self,
        params: &[Param],
        owner: &str,
        reg: &mut Registry,
        refs: &mut Vec<String>,
    ) -> Result<Vec<(String, String)>, CodegenError> {
        params
            .iter()
            .map(|p| {
                Ok((
                    p.name.clone(),
                    self.type_ref(&p.ty, owner, reg, refs)?,
                ))
            })
            .collect()
    }

    /// The reference form of a node, synthesizing any hoisted declarations
    /// along the way. Every declaration name returned is also recorded in
    /// `refs`, in first-referenced order.
    fn type_ref(
        &self,
        node: &TypeNode,
        owner: &str,
        reg: &mut Registry,
        refs: &mut Vec<String>,
    ) -> Result<String, CodegenError> {
        match node {
            TypeNode::Primitive(p) => Ok(p.name().to_string()),
            TypeNode::Optional(inner) => {
                // Outside field position the presence marker has nowhere to
                // go, so absence renders as a null union.
                Ok(format!("({} | null)", self.type_ref(inner, owner, reg, refs)?))
            }
            TypeNode::Sequence(item) => {
                let rendered = self.type_ref(item, owner, reg, refs)?;
                if matches!(item.as_ref(), TypeNode::Function { .. }) {
                    Ok(format!("({})[]", rendered))
                } else {
                    Ok(format!("{}[]", rendered))
                }
            }
            TypeNode::Map { key, value } => {
                if !matches!(key.as_ref(), TypeNode::Primitive(Primitive::String)) {
                    return Err(CodegenError::UnsupportedKeyType {
                        declaration: owner.to_string(),
                        key: node_kind(key),
                    });
                }
                Ok(format!(
                    "{{ [key: string]: {} }}",
                    self.type_ref(value, owner, reg, refs)?
                ))
            }
            TypeNode::Tuple(elements) => {
                let rendered = elements
                    .iter()
                    .map(|e| self.type_ref(e, owner, reg, refs))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("[{}]", rendered.join(", ")))
            }
            TypeNode::Function { params, returns } => {
                let params = self.param_refs(params, owner, reg, refs)?;
                let returns = self.type_ref(returns, owner, reg, refs)?;
                let params = params
                    .iter()
                    .map(|(name, ty)| format!("{}: {}", name, ty))
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(format!("({}) => {}", params, returns))
            }
            TypeNode::Record(rec) => {
                self.synth_record(rec, &rec.name, None, reg)?;
                refs.push(rec.name.clone());
                Ok(rec.name.clone())
            }
            TypeNode::Literal(lit) => Ok(literal_text(lit)),
            TypeNode::Ref(name) => match self.index.get(name.as_str()) {
                Some(target) => {
                    self.synth_root(target, reg)?;
                    refs.push(name.clone());
                    Ok(name.clone())
                }
                None => Err(CodegenError::UnresolvedReference {
                    name: name.clone(),
                    referrer: owner.to_string(),
                }),
            },
        }
    }
}

fn literal_text(lit: &LiteralValue) -> String {
    match lit {
        LiteralValue::Str(s) => string_literal(s),
        LiteralValue::Num(n) => n.to_string(),
        LiteralValue::Null => "null".to_string(),
    }
}

fn node_kind(node: &TypeNode) -> String {
    match node {
        TypeNode::Primitive(p) => format!("primitive '{}'", p.name()),
        TypeNode::Optional(_) => "an optional".to_string(),
        TypeNode::Sequence(_) => "a sequence".to_string(),
        TypeNode::Map { .. } => "a map".to_string(),
        TypeNode::Tuple(_) => "a tuple".to_string(),
        TypeNode::Function { .. } => "a function signature".to_string(),
        TypeNode::Record(rec) => format!("record '{}'", rec.name),
        TypeNode::Literal(lit) => format!("literal {}", literal_text(lit)),
        TypeNode::Ref(name) => format!("reference '{}'", name),
    }
}
