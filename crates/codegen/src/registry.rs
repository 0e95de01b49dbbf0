//! Structural registry: collects synthesized declarations for one
//! packaging scope, deduplicates by name, detects collisions, and imposes
//! the final alphabetical ordering.
//!
//! A registry is an explicit value owned by a single generation pass,
//! never ambient state. In standalone packaging each output unit gets its
//! own registry; in linked packaging one registry spans the whole run and
//! [`assign_homes`] decides which unit each declaration belongs to.

use std::collections::{BTreeMap, BTreeSet};

use declgen_model::{ModelDocument, NamedType, RecordType, TypeNode};

use crate::decl::Declaration;
use crate::error::CodegenError;

/// A declaration plus the names of other declarations it references, in
/// first-referenced order. The reference list drives import resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclEntry {
    pub decl: Declaration,
    pub refs: Vec<String>,
}

/// One packaging scope's declarations, keyed by name.
#[derive(Debug, Default)]
pub struct Registry {
    decls: BTreeMap<String, DeclEntry>,
    in_progress: BTreeSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Claim a name for synthesis. Returns false when the name is already
    /// synthesized or currently being synthesized (recursive reference),
    /// in which case the caller must not descend again.
    pub fn begin(&mut self, name: &str) -> bool {
        if self.decls.contains_key(name) || self.in_progress.contains(name) {
            return false;
        }
        self.in_progress.insert(name.to_string());
        true
    }

    /// Insert a finished declaration. Idempotent for structurally identical
    /// declarations; structurally different same-name declarations are a
    /// collision.
    pub fn insert(&mut self, entry: DeclEntry) -> Result<(), CodegenError> {
        let name = entry.decl.name().to_string();
        self.in_progress.remove(&name);
        match self.decls.get(&name) {
            Some(existing) if existing.decl != entry.decl => Err(CodegenError::NameCollision {
                name,
                detail: "two structurally different declarations share this name".to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.decls.insert(name, entry);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&DeclEntry> {
        self.decls.get(name)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// All declarations in final emission order: strictly alphabetical by
    /// name, uniform across declaration kinds.
    pub fn entries(&self) -> impl Iterator<Item = &DeclEntry> {
        self.decls.values()
    }
}

/// Linked-mode pre-pass: assign every declaration name a single home unit.
///
/// Rules, applied in order:
///
/// 1. a name rooted in exactly one source is homed there;
/// 2. a name rooted identically in several sources is homed in the
///    alphabetically first of them;
/// 3. a name that only arises as a hoisted nested declaration (inline
///    record or sum variant interface) takes the home of its enclosing
///    root; enclosing roots homed in different sources make the name
///    ambiguous and abort the run.
///
/// Assumes the model has already passed validation, so same-name roots are
/// structurally identical.
pub fn assign_homes(model: &ModelDocument) -> Result<BTreeMap<String, String>, CodegenError> {
    let mut root_homes: BTreeMap<&str, &str> = BTreeMap::new();
    for source in &model.sources {
        for named in &source.types {
            let home = root_homes.entry(named.name()).or_insert(source.name.as_str());
            if source.name.as_str() < *home {
                *home = source.name.as_str();
            }
        }
    }

    let mut claims: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for source in &model.sources {
        for named in &source.types {
            let home = root_homes[named.name()];
            let mut nested = Vec::new();
            collect_nested(named, &mut nested);
            for name in nested {
                if root_homes.contains_key(name.as_str()) {
                    continue;
                }
                claims.entry(name).or_default().insert(home);
            }
        }
    }

    let mut homes: BTreeMap<String, String> = root_homes
        .iter()
        .map(|(name, home)| (name.to_string(), home.to_string()))
        .collect();
    for (name, claimants) in claims {
        if claimants.len() == 1 {
            let home = claimants.into_iter().next().unwrap();
            homes.insert(name, home.to_string());
        } else {
            return Err(CodegenError::HomeAssignmentAmbiguity {
                name,
                candidates: claimants.into_iter().map(str::to_string).collect(),
            });
        }
    }

    Ok(homes)
}

/// Names of the declarations a root hoists out of itself: inline records
/// (recursively) and, for sum types, the per-variant interfaces.
fn collect_nested(named: &NamedType, out: &mut Vec<String>) {
    match named {
        NamedType::Record(rec) => collect_nested_record(rec, out),
        NamedType::Sum(sum) => {
            for variant in &sum.variants {
                out.push(format!("I{}", variant.name));
                collect_nested_record(variant, out);
            }
        }
        NamedType::Enum(_) => {}
        NamedType::Function {
            params, returns, ..
        } => {
            for param in params {
                collect_nested_node(&param.ty, out);
            }
            collect_nested_node(returns, out);
        }
    }
}

fn collect_nested_record(rec: &RecordType, out: &mut Vec<String>) {
    for field in &rec.fields {
        collect_nested_node(&field.ty, out);
    }
}

fn collect_nested_node(node: &TypeNode, out: &mut Vec<String>) {
    match node {
        TypeNode::Primitive(_) | TypeNode::Literal(_) | TypeNode::Ref(_) => {}
        TypeNode::Optional(inner) | TypeNode::Sequence(inner) => collect_nested_node(inner, out),
        TypeNode::Map { key, value } => {
            collect_nested_node(key, out);
            collect_nested_node(value, out);
        }
        TypeNode::Tuple(elements) => {
            for element in elements {
                collect_nested_node(element, out);
            }
        }
        TypeNode::Function { params, returns } => {
            for param in params {
                collect_nested_node(&param.ty, out);
            }
            collect_nested_node(returns, out);
        }
        TypeNode::Record(rec) => {
            out.push(rec.name.clone());
            collect_nested_record(rec, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::Member;
    use declgen_model::from_model;

    fn interface(name: &str, field_ty: &str) -> DeclEntry {
        DeclEntry {
            decl: Declaration::Interface {
                name: name.to_string(),
                members: vec![Member::Property {
                    name: "x".to_string(),
                    ty: field_ty.to_string(),
                    optional: false,
                }],
            },
            refs: vec![],
        }
    }

    #[test]
    fn test_insert_is_idempotent_for_identical() {
        let mut reg = Registry::new();
        reg.insert(interface("IFoo", "string")).unwrap();
        reg.insert(interface("IFoo", "string")).unwrap();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_insert_collides_for_different() {
        let mut reg = Registry::new();
        reg.insert(interface("IFoo", "string")).unwrap();
        let err = reg.insert(interface("IFoo", "number")).unwrap_err();
        assert!(matches!(err, CodegenError::NameCollision { name, .. } if name == "IFoo"));
    }

    #[test]
    fn test_entries_are_alphabetical() {
        let mut reg = Registry::new();
        reg.insert(interface("IZeta", "string")).unwrap();
        reg.insert(interface("IAlpha", "string")).unwrap();
        reg.insert(interface("IMid", "string")).unwrap();
        let names: Vec<&str> = reg.entries().map(|e| e.decl.name()).collect();
        assert_eq!(names, vec!["IAlpha", "IMid", "IZeta"]);
    }

    #[test]
    fn test_begin_blocks_reentry() {
        let mut reg = Registry::new();
        assert!(reg.begin("INode"));
        assert!(!reg.begin("INode"));
        reg.insert(interface("INode", "string")).unwrap();
        assert!(!reg.begin("INode"));
    }

    fn parse(sources: serde_json::Value) -> ModelDocument {
        from_model(&serde_json::json!({
            "id": "test",
            "declgen": "1.0",
            "sources": sources
        }))
        .unwrap()
    }

    #[test]
    fn test_home_is_declaring_source() {
        let model = parse(serde_json::json!([
            {"name": "alpha", "types": [{"kind": "record", "name": "IFoo", "fields": []}]},
            {"name": "beta", "types": [{"kind": "record", "name": "IBar", "fields": []}]}
        ]));
        let homes = assign_homes(&model).unwrap();
        assert_eq!(homes["IFoo"], "alpha");
        assert_eq!(homes["IBar"], "beta");
    }

    #[test]
    fn test_home_tie_break_is_alphabetical() {
        let shared = serde_json::json!({"kind": "record", "name": "IShared", "fields": []});
        let model = parse(serde_json::json!([
            {"name": "zeta", "types": [shared.clone()]},
            {"name": "alpha", "types": [shared]}
        ]));
        let homes = assign_homes(&model).unwrap();
        assert_eq!(homes["IShared"], "alpha");
    }

    #[test]
    fn test_nested_home_follows_enclosing_root() {
        let model = parse(serde_json::json!([
            {"name": "alpha", "types": [{"kind": "record", "name": "IOuter", "fields": [
                {"name": "inner", "type": {"kind": "record", "name": "IInner", "fields": []}}
            ]}]}
        ]));
        let homes = assign_homes(&model).unwrap();
        assert_eq!(homes["IInner"], "alpha");
    }

    #[test]
    fn test_nested_claimed_by_two_sources_is_ambiguous() {
        let inner = serde_json::json!({"kind": "record", "name": "IInner", "fields": []});
        let model = parse(serde_json::json!([
            {"name": "alpha", "types": [{"kind": "record", "name": "IA", "fields": [
                {"name": "inner", "type": inner.clone()}
            ]}]},
            {"name": "beta", "types": [{"kind": "record", "name": "IB", "fields": [
                {"name": "inner", "type": inner}
            ]}]}
        ]));
        let err = assign_homes(&model).unwrap_err();
        match err {
            CodegenError::HomeAssignmentAmbiguity { name, candidates } => {
                assert_eq!(name, "IInner");
                assert_eq!(candidates, vec!["alpha", "beta"]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_variant_interfaces_homed_with_sum() {
        let model = parse(serde_json::json!([
            {"name": "alpha", "types": [{"kind": "sum", "name": "Sealed", "variants": [
                {"name": "SealedOption1", "fields": []}
            ]}]}
        ]));
        let homes = assign_homes(&model).unwrap();
        assert_eq!(homes["Sealed"], "alpha");
        assert_eq!(homes["ISealedOption1"], "alpha");
    }
}
