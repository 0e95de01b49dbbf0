//! Typed structs representing the Type Model document.
//!
//! A model document describes every type to translate, grouped into named
//! source units. Recursive and shared types are expressed through
//! [`TypeNode::Ref`] back-references into the flat root namespace rather
//! than by inlining, so cycles resolve without unbounded recursion.

/// Top-level model document containing all source units.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDocument {
    /// Document identifier (run id).
    pub id: String,
    /// Model format version (e.g. "1.0").
    pub version: String,
    /// All source units, in document order.
    pub sources: Vec<SourceUnit>,
}

/// One source unit: a named group of root type declarations that becomes
/// one output unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    /// Unit name; also the import target in linked packaging.
    pub name: String,
    /// Namespace name for the emitted module block. Falls back to `name`.
    pub module: Option<String>,
    /// Root type declarations, in document order.
    pub types: Vec<NamedType>,
}

impl SourceUnit {
    /// The namespace name used when wrapping this unit's declarations.
    pub fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or(&self.name)
    }
}

/// A root type declaration, dispatched by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NamedType {
    Record(RecordType),
    Sum(SumType),
    Enum(EnumType),
    Function {
        name: String,
        params: Vec<Param>,
        returns: TypeNode,
    },
}

impl NamedType {
    /// The declared name of this root.
    pub fn name(&self) -> &str {
        match self {
            NamedType::Record(r) => &r.name,
            NamedType::Sum(s) => &s.name,
            NamedType::Enum(e) => &e.name,
            NamedType::Function { name, .. } => name,
        }
    }
}

/// A product type with named, ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    pub name: String,
    /// Fields in declaration order. Never reordered by any later stage.
    pub fields: Vec<Field>,
}

/// One record field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeNode,
    /// True when the field may be absent. Rendered as a presence marker,
    /// never as a nullable union.
    pub optional: bool,
}

/// A closed set of named variant shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct SumType {
    pub name: String,
    /// Variants in declaration order; each is a well-formed record.
    pub variants: Vec<RecordType>,
}

/// An order-preserving enumeration of string values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<String>,
}

/// A named function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeNode,
}

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Null,
    Void,
}

impl Primitive {
    /// The primitive's name in both the document format and the output.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Null => "null",
            Primitive::Void => "void",
        }
    }
}

/// A static literal value usable as an exact literal type.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Str(String),
    Num(serde_json::Number),
    Null,
}

/// A type expression, as it appears in field types, parameters, tuple
/// elements and so on.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Primitive(Primitive),
    /// The value may be absent. Never nested.
    Optional(Box<TypeNode>),
    /// Ordered, homogeneous list.
    Sequence(Box<TypeNode>),
    /// Keyed collection. Only string-like keys are valid; the key node is
    /// kept so the generator can report what the model actually supplied.
    Map {
        key: Box<TypeNode>,
        value: Box<TypeNode>,
    },
    Tuple(Vec<TypeNode>),
    Function {
        params: Vec<Param>,
        returns: Box<TypeNode>,
    },
    /// An inline record; hoisted to its own declaration by the generator.
    Record(RecordType),
    Literal(LiteralValue),
    /// Back-reference to a root declared elsewhere in the model.
    Ref(String),
}
