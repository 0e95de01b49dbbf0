//! Synthesized declarations and their textual rendering.
//!
//! A [`Declaration`] is the structural form the registry deduplicates on:
//! two declarations are "the same" exactly when they compare equal here.
//! Rendering is deterministic, so structural equality and textual equality
//! coincide.

/// One top-level declaration in an output unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// Record-shaped declaration: `export interface <Name> { ... }`.
    Interface { name: String, members: Vec<Member> },
    /// Union alias: `export type <Name> = (<Arm1> | <Arm2>);`. Arms are
    /// already rendered (variant names or quoted literals), in model order.
    Union { name: String, arms: Vec<String> },
    /// Named function type: `export type <Name> = (<params>) => <R>;`.
    FunctionAlias {
        name: String,
        params: Vec<(String, String)>,
        returns: String,
    },
}

/// One member of an interface declaration, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Property {
        name: String,
        ty: String,
        optional: bool,
    },
    Method {
        name: String,
        params: Vec<(String, String)>,
        returns: String,
    },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Interface { name, .. } => name,
            Declaration::Union { name, .. } => name,
            Declaration::FunctionAlias { name, .. } => name,
        }
    }

    /// Render this declaration as text. Members indent by one unit. Every
    /// declaration is exported so it stays visible outside its namespace
    /// block.
    pub fn render(&self, indent: &str) -> String {
        match self {
            Declaration::Interface { name, members } => {
                if members.is_empty() {
                    return format!("export interface {} {{}}", name);
                }
                let mut out = format!("export interface {} {{\n", name);
                for member in members {
                    out.push_str(indent);
                    out.push_str(&member.render());
                    out.push('\n');
                }
                out.push('}');
                out
            }
            Declaration::Union { name, arms } => {
                format!("export type {} = ({});", name, arms.join(" | "))
            }
            Declaration::FunctionAlias {
                name,
                params,
                returns,
            } => {
                format!(
                    "export type {} = ({}) => {};",
                    name,
                    render_params(params),
                    returns
                )
            }
        }
    }
}

impl Member {
    fn render(&self) -> String {
        match self {
            Member::Property { name, ty, optional } => {
                let marker = if *optional { "?" } else { "" };
                format!("{}{}: {};", name, marker, ty)
            }
            Member::Method {
                name,
                params,
                returns,
            } => {
                format!("{}({}): {};", name, render_params(params), returns)
            }
        }
    }
}

fn render_params(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(name, ty)| format!("{}: {}", name, ty))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Quote a string as an exact string-literal type.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
