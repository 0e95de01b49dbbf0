//! declgen-codegen: the Type Model translation pipeline.
//!
//! A pure function of the model and the run configuration: no I/O, no
//! ambient state. Control flow is a single acyclic pass per run:
//!
//! model -> synthesizer (+ discriminant resolver) -> registry ->
//! [import resolver] -> module emitter -> text
//!
//! Standalone packaging generates every unit independently (and in
//! parallel); linked packaging runs a sequential home-assignment pre-pass,
//! builds one run-wide registry, then emits units in parallel over the
//! frozen registry.

pub mod decl;
pub mod discriminant;
pub mod emit;
pub mod error;
pub mod imports;
pub mod registry;
pub mod synth;

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use rayon::prelude::*;

use declgen_model::{ModelDocument, SourceUnit};

use registry::{assign_homes, Registry};
use synth::Synthesizer;

pub use error::CodegenError;

/// Default number of distinct names imported from one home unit above
/// which the named list becomes a wildcard import.
pub const DEFAULT_IMPORT_THRESHOLD: usize = 4;

/// Packaging strategy for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packaging {
    /// Every unit re-synthesizes its full transitive closure; no
    /// cross-unit state.
    Standalone,
    /// Each declaration lives in exactly one home unit; other units
    /// import it.
    Linked,
}

/// Run configuration consumed by the pipeline.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub packaging: Packaging,
    /// `None` leaves sum-type variants untagged; `Some(field)` adds one
    /// literal-typed tag field per variant.
    pub discriminant: Option<String>,
    pub import_threshold: usize,
    /// Indent unit for declaration members and the module block body.
    pub indent: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            packaging: Packaging::Standalone,
            discriminant: None,
            import_threshold: DEFAULT_IMPORT_THRESHOLD,
            indent: "  ".to_string(),
        }
    }
}

/// One generated output unit, complete and ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutput {
    /// Source unit name (also the suggested file stem).
    pub unit: String,
    pub text: String,
}

/// Generate every output unit for a run. Aborts on the first error.
///
/// Output order matches model source order, and identical input always
/// produces byte-identical output.
pub fn generate(
    model: &ModelDocument,
    config: &GenerateConfig,
) -> Result<Vec<UnitOutput>, CodegenError> {
    declgen_model::validate(model)?;
    match config.packaging {
        Packaging::Standalone => model
            .sources
            .par_iter()
            .map(|source| standalone_unit(model, source, config))
            .collect(),
        Packaging::Linked => {
            let homes = assign_homes(model)?;
            let reg = run_registry(model, config)?;
            Ok(model
                .sources
                .par_iter()
                .map(|source| linked_unit(source, &reg, &homes, config))
                .collect())
        }
    }
}

/// Standalone-mode generation with per-unit failure isolation: a failed
/// unit reports its error without aborting its siblings. In linked mode
/// (where no unit can proceed past a shared pre-pass failure) this is
/// equivalent to [`generate`], with the run error repeated per unit.
pub fn generate_isolated(
    model: &ModelDocument,
    config: &GenerateConfig,
) -> Vec<(String, Result<UnitOutput, CodegenError>)> {
    if let Err(e) = declgen_model::validate(model) {
        let err = CodegenError::from(e);
        return model
            .sources
            .iter()
            .map(|s| (s.name.clone(), Err(err.clone())))
            .collect();
    }
    match config.packaging {
        Packaging::Standalone => model
            .sources
            .par_iter()
            .map(|source| {
                (
                    source.name.clone(),
                    standalone_unit(model, source, config),
                )
            })
            .collect(),
        Packaging::Linked => match generate(model, config) {
            Ok(units) => units
                .into_iter()
                .map(|u| (u.unit.clone(), Ok(u)))
                .collect(),
            Err(e) => model
                .sources
                .iter()
                .map(|s| (s.name.clone(), Err(e.clone())))
                .collect(),
        },
    }
}

fn standalone_unit(
    model: &ModelDocument,
    source: &SourceUnit,
    config: &GenerateConfig,
) -> Result<UnitOutput, CodegenError> {
    let synth = Synthesizer::new(model, config.discriminant.as_deref());
    let mut reg = Registry::new();
    for named in &source.types {
        synth.synth_root(named, &mut reg)?;
    }
    let body = render_body(reg.entries(), &config.indent);
    let text = emit::render_unit(source.module_name(), &[], &body, &config.indent);
    Ok(UnitOutput {
        unit: source.name.clone(),
        text,
    })
}

/// Synthesize the whole run into one registry, source order then root
/// order, so linked units share a single copy of every declaration.
fn run_registry(
    model: &ModelDocument,
    config: &GenerateConfig,
) -> Result<Registry, CodegenError> {
    let synth = Synthesizer::new(model, config.discriminant.as_deref());
    let mut reg = Registry::new();
    for source in &model.sources {
        for named in &source.types {
            synth.synth_root(named, &mut reg)?;
        }
    }
    Ok(reg)
}

fn linked_unit(
    source: &SourceUnit,
    reg: &Registry,
    homes: &BTreeMap<String, String>,
    config: &GenerateConfig,
) -> UnitOutput {
    let local: Vec<_> = reg
        .entries()
        .filter(|entry| homes.get(entry.decl.name()) == Some(&source.name))
        .collect();

    // Externally-homed references, deduplicated by name, in the order the
    // alphabetical declaration walk first touches them.
    let mut seen = BTreeSet::new();
    let mut references: Vec<(String, String)> = Vec::new();
    for entry in &local {
        for name in &entry.refs {
            if let Some(home) = homes.get(name) {
                if home != &source.name && seen.insert(name.clone()) {
                    references.push((home.clone(), name.clone()));
                }
            }
        }
    }

    let import_lines = imports::import_lines(&references, config.import_threshold);
    let body = render_body(local.iter().copied(), &config.indent);
    let text = emit::render_unit(source.module_name(), &import_lines, &body, &config.indent);
    UnitOutput {
        unit: source.name.clone(),
        text,
    }
}

fn render_body<'a>(
    entries: impl Iterator<Item = &'a registry::DeclEntry>,
    indent: &str,
) -> String {
    entries
        .map(|entry| entry.decl.render(indent))
        .collect::<Vec<_>>()
        .join("\n\n")
}
