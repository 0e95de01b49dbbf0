mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Packaging mode selector, mirrored onto the pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum PackagingMode {
    Standalone,
    Linked,
}

/// Type model translator and module emitter.
#[derive(Parser)]
#[command(name = "declgen", version, about = "Type model translator and module emitter")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate declaration modules from a type model document
    Generate {
        /// Path to the model JSON document
        model: PathBuf,
        /// Directory to write one file per output unit into
        #[arg(long)]
        out: PathBuf,
        /// Packaging mode
        #[arg(long, default_value = "standalone", value_enum)]
        mode: PackagingMode,
        /// Discriminant field name; omitting it leaves sum variants untagged
        #[arg(long)]
        discriminant: Option<String>,
        /// Distinct-name count above which a wildcard import is used
        #[arg(long, default_value_t = declgen_codegen::DEFAULT_IMPORT_THRESHOLD)]
        import_threshold: usize,
        /// Indent unit for emitted module bodies
        #[arg(long, default_value = "  ")]
        indent: String,
        /// Standalone mode only: keep generating healthy units when one fails
        #[arg(long)]
        isolate_failures: bool,
    },

    /// Parse and validate a type model document without generating
    Validate {
        /// Path to the model JSON document
        model: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            model,
            out,
            mode,
            discriminant,
            import_threshold,
            indent,
            isolate_failures,
        } => commands::generate::cmd_generate(
            commands::generate::GenerateArgs {
                model,
                out,
                mode,
                discriminant,
                import_threshold,
                indent,
                isolate_failures,
            },
            cli.output,
            cli.quiet,
        ),
        Commands::Validate { model } => {
            commands::validate::cmd_validate(&model, cli.output, cli.quiet)
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Read and parse a model document from disk.
pub(crate) fn load_model(
    path: &std::path::Path,
    output: OutputFormat,
    quiet: bool,
) -> Option<declgen_model::ModelDocument> {
    let json_str = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            return None;
        }
    };
    let doc: serde_json::Value = match serde_json::from_str(&json_str) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error parsing JSON in '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            return None;
        }
    };
    match declgen_model::from_model(&doc) {
        Ok(model) => Some(model),
        Err(e) => {
            let msg = format!("invalid model in '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            None
        }
    }
}
