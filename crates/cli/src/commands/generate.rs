use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use serde::Serialize;

use declgen_codegen::{GenerateConfig, Packaging, UnitOutput};

use crate::{load_model, report_error, OutputFormat, PackagingMode};

pub(crate) struct GenerateArgs {
    pub model: PathBuf,
    pub out: PathBuf,
    pub mode: PackagingMode,
    pub discriminant: Option<String>,
    pub import_threshold: usize,
    pub indent: String,
    pub isolate_failures: bool,
}

#[derive(Serialize)]
struct GenerateReport {
    written: Vec<String>,
    failed: Vec<FailedUnit>,
}

#[derive(Serialize)]
struct FailedUnit {
    unit: String,
    error: String,
}

pub(crate) fn cmd_generate(args: GenerateArgs, output: OutputFormat, quiet: bool) {
    let Some(model) = load_model(&args.model, output, quiet) else {
        process::exit(1);
    };

    let config = GenerateConfig {
        packaging: match args.mode {
            PackagingMode::Standalone => Packaging::Standalone,
            PackagingMode::Linked => Packaging::Linked,
        },
        discriminant: args.discriminant,
        import_threshold: args.import_threshold,
        indent: args.indent,
    };

    if let Err(e) = fs::create_dir_all(&args.out) {
        let msg = format!("error creating '{}': {}", args.out.display(), e);
        report_error(&msg, output, quiet);
        process::exit(1);
    }

    let mut report = GenerateReport {
        written: Vec::new(),
        failed: Vec::new(),
    };

    if args.isolate_failures {
        for (unit, result) in declgen_codegen::generate_isolated(&model, &config) {
            match result {
                Ok(u) => write_unit(&args.out, &u, &mut report, output, quiet),
                Err(e) => report.failed.push(FailedUnit {
                    unit,
                    error: e.to_string(),
                }),
            }
        }
    } else {
        match declgen_codegen::generate(&model, &config) {
            Ok(units) => {
                for u in &units {
                    write_unit(&args.out, u, &mut report, output, quiet);
                }
            }
            Err(e) => {
                let msg = format!("generation error: {}", e);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        }
    }

    let failed = !report.failed.is_empty();
    if !quiet {
        match output {
            OutputFormat::Text => {
                for path in &report.written {
                    println!("wrote {}", path);
                }
                for f in &report.failed {
                    eprintln!("unit '{}' failed: {}", f.unit, f.error);
                }
            }
            OutputFormat::Json => {
                let line = serde_json::to_string(&report)
                    .unwrap_or_else(|_| "{\"error\": \"report serialization\"}".to_string());
                println!("{}", line);
            }
        }
    }
    if failed {
        process::exit(1);
    }
}

/// Stage the unit's text in a temp file and rename it into place, so a
/// crash mid-write never leaves a partial unit behind.
fn write_unit(
    out_dir: &Path,
    unit: &UnitOutput,
    report: &mut GenerateReport,
    output: OutputFormat,
    quiet: bool,
) {
    let path = out_dir.join(format!("{}.ts", unit.unit));
    let result = tempfile::NamedTempFile::new_in(out_dir)
        .and_then(|mut tmp| {
            tmp.write_all(unit.text.as_bytes())?;
            tmp.persist(&path).map_err(|e| e.error)
        })
        .map(|_| ());
    match result {
        Ok(()) => report.written.push(path.display().to_string()),
        Err(e) => {
            let msg = format!("error writing '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}
