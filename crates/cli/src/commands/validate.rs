use std::path::Path;
use std::process;

use crate::{load_model, report_error, OutputFormat};

pub(crate) fn cmd_validate(model_path: &Path, output: OutputFormat, quiet: bool) {
    let Some(model) = load_model(model_path, output, quiet) else {
        process::exit(1);
    };

    match declgen_model::validate(&model) {
        Ok(()) => {
            if !quiet {
                match output {
                    OutputFormat::Text => println!("ok"),
                    OutputFormat::Json => println!("{{\"ok\": true}}"),
                }
            }
        }
        Err(e) => {
            let msg = format!("invalid model: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}
