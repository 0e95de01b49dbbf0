//! Module emission: pure text-layout functions and the final unit wrap.
//!
//! These transforms never reorder or alter declarations; they only
//! normalize blank lines and indentation around an already-ordered body.

/// Collapse every run of two or more consecutive blank lines to exactly
/// one blank line.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut prev_blank = false;
    for line in text.lines() {
        let blank = line.trim().is_empty();
        if blank && prev_blank {
            continue;
        }
        kept.push(if blank { "" } else { line });
        prev_blank = blank;
    }
    kept.join("\n")
}

/// Indent every non-blank line by one indent unit. Blank lines stay empty
/// rather than gaining trailing whitespace. The result always ends with a
/// newline.
pub fn indent_block(text: &str, indent: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if !line.is_empty() {
            out.push_str(indent);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// Assemble one output unit: import statements unindented at the top,
/// then the namespaced block wrapping the declaration body.
pub fn render_unit(module: &str, imports: &[String], body: &str, indent: &str) -> String {
    let mut out = String::new();
    for line in imports {
        out.push_str(line);
        out.push('\n');
    }
    if !imports.is_empty() {
        out.push('\n');
    }
    out.push_str("module ");
    out.push_str(module);
    out.push_str(" {\n");
    let content = format!("'use strict';\n\n{}", collapse_blank_lines(body));
    out.push_str(&indent_block(&content, indent));
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_double_blank_line() {
        assert_eq!(collapse_blank_lines("a\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_single_blank_line_kept() {
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent_block("a\n\nb", "  "), "  a\n\n  b\n");
    }

    #[test]
    fn test_render_unit_without_imports() {
        let text = render_unit("Sample", &[], "interface IFoo {}", "  ");
        assert_eq!(
            text,
            "module Sample {\n  'use strict';\n\n  interface IFoo {}\n}\n"
        );
    }

    #[test]
    fn test_render_unit_imports_precede_block_unindented() {
        let imports = vec!["import { IBar } from 'other'".to_string()];
        let text = render_unit("Sample", &imports, "interface IFoo {}", "  ");
        assert!(text.starts_with("import { IBar } from 'other'\n\nmodule Sample {\n"));
        assert!(!text.contains("  import"));
    }

    #[test]
    fn test_render_unit_collapses_body_blanks() {
        let text = render_unit("Sample", &[], "interface IA {}\n\n\ninterface IB {}", "  ");
        assert!(text.contains("  interface IA {}\n\n  interface IB {}\n"));
    }
}
