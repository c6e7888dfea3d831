//! Host-facing entry points over `pulumi-rs-yaml-core`'s translation engine.
//!
//! `eject` turns YAML source into a PIR `Program`; `emit` turns a PIR
//! `Program` back into YAML source. Both accumulate diagnostics rather than
//! failing fast, so a host can report every problem in one pass.

pub mod schema_store;

use pulumi_rs_yaml_core::ast::parse::parse_template;
use pulumi_rs_yaml_core::diag::Diagnostics;
use pulumi_rs_yaml_core::generator::{emit_yaml, generate_template};
use pulumi_rs_yaml_core::importer::import_template;
use pulumi_rs_yaml_core::pir::Program;
use pulumi_rs_yaml_core::schema::SchemaLoader;

/// Result of converting YAML source to a PIR program.
pub struct EjectResult {
    pub program: Option<Program>,
    pub diagnostics: Diagnostics,
}

/// Result of converting a PIR program back to YAML source.
pub struct EmitResult {
    pub yaml: Option<String>,
    pub diagnostics: Diagnostics,
}

/// Converts Pulumi YAML source into a PIR program.
///
/// Returns `program: None` when parsing fails outright or the dependency
/// graph contains a cycle; otherwise returns a program, which may still
/// carry accumulated warning/error diagnostics about individual
/// declarations.
pub fn eject(yaml_source: &str, loader: &dyn SchemaLoader) -> EjectResult {
    let (template, mut diags) = parse_template(yaml_source, None);

    if diags.has_errors() {
        return EjectResult {
            program: None,
            diagnostics: diags,
        };
    }

    let program = import_template(&template, loader, &mut diags);

    EjectResult { program, diagnostics: diags }
}

/// Converts a PIR program back into Pulumi YAML source.
pub fn emit(program: &Program) -> EmitResult {
    let mut diags = Diagnostics::new();
    let template = generate_template(program, &mut diags);

    match emit_yaml(&template) {
        Ok(yaml) => EmitResult { yaml: Some(yaml), diagnostics: diags },
        Err(err) => {
            diags.error(None, format!("failed to serialize YAML: {err}"), "");
            EmitResult { yaml: None, diagnostics: diags }
        }
    }
}
