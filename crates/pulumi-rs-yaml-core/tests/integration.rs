use pretty_assertions::assert_eq;

use pulumi_rs_yaml_core::ast::parse::parse_template;
use pulumi_rs_yaml_core::diag::Diagnostics;
use pulumi_rs_yaml_core::generator::{emit_yaml, generate_template};
use pulumi_rs_yaml_core::importer::import_template;
use pulumi_rs_yaml_core::pir::{Item, PirExpr};
use pulumi_rs_yaml_core::schema::SchemaStore;

fn import(source: &str) -> pulumi_rs_yaml_core::pir::Program {
    let (template, parse_diags) = parse_template(source, None);
    assert!(!parse_diags.has_errors(), "{parse_diags}");
    let loader = SchemaStore::new();
    let mut diags = Diagnostics::new();
    let program = import_template(&template, &loader, &mut diags).expect("no cycle");
    assert!(!diags.has_errors(), "{diags}");
    program
}

#[test]
fn test_bucket_and_output_end_to_end() {
    let source = r#"
resources:
  my-bucket:
    type: aws:s3:Bucket
    properties:
      website:
        indexDocument: index.html
outputs:
  bucketEndpoint: "${my-bucket.websiteEndpoint}"
"#;
    let program = import(source);
    assert_eq!(program.items.len(), 2);

    let Item::Resource(resource) = &program.items[0] else {
        panic!("expected resource first");
    };
    assert_eq!(resource.identifier, "myBucket");
    assert_eq!(resource.token, "aws:s3:Bucket");

    let Item::Output(output) = &program.items[1] else {
        panic!("expected output second");
    };
    match &output.value {
        PirExpr::Template(parts) => assert_eq!(parts.len(), 1),
        other => panic!("expected a Template, got {other:?}"),
    }
}

#[test]
fn test_config_with_default_and_secret() {
    let source = r#"
config:
  instanceType:
    type: string
    default: t3.micro
  dbPassword:
    type: string
    secret: true
"#;
    let program = import(source);
    let Item::Config(config) = &program.items[1] else {
        panic!("expected dbPassword second (source order within config namespace)");
    };
    assert_eq!(config.logical_name, "dbPassword");
    assert!(config.secret);
}

#[test]
fn test_reserved_name_collision_gets_suffix() {
    let source = r#"
variables:
  join: "hello"
"#;
    let program = import(source);
    let Item::Attribute(attr) = &program.items[0] else {
        panic!("expected one attribute");
    };
    assert_eq!(attr.identifier, "joinVar");
}

#[test]
fn test_dependency_cycle_reports_error_and_no_program() {
    let source = r#"
variables:
  a: "${b}"
  b: "${a}"
"#;
    let (template, parse_diags) = parse_template(source, None);
    assert!(!parse_diags.has_errors());
    let loader = SchemaStore::new();
    let mut diags = Diagnostics::new();
    let program = import_template(&template, &loader, &mut diags);
    assert!(program.is_none());
    assert!(diags.has_errors());
    let message = diags.to_string();
    assert!(message.contains("circular"));
}

#[test]
fn test_roundtrip_through_generator() {
    let source = "config:\n  region:\n    type: string\noutputs:\n  r: \"${region}\"\n";
    let program = import(source);

    let mut gen_diags = Diagnostics::new();
    let regenerated = generate_template(&program, &mut gen_diags);
    assert!(!gen_diags.has_errors(), "{gen_diags}");

    let yaml = emit_yaml(&regenerated).expect("serializes");

    let (reparsed_template, reparse_diags) = parse_template(&yaml, None);
    assert!(!reparse_diags.has_errors(), "{reparse_diags}");
    let loader = SchemaStore::new();
    let mut reimport_diags = Diagnostics::new();
    let reimported = import_template(&reparsed_template, &loader, &mut reimport_diags).expect("no cycle");
    assert!(!reimport_diags.has_errors(), "{reimport_diags}");

    assert_eq!(reimported, program);
}
