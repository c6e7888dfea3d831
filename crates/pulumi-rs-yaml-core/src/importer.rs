//! Template AST → PIR (spec component 7).
//!
//! Traverses a bound [`TemplateDecl`] in the topological order computed by
//! `core::graph`, assigns PIR identifiers via `core::names`, resolves
//! resource/function tokens against a [`SchemaLoader`], and rewrites every
//! expression into its PIR shape. Diagnostics accumulate; only a cycle,
//! a missing token, or a duplicate logical name halts the import.

use std::collections::HashMap;

use crate::ast::expr::Expr;
use crate::ast::template::{ResourceOptionsDecl, ResourceProperties, TemplateDecl};
use crate::config_types::ConfigType;
use crate::diag::Diagnostics;
use crate::graph::DependencyGraph;
use crate::names::{Namespace, SymbolEnvironment};
use crate::pir::{
    Attribute, ConfigBlock, CustomTimeoutsBlock, GetResourceBlock, Item, LiteralValue, OutputBlock,
    PirExpr, PirType, Program, ResourceBlock, ResourceOptionsBlock, StackReferenceBlock, Traversal,
};
use crate::schema::{SchemaLoader, SchemaPropertyType};

/// Tracks, for every declaration name visible to expression import, its
/// assigned PIR identifier and (for stack references only) an optional
/// `propertyName` projection sugar (Open Question D).
struct Symbols<'a> {
    /// logical name -> PIR identifier
    idents: HashMap<String, String>,
    /// logical name -> property name, for stack-ref variables with a
    /// `propertyName` (so references to the variable project through it).
    stack_ref_property: HashMap<String, String>,
    /// resource logical name -> resolved schema token, so a bare
    /// reference to a resource can be checked against that resource's
    /// type hint (spec §4.6's `resource.id` synthesis rule).
    resource_tokens: HashMap<String, String>,
    /// PIR identifiers of resources whose schema says `id` is
    /// string-typed — a bare reference to one of these resources
    /// synthesizes `resource.id` instead of a plain variable reference.
    resource_id_is_string: std::collections::HashSet<String>,
    /// Kept so `import_expr`'s `fn::invoke` handling can consult
    /// `function_type_hint` without threading a loader parameter through
    /// every recursive call site.
    loader: &'a dyn SchemaLoader,
}

/// Imports a bound template into a PIR [`Program`].
///
/// Returns `None` only when import cannot proceed at all (a dependency
/// cycle); otherwise returns a program alongside whatever diagnostics
/// accumulated, which may include per-declaration errors.
pub fn import_template(
    template: &TemplateDecl<'_>,
    loader: &dyn SchemaLoader,
    diags: &mut Diagnostics,
) -> Option<Program> {
    check_disjoint_names(template, diags);

    let mut env = SymbolEnvironment::new();
    let mut idents = HashMap::new();
    let mut stack_ref_property = HashMap::new();

    // Assignment order per spec §4.5: configs -> outputs -> variables ->
    // stackRefs -> resources, each in source order within its namespace.
    for c in &template.config {
        idents.insert(c.key.to_string(), env.assign(&c.key, Namespace::Config));
    }
    for o in &template.outputs {
        idents.insert(o.key.to_string(), env.assign(&o.key, Namespace::Output));
    }
    for v in &template.variables {
        if !matches!(v.value, Expr::StackReference(_, _)) {
            idents.insert(v.key.to_string(), env.assign(&v.key, Namespace::Variable));
        }
    }
    for v in &template.variables {
        if let Expr::StackReference(_, sref) = &v.value {
            idents.insert(v.key.to_string(), env.assign(&v.key, Namespace::StackRef));
            if let Some(prop) = &sref.property_name {
                if let Some(name) = prop.as_str() {
                    stack_ref_property.insert(v.key.to_string(), name.to_string());
                }
            }
        }
    }
    let mut resource_tokens = HashMap::new();
    let mut resource_id_is_string = std::collections::HashSet::new();
    for r in &template.resources {
        let identifier = env.assign(&r.logical_name, Namespace::Resource);
        let token = loader
            .resolve_resource(&r.resource.type_, r.resource.options.version.as_deref())
            .unwrap_or_else(|| {
                diags.error(
                    r.meta.span,
                    format!("unable to resolve resource type token '{}'", r.resource.type_),
                    "",
                );
                r.resource.type_.to_string()
            });
        if matches!(
            loader.resource_type_hint(&token).field("id"),
            Some(SchemaPropertyType::String)
        ) {
            resource_id_is_string.insert(identifier.clone());
        }
        resource_tokens.insert(r.logical_name.to_string(), token);
        idents.insert(r.logical_name.to_string(), identifier);
    }

    let symbols = Symbols {
        idents,
        stack_ref_property,
        resource_tokens,
        resource_id_is_string,
        loader,
    };

    let graph = DependencyGraph::build(template);
    let order = graph.topo_sort_or_report(diags)?;

    let mut program = Program::new();
    for idx in order {
        let name = &graph.names[idx.0];
        if let Some(c) = template.config.iter().find(|c| c.key.as_ref() == name) {
            program.items.push(Item::Config(import_config(c, &symbols, diags)));
        } else if let Some(v) = template.variables.iter().find(|v| v.key.as_ref() == name) {
            program.items.push(import_variable(v, &symbols, diags));
        } else if let Some(r) = template.resources.iter().find(|r| r.logical_name.as_ref() == name) {
            program.items.push(Item::Resource(import_resource(r, &symbols, loader, diags)));
        } else if let Some(o) = template.outputs.iter().find(|o| o.key.as_ref() == name) {
            program.items.push(Item::Output(import_output(o, &symbols, diags)));
        }
    }

    Some(program)
}

/// Enforces spec invariant 3: config/variable/resource/output logical
/// names are disjoint.
fn check_disjoint_names(template: &TemplateDecl<'_>, diags: &mut Diagnostics) {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    let mut check = |name: &str, kind: &'static str, diags: &mut Diagnostics| {
        if let Some(prev_kind) = seen.get(name) {
            diags.error(
                None,
                format!("duplicate logical name '{name}' used by both {prev_kind} and {kind}"),
                "",
            );
        } else {
            seen.insert(name, kind);
        }
    };
    for c in &template.config {
        check(c.key.as_ref(), "config", diags);
    }
    for v in &template.variables {
        check(v.key.as_ref(), "variable", diags);
    }
    for r in &template.resources {
        check(r.logical_name.as_ref(), "resource", diags);
    }
    for o in &template.outputs {
        check(o.key.as_ref(), "output", diags);
    }
}

fn import_config(
    c: &crate::ast::template::ConfigEntry<'_>,
    symbols: &Symbols<'_>,
    diags: &mut Diagnostics,
) -> ConfigBlock {
    let type_str = c.param.type_.as_deref().unwrap_or("string");
    let type_ = ConfigType::parse(type_str).unwrap_or_else(|| {
        diags.error(c.meta.span, format!("unknown configuration type '{type_str}'"), "");
        ConfigType::String
    });

    ConfigBlock {
        identifier: symbols.idents[c.key.as_ref()].clone(),
        logical_name: c.key.to_string(),
        var_type: config_type_to_pir(&type_),
        type_,
        default: c
            .param
            .default
            .as_ref()
            .or(c.param.value.as_ref())
            .map(|e| import_expr(e, symbols, diags)),
        secret: c.param.secret.unwrap_or(false),
    }
}

/// Maps a config declaration's type vocabulary onto the PIR nominal type
/// placeholder; `ObjectOf` loses its value-type parameter since
/// [`PirType::Object`] models named fields, not a homogeneous map.
fn config_type_to_pir(t: &ConfigType) -> PirType {
    match t {
        ConfigType::String => PirType::String,
        ConfigType::Number => PirType::Number,
        ConfigType::Boolean => PirType::Boolean,
        ConfigType::Object | ConfigType::ObjectOf(_) => PirType::Object(HashMap::new()),
        ConfigType::StringList => PirType::List(Box::new(PirType::String)),
        ConfigType::NumberList => PirType::List(Box::new(PirType::Number)),
        ConfigType::CommaDelimitedList => PirType::List(Box::new(PirType::String)),
    }
}

/// Infers a nominal PIR type from an already-imported expression's shape
/// (spec §3: "PIR variables carry ... a nominal type placeholder"). This
/// is structural, not a real type system: anything beyond a literal,
/// tuple, or object collapses to `Any`.
fn infer_pir_type(expr: &PirExpr) -> PirType {
    match expr {
        PirExpr::Literal(LiteralValue::Null) => PirType::Any,
        PirExpr::Literal(LiteralValue::Bool(_)) => PirType::Boolean,
        PirExpr::Literal(LiteralValue::Number(_)) => PirType::Number,
        PirExpr::Literal(LiteralValue::String(_)) => PirType::String,
        PirExpr::Template(_) => PirType::String,
        PirExpr::Tuple(items) => {
            PirType::List(Box::new(items.first().map(infer_pir_type).unwrap_or(PirType::Any)))
        }
        PirExpr::Object(entries) => {
            PirType::Object(entries.iter().map(|(k, v)| (k.clone(), infer_pir_type(v))).collect())
        }
        _ => PirType::Any,
    }
}

fn import_variable(
    v: &crate::ast::template::VariableEntry<'_>,
    symbols: &Symbols<'_>,
    diags: &mut Diagnostics,
) -> Item {
    let identifier = symbols.idents[v.key.as_ref()].clone();
    if let Expr::StackReference(_, sref) = &v.value {
        return Item::StackReference(StackReferenceBlock {
            identifier,
            logical_name: v.key.to_string(),
            stack_name: import_expr(&sref.stack_name, symbols, diags),
            var_type: PirType::Any,
        });
    }

    let value = import_expr(&v.value, symbols, diags);
    Item::Attribute(Attribute {
        identifier,
        logical_name: v.key.to_string(),
        var_type: infer_pir_type(&value),
        value,
    })
}

fn import_resource(
    r: &crate::ast::template::ResourceEntry<'_>,
    symbols: &Symbols<'_>,
    loader: &dyn SchemaLoader,
    diags: &mut Diagnostics,
) -> ResourceBlock {
    let token = symbols.resource_tokens[r.logical_name.as_ref()].clone();
    let hint = loader.resource_type_hint(&token);

    let properties = match &r.resource.properties {
        ResourceProperties::Map(entries) => entries
            .iter()
            .map(|e| {
                let key = e.key.to_string();
                let field_hint = hint.field(&key);
                let value = if matches!(field_hint, Some(SchemaPropertyType::Object)) {
                    import_object_valued_expr(&e.value, symbols, diags)
                } else {
                    import_expr(&e.value, symbols, diags)
                };
                (key, value)
            })
            .collect(),
        ResourceProperties::Expr(expr) => {
            vec![("__properties".to_string(), import_expr(expr, symbols, diags))]
        }
    };

    let get = r.resource.get.as_ref().map(|g| GetResourceBlock {
        id: import_expr(&g.id, symbols, diags),
        state: g
            .state
            .iter()
            .map(|e| (e.key.to_string(), import_expr(&e.value, symbols, diags)))
            .collect(),
    });

    ResourceBlock {
        identifier: symbols.idents[r.logical_name.as_ref()].clone(),
        logical_name: r.logical_name.to_string(),
        token,
        properties,
        options: import_options(&r.resource.options, symbols, diags),
        get,
    }
}

fn import_options(
    opts: &ResourceOptionsDecl<'_>,
    symbols: &Symbols<'_>,
    diags: &mut Diagnostics,
) -> ResourceOptionsBlock {
    ResourceOptionsBlock {
        depends_on: opts.depends_on.as_ref().map(|e| import_expr(e, symbols, diags)),
        parent: opts.parent.as_ref().map(|e| import_expr(e, symbols, diags)),
        provider: opts.provider.as_ref().map(|e| import_expr(e, symbols, diags)),
        providers: opts.providers.as_ref().map(|e| import_expr(e, symbols, diags)),
        protect: opts.protect.as_ref().map(|e| import_expr(e, symbols, diags)),
        ignore_changes: opts
            .ignore_changes
            .as_ref()
            .map(|v| v.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default(),
        deleted_with: opts.deleted_with.as_ref().map(|e| import_expr(e, symbols, diags)),
        aliases: opts.aliases.as_ref().map(|e| import_expr(e, symbols, diags)),
        version: opts.version.as_ref().map(|s| s.to_string()),
        plugin_download_url: opts.plugin_download_url.as_ref().map(|s| s.to_string()),
        delete_before_replace: opts.delete_before_replace,
        custom_timeouts: opts.custom_timeouts.as_ref().map(|t| CustomTimeoutsBlock {
            create: t.create.as_ref().map(|s| s.to_string()),
            update: t.update.as_ref().map(|s| s.to_string()),
            delete: t.delete.as_ref().map(|s| s.to_string()),
        }),
    }
}

fn import_output(
    o: &crate::ast::template::OutputEntry<'_>,
    symbols: &Symbols<'_>,
    diags: &mut Diagnostics,
) -> OutputBlock {
    let value = import_expr(&o.value, symbols, diags);
    OutputBlock {
        identifier: symbols.idents[o.key.as_ref()].clone(),
        logical_name: o.key.to_string(),
        var_type: infer_pir_type(&value),
        value,
    }
}

/// Imports a resource property value known (via the resource's schema) to
/// be object-typed, literalizing its keys even when the parser modeled a
/// key as a no-op interpolation (spec §4.6: "object keys become plain
/// string literals rather than template-expressions when the schema
/// expects an object field").
fn import_object_valued_expr(expr: &Expr<'_>, symbols: &Symbols<'_>, diags: &mut Diagnostics) -> PirExpr {
    match expr {
        Expr::Object(_, entries) => PirExpr::Object(
            entries
                .iter()
                .map(|e| {
                    let key = plain_key_text(&e.key).unwrap_or_default();
                    (key, import_expr(&e.value, symbols, diags))
                })
                .collect(),
        ),
        other => import_expr(other, symbols, diags),
    }
}

/// Imports a `fn::invoke` call's argument object, literalizing the keys of
/// any argument whose `function_type_hint` entry says it's object-typed —
/// the same rule `import_resource` applies to resource properties, applied
/// here to function arguments instead (spec §4.6).
fn import_invoke_args(
    expr: &Expr<'_>,
    hint: &crate::schema::TypeHint,
    symbols: &Symbols<'_>,
    diags: &mut Diagnostics,
) -> PirExpr {
    match expr {
        Expr::Object(_, entries) => PirExpr::Object(
            entries
                .iter()
                .map(|e| {
                    let key = plain_key_text(&e.key).unwrap_or_default();
                    let value = if matches!(hint.field(&key), Some(SchemaPropertyType::Object)) {
                        import_object_valued_expr(&e.value, symbols, diags)
                    } else {
                        import_expr(&e.value, symbols, diags)
                    };
                    (key, value)
                })
                .collect(),
        ),
        other => import_expr(other, symbols, diags),
    }
}

/// Extracts literal text from an expression used as an object key: a
/// plain string, or an interpolation with no actual `${...}` substitutions.
fn plain_key_text(expr: &Expr<'_>) -> Option<String> {
    match expr {
        Expr::String(_, s) => Some(s.to_string()),
        Expr::Interpolate(_, parts) if parts.iter().all(|p| p.value.is_none()) => {
            Some(parts.iter().map(|p| p.text.as_ref()).collect())
        }
        _ => None,
    }
}

/// Rewrites a template expression into its PIR shape (spec §4.6 "Expression
/// import rules").
fn import_expr(expr: &Expr<'_>, symbols: &Symbols<'_>, diags: &mut Diagnostics) -> PirExpr {
    match expr {
        Expr::Null(_) => PirExpr::Literal(LiteralValue::Null),
        Expr::Bool(_, b) => PirExpr::Literal(LiteralValue::Bool(*b)),
        Expr::Number(_, n) => PirExpr::Literal(LiteralValue::Number(*n)),
        Expr::String(_, s) => PirExpr::Literal(LiteralValue::String(s.to_string())),

        Expr::Symbol(meta, access) => {
            if access.root_name() == "pulumi" {
                return import_pulumi_access(access, meta.span, diags);
            }

            let root = access.root_name();
            let Some(identifier) = symbols.idents.get(root) else {
                diags.error(meta.span, format!("unknown symbol '{root}'"), "");
                return PirExpr::Literal(LiteralValue::String(String::new()));
            };

            let mut traversal: Vec<Traversal> = access.accessors[1..]
                .iter()
                .map(|a| match a {
                    crate::ast::property::PropertyAccessor::Name(n) => Traversal::Name(n.to_string()),
                    crate::ast::property::PropertyAccessor::StringSubscript(n) => {
                        Traversal::StringIndex(n.to_string())
                    }
                    crate::ast::property::PropertyAccessor::IntSubscript(i) => Traversal::IntIndex(*i),
                })
                .collect();

            if let Some(property) = symbols.stack_ref_property.get(root) {
                let mut t = vec![Traversal::Name(property.clone())];
                t.extend(traversal);
                traversal = t;
            }

            if traversal.is_empty() {
                if symbols.resource_id_is_string.contains(identifier) {
                    PirExpr::ScopeTraversal {
                        root: identifier.clone(),
                        traversal: vec![Traversal::Name("id".to_string())],
                    }
                } else {
                    PirExpr::VariableReference(identifier.clone())
                }
            } else {
                PirExpr::ScopeTraversal { root: identifier.clone(), traversal }
            }
        }

        Expr::Interpolate(_, parts) => {
            let mut out = Vec::with_capacity(parts.len());
            for part in parts {
                if !part.text.is_empty() {
                    out.push(crate::pir::TemplatePart::Literal(part.text.to_string()));
                }
                if let Some(access) = &part.value {
                    let sub_expr = Expr::Symbol(crate::syntax::ExprMeta::no_span(), access.clone());
                    out.push(crate::pir::TemplatePart::Expr(import_expr(&sub_expr, symbols, diags)));
                }
            }
            PirExpr::Template(out)
        }

        Expr::List(_, items) => {
            PirExpr::Tuple(items.iter().map(|i| import_expr(i, symbols, diags)).collect())
        }

        Expr::Object(_, entries) => PirExpr::Object(
            entries
                .iter()
                .map(|e| {
                    let key = plain_key_text(&e.key).unwrap_or_default();
                    (key, import_expr(&e.value, symbols, diags))
                })
                .collect(),
        ),

        Expr::Invoke(_, invoke) => {
            let hint = symbols.loader.function_type_hint(&invoke.token);
            let args = invoke
                .call_args
                .as_ref()
                .map(|a| import_invoke_args(a, &hint, symbols, diags))
                .unwrap_or_else(|| PirExpr::Object(Vec::new()));
            let call = PirExpr::FunctionCall {
                name: "invoke".to_string(),
                args: vec![PirExpr::Literal(LiteralValue::String(invoke.token.to_string())), args],
            };
            match &invoke.return_ {
                Some(field) => PirExpr::Index {
                    collection: Box::new(call),
                    key: Box::new(PirExpr::Literal(LiteralValue::String(field.to_string()))),
                },
                None => call,
            }
        }

        Expr::StackReference(meta, _) => {
            diags.error(meta.span, "fn::stackReference is only valid as a variable's value", "");
            PirExpr::Literal(LiteralValue::Null)
        }

        Expr::Join(_, delim, values) => PirExpr::FunctionCall {
            name: "join".to_string(),
            args: vec![import_expr(delim, symbols, diags), import_expr(values, symbols, diags)],
        },
        Expr::Select(_, index, values) => PirExpr::FunctionCall {
            name: "select".to_string(),
            args: vec![import_expr(index, symbols, diags), import_expr(values, symbols, diags)],
        },
        Expr::Split(_, delim, source) => PirExpr::FunctionCall {
            name: "split".to_string(),
            args: vec![import_expr(delim, symbols, diags), import_expr(source, symbols, diags)],
        },
        Expr::ToJson(_, inner) => PirExpr::FunctionCall {
            name: "toJSON".to_string(),
            args: vec![import_expr(inner, symbols, diags)],
        },
        Expr::ToBase64(_, inner) => PirExpr::FunctionCall {
            name: "toBase64".to_string(),
            args: vec![import_expr(inner, symbols, diags)],
        },
        Expr::FromBase64(_, inner) => PirExpr::FunctionCall {
            name: "fromBase64".to_string(),
            args: vec![import_expr(inner, symbols, diags)],
        },
        Expr::Secret(_, inner) => PirExpr::FunctionCall {
            name: "secret".to_string(),
            args: vec![import_expr(inner, symbols, diags)],
        },
        Expr::ReadFile(_, inner) => PirExpr::FunctionCall {
            name: "readFile".to_string(),
            args: vec![import_expr(inner, symbols, diags)],
        },
        Expr::StringAsset(_, inner) => PirExpr::FunctionCall {
            name: "stringAsset".to_string(),
            args: vec![import_expr(inner, symbols, diags)],
        },
        Expr::FileAsset(_, inner) => PirExpr::FunctionCall {
            name: "fileAsset".to_string(),
            args: vec![import_expr(inner, symbols, diags)],
        },
        Expr::RemoteAsset(_, inner) => PirExpr::FunctionCall {
            name: "remoteAsset".to_string(),
            args: vec![import_expr(inner, symbols, diags)],
        },
        Expr::FileArchive(_, inner) => PirExpr::FunctionCall {
            name: "fileArchive".to_string(),
            args: vec![import_expr(inner, symbols, diags)],
        },
        Expr::RemoteArchive(_, inner) => PirExpr::FunctionCall {
            name: "remoteArchive".to_string(),
            args: vec![import_expr(inner, symbols, diags)],
        },
        Expr::AssetArchive(_, entries) => PirExpr::FunctionCall {
            name: "assetArchive".to_string(),
            args: vec![PirExpr::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), import_expr(v, symbols, diags)))
                    .collect(),
            )],
        },
    }
}

/// Handles `pulumi.*` accesses (spec invariant 6, Open Question E): only
/// `cwd`, `stack`, `project` are valid.
fn import_pulumi_access(
    access: &crate::ast::property::PropertyAccess<'_>,
    span: Option<crate::syntax::Span>,
    diags: &mut Diagnostics,
) -> PirExpr {
    use crate::ast::property::PropertyAccessor;

    let second = access.accessors.get(1);
    let name = match second {
        Some(PropertyAccessor::Name(n)) => Some(n.as_ref()),
        Some(PropertyAccessor::StringSubscript(n)) => Some(n.as_ref()),
        _ => None,
    };

    match name {
        Some("cwd") | Some("stack") | Some("project") if access.accessors.len() == 2 => {
            PirExpr::FunctionCall { name: name.unwrap().to_string(), args: Vec::new() }
        }
        other => {
            let bad = other.unwrap_or("");
            diags.error(span, format!("Unknown property of the `pulumi` variable: '{bad}'"), "");
            PirExpr::Literal(LiteralValue::Null)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse::parse_template;
    use crate::schema::SchemaStore;

    fn import(source: &str) -> (Program, Diagnostics) {
        let (template, parse_diags) = parse_template(source, None);
        assert!(!parse_diags.has_errors(), "{parse_diags}");
        let loader = SchemaStore::new();
        let mut diags = Diagnostics::new();
        let program = import_template(&template, &loader, &mut diags).unwrap_or_default();
        (program, diags)
    }

    #[test]
    fn test_resource_output_interpolation() {
        let source = r#"
resources:
  my-bucket:
    type: aws:s3:Bucket
outputs:
  url: "https://${my-bucket.websiteUrl}"
"#;
        let (program, diags) = import(source);
        assert!(!diags.has_errors(), "{diags}");
        let resource = program
            .items
            .iter()
            .find_map(|i| match i {
                Item::Resource(r) => Some(r),
                _ => None,
            })
            .unwrap();
        assert_eq!(resource.identifier, "myBucket");
        assert_eq!(resource.logical_name, "my-bucket");
        // no schema loaded, so token resolution falls back to the raw type
        assert_eq!(resource.token, "aws:s3:Bucket");

        let output = program
            .items
            .iter()
            .find_map(|i| match i {
                Item::Output(o) => Some(o),
                _ => None,
            })
            .unwrap();
        match &output.value {
            PirExpr::Template(parts) => assert_eq!(parts.len(), 2),
            other => panic!("expected Template, got {other:?}"),
        }
    }

    #[test]
    fn test_reserved_name_collision() {
        let source = r#"
variables:
  stack:
    fn::toJSON: "x"
"#;
        let (program, diags) = import(source);
        assert!(!diags.has_errors(), "{diags}");
        let attr = program
            .items
            .iter()
            .find_map(|i| match i {
                Item::Attribute(a) => Some(a),
                _ => None,
            })
            .unwrap();
        assert_eq!(attr.identifier, "stackVar");
    }

    #[test]
    fn test_invoke_return_projection() {
        let source = r#"
variables:
  ret:
    fn::invoke:
      function: test:mod:fn
      return: foo
"#;
        let (program, diags) = import(source);
        assert!(!diags.has_errors(), "{diags}");
        let attr = program
            .items
            .iter()
            .find_map(|i| match i {
                Item::Attribute(a) => Some(a),
                _ => None,
            })
            .unwrap();
        match &attr.value {
            PirExpr::Index { collection, key } => {
                assert!(matches!(**collection, PirExpr::FunctionCall { .. }));
                assert_eq!(**key, PirExpr::Literal(LiteralValue::String("foo".to_string())));
            }
            other => panic!("expected Index, got {other:?}"),
        }
    }

    #[test]
    fn test_pulumi_cwd() {
        let source = r#"
outputs:
  foo: "${pulumi.cwd}/folder"
"#;
        let (program, diags) = import(source);
        assert!(!diags.has_errors(), "{diags}");
        let output = program
            .items
            .iter()
            .find_map(|i| match i {
                Item::Output(o) => Some(o),
                _ => None,
            })
            .unwrap();
        match &output.value {
            PirExpr::Template(parts) => {
                assert!(parts.iter().any(|p| matches!(
                    p,
                    crate::pir::TemplatePart::Expr(PirExpr::FunctionCall { name, .. }) if name == "cwd"
                )));
            }
            other => panic!("expected Template, got {other:?}"),
        }
    }

    #[test]
    fn test_pulumi_unknown_property_errors() {
        let source = r#"
outputs:
  foo: "${pulumi.bar}"
"#;
        let (_, diags) = import(source);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_cycle_halts_import() {
        let source = r#"
resources:
  a:
    type: test:mod:Foo
    properties:
      ref: "${b.id}"
  b:
    type: test:mod:Foo
    properties:
      ref: "${a.id}"
"#;
        let (template, parse_diags) = parse_template(source, None);
        assert!(!parse_diags.has_errors());
        let loader = SchemaStore::new();
        let mut diags = Diagnostics::new();
        let program = import_template(&template, &loader, &mut diags);
        assert!(program.is_none());
        assert!(diags.has_errors());
    }

    #[test]
    fn test_stack_reference_variable() {
        let source = r#"
variables:
  net:
    fn::stackReference:
      stackName: org/infra/prod
      propertyName: vpcId
outputs:
  vpc: "${net}"
"#;
        let (program, diags) = import(source);
        assert!(!diags.has_errors(), "{diags}");
        let sref = program
            .items
            .iter()
            .find_map(|i| match i {
                Item::StackReference(s) => Some(s),
                _ => None,
            })
            .unwrap();
        assert_eq!(sref.identifier, "netStack");

        let output = program
            .items
            .iter()
            .find_map(|i| match i {
                Item::Output(o) => Some(o),
                _ => None,
            })
            .unwrap();
        match &output.value {
            PirExpr::ScopeTraversal { root, traversal } => {
                assert_eq!(root, "netStack");
                assert_eq!(traversal, &vec![Traversal::Name("vpcId".to_string())]);
            }
            other => panic!("expected ScopeTraversal, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_logical_name_errors() {
        let source = r#"
config:
  foo:
    type: string
variables:
  foo:
    fn::toJSON: "x"
"#;
        let (_, diags) = import(source);
        assert!(diags.has_errors());
    }

    fn import_with_schema(source: &str, schema_json: &[u8]) -> (Program, Diagnostics) {
        let (template, parse_diags) = parse_template(source, None);
        assert!(!parse_diags.has_errors(), "{parse_diags}");
        let mut loader = SchemaStore::new();
        loader.insert(crate::schema::parse_schema_json(schema_json).unwrap());
        let mut diags = Diagnostics::new();
        let program = import_template(&template, &loader, &mut diags).unwrap_or_default();
        (program, diags)
    }

    #[test]
    fn test_bare_resource_reference_synthesizes_id_when_string_typed() {
        let schema = br#"{
            "name": "aws",
            "version": "6.0.0",
            "resources": {
                "aws:s3/bucket:Bucket": {
                    "properties": { "id": { "type": "string" } },
                    "inputProperties": {}
                }
            }
        }"#;
        let source = r#"
resources:
  my-bucket:
    type: aws:s3:Bucket
outputs:
  ref: "${my-bucket}"
"#;
        let (program, diags) = import_with_schema(source, schema);
        assert!(!diags.has_errors(), "{diags}");
        let output = program
            .items
            .iter()
            .find_map(|i| match i {
                Item::Output(o) => Some(o),
                _ => None,
            })
            .unwrap();
        match &output.value {
            PirExpr::Template(parts) => {
                assert!(parts.iter().any(|p| matches!(
                    p,
                    crate::pir::TemplatePart::Expr(PirExpr::ScopeTraversal { root, traversal })
                        if root == "myBucket" && traversal == &vec![Traversal::Name("id".to_string())]
                )));
            }
            other => panic!("expected Template, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_resource_reference_stays_plain_without_string_id() {
        let schema = br#"{
            "name": "aws",
            "version": "6.0.0",
            "resources": {
                "aws:s3/bucket:Bucket": {
                    "properties": {},
                    "inputProperties": {}
                }
            }
        }"#;
        let source = r#"
resources:
  my-bucket:
    type: aws:s3:Bucket
outputs:
  ref: "${my-bucket}"
"#;
        let (program, diags) = import_with_schema(source, schema);
        assert!(!diags.has_errors(), "{diags}");
        let output = program
            .items
            .iter()
            .find_map(|i| match i {
                Item::Output(o) => Some(o),
                _ => None,
            })
            .unwrap();
        match &output.value {
            PirExpr::Template(parts) => {
                assert!(parts.iter().any(|p| matches!(
                    p,
                    crate::pir::TemplatePart::Expr(PirExpr::VariableReference(name)) if name == "myBucket"
                )));
            }
            other => panic!("expected Template, got {other:?}"),
        }
    }

    #[test]
    fn test_object_typed_property_literalizes_keys() {
        let schema = br#"{
            "name": "aws",
            "version": "6.0.0",
            "resources": {
                "aws:s3/bucket:Bucket": {
                    "properties": {},
                    "inputProperties": { "tags": { "type": "object" } }
                }
            }
        }"#;
        let source = r#"
resources:
  my-bucket:
    type: aws:s3:Bucket
    properties:
      tags:
        env: prod
"#;
        let (program, diags) = import_with_schema(source, schema);
        assert!(!diags.has_errors(), "{diags}");
        let resource = program
            .items
            .iter()
            .find_map(|i| match i {
                Item::Resource(r) => Some(r),
                _ => None,
            })
            .unwrap();
        let (_, tags) = resource
            .properties
            .iter()
            .find(|(k, _)| k == "tags")
            .unwrap();
        match tags {
            PirExpr::Object(entries) => {
                assert_eq!(entries[0].0, "env");
            }
            other => panic!("expected Object, got {other:?}"),
        }
    }

    #[test]
    fn test_invoke_argument_literalizes_keys_when_object_typed() {
        let schema = br#"{
            "name": "aws",
            "version": "6.0.0",
            "functions": {
                "aws:ec2:getAmi": {
                    "inputs": {
                        "properties": {
                            "filters": { "type": "object" }
                        }
                    }
                }
            }
        }"#;
        let source = r#"
variables:
  ami:
    fn::invoke:
      function: aws:ec2:getAmi
      arguments:
        filters:
          name: latest
      return: id
"#;
        let (program, diags) = import_with_schema(source, schema);
        assert!(!diags.has_errors(), "{diags}");
        let value = program
            .items
            .iter()
            .find_map(|i| match i {
                Item::Attribute(a) => Some(&a.value),
                _ => None,
            })
            .unwrap();
        let PirExpr::Index { collection, .. } = value else {
            panic!("expected Index, got {value:?}")
        };
        let PirExpr::FunctionCall { args, .. } = collection.as_ref() else {
            panic!("expected FunctionCall, got {collection:?}")
        };
        match &args[1] {
            PirExpr::Object(entries) => {
                let (_, filters) = entries.iter().find(|(k, _)| k == "filters").unwrap();
                match filters {
                    PirExpr::Object(inner) => assert_eq!(inner[0].0, "name"),
                    other => panic!("expected Object, got {other:?}"),
                }
            }
            other => panic!("expected Object, got {other:?}"),
        }
    }

    #[test]
    fn test_config_var_type_from_declared_type() {
        let source = r#"
config:
  count:
    type: number
"#;
        let (program, diags) = import(source);
        assert!(!diags.has_errors(), "{diags}");
        let config = program
            .items
            .iter()
            .find_map(|i| match i {
                Item::Config(c) => Some(c),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.var_type, PirType::Number);
    }

    #[test]
    fn test_output_var_type_inferred_from_literal() {
        let source = r#"
outputs:
  flag: true
"#;
        let (program, diags) = import(source);
        assert!(!diags.has_errors(), "{diags}");
        let output = program
            .items
            .iter()
            .find_map(|i| match i {
                Item::Output(o) => Some(o),
                _ => None,
            })
            .unwrap();
        assert_eq!(output.var_type, PirType::Boolean);
    }
}
