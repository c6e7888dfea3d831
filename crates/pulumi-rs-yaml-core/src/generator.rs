//! PIR → Template AST → YAML (spec component 8).
//!
//! Walks a PIR [`Program`] in declaration order, collapses resource tokens
//! back to their shortest form, re-introduces string interpolation where
//! every template part serializes to plain text, and reports PIR features
//! that have no YAML representation (unary `for`/splat expressions) as
//! translation-warning diagnostics rather than failing the whole pass.

use std::borrow::Cow;

use serde_yaml::Value as YamlValue;

use crate::ast::expr::{Expr, InvokeExpr, InvokeOptions, ObjectProperty};
use crate::ast::template::{
    ConfigEntry, ConfigParamDecl, CustomTimeoutsDecl, OutputEntry, ResourceDecl, ResourceEntry,
    ResourceOptionsDecl, ResourceProperties, TemplateDecl, VariableEntry,
};
use crate::diag::Diagnostics;
use crate::packages::collapse_type_token;
use crate::pir::{
    CustomTimeoutsBlock, Item, LiteralValue, PirExpr, Program, ResourceOptionsBlock, TemplatePart,
    Traversal,
};
use crate::syntax::ExprMeta;

/// Regenerates a Template AST from a PIR program.
///
/// Diagnostics accumulate warnings for PIR features that cannot be
/// represented in YAML; the pass never halts on them.
pub fn generate_template(program: &Program, diags: &mut Diagnostics) -> TemplateDecl<'static> {
    let mut template = TemplateDecl::new();

    for item in &program.items {
        match item {
            Item::Config(block) => {
                template.config.push(ConfigEntry {
                    meta: ExprMeta::no_span(),
                    key: Cow::Owned(block.logical_name.clone()),
                    param: ConfigParamDecl {
                        type_: Some(Cow::Owned(block.type_.to_string())),
                        name: None,
                        secret: if block.secret { Some(true) } else { None },
                        default: block.default.as_ref().map(|e| generate_expr(e, diags)),
                        value: None,
                        items: None,
                    },
                });
            }
            Item::Attribute(attr) => {
                template.variables.push(VariableEntry {
                    meta: ExprMeta::no_span(),
                    key: Cow::Owned(attr.logical_name.clone()),
                    value: generate_expr(&attr.value, diags),
                });
            }
            Item::StackReference(sref) => {
                let entries = vec![ObjectProperty {
                    key: Box::new(Expr::String(ExprMeta::no_span(), Cow::Borrowed("stackName"))),
                    value: Box::new(generate_expr(&sref.stack_name, diags)),
                }];
                template.variables.push(VariableEntry {
                    meta: ExprMeta::no_span(),
                    key: Cow::Owned(sref.logical_name.clone()),
                    value: Expr::StackReference(
                        ExprMeta::no_span(),
                        crate::ast::expr::StackReferenceExpr {
                            stack_name: Box::new(entries[0].value.as_ref().clone()),
                            property_name: None,
                        },
                    ),
                });
            }
            Item::Resource(block) => {
                template.resources.push(ResourceEntry {
                    meta: ExprMeta::no_span(),
                    logical_name: Cow::Owned(block.logical_name.clone()),
                    resource: ResourceDecl {
                        type_: Cow::Owned(collapse_type_token(&block.token)),
                        name: None,
                        default_provider: None,
                        properties: ResourceProperties::Map(
                            block
                                .properties
                                .iter()
                                .map(|(k, v)| crate::ast::template::PropertyEntry {
                                    key: Cow::Owned(k.clone()),
                                    value: generate_expr(v, diags),
                                })
                                .collect(),
                        ),
                        options: generate_resource_options(&block.options, diags),
                        get: block.get.as_ref().map(|g| crate::ast::template::GetResourceDecl {
                            id: generate_expr(&g.id, diags),
                            state: g
                                .state
                                .iter()
                                .map(|(k, v)| crate::ast::template::PropertyEntry {
                                    key: Cow::Owned(k.clone()),
                                    value: generate_expr(v, diags),
                                })
                                .collect(),
                        }),
                    },
                });
            }
            Item::Output(block) => {
                template.outputs.push(OutputEntry {
                    key: Cow::Owned(block.logical_name.clone()),
                    value: generate_expr(&block.value, diags),
                });
            }
        }
    }

    template
}

/// Emits `ResourceOptionsDecl` from a PIR options block.
///
/// Open Question A / spec Design Notes: the original implementation wrote
/// `provider` twice in a row when both `provider` and `parent` were set,
/// silently overwriting one with the other. Here each option is its own
/// field with its own assignment, so no such aliasing is possible.
fn generate_resource_options(
    opts: &ResourceOptionsBlock,
    diags: &mut Diagnostics,
) -> ResourceOptionsDecl<'static> {
    ResourceOptionsDecl {
        aliases: opts.aliases.as_ref().map(|e| generate_expr(e, diags)),
        custom_timeouts: opts.custom_timeouts.as_ref().map(|t| CustomTimeoutsDecl {
            create: t.create.clone().map(Cow::Owned),
            update: t.update.clone().map(Cow::Owned),
            delete: t.delete.clone().map(Cow::Owned),
        }),
        delete_before_replace: opts.delete_before_replace,
        depends_on: opts.depends_on.as_ref().map(|e| generate_expr(e, diags)),
        ignore_changes: if opts.ignore_changes.is_empty() {
            None
        } else {
            Some(opts.ignore_changes.iter().cloned().map(Cow::Owned).collect())
        },
        parent: opts.parent.as_ref().map(|e| generate_expr(e, diags)),
        protect: opts.protect.as_ref().map(|e| generate_expr(e, diags)),
        provider: opts.provider.as_ref().map(|e| generate_expr(e, diags)),
        providers: opts.providers.as_ref().map(|e| generate_expr(e, diags)),
        version: opts.version.clone().map(Cow::Owned),
        plugin_download_url: opts.plugin_download_url.clone().map(Cow::Owned),
        deleted_with: opts.deleted_with.as_ref().map(|e| generate_expr(e, diags)),
    }
}

/// Rewrites a PIR expression back into a template `Expr`, inverting
/// `core::importer`'s expression import (spec §4.7).
fn generate_expr(expr: &PirExpr, diags: &mut Diagnostics) -> Expr<'static> {
    match expr {
        PirExpr::Literal(LiteralValue::Null) => Expr::Null(ExprMeta::no_span()),
        PirExpr::Literal(LiteralValue::Bool(b)) => Expr::Bool(ExprMeta::no_span(), *b),
        PirExpr::Literal(LiteralValue::Number(n)) => Expr::Number(ExprMeta::no_span(), *n),
        PirExpr::Literal(LiteralValue::String(s)) => {
            Expr::String(ExprMeta::no_span(), Cow::Owned(s.clone()))
        }

        PirExpr::VariableReference(ident) => Expr::Symbol(
            ExprMeta::no_span(),
            crate::ast::property::PropertyAccess {
                accessors: vec![crate::ast::property::PropertyAccessor::Name(Cow::Owned(
                    ident.clone(),
                ))],
            },
        ),

        PirExpr::ScopeTraversal { root, traversal } => {
            let mut accessors = vec![crate::ast::property::PropertyAccessor::Name(Cow::Owned(
                root.clone(),
            ))];
            for t in traversal {
                accessors.push(traversal_to_accessor(t));
            }
            Expr::Symbol(ExprMeta::no_span(), crate::ast::property::PropertyAccess { accessors })
        }

        PirExpr::RelativeTraversal { traversal } => {
            diags.warning(None, "relative traversal is not representable in YAML", "");
            let accessors = traversal.iter().map(traversal_to_accessor).collect();
            Expr::Symbol(ExprMeta::no_span(), crate::ast::property::PropertyAccess { accessors })
        }

        PirExpr::Template(parts) => generate_template_expr(parts, diags),

        PirExpr::FunctionCall { name, args } => generate_function_call(name, args, diags),

        PirExpr::Index { collection, key } => {
            // Only the invoke-return-projection shape (`invoke(...).field`)
            // is produced by the importer; reconstruct it as `fn::invoke`
            // with a `return` directive when possible, otherwise emit
            // `fn::select`-style indexing as a last resort.
            if let (PirExpr::FunctionCall { name, args }, PirExpr::Literal(LiteralValue::String(field))) =
                (collection.as_ref(), key.as_ref())
            {
                if name == "invoke" {
                    if let [token, call_args] = args.as_slice() {
                        if let PirExpr::Literal(LiteralValue::String(token)) = token {
                            return Expr::Invoke(
                                ExprMeta::no_span(),
                                InvokeExpr {
                                    token: Cow::Owned(token.clone()),
                                    call_args: Some(Box::new(generate_expr(call_args, diags))),
                                    call_opts: InvokeOptions::default(),
                                    return_: Some(Cow::Owned(field.clone())),
                                },
                            );
                        }
                    }
                }
            }
            diags.warning(None, "index expression is not directly representable in YAML", "");
            generate_expr(collection, diags)
        }

        PirExpr::Tuple(items) => {
            Expr::List(ExprMeta::no_span(), items.iter().map(|i| generate_expr(i, diags)).collect())
        }

        PirExpr::Object(entries) => Expr::Object(
            ExprMeta::no_span(),
            entries
                .iter()
                .map(|(k, v)| ObjectProperty {
                    key: Box::new(Expr::String(ExprMeta::no_span(), Cow::Owned(k.clone()))),
                    value: Box::new(generate_expr(v, diags)),
                })
                .collect(),
        ),
    }
}

fn traversal_to_accessor(t: &Traversal) -> crate::ast::property::PropertyAccessor<'static> {
    match t {
        Traversal::Name(n) => crate::ast::property::PropertyAccessor::Name(Cow::Owned(n.clone())),
        Traversal::StringIndex(n) => {
            crate::ast::property::PropertyAccessor::StringSubscript(Cow::Owned(n.clone()))
        }
        Traversal::IntIndex(i) => crate::ast::property::PropertyAccessor::IntSubscript(*i),
    }
}

/// A `Template` whose every part serializes to a string node concatenates
/// into a single interpolated string; otherwise it emits `fn::join` with an
/// empty delimiter over the parts (spec §4.7).
fn generate_template_expr(parts: &[TemplatePart], diags: &mut Diagnostics) -> Expr<'static> {
    let all_literal_or_symbol = parts.iter().all(|p| match p {
        TemplatePart::Literal(_) => true,
        TemplatePart::Expr(e) => matches!(e, PirExpr::VariableReference(_) | PirExpr::ScopeTraversal { .. }),
    });

    if all_literal_or_symbol {
        let mut interp_parts = Vec::new();
        for part in parts {
            match part {
                TemplatePart::Literal(text) => {
                    interp_parts.push(crate::ast::interpolation::InterpolationPart {
                        text: Cow::Owned(text.clone()),
                        value: None,
                    });
                }
                TemplatePart::Expr(e) => {
                    let access = match generate_expr(e, diags) {
                        Expr::Symbol(_, access) => access,
                        _ => unreachable!("filtered to Symbol-producing variants above"),
                    };
                    interp_parts.push(crate::ast::interpolation::InterpolationPart {
                        text: Cow::Borrowed(""),
                        value: Some(access),
                    });
                }
            }
        }
        return Expr::Interpolate(ExprMeta::no_span(), interp_parts);
    }

    let values = parts
        .iter()
        .map(|p| match p {
            TemplatePart::Literal(text) => Expr::String(ExprMeta::no_span(), Cow::Owned(text.clone())),
            TemplatePart::Expr(e) => generate_expr(e, diags),
        })
        .collect();
    Expr::Join(
        ExprMeta::no_span(),
        Box::new(Expr::String(ExprMeta::no_span(), Cow::Borrowed(""))),
        Box::new(Expr::List(ExprMeta::no_span(), values)),
    )
}

fn generate_function_call(name: &str, args: &[PirExpr], diags: &mut Diagnostics) -> Expr<'static> {
    let arg = |i: usize| args.get(i).map(|a| generate_expr(a, diags)).unwrap_or(Expr::Null(ExprMeta::no_span()));

    match name {
        "join" => Expr::Join(ExprMeta::no_span(), Box::new(arg(0)), Box::new(arg(1))),
        "select" => Expr::Select(ExprMeta::no_span(), Box::new(arg(0)), Box::new(arg(1))),
        "split" => Expr::Split(ExprMeta::no_span(), Box::new(arg(0)), Box::new(arg(1))),
        "toJSON" => Expr::ToJson(ExprMeta::no_span(), Box::new(arg(0))),
        "toBase64" => Expr::ToBase64(ExprMeta::no_span(), Box::new(arg(0))),
        "fromBase64" => Expr::FromBase64(ExprMeta::no_span(), Box::new(arg(0))),
        "secret" => Expr::Secret(ExprMeta::no_span(), Box::new(arg(0))),
        "readFile" => Expr::ReadFile(ExprMeta::no_span(), Box::new(arg(0))),
        "stringAsset" => Expr::StringAsset(ExprMeta::no_span(), Box::new(arg(0))),
        "fileAsset" => Expr::FileAsset(ExprMeta::no_span(), Box::new(arg(0))),
        "remoteAsset" => Expr::RemoteAsset(ExprMeta::no_span(), Box::new(arg(0))),
        "fileArchive" => Expr::FileArchive(ExprMeta::no_span(), Box::new(arg(0))),
        "remoteArchive" => Expr::RemoteArchive(ExprMeta::no_span(), Box::new(arg(0))),
        "assetArchive" => match arg(0) {
            Expr::Object(_, entries) => Expr::AssetArchive(
                ExprMeta::no_span(),
                entries
                    .into_iter()
                    .map(|e| (Cow::Owned(e.key.as_str().unwrap_or_default().to_string()), *e.value))
                    .collect(),
            ),
            other => other,
        },
        "invoke" => {
            let token = match args.first() {
                Some(PirExpr::Literal(LiteralValue::String(s))) => s.clone(),
                _ => String::new(),
            };
            Expr::Invoke(
                ExprMeta::no_span(),
                InvokeExpr {
                    token: Cow::Owned(token),
                    call_args: args.get(1).map(|a| Box::new(generate_expr(a, diags))),
                    call_opts: InvokeOptions::default(),
                    return_: None,
                },
            )
        }
        "cwd" | "stack" | "project" => Expr::Symbol(
            ExprMeta::no_span(),
            crate::ast::property::PropertyAccess {
                accessors: vec![
                    crate::ast::property::PropertyAccessor::Name(Cow::Borrowed("pulumi")),
                    crate::ast::property::PropertyAccessor::Name(Cow::Owned(name.to_string())),
                ],
            },
        ),
        other => {
            diags.warning(None, format!("function call '{other}' is not representable in YAML"), "");
            Expr::Null(ExprMeta::no_span())
        }
    }
}

/// Serializes a regenerated Template AST to YAML bytes.
///
/// Builds a `serde_yaml::Value` the same way `ast::parse` destructures one,
/// then hands it to the Syntax Tree codec for the actual text rendering.
/// The regenerated tree carries no spans or trivia, so round-tripped output
/// never reproduces comments present only in the original source.
pub fn emit_yaml(template: &TemplateDecl<'_>) -> Result<String, String> {
    let value = template_to_yaml_value(template);
    let node = crate::codec::decode_value_plain(&value);
    crate::codec::encode(&node)
}

fn template_to_yaml_value(template: &TemplateDecl<'_>) -> YamlValue {
    let mut mapping = serde_yaml::Mapping::new();

    if let Some(name) = &template.name {
        mapping.insert(YamlValue::from("name"), YamlValue::from(name.as_ref()));
    }
    if let Some(desc) = &template.description {
        mapping.insert(YamlValue::from("description"), YamlValue::from(desc.as_ref()));
    }

    if !template.config.is_empty() {
        let mut cfg = serde_yaml::Mapping::new();
        for entry in &template.config {
            cfg.insert(YamlValue::from(entry.key.as_ref()), config_param_to_yaml(&entry.param));
        }
        mapping.insert(YamlValue::from("configuration"), YamlValue::Mapping(cfg));
    }

    if !template.variables.is_empty() {
        let mut vars = serde_yaml::Mapping::new();
        for v in &template.variables {
            vars.insert(YamlValue::from(v.key.as_ref()), expr_to_yaml(&v.value));
        }
        mapping.insert(YamlValue::from("variables"), YamlValue::Mapping(vars));
    }

    if !template.resources.is_empty() {
        let mut res = serde_yaml::Mapping::new();
        for entry in &template.resources {
            res.insert(
                YamlValue::from(entry.logical_name.as_ref()),
                resource_to_yaml(&entry.resource),
            );
        }
        mapping.insert(YamlValue::from("resources"), YamlValue::Mapping(res));
    }

    if !template.outputs.is_empty() {
        let mut outs = serde_yaml::Mapping::new();
        for o in &template.outputs {
            outs.insert(YamlValue::from(o.key.as_ref()), expr_to_yaml(&o.value));
        }
        mapping.insert(YamlValue::from("outputs"), YamlValue::Mapping(outs));
    }

    YamlValue::Mapping(mapping)
}

fn config_param_to_yaml(param: &ConfigParamDecl<'_>) -> YamlValue {
    let mut m = serde_yaml::Mapping::new();
    if let Some(t) = &param.type_ {
        m.insert(YamlValue::from("type"), YamlValue::from(t.as_ref()));
    }
    if let Some(secret) = param.secret {
        m.insert(YamlValue::from("secret"), YamlValue::from(secret));
    }
    if let Some(default) = &param.default {
        m.insert(YamlValue::from("default"), expr_to_yaml(default));
    }
    YamlValue::Mapping(m)
}

fn resource_to_yaml(resource: &ResourceDecl<'_>) -> YamlValue {
    let mut m = serde_yaml::Mapping::new();
    m.insert(YamlValue::from("type"), YamlValue::from(resource.type_.as_ref()));

    match &resource.properties {
        ResourceProperties::Map(entries) if !entries.is_empty() => {
            let mut props = serde_yaml::Mapping::new();
            for entry in entries {
                props.insert(YamlValue::from(entry.key.as_ref()), expr_to_yaml(&entry.value));
            }
            m.insert(YamlValue::from("properties"), YamlValue::Mapping(props));
        }
        ResourceProperties::Expr(expr) => {
            m.insert(YamlValue::from("properties"), expr_to_yaml(expr));
        }
        _ => {}
    }

    let opts = options_to_yaml(&resource.options);
    if let YamlValue::Mapping(ref opt_map) = opts {
        if !opt_map.is_empty() {
            m.insert(YamlValue::from("options"), opts);
        }
    }

    YamlValue::Mapping(m)
}

fn options_to_yaml(opts: &ResourceOptionsDecl<'_>) -> YamlValue {
    let mut m = serde_yaml::Mapping::new();
    if let Some(e) = &opts.depends_on {
        m.insert(YamlValue::from("dependsOn"), expr_to_yaml(e));
    }
    if let Some(e) = &opts.parent {
        m.insert(YamlValue::from("parent"), expr_to_yaml(e));
    }
    if let Some(e) = &opts.provider {
        m.insert(YamlValue::from("provider"), expr_to_yaml(e));
    }
    if let Some(e) = &opts.providers {
        m.insert(YamlValue::from("providers"), expr_to_yaml(e));
    }
    if let Some(e) = &opts.protect {
        m.insert(YamlValue::from("protect"), expr_to_yaml(e));
    }
    if let Some(list) = &opts.ignore_changes {
        m.insert(
            YamlValue::from("ignoreChanges"),
            YamlValue::Sequence(list.iter().map(|s| YamlValue::from(s.as_ref())).collect()),
        );
    }
    if let Some(e) = &opts.deleted_with {
        m.insert(YamlValue::from("deletedWith"), expr_to_yaml(e));
    }
    if let Some(v) = &opts.version {
        m.insert(YamlValue::from("version"), YamlValue::from(v.as_ref()));
    }
    if let Some(v) = &opts.plugin_download_url {
        m.insert(YamlValue::from("pluginDownloadURL"), YamlValue::from(v.as_ref()));
    }
    YamlValue::Mapping(m)
}

fn expr_to_yaml(expr: &Expr<'_>) -> YamlValue {
    match expr {
        Expr::Null(_) => YamlValue::Null,
        Expr::Bool(_, b) => YamlValue::from(*b),
        Expr::Number(_, n) => YamlValue::from(*n),
        Expr::String(_, s) => YamlValue::from(s.as_ref()),
        Expr::Interpolate(_, parts) => {
            let mut s = String::new();
            for part in parts {
                s.push_str(&part.text);
                if let Some(access) = &part.value {
                    s.push_str("${");
                    s.push_str(&access.to_string());
                    s.push('}');
                }
            }
            YamlValue::from(s)
        }
        Expr::Symbol(_, access) => YamlValue::from(format!("${{{access}}}")),
        Expr::List(_, items) => YamlValue::Sequence(items.iter().map(expr_to_yaml).collect()),
        Expr::Object(_, entries) => {
            let mut m = serde_yaml::Mapping::new();
            for e in entries {
                let key = e.key.as_str().unwrap_or_default();
                m.insert(YamlValue::from(key), expr_to_yaml(&e.value));
            }
            YamlValue::Mapping(m)
        }
        Expr::Invoke(_, invoke) => {
            let mut m = serde_yaml::Mapping::new();
            m.insert(YamlValue::from("function"), YamlValue::from(invoke.token.as_ref()));
            if let Some(args) = &invoke.call_args {
                m.insert(YamlValue::from("arguments"), expr_to_yaml(args));
            }
            if let Some(ret) = &invoke.return_ {
                m.insert(YamlValue::from("return"), YamlValue::from(ret.as_ref()));
            }
            let mut outer = serde_yaml::Mapping::new();
            outer.insert(YamlValue::from("fn::invoke"), YamlValue::Mapping(m));
            YamlValue::Mapping(outer)
        }
        Expr::StackReference(_, sref) => {
            let mut m = serde_yaml::Mapping::new();
            m.insert(YamlValue::from("stackName"), expr_to_yaml(&sref.stack_name));
            if let Some(p) = &sref.property_name {
                m.insert(YamlValue::from("propertyName"), expr_to_yaml(p));
            }
            let mut outer = serde_yaml::Mapping::new();
            outer.insert(YamlValue::from("fn::stackReference"), YamlValue::Mapping(m));
            YamlValue::Mapping(outer)
        }
        Expr::Join(_, delim, values) => wrap_builtin("fn::join", YamlValue::Sequence(vec![expr_to_yaml(delim), expr_to_yaml(values)])),
        Expr::Select(_, index, values) => wrap_builtin("fn::select", YamlValue::Sequence(vec![expr_to_yaml(index), expr_to_yaml(values)])),
        Expr::Split(_, delim, source) => wrap_builtin("fn::split", YamlValue::Sequence(vec![expr_to_yaml(delim), expr_to_yaml(source)])),
        Expr::ToJson(_, inner) => wrap_builtin("fn::toJSON", expr_to_yaml(inner)),
        Expr::ToBase64(_, inner) => wrap_builtin("fn::toBase64", expr_to_yaml(inner)),
        Expr::FromBase64(_, inner) => wrap_builtin("fn::fromBase64", expr_to_yaml(inner)),
        Expr::Secret(_, inner) => wrap_builtin("fn::secret", expr_to_yaml(inner)),
        Expr::ReadFile(_, inner) => wrap_builtin("fn::readFile", expr_to_yaml(inner)),
        Expr::StringAsset(_, inner) => wrap_builtin("fn::stringAsset", expr_to_yaml(inner)),
        Expr::FileAsset(_, inner) => wrap_builtin("fn::fileAsset", expr_to_yaml(inner)),
        Expr::RemoteAsset(_, inner) => wrap_builtin("fn::remoteAsset", expr_to_yaml(inner)),
        Expr::FileArchive(_, inner) => wrap_builtin("fn::fileArchive", expr_to_yaml(inner)),
        Expr::RemoteArchive(_, inner) => wrap_builtin("fn::remoteArchive", expr_to_yaml(inner)),
        Expr::AssetArchive(_, entries) => {
            let mut m = serde_yaml::Mapping::new();
            for (k, v) in entries {
                m.insert(YamlValue::from(k.as_ref()), expr_to_yaml(v));
            }
            wrap_builtin("fn::assetArchive", YamlValue::Mapping(m))
        }
    }
}

fn wrap_builtin(key: &str, value: YamlValue) -> YamlValue {
    let mut m = serde_yaml::Mapping::new();
    m.insert(YamlValue::from(key), value);
    YamlValue::Mapping(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse::parse_template;
    use crate::importer::import_template;
    use crate::schema::SchemaStore;

    fn roundtrip(source: &str) -> (TemplateDecl<'static>, String) {
        let (template, parse_diags) = parse_template(source, None);
        assert!(!parse_diags.has_errors(), "{parse_diags}");
        let loader = SchemaStore::new();
        let mut diags = Diagnostics::new();
        let program = import_template(&template, &loader, &mut diags).unwrap();
        assert!(!diags.has_errors(), "{diags}");
        let mut gen_diags = Diagnostics::new();
        let regenerated = generate_template(&program, &mut gen_diags);
        let yaml = emit_yaml(&regenerated).unwrap();
        (regenerated, yaml)
    }

    #[test]
    fn test_token_collapse_roundtrip() {
        let source = "resources:\n  my-bucket:\n    type: aws:s3/bucket:Bucket\n";
        let (template, _) = roundtrip(source);
        assert_eq!(template.resources[0].resource.type_.as_ref(), "aws:s3:Bucket");
    }

    #[test]
    fn test_token_collapse_mismatched_case_unchanged() {
        let source = "resources:\n  r:\n    type: fizz:mode/buzz:Buzz\n";
        let (template, _) = roundtrip(source);
        assert_eq!(template.resources[0].resource.type_.as_ref(), "fizz:mode/buzz:Buzz");
    }

    #[test]
    fn test_resource_options_parent_and_provider_distinct() {
        let source = r#"
resources:
  prov:
    type: pulumi:providers:aws
  a:
    type: test:mod:Foo
  b:
    type: test:mod:Foo
    options:
      parent: "${a}"
      provider: "${prov}"
"#;
        let (template, _) = roundtrip(source);
        let b = template.resources.iter().find(|r| r.logical_name == "b").unwrap();
        assert!(b.resource.options.parent.is_some());
        assert!(b.resource.options.provider.is_some());
        assert_ne!(b.resource.options.parent, b.resource.options.provider);
    }

    #[test]
    fn test_interpolation_roundtrip() {
        let source = "resources:\n  my-bucket:\n    type: aws:s3:Bucket\noutputs:\n  url: \"https://${my-bucket.websiteUrl}\"\n";
        let (template, yaml) = roundtrip(source);
        assert!(matches!(template.outputs[0].value, Expr::Interpolate(_, _)));
        assert!(yaml.contains("${myBucket.websiteUrl}") || yaml.contains("myBucket"));
    }

    #[test]
    fn test_emit_yaml_parses_back() {
        let source = "config:\n  region:\n    type: string\n    default: us-east-1\noutputs:\n  r: \"${region}\"\n";
        let (_, yaml) = roundtrip(source);
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert!(value.get("configuration").is_some());
    }
}
