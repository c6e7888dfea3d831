use crate::ast::expr::{Expr, InvokeExpr, InvokeOptions, ObjectProperty, StackReferenceExpr};
use crate::ast::interpolation::{has_interpolations, parse_interpolation};
use crate::ast::template::*;
use crate::binder::{type_mismatch, ObjectBinder};
use crate::codec::{self, NoopTagDecoder};
use crate::diag::{unexpected_casing, Diagnostics};
use crate::source::FileId;
use crate::syntax::{ExprMeta, Node, Span, Value};
use std::borrow::Cow;

/// Parses a YAML/JSON source string into a `TemplateDecl`.
///
/// Decodes `source` through the Syntax Tree codec first (so malformed-YAML
/// and non-mapping-root diagnostics come from one place), then destructures
/// the recovered `serde_yaml::Value` shape field-by-field the same way the
/// rest of this module does. Since `serde_yaml` doesn't support zero-copy
/// deserialization, all strings produced by parsing are `Cow::Owned`. The
/// `'static` lifetime reflects this.
pub fn parse_template(source: &str, span: Option<Span>) -> (TemplateDecl<'static>, Diagnostics) {
    let file = span.map(|s| s.file).unwrap_or(FileId(0));
    let (root, mut diags) = codec::decode(file, source, &NoopTagDecoder);
    let root = match root {
        Some(r) => r,
        None => return (TemplateDecl::new(), diags),
    };
    let yaml = codec::node_to_serde_value(&root);
    let mapping = yaml
        .as_mapping()
        .unwrap_or_else(|| unreachable!("codec::decode only returns Some for a mapping root"));

    let meta = ExprMeta { span };
    let mut template = TemplateDecl::new();
    template.meta = meta;

    for (key, value) in mapping {
        let key_str = match key.as_str() {
            Some(s) => s,
            None => continue,
        };

        match key_str.to_lowercase().as_str() {
            "name" => {
                if let Some(s) = value.as_str() {
                    template.name = Some(Cow::Owned(s.to_string()));
                }
            }
            "namespace" => {
                if let Some(s) = value.as_str() {
                    template.namespace = Some(Cow::Owned(s.to_string()));
                }
            }
            "description" => {
                if let Some(s) = value.as_str() {
                    template.description = Some(Cow::Owned(s.to_string()));
                }
            }
            "runtime" => {
                // Runtime is metadata for the engine, not parsed into AST
            }
            "pulumi" => {
                template.pulumi = parse_pulumi_decl(value, &mut diags);
            }
            "config" | "configuration" => {
                template.config = parse_config_map(value, &mut diags);
            }
            "variables" => {
                template.variables = parse_variables_map(value, &mut diags);
            }
            "resources" => {
                template.resources = parse_resources_map(value, &mut diags);
            }
            "outputs" => {
                template.outputs = parse_outputs_map(value, &mut diags);
            }
            _ => {
                template.unrecognized_keys.push(Cow::Owned(key_str.to_string()));
            }
        }
    }

    for entry in &template.config {
        if let Some(default) = &entry.param.default {
            forbid_stack_reference(default, &mut diags);
        }
        if let Some(value) = &entry.param.value {
            forbid_stack_reference(value, &mut diags);
        }
    }
    for entry in &template.variables {
        check_stack_reference_in_variable(&entry.value, &mut diags);
    }
    for entry in &template.resources {
        match &entry.resource.properties {
            ResourceProperties::Map(props) => {
                for p in props {
                    forbid_stack_reference(&p.value, &mut diags);
                }
            }
            ResourceProperties::Expr(e) => forbid_stack_reference(e, &mut diags),
        }
        if let Some(get) = &entry.resource.get {
            forbid_stack_reference(&get.id, &mut diags);
            for p in &get.state {
                forbid_stack_reference(&p.value, &mut diags);
            }
        }
        forbid_stack_reference_in_options(&entry.resource.options, &mut diags);
    }
    for entry in &template.outputs {
        forbid_stack_reference(&entry.value, &mut diags);
    }

    (template, diags)
}

/// Checks that a variable's value is legal: `fn::stackReference` is allowed
/// only as the entire value, never nested deeper (Open Question D).
fn check_stack_reference_in_variable(expr: &Expr<'static>, diags: &mut Diagnostics) {
    if matches!(expr, Expr::StackReference(_, _)) {
        return;
    }
    forbid_stack_reference(expr, diags);
}

fn forbid_stack_reference_in_options(opts: &ResourceOptionsDecl<'static>, diags: &mut Diagnostics) {
    if let Some(e) = &opts.aliases {
        forbid_stack_reference(e, diags);
    }
    if let Some(e) = &opts.depends_on {
        forbid_stack_reference(e, diags);
    }
    if let Some(e) = &opts.parent {
        forbid_stack_reference(e, diags);
    }
    if let Some(e) = &opts.protect {
        forbid_stack_reference(e, diags);
    }
    if let Some(e) = &opts.provider {
        forbid_stack_reference(e, diags);
    }
    if let Some(e) = &opts.providers {
        forbid_stack_reference(e, diags);
    }
    if let Some(e) = &opts.deleted_with {
        forbid_stack_reference(e, diags);
    }
}

/// Errors if `expr` or any of its descendants is `fn::stackReference`.
fn forbid_stack_reference(expr: &Expr<'static>, diags: &mut Diagnostics) {
    if let Expr::StackReference(m, _) = expr {
        diags.error(
            m.span,
            "fn::stackReference is only valid as a variable's value",
            "",
        );
        return;
    }
    for child in expr_children(expr) {
        forbid_stack_reference(child, diags);
    }
}

/// Returns the direct expression children of `expr`, for generic recursive walks.
fn expr_children<'a>(expr: &'a Expr<'static>) -> Vec<&'a Expr<'static>> {
    match expr {
        Expr::Null(_)
        | Expr::Bool(_, _)
        | Expr::Number(_, _)
        | Expr::String(_, _)
        | Expr::Interpolate(_, _)
        | Expr::Symbol(_, _) => Vec::new(),
        Expr::List(_, items) => items.iter().collect(),
        Expr::Object(_, props) => props
            .iter()
            .flat_map(|p| vec![p.key.as_ref(), p.value.as_ref()])
            .collect(),
        Expr::Invoke(_, invoke) => {
            let mut out = Vec::new();
            if let Some(args) = &invoke.call_args {
                out.push(args.as_ref());
            }
            if let Some(p) = &invoke.call_opts.parent {
                out.push(p.as_ref());
            }
            if let Some(p) = &invoke.call_opts.provider {
                out.push(p.as_ref());
            }
            if let Some(p) = &invoke.call_opts.depends_on {
                out.push(p.as_ref());
            }
            out
        }
        Expr::StackReference(_, sref) => {
            let mut out = vec![sref.stack_name.as_ref()];
            if let Some(p) = &sref.property_name {
                out.push(p.as_ref());
            }
            out
        }
        Expr::Join(_, a, b) | Expr::Select(_, a, b) | Expr::Split(_, a, b) => {
            vec![a.as_ref(), b.as_ref()]
        }
        Expr::ToJson(_, e)
        | Expr::ToBase64(_, e)
        | Expr::FromBase64(_, e)
        | Expr::Secret(_, e)
        | Expr::ReadFile(_, e)
        | Expr::StringAsset(_, e)
        | Expr::FileAsset(_, e)
        | Expr::RemoteAsset(_, e)
        | Expr::FileArchive(_, e)
        | Expr::RemoteArchive(_, e) => vec![e.as_ref()],
        Expr::AssetArchive(_, entries) => entries.iter().map(|(_, e)| e).collect(),
    }
}

/// Parses a `serde_yaml::Value` into an `Expr<'static>`.
pub fn parse_expr(value: &serde_yaml::Value, diags: &mut Diagnostics) -> Expr<'static> {
    let meta = ExprMeta::no_span();
    match value {
        serde_yaml::Value::Null => Expr::Null(meta),
        serde_yaml::Value::Bool(b) => Expr::Bool(meta, *b),
        serde_yaml::Value::Number(n) => Expr::Number(meta, n.as_f64().unwrap_or(0.0)),
        serde_yaml::Value::String(s) => parse_string_expr_owned(s, meta, diags),
        serde_yaml::Value::Sequence(seq) => {
            let elements: Vec<Expr<'static>> = seq.iter().map(|v| parse_expr(v, diags)).collect();
            Expr::List(meta, elements)
        }
        serde_yaml::Value::Mapping(map) => parse_object_or_builtin(map, meta, diags),
        serde_yaml::Value::Tagged(tagged) => parse_expr(&tagged.value, diags),
    }
}

/// Parses an owned string that may contain interpolations.
fn parse_string_expr_owned(s: &str, meta: ExprMeta, diags: &mut Diagnostics) -> Expr<'static> {
    if !has_interpolations(s) {
        return Expr::String(meta, Cow::Owned(s.to_string()));
    }

    let parts = parse_interpolation(s, meta.span, diags);

    if parts.is_empty() {
        return Expr::String(meta, Cow::Owned(s.to_string()));
    }

    let owned_parts: Vec<_> = parts
        .into_iter()
        .map(|p| crate::ast::interpolation::InterpolationPart {
            text: Cow::Owned(p.text.into_owned()),
            value: p.value.map(|a| crate::ast::property::PropertyAccess {
                accessors: a
                    .accessors
                    .into_iter()
                    .map(|acc| match acc {
                        crate::ast::property::PropertyAccessor::Name(n) => {
                            crate::ast::property::PropertyAccessor::Name(Cow::Owned(n.into_owned()))
                        }
                        crate::ast::property::PropertyAccessor::StringSubscript(s) => {
                            crate::ast::property::PropertyAccessor::StringSubscript(Cow::Owned(
                                s.into_owned(),
                            ))
                        }
                        crate::ast::property::PropertyAccessor::IntSubscript(i) => {
                            crate::ast::property::PropertyAccessor::IntSubscript(i)
                        }
                    })
                    .collect(),
            }),
        })
        .collect();

    if owned_parts.len() == 1 {
        if owned_parts[0].value.is_none() {
            let text = owned_parts.into_iter().next().unwrap().text;
            return Expr::String(meta, text);
        }
        if owned_parts[0].text.is_empty() {
            let part = owned_parts.into_iter().next().unwrap();
            return Expr::Symbol(meta, part.value.unwrap());
        }
    }

    Expr::Interpolate(meta, owned_parts)
}

/// Parses a YAML mapping as either a builtin function call or a plain object.
fn parse_object_or_builtin(
    map: &serde_yaml::Mapping,
    meta: ExprMeta,
    diags: &mut Diagnostics,
) -> Expr<'static> {
    if map.len() == 1 {
        let (key, value) = map.iter().next().unwrap();
        if let Some(key_str) = key.as_str() {
            if let Some(expr) = try_parse_builtin(key_str, value, meta, diags) {
                return expr;
            }
        }
    }

    let entries: Vec<ObjectProperty<'static>> = map
        .iter()
        .map(|(k, v)| {
            let key_expr = parse_expr(k, diags);
            let value_expr = parse_expr(v, diags);
            ObjectProperty {
                key: Box::new(key_expr),
                value: Box::new(value_expr),
            }
        })
        .collect();

    Expr::Object(meta, entries)
}

/// Tries to parse a single-key object as a builtin function call.
fn try_parse_builtin(
    key: &str,
    value: &serde_yaml::Value,
    meta: ExprMeta,
    diags: &mut Diagnostics,
) -> Option<Expr<'static>> {
    let lower = key.to_lowercase();

    match lower.as_str() {
        "fn::stringasset" => {
            check_casing(key, "fn::stringAsset", diags);
            let source = parse_expr(value, diags);
            return Some(Expr::StringAsset(meta, Box::new(source)));
        }
        "fn::fileasset" => {
            check_casing(key, "fn::fileAsset", diags);
            let source = parse_expr(value, diags);
            return Some(Expr::FileAsset(meta, Box::new(source)));
        }
        "fn::remoteasset" => {
            check_casing(key, "fn::remoteAsset", diags);
            let source = parse_expr(value, diags);
            return Some(Expr::RemoteAsset(meta, Box::new(source)));
        }
        "fn::filearchive" => {
            check_casing(key, "fn::fileArchive", diags);
            let source = parse_expr(value, diags);
            return Some(Expr::FileArchive(meta, Box::new(source)));
        }
        "fn::remotearchive" => {
            check_casing(key, "fn::remoteArchive", diags);
            let source = parse_expr(value, diags);
            return Some(Expr::RemoteArchive(meta, Box::new(source)));
        }
        _ => {}
    }

    match lower.as_str() {
        "fn::invoke" => {
            check_casing(key, "fn::invoke", diags);
            let args = parse_expr(value, diags);
            return Some(parse_invoke(args, meta, diags));
        }
        "fn::stackreference" => {
            check_casing(key, "fn::stackReference", diags);
            let args = parse_expr(value, diags);
            return Some(parse_stack_reference(args, meta, diags));
        }
        "fn::join" => {
            check_casing(key, "fn::join", diags);
            let args = parse_expr(value, diags);
            return Some(parse_join(args, meta, diags));
        }
        "fn::tojson" => {
            check_casing(key, "fn::toJSON", diags);
            let args = parse_expr(value, diags);
            return Some(Expr::ToJson(meta, Box::new(args)));
        }
        "fn::tobase64" => {
            check_casing(key, "fn::toBase64", diags);
            let args = parse_expr(value, diags);
            return Some(Expr::ToBase64(meta, Box::new(args)));
        }
        "fn::frombase64" => {
            check_casing(key, "fn::fromBase64", diags);
            let args = parse_expr(value, diags);
            return Some(Expr::FromBase64(meta, Box::new(args)));
        }
        "fn::select" => {
            check_casing(key, "fn::select", diags);
            let args = parse_expr(value, diags);
            return Some(parse_select(args, meta, diags));
        }
        "fn::split" => {
            check_casing(key, "fn::split", diags);
            let args = parse_expr(value, diags);
            return Some(parse_split(args, meta, diags));
        }
        "fn::assetarchive" => {
            check_casing(key, "fn::assetArchive", diags);
            let args = parse_expr(value, diags);
            return Some(parse_asset_archive(args, meta, diags));
        }
        "fn::secret" => {
            check_casing(key, "fn::secret", diags);
            let args = parse_expr(value, diags);
            return Some(Expr::Secret(meta, Box::new(args)));
        }
        "fn::readfile" => {
            check_casing(key, "fn::readFile", diags);
            let args = parse_expr(value, diags);
            return Some(Expr::ReadFile(meta, Box::new(args)));
        }
        _ => {}
    }

    if is_invoke_shorthand(key) {
        let fn_token = &key[4..];
        return Some(parse_invoke_shorthand(fn_token, value, meta, diags));
    }

    if lower.starts_with("fn::") {
        diags.warning(
            None,
            "'fn::' is a reserved prefix",
            format!("unrecognized builtin function '{}'", key),
        );
    }

    None
}

/// Checks if a key matches the fn::pkg:module(:name)? invoke shorthand pattern.
fn is_invoke_shorthand(key: &str) -> bool {
    let lower = key.to_lowercase();
    if !lower.starts_with("fn::") {
        return false;
    }
    let rest = &lower[4..];
    let colon_count = rest.chars().filter(|&c| c == ':').count();
    if !(1..=2).contains(&colon_count) {
        return false;
    }
    rest.split(':').all(|s| !s.is_empty())
}

fn check_casing(found: &str, expected: &str, diags: &mut Diagnostics) {
    if let Some(diag) = unexpected_casing(None, expected, found) {
        diags.add(diag);
    }
}

fn parse_invoke(args: Expr<'static>, meta: ExprMeta, diags: &mut Diagnostics) -> Expr<'static> {
    let entries = match args {
        Expr::Object(_, entries) => entries,
        _ => {
            diags.error(
                None,
                "the argument to fn::invoke must be an object containing 'function', 'arguments', 'options', and 'return'",
                "",
            );
            return args;
        }
    };

    let mut token: Option<Cow<'static, str>> = None;
    let mut call_args: Option<Expr<'static>> = None;
    let mut return_: Option<Cow<'static, str>> = None;
    let mut opts = InvokeOptions::default();

    for entry in &entries {
        if let Some(key_str) = entry.key.as_str() {
            match key_str.to_lowercase().as_str() {
                "function" => {
                    token = entry.value.as_str().map(|s| Cow::Owned(s.to_string()));
                }
                "arguments" => {
                    call_args = Some((*entry.value).clone());
                }
                "return" => {
                    return_ = entry.value.as_str().map(|s| Cow::Owned(s.to_string()));
                }
                "options" => {
                    if let Expr::Object(_, ref opt_entries) = *entry.value {
                        for opt_entry in opt_entries {
                            if let Some(opt_key) = opt_entry.key.as_str() {
                                match opt_key.to_lowercase().as_str() {
                                    "parent" => {
                                        opts.parent = Some(Box::new((*opt_entry.value).clone()))
                                    }
                                    "provider" => {
                                        opts.provider = Some(Box::new((*opt_entry.value).clone()))
                                    }
                                    "dependson" => {
                                        opts.depends_on = Some(Box::new((*opt_entry.value).clone()))
                                    }
                                    "version" => {
                                        opts.version = opt_entry
                                            .value
                                            .as_str()
                                            .map(|s| Cow::Owned(s.to_string()))
                                    }
                                    "plugindownloadurl" => {
                                        opts.plugin_download_url = opt_entry
                                            .value
                                            .as_str()
                                            .map(|s| Cow::Owned(s.to_string()))
                                    }
                                    _ => {}
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    let token = match token {
        Some(t) => t,
        None => {
            diags.error(None, "missing function name ('function')", "");
            return Expr::Object(meta, entries);
        }
    };

    Expr::Invoke(
        meta,
        InvokeExpr {
            token,
            call_args: call_args.map(Box::new),
            call_opts: opts,
            return_,
        },
    )
}

/// Parses `fn::stackReference: { stackName, propertyName }` (Open Question D).
fn parse_stack_reference(
    args: Expr<'static>,
    meta: ExprMeta,
    diags: &mut Diagnostics,
) -> Expr<'static> {
    let entries = match args {
        Expr::Object(_, entries) => entries,
        // A bare string is sugar for `{ stackName: <string> }`.
        Expr::String(_, _) => {
            return Expr::StackReference(
                meta,
                StackReferenceExpr {
                    stack_name: Box::new(args),
                    property_name: None,
                },
            );
        }
        other => {
            diags.error(
                None,
                "the argument to fn::stackReference must be an object containing 'stackName' and optionally 'propertyName'",
                "",
            );
            return other;
        }
    };

    let mut stack_name: Option<Expr<'static>> = None;
    let mut property_name: Option<Expr<'static>> = None;

    for entry in &entries {
        if let Some(key_str) = entry.key.as_str() {
            match key_str.to_lowercase().as_str() {
                "stackname" => stack_name = Some((*entry.value).clone()),
                "propertyname" => property_name = Some((*entry.value).clone()),
                _ => {}
            }
        }
    }

    let stack_name = match stack_name {
        Some(s) => s,
        None => {
            diags.error(None, "missing 'stackName' for fn::stackReference", "");
            return Expr::Object(meta, entries);
        }
    };

    Expr::StackReference(
        meta,
        StackReferenceExpr {
            stack_name: Box::new(stack_name),
            property_name: property_name.map(Box::new),
        },
    )
}

fn parse_invoke_shorthand(
    fn_token: &str,
    value: &serde_yaml::Value,
    meta: ExprMeta,
    diags: &mut Diagnostics,
) -> Expr<'static> {
    let call_args = if value.is_mapping() {
        Some(Box::new(parse_expr(value, diags)))
    } else {
        None
    };

    Expr::Invoke(
        meta,
        InvokeExpr {
            token: Cow::Owned(fn_token.to_string()),
            call_args,
            call_opts: InvokeOptions::default(),
            return_: None,
        },
    )
}

fn parse_join(args: Expr<'static>, meta: ExprMeta, diags: &mut Diagnostics) -> Expr<'static> {
    match args {
        Expr::List(_, elements) if elements.len() == 2 => {
            let mut iter = elements.into_iter();
            let delimiter = iter.next().unwrap();
            let values = iter.next().unwrap();
            Expr::Join(meta, Box::new(delimiter), Box::new(values))
        }
        _ => {
            diags.error(
                None,
                "the argument to fn::join must be a two-valued list",
                "",
            );
            args
        }
    }
}

fn parse_select(args: Expr<'static>, meta: ExprMeta, diags: &mut Diagnostics) -> Expr<'static> {
    match args {
        Expr::List(_, elements) if elements.len() == 2 => {
            let mut iter = elements.into_iter();
            let index = iter.next().unwrap();
            let values = iter.next().unwrap();
            Expr::Select(meta, Box::new(index), Box::new(values))
        }
        _ => {
            diags.error(
                None,
                "the argument to fn::select must be a two-valued list",
                "",
            );
            args
        }
    }
}

fn parse_split(args: Expr<'static>, meta: ExprMeta, diags: &mut Diagnostics) -> Expr<'static> {
    match args {
        Expr::List(_, elements) if elements.len() == 2 => {
            let mut iter = elements.into_iter();
            let delimiter = iter.next().unwrap();
            let source = iter.next().unwrap();
            Expr::Split(meta, Box::new(delimiter), Box::new(source))
        }
        _ => {
            diags.error(
                None,
                "The argument to fn::split must be a two-values list",
                "",
            );
            args
        }
    }
}

fn parse_asset_archive(
    args: Expr<'static>,
    meta: ExprMeta,
    diags: &mut Diagnostics,
) -> Expr<'static> {
    match args {
        Expr::Object(_, entries) => {
            let mut assets: Vec<(Cow<'static, str>, Expr<'static>)> = Vec::new();
            for entry in entries {
                let key = match entry.key.as_str() {
                    Some(s) => Cow::Owned(s.to_string()),
                    None => {
                        diags.error(
                            None,
                            "keys in fn::assetArchive arguments must be string literals",
                            "",
                        );
                        continue;
                    }
                };
                if !entry.value.is_asset_or_archive() {
                    diags.error(None, "value must be an asset or an archive", "");
                }
                assets.push((key, *entry.value));
            }
            Expr::AssetArchive(meta, assets)
        }
        _ => {
            diags.error(
                None,
                "the argument to fn::assetArchive must be an object",
                "",
            );
            args
        }
    }
}

// --- Template-level parsing helpers ---

fn parse_pulumi_decl(value: &serde_yaml::Value, diags: &mut Diagnostics) -> PulumiDecl<'static> {
    let mut decl = PulumiDecl::default();
    if let Some(map) = value.as_mapping() {
        for (k, v) in map {
            if let Some(key) = k.as_str() {
                if key.to_lowercase() == "requiredversion" {
                    decl.required_version = Some(parse_expr(v, diags));
                }
            }
        }
    }
    decl
}

fn parse_config_map(
    value: &serde_yaml::Value,
    diags: &mut Diagnostics,
) -> Vec<ConfigEntry<'static>> {
    let map = match value.as_mapping() {
        Some(m) => m,
        None => {
            diags.error(None, "config must be an object", "");
            return Vec::new();
        }
    };

    let mut entries = Vec::with_capacity(map.len());
    for (k, v) in map {
        let key = match k.as_str() {
            Some(s) => s,
            None => continue,
        };
        let param = if v.is_mapping() {
            parse_config_param(v, diags)
        } else {
            ConfigParamDecl {
                value: Some(parse_expr(v, diags)),
                ..Default::default()
            }
        };
        entries.push(ConfigEntry {
            meta: ExprMeta::no_span(),
            key: Cow::Owned(key.to_string()),
            param,
        });
    }
    entries
}

fn parse_config_param(
    value: &serde_yaml::Value,
    diags: &mut Diagnostics,
) -> ConfigParamDecl<'static> {
    let mut param = ConfigParamDecl::default();
    if let Some(map) = value.as_mapping() {
        for (k, v) in map {
            if let Some(key) = k.as_str() {
                match key.to_lowercase().as_str() {
                    "type" => {
                        if let Some(s) = v.as_str() {
                            if crate::config_types::ConfigType::parse(s).is_none() {
                                diags.error(
                                    None,
                                    format!("unknown config type '{}'", s),
                                    "",
                                );
                            }
                            param.type_ = Some(Cow::Owned(s.to_string()));
                        }
                    }
                    "name" => param.name = v.as_str().map(|s| Cow::Owned(s.to_string())),
                    "secret" => param.secret = v.as_bool(),
                    "default" => param.default = Some(parse_expr(v, diags)),
                    "value" => param.value = Some(parse_expr(v, diags)),
                    "items" => {
                        param.items = Some(Box::new(parse_config_param(v, diags)));
                    }
                    _ => {}
                }
            }
        }
    }
    param
}

fn parse_variables_map(
    value: &serde_yaml::Value,
    diags: &mut Diagnostics,
) -> Vec<VariableEntry<'static>> {
    let map = match value.as_mapping() {
        Some(m) => m,
        None => {
            diags.error(None, "variables must be an object", "");
            return Vec::new();
        }
    };

    let mut entries = Vec::with_capacity(map.len());
    for (k, v) in map {
        let key = match k.as_str() {
            Some(s) => s,
            None => continue,
        };
        entries.push(VariableEntry {
            meta: ExprMeta::no_span(),
            key: Cow::Owned(key.to_string()),
            value: parse_expr(v, diags),
        });
    }
    entries
}

fn parse_resources_map(
    value: &serde_yaml::Value,
    diags: &mut Diagnostics,
) -> Vec<ResourceEntry<'static>> {
    let map = match value.as_mapping() {
        Some(m) => m,
        None => {
            diags.error(None, "resources must be an object", "");
            return Vec::new();
        }
    };

    let mut entries = Vec::with_capacity(map.len());
    for (k, v) in map {
        let key = match k.as_str() {
            Some(s) => s,
            None => continue,
        };
        let resource = parse_resource_decl(v, diags);
        entries.push(ResourceEntry {
            meta: ExprMeta::no_span(),
            logical_name: Cow::Owned(key.to_string()),
            resource,
        });
    }
    entries
}

fn parse_resource_decl(
    value: &serde_yaml::Value,
    diags: &mut Diagnostics,
) -> ResourceDecl<'static> {
    let node = crate::codec::decode_value_plain(value);
    let mut binder = match ObjectBinder::new(&node) {
        Some(b) => b,
        None => {
            diags.error(None, "resource must be an object", "");
            return ResourceDecl {
                type_: Cow::Owned(String::new()),
                name: None,
                default_provider: None,
                properties: ResourceProperties::default(),
                options: ResourceOptionsDecl::default(),
                get: None,
            };
        }
    };

    let type_ = match binder.take("type") {
        Some(n) => match n.as_str() {
            Some(s) => Cow::Owned(s.to_string()),
            None => {
                type_mismatch(diags, binder.span(), "type", "string");
                Cow::Owned(String::new())
            }
        },
        None => {
            diags.error(binder.span(), "resource is missing required field 'type'", "");
            Cow::Owned(String::new())
        }
    };
    let name = binder.take("name").and_then(Node::as_str).map(|s| Cow::Owned(s.to_string()));
    let default_provider = binder.take("defaultProvider").and_then(|n| match &n.value {
        Value::Bool(b) => Some(*b),
        _ => None,
    });
    let properties = match binder.take("properties") {
        Some(n) => {
            if let Some(entries) = n.as_object() {
                let props: Vec<PropertyEntry<'static>> = entries
                    .iter()
                    .filter_map(|(pk, pv)| {
                        let pk_str = pk.as_str()?;
                        Some(PropertyEntry {
                            key: Cow::Owned(pk_str.to_string()),
                            value: parse_expr(&crate::codec::node_to_serde_value(pv), diags),
                        })
                    })
                    .collect();
                ResourceProperties::Map(props)
            } else {
                ResourceProperties::Expr(Box::new(parse_expr(
                    &crate::codec::node_to_serde_value(n),
                    diags,
                )))
            }
        }
        None => ResourceProperties::default(),
    };
    let options = match binder.take("options") {
        Some(n) => parse_resource_options(&crate::codec::node_to_serde_value(n), diags),
        None => ResourceOptionsDecl::default(),
    };
    let get = binder
        .take("get")
        .map(|n| parse_get_resource(&crate::codec::node_to_serde_value(n), diags));

    binder.finish("resource", diags);

    ResourceDecl {
        type_,
        name,
        default_provider,
        properties,
        options,
        get,
    }
}

fn parse_resource_options(
    value: &serde_yaml::Value,
    diags: &mut Diagnostics,
) -> ResourceOptionsDecl<'static> {
    let mut opts = ResourceOptionsDecl::default();
    let node = crate::codec::decode_value_plain(value);
    let mut binder = match ObjectBinder::new(&node) {
        Some(b) => b,
        None => return opts,
    };

    if let Some(n) = binder.take("aliases") {
        opts.aliases = Some(parse_expr(&crate::codec::node_to_serde_value(n), diags));
    }
    if let Some(n) = binder.take("customTimeouts") {
        opts.custom_timeouts = Some(parse_custom_timeouts(&crate::codec::node_to_serde_value(n)));
    }
    if let Some(n) = binder.take("deleteBeforeReplace") {
        opts.delete_before_replace = match &n.value {
            Value::Bool(b) => Some(*b),
            _ => None,
        };
    }
    if let Some(n) = binder.take("dependsOn") {
        opts.depends_on = Some(parse_expr(&crate::codec::node_to_serde_value(n), diags));
    }
    if let Some(n) = binder.take("ignoreChanges") {
        opts.ignore_changes = parse_string_list_owned(&crate::codec::node_to_serde_value(n));
    }
    if let Some(n) = binder.take("parent") {
        opts.parent = Some(parse_expr(&crate::codec::node_to_serde_value(n), diags));
    }
    if let Some(n) = binder.take("protect") {
        opts.protect = Some(parse_expr(&crate::codec::node_to_serde_value(n), diags));
    }
    if let Some(n) = binder.take("provider") {
        opts.provider = Some(parse_expr(&crate::codec::node_to_serde_value(n), diags));
    }
    if let Some(n) = binder.take("providers") {
        opts.providers = Some(parse_expr(&crate::codec::node_to_serde_value(n), diags));
    }
    if let Some(n) = binder.take("version") {
        opts.version = n.as_str().map(|s| Cow::Owned(s.to_string()));
    }
    if let Some(n) = binder.take("pluginDownloadURL") {
        opts.plugin_download_url = n.as_str().map(|s| Cow::Owned(s.to_string()));
    }
    if let Some(n) = binder.take("deletedWith") {
        opts.deleted_with = Some(parse_expr(&crate::codec::node_to_serde_value(n), diags));
    }

    binder.finish("resourceOptions", diags);
    opts
}

fn parse_custom_timeouts(value: &serde_yaml::Value) -> CustomTimeoutsDecl<'static> {
    let mut ct = CustomTimeoutsDecl::default();
    if let Some(map) = value.as_mapping() {
        for (k, v) in map {
            if let Some(key) = k.as_str() {
                match key.to_lowercase().as_str() {
                    "create" => ct.create = v.as_str().map(|s| Cow::Owned(s.to_string())),
                    "update" => ct.update = v.as_str().map(|s| Cow::Owned(s.to_string())),
                    "delete" => ct.delete = v.as_str().map(|s| Cow::Owned(s.to_string())),
                    _ => {}
                }
            }
        }
    }
    ct
}

fn parse_get_resource(
    value: &serde_yaml::Value,
    diags: &mut Diagnostics,
) -> GetResourceDecl<'static> {
    let map = match value.as_mapping() {
        Some(m) => m,
        None => {
            diags.error(None, "get must be an object", "");
            return GetResourceDecl {
                id: Expr::Null(ExprMeta::no_span()),
                state: Vec::new(),
            };
        }
    };

    let mut id = Expr::Null(ExprMeta::no_span());
    let mut state = Vec::new();

    for (k, v) in map {
        let key = match k.as_str() {
            Some(s) => s,
            None => continue,
        };
        match key.to_lowercase().as_str() {
            "id" => id = parse_expr(v, diags),
            "state" => {
                if let Some(m) = v.as_mapping() {
                    state = m
                        .iter()
                        .filter_map(|(sk, sv)| {
                            let sk_str = sk.as_str()?;
                            Some(PropertyEntry {
                                key: Cow::Owned(sk_str.to_string()),
                                value: parse_expr(sv, diags),
                            })
                        })
                        .collect();
                }
            }
            _ => {}
        }
    }

    GetResourceDecl { id, state }
}

fn parse_outputs_map(
    value: &serde_yaml::Value,
    diags: &mut Diagnostics,
) -> Vec<OutputEntry<'static>> {
    let map = match value.as_mapping() {
        Some(m) => m,
        None => {
            diags.error(None, "outputs must be an object", "");
            return Vec::new();
        }
    };

    let mut entries = Vec::with_capacity(map.len());
    for (k, v) in map {
        let key = match k.as_str() {
            Some(s) => s,
            None => continue,
        };
        entries.push(OutputEntry {
            key: Cow::Owned(key.to_string()),
            value: parse_expr(v, diags),
        });
    }
    entries
}

fn parse_string_list_owned(value: &serde_yaml::Value) -> Option<Vec<Cow<'static, str>>> {
    let seq = value.as_sequence()?;
    let list: Vec<Cow<'static, str>> = seq
        .iter()
        .filter_map(|v| v.as_str().map(|s| Cow::Owned(s.to_string())))
        .collect();
    Some(list)
}
