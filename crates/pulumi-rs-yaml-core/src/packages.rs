use std::collections::HashMap;

use crate::ast::expr::Expr;
use crate::ast::template::*;

/// A package declaration from a lock file or from resource/invoke references.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDecl {
    #[serde(default)]
    pub package_declaration_version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameterization: Option<ParameterizationDecl>,
}

/// Parameterization values for a package.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParameterizationDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Base64-encoded value.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

/// A package dependency extracted from a template.
#[derive(Debug, Clone)]
pub struct PackageDependency {
    pub name: String,
    pub version: String,
    pub download_url: String,
    pub parameterization: Option<ParameterizationDecl>,
}

/// Extracts the package name from a type token.
///
/// Examples:
/// - `"aws:s3:Bucket"` → `"aws"`
/// - `"kubernetes:core:Service"` → `"kubernetes"`
/// - `"pulumi:providers:aws"` → `"aws"`
pub fn resolve_pkg_name(type_string: &str) -> &str {
    let parts: Vec<&str> = type_string.split(':').collect();

    // pulumi:providers:aws → package is "aws"
    if parts.len() == 3 && parts[0] == "pulumi" && parts[1] == "providers" {
        return parts[2];
    }

    parts[0]
}

/// Gets all referenced packages from a template by scanning resource types and invoke tokens.
///
/// Returns a sorted, de-duplicated list of package dependencies.
pub fn get_referenced_packages(
    template: &TemplateDecl<'_>,
    lock_packages: &[PackageDecl],
) -> Vec<PackageDependency> {
    let mut package_map: HashMap<String, PackageDependency> = HashMap::new();

    // Start with lock file packages
    for pkg in lock_packages {
        let effective_name = if let Some(ref param) = pkg.parameterization {
            param.name.clone()
        } else {
            pkg.name.clone()
        };
        let effective_version = if let Some(ref param) = pkg.parameterization {
            param.version.clone()
        } else {
            pkg.version.clone()
        };

        package_map
            .entry(effective_name.clone())
            .and_modify(|existing| {
                if existing.version.is_empty() {
                    existing.version = effective_version.clone();
                }
                if existing.download_url.is_empty() {
                    existing.download_url = pkg.download_url.clone();
                }
            })
            .or_insert_with(|| PackageDependency {
                name: pkg.name.clone(),
                version: effective_version,
                download_url: pkg.download_url.clone(),
                parameterization: pkg.parameterization.clone(),
            });
    }

    // Scan resources
    for entry in &template.resources {
        let type_token = entry.resource.type_.as_ref();
        let pkg_name = resolve_pkg_name(type_token).to_string();
        let version = entry
            .resource
            .options
            .version
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();
        let download_url = entry
            .resource
            .options
            .plugin_download_url
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();

        accept_package(&mut package_map, &pkg_name, &version, &download_url);
    }

    // Scan invoke expressions in variables
    for entry in &template.variables {
        scan_expr_for_invokes(&entry.value, &mut package_map);
    }

    // Scan invoke expressions in resource properties
    for entry in &template.resources {
        match &entry.resource.properties {
            ResourceProperties::Map(props) => {
                for prop in props {
                    scan_expr_for_invokes(&prop.value, &mut package_map);
                }
            }
            ResourceProperties::Expr(expr) => {
                scan_expr_for_invokes(expr, &mut package_map);
            }
        }
    }

    // Scan outputs
    for output in &template.outputs {
        scan_expr_for_invokes(&output.value, &mut package_map);
    }

    // Remove the built-in "pulumi" package
    package_map.remove("pulumi");

    // Sort deterministically
    let mut packages: Vec<PackageDependency> = package_map.into_values().collect();
    packages.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.version.cmp(&b.version))
            .then_with(|| a.download_url.cmp(&b.download_url))
    });

    packages
}

/// Adds a package to the map, merging version/download_url if already present.
fn accept_package(
    map: &mut HashMap<String, PackageDependency>,
    name: &str,
    version: &str,
    download_url: &str,
) {
    map.entry(name.to_string())
        .and_modify(|existing| {
            if !version.is_empty() && existing.version.is_empty() {
                existing.version = version.to_string();
            }
            if !download_url.is_empty() && existing.download_url.is_empty() {
                existing.download_url = download_url.to_string();
            }
        })
        .or_insert_with(|| PackageDependency {
            name: name.to_string(),
            version: version.to_string(),
            download_url: download_url.to_string(),
            parameterization: None,
        });
}

/// Recursively scans an expression for invoke calls and adds their packages.
fn scan_expr_for_invokes(expr: &Expr<'_>, map: &mut HashMap<String, PackageDependency>) {
    match expr {
        Expr::Invoke(_, invoke) => {
            let token = invoke.token.as_ref();
            let pkg_name = resolve_pkg_name(token).to_string();
            let version = invoke
                .call_opts
                .version
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default();
            let download_url = invoke
                .call_opts
                .plugin_download_url
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default();
            accept_package(map, &pkg_name, &version, &download_url);

            // Also scan invoke arguments
            if let Some(ref args) = invoke.call_args {
                scan_expr_for_invokes(args, map);
            }
        }
        Expr::List(_, elements) => {
            for elem in elements {
                scan_expr_for_invokes(elem, map);
            }
        }
        Expr::Object(_, entries) => {
            for entry in entries {
                scan_expr_for_invokes(&entry.key, map);
                scan_expr_for_invokes(&entry.value, map);
            }
        }
        Expr::Join(_, a, b) | Expr::Select(_, a, b) | Expr::Split(_, a, b) => {
            scan_expr_for_invokes(a, map);
            scan_expr_for_invokes(b, map);
        }
        Expr::ToJson(_, inner)
        | Expr::ToBase64(_, inner)
        | Expr::FromBase64(_, inner)
        | Expr::Secret(_, inner)
        | Expr::ReadFile(_, inner)
        | Expr::StringAsset(_, inner)
        | Expr::FileAsset(_, inner)
        | Expr::RemoteAsset(_, inner)
        | Expr::FileArchive(_, inner)
        | Expr::RemoteArchive(_, inner) => {
            scan_expr_for_invokes(inner, map);
        }
        Expr::AssetArchive(_, entries) => {
            for (_, v) in entries {
                scan_expr_for_invokes(v, map);
            }
        }
        Expr::StackReference(_, sref) => {
            scan_expr_for_invokes(&sref.stack_name, map);
            if let Some(p) = &sref.property_name {
                scan_expr_for_invokes(p, map);
            }
        }
        // Terminals - no invokes
        Expr::Null(_)
        | Expr::Bool(_, _)
        | Expr::Number(_, _)
        | Expr::String(_, _)
        | Expr::Interpolate(_, _)
        | Expr::Symbol(_, _) => {}
    }
}

/// Resolves a type token to its canonical form.
///
/// Tries expansions:
/// 1. Exact match: `"aws:s3:Bucket"`
/// 2. Short form: `"aws:Bucket"` → `"aws:index:Bucket"`
/// 3. Module form: `"aws:s3:Bucket"` → `"aws:s3/bucket:Bucket"`
///
/// Returns the expanded forms to try, in order.
pub fn expand_type_token(type_name: &str) -> Vec<String> {
    let parts: Vec<&str> = type_name.split(':').collect();
    let mut candidates = vec![type_name.to_string()];

    match parts.len() {
        2 => {
            // random:RandomPassword → random:index/randomPassword:RandomPassword
            let lower_camel = to_lower_camel(parts[1]);
            candidates.push(format!("{}:index/{}:{}", parts[0], lower_camel, parts[1]));
        }
        3 => {
            // aws:s3:Bucket → aws:s3/bucket:Bucket
            let lower_camel = to_lower_camel(parts[2]);
            candidates.push(format!(
                "{}:{}/{}:{}",
                parts[0], parts[1], lower_camel, parts[2]
            ));
        }
        _ => {}
    }

    candidates
}

/// Returns the canonical form of a type token for use in resource registration.
///
/// Providers expect type tokens in canonical form with the module path:
/// - `gcp:storage:Bucket` → `gcp:storage/bucket:Bucket`
/// - `aws:s3:Bucket` → `aws:s3/bucket:Bucket`
/// - `aws:Bucket` → `aws:index/bucket:Bucket`
///
/// Types that are already canonical (contain `/` in the module) or are
/// built-in Pulumi types are returned unchanged.
pub fn canonicalize_type_token(type_name: &str) -> String {
    let parts: Vec<&str> = type_name.split(':').collect();

    // Already canonical if module contains '/'
    if parts.len() == 3 && parts[1].contains('/') {
        return type_name.to_string();
    }

    // Don't expand built-in Pulumi types
    if parts.first() == Some(&"pulumi") {
        return type_name.to_string();
    }

    match parts.len() {
        2 => {
            // random:RandomPassword → random:index/randomPassword:RandomPassword
            let lower_camel = to_lower_camel(parts[1]);
            format!("{}:index/{}:{}", parts[0], lower_camel, parts[1])
        }
        3 => {
            // gcp:storage:Bucket → gcp:storage/bucket:Bucket
            let lower_camel = to_lower_camel(parts[2]);
            format!("{}:{}/{}:{}", parts[0], parts[1], lower_camel, parts[2])
        }
        _ => type_name.to_string(),
    }
}

/// Collapses a canonical type token to its shortest display form.
///
/// This is a partial inverse of `canonicalize_type_token()`:
/// - `aws:s3/bucket:Bucket` → `aws:s3:Bucket` (module suffix matches type name)
/// - `foo:index/bar:Bar` → `foo:index:Bar` (index module kept if suffix matches)
/// - `foo:index:Bar` → `foo:Bar` (index module stripped)
/// - `foo::Bar` → `foo:Bar` (empty module stripped)
/// - `fizz:mod:buzz` → `fizz:mod:buzz` (unchanged)
pub fn collapse_type_token(token: &str) -> String {
    let parts: Vec<&str> = token.split(':').collect();

    if parts.len() != 3 {
        return token.to_string();
    }

    let (pkg, module, type_name) = (parts[0], parts[1], parts[2]);

    // Check if module contains '/' (e.g., "s3/bucket")
    if let Some(slash_pos) = module.find('/') {
        let mod_prefix = &module[..slash_pos];
        let mod_suffix = &module[slash_pos + 1..];

        // If title(mod_suffix) == type_name, collapse to pkg:mod_prefix:type_name
        let title_suffix = title_case(mod_suffix);
        if title_suffix == type_name {
            let collapsed_module = mod_prefix;
            // If mod_prefix is "index" or empty, strip it
            if collapsed_module == "index" || collapsed_module.is_empty() {
                return format!("{}:{}", pkg, type_name);
            }
            return format!("{}:{}:{}", pkg, collapsed_module, type_name);
        }
        // Doesn't match, return as-is
        return token.to_string();
    }

    // No slash - check for "index" or empty module
    if module == "index" || module.is_empty() {
        return format!("{}:{}", pkg, type_name);
    }

    token.to_string()
}

/// Title-cases a string (first character uppercase, rest unchanged).
fn title_case(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let mut chars = s.chars();
    let first = chars.next().unwrap();
    let mut result = first.to_uppercase().to_string();
    result.extend(chars);
    result
}

/// Converts a PascalCase name to lowerCamelCase.
pub fn to_lower_camel(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let mut chars = s.chars();
    let first = chars.next().unwrap();
    let mut result = first.to_lowercase().to_string();
    result.extend(chars);
    result
}
