//! Schema loading and storage for provider resource metadata.
//!
//! Parses provider schema JSON to extract per-field type information and
//! aliases for each resource/function type.
//!
//! Used by the importer to resolve aliases/type tokens and to look up
//! per-field type hints during template-to-PIR conversion (see
//! [`SchemaLoader`]).

use std::collections::HashMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Type classification for a schema property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchemaPropertyType {
    String,
    Number,
    Integer,
    Boolean,
    Array(Box<SchemaPropertyType>),
    Object,
    Asset,
    Archive,
    Unknown,
}

/// Type information for a single property in a resource or function schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub type_: SchemaPropertyType,
}

/// Metadata extracted from a provider schema for a single resource type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceTypeInfo {
    /// Resource aliases from the schema.
    pub aliases: Vec<String>,
    /// Typed property metadata (name → type), merged across `properties`
    /// and `inputProperties`.
    pub property_types: HashMap<String, PropertyInfo>,
}

/// Metadata extracted from a provider schema for a single function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionTypeInfo {
    /// Input parameter types.
    pub inputs: HashMap<String, PropertyInfo>,
}

/// Schema metadata for a single provider package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageSchema {
    pub name: String,
    pub version: String,
    pub resources: HashMap<String, ResourceTypeInfo>,
    pub functions: HashMap<String, FunctionTypeInfo>,
}

/// In-memory store of parsed schemas, keyed by package name.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SchemaStore {
    packages: HashMap<String, PackageSchema>,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self {
            packages: HashMap::new(),
        }
    }

    /// Insert a parsed package schema into the store.
    pub fn insert(&mut self, schema: PackageSchema) {
        self.packages.insert(schema.name.clone(), schema);
    }

    /// Whether a schema has been loaded for the token's package prefix.
    pub fn has_package(&self, token: &str) -> bool {
        token
            .split(':')
            .next()
            .is_some_and(|pkg| self.packages.contains_key(pkg))
    }

    /// Look up resource type info by canonical token (e.g. `aws:s3/bucket:Bucket`).
    pub fn lookup_resource(&self, canonical_token: &str) -> Option<&ResourceTypeInfo> {
        // Token format: "pkg:module/type:Type"
        let pkg = canonical_token.split(':').next()?;
        let schema = self.packages.get(pkg)?;
        schema.resources.get(canonical_token)
    }

    /// Look up function type info by canonical token.
    pub fn lookup_function(&self, canonical_token: &str) -> Option<&FunctionTypeInfo> {
        let pkg = canonical_token.split(':').next()?;
        let schema = self.packages.get(pkg)?;
        schema.functions.get(canonical_token)
    }

    /// Resolve a resource token to its canonical form using schema knowledge.
    ///
    /// 1. Direct lookup (already canonical)
    /// 2. Try heuristic canonicalization
    /// 3. Search aliases in matching package
    pub fn resolve_resource_token(&self, token: &str) -> Option<String> {
        // 1. Direct lookup
        if self.lookup_resource(token).is_some() {
            return Some(token.to_string());
        }

        // 2. Try heuristic canonicalization
        let canonical = crate::packages::canonicalize_type_token(token);
        if self.lookup_resource(&canonical).is_some() {
            return Some(canonical);
        }

        // 3. Try all expansions
        let expansions = crate::packages::expand_type_token(token);
        for candidate in &expansions {
            if self.lookup_resource(candidate).is_some() {
                return Some(candidate.clone());
            }
        }

        // 4. Search aliases in matching package
        let pkg_name = token.split(':').next()?;
        if let Some(schema) = self.packages.get(pkg_name) {
            for (canonical_token, info) in &schema.resources {
                for alias in &info.aliases {
                    if alias == token {
                        return Some(canonical_token.clone());
                    }
                    // Also try canonical form of alias
                    let canonical_alias = crate::packages::canonicalize_type_token(alias);
                    if canonical_alias == canonical {
                        return Some(canonical_token.clone());
                    }
                }
            }
        }

        None
    }

    /// Resolve a function token to its canonical form using schema knowledge.
    pub fn resolve_function_token(&self, token: &str) -> Option<String> {
        // 1. Direct lookup
        if self.lookup_function(token).is_some() {
            return Some(token.to_string());
        }

        // 2. Try heuristic canonicalization
        let canonical = crate::packages::canonicalize_type_token(token);
        if self.lookup_function(&canonical).is_some() {
            return Some(canonical);
        }

        // 3. Try all expansions
        let expansions = crate::packages::expand_type_token(token);
        for candidate in &expansions {
            if self.lookup_function(candidate).is_some() {
                return Some(candidate.clone());
            }
        }

        None
    }

    /// Returns all packages in the store.
    pub fn packages(&self) -> &HashMap<String, PackageSchema> {
        &self.packages
    }

    /// Saves the schema store to a JSON file on disk.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json =
            serde_json::to_vec(self).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Loads a schema store from a JSON file on disk.
    pub fn load(path: &Path) -> io::Result<Self> {
        let data = std::fs::read(path)?;
        serde_json::from_slice(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Per-field type information for a resource or function, keyed by
/// property/argument name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeHint {
    pub fields: HashMap<String, SchemaPropertyType>,
}

impl TypeHint {
    pub fn field(&self, name: &str) -> Option<&SchemaPropertyType> {
        self.fields.get(name)
    }
}

/// The narrow external interface the importer depends on (spec §6):
/// resolve a resource/function token to its canonical form, and fetch a
/// per-field type hint for it. Schema *fetching* (gRPC, filesystem, or
/// otherwise) is a host concern outside the core; the only implementation
/// in this workspace is `SchemaStore` itself, built from already-parsed
/// schema JSON.
pub trait SchemaLoader {
    fn resolve_resource(&self, packaged_token: &str, version: Option<&str>) -> Option<String>;
    fn resolve_function(&self, packaged_token: &str, version: Option<&str>) -> Option<String>;
    fn resource_type_hint(&self, canonical_token: &str) -> TypeHint;
    fn function_type_hint(&self, canonical_token: &str) -> TypeHint;
}

impl SchemaLoader for SchemaStore {
    fn resolve_resource(&self, packaged_token: &str, _version: Option<&str>) -> Option<String> {
        match self.resolve_resource_token(packaged_token) {
            Some(resolved) => Some(resolved),
            // No schema loaded for this package at all: nothing to validate
            // against, so pass the token through unchanged rather than
            // failing import outright. A package that *is* loaded but
            // genuinely lacks the resource type is a real resolution error.
            None if !self.has_package(packaged_token) => Some(packaged_token.to_string()),
            None => None,
        }
    }

    fn resolve_function(&self, packaged_token: &str, _version: Option<&str>) -> Option<String> {
        match self.resolve_function_token(packaged_token) {
            Some(resolved) => Some(resolved),
            None if !self.has_package(packaged_token) => Some(packaged_token.to_string()),
            None => None,
        }
    }

    fn resource_type_hint(&self, canonical_token: &str) -> TypeHint {
        let fields = self
            .lookup_resource(canonical_token)
            .map(|info| {
                info.property_types
                    .iter()
                    .map(|(k, v)| (k.clone(), v.type_.clone()))
                    .collect()
            })
            .unwrap_or_default();
        TypeHint { fields }
    }

    fn function_type_hint(&self, canonical_token: &str) -> TypeHint {
        let fields = self
            .lookup_function(canonical_token)
            .map(|info| {
                info.inputs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.type_.clone()))
                    .collect()
            })
            .unwrap_or_default();
        TypeHint { fields }
    }
}

/// Parse a property type from a schema property definition.
fn parse_property_type(prop: &serde_json::Value) -> SchemaPropertyType {
    // Check $ref for asset/archive types
    if let Some(ref_str) = prop.get("$ref").and_then(|v| v.as_str()) {
        if ref_str.contains("Asset") {
            return SchemaPropertyType::Asset;
        }
        if ref_str.contains("Archive") {
            return SchemaPropertyType::Archive;
        }
    }

    match prop.get("type").and_then(|v| v.as_str()) {
        Some("string") => SchemaPropertyType::String,
        Some("number") => SchemaPropertyType::Number,
        Some("integer") => SchemaPropertyType::Integer,
        Some("boolean") => SchemaPropertyType::Boolean,
        Some("array") => {
            let item_type = prop
                .get("items")
                .map(parse_property_type)
                .unwrap_or(SchemaPropertyType::Unknown);
            SchemaPropertyType::Array(Box::new(item_type))
        }
        Some("object") => SchemaPropertyType::Object,
        _ => SchemaPropertyType::Unknown,
    }
}

/// Parse provider schema JSON bytes into a `PackageSchema`.
///
/// Extracts per-field types and aliases for each resource type, and
/// per-field input types for each function. Ignores config and other
/// schema sections not needed for translation.
///
/// JSON structure:
/// ```json
/// {
///   "name": "aws",
///   "version": "6.0.0",
///   "resources": {
///     "aws:s3/bucket:Bucket": {
///       "properties": { "arn": { "type": "string" }, ... },
///       "inputProperties": { "bucketName": { "type": "string" }, ... },
///       "aliases": [ { "type": "aws:s3:Bucket" } ]
///     }
///   }
/// }
/// ```
/// A provider schema blob that can't be turned into a [`PackageSchema`].
///
/// This is host-facing plumbing failure (the bytes handed to the loader
/// are malformed), not a translatable-source problem, so it is a typed
/// `Result` error rather than a [`crate::diag::Diagnostics`] entry.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub fn parse_schema_json(json_bytes: &[u8]) -> Result<PackageSchema, SchemaError> {
    let root: serde_json::Value = serde_json::from_slice(json_bytes)?;

    let name = root
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let version = root
        .get("version")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let mut resources = HashMap::new();

    if let Some(res_map) = root.get("resources").and_then(|v| v.as_object()) {
        for (token, res_def) in res_map {
            let mut info = ResourceTypeInfo::default();

            // Merge properties and inputProperties into one type map; a
            // field present in both keeps whichever definition is seen
            // first (the importer only needs the type, not provenance).
            if let Some(props) = res_def.get("properties").and_then(|v| v.as_object()) {
                for (prop_name, prop_def) in props {
                    info.property_types.insert(
                        prop_name.clone(),
                        PropertyInfo {
                            type_: parse_property_type(prop_def),
                        },
                    );
                }
            }
            if let Some(input_props) = res_def
                .get("inputProperties")
                .and_then(|v| v.as_object())
            {
                for (prop_name, prop_def) in input_props {
                    info.property_types
                        .entry(prop_name.clone())
                        .or_insert_with(|| PropertyInfo {
                            type_: parse_property_type(prop_def),
                        });
                }
            }

            // Parse aliases
            if let Some(aliases_arr) = res_def.get("aliases").and_then(|v| v.as_array()) {
                for alias in aliases_arr {
                    if let Some(alias_type) = alias.get("type").and_then(|v| v.as_str()) {
                        info.aliases.push(alias_type.to_string());
                    }
                }
            }

            resources.insert(token.clone(), info);
        }
    }

    // Parse functions
    let mut functions = HashMap::new();
    if let Some(func_map) = root.get("functions").and_then(|v| v.as_object()) {
        for (token, func_def) in func_map {
            let mut func_info = FunctionTypeInfo::default();

            // Parse inputs
            if let Some(inputs_obj) = func_def.get("inputs").and_then(|v| v.as_object()) {
                if let Some(props) = inputs_obj.get("properties").and_then(|v| v.as_object()) {
                    for (prop_name, prop_def) in props {
                        func_info.inputs.insert(
                            prop_name.clone(),
                            PropertyInfo {
                                type_: parse_property_type(prop_def),
                            },
                        );
                    }
                }
            }

            functions.insert(token.clone(), func_info);
        }
    }

    Ok(PackageSchema {
        name,
        version,
        resources,
        functions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_schema() {
        let json = br#"{
            "name": "aws",
            "version": "6.0.0",
            "resources": {
                "aws:s3/bucket:Bucket": {
                    "properties": {
                        "arn": { "type": "string" },
                        "bucketName": { "type": "string" },
                        "region": { "type": "string" }
                    },
                    "inputProperties": {
                        "bucketName": { "type": "string" },
                        "region": { "type": "string" }
                    }
                }
            }
        }"#;

        let schema = parse_schema_json(json).unwrap();
        assert_eq!(schema.name, "aws");
        assert_eq!(schema.version, "6.0.0");

        let info = schema.resources.get("aws:s3/bucket:Bucket").unwrap();
        assert_eq!(info.property_types.len(), 3);
        assert_eq!(
            info.property_types.get("arn").unwrap().type_,
            SchemaPropertyType::String
        );
    }

    #[test]
    fn test_parse_aliases() {
        let json = br#"{
            "name": "aws",
            "version": "6.0.0",
            "resources": {
                "aws:s3/bucket:Bucket": {
                    "properties": {},
                    "inputProperties": {},
                    "aliases": [
                        { "type": "aws:s3:Bucket" },
                        { "type": "aws:s3/legacy:Bucket" }
                    ]
                }
            }
        }"#;

        let schema = parse_schema_json(json).unwrap();
        let info = schema.resources.get("aws:s3/bucket:Bucket").unwrap();
        assert_eq!(info.aliases.len(), 2);
        assert!(info.aliases.contains(&"aws:s3:Bucket".to_string()));
        assert!(info.aliases.contains(&"aws:s3/legacy:Bucket".to_string()));
    }

    #[test]
    fn test_parse_empty_schema() {
        let json = br#"{}"#;
        let schema = parse_schema_json(json).unwrap();
        assert_eq!(schema.name, "");
        assert_eq!(schema.version, "");
        assert!(schema.resources.is_empty());
    }

    #[test]
    fn test_parse_no_resources() {
        let json = br#"{ "name": "test", "version": "1.0.0" }"#;
        let schema = parse_schema_json(json).unwrap();
        assert_eq!(schema.name, "test");
        assert!(schema.resources.is_empty());
    }

    #[test]
    fn test_parse_malformed_json() {
        let json = b"not valid json";
        let result = parse_schema_json(json);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_store_lookup_hit() {
        let mut store = SchemaStore::new();
        let mut info = ResourceTypeInfo::default();
        info.property_types.insert(
            "arn".to_string(),
            PropertyInfo {
                type_: SchemaPropertyType::String,
            },
        );

        let schema = PackageSchema {
            name: "aws".to_string(),
            version: "6.0.0".to_string(),
            resources: [("aws:s3/bucket:Bucket".to_string(), info)]
                .into_iter()
                .collect(),
            functions: HashMap::new(),
        };
        store.insert(schema);

        let result = store.lookup_resource("aws:s3/bucket:Bucket");
        assert!(result.is_some());
        assert!(result.unwrap().property_types.contains_key("arn"));
    }

    #[test]
    fn test_store_lookup_miss() {
        let store = SchemaStore::new();
        assert!(store.lookup_resource("aws:s3/bucket:Bucket").is_none());
    }

    #[test]
    fn test_store_lookup_wrong_package() {
        let mut store = SchemaStore::new();
        let schema = PackageSchema {
            name: "aws".to_string(),
            version: "6.0.0".to_string(),
            resources: HashMap::new(),
            functions: HashMap::new(),
        };
        store.insert(schema);

        // Package exists but resource doesn't
        assert!(store.lookup_resource("aws:s3/bucket:Bucket").is_none());
        // Different package entirely
        assert!(store.lookup_resource("gcp:storage/bucket:Bucket").is_none());
    }

    #[test]
    fn test_multiple_packages() {
        let mut store = SchemaStore::new();

        let aws_json = br#"{
            "name": "aws",
            "version": "6.0.0",
            "resources": {
                "aws:s3/bucket:Bucket": { "properties": { "arn": { "type": "string" } }, "inputProperties": {} }
            }
        }"#;
        let gcp_json = br#"{
            "name": "gcp",
            "version": "7.0.0",
            "resources": {
                "gcp:storage/bucket:Bucket": { "properties": { "selfLink": { "type": "string" } }, "inputProperties": {} }
            }
        }"#;

        store.insert(parse_schema_json(aws_json).unwrap());
        store.insert(parse_schema_json(gcp_json).unwrap());

        assert!(store.lookup_resource("aws:s3/bucket:Bucket").is_some());
        assert!(store.lookup_resource("gcp:storage/bucket:Bucket").is_some());
        assert!(store
            .lookup_resource("azure:storage/account:Account")
            .is_none());

        assert!(store
            .lookup_resource("aws:s3/bucket:Bucket")
            .unwrap()
            .property_types
            .contains_key("arn"));
        assert!(store
            .lookup_resource("gcp:storage/bucket:Bucket")
            .unwrap()
            .property_types
            .contains_key("selfLink"));
    }

    #[test]
    fn test_property_types_parsed() {
        let json = br#"{
            "name": "test",
            "version": "1.0.0",
            "resources": {
                "test:index/res:Res": {
                    "properties": {
                        "name": { "type": "string" },
                        "count": { "type": "integer" },
                        "enabled": { "type": "boolean" },
                        "tags": { "type": "array", "items": { "type": "string" } },
                        "metadata": { "type": "object" },
                        "score": { "type": "number" }
                    },
                    "inputProperties": {}
                }
            }
        }"#;

        let schema = parse_schema_json(json).unwrap();
        let info = schema.resources.get("test:index/res:Res").unwrap();

        assert_eq!(
            info.property_types.get("name").unwrap().type_,
            SchemaPropertyType::String
        );
        assert_eq!(
            info.property_types.get("count").unwrap().type_,
            SchemaPropertyType::Integer
        );
        assert_eq!(
            info.property_types.get("enabled").unwrap().type_,
            SchemaPropertyType::Boolean
        );
        assert_eq!(
            info.property_types.get("score").unwrap().type_,
            SchemaPropertyType::Number
        );
        assert_eq!(
            info.property_types.get("metadata").unwrap().type_,
            SchemaPropertyType::Object
        );

        match &info.property_types.get("tags").unwrap().type_ {
            SchemaPropertyType::Array(inner) => {
                assert_eq!(**inner, SchemaPropertyType::String);
            }
            other => panic!("expected Array, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_functions() {
        let json = br#"{
            "name": "aws",
            "version": "6.0.0",
            "resources": {},
            "functions": {
                "aws:ec2/getAmi:getAmi": {
                    "inputs": {
                        "properties": {
                            "owners": { "type": "array", "items": { "type": "string" } },
                            "filters": { "type": "array" },
                            "mostRecent": { "type": "boolean" }
                        },
                        "required": ["owners"]
                    },
                    "outputs": {
                        "properties": {
                            "id": { "type": "string" },
                            "imageId": { "type": "string" }
                        }
                    }
                }
            }
        }"#;

        let schema = parse_schema_json(json).unwrap();
        assert!(schema.functions.contains_key("aws:ec2/getAmi:getAmi"));

        let func = schema.functions.get("aws:ec2/getAmi:getAmi").unwrap();
        assert_eq!(func.inputs.len(), 3);
        assert_eq!(
            func.inputs.get("owners").unwrap().type_,
            SchemaPropertyType::Array(Box::new(SchemaPropertyType::String))
        );
    }

    #[test]
    fn test_store_lookup_function() {
        let mut store = SchemaStore::new();
        let json = br#"{
            "name": "aws",
            "version": "6.0.0",
            "resources": {},
            "functions": {
                "aws:ec2/getAmi:getAmi": {
                    "inputs": {
                        "properties": {
                            "owners": { "type": "array", "items": { "type": "string" } }
                        }
                    },
                    "outputs": {
                        "properties": {
                            "id": { "type": "string" }
                        }
                    }
                }
            }
        }"#;
        store.insert(parse_schema_json(json).unwrap());

        assert!(store.lookup_function("aws:ec2/getAmi:getAmi").is_some());
        assert!(store
            .lookup_function("aws:ec2/getMissing:getMissing")
            .is_none());
    }

    #[test]
    fn test_resolve_resource_token_direct() {
        let mut store = SchemaStore::new();
        let json = br#"{
            "name": "aws",
            "version": "6.0.0",
            "resources": {
                "aws:s3/bucket:Bucket": {
                    "properties": {},
                    "inputProperties": {}
                }
            }
        }"#;
        store.insert(parse_schema_json(json).unwrap());

        // Direct canonical lookup
        assert_eq!(
            store.resolve_resource_token("aws:s3/bucket:Bucket"),
            Some("aws:s3/bucket:Bucket".to_string())
        );
    }

    #[test]
    fn test_resolve_resource_token_heuristic() {
        let mut store = SchemaStore::new();
        let json = br#"{
            "name": "aws",
            "version": "6.0.0",
            "resources": {
                "aws:s3/bucket:Bucket": {
                    "properties": {},
                    "inputProperties": {}
                }
            }
        }"#;
        store.insert(parse_schema_json(json).unwrap());

        // Heuristic canonicalization: aws:s3:Bucket → aws:s3/bucket:Bucket
        assert_eq!(
            store.resolve_resource_token("aws:s3:Bucket"),
            Some("aws:s3/bucket:Bucket".to_string())
        );
    }

    #[test]
    fn test_resolve_resource_token_alias() {
        let mut store = SchemaStore::new();
        let json = br#"{
            "name": "aws",
            "version": "6.0.0",
            "resources": {
                "aws:s3/bucketV2:BucketV2": {
                    "properties": {},
                    "inputProperties": {},
                    "aliases": [
                        { "type": "aws:s3:Bucket" }
                    ]
                }
            }
        }"#;
        store.insert(parse_schema_json(json).unwrap());

        // Alias resolution: aws:s3:Bucket is an alias for aws:s3/bucketV2:BucketV2
        assert_eq!(
            store.resolve_resource_token("aws:s3:Bucket"),
            Some("aws:s3/bucketV2:BucketV2".to_string())
        );
    }

    #[test]
    fn test_resolve_resource_token_not_found() {
        let store = SchemaStore::new();
        assert!(store.resolve_resource_token("aws:s3:Bucket").is_none());
    }

    #[test]
    fn test_resolve_function_token_heuristic() {
        let mut store = SchemaStore::new();
        let json = br#"{
            "name": "aws",
            "version": "6.0.0",
            "resources": {},
            "functions": {
                "aws:ec2/getAmi:getAmi": {
                    "inputs": {},
                    "outputs": {}
                }
            }
        }"#;
        store.insert(parse_schema_json(json).unwrap());

        // Heuristic: aws:ec2:getAmi → aws:ec2/getAmi:getAmi
        assert_eq!(
            store.resolve_function_token("aws:ec2:getAmi"),
            Some("aws:ec2/getAmi:getAmi".to_string())
        );
    }

    #[test]
    fn test_property_types_merge_properties_and_input_properties() {
        let json = br#"{
            "name": "test",
            "version": "1.0.0",
            "resources": {
                "test:index/res:Res": {
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" }
                    },
                    "inputProperties": {
                        "name": { "type": "string" },
                        "tags": { "type": "object" }
                    }
                }
            }
        }"#;

        let schema = parse_schema_json(json).unwrap();
        let info = schema.resources.get("test:index/res:Res").unwrap();

        // property_types merges both sections
        assert_eq!(info.property_types.len(), 3);
        assert!(info.property_types.contains_key("id"));
        assert!(info.property_types.contains_key("name"));
        assert!(info.property_types.contains_key("tags"));
    }

    #[test]
    fn test_schema_store_save_load_round_trip() {
        let mut store = SchemaStore::new();
        let json = br#"{
            "name": "aws",
            "version": "6.0.0",
            "resources": {
                "aws:s3/bucket:Bucket": {
                    "properties": {
                        "arn": { "type": "string" }
                    },
                    "inputProperties": {
                        "bucketName": { "type": "string" }
                    }
                }
            }
        }"#;
        store.insert(parse_schema_json(json).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test-cache.json");

        store.save(&path).unwrap();
        let loaded = SchemaStore::load(&path).unwrap();

        assert!(loaded.lookup_resource("aws:s3/bucket:Bucket").is_some());
        let info = loaded.lookup_resource("aws:s3/bucket:Bucket").unwrap();
        assert!(info.property_types.contains_key("arn"));
    }
}
