//! Builds an in-memory [`SchemaLoader`](pulumi_rs_yaml_core::schema::SchemaLoader)
//! from already-fetched provider schema JSON.
//!
//! Fetching schema bytes (registry download, local plugin cache, gRPC to a
//! language host, ...) is the embedding host's job; this crate only turns
//! bytes the host already has in hand into something `core::importer` can
//! query.

use pulumi_rs_yaml_core::schema::{parse_schema_json, SchemaError, SchemaStore};

/// Parses one provider's schema JSON and inserts it into `store`.
///
/// Returns the package name on success so a caller building up a store from
/// several packages can report progress without re-parsing.
pub fn load_package_schema(store: &mut SchemaStore, json_bytes: &[u8]) -> Result<String, SchemaError> {
    let schema = parse_schema_json(json_bytes)?;
    let name = schema.name.clone();
    store.insert(schema);
    Ok(name)
}

/// Builds a [`SchemaStore`] from a set of provider schema JSON blobs.
///
/// A blob that fails to parse is reported as an error string alongside its
/// index rather than aborting the whole batch, since one bad provider
/// schema shouldn't block importing templates that never reference it.
pub fn build_schema_store<'a>(
    package_jsons: impl IntoIterator<Item = &'a [u8]>,
) -> (SchemaStore, Vec<String>) {
    let mut store = SchemaStore::new();
    let mut errors = Vec::new();

    for (index, json_bytes) in package_jsons.into_iter().enumerate() {
        if let Err(err) = load_package_schema(&mut store, json_bytes) {
            errors.push(format!("schema blob {index}: {err}"));
        }
    }

    (store, errors)
}
