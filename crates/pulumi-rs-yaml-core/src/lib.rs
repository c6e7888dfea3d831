pub mod ast;
pub mod binder;
pub mod codec;
pub mod config_types;
pub mod diag;
pub mod generator;
pub mod graph;
pub mod importer;
pub mod names;
pub mod packages;
pub mod pir;
pub mod schema;
pub mod source;
pub mod syntax;
