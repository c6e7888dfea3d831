//! The typed Program Intermediate Representation (spec §3, "PIR").
//!
//! PIR parallels the Template AST but is expression-oriented and
//! schema-aware: tokens are canonicalized, symbols are resolved to legal
//! unique identifiers, and types carry a nominal placeholder derived from
//! schema lookups. A PIR program is built once per import and is read-only
//! afterward (§3 Lifecycle).

use std::collections::HashMap;

use crate::config_types::ConfigType;

/// A complete imported program: one block per declaration, in the
/// topologically sorted emission order established by `core::graph`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub items: Vec<Item>,
}

impl Program {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }
}

/// A single top-level PIR declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Config(ConfigBlock),
    /// A bare variable binding — `Attribute { name, value }` in spec's words.
    Attribute(Attribute),
    StackReference(StackReferenceBlock),
    Resource(ResourceBlock),
    Output(OutputBlock),
}

/// `ConfigBlock { name, type-label, attributes }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigBlock {
    pub identifier: String,
    pub logical_name: String,
    pub type_: ConfigType,
    pub default: Option<PirExpr>,
    pub secret: bool,
    /// Nominal type placeholder (spec §3), redundant with `type_` here
    /// since config declarations are the one place the template AST
    /// states a type directly.
    pub var_type: PirType,
}

/// A bare variable binding: `identifier = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub identifier: String,
    pub logical_name: String,
    pub value: PirExpr,
    /// Nominal type placeholder inferred structurally from `value`
    /// (spec §3); `Any` when the value's shape doesn't pin down a type
    /// (e.g. a traversal into another declaration).
    pub var_type: PirType,
}

/// `StackReferenceBlock`: a `fn::stackReference` bound to a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct StackReferenceBlock {
    pub identifier: String,
    pub logical_name: String,
    pub stack_name: PirExpr,
    /// Always `Any`: a remote stack's output type isn't knowable from
    /// this stack's own template or schemas.
    pub var_type: PirType,
}

/// `ResourceBlock { identifier, resolved-token, attributes, options-block }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceBlock {
    pub identifier: String,
    pub logical_name: String,
    /// Canonical token, e.g. `aws:s3/bucket:Bucket`.
    pub token: String,
    pub properties: Vec<(String, PirExpr)>,
    pub options: ResourceOptionsBlock,
    pub get: Option<GetResourceBlock>,
}

/// A `get:` import-existing-resource block, carried through to PIR.
#[derive(Debug, Clone, PartialEq)]
pub struct GetResourceBlock {
    pub id: PirExpr,
    pub state: Vec<(String, PirExpr)>,
}

/// Resource options, lowered 1:1 from `ResourceOptionsDecl`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceOptionsBlock {
    pub depends_on: Option<PirExpr>,
    pub parent: Option<PirExpr>,
    pub provider: Option<PirExpr>,
    pub providers: Option<PirExpr>,
    pub protect: Option<PirExpr>,
    pub ignore_changes: Vec<String>,
    pub deleted_with: Option<PirExpr>,
    pub aliases: Option<PirExpr>,
    pub version: Option<String>,
    pub plugin_download_url: Option<String>,
    pub delete_before_replace: Option<bool>,
    pub custom_timeouts: Option<CustomTimeoutsBlock>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomTimeoutsBlock {
    pub create: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
}

/// `OutputBlock { identifier, attributes = {__logicalName, value} }`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputBlock {
    pub identifier: String,
    pub logical_name: String,
    pub value: PirExpr,
    /// Nominal type placeholder inferred structurally from `value`.
    pub var_type: PirType,
}

/// PIR's expression sum (§3): parallels `ast::Expr` but with resolved
/// variable references, token-qualified function calls, and no
/// syntax-level forms like interpolation escapes.
#[derive(Debug, Clone, PartialEq)]
pub enum PirExpr {
    /// A literal null/bool/number/string value.
    Literal(LiteralValue),
    /// A template of alternating literal text and sub-expressions;
    /// collapses to a single string at generation time when possible.
    Template(Vec<TemplatePart>),
    /// A reference to a declaration's PIR identifier, with a (possibly
    /// empty) further traversal.
    ScopeTraversal {
        root: String,
        traversal: Vec<Traversal>,
    },
    /// A traversal relative to an implicit root (e.g. inside a `for`
    /// comprehension) — unused by the importer today, carried for
    /// generator completeness per spec's PIR expression list.
    RelativeTraversal { traversal: Vec<Traversal> },
    FunctionCall { name: String, args: Vec<PirExpr> },
    Index { collection: Box<PirExpr>, key: Box<PirExpr> },
    Tuple(Vec<PirExpr>),
    Object(Vec<(String, PirExpr)>),
    /// A bare reference to another declaration's PIR identifier with no
    /// traversal at all (the common case: `${otherVar}`).
    VariableReference(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Literal(String),
    Expr(PirExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Traversal {
    Name(String),
    StringIndex(String),
    IntIndex(i64),
}

/// A nominal type placeholder attached to an imported PIR variable — not a
/// full type system, just enough to drive generator decisions (e.g.
/// whether an object key should emit as a plain string literal).
#[derive(Debug, Clone, PartialEq)]
pub enum PirType {
    String,
    Number,
    Boolean,
    Object(HashMap<String, PirType>),
    List(Box<PirType>),
    Any,
}
