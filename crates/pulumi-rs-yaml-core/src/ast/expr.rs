use crate::ast::interpolation::InterpolationPart;
use crate::ast::property::PropertyAccess;
use crate::syntax::ExprMeta;
use std::borrow::Cow;

/// The core expression AST for Pulumi YAML.
///
/// A closed sum over literals, symbol references, and the builtin `fn::*`
/// forms. Each variant carries an `ExprMeta` for source location tracking.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'src> {
    /// Null literal.
    Null(ExprMeta),
    /// Boolean literal.
    Bool(ExprMeta, bool),
    /// Number literal (f64).
    Number(ExprMeta, f64),
    /// String literal (may be borrowed from source or owned).
    String(ExprMeta, Cow<'src, str>),
    /// Interpolated string containing `${...}` expressions.
    Interpolate(ExprMeta, Vec<InterpolationPart<'src>>),
    /// Symbol reference: a bare `${resource.property}`.
    Symbol(ExprMeta, PropertyAccess<'src>),
    /// List of expressions.
    List(ExprMeta, Vec<Expr<'src>>),
    /// Object with key-value pairs.
    Object(ExprMeta, Vec<ObjectProperty<'src>>),

    // --- Builtin functions ---
    /// `fn::invoke` - invokes a Pulumi function.
    Invoke(ExprMeta, InvokeExpr<'src>),
    /// `fn::stackReference` - resolves an output from another stack.
    ///
    /// Only legal as the entire value of a variable declaration; see
    /// `core::ast::parse`'s binder for the placement check.
    StackReference(ExprMeta, StackReferenceExpr<'src>),
    /// `fn::join` - joins a list with a delimiter.
    Join(ExprMeta, Box<Expr<'src>>, Box<Expr<'src>>),
    /// `fn::select` - selects an element from a list by index.
    Select(ExprMeta, Box<Expr<'src>>, Box<Expr<'src>>),
    /// `fn::split` - splits a string by a delimiter.
    Split(ExprMeta, Box<Expr<'src>>, Box<Expr<'src>>),
    /// `fn::toJSON` - serializes a value to JSON.
    ToJson(ExprMeta, Box<Expr<'src>>),
    /// `fn::toBase64` - encodes a string as base64.
    ToBase64(ExprMeta, Box<Expr<'src>>),
    /// `fn::fromBase64` - decodes a base64 string.
    FromBase64(ExprMeta, Box<Expr<'src>>),
    /// `fn::secret` - marks a value as secret.
    Secret(ExprMeta, Box<Expr<'src>>),
    /// `fn::readFile` - reads a file at the given path.
    ReadFile(ExprMeta, Box<Expr<'src>>),

    // --- Assets and archives ---
    /// `fn::stringAsset` - creates an asset from a string.
    StringAsset(ExprMeta, Box<Expr<'src>>),
    /// `fn::fileAsset` - creates an asset from a file path.
    FileAsset(ExprMeta, Box<Expr<'src>>),
    /// `fn::remoteAsset` - creates an asset from a URL.
    RemoteAsset(ExprMeta, Box<Expr<'src>>),
    /// `fn::fileArchive` - creates an archive from a file path.
    FileArchive(ExprMeta, Box<Expr<'src>>),
    /// `fn::remoteArchive` - creates an archive from a URL.
    RemoteArchive(ExprMeta, Box<Expr<'src>>),
    /// `fn::assetArchive` - creates an archive from a map of assets/archives.
    AssetArchive(ExprMeta, Vec<(Cow<'src, str>, Expr<'src>)>),
}

/// An object property: a key-value pair where the key is an expression (typically a string).
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty<'src> {
    pub key: Box<Expr<'src>>,
    pub value: Box<Expr<'src>>,
}

/// Arguments for `fn::invoke`.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeExpr<'src> {
    /// The function token (e.g. `aws:s3:getBucket`).
    pub token: Cow<'src, str>,
    /// The function arguments (an object expression, or None).
    pub call_args: Option<Box<Expr<'src>>>,
    /// Invoke options.
    pub call_opts: InvokeOptions<'src>,
    /// Return directive (specific output property name).
    pub return_: Option<Cow<'src, str>>,
}

/// Options for `fn::invoke`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvokeOptions<'src> {
    pub parent: Option<Box<Expr<'src>>>,
    pub provider: Option<Box<Expr<'src>>>,
    pub depends_on: Option<Box<Expr<'src>>>,
    pub version: Option<Cow<'src, str>>,
    pub plugin_download_url: Option<Cow<'src, str>>,
}

/// Arguments for `fn::stackReference`.
#[derive(Debug, Clone, PartialEq)]
pub struct StackReferenceExpr<'src> {
    /// The name of the referenced stack.
    pub stack_name: Box<Expr<'src>>,
    /// If present, the output property to project the reference to.
    pub property_name: Option<Box<Expr<'src>>>,
}

impl Expr<'_> {
    /// Returns the metadata (span info) for this expression.
    pub fn meta(&self) -> &ExprMeta {
        match self {
            Expr::Null(m)
            | Expr::Bool(m, _)
            | Expr::Number(m, _)
            | Expr::String(m, _)
            | Expr::Interpolate(m, _)
            | Expr::Symbol(m, _)
            | Expr::List(m, _)
            | Expr::Object(m, _)
            | Expr::Invoke(m, _)
            | Expr::StackReference(m, _)
            | Expr::Join(m, _, _)
            | Expr::Select(m, _, _)
            | Expr::Split(m, _, _)
            | Expr::ToJson(m, _)
            | Expr::ToBase64(m, _)
            | Expr::FromBase64(m, _)
            | Expr::Secret(m, _)
            | Expr::ReadFile(m, _)
            | Expr::StringAsset(m, _)
            | Expr::FileAsset(m, _)
            | Expr::RemoteAsset(m, _)
            | Expr::FileArchive(m, _)
            | Expr::RemoteArchive(m, _)
            | Expr::AssetArchive(m, _) => m,
        }
    }

    /// Returns true if this expression is a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::String(_, s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Returns true if this is a symbol expression.
    pub fn is_symbol(&self) -> bool {
        matches!(self, Expr::Symbol(_, _))
    }

    /// Returns true if this is an asset or archive expression.
    pub fn is_asset_or_archive(&self) -> bool {
        matches!(
            self,
            Expr::StringAsset(_, _)
                | Expr::FileAsset(_, _)
                | Expr::RemoteAsset(_, _)
                | Expr::FileArchive(_, _)
                | Expr::RemoteArchive(_, _)
                | Expr::AssetArchive(_, _)
        )
    }
}
