//! Record Binder (spec component 3): projects a Syntax Tree `Object` node
//! into a typed template-AST record by matching keys to fields,
//! case-insensitively on the first letter, accumulating diagnostics rather
//! than stopping at the first mismatch.
//!
//! Per spec §9's design note, this is a hand-written binder rather than a
//! runtime-reflective one: each record type in `ast::template`/`ast::expr`
//! owns a small `bind` function built on top of [`ObjectBinder`], matching
//! the per-field manual dispatch style already used throughout
//! `ast::parse`.

use crate::diag::Diagnostics;
use crate::syntax::{Node, Span};
use std::collections::HashSet;

/// Matches `field` against an object key using the binder's case rule:
/// the first letter may differ in case, the rest must match exactly.
/// This mirrors Pulumi YAML's tolerance of both `Name` and `name`.
pub fn field_matches(field: &str, key: &str) -> bool {
    if field.len() != key.len() {
        return false;
    }
    let mut fc = field.chars();
    let mut kc = key.chars();
    match (fc.next(), kc.next()) {
        (Some(f0), Some(k0)) if f0.eq_ignore_ascii_case(&k0) => {}
        _ => return false,
    }
    fc.eq(kc)
}

/// A helper for binding a Syntax Tree object node field-by-field.
///
/// Construction borrows the object's `(key, value)` pairs; each call to
/// [`ObjectBinder::take`] consumes the matching entry (if any) and tracks
/// which keys were recognized, so that [`ObjectBinder::finish`] can warn
/// about every key nobody claimed.
pub struct ObjectBinder<'a, 'src> {
    entries: &'a [(Node<'src>, Node<'src>)],
    claimed: HashSet<usize>,
    span: Option<Span>,
}

impl<'a, 'src> ObjectBinder<'a, 'src> {
    pub fn new(node: &'a Node<'src>) -> Option<Self> {
        let entries = node.as_object()?;
        Some(Self {
            entries,
            claimed: HashSet::new(),
            span: node.syntax.span,
        })
    }

    /// Finds and claims the first unclaimed entry whose key matches `field`
    /// (case-insensitive on the first letter). Returns the value node.
    pub fn take(&mut self, field: &str) -> Option<&'a Node<'src>> {
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if self.claimed.contains(&i) {
                continue;
            }
            if let Some(key_str) = k.as_str() {
                if field_matches(field, key_str) {
                    self.claimed.insert(i);
                    return Some(v);
                }
            }
        }
        None
    }

    /// Emits one warning per entry nobody claimed, citing the unrecognized
    /// key's own span.
    pub fn finish(self, record_name: &str, diags: &mut Diagnostics) {
        for (i, (k, _)) in self.entries.iter().enumerate() {
            if self.claimed.contains(&i) {
                continue;
            }
            let key_str = k.as_str().unwrap_or("<non-string key>");
            diags.warning(
                k.syntax.span.or(self.span),
                format!("unrecognized field '{}' on {}", key_str, record_name),
                "",
            );
        }
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }
}

/// Reports a binding error: "field F must be a <kind>".
pub fn type_mismatch(diags: &mut Diagnostics, span: Option<Span>, field: &str, expected_kind: &str) {
    diags.error(span, format!("field '{}' must be a {}", field, expected_kind), "");
}
