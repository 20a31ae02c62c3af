//! Key-path codec.
//!
//! A key path is a dot-separated string addressing a nested field within a
//! JSON document, e.g. `"a.b.c"`. A trailing dot produces one empty segment
//! that is dropped before traversal or construction. No segment-level
//! escaping exists — a literal `.` cannot appear inside a key.

use serde_json::Value;

use crate::error::KeyPathError;

/// Split a key path into segments, dropping a single trailing empty
/// segment produced by a trailing dot.
///
/// Fails with [`KeyPathError::Empty`] when nothing usable remains — an
/// empty string, a bare `"."`, or only empty segments.
fn segments(key_path: &str) -> Result<Vec<&str>, KeyPathError> {
    let mut segs: Vec<&str> = key_path.split('.').collect();
    if segs.last() == Some(&"") {
        segs.pop();
    }
    if segs.is_empty() || segs.iter().all(|s| s.is_empty()) {
        return Err(KeyPathError::Empty);
    }
    Ok(segs)
}

/// Resolve a dotted key path against a JSON document.
///
/// Walks the document one segment per level using object field access and
/// returns a reference to the leaf value. Every step is checked: an absent
/// field or a non-object intermediate yields
/// [`KeyPathError::NotFound`] naming the segment that failed, never a
/// panic.
///
/// # Errors
///
/// - [`KeyPathError::Empty`] for an empty key path.
/// - [`KeyPathError::NotFound`] when any segment fails to resolve.
pub fn resolve<'a>(document: &'a Value, key_path: &str) -> Result<&'a Value, KeyPathError> {
    let segs = segments(key_path)?;

    let mut current = document;
    for seg in segs {
        current = current.get(seg).ok_or_else(|| KeyPathError::NotFound {
            path: key_path.to_owned(),
            segment: seg.to_owned(),
        })?;
    }
    Ok(current)
}

/// Build a single-leaf nested object from a key path and a value.
///
/// Each segment but the last becomes a nested single-key object; the last
/// segment holds `value`. The result has exactly one populated leaf and
/// intermediate containers only along that path, making it suitable as a
/// merge-patch payload:
///
/// ```
/// # use serde_json::json;
/// let patch = framegate_core::keypath::build_patch("a.b.c", json!("x")).unwrap();
/// assert_eq!(patch, json!({"a": {"b": {"c": "x"}}}));
/// ```
///
/// # Errors
///
/// Returns [`KeyPathError::Empty`] for an empty key path.
pub fn build_patch(key_path: &str, value: Value) -> Result<Value, KeyPathError> {
    let segs = segments(key_path)?;

    let mut patch = value;
    for seg in segs.iter().rev() {
        let mut obj = serde_json::Map::with_capacity(1);
        obj.insert((*seg).to_owned(), patch);
        patch = Value::Object(obj);
    }
    Ok(patch)
}
