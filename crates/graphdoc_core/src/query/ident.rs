//! Identifier validation.
//!
//! Field names and sort tokens end up inside statement text (as JSON
//! paths), so they are restricted to `[A-Za-z0-9_.]` before they get
//! anywhere near the engine. Dots address nested fields.

use crate::error::{CoreError, CoreResult};

fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// A field path is one or more non-empty dot-separated segments.
fn is_field_path(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(is_field_char)
        && name.split('.').all(|segment| !segment.is_empty())
}

/// Validates a field name used as a filter key.
///
/// # Errors
///
/// Returns [`CoreError::InvalidFieldName`] if the name is empty, has a
/// character outside `[A-Za-z0-9_.]`, or has an empty path segment
/// (`a..b`, `.a`, `a.`).
pub fn validate_field(name: &str) -> CoreResult<()> {
    if !is_field_path(name) {
        return Err(CoreError::invalid_field_name(name));
    }
    Ok(())
}

/// Validates a sort token: a field name with an optional leading `-`.
///
/// Returns the field name and whether the order is descending.
///
/// # Errors
///
/// Returns [`CoreError::InvalidFieldName`] if the field part is invalid.
pub fn parse_sort(token: &str) -> CoreResult<(&str, bool)> {
    let (field, descending) = match token.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (token, false),
    };
    if !is_field_path(field) {
        return Err(CoreError::invalid_field_name(token));
    }
    Ok((field, descending))
}

/// Validates the physical table name. Dots are not allowed here.
pub(crate) fn validate_table_name(name: &str) -> CoreResult<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(CoreError::configuration(format!(
            "invalid table name {name:?}"
        )));
    }
    Ok(())
}

/// Returns the JSON path addressing a validated field.
pub(crate) fn json_path(field: &str) -> String {
    format!("$.{field}")
}
