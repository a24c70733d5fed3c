//! Airtable filter formula builder.
//!
//! The store has no parameterized filters, so values are escaped before
//! being placed inside a single-quoted formula string literal.

use super::errors::DomainError;

/// Escape `value` for use inside a single-quoted formula string.
///
/// Control characters are rejected: names are pre-generated slugs, so a
/// newline or NUL means the caller passed something it should not have.
pub fn escape_string_literal(value: &str) -> Result<String, DomainError> {
    if let Some(c) = value.chars().find(|c| c.is_control()) {
        return Err(DomainError::InvalidFilter(format!(
            "control character {:?} in {:?}",
            c, value
        )));
    }
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// `{field} = 'value'`
pub fn field_equals(field: &str, value: &str) -> Result<String, DomainError> {
    Ok(format!("{{{}}} = '{}'", field, escape_string_literal(value)?))
}
