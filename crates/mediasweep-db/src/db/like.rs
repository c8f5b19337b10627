//! LIKE pattern helpers.
//!
//! MySQL's default LIKE escape character is the backslash.

/// Escape `%`, `_` and `\` so the value matches literally inside a LIKE pattern.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Pattern matching any value that contains `value`.
pub fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like(value))
}
