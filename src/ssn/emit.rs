// src/ssn/emit.rs

//! Quoting and formatting rules for emitting a `synchronous_standby_names`
//! value.

/// A name matching this pattern can be emitted verbatim; anything else must
/// be double-quoted with internal `"` doubled.
fn is_safe_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Quotes a single member name per the emit rule: verbatim if it is a safe
/// identifier, otherwise double-quoted with `"` escaped as `""`.
pub fn quote_ident(name: &str) -> String {
    if is_safe_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Formats a requested synchronous standby count and an ordered list of
/// (already-quoted) names into the scalar or `N (...)` form.
///
/// `supports_multiple_sync` gates the multi-name `N (...)` form; when false
/// (or when there's only one name) the bare name/count applies.
pub fn format_ssn(quoted_names: &[String], requested_count: u32, supports_multiple_sync: bool) -> String {
    if quoted_names.is_empty() {
        return String::new();
    }

    if supports_multiple_sync && quoted_names.len() > 1 {
        format!("{} ({})", requested_count, quoted_names.join(","))
    } else {
        quoted_names[0].clone()
    }
}
