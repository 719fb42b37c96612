// src/process/utils.rs

/// Drop every literal `"` from both ends.
///
/// Inner quotes and whitespace are left alone.
pub fn strip_quotes(raw: &str) -> &str {
    raw.trim_matches('"')
}

/// True when every field is the empty string (including a row with no fields).
pub fn is_blank_row<S: AsRef<str>>(fields: &[S]) -> bool {
    fields.iter().all(|f| f.as_ref().is_empty())
}
