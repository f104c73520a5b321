//! Line-oriented grammar for the persisted environment file.
//!
//! The file is shell-sourceable: comment lines, blank lines, optional
//! `export ` prefixes, `KEY=VALUE` pairs with quoted values. Parsing
//! is tolerant (unknown keys pass through, junk lines are skipped) so
//! hand-edited files keep loading.

use std::collections::HashMap;

/// Parse file content into a key/value map.
///
/// Grammar rules, per line:
/// - blank lines and `#` comments are skipped
/// - one `export ` prefix is stripped
/// - the line splits on the first `=` only; lines without `=` are skipped
/// - key and value are whitespace-trimmed
/// - one layer of matching surrounding quotes is stripped from the value
/// - inside double quotes, one layer of `\\` / `\"` escapes is decoded
///
/// Later occurrences of a key overwrite earlier ones.
pub fn parse(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = match line.strip_prefix("export ") {
            Some(rest) => rest.trim(),
            None => line,
        };
        let (key, value) = match line.split_once('=') {
            Some(kv) => kv,
            None => continue,
        };
        let value = value.trim();
        let (inner, double_quoted) = strip_quotes(value);
        let value = if double_quoted {
            unescape(inner)
        } else {
            inner.to_string()
        };
        vars.insert(key.trim().to_string(), value);
    }
    vars
}

/// Escape a value for embedding in double quotes: `\` then `"`.
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Strip one layer of matching surrounding quotes. Returns the inner
/// slice and whether the quotes were double quotes (which carry
/// escapes; single quotes are literal).
fn strip_quotes(value: &str) -> (&str, bool) {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if first == bytes[bytes.len() - 1] && (first == b'"' || first == b'\'') {
            return (&value[1..value.len() - 1], first == b'"');
        }
    }
    (value, false)
}

/// Decode one layer of backslash escapes. Only `\\` and `\"` are
/// escape sequences; any other backslash passes through untouched.
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
