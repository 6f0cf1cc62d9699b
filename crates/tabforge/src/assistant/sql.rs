//! Extraction and vetting of SQL from model responses.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::{Result, TabforgeError};

/// A ```sql fenced block; the body is captured lazily up to the first fence.
static FENCED_SQL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```sql[ \t]*\r?\n(.*?)```").unwrap());

/// Statements that write data or change schema or permissions.
static WRITE_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(INSERT|UPDATE|DELETE|MERGE|UPSERT|DROP|ALTER|CREATE|TRUNCATE|GRANT|REVOKE",
        r"|COPY|CALL|EXEC|EXECUTE|ATTACH|VACUUM|INTO)\b",
    ))
    .unwrap()
});

/// Statement heads accepted as read-only.
const READ_ONLY_HEADS: &[&str] = &["select", "with", "show", "describe", "desc", "explain"];

/// Pull the first ```sql fenced block out of a model response.
pub fn extract_sql(response: &str) -> Option<String> {
    FENCED_SQL
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|sql| !sql.is_empty())
}

/// Blank out string literals, quoted identifiers, dollar-quoted bodies and
/// comments so keywords inside them are not matched.
///
/// Anything left open at the end of the input is an error.
fn strip_literals(sql: &str) -> Result<String> {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let end = match bytes[i] {
            b'\'' => closing_quote(bytes, i, is_escape_string(bytes, i)),
            b'"' => closing_quote(bytes, i, false),
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                Some(sql[i..].find('\n').map_or(sql.len(), |n| i + n))
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => block_comment_end(bytes, i),
            b'$' => match dollar_tag(sql, i) {
                Some(tag) => {
                    let body = i + tag.len();
                    sql[body..].find(tag).map(|n| body + n + tag.len())
                }
                None => {
                    i += 1;
                    continue;
                }
            },
            _ => {
                i += 1;
                continue;
            }
        };

        let end = end.ok_or_else(|| {
            TabforgeError::UnsafeSql("unterminated literal or comment".to_string())
        })?;
        out.push_str(&sql[start..i]);
        out.push(' ');
        i = end;
        start = end;
    }

    out.push_str(&sql[start..]);
    Ok(out)
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Whether the quote at `open` starts an `E'...'` string, where backslash escapes apply.
fn is_escape_string(bytes: &[u8], open: usize) -> bool {
    open > 0
        && matches!(bytes[open - 1], b'E' | b'e')
        && (open < 2 || !is_identifier_byte(bytes[open - 2]))
}

/// Index just past the quote closing the one at `open`; doubled quotes are escapes.
fn closing_quote(bytes: &[u8], open: usize, backslash_escapes: bool) -> Option<usize> {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        if backslash_escapes && bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

/// Index just past the `*/` closing the comment at `open`; comments nest.
fn block_comment_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'*') => {
                depth += 1;
                i += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => i += 1,
        }
    }
    None
}

/// The `$tag$` opener starting at `at`, if there is one.
///
/// `$1` placeholders and `$` inside identifiers do not open a literal.
fn dollar_tag(sql: &str, at: usize) -> Option<&str> {
    let bytes = sql.as_bytes();
    if at > 0 && is_identifier_byte(bytes[at - 1]) {
        return None;
    }
    if bytes.get(at + 1).is_some_and(u8::is_ascii_digit) {
        return None;
    }

    let mut end = at + 1;
    while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
        end += 1;
    }
    (bytes.get(end) == Some(&b'$')).then(|| &sql[at..=end])
}

/// Read-only guard applied before a generated query reaches the warehouse.
#[derive(Debug, Clone, Default)]
pub struct SqlGuard;

impl SqlGuard {
    pub fn new() -> Self {
        Self
    }

    /// Accept a single read-only statement, reject everything else.
    pub fn check(&self, sql: &str) -> Result<()> {
        let stripped = strip_literals(sql)?;
        let body = stripped.trim().trim_end_matches(';').trim_end();

        if body.is_empty() {
            return Err(TabforgeError::UnsafeSql("empty statement".to_string()));
        }

        if body.contains(';') {
            warn!("Rejected SQL with multiple statements");
            return Err(TabforgeError::UnsafeSql(
                "multiple statements are not allowed".to_string(),
            ));
        }

        if let Some(keyword) = WRITE_KEYWORDS.find(body) {
            let keyword = keyword.as_str().to_uppercase();
            warn!(keyword = %keyword, "Rejected SQL with write keyword");
            return Err(TabforgeError::UnsafeSql(format!(
                "{} statements are not allowed",
                keyword
            )));
        }

        let head = body
            .split(|c: char| c.is_whitespace() || c == '(')
            .find(|word| !word.is_empty())
            .unwrap_or_default()
            .to_lowercase();
        if !READ_ONLY_HEADS.contains(&head.as_str()) {
            return Err(TabforgeError::UnsafeSql(format!(
                "statement must start with SELECT or WITH, found '{}'",
                head
            )));
        }

        Ok(())
    }

    /// Extract the query from a response and vet it.
    ///
    /// Returns `Ok(None)` when the response carries no SQL block.
    pub fn vet_response(&self, response: &str) -> Result<Option<String>> {
        match extract_sql(response) {
            Some(sql) => {
                self.check(&sql)?;
                Ok(Some(sql))
            }
            None => Ok(None),
        }
    }
}
