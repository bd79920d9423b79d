//! Named-to-positional placeholder translation for T-SQL.
//!
//! Statements are written with named `@name` placeholders, while tiberius binds values
//! positionally as `@P1..@Pn`. [`translate_placeholders`] rewrites each placeholder whose
//! name is bound to the position of that binding. Names that are not bound (local
//! variables, `@@ROWCOUNT`) are left alone.

use std::borrow::Cow;

mod parsers;
mod scanner;

use parsers::{
    follows_identifier, is_block_comment_end, is_block_comment_start, is_line_comment_start,
    is_system_variable,
};
use scanner::{State, scan_identifier};

/// Rewrite `@name` placeholders to `@P{n}`, where `n` is the 1-based position of `@name`
/// in `bound`. Matching ignores ASCII case, as SQL Server does for variable names.
///
/// Warning: placeholders inside string literals, quoted or `[bracketed]` identifiers and
/// comments are skipped by a lightweight state machine; it may still miss edge cases in
/// unusual SQL. Returns a borrowed `Cow` when nothing was rewritten.
///
/// ```rust
/// use fluent_sql::translation::translate_placeholders;
///
/// let sql = "SELECT '@id' AS literal, Id FROM Users WHERE Id = @id AND Name = @name";
/// let out = translate_placeholders(sql, &["@name", "@id"]);
/// assert_eq!(out, "SELECT '@id' AS literal, Id FROM Users WHERE Id = @P2 AND Name = @P1");
/// ```
#[must_use]
pub fn translate_placeholders<'a>(sql: &'a str, bound: &[&str]) -> Cow<'a, str> {
    if bound.is_empty() {
        return Cow::Borrowed(sql);
    }

    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut state = State::Normal;
    let mut idx = 0;
    let bytes = sql.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'[' => state = State::Bracketed,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'@' if is_system_variable(bytes, idx) => {
                    idx = scan_identifier(bytes, idx + 2).unwrap_or(idx + 2) - 1;
                }
                b'@' if !follows_identifier(bytes, idx) => {
                    if let Some(end) = scan_identifier(bytes, idx + 1) {
                        let name = &sql[idx..end];
                        if let Some(pos) = bound.iter().position(|n| n.eq_ignore_ascii_case(name)) {
                            let buf = out.get_or_insert_with(|| String::with_capacity(sql.len()));
                            buf.push_str(&sql[copied..idx]);
                            buf.push_str("@P");
                            buf.push_str(&(pos + 1).to_string());
                            copied = end;
                        }
                        idx = end - 1;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Bracketed => {
                if b == b']' {
                    if bytes.get(idx + 1) == Some(&b']') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}
