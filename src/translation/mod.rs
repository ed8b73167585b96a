use std::borrow::Cow;

mod parsers;
mod scanner;

use parsers::{
    is_block_comment_end, is_block_comment_start, is_line_comment_start, matches_tag,
    try_start_dollar_quote,
};
use scanner::{State, scan_digits};

/// Target placeholder style for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQL Server (tiberius) placeholders like `@P1`.
    Mssql,
}

impl PlaceholderStyle {
    fn prefix(self) -> &'static str {
        match self {
            PlaceholderStyle::Postgres => "$",
            PlaceholderStyle::Mssql => "@P",
        }
    }
}

/// Rewrite the portable `?` placeholder into the backend's native form.
///
/// A bare `?` takes the next ordinal (`?`, `?` becomes `$1`, `$2`); `?N` keeps
/// its explicit ordinal. Placeholders inside quoted strings, quoted
/// identifiers, comments, `[bracketed]` identifiers (SQL Server) and
/// dollar-quoted blocks (`PostgreSQL`) are left alone. Native placeholders
/// (`$1`, `@P1`) pass through untouched.
///
/// ```rust
/// use sql_facade::translation::{PlaceholderStyle, translate_placeholders};
///
/// let sql = "UPDATE t SET v = ? WHERE id = ?";
/// assert_eq!(
///     translate_placeholders(sql, PlaceholderStyle::Mssql),
///     "UPDATE t SET v = @P1 WHERE id = @P2"
/// );
/// ```
///
/// Returns a borrowed `Cow` when no changes are needed.
#[must_use]
pub fn translate_placeholders(sql: &str, target: PlaceholderStyle) -> Cow<'_, str> {
    let bytes = sql.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut next_ordinal = 0usize;
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'[' if target == PlaceholderStyle::Mssql => state = State::Bracketed,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' if target == PlaceholderStyle::Postgres => {
                    if let Some((tag, close)) = try_start_dollar_quote(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        idx = close;
                    }
                }
                b'?' => {
                    let (end, ordinal) = if let Some((end, digits)) = scan_digits(bytes, idx + 1) {
                        (end, digits.to_string())
                    } else {
                        next_ordinal += 1;
                        (idx + 1, next_ordinal.to_string())
                    };
                    let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
                    buf.push_str(&sql[copied..idx]);
                    buf.push_str(target.prefix());
                    buf.push_str(&ordinal);
                    copied = end;
                    idx = end;
                    continue;
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
            State::DollarQuoted(ref tag) => {
                if b == b'$' && matches_tag(bytes, idx, tag) {
                    idx += tag.len() + 1;
                    state = State::Normal;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_bare_placeholders_in_order() {
        let sql = "UPDATE t SET v=? WHERE id=?";
        assert_eq!(
            translate_placeholders(sql, PlaceholderStyle::Postgres),
            "UPDATE t SET v=$1 WHERE id=$2"
        );
        assert_eq!(
            translate_placeholders(sql, PlaceholderStyle::Mssql),
            "UPDATE t SET v=@P1 WHERE id=@P2"
        );
    }

    #[test]
    fn keeps_explicit_ordinals() {
        let sql = "select * from t where a = ?2 and b = ?1";
        assert_eq!(
            translate_placeholders(sql, PlaceholderStyle::Postgres),
            "select * from t where a = $2 and b = $1"
        );
    }

    #[test]
    fn rewrites_synthesized_exec() {
        let sql = "exec add_user @name=?, @age=?";
        assert_eq!(
            translate_placeholders(sql, PlaceholderStyle::Mssql),
            "exec add_user @name=@P1, @age=@P2"
        );
    }

    #[test]
    fn skips_inside_literals_and_comments() {
        let sql = "select '?', ? -- ?\n/* ? /* ? */ ? */ from t where a = ?";
        assert_eq!(
            translate_placeholders(sql, PlaceholderStyle::Postgres),
            "select '?', $1 -- ?\n/* ? /* ? */ ? */ from t where a = $2"
        );
    }

    #[test]
    fn slash_star_slash_does_not_close_a_comment() {
        let sql = "select /*/ ? */ ?";
        assert_eq!(
            translate_placeholders(sql, PlaceholderStyle::Postgres),
            "select /*/ ? */ $1"
        );
    }

    #[test]
    fn skips_bracketed_identifiers_for_mssql() {
        let sql = "select [what?] from t where a = ?";
        assert_eq!(
            translate_placeholders(sql, PlaceholderStyle::Mssql),
            "select [what?] from t where a = @P1"
        );
    }

    #[test]
    fn skips_dollar_quoted_blocks_for_postgres() {
        let sql = "select $fn$ ? $fn$, ?";
        assert_eq!(
            translate_placeholders(sql, PlaceholderStyle::Postgres),
            "select $fn$ ? $fn$, $1"
        );
    }

    #[test]
    fn preserves_non_ascii_text() {
        let sql = "insert into t(name, note) values (?, 'café ?')";
        assert_eq!(
            translate_placeholders(sql, PlaceholderStyle::Postgres),
            "insert into t(name, note) values ($1, 'café ?')"
        );
    }

    #[test]
    fn borrows_when_nothing_changes() {
        let sql = "select $1, @P1";
        assert!(matches!(
            translate_placeholders(sql, PlaceholderStyle::Postgres),
            Cow::Borrowed(_)
        ));
    }
}
