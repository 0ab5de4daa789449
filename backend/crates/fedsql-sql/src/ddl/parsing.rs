//! Common DDL parsing utilities
//!
//! Small quote-aware scanners shared by the gateway statement parsers. They
//! operate on the original text so identifier casing and string contents
//! survive untouched.

use crate::ddl::DdlResult;

/// Normalize SQL and convert to uppercase for pattern matching
///
/// Removes extra whitespace, trailing semicolons, and converts to uppercase.
pub fn normalize_and_upper(sql: &str) -> String {
    let trimmed = trim_statement(sql);
    let mut result = String::with_capacity(trimmed.len());
    let mut prev_was_space = false;

    for c in trimmed.chars() {
        if c.is_whitespace() {
            if !prev_was_space && !result.is_empty() {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_space = false;
        }
    }

    if result.ends_with(' ') {
        result.pop();
    }

    result
}

/// Strip surrounding whitespace and any trailing semicolons.
pub fn trim_statement(sql: &str) -> &str {
    let mut s = sql.trim();
    while let Some(stripped) = s.strip_suffix(';') {
        s = stripped.trim_end();
    }
    s
}

/// Split off the leading run of identifier characters.
pub fn next_word(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    (&s[..end], &s[end..])
}

/// Consume `keyword` (case-insensitive, whole word) at the start of `s`.
pub fn strip_keyword<'a>(s: &'a str, keyword: &str) -> Option<&'a str> {
    let (word, rest) = next_word(s.trim_start());
    if !word.is_empty() && word.eq_ignore_ascii_case(keyword) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Consume a sequence of keywords, all or nothing.
pub fn strip_keywords<'a>(s: &'a str, keywords: &[&str]) -> Option<&'a str> {
    keywords
        .iter()
        .try_fold(s, |acc, keyword| strip_keyword(acc, keyword))
}

/// Consume a single punctuation character if present.
pub fn strip_char(s: &str, c: char) -> Option<&str> {
    s.trim_start().strip_prefix(c).map(str::trim_start)
}

/// Remove one layer of identifier or string quotes.
pub fn unquote(s: &str) -> String {
    let s = s.trim();
    for q in ['`', '"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            let doubled = format!("{q}{q}");
            return s[1..s.len() - 1].replace(&doubled, &q.to_string());
        }
    }
    s.to_string()
}

/// Read a quoted token starting at the first char of `s`. Returns the
/// unquoted content and the remainder.
fn take_quoted(s: &str) -> DdlResult<(String, &str)> {
    let mut chars = s.char_indices();
    let quote = match chars.next() {
        Some((_, q)) => q,
        None => return Err("Unexpected end of statement".to_string()),
    };
    let mut content = String::new();
    let mut escaped = false;
    let mut iter = chars.peekable();
    while let Some((idx, c)) = iter.next() {
        if escaped {
            content.push(c);
            escaped = false;
            continue;
        }
        if c == '\\' && quote != '`' {
            escaped = true;
            continue;
        }
        if c == quote {
            if let Some(&(_, next)) = iter.peek() {
                if next == quote {
                    content.push(quote);
                    iter.next();
                    continue;
                }
            }
            return Ok((content, &s[idx + c.len_utf8()..]));
        }
        content.push(c);
    }
    Err(format!("Unterminated quoted text starting with {}", quote))
}

/// Read a possibly qualified, possibly quoted name such as
/// `mindsdb.my_model` or `` `files`.`my table` ``.
pub fn take_name(s: &str) -> DdlResult<(Vec<String>, &str)> {
    let mut rest = s.trim_start();
    let mut parts = Vec::new();
    loop {
        let (part, after) = match rest.chars().next() {
            Some('`') | Some('"') => take_quoted(rest)?,
            Some(_) => {
                let end = rest
                    .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '-'))
                    .unwrap_or(rest.len());
                (rest[..end].to_string(), &rest[end..])
            }
            None => return Err("Expected a name".to_string()),
        };
        if part.is_empty() {
            return Err("Expected a name".to_string());
        }
        parts.push(part);
        match after.strip_prefix('.') {
            Some(next) => rest = next,
            None => return Ok((parts, after)),
        }
    }
}

/// Read a single quoted string or bare word, e.g. the `'postgres'` in
/// `ENGINE = 'postgres'`.
pub fn take_string_or_word(s: &str) -> DdlResult<(String, &str)> {
    let s = s.trim_start();
    match s.chars().next() {
        Some('\'') | Some('"') | Some('`') => take_quoted(s),
        Some(_) => {
            let (word, rest) = next_word(s);
            if word.is_empty() {
                Err(format!("Expected a value near '{}'", preview(s)))
            } else {
                Ok((word.to_string(), rest))
            }
        }
        None => Err("Unexpected end of statement".to_string()),
    }
}

/// Find the byte index of the bracket closing the one at `open_idx`,
/// skipping over quoted text.
pub fn find_matching_bracket(s: &str, open_idx: usize) -> Option<usize> {
    let open = s[open_idx..].chars().next()?;
    let close = match open {
        '(' => ')',
        '{' => '}',
        '[' => ']',
        _ => return None,
    };
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, c) in s[open_idx..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' && q != '`' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(open_idx + idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Read a bracketed block starting at the beginning of `s`. Returns the
/// inner text and the remainder after the closing bracket.
pub fn take_bracketed(s: &str) -> DdlResult<(&str, &str)> {
    let s = s.trim_start();
    let close = find_matching_bracket(s, 0)
        .ok_or_else(|| format!("Unbalanced brackets near '{}'", preview(s)))?;
    Ok((&s[1..close], &s[close + 1..]))
}

/// Parse an optional trailing `LIKE 'pattern'` clause; anything else left
/// over is an error.
pub fn parse_like_tail(rest: &str, statement: &str) -> DdlResult<Option<String>> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok(None);
    }
    if let Some(after) = strip_keyword(rest, "LIKE") {
        let (pattern, tail) = take_string_or_word(after)?;
        ensure_consumed(tail, statement)?;
        return Ok(Some(pattern));
    }
    Err(format!("Unexpected '{}' in {}", preview(rest), statement))
}

/// Error unless only whitespace remains.
pub fn ensure_consumed(rest: &str, statement: &str) -> DdlResult<()> {
    let rest = rest.trim();
    if rest.is_empty() {
        Ok(())
    } else {
        Err(format!("Unexpected '{}' in {}", preview(rest), statement))
    }
}

fn preview(s: &str) -> String {
    s.chars().take(32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_and_upper() {
        assert_eq!(normalize_and_upper("  show\n\tdatabases ;; "), "SHOW DATABASES");
    }

    #[test]
    fn test_strip_keywords_requires_whole_words() {
        assert_eq!(strip_keywords("create  database pg", &["CREATE", "DATABASE"]), Some("pg"));
        assert_eq!(strip_keyword("databases", "DATABASE"), None);
        assert_eq!(strip_keywords("create table x", &["CREATE", "DATABASE"]), None);
    }

    #[test]
    fn test_take_name_handles_quotes_and_qualifiers() {
        let (parts, rest) = take_name("mindsdb.`my model` FROM x").unwrap();
        assert_eq!(parts, vec!["mindsdb".to_string(), "my model".to_string()]);
        assert_eq!(rest, " FROM x");

        let (parts, _) = take_name("\"PG\"").unwrap();
        assert_eq!(parts, vec!["PG".to_string()]);

        assert!(take_name("   ").is_err());
    }

    #[test]
    fn test_matching_bracket_skips_quoted_text() {
        let s = "(select ')' from t where a in (1, 2)) rest";
        let close = find_matching_bracket(s, 0).unwrap();
        assert_eq!(&s[close + 1..], " rest");

        let json = r#"{"password": "a}b", "nested": {"x": 1}} tail"#;
        let (inner, tail) = take_bracketed(json).unwrap();
        assert!(inner.contains("nested"));
        assert_eq!(tail, " tail");
    }

    #[test]
    fn test_unquote_and_string_or_word() {
        assert_eq!(unquote("`a``b`"), "a`b");
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("plain"), "plain");
        let (value, rest) = take_string_or_word(" 'postgres', PARAMETERS").unwrap();
        assert_eq!(value, "postgres");
        assert_eq!(rest, ", PARAMETERS");
    }
}
