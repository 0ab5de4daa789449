//! Redaction of secrets in SQL text before it reaches the logs.

use once_cell::sync::Lazy;
use regex::Regex;

const REDACTED: &str = "[REDACTED]";

// "password": "...", 'token' = '...', secret_key: ...
static RE_SECRET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(["']?[a-z_]*(?:password|passwd|secret|token|api_key|access_key)[a-z_]*["']?\s*[:=]\s*)("(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|[^\s,}]+)"#,
    )
    .unwrap()
});

/// Replace values of password-like keys (inside `PARAMETERS = {...}` or
/// `USING` clauses) with `[REDACTED]`.
pub fn redact_sensitive_sql(sql: &str) -> String {
    RE_SECRET
        .replace_all(sql, |caps: &regex::Captures<'_>| {
            format!("{}\"{}\"", &caps[1], REDACTED)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_parameters_password() {
        let sql = r#"CREATE DATABASE pg WITH ENGINE = 'postgres', PARAMETERS = {"user": "postgres", "password": "SuperSecret123!", "port": 5432}"#;
        let redacted = redact_sensitive_sql(sql);
        assert!(!redacted.contains("SuperSecret123"));
        assert!(redacted.contains(REDACTED));
        assert!(redacted.contains(r#""user": "postgres""#));
        assert!(redacted.contains("5432"));
    }

    #[test]
    fn test_redacts_using_tokens() {
        let sql = "CREATE MODEL m FROM f (select 1) PREDICT x USING api_token = 'abc123'";
        let redacted = redact_sensitive_sql(sql);
        assert!(!redacted.contains("abc123"));
    }

    #[test]
    fn test_preserves_safe_queries() {
        let sql = "SELECT * FROM files.users WHERE name = 'alice'";
        assert_eq!(redact_sensitive_sql(sql), sql);
    }
}
