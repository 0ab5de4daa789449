use super::types::ServerConfig;
use std::env;

fn parse_bool(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

impl ServerConfig {
    /// Apply `FEDSQL_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(host) = env::var("FEDSQL_SERVER_HOST") {
            self.server.host = host;
        }

        if let Ok(port_str) = env::var("FEDSQL_SERVER_PORT") {
            self.server.port = port_str
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid FEDSQL_SERVER_PORT value: {}", port_str))?;
        }

        if let Ok(level) = env::var("FEDSQL_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(path) = env::var("FEDSQL_LOGS_PATH") {
            self.logging.logs_path = path;
        }

        if let Ok(val) = env::var("FEDSQL_LOG_TO_CONSOLE") {
            self.logging.log_to_console = parse_bool(&val);
        }

        if let Ok(val) = env::var("FEDSQL_HTTP_AUTH_ENABLED") {
            self.auth.http_auth_enabled = parse_bool(&val);
        }

        if let Ok(username) = env::var("FEDSQL_USERNAME") {
            self.auth.username = username;
        }

        if let Ok(password) = env::var("FEDSQL_PASSWORD") {
            self.auth.password = password;
        }

        if let Ok(header) = env::var("FEDSQL_TENANT_HEADER") {
            self.tenancy.header = header;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_variants() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(parse_bool("yes"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("nope"));
    }
}
