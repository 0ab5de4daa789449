use super::types::ServerConfig;
use std::fs;
use std::path::Path;

impl ServerConfig {
    /// Load configuration from a TOML file
    ///
    /// Note: Environment overrides are applied separately via `apply_env_overrides()`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let mut config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        config.finalize()?;

        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults. Environment
    /// overrides are applied in both cases.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            log::warn!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Self::default()
        };
        config.apply_env_overrides()?;
        config.finalize()?;
        Ok(config)
    }

    /// Normalize settings and validate configuration.
    ///
    /// Call this after applying environment overrides.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        let prefix = self.server.api_prefix.trim().trim_end_matches('/');
        self.server.api_prefix = if prefix.starts_with('/') || prefix.is_empty() {
            prefix.to_string()
        } else {
            format!("/{}", prefix)
        };
        self.logging.level = self.logging.level.to_lowercase();
        self.tenancy.header = self.tenancy.header.trim().to_lowercase();

        self.validate()?;

        Ok(())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        let valid_formats = ["compact", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_formats.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !valid_levels.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    valid_levels.join(", ")
                ));
            }
        }

        if self.auth.http_auth_enabled
            && (self.auth.username.trim().is_empty() || self.auth.password.is_empty())
        {
            return Err(anyhow::anyhow!(
                "auth.http_auth_enabled requires a non-empty username and password"
            ));
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(anyhow::anyhow!(
                "auth.bcrypt_cost must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            ));
        }

        if self.auth.cookie_name.trim().is_empty() {
            return Err(anyhow::anyhow!("auth.cookie_name cannot be empty"));
        }

        if self.files.max_size_bytes == 0 {
            return Err(anyhow::anyhow!("files.max_size_bytes cannot be 0"));
        }

        if self.limits.max_result_rows == 0 {
            return Err(anyhow::anyhow!("limits.max_result_rows cannot be 0"));
        }

        if self.predictors.max_training_rows == 0 {
            return Err(anyhow::anyhow!("predictors.max_training_rows cannot be 0"));
        }

        if self.tenancy.header.is_empty() {
            return Err(anyhow::anyhow!("tenancy.header cannot be empty"));
        }

        if self.tenancy.default_tenant.trim().is_empty() {
            return Err(anyhow::anyhow!("tenancy.default_tenant cannot be empty"));
        }

        Ok(())
    }
}
