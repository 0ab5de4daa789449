use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub files: FileSettings,
    #[serde(default)]
    pub predictors: PredictorSettings,
    #[serde(default)]
    pub limits: LimitsSettings,
    #[serde(default)]
    pub tenancy: TenancySettings,
    #[serde(default)]
    pub security: SecuritySettings,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Prefix for every HTTP endpoint (default: "/api")
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Reported by `GET /api/status`
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
            api_prefix: default_api_prefix(),
            environment: default_environment(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for log files (default: "./logs")
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Optional per-target log level overrides:
    /// [logging.targets]
    /// fedsql_core = "debug"
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            logs_path: default_logs_path(),
            log_to_console: true,
            format: default_log_format(),
            targets: HashMap::new(),
        }
    }
}

/// HTTP authentication settings.
///
/// This is only the initial state; it can be changed at runtime through
/// `PUT /api/config/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub http_auth_enabled: bool,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Mark the session cookie `Secure` (requires HTTPS)
    #[serde(default)]
    pub cookie_secure: bool,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            http_auth_enabled: false,
            username: String::new(),
            password: String::new(),
            session_ttl_hours: default_session_ttl_hours(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

/// Uploaded file table settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default = "default_max_file_size_bytes")]
    pub max_size_bytes: usize,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_file_size_bytes(),
        }
    }
}

/// Predictor training settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorSettings {
    /// Training queries returning more rows are truncated to this many
    #[serde(default = "default_max_training_rows")]
    pub max_training_rows: usize,
    /// Finished training jobs kept for inspection
    #[serde(default = "default_job_history_limit")]
    pub job_history_limit: usize,
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            max_training_rows: default_max_training_rows(),
            job_history_limit: default_job_history_limit(),
        }
    }
}

/// Limits settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsSettings {
    /// Rows beyond this are dropped from a `TABLE` result
    #[serde(default = "default_max_result_rows")]
    pub max_result_rows: usize,
    /// JSON body limit for the SQL and REST endpoints
    #[serde(default = "default_max_request_body_bytes")]
    pub max_request_body_bytes: usize,
}

impl Default for LimitsSettings {
    fn default() -> Self {
        Self {
            max_result_rows: default_max_result_rows(),
            max_request_body_bytes: default_max_request_body_bytes(),
        }
    }
}

/// Tenant isolation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenancySettings {
    /// Request header carrying the tenant identifier
    #[serde(default = "default_tenant_header")]
    pub header: String,
    /// Tenant used when the header is absent
    #[serde(default = "default_tenant")]
    pub default_tenant: String,
}

impl Default for TenancySettings {
    fn default() -> Self {
        Self {
            header: default_tenant_header(),
            default_tenant: default_tenant(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecuritySettings {
    #[serde(default)]
    pub cors: CorsSettings,
}

/// CORS configuration that maps directly to actix-cors options
/// See: https://docs.rs/actix-cors/latest/actix_cors/struct.Cors.html
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins. Empty list = same as ["*"] (allow any origin)
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_cors_methods")]
    pub allowed_methods: Vec<String>,

    /// Use ["*"] for any header.
    #[serde(default = "default_cors_headers")]
    pub allowed_headers: Vec<String>,

    #[serde(default)]
    pub expose_headers: Vec<String>,

    #[serde(default = "default_true")]
    pub allow_credentials: bool,

    /// Preflight cache max age in seconds
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: default_cors_methods(),
            allowed_headers: default_cors_headers(),
            expose_headers: Vec::new(),
            allow_credentials: true,
            max_age: default_cors_max_age(),
        }
    }
}
