// Default value functions

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    47334
}

pub fn default_workers() -> usize {
    0 // 0 = one worker per CPU core
}

pub fn resolve_workers(configured: usize) -> usize {
    if configured == 0 {
        num_cpus::get()
    } else {
        configured
    }
}

pub fn default_api_prefix() -> String {
    "/api".to_string()
}

pub fn default_environment() -> String {
    "local".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

pub fn default_logs_path() -> String {
    "./logs".to_string()
}

pub fn default_session_ttl_hours() -> u64 {
    24 * 7
}

pub fn default_cookie_name() -> String {
    "fedsql_session".to_string()
}

pub fn default_bcrypt_cost() -> u32 {
    10
}

pub fn default_max_file_size_bytes() -> usize {
    100 * 1024 * 1024 // 100MB
}

pub fn default_max_training_rows() -> usize {
    100_000
}

pub fn default_job_history_limit() -> usize {
    256
}

pub fn default_max_result_rows() -> usize {
    100_000
}

pub fn default_max_request_body_bytes() -> usize {
    16 * 1024 * 1024 // 16MB
}

pub fn default_tenant_header() -> String {
    "company-id".to_string()
}

pub fn default_tenant() -> String {
    "0".to_string()
}

pub fn default_cors_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

pub fn default_cors_headers() -> Vec<String> {
    ["Content-Type", "Accept", "Origin", "X-Requested-With", "company-id"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

pub fn default_cors_max_age() -> u64 {
    3600
}
