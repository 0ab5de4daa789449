//! Server variables reported to MySQL-style clients.

use fedsql_commons::Value;

pub const SERVER_VERSION: &str = "8.0.17";

/// `(name, value)` pairs for `SHOW VARIABLES` and `@@name` lookups.
pub fn server_variables() -> Vec<(&'static str, Value)> {
    vec![
        ("autocommit", Value::Int(1)),
        ("character_set_client", Value::from("utf8")),
        ("character_set_connection", Value::from("utf8")),
        ("character_set_results", Value::from("utf8")),
        ("character_set_server", Value::from("utf8")),
        ("collation_connection", Value::from("utf8_general_ci")),
        ("collation_server", Value::from("utf8_general_ci")),
        ("init_connect", Value::from("")),
        ("interactive_timeout", Value::Int(28800)),
        ("lower_case_table_names", Value::Int(0)),
        ("max_allowed_packet", Value::Int(16_777_216)),
        ("net_buffer_length", Value::Int(16384)),
        ("net_write_timeout", Value::Int(60)),
        ("sql_mode", Value::from("STRICT_TRANS_TABLES")),
        ("system_time_zone", Value::from("UTC")),
        ("time_zone", Value::from("SYSTEM")),
        ("transaction_isolation", Value::from("REPEATABLE-READ")),
        ("tx_isolation", Value::from("REPEATABLE-READ")),
        ("version", Value::from(SERVER_VERSION)),
        ("version_comment", Value::from("FedSQL gateway")),
        ("wait_timeout", Value::Int(28800)),
    ]
}

/// `@@name`, `@@session.name` or `@@global.name`.
pub fn lookup(reference: &str) -> Option<Value> {
    let name = reference.trim_start_matches('@').to_ascii_lowercase();
    let name = name
        .strip_prefix("session.")
        .or_else(|| name.strip_prefix("global."))
        .unwrap_or(&name);
    server_variables()
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| v)
}
