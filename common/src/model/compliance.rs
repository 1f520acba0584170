use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceLog {
    pub id: String,
    pub user_id: String,
    pub action: String,
    pub device_info: Option<String>,
    pub result: Option<String>,
    pub timestamp: DateTime<Utc>,
}

string_enum! {
    pub enum LogLevel {
        Debug => "debug",
        Info => "info",
        Warn => "warn",
        Error => "error",
    }
}

/// Audit trail entry served to administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub message: String,
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    pub meta: Value,
}
