use serde::Serialize;
use ts_rs::TS;

// 系统信息（公开接口）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct SystemInfoResponse {
    pub system_name: String,
    pub version: String,
    pub environment: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: i64,
}
