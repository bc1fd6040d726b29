use super::entities::Permission;
use serde::Serialize;
use ts_rs::TS;

// 权限目录条目
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/role.ts")]
pub struct PermissionInfo {
    pub key: Permission,
    pub module: String,
    pub description: String,
}

impl From<Permission> for PermissionInfo {
    fn from(p: Permission) -> Self {
        Self {
            key: p,
            module: p.module().to_string(),
            description: p.description().to_string(),
        }
    }
}
