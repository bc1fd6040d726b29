use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/company.ts")]
    pub enum CompanyStatus {
        Active => "active",
        Suspended => "suspended",
    }
}

// 机构（租户）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/company.ts")]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub status: CompanyStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 由机构名称生成 slug：小写字母数字，其余字符折叠为单个 `-`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Bright Minds  Academy!"), "bright-minds-academy");
        assert_eq!(slugify("--abc--"), "abc");
        assert_eq!(slugify("Школа"), "");
    }
}
