use super::entities::CompanyStatus;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/company.ts")]
pub struct CompanyQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<CompanyStatus>,
    pub search: Option<String>,
}

// 更新机构；status 只有平台管理员可以修改
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/company.ts")]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub status: Option<CompanyStatus>,
}

// 注册机构时一次性写入的数据
#[derive(Debug, Clone)]
pub struct NewCompanyAccount {
    pub company_name: String,
    pub slug: String,
    pub branch_name: String,
    pub owner: crate::models::users::NewUser,
}
