//! 集成测试公共设施：内存 SQLite 存储、Moka 缓存与测试应用
#![allow(dead_code)]

use std::sync::Arc;

use edu_crm::cache::ObjectCache;
use edu_crm::cache::object_cache::moka::MokaCacheWrapper;
use edu_crm::models::TenantScope;
use edu_crm::models::branches::Branch;
use edu_crm::models::companies::{Company, NewCompanyAccount};
use edu_crm::models::users::{NewUser, User, UserRole};
use edu_crm::storage::{SeaOrmStorage, Storage};
use edu_crm::utils::password::hash_password;
use serde::de::DeserializeOwned;

pub const PASSWORD: &str = "Secret-pass-123";

/// 每个测试独立的内存数据库，迁移已执行
pub async fn memory_storage() -> Arc<dyn Storage> {
    let storage = SeaOrmStorage::connect("sqlite::memory:", 1, 5)
        .await
        .expect("in-memory storage");
    Arc::new(storage)
}

pub fn memory_cache() -> Arc<dyn ObjectCache> {
    Arc::new(MokaCacheWrapper::with_capacity(1_000, 300))
}

/// 直接在存储层注册机构，返回机构、默认分校和所有者
pub async fn register_center(storage: &dyn Storage, slug: &str) -> (Company, Branch, User) {
    let account = NewCompanyAccount {
        company_name: format!("Center {slug}"),
        slug: slug.to_string(),
        branch_name: "Main".to_string(),
        owner: NewUser {
            company_id: None,
            branch_id: None,
            role_id: None,
            username: format!("{slug}_owner"),
            email: format!("owner@{slug}.test"),
            password_hash: hash_password(PASSWORD).expect("hash"),
            role: UserRole::Owner,
            display_name: None,
        },
    };
    storage.register_company(account).await.expect("register company")
}

pub fn scope_of(company: &Company) -> TenantScope {
    TenantScope::new(company.id, None)
}

/// 用 JSON 构造查询参数，分页取默认值
pub fn query<T: DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).expect("query params")
}

/// 构建挂载全部 API 路由的测试应用
#[macro_export]
macro_rules! test_app {
    ($storage:expr, $cache:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(
                    actix_web::web::QueryConfig::default()
                        .error_handler(edu_crm::utils::query_error_handler),
                )
                .app_data(
                    actix_web::web::JsonConfig::default()
                        .error_handler(edu_crm::utils::json_error_handler),
                )
                .app_data(actix_web::web::Data::new($storage.clone()))
                .app_data(actix_web::web::Data::new($cache.clone()))
                .configure(edu_crm::routes::configure_api_routes),
        )
        .await
    };
}
