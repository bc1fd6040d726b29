pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::users::{CreateUserRequest, UpdateUserRequest, User, UserQueryParams};
use crate::models::{ErrorCode, TenantScope};
use crate::services::common::{conflict, lazy_service, storage_error};
use crate::storage::Storage;

lazy_service!(UserService);

impl UserService {
    // 员工列表
    pub async fn list_users(
        &self,
        query: UserQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_users(self, query, request).await
    }

    // 创建员工账号
    pub async fn create_user(
        &self,
        user_data: CreateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_user(self, user_data, request).await
    }

    pub async fn get_user(&self, user_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_user(self, user_id, request).await
    }

    // 更新员工信息
    pub async fn update_user(
        &self,
        user_id: i64,
        update_data: UpdateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_user(self, user_id, update_data, request).await
    }

    // 删除员工账号
    pub async fn delete_user(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_user(self, user_id, request).await
    }
}

/// 用户名和邮箱在全平台唯一
pub(crate) async fn ensure_account_available(
    storage: &dyn Storage,
    username: &str,
    email: &str,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_username(username).await {
        Ok(Some(_)) => {
            return Err(conflict(
                ErrorCode::UserAlreadyExists,
                "Username already exists",
            ));
        }
        Ok(None) => {}
        Err(e) => return Err(storage_error("Failed to check username", e)),
    }
    match storage.get_user_by_email(email).await {
        Ok(Some(_)) => Err(conflict(ErrorCode::UserAlreadyExists, "Email already exists")),
        Ok(None) => Ok(()),
        Err(e) => Err(storage_error("Failed to check email", e)),
    }
}

/// 当前机构（及分校）范围内的账号
async fn find_tenant_user(
    storage: &dyn Storage,
    scope: &TenantScope,
    user_id: i64,
) -> crate::errors::Result<Option<User>> {
    Ok(storage.get_user_by_id(user_id).await?.filter(|user| {
        user.company_id == Some(scope.company_id) && scope.can_access_branch(user.branch_id)
    }))
}
