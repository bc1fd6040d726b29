use super::{SeaOrmStorage, fetch_page, now_ts, search_condition};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{CrmError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo, TenantScope,
    users::{NewUser, UpdateUserRequest, User, UserQueryParams, UserRole, UserStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: NewUser) -> Result<User> {
        let now = now_ts();

        let model = ActiveModel {
            company_id: Set(req.company_id),
            branch_id: Set(req.branch_id),
            role_id: Set(req.role_id),
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(req.password_hash),
            role: Set(req.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            display_name: Set(req.display_name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| CrmError::from_db("create user", e))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get user", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get user by username", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get user by email", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过用户名或邮箱获取用户
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier.to_lowercase())),
            )
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get user by identifier", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 机构内的员工列表
    pub async fn list_users_impl(
        &self,
        scope: &TenantScope,
        query: UserQueryParams,
    ) -> Result<PaginatedResponse<User>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Users::find().filter(Column::CompanyId.eq(scope.company_id));
        if let Some(branch_id) = scope.branch_filter(query.branch_id) {
            select = select.filter(Column::BranchId.eq(branch_id));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(role_id) = query.role_id {
            select = select.filter(Column::RoleId.eq(role_id));
        }
        if let Some(cond) = search_condition(
            &[Column::Username, Column::Email, Column::DisplayName],
            query.search.as_deref(),
        ) {
            select = select.filter(cond);
        }

        let (rows, total) = fetch_page(
            &self.db,
            select.order_by_asc(Column::Id),
            page,
            size,
            "list users",
        )
        .await?;

        Ok(PaginatedResponse {
            items: rows.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    /// 更新用户，`update.password` 已是哈希值
    pub async fn update_user_impl(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        let existing = Users::find_by_id(id)
            .filter(Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get user", e))?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now_ts()),
            ..Default::default()
        };
        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(password_hash) = update.password {
            model.password_hash = Set(password_hash);
        }
        if let Some(display_name) = update.display_name {
            model.display_name = Set(Some(display_name).filter(|n| !n.is_empty()));
        }
        if let Some(role_id) = update.role_id {
            model.role_id = Set(Some(role_id));
        }
        if let Some(branch_id) = update.branch_id {
            model.branch_id = Set(Some(branch_id));
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| CrmError::from_db("update user", e))?;

        Ok(Some(updated.into_user()))
    }

    pub async fn delete_user_impl(&self, company_id: i64, id: i64) -> Result<bool> {
        let result = Users::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("delete user", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = now_ts();
        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("update last login", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_super_admins_impl(&self) -> Result<u64> {
        Users::find()
            .filter(Column::Role.eq(UserRole::SuperAdmin.as_str()))
            .count(&self.db)
            .await
            .map_err(|e| CrmError::from_db("count super admins", e))
    }
}
