use super::{SeaOrmStorage, fetch_page, now_ts, search_condition};
use crate::entity::prelude::{UserColumn, Users};
use crate::entity::roles::{ActiveModel, Column, Entity as Roles};
use crate::errors::{CrmError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    roles::{Permission, Role, RoleQueryParams},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

fn encode_permissions(permissions: &[Permission]) -> Result<String> {
    let keys: Vec<&str> = permissions.iter().map(|p| p.as_str()).collect();
    Ok(serde_json::to_string(&keys)?)
}

impl SeaOrmStorage {
    /// 系统角色在前
    pub async fn list_roles_impl(
        &self,
        company_id: i64,
        query: RoleQueryParams,
    ) -> Result<PaginatedResponse<Role>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Roles::find().filter(Column::CompanyId.eq(company_id));
        if let Some(cond) =
            search_condition(&[Column::Name, Column::Description], query.search.as_deref())
        {
            select = select.filter(cond);
        }

        let select = select
            .order_by_desc(Column::IsSystem)
            .order_by_asc(Column::Name);
        let (rows, total) = fetch_page(&self.db, select, page, size, "list roles").await?;

        Ok(PaginatedResponse {
            items: rows.into_iter().map(|m| m.into_role()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn get_role_impl(&self, company_id: i64, id: i64) -> Result<Option<Role>> {
        let row = Roles::find_by_id(id)
            .filter(Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get role", e))?;
        Ok(row.map(|m| m.into_role()))
    }

    pub async fn create_role_impl(
        &self,
        company_id: i64,
        name: String,
        description: Option<String>,
        permissions: Vec<Permission>,
    ) -> Result<Role> {
        let now = now_ts();
        let model = ActiveModel {
            company_id: Set(company_id),
            name: Set(name),
            description: Set(description),
            permissions: Set(encode_permissions(&permissions)?),
            is_system: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| CrmError::from_db("create role", e))?;
        Ok(model.into_role())
    }

    pub async fn update_role_impl(
        &self,
        company_id: i64,
        id: i64,
        name: Option<String>,
        description: Option<String>,
        permissions: Option<Vec<Permission>>,
    ) -> Result<Option<Role>> {
        if self.get_role_impl(company_id, id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now_ts()),
            ..Default::default()
        };
        if let Some(name) = name {
            model.name = Set(name);
        }
        if let Some(description) = description {
            model.description = Set(Some(description).filter(|d| !d.is_empty()));
        }
        if let Some(permissions) = permissions {
            model.permissions = Set(encode_permissions(&permissions)?);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| CrmError::from_db("update role", e))?;
        Ok(Some(updated.into_role()))
    }

    pub async fn delete_role_impl(&self, company_id: i64, id: i64) -> Result<bool> {
        let result = Roles::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("delete role", e))?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count_role_users_impl(&self, company_id: i64, role_id: i64) -> Result<u64> {
        Users::find()
            .filter(UserColumn::CompanyId.eq(company_id))
            .filter(UserColumn::RoleId.eq(role_id))
            .count(&self.db)
            .await
            .map_err(|e| CrmError::from_db("count role users", e))
    }
}
