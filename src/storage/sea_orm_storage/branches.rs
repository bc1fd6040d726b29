use super::{SeaOrmStorage, fetch_page, now_ts, search_condition};
use crate::entity::branches::{ActiveModel, Column, Entity as Branches};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{CrmError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo, TenantScope,
    branches::{Branch, BranchQueryParams, CreateBranchRequest, UpdateBranchRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn list_branches_impl(
        &self,
        scope: &TenantScope,
        query: BranchQueryParams,
    ) -> Result<PaginatedResponse<Branch>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Branches::find().filter(Column::CompanyId.eq(scope.company_id));
        // 绑定分校的员工只能看到自己的分校
        if let Some(own) = scope.branch_id {
            select = select.filter(Column::Id.eq(own));
        }
        if let Some(is_active) = query.is_active {
            select = select.filter(Column::IsActive.eq(is_active));
        }
        if let Some(cond) = search_condition(&[Column::Name, Column::Address], query.search.as_deref())
        {
            select = select.filter(cond);
        }

        let (rows, total) =
            fetch_page(&self.db, select.order_by_asc(Column::Id), page, size, "list branches")
                .await?;
        Ok(PaginatedResponse {
            items: rows.into_iter().map(|m| m.into_branch()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn get_branch_impl(&self, company_id: i64, id: i64) -> Result<Option<Branch>> {
        let row = Branches::find_by_id(id)
            .filter(Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get branch", e))?;
        Ok(row.map(|m| m.into_branch()))
    }

    pub async fn create_branch_impl(
        &self,
        company_id: i64,
        req: CreateBranchRequest,
    ) -> Result<Branch> {
        let now = now_ts();
        let model = ActiveModel {
            company_id: Set(company_id),
            name: Set(req.name),
            address: Set(req.address),
            phone: Set(req.phone),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| CrmError::from_db("create branch", e))?;
        Ok(model.into_branch())
    }

    pub async fn update_branch_impl(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateBranchRequest,
    ) -> Result<Option<Branch>> {
        if self.get_branch_impl(company_id, id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now_ts()),
            ..Default::default()
        };
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(address) = update.address {
            model.address = Set(Some(address).filter(|a| !a.is_empty()));
        }
        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone).filter(|p| !p.is_empty()));
        }
        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| CrmError::from_db("update branch", e))?;
        Ok(Some(updated.into_branch()))
    }

    pub async fn delete_branch_impl(&self, company_id: i64, id: i64) -> Result<bool> {
        let result = Branches::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("delete branch", e))?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count_branch_users_impl(&self, company_id: i64, branch_id: i64) -> Result<u64> {
        Users::find()
            .filter(UserColumn::CompanyId.eq(company_id))
            .filter(UserColumn::BranchId.eq(branch_id))
            .count(&self.db)
            .await
            .map_err(|e| CrmError::from_db("count branch users", e))
    }
}
