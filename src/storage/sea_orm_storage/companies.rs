use super::{SeaOrmStorage, fetch_page, now_ts, search_condition};
use crate::entity::prelude::*;
use crate::errors::{CrmError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    branches::Branch,
    companies::{Company, CompanyQueryParams, CompanyStatus, NewCompanyAccount, UpdateCompanyRequest},
    roles::SystemRole,
    users::{User, UserStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 注册机构
    ///
    /// 机构、默认分校、三个系统角色和所有者账号在同一事务内写入，
    /// 任何一步失败都不会留下半个机构。
    pub async fn register_company_impl(
        &self,
        account: NewCompanyAccount,
    ) -> Result<(Company, Branch, User)> {
        let now = now_ts();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CrmError::from_db("begin register company", e))?;

        let company = CompanyActiveModel {
            name: Set(account.company_name),
            slug: Set(account.slug),
            status: Set(CompanyStatus::Active.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| CrmError::from_db("create company", e))?;

        let branch = BranchActiveModel {
            company_id: Set(company.id),
            name: Set(account.branch_name),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| CrmError::from_db("create default branch", e))?;

        for system_role in SystemRole::ALL {
            let permissions: Vec<&str> = system_role
                .permissions()
                .iter()
                .map(|p| p.as_str())
                .collect();
            RoleActiveModel {
                company_id: Set(company.id),
                name: Set(system_role.name().to_string()),
                description: Set(Some(system_role.description().to_string())),
                permissions: Set(serde_json::to_string(&permissions)?),
                is_system: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| CrmError::from_db("create system role", e))?;
        }

        let owner = account.owner;
        let user = UserActiveModel {
            company_id: Set(Some(company.id)),
            branch_id: Set(None),
            role_id: Set(None),
            username: Set(owner.username),
            email: Set(owner.email),
            password_hash: Set(owner.password_hash),
            role: Set(owner.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            display_name: Set(owner.display_name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| CrmError::from_db("create owner", e))?;

        txn.commit()
            .await
            .map_err(|e| CrmError::from_db("commit register company", e))?;

        Ok((company.into_company(), branch.into_branch(), user.into_user()))
    }

    pub async fn get_company_impl(&self, id: i64) -> Result<Option<Company>> {
        let row = Companies::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get company", e))?;
        Ok(row.map(|m| m.into_company()))
    }

    pub async fn get_company_by_slug_impl(&self, slug: &str) -> Result<Option<Company>> {
        let row = Companies::find()
            .filter(CompanyColumn::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get company by slug", e))?;
        Ok(row.map(|m| m.into_company()))
    }

    pub async fn list_companies_impl(
        &self,
        query: CompanyQueryParams,
    ) -> Result<PaginatedResponse<Company>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Companies::find();
        if let Some(status) = query.status {
            select = select.filter(CompanyColumn::Status.eq(status.as_str()));
        }
        if let Some(cond) = search_condition(
            &[CompanyColumn::Name, CompanyColumn::Slug],
            query.search.as_deref(),
        ) {
            select = select.filter(cond);
        }

        let (rows, total) = fetch_page(
            &self.db,
            select.order_by_desc(CompanyColumn::CreatedAt),
            page,
            size,
            "list companies",
        )
        .await?;
        Ok(PaginatedResponse {
            items: rows.into_iter().map(|m| m.into_company()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn update_company_impl(
        &self,
        id: i64,
        update: UpdateCompanyRequest,
    ) -> Result<Option<Company>> {
        if self.get_company_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = CompanyActiveModel {
            id: Set(id),
            updated_at: Set(now_ts()),
            ..Default::default()
        };
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| CrmError::from_db("update company", e))?;
        Ok(Some(updated.into_company()))
    }
}
