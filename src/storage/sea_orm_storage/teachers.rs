use super::{SeaOrmStorage, fetch_page, now_ts, search_condition};
use crate::entity::teachers::{ActiveModel, Column, Entity as Teachers};
use crate::errors::{CrmError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo, TenantScope,
    teachers::{
        CreateTeacherRequest, Teacher, TeacherQueryParams, TeacherStatus, UpdateTeacherRequest,
    },
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn list_teachers_impl(
        &self,
        scope: &TenantScope,
        query: TeacherQueryParams,
    ) -> Result<PaginatedResponse<Teacher>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Teachers::find().filter(Column::CompanyId.eq(scope.company_id));
        if let Some(branch_id) = scope.branch_filter(query.branch_id) {
            select = select.filter(Column::BranchId.eq(branch_id));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(cond) = search_condition(
            &[
                Column::FirstName,
                Column::LastName,
                Column::Phone,
                Column::Email,
            ],
            query.search.as_deref(),
        ) {
            select = select.filter(cond);
        }

        let select = select
            .order_by_asc(Column::LastName)
            .order_by_asc(Column::FirstName)
            .order_by_asc(Column::Id);
        let (rows, total) = fetch_page(&self.db, select, page, size, "list teachers").await?;

        Ok(PaginatedResponse {
            items: rows.into_iter().map(|m| m.into_teacher()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn get_teacher_impl(&self, company_id: i64, id: i64) -> Result<Option<Teacher>> {
        let row = Teachers::find_by_id(id)
            .filter(Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get teacher", e))?;
        Ok(row.map(|m| m.into_teacher()))
    }

    pub async fn create_teacher_impl(
        &self,
        company_id: i64,
        req: CreateTeacherRequest,
    ) -> Result<Teacher> {
        let now = now_ts();
        let model = ActiveModel {
            company_id: Set(company_id),
            branch_id: Set(req.branch_id),
            user_id: Set(req.user_id),
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            phone: Set(req.phone),
            email: Set(req.email),
            subjects: Set(serde_json::to_string(&req.subjects)?),
            hourly_rate: Set(req.hourly_rate.unwrap_or(0.0)),
            status: Set(req.status.unwrap_or(TeacherStatus::Active).to_string()),
            hired_at: Set(req.hired_at),
            notes: Set(req.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| CrmError::from_db("create teacher", e))?;
        Ok(model.into_teacher())
    }

    pub async fn update_teacher_impl(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateTeacherRequest,
    ) -> Result<Option<Teacher>> {
        if self.get_teacher_impl(company_id, id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now_ts()),
            ..Default::default()
        };
        if let Some(first_name) = update.first_name {
            model.first_name = Set(first_name);
        }
        if let Some(last_name) = update.last_name {
            model.last_name = Set(last_name);
        }
        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone).filter(|v| !v.is_empty()));
        }
        if let Some(email) = update.email {
            model.email = Set(Some(email).filter(|v| !v.is_empty()));
        }
        if let Some(subjects) = update.subjects {
            model.subjects = Set(serde_json::to_string(&subjects)?);
        }
        if let Some(rate) = update.hourly_rate {
            model.hourly_rate = Set(rate);
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if let Some(hired_at) = update.hired_at {
            model.hired_at = Set(Some(hired_at).filter(|v| !v.is_empty()));
        }
        if let Some(notes) = update.notes {
            model.notes = Set(Some(notes).filter(|v| !v.is_empty()));
        }
        if let Some(branch_id) = update.branch_id {
            model.branch_id = Set(Some(branch_id));
        }
        if let Some(user_id) = update.user_id {
            model.user_id = Set(Some(user_id));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| CrmError::from_db("update teacher", e))?;
        Ok(Some(updated.into_teacher()))
    }

    pub async fn delete_teacher_impl(&self, company_id: i64, id: i64) -> Result<bool> {
        let result = Teachers::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("delete teacher", e))?;
        Ok(result.rows_affected > 0)
    }
}
