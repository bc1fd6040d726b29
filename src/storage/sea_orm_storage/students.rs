use super::{SeaOrmStorage, fetch_page, now_ts, search_condition};
use crate::entity::prelude::{GroupStudentColumn, GroupStudents};
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::errors::{CrmError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo, TenantScope,
    students::{
        CreateStudentRequest, Student, StudentQueryParams, StudentStatus, UpdateStudentRequest,
    },
};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn list_students_impl(
        &self,
        scope: &TenantScope,
        query: StudentQueryParams,
    ) -> Result<PaginatedResponse<Student>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Students::find().filter(Column::CompanyId.eq(scope.company_id));
        if let Some(branch_id) = scope.branch_filter(query.branch_id) {
            select = select.filter(Column::BranchId.eq(branch_id));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(group_id) = query.group_id {
            select = select.filter(
                Column::Id.in_subquery(
                    Query::select()
                        .column(GroupStudentColumn::StudentId)
                        .from(GroupStudents)
                        .and_where(GroupStudentColumn::GroupId.eq(group_id))
                        .to_owned(),
                ),
            );
        }
        if let Some(cond) = search_condition(
            &[
                Column::FirstName,
                Column::LastName,
                Column::Phone,
                Column::Email,
                Column::ParentPhone,
            ],
            query.search.as_deref(),
        ) {
            select = select.filter(cond);
        }

        let select = select
            .order_by_asc(Column::LastName)
            .order_by_asc(Column::FirstName)
            .order_by_asc(Column::Id);
        let (rows, total) = fetch_page(&self.db, select, page, size, "list students").await?;

        Ok(PaginatedResponse {
            items: rows.into_iter().map(|m| m.into_student()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn get_student_impl(&self, company_id: i64, id: i64) -> Result<Option<Student>> {
        let row = Students::find_by_id(id)
            .filter(Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get student", e))?;
        Ok(row.map(|m| m.into_student()))
    }

    pub async fn create_student_impl(
        &self,
        company_id: i64,
        req: CreateStudentRequest,
    ) -> Result<Student> {
        insert_student(&self.db, company_id, req).await
    }

    pub async fn update_student_impl(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        if self.get_student_impl(company_id, id).await?.is_none() {
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
        if let Some(birth_date) = update.birth_date {
            model.birth_date = Set(Some(birth_date).filter(|v| !v.is_empty()));
        }
        if let Some(parent_name) = update.parent_name {
            model.parent_name = Set(Some(parent_name).filter(|v| !v.is_empty()));
        }
        if let Some(parent_phone) = update.parent_phone {
            model.parent_phone = Set(Some(parent_phone).filter(|v| !v.is_empty()));
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if let Some(notes) = update.notes {
            model.notes = Set(Some(notes).filter(|v| !v.is_empty()));
        }
        if let Some(branch_id) = update.branch_id {
            model.branch_id = Set(Some(branch_id));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| CrmError::from_db("update student", e))?;
        Ok(Some(updated.into_student()))
    }

    pub async fn delete_student_impl(&self, company_id: i64, id: i64) -> Result<bool> {
        let result = Students::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("delete student", e))?;
        Ok(result.rows_affected > 0)
    }
}

/// 写入学员，线索转化时在事务连接上调用
pub(super) async fn insert_student<C: ConnectionTrait>(
    conn: &C,
    company_id: i64,
    req: CreateStudentRequest,
) -> Result<Student> {
    let now = now_ts();
    let model = ActiveModel {
        company_id: Set(company_id),
        branch_id: Set(req.branch_id),
        first_name: Set(req.first_name),
        last_name: Set(req.last_name),
        phone: Set(req.phone),
        email: Set(req.email),
        birth_date: Set(req.birth_date),
        parent_name: Set(req.parent_name),
        parent_phone: Set(req.parent_phone),
        status: Set(req.status.unwrap_or(StudentStatus::Active).to_string()),
        notes: Set(req.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|e| CrmError::from_db("create student", e))?;
    Ok(model.into_student())
}
