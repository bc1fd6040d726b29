use super::students::insert_student;
use super::{SeaOrmStorage, fetch_page, now_ts, search_condition};
use crate::entity::leads::{ActiveModel, Column, Entity as Leads};
use crate::entity::prelude::{
    LeadActivities, LeadActivityActiveModel, LeadActivityColumn, LeadTaskActiveModel,
    LeadTaskColumn, LeadTasks,
};
use crate::errors::{CrmError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo, TenantScope,
    leads::{
        ActivityKind, CreateLeadRequest, CreateTaskRequest, Lead, LeadActivity, LeadQueryParams,
        LeadStatus, LeadTask, UpdateLeadRequest, UpdateTaskRequest,
    },
    students::{CreateStudentRequest, Student},
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

async fn insert_activity<C: ConnectionTrait>(
    conn: &C,
    lead_id: i64,
    kind: ActivityKind,
    content: String,
    user_id: Option<i64>,
) -> Result<LeadActivity> {
    let model = LeadActivityActiveModel {
        lead_id: Set(lead_id),
        kind: Set(kind.to_string()),
        content: Set(content),
        created_by: Set(user_id),
        created_at: Set(now_ts()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|e| CrmError::from_db("create lead activity", e))?;
    Ok(model.into_activity())
}

impl SeaOrmStorage {
    pub async fn list_leads_impl(
        &self,
        scope: &TenantScope,
        query: LeadQueryParams,
    ) -> Result<PaginatedResponse<Lead>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Leads::find().filter(Column::CompanyId.eq(scope.company_id));
        if let Some(branch_id) = scope.branch_filter(query.branch_id) {
            select = select.filter(Column::BranchId.eq(branch_id));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(source) = query.source.as_deref().filter(|s| !s.is_empty()) {
            select = select.filter(Column::Source.eq(source));
        }
        if let Some(assigned_to) = query.assigned_to {
            select = select.filter(Column::AssignedTo.eq(assigned_to));
        }
        if let Some(cond) = search_condition(
            &[Column::Name, Column::Phone, Column::Email],
            query.search.as_deref(),
        ) {
            select = select.filter(cond);
        }

        let select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);
        let (rows, total) = fetch_page(&self.db, select, page, size, "list leads").await?;

        Ok(PaginatedResponse {
            items: rows.into_iter().map(|m| m.into_lead()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn get_lead_impl(&self, company_id: i64, id: i64) -> Result<Option<Lead>> {
        let row = Leads::find_by_id(id)
            .filter(Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get lead", e))?;
        Ok(row.map(|m| m.into_lead()))
    }

    pub async fn create_lead_impl(&self, company_id: i64, req: CreateLeadRequest) -> Result<Lead> {
        let now = now_ts();
        let model = ActiveModel {
            company_id: Set(company_id),
            branch_id: Set(req.branch_id),
            name: Set(req.name),
            phone: Set(req.phone),
            email: Set(req.email),
            source: Set(req.source),
            status: Set(LeadStatus::New.to_string()),
            assigned_to: Set(req.assigned_to),
            notes: Set(req.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| CrmError::from_db("create lead", e))?;
        Ok(model.into_lead())
    }

    pub async fn update_lead_impl(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateLeadRequest,
    ) -> Result<Option<Lead>> {
        if self.get_lead_impl(company_id, id).await?.is_none() {
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
        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone).filter(|v| !v.is_empty()));
        }
        if let Some(email) = update.email {
            model.email = Set(Some(email).filter(|v| !v.is_empty()));
        }
        if let Some(source) = update.source {
            model.source = Set(Some(source).filter(|v| !v.is_empty()));
        }
        if let Some(assigned_to) = update.assigned_to {
            model.assigned_to = Set(Some(assigned_to));
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
            .map_err(|e| CrmError::from_db("update lead", e))?;
        Ok(Some(updated.into_lead()))
    }

    pub async fn delete_lead_impl(&self, company_id: i64, id: i64) -> Result<bool> {
        let result = Leads::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("delete lead", e))?;
        Ok(result.rows_affected > 0)
    }

    /// 修改线索状态
    ///
    /// 以 `from` 作为更新条件，并发修改时返回 Conflict 而不是覆盖。
    pub async fn change_lead_status_impl(
        &self,
        company_id: i64,
        id: i64,
        from: LeadStatus,
        to: LeadStatus,
        note: String,
        user_id: Option<i64>,
    ) -> Result<Option<Lead>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CrmError::from_db("begin change lead status", e))?;

        let result = Leads::update_many()
            .col_expr(Column::Status, Expr::value(to.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(now_ts()))
            .filter(Column::Id.eq(id))
            .filter(Column::CompanyId.eq(company_id))
            .filter(Column::Status.eq(from.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| CrmError::from_db("change lead status", e))?;

        if result.rows_affected == 0 {
            let exists = Leads::find_by_id(id)
                .filter(Column::CompanyId.eq(company_id))
                .one(&txn)
                .await
                .map_err(|e| CrmError::from_db("get lead", e))?
                .is_some();
            return if exists {
                Err(CrmError::conflict(format!(
                    "Lead {id} is no longer in status {from}"
                )))
            } else {
                Ok(None)
            };
        }

        insert_activity(&txn, id, ActivityKind::StatusChange, note, user_id).await?;

        let lead = Leads::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| CrmError::from_db("get lead", e))?
            .ok_or_else(|| CrmError::not_found(format!("Lead {id}")))?;

        txn.commit()
            .await
            .map_err(|e| CrmError::from_db("commit change lead status", e))?;
        Ok(Some(lead.into_lead()))
    }

    /// 线索转化：创建学员、标记 enrolled、关联学员，并写入状态记录
    ///
    /// 只有 in_progress 的线索可以转化；状态在事务内重新校验。
    pub async fn convert_lead_impl(
        &self,
        company_id: i64,
        id: i64,
        student: CreateStudentRequest,
        user_id: Option<i64>,
    ) -> Result<Option<(Lead, Student)>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CrmError::from_db("begin convert lead", e))?;

        let Some(lead) = Leads::find_by_id(id)
            .filter(Column::CompanyId.eq(company_id))
            .one(&txn)
            .await
            .map_err(|e| CrmError::from_db("get lead", e))?
        else {
            return Ok(None);
        };
        let status: LeadStatus = lead.status.parse().map_err(|_| {
            CrmError::database_operation(format!(
                "Lead {id} has an unknown status '{}'",
                lead.status
            ))
        })?;
        if status == LeadStatus::Enrolled || lead.student_id.is_some() {
            return Err(CrmError::conflict(format!("Lead {id} is already converted")));
        }
        if !status.can_transition_to(LeadStatus::Enrolled) {
            return Err(CrmError::validation(format!(
                "Cannot convert a lead in status {status}; move it to in_progress first"
            )));
        }

        let student = insert_student(&txn, company_id, student).await?;

        let updated = ActiveModel {
            id: Set(id),
            status: Set(LeadStatus::Enrolled.to_string()),
            student_id: Set(Some(student.id)),
            updated_at: Set(now_ts()),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(|e| CrmError::from_db("convert lead", e))?;

        insert_activity(
            &txn,
            id,
            ActivityKind::StatusChange,
            format!("{status} -> enrolled (student #{})", student.id),
            user_id,
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| CrmError::from_db("commit convert lead", e))?;
        Ok(Some((updated.into_lead(), student)))
    }

    pub async fn list_lead_activities_impl(&self, lead_id: i64) -> Result<Vec<LeadActivity>> {
        let rows = LeadActivities::find()
            .filter(LeadActivityColumn::LeadId.eq(lead_id))
            .order_by_desc(LeadActivityColumn::CreatedAt)
            .order_by_desc(LeadActivityColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| CrmError::from_db("list lead activities", e))?;
        Ok(rows.into_iter().map(|m| m.into_activity()).collect())
    }

    pub async fn create_lead_activity_impl(
        &self,
        lead_id: i64,
        kind: ActivityKind,
        content: String,
        user_id: Option<i64>,
    ) -> Result<LeadActivity> {
        insert_activity(&self.db, lead_id, kind, content, user_id).await
    }

    /// 未完成的任务在前，再按截止时间排序
    pub async fn list_lead_tasks_impl(&self, lead_id: i64) -> Result<Vec<LeadTask>> {
        let rows = LeadTasks::find()
            .filter(LeadTaskColumn::LeadId.eq(lead_id))
            .order_by_asc(LeadTaskColumn::IsDone)
            .order_by_asc(LeadTaskColumn::DueAt)
            .order_by_asc(LeadTaskColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| CrmError::from_db("list lead tasks", e))?;
        Ok(rows.into_iter().map(|m| m.into_task()).collect())
    }

    pub async fn create_lead_task_impl(
        &self,
        lead_id: i64,
        req: CreateTaskRequest,
    ) -> Result<LeadTask> {
        let model = LeadTaskActiveModel {
            lead_id: Set(lead_id),
            title: Set(req.title),
            due_at: Set(req.due_at.map(|d| d.timestamp())),
            is_done: Set(false),
            assigned_to: Set(req.assigned_to),
            completed_at: Set(None),
            created_at: Set(now_ts()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| CrmError::from_db("create lead task", e))?;
        Ok(model.into_task())
    }

    pub async fn update_lead_task_impl(
        &self,
        lead_id: i64,
        task_id: i64,
        update: UpdateTaskRequest,
    ) -> Result<Option<LeadTask>> {
        let Some(existing) = LeadTasks::find_by_id(task_id)
            .filter(LeadTaskColumn::LeadId.eq(lead_id))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get lead task", e))?
        else {
            return Ok(None);
        };

        let mut model = LeadTaskActiveModel {
            id: Set(task_id),
            ..Default::default()
        };
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(due_at) = update.due_at {
            model.due_at = Set(Some(due_at.timestamp()));
        }
        if let Some(assigned_to) = update.assigned_to {
            model.assigned_to = Set(Some(assigned_to));
        }
        // 完成时间只在状态真正变化时改写
        match update.is_done {
            Some(true) if !existing.is_done => {
                model.is_done = Set(true);
                model.completed_at = Set(Some(now_ts()));
            }
            Some(false) if existing.is_done => {
                model.is_done = Set(false);
                model.completed_at = Set(None);
            }
            _ => {}
        }
        if !model.is_changed() {
            return Ok(Some(existing.into_task()));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| CrmError::from_db("update lead task", e))?;
        Ok(Some(updated.into_task()))
    }

    pub async fn delete_lead_task_impl(&self, lead_id: i64, task_id: i64) -> Result<bool> {
        let result = LeadTasks::delete_many()
            .filter(LeadTaskColumn::Id.eq(task_id))
            .filter(LeadTaskColumn::LeadId.eq(lead_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("delete lead task", e))?;
        Ok(result.rows_affected > 0)
    }
}
