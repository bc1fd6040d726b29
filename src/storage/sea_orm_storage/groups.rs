use super::{SeaOrmStorage, fetch_page, now_ts, search_condition};
use crate::entity::groups::{ActiveModel, Column, Entity as Groups};
use crate::entity::prelude::{
    GroupStudentActiveModel, GroupStudentColumn, GroupStudents, StudentColumn, Students,
};
use crate::errors::{CrmError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo, TenantScope,
    common::from_timestamp,
    groups::{
        CreateGroupRequest, Group, GroupJoinOutcome, GroupMember, GroupQueryParams, GroupStatus,
        UpdateGroupRequest,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use std::collections::HashMap;

/// 加入成员前读取班组，行锁到事务结束
fn locked_group(group_id: i64) -> Select<Groups> {
    Groups::find_by_id(group_id).lock_exclusive()
}

/// 按班组统计成员数
async fn member_counts<C: ConnectionTrait>(conn: &C, group_ids: &[i64]) -> Result<HashMap<i64, i64>> {
    if group_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<i64> = GroupStudents::find()
        .select_only()
        .column(GroupStudentColumn::GroupId)
        .filter(GroupStudentColumn::GroupId.is_in(group_ids.iter().copied()))
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| CrmError::from_db("count group members", e))?;

    let mut counts = HashMap::new();
    for group_id in rows {
        *counts.entry(group_id).or_insert(0) += 1;
    }
    Ok(counts)
}

impl SeaOrmStorage {
    pub async fn list_groups_impl(
        &self,
        scope: &TenantScope,
        query: GroupQueryParams,
    ) -> Result<PaginatedResponse<Group>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Groups::find().filter(Column::CompanyId.eq(scope.company_id));
        if let Some(branch_id) = scope.branch_filter(query.branch_id) {
            select = select.filter(Column::BranchId.eq(branch_id));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }
        if let Some(cond) = search_condition(
            &[Column::Name, Column::Subject, Column::Level],
            query.search.as_deref(),
        ) {
            select = select.filter(cond);
        }

        let (rows, total) =
            fetch_page(&self.db, select.order_by_asc(Column::Name), page, size, "list groups")
                .await?;
        let ids: Vec<i64> = rows.iter().map(|m| m.id).collect();
        let counts = member_counts(&self.db, &ids).await?;

        Ok(PaginatedResponse {
            items: rows
                .into_iter()
                .map(|m| {
                    let count = counts.get(&m.id).copied().unwrap_or(0);
                    m.into_group(count)
                })
                .collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn get_group_impl(&self, company_id: i64, id: i64) -> Result<Option<Group>> {
        let Some(row) = Groups::find_by_id(id)
            .filter(Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get group", e))?
        else {
            return Ok(None);
        };
        let count = member_counts(&self.db, &[id]).await?;
        Ok(Some(row.into_group(count.get(&id).copied().unwrap_or(0))))
    }

    pub async fn create_group_impl(&self, company_id: i64, req: CreateGroupRequest) -> Result<Group> {
        let now = now_ts();
        let model = ActiveModel {
            company_id: Set(company_id),
            branch_id: Set(req.branch_id),
            name: Set(req.name),
            subject: Set(req.subject),
            level: Set(req.level),
            teacher_id: Set(req.teacher_id),
            room_id: Set(req.room_id),
            max_students: Set(req.max_students),
            status: Set(req.status.unwrap_or(GroupStatus::Active).to_string()),
            start_date: Set(req.start_date),
            end_date: Set(req.end_date),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| CrmError::from_db("create group", e))?;
        Ok(model.into_group(0))
    }

    pub async fn update_group_impl(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateGroupRequest,
    ) -> Result<Option<Group>> {
        if self.get_group_impl(company_id, id).await?.is_none() {
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
        if let Some(subject) = update.subject {
            model.subject = Set(Some(subject).filter(|v| !v.is_empty()));
        }
        if let Some(level) = update.level {
            model.level = Set(Some(level).filter(|v| !v.is_empty()));
        }
        if let Some(teacher_id) = update.teacher_id {
            model.teacher_id = Set(Some(teacher_id));
        }
        if let Some(room_id) = update.room_id {
            model.room_id = Set(Some(room_id));
        }
        if let Some(max_students) = update.max_students {
            model.max_students = Set(max_students);
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if let Some(start_date) = update.start_date {
            model.start_date = Set(Some(start_date).filter(|v| !v.is_empty()));
        }
        if let Some(end_date) = update.end_date {
            model.end_date = Set(Some(end_date).filter(|v| !v.is_empty()));
        }
        if let Some(branch_id) = update.branch_id {
            model.branch_id = Set(Some(branch_id));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| CrmError::from_db("update group", e))?;
        let count = member_counts(&self.db, &[id]).await?;
        Ok(Some(updated.into_group(count.get(&id).copied().unwrap_or(0))))
    }

    pub async fn delete_group_impl(&self, company_id: i64, id: i64) -> Result<bool> {
        let result = Groups::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("delete group", e))?;
        Ok(result.rows_affected > 0)
    }

    /// 班组成员，按加入时间排序
    pub async fn list_group_members_impl(&self, group_id: i64) -> Result<Vec<GroupMember>> {
        let memberships = GroupStudents::find()
            .filter(GroupStudentColumn::GroupId.eq(group_id))
            .order_by_asc(GroupStudentColumn::JoinedAt)
            .order_by_asc(GroupStudentColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| CrmError::from_db("list group members", e))?;
        if memberships.is_empty() {
            return Ok(Vec::new());
        }

        let mut students: HashMap<i64, _> = Students::find()
            .filter(StudentColumn::Id.is_in(memberships.iter().map(|m| m.student_id)))
            .all(&self.db)
            .await
            .map_err(|e| CrmError::from_db("list group members", e))?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(memberships
            .into_iter()
            .filter_map(|m| {
                students.remove(&m.student_id).map(|s| GroupMember {
                    group_id,
                    student: s.into_student(),
                    joined_at: from_timestamp(m.joined_at),
                })
            })
            .collect())
    }

    /// 加入班组；人数检查与写入在同一事务内
    ///
    /// 先对班组行加排他锁，并发加入在 Postgres/MySQL 上按顺序计数。SQLite 本身串行写入，
    /// 生成的 SQL 不带锁子句。
    pub async fn add_group_student_impl(
        &self,
        group_id: i64,
        student_id: i64,
    ) -> Result<GroupJoinOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CrmError::from_db("begin add group student", e))?;

        let group = locked_group(group_id)
            .one(&txn)
            .await
            .map_err(|e| CrmError::from_db("get group", e))?
            .ok_or_else(|| CrmError::not_found(format!("Group {group_id}")))?;

        let existing = GroupStudents::find()
            .filter(GroupStudentColumn::GroupId.eq(group_id))
            .filter(GroupStudentColumn::StudentId.eq(student_id))
            .one(&txn)
            .await
            .map_err(|e| CrmError::from_db("get group member", e))?;
        if existing.is_some() {
            return Ok(GroupJoinOutcome::AlreadyMember);
        }

        let members = GroupStudents::find()
            .filter(GroupStudentColumn::GroupId.eq(group_id))
            .count(&txn)
            .await
            .map_err(|e| CrmError::from_db("count group members", e))?;
        if members >= group.max_students.max(0) as u64 {
            return Ok(GroupJoinOutcome::Full);
        }

        let membership = GroupStudentActiveModel {
            group_id: Set(group_id),
            student_id: Set(student_id),
            joined_at: Set(now_ts()),
            ..Default::default()
        }
        .insert(&txn)
        .await;
        let membership = match membership {
            Ok(m) => m,
            Err(e) => {
                let err = CrmError::from_db("add group student", e);
                if matches!(err, CrmError::UniqueViolation(_)) {
                    return Ok(GroupJoinOutcome::AlreadyMember);
                }
                return Err(err);
            }
        };

        let student = Students::find_by_id(student_id)
            .one(&txn)
            .await
            .map_err(|e| CrmError::from_db("get student", e))?
            .ok_or_else(|| CrmError::not_found(format!("Student {student_id}")))?;

        txn.commit()
            .await
            .map_err(|e| CrmError::from_db("commit add group student", e))?;

        Ok(GroupJoinOutcome::Added(GroupMember {
            group_id,
            student: student.into_student(),
            joined_at: from_timestamp(membership.joined_at),
        }))
    }

    pub async fn remove_group_student_impl(&self, group_id: i64, student_id: i64) -> Result<bool> {
        let result = GroupStudents::delete_many()
            .filter(GroupStudentColumn::GroupId.eq(group_id))
            .filter(GroupStudentColumn::StudentId.eq(student_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("remove group student", e))?;
        Ok(result.rows_affected > 0)
    }

    pub async fn list_group_student_ids_impl(&self, group_id: i64) -> Result<Vec<i64>> {
        GroupStudents::find()
            .select_only()
            .column(GroupStudentColumn::StudentId)
            .filter(GroupStudentColumn::GroupId.eq(group_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| CrmError::from_db("list group student ids", e))
    }

    pub async fn list_student_group_ids_impl(&self, student_ids: &[i64]) -> Result<Vec<i64>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }
        GroupStudents::find()
            .select_only()
            .column(GroupStudentColumn::GroupId)
            .filter(GroupStudentColumn::StudentId.is_in(student_ids.iter().copied()))
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| CrmError::from_db("list student groups", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_group_row_is_locked_on_server_backends() {
        let postgres = locked_group(7).build(DbBackend::Postgres).to_string();
        assert!(postgres.ends_with("FOR UPDATE"), "{postgres}");
        let mysql = locked_group(7).build(DbBackend::MySql).to_string();
        assert!(mysql.ends_with("FOR UPDATE"), "{mysql}");
        let sqlite = locked_group(7).build(DbBackend::Sqlite).to_string();
        assert!(!sqlite.contains("FOR UPDATE"), "{sqlite}");
    }
}
