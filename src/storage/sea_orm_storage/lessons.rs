use super::{SeaOrmStorage, fetch_page, now_ts};
use crate::entity::lessons::{ActiveModel, Column, Entity as Lessons};
use crate::entity::prelude::{
    AttendanceActiveModel, AttendanceColumn, GroupStudentColumn, GroupStudents, LessonAttendance,
    StudentSubscriptions, SubscriptionActiveModel, SubscriptionColumn,
};
use crate::errors::{CrmError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo, TenantScope,
    lessons::{
        AttendanceCharge, AttendanceInput, CompleteLessonResponse, Lesson,
        LessonAttendance as Attendance, LessonQueryParams, LessonStatus,
    },
    subscriptions::SubscriptionStatus,
};
use crate::storage::{CompletionRules, LessonRecord};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::warn;

/// 学员参与的课程：个人课程或其所在班组的课程
fn student_lessons_condition(student_id: i64) -> Condition {
    Condition::any()
        .add(Column::StudentId.eq(student_id))
        .add(
            Column::GroupId.in_subquery(
                Query::select()
                    .column(GroupStudentColumn::GroupId)
                    .from(GroupStudents)
                    .and_where(GroupStudentColumn::StudentId.eq(student_id))
                    .to_owned(),
            ),
        )
}

impl SeaOrmStorage {
    pub async fn list_lessons_impl(
        &self,
        scope: &TenantScope,
        query: LessonQueryParams,
    ) -> Result<PaginatedResponse<Lesson>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Lessons::find().filter(Column::CompanyId.eq(scope.company_id));
        if let Some(branch_id) = scope.branch_filter(query.branch_id) {
            select = select.filter(Column::BranchId.eq(branch_id));
        }
        if let Some(from) = query.from {
            select = select.filter(Column::EndTime.gt(from.timestamp()));
        }
        if let Some(to) = query.to {
            select = select.filter(Column::StartTime.lt(to.timestamp()));
        }
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }
        if let Some(room_id) = query.room_id {
            select = select.filter(Column::RoomId.eq(room_id));
        }
        if let Some(group_id) = query.group_id {
            select = select.filter(Column::GroupId.eq(group_id));
        }
        if let Some(student_id) = query.student_id {
            select = select.filter(student_lessons_condition(student_id));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        let select = select
            .order_by_asc(Column::StartTime)
            .order_by_asc(Column::Id);
        let (rows, total) = fetch_page(&self.db, select, page, size, "list lessons").await?;

        Ok(PaginatedResponse {
            items: rows.into_iter().map(|m| m.into_lesson()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn get_lesson_impl(&self, company_id: i64, id: i64) -> Result<Option<Lesson>> {
        let row = Lessons::find_by_id(id)
            .filter(Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get lesson", e))?;
        Ok(row.map(|m| m.into_lesson()))
    }

    /// 与 [start, end) 相交且未取消的课程
    pub async fn list_active_lessons_between_impl(
        &self,
        company_id: i64,
        start: i64,
        end: i64,
    ) -> Result<Vec<Lesson>> {
        let rows = Lessons::find()
            .filter(Column::CompanyId.eq(company_id))
            .filter(Column::Status.ne(LessonStatus::Cancelled.as_str()))
            .filter(Column::StartTime.lt(end))
            .filter(Column::EndTime.gt(start))
            .order_by_asc(Column::StartTime)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| CrmError::from_db("list lessons in window", e))?;
        Ok(rows.into_iter().map(|m| m.into_lesson()).collect())
    }

    pub async fn create_lesson_impl(&self, company_id: i64, lesson: LessonRecord) -> Result<Lesson> {
        let now = now_ts();
        let model = ActiveModel {
            company_id: Set(company_id),
            branch_id: Set(lesson.branch_id),
            group_id: Set(lesson.group_id),
            student_id: Set(lesson.student_id),
            teacher_id: Set(lesson.teacher_id),
            room_id: Set(lesson.room_id),
            subject: Set(lesson.subject),
            start_time: Set(lesson.start_time),
            end_time: Set(lesson.end_time),
            status: Set(lesson.status.to_string()),
            notes: Set(lesson.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| CrmError::from_db("create lesson", e))?;
        Ok(model.into_lesson())
    }

    /// 整体替换课程字段，合并逻辑在服务层完成
    pub async fn update_lesson_impl(
        &self,
        company_id: i64,
        id: i64,
        lesson: LessonRecord,
    ) -> Result<Option<Lesson>> {
        if self.get_lesson_impl(company_id, id).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(id),
            branch_id: Set(lesson.branch_id),
            group_id: Set(lesson.group_id),
            student_id: Set(lesson.student_id),
            teacher_id: Set(lesson.teacher_id),
            room_id: Set(lesson.room_id),
            subject: Set(lesson.subject),
            start_time: Set(lesson.start_time),
            end_time: Set(lesson.end_time),
            status: Set(lesson.status.to_string()),
            notes: Set(lesson.notes),
            updated_at: Set(now_ts()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| CrmError::from_db("update lesson", e))?;
        Ok(Some(model.into_lesson()))
    }

    pub async fn delete_lesson_impl(&self, company_id: i64, id: i64) -> Result<bool> {
        let result = Lessons::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("delete lesson", e))?;
        Ok(result.rows_affected > 0)
    }

    pub async fn set_lesson_status_impl(
        &self,
        company_id: i64,
        id: i64,
        status: LessonStatus,
    ) -> Result<Option<Lesson>> {
        if self.get_lesson_impl(company_id, id).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(id),
            status: Set(status.to_string()),
            updated_at: Set(now_ts()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| CrmError::from_db("set lesson status", e))?;
        Ok(Some(model.into_lesson()))
    }

    /// 完成课程
    ///
    /// 考勤、扣课与课程状态在同一事务内写入。需要扣课的学员从可用套餐中
    /// 选择最早到期的一个（同日按 id），找不到时只记录考勤并给出提示。
    pub async fn complete_lesson_impl(
        &self,
        company_id: i64,
        id: i64,
        attendance: Vec<AttendanceInput>,
        notes: Option<String>,
        rules: CompletionRules,
    ) -> Result<Option<CompleteLessonResponse>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CrmError::from_db("begin complete lesson", e))?;

        let Some(lesson) = Lessons::find_by_id(id)
            .filter(Column::CompanyId.eq(company_id))
            .one(&txn)
            .await
            .map_err(|e| CrmError::from_db("get lesson", e))?
        else {
            return Ok(None);
        };
        if lesson.status == LessonStatus::Completed.as_str() {
            return Err(CrmError::conflict(format!("Lesson {id} is already completed")));
        }

        let now = now_ts();
        let today = rules.today.format("%Y-%m-%d").to_string();
        let mut charges = Vec::with_capacity(attendance.len());

        for entry in attendance {
            let mut charge = AttendanceCharge {
                student_id: entry.student_id,
                status: entry.status,
                charged: false,
                subscription_id: None,
                lessons_remaining: None,
                warning: None,
            };

            if entry.status.is_charged(rules.charge_absent) {
                match charge_subscription(&txn, company_id, entry.student_id, lesson.group_id, &today)
                    .await?
                {
                    Some((subscription_id, remaining)) => {
                        charge.charged = true;
                        charge.subscription_id = Some(subscription_id);
                        charge.lessons_remaining = Some(remaining);
                    }
                    None => {
                        warn!(
                            "Student {} attended lesson {} without a usable subscription",
                            entry.student_id, id
                        );
                        charge.warning = Some("No usable subscription".to_string());
                    }
                }
            }

            AttendanceActiveModel {
                lesson_id: Set(id),
                student_id: Set(entry.student_id),
                status: Set(entry.status.to_string()),
                subscription_id: Set(charge.subscription_id),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| CrmError::from_db("record attendance", e))?;

            charges.push(charge);
        }

        let mut update = ActiveModel {
            id: Set(id),
            status: Set(LessonStatus::Completed.to_string()),
            updated_at: Set(now),
            ..Default::default()
        };
        if let Some(notes) = notes {
            update.notes = Set(Some(notes).filter(|n| !n.is_empty()));
        }
        let lesson = update
            .update(&txn)
            .await
            .map_err(|e| CrmError::from_db("complete lesson", e))?;

        txn.commit()
            .await
            .map_err(|e| CrmError::from_db("commit complete lesson", e))?;

        Ok(Some(CompleteLessonResponse {
            lesson: lesson.into_lesson(),
            attendance: charges,
        }))
    }

    pub async fn list_lesson_attendance_impl(&self, lesson_id: i64) -> Result<Vec<Attendance>> {
        let rows = LessonAttendance::find()
            .filter(AttendanceColumn::LessonId.eq(lesson_id))
            .order_by_asc(AttendanceColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| CrmError::from_db("list attendance", e))?;
        Ok(rows.into_iter().map(|m| m.into_attendance()).collect())
    }
}

/// 为学员扣一次课，返回 (套餐 id, 剩余课时)
async fn charge_subscription<C: ConnectionTrait>(
    conn: &C,
    company_id: i64,
    student_id: i64,
    lesson_group_id: Option<i64>,
    today: &str,
) -> Result<Option<(i64, i32)>> {
    let mut group_match = Condition::any().add(SubscriptionColumn::GroupId.is_null());
    if let Some(group_id) = lesson_group_id {
        group_match = group_match.add(SubscriptionColumn::GroupId.eq(group_id));
    }

    let candidates = StudentSubscriptions::find()
        .filter(SubscriptionColumn::CompanyId.eq(company_id))
        .filter(SubscriptionColumn::StudentId.eq(student_id))
        .filter(SubscriptionColumn::Status.eq(SubscriptionStatus::Active.as_str()))
        .filter(SubscriptionColumn::EndDate.gte(today))
        .filter(group_match)
        .order_by_asc(SubscriptionColumn::EndDate)
        .order_by_asc(SubscriptionColumn::Id)
        .all(conn)
        .await
        .map_err(|e| CrmError::from_db("find usable subscription", e))?;

    let Some(subscription) = candidates
        .into_iter()
        .find(|s| s.lessons_used < s.lessons_total)
    else {
        return Ok(None);
    };

    let used = subscription.lessons_used + 1;
    let updated = SubscriptionActiveModel {
        id: Set(subscription.id),
        lessons_used: Set(used),
        updated_at: Set(now_ts()),
        ..Default::default()
    }
    .update(conn)
    .await
    .map_err(|e| CrmError::from_db("charge subscription", e))?;

    Ok(Some((updated.id, updated.lessons_total - updated.lessons_used)))
}
