use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::errors::{CrmError, Result};
use crate::models::{
    TenantScope,
    dashboard::{DashboardStats, DashboardWindow, LeadStatusCount, TodayLessons},
    finance::TransactionKind,
    groups::GroupStatus,
    leads::LeadStatus,
    lessons::LessonStatus,
    students::StudentStatus,
    subscriptions::SubscriptionStatus,
    teachers::TeacherStatus,
};
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Select};

/// 按分校限制查询，`column` 为该表的 branch_id 列
fn scoped<E: EntityTrait, C: ColumnTrait>(
    select: Select<E>,
    scope: &TenantScope,
    column: C,
) -> Select<E> {
    match scope.branch_id {
        Some(branch_id) => select.filter(column.eq(branch_id)),
        None => select,
    }
}

impl SeaOrmStorage {
    pub async fn dashboard_stats_impl(
        &self,
        scope: &TenantScope,
        window: &DashboardWindow,
    ) -> Result<DashboardStats> {
        let cid = scope.company_id;
        let err = |e| CrmError::from_db("dashboard stats", e);

        let active_students = scoped(
            Students::find()
                .filter(StudentColumn::CompanyId.eq(cid))
                .filter(StudentColumn::Status.eq(StudentStatus::Active.as_str())),
            scope,
            StudentColumn::BranchId,
        )
        .count(&self.db)
        .await
        .map_err(err)?;

        let active_teachers = scoped(
            Teachers::find()
                .filter(TeacherColumn::CompanyId.eq(cid))
                .filter(TeacherColumn::Status.eq(TeacherStatus::Active.as_str())),
            scope,
            TeacherColumn::BranchId,
        )
        .count(&self.db)
        .await
        .map_err(err)?;

        let active_groups = scoped(
            Groups::find()
                .filter(GroupColumn::CompanyId.eq(cid))
                .filter(GroupColumn::Status.eq(GroupStatus::Active.as_str())),
            scope,
            GroupColumn::BranchId,
        )
        .count(&self.db)
        .await
        .map_err(err)?;

        // 今日课程
        let statuses: Vec<String> = scoped(
            Lessons::find()
                .select_only()
                .column(LessonColumn::Status)
                .filter(LessonColumn::CompanyId.eq(cid))
                .filter(LessonColumn::StartTime.gte(window.day_start))
                .filter(LessonColumn::StartTime.lt(window.day_end)),
            scope,
            LessonColumn::BranchId,
        )
        .into_tuple()
        .all(&self.db)
        .await
        .map_err(err)?;
        let mut today_lessons = TodayLessons::default();
        for status in statuses {
            match status.parse::<LessonStatus>() {
                Ok(LessonStatus::Scheduled) => today_lessons.scheduled += 1,
                Ok(LessonStatus::Completed) => today_lessons.completed += 1,
                Ok(LessonStatus::Cancelled) => today_lessons.cancelled += 1,
                _ => {}
            }
        }

        let mut leads_by_status = Vec::with_capacity(LeadStatus::ALL.len());
        for status in LeadStatus::ALL {
            let count = scoped(
                Leads::find()
                    .filter(LeadColumn::CompanyId.eq(cid))
                    .filter(LeadColumn::Status.eq(status.as_str())),
                scope,
                LeadColumn::BranchId,
            )
            .count(&self.db)
            .await
            .map_err(err)?;
            leads_by_status.push(LeadStatusCount {
                status: *status,
                count: count as i64,
            });
        }

        // 本月收支
        let amounts: Vec<(String, f64)> = scoped(
            PaymentTransactions::find()
                .select_only()
                .column(TransactionColumn::Kind)
                .column(TransactionColumn::Amount)
                .filter(TransactionColumn::CompanyId.eq(cid))
                .filter(TransactionColumn::OccurredAt.gte(window.month_start))
                .filter(TransactionColumn::OccurredAt.lt(window.month_end)),
            scope,
            TransactionColumn::BranchId,
        )
        .into_tuple()
        .all(&self.db)
        .await
        .map_err(err)?;
        let (mut month_income, mut month_expense) = (0.0, 0.0);
        for (kind, amount) in amounts {
            match kind.parse::<TransactionKind>() {
                Ok(TransactionKind::Income) => month_income += amount,
                Ok(TransactionKind::Expense) => month_expense += amount,
                _ => {}
            }
        }

        // 有效套餐：未冻结、未取消、有剩余课时、未过期
        let usable = || {
            StudentSubscriptions::find()
                .filter(SubscriptionColumn::CompanyId.eq(cid))
                .filter(SubscriptionColumn::Status.eq(SubscriptionStatus::Active.as_str()))
                .filter(
                    Expr::col(SubscriptionColumn::LessonsUsed)
                        .lt(Expr::col(SubscriptionColumn::LessonsTotal)),
                )
                .filter(SubscriptionColumn::EndDate.gte(window.today.as_str()))
        };

        let expiring_subscriptions = usable()
            .filter(SubscriptionColumn::EndDate.lte(window.expiring_until.as_str()))
            .count(&self.db)
            .await
            .map_err(err)?;

        let low_balance_subscriptions = usable()
            .filter(
                Expr::col(SubscriptionColumn::LessonsTotal)
                    .sub(Expr::col(SubscriptionColumn::LessonsUsed))
                    .lte(window.low_balance_threshold),
            )
            .count(&self.db)
            .await
            .map_err(err)?;

        Ok(DashboardStats {
            active_students: active_students as i64,
            active_teachers: active_teachers as i64,
            active_groups: active_groups as i64,
            today_lessons,
            leads_by_status,
            month_income,
            month_expense,
            expiring_subscriptions: expiring_subscriptions as i64,
            low_balance_subscriptions: low_balance_subscriptions as i64,
            currency: String::new(),
        })
    }
}
