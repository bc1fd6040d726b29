use super::finance::insert_transaction;
use super::{SeaOrmStorage, fetch_page, now_ts, search_condition};
use crate::entity::prelude::{
    StudentSubscriptions, SubscriptionActiveModel, SubscriptionColumn, SubscriptionTypeActiveModel,
    SubscriptionTypeColumn, SubscriptionTypes,
};
use crate::errors::{CrmError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    finance::PaymentTransaction,
    subscriptions::{
        CreateSubscriptionTypeRequest, EffectiveStatus, NewSubscription, StudentSubscription,
        SubscriptionPatch, SubscriptionQueryParams, SubscriptionStatus, SubscriptionType,
        SubscriptionTypeQueryParams, UpdateSubscriptionTypeRequest,
    },
};
use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

/// 有效状态对应的 SQL 条件
fn effective_status_condition(status: EffectiveStatus, today: &str) -> Condition {
    let active = SubscriptionColumn::Status.eq(SubscriptionStatus::Active.as_str());
    let has_lessons =
        Expr::col(SubscriptionColumn::LessonsUsed).lt(Expr::col(SubscriptionColumn::LessonsTotal));
    let used_up =
        Expr::col(SubscriptionColumn::LessonsUsed).gte(Expr::col(SubscriptionColumn::LessonsTotal));

    match status {
        EffectiveStatus::Active => Condition::all()
            .add(active)
            .add(has_lessons)
            .add(SubscriptionColumn::EndDate.gte(today)),
        EffectiveStatus::Exhausted => Condition::all().add(active).add(used_up),
        EffectiveStatus::Expired => Condition::all()
            .add(active)
            .add(has_lessons)
            .add(SubscriptionColumn::EndDate.lt(today)),
        EffectiveStatus::Frozen => {
            Condition::all().add(SubscriptionColumn::Status.eq(SubscriptionStatus::Frozen.as_str()))
        }
        EffectiveStatus::Cancelled => Condition::all()
            .add(SubscriptionColumn::Status.eq(SubscriptionStatus::Cancelled.as_str())),
    }
}

impl SeaOrmStorage {
    // 套餐类型

    pub async fn list_subscription_types_impl(
        &self,
        company_id: i64,
        query: SubscriptionTypeQueryParams,
    ) -> Result<PaginatedResponse<SubscriptionType>> {
        let (page, size) = query.pagination.normalized();

        let mut select =
            SubscriptionTypes::find().filter(SubscriptionTypeColumn::CompanyId.eq(company_id));
        if let Some(is_active) = query.is_active {
            select = select.filter(SubscriptionTypeColumn::IsActive.eq(is_active));
        }
        if let Some(cond) =
            search_condition(&[SubscriptionTypeColumn::Name], query.search.as_deref())
        {
            select = select.filter(cond);
        }

        let (rows, total) = fetch_page(
            &self.db,
            select.order_by_asc(SubscriptionTypeColumn::Name),
            page,
            size,
            "list subscription types",
        )
        .await?;
        Ok(PaginatedResponse {
            items: rows.into_iter().map(|m| m.into_subscription_type()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn get_subscription_type_impl(
        &self,
        company_id: i64,
        id: i64,
    ) -> Result<Option<SubscriptionType>> {
        let row = SubscriptionTypes::find_by_id(id)
            .filter(SubscriptionTypeColumn::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get subscription type", e))?;
        Ok(row.map(|m| m.into_subscription_type()))
    }

    pub async fn create_subscription_type_impl(
        &self,
        company_id: i64,
        req: CreateSubscriptionTypeRequest,
    ) -> Result<SubscriptionType> {
        let now = now_ts();
        let model = SubscriptionTypeActiveModel {
            company_id: Set(company_id),
            name: Set(req.name),
            lessons_count: Set(req.lessons_count),
            price: Set(req.price),
            duration_days: Set(req.duration_days),
            is_active: Set(req.is_active.unwrap_or(true)),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| CrmError::from_db("create subscription type", e))?;
        Ok(model.into_subscription_type())
    }

    pub async fn update_subscription_type_impl(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateSubscriptionTypeRequest,
    ) -> Result<Option<SubscriptionType>> {
        if self.get_subscription_type_impl(company_id, id).await?.is_none() {
            return Ok(None);
        }

        let mut model = SubscriptionTypeActiveModel {
            id: Set(id),
            updated_at: Set(now_ts()),
            ..Default::default()
        };
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(lessons_count) = update.lessons_count {
            model.lessons_count = Set(lessons_count);
        }
        if let Some(price) = update.price {
            model.price = Set(price);
        }
        if let Some(duration_days) = update.duration_days {
            model.duration_days = Set(duration_days);
        }
        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description).filter(|d| !d.is_empty()));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| CrmError::from_db("update subscription type", e))?;
        Ok(Some(updated.into_subscription_type()))
    }

    /// 已售出的类型受外键限制，删除时返回 ForeignKeyViolation
    pub async fn delete_subscription_type_impl(&self, company_id: i64, id: i64) -> Result<bool> {
        let result = SubscriptionTypes::delete_many()
            .filter(SubscriptionTypeColumn::Id.eq(id))
            .filter(SubscriptionTypeColumn::CompanyId.eq(company_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("delete subscription type", e))?;
        Ok(result.rows_affected > 0)
    }

    // 学员套餐

    pub async fn list_subscriptions_impl(
        &self,
        company_id: i64,
        query: SubscriptionQueryParams,
        today: NaiveDate,
    ) -> Result<PaginatedResponse<StudentSubscription>> {
        let (page, size) = query.pagination.normalized();
        let today_text = today.format("%Y-%m-%d").to_string();

        let mut select =
            StudentSubscriptions::find().filter(SubscriptionColumn::CompanyId.eq(company_id));
        if let Some(student_id) = query.student_id {
            select = select.filter(SubscriptionColumn::StudentId.eq(student_id));
        }
        if let Some(group_id) = query.group_id {
            select = select.filter(SubscriptionColumn::GroupId.eq(group_id));
        }
        if let Some(status) = query.status {
            select = select.filter(effective_status_condition(status, &today_text));
        }

        let select = select
            .order_by_desc(SubscriptionColumn::CreatedAt)
            .order_by_desc(SubscriptionColumn::Id);
        let (rows, total) = fetch_page(&self.db, select, page, size, "list subscriptions").await?;

        Ok(PaginatedResponse {
            items: rows.into_iter().map(|m| m.into_subscription(today)).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn get_subscription_impl(
        &self,
        company_id: i64,
        id: i64,
        today: NaiveDate,
    ) -> Result<Option<StudentSubscription>> {
        let row = StudentSubscriptions::find_by_id(id)
            .filter(SubscriptionColumn::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get subscription", e))?;
        Ok(row.map(|m| m.into_subscription(today)))
    }

    /// 购买套餐，套餐与收入流水同时成功或同时失败
    pub async fn purchase_subscription_impl(
        &self,
        company_id: i64,
        purchase: NewSubscription,
        today: NaiveDate,
    ) -> Result<(StudentSubscription, Option<PaymentTransaction>)> {
        let now = now_ts();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CrmError::from_db("begin purchase subscription", e))?;

        let subscription = SubscriptionActiveModel {
            company_id: Set(company_id),
            student_id: Set(purchase.student_id),
            subscription_type_id: Set(purchase.subscription_type_id),
            group_id: Set(purchase.group_id),
            lessons_total: Set(purchase.lessons_total),
            lessons_used: Set(0),
            price_paid: Set(purchase.price_paid),
            start_date: Set(purchase.start_date),
            end_date: Set(purchase.end_date),
            status: Set(SubscriptionStatus::Active.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| CrmError::from_db("create subscription", e))?;

        let transaction = match purchase.payment {
            Some(mut payment) => {
                payment.subscription_id = Some(subscription.id);
                Some(insert_transaction(&txn, company_id, payment).await?)
            }
            None => None,
        };

        txn.commit()
            .await
            .map_err(|e| CrmError::from_db("commit purchase subscription", e))?;

        Ok((subscription.into_subscription(today), transaction))
    }

    pub async fn update_subscription_impl(
        &self,
        company_id: i64,
        id: i64,
        patch: SubscriptionPatch,
        today: NaiveDate,
    ) -> Result<Option<StudentSubscription>> {
        if self.get_subscription_impl(company_id, id, today).await?.is_none() {
            return Ok(None);
        }

        let mut model = SubscriptionActiveModel {
            id: Set(id),
            updated_at: Set(now_ts()),
            ..Default::default()
        };
        if let Some(status) = patch.status {
            model.status = Set(status.to_string());
        }
        if let Some(end_date) = patch.end_date {
            model.end_date = Set(end_date);
        }
        if let Some(lessons_total) = patch.lessons_total {
            model.lessons_total = Set(lessons_total);
        }
        if let Some(group_id) = patch.group_id {
            model.group_id = Set(group_id);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| CrmError::from_db("update subscription", e))?;
        Ok(Some(updated.into_subscription(today)))
    }

    pub async fn delete_subscription_impl(&self, company_id: i64, id: i64) -> Result<bool> {
        let result = StudentSubscriptions::delete_many()
            .filter(SubscriptionColumn::Id.eq(id))
            .filter(SubscriptionColumn::CompanyId.eq(company_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("delete subscription", e))?;
        Ok(result.rows_affected > 0)
    }
}
