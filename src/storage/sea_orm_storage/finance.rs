use super::{SeaOrmStorage, fetch_page, now_ts};
use crate::entity::payment_transactions::{ActiveModel, Column, Entity as PaymentTransactions};
use crate::errors::{CrmError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo, TenantScope,
    finance::{NewTransaction, PaymentTransaction, TransactionFilter},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Select,
    Set,
};

fn filtered(scope: &TenantScope, filter: &TransactionFilter) -> Select<PaymentTransactions> {
    let mut select = PaymentTransactions::find().filter(Column::CompanyId.eq(scope.company_id));
    if let Some(branch_id) = scope.branch_filter(filter.branch_id) {
        select = select.filter(Column::BranchId.eq(branch_id));
    }
    if let Some(from) = filter.from_ts {
        select = select.filter(Column::OccurredAt.gte(from));
    }
    if let Some(to) = filter.to_ts {
        select = select.filter(Column::OccurredAt.lt(to));
    }
    if let Some(kind) = filter.kind {
        select = select.filter(Column::Kind.eq(kind.as_str()));
    }
    if let Some(method) = filter.method {
        select = select.filter(Column::Method.eq(method.as_str()));
    }
    if let Some(student_id) = filter.student_id {
        select = select.filter(Column::StudentId.eq(student_id));
    }
    select
}

/// 写入流水，购买套餐时在事务连接上调用
pub(super) async fn insert_transaction<C: ConnectionTrait>(
    conn: &C,
    company_id: i64,
    tx: NewTransaction,
) -> Result<PaymentTransaction> {
    let model = ActiveModel {
        company_id: Set(company_id),
        branch_id: Set(tx.branch_id),
        student_id: Set(tx.student_id),
        subscription_id: Set(tx.subscription_id),
        amount: Set(tx.amount),
        kind: Set(tx.kind.to_string()),
        method: Set(tx.method.to_string()),
        category: Set(tx.category),
        description: Set(tx.description),
        occurred_at: Set(tx.occurred_at),
        created_by: Set(tx.created_by),
        created_at: Set(now_ts()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|e| CrmError::from_db("create transaction", e))?;
    Ok(model.into_transaction())
}

impl SeaOrmStorage {
    /// 流水列表，按发生时间倒序
    pub async fn list_transactions_impl(
        &self,
        scope: &TenantScope,
        filter: TransactionFilter,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<PaymentTransaction>> {
        let select = filtered(scope, &filter)
            .order_by_desc(Column::OccurredAt)
            .order_by_desc(Column::Id);
        let (rows, total) = fetch_page(&self.db, select, page, size, "list transactions").await?;

        Ok(PaginatedResponse {
            items: rows.into_iter().map(|m| m.into_transaction()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn list_all_transactions_impl(
        &self,
        scope: &TenantScope,
        filter: TransactionFilter,
    ) -> Result<Vec<PaymentTransaction>> {
        let rows = filtered(scope, &filter)
            .order_by_asc(Column::OccurredAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| CrmError::from_db("list transactions", e))?;
        Ok(rows.into_iter().map(|m| m.into_transaction()).collect())
    }

    pub async fn get_transaction_impl(
        &self,
        company_id: i64,
        id: i64,
    ) -> Result<Option<PaymentTransaction>> {
        let row = PaymentTransactions::find_by_id(id)
            .filter(Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get transaction", e))?;
        Ok(row.map(|m| m.into_transaction()))
    }

    pub async fn create_transaction_impl(
        &self,
        company_id: i64,
        tx: NewTransaction,
    ) -> Result<PaymentTransaction> {
        insert_transaction(&self.db, company_id, tx).await
    }

    pub async fn delete_transaction_impl(&self, company_id: i64, id: i64) -> Result<bool> {
        let result = PaymentTransactions::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("delete transaction", e))?;
        Ok(result.rows_affected > 0)
    }
}
