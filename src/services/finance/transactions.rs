use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Duration, Utc};
use tracing::info;

use super::FinanceService;
use super::summary::day_start_ts;
use crate::middlewares::RequireJWT;
use crate::models::finance::{
    CreateTransactionRequest, NewTransaction, TransactionFilter, TransactionQueryParams,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    bad_request, checked_branch, ensure_exists, not_found, request_settings, storage_error,
    tenant_scope,
};
use crate::utils::validate::{optional_text, parse_date};
use crate::{try_respond, try_validate};

/// 金额保留两位小数后必须为正数
pub(crate) fn validate_amount(amount: f64) -> Result<f64, String> {
    let rounded = (amount * 100.0).round() / 100.0;
    if !rounded.is_finite() || rounded <= 0.0 {
        return Err("amount must be greater than zero".to_string());
    }
    Ok(rounded)
}

pub async fn list_transactions(
    service: &FinanceService,
    query: TransactionQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let settings =
        try_respond!(request_settings(storage.as_ref(), request, scope.company_id).await);
    let offset = settings.offset();

    let mut filter = TransactionFilter {
        kind: query.kind,
        method: query.method,
        student_id: query.student_id,
        branch_id: query.branch_id,
        ..Default::default()
    };
    if let Some(from) = query.from.as_deref().filter(|v| !v.trim().is_empty()) {
        let from = try_validate!(parse_date("from", from), ErrorCode::ValidationFailed);
        filter.from_ts = Some(try_validate!(
            day_start_ts(offset, from),
            ErrorCode::ValidationFailed
        ));
    }
    if let Some(to) = query.to.as_deref().filter(|v| !v.trim().is_empty()) {
        let to = try_validate!(parse_date("to", to), ErrorCode::ValidationFailed);
        filter.to_ts = Some(try_validate!(
            day_start_ts(offset, to + Duration::days(1)),
            ErrorCode::ValidationFailed
        ));
    }

    let (page, size) = query.pagination.normalized();
    match storage.list_transactions(&scope, filter, page, size).await {
        Ok(transactions) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            transactions,
            "Transactions retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list transactions", e)),
    }
}

pub async fn create_transaction(
    service: &FinanceService,
    req: CreateTransactionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    let amount = try_validate!(validate_amount(req.amount), ErrorCode::TransactionInvalid);
    if let Some(student_id) = req.student_id {
        try_respond!(
            ensure_exists(
                storage.get_student(scope.company_id, student_id),
                ErrorCode::StudentNotFound,
                "Student",
                student_id
            )
            .await
        );
    }
    if let Some(subscription_id) = req.subscription_id {
        let subscription = try_respond!(
            ensure_exists(
                storage.get_subscription(scope.company_id, subscription_id, Utc::now().date_naive()),
                ErrorCode::SubscriptionNotFound,
                "Subscription",
                subscription_id
            )
            .await
        );
        if req.student_id.is_some_and(|id| id != subscription.student_id) {
            return Ok(bad_request(
                ErrorCode::TransactionInvalid,
                "Subscription belongs to another student",
            ));
        }
    }
    let branch_id = try_respond!(checked_branch(storage.as_ref(), &scope, req.branch_id).await);

    let tx = NewTransaction {
        branch_id,
        student_id: req.student_id,
        subscription_id: req.subscription_id,
        amount,
        kind: req.kind,
        method: req.method,
        category: optional_text(req.category),
        description: optional_text(req.description),
        occurred_at: req.occurred_at.unwrap_or_else(Utc::now).timestamp(),
        created_by: RequireJWT::extract_user_id(request),
    };

    match storage.create_transaction(scope.company_id, tx).await {
        Ok(transaction) => {
            info!(
                "Transaction {} ({} {}) recorded in company {}",
                transaction.id, transaction.kind, transaction.amount, scope.company_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                transaction,
                "Transaction created successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to create transaction", e)),
    }
}

pub async fn delete_transaction(
    service: &FinanceService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_transaction(scope.company_id, id).await {
        Ok(Some(tx)) if scope.can_access_branch(tx.branch_id) => {}
        Ok(_) => {
            return Ok(not_found(
                ErrorCode::TransactionNotFound,
                "Transaction not found",
            ));
        }
        Err(e) => return Ok(storage_error("Failed to get transaction", e)),
    }

    match storage.delete_transaction(scope.company_id, id).await {
        Ok(true) => {
            info!("Transaction {} deleted from company {}", id, scope.company_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Transaction deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::TransactionNotFound,
            "Transaction not found",
        )),
        Err(e) => Ok(storage_error("Failed to delete transaction", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_must_be_positive() {
        assert!(validate_amount(0.0).is_err());
        assert!(validate_amount(-5.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
        assert_eq!(validate_amount(19.999), Ok(20.0));
        assert_eq!(validate_amount(0.01), Ok(0.01));
        assert!(validate_amount(0.001).is_err());
    }
}
