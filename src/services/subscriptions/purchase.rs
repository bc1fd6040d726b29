use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Duration, NaiveDate, Utc};
use tracing::info;

use super::SubscriptionService;
use crate::middlewares::RequireJWT;
use crate::models::finance::{NewTransaction, PaymentMethod, TransactionKind};
use crate::models::subscriptions::{
    NewSubscription, PurchaseSubscriptionRequest, PurchaseSubscriptionResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    bad_request, checked_branch, ensure_exists, request_settings, storage_error, tenant_scope,
};
use crate::services::finance::transactions::validate_amount;
use crate::utils::validate::parse_date;
use crate::{try_respond, try_validate};

/// 实付金额保留两位小数；恰为 0 时是免费套餐，不记收入流水
pub(crate) fn paid_amount(price_paid: f64) -> Result<Option<f64>, String> {
    if price_paid == 0.0 {
        return Ok(None);
    }
    validate_amount(price_paid)
        .map(Some)
        .map_err(|_| "price_paid must be zero or a positive amount".to_string())
}

/// 到期日为开始日期加上有效天数
pub(crate) fn subscription_end_date(start: NaiveDate, duration_days: i32) -> NaiveDate {
    start + Duration::days(i64::from(duration_days))
}

pub async fn purchase_subscription(
    service: &SubscriptionService,
    req: PurchaseSubscriptionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let settings =
        try_respond!(request_settings(storage.as_ref(), request, scope.company_id).await);
    let today = settings.today();

    let kind = try_respond!(
        ensure_exists(
            storage.get_subscription_type(scope.company_id, req.subscription_type_id),
            ErrorCode::SubscriptionTypeNotFound,
            "Subscription type",
            req.subscription_type_id
        )
        .await
    );
    if !kind.is_active {
        return Ok(bad_request(
            ErrorCode::SubscriptionTypeInactive,
            format!("Subscription type '{}' is not available for sale", kind.name),
        ));
    }
    let student = try_respond!(
        ensure_exists(
            storage.get_student(scope.company_id, req.student_id),
            ErrorCode::StudentNotFound,
            "Student",
            req.student_id
        )
        .await
    );
    if let Some(group_id) = req.group_id {
        try_respond!(
            ensure_exists(
                storage.get_group(scope.company_id, group_id),
                ErrorCode::GroupNotFound,
                "Group",
                group_id
            )
            .await
        );
    }

    let start = match req.start_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => try_validate!(parse_date("start_date", value), ErrorCode::ValidationFailed),
        None => today,
    };
    let amount = try_validate!(
        paid_amount(req.price_paid.unwrap_or(kind.price)),
        ErrorCode::ValidationFailed
    );
    let branch_id = try_respond!(
        checked_branch(
            storage.as_ref(),
            &scope,
            req.branch_id.or(student.branch_id)
        )
        .await
    );

    let purchase = NewSubscription {
        student_id: student.id,
        subscription_type_id: kind.id,
        group_id: req.group_id,
        lessons_total: kind.lessons_count,
        price_paid: amount.unwrap_or(0.0),
        start_date: start.format("%Y-%m-%d").to_string(),
        end_date: subscription_end_date(start, kind.duration_days)
            .format("%Y-%m-%d")
            .to_string(),
        payment: amount.map(|amount| NewTransaction {
            branch_id,
            student_id: Some(student.id),
            subscription_id: None,
            amount,
            kind: TransactionKind::Income,
            method: req.method.unwrap_or(PaymentMethod::Cash),
            category: Some("subscription".to_string()),
            description: Some(format!("Subscription: {}", kind.name)),
            occurred_at: Utc::now().timestamp(),
            created_by: RequireJWT::extract_user_id(request),
        }),
    };

    match storage
        .purchase_subscription(scope.company_id, purchase, today)
        .await
    {
        Ok((subscription, payment)) => {
            match &payment {
                Some(payment) => info!(
                    "Student {} purchased subscription {} (type {}), payment {}",
                    student.id, subscription.id, kind.id, payment.id
                ),
                None => info!(
                    "Student {} received free subscription {} (type {})",
                    student.id, subscription.id, kind.id
                ),
            }
            Ok(HttpResponse::Created().json(ApiResponse::success(
                PurchaseSubscriptionResponse {
                    subscription,
                    transaction: payment,
                },
                "Subscription purchased successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to purchase subscription", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paid_amount() {
        assert_eq!(paid_amount(0.0), Ok(None));
        assert_eq!(paid_amount(99.999), Ok(Some(100.0)));
        assert_eq!(paid_amount(12.344), Ok(Some(12.34)));
        assert!(paid_amount(-5.0).is_err());
        assert!(paid_amount(0.001).is_err());
        assert!(paid_amount(f64::NAN).is_err());
    }

    #[test]
    fn test_end_date_adds_duration() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(
            subscription_end_date(start, 30),
            NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()
        );
        assert_eq!(
            subscription_end_date(start, 1),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
        );
    }
}
