use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SubscriptionService;
use super::types::validate_lessons_count;
use crate::models::subscriptions::{
    StudentSubscription, SubscriptionAction, SubscriptionPatch, SubscriptionQueryParams,
    SubscriptionStatus, UpdateSubscriptionRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    ensure_exists, not_found, request_settings, storage_error, tenant_scope,
};
use crate::utils::validate::{optional_date, validate_date_order};
use crate::{try_respond, try_validate};

/// 冻结、解冻与取消对应的状态变化
pub(crate) fn apply_action(
    current: SubscriptionStatus,
    action: SubscriptionAction,
) -> Result<SubscriptionStatus, String> {
    match (action, current) {
        (SubscriptionAction::Freeze, SubscriptionStatus::Active) => Ok(SubscriptionStatus::Frozen),
        (SubscriptionAction::Unfreeze, SubscriptionStatus::Frozen) => {
            Ok(SubscriptionStatus::Active)
        }
        (SubscriptionAction::Cancel, SubscriptionStatus::Active | SubscriptionStatus::Frozen) => {
            Ok(SubscriptionStatus::Cancelled)
        }
        (action, current) => Err(format!("Cannot {action} a {current} subscription")),
    }
}

/// 校验修改并生成存储层的补丁
fn build_patch(
    existing: &StudentSubscription,
    update: UpdateSubscriptionRequest,
) -> Result<SubscriptionPatch, String> {
    if existing.status == SubscriptionStatus::Cancelled {
        return Err("A cancelled subscription cannot be changed".to_string());
    }

    let mut patch = SubscriptionPatch::default();
    if let Some(action) = update.action {
        patch.status = Some(apply_action(existing.status, action)?);
    }
    if let Some(end_date) = optional_date("end_date", update.end_date)? {
        validate_date_order(Some(&existing.start_date), Some(&end_date))?;
        patch.end_date = Some(end_date);
    }
    if let Some(total) = update.lessons_total {
        validate_lessons_count(total).map_err(|_| "lessons_total must be positive".to_string())?;
        if total < existing.lessons_used {
            return Err(format!(
                "lessons_total cannot be lower than the {} lesson(s) already used",
                existing.lessons_used
            ));
        }
        patch.lessons_total = Some(total);
    }
    patch.group_id = update.group_id.map(Some);
    Ok(patch)
}

pub async fn list_subscriptions(
    service: &SubscriptionService,
    query: SubscriptionQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let settings =
        try_respond!(request_settings(storage.as_ref(), request, scope.company_id).await);

    match storage
        .list_subscriptions(scope.company_id, query, settings.today())
        .await
    {
        Ok(subscriptions) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            subscriptions,
            "Subscriptions retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list subscriptions", e)),
    }
}

pub async fn get_subscription(
    service: &SubscriptionService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let settings =
        try_respond!(request_settings(storage.as_ref(), request, scope.company_id).await);

    match storage
        .get_subscription(scope.company_id, id, settings.today())
        .await
    {
        Ok(Some(subscription)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            subscription,
            "Subscription retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(
            ErrorCode::SubscriptionNotFound,
            "Subscription not found",
        )),
        Err(e) => Ok(storage_error("Failed to get subscription", e)),
    }
}

pub async fn update_subscription(
    service: &SubscriptionService,
    id: i64,
    update: UpdateSubscriptionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let settings =
        try_respond!(request_settings(storage.as_ref(), request, scope.company_id).await);
    let today = settings.today();

    let existing = match storage.get_subscription(scope.company_id, id, today).await {
        Ok(Some(subscription)) => subscription,
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::SubscriptionNotFound,
                "Subscription not found",
            ));
        }
        Err(e) => return Ok(storage_error("Failed to get subscription", e)),
    };

    if let Some(group_id) = update.group_id {
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
    let action = update.action;
    let patch = try_validate!(
        build_patch(&existing, update),
        ErrorCode::SubscriptionInvalid
    );

    match storage
        .update_subscription(scope.company_id, id, patch, today)
        .await
    {
        Ok(Some(subscription)) => {
            match action {
                Some(action) => info!("Subscription {} updated: {}", id, action),
                None => info!("Subscription {} updated", id),
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                subscription,
                "Subscription updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::SubscriptionNotFound,
            "Subscription not found",
        )),
        Err(e) => Ok(storage_error("Failed to update subscription", e)),
    }
}

pub async fn delete_subscription(
    service: &SubscriptionService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.delete_subscription(scope.company_id, id).await {
        Ok(true) => {
            info!("Subscription {} deleted", id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Subscription deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::SubscriptionNotFound,
            "Subscription not found",
        )),
        Err(e) => Ok(storage_error("Failed to delete subscription", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::subscriptions::EffectiveStatus;

    fn subscription(status: SubscriptionStatus, used: i32) -> StudentSubscription {
        let now = chrono::Utc::now();
        StudentSubscription {
            id: 1,
            company_id: 1,
            student_id: 1,
            subscription_type_id: 1,
            group_id: None,
            lessons_total: 8,
            lessons_used: used,
            lessons_remaining: 8 - used,
            price_paid: 100.0,
            start_date: "2025-03-01".to_string(),
            end_date: "2025-03-31".to_string(),
            status,
            effective_status: EffectiveStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_actions() {
        use SubscriptionAction::*;
        use SubscriptionStatus::*;
        assert_eq!(apply_action(Active, Freeze), Ok(Frozen));
        assert_eq!(apply_action(Frozen, Unfreeze), Ok(Active));
        assert_eq!(apply_action(Frozen, Cancel), Ok(Cancelled));
        assert!(apply_action(Frozen, Freeze).is_err());
        assert!(apply_action(Active, Unfreeze).is_err());
        assert!(apply_action(Cancelled, Cancel).is_err());
    }

    #[test]
    fn test_patch_validation() {
        let active = subscription(SubscriptionStatus::Active, 5);

        let patch = build_patch(
            &active,
            UpdateSubscriptionRequest {
                end_date: Some("2025-04-30".into()),
                lessons_total: Some(5),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(patch.end_date.as_deref(), Some("2025-04-30"));
        assert_eq!(patch.lessons_total, Some(5));

        let below_used = UpdateSubscriptionRequest {
            lessons_total: Some(4),
            ..Default::default()
        };
        assert!(build_patch(&active, below_used).is_err());

        let before_start = UpdateSubscriptionRequest {
            end_date: Some("2025-02-01".into()),
            ..Default::default()
        };
        assert!(build_patch(&active, before_start).is_err());

        let cancelled = subscription(SubscriptionStatus::Cancelled, 0);
        assert!(build_patch(&cancelled, UpdateSubscriptionRequest::default()).is_err());
    }
}
