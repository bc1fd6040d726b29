use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SubscriptionService;
use crate::errors::CrmError;
use crate::models::subscriptions::{
    CreateSubscriptionTypeRequest, SubscriptionTypeQueryParams, UpdateSubscriptionTypeRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{conflict, not_found, storage_error, tenant_scope};
use crate::utils::validate::{clearable, optional_text, required_text, validate_money};
use crate::{try_respond, try_validate};

const MAX_LESSONS: i32 = 1000;
const MAX_DURATION_DAYS: i32 = 3650;

pub(crate) fn validate_lessons_count(count: i32) -> Result<i32, String> {
    if !(1..=MAX_LESSONS).contains(&count) {
        return Err(format!("lessons_count must be between 1 and {MAX_LESSONS}"));
    }
    Ok(count)
}

fn validate_duration_days(days: i32) -> Result<i32, String> {
    if !(1..=MAX_DURATION_DAYS).contains(&days) {
        return Err(format!(
            "duration_days must be between 1 and {MAX_DURATION_DAYS}"
        ));
    }
    Ok(days)
}

pub async fn list_types(
    service: &SubscriptionService,
    query: SubscriptionTypeQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.list_subscription_types(scope.company_id, query).await {
        Ok(types) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            types,
            "Subscription types retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list subscription types", e)),
    }
}

pub async fn get_type(
    service: &SubscriptionService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_subscription_type(scope.company_id, id).await {
        Ok(Some(kind)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            kind,
            "Subscription type retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(
            ErrorCode::SubscriptionTypeNotFound,
            "Subscription type not found",
        )),
        Err(e) => Ok(storage_error("Failed to get subscription type", e)),
    }
}

pub async fn create_type(
    service: &SubscriptionService,
    mut req: CreateSubscriptionTypeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    req.name = try_validate!(
        required_text("name", &req.name, 128),
        ErrorCode::ValidationFailed
    );
    req.lessons_count = try_validate!(
        validate_lessons_count(req.lessons_count),
        ErrorCode::ValidationFailed
    );
    try_validate!(validate_money("price", req.price), ErrorCode::ValidationFailed);
    req.duration_days = try_validate!(
        validate_duration_days(req.duration_days),
        ErrorCode::ValidationFailed
    );
    req.description = optional_text(req.description);

    match storage.create_subscription_type(scope.company_id, req).await {
        Ok(kind) => {
            info!(
                "Subscription type {} created in company {}",
                kind.id, scope.company_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                kind,
                "Subscription type created successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to create subscription type", e)),
    }
}

pub async fn update_type(
    service: &SubscriptionService,
    id: i64,
    mut update: UpdateSubscriptionTypeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    if let Some(name) = update.name.take() {
        update.name = Some(try_validate!(
            required_text("name", &name, 128),
            ErrorCode::ValidationFailed
        ));
    }
    if let Some(count) = update.lessons_count {
        try_validate!(validate_lessons_count(count), ErrorCode::ValidationFailed);
    }
    if let Some(price) = update.price {
        try_validate!(validate_money("price", price), ErrorCode::ValidationFailed);
    }
    if let Some(days) = update.duration_days {
        try_validate!(validate_duration_days(days), ErrorCode::ValidationFailed);
    }
    update.description = try_validate!(
        clearable(update.description, |v| Ok(optional_text(v))),
        ErrorCode::ValidationFailed
    );

    // 已售出的套餐不受影响，课时与有效期在购买时确定
    match storage
        .update_subscription_type(scope.company_id, id, update)
        .await
    {
        Ok(Some(kind)) => {
            info!("Subscription type {} updated", kind.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                kind,
                "Subscription type updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::SubscriptionTypeNotFound,
            "Subscription type not found",
        )),
        Err(e) => Ok(storage_error("Failed to update subscription type", e)),
    }
}

pub async fn delete_type(
    service: &SubscriptionService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.delete_subscription_type(scope.company_id, id).await {
        Ok(true) => {
            info!("Subscription type {} deleted", id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Subscription type deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::SubscriptionTypeNotFound,
            "Subscription type not found",
        )),
        Err(CrmError::ForeignKeyViolation(_)) => Ok(conflict(
            ErrorCode::Conflict,
            "Subscription type has been sold, deactivate it instead",
        )),
        Err(e) => Ok(storage_error("Failed to delete subscription type", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_bounds() {
        assert!(validate_lessons_count(0).is_err());
        assert_eq!(validate_lessons_count(8), Ok(8));
        assert!(validate_lessons_count(1001).is_err());
        assert!(validate_duration_days(0).is_err());
        assert_eq!(validate_duration_days(30), Ok(30));
    }
}
