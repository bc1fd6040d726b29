use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequirePermission, RequireRole};
use crate::models::roles::Permission;
use crate::models::subscriptions::{
    CreateSubscriptionTypeRequest, PurchaseSubscriptionRequest, SubscriptionQueryParams,
    SubscriptionTypeQueryParams, UpdateSubscriptionRequest, UpdateSubscriptionTypeRequest,
};
use crate::models::users::UserRole;
use crate::services::SubscriptionService;
use crate::utils::SafeIDI64;

static SUBSCRIPTION_SERVICE: Lazy<SubscriptionService> =
    Lazy::new(SubscriptionService::new_lazy);

pub async fn list_types(
    req: HttpRequest,
    query: web::Query<SubscriptionTypeQueryParams>,
) -> ActixResult<HttpResponse> {
    SUBSCRIPTION_SERVICE.list_types(query.into_inner(), &req).await
}

pub async fn get_type(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBSCRIPTION_SERVICE.get_type(id.0, &req).await
}

pub async fn create_type(
    req: HttpRequest,
    body: web::Json<CreateSubscriptionTypeRequest>,
) -> ActixResult<HttpResponse> {
    SUBSCRIPTION_SERVICE.create_type(body.into_inner(), &req).await
}

pub async fn update_type(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateSubscriptionTypeRequest>,
) -> ActixResult<HttpResponse> {
    SUBSCRIPTION_SERVICE
        .update_type(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_type(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBSCRIPTION_SERVICE.delete_type(id.0, &req).await
}

pub async fn list_subscriptions(
    req: HttpRequest,
    query: web::Query<SubscriptionQueryParams>,
) -> ActixResult<HttpResponse> {
    SUBSCRIPTION_SERVICE
        .list_subscriptions(query.into_inner(), &req)
        .await
}

pub async fn get_subscription(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBSCRIPTION_SERVICE.get_subscription(id.0, &req).await
}

pub async fn purchase(
    req: HttpRequest,
    body: web::Json<PurchaseSubscriptionRequest>,
) -> ActixResult<HttpResponse> {
    SUBSCRIPTION_SERVICE.purchase(body.into_inner(), &req).await
}

pub async fn update_subscription(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateSubscriptionRequest>,
) -> ActixResult<HttpResponse> {
    SUBSCRIPTION_SERVICE
        .update_subscription(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_subscription(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBSCRIPTION_SERVICE.delete_subscription(id.0, &req).await
}

pub fn configure_subscription_routes(cfg: &mut web::ServiceConfig) {
    // 套餐类型，所有机构用户可读
    cfg.service(
        web::scope("/api/v1/subscription-types")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_types)
                            .wrap(RequireRole::new_any(UserRole::tenant_roles())),
                    )
                    .route(
                        web::post()
                            .to(create_type)
                            .wrap(RequirePermission::new(Permission::SubscriptionsManage)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_type)
                            .wrap(RequireRole::new_any(UserRole::tenant_roles())),
                    )
                    .route(
                        web::put()
                            .to(update_type)
                            .wrap(RequirePermission::new(Permission::SubscriptionsManage)),
                    )
                    .route(
                        web::delete()
                            .to(delete_type)
                            .wrap(RequirePermission::new(Permission::SubscriptionsManage)),
                    ),
            ),
    );

    cfg.service(
        web::scope("/api/v1/subscriptions")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_subscriptions)
                            .wrap(RequirePermission::new(Permission::SubscriptionsView)),
                    )
                    .route(
                        web::post()
                            .to(purchase)
                            .wrap(RequirePermission::new(Permission::SubscriptionsManage)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_subscription)
                            .wrap(RequirePermission::new(Permission::SubscriptionsView)),
                    )
                    .route(
                        web::put()
                            .to(update_subscription)
                            .wrap(RequirePermission::new(Permission::SubscriptionsManage)),
                    )
                    .route(
                        web::delete()
                            .to(delete_subscription)
                            .wrap(RequirePermission::new(Permission::SubscriptionsManage)),
                    ),
            ),
    );
}
