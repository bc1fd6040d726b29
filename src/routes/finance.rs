use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequirePermission};
use crate::models::finance::{
    CreateTransactionRequest, FinanceRangeQuery, TransactionQueryParams,
};
use crate::models::roles::Permission;
use crate::services::FinanceService;
use crate::utils::SafeIDI64;

static FINANCE_SERVICE: Lazy<FinanceService> = Lazy::new(FinanceService::new_lazy);

pub async fn list_transactions(
    req: HttpRequest,
    query: web::Query<TransactionQueryParams>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE
        .list_transactions(query.into_inner(), &req)
        .await
}

pub async fn create_transaction(
    req: HttpRequest,
    body: web::Json<CreateTransactionRequest>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE
        .create_transaction(body.into_inner(), &req)
        .await
}

pub async fn delete_transaction(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.delete_transaction(id.0, &req).await
}

pub async fn summary(
    req: HttpRequest,
    query: web::Query<FinanceRangeQuery>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.summary(query.into_inner(), &req).await
}

pub async fn export(
    req: HttpRequest,
    query: web::Query<FinanceRangeQuery>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.export(query.into_inner(), &req).await
}

pub fn configure_finance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/finance")
            .wrap(RequireJWT)
            .service(
                web::resource("/transactions")
                    .route(
                        web::get()
                            .to(list_transactions)
                            .wrap(RequirePermission::new(Permission::FinanceView)),
                    )
                    .route(
                        web::post()
                            .to(create_transaction)
                            .wrap(RequirePermission::new(Permission::FinanceManage)),
                    ),
            )
            .service(
                web::resource("/transactions/{id}").route(
                    web::delete()
                        .to(delete_transaction)
                        .wrap(RequirePermission::new(Permission::FinanceManage)),
                ),
            )
            .service(
                web::resource("/summary").route(
                    web::get()
                        .to(summary)
                        .wrap(RequirePermission::new(Permission::FinanceView)),
                ),
            )
            .service(
                web::resource("/export").route(
                    web::get()
                        .to(export)
                        .wrap(RequirePermission::new(Permission::FinanceView)),
                ),
            ),
    );
}
