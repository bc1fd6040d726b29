use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RateLimit, RequireJWT};
use crate::models::auth::{LoginRequest, RegisterCompanyRequest};
use crate::services::AuthService;

static AUTH_SERVICE: Lazy<AuthService> = Lazy::new(AuthService::new_lazy);

pub async fn register(
    req: HttpRequest,
    body: web::Json<RegisterCompanyRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.register(body.into_inner(), &req).await
}

pub async fn login(req: HttpRequest, body: web::Json<LoginRequest>) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login(body.into_inner(), &req).await
}

pub async fn refresh_token(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.refresh_token(&req).await
}

pub async fn logout(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.logout(&req).await
}

pub async fn verify_token(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.verify_token(&req).await
}

pub async fn get_user(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.get_user(&req).await
}

pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/auth")
            .service(
                web::resource("/register")
                    .wrap(RateLimit::register())
                    .route(web::post().to(register)),
            )
            .service(
                web::resource("/login")
                    .wrap(RateLimit::login())
                    .route(web::post().to(login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(RateLimit::refresh_token())
                    .route(web::post().to(refresh_token)),
            )
            .route("/logout", web::post().to(logout))
            .service(
                web::scope("")
                    .wrap(RequireJWT)
                    .route("/verify-token", web::get().to(verify_token))
                    .route("/me", web::get().to(get_user)),
            ),
    );
}
