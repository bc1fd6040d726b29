/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <token>`，把当前用户放入请求扩展。
 * 用户信息按 token 缓存；机构被停用时拒绝其所有用户的请求。
 *
 * ```rust,ignore
 * web::scope("/api/v1/teachers")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_teachers))
 * ```
 *
 * 处理函数中通过 `RequireJWT::extract_user` / `RequireJWT::extract_scope` 取用。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, StatusCode},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;
use crate::cache::{self, ObjectCache, keys};
use crate::models::companies::entities::CompanyStatus;
use crate::models::users::entities::{User, UserRole, UserStatus};
use crate::models::{ErrorCode, TenantScope};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;

#[derive(Clone)]
pub struct RequireJWT;

/// 认证失败的原因，决定返回的状态码
enum AuthFailure {
    Unauthorized(&'static str),
    Forbidden(ErrorCode, &'static str),
    Internal(&'static str),
}

fn app_services(req: &ServiceRequest) -> Option<(Arc<dyn Storage>, Arc<dyn ObjectCache>)> {
    let storage = req.app_data::<web::Data<Arc<dyn Storage>>>()?.get_ref().clone();
    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()?
        .get_ref()
        .clone();
    Some((storage, cache))
}

async fn load_user(
    storage: &dyn Storage,
    cache: &dyn ObjectCache,
    token: &str,
    user_id: i64,
) -> Result<User, AuthFailure> {
    let key = keys::user_by_token(token);
    if let Some(user) = cache::get_json::<User>(cache, &key).await {
        if user.id == user_id {
            debug!("Authenticated user {} served from cache", user.id);
            return Ok(user);
        }
        cache.remove(&key).await;
    }

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| {
            error!("Failed to load user {}: {}", user_id, e);
            AuthFailure::Internal("Failed to load user")
        })?
        .ok_or(AuthFailure::Unauthorized("User not found"))?;

    cache::insert_json(cache, key, &user, 0).await;
    Ok(user)
}

async fn company_status(
    storage: &dyn Storage,
    cache: &dyn ObjectCache,
    company_id: i64,
) -> Result<CompanyStatus, AuthFailure> {
    let key = keys::company_status(company_id);
    if let Some(status) = cache::get_json::<CompanyStatus>(cache, &key).await {
        return Ok(status);
    }

    let company = storage
        .get_company(company_id)
        .await
        .map_err(|e| {
            error!("Failed to load company {}: {}", company_id, e);
            AuthFailure::Internal("Failed to load company")
        })?
        .ok_or(AuthFailure::Unauthorized("Company not found"))?;

    cache::insert_json(cache, key, &company.status, 0).await;
    Ok(company.status)
}

async fn authenticate(req: &ServiceRequest) -> Result<User, AuthFailure> {
    let token = JwtUtils::extract_bearer_token(req.request())
        .ok_or(AuthFailure::Unauthorized("Missing or invalid Authorization header"))?;

    let claims = JwtUtils::verify_access_token(&token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        AuthFailure::Unauthorized("Invalid or expired token")
    })?;
    let user_id = claims
        .user_id()
        .ok_or(AuthFailure::Unauthorized("Invalid user ID in token"))?;

    let (storage, cache) =
        app_services(req).ok_or(AuthFailure::Internal("Application state is not configured"))?;

    let user = load_user(storage.as_ref(), cache.as_ref(), &token, user_id).await?;
    if user.status != UserStatus::Active {
        return Err(AuthFailure::Forbidden(
            ErrorCode::UserInactive,
            "User account is not active",
        ));
    }

    if let Some(company_id) = user.company_id
        && company_status(storage.as_ref(), cache.as_ref(), company_id).await?
            == CompanyStatus::Suspended
    {
        return Err(AuthFailure::Forbidden(
            ErrorCode::CompanySuspended,
            "Company is suspended",
        ));
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // CORS 预检直接放行
            if req.method() == Method::OPTIONS {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            match authenticate(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for user {}", user.id);
                    if let Some(company_id) = user.company_id {
                        req.extensions_mut()
                            .insert(TenantScope::new(company_id, user.branch_id));
                    }
                    req.extensions_mut().insert(user);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(failure) => {
                    let (status, code, message) = match failure {
                        AuthFailure::Unauthorized(msg) => {
                            (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, msg)
                        }
                        AuthFailure::Forbidden(code, msg) => (StatusCode::FORBIDDEN, code, msg),
                        AuthFailure::Internal(msg) => (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            msg,
                        ),
                    };
                    info!("Authentication failed for {}: {}", req.path(), message);
                    Ok(req.into_response(
                        create_error_response(status, code, message).map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 当前用户，仅在 RequireJWT 之后可用
    pub fn extract_user(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    pub fn extract_user_role(req: &HttpRequest) -> Option<UserRole> {
        req.extensions().get::<User>().map(|user| user.role)
    }

    /// 当前用户的租户范围，平台管理员没有
    pub fn extract_scope(req: &HttpRequest) -> Option<TenantScope> {
        req.extensions().get::<TenantScope>().copied()
    }
}
