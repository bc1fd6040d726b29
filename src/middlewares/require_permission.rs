/*!
 * 基于角色权限的访问控制
 *
 * 必须在 RequireJWT 之后使用。机构所有者拥有全部权限，员工使用其角色的权限集合，
 * 平台管理员不属于任何机构，因此不能访问机构数据。
 *
 * ```rust,ignore
 * web::resource("/{id}")
 *     .route(web::put().to(update_teacher))
 *     .wrap(RequirePermission::new(Permission::TeachersManage))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;
use crate::cache::{self, ObjectCache, keys};
use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::ErrorCode;
use crate::models::roles::entities::{Permission, grants};
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

/// 计算用户在其机构内拥有的权限
pub async fn resolve_permissions(
    storage: &dyn Storage,
    cache: &dyn ObjectCache,
    user: &User,
) -> Result<Vec<Permission>> {
    let (Some(company_id), role) = (user.company_id, user.role) else {
        return Ok(Vec::new());
    };
    match role {
        UserRole::SuperAdmin => Ok(Vec::new()),
        UserRole::Owner => Ok(Permission::ALL.to_vec()),
        UserRole::Staff => {
            let Some(role_id) = user.role_id else {
                return Ok(Vec::new());
            };
            let key = keys::role_permissions(role_id);
            if let Some(permissions) = cache::get_json::<Vec<Permission>>(cache, &key).await {
                debug!("Permissions of role {} served from cache", role_id);
                return Ok(permissions);
            }
            let permissions = storage
                .get_role(company_id, role_id)
                .await?
                .map(|role| role.permissions)
                .unwrap_or_default();
            cache::insert_json(cache, key, &permissions, 0).await;
            Ok(permissions)
        }
    }
}

#[derive(Clone)]
pub struct RequirePermission {
    required: Permission,
}

impl RequirePermission {
    pub fn new(required: Permission) -> Self {
        Self { required }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequirePermission
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequirePermissionMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequirePermissionMiddleware {
            service: Rc::new(service),
            required: self.required,
        }))
    }
}

pub struct RequirePermissionMiddleware<S> {
    service: Rc<S>,
    required: Permission,
}

impl<S, B> Service<ServiceRequest> for RequirePermissionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let required = self.required;

        Box::pin(async move {
            let Some(user) = RequireJWT::extract_user(req.request()) else {
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Authentication required",
                    )
                    .map_into_right_body(),
                ));
            };

            if user.company_id.is_none() {
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::FORBIDDEN,
                        ErrorCode::Forbidden,
                        "Platform administrators cannot access company data",
                    )
                    .map_into_right_body(),
                ));
            }

            let storage = req
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .map(|s| s.get_ref().clone());
            let cache = req
                .app_data::<web::Data<Arc<dyn ObjectCache>>>()
                .map(|c| c.get_ref().clone());
            let (Some(storage), Some(cache)) = (storage, cache) else {
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalServerError,
                        "Application state is not configured",
                    )
                    .map_into_right_body(),
                ));
            };

            let held = match resolve_permissions(storage.as_ref(), cache.as_ref(), &user).await {
                Ok(held) => held,
                Err(e) => {
                    error!("Failed to resolve permissions for user {}: {}", user.id, e);
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            "Failed to resolve permissions",
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            if grants(&held, required) {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            info!(
                "Permission {} denied for user {} on {}",
                required,
                user.id,
                req.path()
            );
            Ok(req.into_response(
                create_error_response(
                    StatusCode::FORBIDDEN,
                    ErrorCode::Forbidden,
                    &format!("Missing permission: {required}"),
                )
                .map_into_right_body(),
            ))
        })
    }
}
