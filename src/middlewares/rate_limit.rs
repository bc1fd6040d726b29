/*!
 * 速率限制中间件
 *
 * 固定时间窗口计数，按客户端 IP（已认证时按用户 ID）区分。
 * 超过限制返回 429，并带上 `Retry-After`。
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::IpAddr;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use crate::config::AppConfig;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};

// 键中带窗口编号，过期时间只需覆盖最长的窗口
static RATE_LIMIT_CACHE: Lazy<Cache<String, u32>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(600))
        .max_capacity(100_000)
        .build()
});

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window_secs: u64,
    key_prefix: String,
}

impl RateLimit {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs: window_secs.max(1),
            key_prefix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    fn per_minute(max_requests: u32, prefix: &str) -> Self {
        Self::new(max_requests.max(1), 60).with_prefix(prefix)
    }

    /// 登录，默认 5 次/分钟
    pub fn login() -> Self {
        Self::per_minute(AppConfig::get().rate_limit.login_per_minute, "login")
    }

    /// 注册机构，默认 3 次/分钟
    pub fn register() -> Self {
        Self::per_minute(AppConfig::get().rate_limit.register_per_minute, "register")
    }

    /// 刷新令牌，默认 10 次/分钟
    pub fn refresh_token() -> Self {
        Self::per_minute(AppConfig::get().rate_limit.refresh_per_minute, "refresh")
    }

    /// 窗口编号与距离窗口结束的秒数
    fn window(&self, now_secs: u64) -> (u64, u64) {
        let index = now_secs / self.window_secs;
        let retry_after = self.window_secs - now_secs % self.window_secs;
        (index, retry_after)
    }
}

/// 客户端 IP：优先使用连接信息，其次是反向代理头
fn extract_client_ip(req: &ServiceRequest) -> String {
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    if let Some(ref ip) = connection_ip
        && ip.parse::<IpAddr>().is_ok()
    {
        return ip.clone();
    }

    for header in ["X-Forwarded-For", "X-Real-IP"] {
        if let Some(value) = req.headers().get(header)
            && let Ok(value) = value.to_str()
            && let Some(ip) = value.split(',').next().map(str::trim)
            && ip.parse::<IpAddr>().is_ok()
        {
            return ip.to_string();
        }
    }

    connection_ip.unwrap_or_else(|| "unknown".to_string())
}

fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let limit = self.limit.clone();

        Box::pin(async move {
            let identifier = RequireJWT::extract_user_id(req.request())
                .map(|id| format!("user:{id}"))
                .unwrap_or_else(|| format!("ip:{}", extract_client_ip(&req)));

            let now = chrono::Utc::now().timestamp().max(0) as u64;
            let (window, retry_after) = limit.window(now);
            let cache_key = format!("{}:{}:{}", limit.key_prefix, identifier, window);

            let count = RATE_LIMIT_CACHE
                .entry(cache_key.clone())
                .and_upsert_with(|existing| {
                    let next = existing.map(|e| e.into_value()).unwrap_or(0) + 1;
                    std::future::ready(next)
                })
                .await
                .into_value();

            if count > limit.max_requests {
                warn!(
                    "Rate limit exceeded for {} ({}/{})",
                    cache_key, count, limit.max_requests
                );
                return Ok(req
                    .into_response(create_rate_limit_response(retry_after).map_into_right_body()));
            }

            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_minute_presets() {
        let login = RateLimit::per_minute(5, "login");
        assert_eq!((login.max_requests, login.window_secs), (5, 60));
        assert_eq!(login.key_prefix, "login");
        // 配置为 0 时至少允许一次
        assert_eq!(RateLimit::per_minute(0, "register").max_requests, 1);
    }

    #[test]
    fn test_fixed_window() {
        let limit = RateLimit::new(5, 60);
        assert_eq!(limit.window(120), (2, 60));
        assert_eq!(limit.window(179), (2, 1));
        assert_eq!(limit.window(180), (3, 60));
    }
}
