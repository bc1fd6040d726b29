//! 路径参数提取器
//!
//! 直接从 `match_info` 里按名称取值，非法值统一返回 400 的 JSON 响应，
//! 不会落到 actix 默认的纯文本错误页。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path(message: String) -> actix_web::Error {
    InternalError::from_response(
        message.clone(),
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

fn parse_positive_id(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req
        .match_info()
        .get(name)
        .ok_or_else(|| bad_path(format!("Missing path parameter '{name}'")))?;
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(bad_path(format!("Invalid path parameter '{name}': {raw}"))),
    }
}

macro_rules! safe_id_extractor {
    ($($name:ident => $param:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name(pub i64);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                    ready(parse_positive_id(req, $param).map($name))
                }
            }
        )*
    };
}

safe_id_extractor! {
    SafeIDI64 => "id",
    SafeStudentIdI64 => "student_id",
    SafeTaskIdI64 => "task_id",
}

/// 设置键，只允许小写字母、数字、下划线和点
#[derive(Debug, Clone)]
pub struct SafeSettingKey(pub String);

impl FromRequest for SafeSettingKey {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let key = req.match_info().get("key").unwrap_or_default();
        let valid = !key.is_empty()
            && key.len() <= 64
            && key
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');
        if valid {
            ready(Ok(SafeSettingKey(key.to_string())))
        } else {
            ready(Err(bad_path(format!("Invalid setting key: {key}"))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_positive_id_is_accepted() {
        let req = TestRequest::default().param("id", "15").to_http_request();
        let id = SafeIDI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 15);
    }

    #[actix_web::test]
    async fn test_zero_and_garbage_are_rejected() {
        for raw in ["0", "-3", "abc", "1.5"] {
            let req = TestRequest::default().param("id", raw).to_http_request();
            assert!(SafeIDI64::extract(&req).await.is_err(), "{raw}");
        }
    }

    #[actix_web::test]
    async fn test_named_parameter() {
        let req = TestRequest::default()
            .param("id", "2")
            .param("task_id", "9")
            .to_http_request();
        assert_eq!(SafeTaskIdI64::extract(&req).await.unwrap().0, 9);
        assert!(SafeStudentIdI64::extract(&req).await.is_err());
    }

    #[actix_web::test]
    async fn test_setting_key() {
        let req = TestRequest::default()
            .param("key", "center.currency")
            .to_http_request();
        assert_eq!(SafeSettingKey::extract(&req).await.unwrap().0, "center.currency");

        let req = TestRequest::default()
            .param("key", "Center/Currency")
            .to_http_request();
        assert!(SafeSettingKey::extract(&req).await.is_err());
    }
}
