use crate::config::AppConfig;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,             // 用户 ID
    pub role: String,            // 账号级别
    pub cid: Option<i64>,        // 所属机构，平台管理员为空
    pub token_type: String,      // "access" 或 "refresh"
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct JwtUtils;

impl JwtUtils {
    fn secret() -> &'static str {
        &AppConfig::get().jwt.secret
    }

    /// 用指定密钥签发 token
    pub fn encode_with_secret(
        claims: &Claims,
        secret: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// 用指定密钥校验 token 并检查类型
    pub fn decode_with_secret(
        token: &str,
        secret: &str,
        expected_type: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?
        .claims;
        if claims.token_type != expected_type {
            return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
        }
        Ok(claims)
    }

    fn build_claims(
        user_id: i64,
        role: &str,
        company_id: Option<i64>,
        token_type: &str,
        expiry: chrono::Duration,
    ) -> Claims {
        let now = chrono::Utc::now();
        Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            cid: company_id,
            token_type: token_type.to_string(),
            exp: (now + expiry).timestamp() as usize,
            iat: now.timestamp() as usize,
        }
    }

    pub fn generate_access_token(
        user_id: i64,
        role: &str,
        company_id: Option<i64>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let expiry = chrono::Duration::minutes(AppConfig::get().jwt.access_token_expiry);
        let claims = Self::build_claims(user_id, role, company_id, ACCESS, expiry);
        Self::encode_with_secret(&claims, Self::secret())
    }

    /// `token_expiry` 为空时使用默认有效期
    pub fn generate_refresh_token(
        user_id: i64,
        role: &str,
        company_id: Option<i64>,
        token_expiry: Option<chrono::Duration>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let expiry = token_expiry.unwrap_or_else(|| {
            chrono::Duration::days(AppConfig::get().jwt.refresh_token_expiry)
        });
        let claims = Self::build_claims(user_id, role, company_id, REFRESH, expiry);
        Self::encode_with_secret(&claims, Self::secret())
    }

    pub fn generate_token_pair(
        user_id: i64,
        role: &str,
        company_id: Option<i64>,
        refresh_token_expiry: Option<chrono::Duration>,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        Ok(TokenPair {
            access_token: Self::generate_access_token(user_id, role, company_id)?,
            refresh_token: Self::generate_refresh_token(
                user_id,
                role,
                company_id,
                refresh_token_expiry,
            )?,
        })
    }

    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::decode_with_secret(token, Self::secret(), ACCESS)
    }

    pub fn verify_refresh_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::decode_with_secret(token, Self::secret(), REFRESH)
    }

    /// 创建 Refresh Token Cookie
    pub fn create_refresh_token_cookie(
        refresh_token: &str,
        max_age_days: i64,
    ) -> Cookie<'static> {
        let config = AppConfig::get();
        Cookie::build(REFRESH_TOKEN_COOKIE, refresh_token.to_string())
            .path("/")
            .max_age(actix_web::cookie::time::Duration::days(max_age_days))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(config.is_production())
            .finish()
    }

    /// 注销时用于清除 cookie
    pub fn create_empty_refresh_token_cookie() -> Cookie<'static> {
        let config = AppConfig::get();
        Cookie::build(REFRESH_TOKEN_COOKIE, "")
            .path("/")
            .max_age(actix_web::cookie::time::Duration::seconds(0))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(config.is_production())
            .finish()
    }

    pub fn extract_refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
    }

    pub fn extract_bearer_token(req: &actix_web::HttpRequest) -> Option<String> {
        req.headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-unit-test-secret";

    fn claims(token_type: &str, expiry: chrono::Duration) -> Claims {
        JwtUtils::build_claims(42, "staff", Some(7), token_type, expiry)
    }

    #[test]
    fn test_round_trip_keeps_tenant() {
        let token =
            JwtUtils::encode_with_secret(&claims(ACCESS, chrono::Duration::minutes(5)), SECRET)
                .unwrap();
        let decoded = JwtUtils::decode_with_secret(&token, SECRET, ACCESS).unwrap();
        assert_eq!(decoded.user_id(), Some(42));
        assert_eq!(decoded.cid, Some(7));
        assert_eq!(decoded.role, "staff");
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let token =
            JwtUtils::encode_with_secret(&claims(REFRESH, chrono::Duration::days(1)), SECRET)
                .unwrap();
        assert!(JwtUtils::decode_with_secret(&token, SECRET, ACCESS).is_err());
    }

    #[test]
    fn test_wrong_secret_and_expired_token_fail() {
        let token =
            JwtUtils::encode_with_secret(&claims(ACCESS, chrono::Duration::minutes(5)), SECRET)
                .unwrap();
        assert!(JwtUtils::decode_with_secret(&token, "another-secret", ACCESS).is_err());

        let expired =
            JwtUtils::encode_with_secret(&claims(ACCESS, chrono::Duration::hours(-2)), SECRET)
                .unwrap();
        assert!(JwtUtils::decode_with_secret(&expired, SECRET, ACCESS).is_err());
    }
}
