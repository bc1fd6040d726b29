use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use rand::Rng;
use tracing::info;

use crate::models::auth::{RegisterCompanyRequest, RegisterCompanyResponse};
use crate::models::companies::{NewCompanyAccount, entities::slugify};
use crate::models::users::{NewUser, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{conflict, storage_error};
use crate::services::users::ensure_account_available;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{
    optional_text, required_text, validate_email, validate_password, validate_username,
};
use crate::{try_respond, try_validate};

use super::AuthService;

const DEFAULT_BRANCH_NAME: &str = "Main";
const SLUG_ATTEMPTS: usize = 5;

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterCompanyRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let company_name = try_validate!(
        required_text("company_name", &register_request.company_name, 128),
        ErrorCode::RegisterFailed
    );
    let username = register_request.username.trim().to_string();
    try_validate!(validate_username(&username), ErrorCode::UserNameInvalid);
    let email = register_request.email.trim().to_lowercase();
    try_validate!(validate_email(&email), ErrorCode::UserEmailInvalid);
    try_validate!(
        validate_password(&register_request.password),
        ErrorCode::UserPasswordInvalid
    );

    try_respond!(ensure_account_available(storage.as_ref(), &username, &email).await);

    let slug = try_respond!(
        pick_slug(
            storage.as_ref(),
            &company_name,
            register_request.company_slug.as_deref()
        )
        .await
    );

    let password_hash = match hash_password(&register_request.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(storage_error("Failed to hash password", e)),
    };

    let account = NewCompanyAccount {
        company_name,
        slug,
        branch_name: DEFAULT_BRANCH_NAME.to_string(),
        owner: NewUser {
            company_id: None,
            branch_id: None,
            role_id: None,
            username,
            email,
            password_hash,
            role: UserRole::Owner,
            display_name: optional_text(register_request.display_name),
        },
    };

    match storage.register_company(account).await {
        Ok((company, branch, user)) => {
            info!(
                "Company {} ({}) registered by {}",
                company.id, company.slug, user.username
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                RegisterCompanyResponse {
                    company,
                    branch,
                    user,
                },
                "Company registered successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to register company", e)),
    }
}

/// 选择机构 slug
///
/// 显式提供的 slug 被占用时返回 409；由名称生成的 slug 被占用时追加随机后缀。
async fn pick_slug(
    storage: &dyn Storage,
    company_name: &str,
    requested: Option<&str>,
) -> Result<String, HttpResponse> {
    let explicit = requested.map(slugify).filter(|s| !s.is_empty());
    let base = explicit
        .clone()
        .or_else(|| Some(slugify(company_name)).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "center".to_string());

    let mut candidate = base.clone();
    for _ in 0..SLUG_ATTEMPTS {
        match storage.get_company_by_slug(&candidate).await {
            Ok(None) => return Ok(candidate),
            Ok(Some(_)) if explicit.is_some() => {
                return Err(conflict(
                    ErrorCode::CompanySlugExists,
                    format!("Company slug '{candidate}' is already taken"),
                ));
            }
            Ok(Some(_)) => {
                let suffix: u32 = rand::rng().random_range(1000..10000);
                candidate = format!("{base}-{suffix}");
            }
            Err(e) => return Err(storage_error("Failed to check company slug", e)),
        }
    }
    Err(conflict(
        ErrorCode::CompanySlugExists,
        "Could not find a free company slug, please provide one",
    ))
}
