use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::errors::{CrmError, Result};
use crate::models::users::{NewUser, UserRole};
use crate::storage::Storage;
use crate::utils::password::hash_password;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

const FALLBACK_CACHE: &str = "moka";

async fn build_cache(name: &str) -> Option<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name)?;
    match constructor().await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", name);
            Some(Arc::from(cache))
        }
        Err(e) => {
            warn!("Failed to create {} cache: {}", name, e);
            None
        }
    }
}

/// 按配置创建缓存，失败时回退到内存缓存
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = AppConfig::get().cache.cache_type.as_str();
    warn!("Attempting to create {} cache backend", cache_type);

    if let Some(cache) = build_cache(cache_type).await {
        return Ok(cache);
    }
    if cache_type != FALLBACK_CACHE {
        warn!("Falling back to {} cache", FALLBACK_CACHE);
        if let Some(cache) = build_cache(FALLBACK_CACHE).await {
            return Ok(cache);
        }
    }
    Err(CrmError::cache_plugin_not_found(format!(
        "No cache backend available (tried: {cache_type})"
    )))
}

fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// 没有平台管理员时按 `[bootstrap]` 创建默认账号
///
/// 未配置密码时随机生成并打印到日志。
async fn seed_super_admin(storage: &dyn Storage) {
    match storage.count_super_admins().await {
        Ok(0) => info!("No platform administrator found, creating the default account..."),
        Ok(count) => {
            debug!("{} platform administrator(s) present, skipping seed", count);
            return;
        }
        Err(e) => {
            warn!("Failed to count platform administrators: {}, skipping seed", e);
            return;
        }
    }

    let bootstrap = &AppConfig::get().bootstrap;
    let password = if bootstrap.admin_password.is_empty() {
        let generated = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN_PASSWORD NOT SET, USING A GENERATED PASSWORD");
        warn!(
            "  Generated password for '{}': {}",
            bootstrap.admin_username, generated
        );
        warn!("==========================================================");
        generated
    } else {
        bootstrap.admin_password.clone()
    };
    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping seed", e);
            return;
        }
    };

    let admin = NewUser {
        company_id: None,
        branch_id: None,
        role_id: None,
        username: bootstrap.admin_username.clone(),
        email: bootstrap.admin_email.clone(),
        password_hash,
        role: UserRole::SuperAdmin,
        display_name: Some("Platform Administrator".to_string()),
    };
    match storage.create_user(admin).await {
        Ok(user) => info!(
            "Platform administrator created (ID: {}, username: {})",
            user.id, user.username
        ),
        Err(e) => warn!("Failed to create platform administrator: {}", e),
    }
}

/// 准备服务器启动所需的存储与缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    seed_super_admin(storage.as_ref()).await;

    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    Ok(StartupContext { storage, cache })
}
