use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 常用环境变量到配置键的映射，优先级高于 `EDUCRM_*` 前缀变量
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("APP_ENV", "app.environment"),
    ("RUST_LOG", "app.log_level"),
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("UNIX_SOCKET", "server.unix_socket_path"),
    ("CPU_COUNT", "server.workers"),
    ("JWT_SECRET", "jwt.secret"),
    ("DATABASE_URL", "database.url"),
    ("REDIS_URL", "cache.redis.url"),
    ("REDIS_KEY_PREFIX", "cache.redis.key_prefix"),
    ("CACHE_TTL", "cache.default_ttl"),
    ("ADMIN_PASSWORD", "bootstrap.admin_password"),
];

const MIN_PRODUCTION_SECRET_LEN: usize = 32;

impl AppConfig {
    /// 按顺序合并 `config.toml`、`config.{APP_ENV}.toml`、`EDUCRM_*` 与常用环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let env_name = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let mut builder = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name(&format!("config.{env_name}")).required(false))
            .add_source(
                Environment::with_prefix("EDUCRM")
                    .separator("_")
                    .try_parsing(true),
            );

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;

        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers.max(1));
        }
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.is_production() && self.jwt.secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {MIN_PRODUCTION_SECRET_LEN} characters in production"
            )));
        }
        if self.jwt.access_token_expiry <= 0 || self.jwt.refresh_token_expiry <= 0 {
            return Err(ConfigError::Message(
                "jwt token expiry values must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// 全局配置；未调用 `init` 时按当前目录懒加载，失败直接退出
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 启动时显式加载，重复调用返回错误
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    pub fn frontend_override_dir(&self) -> Option<&str> {
        Some(self.app.frontend_dir.as_str()).filter(|dir| !dir.is_empty())
    }

    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        Some(self.server.unix_socket_path.as_str()).filter(|path| !path.is_empty())
    }
}
