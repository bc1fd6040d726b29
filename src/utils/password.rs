use crate::config::AppConfig;
use crate::errors::{CrmError, Result};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

fn hasher(memory_cost: u32, time_cost: u32, parallelism: u32) -> Result<Argon2<'static>> {
    let params = Params::new(memory_cost, time_cost, parallelism, None)
        .map_err(|e| CrmError::validation(format!("Invalid Argon2 parameters: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// 使用配置的 Argon2id 参数哈希密码
pub fn hash_password(password: &str) -> Result<String> {
    let config = &AppConfig::get().argon2;
    let argon2 = hasher(config.memory_cost, config.time_cost, config.parallelism)?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CrmError::validation(format!("Password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// 参数从哈希串中读取，修改配置不影响旧密码
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let argon2 = hasher(1024, 1, 1).unwrap();
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2
            .hash_password(b"Sunflower42", &salt)
            .unwrap()
            .to_string();
        assert!(verify_password("Sunflower42", &hash));
        assert!(!verify_password("sunflower42", &hash));
    }

    #[test]
    fn test_garbage_hash_is_rejected() {
        assert!(!verify_password("anything", "not-a-hash"));
    }
}
