use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveTime;
use std::collections::HashMap;
use tracing::info;

use super::SettingsService;
use crate::cache::keys;
use crate::middlewares::RequireJWT;
use crate::models::common::from_timestamp;
use crate::models::settings::{
    CenterSettings, CompanySetting, SettingKey, StoredSetting, UpdateSettingRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    bad_request, cache_from, request_settings, storage_error, tenant_scope,
};
use crate::utils::SafeSettingKey;
use crate::{try_respond, try_validate};

/// 合并已存储的值与默认值
fn describe(key: SettingKey, stored: Option<&StoredSetting>) -> CompanySetting {
    let default_value = key
        .decode(key.default_raw())
        .unwrap_or(serde_json::Value::Null);
    let decoded = stored.and_then(|s| key.decode(&s.value));
    CompanySetting {
        key,
        is_default: decoded.is_none(),
        value: decoded.unwrap_or_else(|| default_value.clone()),
        default_value,
        value_type: key.value_type(),
        description: key.description().to_string(),
        updated_at: stored.map(|s| from_timestamp(s.updated_at)),
        updated_by: stored.and_then(|s| s.updated_by),
    }
}

fn collect_settings(stored: &HashMap<String, StoredSetting>) -> Vec<CompanySetting> {
    SettingKey::ALL
        .iter()
        .map(|key| describe(*key, stored.get(key.as_str())))
        .collect()
}

/// 工作日开始时间必须早于结束时间
fn check_work_day(
    key: SettingKey,
    normalized: &str,
    current: &CenterSettings,
) -> Result<(), String> {
    let (start, end) = match key {
        SettingKey::WorkDayStart => (parse_time(normalized)?, current.work_day_end),
        SettingKey::WorkDayEnd => (current.work_day_start, parse_time(normalized)?),
        _ => return Ok(()),
    };
    if end <= start {
        return Err("The work day must end after it starts".to_string());
    }
    Ok(())
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| format!("Invalid time {value}"))
}

pub async fn list_settings(
    service: &SettingsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_company_settings(scope.company_id).await {
        Ok(stored) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            collect_settings(&stored),
            "Settings retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to load settings", e)),
    }
}

pub async fn update_setting(
    service: &SettingsService,
    key: SafeSettingKey,
    req: UpdateSettingRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let cache = cache_from(request)?;
    let scope = try_respond!(tenant_scope(request));

    let Ok(key) = key.0.parse::<SettingKey>() else {
        return Ok(bad_request(
            ErrorCode::SettingUnknown,
            format!("Unknown setting: {}", key.0),
        ));
    };
    let normalized = try_validate!(key.validate(&req.value), ErrorCode::SettingInvalid);
    let current = try_respond!(request_settings(storage.as_ref(), request, scope.company_id).await);
    try_validate!(
        check_work_day(key, &normalized, &current),
        ErrorCode::SettingInvalid
    );

    match storage
        .upsert_company_setting(
            scope.company_id,
            key.as_str(),
            normalized,
            key.value_type().as_str(),
            RequireJWT::extract_user_id(request),
        )
        .await
    {
        Ok(stored) => {
            cache.remove(&keys::company_settings(scope.company_id)).await;
            info!("Setting {} updated for company {}", key, scope.company_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                describe(key, Some(&stored)),
                "Setting updated successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to update setting", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(key: &str, value: &str) -> StoredSetting {
        StoredSetting {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: 1_700_000_000,
            updated_by: Some(7),
        }
    }

    #[test]
    fn test_collect_settings_fills_defaults() {
        let mut map = HashMap::new();
        map.insert(
            "center.currency".to_string(),
            stored("center.currency", "EUR"),
        );
        let settings = collect_settings(&map);
        assert_eq!(settings.len(), SettingKey::ALL.len());

        let currency = settings
            .iter()
            .find(|s| s.key == SettingKey::Currency)
            .unwrap();
        assert_eq!(currency.value, json!("EUR"));
        assert_eq!(currency.default_value, json!("USD"));
        assert!(!currency.is_default);
        assert_eq!(currency.updated_by, Some(7));

        let step = settings
            .iter()
            .find(|s| s.key == SettingKey::SlotStepMinutes)
            .unwrap();
        assert_eq!(step.value, json!(30));
        assert!(step.is_default);
        assert!(step.updated_at.is_none());
    }

    #[test]
    fn test_work_day_order() {
        let current = CenterSettings::default();
        assert!(check_work_day(SettingKey::WorkDayStart, "08:00", &current).is_ok());
        assert!(check_work_day(SettingKey::WorkDayStart, "21:00", &current).is_err());
        assert!(check_work_day(SettingKey::WorkDayEnd, "08:30", &current).is_err());
        assert!(check_work_day(SettingKey::Currency, "EUR", &current).is_ok());
    }
}
