//! 机构设置
//!
//! 设置以字符串存储在 `company_settings` 表中，只接受已知的键。
//! 读取时缺失或损坏的值回退为默认值。

use chrono::{NaiveTime, Offset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use ts_rs::TS;

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/settings.ts")]
    pub enum SettingValueType {
        String => "string",
        Integer => "integer",
        Boolean => "boolean",
        Time => "time",
        JsonArray => "json_array",
    }
}

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/settings.ts")]
    pub enum SettingKey {
        Currency => "center.currency",
        UtcOffsetMinutes => "center.utc_offset_minutes",
        WorkDayStart => "schedule.work_day_start",
        WorkDayEnd => "schedule.work_day_end",
        SlotStepMinutes => "schedule.slot_step_minutes",
        DefaultLessonMinutes => "lessons.default_duration_minutes",
        ChargeAbsent => "billing.charge_absent",
        LeadSources => "leads.sources",
    }
}

const TIME_FORMAT: &str = "%H:%M";

impl SettingKey {
    pub fn value_type(&self) -> SettingValueType {
        match self {
            SettingKey::Currency => SettingValueType::String,
            SettingKey::UtcOffsetMinutes
            | SettingKey::SlotStepMinutes
            | SettingKey::DefaultLessonMinutes => SettingValueType::Integer,
            SettingKey::WorkDayStart | SettingKey::WorkDayEnd => SettingValueType::Time,
            SettingKey::ChargeAbsent => SettingValueType::Boolean,
            SettingKey::LeadSources => SettingValueType::JsonArray,
        }
    }

    /// 默认值（存储形式）
    pub fn default_raw(&self) -> &'static str {
        match self {
            SettingKey::Currency => "USD",
            SettingKey::UtcOffsetMinutes => "0",
            SettingKey::WorkDayStart => "09:00",
            SettingKey::WorkDayEnd => "21:00",
            SettingKey::SlotStepMinutes => "30",
            SettingKey::DefaultLessonMinutes => "60",
            SettingKey::ChargeAbsent => "false",
            SettingKey::LeadSources => r#"["website","referral","social","walk_in","phone"]"#,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SettingKey::Currency => "ISO 4217 currency code used in reports",
            SettingKey::UtcOffsetMinutes => "Center local time offset from UTC in minutes",
            SettingKey::WorkDayStart => "Earliest time a lesson may start (HH:MM)",
            SettingKey::WorkDayEnd => "Latest time a lesson may end (HH:MM)",
            SettingKey::SlotStepMinutes => "Step between suggested lesson start times",
            SettingKey::DefaultLessonMinutes => "Default lesson duration",
            SettingKey::ChargeAbsent => "Charge a lesson to students marked absent",
            SettingKey::LeadSources => "Allowed lead sources",
        }
    }

    fn integer_range(&self) -> Option<(i64, i64)> {
        match self {
            SettingKey::UtcOffsetMinutes => Some((-720, 840)),
            SettingKey::SlotStepMinutes => Some((5, 240)),
            SettingKey::DefaultLessonMinutes => Some((15, 480)),
            _ => None,
        }
    }

    /// 校验 JSON 值并返回存储形式
    pub fn validate(&self, value: &Value) -> Result<String, String> {
        match self.value_type() {
            SettingValueType::String => {
                let s = value
                    .as_str()
                    .ok_or_else(|| format!("{self} expects a string"))?
                    .trim();
                if s.len() != 3 || !s.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(format!("{self} must be a 3-letter currency code"));
                }
                Ok(s.to_ascii_uppercase())
            }
            SettingValueType::Integer => {
                let n = match value {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                }
                .ok_or_else(|| format!("{self} expects an integer"))?;
                if let Some((min, max)) = self.integer_range()
                    && !(min..=max).contains(&n)
                {
                    return Err(format!("{self} must be between {min} and {max}"));
                }
                Ok(n.to_string())
            }
            SettingValueType::Boolean => match value {
                Value::Bool(b) => Ok(b.to_string()),
                Value::String(s) if s == "true" || s == "false" => Ok(s.clone()),
                _ => Err(format!("{self} expects a boolean")),
            },
            SettingValueType::Time => {
                let s = value
                    .as_str()
                    .ok_or_else(|| format!("{self} expects a time string HH:MM"))?;
                let time = NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
                    .map_err(|_| format!("{self} expects a time string HH:MM"))?;
                Ok(time.format(TIME_FORMAT).to_string())
            }
            SettingValueType::JsonArray => {
                let items = value
                    .as_array()
                    .ok_or_else(|| format!("{self} expects an array of strings"))?;
                let mut sources: Vec<String> = Vec::with_capacity(items.len());
                for item in items {
                    let s = item
                        .as_str()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .ok_or_else(|| format!("{self} expects an array of non-empty strings"))?;
                    if !sources.iter().any(|existing| existing == s) {
                        sources.push(s.to_string());
                    }
                }
                serde_json::to_string(&sources).map_err(|e| e.to_string())
            }
        }
    }

    /// 将存储形式还原为 JSON 值，无法解析时返回 None
    pub fn decode(&self, raw: &str) -> Option<Value> {
        match self.value_type() {
            SettingValueType::String | SettingValueType::Time => {
                Some(Value::String(raw.to_string()))
            }
            SettingValueType::Integer => raw.parse::<i64>().ok().map(Value::from),
            SettingValueType::Boolean => raw.parse::<bool>().ok().map(Value::Bool),
            SettingValueType::JsonArray => serde_json::from_str::<Vec<String>>(raw)
                .ok()
                .map(Value::from),
        }
    }
}

// 单个设置项
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/settings.ts")]
pub struct CompanySetting {
    pub key: SettingKey,
    pub value: Value,
    pub default_value: Value,
    pub value_type: SettingValueType,
    pub is_default: bool,
    pub description: String,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/settings.ts")]
pub struct UpdateSettingRequest {
    pub value: Value,
}

/// 数据库中保存的设置值
#[derive(Debug, Clone)]
pub struct StoredSetting {
    pub key: String,
    pub value: String,
    pub updated_at: i64,
    pub updated_by: Option<i64>,
}

/// 类型化的机构设置，供业务逻辑直接使用
#[derive(Debug, Clone, PartialEq)]
pub struct CenterSettings {
    pub currency: String,
    pub utc_offset_minutes: i32,
    pub work_day_start: NaiveTime,
    pub work_day_end: NaiveTime,
    pub slot_step_minutes: i64,
    pub default_lesson_minutes: i64,
    pub charge_absent: bool,
    pub lead_sources: Vec<String>,
}

impl Default for CenterSettings {
    fn default() -> Self {
        Self::from_raw(&HashMap::new())
    }
}

impl CenterSettings {
    /// 由存储的键值构建；非法值按默认值处理
    pub fn from_raw(raw: &HashMap<String, String>) -> Self {
        let get = |key: SettingKey| -> String {
            raw.get(key.as_str())
                .filter(|v| key.validate(&key.decode(v).unwrap_or(Value::Null)).is_ok())
                .cloned()
                .unwrap_or_else(|| key.default_raw().to_string())
        };

        let int = |key: SettingKey| get(key).parse::<i64>().unwrap_or_default();
        let time = |key: SettingKey| {
            NaiveTime::parse_from_str(&get(key), TIME_FORMAT).unwrap_or_default()
        };

        Self {
            currency: get(SettingKey::Currency),
            utc_offset_minutes: int(SettingKey::UtcOffsetMinutes) as i32,
            work_day_start: time(SettingKey::WorkDayStart),
            work_day_end: time(SettingKey::WorkDayEnd),
            slot_step_minutes: int(SettingKey::SlotStepMinutes),
            default_lesson_minutes: int(SettingKey::DefaultLessonMinutes),
            charge_absent: get(SettingKey::ChargeAbsent) == "true",
            lead_sources: serde_json::from_str(&get(SettingKey::LeadSources)).unwrap_or_default(),
        }
    }

    /// 机构所在时区
    pub fn offset(&self) -> chrono::FixedOffset {
        chrono::FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or(chrono::Utc.fix())
    }

    /// 机构本地的今天
    pub fn today(&self) -> chrono::NaiveDate {
        chrono::Utc::now().with_timezone(&self.offset()).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_range_validation() {
        assert_eq!(
            SettingKey::SlotStepMinutes.validate(&json!(15)),
            Ok("15".to_string())
        );
        assert!(SettingKey::SlotStepMinutes.validate(&json!(1)).is_err());
        assert!(SettingKey::UtcOffsetMinutes.validate(&json!(900)).is_err());
        assert_eq!(
            SettingKey::UtcOffsetMinutes.validate(&json!("-300")),
            Ok("-300".to_string())
        );
    }

    #[test]
    fn test_time_and_bool_validation() {
        assert_eq!(
            SettingKey::WorkDayStart.validate(&json!("8:30")),
            Ok("08:30".to_string())
        );
        assert!(SettingKey::WorkDayEnd.validate(&json!("25:00")).is_err());
        assert_eq!(
            SettingKey::ChargeAbsent.validate(&json!(true)),
            Ok("true".to_string())
        );
        assert!(SettingKey::ChargeAbsent.validate(&json!(1)).is_err());
    }

    #[test]
    fn test_currency_and_sources() {
        assert_eq!(
            SettingKey::Currency.validate(&json!("eur")),
            Ok("EUR".to_string())
        );
        assert!(SettingKey::Currency.validate(&json!("EURO")).is_err());
        assert_eq!(
            SettingKey::LeadSources.validate(&json!(["web", " web ", "ads"])),
            Ok(r#"["web","ads"]"#.to_string())
        );
        assert!(SettingKey::LeadSources.validate(&json!(["", "x"])).is_err());
    }

    #[test]
    fn test_center_settings_defaults_and_overrides() {
        let defaults = CenterSettings::default();
        assert_eq!(defaults.currency, "USD");
        assert_eq!(defaults.slot_step_minutes, 30);
        assert_eq!(defaults.work_day_start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert!(!defaults.charge_absent);
        assert_eq!(defaults.lead_sources.len(), 5);

        let mut raw = HashMap::new();
        raw.insert("billing.charge_absent".to_string(), "true".to_string());
        raw.insert("center.utc_offset_minutes".to_string(), "180".to_string());
        raw.insert("schedule.slot_step_minutes".to_string(), "garbage".to_string());
        let settings = CenterSettings::from_raw(&raw);
        assert!(settings.charge_absent);
        assert_eq!(settings.utc_offset_minutes, 180);
        assert_eq!(settings.slot_step_minutes, 30);
        assert_eq!(settings.offset().local_minus_utc(), 180 * 60);
    }
}
