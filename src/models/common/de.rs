//! 查询参数反序列化辅助
//!
//! 与 `#[serde(flatten)]` 一起使用时，查询字符串中的值都以字符串形式到达，
//! 标准的整数和布尔反序列化会失败，这里统一兼容字符串和原生类型。

use serde::{Deserialize, Deserializer};
use serde::de::{Error, Unexpected, Visitor};
use std::fmt;

struct OptionalI64;

impl<'de> Visitor<'de> for OptionalI64 {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an optional integer")
    }

    fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_i64<E: Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_u64<E: Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        let v = v.trim();
        if v.is_empty() {
            return Ok(None);
        }
        v.parse()
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }
}

struct OptionalBool;

impl<'de> Visitor<'de> for OptionalBool {
    type Value = Option<bool>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an optional boolean")
    }

    fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_bool<E: Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        match v.trim() {
            "" => Ok(None),
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            other => Err(E::invalid_value(Unexpected::Str(other), &self)),
        }
    }
}

pub fn optional_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    d.deserialize_any(OptionalI64)
}

pub fn optional_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    d.deserialize_any(OptionalBool)
}

/// JSON 更新字段：缺省为 `None`，显式 `null` 为 `Some(None)` 表示清空
///
/// 需与 `#[serde(default)]` 一起使用。
pub fn nullable<'de, T, D>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Params {
        #[serde(default, deserialize_with = "super::optional_i64")]
        id: Option<i64>,
        #[serde(default, deserialize_with = "super::optional_bool")]
        active: Option<bool>,
    }

    #[test]
    fn test_accepts_strings_and_numbers() {
        let p: Params = serde_json::from_str(r#"{"id":"42","active":"true"}"#).unwrap();
        assert_eq!((p.id, p.active), (Some(42), Some(true)));
        let p: Params = serde_json::from_str(r#"{"id":7,"active":false}"#).unwrap();
        assert_eq!((p.id, p.active), (Some(7), Some(false)));
        let p: Params = serde_json::from_str("{}").unwrap();
        assert_eq!((p.id, p.active), (None, None));
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::nullable")]
        room_id: Option<Option<i64>>,
    }

    #[test]
    fn test_nullable_tells_missing_from_null() {
        let p: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(p.room_id, None);
        let p: Patch = serde_json::from_str(r#"{"room_id":null}"#).unwrap();
        assert_eq!(p.room_id, Some(None));
        let p: Patch = serde_json::from_str(r#"{"room_id":3}"#).unwrap();
        assert_eq!(p.room_id, Some(Some(3)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Params>(r#"{"id":"x"}"#).is_err());
        assert!(serde_json::from_str::<Params>(r#"{"active":"maybe"}"#).is_err());
    }
}
