//! 输入校验
//!
//! 返回值统一为 `Result<_, String>`，错误文本直接作为接口 message 返回。

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").unwrap_or_else(|e| panic!("username regex: {e}"))
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .unwrap_or_else(|e| panic!("email regex: {e}"))
});

// 允许 +、空格、括号和连字符，数字 5 到 20 位
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ()-]+$").unwrap_or_else(|e| panic!("phone regex: {e}")));

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "12345678",
    "123456789",
    "qwerty123",
    "admin123",
    "welcome1",
    "abcd1234",
];

pub fn validate_username(username: &str) -> Result<(), String> {
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Username must be 3-32 characters of letters, digits, '.', '_' or '-'".to_string(),
        );
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err(format!("Invalid email address: {email}"));
    }
    Ok(())
}

/// 密码策略：至少 8 位，同时包含大写、小写和数字，且不在常见弱密码列表中
pub fn validate_password(password: &str) -> Result<(), String> {
    let mut problems = Vec::new();
    if password.chars().count() < 8 {
        problems.push("at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        problems.push("an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        problems.push("a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("a digit");
    }
    if !problems.is_empty() {
        return Err(format!("Password must contain {}", problems.join(", ")));
    }
    if COMMON_PASSWORDS
        .iter()
        .any(|weak| password.eq_ignore_ascii_case(weak))
    {
        return Err("Password is too common".to_string());
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), String> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !PHONE_RE.is_match(phone) || !(5..=20).contains(&digits) {
        return Err(format!("Invalid phone number: {phone}"));
    }
    Ok(())
}

/// 去掉首尾空白后的必填文本
pub fn required_text(field: &str, value: &str, max_len: usize) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if trimmed.chars().count() > max_len {
        return Err(format!("{field} must be at most {max_len} characters"));
    }
    Ok(trimmed.to_string())
}

/// 可选文本，空串视为未填写
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 可选电话，空串视为未填写
pub fn optional_phone(value: Option<String>) -> Result<Option<String>, String> {
    match optional_text(value) {
        Some(phone) => validate_phone(&phone).map(|_| Some(phone)),
        None => Ok(None),
    }
}

/// 可选邮箱，空串视为未填写，保存为小写
pub fn optional_email(value: Option<String>) -> Result<Option<String>, String> {
    match optional_text(value) {
        Some(email) => validate_email(&email).map(|_| Some(email.to_lowercase())),
        None => Ok(None),
    }
}

/// 更新请求中可清除的字段：None 表示不变，空串表示清除，其余值按 `normalize` 校验
pub fn clearable(
    value: Option<String>,
    normalize: impl Fn(Option<String>) -> Result<Option<String>, String>,
) -> Result<Option<String>, String> {
    match value {
        None => Ok(None),
        Some(v) => Ok(Some(normalize(Some(v))?.unwrap_or_default())),
    }
}

/// 解析 `YYYY-MM-DD`
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("{field} must be a date in YYYY-MM-DD format"))
}

/// 校验后返回规范化的日期文本
pub fn optional_date(field: &str, value: Option<String>) -> Result<Option<String>, String> {
    match optional_text(value) {
        Some(v) => parse_date(field, &v).map(|d| Some(d.format("%Y-%m-%d").to_string())),
        None => Ok(None),
    }
}

pub fn validate_date_order(start: Option<&str>, end: Option<&str>) -> Result<(), String> {
    if let (Some(start), Some(end)) = (start, end)
        && parse_date("end_date", end)? < parse_date("start_date", start)?
    {
        return Err("end_date must not be before start_date".to_string());
    }
    Ok(())
}

pub fn validate_money(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{field} must be a non-negative number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username() {
        assert!(validate_username("anna.k").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("office@sunrise.edu").is_ok());
        assert!(validate_email("office@sunrise").is_err());
        assert!(validate_email("@sunrise.edu").is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("Sunflower42").is_ok());
        let err = validate_password("short").unwrap_err();
        assert!(err.contains("at least 8 characters"));
        assert!(err.contains("a digit"));
        assert!(validate_password("ALLUPPER123").is_err());
        assert_eq!(
            validate_password("Password1").unwrap_err(),
            "Password is too common"
        );
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("+998 (90) 123-45-67").is_ok());
        assert!(validate_phone("12-3").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_optional_fields() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(
            optional_email(Some(" Anna@Mail.com ".into())).unwrap(),
            Some("anna@mail.com".to_string())
        );
        assert_eq!(optional_phone(None).unwrap(), None);
        assert!(optional_phone(Some("x".into())).is_err());
    }

    #[test]
    fn test_clearable_fields() {
        assert_eq!(clearable(None, optional_phone).unwrap(), None);
        assert_eq!(
            clearable(Some(" ".into()), optional_phone).unwrap(),
            Some(String::new())
        );
        assert_eq!(
            clearable(Some("A@B.io".into()), optional_email).unwrap(),
            Some("a@b.io".to_string())
        );
        assert!(clearable(Some("nope".into()), optional_email).is_err());
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            optional_date("birth_date", Some("2015-3-7".into())).unwrap(),
            Some("2015-03-07".to_string())
        );
        assert!(parse_date("start_date", "07.03.2015").is_err());
        assert!(validate_date_order(Some("2025-01-10"), Some("2025-01-09")).is_err());
        assert!(validate_date_order(Some("2025-01-10"), None).is_ok());
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("name", "  Room A ", 10).unwrap(), "Room A");
        assert!(required_text("name", "   ", 10).is_err());
        assert!(required_text("name", "abcdefghijk", 10).is_err());
    }
}
