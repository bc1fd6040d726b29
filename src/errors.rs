//! 统一错误处理模块
//!
//! 错误类型由宏生成，每个变体带有错误代码和类型名称。
//! 存储层的数据库错误在这里被归类（唯一约束、外键约束），
//! 服务层据此决定返回 409 还是 500。

use std::fmt;

/// 定义错误类型的宏
///
/// 生成 enum、`code()`、`error_type()`、`message()` 以及 snake_case 构造函数。
macro_rules! define_crm_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum CrmError {
            $($variant(String),)*
        }

        impl CrmError {
            /// 错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(CrmError::$variant(_) => $code,)*
                }
            }

            /// 错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(CrmError::$variant(_) => $type_name,)*
                }
            }

            /// 错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(CrmError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl CrmError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        CrmError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_crm_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    FileOperation("E006", "File Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    DateParse("E010", "Date Parse Error"),
    Authentication("E011", "Authentication Error"),
    Authorization("E012", "Authorization Error"),
    UniqueViolation("E013", "Unique Constraint Violation"),
    ForeignKeyViolation("E014", "Foreign Key Violation"),
    Conflict("E015", "Resource Conflict"),
}

impl CrmError {
    /// 开发环境下的彩色输出
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为约束冲突（唯一键、业务冲突）
    pub fn is_conflict(&self) -> bool {
        matches!(self, CrmError::UniqueViolation(_) | CrmError::Conflict(_))
    }

    /// 将数据库错误按约束类型归类
    ///
    /// SQLite、PostgreSQL、MySQL 的报错文本各不相同，这里统一识别。
    pub fn from_db(context: &str, err: sea_orm::DbErr) -> Self {
        let text = err.to_string();
        let lower = text.to_lowercase();
        if lower.contains("unique constraint")
            || lower.contains("duplicate key")
            || lower.contains("duplicate entry")
        {
            CrmError::UniqueViolation(format!("{context}: {text}"))
        } else if lower.contains("foreign key constraint") || lower.contains("violates foreign key")
        {
            CrmError::ForeignKeyViolation(format!("{context}: {text}"))
        } else {
            CrmError::DatabaseOperation(format!("{context}: {text}"))
        }
    }
}

impl fmt::Display for CrmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CrmError {}

impl From<sea_orm::DbErr> for CrmError {
    fn from(err: sea_orm::DbErr) -> Self {
        CrmError::from_db("database error", err)
    }
}

impl From<std::io::Error> for CrmError {
    fn from(err: std::io::Error) -> Self {
        CrmError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for CrmError {
    fn from(err: serde_json::Error) -> Self {
        CrmError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for CrmError {
    fn from(err: chrono::ParseError) -> Self {
        CrmError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CrmError::cache_connection("test").code(), "E001");
        assert_eq!(CrmError::validation("test").code(), "E007");
        assert_eq!(CrmError::unique_violation("test").code(), "E013");
        assert_eq!(CrmError::conflict("test").code(), "E015");
    }

    #[test]
    fn test_error_message() {
        let err = CrmError::not_found("Lesson 7");
        assert_eq!(err.message(), "Lesson 7");
        assert_eq!(err.error_type(), "Resource Not Found");
    }

    #[test]
    fn test_classify_unique_violation() {
        let err = CrmError::from_db(
            "create branch",
            sea_orm::DbErr::Custom("UNIQUE constraint failed: companies.slug".into()),
        );
        assert!(matches!(err, CrmError::UniqueViolation(_)));
        assert!(err.is_conflict());
    }

    #[test]
    fn test_classify_foreign_key_violation() {
        let err = CrmError::from_db(
            "create lesson",
            sea_orm::DbErr::Custom("FOREIGN KEY constraint failed".into()),
        );
        assert!(matches!(err, CrmError::ForeignKeyViolation(_)));
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_date_parse_error_conversion() {
        let err: CrmError = chrono::NaiveDate::parse_from_str("2025-13-40", "%Y-%m-%d")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "E010");
    }

    #[test]
    fn test_format_simple() {
        let err = CrmError::validation("end_time must be after start_time");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("end_time"));
    }
}
