pub mod de;
pub mod pagination;
pub mod response;
pub mod scope;

pub use pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use response::ApiResponse;
pub use scope::TenantScope;

/// 定义以字符串存储的枚举
///
/// 生成 serde（snake_case 文本）、`as_str`、`Display`、`FromStr` 以及 `ALL` 常量。
/// 数据库中保存 `as_str()` 的结果，读取时用 `parse()` 还原。
#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, ts_rs::TS)]
        $(#[$meta])*
        $vis enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!(
                        "Invalid {}: '{}'. Supported: {}",
                        stringify!($name),
                        s,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }
    };
}

/// 将 unix 秒转换为 UTC 时间
pub fn from_timestamp(ts: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::<chrono::Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    crate::string_enum! {
        #[ts(export, export_to = "../frontend/src/types/generated/test_only.ts")]
        pub enum Sample {
            Alpha => "alpha",
            BetaGamma => "beta_gamma",
        }
    }

    #[test]
    fn test_string_enum_text_round_trip() {
        assert_eq!(Sample::BetaGamma.as_str(), "beta_gamma");
        assert_eq!("alpha".parse::<Sample>(), Ok(Sample::Alpha));
        assert_eq!(Sample::ALL.len(), 2);
    }

    #[test]
    fn test_string_enum_rejects_unknown() {
        let err = "delta".parse::<Sample>().unwrap_err();
        assert!(err.contains("alpha, beta_gamma"));
        assert!(serde_json::from_str::<Sample>("\"delta\"").is_err());
        assert_eq!(
            serde_json::to_string(&Sample::BetaGamma).unwrap(),
            "\"beta_gamma\""
        );
    }
}
