//! API 数据模型
//!
//! 每个资源分为 `entities`（返回给前端的业务实体）、`requests`、`responses` 三部分，
//! 通过 ts-rs 导出为前端类型。

pub mod auth;
pub mod branches;
pub mod common;
pub mod companies;
pub mod dashboard;
pub mod finance;
pub mod groups;
pub mod leads;
pub mod lessons;
pub mod roles;
pub mod rooms;
pub mod settings;
pub mod students;
pub mod subscriptions;
pub mod system;
pub mod teachers;
pub mod users;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery, TenantScope};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1002,
    NotFound = 1003,
    Conflict = 1004,
    RateLimitExceeded = 1005,
    ValidationFailed = 1006,
    InternalServerError = 1099,

    // 认证
    AuthFailed = 2000,
    RegisterFailed = 2001,
    CompanySuspended = 2002,
    UserInactive = 2003,

    // 机构与账号
    CompanyNotFound = 3000,
    CompanySlugExists = 3001,
    BranchNotFound = 3100,
    BranchInUse = 3101,
    UserNotFound = 3200,
    UserAlreadyExists = 3201,
    UserNameInvalid = 3202,
    UserEmailInvalid = 3203,
    UserPasswordInvalid = 3204,
    CanNotDeleteCurrentUser = 3205,
    OwnerProtected = 3206,
    RoleNotFound = 3300,
    RoleInUse = 3301,
    SystemRoleProtected = 3302,
    PermissionInvalid = 3303,
    RoleAlreadyExists = 3304,

    // 教务
    TeacherNotFound = 4000,
    StudentNotFound = 4100,
    RoomNotFound = 4200,
    GroupNotFound = 4300,
    GroupFull = 4301,
    GroupMemberExists = 4302,
    GroupMemberNotFound = 4303,

    // 排课
    LessonNotFound = 5000,
    LessonConflict = 5001,
    LessonInvalid = 5002,
    LessonAlreadyCompleted = 5003,
    LessonNotEditable = 5004,

    // 计费与财务
    SubscriptionTypeNotFound = 6000,
    SubscriptionTypeInactive = 6001,
    SubscriptionNotFound = 6100,
    SubscriptionInvalid = 6101,
    TransactionNotFound = 6200,
    TransactionInvalid = 6201,
    ExportFailed = 6202,

    // 线索
    LeadNotFound = 7000,
    LeadStatusInvalid = 7001,
    LeadAlreadyConverted = 7002,
    LeadTaskNotFound = 7003,

    // 设置
    SettingUnknown = 8000,
    SettingInvalid = 8001,
}
