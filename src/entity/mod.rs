//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod branches;
pub mod companies;
pub mod company_settings;
pub mod group_students;
pub mod groups;
pub mod lead_activities;
pub mod lead_tasks;
pub mod leads;
pub mod lesson_attendance;
pub mod lessons;
pub mod payment_transactions;
pub mod roles;
pub mod rooms;
pub mod student_subscriptions;
pub mod students;
pub mod subscription_types;
pub mod teachers;
pub mod users;
