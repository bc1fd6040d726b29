//! 预导入模块，方便使用

pub use super::branches::{
    ActiveModel as BranchActiveModel,
    Column as BranchColumn,
    Entity as Branches,
    Model as BranchModel,
};
pub use super::companies::{
    ActiveModel as CompanyActiveModel,
    Column as CompanyColumn,
    Entity as Companies,
    Model as CompanyModel,
};
pub use super::company_settings::{
    ActiveModel as CompanySettingActiveModel,
    Column as CompanySettingColumn,
    Entity as CompanySettings,
    Model as CompanySettingModel,
};
pub use super::group_students::{
    ActiveModel as GroupStudentActiveModel,
    Column as GroupStudentColumn,
    Entity as GroupStudents,
    Model as GroupStudentModel,
};
pub use super::groups::{
    ActiveModel as GroupActiveModel,
    Column as GroupColumn,
    Entity as Groups,
    Model as GroupModel,
};
pub use super::lead_activities::{
    ActiveModel as LeadActivityActiveModel,
    Column as LeadActivityColumn,
    Entity as LeadActivities,
    Model as LeadActivityModel,
};
pub use super::lead_tasks::{
    ActiveModel as LeadTaskActiveModel,
    Column as LeadTaskColumn,
    Entity as LeadTasks,
    Model as LeadTaskModel,
};
pub use super::leads::{
    ActiveModel as LeadActiveModel,
    Column as LeadColumn,
    Entity as Leads,
    Model as LeadModel,
};
pub use super::lesson_attendance::{
    ActiveModel as AttendanceActiveModel,
    Column as AttendanceColumn,
    Entity as LessonAttendance,
    Model as AttendanceModel,
};
pub use super::lessons::{
    ActiveModel as LessonActiveModel,
    Column as LessonColumn,
    Entity as Lessons,
    Model as LessonModel,
};
pub use super::payment_transactions::{
    ActiveModel as TransactionActiveModel,
    Column as TransactionColumn,
    Entity as PaymentTransactions,
    Model as TransactionModel,
};
pub use super::roles::{
    ActiveModel as RoleActiveModel,
    Column as RoleColumn,
    Entity as Roles,
    Model as RoleModel,
};
pub use super::rooms::{
    ActiveModel as RoomActiveModel,
    Column as RoomColumn,
    Entity as Rooms,
    Model as RoomModel,
};
pub use super::student_subscriptions::{
    ActiveModel as SubscriptionActiveModel,
    Column as SubscriptionColumn,
    Entity as StudentSubscriptions,
    Model as SubscriptionModel,
};
pub use super::students::{
    ActiveModel as StudentActiveModel,
    Column as StudentColumn,
    Entity as Students,
    Model as StudentModel,
};
pub use super::subscription_types::{
    ActiveModel as SubscriptionTypeActiveModel,
    Column as SubscriptionTypeColumn,
    Entity as SubscriptionTypes,
    Model as SubscriptionTypeModel,
};
pub use super::teachers::{
    ActiveModel as TeacherActiveModel,
    Column as TeacherColumn,
    Entity as Teachers,
    Model as TeacherModel,
};
pub use super::users::{
    ActiveModel as UserActiveModel,
    Column as UserColumn,
    Entity as Users,
    Model as UserModel,
};
