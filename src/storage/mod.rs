//! 存储层抽象
//!
//! 除机构和账号本身外，所有方法都以 `company_id` 作为第一个条件，
//! 其他机构的数据一律表现为不存在。分校限制由 `TenantScope` 传入列表查询。

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::models::{
    PaginatedResponse, TenantScope,
    branches::{Branch, BranchQueryParams, CreateBranchRequest, UpdateBranchRequest},
    companies::{Company, CompanyQueryParams, NewCompanyAccount, UpdateCompanyRequest},
    dashboard::{DashboardStats, DashboardWindow},
    finance::{NewTransaction, PaymentTransaction, TransactionFilter},
    groups::{
        CreateGroupRequest, Group, GroupJoinOutcome, GroupMember, GroupQueryParams,
        UpdateGroupRequest,
    },
    leads::{
        ActivityKind, CreateLeadRequest, CreateTaskRequest, Lead, LeadActivity, LeadQueryParams,
        LeadStatus, LeadTask, UpdateLeadRequest, UpdateTaskRequest,
    },
    lessons::{
        AttendanceInput, CompleteLessonResponse, Lesson, LessonAttendance, LessonQueryParams,
        LessonStatus,
    },
    roles::{Permission, Role, RoleQueryParams},
    rooms::{CreateRoomRequest, Room, RoomQueryParams, UpdateRoomRequest},
    settings::StoredSetting,
    students::{CreateStudentRequest, Student, StudentQueryParams, UpdateStudentRequest},
    subscriptions::{
        CreateSubscriptionTypeRequest, NewSubscription, StudentSubscription, SubscriptionPatch,
        SubscriptionQueryParams, SubscriptionType, SubscriptionTypeQueryParams,
        UpdateSubscriptionTypeRequest,
    },
    teachers::{CreateTeacherRequest, Teacher, TeacherQueryParams, UpdateTeacherRequest},
    users::{NewUser, UpdateUserRequest, User, UserQueryParams},
};

pub mod sea_orm_storage;

pub use sea_orm_storage::SeaOrmStorage;

/// 写入课程时的字段，时间为 unix 秒
#[derive(Debug, Clone)]
pub struct LessonRecord {
    pub branch_id: Option<i64>,
    pub group_id: Option<i64>,
    pub student_id: Option<i64>,
    pub teacher_id: i64,
    pub room_id: Option<i64>,
    pub subject: Option<String>,
    pub start_time: i64,
    pub end_time: i64,
    pub status: LessonStatus,
    pub notes: Option<String>,
}

/// 完成课程时的扣课规则
#[derive(Debug, Clone)]
pub struct CompletionRules {
    pub charge_absent: bool,
    /// 机构本地的今天
    pub today: NaiveDate,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 机构
    // 注册机构：机构、默认分校、系统角色、所有者账号
    async fn register_company(&self, account: NewCompanyAccount)
    -> Result<(Company, Branch, User)>;
    async fn get_company(&self, id: i64) -> Result<Option<Company>>;
    async fn get_company_by_slug(&self, slug: &str) -> Result<Option<Company>>;
    async fn list_companies(&self, query: CompanyQueryParams)
    -> Result<PaginatedResponse<Company>>;
    async fn update_company(
        &self,
        id: i64,
        update: UpdateCompanyRequest,
    ) -> Result<Option<Company>>;

    /// 分校
    async fn list_branches(
        &self,
        scope: &TenantScope,
        query: BranchQueryParams,
    ) -> Result<PaginatedResponse<Branch>>;
    async fn get_branch(&self, company_id: i64, id: i64) -> Result<Option<Branch>>;
    async fn create_branch(&self, company_id: i64, req: CreateBranchRequest) -> Result<Branch>;
    async fn update_branch(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateBranchRequest,
    ) -> Result<Option<Branch>>;
    async fn delete_branch(&self, company_id: i64, id: i64) -> Result<bool>;
    async fn count_branch_users(&self, company_id: i64, branch_id: i64) -> Result<u64>;

    /// 账号
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 用户名或邮箱，登录使用
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users(
        &self,
        scope: &TenantScope,
        query: UserQueryParams,
    ) -> Result<PaginatedResponse<User>>;
    // `update.password` 为已哈希的密码
    async fn update_user(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>>;
    async fn delete_user(&self, company_id: i64, id: i64) -> Result<bool>;
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    async fn count_super_admins(&self) -> Result<u64>;

    /// 角色
    async fn list_roles(
        &self,
        company_id: i64,
        query: RoleQueryParams,
    ) -> Result<PaginatedResponse<Role>>;
    async fn get_role(&self, company_id: i64, id: i64) -> Result<Option<Role>>;
    async fn create_role(
        &self,
        company_id: i64,
        name: String,
        description: Option<String>,
        permissions: Vec<Permission>,
    ) -> Result<Role>;
    async fn update_role(
        &self,
        company_id: i64,
        id: i64,
        name: Option<String>,
        description: Option<String>,
        permissions: Option<Vec<Permission>>,
    ) -> Result<Option<Role>>;
    async fn delete_role(&self, company_id: i64, id: i64) -> Result<bool>;
    async fn count_role_users(&self, company_id: i64, role_id: i64) -> Result<u64>;

    /// 教师
    async fn list_teachers(
        &self,
        scope: &TenantScope,
        query: TeacherQueryParams,
    ) -> Result<PaginatedResponse<Teacher>>;
    async fn get_teacher(&self, company_id: i64, id: i64) -> Result<Option<Teacher>>;
    async fn create_teacher(&self, company_id: i64, req: CreateTeacherRequest) -> Result<Teacher>;
    async fn update_teacher(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateTeacherRequest,
    ) -> Result<Option<Teacher>>;
    async fn delete_teacher(&self, company_id: i64, id: i64) -> Result<bool>;

    /// 学员
    async fn list_students(
        &self,
        scope: &TenantScope,
        query: StudentQueryParams,
    ) -> Result<PaginatedResponse<Student>>;
    async fn get_student(&self, company_id: i64, id: i64) -> Result<Option<Student>>;
    async fn create_student(&self, company_id: i64, req: CreateStudentRequest) -> Result<Student>;
    async fn update_student(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>>;
    async fn delete_student(&self, company_id: i64, id: i64) -> Result<bool>;

    /// 教室
    async fn list_rooms(
        &self,
        scope: &TenantScope,
        query: RoomQueryParams,
    ) -> Result<PaginatedResponse<Room>>;
    async fn get_room(&self, company_id: i64, id: i64) -> Result<Option<Room>>;
    async fn create_room(&self, company_id: i64, req: CreateRoomRequest) -> Result<Room>;
    async fn update_room(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateRoomRequest,
    ) -> Result<Option<Room>>;
    async fn delete_room(&self, company_id: i64, id: i64) -> Result<bool>;

    /// 班组
    async fn list_groups(
        &self,
        scope: &TenantScope,
        query: GroupQueryParams,
    ) -> Result<PaginatedResponse<Group>>;
    async fn get_group(&self, company_id: i64, id: i64) -> Result<Option<Group>>;
    async fn create_group(&self, company_id: i64, req: CreateGroupRequest) -> Result<Group>;
    async fn update_group(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateGroupRequest,
    ) -> Result<Option<Group>>;
    async fn delete_group(&self, company_id: i64, id: i64) -> Result<bool>;
    async fn list_group_members(&self, group_id: i64) -> Result<Vec<GroupMember>>;
    // 在事务内检查人数上限
    async fn add_group_student(&self, group_id: i64, student_id: i64)
    -> Result<GroupJoinOutcome>;
    async fn remove_group_student(&self, group_id: i64, student_id: i64) -> Result<bool>;
    async fn list_group_student_ids(&self, group_id: i64) -> Result<Vec<i64>>;
    /// 这些学员所在的全部班组，去重
    async fn list_student_group_ids(&self, student_ids: &[i64]) -> Result<Vec<i64>>;

    /// 课程
    async fn list_lessons(
        &self,
        scope: &TenantScope,
        query: LessonQueryParams,
    ) -> Result<PaginatedResponse<Lesson>>;
    async fn get_lesson(&self, company_id: i64, id: i64) -> Result<Option<Lesson>>;
    // 与 [start, end) 相交且未取消的课程
    async fn list_active_lessons_between(
        &self,
        company_id: i64,
        start: i64,
        end: i64,
    ) -> Result<Vec<Lesson>>;
    async fn create_lesson(&self, company_id: i64, lesson: LessonRecord) -> Result<Lesson>;
    async fn update_lesson(
        &self,
        company_id: i64,
        id: i64,
        lesson: LessonRecord,
    ) -> Result<Option<Lesson>>;
    async fn delete_lesson(&self, company_id: i64, id: i64) -> Result<bool>;
    async fn set_lesson_status(
        &self,
        company_id: i64,
        id: i64,
        status: LessonStatus,
    ) -> Result<Option<Lesson>>;
    // 写入考勤并扣课；课程已完成时返回 Conflict
    async fn complete_lesson(
        &self,
        company_id: i64,
        id: i64,
        attendance: Vec<AttendanceInput>,
        notes: Option<String>,
        rules: CompletionRules,
    ) -> Result<Option<CompleteLessonResponse>>;
    async fn list_lesson_attendance(&self, lesson_id: i64) -> Result<Vec<LessonAttendance>>;

    /// 套餐类型
    async fn list_subscription_types(
        &self,
        company_id: i64,
        query: SubscriptionTypeQueryParams,
    ) -> Result<PaginatedResponse<SubscriptionType>>;
    async fn get_subscription_type(
        &self,
        company_id: i64,
        id: i64,
    ) -> Result<Option<SubscriptionType>>;
    async fn create_subscription_type(
        &self,
        company_id: i64,
        req: CreateSubscriptionTypeRequest,
    ) -> Result<SubscriptionType>;
    async fn update_subscription_type(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateSubscriptionTypeRequest,
    ) -> Result<Option<SubscriptionType>>;
    async fn delete_subscription_type(&self, company_id: i64, id: i64) -> Result<bool>;

    /// 学员套餐
    async fn list_subscriptions(
        &self,
        company_id: i64,
        query: SubscriptionQueryParams,
        today: NaiveDate,
    ) -> Result<PaginatedResponse<StudentSubscription>>;
    async fn get_subscription(
        &self,
        company_id: i64,
        id: i64,
        today: NaiveDate,
    ) -> Result<Option<StudentSubscription>>;
    // 套餐与收入流水在同一事务中写入
    async fn purchase_subscription(
        &self,
        company_id: i64,
        purchase: NewSubscription,
        today: NaiveDate,
    ) -> Result<(StudentSubscription, Option<PaymentTransaction>)>;
    async fn update_subscription(
        &self,
        company_id: i64,
        id: i64,
        patch: SubscriptionPatch,
        today: NaiveDate,
    ) -> Result<Option<StudentSubscription>>;
    async fn delete_subscription(&self, company_id: i64, id: i64) -> Result<bool>;

    /// 财务
    async fn list_transactions(
        &self,
        scope: &TenantScope,
        filter: TransactionFilter,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<PaymentTransaction>>;
    // 不分页，用于汇总与导出
    async fn list_all_transactions(
        &self,
        scope: &TenantScope,
        filter: TransactionFilter,
    ) -> Result<Vec<PaymentTransaction>>;
    async fn get_transaction(&self, company_id: i64, id: i64)
    -> Result<Option<PaymentTransaction>>;
    async fn create_transaction(
        &self,
        company_id: i64,
        tx: NewTransaction,
    ) -> Result<PaymentTransaction>;
    async fn delete_transaction(&self, company_id: i64, id: i64) -> Result<bool>;

    /// 线索
    async fn list_leads(
        &self,
        scope: &TenantScope,
        query: LeadQueryParams,
    ) -> Result<PaginatedResponse<Lead>>;
    async fn get_lead(&self, company_id: i64, id: i64) -> Result<Option<Lead>>;
    async fn create_lead(&self, company_id: i64, req: CreateLeadRequest) -> Result<Lead>;
    async fn update_lead(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateLeadRequest,
    ) -> Result<Option<Lead>>;
    async fn delete_lead(&self, company_id: i64, id: i64) -> Result<bool>;
    // 仅当当前状态仍为 `from` 时修改，并写入 status_change 记录
    async fn change_lead_status(
        &self,
        company_id: i64,
        id: i64,
        from: LeadStatus,
        to: LeadStatus,
        note: String,
        user_id: Option<i64>,
    ) -> Result<Option<Lead>>;
    // 创建学员、标记 enrolled 并关联学员
    async fn convert_lead(
        &self,
        company_id: i64,
        id: i64,
        student: CreateStudentRequest,
        user_id: Option<i64>,
    ) -> Result<Option<(Lead, Student)>>;
    async fn list_lead_activities(&self, lead_id: i64) -> Result<Vec<LeadActivity>>;
    async fn create_lead_activity(
        &self,
        lead_id: i64,
        kind: ActivityKind,
        content: String,
        user_id: Option<i64>,
    ) -> Result<LeadActivity>;
    async fn list_lead_tasks(&self, lead_id: i64) -> Result<Vec<LeadTask>>;
    async fn create_lead_task(&self, lead_id: i64, req: CreateTaskRequest) -> Result<LeadTask>;
    async fn update_lead_task(
        &self,
        lead_id: i64,
        task_id: i64,
        update: UpdateTaskRequest,
    ) -> Result<Option<LeadTask>>;
    async fn delete_lead_task(&self, lead_id: i64, task_id: i64) -> Result<bool>;

    /// 设置
    async fn get_company_settings(&self, company_id: i64) -> Result<HashMap<String, StoredSetting>>;
    async fn upsert_company_setting(
        &self,
        company_id: i64,
        key: &str,
        value: String,
        value_type: &str,
        user_id: Option<i64>,
    ) -> Result<StoredSetting>;

    /// 仪表盘
    async fn dashboard_stats(
        &self,
        scope: &TenantScope,
        window: &DashboardWindow,
    ) -> Result<DashboardStats>;
}

/// 按配置创建存储并运行迁移
pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
