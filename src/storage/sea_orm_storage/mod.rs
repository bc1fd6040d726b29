//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod branches;
mod companies;
mod dashboard;
mod finance;
mod groups;
mod leads;
mod lessons;
mod roles;
mod rooms;
mod settings;
mod students;
mod subscriptions;
mod teachers;
mod users;

use crate::config::AppConfig;
use crate::errors::{CrmError, Result};
use crate::utils::escape_like_pattern;
use migration::{Migrator, MigratorTrait};
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ColumnTrait, ConnectOptions, Condition, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, Select,
};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按配置文件创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(url: &str, pool_size: u32, timeout: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, pool_size, timeout).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout).await?
        };

        Migrator::up(&db, None)
            .await
            .map_err(|e| CrmError::database_operation(format!("Migration failed: {e}")))?;

        info!("SeaORM storage ready, database: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化，强制外键）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| CrmError::database_config(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(if in_memory {
                SqliteJournalMode::Memory
            } else {
                SqliteJournalMode::Wal
            })
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        // 内存库每个连接都是独立的数据库，只能保留一个常驻连接
        let mut pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { pool_size.max(1) })
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout));
        pool = if in_memory {
            pool.idle_timeout(None).max_lifetime(None)
        } else {
            pool.idle_timeout(Duration::from_secs(300))
        };

        let pool = pool
            .connect_with(opt)
            .await
            .map_err(|e| CrmError::database_connection(format!("SQLite connection failed: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(pool_size.min(5))
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| CrmError::database_connection(format!("Cannot connect to database: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(CrmError::database_config(format!(
                "Cannot infer database type from URL: {url}. Supported: sqlite:, postgres://, mysql://, or a .db/.sqlite path"
            )))
        }
    }
}

pub(crate) fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

/// 多列模糊搜索，空关键字返回 None
pub(crate) fn search_condition<C: ColumnTrait>(
    columns: &[C],
    search: Option<&str>,
) -> Option<Condition> {
    let keyword = search.map(str::trim).filter(|s| !s.is_empty())?;
    let pattern = format!("%{}%", escape_like_pattern(keyword));
    let cond = columns.iter().fold(Condition::any(), |cond, col| {
        cond.add(col.like(LikeExpr::new(pattern.clone()).escape('\\')))
    });
    Some(cond)
}

/// 分页查询，`page` 从 1 开始
pub(crate) async fn fetch_page<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    page: u64,
    size: u64,
    context: &str,
) -> Result<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let paginator = select.paginate(db, size);
    let total = paginator
        .num_items()
        .await
        .map_err(|e| CrmError::from_db(context, e))?;
    let items = paginator
        .fetch_page(page.saturating_sub(1))
        .await
        .map_err(|e| CrmError::from_db(context, e))?;
    Ok((items, total))
}

// Storage trait 实现
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
use crate::storage::{CompletionRules, LessonRecord, Storage};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 机构
    async fn register_company(
        &self,
        account: NewCompanyAccount,
    ) -> Result<(Company, Branch, User)> {
        self.register_company_impl(account).await
    }

    async fn get_company(&self, id: i64) -> Result<Option<Company>> {
        self.get_company_impl(id).await
    }

    async fn get_company_by_slug(&self, slug: &str) -> Result<Option<Company>> {
        self.get_company_by_slug_impl(slug).await
    }

    async fn list_companies(
        &self,
        query: CompanyQueryParams,
    ) -> Result<PaginatedResponse<Company>> {
        self.list_companies_impl(query).await
    }

    async fn update_company(
        &self,
        id: i64,
        update: UpdateCompanyRequest,
    ) -> Result<Option<Company>> {
        self.update_company_impl(id, update).await
    }

    // 分校
    async fn list_branches(
        &self,
        scope: &TenantScope,
        query: BranchQueryParams,
    ) -> Result<PaginatedResponse<Branch>> {
        self.list_branches_impl(scope, query).await
    }

    async fn get_branch(&self, company_id: i64, id: i64) -> Result<Option<Branch>> {
        self.get_branch_impl(company_id, id).await
    }

    async fn create_branch(&self, company_id: i64, req: CreateBranchRequest) -> Result<Branch> {
        self.create_branch_impl(company_id, req).await
    }

    async fn update_branch(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateBranchRequest,
    ) -> Result<Option<Branch>> {
        self.update_branch_impl(company_id, id, update).await
    }

    async fn delete_branch(&self, company_id: i64, id: i64) -> Result<bool> {
        self.delete_branch_impl(company_id, id).await
    }

    async fn count_branch_users(&self, company_id: i64, branch_id: i64) -> Result<u64> {
        self.count_branch_users_impl(company_id, branch_id).await
    }

    // 账号
    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_users(
        &self,
        scope: &TenantScope,
        query: UserQueryParams,
    ) -> Result<PaginatedResponse<User>> {
        self.list_users_impl(scope, query).await
    }

    async fn update_user(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        self.update_user_impl(company_id, id, update).await
    }

    async fn delete_user(&self, company_id: i64, id: i64) -> Result<bool> {
        self.delete_user_impl(company_id, id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_super_admins(&self) -> Result<u64> {
        self.count_super_admins_impl().await
    }

    // 角色
    async fn list_roles(
        &self,
        company_id: i64,
        query: RoleQueryParams,
    ) -> Result<PaginatedResponse<Role>> {
        self.list_roles_impl(company_id, query).await
    }

    async fn get_role(&self, company_id: i64, id: i64) -> Result<Option<Role>> {
        self.get_role_impl(company_id, id).await
    }

    async fn create_role(
        &self,
        company_id: i64,
        name: String,
        description: Option<String>,
        permissions: Vec<Permission>,
    ) -> Result<Role> {
        self.create_role_impl(company_id, name, description, permissions)
            .await
    }

    async fn update_role(
        &self,
        company_id: i64,
        id: i64,
        name: Option<String>,
        description: Option<String>,
        permissions: Option<Vec<Permission>>,
    ) -> Result<Option<Role>> {
        self.update_role_impl(company_id, id, name, description, permissions)
            .await
    }

    async fn delete_role(&self, company_id: i64, id: i64) -> Result<bool> {
        self.delete_role_impl(company_id, id).await
    }

    async fn count_role_users(&self, company_id: i64, role_id: i64) -> Result<u64> {
        self.count_role_users_impl(company_id, role_id).await
    }

    // 教师
    async fn list_teachers(
        &self,
        scope: &TenantScope,
        query: TeacherQueryParams,
    ) -> Result<PaginatedResponse<Teacher>> {
        self.list_teachers_impl(scope, query).await
    }

    async fn get_teacher(&self, company_id: i64, id: i64) -> Result<Option<Teacher>> {
        self.get_teacher_impl(company_id, id).await
    }

    async fn create_teacher(&self, company_id: i64, req: CreateTeacherRequest) -> Result<Teacher> {
        self.create_teacher_impl(company_id, req).await
    }

    async fn update_teacher(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateTeacherRequest,
    ) -> Result<Option<Teacher>> {
        self.update_teacher_impl(company_id, id, update).await
    }

    async fn delete_teacher(&self, company_id: i64, id: i64) -> Result<bool> {
        self.delete_teacher_impl(company_id, id).await
    }

    // 学员
    async fn list_students(
        &self,
        scope: &TenantScope,
        query: StudentQueryParams,
    ) -> Result<PaginatedResponse<Student>> {
        self.list_students_impl(scope, query).await
    }

    async fn get_student(&self, company_id: i64, id: i64) -> Result<Option<Student>> {
        self.get_student_impl(company_id, id).await
    }

    async fn create_student(&self, company_id: i64, req: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(company_id, req).await
    }

    async fn update_student(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        self.update_student_impl(company_id, id, update).await
    }

    async fn delete_student(&self, company_id: i64, id: i64) -> Result<bool> {
        self.delete_student_impl(company_id, id).await
    }

    // 教室
    async fn list_rooms(
        &self,
        scope: &TenantScope,
        query: RoomQueryParams,
    ) -> Result<PaginatedResponse<Room>> {
        self.list_rooms_impl(scope, query).await
    }

    async fn get_room(&self, company_id: i64, id: i64) -> Result<Option<Room>> {
        self.get_room_impl(company_id, id).await
    }

    async fn create_room(&self, company_id: i64, req: CreateRoomRequest) -> Result<Room> {
        self.create_room_impl(company_id, req).await
    }

    async fn update_room(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateRoomRequest,
    ) -> Result<Option<Room>> {
        self.update_room_impl(company_id, id, update).await
    }

    async fn delete_room(&self, company_id: i64, id: i64) -> Result<bool> {
        self.delete_room_impl(company_id, id).await
    }

    // 班组
    async fn list_groups(
        &self,
        scope: &TenantScope,
        query: GroupQueryParams,
    ) -> Result<PaginatedResponse<Group>> {
        self.list_groups_impl(scope, query).await
    }

    async fn get_group(&self, company_id: i64, id: i64) -> Result<Option<Group>> {
        self.get_group_impl(company_id, id).await
    }

    async fn create_group(&self, company_id: i64, req: CreateGroupRequest) -> Result<Group> {
        self.create_group_impl(company_id, req).await
    }

    async fn update_group(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateGroupRequest,
    ) -> Result<Option<Group>> {
        self.update_group_impl(company_id, id, update).await
    }

    async fn delete_group(&self, company_id: i64, id: i64) -> Result<bool> {
        self.delete_group_impl(company_id, id).await
    }

    async fn list_group_members(&self, group_id: i64) -> Result<Vec<GroupMember>> {
        self.list_group_members_impl(group_id).await
    }

    async fn add_group_student(
        &self,
        group_id: i64,
        student_id: i64,
    ) -> Result<GroupJoinOutcome> {
        self.add_group_student_impl(group_id, student_id).await
    }

    async fn remove_group_student(&self, group_id: i64, student_id: i64) -> Result<bool> {
        self.remove_group_student_impl(group_id, student_id).await
    }

    async fn list_group_student_ids(&self, group_id: i64) -> Result<Vec<i64>> {
        self.list_group_student_ids_impl(group_id).await
    }

    async fn list_student_group_ids(&self, student_ids: &[i64]) -> Result<Vec<i64>> {
        self.list_student_group_ids_impl(student_ids).await
    }

    // 课程
    async fn list_lessons(
        &self,
        scope: &TenantScope,
        query: LessonQueryParams,
    ) -> Result<PaginatedResponse<Lesson>> {
        self.list_lessons_impl(scope, query).await
    }

    async fn get_lesson(&self, company_id: i64, id: i64) -> Result<Option<Lesson>> {
        self.get_lesson_impl(company_id, id).await
    }

    async fn list_active_lessons_between(
        &self,
        company_id: i64,
        start: i64,
        end: i64,
    ) -> Result<Vec<Lesson>> {
        self.list_active_lessons_between_impl(company_id, start, end)
            .await
    }

    async fn create_lesson(&self, company_id: i64, lesson: LessonRecord) -> Result<Lesson> {
        self.create_lesson_impl(company_id, lesson).await
    }

    async fn update_lesson(
        &self,
        company_id: i64,
        id: i64,
        lesson: LessonRecord,
    ) -> Result<Option<Lesson>> {
        self.update_lesson_impl(company_id, id, lesson).await
    }

    async fn delete_lesson(&self, company_id: i64, id: i64) -> Result<bool> {
        self.delete_lesson_impl(company_id, id).await
    }

    async fn set_lesson_status(
        &self,
        company_id: i64,
        id: i64,
        status: LessonStatus,
    ) -> Result<Option<Lesson>> {
        self.set_lesson_status_impl(company_id, id, status).await
    }

    async fn complete_lesson(
        &self,
        company_id: i64,
        id: i64,
        attendance: Vec<AttendanceInput>,
        notes: Option<String>,
        rules: CompletionRules,
    ) -> Result<Option<CompleteLessonResponse>> {
        self.complete_lesson_impl(company_id, id, attendance, notes, rules)
            .await
    }

    async fn list_lesson_attendance(&self, lesson_id: i64) -> Result<Vec<LessonAttendance>> {
        self.list_lesson_attendance_impl(lesson_id).await
    }

    // 套餐类型
    async fn list_subscription_types(
        &self,
        company_id: i64,
        query: SubscriptionTypeQueryParams,
    ) -> Result<PaginatedResponse<SubscriptionType>> {
        self.list_subscription_types_impl(company_id, query).await
    }

    async fn get_subscription_type(
        &self,
        company_id: i64,
        id: i64,
    ) -> Result<Option<SubscriptionType>> {
        self.get_subscription_type_impl(company_id, id).await
    }

    async fn create_subscription_type(
        &self,
        company_id: i64,
        req: CreateSubscriptionTypeRequest,
    ) -> Result<SubscriptionType> {
        self.create_subscription_type_impl(company_id, req).await
    }

    async fn update_subscription_type(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateSubscriptionTypeRequest,
    ) -> Result<Option<SubscriptionType>> {
        self.update_subscription_type_impl(company_id, id, update)
            .await
    }

    async fn delete_subscription_type(&self, company_id: i64, id: i64) -> Result<bool> {
        self.delete_subscription_type_impl(company_id, id).await
    }

    // 学员套餐
    async fn list_subscriptions(
        &self,
        company_id: i64,
        query: SubscriptionQueryParams,
        today: NaiveDate,
    ) -> Result<PaginatedResponse<StudentSubscription>> {
        self.list_subscriptions_impl(company_id, query, today).await
    }

    async fn get_subscription(
        &self,
        company_id: i64,
        id: i64,
        today: NaiveDate,
    ) -> Result<Option<StudentSubscription>> {
        self.get_subscription_impl(company_id, id, today).await
    }

    async fn purchase_subscription(
        &self,
        company_id: i64,
        purchase: NewSubscription,
        today: NaiveDate,
    ) -> Result<(StudentSubscription, Option<PaymentTransaction>)> {
        self.purchase_subscription_impl(company_id, purchase, today)
            .await
    }

    async fn update_subscription(
        &self,
        company_id: i64,
        id: i64,
        patch: SubscriptionPatch,
        today: NaiveDate,
    ) -> Result<Option<StudentSubscription>> {
        self.update_subscription_impl(company_id, id, patch, today)
            .await
    }

    async fn delete_subscription(&self, company_id: i64, id: i64) -> Result<bool> {
        self.delete_subscription_impl(company_id, id).await
    }

    // 财务
    async fn list_transactions(
        &self,
        scope: &TenantScope,
        filter: TransactionFilter,
        page: u64,
        size: u64,
    ) -> Result<PaginatedResponse<PaymentTransaction>> {
        self.list_transactions_impl(scope, filter, page, size).await
    }

    async fn list_all_transactions(
        &self,
        scope: &TenantScope,
        filter: TransactionFilter,
    ) -> Result<Vec<PaymentTransaction>> {
        self.list_all_transactions_impl(scope, filter).await
    }

    async fn get_transaction(
        &self,
        company_id: i64,
        id: i64,
    ) -> Result<Option<PaymentTransaction>> {
        self.get_transaction_impl(company_id, id).await
    }

    async fn create_transaction(
        &self,
        company_id: i64,
        tx: NewTransaction,
    ) -> Result<PaymentTransaction> {
        self.create_transaction_impl(company_id, tx).await
    }

    async fn delete_transaction(&self, company_id: i64, id: i64) -> Result<bool> {
        self.delete_transaction_impl(company_id, id).await
    }

    // 线索
    async fn list_leads(
        &self,
        scope: &TenantScope,
        query: LeadQueryParams,
    ) -> Result<PaginatedResponse<Lead>> {
        self.list_leads_impl(scope, query).await
    }

    async fn get_lead(&self, company_id: i64, id: i64) -> Result<Option<Lead>> {
        self.get_lead_impl(company_id, id).await
    }

    async fn create_lead(&self, company_id: i64, req: CreateLeadRequest) -> Result<Lead> {
        self.create_lead_impl(company_id, req).await
    }

    async fn update_lead(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateLeadRequest,
    ) -> Result<Option<Lead>> {
        self.update_lead_impl(company_id, id, update).await
    }

    async fn delete_lead(&self, company_id: i64, id: i64) -> Result<bool> {
        self.delete_lead_impl(company_id, id).await
    }

    async fn change_lead_status(
        &self,
        company_id: i64,
        id: i64,
        from: LeadStatus,
        to: LeadStatus,
        note: String,
        user_id: Option<i64>,
    ) -> Result<Option<Lead>> {
        self.change_lead_status_impl(company_id, id, from, to, note, user_id)
            .await
    }

    async fn convert_lead(
        &self,
        company_id: i64,
        id: i64,
        student: CreateStudentRequest,
        user_id: Option<i64>,
    ) -> Result<Option<(Lead, Student)>> {
        self.convert_lead_impl(company_id, id, student, user_id)
            .await
    }

    async fn list_lead_activities(&self, lead_id: i64) -> Result<Vec<LeadActivity>> {
        self.list_lead_activities_impl(lead_id).await
    }

    async fn create_lead_activity(
        &self,
        lead_id: i64,
        kind: ActivityKind,
        content: String,
        user_id: Option<i64>,
    ) -> Result<LeadActivity> {
        self.create_lead_activity_impl(lead_id, kind, content, user_id)
            .await
    }

    async fn list_lead_tasks(&self, lead_id: i64) -> Result<Vec<LeadTask>> {
        self.list_lead_tasks_impl(lead_id).await
    }

    async fn create_lead_task(&self, lead_id: i64, req: CreateTaskRequest) -> Result<LeadTask> {
        self.create_lead_task_impl(lead_id, req).await
    }

    async fn update_lead_task(
        &self,
        lead_id: i64,
        task_id: i64,
        update: UpdateTaskRequest,
    ) -> Result<Option<LeadTask>> {
        self.update_lead_task_impl(lead_id, task_id, update).await
    }

    async fn delete_lead_task(&self, lead_id: i64, task_id: i64) -> Result<bool> {
        self.delete_lead_task_impl(lead_id, task_id).await
    }

    // 设置
    async fn get_company_settings(&self, company_id: i64) -> Result<HashMap<String, StoredSetting>> {
        self.get_company_settings_impl(company_id).await
    }

    async fn upsert_company_setting(
        &self,
        company_id: i64,
        key: &str,
        value: String,
        value_type: &str,
        user_id: Option<i64>,
    ) -> Result<StoredSetting> {
        self.upsert_company_setting_impl(company_id, key, value, value_type, user_id)
            .await
    }

    // 仪表盘
    async fn dashboard_stats(
        &self,
        scope: &TenantScope,
        window: &DashboardWindow,
    ) -> Result<DashboardStats> {
        self.dashboard_stats_impl(scope, window).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("crm.db").unwrap(),
            "sqlite://crm.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/crm").unwrap(),
            "postgres://u:p@localhost/crm"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nope").is_err());
    }
}
