//! 存储层集成测试：租户隔离、班组人数、扣课、购买套餐与线索转化

mod common;

use chrono::{NaiveDate, TimeZone, Utc};

use common::{memory_storage, query, register_center, scope_of};
use edu_crm::errors::CrmError;
use edu_crm::models::dashboard::DashboardWindow;
use edu_crm::models::finance::{NewTransaction, PaymentMethod, TransactionFilter, TransactionKind};
use edu_crm::models::groups::{CreateGroupRequest, GroupJoinOutcome};
use edu_crm::models::leads::{ActivityKind, CreateLeadRequest, LeadStatus};
use edu_crm::models::lessons::{
    AttendanceInput, AttendanceStatus, ConflictKind, LessonConflict, LessonStatus,
};
use edu_crm::models::students::CreateStudentRequest;
use edu_crm::models::subscriptions::{CreateSubscriptionTypeRequest, NewSubscription};
use edu_crm::models::teachers::CreateTeacherRequest;
use edu_crm::services::lessons::conflicts::{Participants, find_conflicts};
use edu_crm::storage::{CompletionRules, LessonRecord, Storage};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 10).expect("date")
}

fn ts(day: u32, hour: u32) -> i64 {
    Utc.with_ymd_and_hms(2030, 1, day, hour, 0, 0)
        .single()
        .expect("timestamp")
        .timestamp()
}

fn student(first_name: &str) -> CreateStudentRequest {
    CreateStudentRequest {
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        ..Default::default()
    }
}

fn teacher() -> CreateTeacherRequest {
    CreateTeacherRequest {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        phone: None,
        email: None,
        subjects: vec!["math".to_string()],
        hourly_rate: Some(20.0),
        status: None,
        hired_at: None,
        notes: None,
        branch_id: None,
        user_id: None,
    }
}

fn group(name: &str, max_students: i32) -> CreateGroupRequest {
    CreateGroupRequest {
        name: name.to_string(),
        subject: None,
        level: None,
        teacher_id: None,
        room_id: None,
        max_students,
        status: None,
        start_date: None,
        end_date: None,
        branch_id: None,
    }
}

fn income(student_id: i64, amount: f64) -> NewTransaction {
    NewTransaction {
        branch_id: None,
        student_id: Some(student_id),
        subscription_id: None,
        amount,
        kind: TransactionKind::Income,
        method: PaymentMethod::Cash,
        category: Some("subscription".to_string()),
        description: None,
        occurred_at: ts(10, 9),
        created_by: None,
    }
}

async fn buy(
    storage: &dyn Storage,
    company_id: i64,
    student_id: i64,
    type_id: i64,
    lessons: i32,
    end_date: &str,
) -> i64 {
    let (subscription, _) = storage
        .purchase_subscription(
            company_id,
            NewSubscription {
                student_id,
                subscription_type_id: type_id,
                group_id: None,
                lessons_total: lessons,
                price_paid: 100.0,
                start_date: "2030-01-01".to_string(),
                end_date: end_date.to_string(),
                payment: Some(income(student_id, 100.0)),
            },
            today(),
        )
        .await
        .expect("purchase");
    subscription.id
}

async fn subscription_type(storage: &dyn Storage, company_id: i64) -> i64 {
    storage
        .create_subscription_type(
            company_id,
            CreateSubscriptionTypeRequest {
                name: "8 lessons".to_string(),
                lessons_count: 8,
                price: 100.0,
                duration_days: 30,
                is_active: None,
                description: None,
            },
        )
        .await
        .expect("subscription type")
        .id
}

#[tokio::test]
async fn register_creates_owner_branch_and_system_roles() {
    let storage = memory_storage().await;
    let (company, branch, owner) = register_center(storage.as_ref(), "alpha").await;

    assert_eq!(branch.company_id, company.id);
    assert_eq!(owner.company_id, Some(company.id));

    let roles = storage
        .list_roles(company.id, query(serde_json::json!({})))
        .await
        .expect("roles");
    assert!(roles.pagination.total >= 1);
    assert!(roles.items.iter().all(|r| r.company_id == company.id));
}

#[tokio::test]
async fn records_of_another_center_are_invisible() {
    let storage = memory_storage().await;
    let (alpha, _, _) = register_center(storage.as_ref(), "alpha").await;
    let (beta, _, _) = register_center(storage.as_ref(), "beta").await;

    let created = storage
        .create_student(alpha.id, student("Mira"))
        .await
        .expect("student");

    assert!(storage.get_student(beta.id, created.id).await.expect("get").is_none());
    assert!(!storage.delete_student(beta.id, created.id).await.expect("delete"));

    let listed = storage
        .list_students(&scope_of(&beta), query(serde_json::json!({})))
        .await
        .expect("list");
    assert_eq!(listed.pagination.total, 0);

    let own = storage
        .list_students(&scope_of(&alpha), query(serde_json::json!({})))
        .await
        .expect("list");
    assert_eq!(own.pagination.total, 1);
}

#[tokio::test]
async fn group_rejects_members_beyond_capacity() {
    let storage = memory_storage().await;
    let (company, _, _) = register_center(storage.as_ref(), "alpha").await;
    let g = storage
        .create_group(company.id, group("Beginners", 1))
        .await
        .expect("group");
    let first = storage.create_student(company.id, student("A")).await.expect("student");
    let second = storage.create_student(company.id, student("B")).await.expect("student");

    assert!(matches!(
        storage.add_group_student(g.id, first.id).await.expect("join"),
        GroupJoinOutcome::Added(_)
    ));
    assert!(matches!(
        storage.add_group_student(g.id, first.id).await.expect("join"),
        GroupJoinOutcome::AlreadyMember
    ));
    assert!(matches!(
        storage.add_group_student(g.id, second.id).await.expect("join"),
        GroupJoinOutcome::Full
    ));

    let reloaded = storage.get_group(company.id, g.id).await.expect("get").expect("group");
    assert_eq!(reloaded.student_count, 1);
}

#[tokio::test]
async fn concurrent_joins_respect_group_capacity() {
    let storage = memory_storage().await;
    let (company, _, _) = register_center(storage.as_ref(), "alpha").await;
    let g = storage
        .create_group(company.id, group("Last seat", 1))
        .await
        .expect("group");
    let a = storage.create_student(company.id, student("A")).await.expect("student");
    let b = storage.create_student(company.id, student("B")).await.expect("student");
    let c = storage.create_student(company.id, student("C")).await.expect("student");

    let (first, second, third) = tokio::join!(
        storage.add_group_student(g.id, a.id),
        storage.add_group_student(g.id, b.id),
        storage.add_group_student(g.id, c.id),
    );
    let added = [first, second, third]
        .into_iter()
        .map(|outcome| outcome.expect("join"))
        .filter(|outcome| matches!(outcome, GroupJoinOutcome::Added(_)))
        .count();
    assert_eq!(added, 1);

    let reloaded = storage.get_group(company.id, g.id).await.expect("get").expect("group");
    assert_eq!(reloaded.student_count, 1);
}

#[tokio::test]
async fn completing_a_lesson_charges_the_earliest_expiring_subscription() {
    let storage = memory_storage().await;
    let (company, _, _) = register_center(storage.as_ref(), "alpha").await;
    let t = storage.create_teacher(company.id, teacher()).await.expect("teacher");
    let s = storage.create_student(company.id, student("Lena")).await.expect("student");
    let type_id = subscription_type(storage.as_ref(), company.id).await;

    let later = buy(storage.as_ref(), company.id, s.id, type_id, 8, "2030-03-01").await;
    let earlier = buy(storage.as_ref(), company.id, s.id, type_id, 4, "2030-02-01").await;

    let lesson = storage
        .create_lesson(
            company.id,
            LessonRecord {
                branch_id: None,
                group_id: None,
                student_id: Some(s.id),
                teacher_id: t.id,
                room_id: None,
                subject: None,
                start_time: ts(10, 10),
                end_time: ts(10, 11),
                status: LessonStatus::Scheduled,
                notes: None,
            },
        )
        .await
        .expect("lesson");

    let rules = CompletionRules {
        charge_absent: false,
        today: today(),
    };
    let result = storage
        .complete_lesson(
            company.id,
            lesson.id,
            vec![AttendanceInput {
                student_id: s.id,
                status: AttendanceStatus::Present,
            }],
            None,
            rules.clone(),
        )
        .await
        .expect("complete")
        .expect("lesson exists");

    assert_eq!(result.lesson.status, LessonStatus::Completed);
    let charge = &result.attendance[0];
    assert!(charge.charged);
    assert_eq!(charge.subscription_id, Some(earlier));
    assert_eq!(charge.lessons_remaining, Some(3));

    let untouched = storage
        .get_subscription(company.id, later, today())
        .await
        .expect("get")
        .expect("subscription");
    assert_eq!(untouched.lessons_used, 0);

    let again = storage
        .complete_lesson(company.id, lesson.id, Vec::new(), None, rules)
        .await;
    assert!(matches!(again, Err(CrmError::Conflict(_))));

    let attendance = storage.list_lesson_attendance(lesson.id).await.expect("attendance");
    assert_eq!(attendance.len(), 1);
    assert_eq!(attendance[0].subscription_id, Some(earlier));
}

fn lesson_at(hour: u32, teacher_id: i64, group_id: Option<i64>, student_id: Option<i64>) -> LessonRecord {
    LessonRecord {
        branch_id: None,
        group_id,
        student_id,
        teacher_id,
        room_id: None,
        subject: None,
        start_time: ts(15, hour),
        end_time: ts(15, hour + 1),
        status: LessonStatus::Scheduled,
        notes: None,
    }
}

#[tokio::test]
async fn group_lessons_conflict_with_their_members_in_both_directions() {
    let storage = memory_storage().await;
    let (company, _, _) = register_center(storage.as_ref(), "alpha").await;
    let first = storage.create_teacher(company.id, teacher()).await.expect("teacher");
    let second = storage.create_teacher(company.id, teacher()).await.expect("teacher");
    let third = storage.create_teacher(company.id, teacher()).await.expect("teacher");
    let s = storage.create_student(company.id, student("Shared")).await.expect("student");
    let g = storage.create_group(company.id, group("Morning", 10)).await.expect("group");
    let g2 = storage.create_group(company.id, group("Chess", 10)).await.expect("group");
    storage.add_group_student(g.id, s.id).await.expect("join");
    storage.add_group_student(g2.id, s.id).await.expect("join");

    let private = storage
        .create_lesson(company.id, lesson_at(10, first.id, None, Some(s.id)))
        .await
        .expect("private lesson");
    let chess = storage
        .create_lesson(company.id, lesson_at(10, second.id, Some(g2.id), None))
        .await
        .expect("group lesson");

    let (start, end) = (
        Utc.timestamp_opt(ts(15, 10), 0).single().expect("start"),
        Utc.timestamp_opt(ts(15, 11), 0).single().expect("end"),
    );
    let kinds = |conflicts: Vec<LessonConflict>| {
        conflicts
            .into_iter()
            .map(|c| (c.kind, c.lesson_id))
            .collect::<Vec<_>>()
    };

    // 班组课对成员的个人课与共享成员的其他班组课
    let morning = Participants {
        teacher_id: Some(third.id),
        group_id: Some(g.id),
        ..Default::default()
    };
    let found = find_conflicts(storage.as_ref(), company.id, morning, start, end, None)
        .await
        .expect("conflicts");
    assert_eq!(
        kinds(found),
        vec![
            (ConflictKind::Student, Some(private.id)),
            (ConflictKind::Student, Some(chess.id)),
        ]
    );

    // 个人课对班组课
    let solo = Participants {
        teacher_id: Some(third.id),
        student_id: Some(s.id),
        ..Default::default()
    };
    let found = find_conflicts(storage.as_ref(), company.id, solo, start, end, None)
        .await
        .expect("conflicts");
    assert_eq!(
        kinds(found),
        vec![
            (ConflictKind::Student, Some(private.id)),
            (ConflictKind::Student, Some(chess.id)),
        ]
    );

    // 首尾相接不冲突
    let later = Participants {
        teacher_id: Some(third.id),
        group_id: Some(g.id),
        ..Default::default()
    };
    let after = Utc.timestamp_opt(ts(15, 12), 0).single().expect("after");
    let found = find_conflicts(storage.as_ref(), company.id, later, end, after, None)
        .await
        .expect("conflicts");
    assert!(found.is_empty());
}

#[tokio::test]
async fn absent_students_are_not_charged_by_default() {
    let storage = memory_storage().await;
    let (company, _, _) = register_center(storage.as_ref(), "alpha").await;
    let t = storage.create_teacher(company.id, teacher()).await.expect("teacher");
    let absent = storage.create_student(company.id, student("Absent")).await.expect("student");
    let unpaid = storage.create_student(company.id, student("Unpaid")).await.expect("student");
    let type_id = subscription_type(storage.as_ref(), company.id).await;
    buy(storage.as_ref(), company.id, absent.id, type_id, 4, "2030-02-01").await;

    let g = storage.create_group(company.id, group("Evening", 10)).await.expect("group");
    let lesson = storage
        .create_lesson(
            company.id,
            LessonRecord {
                branch_id: None,
                group_id: Some(g.id),
                student_id: None,
                teacher_id: t.id,
                room_id: None,
                subject: Some("math".to_string()),
                start_time: ts(10, 18),
                end_time: ts(10, 19),
                status: LessonStatus::Scheduled,
                notes: None,
            },
        )
        .await
        .expect("lesson");

    let result = storage
        .complete_lesson(
            company.id,
            lesson.id,
            vec![
                AttendanceInput {
                    student_id: absent.id,
                    status: AttendanceStatus::Absent,
                },
                AttendanceInput {
                    student_id: unpaid.id,
                    status: AttendanceStatus::Present,
                },
            ],
            Some("quiz".to_string()),
            CompletionRules {
                charge_absent: false,
                today: today(),
            },
        )
        .await
        .expect("complete")
        .expect("lesson exists");

    assert!(!result.attendance[0].charged);
    assert!(result.attendance[0].warning.is_none());
    assert!(!result.attendance[1].charged);
    assert!(result.attendance[1].warning.is_some());
    assert_eq!(result.lesson.notes.as_deref(), Some("quiz"));
}

#[tokio::test]
async fn purchase_records_linked_income() {
    let storage = memory_storage().await;
    let (company, _, _) = register_center(storage.as_ref(), "alpha").await;
    let s = storage.create_student(company.id, student("Payer")).await.expect("student");
    let type_id = subscription_type(storage.as_ref(), company.id).await;
    let subscription_id = buy(storage.as_ref(), company.id, s.id, type_id, 8, "2030-02-01").await;

    let transactions = storage
        .list_all_transactions(
            &scope_of(&company),
            TransactionFilter {
                kind: Some(TransactionKind::Income),
                ..Default::default()
            },
        )
        .await
        .expect("transactions");
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].subscription_id, Some(subscription_id));
    assert_eq!(transactions[0].student_id, Some(s.id));
    assert!((transactions[0].amount - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn converting_a_lead_creates_exactly_one_student() {
    let storage = memory_storage().await;
    let (company, _, owner) = register_center(storage.as_ref(), "alpha").await;
    let lead = storage
        .create_lead(
            company.id,
            CreateLeadRequest {
                name: "Olga Petrova".to_string(),
                phone: Some("+10000000001".to_string()),
                email: None,
                source: Some("instagram".to_string()),
                assigned_to: None,
                notes: None,
                branch_id: None,
            },
        )
        .await
        .expect("lead");
    assert_eq!(lead.status, LeadStatus::New);

    storage
        .change_lead_status(
            company.id,
            lead.id,
            LeadStatus::New,
            LeadStatus::InProgress,
            "new -> in_progress".to_string(),
            Some(owner.id),
        )
        .await
        .expect("status")
        .expect("lead exists");

    // 状态已变化，旧的 from 不再匹配
    let stale = storage
        .change_lead_status(
            company.id,
            lead.id,
            LeadStatus::New,
            LeadStatus::Rejected,
            "new -> rejected".to_string(),
            None,
        )
        .await;
    assert!(matches!(stale, Err(CrmError::Conflict(_))));

    let (converted, created) = storage
        .convert_lead(
            company.id,
            lead.id,
            CreateStudentRequest {
                first_name: "Olga".to_string(),
                last_name: "Petrova".to_string(),
                phone: lead.phone.clone(),
                ..Default::default()
            },
            Some(owner.id),
        )
        .await
        .expect("convert")
        .expect("lead exists");
    assert_eq!(converted.status, LeadStatus::Enrolled);
    assert_eq!(converted.student_id, Some(created.id));

    let twice = storage
        .convert_lead(company.id, lead.id, student("Olga"), None)
        .await;
    assert!(matches!(twice, Err(CrmError::Conflict(_))));

    let students = storage
        .list_students(&scope_of(&company), query(serde_json::json!({})))
        .await
        .expect("students");
    assert_eq!(students.pagination.total, 1);

    let activities = storage.list_lead_activities(lead.id).await.expect("activities");
    let changes = activities
        .iter()
        .filter(|a| a.kind == ActivityKind::StatusChange)
        .count();
    assert_eq!(changes, 2);
}

#[tokio::test]
async fn new_leads_cannot_be_converted_directly() {
    let storage = memory_storage().await;
    let (company, _, _) = register_center(storage.as_ref(), "alpha").await;
    let lead = storage
        .create_lead(
            company.id,
            CreateLeadRequest {
                name: "Ivan Sokolov".to_string(),
                phone: None,
                email: None,
                source: None,
                assigned_to: None,
                notes: None,
                branch_id: None,
            },
        )
        .await
        .expect("lead");

    let skipped = storage
        .convert_lead(company.id, lead.id, student("Ivan"), None)
        .await;
    assert!(matches!(skipped, Err(CrmError::Validation(_))));

    let reloaded = storage.get_lead(company.id, lead.id).await.expect("get").expect("lead");
    assert_eq!(reloaded.status, LeadStatus::New);
    assert_eq!(reloaded.student_id, None);
    let students = storage
        .list_students(&scope_of(&company), query(serde_json::json!({})))
        .await
        .expect("students");
    assert_eq!(students.pagination.total, 0);
}

#[tokio::test]
async fn free_subscriptions_record_no_income() {
    let storage = memory_storage().await;
    let (company, _, _) = register_center(storage.as_ref(), "alpha").await;
    let s = storage.create_student(company.id, student("Trial")).await.expect("student");
    let type_id = subscription_type(storage.as_ref(), company.id).await;

    let (subscription, payment) = storage
        .purchase_subscription(
            company.id,
            NewSubscription {
                student_id: s.id,
                subscription_type_id: type_id,
                group_id: None,
                lessons_total: 1,
                price_paid: 0.0,
                start_date: "2030-01-01".to_string(),
                end_date: "2030-01-31".to_string(),
                payment: None,
            },
            today(),
        )
        .await
        .expect("purchase");
    assert!(payment.is_none());
    assert_eq!(subscription.lessons_total, 1);

    let transactions = storage
        .list_all_transactions(&scope_of(&company), TransactionFilter::default())
        .await
        .expect("transactions");
    assert!(transactions.is_empty());
}

#[tokio::test]
async fn dashboard_counts_only_own_center() {
    let storage = memory_storage().await;
    let (alpha, _, _) = register_center(storage.as_ref(), "alpha").await;
    let (beta, _, _) = register_center(storage.as_ref(), "beta").await;

    let s = storage.create_student(alpha.id, student("Counted")).await.expect("student");
    storage.create_student(beta.id, student("Elsewhere")).await.expect("student");
    storage.create_teacher(alpha.id, teacher()).await.expect("teacher");
    let type_id = subscription_type(storage.as_ref(), alpha.id).await;
    buy(storage.as_ref(), alpha.id, s.id, type_id, 2, "2030-01-15").await;

    let window = DashboardWindow {
        day_start: ts(10, 0),
        day_end: ts(11, 0),
        month_start: ts(1, 0),
        month_end: Utc
            .with_ymd_and_hms(2030, 2, 1, 0, 0, 0)
            .single()
            .expect("timestamp")
            .timestamp(),
        today: "2030-01-10".to_string(),
        expiring_until: "2030-01-17".to_string(),
        low_balance_threshold: 2,
    };
    let stats = storage
        .dashboard_stats(&scope_of(&alpha), &window)
        .await
        .expect("stats");

    assert_eq!(stats.active_students, 1);
    assert_eq!(stats.active_teachers, 1);
    assert_eq!(stats.expiring_subscriptions, 1);
    assert_eq!(stats.low_balance_subscriptions, 1);
    assert!((stats.month_income - 100.0).abs() < f64::EPSILON);
    assert!(stats.month_expense.abs() < f64::EPSILON);
}
