//! HTTP 层集成测试：注册登录、排课冲突、权限与租户隔离

mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use serde_json::{Value, json};

use common::{PASSWORD, memory_cache, memory_storage};
use edu_crm::cache::{CacheResult, ObjectCache, keys};
use edu_crm::utils::jwt::REFRESH_TOKEN_COOKIE;

/// 发送请求并解析 JSON 响应体
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

/// 注册机构并以所有者登录，返回 access token
///
/// 限流按客户端 IP 计数，每个测试使用自己的 IP。
macro_rules! register_and_login {
    ($app:expr, $slug:expr, $ip:expr) => {{
        let (status, body) = send!(
            $app,
            TestRequest::post()
                .uri("/api/v1/auth/register")
                .insert_header(("X-Forwarded-For", $ip))
                .set_json(json!({
                    "company_name": format!("Center {}", $slug),
                    "company_slug": $slug,
                    "username": format!("{}_owner", $slug),
                    "email": format!("owner@{}.test", $slug),
                    "password": PASSWORD,
                }))
        );
        assert_eq!(status, StatusCode::CREATED, "register: {body}");
        login!($app, format!("{}_owner", $slug), $ip)
    }};
}

macro_rules! login {
    ($app:expr, $username:expr, $ip:expr) => {{
        let (status, body) = send!(
            $app,
            TestRequest::post()
                .uri("/api/v1/auth/login")
                .insert_header(("X-Forwarded-For", $ip))
                .set_json(json!({ "username": $username, "password": PASSWORD }))
        );
        assert_eq!(status, StatusCode::OK, "login: {body}");
        body["data"]["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }};
}

fn authed(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header(("Authorization", format!("Bearer {token}")))
}

fn id_of(body: &Value) -> i64 {
    body["data"]["id"].as_i64().expect("id in response")
}

/// 当前登录用户的 id
macro_rules! me {
    ($app:expr, $token:expr) => {{
        let (status, body) = send!($app, authed(TestRequest::get().uri("/api/v1/auth/me"), &$token));
        assert_eq!(status, StatusCode::OK, "me: {body}");
        body["data"]["user"]["id"].as_i64().expect("user id")
    }};
}

/// 以 JSON 创建资源并返回 id
macro_rules! create {
    ($app:expr, $token:expr, $uri:expr, $json:expr) => {{
        let (status, body) = send!(
            $app,
            authed(TestRequest::post().uri($uri), &$token).set_json($json)
        );
        assert_eq!(status, StatusCode::CREATED, "{}: {body}", $uri);
        id_of(&body)
    }};
}

#[actix_web::test]
async fn scheduling_flow_detects_conflicts() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);
    let token = register_and_login!(app, "schedule", "10.1.0.1");

    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/teachers"), &token).set_json(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "subjects": ["math"],
        }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let teacher_id = id_of(&body);

    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/rooms"), &token)
            .set_json(json!({ "name": "Room 1", "capacity": 10 }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let room_id = id_of(&body);

    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/groups"), &token).set_json(json!({
            "name": "Algebra A",
            "teacher_id": teacher_id,
            "room_id": room_id,
            "max_students": 5,
        }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let group_id = id_of(&body);

    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/students"), &token).set_json(json!({
            "first_name": "Lena",
            "last_name": "Novak",
            "phone": "+10000000002",
        }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let student_id = id_of(&body);

    let (status, body) = send!(
        app,
        authed(
            TestRequest::post().uri(&format!("/api/v1/groups/{group_id}/students")),
            &token
        )
        .set_json(json!({ "student_id": student_id }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let lesson = json!({
        "teacher_id": teacher_id,
        "group_id": group_id,
        "room_id": room_id,
        "start_time": "2030-01-15T10:00:00Z",
        "end_time": "2030-01-15T11:00:00Z",
    });
    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/lessons"), &token).set_json(&lesson)
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let lesson_id = id_of(&body);

    // 同一教师的重叠课程
    let overlapping = json!({
        "teacher_id": teacher_id,
        "start_time": "2030-01-15T10:30:00Z",
        "end_time": "2030-01-15T11:30:00Z",
    });
    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/lessons"), &token).set_json(&overlapping)
    );
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    let kinds: Vec<&str> = body["data"]
        .as_array()
        .expect("conflict list")
        .iter()
        .filter_map(|c| c["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"teacher"));

    // 相邻课程不冲突
    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/lessons/check-conflicts"), &token).set_json(
            json!({
                "teacher_id": teacher_id,
                "start_time": "2030-01-15T11:00:00Z",
                "end_time": "2030-01-15T12:00:00Z",
            })
        )
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/lessons/suggest-times"), &token).set_json(
            json!({
                "date": "2030-01-15",
                "duration_minutes": 60,
                "teacher_id": teacher_id,
            })
        )
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    let starts: Vec<&str> = body["data"]
        .as_array()
        .expect("slots")
        .iter()
        .filter_map(|s| s["start_time"].as_str())
        .collect();
    assert!(!starts.is_empty());
    assert!(starts.iter().all(|s| !s.starts_with("2030-01-15T09:30")
        && !s.starts_with("2030-01-15T10:")));

    let (status, body) = send!(
        app,
        authed(
            TestRequest::post().uri(&format!("/api/v1/lessons/{lesson_id}/complete")),
            &token
        )
        .set_json(json!({
            "attendance": [{ "student_id": student_id, "status": "present" }],
        }))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["lesson"]["status"], "completed");
    assert_eq!(body["data"]["attendance"][0]["charged"], false);

    let (status, _) = send!(
        app,
        authed(
            TestRequest::post().uri(&format!("/api/v1/lessons/{lesson_id}/complete")),
            &token
        )
        .set_json(json!({ "attendance": [] }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn requests_without_token_are_rejected() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);

    let (status, _) = send!(app, TestRequest::get().uri("/api/v1/students"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send!(
        app,
        TestRequest::get()
            .uri("/api/v1/students")
            .insert_header(("Authorization", "Bearer not-a-token"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn staff_needs_role_permissions() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);
    let owner = register_and_login!(app, "perm", "10.1.0.2");

    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/users"), &owner).set_json(json!({
            "username": "desk_clerk",
            "email": "clerk@perm.test",
            "password": PASSWORD,
        }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["role"], "staff");

    let staff = login!(app, "desk_clerk", "10.1.0.2");

    let (status, _) = send!(app, authed(TestRequest::get().uri("/api/v1/students"), &staff));
    assert_eq!(status, StatusCode::FORBIDDEN);

    // 设置列表对所有机构用户开放
    let (status, _) = send!(app, authed(TestRequest::get().uri("/api/v1/settings"), &staff));
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send!(
        app,
        authed(TestRequest::get().uri("/api/v1/companies"), &owner)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn centers_cannot_read_each_other() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);
    let alpha = register_and_login!(app, "alpha", "10.1.0.3");
    let beta = register_and_login!(app, "beta", "10.1.0.4");

    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/students"), &alpha)
            .set_json(json!({ "first_name": "Only", "last_name": "Alpha" }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let student_id = id_of(&body);

    let (status, _) = send!(
        app,
        authed(
            TestRequest::get().uri(&format!("/api/v1/students/{student_id}")),
            &beta
        )
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send!(app, authed(TestRequest::get().uri("/api/v1/students"), &beta));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 0);
}

#[actix_web::test]
async fn settings_are_validated_per_key() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);
    let token = register_and_login!(app, "settings", "10.1.0.5");

    let (status, body) = send!(
        app,
        authed(
            TestRequest::put().uri("/api/v1/settings/billing.charge_absent"),
            &token
        )
        .set_json(json!({ "value": true }))
    );
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _) = send!(
        app,
        authed(
            TestRequest::put().uri("/api/v1/settings/schedule.work_day_start"),
            &token
        )
        .set_json(json!({ "value": "25:00" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 开始时间不能晚于默认的结束时间 21:00
    let (status, _) = send!(
        app,
        authed(
            TestRequest::put().uri("/api/v1/settings/schedule.work_day_start"),
            &token
        )
        .set_json(json!({ "value": "22:00" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send!(
        app,
        authed(TestRequest::put().uri("/api/v1/settings/no.such_key"), &token)
            .set_json(json!({ "value": 1 }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send!(app, authed(TestRequest::get().uri("/api/v1/settings"), &token));
    assert_eq!(status, StatusCode::OK);
    let charge_absent = body["data"]
        .as_array()
        .expect("settings")
        .iter()
        .find(|s| s["key"] == "billing.charge_absent")
        .cloned()
        .expect("charge_absent setting");
    assert_eq!(charge_absent["value"], true);
}

#[actix_web::test]
async fn refresh_cookie_issues_new_access_token() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);
    let _owner = register_and_login!(app, "refresh", "10.1.0.6");

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/v1/auth/login")
            .insert_header(("X-Forwarded-For", "10.1.0.6"))
            .set_json(json!({ "username": "refresh_owner", "password": PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == REFRESH_TOKEN_COOKIE)
        .expect("refresh cookie")
        .into_owned();
    assert!(cookie.http_only().unwrap_or(false));

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .insert_header(("X-Forwarded-For", "10.1.0.6"))
            .cookie(cookie.clone())
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    let fresh = body["data"]["access_token"].as_str().expect("access token").to_string();
    let (status, _) = send!(app, authed(TestRequest::get().uri("/api/v1/auth/me"), &fresh));
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .insert_header(("X-Forwarded-For", "10.1.0.6"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .insert_header(("X-Forwarded-For", "10.1.0.6"))
            .cookie(actix_web::cookie::Cookie::new(REFRESH_TOKEN_COOKIE, "forged"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == REFRESH_TOKEN_COOKIE)
        .expect("cleared cookie");
    assert_eq!(cleared.value(), "");
}

#[actix_web::test]
async fn logout_clears_cookie_and_cached_user() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);
    let token = register_and_login!(app, "logout", "10.1.0.7");

    // 认证后按 token 缓存用户
    me!(app, token);
    let key = keys::user_by_token(&token);
    assert!(matches!(cache.get_raw(&key).await, CacheResult::Found(_)));

    let resp = test::call_service(
        &app,
        authed(TestRequest::post().uri("/api/v1/auth/logout"), &token).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == REFRESH_TOKEN_COOKIE)
        .expect("cleared cookie");
    assert_eq!(cleared.value(), "");
    assert_eq!(
        cleared.max_age(),
        Some(actix_web::cookie::time::Duration::seconds(0))
    );

    assert!(!matches!(cache.get_raw(&key).await, CacheResult::Found(_)));
}

#[actix_web::test]
async fn role_guards_and_permission_cache() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);
    let owner = register_and_login!(app, "roles", "10.1.0.8");

    let (status, body) = send!(app, authed(TestRequest::get().uri("/api/v1/roles"), &owner));
    assert_eq!(status, StatusCode::OK, "{body}");
    let system_role = body["data"]["items"]
        .as_array()
        .expect("roles")
        .iter()
        .find(|r| r["is_system"] == true)
        .and_then(|r| r["id"].as_i64())
        .expect("system role");
    let (status, _) = send!(
        app,
        authed(
            TestRequest::delete().uri(&format!("/api/v1/roles/{system_role}")),
            &owner
        )
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let role_id = create!(
        app,
        owner,
        "/api/v1/roles",
        json!({ "name": "Reception", "permissions": ["students.view"] })
    );
    create!(
        app,
        owner,
        "/api/v1/users",
        json!({
            "username": "reception_desk",
            "email": "desk@roles.test",
            "password": PASSWORD,
            "role_id": role_id,
        })
    );
    let staff = login!(app, "reception_desk", "10.1.0.8");

    let (status, _) = send!(app, authed(TestRequest::get().uri("/api/v1/students"), &staff));
    assert_eq!(status, StatusCode::OK);

    // 修改权限后缓存失效，立即生效
    let (status, body) = send!(
        app,
        authed(TestRequest::put().uri(&format!("/api/v1/roles/{role_id}")), &owner)
            .set_json(json!({ "permissions": ["leads.view"] }))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    let (status, _) = send!(app, authed(TestRequest::get().uri("/api/v1/students"), &staff));
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send!(app, authed(TestRequest::get().uri("/api/v1/leads"), &staff));
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send!(
        app,
        authed(TestRequest::delete().uri(&format!("/api/v1/roles/{role_id}")), &owner)
    );
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn branch_with_users_cannot_be_deleted() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);
    let owner = register_and_login!(app, "branches", "10.1.0.9");

    let branch_id = create!(app, owner, "/api/v1/branches", json!({ "name": "North" }));
    let user_id = create!(
        app,
        owner,
        "/api/v1/users",
        json!({
            "username": "north_admin",
            "email": "north@branches.test",
            "password": PASSWORD,
            "branch_id": branch_id,
        })
    );

    let branch_uri = format!("/api/v1/branches/{branch_id}");
    let (status, _) = send!(app, authed(TestRequest::delete().uri(&branch_uri), &owner));
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send!(
        app,
        authed(TestRequest::delete().uri(&format!("/api/v1/users/{user_id}")), &owner)
    );
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send!(app, authed(TestRequest::delete().uri(&branch_uri), &owner));
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn owner_account_is_protected() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);
    let owner = register_and_login!(app, "owners", "10.1.0.10");
    let owner_id = me!(app, owner);

    // 请求中的 role 字段被忽略，只能创建员工
    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/users"), &owner).set_json(json!({
            "username": "second_owner",
            "email": "second@owners.test",
            "password": PASSWORD,
            "role": "owner",
        }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["role"], "staff");

    let (status, _) = send!(
        app,
        authed(TestRequest::delete().uri(&format!("/api/v1/users/{owner_id}")), &owner)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let role_id = create!(
        app,
        owner,
        "/api/v1/roles",
        json!({ "name": "Admins", "permissions": ["users.manage"] })
    );
    create!(
        app,
        owner,
        "/api/v1/users",
        json!({
            "username": "user_admin",
            "email": "admin@owners.test",
            "password": PASSWORD,
            "role_id": role_id,
        })
    );
    let admin = login!(app, "user_admin", "10.1.0.10");
    let admin_id = me!(app, admin);

    let (status, _) = send!(
        app,
        authed(TestRequest::delete().uri(&format!("/api/v1/users/{owner_id}")), &admin)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send!(
        app,
        authed(TestRequest::delete().uri(&format!("/api/v1/users/{admin_id}")), &admin)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn lead_funnel_over_http() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);
    let token = register_and_login!(app, "funnel", "10.1.0.11");

    let lead_id = create!(
        app,
        token,
        "/api/v1/leads",
        json!({ "name": "Maria Garcia Lopez", "phone": "+10000000003" })
    );
    let status_uri = format!("/api/v1/leads/{lead_id}/status");
    let convert_uri = format!("/api/v1/leads/{lead_id}/convert");

    let (status, _) = send!(
        app,
        authed(TestRequest::post().uri(&status_uri), &token).set_json(json!({ "status": "enrolled" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    // 新线索不能跳过 in_progress 直接转化
    let (status, _) = send!(
        app,
        authed(TestRequest::post().uri(&convert_uri), &token).set_json(json!({}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri(&status_uri), &token)
            .set_json(json!({ "status": "in_progress", "comment": "called back" }))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "in_progress");

    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri(&convert_uri), &token).set_json(json!({}))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["lead"]["status"], "enrolled");
    assert_eq!(body["data"]["student"]["first_name"], "Maria");
    assert_eq!(body["data"]["student"]["last_name"], "Garcia Lopez");
    assert_eq!(body["data"]["lead"]["student_id"], body["data"]["student"]["id"]);

    let (status, _) = send!(
        app,
        authed(TestRequest::post().uri(&convert_uri), &token).set_json(json!({}))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send!(
        app,
        authed(
            TestRequest::get().uri(&format!("/api/v1/leads/{lead_id}/activities")),
            &token
        )
    );
    assert_eq!(status, StatusCode::OK);
    let changes = body["data"]
        .as_array()
        .expect("activities")
        .iter()
        .filter(|a| a["kind"] == "status_change")
        .count();
    assert_eq!(changes, 2);
}

#[actix_web::test]
async fn subscription_lifecycle_over_http() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);
    let token = register_and_login!(app, "billing", "10.1.0.12");

    let student_id = create!(
        app,
        token,
        "/api/v1/students",
        json!({ "first_name": "Nora", "last_name": "Berg" })
    );
    let trial = create!(
        app,
        token,
        "/api/v1/subscription-types",
        json!({ "name": "Trial", "lessons_count": 1, "price": 0.0, "duration_days": 7 })
    );
    let monthly = create!(
        app,
        token,
        "/api/v1/subscription-types",
        json!({ "name": "Monthly", "lessons_count": 8, "price": 100.0, "duration_days": 30 })
    );

    // 免费套餐不产生流水
    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/subscriptions"), &token)
            .set_json(json!({ "student_id": student_id, "subscription_type_id": trial }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["data"]["transaction"].is_null());

    let (status, _) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/subscriptions"), &token).set_json(json!({
            "student_id": student_id,
            "subscription_type_id": monthly,
            "price_paid": -1.0,
        }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/subscriptions"), &token).set_json(json!({
            "student_id": student_id,
            "subscription_type_id": monthly,
            "price_paid": 99.999,
        }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["transaction"]["amount"].as_f64(), Some(100.0));
    let subscription_id = body["data"]["subscription"]["id"].as_i64().expect("subscription id");

    let (status, body) = send!(
        app,
        authed(TestRequest::get().uri("/api/v1/finance/transactions"), &token)
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["pagination"]["total"], 1);

    let uri = format!("/api/v1/subscriptions/{subscription_id}");
    let act = |action: &str| {
        authed(TestRequest::put().uri(&uri), &token).set_json(json!({ "action": action }))
    };

    let (status, body) = send!(app, act("freeze"));
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "frozen");
    assert_eq!(body["data"]["effective_status"], "frozen");

    let (status, _) = send!(app, act("freeze"));
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send!(app, act("unfreeze"));
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "active");

    let (status, body) = send!(app, act("cancel"));
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "cancelled");

    // 取消后不可再修改
    let (status, _) = send!(app, act("unfreeze"));
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn lesson_update_can_clear_room_and_attendees() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);
    let token = register_and_login!(app, "edits", "10.1.0.13");

    let teacher_id = create!(
        app,
        token,
        "/api/v1/teachers",
        json!({ "first_name": "Alan", "last_name": "Turing" })
    );
    let room_id = create!(app, token, "/api/v1/rooms", json!({ "name": "Lab", "capacity": 8 }));
    let group_id = create!(
        app,
        token,
        "/api/v1/groups",
        json!({ "name": "Logic", "max_students": 8 })
    );
    let lesson_id = create!(
        app,
        token,
        "/api/v1/lessons",
        json!({
            "teacher_id": teacher_id,
            "group_id": group_id,
            "room_id": room_id,
            "start_time": "2030-02-01T10:00:00Z",
            "end_time": "2030-02-01T11:00:00Z",
        })
    );
    let uri = format!("/api/v1/lessons/{lesson_id}");

    // 未提供的字段保持不变
    let (status, body) = send!(
        app,
        authed(TestRequest::put().uri(&uri), &token).set_json(json!({ "subject": "logic" }))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["room_id"], room_id);
    assert_eq!(body["data"]["group_id"], group_id);

    let (status, body) = send!(
        app,
        authed(TestRequest::put().uri(&uri), &token).set_json(json!({ "room_id": null }))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["room_id"].is_null());
    assert_eq!(body["data"]["group_id"], group_id);

    let (status, body) = send!(
        app,
        authed(TestRequest::put().uri(&uri), &token)
            .set_json(json!({ "group_id": null, "student_id": null }))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["group_id"].is_null());
    assert!(body["data"]["student_id"].is_null());
}

#[actix_web::test]
async fn group_lesson_conflicts_with_member_private_lesson() {
    let storage = memory_storage().await;
    let cache = memory_cache();
    let app = test_app!(storage, cache);
    let token = register_and_login!(app, "members", "10.1.0.14");

    let tutor = create!(
        app,
        token,
        "/api/v1/teachers",
        json!({ "first_name": "Grace", "last_name": "Hopper" })
    );
    let lecturer = create!(
        app,
        token,
        "/api/v1/teachers",
        json!({ "first_name": "Edsger", "last_name": "Dijkstra" })
    );
    let student_id = create!(
        app,
        token,
        "/api/v1/students",
        json!({ "first_name": "Omar", "last_name": "Haddad" })
    );
    let group_id = create!(
        app,
        token,
        "/api/v1/groups",
        json!({ "name": "Graphs", "max_students": 8 })
    );
    create!(
        app,
        token,
        &format!("/api/v1/groups/{group_id}/students"),
        json!({ "student_id": student_id })
    );
    create!(
        app,
        token,
        "/api/v1/lessons",
        json!({
            "teacher_id": tutor,
            "student_id": student_id,
            "start_time": "2030-02-02T10:00:00Z",
            "end_time": "2030-02-02T11:00:00Z",
        })
    );

    let (status, body) = send!(
        app,
        authed(TestRequest::post().uri("/api/v1/lessons"), &token).set_json(json!({
            "teacher_id": lecturer,
            "group_id": group_id,
            "start_time": "2030-02-02T10:30:00Z",
            "end_time": "2030-02-02T11:30:00Z",
        }))
    );
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["data"][0]["kind"], "student");
}
