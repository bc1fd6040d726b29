pub mod auth;
pub mod branches;
pub mod companies;
pub mod finance;
pub mod frontend;
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

pub use auth::configure_auth_routes;
pub use branches::configure_branch_routes;
pub use companies::configure_company_routes;
pub use finance::configure_finance_routes;
pub use frontend::configure_frontend_routes;
pub use groups::configure_group_routes;
pub use leads::configure_lead_routes;
pub use lessons::configure_lesson_routes;
pub use roles::configure_role_routes;
pub use rooms::configure_room_routes;
pub use settings::configure_settings_routes;
pub use students::configure_student_routes;
pub use subscriptions::configure_subscription_routes;
pub use system::configure_system_routes;
pub use teachers::configure_teacher_routes;
pub use users::configure_user_routes;

use actix_web::web;

/// 注册全部 API 路由；前端 fallback 需放在最后
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_company_routes)
        .configure(configure_branch_routes)
        .configure(configure_user_routes)
        .configure(configure_role_routes)
        .configure(configure_teacher_routes)
        .configure(configure_student_routes)
        .configure(configure_room_routes)
        .configure(configure_group_routes)
        .configure(configure_lesson_routes)
        .configure(configure_subscription_routes)
        .configure(configure_finance_routes)
        .configure(configure_lead_routes)
        .configure(configure_settings_routes)
        .configure(configure_system_routes);
}
