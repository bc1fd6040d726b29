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

pub use auth::AuthService;
pub use branches::BranchService;
pub use companies::CompanyService;
pub use dashboard::DashboardService;
pub use finance::FinanceService;
pub use groups::GroupService;
pub use leads::LeadService;
pub use lessons::LessonService;
pub use roles::RoleService;
pub use rooms::RoomService;
pub use settings::SettingsService;
pub use students::StudentService;
pub use subscriptions::SubscriptionService;
pub use system::SystemService;
pub use teachers::TeacherService;
pub use users::UserService;
