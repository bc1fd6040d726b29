pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{Permission, Role, SystemRole};
pub use requests::{CreateRoleRequest, RoleQueryParams, UpdateRoleRequest};
pub use responses::PermissionInfo;
