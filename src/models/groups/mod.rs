pub mod entities;
pub mod requests;

pub use entities::{Group, GroupJoinOutcome, GroupMember, GroupStatus};
pub use requests::{AddGroupStudentRequest, CreateGroupRequest, GroupQueryParams, UpdateGroupRequest};
