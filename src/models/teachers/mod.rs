pub mod entities;
pub mod requests;

pub use entities::{Teacher, TeacherStatus};
pub use requests::{CreateTeacherRequest, TeacherQueryParams, UpdateTeacherRequest};
