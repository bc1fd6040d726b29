pub mod entities;
pub mod requests;

pub use entities::{Student, StudentStatus};
pub use requests::{CreateStudentRequest, StudentQueryParams, UpdateStudentRequest};
