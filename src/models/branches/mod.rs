pub mod entities;
pub mod requests;

pub use entities::Branch;
pub use requests::{BranchQueryParams, CreateBranchRequest, UpdateBranchRequest};
