pub mod entities;
pub mod requests;

pub use entities::{Company, CompanyStatus};
pub use requests::{CompanyQueryParams, NewCompanyAccount, UpdateCompanyRequest};
