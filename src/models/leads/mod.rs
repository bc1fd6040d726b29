pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{ActivityKind, Lead, LeadActivity, LeadStatus, LeadTask};
pub use requests::{
    ChangeLeadStatusRequest, ConvertLeadRequest, CreateActivityRequest, CreateLeadRequest,
    CreateTaskRequest, LeadQueryParams, UpdateLeadRequest, UpdateTaskRequest,
};
pub use responses::ConvertLeadResponse;
