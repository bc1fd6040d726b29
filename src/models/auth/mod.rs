pub mod requests;
pub mod responses;

pub use requests::{LoginRequest, RegisterCompanyRequest};
pub use responses::{
    LoginResponse, RefreshTokenResponse, RegisterCompanyResponse, TokenVerificationResponse,
    UserInfoResponse,
};
