pub mod auth;
pub mod response;

pub use auth::{
    authenticate_jwt, ensure_admin, ensure_logged_in, ensure_self_or_admin, require_admin, require_logged_in,
    require_self_or_admin, CurrentUser, Principal,
};
pub use response::{ApiResponse, ApiResult};
