pub mod auth;
pub mod authorize;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use authorize::require_policy;
pub use response::{ApiResponse, ApiResult};
