pub mod guard;
pub mod response;

pub use guard::session_guard_middleware;
pub use response::{ApiResponse, ApiResult};
