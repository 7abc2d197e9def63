pub mod auth;
pub mod authorize;
pub mod logging;

pub use auth::{CurrentUser, OptionalAuth};
pub use authorize::{authorize, RequireUserType};
pub use logging::request_logger;
