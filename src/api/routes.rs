use actix_web::web;

use super::handlers;
use super::middleware::RequireUserType;

pub const ADMIN_USER_TYPE: &str = "admin";

/// Mount the API. Expects [`super::middleware::OptionalAuth`] to be wrapped
/// around the app so the role gate can see the caller.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(handlers::health))
            .route("/auth/session", web::get().to(handlers::session))
            // Admin routes
            .service(
                web::scope("/admin")
                    .wrap(RequireUserType::new([ADMIN_USER_TYPE]))
                    .route("/status", web::get().to(handlers::admin_status)),
            ),
    )
    .default_service(web::to(handlers::not_found));
}
