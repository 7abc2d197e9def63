use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;

use civic_gateway::api::{self, middleware::OptionalAuth};
use civic_gateway::config::AppConfig;
use civic_gateway::logging;
use civic_gateway::services::AuthService;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration once; everything below reads from it
    let config = AppConfig::load().context("Failed to load configuration")?;

    logging::init(config.log_gate());

    tracing::info!("Starting civic gateway ({})", config.environment.as_str());
    tracing::debug!("Debug logging enabled");

    if config.jwt.secret.is_none() {
        tracing::warn!("JWT_SECRET is not set, all requests will be treated as anonymous");
    }

    let address = config.server_address();
    tracing::info!(
        "Starting HTTP server at {}:{} (public URL: {})",
        address.host,
        address.port,
        address.url
    );

    let auth_service = Arc::new(AuthService::new(config.jwt.clone()));
    let config = web::Data::new(config);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(OptionalAuth::new(auth_service.clone()))
            .wrap(actix_web::middleware::from_fn(api::middleware::request_logger))
            .wrap(cors)
            .app_data(config.clone())
            .configure(api::configure_routes)
    })
    .bind((address.host.clone(), address.port))
    .with_context(|| format!("Failed to bind {}:{}", address.host, address.port))?
    .run()
    .await
    .context("HTTP server stopped with an error")?;

    Ok(())
}
