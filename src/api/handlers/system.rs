use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

pub async fn health(config: web::Data<AppConfig>) -> AppResult<HttpResponse> {
    let address = config.server_address();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "status": "ok",
        "environment": config.environment.as_str(),
        "url": &address.url,
        "server": address,
        "version": env!("CARGO_PKG_VERSION")
    })))
}

pub async fn not_found() -> AppResult<HttpResponse> {
    Err(AppError::NotFound("Route not found".to_string()))
}
