use actix_web::HttpResponse;

use crate::api::middleware::CurrentUser;
use crate::error::AppResult;

/// Who the caller is, or `null` for anonymous requests.
pub async fn session(user: CurrentUser) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": user.user()
    })))
}

pub async fn admin_status(user: CurrentUser) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Admin access granted",
        "user": user.user()
    })))
}
