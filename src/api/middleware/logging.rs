use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    Error, HttpMessage,
};
use actix_web::middleware::Next;
use std::time::Instant;

use super::auth::CurrentUser;

/// Logs each request and its outcome, tagged with the caller's user id.
pub async fn request_logger(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.path().to_string();

    tracing::info!("--> {} {}", method, path);

    let res = next.call(req).await?;

    let elapsed = start.elapsed().as_millis();
    let status = res.status().as_u16();
    let caller = res
        .request()
        .extensions()
        .get::<CurrentUser>()
        .and_then(CurrentUser::user)
        .map(|user| user.id.to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    if status >= 400 {
        tracing::warn!("<-- {} {} {} ({}ms, {})", method, path, status, elapsed, caller);
    } else {
        tracing::info!("<-- {} {} {} ({}ms, {})", method, path, status, elapsed, caller);
    }

    Ok(res)
}
