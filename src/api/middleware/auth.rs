use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::sync::Arc;

use crate::services::auth_service::UserContext;
use crate::services::AuthService;

/// Attaches a [`CurrentUser`] to every request. Never rejects: a missing or
/// unverifiable token simply leaves the request anonymous.
pub struct OptionalAuth {
    pub auth_service: Arc<AuthService>,
}

impl OptionalAuth {
    pub fn new(auth_service: Arc<AuthService>) -> Self {
        Self { auth_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for OptionalAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = OptionalAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(OptionalAuthService {
            service,
            auth_service: self.auth_service.clone(),
        })
    }
}

pub struct OptionalAuthService<S> {
    service: S,
    auth_service: Arc<AuthService>,
}

impl<S, B> Service<ServiceRequest> for OptionalAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let user = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .and_then(|token| self.auth_service.authenticate(token));

        req.extensions_mut().insert(CurrentUser(user));

        Box::pin(self.service.call(req))
    }
}

/// Token carried by an `Authorization` header. A value without the
/// `Bearer ` prefix is taken as the raw token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Extractor for the request's user, `None` when anonymous.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<UserContext>);

impl CurrentUser {
    pub fn user(&self) -> Option<&UserContext> {
        self.0.as_ref()
    }
}

impl actix_web::FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        ok(req.extensions().get::<CurrentUser>().cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use actix_web::{test as actix_test, web, App, HttpResponse};

    const SECRET: &str = "middleware-secret";

    fn auth_service(secret: &str) -> Arc<AuthService> {
        Arc::new(AuthService::new(JwtConfig {
            secret: Some(secret.to_string()),
            expire_hours: 1,
        }))
    }

    async fn whoami(user: CurrentUser) -> HttpResponse {
        HttpResponse::Ok().json(user.user())
    }

    async fn call_whoami(authorization: Option<String>) -> serde_json::Value {
        let app = actix_test::init_service(
            App::new()
                .wrap(OptionalAuth::new(auth_service(SECRET)))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let mut req = actix_test::TestRequest::get().uri("/whoami");
        if let Some(value) = authorization {
            req = req.insert_header((AUTHORIZATION, value));
        }

        actix_test::call_and_read_body_json(&app, req.to_request()).await
    }

    #[actix_rt::test]
    async fn test_no_header_is_anonymous() {
        assert_eq!(call_whoami(None).await, serde_json::Value::Null);
    }

    #[actix_rt::test]
    async fn test_valid_token_populates_user() {
        let token = auth_service(SECRET)
            .generate_token("user-17", "ravi@example.com", "citizen")
            .unwrap();

        let body = call_whoami(Some(format!("Bearer {}", token))).await;
        assert_eq!(
            body,
            serde_json::json!({
                "id": "user-17",
                "email": "ravi@example.com",
                "userType": "citizen",
                "isAuthenticated": true
            })
        );
    }

    #[actix_rt::test]
    async fn test_bad_tokens_are_anonymous() {
        let forged = auth_service("other-secret")
            .generate_token("user-17", "ravi@example.com", "admin")
            .unwrap();

        for header in [
            format!("Bearer {}", forged),
            "Bearer not-a-token".to_string(),
            "Bearer ".to_string(),
            "Basic dXNlcjpwYXNz".to_string(),
        ] {
            assert_eq!(call_whoami(Some(header)).await, serde_json::Value::Null);
        }
    }

    #[actix_rt::test]
    async fn test_raw_token_without_prefix() {
        let token = auth_service(SECRET)
            .generate_token(5_i64, "a@b.c", "admin")
            .unwrap();

        let body = call_whoami(Some(token)).await;
        assert_eq!(body["id"], 5);
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token(""), None);
    }
}
