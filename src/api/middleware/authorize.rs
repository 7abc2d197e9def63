use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, ResponseError,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::collections::HashSet;
use std::rc::Rc;

use super::auth::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::services::auth_service::UserContext;

/// Allow the request only for an authenticated user whose type is in `allowed`.
pub fn authorize(user: Option<&UserContext>, allowed: &HashSet<String>) -> AppResult<()> {
    let user = match user {
        Some(user) if user.is_authenticated => user,
        _ => return Err(AppError::authentication_required()),
    };

    if !allowed.contains(&user.user_type) {
        return Err(AppError::access_denied());
    }

    Ok(())
}

/// Role gate. Must sit inside [`super::OptionalAuth`]; without it every
/// request is treated as unauthenticated.
pub struct RequireUserType {
    allowed: Rc<HashSet<String>>,
}

impl RequireUserType {
    pub fn new<I, T>(allowed: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            allowed: Rc::new(allowed.into_iter().map(Into::into).collect()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireUserType
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireUserTypeService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequireUserTypeService {
            service,
            allowed: self.allowed.clone(),
        })
    }
}

pub struct RequireUserTypeService<S> {
    service: S,
    allowed: Rc<HashSet<String>>,
}

impl<S, B> Service<ServiceRequest> for RequireUserTypeService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verdict = authorize(
            req.extensions().get::<CurrentUser>().and_then(CurrentUser::user),
            &self.allowed,
        );

        match verdict {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(err) => {
                tracing::debug!("Rejected {} {}: {}", req.method(), req.path(), err);
                let response = err.error_response();
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::middleware::OptionalAuth;
    use crate::config::JwtConfig;
    use crate::services::auth_service::UserId;
    use crate::services::AuthService;
    use actix_web::{
        http::header::AUTHORIZATION, http::StatusCode, test as actix_test, web, App, HttpResponse,
    };
    use std::sync::Arc;

    fn roles(labels: &[&str]) -> HashSet<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn user(user_type: &str) -> UserContext {
        UserContext {
            id: UserId::from("u-9"),
            email: "u9@example.com".to_string(),
            user_type: user_type.to_string(),
            is_authenticated: true,
        }
    }

    #[test]
    fn test_authorize_decisions() {
        let allowed = roles(&["admin", "citizen"]);

        assert!(matches!(
            authorize(None, &allowed),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            authorize(Some(&user("contractor")), &allowed),
            Err(AppError::Forbidden(_))
        ));
        assert!(authorize(Some(&user("citizen")), &allowed).is_ok());
        assert!(authorize(Some(&user("admin")), &allowed).is_ok());
    }

    #[test]
    fn test_unauthenticated_context_rejected() {
        let mut stale = user("admin");
        stale.is_authenticated = false;

        assert!(matches!(
            authorize(Some(&stale), &roles(&["admin"])),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_empty_allow_list_denies_everyone() {
        assert!(matches!(
            authorize(Some(&user("admin")), &HashSet::new()),
            Err(AppError::Forbidden(_))
        ));
    }

    #[actix_rt::test]
    async fn test_gate_over_http() {
        let auth_service = Arc::new(AuthService::new(JwtConfig {
            secret: Some("gate-secret".to_string()),
            expire_hours: 1,
        }));
        let admin = auth_service.generate_token("a-1", "admin@city.gov", "admin").unwrap();
        let citizen = auth_service.generate_token("c-1", "c@example.com", "citizen").unwrap();

        let app = actix_test::init_service(
            App::new().wrap(OptionalAuth::new(auth_service)).service(
                web::scope("/admin")
                    .wrap(RequireUserType::new(["admin"]))
                    .route("/reports", web::get().to(|| async { HttpResponse::Ok().body("reports") })),
            ),
        )
        .await;

        let anonymous = actix_test::TestRequest::get().uri("/admin/reports").to_request();
        let res = actix_test::call_service(&app, anonymous).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "Authentication required"})
        );

        let req = actix_test::TestRequest::get()
            .uri("/admin/reports")
            .insert_header((AUTHORIZATION, format!("Bearer {}", citizen)))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "Access denied"})
        );

        let req = actix_test::TestRequest::get()
            .uri("/admin/reports")
            .insert_header((AUTHORIZATION, format!("Bearer {}", admin)))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(res).await, "reports");
    }

    #[actix_rt::test]
    async fn test_gate_without_auth_middleware() {
        let app = actix_test::init_service(
            App::new()
                .wrap(RequireUserType::new(["admin"]))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
