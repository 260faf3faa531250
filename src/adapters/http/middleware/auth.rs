//! Bearer authentication for the API routes.
//!
//! `auth_middleware` resolves the token, if any, and parks the member in
//! request extensions. Routes opt in to requiring a member by taking a
//! [`RequireAuth`] argument. Health checks sit outside this layer.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::adapters::http::dto::ErrorResponse;
use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

pub type AuthState = Arc<dyn SessionValidator>;

/// Token from `Authorization: Bearer <token>`. The scheme is matched
/// case-insensitively; an empty token counts as absent.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn auth_failure(err: &AuthError) -> Response {
    let status = match err {
        AuthError::TokenExpired | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
        AuthError::ServiceUnavailable(reason) => {
            tracing::error!(%reason, "session validation unavailable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    let body = match err {
        AuthError::ServiceUnavailable(_) => {
            ErrorResponse::unavailable("Cannot verify credentials right now")
        }
        _ => ErrorResponse::unauthenticated(err.to_string()),
    };
    (status, Json(body)).into_response()
}

/// Requests without credentials pass through; a presented token that
/// fails validation stops the request here.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
        return next.run(request).await;
    };

    match validator.validate(&token).await {
        Ok(member) => {
            tracing::trace!(user_id = %member.id, "bearer token accepted");
            request.extensions_mut().insert(member);
            next.run(request).await
        }
        Err(err) => {
            tracing::debug!(error = %err, "bearer token rejected");
            auth_failure(&err)
        }
    }
}

/// The authenticated member. Extraction fails with 401 when the request
/// carried no valid token.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = ErrorResponse::unauthenticated("Sign in to use the canvas");
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::domain::foundation::UserId;
    use axum::body::Body;
    use axum::http::{HeaderValue, Request};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn member() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new("member-7").unwrap(), None, Some("Sam".to_string()))
    }

    async fn whoami(RequireAuth(member): RequireAuth) -> String {
        member.id.to_string()
    }

    async fn open(member: Option<axum::Extension<AuthenticatedUser>>) -> &'static str {
        if member.is_some() {
            "member"
        } else {
            "guest"
        }
    }

    fn router(validator: MockSessionValidator) -> Router {
        let state: AuthState = Arc::new(validator);
        Router::new()
            .route("/whoami", get(whoami))
            .route("/open", get(open))
            .layer(axum::middleware::from_fn_with_state(state, auth_middleware))
    }

    fn get_with(uri: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn accepted_token_identifies_member() {
        let app = router(MockSessionValidator::new().with_user("t1", member()));

        let response = app
            .oneshot(get_with("/whoami", Some("Bearer t1")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "member-7");
    }

    #[tokio::test]
    async fn rejected_token_stops_even_open_routes() {
        let app = router(MockSessionValidator::new());

        let response = app
            .oneshot(get_with("/open", Some("Bearer forged")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(text(response).await.contains("UNAUTHENTICATED"));
    }

    #[tokio::test]
    async fn no_token_is_a_guest_until_a_member_is_required() {
        let app = router(MockSessionValidator::new());

        let open = app.clone().oneshot(get_with("/open", None)).await.unwrap();
        let closed = app.oneshot(get_with("/whoami", None)).await.unwrap();

        assert_eq!(text(open).await, "guest");
        assert_eq!(closed.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn validator_outage_is_503() {
        let app = router(
            MockSessionValidator::new()
                .with_error(AuthError::service_unavailable("key store unreachable")),
        );

        let response = app
            .oneshot(get_with("/whoami", Some("Bearer t1")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(text(response).await.contains("SERVICE_UNAVAILABLE"));
    }
}
