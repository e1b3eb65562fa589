//! # Caller Authentication
//!
//! Every `/v1` request resolves to a lifecycle [`Actor`]: an id plus a role.
//!
//! ## With a configured token
//!
//! ```text
//! Authorization: Bearer {role}:{actor_uuid}:{secret}
//! ```
//!
//! `role` is `member` or `admin`. The secret is compared in constant time.
//!
//! The secret is shared by every caller and binds neither role nor actor:
//! whoever holds it can claim any actor id, `admin` included. Deploy it only
//! behind a gateway that authenticates users and mints these tokens, or in
//! development.
//!
//! ## Without a token (development)
//!
//! The actor is read from `X-Actor-Id` and the optional `X-Actor-Role`
//! (default `member`). A request without `X-Actor-Id` is still rejected,
//! since every lifecycle operation needs an actor.

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lexdoc_core::ActorId;
use lexdoc_lifecycle::{Actor, Role};
use subtle::ConstantTimeEq;

use crate::error::{AppError, ErrorBody, ErrorDetail};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The authenticated actor, inserted into request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Expected bearer secret. `Debug` never prints the value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

fn parse_role(s: &str) -> Result<Role, String> {
    Role::parse(s).ok_or_else(|| format!("unknown role: {s}"))
}

fn parse_actor_id(s: &str) -> Result<ActorId, String> {
    ActorId::parse(s).map_err(|e| format!("invalid actor id: {e}"))
}

/// Parse `{role}:{actor_uuid}:{secret}` and check the secret.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<Actor, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();
    let [role, actor, secret] = parts.as_slice() else {
        return Err("invalid token format, expected {role}:{actor_id}:{secret}".into());
    };
    if !constant_time_token_eq(secret, expected_secret) {
        return Err("invalid bearer token".into());
    }
    Ok(Actor {
        id: parse_actor_id(actor)?,
        role: parse_role(role)?,
    })
}

/// Resolve the actor from `X-Actor-Id` / `X-Actor-Role`.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, String> {
    let id = headers
        .get(ACTOR_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| "missing X-Actor-Id header".to_string())?;
    let role = match headers.get(ACTOR_ROLE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(r) => parse_role(r)?,
        None => Role::Member,
    };
    Ok(Actor {
        id: parse_actor_id(id)?,
        role,
    })
}

/// Authenticate the request and insert its [`Caller`].
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let config = request.extensions().get::<AuthConfig>().cloned();

    let resolved = match config {
        Some(AuthConfig {
            token: Some(ref expected),
        }) => {
            let header_value = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());
            match header_value {
                Some(v) => match v.strip_prefix("Bearer ") {
                    Some(provided) => parse_bearer_token(provided, expected),
                    None => Err("authorization header must use Bearer scheme".into()),
                },
                None => Err("missing authorization header".into()),
            }
        }
        _ => actor_from_headers(request.headers()),
    };

    match resolved {
        Ok(actor) => {
            request.extensions_mut().insert(Caller(actor));
            next.run(request).await
        }
        Err(msg) => {
            tracing::warn!(reason = %msg, "authentication failed");
            unauthorized_response(&msg)
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn whoami(Caller(actor): Caller) -> String {
        format!("{}:{}", actor.role, actor.id.as_uuid())
    }

    fn test_app(token: Option<&str>) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(AuthConfig {
                token: token.map(String::from),
            }))
    }

    async fn call(app: Router, headers: &[(&str, &str)]) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    const ACTOR: &str = "6f1c1f1e-8a41-4b7e-9a55-0d4c2b7f3a10";

    #[tokio::test]
    async fn bearer_token_resolves_actor() {
        let token = format!("Bearer admin:{ACTOR}:s3cret");
        let (status, body) = call(test_app(Some("s3cret")), &[("authorization", &token)]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("admin:{ACTOR}"));
    }

    #[tokio::test]
    async fn wrong_secret_rejected() {
        let token = format!("Bearer member:{ACTOR}:nope");
        let (status, body) = call(test_app(Some("s3cret")), &[("authorization", &token)]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("invalid bearer token"));
    }

    #[tokio::test]
    async fn missing_and_foreign_schemes_rejected() {
        let (status, body) = call(test_app(Some("s3cret")), &[]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("missing"));

        let (status, body) =
            call(test_app(Some("s3cret")), &[("authorization", "Basic dXNlcjpwYXNz")]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Bearer scheme"));
    }

    #[tokio::test]
    async fn dev_mode_reads_actor_headers() {
        let (status, body) = call(test_app(None), &[(ACTOR_ID_HEADER, ACTOR)]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("member:{ACTOR}"));

        let (status, body) = call(
            test_app(None),
            &[(ACTOR_ID_HEADER, ACTOR), (ACTOR_ROLE_HEADER, "admin")],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("admin:"));

        let (status, _) = call(test_app(None), &[]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn token_parsing_edge_cases() {
        assert!(parse_bearer_token("s3cret", "s3cret").is_err());
        assert!(parse_bearer_token(&format!("owner:{ACTOR}:s3cret"), "s3cret")
            .unwrap_err()
            .contains("unknown role"));
        assert!(parse_bearer_token("member:not-a-uuid:s3cret", "s3cret")
            .unwrap_err()
            .contains("invalid actor id"));
        let actor = parse_bearer_token(&format!("member:{ACTOR}:a:b"), "a:b").unwrap();
        assert_eq!(actor.role, Role::Member);
    }

    #[test]
    fn shared_secret_does_not_bind_identity() {
        let other = uuid::Uuid::new_v4();
        let admin = parse_bearer_token(&format!("admin:{other}:s3cret"), "s3cret").unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(*admin.id.as_uuid(), other);
    }

    #[test]
    fn auth_config_debug_redacts() {
        let dbg = format!(
            "{:?}",
            AuthConfig {
                token: Some("hunter2".into())
            }
        );
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("REDACTED"));
    }
}
