//! Acting-user extractor
//!
//! Authentication and role enforcement happen upstream (API gateway /
//! session layer); this service trusts the identity headers the
//! gateway injects. The extractor only parses them; a request without
//! a valid identity is rejected with 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use super::ApiResponse;
use crate::domain::UserRole;

/// Trusted gateway headers carrying the acting user.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The authenticated user on whose behalf a request runs.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiResponse<()>>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let unauthorized = |msg: &str| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<()>::error(msg)),
            )
        };

        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or_else(|| unauthorized("missing or invalid x-user-id header"))?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(UserRole::parse)
            .ok_or_else(|| unauthorized("missing or invalid x-user-role header"))?;

        Ok(Actor { id, role })
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;

    async fn handler(actor: Actor) -> String {
        format!("{}:{}", actor.id, actor.role)
    }

    fn app() -> Router {
        Router::new().route("/whoami", get(handler))
    }

    async fn send(req: Request<Body>) -> axum::http::Response<Body> {
        use tower::Service;
        let mut svc = app().into_service();
        svc.call(req).await.unwrap()
    }

    #[tokio::test]
    async fn valid_headers_are_parsed() {
        let id = Uuid::new_v4();
        let req = Request::builder()
            .uri("/whoami")
            .header(USER_ID_HEADER, id.to_string())
            .header(USER_ROLE_HEADER, "community_manager")
            .body(Body::empty())
            .unwrap();

        let resp = send(req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_headers_return_401() {
        let req = Request::builder()
            .uri("/whoami")
            .body(Body::empty())
            .unwrap();

        let resp = send(req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_role_returns_401() {
        let req = Request::builder()
            .uri("/whoami")
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .header(USER_ROLE_HEADER, "superuser")
            .body(Body::empty())
            .unwrap();

        let resp = send(req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
