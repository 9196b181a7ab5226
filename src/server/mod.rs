//! HTTP server: shared state, request identity, and routing.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{IdentityClient, SessionStore};
use crate::exercises::ExerciseLog;

mod error;
mod routes;

pub use error::ApiError;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "liftlog_session";

/// A resolved sign-in.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session id, needed again at sign-out.
    pub id: String,
    /// Account the session belongs to.
    pub email: String,
}

/// Request identity, added to request extensions by the middleware.
///
/// `None` means the request is anonymous; each handler decides what that
/// means for it.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<Session>);

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub log: Arc<ExerciseLog>,
    pub sessions: Arc<SessionStore>,
    pub identity: Option<Arc<IdentityClient>>,
    /// Externally reachable base URL, used to build the sign-in callback.
    pub public_url: String,
    /// Mark session cookies `Secure` (requires HTTPS).
    pub secure_cookies: bool,
}

/// Identity middleware.
///
/// Resolves the session id from the `Authorization` bearer token or the
/// session cookie and stores the result in request extensions. Requests are
/// never rejected here: anonymous requests pass through with an empty
/// identity.
async fn identify(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let session = bearer_session(&request)
        .or_else(|| cookie_session(&request))
        .and_then(|id| {
            state.sessions.resolve(&id).map(|data| Session {
                id,
                email: data.email,
            })
        });

    request.extensions_mut().insert(CurrentUser(session));
    next.run(request).await
}

/// Session id from an `Authorization: Bearer` header, if any.
fn bearer_session(request: &Request) -> Option<String> {
    let header = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    header.strip_prefix("Bearer ").map(str::to_string)
}

/// Session id from the session cookie, if any.
fn cookie_session(request: &Request) -> Option<String> {
    let cookies = request.headers().get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Builds the application router.
///
/// API routes and sign-out run behind the identity middleware; health and
/// the sign-in redirects stay public.
pub fn router(state: AppState, cors_origin: Option<&str>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health))
        .route("/auth/login", get(routes::login))
        .route("/auth/callback", get(routes::callback));

    let protected_routes = Router::new()
        .route("/api/me", get(routes::me))
        .route(
            "/api/exercises",
            get(routes::list_exercises).post(routes::append_exercise),
        )
        .route("/api/exercises/weeks", get(routes::list_weeks))
        .route("/api/exercises/{id}", delete(routes::delete_exercise))
        .route("/auth/logout", post(routes::logout))
        .layer(middleware::from_fn_with_state(state.clone(), identify));

    let mut app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = cors_origin {
        match origin.parse::<HeaderValue>() {
            Ok(origin) => {
                app = app.layer(
                    CorsLayer::new()
                        .allow_origin(origin)
                        .allow_methods([Method::GET, Method::POST, Method::DELETE])
                        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                        .allow_credentials(true),
                );
            }
            Err(_) => {
                tracing::warn!("Invalid cors_origin '{}', CORS disabled", origin);
            }
        }
    }

    app
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(name: &axum::http::HeaderName, value: &str) -> Request {
        Request::builder()
            .header(name, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_bearer_session_extracts_token() {
        let request = request_with(&header::AUTHORIZATION, "Bearer abc123");
        assert_eq!(bearer_session(&request), Some("abc123".to_string()));
    }

    #[test]
    fn test_bearer_session_rejects_other_schemes() {
        let request = request_with(&header::AUTHORIZATION, "Basic dXNlcjpwdw==");
        assert_eq!(bearer_session(&request), None);
    }

    #[test]
    fn test_cookie_session_finds_the_session_cookie() {
        let request = request_with(
            &header::COOKIE,
            "theme=dark; liftlog_session=abc123; lang=en",
        );
        assert_eq!(cookie_session(&request), Some("abc123".to_string()));
    }

    #[test]
    fn test_cookie_session_ignores_other_cookies() {
        let request = request_with(&header::COOKIE, "theme=dark; lang=en");
        assert_eq!(cookie_session(&request), None);
    }

    #[test]
    fn test_no_headers_means_anonymous() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(bearer_session(&request), None);
        assert_eq!(cookie_session(&request), None);
    }
}
