//! Request handlers.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::{Extension, Form};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, CurrentUser, SESSION_COOKIE};
use crate::auth::AuthError;
use crate::models::{EntryId, Exercise, ExerciseForm};
use crate::view::{self, WeekView};

// ============================================================================
// Health
// ============================================================================

#[derive(Serialize)]
pub(super) struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Account
// ============================================================================

#[derive(Serialize)]
pub(super) struct MeResponse {
    email: String,
}

/// Who is signed in. Anonymous requests get a 401 so the client can show
/// the sign-in prompt.
pub(super) async fn me(
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<MeResponse>, ApiError> {
    match user.0 {
        Some(session) => Ok(Json(MeResponse {
            email: session.email,
        })),
        None => Err(ApiError::Unauthenticated),
    }
}

// ============================================================================
// Exercises
// ============================================================================

#[derive(Deserialize)]
pub(super) struct ListParams {
    week: Option<u32>,
}

/// Lists the account's entries, optionally narrowed to one week.
///
/// Anonymous requests see an empty history rather than an error.
pub(super) async fn list_exercises(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Exercise>>, ApiError> {
    let Some(session) = user.0 else {
        return Ok(Json(Vec::new()));
    };

    let entries = state.log.entries(&session.email).await?;
    let mut view = WeekView::new(entries);
    view.select(params.week);
    Ok(Json(view.into_visible()))
}

/// Distinct week numbers in the account's history, for the week selector.
pub(super) async fn list_weeks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<u32>>, ApiError> {
    let Some(session) = user.0 else {
        return Ok(Json(Vec::new()));
    };

    let entries = state.log.entries(&session.email).await?;
    Ok(Json(view::distinct_weeks(&entries)))
}

/// Appends a submitted entry to the signed-in account's history.
///
/// Anonymous submissions are dropped without an error; a signed-in
/// submission that fails validation is a 400.
pub(super) async fn append_exercise(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<ExerciseForm>,
) -> Result<Response, ApiError> {
    let Some(session) = user.0 else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let fields = form.normalize()?;
    let entry = state.log.append(&session.email, fields).await?;
    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

/// Removes one entry from the signed-in account's history.
///
/// Deleting an id that is not there reports success; so does an anonymous
/// delete, which touches nothing.
pub(super) async fn delete_exercise(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let Some(session) = user.0 else {
        return Ok(StatusCode::NO_CONTENT);
    };

    state.log.delete(&session.email, EntryId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Sign-in
// ============================================================================

/// Sends the browser to the identity provider's authorize page.
pub(super) async fn login(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let identity = state.identity.as_ref().ok_or(AuthError::NotConfigured)?;
    let callback = format!("{}/auth/callback", state.public_url.trim_end_matches('/'));
    Ok(Redirect::to(&identity.authorize_url(&callback)))
}

#[derive(Deserialize)]
pub(super) struct CallbackParams {
    code: String,
}

/// The provider's return leg: exchange the grant code, open a session, and
/// send the browser back to the app with the session cookie set.
pub(super) async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    let identity = state.identity.as_ref().ok_or(AuthError::NotConfigured)?;
    let email = identity.resolve_grant(&params.code).await?;
    let id = state.sessions.create(&email);
    tracing::info!("signed in {}", email);

    let cookie = session_cookie(&id, state.secure_cookies);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// Destroys the session and clears the cookie. Safe to call anonymously.
pub(super) async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    if let Some(session) = user.0 {
        state.sessions.destroy(&session.id);
        tracing::info!("signed out {}", session.email);
    }

    (
        [(header::SET_COOKIE, clear_session_cookie(state.secure_cookies))],
        Redirect::to("/"),
    )
        .into_response()
}

fn session_cookie(id: &str, secure: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
