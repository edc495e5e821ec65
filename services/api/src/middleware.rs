//! Session and billing middleware
//!
//! `auth_middleware` guards the JSON API and answers 401 on a bad session.
//! `dashboard_gate` guards `/dashboard/*` and redirects instead: to the login
//! page without a session, to signup without a coach account, and to billing
//! without an active or free plan.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::headers::{Authorization, Cookie, HeaderMapExt, authorization::Bearer};
use tracing::{debug, error};

use crate::{
    error::ApiError,
    jwt::AuthUser,
    models::coach::Coach,
    state::AppState,
};

/// Cookie the web client stores the access token in
pub const SESSION_COOKIE: &str = "sb-access-token";

/// Coach that passed the gate
#[derive(Debug, Clone)]
pub struct CoachSession {
    pub coach: Coach,
}

/// Outcome of the dashboard gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Login,
    Signup,
    Billing,
}

impl Access {
    pub fn redirect_path(self) -> Option<&'static str> {
        match self {
            Access::Granted => None,
            Access::Login => Some("/login"),
            Access::Signup => Some("/signup"),
            Access::Billing => Some("/billing"),
        }
    }
}

/// Decide dashboard access from the session and the caller's coach row
pub fn evaluate_access(authenticated: bool, coach: Option<&Coach>) -> Access {
    if !authenticated {
        return Access::Login;
    }
    match coach {
        None => Access::Signup,
        Some(coach) if coach.has_access() => Access::Granted,
        Some(_) => Access::Billing,
    }
}

/// Access token from the bearer header, falling back to the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }
    headers
        .typed_get::<Cookie>()
        .and_then(|cookie| cookie.get(SESSION_COOKIE).map(str::to_string))
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Option<AuthUser> {
    session_token(headers).and_then(|token| state.tokens.verify(&token))
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, req.headers()).ok_or(ApiError::Unauthorized)?;

    // Insert the user into the request extensions
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Session and billing gate for the dashboard
pub async fn dashboard_gate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let user = authenticate(&state, req.headers());

    let coach = match &user {
        Some(user) => match state.coaches.find_by_id(user.id).await {
            Ok(coach) => coach,
            Err(e) => {
                error!("Failed to load coach {}: {}", user.id, e);
                return ApiError::from(e).into_response();
            }
        },
        None => None,
    };

    let access = evaluate_access(user.is_some(), coach.as_ref());
    match (access.redirect_path(), user, coach) {
        (None, Some(_), Some(coach)) => {
            req.extensions_mut().insert(CoachSession { coach });
            next.run(req).await
        }
        (path, _, _) => {
            let target = path.unwrap_or("/login");
            debug!("Dashboard gate redirecting {} to {}", req.uri().path(), target);
            Redirect::temporary(target).into_response()
        }
    }
}
