//! API service routes

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::{
    error::ApiError,
    middleware::{auth_middleware, dashboard_gate},
    state::AppState,
};

pub mod athletes;
pub mod billing;
pub mod calendar;
pub mod exercises;
pub mod export;
pub mod programs;
pub mod workouts;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/api/register-coach", post(billing::register_coach))
        .route("/api/invite-athlete", post(billing::invite_athlete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // The gate wraps the fallback too, so unknown dashboard paths still
    // send anonymous visitors to the login page
    let dashboard_routes = Router::new()
        .route(
            "/athletes",
            get(athletes::list_athletes).post(athletes::create_athlete),
        )
        .route(
            "/athletes/:id",
            get(athletes::get_athlete).patch(athletes::update_athlete),
        )
        .route(
            "/athletes/:id/avatar",
            post(athletes::upload_avatar)
                .layer(DefaultBodyLimit::max(athletes::MAX_AVATAR_BYTES)),
        )
        .route(
            "/athletes/:id/program",
            put(athletes::assign_program).delete(athletes::unassign_program),
        )
        .route("/athletes/:id/calendar", get(calendar::athlete_calendar))
        .route("/athletes/:id/export", get(export::export_week))
        .route(
            "/athletes/:id/workouts",
            get(workouts::list_workouts).post(workouts::create_workout),
        )
        .route("/workouts/:id", delete(workouts::delete_workout))
        .route("/workouts/:id/sets/:index", patch(workouts::update_set))
        .route("/workouts/:id/move-up", post(workouts::move_workout_up))
        .route(
            "/programs",
            get(programs::list_programs).post(programs::create_program),
        )
        .route(
            "/programs/:id",
            get(programs::get_program)
                .put(programs::update_program)
                .delete(programs::delete_program),
        )
        .route("/programs/:id/weeks", post(programs::add_week))
        .route(
            "/programs/:id/weeks/:week/duplicate",
            post(programs::duplicate_week),
        )
        .route(
            "/programs/:id/weeks/:week/days/:day",
            delete(programs::clear_day),
        )
        .route(
            "/exercises",
            get(exercises::list_exercises).post(exercises::create_exercise),
        )
        .route("/exercises/:id", delete(exercises::delete_exercise))
        .route("/calendar", get(calendar::coach_calendar))
        .fallback(dashboard_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            dashboard_gate,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/signup", post(billing::signup))
        .route(
            "/api/create-checkout-session",
            post(billing::create_checkout_session),
        )
        .route("/api/stripe-webhook", post(billing::stripe_webhook))
        .merge(session_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dashboard_not_found() -> ApiError {
    ApiError::NotFound("Page")
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match common::database::health_check(&state.db_pool).await {
        Ok(healthy) => healthy,
        Err(e) => {
            warn!("Health check failed: {}", e);
            false
        }
    };

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "service": "api",
        "database": database,
    }))
}
