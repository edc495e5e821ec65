//! Signup, checkout, coach registration, invitations and payment webhooks

use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use chrono::Utc;
use common::error::DatabaseError;
use reqwest::Url;
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    error::{ApiError, ApiResult},
    jwt::AuthUser,
    models::{
        SuccessResponse,
        athlete::NewAthlete,
        billing::{
            CHECKOUT_COMPLETED, CheckoutRequest, CheckoutResponse, CheckoutSessionObject,
            InviteAthleteRequest, RegisterCoachRequest, SUBSCRIPTION_DELETED,
            SUBSCRIPTION_UPDATED, SubscriptionObject, WebhookAck, WebhookEvent,
        },
        coach::{ACTIVE_STATUS, NewCoach, SignupRequest},
    },
    repositories::{BillingRepository, CoachRepository},
    state::AppState,
    stripe::verify_signature,
    validation::{normalize_email, validate_display_name, validate_email, validate_password},
};

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

async fn start_checkout(state: &AppState, email: &str) -> ApiResult<CheckoutResponse> {
    let base = state.settings.public_base_url.trim_end_matches('/');
    let success_url = Url::parse_with_params(&format!("{}/success", base), &[("email", email)])
        .map_err(|e| {
            error!("Invalid PUBLIC_BASE_URL {}: {}", base, e);
            ApiError::Internal
        })?;
    let cancel_url = format!("{}/signup?canceled=true", base);

    let session = state
        .stripe
        .create_checkout_session(email, success_url.as_str(), &cancel_url)
        .await?;

    Ok(CheckoutResponse {
        session_id: session.id,
        url: session.url,
    })
}

/// Stage a coach signup and start its checkout
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<Json<CheckoutResponse>> {
    let email = normalize_email(&payload.email);
    validate_email(&email).map_err(ApiError::Validation)?;
    validate_password(&payload.password).map_err(ApiError::Validation)?;
    let display_name = validate_display_name(&payload.display_name).map_err(ApiError::Validation)?;

    if state.coaches.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let metadata = json!({ "display_name": display_name });
    let auth_user_id = match state.billing.find_pending(&email).await? {
        Some(pending) => {
            state
                .supabase
                .update_user(
                    pending.auth_user_id,
                    json!({ "password": payload.password, "user_metadata": metadata }),
                )
                .await?;
            pending.auth_user_id
        }
        None => {
            state
                .supabase
                .create_unconfirmed_user(&email, &payload.password, metadata)
                .await?
                .id
        }
    };

    state
        .billing
        .upsert_pending(&email, auth_user_id, &display_name, &payload.profile)
        .await?;
    info!("Staged signup for {}", email);

    Ok(Json(start_checkout(&state, &email).await?))
}

/// Start a subscription checkout for an email
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> ApiResult<Json<CheckoutResponse>> {
    let email = normalize_email(&payload.email);
    validate_email(&email).map_err(ApiError::Validation)?;

    Ok(Json(start_checkout(&state, &email).await?))
}

/// The access token must carry the email being registered
fn token_owns_email(user: &AuthUser, email: &str) -> bool {
    user.email
        .as_deref()
        .is_some_and(|token_email| normalize_email(token_email) == email)
}

/// Create the caller's coach row once their payment is on record
pub async fn register_coach(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RegisterCoachRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    if payload.user_id != user.id {
        return Err(ApiError::Forbidden);
    }
    let email = normalize_email(&payload.email);
    if !token_owns_email(&user, &email) {
        return Err(ApiError::Forbidden);
    }

    if state.coaches.find_by_id(user.id).await?.is_some() {
        return Ok(Json(SuccessResponse::ok()));
    }

    let Some(checkout) = state.billing.completed_checkout(&email).await? else {
        return Err(ApiError::PaymentRequired);
    };

    let mut tx = state.db_pool.begin().await.map_err(DatabaseError::from)?;
    let pending = BillingRepository::lock_pending(&mut tx, &email).await?;
    let coach = NewCoach {
        id: user.id,
        email: email.clone(),
        display_name: pending.as_ref().map(|p| p.display_name.clone()),
        profile: pending.as_ref().map(|p| p.profile()).unwrap_or_default(),
        subscription_status: Some(ACTIVE_STATUS.to_string()),
        customer_id: checkout.customer_id,
        subscription_id: checkout.subscription_id,
    };
    if !CoachRepository::insert(&mut tx, &coach).await? {
        return Err(ApiError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }
    if pending.is_some() {
        BillingRepository::delete_pending(&mut tx, &email).await?;
    }
    tx.commit().await.map_err(DatabaseError::from)?;

    info!("Registered coach {} from recorded checkout", user.id);
    Ok(Json(SuccessResponse::ok()))
}

/// Invite an athlete by email on behalf of the calling coach
pub async fn invite_athlete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<InviteAthleteRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    if payload.coach_id != user.id {
        return Err(ApiError::Forbidden);
    }
    let coach = state
        .coaches
        .find_by_id(user.id)
        .await?
        .ok_or(ApiError::Forbidden)?;
    if !coach.has_access() {
        return Err(ApiError::PaymentRequired);
    }

    let email = normalize_email(&payload.email);
    validate_email(&email).map_err(ApiError::Validation)?;

    let identity = state
        .supabase
        .invite_user(&email, json!({ "role": "athlete", "coach_id": coach.id }))
        .await?;

    state
        .athletes
        .insert(&NewAthlete {
            id: Some(identity.id),
            coach_id: coach.id,
            first_name: None,
            last_name: None,
            email: Some(email.clone()),
        })
        .await?;

    info!("Coach {} invited athlete {}", coach.id, identity.id);
    Ok(Json(SuccessResponse::ok()))
}

/// Payment provider webhook
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Validation("Missing webhook signature".to_string()))?;

    verify_signature(
        &body,
        signature,
        &state.settings.stripe_webhook_secret,
        state.settings.webhook_tolerance_secs,
        Utc::now().timestamp(),
    )
    .map_err(|e| {
        warn!("Rejected webhook: {}", e);
        ApiError::Validation(format!("Invalid webhook signature: {}", e))
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Validation(format!("Invalid webhook payload: {}", e)))?;

    match event.event_type.as_str() {
        CHECKOUT_COMPLETED => process_checkout_completed(&state, &event).await?,
        SUBSCRIPTION_UPDATED | SUBSCRIPTION_DELETED => {
            process_subscription_change(&state, &event).await?
        }
        other => info!("Ignoring webhook event {} of type {}", event.id, other),
    }

    Ok(Json(WebhookAck { received: true }))
}

/// Promote the pending signup paid for by this checkout. The event id is
/// recorded in the same transaction, so a redelivery finds it and stops.
async fn process_checkout_completed(state: &AppState, event: &WebhookEvent) -> ApiResult<()> {
    let session: CheckoutSessionObject = serde_json::from_value(event.data.object.clone())
        .map_err(|e| ApiError::Validation(format!("Invalid checkout session: {}", e)))?;
    let email = session.email().map(normalize_email);
    let ids = session.provider_ids();

    let mut tx = state.db_pool.begin().await.map_err(DatabaseError::from)?;

    if !BillingRepository::record_event(
        &mut tx,
        &event.id,
        &event.event_type,
        email.as_deref(),
        &ids,
    )
    .await?
    {
        info!("Webhook event {} already processed", event.id);
        return Ok(());
    }

    let Some(email) = email else {
        warn!("Checkout {} completed without an email", event.id);
        tx.commit().await.map_err(DatabaseError::from)?;
        return Ok(());
    };

    let Some(pending) = BillingRepository::lock_pending(&mut tx, &email).await? else {
        let attached =
            CoachRepository::attach_billing(&mut tx, &email, &ids, ACTIVE_STATUS).await?;
        info!(
            "No pending signup for {}, recorded payment ({} existing coach rows updated)",
            email, attached
        );
        tx.commit().await.map_err(DatabaseError::from)?;
        return Ok(());
    };

    state.supabase.confirm_email(pending.auth_user_id).await?;

    let coach = NewCoach {
        id: pending.auth_user_id,
        email: pending.email.clone(),
        display_name: Some(pending.display_name.clone()),
        profile: pending.profile(),
        subscription_status: Some(ACTIVE_STATUS.to_string()),
        customer_id: ids.customer_id.clone(),
        subscription_id: ids.subscription_id.clone(),
    };
    if !CoachRepository::insert(&mut tx, &coach).await? {
        warn!("Coach for {} already exists, consuming pending signup", email);
        CoachRepository::attach_billing(&mut tx, &email, &ids, ACTIVE_STATUS).await?;
    }
    BillingRepository::delete_pending(&mut tx, &email).await?;
    tx.commit().await.map_err(DatabaseError::from)?;

    info!("Promoted pending signup {} to coach {}", email, coach.id);
    Ok(())
}

async fn process_subscription_change(state: &AppState, event: &WebhookEvent) -> ApiResult<()> {
    let subscription: SubscriptionObject = serde_json::from_value(event.data.object.clone())
        .map_err(|e| ApiError::Validation(format!("Invalid subscription: {}", e)))?;

    let ids = subscription.provider_ids();

    let mut tx = state.db_pool.begin().await.map_err(DatabaseError::from)?;
    if !BillingRepository::record_event(&mut tx, &event.id, &event.event_type, None, &ids).await? {
        info!("Webhook event {} already processed", event.id);
        return Ok(());
    }

    let status = subscription.effective_status(&event.event_type);
    let updated = CoachRepository::set_subscription_status(&mut tx, &ids, &status).await?;
    if updated == 0 {
        warn!(
            "No coach matches customer {:?} or subscription {:?}",
            ids.customer_id, ids.subscription_id
        );
    } else {
        info!("Subscription {:?} is now {} ({} coach rows)", ids.subscription_id, status, updated);
    }
    tx.commit().await.map_err(DatabaseError::from)?;
    Ok(())
}
