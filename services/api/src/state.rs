//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    config::Settings,
    jwt::TokenVerifier,
    repositories::{
        AthleteRepository, BillingRepository, CoachRepository, ExerciseRepository,
        ProgramRepository, WorkoutRepository,
    },
    stripe::StripeClient,
    supabase::SupabaseClient,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Arc<Settings>,
    pub tokens: TokenVerifier,
    pub supabase: SupabaseClient,
    pub stripe: StripeClient,
    pub coaches: CoachRepository,
    pub billing: BillingRepository,
    pub athletes: AthleteRepository,
    pub programs: ProgramRepository,
    pub exercises: ExerciseRepository,
    pub workouts: WorkoutRepository,
}

impl AppState {
    pub fn new(pool: PgPool, settings: Settings) -> Self {
        let http = reqwest::Client::new();
        let supabase = SupabaseClient::new(
            http.clone(),
            &settings.supabase_url,
            &settings.supabase_service_role_key,
        );
        let stripe = StripeClient::new(
            http,
            &settings.stripe_api_base,
            &settings.stripe_secret_key,
            &settings.stripe_price_id,
        );

        Self {
            tokens: TokenVerifier::new(&settings.supabase_jwt_secret),
            supabase,
            stripe,
            coaches: CoachRepository::new(pool.clone()),
            billing: BillingRepository::new(pool.clone()),
            athletes: AthleteRepository::new(pool.clone()),
            programs: ProgramRepository::new(pool.clone()),
            exercises: ExerciseRepository::new(pool.clone()),
            workouts: WorkoutRepository::new(pool.clone()),
            settings: Arc::new(settings),
            db_pool: pool,
        }
    }
}
