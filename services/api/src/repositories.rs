//! Repositories for database operations
//!
//! Every query that touches coach-owned data filters on `coach_id`, so a
//! missing row and a row owned by another coach look the same to callers.
//! Functions that must run inside a caller's transaction take a
//! `&mut PgConnection` instead of using the pool.

pub mod athletes;
pub mod billing;
pub mod coaches;
pub mod exercises;
pub mod programs;
pub mod workouts;

pub use athletes::AthleteRepository;
pub use billing::BillingRepository;
pub use coaches::CoachRepository;
pub use exercises::ExerciseRepository;
pub use programs::ProgramRepository;
pub use workouts::WorkoutRepository;
