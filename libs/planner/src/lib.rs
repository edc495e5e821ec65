//! Training-plan domain logic for the Coachd backend
//!
//! Everything in this crate is pure: program structures and their edits,
//! the projection of a program onto calendar dates, calendar grids, and the
//! weekly report with its text and PDF renderings. Persistence and HTTP live
//! in the API service.
//!
//! Day slots inside a program week are relative to the program start date.
//! Calendar layouts (grids, week ranges, reports) start weeks on Monday.

pub mod builder;
pub mod calendar;
pub mod export;
pub mod program;
pub mod projection;
pub mod report;
pub mod workout;

pub use program::{DAYS_PER_WEEK, Days, ProgramData, ProgramSet, ProgramWorkout, Week};
pub use projection::{Assignment, DaySlot, ProgramWindow, WindowError};
pub use workout::SetEntry;
