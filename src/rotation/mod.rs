//! Daily quote rotation.
//!
//! The content tree is flattened into an ordered quote list, permuted once
//! per calendar day with a day-epoch seed, and mapped onto equal time
//! slots across the day:
//!
//! - `flatten`: content tree -> ordered quote list
//! - `permute` / `day_seed`: the deterministic daily permutation
//! - `RotationScheduler`: current quote, next transition, day schedule

pub mod flatten;
pub mod permute;
pub mod scheduler;

pub use flatten::flatten;
pub use permute::{day_seed, permute};
pub use scheduler::{RotationError, RotationScheduler, ScheduleEntry, MINUTES_PER_DAY};
