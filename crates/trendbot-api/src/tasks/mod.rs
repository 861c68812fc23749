//! 백그라운드 작업.

pub mod scheduler;

pub use scheduler::{run_scheduler, Schedule, ScheduleError, Trigger};
