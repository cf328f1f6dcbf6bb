mod schedule_generator;
mod schedule_service;

pub use schedule_generator::{ScheduleGenerator, SkipReason};
pub use schedule_service::{BatchSummary, GenerationOutcome, ScheduleService};
