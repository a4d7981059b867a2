pub mod availability;
pub mod job;
pub mod reschedule;
