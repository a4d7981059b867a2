pub mod calendar;
pub mod notify;
pub mod optimizer;
pub mod routing;
