use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One visit handed to the routing service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStop {
    pub job_id: Uuid,
    pub coordinates: Coordinates,
}

/// Travel between the i-th and (i+1)-th stop of the optimized order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RouteLeg {
    pub duration_minutes: f64,
    pub distance_km: f64,
}

/// Response of the routing service for one day's visits. `optimized_order`
/// holds indexes into the submitted stop list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizedRoute {
    pub optimized_order: Vec<usize>,
    pub total_duration_minutes: f64,
    pub total_distance_km: f64,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

/// Outcome of one optimization attempt. Ephemeral: only the rewritten job
/// windows persist when `accepted` is true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteOptimizationResult {
    pub contractor_id: Uuid,
    pub date: NaiveDate,
    pub original_order: Vec<Uuid>,
    pub optimized_order: Vec<Uuid>,
    pub estimated_time_savings_minutes: f64,
    pub accepted: bool,
}

impl RouteOptimizationResult {
    /// Result for a day that was left untouched.
    pub fn skipped(contractor_id: Uuid, date: NaiveDate, order: Vec<Uuid>) -> Self {
        Self {
            contractor_id,
            date,
            original_order: order.clone(),
            optimized_order: order,
            estimated_time_savings_minutes: 0.0,
            accepted: false,
        }
    }
}
