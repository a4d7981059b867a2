//! Routing service client.
//!
//! The optimizer only needs one call: hand the routing provider a day's
//! stops and get back a visiting order with real travel durations. The
//! HTTP implementation is timeout-bounded; callers treat every failure as
//! non-fatal.

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use std::time::Duration;

use jobsync_core::errors::{SchedulingError, SchedulingResult};
use jobsync_core::models::route::{Coordinates, OptimizedRoute, RouteStop};

#[automock]
#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Requests an optimized visiting order for `destinations` starting from
    /// `origin`. The returned order indexes into `destinations`.
    async fn get_optimized_route(
        &self,
        origin: Coordinates,
        destinations: Vec<RouteStop>,
    ) -> SchedulingResult<OptimizedRoute>;
}

#[derive(Serialize)]
struct OptimizeRouteRequest {
    origin: Coordinates,
    destinations: Vec<RouteStop>,
}

/// Talks to the external routing provider over HTTP.
pub struct HttpRoutingService {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl HttpRoutingService {
    /// `base_url = None` disables routing; every call reports the service as
    /// unconfigured and the optimizer skips the day.
    pub fn new(base_url: Option<String>, timeout: Duration) -> eyre::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl RoutingService for HttpRoutingService {
    async fn get_optimized_route(
        &self,
        origin: Coordinates,
        destinations: Vec<RouteStop>,
    ) -> SchedulingResult<OptimizedRoute> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            SchedulingError::ExternalService("Routing service is not configured".to_string())
        })?;

        let url = format!("{}/route/optimize", base.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&OptimizeRouteRequest {
                origin,
                destinations,
            })
            .send()
            .await
            .map_err(|e| SchedulingError::ExternalService(format!("Routing request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SchedulingError::ExternalService(format!(
                "Routing service returned {}",
                response.status()
            )));
        }

        response
            .json::<OptimizedRoute>()
            .await
            .map_err(|e| SchedulingError::ExternalService(format!("Malformed routing response: {}", e)))
    }
}
