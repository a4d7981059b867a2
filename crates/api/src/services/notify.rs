//! Notification gateway.
//!
//! Delivery is fire-and-forget: the scheduling flow never waits on, nor
//! fails because of, a notification. Message text is assembled here at the
//! boundary from typed scheduling data, so the core never carries
//! presentation strings.

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use uuid::Uuid;

use jobsync_core::errors::SchedulingResult;
use jobsync_core::models::job::ScheduledJob;

/// One multi-channel message for one recipient.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationMessage {
    pub channels: Vec<String>,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}

impl NotificationMessage {
    fn for_job(title: &str, body: String, job: &ScheduledJob) -> Self {
        Self {
            channels: vec!["push".to_string(), "email".to_string()],
            title: title.to_string(),
            body,
            data: serde_json::json!({ "job_id": job.id, "date": job.date }),
        }
    }

    pub fn job_scheduled(job: &ScheduledJob) -> Self {
        Self::for_job(
            "Job scheduled",
            format!(
                "Your job is booked for {} at {}",
                job.date,
                job.start_time.format("%H:%M")
            ),
            job,
        )
    }

    pub fn job_rescheduled(job: &ScheduledJob) -> Self {
        Self::for_job(
            "Job rescheduled",
            format!(
                "Your job has moved to {} at {}",
                job.date,
                job.start_time.format("%H:%M")
            ),
            job,
        )
    }

    pub fn schedule_updated(job: &ScheduledJob) -> Self {
        Self::for_job(
            "Schedule updated",
            format!(
                "The visit on {} now starts at {}",
                job.date,
                job.start_time.format("%H:%M")
            ),
            job,
        )
    }
}

/// Sends one message, bounded by the configured external-call timeout.
/// Failures and timeouts are logged and swallowed.
pub async fn notify_best_effort(state: &crate::ApiState, user_id: Uuid, message: NotificationMessage) {
    let send = state.notifier.send_multi_channel(user_id, message);
    match tokio::time::timeout(state.config.external_timeout, send).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Notification to {} failed: {}", user_id, e),
        Err(_) => tracing::warn!("Notification to {} timed out", user_id),
    }
}

#[automock]
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send_multi_channel(
        &self,
        user_id: Uuid,
        message: NotificationMessage,
    ) -> SchedulingResult<()>;
}

/// Default gateway: logs the payload instead of delivering it. Deployments
/// wire a real provider behind the same trait.
pub struct LoggingNotificationGateway;

#[async_trait]
impl NotificationGateway for LoggingNotificationGateway {
    async fn send_multi_channel(
        &self,
        user_id: Uuid,
        message: NotificationMessage,
    ) -> SchedulingResult<()> {
        tracing::info!(
            "Notification to {}: [{}] {} - {}",
            user_id,
            message.channels.join(","),
            message.title,
            message.body
        );
        Ok(())
    }
}
