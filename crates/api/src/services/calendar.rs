//! iCalendar export.
//!
//! Renders one `VEVENT` per scheduled job, with `DTSTART`/`DTEND` in the
//! contractor's time zone and a UID stable across reschedules so calendar
//! clients update in place instead of duplicating.

use chrono::Utc;

use jobsync_core::models::job::ScheduledJob;

/// Escapes text per RFC 5545 §3.3.11.
fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

fn format_local(date: chrono::NaiveDate, time: chrono::NaiveTime) -> String {
    format!("{}T{}", date.format("%Y%m%d"), time.format("%H%M%S"))
}

/// Renders a complete `VCALENDAR` document for one job. `time_zone` is the
/// contractor's IANA zone name, used as the `TZID` of the event times.
pub fn job_to_ics(job: &ScheduledJob, time_zone: &str) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//jobsync//scheduling//EN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:job-{}@jobsync", job.id),
        format!("DTSTAMP:{}", Utc::now().format("%Y%m%dT%H%M%SZ")),
        format!(
            "DTSTART;TZID={}:{}",
            time_zone,
            format_local(job.date, job.start_time)
        ),
        format!(
            "DTEND;TZID={}:{}",
            time_zone,
            format_local(job.date, job.end_time)
        ),
        format!("SUMMARY:{}", escape_text(&summary(job))),
    ];

    if let (Some(lat), Some(lng)) = (job.latitude, job.longitude) {
        lines.push(format!("GEO:{};{}", lat, lng));
        lines.push(format!("LOCATION:{}\\, {}", lat, lng));
    }
    if let Some(notes) = &job.notes {
        lines.push(format!("DESCRIPTION:{}", escape_text(notes)));
    }

    lines.push("STATUS:CONFIRMED".to_string());
    lines.push("END:VEVENT".to_string());
    lines.push("END:VCALENDAR".to_string());

    // RFC 5545 mandates CRLF line endings.
    lines.join("\r\n") + "\r\n"
}

fn summary(job: &ScheduledJob) -> String {
    match job.urgency.as_deref() {
        Some("emergency") => "Emergency job visit".to_string(),
        _ => "Scheduled job visit".to_string(),
    }
}
