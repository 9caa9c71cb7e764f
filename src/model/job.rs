//! Evaluation jobs as reported by the backend

use chrono::{Local, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Presentation state of a job
///
/// The backend owns transitions; the client only maps whatever string it
/// receives. Anything unrecognized is shown as pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn from_label(label: &str) -> Self {
        match label {
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Pending,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            JobStatus::Pending => "◷",
            JobStatus::Running => "⟳",
            JobStatus::Completed => "✓",
            JobStatus::Failed => "✗",
        }
    }
}

/// One model/use-case/prompt evaluation run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub use_case_id: String,
    #[serde(default)]
    pub prompt_id: String,
    #[serde(default)]
    pub model_name: String,
    /// Raw status label, displayed as received
    #[serde(default)]
    pub status: String,
    /// Percent as sent; may be fractional or out of range
    #[serde(default, deserialize_with = "lenient_progress")]
    pub progress: f64,
    #[serde(default)]
    pub result_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<f64>,
}

impl Job {
    pub fn state(&self) -> JobStatus {
        JobStatus::from_label(&self.status)
    }

    /// Progress bounded to a drawable percentage
    pub fn clamped_progress(&self) -> u16 {
        self.progress.clamp(0.0, 100.0).round() as u16
    }

    pub fn formatted_created_at(&self) -> Option<String> {
        let secs = self.created_at?;
        Local
            .timestamp_opt(secs.trunc() as i64, 0)
            .single()
            .map(|t| t.format("%H:%M:%S").to_string())
    }
}

/// A null or non-numeric progress reads as 0 instead of rejecting the job list
fn lenient_progress<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}
