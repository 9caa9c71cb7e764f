//! Evaluation requests and scored results

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Body of `POST /evaluate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalRequest {
    pub model_name: String,
    pub use_case_id: String,
    pub prompt_id: String,
}

/// Reply of `POST /evaluate`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvalStarted {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub job_id: String,
}

/// Scored outcome of a completed job
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvalResult {
    pub id: String,
    #[serde(default)]
    pub job_id: Option<String>,
    pub model_name: String,
    pub use_case_id: String,
    #[serde(default)]
    pub prompt_id: String,
    pub score: f64,
    /// Epoch seconds
    #[serde(default)]
    pub timestamp: Option<f64>,
}

/// Coarse quality band used to color scores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl EvalResult {
    pub fn score_band(&self) -> ScoreBand {
        if self.score >= 0.9 {
            ScoreBand::High
        } else if self.score >= 0.7 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    /// Score as a percentage with one decimal, e.g. "87.5%"
    pub fn formatted_score(&self) -> String {
        format!("{:.1}%", self.score * 100.0)
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp
            .and_then(|secs| Local.timestamp_opt(secs.trunc() as i64, 0).single())
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}
