//! Chart shaping for the visualizer

use super::evaluation::EvalResult;

/// One bar: a model's most recent score for a use case
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBar {
    pub model_name: String,
    pub score: f64,
}

impl ModelBar {
    /// Score in tenths of a percent, the integer unit bars are drawn in
    pub fn permille(&self) -> u64 {
        (self.score * 1000.0).round().max(0.0) as u64
    }

    /// Percentage with one decimal, rounded the same way as the bar
    pub fn label(&self) -> String {
        let permille = self.permille();
        format!("{}.{}%", permille / 10, permille % 10)
    }
}

/// Bars for a single use case, one per model in order of first appearance.
///
/// For each model only the result with the strictly greatest timestamp is
/// kept. A result without a timestamp never replaces another, and nothing
/// replaces a result that lacks one, so on ties the first seen wins.
pub fn latest_by_model(results: &[EvalResult], use_case_id: &str) -> Vec<ModelBar> {
    let mut latest: Vec<&EvalResult> = Vec::new();

    for result in results.iter().filter(|r| r.use_case_id == use_case_id) {
        match latest.iter_mut().find(|r| r.model_name == result.model_name) {
            Some(current) => {
                if let (Some(candidate), Some(existing)) = (result.timestamp, current.timestamp) {
                    if candidate > existing {
                        *current = result;
                    }
                }
            }
            None => latest.push(result),
        }
    }

    latest
        .into_iter()
        .map(|r| ModelBar {
            model_name: r.model_name.clone(),
            score: r.score,
        })
        .collect()
}
