//! Model layer - backend records and presentation state
//!
//! - Backend records (`UseCase`, `Job`, `EvalResult`, samples)
//! - Derived views over them (filtering, paging, chart shaping)
//! - `ModalStack` and the UI enums

pub mod chart;
pub mod evaluation;
pub mod job;
pub mod modal;
pub mod query;
pub mod sample;
pub mod ui;
pub mod use_case;

pub use evaluation::{EvalRequest, EvalResult, EvalStarted, ScoreBand};
pub use job::{Job, JobStatus};
pub use sample::Sample;
pub use use_case::{Prompt, UseCase};
