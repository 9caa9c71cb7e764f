//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod activity;
pub mod confirm_dialog;
pub mod dashboard;
pub mod dataset_explorer;
pub mod help_dialog;
pub mod layout;
pub mod prompts;
pub mod quit_dialog;
pub mod results;
pub mod run_eval_dialog;
pub mod search;
pub mod table;
pub mod use_cases;
pub mod visualizer;

#[cfg(test)]
pub mod test_support;

pub use activity::ActivityComponent;
pub use confirm_dialog::ConfirmDeleteDialog;
pub use dashboard::DashboardComponent;
pub use dataset_explorer::DatasetExplorerComponent;
pub use help_dialog::HelpDialog;
pub use layout::{calculate_main_layout, centered_popup};
pub use prompts::{PromptEdit, PromptsComponent};
pub use quit_dialog::QuitDialog;
pub use results::ResultsComponent;
pub use run_eval_dialog::RunEvalDialog;
pub use use_cases::UseCasesComponent;
pub use visualizer::VisualizerComponent;
