//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state.

use crate::model::ui::{PromptField, View};
use crate::model::UseCase;
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick for timers and draining finished requests
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Force quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    /// Switch to a top-level view
    SelectView(View),
    /// Move to next view tab
    NextTab,
    /// Move to previous view tab
    PrevTab,
    /// Open the dataset explorer for a use case
    ExploreDataset(String),
    /// Leave the dataset explorer
    Back,
    /// Re-fetch the active view's data
    Refresh,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    /// Open quit confirmation dialog
    OpenQuitDialog,
    /// Open help dialog
    OpenHelp,
    /// Open the Run Evaluation dialog, optionally bound to a use case
    OpenRunEval(Option<UseCase>),
    /// Close the current modal
    CloseModal,
    /// Confirm the current modal action
    ConfirmModal,

    // ─────────────────────────────────────────────────────────────────────────
    // Prompts
    // ─────────────────────────────────────────────────────────────────────────
    /// Create a new custom prompt on the selected use case
    NewPrompt,
    /// Ask for confirmation before deleting the selected prompt
    RequestDeletePrompt {
        use_case_id: String,
        prompt_id: String,
        name: String,
    },
    /// Delete a prompt once the user confirmed
    DeletePrompt {
        use_case_id: String,
        prompt_id: String,
    },
    /// Open the selected prompt's text in the external editor
    EditPrompt(PromptField),

    // ─────────────────────────────────────────────────────────────────────────
    // Status
    // ─────────────────────────────────────────────────────────────────────────
    /// Show a transient message in the status bar
    SetStatus(String),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::SelectView(view) => write!(f, "SelectView({})", view.name()),
            Action::NextTab => write!(f, "NextTab"),
            Action::PrevTab => write!(f, "PrevTab"),
            Action::ExploreDataset(id) => write!(f, "ExploreDataset({})", id),
            Action::Back => write!(f, "Back"),
            Action::Refresh => write!(f, "Refresh"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::OpenRunEval(Some(use_case)) => write!(f, "OpenRunEval({})", use_case.id),
            Action::OpenRunEval(None) => write!(f, "OpenRunEval"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::ConfirmModal => write!(f, "ConfirmModal"),
            Action::NewPrompt => write!(f, "NewPrompt"),
            Action::RequestDeletePrompt {
                use_case_id,
                prompt_id,
                ..
            } => write!(f, "RequestDeletePrompt({}/{})", use_case_id, prompt_id),
            Action::DeletePrompt {
                use_case_id,
                prompt_id,
            } => write!(f, "DeletePrompt({}/{})", use_case_id, prompt_id),
            Action::EditPrompt(field) => write!(f, "EditPrompt({})", field.label()),
            Action::SetStatus(msg) => write!(f, "SetStatus({})", msg),
        }
    }
}
