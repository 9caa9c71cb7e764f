//! UI state - presentation enums shared between components

/// Top-level views of the client
///
/// `Explorer` is reached from the use case list and has no tab of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    UseCases,
    Prompts,
    Activity,
    Results,
    Visualizer,
    Explorer,
}

impl View {
    /// Views reachable from the tab bar, in display order
    pub fn tabs() -> Vec<View> {
        vec![
            View::Dashboard,
            View::UseCases,
            View::Prompts,
            View::Activity,
            View::Results,
            View::Visualizer,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::UseCases => "Use Cases",
            View::Prompts => "Prompts",
            View::Activity => "Activity",
            View::Results => "Results",
            View::Visualizer => "Visualizer",
            View::Explorer => "Dataset Explorer",
        }
    }

    /// Position in the tab bar. The explorer highlights its parent tab.
    pub fn tab_index(&self) -> usize {
        match self {
            View::Dashboard => 0,
            View::UseCases | View::Explorer => 1,
            View::Prompts => 2,
            View::Activity => 3,
            View::Results => 4,
            View::Visualizer => 5,
        }
    }

    /// View bound to a digit shortcut ('1' through '6')
    pub fn from_shortcut(c: char) -> Option<View> {
        let index = c.to_digit(10)?.checked_sub(1)? as usize;
        View::tabs().get(index).copied()
    }

    pub fn next(&self) -> View {
        let tabs = View::tabs();
        tabs[(self.tab_index() + 1) % tabs.len()]
    }

    pub fn prev(&self) -> View {
        let tabs = View::tabs();
        tabs[(self.tab_index() + tabs.len() - 1) % tabs.len()]
    }
}

/// Editable prompt text sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptField {
    ChainOfThought,
    FewShot,
}

impl PromptField {
    pub fn label(&self) -> &'static str {
        match self {
            PromptField::ChainOfThought => "Chain of Thought",
            PromptField::FewShot => "Few-Shot Examples",
        }
    }
}
