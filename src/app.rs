//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components.
//! App is intentionally lean - it coordinates between components but
//! does not contain business logic itself.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    calculate_main_layout, ActivityComponent, ConfirmDeleteDialog, DashboardComponent,
    DatasetExplorerComponent, HelpDialog, PromptEdit, PromptsComponent, QuitDialog,
    ResultsComponent, RunEvalDialog, UseCasesComponent, VisualizerComponent,
};
use crate::config::Config;
use crate::model::modal::{Modal, ModalStack};
use crate::model::ui::View;
use crate::services::{Completion, Fetcher, Origin};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};
use std::time::Instant;

const GLOBAL_HINTS: [(&str, &str); 5] = [
    ("1-6", "Views"),
    ("E", "Run eval"),
    ("R", "Reload"),
    ("?", "Help"),
    ("q", "Quit"),
];

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Active top-level view
    pub view: View,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: Option<String>,

    /// Prompt text waiting to be opened in the external editor (handled by main loop)
    pub pending_edit: Option<PromptEdit>,

    /// Backend shown in the status bar
    pub api_base_url: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub dashboard: DashboardComponent,
    pub use_cases: UseCasesComponent,
    pub prompts: PromptsComponent,
    pub activity: ActivityComponent,
    pub results: ResultsComponent,
    pub visualizer: VisualizerComponent,
    pub explorer: DatasetExplorerComponent,
    pub run_eval: RunEvalDialog,
    pub quit_dialog: QuitDialog,
    pub help_dialog: HelpDialog,
    pub confirm_dialog: ConfirmDeleteDialog,
}

impl App {
    pub fn new(config: &Config) -> App {
        App {
            view: View::default(),
            modals: ModalStack::new(),
            should_quit: false,
            status_message: None,
            pending_edit: None,
            api_base_url: config.api_base_url.clone(),
            dashboard: DashboardComponent::new(),
            use_cases: UseCasesComponent::new(),
            prompts: PromptsComponent::new(),
            activity: ActivityComponent::new(config.poll_interval()),
            results: ResultsComponent::new(),
            visualizer: VisualizerComponent::new(),
            explorer: DatasetExplorerComponent::new(),
            run_eval: RunEvalDialog::new(),
            quit_dialog: QuitDialog,
            help_dialog: HelpDialog::default(),
            confirm_dialog: ConfirmDeleteDialog::default(),
        }
    }

    fn active(&mut self) -> &mut dyn Component {
        match self.view {
            View::Dashboard => &mut self.dashboard,
            View::UseCases => &mut self.use_cases,
            View::Prompts => &mut self.prompts,
            View::Activity => &mut self.activity,
            View::Results => &mut self.results,
            View::Visualizer => &mut self.visualizer,
            View::Explorer => &mut self.explorer,
        }
    }

    fn active_ref(&self) -> &dyn Component {
        match self.view {
            View::Dashboard => &self.dashboard,
            View::UseCases => &self.use_cases,
            View::Prompts => &self.prompts,
            View::Activity => &self.activity,
            View::Results => &self.results,
            View::Visualizer => &self.visualizer,
            View::Explorer => &self.explorer,
        }
    }

    /// Unmount the current view and mount `view`
    fn switch_view(&mut self, view: View, fetcher: &mut Fetcher) -> Result<()> {
        if view == self.view {
            return Ok(());
        }
        tracing::debug!("switching view {} -> {}", self.view.name(), view.name());
        self.active().unmount();
        self.view = view;
        self.active().mount(fetcher, Instant::now())
    }

    /// Hand a finished request to the component that issued it
    fn route(&mut self, completion: Completion, fetcher: &mut Fetcher) -> Result<Option<Action>> {
        match completion.origin {
            Origin::Dashboard => self.dashboard.apply(completion, fetcher),
            Origin::UseCases => self.use_cases.apply(completion, fetcher),
            Origin::Prompts => self.prompts.apply(completion, fetcher),
            Origin::Activity => self.activity.apply(completion, fetcher),
            Origin::Results => self.results.apply(completion, fetcher),
            Origin::Visualizer => self.visualizer.apply(completion, fetcher),
            Origin::Explorer => self.explorer.apply(completion, fetcher),
            Origin::RunEval => self.run_eval.apply(completion, fetcher),
        }
    }

    /// Run an action and every follow-up it produces
    pub fn dispatch(&mut self, action: Action, fetcher: &mut Fetcher) -> Result<()> {
        let mut next = Some(action);
        while let Some(action) = next {
            next = self.update(action, fetcher)?;
        }
        Ok(())
    }

    fn close_modal(&mut self) {
        if let Some(Modal::RunEval) = self.modals.pop() {
            self.run_eval.close();
        }
    }

    /// Called by the main loop once the external editor exits
    pub fn finish_edit(&mut self, edit: &PromptEdit, text: &str, fetcher: &mut Fetcher) {
        if self.view != View::Prompts {
            tracing::warn!("Discarding edit of {}: prompt view no longer active", edit.prompt_id);
            return;
        }
        if !self.prompts.save_edit(edit, text, fetcher) {
            self.status_message = Some(format!("{} unchanged", edit.field.label()));
        }
    }

    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
            Modal::Help => self.help_dialog.handle_key_event(key),
            Modal::RunEval => self.run_eval.handle_key_event(key),
            Modal::ConfirmDelete { .. } => self.confirm_dialog.handle_key_event(key),
        }
    }

    fn handle_global_key_event(&self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char(c @ '1'..='6') => View::from_shortcut(c).map(Action::SelectView),
            KeyCode::Tab => Some(Action::NextTab),
            KeyCode::BackTab => Some(Action::PrevTab),
            KeyCode::Char('E') => Some(Action::OpenRunEval(None)),
            KeyCode::Char('R') => Some(Action::Refresh),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('q') => Some(Action::OpenQuitDialog),
            _ => None,
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area),
            Modal::Help => self.help_dialog.draw(frame, area),
            Modal::RunEval => self.run_eval.draw(frame, area),
            Modal::ConfirmDelete { .. } => self.confirm_dialog.draw(frame, area),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn mount(&mut self, fetcher: &mut Fetcher, now: Instant) -> Result<()> {
        self.active().mount(fetcher, now)
    }

    fn captures_input(&self) -> bool {
        self.active_ref().captures_input()
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::ForceQuit));
        }

        if let Some(modal) = self.modals.top().cloned() {
            return self.handle_modal_key_event(&modal, key);
        }

        if self.active_ref().captures_input() {
            return self.active().handle_key_event(key);
        }

        match self.handle_global_key_event(key) {
            Some(action) => Ok(Some(action)),
            None => self.active().handle_key_event(key),
        }
    }

    fn update(&mut self, action: Action, fetcher: &mut Fetcher) -> Result<Option<Action>> {
        if action != Action::Tick {
            tracing::debug!("action: {}", action);
        }

        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                let now = Instant::now();
                let mut follow_ups = Vec::new();
                for completion in fetcher.drain() {
                    follow_ups.extend(self.route(completion, fetcher)?);
                }
                follow_ups.extend(self.active().tick(fetcher, now)?);
                if self.run_eval.is_open() {
                    if let Some(Action::CloseModal) = self.run_eval.tick(fetcher, now)? {
                        if self.modals.top() == Some(&Modal::RunEval) {
                            self.close_modal();
                        } else {
                            self.run_eval.close();
                        }
                    }
                }
                for action in follow_ups {
                    self.dispatch(action, fetcher)?;
                }
            }
            Action::ForceQuit => {
                self.should_quit = true;
            }
            Action::Resize(_, _) => {}

            // ─────────────────────────────────────────────────────────────────
            // Navigation
            // ─────────────────────────────────────────────────────────────────
            Action::SelectView(view) => self.switch_view(view, fetcher)?,
            Action::NextTab => self.switch_view(self.view.next(), fetcher)?,
            Action::PrevTab => self.switch_view(self.view.prev(), fetcher)?,
            Action::ExploreDataset(use_case_id) => {
                self.active().unmount();
                self.explorer.set_use_case(use_case_id);
                self.view = View::Explorer;
                self.explorer.mount(fetcher, Instant::now())?;
            }
            Action::Back => {
                if self.view == View::Explorer {
                    self.switch_view(View::UseCases, fetcher)?;
                }
            }
            Action::Refresh => {
                return self.active().update(Action::Refresh, fetcher);
            }

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                if !self.modals.contains(&Modal::QuitConfirm) {
                    self.modals.push(Modal::QuitConfirm);
                }
            }
            Action::OpenHelp => {
                if !self.modals.contains(&Modal::Help) {
                    self.help_dialog.reset();
                    self.modals.push(Modal::Help);
                }
            }
            Action::OpenRunEval(use_case) => {
                if !self.modals.contains(&Modal::RunEval) {
                    self.run_eval.open(use_case, fetcher);
                    self.modals.push(Modal::RunEval);
                }
            }
            Action::CloseModal => self.close_modal(),
            Action::ConfirmModal => match self.modals.top().cloned() {
                Some(Modal::RunEval) => {
                    return self.run_eval.update(Action::ConfirmModal, fetcher);
                }
                Some(Modal::ConfirmDelete {
                    use_case_id,
                    prompt_id,
                    ..
                }) => {
                    self.modals.pop();
                    return Ok(Some(Action::DeletePrompt {
                        use_case_id,
                        prompt_id,
                    }));
                }
                _ => {}
            },

            // ─────────────────────────────────────────────────────────────────
            // Prompts
            // ─────────────────────────────────────────────────────────────────
            Action::NewPrompt | Action::DeletePrompt { .. } => {
                return self.prompts.update(action, fetcher);
            }
            Action::RequestDeletePrompt {
                use_case_id,
                prompt_id,
                name,
            } => {
                self.confirm_dialog.set_prompt_name(name.clone());
                self.modals.push(Modal::ConfirmDelete {
                    use_case_id,
                    prompt_id,
                    name,
                });
            }
            Action::EditPrompt(field) => {
                self.pending_edit = self.prompts.edit_request(field);
            }

            // ─────────────────────────────────────────────────────────────────
            // Status
            // ─────────────────────────────────────────────────────────────────
            Action::SetStatus(message) => {
                tracing::info!("{}", message);
                self.status_message = Some(message);
            }
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = calculate_main_layout(area);

        // Tab bar
        let titles: Vec<Line> = View::tabs()
            .iter()
            .enumerate()
            .map(|(i, view)| Line::from(format!("{} {}", i + 1, view.name())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.view.tab_index())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" SLM Evaluation ")
                    .title_style(
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .style(Style::default().fg(Color::Gray))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, layout.tabs);

        // Active view
        self.active().draw(frame, layout.content)?;

        // Status bar
        let mut status_spans = vec![Span::styled(
            format!(" {} ", self.view.name()),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(message) = &self.status_message {
            status_spans.push(Span::styled(
                format!(" {}", message),
                Style::default().fg(Color::Green),
            ));
        }
        status_spans.push(Span::styled(
            format!("  {}", self.api_base_url),
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(Line::from(status_spans)), layout.status);

        // Help bar
        let mut help_spans = Vec::new();
        let view_hints = self.active_ref().key_hints();
        let global_hints: &[(&str, &str)] = if self.active_ref().captures_input() {
            &[]
        } else {
            &GLOBAL_HINTS
        };
        for (key, description) in view_hints.iter().chain(global_hints.iter()) {
            help_spans.push(Span::styled(
                format!(" {} ", key),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
            help_spans.push(Span::raw(format!("{}  ", description)));
        }
        let help = Paragraph::new(Line::from(help_spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(help, layout.help);

        // Modals, bottom to top
        let modals: Vec<Modal> = self.modals.iter().cloned().collect();
        for modal in &modals {
            self.draw_modal(frame, area, modal)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{char_key, key, render, screen_contains};
    use crate::model::ui::PromptField;
    use crate::model::{EvalStarted, Job, Prompt, UseCase};
    use crate::services::fetcher::testing::StubApi;
    use crate::services::{ApiError, Payload, Request};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn catalog() -> Vec<UseCase> {
        vec![UseCase {
            id: "GKH".to_string(),
            name: "General Knowledge".to_string(),
            dataset_count: 2,
            prompts: vec![
                Prompt {
                    id: Some("p1".to_string()),
                    name: "Default".to_string(),
                    is_default: true,
                    ..Default::default()
                },
                Prompt {
                    id: Some("p2".to_string()),
                    name: "Terse".to_string(),
                    cot_content: "be brief".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }]
    }

    fn backend() -> Arc<StubApi> {
        StubApi::new(|request| match request {
            Request::UseCases => Ok(Payload::UseCases(catalog())),
            Request::Models => Ok(Payload::Models(vec!["gemma:2b".to_string()])),
            Request::Jobs => Ok(Payload::Jobs(vec![Job {
                id: "job-1".to_string(),
                status: "running".to_string(),
                ..Default::default()
            }])),
            Request::Results => Ok(Payload::Results(Vec::new())),
            Request::Samples { .. } => Ok(Payload::Samples(vec![json!({"q": "why"})])),
            Request::Evaluate(_) => Ok(Payload::EvaluationStarted(EvalStarted {
                status: "pending".to_string(),
                job_id: "job-7".to_string(),
            })),
            Request::DeletePrompt { .. } => Ok(Payload::Deleted),
            Request::CreatePrompt { prompt, .. } | Request::UpdatePrompt { prompt, .. } => {
                Ok(Payload::Prompt(prompt.clone()))
            }
        })
    }

    fn started(api: Arc<StubApi>) -> (App, Fetcher) {
        let mut fetcher = Fetcher::inline(api);
        let mut app = App::new(&Config::default());
        app.mount(&mut fetcher, Instant::now()).unwrap();
        app.dispatch(Action::Tick, &mut fetcher).unwrap();
        (app, fetcher)
    }

    fn press(app: &mut App, fetcher: &mut Fetcher, event: KeyEvent) {
        if let Some(action) = app.handle_key_event(event).unwrap() {
            app.dispatch(action, fetcher).unwrap();
        }
        app.dispatch(Action::Tick, fetcher).unwrap();
    }

    fn count(api: &StubApi, wanted: &Request) -> usize {
        api.calls().iter().filter(|r| *r == wanted).count()
    }

    #[test]
    fn test_digit_keys_switch_views_and_fetch_on_mount() {
        let api = backend();
        let (mut app, mut fetcher) = started(api.clone());
        assert_eq!(app.view, View::Dashboard);
        assert_eq!(count(&api, &Request::UseCases), 1);

        press(&mut app, &mut fetcher, char_key('5'));
        assert_eq!(app.view, View::Results);
        assert_eq!(count(&api, &Request::Results), 1);

        press(&mut app, &mut fetcher, key(KeyCode::Tab));
        assert_eq!(app.view, View::Visualizer);
        press(&mut app, &mut fetcher, key(KeyCode::Tab));
        assert_eq!(app.view, View::Dashboard);
    }

    #[test]
    fn test_leaving_activity_stops_polling() {
        let api = backend();
        let (mut app, mut fetcher) = started(api.clone());

        press(&mut app, &mut fetcher, char_key('4'));
        assert_eq!(count(&api, &Request::Jobs), 1);
        assert_eq!(app.activity.jobs().len(), 1);

        press(&mut app, &mut fetcher, char_key('1'));
        assert!(!app.activity.is_polling());
        assert!(app.activity.jobs().is_empty());
        app.activity
            .tick(&mut fetcher, Instant::now() + Duration::from_secs(60))
            .unwrap();
        assert_eq!(count(&api, &Request::Jobs), 1);
    }

    #[test]
    fn test_run_evaluation_from_use_case_list() {
        let api = backend();
        let (mut app, mut fetcher) = started(api.clone());
        press(&mut app, &mut fetcher, char_key('2'));

        press(&mut app, &mut fetcher, key(KeyCode::Enter));
        assert_eq!(app.modals.top(), Some(&Modal::RunEval));
        assert_eq!(app.run_eval.selected_model(), Some("gemma:2b"));

        press(&mut app, &mut fetcher, key(KeyCode::Enter));
        assert_eq!(
            app.status_message.as_deref(),
            Some("Started job job-7 for gemma:2b on GKH")
        );
        // Still showing the confirmation until the close delay passes
        assert_eq!(app.modals.top(), Some(&Modal::RunEval));
    }

    #[test]
    fn test_global_shortcut_opens_dialog_with_use_case_picker() {
        let api = backend();
        let (mut app, mut fetcher) = started(api.clone());

        press(&mut app, &mut fetcher, char_key('E'));
        assert_eq!(app.modals.top(), Some(&Modal::RunEval));
        assert_eq!(
            app.run_eval.selected_use_case().map(|u| u.id.as_str()),
            Some("GKH")
        );

        press(&mut app, &mut fetcher, key(KeyCode::Esc));
        assert!(app.modals.is_empty());
        assert!(!app.run_eval.is_open());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let api = backend();
        let (mut app, mut fetcher) = started(api.clone());
        press(&mut app, &mut fetcher, char_key('3'));
        press(&mut app, &mut fetcher, char_key('l'));
        press(&mut app, &mut fetcher, char_key('j'));

        press(&mut app, &mut fetcher, char_key('d'));
        assert!(matches!(app.modals.top(), Some(Modal::ConfirmDelete { .. })));
        let delete = Request::DeletePrompt {
            use_case_id: "GKH".to_string(),
            prompt_id: "p2".to_string(),
        };
        assert_eq!(count(&api, &delete), 0);

        press(&mut app, &mut fetcher, char_key('y'));
        assert!(app.modals.is_empty());
        assert_eq!(count(&api, &delete), 1);
        assert_eq!(app.status_message.as_deref(), Some("Deleted prompt p2"));
    }

    #[test]
    fn test_edit_request_and_finish() {
        let api = backend();
        let (mut app, mut fetcher) = started(api.clone());
        press(&mut app, &mut fetcher, char_key('3'));
        press(&mut app, &mut fetcher, char_key('l'));
        press(&mut app, &mut fetcher, char_key('j'));

        press(&mut app, &mut fetcher, char_key('c'));
        let edit = app.pending_edit.take().unwrap();
        assert_eq!(edit.field, PromptField::ChainOfThought);
        assert_eq!(edit.original_text(), "be brief");

        app.finish_edit(&edit, "be brief\n", &mut fetcher);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Chain of Thought unchanged")
        );

        app.finish_edit(&edit, "think step by step", &mut fetcher);
        assert!(api
            .calls()
            .iter()
            .any(|r| matches!(r, Request::UpdatePrompt { prompt, .. } if prompt.cot_content == "think step by step")));
    }

    #[test]
    fn test_search_input_swallows_global_keys() {
        let api = backend();
        let (mut app, mut fetcher) = started(api);
        press(&mut app, &mut fetcher, char_key('5'));

        press(&mut app, &mut fetcher, char_key('/'));
        assert!(app.captures_input());
        press(&mut app, &mut fetcher, char_key('1'));
        press(&mut app, &mut fetcher, char_key('q'));
        assert_eq!(app.view, View::Results);
        assert!(app.modals.is_empty());
    }

    #[test]
    fn test_explore_and_back() {
        let api = backend();
        let (mut app, mut fetcher) = started(api.clone());
        press(&mut app, &mut fetcher, char_key('2'));

        press(&mut app, &mut fetcher, char_key('x'));
        assert_eq!(app.view, View::Explorer);
        assert_eq!(
            count(
                &api,
                &Request::Samples {
                    use_case_id: "GKH".to_string()
                }
            ),
            1
        );
        assert_eq!(app.explorer.filtered().len(), 1);

        press(&mut app, &mut fetcher, key(KeyCode::Esc));
        assert_eq!(app.view, View::UseCases);
    }

    #[test]
    fn test_quit_paths() {
        let (mut app, mut fetcher) = started(backend());

        press(&mut app, &mut fetcher, char_key('q'));
        assert_eq!(app.modals.top(), Some(&Modal::QuitConfirm));
        press(&mut app, &mut fetcher, char_key('n'));
        assert!(!app.should_quit);

        press(&mut app, &mut fetcher, char_key('?'));
        press(
            &mut app,
            &mut fetcher,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_unreachable_backend_keeps_running() {
        let (mut app, mut fetcher) = started(StubApi::new(|_| {
            Err(ApiError::Transport("connection refused".to_string()))
        }));
        press(&mut app, &mut fetcher, char_key('2'));
        assert_eq!(app.use_cases.use_cases().len(), 1);

        let screen = render(&mut app, 120, 30);
        assert!(screen_contains(&screen, "[offline]"));
    }

    #[test]
    fn test_render_tabs_and_hints() {
        let (mut app, _fetcher) = started(backend());
        let screen = render(&mut app, 140, 30);
        assert!(screen_contains(&screen, "1 Dashboard"));
        assert!(screen_contains(&screen, "6 Visualizer"));
        assert!(screen_contains(&screen, "Run eval"));
        assert!(screen_contains(&screen, "http://localhost:8000"));
    }
}
