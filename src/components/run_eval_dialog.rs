//! Run evaluation dialog
//!
//! Three-section dialog:
//! 1. Model (from `GET /models`)
//! 2. Use case (only when the dialog was opened without one)
//! 3. Prompt of the chosen use case
//!
//! A successful submission shows the new job id and closes the dialog after
//! a fixed delay, whatever state the job is in.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::{EvalRequest, Prompt, UseCase};
use crate::services::{Completion, Fetcher, Origin, Payload, Request, Tickets};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::ops::Range;
use std::time::{Duration, Instant};

/// How long the success message stays up before the dialog closes
pub const CLOSE_DELAY: Duration = Duration::from_millis(1000);

/// Rows shown per section before the list scrolls
const SECTION_ROWS: usize = 5;

/// Focus section in the run evaluation dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunEvalFocus {
    #[default]
    Model,
    UseCase,
    Prompt,
}

#[derive(Default)]
pub struct RunEvalDialog {
    open: bool,
    /// The use case came with the open request and cannot be changed
    use_case_fixed: bool,
    models: Vec<String>,
    model_index: usize,
    models_loading: bool,
    use_cases: Vec<UseCase>,
    use_case_index: usize,
    use_cases_loading: bool,
    prompt_index: usize,
    focus: RunEvalFocus,
    submitting: bool,
    started_job: Option<String>,
    close_at: Option<Instant>,
    tickets: Tickets,
}

impl RunEvalDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset and start loading choices for a new invocation
    pub fn open(&mut self, use_case: Option<UseCase>, fetcher: &mut Fetcher) {
        *self = Self::default();
        self.open = true;

        self.models_loading = true;
        self.tickets.spawn(fetcher, Origin::RunEval, Request::Models);

        match use_case {
            Some(use_case) => {
                self.use_case_fixed = true;
                self.use_cases = vec![use_case];
            }
            None => {
                self.use_cases_loading = true;
                self.tickets
                    .spawn(fetcher, Origin::RunEval, Request::UseCases);
            }
        }
    }

    /// Drop all state; replies still in flight are ignored
    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    #[cfg(test)]
    pub fn focus(&self) -> RunEvalFocus {
        self.focus
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.models.get(self.model_index).map(String::as_str)
    }

    pub fn selected_use_case(&self) -> Option<&UseCase> {
        self.use_cases.get(self.use_case_index)
    }

    pub fn selected_prompt(&self) -> Option<&Prompt> {
        self.selected_use_case()
            .and_then(|u| u.prompts.get(self.prompt_index))
    }

    /// The request a submit would send, if every part is chosen
    pub fn eval_request(&self) -> Option<EvalRequest> {
        Some(EvalRequest {
            model_name: self.selected_model()?.to_string(),
            use_case_id: self.selected_use_case()?.id.clone(),
            prompt_id: self.selected_prompt()?.id.clone()?,
        })
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && self.close_at.is_none() && self.eval_request().is_some()
    }

    /// Post the evaluation request. Returns false when submitting is disabled.
    pub fn submit(&mut self, fetcher: &mut Fetcher) -> bool {
        if !self.can_submit() {
            return false;
        }
        let Some(request) = self.eval_request() else {
            return false;
        };
        tracing::info!(
            "Submitting evaluation: {} on {} with prompt {}",
            request.model_name,
            request.use_case_id,
            request.prompt_id
        );
        self.submitting = true;
        self.tickets
            .spawn(fetcher, Origin::RunEval, Request::Evaluate(request));
        true
    }

    fn sections(&self) -> Vec<RunEvalFocus> {
        if self.use_case_fixed {
            vec![RunEvalFocus::Model, RunEvalFocus::Prompt]
        } else {
            vec![RunEvalFocus::Model, RunEvalFocus::UseCase, RunEvalFocus::Prompt]
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let sections = self.sections();
        let current = sections.iter().position(|s| *s == self.focus).unwrap_or(0);
        let len = sections.len();
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.focus = sections[next];
    }

    fn move_selection(&mut self, forward: bool) {
        let step = |index: usize, len: usize| -> usize {
            if len == 0 {
                0
            } else if forward {
                (index + 1).min(len - 1)
            } else {
                index.saturating_sub(1)
            }
        };
        match self.focus {
            RunEvalFocus::Model => self.model_index = step(self.model_index, self.models.len()),
            RunEvalFocus::UseCase => {
                let next = step(self.use_case_index, self.use_cases.len());
                if next != self.use_case_index {
                    self.use_case_index = next;
                    self.prompt_index = 0;
                }
            }
            RunEvalFocus::Prompt => {
                let count = self.selected_use_case().map_or(0, |u| u.prompts.len());
                self.prompt_index = step(self.prompt_index, count);
            }
        }
    }
}

impl Component for RunEvalDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.close_at.is_some() {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Enter => Some(Action::CloseModal),
                _ => None,
            });
        }

        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter => Some(Action::ConfirmModal),
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                self.cycle_focus(true);
                None
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.cycle_focus(false);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(true);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(false);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action, fetcher: &mut Fetcher) -> Result<Option<Action>> {
        if action == Action::ConfirmModal {
            self.submit(fetcher);
        }
        Ok(None)
    }

    fn tick(&mut self, _fetcher: &mut Fetcher, now: Instant) -> Result<Option<Action>> {
        match self.close_at {
            Some(deadline) if now >= deadline => Ok(Some(Action::CloseModal)),
            _ => Ok(None),
        }
    }

    fn apply(&mut self, completion: Completion, _fetcher: &mut Fetcher) -> Result<Option<Action>> {
        if !self.tickets.redeem(completion.id) {
            return Ok(None);
        }

        match (completion.request, completion.result) {
            (Request::Models, result) => {
                self.models_loading = false;
                self.model_index = 0;
                match result {
                    Ok(Payload::Models(models)) => self.models = models,
                    Ok(other) => tracing::warn!("Model list ignored unexpected payload: {:?}", other),
                    Err(e) => {
                        tracing::error!("Failed to fetch models: {}", e);
                        self.models.clear();
                    }
                }
            }
            (Request::UseCases, result) => {
                self.use_cases_loading = false;
                self.use_case_index = 0;
                self.prompt_index = 0;
                match result {
                    Ok(Payload::UseCases(use_cases)) => self.use_cases = use_cases,
                    Ok(other) => {
                        tracing::warn!("Use case picker ignored unexpected payload: {:?}", other)
                    }
                    Err(e) => {
                        tracing::error!("Failed to fetch use cases for evaluation: {}", e);
                        self.use_cases.clear();
                    }
                }
            }
            (Request::Evaluate(request), result) => {
                self.submitting = false;
                match result {
                    Ok(Payload::EvaluationStarted(started)) => {
                        tracing::info!(
                            "Evaluation job {} started ({})",
                            started.job_id,
                            started.status
                        );
                        self.close_at = Some(Instant::now() + CLOSE_DELAY);
                        let message = format!(
                            "Started job {} for {} on {}",
                            started.job_id, request.model_name, request.use_case_id
                        );
                        self.started_job = Some(started.job_id);
                        return Ok(Some(Action::SetStatus(message)));
                    }
                    Ok(other) => tracing::warn!("Evaluate returned unexpected payload: {:?}", other),
                    Err(e) => tracing::error!("Failed to start evaluation: {}", e),
                }
            }
            (request, _) => tracing::warn!("Run dialog ignored reply to {}", request.describe()),
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_area = centered_popup(area, 64, 26);
        frame.render_widget(Clear, popup_area);

        let mut content = vec![Line::from("")];

        if let Some(job_id) = &self.started_job {
            content.push(Line::from(Span::styled(
                "✓ Evaluation started",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
            content.push(Line::from(""));
            content.push(Line::from(vec![
                Span::styled("Job: ", Style::default().fg(Color::DarkGray)),
                Span::styled(job_id.clone(), Style::default().fg(Color::Yellow)),
            ]));
            content.push(Line::from(Span::styled(
                "Follow progress in the Activity view.",
                Style::default().fg(Color::DarkGray),
            )));
            frame.render_widget(dialog(content), popup_area);
            return Ok(());
        }

        // Model section
        content.push(section_header("─ Model ─", self.focus == RunEvalFocus::Model));
        if self.models_loading {
            content.push(placeholder("Loading models..."));
        } else if self.models.is_empty() {
            content.push(placeholder("No models available"));
        } else {
            let focused = self.focus == RunEvalFocus::Model;
            for i in window(self.models.len(), self.model_index, SECTION_ROWS) {
                content.push(choice(&self.models[i], i == self.model_index, focused));
            }
        }
        content.push(Line::from(""));

        // Use case section
        content.push(section_header(
            "─ Use Case ─",
            self.focus == RunEvalFocus::UseCase,
        ));
        if self.use_case_fixed {
            if let Some(use_case) = self.selected_use_case() {
                content.push(Line::from(Span::styled(
                    format!("  {}", use_case.name),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )));
            }
        } else if self.use_cases_loading {
            content.push(placeholder("Loading use cases..."));
        } else if self.use_cases.is_empty() {
            content.push(placeholder("No use cases available"));
        } else {
            let focused = self.focus == RunEvalFocus::UseCase;
            for i in window(self.use_cases.len(), self.use_case_index, SECTION_ROWS) {
                content.push(choice(
                    &self.use_cases[i].name,
                    i == self.use_case_index,
                    focused,
                ));
            }
        }
        content.push(Line::from(""));

        // Prompt section
        content.push(section_header("─ Prompt ─", self.focus == RunEvalFocus::Prompt));
        let prompts = self
            .selected_use_case()
            .map(|u| u.prompts.as_slice())
            .unwrap_or_default();
        if prompts.is_empty() {
            content.push(placeholder("No prompts"));
        } else {
            let focused = self.focus == RunEvalFocus::Prompt;
            for i in window(prompts.len(), self.prompt_index, SECTION_ROWS) {
                content.push(choice(&prompts[i].name, i == self.prompt_index, focused));
            }
        }
        content.push(Line::from(""));

        let (submit_label, submit_style) = if self.submitting {
            ("[ Submitting... ]", Style::default().fg(Color::Yellow))
        } else if self.can_submit() {
            (
                "[ Start Evaluation ]",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            ("[ Start Evaluation ]", Style::default().fg(Color::DarkGray))
        };
        content.push(Line::from(Span::styled(submit_label, submit_style)));
        content.push(Line::from(""));

        content.push(Line::from(vec![
            Span::styled(
                " Tab ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("Switch  "),
            Span::styled(
                " Enter ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("Start  "),
            Span::styled(
                " Esc ",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("Cancel"),
        ]));

        frame.render_widget(dialog(content), popup_area);
        Ok(())
    }
}

fn dialog(content: Vec<Line<'static>>) -> Paragraph<'static> {
    Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Run Evaluation ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
    )
}

fn section_header(title: &'static str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(Span::styled(title, style))
}

fn placeholder(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {}", text),
        Style::default().fg(Color::DarkGray),
    ))
}

fn choice(label: &str, selected: bool, focused: bool) -> Line<'static> {
    let prefix = if selected && focused {
        "▶ "
    } else if selected {
        "● "
    } else {
        "  "
    };
    let style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(Span::styled(format!("{}{}", prefix, label), style))
}

/// Indices of at most `rows` items, keeping `selected` visible
fn window(len: usize, selected: usize, rows: usize) -> Range<usize> {
    if len <= rows {
        return 0..len;
    }
    let start = selected.saturating_sub(rows - 1).min(len - rows);
    start..start + rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{char_key, key, pump, render, screen_contains};
    use crate::model::EvalStarted;
    use crate::services::fetcher::testing::StubApi;
    use crate::services::ApiError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn prompt(id: &str, name: &str) -> Prompt {
        Prompt {
            id: Some(id.to_string()),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn use_case() -> UseCase {
        UseCase {
            id: "GKH".to_string(),
            name: "General Knowledge".to_string(),
            prompts: vec![prompt("P1", "Default"), prompt("P2", "Terse")],
            ..Default::default()
        }
    }

    fn backend(evaluate_ok: Arc<AtomicBool>) -> Arc<StubApi> {
        StubApi::new(move |request| match request {
            Request::Models => Ok(Payload::Models(vec![
                "gemma:2b".to_string(),
                "llama3".to_string(),
            ])),
            Request::UseCases => Ok(Payload::UseCases(vec![
                use_case(),
                UseCase {
                    id: "CG".to_string(),
                    name: "Code".to_string(),
                    prompts: vec![prompt("P9", "Code prompt")],
                    ..Default::default()
                },
            ])),
            Request::Evaluate(_) if evaluate_ok.load(Ordering::SeqCst) => {
                Ok(Payload::EvaluationStarted(EvalStarted {
                    status: "pending".to_string(),
                    job_id: "job-42".to_string(),
                }))
            }
            _ => Err(ApiError::Status(500, "boom".to_string())),
        })
    }

    fn opened(
        use_case: Option<UseCase>,
        evaluate_ok: bool,
    ) -> (RunEvalDialog, Fetcher, Arc<StubApi>) {
        let api = backend(Arc::new(AtomicBool::new(evaluate_ok)));
        let mut fetcher = Fetcher::inline(api.clone());
        let mut dialog = RunEvalDialog::new();
        dialog.open(use_case, &mut fetcher);
        pump(&mut dialog, &mut fetcher);
        (dialog, fetcher, api)
    }

    fn posted(api: &StubApi) -> Vec<EvalRequest> {
        api.calls()
            .into_iter()
            .filter_map(|r| match r {
                Request::Evaluate(body) => Some(body),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_defaults_to_first_model_and_prompt() {
        let (dialog, _fetcher, api) = opened(Some(use_case()), true);

        assert_eq!(dialog.selected_model(), Some("gemma:2b"));
        assert_eq!(
            dialog.selected_prompt().and_then(|p| p.id.as_deref()),
            Some("P1")
        );
        assert!(dialog.can_submit());
        // A supplied use case is not fetched again
        assert_eq!(api.calls(), vec![Request::Models]);
    }

    #[test]
    fn test_selecting_second_prompt_posts_its_id() {
        let (mut dialog, mut fetcher, api) = opened(Some(use_case()), true);

        dialog.handle_key_event(key(KeyCode::Tab)).unwrap();
        assert_eq!(dialog.focus(), RunEvalFocus::Prompt);
        dialog.handle_key_event(char_key('j')).unwrap();

        let action = dialog.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(action, Some(Action::ConfirmModal));
        dialog.update(Action::ConfirmModal, &mut fetcher).unwrap();

        assert_eq!(
            posted(&api),
            vec![EvalRequest {
                model_name: "gemma:2b".to_string(),
                use_case_id: "GKH".to_string(),
                prompt_id: "P2".to_string(),
            }]
        );
    }

    #[test]
    fn test_closes_one_second_after_success() {
        let (mut dialog, mut fetcher, _api) = opened(Some(use_case()), true);

        let before = Instant::now();
        assert!(dialog.submit(&mut fetcher));
        let actions = pump(&mut dialog, &mut fetcher);
        assert!(matches!(actions.as_slice(), [Action::SetStatus(msg)] if msg.contains("job-42")));
        assert!(!dialog.can_submit());

        assert_eq!(
            dialog
                .tick(&mut fetcher, before + Duration::from_millis(999))
                .unwrap(),
            None
        );
        assert_eq!(
            dialog
                .tick(&mut fetcher, Instant::now() + CLOSE_DELAY)
                .unwrap(),
            Some(Action::CloseModal)
        );
    }

    #[test]
    fn test_failure_keeps_dialog_open_and_reenables_submit() {
        let (mut dialog, mut fetcher, api) = opened(Some(use_case()), false);

        assert!(dialog.submit(&mut fetcher));
        let actions = pump(&mut dialog, &mut fetcher);
        assert!(actions.is_empty());
        assert!(dialog.is_open());
        assert!(dialog.can_submit());
        assert_eq!(
            dialog
                .tick(&mut fetcher, Instant::now() + Duration::from_secs(10))
                .unwrap(),
            None
        );

        assert!(dialog.submit(&mut fetcher));
        assert_eq!(posted(&api).len(), 2);
    }

    #[test]
    fn test_submit_disabled_while_in_flight() {
        let (mut dialog, mut fetcher, api) = opened(Some(use_case()), true);
        assert!(dialog.submit(&mut fetcher));
        assert!(!dialog.submit(&mut fetcher));
        assert_eq!(posted(&api).len(), 1);
    }

    #[test]
    fn test_prompt_without_id_cannot_be_submitted() {
        let mock = UseCase::mock_catalog().remove(0);
        let (mut dialog, mut fetcher, api) = opened(Some(mock), true);

        assert!(dialog.selected_prompt().is_some());
        assert!(!dialog.can_submit());
        assert!(!dialog.submit(&mut fetcher));
        assert!(posted(&api).is_empty());
    }

    #[test]
    fn test_picker_without_use_case_preselects_first_prompt() {
        let (mut dialog, _fetcher, _api) = opened(None, true);

        assert_eq!(dialog.selected_use_case().map(|u| u.id.as_str()), Some("GKH"));
        dialog.handle_key_event(key(KeyCode::Tab)).unwrap();
        assert_eq!(dialog.focus(), RunEvalFocus::UseCase);
        dialog.handle_key_event(char_key('j')).unwrap();
        assert_eq!(
            dialog.selected_prompt().and_then(|p| p.id.as_deref()),
            Some("P9")
        );
    }

    #[test]
    fn test_no_models_disables_submit() {
        let api = StubApi::new(|request| match request {
            Request::Models => Err(ApiError::Transport("refused".to_string())),
            _ => Err(ApiError::Status(500, String::new())),
        });
        let mut fetcher = Fetcher::inline(api);
        let mut dialog = RunEvalDialog::new();
        dialog.open(Some(use_case()), &mut fetcher);
        pump(&mut dialog, &mut fetcher);

        assert!(!dialog.can_submit());
        let screen = render(&mut dialog, 80, 30);
        assert!(screen_contains(&screen, "No models available"));
    }

    #[test]
    fn test_window_keeps_selection_visible() {
        assert_eq!(window(3, 2, 5), 0..3);
        assert_eq!(window(10, 0, 5), 0..5);
        assert_eq!(window(10, 7, 5), 3..8);
        assert_eq!(window(10, 9, 5), 5..10);
    }
}
