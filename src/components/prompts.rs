//! Prompt manager
//!
//! Browse each use case's prompts, create new custom prompts, and edit or
//! delete the non-default ones. Text is edited in the user's external editor;
//! the main loop owns the terminal hand-off and calls back with the result.

use crate::action::Action;
use crate::component::Component;
use crate::model::ui::PromptField;
use crate::model::{Prompt, UseCase};
use crate::services::{Completion, Fetcher, Origin, Payload, Request, Tickets};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;

/// Which list has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptPane {
    #[default]
    UseCases,
    Prompts,
}

/// A prompt section handed to the external editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptEdit {
    pub use_case_id: String,
    pub prompt_id: String,
    pub prompt: Prompt,
    pub field: PromptField,
}

impl PromptEdit {
    pub fn original_text(&self) -> &str {
        match self.field {
            PromptField::ChainOfThought => &self.prompt.cot_content,
            PromptField::FewShot => &self.prompt.few_shot_content,
        }
    }

    /// The full prompt with `text` swapped in, or `None` when nothing changed.
    ///
    /// A single trailing newline added by the editor is not a change.
    pub fn with_text(&self, text: &str) -> Option<Prompt> {
        let original = self.original_text();
        let text = if original.ends_with('\n') {
            text
        } else {
            text.strip_suffix('\n').unwrap_or(text)
        };
        if text == original {
            return None;
        }

        let mut prompt = self.prompt.clone();
        match self.field {
            PromptField::ChainOfThought => prompt.cot_content = text.to_string(),
            PromptField::FewShot => prompt.few_shot_content = text.to_string(),
        }
        Some(prompt)
    }
}

#[derive(Default)]
pub struct PromptsComponent {
    use_cases: Vec<UseCase>,
    use_case_state: ListState,
    prompt_state: ListState,
    focus: PromptPane,
    loading: bool,
    /// Prompt to select once the next catalog arrives
    select_after_refresh: Option<String>,
    tickets: Tickets,
}

impl PromptsComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_use_case(&self) -> Option<&UseCase> {
        self.use_case_state
            .selected()
            .and_then(|i| self.use_cases.get(i))
    }

    pub fn selected_prompt(&self) -> Option<&Prompt> {
        let use_case = self.selected_use_case()?;
        self.prompt_state
            .selected()
            .and_then(|i| use_case.prompts.get(i))
    }

    fn fetch(&mut self, fetcher: &mut Fetcher) {
        self.loading = true;
        self.tickets.spawn(fetcher, Origin::Prompts, Request::UseCases);
    }

    /// Replace the catalog, keeping the selected use case and prompt by id
    fn set_use_cases(&mut self, use_cases: Vec<UseCase>) {
        let previous_use_case = self.selected_use_case().map(|u| u.id.clone());
        let previous_prompt = self
            .select_after_refresh
            .take()
            .or_else(|| self.selected_prompt().and_then(|p| p.id.clone()));

        self.use_cases = use_cases;

        let use_case_index = previous_use_case
            .and_then(|id| self.use_cases.iter().position(|u| u.id == id))
            .or(if self.use_cases.is_empty() { None } else { Some(0) });
        self.use_case_state.select(use_case_index);

        let prompt_index = self.selected_use_case().and_then(|use_case| {
            previous_prompt
                .and_then(|id| {
                    use_case
                        .prompts
                        .iter()
                        .position(|p| p.id.as_deref() == Some(id.as_str()))
                })
                .or(if use_case.prompts.is_empty() { None } else { Some(0) })
        });
        self.prompt_state.select(prompt_index);
    }

    fn move_use_case(&mut self, forward: bool) {
        if self.use_cases.is_empty() {
            return;
        }
        let current = self.use_case_state.selected().unwrap_or(0);
        let next = if forward {
            (current + 1).min(self.use_cases.len() - 1)
        } else {
            current.saturating_sub(1)
        };
        if Some(next) != self.use_case_state.selected() {
            self.use_case_state.select(Some(next));
            let has_prompts = self
                .selected_use_case()
                .is_some_and(|u| !u.prompts.is_empty());
            self.prompt_state.select(if has_prompts { Some(0) } else { None });
        }
    }

    fn move_prompt(&mut self, forward: bool) {
        let Some(count) = self.selected_use_case().map(|u| u.prompts.len()) else {
            return;
        };
        if count == 0 {
            return;
        }
        let current = self.prompt_state.selected().unwrap_or(0);
        let next = if forward {
            (current + 1).min(count - 1)
        } else {
            current.saturating_sub(1)
        };
        self.prompt_state.select(Some(next));
    }

    /// The selected prompt, when it may be edited or deleted
    fn editable_prompt(&self) -> Option<(&UseCase, &Prompt, String)> {
        let use_case = self.selected_use_case()?;
        let prompt = self.selected_prompt()?;
        if !prompt.is_editable() {
            return None;
        }
        let prompt_id = prompt.id.clone()?;
        Some((use_case, prompt, prompt_id))
    }

    /// Build an editor hand-off for the selected prompt
    pub fn edit_request(&self, field: PromptField) -> Option<PromptEdit> {
        let (use_case, prompt, prompt_id) = self.editable_prompt()?;
        Some(PromptEdit {
            use_case_id: use_case.id.clone(),
            prompt_id,
            prompt: prompt.clone(),
            field,
        })
    }

    /// Send edited text back to the backend. Returns false when unchanged.
    pub fn save_edit(&mut self, edit: &PromptEdit, text: &str, fetcher: &mut Fetcher) -> bool {
        let Some(prompt) = edit.with_text(text) else {
            tracing::debug!("Prompt {} unchanged after editing", edit.prompt_id);
            return false;
        };
        self.tickets.spawn(
            fetcher,
            Origin::Prompts,
            Request::UpdatePrompt {
                use_case_id: edit.use_case_id.clone(),
                prompt_id: edit.prompt_id.clone(),
                prompt,
            },
        );
        true
    }
}

impl Component for PromptsComponent {
    fn mount(&mut self, fetcher: &mut Fetcher, _now: Instant) -> Result<()> {
        self.fetch(fetcher);
        Ok(())
    }

    fn unmount(&mut self) {
        *self = Self::default();
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('h') | KeyCode::Left => {
                self.focus = PromptPane::UseCases;
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.focus = PromptPane::Prompts;
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                match self.focus {
                    PromptPane::UseCases => self.move_use_case(true),
                    PromptPane::Prompts => self.move_prompt(true),
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                match self.focus {
                    PromptPane::UseCases => self.move_use_case(false),
                    PromptPane::Prompts => self.move_prompt(false),
                }
                None
            }
            KeyCode::Char('n') if self.selected_use_case().is_some() => Some(Action::NewPrompt),
            KeyCode::Char('d') => {
                self.editable_prompt()
                    .map(|(use_case, prompt, prompt_id)| Action::RequestDeletePrompt {
                        use_case_id: use_case.id.clone(),
                        prompt_id,
                        name: prompt.name.clone(),
                    })
            }
            KeyCode::Char('c') if self.editable_prompt().is_some() => {
                Some(Action::EditPrompt(PromptField::ChainOfThought))
            }
            KeyCode::Char('f') if self.editable_prompt().is_some() => {
                Some(Action::EditPrompt(PromptField::FewShot))
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action, fetcher: &mut Fetcher) -> Result<Option<Action>> {
        match action {
            Action::Refresh => self.fetch(fetcher),
            Action::NewPrompt => {
                if let Some(use_case_id) = self.selected_use_case().map(|u| u.id.clone()) {
                    self.tickets.spawn(
                        fetcher,
                        Origin::Prompts,
                        Request::CreatePrompt {
                            use_case_id,
                            prompt: Prompt::new_custom(),
                        },
                    );
                }
            }
            Action::DeletePrompt {
                use_case_id,
                prompt_id,
            } => {
                self.tickets.spawn(
                    fetcher,
                    Origin::Prompts,
                    Request::DeletePrompt {
                        use_case_id,
                        prompt_id,
                    },
                );
            }
            _ => {}
        }
        Ok(None)
    }

    fn apply(&mut self, completion: Completion, fetcher: &mut Fetcher) -> Result<Option<Action>> {
        if !self.tickets.redeem(completion.id) {
            return Ok(None);
        }

        let Completion {
            request, result, ..
        } = completion;

        match (request, result) {
            (Request::UseCases, Ok(Payload::UseCases(use_cases))) => {
                self.loading = false;
                self.set_use_cases(use_cases);
            }
            (Request::UseCases, Err(e)) => {
                self.loading = false;
                tracing::error!("Failed to fetch prompts: {}", e);
                self.set_use_cases(Vec::new());
            }
            (Request::CreatePrompt { .. }, Ok(Payload::Prompt(prompt))) => {
                self.select_after_refresh = prompt.id.clone();
                self.fetch(fetcher);
                return Ok(Some(Action::SetStatus(format!("Created '{}'", prompt.name))));
            }
            (Request::UpdatePrompt { .. }, Ok(Payload::Prompt(prompt))) => {
                self.fetch(fetcher);
                return Ok(Some(Action::SetStatus(format!("Saved '{}'", prompt.name))));
            }
            (Request::DeletePrompt { prompt_id, .. }, Ok(Payload::Deleted)) => {
                self.fetch(fetcher);
                return Ok(Some(Action::SetStatus(format!("Deleted prompt {}", prompt_id))));
            }
            (request, Err(e)) => {
                tracing::error!("{} failed: {}", request.describe(), e);
            }
            (request, Ok(other)) => {
                tracing::warn!("{} returned unexpected payload: {:?}", request.describe(), other);
            }
        }
        Ok(None)
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        let mut hints = vec![("h/l", "Pane"), ("j/k", "Select"), ("n", "New prompt")];
        if self.editable_prompt().is_some() {
            hints.push(("c", "Edit CoT"));
            hints.push(("f", "Edit few-shot"));
            hints.push(("d", "Delete"));
        }
        hints
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(50),
            ])
            .split(area);

        let focused = |pane: PromptPane| {
            if self.focus == pane {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };
        let highlight = Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let use_case_title = if self.loading {
            " Use Cases (loading...) ".to_string()
        } else {
            format!(" Use Cases ({}) ", self.use_cases.len())
        };
        let use_case_items: Vec<ListItem> = self
            .use_cases
            .iter()
            .map(|u| ListItem::new(u.name.clone()))
            .collect();
        let use_case_list = List::new(use_case_items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(use_case_title)
                    .border_style(focused(PromptPane::UseCases)),
            )
            .highlight_style(highlight)
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(use_case_list, chunks[0], &mut self.use_case_state);

        let prompt_items: Vec<ListItem> = self
            .selected_use_case()
            .map(|u| {
                u.prompts
                    .iter()
                    .map(|p| {
                        let (tag, color) = if p.is_default {
                            ("default", Color::DarkGray)
                        } else {
                            ("custom", Color::Green)
                        };
                        ListItem::new(Line::from(vec![
                            Span::raw(p.name.clone()),
                            Span::styled(format!(" [{}]", tag), Style::default().fg(color)),
                        ]))
                    })
                    .collect()
            })
            .unwrap_or_default();
        let prompt_list = List::new(prompt_items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Prompts ")
                    .border_style(focused(PromptPane::Prompts)),
            )
            .highlight_style(highlight)
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(prompt_list, chunks[1], &mut self.prompt_state);

        let detail = match self.selected_prompt() {
            Some(prompt) => prompt_detail(prompt),
            None => vec![Line::from(Span::styled(
                "No prompt selected",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        let paragraph = Paragraph::new(detail)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Prompt ")
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, chunks[2]);

        Ok(())
    }
}

fn prompt_detail(prompt: &Prompt) -> Vec<Line<'static>> {
    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let empty = Style::default().fg(Color::DarkGray);

    let mut lines = vec![Line::from(Span::styled(
        prompt.name.clone(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))];
    if prompt.is_default {
        lines.push(Line::from(Span::styled("Read-only default prompt", empty)));
    }

    let sections = [
        (PromptField::ChainOfThought.label(), &prompt.cot_content),
        (PromptField::FewShot.label(), &prompt.few_shot_content),
        ("User Prompt Template", &prompt.user_prompt_template),
    ];
    for (title, text) in sections {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(title, heading)));
        if text.is_empty() {
            lines.push(Line::from(Span::styled("(empty)", empty)));
        } else {
            lines.extend(text.lines().map(|l| Line::from(l.to_string())));
        }
    }
    lines
}
