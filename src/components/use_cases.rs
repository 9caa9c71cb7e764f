//! Use case catalog
//!
//! Lists every use case with its dataset size and prompts. Falls back to a
//! built-in sample catalog when the backend cannot be reached.

use crate::action::Action;
use crate::component::Component;
use crate::components::layout::split_list_detail;
use crate::model::UseCase;
use crate::services::{Completion, Fetcher, Origin, Payload, Request, Tickets};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;

#[derive(Default)]
pub struct UseCasesComponent {
    use_cases: Vec<UseCase>,
    list_state: ListState,
    loading: bool,
    /// True when showing the built-in catalog after a failed fetch
    offline: bool,
    tickets: Tickets,
}

impl UseCasesComponent {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn use_cases(&self) -> &[UseCase] {
        &self.use_cases
    }

    pub fn selected(&self) -> Option<&UseCase> {
        self.list_state
            .selected()
            .and_then(|i| self.use_cases.get(i))
    }

    fn fetch(&mut self, fetcher: &mut Fetcher) {
        self.loading = true;
        self.tickets.spawn(fetcher, Origin::UseCases, Request::UseCases);
    }

    fn set_use_cases(&mut self, use_cases: Vec<UseCase>) {
        let previous = self.selected().map(|u| u.id.clone());
        self.use_cases = use_cases;
        let index = previous
            .and_then(|id| self.use_cases.iter().position(|u| u.id == id))
            .or(if self.use_cases.is_empty() { None } else { Some(0) });
        self.list_state.select(index);
    }

    fn next(&mut self) {
        if self.use_cases.is_empty() {
            return;
        }
        let i = self
            .list_state
            .selected()
            .map(|i| (i + 1).min(self.use_cases.len() - 1))
            .unwrap_or(0);
        self.list_state.select(Some(i));
    }

    fn previous(&mut self) {
        if self.use_cases.is_empty() {
            return;
        }
        let i = self
            .list_state
            .selected()
            .map(|i| i.saturating_sub(1))
            .unwrap_or(0);
        self.list_state.select(Some(i));
    }
}

impl Component for UseCasesComponent {
    fn mount(&mut self, fetcher: &mut Fetcher, _now: Instant) -> Result<()> {
        self.fetch(fetcher);
        Ok(())
    }

    fn unmount(&mut self) {
        self.tickets.clear();
        self.use_cases.clear();
        self.list_state.select(None);
        self.loading = false;
        self.offline = false;
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.previous();
                None
            }
            KeyCode::Enter | KeyCode::Char('r') => {
                self.selected().map(|u| Action::OpenRunEval(Some(u.clone())))
            }
            KeyCode::Char('x') => self.selected().map(|u| Action::ExploreDataset(u.id.clone())),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action, fetcher: &mut Fetcher) -> Result<Option<Action>> {
        if action == Action::Refresh {
            self.fetch(fetcher);
        }
        Ok(None)
    }

    fn apply(&mut self, completion: Completion, _fetcher: &mut Fetcher) -> Result<Option<Action>> {
        if !self.tickets.redeem(completion.id) {
            return Ok(None);
        }
        self.loading = false;

        match completion.result {
            Ok(Payload::UseCases(use_cases)) => {
                self.offline = false;
                self.set_use_cases(use_cases);
            }
            Ok(other) => tracing::warn!("Use case list ignored unexpected payload: {:?}", other),
            Err(e) => {
                tracing::error!("Failed to fetch use cases, showing built-in catalog: {}", e);
                self.offline = true;
                self.set_use_cases(UseCase::mock_catalog());
            }
        }
        Ok(None)
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("j/k", "Select"),
            ("Enter/r", "Run evaluation"),
            ("x", "Explore dataset"),
        ]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let (list_area, detail_area) = split_list_detail(area, 40);

        let items: Vec<ListItem> = self
            .use_cases
            .iter()
            .map(|use_case| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        use_case.name.clone(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!(
                            "  {} items · {} prompts",
                            use_case.dataset_count,
                            use_case.prompts.len()
                        ),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();

        let mut title = format!(" Use Cases ({}) ", self.use_cases.len());
        if self.loading {
            title = " Use Cases (loading...) ".to_string();
        } else if self.offline {
            title = format!(" Use Cases ({}) [offline] ", self.use_cases.len());
        }

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, list_area, &mut self.list_state);

        let detail = match self.selected() {
            Some(use_case) => use_case_detail(use_case),
            None => vec![Line::from(Span::styled(
                "No use case selected",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        let paragraph = Paragraph::new(detail)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Details ")
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, detail_area);

        Ok(())
    }
}

fn use_case_detail(use_case: &UseCase) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            use_case.name.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(use_case.description.clone()),
        Line::from(""),
        Line::from(vec![
            Span::styled("id: ", label),
            Span::styled(use_case.id.clone(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::styled("dataset: ", label),
            Span::raw(format!("{} items", use_case.dataset_count)),
        ]),
    ];
    if let Some(source) = &use_case.dataset_source {
        lines.push(Line::from(vec![
            Span::styled("source: ", label),
            Span::raw(source.clone()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Prompts",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    for prompt in &use_case.prompts {
        let marker = if prompt.is_default { " (default)" } else { "" };
        lines.push(Line::from(vec![
            Span::raw("  • "),
            Span::raw(prompt.name.clone()),
            Span::styled(marker, label),
        ]));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{char_key, key, pump, render, screen_contains};
    use crate::model::Prompt;
    use crate::services::fetcher::testing::StubApi;

    fn catalog() -> Vec<UseCase> {
        vec![
            UseCase {
                id: "GKH".to_string(),
                name: "General Knowledge".to_string(),
                dataset_count: 570,
                prompts: vec![Prompt {
                    id: Some("p1".to_string()),
                    name: "Default".to_string(),
                    is_default: true,
                    ..Default::default()
                }],
                ..Default::default()
            },
            UseCase {
                id: "CG".to_string(),
                name: "Code Generation".to_string(),
                dataset_count: 164,
                ..Default::default()
            },
        ]
    }

    fn mounted(api: std::sync::Arc<StubApi>) -> (UseCasesComponent, Fetcher) {
        let mut fetcher = Fetcher::inline(api);
        let mut view = UseCasesComponent::new();
        view.mount(&mut fetcher, Instant::now()).unwrap();
        pump(&mut view, &mut fetcher);
        (view, fetcher)
    }

    #[test]
    fn test_failed_fetch_falls_back_to_builtin_catalog() {
        let (mut view, _fetcher) = mounted(StubApi::offline());

        assert_eq!(view.use_cases().len(), 1);
        assert_eq!(view.use_cases()[0].id, "GKH");
        assert_eq!(view.use_cases()[0].dataset_count, 570);

        let screen = render(&mut view, 100, 20);
        assert!(screen_contains(&screen, "[offline]"));
        assert!(screen_contains(&screen, "Evaluation Prompt"));
    }

    #[test]
    fn test_enter_opens_run_dialog_for_selection() {
        let (mut view, _fetcher) = mounted(StubApi::new(|_| Ok(Payload::UseCases(catalog()))));

        view.handle_key_event(char_key('j')).unwrap();
        let action = view.handle_key_event(key(KeyCode::Enter)).unwrap();
        match action {
            Some(Action::OpenRunEval(Some(use_case))) => assert_eq!(use_case.id, "CG"),
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_explore_emits_use_case_id() {
        let (mut view, _fetcher) = mounted(StubApi::new(|_| Ok(Payload::UseCases(catalog()))));

        let action = view.handle_key_event(char_key('x')).unwrap();
        assert_eq!(action, Some(Action::ExploreDataset("GKH".to_string())));
    }

    #[test]
    fn test_selection_survives_refresh() {
        let (mut view, mut fetcher) =
            mounted(StubApi::new(|_| Ok(Payload::UseCases(catalog()))));
        view.handle_key_event(char_key('j')).unwrap();

        view.update(Action::Refresh, &mut fetcher).unwrap();
        pump(&mut view, &mut fetcher);
        assert_eq!(view.selected().map(|u| u.id.as_str()), Some("CG"));
    }

    #[test]
    fn test_selection_stops_at_ends() {
        let (mut view, _fetcher) = mounted(StubApi::new(|_| Ok(Payload::UseCases(catalog()))));
        view.handle_key_event(char_key('k')).unwrap();
        assert_eq!(view.selected().map(|u| u.id.as_str()), Some("GKH"));
        for _ in 0..5 {
            view.handle_key_event(char_key('j')).unwrap();
        }
        assert_eq!(view.selected().map(|u| u.id.as_str()), Some("CG"));
    }
}
