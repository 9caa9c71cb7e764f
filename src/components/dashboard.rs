//! Dashboard overview
//!
//! Counts derived from the use case catalog plus the first few use cases.

use crate::action::Action;
use crate::component::Component;
use crate::model::UseCase;
use crate::model::ui::View;
use crate::services::{Completion, Fetcher, Origin, Payload, Request, Tickets};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;

const RECENT_USE_CASES: usize = 3;

/// Aggregate numbers shown in the stat cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogStats {
    pub use_cases: usize,
    pub dataset_items: u64,
    pub prompts: usize,
}

impl CatalogStats {
    pub fn from_use_cases(use_cases: &[UseCase]) -> Self {
        Self {
            use_cases: use_cases.len(),
            dataset_items: use_cases.iter().map(|u| u.dataset_count).sum(),
            prompts: use_cases.iter().map(|u| u.prompts.len()).sum(),
        }
    }
}

#[derive(Default)]
pub struct DashboardComponent {
    use_cases: Vec<UseCase>,
    loading: bool,
    tickets: Tickets,
}

impl DashboardComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats::from_use_cases(&self.use_cases)
    }

    fn fetch(&mut self, fetcher: &mut Fetcher) {
        self.loading = true;
        self.tickets
            .spawn(fetcher, Origin::Dashboard, Request::UseCases);
    }
}

impl Component for DashboardComponent {
    fn mount(&mut self, fetcher: &mut Fetcher, _now: Instant) -> Result<()> {
        self.fetch(fetcher);
        Ok(())
    }

    fn unmount(&mut self) {
        self.tickets.clear();
        self.use_cases.clear();
        self.loading = false;
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Enter => Some(Action::SelectView(View::UseCases)),
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
            Ok(Payload::UseCases(use_cases)) => self.use_cases = use_cases,
            Ok(other) => tracing::warn!("Dashboard ignored unexpected payload: {:?}", other),
            Err(e) => {
                tracing::error!("Failed to load use cases for dashboard: {}", e);
                self.use_cases.clear();
            }
        }
        Ok(None)
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("Enter", "Browse use cases")]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(area);

        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(chunks[0]);

        let stats = self.stats();
        render_stat(frame, cards[0], "Use Cases", stats.use_cases.to_string(), Color::Cyan);
        render_stat(
            frame,
            cards[1],
            "Dataset Items",
            stats.dataset_items.to_string(),
            Color::Green,
        );
        render_stat(frame, cards[2], "Prompts", stats.prompts.to_string(), Color::Magenta);

        let mut lines = Vec::new();
        if self.loading && self.use_cases.is_empty() {
            lines.push(Line::from(Span::styled(
                "Loading use cases...",
                Style::default().fg(Color::DarkGray),
            )));
        } else if self.use_cases.is_empty() {
            lines.push(Line::from(Span::styled(
                "No use cases available.",
                Style::default().fg(Color::DarkGray),
            )));
        }

        for use_case in self.use_cases.iter().take(RECENT_USE_CASES) {
            lines.push(Line::from(vec![
                Span::styled("● ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    use_case.name.clone(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {} items", use_case.dataset_count),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
            if !use_case.description.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {}", use_case.description),
                    Style::default().fg(Color::Gray),
                )));
            }
            lines.push(Line::from(""));
        }

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Recent Use Cases ")
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, chunks[1]);

        Ok(())
    }
}

fn render_stat(frame: &mut Frame, area: Rect, label: &str, value: String, color: Color) {
    let content = vec![
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            label.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(content)
        .alignment(ratatui::layout::Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{pump, render, screen_contains};
    use crate::model::Prompt;
    use crate::services::fetcher::testing::StubApi;

    fn catalog() -> Vec<UseCase> {
        (0..4)
            .map(|i| UseCase {
                id: format!("UC{}", i),
                name: format!("Use case {}", i),
                dataset_count: 10 * (i as u64 + 1),
                prompts: vec![Prompt::default(); i],
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_stats_sum_catalog() {
        let stats = CatalogStats::from_use_cases(&catalog());
        assert_eq!(
            stats,
            CatalogStats {
                use_cases: 4,
                dataset_items: 100,
                prompts: 6,
            }
        );
    }

    #[test]
    fn test_mount_fetches_and_renders_first_three() {
        let mut fetcher = Fetcher::inline(StubApi::new(|_| Ok(Payload::UseCases(catalog()))));
        let mut dashboard = DashboardComponent::new();
        dashboard.mount(&mut fetcher, Instant::now()).unwrap();
        pump(&mut dashboard, &mut fetcher);

        let screen = render(&mut dashboard, 80, 30);
        assert!(screen_contains(&screen, "Use case 0"));
        assert!(screen_contains(&screen, "Use case 2"));
        assert!(!screen_contains(&screen, "Use case 3"));
        assert!(screen_contains(&screen, "100"));
    }

    #[test]
    fn test_failure_shows_empty_catalog() {
        let mut fetcher = Fetcher::inline(StubApi::offline());
        let mut dashboard = DashboardComponent::new();
        dashboard.mount(&mut fetcher, Instant::now()).unwrap();
        pump(&mut dashboard, &mut fetcher);

        assert_eq!(dashboard.stats(), CatalogStats::default());
        let screen = render(&mut dashboard, 80, 20);
        assert!(screen_contains(&screen, "No use cases available."));
    }

    #[test]
    fn test_reply_after_unmount_is_ignored() {
        let mut fetcher = Fetcher::inline(StubApi::new(|_| Ok(Payload::UseCases(catalog()))));
        let mut dashboard = DashboardComponent::new();
        dashboard.mount(&mut fetcher, Instant::now()).unwrap();
        dashboard.unmount();
        pump(&mut dashboard, &mut fetcher);

        assert_eq!(dashboard.stats().use_cases, 0);
    }
}
