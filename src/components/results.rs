//! Evaluation results table with a client-side filter

use crate::action::Action;
use crate::component::Component;
use crate::components::search::{SearchBox, SearchEvent};
use crate::components::table::{build_table_lines, Cell};
use crate::model::query::{contains_ci, filter_items};
use crate::model::{EvalResult, ScoreBand};
use crate::services::{Completion, Fetcher, Origin, Payload, Request, Tickets};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::Instant;

const HEADERS: [&str; 5] = ["Model", "Use Case", "Prompt", "Score", "Timestamp"];

/// Results whose model name or use case id contains the query, ignoring case
pub fn filter_results<'a>(results: &'a [EvalResult], query: &str) -> Vec<&'a EvalResult> {
    filter_items(results, query, |r, needle| {
        contains_ci(&r.model_name, needle) || contains_ci(&r.use_case_id, needle)
    })
}

pub fn score_color(band: ScoreBand) -> Color {
    match band {
        ScoreBand::High => Color::Green,
        ScoreBand::Medium => Color::Yellow,
        ScoreBand::Low => Color::Red,
    }
}

#[derive(Default)]
pub struct ResultsComponent {
    results: Vec<EvalResult>,
    search: SearchBox,
    loading: bool,
    scroll: usize,
    tickets: Tickets,
}

impl ResultsComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self) -> Vec<&EvalResult> {
        filter_results(&self.results, self.search.query())
    }

    fn fetch(&mut self, fetcher: &mut Fetcher) {
        self.loading = true;
        self.tickets.spawn(fetcher, Origin::Results, Request::Results);
    }

    fn rows(&self) -> Vec<Vec<Cell>> {
        self.visible()
            .into_iter()
            .map(|r| {
                vec![
                    Cell::styled(
                        r.model_name.clone(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Cell::styled(r.use_case_id.clone(), Style::default().fg(Color::Yellow)),
                    Cell::styled(r.prompt_id.clone(), Style::default().fg(Color::DarkGray)),
                    Cell::styled(
                        r.formatted_score(),
                        Style::default()
                            .fg(score_color(r.score_band()))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Cell::styled(r.formatted_timestamp(), Style::default().fg(Color::Gray)),
                ]
            })
            .collect()
    }
}

impl Component for ResultsComponent {
    fn mount(&mut self, fetcher: &mut Fetcher, _now: Instant) -> Result<()> {
        self.fetch(fetcher);
        Ok(())
    }

    fn unmount(&mut self) {
        *self = Self::default();
    }

    fn captures_input(&self) -> bool {
        self.search.is_editing()
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.search.is_editing() {
            if self.search.handle_key(key) != SearchEvent::Ignored {
                self.scroll = 0;
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('/') => self.search.start(),
            KeyCode::Esc => {
                self.search.reset();
                self.scroll = 0;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.scroll + 1 < self.visible().len() {
                    self.scroll += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            _ => {}
        }
        Ok(None)
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
            Ok(Payload::Results(results)) => self.results = results,
            Ok(other) => tracing::warn!("Results ignored unexpected payload: {:?}", other),
            Err(e) => {
                tracing::error!("Failed to fetch results: {}", e);
                self.results.clear();
            }
        }
        self.scroll = self.scroll.min(self.visible().len().saturating_sub(1));
        Ok(None)
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        if self.search.is_editing() {
            vec![("Enter", "Keep filter"), ("Esc", "Clear filter")]
        } else {
            vec![("/", "Filter"), ("j/k", "Scroll"), ("Esc", "Clear filter")]
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let visible_count = self.visible().len();
        let title = if self.loading {
            " Results (loading...) ".to_string()
        } else if self.search.query().is_empty() {
            format!(" Results ({}) ", self.results.len())
        } else {
            format!(" Results ({} of {}) ", visible_count, self.results.len())
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let search_line = self.search.line();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(if search_line.is_some() { 1 } else { 0 }),
                Constraint::Min(0),
            ])
            .split(inner);
        if let Some(line) = search_line {
            frame.render_widget(Paragraph::new(line), chunks[0]);
        }

        if visible_count == 0 {
            let message = if self.loading {
                "Loading results..."
            } else if self.results.is_empty() {
                "No results yet."
            } else {
                "No results match the filter."
            };
            frame.render_widget(
                Paragraph::new(Span::styled(message, Style::default().fg(Color::DarkGray))),
                chunks[1],
            );
            return Ok(());
        }

        let mut lines = build_table_lines(&HEADERS, &self.rows());
        // Keep header and separator pinned while the rows scroll
        let body: Vec<_> = lines.split_off(2).into_iter().skip(self.scroll).collect();
        lines.extend(body);
        frame.render_widget(Paragraph::new(lines), chunks[1]);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{char_key, key, pump, render, screen_contains};
    use crate::services::fetcher::testing::StubApi;

    fn result(id: &str, model: &str, use_case: &str, score: f64) -> EvalResult {
        EvalResult {
            id: id.to_string(),
            model_name: model.to_string(),
            use_case_id: use_case.to_string(),
            prompt_id: "p1".to_string(),
            score,
            ..Default::default()
        }
    }

    fn sample_results() -> Vec<EvalResult> {
        vec![
            result("r1", "gemma:2b", "GKH", 0.95),
            result("r2", "llama3", "CG", 0.75),
            result("r3", "Phi3", "GKH", 0.4),
        ]
    }

    #[test]
    fn test_filter_matches_model_or_use_case_ignoring_case() {
        let results = sample_results();
        let ids = |q: &str| -> Vec<String> {
            filter_results(&results, q)
                .into_iter()
                .map(|r| r.id.clone())
                .collect()
        };

        assert_eq!(ids(""), vec!["r1", "r2", "r3"]);
        assert_eq!(ids("PHI"), vec!["r3"]);
        assert_eq!(ids("gkh"), vec!["r1", "r3"]);
        assert!(ids("mistral").is_empty());
    }

    #[test]
    fn test_score_colors() {
        assert_eq!(score_color(ScoreBand::High), Color::Green);
        assert_eq!(score_color(ScoreBand::Medium), Color::Yellow);
        assert_eq!(score_color(ScoreBand::Low), Color::Red);
    }

    #[test]
    fn test_search_keys_filter_and_esc_clears() {
        let mut fetcher = Fetcher::inline(StubApi::new(|_| Ok(Payload::Results(sample_results()))));
        let mut view = ResultsComponent::new();
        view.mount(&mut fetcher, Instant::now()).unwrap();
        pump(&mut view, &mut fetcher);

        view.handle_key_event(char_key('/')).unwrap();
        assert!(view.captures_input());
        for c in "llama".chars() {
            view.handle_key_event(char_key(c)).unwrap();
        }
        view.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(!view.captures_input());
        assert_eq!(view.visible().len(), 1);

        let screen = render(&mut view, 100, 12);
        assert!(screen_contains(&screen, "75.0%"));
        assert!(!screen_contains(&screen, "95.0%"));

        view.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert_eq!(view.visible().len(), 3);
    }

    #[test]
    fn test_failed_fetch_shows_empty_table() {
        let mut fetcher = Fetcher::inline(StubApi::offline());
        let mut view = ResultsComponent::new();
        view.mount(&mut fetcher, Instant::now()).unwrap();
        pump(&mut view, &mut fetcher);

        let screen = render(&mut view, 80, 8);
        assert!(screen_contains(&screen, "No results yet."));
    }
}
