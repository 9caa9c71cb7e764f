//! Dataset explorer
//!
//! Shows the raw samples of one use case, five per page, with a
//! case-insensitive search over each sample's JSON text.

use crate::action::Action;
use crate::component::Component;
use crate::components::search::{SearchBox, SearchEvent};
use crate::model::query::{filter_items, Pager};
use crate::model::sample::{display_fields, search_text};
use crate::model::Sample;
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

/// Samples matching `query` against their lowercased JSON serialization
pub fn filter_samples<'a>(samples: &'a [Sample], query: &str) -> Vec<&'a Sample> {
    filter_items(samples, query, |sample, needle| {
        search_text(sample).contains(needle)
    })
}

/// "Showing a to b of N entries" and "page / pages", or `None` for a single page
pub fn page_footer(pager: &Pager, total: usize) -> Option<(String, String)> {
    let pages = pager.total_pages(total);
    if pages <= 1 {
        return None;
    }
    let range = pager.page_range(total);
    Some((
        format!("Showing {} to {} of {} entries", range.start + 1, range.end, total),
        format!("{} / {}", pager.current_page, pages),
    ))
}

#[derive(Default)]
pub struct DatasetExplorerComponent {
    use_case_id: Option<String>,
    samples: Vec<Sample>,
    loading: bool,
    pager: Pager,
    search: SearchBox,
    scroll: u16,
    tickets: Tickets,
}

impl DatasetExplorerComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the use case to explore; takes effect on the next mount
    pub fn set_use_case(&mut self, use_case_id: impl Into<String>) {
        self.use_case_id = Some(use_case_id.into());
    }

    #[cfg(test)]
    pub fn use_case_id(&self) -> Option<&str> {
        self.use_case_id.as_deref()
    }

    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[cfg(test)]
    pub fn pager(&self) -> Pager {
        self.pager
    }

    pub fn filtered(&self) -> Vec<&Sample> {
        filter_samples(&self.samples, self.search.query())
    }

    /// Samples on the current page
    pub fn page(&self) -> Vec<&Sample> {
        let filtered = self.filtered();
        let range = self.pager.page_range(filtered.len());
        filtered[range].to_vec()
    }

    fn fetch(&mut self, fetcher: &mut Fetcher) {
        let Some(use_case_id) = self.use_case_id.clone() else {
            return;
        };
        self.loading = true;
        self.tickets.spawn(
            fetcher,
            Origin::Explorer,
            Request::Samples { use_case_id },
        );
    }
}

impl Component for DatasetExplorerComponent {
    fn mount(&mut self, fetcher: &mut Fetcher, _now: Instant) -> Result<()> {
        self.fetch(fetcher);
        Ok(())
    }

    fn unmount(&mut self) {
        let use_case_id = self.use_case_id.take();
        *self = Self {
            use_case_id,
            ..Self::default()
        };
    }

    fn captures_input(&self) -> bool {
        self.search.is_editing()
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.search.is_editing() {
            match self.search.handle_key(key) {
                SearchEvent::Changed | SearchEvent::Closed { cleared: true } => {
                    self.pager.reset();
                    self.scroll = 0;
                }
                _ => {}
            }
            return Ok(None);
        }

        let total = self.filtered().len();
        let action = match key.code {
            KeyCode::Esc | KeyCode::Backspace => Some(Action::Back),
            KeyCode::Char('/') => {
                self.search.start();
                None
            }
            KeyCode::Char('n') | KeyCode::Right => {
                self.pager.next(total);
                self.scroll = 0;
                None
            }
            KeyCode::Char('p') | KeyCode::Left => {
                self.pager.previous();
                self.scroll = 0;
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
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
            Ok(Payload::Samples(samples)) => self.samples = samples,
            Ok(other) => tracing::warn!("Explorer ignored unexpected payload: {:?}", other),
            Err(e) => {
                tracing::error!("Failed to fetch samples for {:?}: {}", self.use_case_id, e);
                self.samples.clear();
            }
        }
        self.pager.reset();
        Ok(None)
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        if self.search.is_editing() {
            vec![("Enter", "Keep search"), ("Esc", "Clear search")]
        } else {
            vec![
                ("/", "Search"),
                ("n/p", "Page"),
                ("j/k", "Scroll"),
                ("Esc", "Back"),
            ]
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let title = format!(
            " Dataset Explorer: {} ",
            self.use_case_id.as_deref().unwrap_or("-")
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.loading {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "Loading samples...",
                    Style::default().fg(Color::DarkGray),
                )),
                inner,
            );
            return Ok(());
        }

        let total = self.filtered().len();
        let footer = page_footer(&self.pager, total);
        let search_line = self.search.line();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(if search_line.is_some() { 1 } else { 0 }),
                Constraint::Min(0),
                Constraint::Length(if footer.is_some() { 1 } else { 0 }),
            ])
            .split(inner);

        if let Some(line) = search_line {
            frame.render_widget(Paragraph::new(line), chunks[0]);
        }

        if total == 0 {
            let message = if self.samples.is_empty() {
                "No samples in this dataset."
            } else {
                "No samples match the search."
            };
            frame.render_widget(
                Paragraph::new(Span::styled(message, Style::default().fg(Color::DarkGray))),
                chunks[1],
            );
        } else {
            let start = self.pager.start_index();
            let lines = sample_lines(&self.page(), start);
            let body = Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0));
            frame.render_widget(body, chunks[1]);
        }

        if let Some((showing, pages)) = footer {
            let mut spans = vec![Span::styled(showing, Style::default().fg(Color::DarkGray))];
            spans.push(Span::raw("   "));
            let nav = Style::default().fg(Color::Cyan);
            let disabled = Style::default().fg(Color::DarkGray);
            spans.push(Span::styled(
                "◀ p ",
                if self.pager.has_previous() { nav } else { disabled },
            ));
            spans.push(Span::styled(pages, Style::default().fg(Color::White)));
            spans.push(Span::styled(
                " n ▶",
                if self.pager.has_next(total) { nav } else { disabled },
            ));
            frame.render_widget(Paragraph::new(Line::from(spans)), chunks[2]);
        }

        Ok(())
    }
}

fn sample_lines(samples: &[&Sample], first_index: usize) -> Vec<Line<'static>> {
    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();

    for (offset, sample) in samples.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("#{}", first_index + offset + 1),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        for (key, value) in display_fields(sample) {
            let mut value_lines = value.lines();
            let first = value_lines.next().unwrap_or_default().to_string();
            lines.push(Line::from(vec![
                Span::styled(format!("  {}: ", key), key_style),
                Span::raw(first),
            ]));
            lines.extend(value_lines.map(|l| Line::from(format!("    {}", l))));
        }
        lines.push(Line::from(""));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{char_key, key, pump, render, screen_contains};
    use crate::services::fetcher::testing::StubApi;
    use serde_json::json;

    fn samples(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| json!({"question": format!("Question {}", i), "answer": if i % 2 == 0 { "Even" } else { "Odd" }}))
            .collect()
    }

    fn explorer(n: usize) -> (DatasetExplorerComponent, Fetcher, std::sync::Arc<StubApi>) {
        let api = StubApi::new(move |_| Ok(Payload::Samples(samples(n))));
        let mut fetcher = Fetcher::inline(api.clone());
        let mut view = DatasetExplorerComponent::new();
        view.set_use_case("GKH");
        view.mount(&mut fetcher, Instant::now()).unwrap();
        (view, fetcher, api)
    }

    #[test]
    fn test_loading_until_reply_then_first_page() {
        let (mut view, mut fetcher, api) = explorer(12);
        assert!(view.is_loading());
        assert!(screen_contains(&render(&mut view, 80, 10), "Loading samples..."));
        assert_eq!(
            api.calls(),
            vec![Request::Samples {
                use_case_id: "GKH".to_string()
            }]
        );

        pump(&mut view, &mut fetcher);
        assert!(!view.is_loading());
        assert_eq!(view.page().len(), 5);
        assert_eq!(view.pager().total_pages(12), 3);
    }

    #[test]
    fn test_failure_ends_loading_state() {
        let mut fetcher = Fetcher::inline(StubApi::offline());
        let mut view = DatasetExplorerComponent::new();
        view.set_use_case("GKH");
        view.mount(&mut fetcher, Instant::now()).unwrap();
        pump(&mut view, &mut fetcher);

        assert!(!view.is_loading());
        let screen = render(&mut view, 80, 10);
        assert!(screen_contains(&screen, "No samples in this dataset."));
    }

    #[test]
    fn test_paging_stops_at_ends() {
        let (mut view, mut fetcher, _api) = explorer(12);
        pump(&mut view, &mut fetcher);

        view.handle_key_event(char_key('p')).unwrap();
        assert_eq!(view.pager().current_page, 1);
        for _ in 0..5 {
            view.handle_key_event(char_key('n')).unwrap();
        }
        assert_eq!(view.pager().current_page, 3);
        assert_eq!(view.page().len(), 2);
    }

    #[test]
    fn test_search_resets_to_first_page() {
        let (mut view, mut fetcher, _api) = explorer(12);
        pump(&mut view, &mut fetcher);
        view.handle_key_event(char_key('n')).unwrap();
        assert_eq!(view.pager().current_page, 2);

        view.handle_key_event(char_key('/')).unwrap();
        for c in "ODD".chars() {
            view.handle_key_event(char_key(c)).unwrap();
        }
        view.handle_key_event(key(KeyCode::Enter)).unwrap();

        assert_eq!(view.pager().current_page, 1);
        assert_eq!(view.filtered().len(), 6);
    }

    #[test]
    fn test_footer_only_with_several_pages() {
        assert_eq!(page_footer(&Pager::default(), 5), None);
        assert_eq!(page_footer(&Pager::default(), 0), None);

        let mut pager = Pager::default();
        pager.next(12);
        pager.next(12);
        assert_eq!(
            page_footer(&pager, 12),
            Some((
                "Showing 11 to 12 of 12 entries".to_string(),
                "3 / 3".to_string()
            ))
        );
    }

    #[test]
    fn test_render_keys_in_server_order() {
        let (mut view, mut fetcher, _api) = explorer(7);
        pump(&mut view, &mut fetcher);

        let screen = render(&mut view, 80, 40);
        assert!(screen_contains(&screen, "question: Question 0"));
        assert!(screen_contains(&screen, "Showing 1 to 5 of 7 entries"));
        let question_row = screen.iter().position(|r| r.contains("question: Question 0"));
        let answer_row = screen.iter().position(|r| r.contains("answer: Even"));
        assert!(question_row < answer_row);
    }

    #[test]
    fn test_escape_goes_back() {
        let (mut view, mut fetcher, _api) = explorer(3);
        pump(&mut view, &mut fetcher);
        assert_eq!(view.handle_key_event(key(KeyCode::Esc)).unwrap(), Some(Action::Back));
    }
}
