//! Inline search box shared by the filterable views

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// What a key did to the search box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
    /// The query text changed
    Changed,
    /// Editing finished; the query may have been cleared
    Closed { cleared: bool },
    Ignored,
}

#[derive(Debug, Default, Clone)]
pub struct SearchBox {
    query: String,
    editing: bool,
}

impl SearchBox {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn start(&mut self) {
        self.editing = true;
    }

    pub fn reset(&mut self) {
        self.query.clear();
        self.editing = false;
    }

    /// Feed a key while editing. Enter keeps the query, Esc clears it.
    pub fn handle_key(&mut self, key: KeyEvent) -> SearchEvent {
        if !self.editing {
            return SearchEvent::Ignored;
        }
        match key.code {
            KeyCode::Enter => {
                self.editing = false;
                SearchEvent::Closed { cleared: false }
            }
            KeyCode::Esc => {
                let cleared = !self.query.is_empty();
                self.reset();
                SearchEvent::Closed { cleared }
            }
            KeyCode::Backspace => {
                if self.query.pop().is_some() {
                    SearchEvent::Changed
                } else {
                    SearchEvent::Ignored
                }
            }
            KeyCode::Char(c) => {
                self.query.push(c);
                SearchEvent::Changed
            }
            _ => SearchEvent::Ignored,
        }
    }

    /// One-line prompt, or `None` when there is nothing to show
    pub fn line(&self) -> Option<Line<'static>> {
        if !self.editing && self.query.is_empty() {
            return None;
        }
        let cursor = if self.editing { "█" } else { "" };
        Some(Line::from(vec![
            Span::styled(
                " Search: ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{}{}", self.query, cursor),
                Style::default().fg(Color::Cyan),
            ),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(search: &mut SearchBox, code: KeyCode) -> SearchEvent {
        search.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_keys_ignored_until_started() {
        let mut search = SearchBox::default();
        assert_eq!(press(&mut search, KeyCode::Char('a')), SearchEvent::Ignored);
        assert!(search.line().is_none());
    }

    #[test]
    fn test_enter_keeps_and_esc_clears() {
        let mut search = SearchBox::default();
        search.start();
        press(&mut search, KeyCode::Char('g'));
        press(&mut search, KeyCode::Char('p'));
        assert_eq!(press(&mut search, KeyCode::Backspace), SearchEvent::Changed);
        assert_eq!(
            press(&mut search, KeyCode::Enter),
            SearchEvent::Closed { cleared: false }
        );
        assert_eq!(search.query(), "g");
        assert!(search.line().is_some());

        search.start();
        assert_eq!(
            press(&mut search, KeyCode::Esc),
            SearchEvent::Closed { cleared: true }
        );
        assert_eq!(search.query(), "");
        assert!(!search.is_editing());
    }
}
