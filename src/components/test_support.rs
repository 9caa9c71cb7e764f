//! Helpers shared by component tests

use crate::action::Action;
use crate::component::Component;
use crate::services::Fetcher;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

/// Feed every queued completion to the component, collecting follow-up actions
pub fn pump(component: &mut dyn Component, fetcher: &mut Fetcher) -> Vec<Action> {
    let mut actions = Vec::new();
    for completion in fetcher.drain() {
        if let Some(action) = component.apply(completion, fetcher).unwrap() {
            actions.push(action);
        }
    }
    actions
}

/// Draw into an off-screen buffer and return its rows as text
pub fn render(component: &mut dyn Component, width: u16, height: u16) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal
        .draw(|frame| {
            component.draw(frame, frame.area()).unwrap();
        })
        .unwrap();

    let buffer = terminal.backend().buffer();
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect::<String>()
        })
        .collect()
}

pub fn screen_contains(rows: &[String], needle: &str) -> bool {
    rows.iter().any(|row| row.contains(needle))
}
