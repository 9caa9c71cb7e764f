//! Help dialog component
//!
//! Lists the global shortcuts and the keys of every view.

use crate::action::Action;
use crate::component::Component;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

#[derive(Default)]
pub struct HelpDialog {
    pub scroll_offset: usize,
}

impl HelpDialog {
    pub fn reset(&mut self) {
        self.scroll_offset = 0;
    }
}

impl Component for HelpDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Some(Action::CloseModal),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                None
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(10);
                None
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let dialog_area = area.inner(Margin {
            vertical: 2,
            horizontal: 4,
        });
        frame.render_widget(Clear, dialog_area);

        let content = build_help_content();
        let total = content.len();
        let visible_height = dialog_area.height.saturating_sub(2) as usize;

        let max_scroll = total.saturating_sub(visible_height);
        self.scroll_offset = self.scroll_offset.min(max_scroll);

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keyboard Shortcuts ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .scroll((self.scroll_offset as u16, 0));
        frame.render_widget(paragraph, dialog_area);

        if total > visible_height {
            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(self.scroll_offset);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                dialog_area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}

fn build_help_content() -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let add_section = |lines: &mut Vec<Line<'static>>, title: &str| {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {} ", title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {}", "─".repeat(title.len() + 2)),
            Style::default().fg(Color::DarkGray),
        )));
    };

    let add_shortcut = |lines: &mut Vec<Line<'static>>, key: &str, description: &str| {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:12}", key),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(description.to_string(), Style::default().fg(Color::White)),
        ]));
    };

    add_section(&mut lines, "Global");
    add_shortcut(&mut lines, "1-6", "Jump to a view");
    add_shortcut(&mut lines, "Tab", "Next view");
    add_shortcut(&mut lines, "Shift+Tab", "Previous view");
    add_shortcut(&mut lines, "E", "Run an evaluation");
    add_shortcut(&mut lines, "R", "Reload the current view");
    add_shortcut(&mut lines, "?", "Show this help");
    add_shortcut(&mut lines, "q", "Quit");
    add_shortcut(&mut lines, "Ctrl+c", "Quit immediately");

    add_section(&mut lines, "Use Cases");
    add_shortcut(&mut lines, "j / k", "Select use case");
    add_shortcut(&mut lines, "Enter / r", "Run evaluation for it");
    add_shortcut(&mut lines, "x", "Explore its dataset");

    add_section(&mut lines, "Prompts");
    add_shortcut(&mut lines, "h / l", "Switch pane");
    add_shortcut(&mut lines, "n", "New custom prompt");
    add_shortcut(&mut lines, "c", "Edit chain of thought in $EDITOR");
    add_shortcut(&mut lines, "f", "Edit few-shot examples in $EDITOR");
    add_shortcut(&mut lines, "d", "Delete custom prompt");

    add_section(&mut lines, "Results / Dataset Explorer");
    add_shortcut(&mut lines, "/", "Search");
    add_shortcut(&mut lines, "Enter", "Keep search");
    add_shortcut(&mut lines, "Esc", "Clear search / Back");
    add_shortcut(&mut lines, "n / p", "Next / previous page");

    add_section(&mut lines, "Run Evaluation");
    add_shortcut(&mut lines, "Tab", "Next section");
    add_shortcut(&mut lines, "j / k", "Change selection");
    add_shortcut(&mut lines, "Enter", "Start evaluation");

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press q, Esc, or ? to close",
        Style::default().fg(Color::DarkGray),
    )));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{char_key, render, screen_contains};

    #[test]
    fn test_scroll_is_clamped_on_draw() {
        let mut dialog = HelpDialog::default();
        for _ in 0..500 {
            dialog.handle_key_event(char_key('j')).unwrap();
        }
        render(&mut dialog, 80, 30);
        assert!(dialog.scroll_offset < build_help_content().len());
    }

    #[test]
    fn test_lists_global_keys() {
        let mut dialog = HelpDialog::default();
        let screen = render(&mut dialog, 80, 40);
        assert!(screen_contains(&screen, "Run an evaluation"));
    }
}
