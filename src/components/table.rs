//! Plain-text table rendering
//!
//! Builds aligned lines from headers and styled cells so a view can embed a
//! table in a scrolling paragraph.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Columns never grow wider than this many terminal cells
pub const MAX_COLUMN_WIDTH: usize = 40;

/// A table cell with its own style
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub style: Style,
}

impl Cell {
    #[cfg(test)]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::default().fg(Color::White),
        }
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Build header, separator and row lines.
///
/// The header and separator are always the first two lines, so callers can
/// keep them visible while scrolling the rest.
pub fn build_table_lines(headers: &[&str], rows: &[Vec<Cell>]) -> Vec<Line<'static>> {
    let mut col_widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = col_widths.get_mut(i) {
                *width = (*width).max(cell.text.width());
            }
        }
    }
    for width in &mut col_widths {
        *width = (*width).min(MAX_COLUMN_WIDTH);
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);

    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let header_spans: Vec<Span> = headers
        .iter()
        .zip(&col_widths)
        .flat_map(|(h, width)| {
            vec![
                Span::styled(fit(h, *width), header_style),
                Span::raw(" │ "),
            ]
        })
        .collect();
    lines.push(Line::from(header_spans));

    let separator: String = col_widths
        .iter()
        .map(|w| "─".repeat(*w))
        .collect::<Vec<_>>()
        .join("─┼─");
    lines.push(Line::from(Span::styled(
        separator,
        Style::default().fg(Color::DarkGray),
    )));

    for row in rows {
        let row_spans: Vec<Span> = row
            .iter()
            .zip(&col_widths)
            .flat_map(|(cell, width)| {
                vec![
                    Span::styled(fit(&cell.text, *width), cell.style),
                    Span::raw(" │ "),
                ]
            })
            .collect();
        lines.push(Line::from(row_spans));
    }

    lines
}

/// Pad or truncate `text` to exactly `width` display cells
fn fit(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width <= width {
        return format!("{}{}", text, " ".repeat(width - text_width));
    }

    let budget = width.saturating_sub(3);
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str(&".".repeat(width.min(3)));
    used += width.min(3);
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_columns_align_to_widest_cell() {
        let rows = vec![
            vec![Cell::plain("llama3:latest"), Cell::plain("GKH")],
            vec![Cell::plain("gemma:2b"), Cell::plain("CG")],
        ];
        let lines = build_table_lines(&["Model", "Use Case"], &rows);

        assert_eq!(lines.len(), 4);
        assert_eq!(line_text(&lines[0]), "Model         │ Use Case │ ");
        assert_eq!(line_text(&lines[3]), "gemma:2b      │ CG       │ ");
    }

    #[test]
    fn test_long_cells_are_truncated() {
        assert_eq!(fit("abcdefghij", 6), "abc...");
        assert_eq!(fit("abc", 6), "abc   ");
        assert_eq!(fit("abcdef", 2), "..");
    }

    #[test]
    fn test_wide_characters_count_by_display_width() {
        let fitted = fit("日本語テキスト", 8);
        assert_eq!(fitted.width(), 8);
        assert!(fitted.trim_end().ends_with("..."));
    }

    #[test]
    fn test_cap_applies_to_every_column() {
        let long = "x".repeat(MAX_COLUMN_WIDTH * 2);
        let rows = vec![vec![Cell::plain(long)]];
        let lines = build_table_lines(&["Id"], &rows);
        assert_eq!(line_text(&lines[2]).width(), MAX_COLUMN_WIDTH + 3);
    }
}
