//! Score visualizer
//!
//! Fetches use cases and results together and charts each model's latest
//! score for the selected use case.

use crate::action::Action;
use crate::component::Component;
use crate::components::layout::split_list_detail;
use crate::model::chart::{latest_by_model, ModelBar};
use crate::model::{EvalResult, UseCase};
use crate::services::{ApiError, Completion, Fetcher, Origin, Payload, Request, Tickets};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::time::Instant;

/// Bars are drawn in tenths of a percent
const BAR_MAX: u64 = 1000;

#[derive(Default)]
pub struct VisualizerComponent {
    use_cases: Vec<UseCase>,
    results: Vec<EvalResult>,
    list_state: ListState,
    loading: bool,
    pending_use_cases: Option<Result<Vec<UseCase>, ApiError>>,
    pending_results: Option<Result<Vec<EvalResult>, ApiError>>,
    tickets: Tickets,
}

impl VisualizerComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_use_case(&self) -> Option<&UseCase> {
        self.list_state
            .selected()
            .and_then(|i| self.use_cases.get(i))
    }

    /// Bars for the selected use case
    pub fn bars(&self) -> Vec<ModelBar> {
        self.selected_use_case()
            .map(|u| latest_by_model(&self.results, &u.id))
            .unwrap_or_default()
    }

    fn fetch(&mut self, fetcher: &mut Fetcher) {
        self.loading = true;
        self.pending_use_cases = None;
        self.pending_results = None;
        self.tickets.clear();
        self.tickets
            .spawn(fetcher, Origin::Visualizer, Request::UseCases);
        self.tickets
            .spawn(fetcher, Origin::Visualizer, Request::Results);
    }

    /// Apply both collections once both replies are in
    fn settle(&mut self) {
        if self.pending_use_cases.is_none() || self.pending_results.is_none() {
            return;
        }
        self.loading = false;

        match (self.pending_use_cases.take(), self.pending_results.take()) {
            (Some(Ok(use_cases)), Some(Ok(results))) => {
                let previous = self.selected_use_case().map(|u| u.id.clone());
                self.use_cases = use_cases;
                self.results = results;
                let index = previous
                    .and_then(|id| self.use_cases.iter().position(|u| u.id == id))
                    .or(if self.use_cases.is_empty() { None } else { Some(0) });
                self.list_state.select(index);
            }
            (Some(Err(e)), _) | (_, Some(Err(e))) => {
                tracing::error!("Failed to load visualizer data: {}", e);
            }
            _ => {}
        }
    }
}

impl Component for VisualizerComponent {
    fn mount(&mut self, fetcher: &mut Fetcher, _now: Instant) -> Result<()> {
        self.fetch(fetcher);
        Ok(())
    }

    fn unmount(&mut self) {
        *self = Self::default();
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.use_cases.is_empty() {
            return Ok(None);
        }
        let current = self.list_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.list_state
                    .select(Some((current + 1).min(self.use_cases.len() - 1)));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.list_state.select(Some(current.saturating_sub(1)));
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

        match (completion.request, completion.result) {
            (Request::UseCases, result) => {
                self.pending_use_cases = Some(result.and_then(|payload| match payload {
                    Payload::UseCases(use_cases) => Ok(use_cases),
                    other => Err(ApiError::Json(format!("unexpected payload {:?}", other))),
                }));
            }
            (Request::Results, result) => {
                self.pending_results = Some(result.and_then(|payload| match payload {
                    Payload::Results(results) => Ok(results),
                    other => Err(ApiError::Json(format!("unexpected payload {:?}", other))),
                }));
            }
            (request, _) => {
                tracing::warn!("Visualizer ignored reply to {}", request.describe());
            }
        }
        self.settle();
        Ok(None)
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("j/k", "Use case")]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let (list_area, chart_area) = split_list_detail(area, 30);

        let items: Vec<ListItem> = self
            .use_cases
            .iter()
            .map(|u| ListItem::new(u.name.clone()))
            .collect();
        let title = if self.loading {
            " Use Cases (loading...) ".to_string()
        } else {
            " Use Cases ".to_string()
        };
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

        let chart_title = match self.selected_use_case() {
            Some(use_case) => format!(" Latest Scores: {} ", use_case.name),
            None => " Latest Scores ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(chart_title)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(chart_area);
        frame.render_widget(block, chart_area);

        let model_bars = self.bars();
        if model_bars.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "No evaluation data available for this use case.",
                    Style::default().fg(Color::DarkGray),
                )),
                inner,
            );
            return Ok(());
        }

        let legend_height = model_bars.len() as u16 + 1;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(legend_height)])
            .split(inner);

        let bars: Vec<Bar> = model_bars
            .iter()
            .map(|bar| {
                Bar::default()
                    .value(bar.permille())
                    .text_value(bar.label())
                    .label(Line::from(bar.model_name.clone()))
            })
            .collect();
        let chart = BarChart::default()
            .direction(Direction::Horizontal)
            .data(BarGroup::default().bars(&bars))
            .bar_width(1)
            .bar_gap(1)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            .max(BAR_MAX);
        frame.render_widget(chart, chunks[0]);

        let mut legend = vec![Line::from("")];
        legend.extend(model_bars.iter().map(|bar| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(Color::Cyan)),
                Span::styled(bar.model_name.clone(), Style::default().fg(Color::White)),
                Span::styled(format!("  {}", bar.label()), Style::default().fg(Color::Yellow)),
            ])
        }));
        frame.render_widget(Paragraph::new(legend), chunks[1]);

        Ok(())
    }
}
