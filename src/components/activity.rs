//! Job activity monitor
//!
//! Polls `GET /jobs` on a fixed interval while the view is active. Every
//! reply replaces the list wholesale; a reply older than the last one
//! applied is dropped so overlapping polls never move the list backwards.

use crate::action::Action;
use crate::component::Component;
use crate::model::{Job, JobStatus};
use crate::services::{Completion, Fetcher, Origin, Payload, PollTimer, Request, RequestId, Tickets};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};

/// Rows used by one job card
const JOB_HEIGHT: u16 = 3;

pub fn status_color(status: JobStatus) -> Color {
    match status {
        JobStatus::Completed => Color::Green,
        JobStatus::Failed => Color::Red,
        JobStatus::Running => Color::Blue,
        JobStatus::Pending => Color::Gray,
    }
}

pub struct ActivityComponent {
    jobs: Vec<Job>,
    timer: PollTimer,
    tickets: Tickets,
    last_applied: RequestId,
    scroll: usize,
}

impl ActivityComponent {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            jobs: Vec::new(),
            timer: PollTimer::new(poll_interval),
            tickets: Tickets::default(),
            last_applied: 0,
            scroll: 0,
        }
    }

    #[cfg(test)]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    #[cfg(test)]
    pub fn is_polling(&self) -> bool {
        self.timer.is_running()
    }

    fn poll(&mut self, fetcher: &mut Fetcher) {
        self.tickets.spawn(fetcher, Origin::Activity, Request::Jobs);
    }
}

impl Component for ActivityComponent {
    fn mount(&mut self, fetcher: &mut Fetcher, now: Instant) -> Result<()> {
        self.poll(fetcher);
        self.timer.start(now);
        Ok(())
    }

    fn unmount(&mut self) {
        self.timer.stop();
        self.tickets.clear();
        self.jobs.clear();
        self.last_applied = 0;
        self.scroll = 0;
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.scroll + 1 < self.jobs.len() {
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
        if action == Action::Refresh && self.timer.is_running() {
            self.poll(fetcher);
        }
        Ok(None)
    }

    fn tick(&mut self, fetcher: &mut Fetcher, now: Instant) -> Result<Option<Action>> {
        if self.timer.fire(now) {
            self.poll(fetcher);
        }
        Ok(None)
    }

    fn apply(&mut self, completion: Completion, _fetcher: &mut Fetcher) -> Result<Option<Action>> {
        if !self.tickets.redeem(completion.id) {
            return Ok(None);
        }
        if completion.id <= self.last_applied {
            tracing::debug!(
                id = completion.id,
                last_applied = self.last_applied,
                "dropping stale job list"
            );
            return Ok(None);
        }

        match completion.result {
            Ok(Payload::Jobs(jobs)) => {
                self.last_applied = completion.id;
                self.jobs = jobs;
                self.scroll = self.scroll.min(self.jobs.len().saturating_sub(1));
            }
            Ok(other) => tracing::warn!("Activity ignored unexpected payload: {:?}", other),
            Err(e) => tracing::error!("Failed to poll jobs: {}", e),
        }
        Ok(None)
    }

    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        vec![("j/k", "Scroll")]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Activity ({}) ", self.jobs.len()))
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.jobs.is_empty() {
            let empty = Paragraph::new(Span::styled(
                "No activity recorded yet.",
                Style::default().fg(Color::DarkGray),
            ));
            frame.render_widget(empty, inner);
            return Ok(());
        }

        let visible = (inner.height / JOB_HEIGHT).max(1) as usize;
        let start = self.scroll.min(self.jobs.len().saturating_sub(visible));
        let shown: Vec<&Job> = self.jobs.iter().skip(start).take(visible).collect();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                shown
                    .iter()
                    .map(|_| Constraint::Length(JOB_HEIGHT))
                    .chain(std::iter::once(Constraint::Min(0)))
                    .collect::<Vec<_>>(),
            )
            .split(inner);

        for (job, row) in shown.into_iter().zip(rows.iter()) {
            draw_job(frame, *row, job);
        }

        Ok(())
    }
}

fn draw_job(frame: &mut Frame, area: Rect, job: &Job) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let state = job.state();
    let color = status_color(state);

    let mut header = vec![
        Span::styled(
            format!("{} {}", state.icon(), job.status.to_uppercase()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(job.model_name.clone(), Style::default().fg(Color::White)),
        Span::styled(" on ", Style::default().fg(Color::DarkGray)),
        Span::styled(job.use_case_id.clone(), Style::default().fg(Color::Yellow)),
    ];
    if !job.prompt_id.is_empty() {
        header.push(Span::styled(
            format!("  Prompt: {}", job.prompt_id),
            Style::default().fg(Color::Gray),
        ));
    }
    if let Some(created) = job.formatted_created_at() {
        header.push(Span::styled(
            format!("  {}", created),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(header)), parts[0]);

    let gauge_color = if state == JobStatus::Failed {
        Color::Red
    } else {
        Color::Blue
    };
    let progress = job.clamped_progress();
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(gauge_color).bg(Color::Black))
        .percent(progress)
        .label(format!("{}%", progress));
    frame.render_widget(gauge, parts[1]);
}
