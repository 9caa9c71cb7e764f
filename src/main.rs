//! slm-eval-tui - A terminal dashboard for the SLM evaluation backend
//!
//! This is the main entry point for the slm-eval-tui application.
//! It uses the Component Architecture pattern from ratatui.

mod action;
mod app;
mod component;
mod components;
mod config;
mod logging;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::component::Component;
use crate::components::PromptEdit;
use crate::config::Config;
use crate::services::{ApiClient, Fetcher};
use crate::tui::Tui;
use anyhow::{Context, Result};
use crossterm::event::Event;
use std::io::Write;
use std::process::Command;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let config = Config::load();
    if let Err(e) = logging::init(&config) {
        eprintln!("Logging disabled: {}", e);
    }
    if !Config::exists() {
        if let Err(e) = config.save() {
            tracing::warn!("Could not write default config: {:#}", e);
        }
    }
    let api = ApiClient::new(&config).context("Invalid API base URL")?;
    tracing::info!("Starting against {}", api.base_url());
    let mut fetcher = Fetcher::new(Arc::new(api));

    // Setup terminal
    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(100));
    tui.enter()?;

    // Create app state
    let mut app = App::new(&config);
    let result = app
        .mount(&mut fetcher, Instant::now())
        .and_then(|_| run_app(&mut tui, &mut app, &mut fetcher));

    // Cleanup terminal
    tui.exit()?;

    if let Err(err) = result {
        tracing::error!("Exiting on error: {:#}", err);
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    tracing::info!("Shutting down");
    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App, fetcher: &mut Fetcher) -> Result<()> {
    let mut last_tick = Instant::now();

    while !app.should_quit {
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                tracing::error!("Draw error: {:#}", e);
            }
        })?;

        // Editing happens outside the TUI
        if let Some(edit) = app.pending_edit.take() {
            if let Err(e) = edit_in_external_editor(tui, app, fetcher, &edit) {
                tracing::error!("Editing {} failed: {:#}", edit.field.label(), e);
                app.status_message = Some(format!("Edit failed: {}", e));
            }
            continue;
        }

        if let Some(event) = tui.next_event()? {
            let action = match event {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };
            if let Some(action) = action {
                app.dispatch(action, fetcher)?;
            }
        }

        // Key repeat must not starve polling and completions
        if last_tick.elapsed() >= tui.tick_rate {
            app.dispatch(Action::Tick, fetcher)?;
            last_tick = Instant::now();
        }
    }

    Ok(())
}

/// Open one prompt section in $VISUAL / $EDITOR and save the result
fn edit_in_external_editor(
    tui: &mut Tui,
    app: &mut App,
    fetcher: &mut Fetcher,
    edit: &PromptEdit,
) -> Result<()> {
    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());

    let mut file = tempfile::Builder::new()
        .prefix("slm-prompt-")
        .suffix(".md")
        .tempfile()
        .context("Failed to create scratch file")?;
    file.write_all(edit.original_text().as_bytes())?;
    file.flush()?;

    tui.suspend()?;
    let status = Command::new(&editor).arg(file.path()).status();
    tui.resume()?;

    let status = status.with_context(|| format!("Failed to launch editor '{}'", editor))?;
    if !status.success() {
        anyhow::bail!("Editor exited with status: {}", status);
    }

    let text = std::fs::read_to_string(file.path()).context("Failed to read edited prompt")?;
    app.finish_edit(edit, &text, fetcher);
    Ok(())
}
