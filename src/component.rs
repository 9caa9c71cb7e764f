//! Component trait - Interface for UI components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

use crate::action::Action;
use crate::services::{Completion, Fetcher};
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};
use std::time::Instant;

/// Trait for UI components
///
/// Components are self-contained units that:
/// - Handle their own key events
/// - Maintain local state
/// - Fetch their own data while mounted
/// - Render themselves to a frame
///
/// The pattern follows:
/// 1. `mount` - Issue the initial requests when the component becomes active
/// 2. `handle_key_event` - Convert events to Actions
/// 3. `update` / `apply` / `tick` - Process Actions, responses and timers
/// 4. `draw` - Render the component
/// 5. `unmount` - Drop transient state when the component is left
pub trait Component {
    /// Called when the component becomes the active view.
    ///
    /// Views fetch their data here; nothing is shared between views.
    fn mount(&mut self, fetcher: &mut Fetcher, now: Instant) -> Result<()> {
        let _ = (fetcher, now);
        Ok(())
    }

    /// Called when the component stops being the active view.
    ///
    /// Outstanding request ids are forgotten, so late responses are ignored.
    fn unmount(&mut self) {}

    /// Whether the component is capturing raw text input (search boxes).
    ///
    /// While true, global shortcuts are not interpreted.
    fn captures_input(&self) -> bool {
        false
    }

    /// Handle a key event, returning an optional Action
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let _ = key;
        Ok(None)
    }

    /// Update component state based on an Action
    fn update(&mut self, action: Action, fetcher: &mut Fetcher) -> Result<Option<Action>> {
        let _ = (action, fetcher);
        Ok(None)
    }

    /// Advance timers. Called on every tick while mounted.
    fn tick(&mut self, fetcher: &mut Fetcher, now: Instant) -> Result<Option<Action>> {
        let _ = (fetcher, now);
        Ok(None)
    }

    /// Apply a finished request that this component issued
    fn apply(&mut self, completion: Completion, fetcher: &mut Fetcher) -> Result<Option<Action>> {
        let _ = (completion, fetcher);
        Ok(None)
    }

    /// Key hints for the help bar while this component is active
    fn key_hints(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    /// Draw the component to the frame
    ///
    /// This method should be pure rendering - no state changes beyond
    /// clamping scroll positions to the visible area.
    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
