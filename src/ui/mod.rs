pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Keep a list selection inside `0..len`, selecting the first row when
/// nothing is selected yet.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }

  match state.selected() {
    Some(idx) if idx < len => {}
    Some(_) => state.select(Some(len - 1)),
    None => state.select(Some(0)),
  }
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let breadcrumb = app.breadcrumb();
  let path = app.current_route().path();
  let title = app.config().title().to_string();
  let api_url = app.config().api.base_url.clone();

  if let Some(view) = app.current_view_mut() {
    renderfns::draw_header(
      frame,
      chunks[0],
      &title,
      &api_url,
      view.context().as_deref(),
      &view.shortcuts(),
    );
    view.render(frame, chunks[1]);
  }
  renderfns::draw_footer(frame, chunks[2], &breadcrumb, &path);

  if app.command_input().is_active() {
    app.command_input().render_overlay(frame, chunks[1]);
  }
}
