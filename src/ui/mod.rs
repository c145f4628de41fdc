pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use crate::config::Config;
use crate::store::Stores;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Everything a view needs to build itself and its children
#[derive(Clone)]
pub struct ViewContext {
  pub stores: Stores,
  pub users_per_page: u32,
  pub products_per_page: u32,
  /// Username prefilled in the login form
  pub login_username: Option<String>,
}

impl ViewContext {
  pub fn new(stores: Stores, config: &Config) -> Self {
    Self {
      stores,
      users_per_page: config.ui.users_per_page,
      products_per_page: config.ui.products_per_page,
      login_username: config.login.username.clone(),
    }
  }
}

/// Keep a list selection inside `len` items, selecting the first item of a
/// non-empty list when nothing is selected.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
    None => state.select(Some(0)),
  }
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Current view
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  app.render_header(frame, chunks[0]);
  app.render_view(frame, chunks[1]);
  renderfns::draw_footer(frame, chunks[2], &app.breadcrumb(), app.status());
  app.render_overlays(frame, chunks[1]);
}
