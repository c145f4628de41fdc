use super::KeyResult;
use crate::api::types::Category;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// Label of the entry that clears the category filter
const ALL: &str = "All";

/// Events emitted by the category picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryEvent {
  /// A category slug was chosen, `None` for "All"
  Selected(Option<String>),
  Cancelled,
}

/// Overlay listing "All" followed by the product categories
#[derive(Debug, Clone, Default)]
pub struct CategoryPicker {
  active: bool,
  /// Row 0 is "All", row i is `categories[i - 1]`
  selected: usize,
}

impl CategoryPicker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Open the picker with the current filter highlighted
  pub fn show(&mut self, categories: &[Category], current: Option<&str>) {
    self.active = true;
    self.selected = current
      .and_then(|slug| categories.iter().position(|c| c.slug == slug))
      .map(|i| i + 1)
      .unwrap_or(0);
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.selected = 0;
  }

  /// Handle a key event against the categories currently in the store
  pub fn handle_key(&mut self, key: KeyEvent, categories: &[Category]) -> KeyResult<CategoryEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    let rows = categories.len() + 1;
    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(CategoryEvent::Cancelled)
      }
      KeyCode::Enter => {
        let slug = self
          .selected
          .checked_sub(1)
          .and_then(|i| categories.get(i))
          .map(|c| c.slug.clone());
        self.hide();
        KeyResult::Event(CategoryEvent::Selected(slug))
      }
      KeyCode::Char('j') | KeyCode::Down => {
        self.selected = (self.selected + 1) % rows;
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.selected = (self.selected + rows - 1) % rows;
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the picker overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect, categories: &[Category]) {
    if !self.active {
      return;
    }

    let longest = categories
      .iter()
      .map(|c| c.name.chars().count())
      .max()
      .unwrap_or(0)
      .max(ALL.len());
    let width = (longest as u16 + 6).max(24).min(area.width);
    let height = (categories.len() as u16 + 3).min(area.height);

    // Center the overlay
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let title = if categories.is_empty() {
      " Category (loading...) "
    } else {
      " Category "
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(title);

    let items: Vec<ListItem> = std::iter::once(ListItem::new(Line::from(Span::styled(
      ALL,
      Style::default().fg(Color::White).italic(),
    ))))
    .chain(categories.iter().map(|category| {
      ListItem::new(Line::from(Span::styled(
        category.name.as_str(),
        Style::default().fg(Color::Cyan),
      )))
    }))
    .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));
    frame.render_stateful_widget(list, overlay_area, &mut state);
  }
}
