use crate::query::{Query, QueryState};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::{ProductListView, UserListView};
use crate::ui::ViewContext;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// First-page results behind the two panels
#[derive(Debug, Clone, Default, PartialEq)]
struct Totals {
  users: Option<u64>,
  products: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
  Users,
  Products,
}

/// Landing view with one panel per section
pub struct DashboardView {
  ctx: ViewContext,
  query: Query<Totals>,
  selected: Panel,
}

impl DashboardView {
  pub fn new(ctx: ViewContext) -> Self {
    let mut view = Self {
      ctx,
      query: Query::new(),
      selected: Panel::Users,
    };
    view.load();
    view
  }

  /// Fetch the first page of both lists. These are the same queries the list
  /// views start with, so opening a panel is served from cache.
  fn load(&mut self) {
    let users = self.ctx.stores.users.clone();
    let products = self.ctx.stores.products.clone();
    let (users_limit, products_limit) = (self.ctx.users_per_page, self.ctx.products_per_page);

    self.query.run(async move {
      futures::join!(
        users.fetch_users(users_limit, 0),
        products.fetch_products(products_limit, 0),
      );

      let users = users.snapshot();
      let products = products.snapshot();
      Ok(Totals {
        users: users.error.is_none().then_some(users.total),
        products: products.error.is_none().then_some(products.total),
      })
    });
  }

  fn open(&self, panel: Panel) -> ViewAction {
    match panel {
      Panel::Users => ViewAction::Push(Box::new(UserListView::new(self.ctx.clone()))),
      Panel::Products => ViewAction::Push(Box::new(ProductListView::new(self.ctx.clone()))),
    }
  }

  fn render_panel(&self, frame: &mut Frame, area: Rect, panel: Panel) {
    let (title, blurb, total) = match panel {
      Panel::Users => (
        "Users",
        "Manage user accounts",
        self.query.data().and_then(|t| t.users),
      ),
      Panel::Products => (
        "Products",
        "Manage your products",
        self.query.data().and_then(|t| t.products),
      ),
    };

    let border = if self.selected == panel {
      Color::Yellow
    } else {
      Color::Blue
    };
    let block = Block::default()
      .title(format!(" {} ", title))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border));

    let total_line = match (self.query.state(), total) {
      (QueryState::Loading, _) => Line::styled("loading...", Style::default().fg(Color::DarkGray)),
      (_, Some(total)) => Line::from(vec![
        Span::styled(total.to_string(), Style::default().fg(Color::Cyan).bold()),
        Span::raw(" total"),
      ]),
      _ => Line::styled("unavailable", Style::default().fg(Color::Red)),
    };

    let lines = vec![
      Line::raw(""),
      total_line,
      Line::raw(""),
      Line::styled(blurb, Style::default().fg(Color::DarkGray)),
      Line::raw(""),
      Line::styled(
        format!("Enter: view {}", title.to_lowercase()),
        Style::default().fg(Color::DarkGray),
      ),
    ];

    let paragraph = Paragraph::new(lines)
      .alignment(Alignment::Center)
      .block(block);
    frame.render_widget(paragraph, area);
  }
}

impl View for DashboardView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Left | KeyCode::Char('h') => self.selected = Panel::Users,
      KeyCode::Right | KeyCode::Char('l') => self.selected = Panel::Products,
      KeyCode::Tab => {
        self.selected = match self.selected {
          Panel::Users => Panel::Products,
          Panel::Products => Panel::Users,
        }
      }
      KeyCode::Char('u') => return self.open(Panel::Users),
      KeyCode::Char('p') => return self.open(Panel::Products),
      KeyCode::Enter => return self.open(self.selected),
      KeyCode::Char('r') => self.load(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(10), Constraint::Min(0)])
      .split(area);
    let columns = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
      .split(rows[0]);

    self.render_panel(frame, columns[0], Panel::Users);
    self.render_panel(frame, columns[1], Panel::Products);
  }

  fn breadcrumb_label(&self) -> String {
    "Dashboard".to_string()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("u", "users").with_priority(20),
      Shortcut::new("p", "products").with_priority(21),
      Shortcut::new("r", "refresh").with_priority(40),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::mock::{page, product, user, MockApi};
  use crate::config::Config;
  use crate::store::{MemorySessionStorage, Stores};
  use crossterm::event::KeyModifiers;
  use std::sync::Arc;
  use std::time::Duration;

  fn context(api: Arc<MockApi>) -> ViewContext {
    let stores = Stores::new(api, Arc::new(MemorySessionStorage::new()), &Config::default()).unwrap();
    ViewContext::new(stores, &Config::default())
  }

  #[tokio::test]
  async fn test_dashboard_loads_totals() {
    let api = Arc::new(
      MockApi::new()
        .with_users_page(10, 0, page(vec![user(1, "Emily")], 208))
        .with_products_page(12, 0, page(vec![product(1, "Mascara")], 194)),
    );
    let mut view = DashboardView::new(context(api.clone()));

    tokio::time::sleep(Duration::from_millis(20)).await;
    view.tick();

    assert_eq!(
      view.query.data(),
      Some(&Totals {
        users: Some(208),
        products: Some(194),
      })
    );
  }

  #[tokio::test]
  async fn test_failed_panel_has_no_total() {
    let api = Arc::new(MockApi::new().with_users_page(10, 0, page(vec![user(1, "Emily")], 208)));
    let mut view = DashboardView::new(context(api));

    tokio::time::sleep(Duration::from_millis(20)).await;
    view.tick();

    let totals = view.query.data().cloned().unwrap_or_default();
    assert_eq!(totals.users, Some(208));
    assert_eq!(totals.products, None);
  }

  #[tokio::test]
  async fn test_enter_opens_selected_panel() {
    let api = Arc::new(MockApi::new());
    let mut view = DashboardView::new(context(api));

    view.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE));
    let action = view.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

    match action {
      ViewAction::Push(next) => assert_eq!(next.breadcrumb_label(), "Products"),
      _ => panic!("expected the products list to be pushed"),
    }
  }
}
