use crate::api::types::User;
use crate::query::Query;
use crate::store::{UserState, UserStore};
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{page_count, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::UserDetailView;
use crate::ui::ViewContext;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tokio::sync::watch;

/// Paged, searchable list of users
pub struct UserListView {
  ctx: ViewContext,
  store: UserStore,
  state: watch::Receiver<UserState>,
  task: Query<()>,
  /// 1-based page, ignored while searching
  page: u32,
  list_state: ListState,
  search: SearchInput,
}

impl UserListView {
  pub fn new(ctx: ViewContext) -> Self {
    let store = ctx.stores.users.clone();
    let mut view = Self {
      state: store.subscribe(),
      store,
      ctx,
      task: Query::new(),
      page: 1,
      list_state: ListState::default(),
      search: SearchInput::new("Search users"),
    };
    view.dispatch();
    view
  }

  fn per_page(&self) -> u32 {
    self.ctx.users_per_page
  }

  fn is_searching(&self) -> bool {
    !self.search.term().is_empty()
  }

  /// Issue the query for the current page or search term
  fn dispatch(&mut self) {
    let store = self.store.clone();
    let term = self.search.term();
    let (limit, skip) = (self.per_page(), (self.page - 1) * self.per_page());

    self.list_state.select(None);
    self.task.run(async move {
      if term.is_empty() {
        store.fetch_users(limit, skip).await;
      } else {
        store.search_users(&term).await;
      }
      Ok(())
    });
  }

  fn change_page(&mut self, forward: bool) {
    if self.is_searching() {
      return;
    }
    let pages = page_count(self.state.borrow().total, self.per_page());
    let next = if forward {
      (self.page + 1).min(pages)
    } else {
      self.page.saturating_sub(1).max(1)
    };
    if next != self.page {
      self.page = next;
      self.dispatch();
    }
  }

  fn selected_user(&self) -> Option<User> {
    let idx = self.list_state.selected()?;
    self.state.borrow().users.get(idx).cloned()
  }

  fn title(&self, state: &UserState) -> String {
    let scope = if self.is_searching() {
      format!("search \"{}\", {} found", self.search.term(), state.total)
    } else {
      format!(
        "page {}/{}, {} total",
        self.page,
        page_count(state.total, self.per_page()),
        state.total
      )
    };

    if state.loading {
      format!(" Users [{}] (loading...) ", scope)
    } else {
      format!(" Users [{}] ", scope)
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.state.borrow().clone();
    ensure_valid_selection(&mut self.list_state, state.users.len());

    let block = Block::default()
      .title(self.title(&state))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(if state.error.is_some() { 1 } else { 0 }),
        Constraint::Length(1), // Column headings
        Constraint::Min(0),
      ])
      .split(inner);

    if let Some(error) = &state.error {
      frame.render_widget(
        Paragraph::new(format!("{}. Press 'r' to retry.", error)).style(Style::default().fg(Color::Red)),
        chunks[0],
      );
    }

    let heading = format!(
      "  {:<24} {:<8} {:<20} {}",
      "Name", "Gender", "Phone", "Company"
    );
    frame.render_widget(
      Paragraph::new(heading).style(Style::default().fg(Color::DarkGray).bold()),
      chunks[1],
    );

    if state.users.is_empty() {
      if !state.loading && state.error.is_none() {
        frame.render_widget(
          Paragraph::new("  No users found.").style(Style::default().fg(Color::DarkGray)),
          chunks[2],
        );
      }
      return;
    }

    let items: Vec<ListItem> = state
      .users
      .iter()
      .map(|user| {
        ListItem::new(Line::from(vec![
          Span::styled(
            format!("{:<24}", truncate(&user.full_name(), 24)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::raw(format!("{:<8}", truncate(&user.gender, 8))),
          Span::raw(" "),
          Span::raw(format!("{:<20}", truncate(&user.phone, 20))),
          Span::raw(" "),
          Span::styled(
            truncate(&user.company.name, 30),
            Style::default().fg(Color::DarkGray),
          ),
        ]))
      })
      .collect();

    let list = List::new(items)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[2], &mut self.list_state);
  }
}

impl View for UserListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(_)) => {
        // Search and paging are exclusive, a new term starts over
        self.page = 1;
        self.dispatch();
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('n') | KeyCode::Right => self.change_page(true),
      KeyCode::Char('p') | KeyCode::Left => self.change_page(false),
      KeyCode::Char('r') => self.dispatch(),
      KeyCode::Enter => {
        if let Some(user) = self.selected_user() {
          return ViewAction::Push(Box::new(UserDetailView::new(
            &self.ctx,
            user.id.to_string(),
            user.full_name(),
          )));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.search.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    if self.is_searching() {
      format!("Users [{}]", self.search.term())
    } else {
      "Users".to_string()
    }
  }

  fn tick(&mut self) {
    self.task.poll();
  }

  fn captures_input(&self) -> bool {
    self.search.is_active()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("/", "search").with_priority(20),
      Shortcut::new("n/p", "page").with_priority(25),
      Shortcut::new("r", "refresh").with_priority(40),
      Shortcut::new("q", "back").with_priority(50),
    ]
  }
}
