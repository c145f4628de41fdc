use crate::api::types::User;
use crate::query::Query;
use crate::store::{UserState, UserStore};
use crate::ui::renderfns::field;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::ViewContext;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::sync::watch;

/// Full profile of one user
pub struct UserDetailView {
  id: String,
  label: String,
  store: UserStore,
  state: watch::Receiver<UserState>,
  task: Query<()>,
}

impl UserDetailView {
  pub fn new(ctx: &ViewContext, id: String, label: String) -> Self {
    let store = ctx.stores.users.clone();
    let mut view = Self {
      id,
      label,
      state: store.subscribe(),
      store,
      task: Query::new(),
    };
    view.load();
    view
  }

  fn load(&mut self) {
    let store = self.store.clone();
    let id = self.id.clone();
    self.task.run(async move {
      store.fetch_user_by_id(&id).await;
      Ok(())
    });
  }

  /// The selected user, if it is the one this view asked for
  fn user(state: &UserState, id: &str) -> Option<User> {
    state
      .selected_user
      .as_ref()
      .filter(|u| u.id.to_string() == id)
      .cloned()
  }

  fn section(title: &str, lines: Vec<Line<'static>>) -> Paragraph<'static> {
    Paragraph::new(lines)
      .wrap(Wrap { trim: true })
      .block(
        Block::default()
          .title(format!(" {} ", title))
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::DarkGray)),
      )
  }

  fn render_user(&self, frame: &mut Frame, area: Rect, user: &User) {
    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(2),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Min(0),
      ])
      .split(area);
    let top = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
      .split(rows[1]);
    let bottom = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
      .split(rows[2]);

    let heading = Line::from(vec![
      Span::styled(user.full_name(), Style::default().fg(Color::Cyan).bold()),
      Span::styled(format!("  @{}", user.username), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(heading), rows[0]);

    frame.render_widget(
      Self::section(
        "Contact",
        vec![
          field("Email", &user.email),
          field("Phone", &user.phone),
          field("Username", &user.username),
        ],
      ),
      top[0],
    );
    frame.render_widget(
      Self::section(
        "Personal",
        vec![
          field("Gender", &user.gender),
          field("Birth date", &user.birth_date),
          field("Age", user.age.to_string()),
          field("Blood", &user.blood_group),
          field(
            "Body",
            format!("{:.1} cm, {:.1} kg", user.height, user.weight),
          ),
        ],
      ),
      top[1],
    );

    let address = &user.address;
    frame.render_widget(
      Self::section(
        "Address",
        vec![
          field("Street", &address.address),
          field("City", &address.city),
          field(
            "State",
            format!("{} {}", address.state, address.postal_code).trim().to_string(),
          ),
          field("Country", address.country.clone().unwrap_or_default()),
        ],
      ),
      bottom[0],
    );
    frame.render_widget(
      Self::section(
        "Company",
        vec![
          field("Name", &user.company.name),
          field("Title", &user.company.title),
          field("Department", &user.company.department),
        ],
      ),
      bottom[1],
    );
  }
}

impl View for UserDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        self.load();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.state.borrow().clone();
    let user = Self::user(&state, &self.id);

    let title = if state.loading {
      format!(" {} (loading...) ", self.label)
    } else {
      format!(" {} ", self.label)
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    match user {
      Some(user) => self.render_user(frame, inner, &user),
      None if state.loading || self.task.is_loading() => {
        frame.render_widget(
          Paragraph::new("Loading user...").style(Style::default().fg(Color::DarkGray)),
          inner,
        );
      }
      None => {
        let mut lines = vec![Line::styled("User not found", Style::default().fg(Color::Red))];
        if let Some(error) = &state.error {
          lines.push(Line::styled(error.clone(), Style::default().fg(Color::DarkGray)));
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled("Press 'r' to retry.", Style::default().fg(Color::DarkGray)));
        frame.render_widget(Paragraph::new(lines), inner);
      }
    }
  }

  fn breadcrumb_label(&self) -> String {
    self.label.clone()
  }

  fn tick(&mut self) {
    self.task.poll();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![Shortcut::new("r", "refresh"), Shortcut::new("q", "back")]
  }
}
