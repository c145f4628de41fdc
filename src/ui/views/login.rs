use crate::config::Config;
use crate::query::{Query, QueryState};
use crate::store::AuthStore;
use crate::ui::components::{InputResult, TextInput};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::ViewContext;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Username,
  Password,
}

/// Sign-in form. A successful login updates the auth store; the app then
/// routes to the dashboard.
pub struct LoginView {
  auth: AuthStore,
  username: TextInput,
  password: TextInput,
  focus: Field,
  query: Query<()>,
}

impl LoginView {
  pub fn new(ctx: &ViewContext) -> Self {
    let username = TextInput::with_value(ctx.login_username.as_deref().unwrap_or_default());
    let password = TextInput::with_value(&Config::get_password().unwrap_or_default());
    let focus = if username.is_empty() {
      Field::Username
    } else {
      Field::Password
    };

    Self {
      auth: ctx.stores.auth.clone(),
      username,
      password,
      focus,
      query: Query::new(),
    }
  }

  fn focused(&mut self) -> &mut TextInput {
    match self.focus {
      Field::Username => &mut self.username,
      Field::Password => &mut self.password,
    }
  }

  fn toggle_focus(&mut self) {
    self.focus = match self.focus {
      Field::Username => Field::Password,
      Field::Password => Field::Username,
    };
  }

  fn submit(&mut self) {
    let username = self.username.value().trim().to_string();
    let password = self.password.value();
    if username.is_empty() || password.is_empty() {
      self.focus = if username.is_empty() {
        Field::Username
      } else {
        Field::Password
      };
      return;
    }

    let auth = self.auth.clone();
    self.query.run(async move {
      auth
        .login(&username, &password)
        .await
        .map_err(|e| format!("Login failed: {}", e))
    });
  }

  fn field_line(&self, field: Field, label: &str, input: &TextInput) -> Line<'static> {
    let focused = self.focus == field;
    let label_style = if focused {
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![
      Span::styled(format!("{:<10}", label), label_style),
      Span::raw(input.display(field == Field::Password)),
    ];
    if focused {
      spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
  }
}

impl View for LoginView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.query.is_loading() {
      if key.code == KeyCode::Esc {
        self.query.cancel();
      }
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.toggle_focus(),
      _ => match self.focused().handle_key(key) {
        InputResult::Submitted(_) => match self.focus {
          Field::Username => self.focus = Field::Password,
          Field::Password => self.submit(),
        },
        InputResult::Cancelled => self.focused().clear(),
        InputResult::Consumed | InputResult::NotHandled => {}
      },
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let width = 50.min(area.width);
    let height = 9.min(area.height);
    let form = Rect::new(
      area.x + area.width.saturating_sub(width) / 2,
      area.y + area.height.saturating_sub(height) / 2,
      width,
      height,
    );

    let block = Block::default()
      .title(" Sign in ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let status = match self.query.state() {
      QueryState::Loading => Line::styled(
        "Signing in... (Esc to cancel)",
        Style::default().fg(Color::DarkGray),
      ),
      QueryState::Error(e) => Line::styled(e.clone(), Style::default().fg(Color::Red)),
      _ => Line::styled(
        "Enter to continue, Tab to switch field",
        Style::default().fg(Color::DarkGray),
      ),
    };

    let lines = vec![
      Line::raw(""),
      self.field_line(Field::Username, "Username", &self.username),
      Line::raw(""),
      self.field_line(Field::Password, "Password", &self.password),
      Line::raw(""),
      status,
    ];

    let paragraph = Paragraph::new(lines)
      .block(block)
      .wrap(ratatui::widgets::Wrap { trim: true });
    frame.render_widget(paragraph, form);
  }

  fn breadcrumb_label(&self) -> String {
    "Login".to_string()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn captures_input(&self) -> bool {
    true
  }

  fn requires_auth(&self) -> bool {
    false
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("tab", "switch field"),
      Shortcut::new("enter", "sign in"),
      Shortcut::new("ctrl-c", "quit").with_priority(200),
    ]
  }
}
