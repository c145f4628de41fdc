use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::store::AuthState;
use crate::ui::components::{CommandInput, KeyResult};
use crate::ui::renderfns::{self, HeaderInfo};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{DashboardView, LoginView, ProductListView, UserListView};
use crate::ui::{self, ViewContext};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Main application state
pub struct App {
  ctx: ViewContext,

  title: String,
  host: String,

  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Command line opened with `:`
  command: CommandInput,

  auth: watch::Receiver<AuthState>,

  /// Last error or notice, cleared on the next key press
  status: Option<String>,

  should_quit: bool,
}

impl App {
  pub fn new(ctx: ViewContext, config: &Config, host: &str) -> Self {
    let auth = ctx.stores.auth.subscribe();
    let root: Box<dyn View> = if auth.borrow().token.is_some() {
      Box::new(DashboardView::new(ctx.clone()))
    } else {
      Box::new(LoginView::new(&ctx))
    };

    Self {
      title: config.title().to_string(),
      host: host.to_string(),
      view_stack: vec![root],
      command: CommandInput::new(),
      auth,
      status: None,
      should_quit: false,
      ctx,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250));
    let result = self.event_loop(&mut terminal, &mut events).await;

    // Cleanup terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Resize => {}
      Event::Tick => {
        if let Some(view) = self.view_stack.last_mut() {
          view.tick();
        }
      }
    }
    self.sync_auth();
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }
    self.status = None;

    let captures = self.current_view().is_some_and(|v| v.captures_input());
    if !captures || self.command.is_active() {
      match self.command.handle_key(key) {
        KeyResult::Event(name) => {
          self.execute_command(&name);
          return;
        }
        KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    self.apply(action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn set_root(&mut self, view: Box<dyn View>) {
    debug!(view = %view.breadcrumb_label(), "Switching root view");
    self.view_stack.clear();
    self.view_stack.push(view);
  }

  fn execute_command(&mut self, name: &str) {
    match name {
      "dashboard" | "users" | "products" if self.auth.borrow().token.is_none() => {
        self.status = Some("Sign in first".to_string());
      }
      "dashboard" => self.set_root(Box::new(DashboardView::new(self.ctx.clone()))),
      "users" => self.set_root(Box::new(UserListView::new(self.ctx.clone()))),
      "products" => self.set_root(Box::new(ProductListView::new(self.ctx.clone()))),
      "login" => {
        self.ctx.stores.auth.logout();
        self.set_root(Box::new(LoginView::new(&self.ctx)));
      }
      "logout" => {
        self.ctx.stores.auth.logout();
        info!("Signed out");
        self.set_root(Box::new(LoginView::new(&self.ctx)));
        self.status = Some("Signed out".to_string());
      }
      "quit" => self.should_quit = true,
      "" => {}
      other => self.status = Some(format!("Unknown command: {}", other)),
    }
  }

  /// Route to the login screen when the token goes away, and on to the
  /// dashboard once one arrives.
  fn sync_auth(&mut self) {
    let authenticated = self.auth.borrow_and_update().token.is_some();
    let root_requires_auth = self.view_stack.first().map_or(true, |v| v.requires_auth());

    if root_requires_auth && !authenticated {
      info!("Session ended, showing login");
      self.set_root(Box::new(LoginView::new(&self.ctx)));
    } else if !root_requires_auth && authenticated {
      self.set_root(Box::new(DashboardView::new(self.ctx.clone())));
    }
  }

  fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn render_header(&self, frame: &mut Frame, area: Rect) {
    let auth = self.auth.borrow();
    let info = HeaderInfo {
      title: &self.title,
      host: &self.host,
      user: auth.user.as_ref().map(|u| u.username.as_str()),
    };
    let shortcuts = self.current_view().map(|v| v.shortcuts()).unwrap_or_default();
    renderfns::draw_header(frame, area, &info, &shortcuts);
  }

  pub fn render_view(&mut self, frame: &mut Frame, area: Rect) {
    if let Some(view) = self.view_stack.last_mut() {
      view.render(frame, area);
    }
  }

  pub fn render_overlays(&self, frame: &mut Frame, area: Rect) {
    self.command.render_overlay(frame, area);
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self.view_stack.iter().map(|v| v.breadcrumb_label()).collect()
  }

  pub fn status(&self) -> Option<&str> {
    self.status.as_deref()
  }
}
