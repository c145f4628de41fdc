use crate::ui::view::Shortcut;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// What the header shows besides shortcuts
pub struct HeaderInfo<'a> {
  pub title: &'a str,
  pub host: &'a str,
  /// Username of the session, if logged in
  pub user: Option<&'a str>,
}

/// Draw the header bar with title, API host, account and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, info: &HeaderInfo, shortcuts: &[Shortcut]) {
  let separator = || Span::styled("│", Style::default().fg(Color::DarkGray));

  let account = match info.user {
    Some(user) => Span::styled(format!(" {} ", user), Style::default().fg(Color::Yellow).bold()),
    None => Span::styled(" not signed in ", Style::default().fg(Color::DarkGray)),
  };

  let mut spans = vec![
    Span::styled(format!(" {} ", info.title), Style::default().fg(Color::Cyan).bold()),
    separator(),
    Span::styled(format!(" {} ", info.host), Style::default().fg(Color::White)),
    separator(),
    account,
    Span::raw(" "),
  ];

  let mut shortcuts = shortcuts.to_vec();
  shortcuts.sort_by_key(|s| s.priority);
  for shortcut in &shortcuts {
    // Keys highlighted, descriptions dimmed
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Host part of a base URL, for display
pub fn display_host(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}
