use ratatui::prelude::*;

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Colour for a stock level
pub fn stock_color(stock: u64) -> Color {
  match stock {
    0 => Color::Red,
    1..=9 => Color::Yellow,
    _ => Color::Green,
  }
}

/// Colour for a 0-5 rating
pub fn rating_color(rating: f64) -> Color {
  if rating >= 4.0 {
    Color::Green
  } else if rating >= 3.0 {
    Color::Yellow
  } else {
    Color::Red
  }
}

/// A dimmed, padded label followed by its value
pub fn field(label: &str, value: impl Into<String>) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{:<12}", label), Style::default().fg(Color::DarkGray)),
    Span::raw(value.into()),
  ])
}

/// Number of pages for `total` items, never less than one
pub fn page_count(total: u64, per_page: u32) -> u32 {
  let per_page = u64::from(per_page.max(1));
  total.div_ceil(per_page).max(1) as u32
}
