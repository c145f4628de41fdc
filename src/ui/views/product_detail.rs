use crate::api::types::Product;
use crate::query::Query;
use crate::store::{ProductState, ProductStore};
use crate::ui::renderfns::{field, rating_color, stock_color};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::ViewContext;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::sync::watch;

/// Details of one product
pub struct ProductDetailView {
  id: String,
  label: String,
  store: ProductStore,
  state: watch::Receiver<ProductState>,
  task: Query<()>,
  scroll: u16,
}

impl ProductDetailView {
  pub fn new(ctx: &ViewContext, id: String, label: String) -> Self {
    let store = ctx.stores.products.clone();
    let mut view = Self {
      id,
      label,
      state: store.subscribe(),
      store,
      task: Query::new(),
      scroll: 0,
    };
    view.load();
    view
  }

  fn load(&mut self) {
    let store = self.store.clone();
    let id = self.id.clone();
    self.task.run(async move {
      store.fetch_product_by_id(&id).await;
      Ok(())
    });
  }

  fn lines(product: &Product) -> Vec<Line<'static>> {
    let mut price = vec![
      Span::styled(format!("{:<12}", "Price"), Style::default().fg(Color::DarkGray)),
      Span::styled(
        format!("${:.2}", product.price),
        Style::default().fg(Color::White).bold(),
      ),
    ];
    if product.discount_percentage > 0.0 {
      price.push(Span::styled(
        format!(
          "  -{:.2}% (${:.2})",
          product.discount_percentage,
          product.discounted_price()
        ),
        Style::default().fg(Color::Green),
      ));
    }

    let availability = if product.stock > 0 {
      "In Stock"
    } else {
      "Out of Stock"
    };

    let mut lines = vec![
      Line::styled(product.title.clone(), Style::default().fg(Color::Cyan).bold()),
      Line::raw(""),
      field("Brand", product.brand.clone().unwrap_or_else(|| "-".to_string())),
      field("Category", &product.category),
      Line::from(price),
      Line::from(vec![
        Span::styled(format!("{:<12}", "Rating"), Style::default().fg(Color::DarkGray)),
        Span::styled(
          format!("{:.2} / 5", product.rating),
          Style::default().fg(rating_color(product.rating)),
        ),
      ]),
      Line::from(vec![
        Span::styled(format!("{:<12}", "Stock"), Style::default().fg(Color::DarkGray)),
        Span::styled(
          format!("{} ({})", product.stock, availability),
          Style::default().fg(stock_color(product.stock)),
        ),
      ]),
    ];

    if let Some(sku) = &product.sku {
      lines.push(field("SKU", sku));
    }
    if !product.tags.is_empty() {
      lines.push(field("Tags", product.tags.join(", ")));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("Description", Style::default().fg(Color::DarkGray)));
    lines.push(Line::raw(product.description.clone()));

    if !product.reviews.is_empty() {
      lines.push(Line::raw(""));
      lines.push(Line::styled(
        format!("Reviews ({})", product.reviews.len()),
        Style::default().fg(Color::DarkGray),
      ));
      for review in &product.reviews {
        lines.push(Line::from(vec![
          Span::styled(
            format!("{:.0}* ", review.rating),
            Style::default().fg(rating_color(review.rating)),
          ),
          Span::raw(format!("{}: {}", review.reviewer_name, review.comment)),
        ]));
      }
    }
    lines
  }
}

impl View for ProductDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
      KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
      KeyCode::Char('r') => self.load(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.state.borrow().clone();
    let product = state
      .selected_product
      .as_ref()
      .filter(|p| p.id.to_string() == self.id);

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

    let paragraph = match product {
      Some(product) => Paragraph::new(Self::lines(product)).scroll((self.scroll, 0)),
      None if state.loading || self.task.is_loading() => {
        Paragraph::new("Loading product...").style(Style::default().fg(Color::DarkGray))
      }
      None => {
        let mut lines = vec![Line::styled("Product not found", Style::default().fg(Color::Red))];
        if let Some(error) = &state.error {
          lines.push(Line::styled(error.clone(), Style::default().fg(Color::DarkGray)));
        }
        Paragraph::new(lines)
      }
    };

    frame.render_widget(paragraph.wrap(Wrap { trim: false }).block(block), area);
  }

  fn breadcrumb_label(&self) -> String {
    self.label.clone()
  }

  fn tick(&mut self) {
    self.task.poll();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("j/k", "scroll"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "back"),
    ]
  }
}
