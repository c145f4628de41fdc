use crate::api::types::Product;
use crate::query::Query;
use crate::store::{ProductState, ProductStore};
use crate::ui::components::{CategoryEvent, CategoryPicker, KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{page_count, rating_color, stock_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::ProductDetailView;
use crate::ui::ViewContext;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tokio::sync::watch;

/// What the list is currently showing. Search and category filter are
/// mutually exclusive, and paging only applies to the plain listing.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Filter {
  Page(u32),
  Search(String),
  Category(String),
}

/// Paged product list with search and a category filter
pub struct ProductListView {
  ctx: ViewContext,
  store: ProductStore,
  state: watch::Receiver<ProductState>,
  task: Query<()>,
  categories_task: Query<()>,
  filter: Filter,
  list_state: ListState,
  search: SearchInput,
  picker: CategoryPicker,
}

impl ProductListView {
  pub fn new(ctx: ViewContext) -> Self {
    let store = ctx.stores.products.clone();
    let mut view = Self {
      state: store.subscribe(),
      store,
      ctx,
      task: Query::new(),
      categories_task: Query::new(),
      filter: Filter::Page(1),
      list_state: ListState::default(),
      search: SearchInput::new("Search products"),
      picker: CategoryPicker::new(),
    };
    view.load_categories();
    view.dispatch();
    view
  }

  fn per_page(&self) -> u32 {
    self.ctx.products_per_page
  }

  fn load_categories(&mut self) {
    let store = self.store.clone();
    self.categories_task.run(async move {
      store.fetch_categories().await;
      Ok(())
    });
  }

  /// Issue the query for the current filter
  fn dispatch(&mut self) {
    let store = self.store.clone();
    let filter = self.filter.clone();
    let per_page = self.per_page();

    self.list_state.select(None);
    self.task.run(async move {
      match filter {
        Filter::Page(page) => store.fetch_products(per_page, (page - 1) * per_page).await,
        Filter::Search(term) => store.search_products(&term).await,
        Filter::Category(slug) => store.fetch_products_by_category(&slug).await,
      }
      Ok(())
    });
  }

  fn set_filter(&mut self, filter: Filter) {
    if filter != self.filter {
      self.filter = filter;
      self.dispatch();
    }
  }

  fn change_page(&mut self, forward: bool) {
    if let Filter::Page(page) = self.filter {
      let pages = page_count(self.state.borrow().total, self.per_page());
      let next = if forward {
        (page + 1).min(pages)
      } else {
        page.saturating_sub(1).max(1)
      };
      self.set_filter(Filter::Page(next));
    }
  }

  fn current_category(&self) -> Option<&str> {
    match &self.filter {
      Filter::Category(slug) => Some(slug),
      _ => None,
    }
  }

  fn selected_product(&self) -> Option<Product> {
    let idx = self.list_state.selected()?;
    self.state.borrow().products.get(idx).cloned()
  }

  fn title(&self, state: &ProductState) -> String {
    let scope = match &self.filter {
      Filter::Page(page) => format!(
        "page {}/{}, {} total",
        page,
        page_count(state.total, self.per_page()),
        state.total
      ),
      Filter::Search(term) => format!("search \"{}\", {} found", term, state.total),
      Filter::Category(slug) => format!("category {}, {} found", slug, state.total),
    };

    if state.loading {
      format!(" Products [{}] (loading...) ", scope)
    } else {
      format!(" Products [{}] ", scope)
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.state.borrow().clone();
    ensure_valid_selection(&mut self.list_state, state.products.len());

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
        Constraint::Length(1),
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
      "  {:<32} {:<18} {:>9} {:>6} {:>6}",
      "Title", "Category", "Price", "Rating", "Stock"
    );
    frame.render_widget(
      Paragraph::new(heading).style(Style::default().fg(Color::DarkGray).bold()),
      chunks[1],
    );

    if state.products.is_empty() {
      if !state.loading && state.error.is_none() {
        frame.render_widget(
          Paragraph::new("  No products found.").style(Style::default().fg(Color::DarkGray)),
          chunks[2],
        );
      }
      return;
    }

    let items: Vec<ListItem> = state
      .products
      .iter()
      .map(|product| {
        ListItem::new(Line::from(vec![
          Span::styled(
            format!("{:<32}", truncate(&product.title, 32)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<18}", truncate(&product.category, 18)),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(format!(" {:>9}", format!("${:.2}", product.price))),
          Span::styled(
            format!(" {:>6.2}", product.rating),
            Style::default().fg(rating_color(product.rating)),
          ),
          Span::styled(
            format!(" {:>6}", product.stock),
            Style::default().fg(stock_color(product.stock)),
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

impl View for ProductListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    let categories = self.state.borrow().categories.clone();
    match self.picker.handle_key(key, &categories) {
      KeyResult::Event(CategoryEvent::Selected(slug)) => {
        self.search.reset();
        self.set_filter(match slug {
          Some(slug) => Filter::Category(slug),
          None => Filter::Page(1),
        });
        return ViewAction::None;
      }
      KeyResult::Event(CategoryEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(term)) => {
        self.set_filter(if term.is_empty() {
          Filter::Page(1)
        } else {
          Filter::Search(term)
        });
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
      KeyCode::Char('c') => {
        if categories.is_empty() {
          // Retry in case the first attempt failed
          self.load_categories();
        }
        let current = self.current_category().map(str::to_string);
        self.picker.show(&categories, current.as_deref());
      }
      KeyCode::Char('r') => self.dispatch(),
      KeyCode::Enter => {
        if let Some(product) = self.selected_product() {
          return ViewAction::Push(Box::new(ProductDetailView::new(
            &self.ctx,
            product.id.to_string(),
            product.title,
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
    let categories = self.state.borrow().categories.clone();
    self.picker.render_overlay(frame, area, &categories);
  }

  fn breadcrumb_label(&self) -> String {
    match &self.filter {
      Filter::Page(_) => "Products".to_string(),
      Filter::Search(term) => format!("Products [{}]", term),
      Filter::Category(slug) => format!("Products [{}]", slug),
    }
  }

  fn tick(&mut self) {
    self.task.poll();
    self.categories_task.poll();
  }

  fn captures_input(&self) -> bool {
    self.search.is_active() || self.picker.is_active()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("/", "search").with_priority(20),
      Shortcut::new("c", "category").with_priority(22),
      Shortcut::new("n/p", "page").with_priority(25),
      Shortcut::new("r", "refresh").with_priority(40),
      Shortcut::new("q", "back").with_priority(50),
    ]
  }
}
