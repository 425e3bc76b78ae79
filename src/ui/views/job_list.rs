use crate::pagination::{sort_by_posted_desc, Paginator};
use crate::query::{Query, QueryStatus};
use crate::remotive::{CachedJobsClient, Job};
use crate::routes::Route;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_posted_date, truncate, DateStyle};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::JobDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use tracing::warn;

/// Paged list of job cards, newest first
pub struct JobListView {
  client: CachedJobsClient,
  category: String,
  limit: u32,
  query: Query<Vec<Job>>,
  /// Sorted copy of the last successful fetch
  jobs: Vec<Job>,
  paginator: Paginator,
  list_state: ListState,
}

impl JobListView {
  pub fn new(client: CachedJobsClient, category: String, limit: u32) -> Self {
    let fetch_client = client.clone();
    let fetch_category = category.clone();
    let query = Query::new(move || {
      let client = fetch_client.clone();
      let category = fetch_category.clone();
      async move { client.fetch_jobs(&category, limit).await }
    });

    let mut view = Self::with_query(client, category, limit, query);
    // Start fetching immediately
    view.query.fetch();
    view
  }

  /// Build the view around an existing query without starting it
  pub fn with_query(
    client: CachedJobsClient,
    category: String,
    limit: u32,
    query: Query<Vec<Job>>,
  ) -> Self {
    Self {
      client,
      category,
      limit,
      query,
      jobs: Vec::new(),
      paginator: Paginator::default(),
      list_state: ListState::default(),
    }
  }

  fn page_jobs(&self) -> &[Job] {
    self.paginator.slice(&self.jobs)
  }

  fn selected_job(&self) -> Option<&Job> {
    self
      .list_state
      .selected()
      .and_then(|idx| self.page_jobs().get(idx))
  }

  /// Take over freshly fetched data: sort it and re-clamp the page
  fn sync_jobs(&mut self) {
    let Some(data) = self.query.data() else {
      return;
    };

    let mut jobs = data.clone();
    sort_by_posted_desc(&mut jobs);
    self.jobs = jobs;
    self.paginator.set_total_items(self.jobs.len());
    let len = self.page_jobs().len();
    ensure_valid_selection(&mut self.list_state, len);
  }

  fn change_page(&mut self, changed: bool) {
    if changed {
      // Start each page at its first card
      self.list_state.select(Some(0));
    }
  }

  fn refresh(&mut self) {
    if let Err(e) = self.client.invalidate_jobs(&self.category, self.limit) {
      warn!(error = %e, "Failed to invalidate cached jobs");
    }
    self.query.refetch();
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let count = self.jobs.len();
    let title = match self.query.status() {
      QueryStatus::Loading if count > 0 => format!(" Remote Jobs ({}) (refreshing...) ", count),
      QueryStatus::Error(_) if count > 0 => format!(" Remote Jobs ({}) (refresh failed) ", count),
      _ => format!(" Remote Jobs ({}) ", count),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.query.is_loading() {
      let paragraph = Paragraph::new("Loading job opportunities...")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    if self.jobs.is_empty() {
      let paragraph = match self.query.error() {
        Some(error) => Paragraph::new(format!("{}\n\nPress 'r' to try again.", error))
          .style(Style::default().fg(Color::Red)),
        None if self.query.is_success() => Paragraph::new("No jobs available at the moment")
          .style(Style::default().fg(Color::DarkGray)),
        None => Paragraph::new(""),
      };
      frame.render_widget(paragraph.block(block).wrap(Wrap { trim: true }), area);
      return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let show_pager = self.paginator.total_pages() > 1;
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Count line
        Constraint::Min(1),    // Cards
        Constraint::Length(if show_pager { 1 } else { 0 }),
      ])
      .split(inner);

    let range = self.paginator.page_range();
    let count_line = Line::from(vec![
      Span::styled(
        format!("{} jobs found", self.jobs.len()),
        Style::default().fg(Color::White).bold(),
      ),
      Span::styled(
        format!("  showing {}-{}", range.start + 1, range.end),
        Style::default().fg(Color::DarkGray),
      ),
    ]);
    frame.render_widget(Paragraph::new(count_line), chunks[0]);

    let width = chunks[1].width.saturating_sub(4) as usize;
    let len = self.page_jobs().len();
    ensure_valid_selection(&mut self.list_state, len);

    // Collect items first to avoid borrow conflicts with list_state
    let items: Vec<ListItem> = self
      .page_jobs()
      .iter()
      .map(|job| job_card(job, width))
      .collect();

    let list = List::new(items)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[1], &mut self.list_state);

    if show_pager {
      let bar = Paragraph::new(pagination_line(&self.paginator)).alignment(Alignment::Center);
      frame.render_widget(bar, chunks[2]);
    }
  }

  // Key handling helpers for or_else chain pattern
  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
        Some(ViewAction::None)
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
        Some(ViewAction::None)
      }
      _ => None,
    }
  }

  fn handle_paging(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let changed = match key.code {
      KeyCode::Char('n') | KeyCode::Char('l') | KeyCode::Right => self.paginator.next(),
      KeyCode::Char('p') | KeyCode::Char('h') | KeyCode::Left => self.paginator.prev(),
      KeyCode::Char('g') => self.paginator.first(),
      KeyCode::Char('G') => self.paginator.last(),
      _ => return None,
    };
    self.change_page(changed);
    Some(ViewAction::None)
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('r') => {
        self.refresh();
        Some(ViewAction::None)
      }
      KeyCode::Enter => {
        let job = self.selected_job()?;
        Some(ViewAction::Push(Box::new(JobDetailView::new(
          job.id().to_string(),
          self.client.clone(),
        ))))
      }
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Pop),
      _ => None,
    }
  }
}

/// Three-line card: title, meta line, short description
fn job_card(job: &Job, width: usize) -> ListItem<'static> {
  let meta = format!(
    "{} · {} · {} · {}",
    job.company_name(),
    format_posted_date(job.posted_date(), DateStyle::Short),
    job.location(),
    job.job_type(),
  );

  ListItem::new(vec![
    Line::from(Span::styled(
      truncate(job.title(), width),
      Style::default().fg(Color::Cyan).bold(),
    )),
    Line::from(Span::styled(
      truncate(&meta, width),
      Style::default().fg(Color::Yellow),
    )),
    Line::from(Span::styled(
      truncate(job.short_description(), width),
      Style::default().fg(Color::DarkGray),
    )),
    Line::raw(""),
  ])
}

/// `‹ Prev  1 [2] 3  Next ›`, with the ends dimmed when unavailable
fn pagination_line(paginator: &Paginator) -> Line<'static> {
  let current = paginator.current_page();
  let total = paginator.total_pages();
  let enabled = Style::default().fg(Color::Cyan);
  let disabled = Style::default().fg(Color::DarkGray);

  let mut spans = vec![
    Span::styled("‹ Prev", if current > 1 { enabled } else { disabled }),
    Span::raw(" "),
  ];

  for page in 1..=total {
    spans.push(Span::raw(" "));
    if page == current {
      spans.push(Span::styled(
        format!("[{}]", page),
        Style::default().fg(Color::Yellow).bold(),
      ));
    } else {
      spans.push(Span::raw(page.to_string()));
    }
  }

  spans.push(Span::raw("  "));
  spans.push(Span::styled(
    "Next ›",
    if current < total { enabled } else { disabled },
  ));

  Line::from(spans)
}

impl View for JobListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_navigation(key)
      .or_else(|| self.handle_paging(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Jobs".to_string()
  }

  fn context(&self) -> Option<String> {
    if self.query.data().is_none() {
      return None;
    }
    Some(format!(
      "{} · page {}/{}",
      self.category,
      self.paginator.current_page(),
      self.paginator.total_pages().max(1)
    ))
  }

  fn route(&self) -> Route {
    Route::JobList
  }

  fn tick(&mut self) {
    if self.query.poll() {
      self.sync_jobs();
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("enter", "open").with_priority(20),
      ShortcutInfo::new("n/p", "page").with_priority(30),
      ShortcutInfo::new("r", if self.query.is_error() { "retry" } else { "refresh" })
        .with_priority(40),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
