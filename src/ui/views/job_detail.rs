use crate::error::Error;
use crate::query::Query;
use crate::remotive::{CachedJobsClient, Job};
use crate::routes::Route;
use crate::ui::renderfns::{format_posted_date, DateStyle};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// What the detail page is showing. Exactly one applies at a time.
#[derive(Debug)]
pub enum DetailState<'a> {
  Loading,
  Error(&'a Error),
  NotFound,
  Loaded(&'a Job),
}

/// View for one job, looked up by id
pub struct JobDetailView {
  id: String,
  client: CachedJobsClient,
  query: Query<Option<Job>>,
  scroll: u16,
}

impl JobDetailView {
  pub fn new(id: String, client: CachedJobsClient) -> Self {
    let fetch_client = client.clone();
    let job_id = id.clone();
    let query = Query::new(move || {
      let client = fetch_client.clone();
      let id = job_id.clone();
      async move { client.fetch_job_by_id(&id).await }
    });

    let mut view = Self::with_query(id, client, query);
    // Start fetching immediately
    view.query.fetch();
    view
  }

  /// Build the view around an existing query without starting it
  pub fn with_query(id: String, client: CachedJobsClient, query: Query<Option<Job>>) -> Self {
    Self {
      id,
      client,
      query,
      scroll: 0,
    }
  }

  pub fn state(&self) -> DetailState<'_> {
    match (self.query.data(), self.query.error()) {
      (Some(Some(job)), _) => DetailState::Loaded(job),
      (Some(None), _) => DetailState::NotFound,
      (None, Some(error)) => DetailState::Error(error),
      (None, _) => DetailState::Loading,
    }
  }

  fn retry(&mut self) {
    if let Err(e) = self.client.invalidate_job(&self.id) {
      warn!(error = %e, id = %self.id, "Failed to invalidate cached job");
    }
    self.query.refetch();
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let title = match self.state() {
      DetailState::Loaded(job) => format!(" {} ", job.title()),
      _ => format!(" Job {} ", self.id),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let job = match self.state() {
      DetailState::Loading => {
        let paragraph =
          Paragraph::new("Loading job details...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, inner);
        return;
      }
      DetailState::Error(error) => {
        let paragraph = Paragraph::new(format!(
          "Error loading job\n\n{}\n\nPress 'r' to try again, 'q' to go back.",
          error
        ))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red));
        frame.render_widget(paragraph, inner);
        return;
      }
      DetailState::NotFound => {
        let paragraph = Paragraph::new(
          "Job not found\n\nThis listing may have been removed or filled.\n\nPress 'q' to go back to all jobs.",
        )
        .style(Style::default().fg(Color::Yellow));
        frame.render_widget(paragraph, inner);
        return;
      }
      DetailState::Loaded(job) => job,
    };

    let mut header = vec![
      company_line(job),
      Line::from(vec![
        Span::styled("Location: ", Style::default().fg(Color::DarkGray)),
        Span::raw(job.location().to_string()),
        Span::raw("  "),
        Span::styled("Type: ", Style::default().fg(Color::DarkGray)),
        Span::styled(job.job_type().to_string(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled("Posted: ", Style::default().fg(Color::DarkGray)),
        Span::raw(format_posted_date(job.posted_date(), DateStyle::Long)),
      ]),
    ];

    if job.has_salary() {
      header.push(Line::from(vec![
        Span::styled("Salary: ", Style::default().fg(Color::DarkGray)),
        Span::styled(job.salary().to_string(), Style::default().fg(Color::Green)),
      ]));
    }

    if !job.tags().is_empty() {
      header.push(Line::from(vec![
        Span::styled("Tags: ", Style::default().fg(Color::DarkGray)),
        Span::styled(job.tags().join(", "), Style::default().fg(Color::Cyan)),
      ]));
    }

    header.push(Line::from(vec![
      Span::styled("Apply: ", Style::default().fg(Color::DarkGray)),
      Span::styled(
        job.apply_url().to_string(),
        Style::default().fg(Color::Blue).underlined(),
      ),
    ]));

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(header.len() as u16),
        Constraint::Length(1), // Separator
        Constraint::Min(1),    // Description
      ])
      .split(inner);

    frame.render_widget(Paragraph::new(header), chunks[0]);

    let sep = Paragraph::new("─".repeat(chunks[1].width as usize))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, chunks[1]);

    let description = Paragraph::new(job.full_description())
      .wrap(Wrap { trim: true })
      .scroll((self.scroll, 0));
    frame.render_widget(description, chunks[2]);
  }

  fn handle_loaded_keys(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let url = match self.state() {
      DetailState::Loaded(job) => job.apply_url().to_string(),
      _ => return None,
    };

    match key.code {
      KeyCode::Char('o') => {
        match open_in_browser(&url) {
          Ok(()) => info!(%url, "Opened apply link"),
          Err(e) => warn!(error = %e, %url, "Failed to open apply link"),
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('j') | KeyCode::Down => {
        self.scroll = self.scroll.saturating_add(1);
        Some(ViewAction::None)
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.scroll = self.scroll.saturating_sub(1);
        Some(ViewAction::None)
      }
      _ => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('r') => {
        // Only a failed lookup can be retried; not-found is final
        if matches!(self.state(), DetailState::Error(_)) {
          self.retry();
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Pop),
      _ => None,
    }
  }
}

/// Company name followed by its logo link, or a placeholder when the
/// listing has none
fn company_line(job: &Job) -> Line<'static> {
  let logo = match job.company_logo() {
    Some(url) => Span::styled(format!("  logo: {}", url), Style::default().fg(Color::DarkGray)),
    None => Span::styled("  [no logo]", Style::default().fg(Color::DarkGray).italic()),
  };
  Line::from(vec![
    Span::styled(
      job.company_name().to_string(),
      Style::default().fg(Color::White).bold(),
    ),
    logo,
  ])
}

/// Hand a URL to the platform's default opener
fn open_in_browser(url: &str) -> std::io::Result<()> {
  #[cfg(target_os = "macos")]
  let mut command = Command::new("open");
  #[cfg(target_os = "windows")]
  let mut command = {
    let mut c = Command::new("cmd");
    c.args(["/C", "start", ""]);
    c
  };
  #[cfg(not(any(target_os = "macos", target_os = "windows")))]
  let mut command = Command::new("xdg-open");

  command
    .arg(url)
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .map(|_| ())
}

impl View for JobDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_loaded_keys(key)
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    match self.state() {
      DetailState::Loaded(job) => job.title().to_string(),
      _ => self.id.clone(),
    }
  }

  fn context(&self) -> Option<String> {
    match self.state() {
      DetailState::Loaded(job) => Some(job.company_name().to_string()),
      _ => None,
    }
  }

  fn route(&self) -> Route {
    Route::JobDetail(self.id.clone())
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![ShortcutInfo::new(":", "command").with_priority(10)];
    match self.state() {
      DetailState::Loaded(_) => {
        shortcuts.push(ShortcutInfo::new("o", "apply").with_priority(20));
        shortcuts.push(ShortcutInfo::new("j/k", "scroll").with_priority(30));
      }
      DetailState::Error(_) => shortcuts.push(ShortcutInfo::new("r", "retry").with_priority(20)),
      DetailState::Loading | DetailState::NotFound => {}
    }
    shortcuts.push(ShortcutInfo::new("q", "back").with_priority(90));
    shortcuts
  }
}
