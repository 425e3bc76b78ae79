use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::remotive::CachedJobsClient;
use crate::routes::Route;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{JobDetailView, JobListView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Main application state
pub struct App {
  /// Navigation stack - the job list is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Command input component (after pressing :)
  command_input: CommandInput,

  /// Application configuration
  config: Config,

  /// Shared cached client; every view gets a clone
  client: CachedJobsClient,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, start: Route) -> Result<Self> {
    let client = CachedJobsClient::new(&config)?;

    let mut app = Self {
      view_stack: Vec::new(),
      command_input: CommandInput::new(),
      config,
      client,
      should_quit: false,
    };
    let root = app.job_list_view();
    app.view_stack.push(root);
    app.navigate(start);

    Ok(app)
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Cleanup terminal, even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(100));

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {} // Redrawn on the next pass
        None => break,
      }
    }

    Ok(())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command_input
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  /// Labels of every view on the stack, root first
  pub fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|view| view.breadcrumb_label())
      .collect()
  }

  /// Route of the view on top of the stack
  pub fn current_route(&self) -> Route {
    self
      .view_stack
      .last()
      .map(|view| view.route())
      .unwrap_or_default()
  }

  fn job_list_view(&self) -> Box<dyn View> {
    Box::new(JobListView::new(
      self.client.clone(),
      self.config.api.category.clone(),
      self.config.api.limit,
    ))
  }

  /// Show the view for `route`. The list is the root; a job detail is
  /// pushed on top of it.
  pub fn navigate(&mut self, route: Route) {
    info!(path = %route.path(), "Navigating");
    match route {
      Route::JobList => self.view_stack.truncate(1),
      Route::JobDetail(id) => {
        let view = JobDetailView::new(id, self.client.clone());
        self.view_stack.push(Box::new(view));
      }
    }
  }

  /// Let every view poll its queries, so views underneath stay current
  fn tick(&mut self) {
    for view in &mut self.view_stack {
      view.tick();
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match self.command_input.handle_key(key) {
      KeyResult::Handled => return,
      KeyResult::Event(CommandEvent::Submitted { name, args }) => {
        self.execute_command(&name, &args);
        return;
      }
      KeyResult::Event(CommandEvent::Cancelled) => return,
      KeyResult::NotHandled => {}
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
      ViewAction::Push(view) => {
        debug!(path = %view.route().path(), "Opening view");
        self.view_stack.push(view);
      }
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute_command(&mut self, name: &str, args: &str) {
    debug!(name, args, "Executing command");
    match name {
      "jobs" => self.navigate(Route::JobList),
      "job" => {
        if args.is_empty() {
          warn!("job command needs an id");
        } else {
          self.navigate(Route::JobDetail(args.to_string()));
        }
      }
      "quit" => self.should_quit = true,
      _ => warn!(name, "Unknown command"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::remotive::client::test_support::api_config;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn test_app(start: Route) -> App {
    let mut config = Config {
      api: api_config("http://127.0.0.1:9/api/remote-jobs"),
      ..Config::default()
    };
    config.cache.retries = 0;
    App::new(config, start).unwrap()
  }

  fn run_command(app: &mut App, input: &str) {
    app.handle_key(key(KeyCode::Char(':')));
    for c in input.chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
    app.handle_key(key(KeyCode::Enter));
  }

  #[tokio::test]
  async fn test_starts_on_job_list() {
    let app = test_app(Route::JobList);
    assert_eq!(app.breadcrumb(), vec!["Jobs".to_string()]);
    assert_eq!(app.current_route(), Route::JobList);
  }

  #[tokio::test]
  async fn test_detail_route_sits_on_top_of_list() {
    let mut app = test_app(Route::parse("/jobs/1967123"));
    assert_eq!(app.view_stack.len(), 2);
    assert_eq!(
      app.current_route(),
      Route::JobDetail("1967123".to_string())
    );

    app.handle_key(key(KeyCode::Char('q')));
    assert_eq!(app.current_route(), Route::JobList);
    assert!(!app.should_quit);
  }

  #[tokio::test]
  async fn test_unknown_route_falls_back_to_list() {
    let app = test_app(Route::parse("/companies/acme"));
    assert_eq!(app.view_stack.len(), 1);
    assert_eq!(app.current_route(), Route::JobList);
  }

  #[tokio::test]
  async fn test_job_command_opens_detail() {
    let mut app = test_app(Route::JobList);
    run_command(&mut app, "job 42");
    assert_eq!(app.current_route(), Route::JobDetail("42".to_string()));

    run_command(&mut app, "jobs");
    assert_eq!(app.view_stack.len(), 1);
  }

  #[tokio::test]
  async fn test_job_command_without_id_is_ignored() {
    let mut app = test_app(Route::JobList);
    run_command(&mut app, "job");
    assert_eq!(app.view_stack.len(), 1);
  }

  #[tokio::test]
  async fn test_q_on_root_quits() {
    let mut app = test_app(Route::JobList);
    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_quit_command_and_ctrl_c() {
    let mut app = test_app(Route::JobList);
    run_command(&mut app, "exit");
    assert!(app.should_quit);

    let mut app = test_app(Route::JobList);
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_keys_go_to_command_input_while_active() {
    let mut app = test_app(Route::JobList);
    app.handle_key(key(KeyCode::Char(':')));
    app.handle_key(key(KeyCode::Char('q')));
    assert!(!app.should_quit);

    app.handle_key(key(KeyCode::Esc));
    assert!(!app.command_input.is_active());
    assert!(!app.should_quit);
  }
}
