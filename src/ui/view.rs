use crate::routes::Route;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// Key hint rendered in the header as `<key> label`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  /// Hints are ordered by ascending priority
  pub priority: u8,
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(self, priority: u8) -> Self {
    Self { priority, ..self }
  }
}

/// What the App should do with the view stack after a key press
pub enum ViewAction {
  None,
  /// Open a view on top of the current one
  Push(Box<dyn View>),
  /// Close the current view; closing the root quits
  Pop,
}

/// A screen on the view stack.
///
/// The App forwards keys to the top view only and applies the returned
/// `ViewAction`. Every view on the stack is ticked, so a view backed by a
/// `Query<T>` should poll it in `tick()`.
pub trait View {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Label for this view in the footer breadcrumb
  fn breadcrumb_label(&self) -> String;

  /// Short status for the header, e.g. category and page
  fn context(&self) -> Option<String> {
    None
  }

  /// Route that reopens this view
  fn route(&self) -> Route;

  fn tick(&mut self) {}

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
