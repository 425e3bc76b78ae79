//! Sorting and client-side pagination for the job list.

use std::cmp::Reverse;
use std::ops::Range;

use crate::remotive::Job;

/// Jobs shown per page
pub const PAGE_SIZE: usize = 12;

/// Sort jobs newest first by posted date.
///
/// The sort is stable: jobs posted at the same instant keep their fetched
/// order. Jobs whose date cannot be parsed go after all dated ones.
pub fn sort_by_posted_desc(jobs: &mut [Job]) {
  // Option orders None below Some, so reversing puts undated jobs last
  jobs.sort_by_cached_key(|job| Reverse(job.posted_at()));
}

/// Page position over a sequence of `total_items`. Pages are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
  current_page: usize,
  page_size: usize,
  total_items: usize,
}

impl Default for Paginator {
  fn default() -> Self {
    Self::new(PAGE_SIZE)
  }
}

impl Paginator {
  pub fn new(page_size: usize) -> Self {
    Self {
      current_page: 1,
      page_size: page_size.max(1),
      total_items: 0,
    }
  }

  pub fn current_page(&self) -> usize {
    self.current_page
  }

  pub fn total_pages(&self) -> usize {
    self.total_items.div_ceil(self.page_size)
  }

  /// Update the item count, pulling the current page back into range.
  pub fn set_total_items(&mut self, total_items: usize) {
    self.total_items = total_items;
    self.current_page = self.current_page.clamp(1, self.total_pages().max(1));
  }

  /// Index range of the current page, clipped to the item count.
  pub fn page_range(&self) -> Range<usize> {
    let start = ((self.current_page - 1) * self.page_size).min(self.total_items);
    let end = (self.current_page * self.page_size).min(self.total_items);
    start..end
  }

  /// The current page's window of `items`.
  pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
    let range = self.page_range();
    let end = range.end.min(items.len());
    &items[range.start.min(end)..end]
  }

  /// Move to `page`. Out-of-range pages are ignored.
  ///
  /// Returns true if the page changed.
  pub fn go_to(&mut self, page: usize) -> bool {
    if page < 1 || page > self.total_pages() || page == self.current_page {
      return false;
    }
    self.current_page = page;
    true
  }

  pub fn next(&mut self) -> bool {
    self.go_to(self.current_page + 1)
  }

  pub fn prev(&mut self) -> bool {
    match self.current_page.checked_sub(1) {
      Some(page) => self.go_to(page),
      None => false,
    }
  }

  pub fn first(&mut self) -> bool {
    self.go_to(1)
  }

  pub fn last(&mut self) -> bool {
    self.go_to(self.total_pages())
  }
}
