use crate::remotive::types::parse_posted_date;

/// How much of a posted date to spell out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
  /// `Jan 15, 2024`, used on list cards
  Short,
  /// `January 15, 2024`, used on the detail page
  Long,
}

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Format an upstream posted date for display.
///
/// Dates that cannot be parsed are shown as they came.
pub fn format_posted_date(raw: &str, style: DateStyle) -> String {
  let Some(date) = parse_posted_date(raw) else {
    return raw.to_string();
  };

  match style {
    DateStyle::Short => date.format("%b %-d, %Y").to_string(),
    DateStyle::Long => date.format("%B %-d, %Y").to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_counts_chars() {
    assert_eq!(truncate("Zürich büro", 8), "Züric...");
  }

  #[test]
  fn test_format_posted_date() {
    assert_eq!(
      format_posted_date("2024-01-15T09:30:00", DateStyle::Short),
      "Jan 15, 2024"
    );
    assert_eq!(
      format_posted_date("2024-01-05", DateStyle::Long),
      "January 5, 2024"
    );
  }

  #[test]
  fn test_format_unparseable_date_passes_through() {
    assert_eq!(format_posted_date("yesterday", DateStyle::Long), "yesterday");
  }
}
