use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar: breadcrumb on the left, current route on the right
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], path: &str) {
  let mut spans = vec![Span::raw(" ")];

  let last = breadcrumb.len().saturating_sub(1);
  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == last {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let chunks = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Min(0),
      Constraint::Length(path.chars().count() as u16 + 2),
    ])
    .split(area);

  let left = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  let right = Paragraph::new(format!("{} ", path))
    .alignment(Alignment::Right)
    .style(Style::default().bg(Color::Black).fg(Color::DarkGray));

  frame.render_widget(left, chunks[0]);
  frame.render_widget(right, chunks[1]);
}
