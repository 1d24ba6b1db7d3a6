use ratatui::prelude::*;
use ratatui::widgets::*;

use svckit::types::Severity;

use super::{colors, panel};
use crate::events::{EventRow, EventsBody, EventsView, EMPTY_EVENTS_MESSAGE};

fn severity_color(severity: Option<Severity>) -> Color {
    match severity {
        Some(Severity::High) => colors::ERROR,
        Some(Severity::Moderate) => colors::AMBER,
        Some(Severity::Low) => colors::SUCCESS,
        None => colors::SLATE,
    }
}

fn row_item(row: &EventRow) -> ListItem<'_> {
    let severity = row.severity.map_or("-", |s| s.as_str());
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(format!("{:<8} ", severity), Style::default().fg(severity_color(row.severity))),
            Span::styled(row.header.as_str(), Style::default().fg(colors::WHITE).bold()),
            Span::raw("  "),
            Span::styled(row.when.as_str(), Style::default().fg(colors::SLATE).add_modifier(Modifier::DIM)),
        ]),
        Line::from(Span::styled(
            format!("         {}", row.preview),
            Style::default().fg(colors::SLATE),
        )),
    ])
}

pub fn draw(frame: &mut Frame, area: Rect, events: &EventsView) {
    let title = if events.loading { "LIVE EVENTS (refreshing)" } else { "LIVE EVENTS" };
    let block = panel(title, colors::CYAN).title_bottom(Line::from(Span::styled(
        format!(" {} ", events.filter),
        Style::default().fg(colors::SLATE),
    )));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut constraints = vec![Constraint::Min(1)];
    if events.error.is_some() {
        constraints.insert(0, Constraint::Length(1));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    // Stale rows stay visible under the banner.
    if let Some(error) = &events.error {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("! {}", error),
                Style::default().fg(colors::ERROR).bold(),
            )),
            chunks[0],
        );
    }
    let body_area = chunks[chunks.len() - 1];

    match &events.body {
        EventsBody::Empty => {
            frame.render_widget(
                Paragraph::new(Span::styled(EMPTY_EVENTS_MESSAGE, Style::default().fg(colors::SLATE)))
                    .alignment(Alignment::Center),
                body_area,
            );
        }
        EventsBody::List(rows) => {
            let items: Vec<ListItem> = rows.iter().map(row_item).collect();
            frame.render_widget(List::new(items), body_area);
        }
    }
}
