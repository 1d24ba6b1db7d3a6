use ratatui::prelude::*;
use ratatui::widgets::*;

use super::colors;
use crate::format;
use crate::view::{DashboardView, KpiCard};

pub fn draw(frame: &mut Frame, area: Rect, view: &DashboardView) {
    if view.kpis.is_empty() {
        return;
    }

    let constraints = vec![Constraint::Ratio(1, view.kpis.len() as u32); view.kpis.len()];
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (card, chunk) in view.kpis.iter().zip(chunks.iter()) {
        draw_card(frame, *chunk, card);
    }
}

fn accent(card: &KpiCard) -> Color {
    if card.value == format::MISSING {
        return colors::SLATE;
    }
    match card.sub.as_deref() {
        Some("High") => colors::ERROR,
        Some("Medium") => colors::AMBER,
        Some("Low") => colors::SUCCESS,
        _ => colors::WHITE,
    }
}

fn draw_card(frame: &mut Frame, area: Rect, card: &KpiCard) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SLATE))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut text = vec![
        Line::from(Span::styled(
            card.title.to_uppercase(),
            Style::default().fg(colors::SLATE).add_modifier(Modifier::DIM),
        )),
        Line::from(Span::styled(
            card.value.as_str(),
            Style::default().fg(accent(card)).add_modifier(Modifier::BOLD),
        )),
    ];
    if let Some(sub) = &card.sub {
        text.push(Line::from(Span::styled(sub.as_str(), Style::default().fg(colors::SLATE))));
    }

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}
