//! Pattern grid widget - one row per voice, one cell group per bar

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use beatsynth::sequencing::Voice;

use super::{UiState, UiStateInit};

const LABEL_WIDTH: usize = 8;

pub fn render_pattern(frame: &mut Frame, area: Rect, init: &UiStateInit, state: &UiState) {
    if area.height < 2 || area.width < 20 {
        return;
    }

    let bars = init.pattern.bars();
    let grid_width = (area.width as usize).saturating_sub(LABEL_WIDTH);
    let cell_width = (grid_width / bars.len().max(1)).max(4);

    let mut lines = Vec::new();

    // Bar numbers, current bar highlighted
    let mut header = vec![Span::raw(" ".repeat(LABEL_WIDTH))];
    for index in 0..bars.len() {
        let style = if index == state.bar {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        header.push(Span::styled(format!("{:<cell_width$}", format!("|{}", index + 1)), style));
    }
    lines.push(Line::from(header));

    for voice in Voice::ALL {
        let mut spans = vec![Span::styled(
            format!("{:<LABEL_WIDTH$}", format!(" {voice}")),
            Style::default().fg(Color::White),
        )];

        for (index, bar) in bars.iter().enumerate() {
            // Spread the bar's slots over its cell
            let slot_width = (cell_width / bar.len().max(1)).max(1);
            let mut cell = String::with_capacity(cell_width);
            for slot in bar.slots() {
                let mark = if slot.voice() == Some(voice) { '▓' } else { '░' };
                cell.extend(std::iter::repeat(mark).take(slot_width));
            }
            let pad = cell_width.saturating_sub(cell.chars().count());
            cell.extend(std::iter::repeat(' ').take(pad));

            let color = if index == state.bar && !state.finished {
                Color::Cyan
            } else {
                Color::DarkGray
            };
            spans.push(Span::styled(cell, Style::default().fg(color)));
        }

        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), area);
}
