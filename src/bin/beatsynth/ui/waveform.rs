//! Oscilloscope of the most recent output samples

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Clicks are short; zoom the y axis so quiet tails stay visible
const MIN_SCALE: f64 = 0.25;

pub fn render_waveform(frame: &mut Frame, area: Rect, samples: &[f32]) {
    let peak = samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs())) as f64;
    let scale = peak.clamp(MIN_SCALE, 1.0);

    let block = Block::default()
        .title(format!(" Output (±{scale:.2}) "))
        .borders(Borders::ALL);

    let len = samples.len().max(1) as f64;
    let data: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / len, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(if peak >= 1.0 { Color::Red } else { Color::Cyan }))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(Axis::default().bounds([0.0, 1.0]).style(Style::default().fg(Color::DarkGray)))
        .y_axis(Axis::default().bounds([-scale, scale]).style(Style::default().fg(Color::DarkGray)));

    frame.render_widget(chart, area);
}
