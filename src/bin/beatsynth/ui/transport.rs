//! Transport bar widget - tempo, position, timbre controls and audio levels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{UiState, UiStateInit};

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    init: &UiStateInit,
    state: &UiState,
    audio_stats: &AudioStats,
) {
    let block = Block::default().title(" beatsynth ").borders(Borders::ALL);

    let (symbol, label, color) = if state.finished {
        ("■", "Stopped", Color::Red)
    } else if state.releasing {
        ("▼", "Releasing", Color::Yellow)
    } else {
        ("▶", "Playing", Color::Green)
    };

    let total = state.scheduled + state.dropped;
    let drop_pct = if total == 0 {
        0.0
    } else {
        100.0 * state.dropped as f64 / total as f64
    };

    let line = Line::from(vec![
        Span::styled(format!(" BPM: {:.0}  ", init.bpm), Style::default().fg(Color::Cyan)),
        Span::styled(format!("{symbol} {label}  "), Style::default().fg(color)),
        Span::styled(
            format!("Beat {} | Bar {}/{}  ", state.beat, state.bar + 1, init.pattern.len()),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!("{:7.2}s  ", state.time), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("Cutoff: {:5.0}Hz  Gain: {:.2}  ", state.cutoff_hz, state.gain),
            Style::default().fg(Color::LightBlue),
        ),
        Span::styled(
            format!("Hits: {}  Dropped: {:.0}%  ", state.scheduled, drop_pct),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("{:.1}kHz  ", init.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
