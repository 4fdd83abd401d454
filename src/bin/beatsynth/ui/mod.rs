//! Terminal UI for beatsynth
//!
//! Shows the pattern with the bar now playing, the output waveform and the
//! timbre controls. Key presses become control messages for the audio thread.

mod pattern;
pub mod state;
mod transport;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;

use beatsynth::synth::ControlMessage;

pub use state::{UiState, UiStateInit};

use pattern::render_pattern;
use transport::{render_transport, AudioStats};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;
const CUTOFF_STEP: f64 = 0.05;
const GAIN_STEP: f64 = 0.1;
const MAX_GAIN: f64 = 2.0;

pub struct UiApp {
    audio_rx: Consumer<f32>,
    state_rx: Consumer<UiState>,
    control_tx: Producer<ControlMessage>,
    init: UiStateInit,
    /// Latest snapshot from the audio thread
    current_state: UiState,
    audio_buffer: Vec<f32>,
    cutoff: f64,
    gain: f64,
    release: f64,
    stopping: bool,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        audio_rx: Consumer<f32>,
        state_rx: Consumer<UiState>,
        control_tx: Producer<ControlMessage>,
        init: UiStateInit,
        cutoff: f64,
        release: f64,
    ) -> Self {
        Self {
            audio_rx,
            state_rx,
            control_tx,
            init,
            current_state: UiState::default(),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            cutoff,
            gain: 1.0,
            release,
            stopping: false,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_state();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn poll_audio(&mut self) {
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn poll_state(&mut self) {
        while let Ok(state) = self.state_rx.pop() {
            self.current_state = state;
        }
        if self.stopping && self.current_state.finished {
            self.should_quit = true;
        }
    }

    fn send(&mut self, message: ControlMessage) {
        if self.control_tx.push(message).is_err() {
            tracing::warn!(?message, "control queue full, message dropped");
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                if self.stopping {
                    // Second press: don't wait for the fade
                    self.should_quit = true;
                } else {
                    self.stopping = true;
                    self.send(ControlMessage::Stop {
                        release: self.release,
                    });
                }
            }
            KeyCode::Up => {
                self.cutoff = (self.cutoff + CUTOFF_STEP).min(1.0);
                self.send(ControlMessage::SetCutoff(self.cutoff));
            }
            KeyCode::Down => {
                self.cutoff = (self.cutoff - CUTOFF_STEP).max(0.0);
                self.send(ControlMessage::SetCutoff(self.cutoff));
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.gain = (self.gain + GAIN_STEP).min(MAX_GAIN);
                self.send(ControlMessage::SetGain(self.gain));
            }
            KeyCode::Char('-') => {
                self.gain = (self.gain - GAIN_STEP).max(0.0);
                self.send(ControlMessage::SetGain(self.gain));
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(5),    // Pattern grid
                Constraint::Length(8), // Waveform
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_transport(frame, chunks[0], &self.init, &self.current_state, &stats);

        let pattern_block = Block::default().title(" Pattern ").borders(Borders::ALL);
        let pattern_inner = pattern_block.inner(chunks[1]);
        frame.render_widget(pattern_block, chunks[1]);
        render_pattern(frame, pattern_inner, &self.init, &self.current_state);

        render_waveform(frame, chunks[2], &self.audio_buffer);

        let help = if self.stopping {
            " Fading out...  [Q] Quit now"
        } else {
            " [Q] Stop & quit  [↑/↓] Cutoff  [+/-] Gain"
        };
        frame.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            chunks[3],
        );
    }
}
