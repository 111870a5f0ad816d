//! Terminal UI: a transport bar, an output meter, and the toggle key.

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::time::Duration;

use serenade::scheduler::MelodyScheduler;
use serenade::synth::EngineHandle;

/// Audio meter buffer size
const METER_BUFFER_SIZE: usize = 2048;

/// Peak and RMS of the most recent output
struct AudioStats {
    peak: f32,
    rms: f32,
}

impl AudioStats {
    fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// UI application state
pub struct App {
    scheduler: MelodyScheduler<EngineHandle>,
    /// Rendered samples from the audio callback
    tap: Consumer<f32>,
    /// Recent output for the meter
    audio_buffer: Vec<f32>,
    sample_rate: f32,
    should_quit: bool,
}

impl App {
    pub fn new(
        scheduler: MelodyScheduler<EngineHandle>,
        tap: Consumer<f32>,
        sample_rate: f32,
    ) -> Self {
        Self {
            scheduler,
            tap,
            audio_buffer: Vec::with_capacity(METER_BUFFER_SIZE),
            sample_rate,
            should_quit: false,
        }
    }

    /// Run the UI event loop.
    pub fn run(mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            // Drive the loop continuation; 16ms cadence sits well inside
            // the scheduler's 100ms lookahead
            self.scheduler.poll();

            self.poll_tap();

            terminal.draw(|frame| self.render(frame))?;

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

    /// Pull rendered samples, keeping the most recent METER_BUFFER_SIZE.
    fn poll_tap(&mut self) {
        while let Ok(sample) = self.tap.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > METER_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - METER_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                self.scheduler.toggle();
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Length(3), // Output meter
                Constraint::Min(0),
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        self.render_transport(frame, chunks[0]);
        self.render_meter(frame, chunks[1]);

        let help = Paragraph::new(" [Space] Play/Pause  [Q] Quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }

    fn render_transport(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title(" serenade ").borders(Borders::ALL);

        let playing = self.scheduler.is_playing();
        let play_symbol = if playing { "♪" } else { "⏸" };
        let play_state = if playing { "Playing" } else { "Stopped" };

        let now = self.scheduler.transport().now();
        let loop_len = self.scheduler.score().length();
        let loop_pos = if playing { now % loop_len } else { 0.0 };

        let line = Line::from(vec![
            Span::styled(
                format!(" {} {}  ", play_symbol, play_state),
                Style::default().fg(if playing { Color::Green } else { Color::Yellow }),
            ),
            Span::styled(
                format!("Loop {:>4.1}s / {:.1}s  ", loop_pos, loop_len),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("Clock {:>7.1}s  ", now),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("{:.1}kHz", self.sample_rate / 1000.0),
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_meter(&self, frame: &mut Frame, area: Rect) {
        let stats = AudioStats::from_buffer(&self.audio_buffer);

        let gauge = Gauge::default()
            .block(Block::default().title(" Output ").borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(f64::from(stats.peak.clamp(0.0, 1.0)))
            .label(format!("Peak {:.2}  RMS {:.2}", stats.peak, stats.rms));

        frame.render_widget(gauge, area);
    }
}
