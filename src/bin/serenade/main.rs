//! serenade - looping music-box player
//!
//! Plays the built-in melody through the default audio device, with a
//! terminal toggle for play/pause. Run with: cargo run

mod app;
mod ui;

use serenade::{scheduler::MelodyScheduler, score::Score};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let audio = app::start_audio()?;
    let scheduler = MelodyScheduler::new(audio.handle, Score::music_box());

    let mut terminal = ratatui::init();
    let result = ui::App::new(scheduler, audio.tap, audio.sample_rate).run(&mut terminal);
    ratatui::restore();

    // The stream must outlive the UI loop or playback dies mid-session
    drop(audio.stream);
    result
}
