//! beatsynth - terminal drum pattern player
//!
//! Run with: cargo run -- [bpm]
//! Logs go to stderr; set RUST_LOG (e.g. `RUST_LOG=beatsynth=debug`) and
//! redirect stderr to a file to keep the terminal UI clean.

mod app;
mod ui;

use app::Player;
use beatsynth::rhythm;
use color_eyre::eyre::WrapErr;
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let bpm = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<f64>()
            .wrap_err_with(|| format!("bpm must be a number, got '{arg}'"))?,
        None => 120.0,
    };

    Player::new()
        .bpm(bpm)
        .pattern(rhythm![[hh, sd], [sd, hh], [hh, sd], [sd, hh]]?)
        .release(0.5)
        .run()
}
