use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser, Debug)]
#[command(name = "grid-snake", version, about = "Snake on a 10x10 board, in the terminal")]
pub struct Config {
    /// Milliseconds between two game ticks
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Seed for food and start positions; the same seed replays the same board
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where log output goes, the terminal itself is taken by the game
    #[arg(long, default_value = "grid-snake.log")]
    pub log_file: PathBuf,

    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
