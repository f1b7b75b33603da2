mod config;
mod game;
mod term;

use std::fs::File;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use simplelog::WriteLogger;

use config::Config;
use game::SnakeGame;

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config)?;

    info!("Starting grid-snake, tick every {} ms", config.tick_ms);

    let mut game = SnakeGame::new(&config);
    game.run()
}

fn init_logging(config: &Config) -> Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("Failed to create log file {}", config.log_file.display()))?;

    WriteLogger::init(config.verbose.log_level_filter(), simplelog::Config::default(), file)
        .context("Failed to initialize logger")
}
