use std::time::Instant;

use anyhow::Result;
use crossterm::event::KeyEvent;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use grid_snake::input::{command_for, Command};
use grid_snake::render::render_frame;
use grid_snake::{Direction, Engine};

use crate::config::Config;
use crate::term::TermManager;

pub struct SnakeGame {
    term: TermManager,
    rng: StdRng,
    tick_interval: std::time::Duration,
    paused: bool,
}

/// How a round ended.
enum RoundEnd {
    Quit,
    Finished,
}

impl SnakeGame {
    pub fn new(config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        SnakeGame { term: TermManager::new(), rng, tick_interval: config.tick_interval(), paused: false }
    }

    /// Takes over the terminal until the player quits, and gives it back on
    /// every exit path.
    pub fn run(&mut self) -> Result<()> {
        self.term.setup()?;
        let res = self.play_rounds();
        let restored = self.term.restore();
        // The game's own error matters more than a failed restore
        res.and(restored)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn play_rounds(&mut self) -> Result<()> {
        if !self.show_intro()? {
            return Ok(());
        }

        loop {
            // Each round gets its own engine, an engine cannot be reset
            let mut engine = Engine::with_rng(StdRng::seed_from_u64(self.rng.gen()));
            engine.start();

            if let RoundEnd::Quit = self.play(&mut engine)? {
                return Ok(());
            }

            let title = if engine.is_win() { "You won!" } else { "Game over!" };
            info!("{} score {}, length {}", title, engine.score(), engine.length());
            self.term.show_message(&[
                title,
                &format!("Score: {}", engine.score()),
                "",
                "Press any key to play again,",
                "or Esc to quit.",
            ])?;

            if is_quit(&self.term.read_key_blocking()?) {
                return Ok(());
            }
        }
    }

    fn show_intro(&mut self) -> Result<bool> {
        self.term.show_message(&[
            "WASD or arrow keys to move",
            "Space to pause",
            "Esc to quit",
            "",
            "Press any key to begin",
        ])?;

        Ok(!is_quit(&self.term.read_key_blocking()?))
    }

    fn play<R: Rng>(&mut self, engine: &mut Engine<R>) -> Result<RoundEnd> {
        self.paused = false;
        self.term.draw_frame(&render_frame(engine))?;

        let mut pending: Option<Direction> = None;
        let mut next_tick = Instant::now() + self.tick_interval;

        loop {
            let wait = next_tick.saturating_duration_since(Instant::now());
            if let Some(key) = self.term.poll_key(wait)? {
                match command_for(&key) {
                    Some(Command::Quit) => return Ok(RoundEnd::Quit),
                    Some(Command::TogglePause) => self.toggle_pause(engine)?,
                    Some(Command::Turn(dir)) => pending = Some(dir),
                    None => {}
                }
                continue;
            }

            next_tick = Instant::now() + self.tick_interval;
            if self.paused {
                continue;
            }

            // Only the latest key pressed since the last tick counts
            if let Some(dir) = pending.take() {
                engine.set_direction(dir);
            }

            let outcome = engine.tick();
            debug!("Tick: {:?}", outcome);
            self.term.draw_frame(&render_frame(engine))?;

            if engine.is_terminal() {
                return Ok(RoundEnd::Finished);
            }
        }
    }

    fn toggle_pause<R>(&mut self, engine: &Engine<R>) -> Result<()> {
        self.paused = !self.paused;

        if self.paused {
            self.term.show_message(&["Paused", "Press space to continue"])
        } else {
            self.term.draw_frame(&render_frame(engine))
        }
    }
}

/// On the intro and end screens any key goes on, except the quit keys.
fn is_quit(key: &KeyEvent) -> bool {
    matches!(command_for(key), Some(Command::Quit))
}
