use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use log::error;
use crossterm::event::{poll, read, Event, KeyEvent};
use crossterm::style::{self, Color};
use crossterm::terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};

use grid_snake::render::FOOD_CHAR;

/// Position and size of a centered message box.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MessageBox {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
}

impl MessageBox {
    /// One blank line above and below, one blank column on each side.
    pub fn centered(lines: &[&str], (term_width, term_height): (u16, u16)) -> Self {
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = u16::try_from(widest).unwrap_or(u16::MAX).saturating_add(2);
        let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);

        MessageBox {
            left: (term_width / 2).saturating_sub(width / 2),
            top: (term_height / 2).saturating_sub(height / 2),
            width,
            height,
        }
    }
}

/// Owns the terminal while the game runs. Whatever `setup` changed is undone
/// by `restore`, or on drop if nobody called it.
pub struct TermManager {
    stdout: Stdout,
    active: bool,
}

impl TermManager {
    pub fn new() -> Self {
        TermManager { stdout: stdout(), active: false }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        self.active = true;

        if let Err(err) = self.enter_raw_mode() {
            if let Err(restore_err) = self.restore() {
                error!("Could not restore terminal after failed setup: {:?}", restore_err);
            }
            return Err(err);
        }
        Ok(())
    }

    /// No-op unless `setup` got past the alternate screen. Every step is
    /// attempted, the first failure is returned.
    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let raw = terminal::disable_raw_mode().context("Error disabling raw mode");
        let screen =
            execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
                .context("Error leaving alt screen");
        raw.and(screen)
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read().context("Error reading key")? {
                return Ok(ev);
            }
        }
    }

    /// Waits up to `timeout` for a key press.
    pub fn poll_key(&self, timeout: Duration) -> Result<Option<KeyEvent>> {
        if !poll(timeout).context("Error polling events")? {
            return Ok(None);
        }
        match read().context("Error reading event")? {
            Event::Key(ev) => Ok(Some(ev)),
            _ => Ok(None),
        }
    }

    pub fn draw_frame(&mut self, lines: &[String]) -> Result<()> {
        queue!(self.stdout, terminal::Clear(ClearType::All)).context("Error clearing")?;

        for (y, line) in lines.iter().enumerate() {
            queue!(self.stdout, cursor::MoveTo(0, y as u16))?;
            for ch in line.chars() {
                if ch == FOOD_CHAR {
                    queue!(
                        self.stdout,
                        style::SetForegroundColor(Color::Yellow),
                        style::Print(ch),
                        style::ResetColor
                    )?;
                } else {
                    queue!(self.stdout, style::Print(ch))?;
                }
            }
        }

        self.flush()
    }

    /// Boxed message centered on the screen, drawn over whatever is there.
    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        let size = terminal::size().context("Error reading size")?;
        let MessageBox { left, top, width, height } = MessageBox::centered(lines, size);

        let blank = " ".repeat(width as usize);
        for y in [top, top + height - 1] {
            queue!(self.stdout, cursor::MoveTo(left, y), style::Print(&blank))?;
        }

        // `{: ^}` pads by chars, matching how the width was measured
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = width as usize);
            queue!(
                self.stdout,
                cursor::MoveTo(left, top + i as u16 + 1),
                style::Print(padded_line)
            )?;
        }

        self.flush()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing")
    }

    ///////////////////////////////////////////////////////////////////////////

    fn enter_raw_mode(&mut self) -> Result<()> {
        terminal::enable_raw_mode().context("Error enabling raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
            .context("Error hiding cursor")?;
        Ok(())
    }
}

impl Drop for TermManager {
    // Covers early returns and panics in the game loop
    fn drop(&mut self) {
        if !self.is_active() {
            return;
        }
        if let Err(err) = self.restore() {
            error!("Could not restore terminal: {:?}", err);
        }
    }
}
