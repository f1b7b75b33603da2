use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::Direction;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    TogglePause,
    Quit,
}

pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(key) {
        return Some(Command::Quit);
    }

    match key.code {
        KeyCode::Char('w') | KeyCode::Up => Some(Command::Turn(Direction::Up)),
        KeyCode::Char('a') | KeyCode::Left => Some(Command::Turn(Direction::Left)),
        KeyCode::Char('s') | KeyCode::Down => Some(Command::Turn(Direction::Down)),
        KeyCode::Char('d') | KeyCode::Right => Some(Command::Turn(Direction::Right)),
        KeyCode::Char(' ') => Some(Command::TogglePause),
        KeyCode::Esc | KeyCode::Char('q') => Some(Command::Quit),
        _ => None,
    }
}

pub fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}
