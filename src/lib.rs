//! A tick-driven snake simulation on a fixed square board.
//!
//! [`Engine`] owns the whole game state. A driver calls
//! [`Engine::set_direction`] on input and [`Engine::tick`] on a timer, then
//! reads the board back through [`Engine::walk`] and the other queries until
//! [`Engine::is_over`] or [`Engine::is_win`] turns true.

pub mod engine;
pub mod error;
pub mod input;
pub mod render;
pub mod snake;

pub use engine::{Collision, Engine, TickOutcome};
pub use error::LayoutError;
pub use snake::{Direction, Snake};

pub const BOARD_SIZE: usize = 10;
pub const FOOD_BONUS: u32 = 5;

/// Signed so a head that ran into a wall can still be represented.
pub type Coord = i32;
pub type Coords = (Coord, Coord);

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    SnakeBody,
    Food,
}
