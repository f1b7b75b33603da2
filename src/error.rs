use thiserror::Error;

use crate::Coords;

/// Rejections from [`Engine::from_layout`](crate::Engine::from_layout).
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("coordinates {0:?} are outside the board")]
    OutOfBounds(Coords),
    #[error("the snake needs at least one segment")]
    EmptyBody,
    #[error("two snake segments share the cell {0:?}")]
    OverlappingSegments(Coords),
    #[error("food at {0:?} sits on the snake")]
    FoodOnSnake(Coords),
}
