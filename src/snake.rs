use std::collections::VecDeque;

use crate::{Coord, Coords};
use Direction::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Undefined = 0,
    Up = 1,
    Right = 2,
    Down = 3,
    Left = 4,
}

impl Direction {
    /// Up/Down and Left/Right are opposites. Undefined is opposite to nothing.
    pub fn is_opposite(self, other: Direction) -> bool {
        if self == Undefined || other == Undefined {
            return false;
        }
        (self as i8 - other as i8).abs() == 2
    }

    pub fn delta(self) -> (Coord, Coord) {
        match self {
            Undefined => (0, 0),
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }
}

/// The head position plus the occupied segments, oldest (tail) at the front
/// and the most recently grown one at the back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snake {
    head: Coords,
    body: VecDeque<Coords>,
}

impl Snake {
    pub fn new(head: Coords) -> Self {
        Snake { head, body: VecDeque::new() }
    }

    /// `segments` go from tail to head. `None` when empty.
    pub fn from_segments(segments: &[Coords]) -> Option<Self> {
        let head = *segments.last()?;
        Some(Snake { head, body: segments.iter().copied().collect() })
    }

    pub fn head(&self) -> Coords {
        self.head
    }

    pub fn body(&self) -> impl Iterator<Item = Coords> + '_ {
        self.body.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Moves the head one cell. The body is untouched until `grow`.
    pub fn advance(&mut self, direction: Direction) -> Coords {
        let (dx, dy) = direction.delta();
        self.head = (self.head.0 + dx, self.head.1 + dy);
        self.head
    }

    /// Appends the current head as the newest segment.
    pub fn grow(&mut self) -> Coords {
        self.body.push_back(self.head);
        self.head
    }

    pub fn drop_tail(&mut self) -> Option<Coords> {
        self.body.pop_front()
    }
}
