use crate::{Cell, Coord, Direction, Engine, BOARD_SIZE};

pub const EMPTY_CHAR: char = '.';
pub const FOOD_CHAR: char = 'F';
pub const SNAKE_BODY_CHAR: char = 'o';

pub fn head_char(direction: Direction) -> char {
    match direction {
        Direction::Up => '^',
        Direction::Right => '>',
        Direction::Down => 'v',
        Direction::Left => '<',
        Direction::Undefined => 'x',
    }
}

pub fn cell_char<R>(engine: &Engine<R>, x: Coord, y: Coord, cell: Cell) -> char {
    match cell {
        Cell::Empty => EMPTY_CHAR,
        Cell::Food => FOOD_CHAR,
        Cell::SnakeBody if engine.is_head(x, y) => head_char(engine.direction()),
        Cell::SnakeBody => SNAKE_BODY_CHAR,
    }
}

/// Score line, a blank line, then one text row per board row.
pub fn render_frame<R>(engine: &Engine<R>) -> Vec<String> {
    let mut lines = vec![
        format!("Score : {}\tLength : {}", engine.score(), engine.length()),
        String::new(),
    ];

    let mut row = String::with_capacity(BOARD_SIZE);
    engine.walk(|x, y, cell| {
        row.push(cell_char(engine, x, y, cell));
        if x == BOARD_SIZE as Coord - 1 {
            lines.push(std::mem::take(&mut row));
        }
    });

    lines
}
