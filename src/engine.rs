use log::{debug, trace, warn};
use rand::rngs::{StdRng, ThreadRng};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::LayoutError;
use crate::snake::{Direction, Snake};
use crate::{Cell, Coord, Coords, BOARD_SIZE, FOOD_BONUS};

type Cells = [[Cell; BOARD_SIZE]; BOARD_SIZE];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Body,
}

/// What a single [`Engine::tick`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not started, not moving yet, or already finished.
    Idle,
    Moved { new_head: Coords, old_tail: Option<Coords> },
    Ate { new_head: Coords },
    Crashed(Collision),
    Won,
}

/// The whole simulation: board, snake, food, score and the two sticky
/// terminal flags. Cells are indexed `[x][y]`.
#[derive(Clone, Debug)]
pub struct Engine<R = ThreadRng> {
    cells: Cells,
    snake: Snake,
    food: Option<Coords>,
    score: u32,
    direction: Direction,
    started: bool,
    game_over: bool,
    win: bool,
    rng: R,
}

impl Engine<ThreadRng> {
    pub fn new() -> Self {
        Engine::with_rng(rand::thread_rng())
    }
}

impl Default for Engine<ThreadRng> {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine<StdRng> {
    /// Same seed and same inputs always play out the same game.
    pub fn seeded(seed: u64) -> Self {
        Engine::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    pub fn with_rng(rng: R) -> Self {
        Engine {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
            snake: Snake::default(),
            food: None,
            score: 0,
            direction: Direction::Undefined,
            started: false,
            game_over: false,
            win: false,
            rng,
        }
    }

    /// Builds an already started engine from an explicit board. `body` goes
    /// from tail to head. Without `food`, food is placed at random.
    pub fn from_layout(
        rng: R,
        body: &[Coords],
        food: Option<Coords>,
        direction: Direction,
    ) -> Result<Self, LayoutError> {
        let snake = Snake::from_segments(body).ok_or(LayoutError::EmptyBody)?;

        let mut engine = Engine::with_rng(rng);
        for &pos in body {
            if !in_bounds(pos) {
                return Err(LayoutError::OutOfBounds(pos));
            }
            if engine.cell_at(pos) == Cell::SnakeBody {
                return Err(LayoutError::OverlappingSegments(pos));
            }
            engine.set_cell(pos, Cell::SnakeBody);
        }
        engine.snake = snake;
        engine.direction = direction;
        engine.started = true;

        match food {
            Some(pos) if !in_bounds(pos) => return Err(LayoutError::OutOfBounds(pos)),
            Some(pos) if engine.cell_at(pos) == Cell::SnakeBody => {
                return Err(LayoutError::FoodOnSnake(pos))
            }
            Some(pos) => {
                engine.food = Some(pos);
                engine.set_cell(pos, Cell::Food);
            }
            None => engine.spawn_food(),
        }

        Ok(engine)
    }

    /// Places the head on a random cell, grows it into the first segment and
    /// drops the first food.
    pub fn start(&mut self) {
        let size = BOARD_SIZE as Coord;
        let head = (self.rng.gen_range(0..size), self.rng.gen_range(0..size));
        self.begin(head);
    }

    pub fn start_at(&mut self, head: Coords) -> Result<(), LayoutError> {
        if !in_bounds(head) {
            return Err(LayoutError::OutOfBounds(head));
        }
        self.begin(head);
        Ok(())
    }

    /// Illegal 180° turns are ignored.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.direction.is_opposite(direction) {
            trace!("Rejected reversal from {:?} to {:?}", self.direction, direction);
            return;
        }
        self.direction = direction;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.started || self.direction == Direction::Undefined || self.is_terminal() {
            return TickOutcome::Idle;
        }

        let new_head = self.snake.advance(self.direction);
        trace!("Head moves {:?} to {:?}", self.direction, new_head);

        if !in_bounds(new_head) {
            return self.crash(Collision::Wall);
        }
        if self.cell_at(new_head) == Cell::SnakeBody {
            return self.crash(Collision::Body);
        }

        self.grow();

        if self.free_cells().is_empty() {
            self.win = true;
            debug!("Board filled with {} segments, score {}", self.length(), self.score);
            return TickOutcome::Won;
        }

        if self.food == Some(new_head) {
            self.score += FOOD_BONUS;
            debug!("Food eaten at {:?}, score {}", new_head, self.score);
            self.spawn_food();
            return TickOutcome::Ate { new_head };
        }

        let old_tail = self.snake.drop_tail();
        if let Some(tail) = old_tail {
            self.set_cell(tail, Cell::Empty);
        }
        TickOutcome::Moved { new_head, old_tail }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn begin(&mut self, head: Coords) {
        if self.started {
            warn!("Engine already started, ignoring start at {:?}", head);
            return;
        }
        self.started = true;
        self.snake = Snake::new(head);
        self.grow();
        self.spawn_food();
        debug!("Started with head at {:?}, food at {:?}", head, self.food);
    }

    fn crash(&mut self, collision: Collision) -> TickOutcome {
        self.game_over = true;
        debug!("{:?} collision at {:?}, score {}", collision, self.snake.head(), self.score);
        TickOutcome::Crashed(collision)
    }

    fn grow(&mut self) {
        let head = self.snake.grow();
        self.set_cell(head, Cell::SnakeBody);
    }

    fn spawn_food(&mut self) {
        self.food = self.free_cells().choose(&mut self.rng).copied();
        match self.food {
            Some(pos) => {
                self.set_cell(pos, Cell::Food);
                debug!("Food placed at {:?}", pos);
            }
            None => debug!("No free cell left for food"),
        }
    }

    fn set_cell(&mut self, (x, y): Coords, cell: Cell) {
        self.cells[x as usize][y as usize] = cell;
    }
}

impl<R> Engine<R> {
    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn is_win(&self) -> bool {
        self.win
    }

    pub fn is_terminal(&self) -> bool {
        self.game_over || self.win
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn length(&self) -> usize {
        self.snake.len()
    }

    /// After a crash this is the cell the snake tried to enter, which may
    /// lie off the board.
    pub fn head(&self) -> Coords {
        self.snake.head()
    }

    pub fn is_head(&self, x: Coord, y: Coord) -> bool {
        self.started && self.snake.head() == (x, y)
    }

    pub fn food(&self) -> Option<Coords> {
        self.food
    }

    /// Segments from tail to head.
    pub fn body(&self) -> impl Iterator<Item = Coords> + '_ {
        self.snake.body()
    }

    pub fn cell(&self, x: Coord, y: Coord) -> Option<Cell> {
        if in_bounds((x, y)) {
            Some(self.cell_at((x, y)))
        } else {
            None
        }
    }

    pub fn free_cell_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == Cell::Empty).count()
    }

    /// Visits every cell row by row: `y` in the outer loop, `x` in the inner
    /// one, so a row is complete when `x == BOARD_SIZE - 1`.
    pub fn walk<F: FnMut(Coord, Coord, Cell)>(&self, mut visit: F) {
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                visit(x as Coord, y as Coord, self.cells[x][y]);
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn cell_at(&self, (x, y): Coords) -> Cell {
        self.cells[x as usize][y as usize]
    }

    // Column by column, matching the order food candidates are drawn from
    fn free_cells(&self) -> Vec<Coords> {
        let mut free = Vec::with_capacity(BOARD_SIZE * BOARD_SIZE);
        for x in 0..BOARD_SIZE {
            for y in 0..BOARD_SIZE {
                if self.cells[x][y] == Cell::Empty {
                    free.push((x as Coord, y as Coord));
                }
            }
        }
        free
    }
}

fn in_bounds((x, y): Coords) -> bool {
    let size = BOARD_SIZE as Coord;
    (0..size).contains(&x) && (0..size).contains(&y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn layout(body: &[Coords], food: Option<Coords>, direction: Direction) -> Engine<StdRng> {
        Engine::from_layout(rng(), body, food, direction).unwrap()
    }

    fn snapshot<R>(engine: &Engine<R>) -> Vec<Cell> {
        let mut cells = vec![];
        engine.walk(|_, _, c| cells.push(c));
        cells
    }

    fn count<R>(engine: &Engine<R>, cell: Cell) -> usize {
        snapshot(engine).into_iter().filter(|&c| c == cell).count()
    }

    fn assert_consistent<R>(engine: &Engine<R>) {
        assert_eq!(count(engine, Cell::SnakeBody), engine.length());
        for (x, y) in engine.body() {
            assert_eq!(engine.cell(x, y), Some(Cell::SnakeBody));
        }
        match engine.food() {
            Some((x, y)) => {
                assert_eq!(count(engine, Cell::Food), 1);
                assert_eq!(engine.cell(x, y), Some(Cell::Food));
            }
            None => assert_eq!(count(engine, Cell::Food), 0),
        }
    }

    // Boustrophedon path over the whole board, row by row
    fn serpentine() -> Vec<Coords> {
        let size = BOARD_SIZE as Coord;
        let mut path = vec![];
        for y in 0..size {
            for i in 0..size {
                let x = if y % 2 == 0 { i } else { size - 1 - i };
                path.push((x, y));
            }
        }
        path
    }

    #[test]
    fn fresh_engine_is_idle() {
        let mut engine = Engine::seeded(1);
        assert!(!engine.is_started());
        assert_eq!(engine.direction(), Undefined);
        assert_eq!(engine.length(), 0);
        assert_eq!(count(&engine, Cell::Empty), BOARD_SIZE * BOARD_SIZE);

        engine.set_direction(Right);
        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert_eq!(count(&engine, Cell::Empty), BOARD_SIZE * BOARD_SIZE);
    }

    #[test]
    fn start_places_head_and_food() {
        let mut engine = Engine::seeded(3);
        engine.start();

        assert!(engine.is_started());
        assert_eq!(engine.length(), 1);
        let (x, y) = engine.head();
        assert!(engine.is_head(x, y));
        assert_eq!(engine.cell(x, y), Some(Cell::SnakeBody));
        assert_ne!(engine.food(), Some((x, y)));
        assert_eq!(engine.free_cell_count(), BOARD_SIZE * BOARD_SIZE - 2);
        assert_consistent(&engine);
    }

    #[test]
    fn second_start_is_ignored() {
        let mut engine = Engine::seeded(3);
        engine.start_at((2, 2)).unwrap();
        let food = engine.food();

        engine.start_at((7, 7)).unwrap();
        engine.start();

        assert_eq!(engine.head(), (2, 2));
        assert_eq!(engine.food(), food);
        assert_eq!(engine.length(), 1);
    }

    #[test]
    fn start_at_rejects_off_board_head() {
        let mut engine = Engine::seeded(3);
        assert_eq!(engine.start_at((10, 0)), Err(LayoutError::OutOfBounds((10, 0))));
        assert!(!engine.is_started());
    }

    #[test]
    fn tick_without_direction_changes_nothing() {
        let mut engine = Engine::seeded(9);
        engine.start();
        let before = snapshot(&engine);
        let head = engine.head();

        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert_eq!(snapshot(&engine), before);
        assert_eq!(engine.head(), head);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn reversal_is_rejected() {
        for (d, opposite) in [(Up, Down), (Down, Up), (Left, Right), (Right, Left)] {
            let mut engine = layout(&[(5, 5)], Some((0, 0)), Undefined);
            engine.set_direction(d);
            engine.set_direction(opposite);
            assert_eq!(engine.direction(), d);
        }
    }

    #[test]
    fn perpendicular_turn_is_accepted() {
        let mut engine = layout(&[(5, 5)], Some((0, 0)), Up);
        engine.set_direction(Left);
        assert_eq!(engine.direction(), Left);
        engine.set_direction(Down);
        assert_eq!(engine.direction(), Down);
    }

    #[test]
    fn rejected_reversal_keeps_moving_up() {
        let mut engine = layout(&[(5, 5)], Some((0, 0)), Undefined);
        engine.set_direction(Up);
        engine.set_direction(Down);

        engine.tick();
        assert_eq!(engine.head(), (5, 4));
    }

    #[test]
    fn eating_food_grows_and_scores() {
        let mut engine = layout(&[(5, 5)], Some((6, 5)), Right);

        assert_eq!(engine.tick(), TickOutcome::Ate { new_head: (6, 5) });
        assert_eq!(engine.score(), FOOD_BONUS);
        assert_eq!(engine.length(), 2);
        assert_eq!(engine.head(), (6, 5));
        assert_eq!(engine.cell(5, 5), Some(Cell::SnakeBody));

        let food = engine.food().unwrap();
        assert_ne!(food, (6, 5));
        assert_ne!(food, (5, 5));
        assert_consistent(&engine);
    }

    #[test]
    fn plain_move_drops_the_tail() {
        let mut engine = layout(&[(3, 5), (4, 5), (5, 5)], Some((0, 0)), Right);

        let outcome = engine.tick();

        assert_eq!(outcome, TickOutcome::Moved { new_head: (6, 5), old_tail: Some((3, 5)) });
        assert_eq!(engine.length(), 3);
        assert_eq!(engine.cell(3, 5), Some(Cell::Empty));
        assert_eq!(engine.cell(6, 5), Some(Cell::SnakeBody));
        assert_eq!(engine.body().collect::<Vec<_>>(), vec![(4, 5), (5, 5), (6, 5)]);
        assert_eq!(engine.score(), 0);
        assert_consistent(&engine);
    }

    #[test]
    fn wall_collision_ends_the_game_without_touching_the_board() {
        for (head, direction) in [((9, 5), Right), ((0, 5), Left), ((5, 0), Up), ((5, 9), Down)] {
            let mut engine = layout(&[head], Some((2, 2)), direction);
            let before = snapshot(&engine);

            assert_eq!(engine.tick(), TickOutcome::Crashed(Collision::Wall));
            assert!(engine.is_over());
            assert!(!engine.is_win());
            assert_eq!(snapshot(&engine), before);
            assert_eq!(engine.length(), 1);

            // Sticky
            assert_eq!(engine.tick(), TickOutcome::Idle);
            assert!(engine.is_over());
            assert_eq!(snapshot(&engine), before);
        }
    }

    #[test]
    fn self_collision_ends_the_game() {
        let mut engine = layout(&[(4, 5), (5, 5), (5, 6), (6, 6), (6, 5)], Some((0, 0)), Left);
        let before = snapshot(&engine);

        assert_eq!(engine.tick(), TickOutcome::Crashed(Collision::Body));
        assert!(engine.is_over());
        assert_eq!(snapshot(&engine), before);
    }

    #[test]
    fn moving_into_the_current_tail_is_a_collision() {
        // The tail is still on the board when the new head is checked
        let mut engine = layout(&[(5, 5), (5, 6), (6, 6), (6, 5)], Some((0, 0)), Left);
        assert_eq!(engine.tick(), TickOutcome::Crashed(Collision::Body));
    }

    #[test]
    fn filling_the_board_wins_without_dropping_the_tail() {
        let path = serpentine();
        let (last, body) = path.split_last().unwrap();
        let mut engine = layout(body, Some(*last), Left);
        let tail = body[0];

        assert_eq!(engine.tick(), TickOutcome::Won);
        assert!(engine.is_win());
        assert!(!engine.is_over());
        assert_eq!(engine.length(), BOARD_SIZE * BOARD_SIZE);
        assert_eq!(engine.cell(tail.0, tail.1), Some(Cell::SnakeBody));
        assert_eq!(count(&engine, Cell::SnakeBody), BOARD_SIZE * BOARD_SIZE);
        assert_eq!(engine.free_cell_count(), 0);

        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert!(engine.is_win());
    }

    #[test]
    fn taking_the_last_empty_cell_wins_with_food_still_on_the_board() {
        // Two cells left: (1, 9) empty and (0, 9) holding food
        let path = serpentine();
        let body = &path[..path.len() - 2];
        let food = path[path.len() - 1];
        let mut engine = layout(body, Some(food), Left);

        assert_eq!(engine.tick(), TickOutcome::Won);
        assert!(engine.is_win());
        assert_eq!(engine.head(), (1, 9));
        assert_eq!(engine.length(), BOARD_SIZE * BOARD_SIZE - 1);
        assert_eq!(engine.food(), Some((0, 9)));
        assert_eq!(engine.cell(0, 9), Some(Cell::Food));
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.free_cell_count(), 0);
        assert_consistent(&engine);
    }

    #[test]
    fn layout_without_food_fills_the_only_free_cell() {
        let path = serpentine();
        let (last, body) = path.split_last().unwrap();
        let engine = layout(body, None, Left);
        assert_eq!(engine.food(), Some(*last));
    }

    #[test]
    fn full_layout_has_no_food() {
        let engine = layout(&serpentine(), None, Left);
        assert_eq!(engine.food(), None);
        assert_consistent(&engine);
    }

    #[test]
    fn layout_validation() {
        let err = |body: &[Coords], food| Engine::from_layout(rng(), body, food, Up).unwrap_err();

        assert_eq!(err(&[], None), LayoutError::EmptyBody);
        assert_eq!(err(&[(0, 0), (-1, 0)], None), LayoutError::OutOfBounds((-1, 0)));
        assert_eq!(err(&[(1, 1), (1, 2), (1, 1)], None), LayoutError::OverlappingSegments((1, 1)));
        assert_eq!(err(&[(1, 1), (1, 2)], Some((1, 1))), LayoutError::FoodOnSnake((1, 1)));
        assert_eq!(err(&[(1, 1)], Some((3, 10))), LayoutError::OutOfBounds((3, 10)));
    }

    #[test]
    fn walk_goes_row_by_row() {
        let engine = Engine::seeded(0);
        let mut visited = vec![];
        engine.walk(|x, y, _| visited.push((x, y)));

        assert_eq!(visited.len(), BOARD_SIZE * BOARD_SIZE);
        assert_eq!(visited[0], (0, 0));
        assert_eq!(visited[1], (1, 0));
        assert_eq!(visited[BOARD_SIZE - 1], (9, 0));
        assert_eq!(visited[BOARD_SIZE], (0, 1));
        assert_eq!(*visited.last().unwrap(), (9, 9));
    }

    #[test]
    fn same_seed_same_game() {
        let play = |seed| {
            let mut engine = Engine::seeded(seed);
            engine.start();
            let mut trace = vec![(engine.head(), engine.food())];
            for d in [Right, Down, Left, Down, Right, Right, Up] {
                engine.set_direction(d);
                engine.tick();
                trace.push((engine.head(), engine.food()));
            }
            trace
        };

        assert_eq!(play(11), play(11));
    }
}
