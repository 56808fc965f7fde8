use crate::{Coord, TermInt};

use std::collections::{HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use Direction::*;

// The playable field sits inside a 40x15 terminal minus the status rows
// and the side columns, hence the odd-looking minimums.
pub const MIN_FIELD_HEIGHT: TermInt = 11;
pub const MIN_FIELD_WIDTH: TermInt = 38;

const SPAWN_LENGTH: TermInt = 3;
const POINTS_PER_FOOD: u32 = 10;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Result of one tick, carrying everything the renderer needs to update
/// the screen incrementally.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Moved { new_head: Coord, freed_tail: Coord },
    AteFood { new_head: Coord, new_food: Coord, score: u32 },
    GameOver,
}

#[derive(Debug, Error)]
#[error("Terminal too small! Need at least 40x15")]
pub struct GridTooSmall;

/// The authoritative game state: snake body, direction, food, score and the
/// field dimensions. Performs no I/O; the driver feeds it one `advance` per
/// tick and forwards the returned `Outcome` to the rendering side.
pub struct GameState {
    /// Head at the front, tail at the back.
    body: VecDeque<Coord>,
    /// Cells the body currently covers, kept in sync with `body` on every
    /// insert and removal. Backs the self-collision membership test.
    occupied: HashSet<Coord>,
    direction: Direction,
    food: Coord,
    score: u32,
    height: TermInt,
    width: TermInt,
    alive: bool,
    rng: StdRng,
}

impl GameState {
    pub fn new(height: TermInt, width: TermInt) -> Result<Self, GridTooSmall> {
        Self::with_rng(height, width, StdRng::from_entropy())
    }

    pub fn with_rng(height: TermInt, width: TermInt, rng: StdRng) -> Result<Self, GridTooSmall> {
        if height < MIN_FIELD_HEIGHT || width < MIN_FIELD_WIDTH {
            return Err(GridTooSmall);
        }

        let center = (height / 2, width / 2);
        let body: VecDeque<Coord> = (0..SPAWN_LENGTH).map(|i| (center.0, center.1 - i)).collect();
        let occupied = body.iter().copied().collect();

        let mut state = GameState {
            body,
            occupied,
            direction: Right,
            food: (0, 0),
            score: 0,
            height,
            width,
            alive: true,
            rng,
        };
        state.food = state.place_food();
        Ok(state)
    }

    /// Records the direction for the next tick. No reversal check: turning
    /// straight back into a body longer than one cell self-collides on the
    /// next `advance`, which is the intended terminal condition.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Moves the snake one cell in the current direction and reports what
    /// happened. Once the game is over this is a no-op that keeps
    /// returning `GameOver`.
    pub fn advance(&mut self) -> Outcome {
        if !self.alive {
            return Outcome::GameOver;
        }

        let head = *self.body.front().unwrap();
        let new_head = match self.direction {
            Up => (head.0 - 1, head.1),
            Down => (head.0 + 1, head.1),
            Left => (head.0, head.1 - 1),
            Right => (head.0, head.1 + 1),
        };

        // Walls first, then the body. The body check runs before the tail
        // is dropped, so moving into the cell the tail is about to vacate
        // still crashes: the tail counts as occupied for one more tick.
        if new_head.0 == 0
            || new_head.0 == self.height - 1
            || new_head.1 == 0
            || new_head.1 == self.width - 1
            || self.occupied.contains(&new_head)
        {
            self.alive = false;
            return Outcome::GameOver;
        }

        self.body.push_front(new_head);
        self.occupied.insert(new_head);

        if new_head == self.food {
            self.score += POINTS_PER_FOOD;
            self.food = self.place_food();
            Outcome::AteFood { new_head, new_food: self.food, score: self.score }
        } else {
            let freed_tail = self.body.pop_back().unwrap();
            self.occupied.remove(&freed_tail);
            Outcome::Moved { new_head, freed_tail }
        }
    }

    pub fn body(&self) -> &VecDeque<Coord> {
        &self.body
    }

    pub fn food(&self) -> Coord {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_running(&self) -> bool {
        self.alive
    }

    /// Picks a free interior cell for the food. Rejection sampling keeps the
    /// distribution uniform over the cells not covered by the snake.
    fn place_food(&mut self) -> Coord {
        loop {
            let cell = (
                self.rng.gen_range(1..self.height - 1),
                self.rng.gen_range(1..self.width - 1),
            );
            if !self.occupied.contains(&cell) {
                return cell;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a state with an explicit body and food, bypassing the size
    /// minimums so the small grids from the scenarios are expressible.
    fn fixture(
        height: TermInt,
        width: TermInt,
        body: &[Coord],
        direction: Direction,
        food: Coord,
    ) -> GameState {
        let body: VecDeque<Coord> = body.iter().copied().collect();
        let occupied = body.iter().copied().collect();
        GameState {
            body,
            occupied,
            direction,
            food,
            score: 0,
            height,
            width,
            alive: true,
            rng: StdRng::seed_from_u64(7),
        }
    }

    fn body_of(state: &GameState) -> Vec<Coord> {
        state.body().iter().copied().collect()
    }

    fn is_interior(state: &GameState, (r, c): Coord) -> bool {
        r >= 1 && r < state.height - 1 && c >= 1 && c < state.width - 1
    }

    #[test]
    fn new_spawns_centered_snake_facing_right() {
        let state = GameState::with_rng(11, 38, StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(body_of(&state), vec![(5, 19), (5, 18), (5, 17)]);
        assert_eq!(state.score(), 0);
        assert!(state.is_running());
    }

    #[test]
    fn new_rejects_fields_below_the_minimum() {
        assert!(GameState::new(10, 38).is_err());
        assert!(GameState::new(11, 37).is_err());
        assert!(GameState::new(11, 38).is_ok());
    }

    #[test]
    fn initial_food_is_interior_and_off_the_snake() {
        for seed in 0..50 {
            let state = GameState::with_rng(11, 38, StdRng::seed_from_u64(seed)).unwrap();
            assert!(is_interior(&state, state.food()));
            assert!(!state.body().contains(&state.food()));
        }
    }

    #[test]
    fn eating_grows_body_scores_and_replaces_food() {
        // Scenario A: 10x10 interior, food straight ahead of the head.
        let mut state = fixture(12, 12, &[(5, 5), (5, 4), (5, 3)], Right, (5, 6));

        match state.advance() {
            Outcome::AteFood { new_head, new_food, score } => {
                assert_eq!(new_head, (5, 6));
                assert_eq!(score, 10);
                assert_eq!(new_food, state.food());
            }
            other => panic!("expected AteFood, got {:?}", other),
        }

        assert_eq!(body_of(&state), vec![(5, 6), (5, 5), (5, 4), (5, 3)]);
        assert!(is_interior(&state, state.food()));
        assert!(!state.body().contains(&state.food()));
    }

    #[test]
    fn plain_move_keeps_length_and_frees_the_tail() {
        let mut state = fixture(12, 12, &[(5, 5), (5, 4), (5, 3)], Right, (8, 8));

        assert_eq!(
            state.advance(),
            Outcome::Moved { new_head: (5, 6), freed_tail: (5, 3) }
        );
        assert_eq!(body_of(&state), vec![(5, 6), (5, 5), (5, 4)]);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn hitting_a_wall_ends_the_game() {
        // Scenario B: head one cell away from the right wall column.
        let mut state = fixture(12, 12, &[(5, 10), (5, 9), (5, 8)], Right, (2, 2));
        assert_eq!(state.advance(), Outcome::GameOver);
        assert!(!state.is_running());

        let mut state = fixture(12, 12, &[(1, 5), (2, 5), (3, 5)], Up, (8, 8));
        assert_eq!(state.advance(), Outcome::GameOver);
    }

    #[test]
    fn running_into_the_body_ends_the_game() {
        // A 2x2 coil: moving up lands on a cell the body still covers.
        let mut state = fixture(12, 12, &[(5, 5), (5, 4), (4, 4), (4, 5), (3, 5)], Up, (8, 8));
        assert_eq!(state.advance(), Outcome::GameOver);
        assert!(!state.is_running());
    }

    #[test]
    fn tail_cell_still_counts_during_the_collision_check() {
        // The head moves onto the tail's cell. The tail would be vacated
        // this very tick, but the check runs against the full body first.
        let mut state = fixture(12, 12, &[(5, 5), (5, 4), (4, 4), (4, 5)], Up, (8, 8));
        assert_eq!(state.advance(), Outcome::GameOver);
    }

    #[test]
    fn single_cell_snake_never_self_collides() {
        for direction in [Up, Down, Left, Right].iter() {
            let mut state = fixture(12, 12, &[(5, 5)], *direction, (8, 8));
            match state.advance() {
                Outcome::Moved { freed_tail, .. } => assert_eq!(freed_tail, (5, 5)),
                other => panic!("expected Moved, got {:?}", other),
            }
            assert_eq!(state.body().len(), 1);
        }
    }

    #[test]
    fn last_direction_set_before_the_tick_wins() {
        // Scenario C: reversal keyed in but overwritten before the advance.
        let mut state = fixture(12, 12, &[(5, 5), (5, 4), (5, 3), (5, 2)], Right, (8, 8));
        state.set_direction(Left);
        state.set_direction(Right);

        assert_eq!(
            state.advance(),
            Outcome::Moved { new_head: (5, 6), freed_tail: (5, 2) }
        );
    }

    #[test]
    fn reversal_into_a_longer_body_is_fatal_on_the_next_tick() {
        let mut state = fixture(12, 12, &[(5, 5), (5, 4), (5, 3)], Right, (8, 8));
        state.set_direction(Left);
        assert_eq!(state.advance(), Outcome::GameOver);
    }

    #[test]
    fn score_only_moves_up_in_steps_of_ten() {
        let mut state = fixture(12, 12, &[(5, 5), (5, 4), (5, 3)], Right, (5, 6));
        let mut last_score = 0;

        for _ in 0..4 {
            let score = match state.advance() {
                Outcome::AteFood { score, .. } => score,
                Outcome::Moved { .. } => state.score(),
                Outcome::GameOver => break,
            };
            assert!(score == last_score || score == last_score + 10);
            last_score = score;
        }
        assert_eq!(state.score(), last_score);
    }

    #[test]
    fn advance_after_game_over_is_inert() {
        let mut state = fixture(12, 12, &[(5, 10), (5, 9), (5, 8)], Right, (2, 2));
        assert_eq!(state.advance(), Outcome::GameOver);

        let frozen = body_of(&state);
        assert_eq!(state.advance(), Outcome::GameOver);
        assert_eq!(body_of(&state), frozen);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn food_respawns_off_the_snake_even_when_space_is_tight() {
        // Leave only a handful of free interior cells so the rejection
        // sampling has to retry.
        let body: Vec<Coord> = (1..9)
            .flat_map(|r| (1..9).map(move |c| (r, c)))
            .filter(|&cell| cell != (1, 8) && cell != (2, 8))
            .collect();
        let mut state = fixture(10, 10, &body, Right, (1, 8));

        for _ in 0..20 {
            let food = state.place_food();
            assert!(is_interior(&state, food));
            assert!(!state.occupied.contains(&food));
        }
    }
}
