use std::time::Duration;

use log::{debug, info};

use crate::io::{EndScreenPresenter, InputSource, Key, RenderSurface, Style};
use crate::state::{Direction, GameState, Outcome};

pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

const TITLE_TEXT: &str = "SNAKE GAME - Use arrow keys to move, 'q' to quit";
const SNAKE_CHAR: char = '█';
const FOOD_CHAR: char = '◆';

/// The tick loop. Owns the pacing and the three injected collaborators;
/// all collision and growth rules live in `GameState`.
pub struct GameLoop<I, R, P> {
    input: I,
    surface: R,
    presenter: P,
    tick: Duration,
}

impl<I, R, P> GameLoop<I, R, P>
where
    I: InputSource,
    R: RenderSurface,
    P: EndScreenPresenter,
{
    pub fn new(input: I, surface: R, presenter: P) -> Self {
        GameLoop { input, surface, presenter, tick: TICK_INTERVAL }
    }

    /// Runs the session to completion. Returns early on a manual quit,
    /// which skips the end screen; a crash shows it and waits for the
    /// player before returning. Surface errors abort the loop.
    pub fn run(&mut self, state: &mut GameState) -> crossterm::Result<()> {
        self.draw_initial(state)?;

        while state.is_running() {
            // The bounded poll is also the frame pacer: no key within one
            // tick simply keeps the current direction.
            match self.input.poll_key(self.tick)? {
                Some(Key::Quit) => {
                    info!("player quit with score {}", state.score());
                    return Ok(());
                }
                Some(Key::Up) => state.set_direction(Direction::Up),
                Some(Key::Down) => state.set_direction(Direction::Down),
                Some(Key::Left) => state.set_direction(Direction::Left),
                Some(Key::Right) => state.set_direction(Direction::Right),
                Some(Key::Unknown(_)) | None => {}
            }

            match state.advance() {
                Outcome::GameOver => {
                    info!("game over, final score {}", state.score());
                    self.presenter.show_game_over(state.score())?;
                }
                Outcome::AteFood { new_head, new_food, score } => {
                    debug!("ate food at {:?}, score now {}", new_head, score);
                    self.surface.draw_cell(new_head, SNAKE_CHAR, Style::Snake)?;
                    self.surface.draw_cell(new_food, FOOD_CHAR, Style::Food)?;
                    self.surface.draw_status_line(1, &format!("Score: {}", score), Style::Text)?;
                    self.surface.present()?;
                }
                Outcome::Moved { new_head, freed_tail } => {
                    self.surface.clear_cell(freed_tail)?;
                    self.surface.draw_cell(new_head, SNAKE_CHAR, Style::Snake)?;
                    self.surface.present()?;
                }
            }
        }

        Ok(())
    }

    fn draw_initial(&mut self, state: &GameState) -> crossterm::Result<()> {
        self.surface.draw_border()?;
        self.surface.draw_status_line(0, TITLE_TEXT, Style::Text)?;
        self.surface.draw_status_line(1, &format!("Score: {}", state.score()), Style::Text)?;

        for pos in state.body() {
            self.surface.draw_cell(*pos, SNAKE_CHAR, Style::Snake)?;
        }
        self.surface.draw_cell(state.food(), FOOD_CHAR, Style::Food)?;
        self.surface.present()
    }
}
