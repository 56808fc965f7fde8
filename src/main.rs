mod game;
mod io;
mod state;
mod term;

/// Coordinate unit shared with the terminal layer.
pub type TermInt = u16;
/// (row, column), zero-based within the playing field.
pub type Coord = (TermInt, TermInt);

use std::fs::File;
use std::process::exit;
use std::thread::sleep;
use std::time::Duration;

use log::{error, info, LevelFilter};
use simplelog::{Config, WriteLogger};

use game::GameLoop;
use state::GameState;
use term::{ScreenGuard, TermInput, TermPresenter, TermScreen};

const LOG_FILE: &str = "snake.log";

fn main() {
    // Stdout belongs to the alternate screen while the game runs, so
    // diagnostics go to a file. Playing without logs is fine. Trace level
    // so the per-food and ignored-key events make it to the file too.
    if let Ok(file) = File::create(LOG_FILE) {
        let _ = WriteLogger::init(LevelFilter::Trace, Config::default(), file);
    }

    let result = play();

    // The alternate screen is torn down by now, so these land on the
    // regular terminal contents.
    let code = match result {
        Ok(()) => 0,
        Err(err) => {
            error!("fatal: {}", err);
            eprintln!("An error occurred: {}", err);
            1
        }
    };
    println!("Thanks for playing Snake!");
    exit(code);
}

fn play() -> crossterm::Result<()> {
    let (term_width, term_height) = crossterm::terminal::size()?;
    let _guard = ScreenGuard::acquire()?;

    let (height, width) = term::playing_area(term_height, term_width);
    info!("terminal {}x{}, playing field {}x{}", term_width, term_height, width, height);

    let mut state = match GameState::new(height, width) {
        Ok(state) => state,
        Err(err) => {
            // Not retried: show the message for a moment and bow out.
            term::show_startup_error(&err.to_string())?;
            sleep(Duration::from_secs(2));
            return Ok(());
        }
    };

    let mut game = GameLoop::new(
        TermInput,
        TermScreen::new(height, width),
        TermPresenter::new(height, width),
    );
    game.run(&mut state)
    // _guard drops here and restores the terminal, error path included.
}
