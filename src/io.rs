use crate::Coord;
use crate::TermInt;

use std::time::Duration;

use crossterm::event::KeyCode;
use crossterm::Result;

/// One decoded key press. Anything the game has no binding for comes
/// through as `Unknown` with its raw code and is ignored by the driver.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Quit,
    Unknown(KeyCode),
}

/// Opaque style picked by the game; the surface maps it to actual colors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Style {
    Snake,
    Food,
    Text,
    Alert,
}

pub trait InputSource {
    /// Waits up to `timeout` for a key press. `Ok(None)` means the wait
    /// elapsed with nothing pressed, which doubles as the frame pacer.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<Key>>;
}

/// Grid-drawing collaborator. The game only issues commands and never reads
/// cells back; `present` makes everything queued so far visible.
pub trait RenderSurface {
    fn draw_cell(&mut self, pos: Coord, glyph: char, style: Style) -> Result<()>;
    fn clear_cell(&mut self, pos: Coord) -> Result<()>;
    fn draw_border(&mut self) -> Result<()>;
    fn draw_status_line(&mut self, line: TermInt, text: &str, style: Style) -> Result<()>;
    fn present(&mut self) -> Result<()>;
}

pub trait EndScreenPresenter {
    /// Shows the final score and blocks until the player acknowledges.
    fn show_game_over(&mut self, score: u32) -> Result<()>;
}
