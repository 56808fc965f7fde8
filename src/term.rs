use crate::io::{EndScreenPresenter, InputSource, Key, RenderSurface, Style};
use crate::{Coord, TermInt};

use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, Result};

// The playing field starts below the title and score lines and is inset
// one column on each side.
const TOP_MARGIN: TermInt = 3;
const BOTTOM_MARGIN: TermInt = 1;
const SIDE_MARGIN: TermInt = 1;

/// Field dimensions available inside a terminal of the given size.
pub fn playing_area(term_height: TermInt, term_width: TermInt) -> (TermInt, TermInt) {
    (
        term_height.saturating_sub(TOP_MARGIN + BOTTOM_MARGIN),
        term_width.saturating_sub(2 * SIDE_MARGIN),
    )
}

/// Terminal position of a field cell (crossterm wants x, y).
fn field_pos((row, col): Coord) -> cursor::MoveTo {
    cursor::MoveTo(col + SIDE_MARGIN, row + TOP_MARGIN)
}

fn color_for(style: Style) -> Color {
    match style {
        Style::Snake => Color::Green,
        Style::Food => Color::Red,
        Style::Text => Color::Yellow,
        Style::Alert => Color::Red,
    }
}

/// Exclusive hold on the terminal: raw mode, alternate screen, hidden
/// cursor. Dropping it undoes all three, so the terminal comes back intact
/// on every exit path, errors included.
pub struct ScreenGuard {
    stdout: Stdout,
}

impl ScreenGuard {
    pub fn acquire() -> Result<Self> {
        let mut stdout = stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;
        Ok(ScreenGuard { stdout })
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        // Nowhere left to report teardown errors to.
        let _ = execute!(self.stdout, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Shown in place of the game when the terminal cannot fit the field.
pub fn show_startup_error(message: &str) -> Result<()> {
    execute!(stdout(), cursor::MoveTo(0, 0), Print(message))
}

pub struct TermInput;

impl InputSource for TermInput {
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<Key>> {
        if !poll(timeout)? {
            return Ok(None);
        }
        match read()? {
            Event::Key(ev) => {
                let key = map_key(&ev);
                if let Key::Unknown(code) = key {
                    log::trace!("ignoring key {:?}", code);
                }
                Ok(Some(key))
            }
            // Resize and mouse events are not key presses.
            _ => Ok(None),
        }
    }
}

fn map_key(ev: &KeyEvent) -> Key {
    if matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL }) {
        return Key::Quit;
    }

    match ev.code {
        KeyCode::Up | KeyCode::Char('w') => Key::Up,
        KeyCode::Down | KeyCode::Char('s') => Key::Down,
        KeyCode::Left | KeyCode::Char('a') => Key::Left,
        KeyCode::Right | KeyCode::Char('d') => Key::Right,
        KeyCode::Char('q') => Key::Quit,
        code => Key::Unknown(code),
    }
}

/// Crossterm-backed `RenderSurface`. Draw commands are queued and only hit
/// the terminal on `present`.
pub struct TermScreen {
    stdout: Stdout,
    height: TermInt,
    width: TermInt,
}

impl TermScreen {
    pub fn new(height: TermInt, width: TermInt) -> Self {
        TermScreen { stdout: stdout(), height, width }
    }
}

impl RenderSurface for TermScreen {
    fn draw_cell(&mut self, pos: Coord, glyph: char, style: Style) -> Result<()> {
        queue!(
            self.stdout,
            field_pos(pos),
            SetForegroundColor(color_for(style)),
            Print(glyph),
            ResetColor
        )
    }

    fn clear_cell(&mut self, pos: Coord) -> Result<()> {
        queue!(self.stdout, field_pos(pos), Print(' '))
    }

    fn draw_border(&mut self) -> Result<()> {
        let (end_row, end_col) = (self.height - 1, self.width - 1);

        for col in 0..self.width {
            let ch = if col == 0 || col == end_col { '+' } else { '-' };
            queue!(self.stdout, field_pos((0, col)), Print(ch))?;
            queue!(self.stdout, field_pos((end_row, col)), Print(ch))?;
        }

        for row in 1..end_row {
            queue!(self.stdout, field_pos((row, 0)), Print('|'))?;
            queue!(self.stdout, field_pos((row, end_col)), Print('|'))?;
        }

        Ok(())
    }

    fn draw_status_line(&mut self, line: TermInt, text: &str, style: Style) -> Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(SIDE_MARGIN, line),
            SetForegroundColor(color_for(style)),
            Print(text),
            ResetColor
        )
    }

    fn present(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }
}

/// Clears the field, announces the final score and waits for any key.
pub struct TermPresenter {
    stdout: Stdout,
    height: TermInt,
    width: TermInt,
}

impl TermPresenter {
    pub fn new(height: TermInt, width: TermInt) -> Self {
        TermPresenter { stdout: stdout(), height, width }
    }

    fn centered_line(&mut self, row: TermInt, text: &str, style: Style, bold: bool) -> Result<()> {
        let col = self.width.saturating_sub(text.chars().count() as TermInt) / 2;
        queue!(self.stdout, field_pos((row, col)), SetForegroundColor(color_for(style)))?;
        if bold {
            queue!(self.stdout, SetAttribute(Attribute::Bold))?;
        }
        queue!(self.stdout, Print(text), SetAttribute(Attribute::Reset), ResetColor)
    }
}

impl EndScreenPresenter for TermPresenter {
    fn show_game_over(&mut self, score: u32) -> Result<()> {
        // Wipe the interior; the border stays up around the message.
        for row in 1..self.height - 1 {
            for col in 1..self.width - 1 {
                queue!(self.stdout, field_pos((row, col)), Print(' '))?;
            }
        }

        let mid = self.height / 2;
        self.centered_line(mid - 1, "GAME OVER!", Style::Alert, true)?;
        self.centered_line(mid, &format!("Final Score: {}", score), Style::Text, false)?;
        self.centered_line(mid + 1, "Press any key to exit", Style::Text, false)?;
        self.stdout.flush()?;

        loop {
            if let Event::Key(_) = read()? {
                return Ok(());
            }
        }
    }
}
