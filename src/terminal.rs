//! crossterm front end: the maze sits at the right of an 80x24 screen, the
//! status panel in the left margin.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

use crate::components::{Dir, GhostKind, Pos};
use crate::frontend::{Command, Frontend, Glyph, Status};
use crate::level::{Tile, NCOL};

pub const SCREEN_W: u16 = 80;
pub const SCREEN_H: u16 = 24;
/// First screen column of the maze.
pub const MAZE_X: u16 = SCREEN_W - 2 * NCOL as u16;
const CELL_W: usize = 2;
const VALUE_OFFSET: u16 = 1;

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("terminal too small: need at least {need_w}x{need_h} (cols x rows), have {width}x{height}")]
    TooSmall {
        need_w: u16,
        need_h: u16,
        width: u16,
        height: u16,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Fails unless the terminal can hold the full 80x24 screen.
pub fn check_size() -> Result<(), TerminalError> {
    let (width, height) = terminal::size()?;
    if width < SCREEN_W || height < SCREEN_H {
        return Err(TerminalError::TooSmall {
            need_w: SCREEN_W,
            need_h: SCREEN_H,
            width,
            height,
        });
    }
    Ok(())
}

/// Raw mode plus the alternate screen. Dropping it puts the terminal back,
/// including when entering failed halfway.
pub struct Screen<W: Write> {
    out: W,
}

impl<W: Write> Screen<W> {
    pub fn enter(out: W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut screen = Screen { out };
        screen.out.execute(EnterAlternateScreen)?;
        screen.out.execute(Hide)?;
        Ok(screen)
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }
}

impl<W: Write> Drop for Screen<W> {
    fn drop(&mut self) {
        if let Err(err) = self.out.execute(Show) {
            tracing::error!(?err, "failed to show cursor");
        }
        if let Err(err) = self.out.execute(LeaveAlternateScreen) {
            tracing::error!(?err, "failed to leave alternate screen");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            tracing::error!(?err, "failed to disable raw mode");
        }
    }
}

/// Writes through any `Write`; the first I/O failure is kept and handed back
/// by [`Terminal::flush`], since the `Frontend` calls cannot fail.
pub struct Terminal<W: Write> {
    out: W,
    silent: bool,
    failure: Option<io::Error>,
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W, silent: bool) -> Self {
        Self {
            out,
            silent,
            failure: None,
        }
    }

    /// Clears the screen and prints the status labels.
    pub fn prepare(&mut self) -> io::Result<()> {
        self.out.queue(Clear(ClearType::All))?;
        for status in Status::PANEL {
            let (row, label) = panel_slot(status);
            self.out.queue(MoveTo(0, row))?;
            self.out.queue(SetForegroundColor(Color::White))?;
            self.out.queue(Print(label))?;
        }
        self.out.queue(ResetColor)?;
        self.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            if self.failure.is_none() {
                tracing::error!(?err, "terminal write failed");
                self.failure = Some(err);
            }
        }
    }

    fn draw_cell(&mut self, pos: Pos, glyph: Glyph) -> io::Result<()> {
        let (text, color) = glyph_style(glyph);
        self.out
            .queue(MoveTo(MAZE_X + u16::from(pos.col), u16::from(pos.row / 2)))?;
        self.out.queue(SetForegroundColor(color))?;
        self.out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                self.out.queue(Print(' '))?;
            }
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }

    fn draw_status(&mut self, status: Status) -> io::Result<()> {
        let (row, _) = panel_slot(status);
        self.out.queue(MoveTo(0, row + VALUE_OFFSET))?;
        self.out.queue(SetForegroundColor(Color::White))?;
        self.out.queue(Print(format!("{:08}", status.value())))?;
        self.out.queue(ResetColor)?;
        Ok(())
    }
}

impl<W: Write> Frontend for Terminal<W> {
    fn draw(&mut self, pos: Pos, glyph: Glyph) {
        let result = self.draw_cell(pos, glyph);
        self.record(result);
    }

    fn bell(&mut self) {
        if !self.silent {
            let result = self.out.queue(Print('\x07')).map(|_| ());
            self.record(result);
        }
    }

    fn pause(&mut self, duration: Duration) {
        let result = self.out.flush();
        self.record(result);
        std::thread::sleep(duration);
    }

    fn poll_command(&mut self) -> Option<Command> {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(err) => {
                    self.record(Err(err));
                    return None;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(command) = command_for(key) {
                        return Some(command);
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    self.record(Err(err));
                    return None;
                }
            }
        }
    }

    fn report(&mut self, status: Status) {
        let result = self.draw_status(status);
        self.record(result);
    }
}

/// Arrow keys or hjkl steer, q quits, Ctrl-C interrupts.
pub fn command_for(key: KeyEvent) -> Option<Command> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    let command = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Interrupt,
        KeyCode::Char('q') => Command::Quit,
        KeyCode::Up | KeyCode::Char('k') => Command::Steer(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') => Command::Steer(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') => Command::Steer(Dir::Left),
        KeyCode::Right | KeyCode::Char('l') => Command::Steer(Dir::Right),
        _ => return None,
    };
    Some(command)
}

fn panel_slot(status: Status) -> (u16, &'static str) {
    match status {
        Status::HighScore(_) => (0, "Highscore"),
        Status::Score(_) => (3, "Score"),
        Status::Lives(_) => (6, "Lives"),
        Status::Level(_) => (9, "Level"),
        Status::Bonus(_) => (12, "Bonus"),
        Status::Supertime(_) => (15, "Supertime"),
    }
}

const WALL: Color = Color::Rgb { r: 51, g: 102, b: 255 };
const PELLET: Color = Color::Rgb { r: 255, g: 255, b: 204 };
const POWER: Color = Color::Rgb { r: 255, g: 204, b: 51 };
const PACMAN: Color = Color::Rgb { r: 255, g: 255, b: 0 };

fn ghost_color(kind: GhostKind) -> Color {
    match kind {
        GhostKind::Blinky => Color::Rgb { r: 255, g: 0, b: 0 },
        GhostKind::Pinky => Color::Rgb { r: 255, g: 179, b: 255 },
        GhostKind::Inky => Color::Rgb { r: 0, g: 255, b: 255 },
        GhostKind::Clyde => Color::Rgb { r: 255, g: 179, b: 102 },
    }
}

fn glyph_style(glyph: Glyph) -> (&'static str, Color) {
    match glyph {
        Glyph::Tile(tile) => tile_style(tile),
        Glyph::Pacman(dir) => {
            let text = match dir {
                Dir::Up => "ᗢ",
                Dir::Left => "ᗤ",
                Dir::Down => "ᗣ",
                Dir::Right => "ᗧ",
            };
            (text, PACMAN)
        }
        Glyph::Gobbling => ("●", PACMAN),
        Glyph::Ghost(kind) => ("ᙁ", ghost_color(kind)),
        Glyph::FrightenedGhost(_) => ("ᙁ", Color::Blue),
    }
}

// The vertical stroke sits in the left column of each cell so corners line up.
fn tile_style(tile: Tile) -> (&'static str, Color) {
    let text = match tile {
        Tile::Empty => return ("  ", Color::Reset),
        Tile::Pellet => return ("·", PELLET),
        Tile::Power => return ("●", POWER),
        Tile::Door => return ("══", Color::Magenta),
        Tile::UpperLeft => "┌─",
        Tile::UpperRight => "┐",
        Tile::LowerLeft => "└─",
        Tile::LowerRight => "┘",
        Tile::HBar => "──",
        Tile::VBar => "│",
        Tile::TeeDown => "┬─",
        Tile::TeeUp => "┴─",
        Tile::TeeLeft => "┤",
        Tile::TeeRight => "├─",
        Tile::WestCap => "╶─",
        Tile::EastCap => "╴",
        Tile::SouthCap => "╵",
        Tile::NorthCap => "╷",
    };
    (text, WALL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn text(term: Terminal<Vec<u8>>) -> String {
        String::from_utf8(term.into_inner()).unwrap()
    }

    #[test]
    fn maze_starts_at_column_fourteen() {
        assert_eq!(MAZE_X, 14);
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(command_for(key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(command_for(key(KeyCode::Left)), Some(Command::Steer(Dir::Left)));
        assert_eq!(command_for(key(KeyCode::Char('k'))), Some(Command::Steer(Dir::Up)));
        assert_eq!(command_for(key(KeyCode::Char('x'))), None);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for(ctrl_c), Some(Command::Interrupt));
        assert_eq!(command_for(key(KeyCode::Char('c'))), None);
    }

    #[test]
    fn every_glyph_fills_two_columns() {
        let tiles = [
            Tile::Empty,
            Tile::Pellet,
            Tile::Power,
            Tile::Door,
            Tile::UpperLeft,
            Tile::VBar,
            Tile::TeeRight,
            Tile::NorthCap,
        ];
        for tile in tiles {
            let (text, _) = tile_style(tile);
            assert!(UnicodeWidthStr::width(text) <= CELL_W, "{tile:?}");
        }
        for dir in Dir::ALL {
            let (text, _) = glyph_style(Glyph::Pacman(dir));
            assert!(UnicodeWidthStr::width(text) <= CELL_W);
        }
    }

    #[test]
    fn half_rows_share_a_screen_line() {
        let mut term = Terminal::new(Vec::new(), true);
        term.draw(Pos::new(33, 35), Glyph::Gobbling);
        term.flush().unwrap();
        // MoveTo is 1-based: column 14 + 33 + 1, row 35 / 2 + 1.
        assert!(text(term).starts_with("\x1b[18;48H"));
    }

    #[test]
    fn status_values_are_zero_padded() {
        let mut term = Terminal::new(Vec::new(), true);
        term.report(Status::Score(1230));
        term.flush().unwrap();
        let out = text(term);
        assert!(out.starts_with("\x1b[5;1H"));
        assert!(out.contains("00001230"));
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn dropping_the_screen_restores_cursor_and_main_screen() {
        let mut buf = Vec::new();
        drop(Screen { out: &mut buf });
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("\x1b[?25h"));
        assert!(out.contains("\x1b[?1049l"));
    }

    #[test]
    fn restore_survives_a_dead_writer() {
        drop(Screen { out: Broken });
    }

    #[test]
    fn write_failures_surface_on_flush() {
        let mut term = Terminal::new(Broken, true);
        term.draw(Pos::new(2, 2), Glyph::BLANK);
        term.report(Status::Lives(3));
        assert_eq!(term.flush().unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn silent_terminal_never_rings() {
        let mut quiet = Terminal::new(Vec::new(), true);
        quiet.bell();
        assert!(!text(quiet).contains('\x07'));

        let mut loud = Terminal::new(Vec::new(), false);
        loud.bell();
        assert!(text(loud).contains('\x07'));
    }
}
