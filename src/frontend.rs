//! The narrow boundary between the simulation and whatever shows it.

use std::collections::VecDeque;
use std::time::Duration;

use crate::components::{Dir, GhostKind, Pos};
use crate::level::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    Tile(Tile),
    Pacman(Dir),
    Gobbling,
    Ghost(GhostKind),
    FrightenedGhost(GhostKind),
}

impl Glyph {
    pub const BLANK: Glyph = Glyph::Tile(Tile::Empty);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Steer(Dir),
    Quit,
    /// Ctrl-C.
    Interrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    HighScore(u32),
    Score(u32),
    Lives(u32),
    Level(u32),
    Bonus(u32),
    Supertime(u32),
}

impl Status {
    /// Every field once, top to bottom.
    pub const PANEL: [Status; 6] = [
        Status::HighScore(0),
        Status::Score(0),
        Status::Lives(0),
        Status::Level(0),
        Status::Bonus(0),
        Status::Supertime(0),
    ];

    pub fn value(self) -> u32 {
        match self {
            Status::HighScore(v)
            | Status::Score(v)
            | Status::Lives(v)
            | Status::Level(v)
            | Status::Bonus(v)
            | Status::Supertime(v) => v,
        }
    }
}

pub trait Frontend {
    /// Draws a glyph at a half-tile position. Only the column keeps its half
    /// step on screen; the row is shown at `pos.row / 2`.
    fn draw(&mut self, pos: Pos, glyph: Glyph);

    fn bell(&mut self);

    fn pause(&mut self, duration: Duration);

    /// Never blocks. `None` when no command is pending.
    fn poll_command(&mut self) -> Option<Command>;

    fn report(&mut self, status: Status);
}

/// Records everything the engine emits and replays scripted commands.
#[derive(Debug, Default)]
pub struct Headless {
    pub commands: VecDeque<Command>,
    pub draws: Vec<(Pos, Glyph)>,
    pub bells: usize,
    pub paused: Duration,
    pub reports: Vec<Status>,
}

impl Headless {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_command(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    pub fn last_score(&self) -> Option<u32> {
        self.reports.iter().rev().find_map(|status| match status {
            Status::Score(value) => Some(*value),
            _ => None,
        })
    }
}

impl Frontend for Headless {
    fn draw(&mut self, pos: Pos, glyph: Glyph) {
        self.draws.push((pos, glyph));
    }

    fn bell(&mut self) {
        self.bells += 1;
    }

    fn pause(&mut self, duration: Duration) {
        self.paused += duration;
    }

    fn poll_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    fn report(&mut self, status: Status) {
        self.reports.push(status);
    }
}
