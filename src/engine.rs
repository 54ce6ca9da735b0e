use std::time::Duration;

use rand::SeedableRng;
use tracing::{debug, info, trace};

use crate::components::{self, Dir, Entity, Persona, Pos, NENTITY, PACMAN};
use crate::error::EngineError;
use crate::frontend::{Command, Frontend, Glyph, Status};
use crate::ghost;
use crate::level::{Grid, NCOL, NROW};
use crate::mode::{ModeEvent, ModeScheduler, CLKPERIOD_MS};
use crate::player;
use crate::rng::{Xorshift16, LEVEL_SEED};

const STARTING_LIVES: u32 = 3;
const CAPTURE_RESPAWN_TICKS: u8 = 50;
const DEATH_GRACE_TICKS: u8 = 20;
const KILL_POINTS: u32 = 100;
const DEATH_ROTATIONS: usize = 4;
const DEATH_POSE_PAUSE: Duration = Duration::from_millis(125);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
    Interrupted,
}

/// Counters shown on the status panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub high_score: u32,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub bonus: u32,
    pub supertime: u32,
    /// Items left in the maze. Zero starts the next level.
    pub remaining: u32,
}

/// Everything the simulation mutates. Only the tick loop writes to it, one
/// entity at a time in identity order.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub grid: Grid,
    pub entities: [Entity; NENTITY],
    pub modes: ModeScheduler,
    pub rng: Xorshift16,
    pub session: Session,
}

impl SimulationState {
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            grid: Grid::load()?,
            entities: components::cast(),
            modes: ModeScheduler::default(),
            rng: Xorshift16::default(),
            session: Session {
                lives: STARTING_LIVES,
                ..Session::default()
            },
        })
    }

    pub fn pacman(&self) -> &Entity {
        &self.entities[PACMAN]
    }

    /// Ghosts are edible while the fright countdown runs.
    pub fn frightened(&self) -> bool {
        self.modes.fright_remaining() > 0
    }

    pub(crate) fn add_score(&mut self, delta: u32, fe: &mut impl Frontend) {
        self.session.score += delta;
        fe.report(Status::Score(self.session.score));
        if self.session.score > self.session.high_score {
            self.session.high_score = self.session.score;
            fe.report(Status::HighScore(self.session.high_score));
        }
    }

    /// Fresh maze, next level number, everyone back home.
    pub fn enter_level(&mut self, fe: &mut impl Frontend) -> Result<(), EngineError> {
        self.grid = Grid::load()?;
        for row in 0..NROW {
            for col in 0..NCOL {
                let pos = Pos::new((col * 2) as u8, (row * 2) as u8);
                fe.draw(pos, Glyph::Tile(self.grid.cell(col, row)));
            }
        }
        self.session.remaining = self.grid.count_items();

        self.session.level += 1;
        fe.report(Status::Level(self.session.level));

        for entity in self.entities.iter_mut() {
            entity.reset_pose();
            entity.inited = false;
            entity.respawn = 0;
            entity.gobbling = 0;
            entity.reverse_requested = false;
            entity.interference = None;
        }
        self.entities[PACMAN].reward = 0;

        self.rng = Xorshift16::from_seed(LEVEL_SEED.to_le_bytes());
        self.modes.level_entry(self.session.level)?;
        info!(level = self.session.level, items = self.session.remaining, "level start");
        Ok(())
    }

    fn apply(&mut self, event: ModeEvent, fe: &mut impl Frontend) {
        match event {
            ModeEvent::Reversal => {
                for ghost in self.entities.iter_mut().skip(1) {
                    ghost.reverse_requested = true;
                }
                fe.bell();
            }
            ModeEvent::FrightTick => {
                self.session.supertime += CLKPERIOD_MS / 5;
                fe.report(Status::Supertime(self.session.supertime));
            }
            ModeEvent::FrightOver => {
                self.entities[PACMAN].reward = 0;
            }
        }
    }

    fn move_entity(&mut self, id: usize, fe: &mut impl Frontend) -> Result<Flow, EngineError> {
        if !self.entities[id].inited {
            self.draw_entity(id, fe)?;
            self.entities[id].inited = true;
            return Ok(Flow::Continue);
        }

        let direction = if id == PACMAN {
            let steer = match fe.poll_command() {
                Some(Command::Quit) => {
                    info!(score = self.session.score, "quit requested");
                    return Ok(Flow::Quit);
                }
                Some(Command::Interrupt) => {
                    info!(score = self.session.score, "interrupted");
                    return Ok(Flow::Interrupted);
                }
                Some(Command::Steer(dir)) => Some(dir),
                None => None,
            };
            player::select_direction(self, steer)?
        } else {
            Some(ghost::select_direction(self, id)?)
        };
        self.entities[id].direction = direction;

        fe.draw(self.entities[id].pos, Glyph::BLANK);
        let next = projected(&mut self.entities[id])?;
        if id == PACMAN {
            player::consume(self, next, fe)?;
        } else {
            ghost::save_under(self, id, next, fe)?;
        }
        self.entities[id].pos = next;

        if let Some(ghost_id) = self.find_capture(id) {
            self.resolve_capture(ghost_id, fe)?;
        }

        self.draw_entity(id, fe)?;
        Ok(Flow::Continue)
    }

    /// The ghost sharing pacman's cell, preferring the one that just moved.
    fn find_capture(&self, mover: usize) -> Option<usize> {
        let cell = self.pacman().pos.grid_cell();
        if mover != PACMAN && self.entities[mover].pos.grid_cell() == cell {
            return Some(mover);
        }
        (1..NENTITY).find(|&id| self.entities[id].pos.grid_cell() == cell)
    }

    fn resolve_capture(&mut self, ghost_id: usize, fe: &mut impl Frontend) -> Result<(), EngineError> {
        if !self.entities.get(ghost_id).is_some_and(Entity::is_ghost) {
            return Err(EngineError::NotAGhost { id: ghost_id });
        }

        if self.frightened() {
            let ghost = &mut self.entities[ghost_id];
            // Already on its way back: cannot be eaten twice.
            if ghost.respawn > 0 {
                return Ok(());
            }
            ghost::restore_interference(ghost, fe);
            ghost.interference = None;
            ghost.respawn = CAPTURE_RESPAWN_TICKS;
            ghost.reset_pose();

            let pacman = &mut self.entities[PACMAN];
            pacman.reward = if pacman.reward == 0 {
                2
            } else {
                pacman.reward.wrapping_mul(2)
            };
            let points = KILL_POINTS * u32::from(pacman.reward);
            self.add_score(points, fe);
            debug!(ghost = ghost_id, points, "ghost eaten");
            return Ok(());
        }

        self.pacman_dies(fe)?;
        self.session.lives = self.session.lives.saturating_sub(1);
        fe.report(Status::Lives(self.session.lives));
        debug!(ghost = ghost_id, lives = self.session.lives, "pacman caught");
        if self.session.lives == 0 {
            info!(score = self.session.score, level = self.session.level, "game over");
            return Err(EngineError::GameOver {
                score: self.session.score,
            });
        }
        Ok(())
    }

    fn pacman_dies(&mut self, fe: &mut impl Frontend) -> Result<(), EngineError> {
        let pacman = &mut self.entities[PACMAN];
        let spot = pacman.pos;
        for _ in 0..DEATH_ROTATIONS {
            for dir in Dir::ALL {
                pacman.direction = Some(dir);
                fe.draw(spot, pacman_glyph(pacman)?);
                fe.pause(DEATH_POSE_PAUSE);
            }
        }
        fe.draw(spot, Glyph::BLANK);

        self.modes.cancel_fright();
        self.entities[PACMAN].reward = 0;

        for entity in self.entities.iter_mut() {
            fe.draw(entity.pos, Glyph::BLANK);
            if entity.is_ghost() {
                ghost::restore_interference(entity, fe);
                entity.interference = None;
                entity.respawn = DEATH_GRACE_TICKS;
            }
            entity.reset_pose();
            entity.inited = false;
        }
        Ok(())
    }

    fn draw_entity(&mut self, id: usize, fe: &mut impl Frontend) -> Result<(), EngineError> {
        let frightened = self.frightened();
        let entity = &mut self.entities[id];
        let glyph = match entity.persona {
            Persona::Pacman => pacman_glyph(entity)?,
            Persona::Ghost(kind) if frightened => Glyph::FrightenedGhost(kind),
            Persona::Ghost(kind) => Glyph::Ghost(kind),
        };
        fe.draw(entity.pos, glyph);
        Ok(())
    }
}

/// Where an entity ends up this tick. A grounded entity stays put while its
/// respawn countdown runs down.
fn projected(entity: &mut Entity) -> Result<Pos, EngineError> {
    if entity.respawn > 0 {
        entity.respawn -= 1;
        return Ok(entity.pos);
    }
    match entity.direction {
        None => Ok(entity.pos),
        Some(dir) => entity
            .pos
            .offset(dir, 1)
            .ok_or(EngineError::CoordinateOutOfRange {
                col: entity.pos.col,
                row: entity.pos.row,
            }),
    }
}

/// Drawing pacman consumes one tick of the gobbling animation.
fn pacman_glyph(pacman: &mut Entity) -> Result<Glyph, EngineError> {
    if pacman.gobbling > 0 {
        pacman.gobbling -= 1;
        return Ok(Glyph::Gobbling);
    }
    pacman
        .heading()
        .map(Glyph::Pacman)
        .ok_or(EngineError::NoHeading)
}

/// Owns the state and drives it one tick at a time.
#[derive(Debug, Clone)]
pub struct Simulation {
    state: SimulationState,
    ticks: u64,
}

impl Simulation {
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            state: SimulationState::new()?,
            ticks: 0,
        })
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    /// Pushes every status value once, for an empty panel.
    pub fn announce(&self, fe: &mut impl Frontend) {
        let session = &self.state.session;
        fe.report(Status::HighScore(session.high_score));
        fe.report(Status::Score(session.score));
        fe.report(Status::Lives(session.lives));
        fe.report(Status::Level(session.level));
        fe.report(Status::Bonus(session.bonus));
        fe.report(Status::Supertime(session.supertime));
    }

    /// One clock tick: level entry when the maze is empty, otherwise the mode
    /// scheduler followed by every entity in identity order.
    pub fn step(&mut self, fe: &mut impl Frontend) -> Result<Flow, EngineError> {
        let state = &mut self.state;
        if state.session.remaining == 0 {
            state.enter_level(fe)?;
            return Ok(Flow::Continue);
        }

        if let Some(event) = state.modes.update(state.session.level)? {
            state.apply(event, fe);
        }

        for id in 0..NENTITY {
            let flow = state.move_entity(id, fe)?;
            if flow != Flow::Continue {
                return Ok(flow);
            }
        }

        self.ticks += 1;
        trace!(
            tick = self.ticks,
            mode = ?state.modes.current(),
            score = state.session.score,
            remaining = state.session.remaining,
            "tick"
        );
        Ok(Flow::Continue)
    }
}
