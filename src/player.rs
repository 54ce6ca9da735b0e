use crate::components::{Dir, Pos, PACMAN};
use crate::engine::SimulationState;
use crate::error::EngineError;
use crate::frontend::Frontend;
use crate::level::Tile;

pub const PELLET_POINTS: u32 = 10;
pub const POWER_POINTS: u32 = 50;
const GOBBLE_TICKS: u8 = 2;

/// Picks pacman's heading for this tick. `None` means blocked.
///
/// A fresh keypress replaces whatever was queued before. Turns only happen on
/// aligned positions; the queued heading wins when it is open, otherwise
/// pacman keeps going until a wall stops it.
pub(crate) fn select_direction(
    state: &mut SimulationState,
    steer: Option<Dir>,
) -> Result<Option<Dir>, EngineError> {
    let SimulationState { grid, entities, .. } = state;
    let pacman = &mut entities[PACMAN];

    if steer.is_some() {
        pacman.intended = steer;
    }

    if !pacman.pos.is_aligned() {
        return Ok(pacman.direction);
    }

    if let Some(dir) = pacman.intended {
        if grid.can_move(pacman, dir)? {
            pacman.intended = None;
            return Ok(Some(dir));
        }
    }

    let Some(current) = pacman.direction else {
        return Ok(None);
    };
    if grid.can_move(pacman, current)? {
        return Ok(Some(current));
    }
    pacman.previous = Some(current);
    Ok(None)
}

/// Eats whatever scorable item lies at `next`, once pacman is aligned there.
pub(crate) fn consume(
    state: &mut SimulationState,
    next: Pos,
    fe: &mut impl Frontend,
) -> Result<(), EngineError> {
    if !next.is_aligned() {
        return Ok(());
    }
    let tile = state.grid.tile_at(next)?;
    if !tile.is_scorable() {
        return Ok(());
    }

    state.entities[PACMAN].gobbling = GOBBLE_TICKS;
    match tile {
        Tile::Pellet => state.add_score(PELLET_POINTS, fe),
        Tile::Power => {
            state.add_score(POWER_POINTS, fe);
            // The kill multiplier survives a refresh on purpose.
            state.modes.enter_fright();
        }
        _ => {}
    }

    state.grid.clear(next)?;
    state.session.remaining = state.session.remaining.saturating_sub(1);
    Ok(())
}
