use crate::components::{Dir, DirSet, Entity, GhostKind, Interference, Pos, BLINKY, PACMAN};
use crate::engine::SimulationState;
use crate::error::EngineError;
use crate::frontend::{Frontend, Glyph};
use crate::level::{in_pen, Tile};
use crate::mode::Mode;
use crate::rng::Xorshift16;

const PINKY_LEAD: i32 = 8;
const INKY_LEAD: i32 = 4;

/// A navigation target. May lie well outside the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub col: i32,
    pub row: i32,
}

impl Point {
    fn ahead(self, dir: Dir, by: i32) -> Point {
        let (dx, dy) = dir.delta();
        Point {
            col: self.col + i32::from(dx) * by,
            row: self.row + i32::from(dy) * by,
        }
    }
}

impl From<Pos> for Point {
    fn from(pos: Pos) -> Self {
        Point {
            col: i32::from(pos.col),
            row: i32::from(pos.row),
        }
    }
}

/// Picks ghost `id`'s heading for this tick.
///
/// Ghosts never turn back on their own; only a pending reversal request lets
/// them, and it then takes priority over everything except a penned ghost
/// that can keep going straight.
pub(crate) fn select_direction(state: &mut SimulationState, id: usize) -> Result<Dir, EngineError> {
    let ghost = &mut state.entities[id];
    let Some(current) = ghost.direction else {
        return Err(EngineError::GhostBlocked { id });
    };
    if !ghost.pos.is_aligned() {
        return Ok(current);
    }

    let reverse = ghost.reverse_requested;
    let mut options = DirSet::all();
    if reverse {
        ghost.reverse_requested = false;
    } else {
        options.remove(current.opposite());
    }

    let ghost = &state.entities[id];
    for dir in Dir::ALL {
        if options.contains(dir) && !state.grid.can_move(ghost, dir)? {
            options.remove(dir);
        }
    }

    if in_pen(ghost.pos) && options.contains(current) {
        return Ok(current);
    }
    if reverse {
        return Ok(current.opposite());
    }
    if let Some(dir) = options.only() {
        return Ok(dir);
    }

    match state.modes.current() {
        Mode::Frightened => frightened(&mut state.rng, options, id),
        Mode::Scatter => navigate(ghost.pos, Point::from(ghost.home), options, id),
        Mode::Chase => chase(state, id, options),
    }
}

/// Walks the options in canonical order, taking each one on a coin flip.
/// The last option is taken without consulting the generator.
pub fn frightened(rng: &mut Xorshift16, options: DirSet, id: usize) -> Result<Dir, EngineError> {
    let mut later = options.len();
    for dir in options.iter() {
        later -= 1;
        if later == 0 || rng.next_u16() & 8 != 0 {
            return Ok(dir);
        }
    }
    Err(EngineError::NoViableDirection { id })
}

/// The option whose one-step projection lands closest to `target`.
/// Ties go to the earliest direction in canonical order.
pub fn navigate(from: Pos, target: Point, options: DirSet, id: usize) -> Result<Dir, EngineError> {
    let mut best: Option<(i32, Dir)> = None;
    for dir in options.iter() {
        let next = Point::from(from).ahead(dir, 1);
        let dx = next.col - target.col;
        let dy = next.row - target.row;
        let dist = dx * dx + dy * dy;
        if best.map_or(true, |(min, _)| dist < min) {
            best = Some((dist, dir));
        }
    }
    best.map(|(_, dir)| dir).ok_or(EngineError::NoMinimum { id })
}

fn chase(state: &mut SimulationState, id: usize, options: DirSet) -> Result<Dir, EngineError> {
    let ghost = &state.entities[id];
    let from = ghost.pos;
    let kind = ghost.ghost_kind().ok_or(EngineError::NotAGhost { id })?;
    let pacman = &state.entities[PACMAN];
    let target = Point::from(pacman.pos);

    match kind {
        GhostKind::Blinky => navigate(from, target, options, id),
        GhostKind::Pinky => {
            let heading = pacman.heading().ok_or(EngineError::NoHeading)?;
            navigate(from, target.ahead(heading, PINKY_LEAD), options, id)
        }
        GhostKind::Inky => {
            let heading = pacman.heading().ok_or(EngineError::NoHeading)?;
            let pivot = target.ahead(heading, INKY_LEAD);
            // Blinky has already moved this tick.
            let blinky = Point::from(state.entities[BLINKY].pos);
            let target = Point {
                col: blinky.col + 2 * (pivot.col - blinky.col),
                row: blinky.row + 2 * (pivot.row - blinky.row),
            };
            navigate(from, target, options, id)
        }
        GhostKind::Clyde => frightened(&mut state.rng, options, id),
    }
}

pub(crate) fn restore_interference(ghost: &Entity, fe: &mut impl Frontend) {
    if let Some(saved) = ghost.interference {
        fe.draw(saved.pos, Glyph::Tile(saved.tile));
    }
}

/// Save-under bookkeeping for a ghost about to occupy `next`.
///
/// Whatever the ghost covered last tick is redrawn first. Non-empty erasables
/// and the door are remembered rather than erased; an empty cell drops the
/// record.
pub(crate) fn save_under(
    state: &mut SimulationState,
    id: usize,
    next: Pos,
    fe: &mut impl Frontend,
) -> Result<(), EngineError> {
    let SimulationState { grid, entities, .. } = state;
    let ghost = &mut entities[id];

    restore_interference(ghost, fe);
    if next.col & 1 == 1 {
        return Ok(());
    }

    let tile = grid.tile_at(next)?;
    if tile != Tile::Empty && tile.is_erasable_or_door() {
        match ghost.interference {
            Some(saved) if saved.tile == tile => {}
            _ => {
                restore_interference(ghost, fe);
                ghost.interference = Some(Interference {
                    tile,
                    pos: Pos::new(next.col, next.row & !1),
                });
            }
        }
        return Ok(());
    }

    ghost.interference = None;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::NENTITY;
    use crate::frontend::Headless;

    const PINKY: usize = 2;
    const INKY: usize = 3;
    const CLYDE: usize = 4;

    fn started() -> SimulationState {
        let mut state = SimulationState::new().unwrap();
        state.enter_level(&mut Headless::new()).unwrap();
        state
    }

    fn set(dirs: &[Dir]) -> DirSet {
        dirs.iter().copied().collect()
    }

    #[test]
    fn ties_go_to_the_earlier_direction() {
        // Up and left both end up at squared distance 1 + 0 from a diagonal target.
        let from = Pos::new(10, 10);
        let target = Point { col: 9, row: 9 };
        let dir = navigate(from, target, set(&[Dir::Left, Dir::Up]), 1).unwrap();
        assert_eq!(dir, Dir::Up);

        let target = Point { col: 11, row: 11 };
        let dir = navigate(from, target, set(&[Dir::Right, Dir::Down]), 1).unwrap();
        assert_eq!(dir, Dir::Down);
    }

    #[test]
    fn navigate_picks_the_closest_projection() {
        let from = Pos::new(10, 10);
        let target = Point { col: 40, row: 12 };
        let dir = navigate(from, target, DirSet::all(), 1).unwrap();
        assert_eq!(dir, Dir::Right);
    }

    #[test]
    fn navigate_with_no_options_fails() {
        let result = navigate(Pos::new(10, 10), Point { col: 0, row: 0 }, DirSet::empty(), 3);
        assert_eq!(result, Err(EngineError::NoMinimum { id: 3 }));
    }

    #[test]
    fn frightened_stays_within_options() {
        let mut rng = Xorshift16::default();
        let options = set(&[Dir::Left, Dir::Right]);
        for _ in 0..500 {
            let dir = frightened(&mut rng, options, 1).unwrap();
            assert!(options.contains(dir));
        }
    }

    #[test]
    fn frightened_last_option_skips_the_generator() {
        let mut rng = Xorshift16::default();
        let before = rng.clone();
        assert_eq!(frightened(&mut rng, set(&[Dir::Down]), 1), Ok(Dir::Down));
        assert_eq!(rng, before);
    }

    #[test]
    fn frightened_follows_bit_three() {
        let mut twin = Xorshift16::default();
        let first = twin.next_u16();
        let mut rng = Xorshift16::default();
        let dir = frightened(&mut rng, set(&[Dir::Up, Dir::Right]), 1).unwrap();
        let expected = if first & 8 != 0 { Dir::Up } else { Dir::Right };
        assert_eq!(dir, expected);
    }

    fn chasing() -> SimulationState {
        let mut state = started();
        while state.modes.current() != Mode::Chase {
            state.modes.update(state.session.level).unwrap();
        }
        state
    }

    // Four-way crossing; arriving heading right leaves up, down and right.
    const CROSSING: Pos = Pos::new(22, 26);

    fn at_crossing(state: &mut SimulationState, id: usize) {
        state.entities[id].pos = CROSSING;
        state.entities[id].direction = Some(Dir::Right);
    }

    #[test]
    fn scatter_heads_for_the_home_corner() {
        let mut state = started();
        assert_eq!(state.modes.current(), Mode::Scatter);
        // Blinky lives top right, Pinky top left.
        at_crossing(&mut state, 1);
        assert_eq!(select_direction(&mut state, 1), Ok(Dir::Right));
        at_crossing(&mut state, PINKY);
        assert_eq!(select_direction(&mut state, PINKY), Ok(Dir::Up));
    }

    #[test]
    fn blinky_chases_pacman_directly() {
        let mut state = chasing();
        at_crossing(&mut state, 1);
        state.entities[PACMAN].pos = Pos::new(22, 40);
        assert_eq!(select_direction(&mut state, 1), Ok(Dir::Down));

        at_crossing(&mut state, 1);
        state.entities[PACMAN].pos = Pos::new(22, 10);
        assert_eq!(select_direction(&mut state, 1), Ok(Dir::Up));
    }

    #[test]
    fn clyde_chases_at_random() {
        let mut state = chasing();
        at_crossing(&mut state, CLYDE);
        let mut rng = state.rng.clone();
        let expected = frightened(&mut rng, set(&[Dir::Up, Dir::Down, Dir::Right]), CLYDE).unwrap();

        assert_eq!(select_direction(&mut state, CLYDE), Ok(expected));
        assert_eq!(state.rng, rng);
        assert_ne!(state.rng, Xorshift16::default());
    }

    #[test]
    fn penned_ghost_heads_for_the_door() {
        let mut state = started();
        // Pinky starts in the pen facing up.
        assert_eq!(select_direction(&mut state, PINKY), Ok(Dir::Up));
    }

    #[test]
    fn reversal_is_honoured_once() {
        let mut state = started();
        state.entities[1].reverse_requested = true;
        assert_eq!(select_direction(&mut state, 1), Ok(Dir::Right));
        assert!(!state.entities[1].reverse_requested);
    }

    #[test]
    fn never_turns_back_unasked() {
        let mut state = started();
        for id in 1..NENTITY {
            let current = state.entities[id].direction.unwrap();
            let dir = select_direction(&mut state, id).unwrap();
            assert_ne!(dir, current.opposite(), "ghost #{id}");
        }
    }

    #[test]
    fn blocked_ghost_is_an_error() {
        let mut state = started();
        state.entities[CLYDE].direction = None;
        assert_eq!(
            select_direction(&mut state, CLYDE),
            Err(EngineError::GhostBlocked { id: CLYDE })
        );
    }

    #[test]
    fn inky_aims_past_the_pivot() {
        let mut state = started();
        // Inky at a crossing with every direction but back open.
        state.entities[INKY].pos = Pos::new(22, 26);
        state.entities[INKY].direction = Some(Dir::Right);
        state.entities[BLINKY].pos = Pos::new(32, 26);
        state.entities[PACMAN].pos = Pos::new(32, 34);
        state.entities[PACMAN].direction = Some(Dir::Right);
        // Pivot (36, 34); target (40, 42).
        let options = set(&[Dir::Up, Dir::Down, Dir::Right]);
        let chosen = chase(&mut state, INKY, options).unwrap();
        let expected = navigate(Pos::new(22, 26), Point { col: 40, row: 42 }, options, INKY).unwrap();
        assert_eq!(chosen, expected);
        assert_eq!(chosen, Dir::Right);
    }

    #[test]
    fn pinky_uses_last_heading_while_pacman_is_blocked() {
        let mut state = started();
        state.entities[PACMAN].pos = Pos::new(20, 20);
        state.entities[PACMAN].direction = None;
        state.entities[PACMAN].previous = Some(Dir::Up);
        let from = Pos::new(20, 30);
        state.entities[PINKY].pos = from;
        let options = set(&[Dir::Left, Dir::Right, Dir::Up]);
        let chosen = chase(&mut state, PINKY, options).unwrap();
        assert_eq!(chosen, navigate(from, Point { col: 20, row: 12 }, options, PINKY).unwrap());
        assert_eq!(chosen, Dir::Up);
    }

    #[test]
    fn save_under_remembers_and_restores() {
        let mut state = started();
        let mut fe = Headless::new();
        let pellet = Pos::new(34, 34);

        save_under(&mut state, 1, pellet, &mut fe).unwrap();
        let saved = state.entities[1].interference.unwrap();
        assert_eq!(saved.tile, Tile::Pellet);
        assert_eq!(saved.pos, pellet);
        assert!(fe.draws.is_empty());

        // Half step: old tile redrawn, record kept.
        save_under(&mut state, 1, Pos::new(35, 34), &mut fe).unwrap();
        assert_eq!(fe.draws, vec![(pellet, Glyph::Tile(Tile::Pellet))]);
        assert!(state.entities[1].interference.is_some());

        // Onto an empty cell: record dropped.
        save_under(&mut state, 1, Pos::new(32, 34), &mut fe).unwrap();
        assert_eq!(state.entities[1].interference, None);
    }

    #[test]
    fn save_under_covers_the_door() {
        let mut state = started();
        save_under(&mut state, 2, Pos::new(32, 17), &mut Headless::new()).unwrap();
        let saved = state.entities[2].interference.unwrap();
        assert_eq!(saved.tile, Tile::Door);
        assert_eq!(saved.pos, Pos::new(32, 16));
    }
}
