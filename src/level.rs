use crate::components::{Dir, Entity, Pos};
use crate::error::EngineError;

pub const NCOL: usize = 33;
pub const NROW: usize = 23;
/// Pellets plus power pellets in a fresh maze.
pub const ITEM_COUNT: u32 = 172;

// One character per cell:
//   A-D corners, E/F bars, G-J tees, O/P/Q/S bar end caps (west/east/south/north),
//   K pellet, L power pellet, T pen door, blank is empty.
const LAYOUT: [&str; NROW] = [
    "AEEEEEEEGEEEEEEEEEEEEEEEGEEEEEEEB",
    "FL K K KFK K K K K K K KFK K K LF",
    "F AEEEP Q OEEEEEEEEEEEP Q OEEEB F",
    "FKFK K K K K K K K K K K K K KFKF",
    "F Q S S OEP OEEEEEEEP OEP S S Q F",
    "FK KFKFK K K K K K K K K KFKFK KF",
    "JEP F Q OEEEB OEEEP AEEEP Q F OEI",
    "FK KFK K K KFK K K KFK K K KFK KF",
    "F S Q OEEEB F ATTTB F AEEEP Q S F",
    "FKFK K K KFKFKF   FKFKFK K K KFKF",
    "F F OEEEP F F F   F F F OEEEP F F",
    "FKFK K K KFKFKF   FKFKFK K K KFKF",
    "F CEP S S Q Q CEEED Q Q S S OED F",
    "FK K KFKFK K K K K K K KFKFK K KF",
    "F OEEED Q S OEEEEEEEP S Q CEEEP F",
    "FK K K K KFK K K K K KFK K K K KF",
    "F OEGEEEP Q OEEEEEEEP Q OEEEGEP F",
    "FK KFK K K K K K K K K K K KFK KF",
    "JEP F OEP S OEEEEEEEP S OEP F OEI",
    "FK KFK K KFK K K K K KFK K KFK KF",
    "F OEHEEEP F OEEEEEEEP F OEEEHEP F",
    "FL K K K KFK K K K K KFK K K K LF",
    "CEEEEEEEEEHEEEEEEEEEEEHEEEEEEEEED",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Empty,
    Pellet,
    Power,
    Door,
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
    HBar,
    VBar,
    TeeDown,
    TeeUp,
    TeeLeft,
    TeeRight,
    WestCap,
    EastCap,
    SouthCap,
    NorthCap,
}

impl Tile {
    fn from_symbol(symbol: char) -> Option<Tile> {
        let tile = match symbol {
            ' ' => Tile::Empty,
            'A' => Tile::UpperLeft,
            'B' => Tile::UpperRight,
            'C' => Tile::LowerLeft,
            'D' => Tile::LowerRight,
            'E' => Tile::HBar,
            'F' => Tile::VBar,
            'G' => Tile::TeeDown,
            'H' => Tile::TeeUp,
            'I' => Tile::TeeLeft,
            'J' => Tile::TeeRight,
            'K' => Tile::Pellet,
            'L' => Tile::Power,
            'O' => Tile::WestCap,
            'P' => Tile::EastCap,
            'Q' => Tile::SouthCap,
            'S' => Tile::NorthCap,
            'T' => Tile::Door,
            _ => return None,
        };
        Some(tile)
    }

    pub fn is_scorable(self) -> bool {
        matches!(self, Tile::Pellet | Tile::Power)
    }

    pub fn is_erasable(self) -> bool {
        self == Tile::Empty || self.is_scorable()
    }

    pub fn is_erasable_or_door(self) -> bool {
        self == Tile::Door || self.is_erasable()
    }
}

pub fn is_valid_col(col: u8) -> bool {
    (2..64).contains(&col)
}

pub fn is_valid_row(row: u8) -> bool {
    (2..44).contains(&row)
}

/// Door row plus pen interior, in half-tile coordinates.
pub fn in_pen(pos: Pos) -> bool {
    (16..23).contains(&pos.row) && (30..35).contains(&pos.col)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: [[Tile; NCOL]; NROW],
}

impl Grid {
    pub fn load() -> Result<Grid, EngineError> {
        Grid::parse(&LAYOUT)
    }

    fn parse(layout: &[&str; NROW]) -> Result<Grid, EngineError> {
        let mut cells = [[Tile::Empty; NCOL]; NROW];
        for (row, line) in layout.iter().enumerate() {
            let len = line.chars().count();
            if len != NCOL {
                return Err(EngineError::MalformedLayoutRow { row, len });
            }
            for (col, symbol) in line.chars().enumerate() {
                cells[row][col] =
                    Tile::from_symbol(symbol).ok_or(EngineError::UnknownSymbol { row, symbol })?;
            }
        }
        Ok(Grid { cells })
    }

    /// Tile under a half-tile position. Callers validate the direction of
    /// travel first, so out-of-range coordinates are a defect.
    pub fn tile_at(&self, pos: Pos) -> Result<Tile, EngineError> {
        if !is_valid_row(pos.row) || !is_valid_col(pos.col) {
            return Err(EngineError::CoordinateOutOfRange {
                col: pos.col,
                row: pos.row,
            });
        }
        let (col, row) = pos.grid_cell();
        Ok(self.cells[row][col])
    }

    pub fn set(&mut self, pos: Pos, tile: Tile) -> Result<(), EngineError> {
        self.tile_at(pos)?;
        let (col, row) = pos.grid_cell();
        self.cells[row][col] = tile;
        Ok(())
    }

    pub fn clear(&mut self, pos: Pos) -> Result<(), EngineError> {
        self.set(pos, Tile::Empty)
    }

    /// Grid-space access for drawing the whole maze.
    pub fn cell(&self, col: usize, row: usize) -> Tile {
        self.cells[row][col]
    }

    pub fn count_items(&self) -> u32 {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|tile| tile.is_scorable())
            .count() as u32
    }

    /// Whether `entity` may head off in `dir` from its current position.
    ///
    /// The door counts as open only for a ghost that is still inside the pen.
    pub fn can_move(&self, entity: &Entity, dir: Dir) -> Result<bool, EngineError> {
        let Some(dest) = entity.pos.offset(dir, 2) else {
            return Ok(false);
        };
        if !is_valid_col(dest.col) || !is_valid_row(dest.row) {
            return Ok(false);
        }
        let tile = self.tile_at(dest)?;
        Ok(tile.is_erasable() || (tile == Tile::Door && entity.is_ghost() && in_pen(entity.pos)))
    }
}
