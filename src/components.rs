use crate::level::Tile;

pub const NGHOST: usize = 4;
pub const NENTITY: usize = 1 + NGHOST;
/// Pacman always sits at index 0 of the entity array.
pub const PACMAN: usize = 0;
/// Inky steers off Blinky's position.
pub const BLINKY: usize = 1;

/// Headings in the order used for every tie-break. `opposite` relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Left,
    Down,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Left, Dir::Down, Dir::Right];

    pub fn index(self) -> u8 {
        match self {
            Dir::Up => 0,
            Dir::Left => 1,
            Dir::Down => 2,
            Dir::Right => 3,
        }
    }

    pub fn from_index(idx: u8) -> Dir {
        Dir::ALL[usize::from(idx & 3)]
    }

    pub fn opposite(self) -> Dir {
        Dir::from_index(self.index() + 2)
    }

    pub fn delta(self) -> (i16, i16) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// A set of headings, one bit per `Dir::index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirSet(u8);

impl DirSet {
    pub fn all() -> Self {
        DirSet(0x0F)
    }

    pub fn empty() -> Self {
        DirSet(0)
    }

    pub fn contains(self, dir: Dir) -> bool {
        self.0 & (1 << dir.index()) != 0
    }

    pub fn insert(&mut self, dir: Dir) {
        self.0 |= 1 << dir.index();
    }

    pub fn remove(&mut self, dir: Dir) {
        self.0 &= !(1 << dir.index());
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// The sole member, if there is exactly one.
    pub fn only(self) -> Option<Dir> {
        if self.len() == 1 {
            self.iter().next()
        } else {
            None
        }
    }

    /// Members in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Dir> {
        Dir::ALL.into_iter().filter(move |dir| self.contains(*dir))
    }
}

impl FromIterator<Dir> for DirSet {
    fn from_iter<I: IntoIterator<Item = Dir>>(iter: I) -> Self {
        let mut set = DirSet::empty();
        for dir in iter {
            set.insert(dir);
        }
        set
    }
}

/// Half-tile coordinates: one maze cell spans two units on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub col: u8,
    pub row: u8,
}

impl Pos {
    pub const fn new(col: u8, row: u8) -> Self {
        Pos { col, row }
    }

    pub fn is_aligned(self) -> bool {
        self.col & 1 == 0 && self.row & 1 == 0
    }

    pub fn grid_cell(self) -> (usize, usize) {
        (usize::from(self.col >> 1), usize::from(self.row >> 1))
    }

    pub fn offset(self, dir: Dir, by: u8) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let col = i16::from(self.col) + dx * i16::from(by);
        let row = i16::from(self.row) + dy * i16::from(by);
        Some(Pos {
            col: u8::try_from(col).ok()?,
            row: u8::try_from(row).ok()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhostKind {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostKind {
    pub const ALL: [GhostKind; NGHOST] = [
        GhostKind::Blinky,
        GhostKind::Pinky,
        GhostKind::Inky,
        GhostKind::Clyde,
    ];

    fn start(self) -> Pos {
        match self {
            GhostKind::Blinky => Pos::new(32, 14), // north of the door
            GhostKind::Pinky => Pos::new(32, 20),
            GhostKind::Inky => Pos::new(30, 20),
            GhostKind::Clyde => Pos::new(34, 20),
        }
    }

    fn start_direction(self) -> Dir {
        match self {
            GhostKind::Blinky => Dir::Left,
            GhostKind::Pinky => Dir::Up,
            GhostKind::Inky => Dir::Down,
            GhostKind::Clyde => Dir::Left,
        }
    }

    fn home(self) -> Pos {
        match self {
            GhostKind::Blinky => Pos::new(60, 4),
            GhostKind::Pinky => Pos::new(2, 4),
            GhostKind::Inky => Pos::new(62, 40),
            GhostKind::Clyde => Pos::new(2, 40),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    Pacman,
    Ghost(GhostKind),
}

/// A tile a ghost sprite is covering without consuming it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interference {
    pub tile: Tile,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub persona: Persona,
    pub pos: Pos,
    /// `None` means blocked, which only ever happens to pacman.
    pub direction: Option<Dir>,
    pub previous: Option<Dir>,
    pub intended: Option<Dir>,
    pub reverse_requested: bool,
    pub respawn: u8,
    /// Ghost kill multiplier, pacman only. Wraps after 128.
    pub reward: u8,
    pub gobbling: u8,
    pub inited: bool,
    pub interference: Option<Interference>,
    pub home: Pos,
    pub start: Pos,
    pub start_direction: Dir,
}

impl Entity {
    pub fn pacman() -> Self {
        Self::new(Persona::Pacman, Pos::new(32, 34), Dir::Right, Pos::new(0, 0))
    }

    pub fn ghost(kind: GhostKind) -> Self {
        Self::new(
            Persona::Ghost(kind),
            kind.start(),
            kind.start_direction(),
            kind.home(),
        )
    }

    fn new(persona: Persona, start: Pos, start_direction: Dir, home: Pos) -> Self {
        Entity {
            persona,
            pos: start,
            direction: Some(start_direction),
            previous: None,
            intended: None,
            reverse_requested: false,
            respawn: 0,
            reward: 0,
            gobbling: 0,
            inited: false,
            interference: None,
            home,
            start,
            start_direction,
        }
    }

    pub fn is_ghost(&self) -> bool {
        matches!(self.persona, Persona::Ghost(_))
    }

    pub fn ghost_kind(&self) -> Option<GhostKind> {
        match self.persona {
            Persona::Ghost(kind) => Some(kind),
            Persona::Pacman => None,
        }
    }

    /// Current heading, falling back to the last one while blocked.
    pub fn heading(&self) -> Option<Dir> {
        self.direction.or(self.previous)
    }

    pub fn reset_pose(&mut self) {
        self.direction = Some(self.start_direction);
        self.pos = self.start;
    }
}

/// The fixed cast, indexed by identity.
pub fn cast() -> [Entity; NENTITY] {
    [
        Entity::pacman(),
        Entity::ghost(GhostKind::Blinky),
        Entity::ghost(GhostKind::Pinky),
        Entity::ghost(GhostKind::Inky),
        Entity::ghost(GhostKind::Clyde),
    ]
}
