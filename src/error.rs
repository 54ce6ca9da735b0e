use thiserror::Error;

/// Conditions that stop the simulation for good.
///
/// Every variant but [`EngineError::GameOver`] is an invariant violation, i.e. a
/// defect in the engine or its compiled-in data rather than something a player
/// can provoke. Game over is an ordinary end of play that is nonetheless
/// reported through the same channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("coordinates out of bounds: col {col}, row {row}")]
    CoordinateOutOfRange { col: u8, row: u8 },
    #[error("layout row {row} has {len} columns")]
    MalformedLayoutRow { row: usize, len: usize },
    #[error("layout row {row} holds unknown symbol {symbol:?}")]
    UnknownSymbol { row: usize, symbol: char },
    #[error("ghost #{id} is blocked")]
    GhostBlocked { id: usize },
    #[error("pacman has no heading to display")]
    NoHeading,
    #[error("ghost #{id}: no viable direction found")]
    NoViableDirection { id: usize },
    #[error("ghost #{id}: no minimum found while navigating to target")]
    NoMinimum { id: usize },
    #[error("mode table queried for level zero")]
    LevelZero,
    #[error("entity #{id} is not a ghost")]
    NotAGhost { id: usize },
    #[error("game over! final score {score}")]
    GameOver { score: u32 },
}
