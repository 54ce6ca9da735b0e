//! A terminal maze-chase engine: one seeker, four hunters with distinct
//! targeting strategies, scatter/chase/frightened scheduling, all advanced one
//! clock tick at a time.

pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod frontend;
pub mod ghost;
pub mod level;
pub mod mode;
pub mod player;
pub mod rng;
pub mod terminal;

pub use engine::{Flow, Session, Simulation, SimulationState};
pub use error::EngineError;
pub use frontend::{Command, Frontend, Glyph, Headless, Status};
