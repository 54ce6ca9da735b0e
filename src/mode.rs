use tracing::debug;

use crate::error::EngineError;

/// Reference clock period. The schedule below is expressed against it.
pub const CLKPERIOD_MS: u32 = 170;
/// Ticks pacman stays supercharged after a power pellet.
pub const FRIGHT_TICKS: u32 = 121;
/// Index of the never-ending chase entry.
pub const FINAL_SEQNO: u8 = 7;

const FOREVER: i32 = -1;

// Seconds per phase; columns are level 1, levels 2-4, levels 5+.
// Even rows scatter, odd rows chase.
const SCHEDULE: [[i32; 3]; 8] = [
    [7, 7, 5],
    [20, 20, 20],
    [7, 7, 5],
    [20, 20, 20],
    [5, 5, 5],
    [20, 1033, 1037],
    [5, 1, 1],
    [FOREVER, FOREVER, FOREVER],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Scatter,
    Chase,
    Frightened,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Ticks(u32),
    Forever,
}

/// Length of phase `seqno` at `level`, in clock ticks.
pub fn span(level: u32, seqno: u8) -> Result<Span, EngineError> {
    let column = match level {
        0 => return Err(EngineError::LevelZero),
        1 => 0,
        2..=4 => 1,
        _ => 2,
    };
    let row = usize::from(seqno.min(FINAL_SEQNO));
    match SCHEDULE[row][column] {
        FOREVER => Ok(Span::Forever),
        secs => Ok(Span::Ticks(secs as u32 * 1000 / CLKPERIOD_MS)),
    }
}

/// Side effects the engine has to carry out on behalf of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    /// Scatter and chase swapped: every ghost reverses and the bell rings.
    Reversal,
    /// One frightened tick went by.
    FrightTick,
    /// Frightened mode ran out; the previous mode is back.
    FrightOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeScheduler {
    current: Mode,
    previous: Option<Mode>,
    seqno: u8,
    timer: u32,
    timer_enabled: bool,
    fright_timer: u32,
}

impl Default for ModeScheduler {
    fn default() -> Self {
        Self {
            current: Mode::Scatter,
            previous: None,
            seqno: 0,
            timer: 0,
            timer_enabled: true,
            fright_timer: 0,
        }
    }
}

impl ModeScheduler {
    pub fn current(&self) -> Mode {
        self.current
    }

    pub fn previous(&self) -> Option<Mode> {
        self.previous
    }

    pub fn seqno(&self) -> u8 {
        self.seqno
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    pub fn timer_enabled(&self) -> bool {
        self.timer_enabled
    }

    pub fn fright_remaining(&self) -> u32 {
        self.fright_timer
    }

    pub fn level_entry(&mut self, level: u32) -> Result<(), EngineError> {
        self.fright_timer = 0;
        self.seqno = 0;
        self.current = self.load_phase(level)?;
        self.previous = None;
        Ok(())
    }

    /// Advances the scheduler by one tick.
    pub fn update(&mut self, level: u32) -> Result<Option<ModeEvent>, EngineError> {
        if self.current == Mode::Frightened {
            if self.fright_timer > 0 {
                self.fright_timer -= 1;
                return Ok(Some(ModeEvent::FrightTick));
            }
            self.leave_fright();
            return Ok(Some(ModeEvent::FrightOver));
        }

        if !self.timer_enabled {
            return Ok(None);
        }
        if self.timer > 0 {
            self.timer -= 1;
            return Ok(None);
        }
        self.seqno = if self.seqno < 6 { self.seqno + 1 } else { FINAL_SEQNO };
        let mode = self.load_phase(level)?;
        Ok(self.switch_to(mode))
    }

    /// Power pellet consumed. Returns false when only the timer was refreshed.
    pub fn enter_fright(&mut self) -> bool {
        self.fright_timer = FRIGHT_TICKS;
        if self.current == Mode::Frightened {
            return false;
        }
        self.previous = Some(self.current);
        self.current = Mode::Frightened;
        self.timer_enabled = false;
        debug!(previous = ?self.previous, "ghosts frightened");
        true
    }

    /// Drops the remaining fright time; the mode itself ends on the next update.
    pub fn cancel_fright(&mut self) {
        self.fright_timer = 0;
    }

    fn leave_fright(&mut self) {
        let mode = self.previous.unwrap_or(Mode::Scatter);
        // Coming back from frightened never reverses the ghosts.
        let _ = self.switch_to(mode);
        self.timer_enabled = true;
        debug!(mode = ?self.current, timer = self.timer, "fright over");
    }

    fn load_phase(&mut self, level: u32) -> Result<Mode, EngineError> {
        self.timer_enabled = true;
        match span(level, self.seqno)? {
            Span::Ticks(ticks) => {
                self.timer = ticks;
                Ok(if self.seqno & 1 == 1 {
                    Mode::Chase
                } else {
                    Mode::Scatter
                })
            }
            Span::Forever => Ok(Mode::Chase),
        }
    }

    fn switch_to(&mut self, mode: Mode) -> Option<ModeEvent> {
        if mode == self.current {
            return None;
        }
        let event = if self.current != Mode::Frightened {
            Some(ModeEvent::Reversal)
        } else {
            None
        };
        if self.current != Mode::Frightened {
            self.previous = Some(self.current);
        }
        debug!(from = ?self.current, to = ?mode, seqno = self.seqno, "mode switch");
        self.current = mode;
        event
    }
}
