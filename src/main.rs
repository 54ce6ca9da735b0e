use std::fs::File;
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pacman_vt::config::Config;
use pacman_vt::terminal::{self, Screen, Terminal};
use pacman_vt::{EngineError, Flow, Simulation};

/// How a session ended without a fault.
enum Ending {
    Quit(u32),
    Interrupted,
    GameOver(u32),
}

fn main() -> Result<()> {
    let config = Config::parse();
    if let Some(path) = &config.log_file {
        init_tracing(path)?;
    }
    terminal::check_size()?;

    let mut screen = Screen::enter(io::stdout()).context("preparing terminal")?;
    let result = run(screen.out(), &config);
    drop(screen);

    match result? {
        Ending::Quit(score) => println!("Quit with score {score}."),
        Ending::Interrupted => println!("Interrupted!"),
        Ending::GameOver(score) => println!("Game over! Final score {score}."),
    }
    Ok(())
}

fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, config: &Config) -> Result<Ending> {
    let mut term = Terminal::new(stdout, config.silent);
    term.prepare().context("drawing status panel")?;

    let mut sim = Simulation::new()?;
    sim.announce(&mut term);
    let tick = config.tick();
    tracing::info!(tick_ms = config.tick_ms, silent = config.silent, "session start");

    loop {
        let tick_start = Instant::now();
        let flow = sim.step(&mut term);
        term.flush().context("writing to terminal")?;
        match flow {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => return Ok(Ending::Quit(sim.state().session.score)),
            Ok(Flow::Interrupted) => return Ok(Ending::Interrupted),
            Err(EngineError::GameOver { score }) => return Ok(Ending::GameOver(score)),
            Err(err) => return Err(err).context("simulation halted"),
        }

        let elapsed = tick_start.elapsed();
        if elapsed < tick {
            thread::sleep(tick - elapsed);
        }
    }
}
