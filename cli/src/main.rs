//! # Snake 2048 CLI
//!
//! Command-line interface for playing 2048 interactively, watching the snake
//! solver play, or running headless simulations with configurable policies.

mod render;
mod storage;

use std::collections::HashMap;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use snake_2048_core::{
    Board, Command, Corner, Direction, GameState, MemoryStorage, NullActuator, RateChange, Session,
    SessionConfig, Solver, SolverConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::render::TerminalActuator;
use crate::storage::FileStorage;

#[derive(Parser, Debug)]
#[command(name = "snake-2048")]
#[command(author, version, about = "Play 2048 in the terminal or run solver simulations")]
struct Args {
    /// Run in interactive mode even when --episodes is given
    #[arg(short, long)]
    interactive: bool,

    /// Number of episodes to run in headless mode
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Random seed for deterministic runs
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Maximum steps per episode (0 = unlimited)
    #[arg(short, long, default_value = "10000")]
    max_steps: u32,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "snake")]
    policy: Policy,

    /// Show board after each move in headless mode
    #[arg(long)]
    verbose: bool,

    /// Board side length
    #[arg(long, default_value = "4")]
    size: usize,

    /// Corner the solver anchors its largest tile in
    #[arg(long, value_enum, default_value = "bottom-left")]
    corner: CornerArg,

    /// Direction the solver grows tiles away from the corner
    #[arg(long, value_enum, default_value = "up")]
    grow: DirectionArg,

    /// Initial solver speed in moves per second
    #[arg(long, default_value = "1.0")]
    rate: f64,

    /// Start interactive mode with the solver playing
    #[arg(long)]
    autoplay: bool,

    /// Save and resume interactive games from this JSON file
    #[arg(long)]
    state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Random valid moves
    Random,
    /// Cycle through actions: Left, Down, Right, Up
    Cycle,
    /// Corner-anchored snake solver
    Snake,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CornerArg {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl From<CornerArg> for Corner {
    fn from(arg: CornerArg) -> Self {
        match arg {
            CornerArg::TopLeft => Corner::TopLeft,
            CornerArg::TopRight => Corner::TopRight,
            CornerArg::BottomRight => Corner::BottomRight,
            CornerArg::BottomLeft => Corner::BottomLeft,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionArg {
    Up,
    Right,
    Down,
    Left,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Up => Direction::Up,
            DirectionArg::Right => Direction::Right,
            DirectionArg::Down => Direction::Down,
            DirectionArg::Left => Direction::Left,
        }
    }
}

impl Args {
    /// Episode count for a headless run, or `None` to play interactively.
    fn headless_episodes(&self) -> Option<u32> {
        if self.interactive {
            None
        } else {
            self.episodes
        }
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            size: self.size,
            ..SessionConfig::default()
        }
    }

    fn solver(&self) -> anyhow::Result<Solver> {
        Solver::new(SolverConfig {
            corner: self.corner.into(),
            grow: self.grow.into(),
            rate: self.rate,
            ..SolverConfig::default()
        })
        .context("invalid solver settings")
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Some(episodes) = args.headless_episodes() {
        run_headless(&args, episodes)
    } else {
        run_interactive(&args)
    }
}

// =============================================================================
// Interactive mode
// =============================================================================

/// Run interactive mode where the user plays with the keyboard and can hand
/// control to the solver.
fn run_interactive(args: &Args) -> anyhow::Result<()> {
    let storage = match &args.state_file {
        Some(path) => FileStorage::open(path)?,
        None => FileStorage::in_memory(),
    };

    // Set terminal to raw mode for single-key input
    let _raw = RawMode::enable();

    let mut session = Session::new(
        args.session_config(),
        args.solver()?,
        storage,
        TerminalActuator::new(),
        SmallRng::seed_from_u64(args.seed),
    )?;
    if args.autoplay {
        session.handle(Command::ToggleSolver);
    }
    info!(seed = args.seed, size = args.size, "interactive session started");

    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];
    let mut last_tick = Instant::now();

    loop {
        // Wait for a key, or until the solver is due for its next move.
        let timeout = if session.solver_enabled() {
            Some(
                session
                    .solver()
                    .tick_interval()
                    .saturating_sub(last_tick.elapsed()),
            )
        } else {
            None
        };

        if wait_for_input(timeout) {
            let bytes_read = stdin.read(&mut buffer).context("reading keyboard input")?;
            match parse_input(&buffer[..bytes_read]) {
                Input::Command(command) => session.handle(command),
                Input::Quit => break,
                Input::None => {}
            }
        }

        if session.solver_enabled() && last_tick.elapsed() >= session.solver().tick_interval() {
            session.tick();
            last_tick = Instant::now();
        }
    }

    println!("\nGoodbye!");
    Ok(())
}

enum Input {
    Command(Command),
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> Input {
    let command = match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => Command::Move(Direction::Up),
        [27, 91, 66] => Command::Move(Direction::Down),
        [27, 91, 67] => Command::Move(Direction::Right),
        [27, 91, 68] => Command::Move(Direction::Left),

        // WASD and vim keys
        [b'w'] | [b'W'] | [b'k'] => Command::Move(Direction::Up),
        [b's'] | [b'S'] | [b'j'] => Command::Move(Direction::Down),
        [b'a'] | [b'A'] | [b'h'] => Command::Move(Direction::Left),
        [b'd'] | [b'D'] | [b'l'] => Command::Move(Direction::Right),

        // Control keys
        [b'q'] | [b'Q'] | [3] | [27] => return Input::Quit, // q, Q, Ctrl+C, Esc
        [b'r'] | [b'R'] => Command::Restart,
        [b'c'] | [b'C'] => Command::KeepPlaying,
        [b't'] | [b'T'] => Command::ToggleSolver,
        [b'+'] | [b'='] => Command::Rate(RateChange::Increase),
        [b'-'] | [b'_'] => Command::Rate(RateChange::Decrease),

        _ => return Input::None,
    };
    Input::Command(command)
}

// =============================================================================
// Headless mode
// =============================================================================

/// Run headless simulation mode.
fn run_headless(args: &Args, episodes: u32) -> anyhow::Result<()> {
    let mut total_score: u64 = 0;
    let mut max_tile_overall: u32 = 0;
    let mut scores: Vec<u32> = Vec::with_capacity(episodes as usize);
    let mut max_tiles: Vec<u32> = Vec::with_capacity(episodes as usize);

    // Use a separate RNG for action selection
    let mut action_rng = SmallRng::seed_from_u64(args.seed.wrapping_add(1000));

    for episode in 0..episodes {
        let episode_seed = args.seed.wrapping_add(episode as u64);
        let mut session = Session::new(
            args.session_config(),
            args.solver()?,
            MemoryStorage::new(),
            NullActuator,
            SmallRng::seed_from_u64(episode_seed),
        )?;
        if let Policy::Snake = args.policy {
            session.toggle_solver();
        }
        let mut steps = 0;
        let mut action_cycle = 0;

        loop {
            // Headless runs play on past 2048.
            if session.state() == GameState::JustWon {
                session.keep_playing();
            }
            if session.is_terminated() || (args.max_steps != 0 && steps >= args.max_steps) {
                break;
            }

            let outcome = match args.policy {
                Policy::Snake => session.tick(),
                Policy::Random => select_random_action(session.board(), &mut action_rng)
                    .and_then(|action| session.move_tiles(action)),
                Policy::Cycle => select_cycle_action(session.board(), &mut action_cycle)
                    .and_then(|action| session.move_tiles(action)),
            };
            if outcome.is_none() {
                break; // No valid actions
            }
            steps += 1;

            if args.verbose {
                println!("Episode {} Step {}:", episode + 1, steps);
                print!("{}", session.board());
            }
        }

        let score = session.score();
        let max_tile = session.board().max_tile();

        scores.push(score);
        max_tiles.push(max_tile);
        total_score += score as u64;
        max_tile_overall = max_tile_overall.max(max_tile);

        if args.verbose {
            println!(
                "Episode {}: Score={}, MaxTile={}, Steps={}",
                episode + 1,
                score,
                max_tile,
                steps
            );
        }
    }

    if episodes == 0 {
        println!("=== Simulation Results ===");
        println!("episodes=0");
        return Ok(());
    }

    // Compute statistics
    let avg_score = total_score as f64 / episodes as f64;
    scores.sort_unstable();
    let median_score = if episodes % 2 == 0 {
        (scores[(episodes / 2 - 1) as usize] as f64 + scores[(episodes / 2) as usize] as f64) / 2.0
    } else {
        scores[(episodes / 2) as usize] as f64
    };

    // Count tile distribution
    let mut tile_counts: HashMap<u32, u32> = HashMap::new();
    for tile in &max_tiles {
        *tile_counts.entry(*tile).or_insert(0) += 1;
    }

    // Output results in parseable format
    println!("=== Simulation Results ===");
    println!("episodes={}", episodes);
    println!("policy={:?}", args.policy);
    println!("seed={}", args.seed);
    println!("size={}", args.size);
    println!("max_steps={}", args.max_steps);
    println!("avg_score={:.2}", avg_score);
    println!("median_score={:.2}", median_score);
    println!("min_score={}", scores.first().unwrap_or(&0));
    println!("max_score={}", scores.last().unwrap_or(&0));
    println!("max_tile_overall={}", max_tile_overall);

    // Tile distribution
    let mut tile_list: Vec<_> = tile_counts.iter().collect();
    tile_list.sort_by_key(|&(tile, _)| *tile);
    let distribution: Vec<String> = tile_list
        .iter()
        .map(|(tile, count)| format!("{}:{}", tile, count))
        .collect();
    println!("tile_distribution={}", distribution.join(","));
    Ok(())
}

/// Select a random valid action.
fn select_random_action(board: &Board, rng: &mut SmallRng) -> Option<Direction> {
    let valid_actions = board.legal_directions();
    if valid_actions.is_empty() {
        None
    } else {
        Some(valid_actions[rng.gen_range(0..valid_actions.len())])
    }
}

/// Select action in a cycle: Left, Down, Right, Up.
fn select_cycle_action(board: &Board, cycle: &mut usize) -> Option<Direction> {
    let order = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];

    // Try actions in cycle order, starting from current position
    for _ in 0..4 {
        let action = order[*cycle % 4];
        *cycle += 1;
        if board.can_swipe(action) {
            return Some(action);
        }
    }

    None
}

// =============================================================================
// Terminal handling
// =============================================================================

/// Puts the terminal in raw mode and restores it when dropped.
struct RawMode {
    #[cfg(unix)]
    original: Option<libc::termios>,
}

#[cfg(unix)]
impl RawMode {
    fn enable() -> Self {
        use std::os::unix::io::AsRawFd;
        let fd = io::stdin().as_raw_fd();
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut termios) != 0 {
                return RawMode { original: None };
            }
            let original = termios;
            termios.c_lflag &= !(libc::ICANON | libc::ECHO);
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;
            libc::tcsetattr(fd, libc::TCSANOW, &termios);
            RawMode {
                original: Some(original),
            }
        }
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;
        if let Some(original) = &self.original {
            unsafe {
                libc::tcsetattr(io::stdin().as_raw_fd(), libc::TCSANOW, original);
            }
        }
    }
}

#[cfg(not(unix))]
impl RawMode {
    fn enable() -> Self {
        // On non-Unix systems, just continue without raw mode
        // Interactive mode will require Enter after each key
        RawMode {}
    }
}

/// Block until stdin has input or `timeout` passes. `None` waits forever.
#[cfg(unix)]
fn wait_for_input(timeout: Option<Duration>) -> bool {
    use std::os::unix::io::AsRawFd;
    let mut fds = libc::pollfd {
        fd: io::stdin().as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let timeout_ms = timeout.map_or(-1, |t| t.as_millis().min(i32::MAX as u128) as i32);
    unsafe { libc::poll(&mut fds, 1, timeout_ms) > 0 }
}

#[cfg(not(unix))]
fn wait_for_input(_timeout: Option<Duration>) -> bool {
    true
}
