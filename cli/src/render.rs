//! Plain-text renderer for interactive play.

use std::io::{self, Write};

use snake_2048_core::{Actuator, Board, Metadata, SwipeOutcome};

const CONTROLS: &str =
    "Controls: WASD / Arrows / hjkl | R restart | C keep playing | T solver | +/- speed | Q quit";

/// Redraws the whole screen on every update.
#[derive(Debug, Default)]
pub struct TerminalActuator {
    message: Option<&'static str>,
}

impl TerminalActuator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Actuator for TerminalActuator {
    fn actuate(&mut self, board: &Board, last: Option<&SwipeOutcome>, metadata: &Metadata) {
        if metadata.over {
            self.message = Some("*** GAME OVER ***  Press R to restart or Q to quit");
        } else if metadata.won && metadata.terminated {
            self.message = Some("*** YOU WIN! ***  Press C to keep playing or R to restart");
        }

        let mut out = String::new();
        out.push_str("\x1b[2J\x1b[H"); // Clear screen
        out.push_str("=== 2048 ===\n");
        out.push_str(CONTROLS);
        out.push_str("\n\n");
        out.push_str(&format!(
            "Score: {}  Best: {}\n",
            metadata.score, metadata.best_score
        ));
        out.push_str(&board.to_string());

        if let Some(outcome) = last.filter(|o| o.score_delta > 0) {
            out.push_str(&format!("  +{} points!\n", outcome.score_delta));
        }
        if metadata.solver_enabled {
            out.push_str(&format!("  Solver ON ({:.2} moves/s)\n", metadata.solver_rate));
        }
        if let Some(message) = self.message {
            out.push_str(&format!("\n  {}\n", message));
        }

        let mut stdout = io::stdout();
        let _ = stdout.write_all(out.as_bytes());
        let _ = stdout.flush();
    }

    fn continue_game(&mut self) {
        self.message = None;
    }
}
