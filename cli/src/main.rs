use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use sapador_core::{
    Agent, AgentConfig, Board, BoardConfig, BoardGenerator as _, BoardState, CellState,
    ObservationLog, OverlayGrid, Prediction, SafeStartGenerator,
};
use serde::Serialize;

/// Watch the inference agent clear a randomly generated minefield.
///
/// The agent never guesses: it reveals and flags only what it can prove from
/// the numbers the board has shown so far, and stops when nothing more is
/// certain.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Board width in cells
    #[arg(long, default_value_t = 16)]
    width: u8,

    /// Board height in cells
    #[arg(long, default_value_t = 16)]
    height: u8,

    /// Probability that any given cell is a mine
    #[arg(long, default_value_t = 0.15)]
    density: f64,

    /// Board generation seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Base thinking delay in milliseconds between inference steps
    #[arg(long, default_value_t = 150)]
    think_ms: u64,

    /// Print the full board (mines included) before playing
    #[arg(long)]
    show_mines: bool,

    /// Dump the final board and overlay state as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Serialize)]
struct FinalState<'a> {
    state: BoardState,
    board: &'a Board,
    overlays: &'a OverlayGrid,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .init();

    let config = BoardConfig::new((cli.width, cli.height), cli.density);
    let start = (config.size.0 / 2, config.size.1 / 2);
    let mut board = SafeStartGenerator::new(cli.seed, start).generate(config);

    if cli.show_mines {
        println!("{}", board.render_ascii());
    }

    let mut agent = Agent::with_config(
        board.size(),
        AgentConfig {
            thinking_time: Duration::from_millis(cli.think_ms),
        },
    );
    let mut observations = ObservationLog::new();

    board.reveal_empty_patch(start);

    let mut round = 0u32;
    loop {
        round += 1;
        let batch = observations.drain_new(&board);
        log::info!("Round {}: reporting {} newly revealed cells", round, batch.len());

        for update in agent.ponder(&batch) {
            let update = update?;
            log::debug!("{:?}", update.event);
            thread::sleep(update.pause);
        }

        let progressed = act_on_certainty(&mut board, &agent)?;

        println!("{}", render_view(&board, &agent));

        if board.state().is_finished() {
            break;
        }
        if !progressed {
            log::info!("No certain move left, stopping rather than guessing");
            break;
        }
    }

    report(&board, &agent, cli.json)?;
    Ok(())
}

/// Reveals every cell the agent proved safe and flags every proven mine.
/// Returns whether anything changed on the board.
fn act_on_certainty(board: &mut Board, agent: &Agent) -> Result<bool> {
    let (x_end, y_end) = board.size();
    let mut progressed = false;

    for x in 0..x_end {
        for y in 0..y_end {
            if board.state().is_finished() {
                return Ok(progressed);
            }

            let coords = (x, y);
            let cell = board.cell_at(coords);
            match agent.overlays().prediction(coords) {
                Prediction::Safe if !cell.state.is_revealed() => {
                    board.reveal(coords)?;
                    progressed = true;
                }
                Prediction::Mine if cell.state == CellState::Hidden => {
                    board.toggle_flag(coords)?;
                    progressed = true;
                }
                _ => {}
            }
        }
    }

    Ok(progressed)
}

/// Player-eye view of the board with the agent's overlay mixed in: digits for
/// revealed cells, `F` for flags, `s`/`M` for displayed predictions, `.` for
/// anything still unknown.
fn render_view(board: &Board, agent: &Agent) -> String {
    let (x_end, y_end) = board.size();
    let mut out = String::new();

    for y in 0..y_end {
        for x in 0..x_end {
            let cell = board.cell_at((x, y));
            let overlay = agent.overlays().get((x, y));
            let glyph = match cell.state {
                CellState::Revealed => char::from(b'0' + cell.adjacent_mines),
                CellState::Flagged => 'F',
                CellState::Hidden => match overlay.prediction {
                    Prediction::Safe if overlay.show_prediction => 's',
                    Prediction::Mine if overlay.show_prediction => 'M',
                    _ => '.',
                },
            };
            out.push(glyph);
            out.push(' ');
        }
        out.push('\n');
    }

    out
}

fn report(board: &Board, agent: &Agent, json: bool) -> Result<()> {
    if json {
        let dump = FinalState {
            state: board.state(),
            board,
            overlays: agent.overlays(),
        };
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    match board.state() {
        BoardState::Won => println!("Cleared: all mines flagged, everything else revealed."),
        BoardState::Lost => println!("Boom. A proven-safe cell was a mine; the reported numbers were inconsistent."),
        state => println!("Stopped in state {:?}: no certain moves remain.", state),
    }
    Ok(())
}
