use std::io::{self, BufRead, Write};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use mcts_tic_tac_toe::{Board, Game, Mcts, MctsConfig, Perspective, Player};

/// Tic-Tac-Toe driven by Monte Carlo Tree Search.
#[derive(Parser)]
#[command(name = "mcts-ttt")]
#[command(about = "Play, watch or time Monte Carlo Tree Search at Tic-Tac-Toe")]
struct Cli {
    /// UCT exploration constant.
    #[arg(long, global = true, default_value = "1.41")]
    exploration: f64,

    /// How rollout results are credited during backpropagation.
    #[arg(long, global = true, value_enum, default_value = "mover")]
    perspective: PerspectiveArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PerspectiveArg {
    /// Every node is scored for X.
    Absolute,
    /// Every node is scored for the player who moved into it.
    Mover,
}

impl From<PerspectiveArg> for Perspective {
    fn from(arg: PerspectiveArg) -> Self {
        match arg {
            PerspectiveArg::Absolute => Perspective::Absolute,
            PerspectiveArg::Mover => Perspective::Mover,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    X,
    O,
}

impl From<Side> for Player {
    fn from(side: Side) -> Self {
        match side {
            Side::X => Player::X,
            Side::O => Player::O,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the engine on stdin.
    Play {
        /// MCTS iterations per engine move.
        #[arg(short, long, default_value = "1000")]
        iterations: usize,

        /// Side the human plays. X moves first.
        #[arg(long, value_enum, default_value = "x")]
        human: Side,

        /// Random seed; drawn from the OS when omitted.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Let the engine play both sides.
    Selfplay {
        /// Number of games to play.
        #[arg(short, long, default_value = "1")]
        games: usize,

        /// MCTS iterations per move.
        #[arg(short, long, default_value = "1000")]
        iterations: usize,

        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Time one search per iteration count.
    Bench {
        /// Comma-separated iteration counts.
        #[arg(short, long, value_delimiter = ',', default_value = "100,500,1000,5000")]
        iterations: Vec<usize>,

        /// Starting position, e.g. "XX. OO. ...".
        #[arg(long, default_value = ".........")]
        board: Board,

        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Show the engine's statistics for a single position.
    Analyze {
        /// Position to analyze, e.g. "XX. OO. ...".
        #[arg(long)]
        board: Board,

        #[arg(short, long, default_value = "500")]
        iterations: usize,

        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = MctsConfig::default()
        .with_exploration_constant(cli.exploration)
        .with_perspective(cli.perspective.into());

    match cli.command {
        Commands::Play {
            iterations,
            human,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            let config = MctsConfig {
                iterations,
                ..config
            };
            play(config, human.into(), &mut rng)
        }
        Commands::Selfplay {
            games,
            iterations,
            seed,
        } => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            selfplay(MctsConfig { iterations, ..config }, games, &mut rng)
        }
        Commands::Bench {
            iterations,
            board,
            seed,
        } => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            bench(config, &iterations, &board, &mut rng)
        }
        Commands::Analyze {
            board,
            iterations,
            seed,
        } => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            analyze(MctsConfig { iterations, ..config }, &board, &mut rng)
        }
    }
}

fn outcome_message(board: &Board) -> &'static str {
    match board.winner() {
        Some(Player::X) => "X wins!",
        Some(Player::O) => "O wins!",
        None => "It's a draw!",
    }
}

fn play(config: MctsConfig, human: Player, rng: &mut ChaCha8Rng) -> Result<()> {
    let mcts = Mcts::new(config);
    let mut board = Board::new();
    let mut lines = io::stdin().lock().lines();

    println!("You play {}, the engine plays {}.", human, human.opponent());
    while !board.is_terminal() {
        println!("{}", board);

        if board.current_player() == human {
            print!("Enter your move (0-8): ");
            io::stdout().flush()?;

            let line = match lines.next() {
                Some(line) => line.context("failed to read a move")?,
                None => bail!("input closed before the game ended"),
            };
            let Ok(position) = line.trim().parse::<usize>() else {
                println!("{:?} is not a cell index", line.trim());
                continue;
            };
            match board.apply_move(position) {
                Ok(next) => board = next,
                Err(err) => println!("{}", err),
            }
        } else {
            let position = mcts
                .search(&board, rng)
                .context("engine failed to pick a move")?;
            info!("engine plays {}", position);
            board = board.apply_move(position)?;
        }
    }

    println!("{}", board);
    println!("{}", outcome_message(&board));
    Ok(())
}

fn selfplay(config: MctsConfig, games: usize, rng: &mut ChaCha8Rng) -> Result<()> {
    let mcts = Mcts::new(config);
    let (mut x_wins, mut o_wins, mut draws) = (0, 0, 0);

    for game in 1..=games {
        println!("Game {}", game);
        let mut board = Board::new();
        while !board.is_terminal() {
            println!("{}", board);
            let position = mcts.search(&board, rng)?;
            board = board.apply_move(position)?;
        }
        println!("{}", board);
        println!("{}", outcome_message(&board));

        match board.winner() {
            Some(Player::X) => x_wins += 1,
            Some(Player::O) => o_wins += 1,
            None => draws += 1,
        }
    }

    println!(
        "{} games: X won {}, O won {}, {} drawn",
        games, x_wins, o_wins, draws
    );
    Ok(())
}

fn bench(
    config: MctsConfig,
    iterations: &[usize],
    board: &Board,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    for &iterations in iterations {
        println!("Running MCTS with {} iterations...", iterations);
        let mcts = Mcts::new(MctsConfig {
            iterations,
            ..config.clone()
        });

        let start = Instant::now();
        let position = mcts.search(board, rng)?;
        let elapsed = start.elapsed();

        println!(
            "Time taken for {} iterations: {:.4} seconds",
            iterations,
            elapsed.as_secs_f64()
        );
        println!("{}", board.apply_move(position)?);
        println!("{}", "-".repeat(30));
    }
    Ok(())
}

fn analyze(config: MctsConfig, board: &Board, rng: &mut ChaCha8Rng) -> Result<()> {
    println!("{}", board);
    if board.is_terminal() {
        println!("Is terminal: true");
        println!("Result: {:?}", board.result());
        return Ok(());
    }

    let tree = Mcts::new(config).run(board, rng)?;
    let position = tree.best_move()?;
    println!("{} to move, {} nodes searched", board.current_player(), tree.len());
    for &child in tree.root().children() {
        let node = tree.get(child);
        if let Some(mv) = node.last_move() {
            println!(
                "  move {}: visits {:>5}, value {:+.3}",
                mv,
                node.visit_count(),
                node.mean_value()
            );
        }
    }
    println!("Selected move: {}", position);
    println!("{}", board.apply_move(position)?);
    Ok(())
}
