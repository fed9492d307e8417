//! Property-based tests for the search tree and the game model.

use mcts_tic_tac_toe::{Board, Error, Game, Mcts, MctsConfig, Perspective};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// =============================================================================
// Strategies
// =============================================================================

fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

fn arb_iterations() -> impl Strategy<Value = usize> {
    1usize..200
}

fn arb_perspective() -> impl Strategy<Value = Perspective> {
    prop_oneof![Just(Perspective::Absolute), Just(Perspective::Mover)]
}

/// Boards reached by playing random legal moves from the empty board,
/// stopping early if the game ends.
fn arb_board() -> impl Strategy<Value = Board> {
    (0usize..=9, arb_seed()).prop_map(|(num_moves, seed)| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut board = Board::new();
        for _ in 0..num_moves {
            if board.is_terminal() {
                break;
            }
            let moves = board.legal_moves();
            let mv = moves[rng.gen_range(0..moves.len())];
            board = board.apply_move(mv).unwrap();
        }
        board
    })
}

fn arb_running_board() -> impl Strategy<Value = Board> {
    arb_board().prop_filter("game already decided", |board| !board.is_terminal())
}

fn mcts(iterations: usize, perspective: Perspective) -> Mcts {
    Mcts::new(MctsConfig::with_iterations(iterations).with_perspective(perspective))
}

// =============================================================================
// Game model
// =============================================================================

proptest! {
    #[test]
    fn prop_terminal_iff_result(board in arb_board()) {
        prop_assert_eq!(board.is_terminal(), board.result().is_some());
    }

    #[test]
    fn prop_legal_moves_are_empty_cells(board in arb_board()) {
        let moves = board.legal_moves();
        prop_assert!(moves.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(moves.is_empty(), board.is_full());
        for position in 0..Board::CELLS {
            let applied = board.apply_move(position);
            if moves.contains(&position) {
                prop_assert!(applied.is_ok());
            } else {
                prop_assert_eq!(applied, Err(Error::InvalidMove { position }));
            }
        }
    }

    #[test]
    fn prop_board_parses_its_own_rendering(board in arb_board()) {
        let parsed: Board = board.to_string().parse().unwrap();
        prop_assert_eq!(parsed, board);
    }
}

// =============================================================================
// Search
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_search_returns_legal_move(
        seed in arb_seed(),
        iterations in arb_iterations(),
        perspective in arb_perspective(),
        board in arb_running_board()
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mv = mcts(iterations, perspective).search(&board, &mut rng).unwrap();
        prop_assert!(board.legal_moves().contains(&mv));
    }

    #[test]
    fn prop_root_visits_equal_iterations(
        seed in arb_seed(),
        iterations in arb_iterations(),
        board in arb_running_board()
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let tree = mcts(iterations, Perspective::Absolute).run(&board, &mut rng).unwrap();
        prop_assert_eq!(tree.root().visit_count(), iterations);
    }

    #[test]
    fn prop_tree_invariants(
        seed in arb_seed(),
        iterations in arb_iterations(),
        perspective in arb_perspective(),
        board in arb_running_board()
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let tree = mcts(iterations, perspective).run(&board, &mut rng).unwrap();

        for (id, node) in tree.iter() {
            let children: Vec<_> = node.children().iter().map(|&child| tree.get(child)).collect();

            let child_visits: usize = children.iter().map(|child| child.visit_count()).sum();
            prop_assert!(node.visit_count() >= child_visits);

            for (i, child) in children.iter().enumerate() {
                prop_assert_eq!(child.parent(), Some(id));
                for other in &children[i + 1..] {
                    prop_assert_ne!(child.state(), other.state());
                }
            }

            if node.state().is_terminal() {
                prop_assert!(node.children().is_empty());
            }
        }
    }

    #[test]
    fn prop_search_is_deterministic(
        seed in arb_seed(),
        iterations in arb_iterations(),
        perspective in arb_perspective(),
        board in arb_running_board()
    ) {
        let engine = mcts(iterations, perspective);
        let first = engine.search(&board, &mut ChaCha8Rng::seed_from_u64(seed));
        let second = engine.search(&board, &mut ChaCha8Rng::seed_from_u64(seed));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_decided_board_has_no_move(
        seed in arb_seed(),
        board in arb_board().prop_filter("game still running", |board| board.is_terminal())
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        prop_assert_eq!(
            mcts(100, Perspective::Absolute).search(&board, &mut rng),
            Err(Error::NoLegalMove)
        );
    }
}
