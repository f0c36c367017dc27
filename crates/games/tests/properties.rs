//! Property-based tests for the generated game trees.
//!
//! - Ground truth is always ±1 and terminal evaluations reveal it
//! - Optimal moves and forced nodes never flip the value
//! - Non-optimal moves flip at the configured per-side rate
//! - P-game nodes carry the minimax of their children

use pathology_core::{FlipRate, GameTree, Side, StateId};
use pathology_games::{create_heuristic, HeuristicParams, PGame, SyntheticTree, TreeConfig};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// =============================================================================
// Strategies for generating test inputs
// =============================================================================

fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

fn arb_flip_rate() -> impl Strategy<Value = FlipRate> {
    (0.0f64..=1.0, 0.0f64..=1.0)
        .prop_map(|(a, b)| FlipRate::new(a.min(b), a.max(b)).unwrap())
}

fn arb_heuristic() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("perfect"),
        Just("gaussian"),
        Just("uniform"),
        Just("expected-playout"),
    ]
}

fn tree(b: usize, depth: u32, flip_rate: FlipRate, heuristic: &str, seed: u64) -> SyntheticTree {
    let params = HeuristicParams {
        sample_size: 500,
        seed: Some(seed),
        ..Default::default()
    };
    let config = TreeConfig::new(b, depth)
        .with_seed(seed)
        .with_flip_rate(flip_rate);
    SyntheticTree::new(config)
        .unwrap()
        .with_heuristic(create_heuristic(heuristic, &params).unwrap())
}

/// Follow uniformly random moves from the root down to a terminal node.
fn random_walk(game: &mut SyntheticTree, rng: &mut ChaCha8Rng) -> Vec<StateId> {
    let b = game.branching_factor();
    let mut path = vec![StateId::ROOT];
    let mut state = StateId::ROOT;
    while let Some(next) = game.get_new_state(state, rng.gen_range(0..b)).unwrap() {
        path.push(next);
        state = next;
    }
    path
}

// =============================================================================
// Synthetic tree
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every node is ±1, every evaluation lies in [0, 1] and terminal
    /// evaluations equal the ground truth whatever the heuristic.
    #[test]
    fn prop_ground_truth_and_terminal_eval(
        seed in arb_seed(),
        b in 2usize..5,
        depth in 0u32..40,
        flip_rate in arb_flip_rate(),
        heuristic in arb_heuristic(),
    ) {
        let mut game = tree(b, depth, flip_rate, heuristic, seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for _ in 0..4 {
            let path = random_walk(&mut game, &mut rng);
            prop_assert_eq!(path.len(), depth as usize + 1);
            for &state in &path {
                let node = game.node(state).unwrap().clone();
                prop_assert!(node.minimax == 1 || node.minimax == -1);
                let eval = game.get_eval(state).unwrap();
                prop_assert!((0.0..=1.0).contains(&eval), "eval {}", eval);
                if game.is_terminal(state).unwrap() {
                    prop_assert_eq!(eval, (node.minimax as f64 + 1.0) / 2.0);
                }
            }
        }
    }

    /// Optimal moves keep the value, and forced nodes never flip.
    #[test]
    fn prop_value_preserving_moves(
        seed in arb_seed(),
        b in 2usize..5,
        flip_rate in arb_flip_rate(),
    ) {
        let mut game = tree(b, 60, flip_rate, "perfect", seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let path = random_walk(&mut game, &mut rng);

        for &state in &path[..path.len() - 1] {
            let node = game.node(state).unwrap().clone();
            for mv in 0..b {
                let child = game.get_new_state(state, mv).unwrap().unwrap();
                let child_value = game.node(child).unwrap().minimax;
                if mv == node.optimal_move || !node.is_choice_node() {
                    prop_assert_eq!(child_value, node.minimax);
                }
            }
        }
    }

    /// Non-optimal moves at non-root choice nodes flip with the rate of the
    /// side to move.
    #[test]
    fn prop_flip_frequency(seed in arb_seed(), flip_rate in arb_flip_rate()) {
        let mut game = tree(2, 4000, flip_rate, "perfect", seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let path = random_walk(&mut game, &mut rng);

        // (flips, samples) for MAX and MIN.
        let mut counts = [(0u32, 0u32); 2];
        for &state in &path[1..path.len() - 1] {
            let node = game.node(state).unwrap().clone();
            if !node.is_choice_node() {
                continue;
            }
            let mv = 1 - node.optimal_move;
            let child = game.get_new_state(state, mv).unwrap().unwrap();
            let flipped = game.node(child).unwrap().minimax != node.minimax;
            let slot = match node.side {
                Side::Max => &mut counts[0],
                Side::Min => &mut counts[1],
            };
            slot.0 += flipped as u32;
            slot.1 += 1;
        }

        for (side, (flips, samples)) in [Side::Max, Side::Min].into_iter().zip(counts) {
            if samples < 500 {
                continue;
            }
            let observed = flips as f64 / samples as f64;
            let expected = flip_rate.for_side(side);
            prop_assert!(
                (observed - expected).abs() < 0.1,
                "{} observed {} expected {} over {}",
                side,
                observed,
                expected,
                samples
            );
        }
    }

    /// Restoring a snapshot yields a tree that keeps growing identically.
    #[test]
    fn prop_snapshot_continues_identically(
        seed in arb_seed(),
        flip_rate in arb_flip_rate(),
        heuristic in arb_heuristic(),
    ) {
        let mut game = tree(3, 30, flip_rate, heuristic, seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        random_walk(&mut game, &mut rng);

        let mut restored = SyntheticTree::from_snapshot(&game.to_snapshot().unwrap()).unwrap();
        prop_assert_eq!(restored.node_count(), game.node_count());

        let mut rng_a = ChaCha8Rng::seed_from_u64(seed ^ 1);
        let mut rng_b = rng_a.clone();
        let path_a = random_walk(&mut game, &mut rng_a);
        let path_b = random_walk(&mut restored, &mut rng_b);
        prop_assert_eq!(&path_a, &path_b);
        for (&a, &b) in path_a.iter().zip(&path_b) {
            prop_assert_eq!(game.get_eval(a).unwrap(), restored.get_eval(b).unwrap());
            prop_assert_eq!(game.node(a).unwrap().minimax, restored.node(b).unwrap().minimax);
        }
    }
}

// =============================================================================
// P-game
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Internal nodes hold the minimax of their children and every
    /// evaluation is a probability.
    #[test]
    fn prop_pgame_minimax_consistent(
        seed in arb_seed(),
        b in 2usize..4,
        depth in 1u32..7,
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut game = PGame::new(depth, b, &mut rng).unwrap();

        let mut frontier = vec![StateId::ROOT];
        while let Some(state) = frontier.pop() {
            let value = game.minimax(state).unwrap();
            let eval = game.get_eval(state).unwrap();
            prop_assert!((0.0..=1.0).contains(&eval));
            if game.is_terminal(state).unwrap() {
                prop_assert_eq!(eval, (value as f64 + 1.0) / 2.0);
                continue;
            }

            let children: Vec<StateId> = (0..b)
                .map(|mv| game.get_new_state(state, mv).unwrap().unwrap())
                .collect();
            let values = children.iter().map(|&c| game.minimax(c).unwrap());
            let expected = match game.side(state).unwrap() {
                Side::Max => values.max().unwrap(),
                Side::Min => values.min().unwrap(),
            };
            prop_assert_eq!(value, expected);
            frontier.extend(children);
        }
    }
}
