//! Implementation of [Minimax] algorithm with [Negamax] and [Alpha-Beta
//! pruning] extensions.
//!
//! Every node is scored by the static evaluator from the point of view of the
//! player who started the search. Instead of two mirrored maximizing and
//! minimizing branches, a single recursion negates the score and swaps the
//! window on every ply: a maximizing node returns the root's score and a
//! minimizing node returns its negation. The cutoffs are exactly the ones of
//! the two-branch formulation.
//!
//! [Minimax]: https://en.wikipedia.org/wiki/Minimax
//! [Negamax]: https://en.wikipedia.org/wiki/Negamax
//! [Alpha-Beta pruning]: https://en.wikipedia.org/wiki/Alpha%E2%80%93beta_pruning

use crate::chess::core::Move;
use crate::chess::position::Position;
use crate::evaluation::{evaluate_with, Value};
use crate::search::state::State;
use crate::search::Depth;

/// Bound of the search window. Any evaluation, including one with both kings
/// and full material, fits into it and it can be negated without overflow.
pub(super) const INFINITY: Value = 1_000_000;

/// Searches the root position for the player on move and returns the first
/// move with the highest score, or `None` if that player has no legal moves.
///
/// `depth` is the number of plies to look ahead and must not be zero. It
/// bounds the recursion, so the stack can not grow past [`Depth::MAX`]
/// frames.
pub(super) fn best_move(
    state: &mut State,
    position: &Position,
    depth: Depth,
) -> Option<(Move, Value)> {
    debug_assert_ne!(depth, 0);
    debug_assert_eq!(position.side_to_move(), state.root());
    state.visit();

    let child_depth = depth.saturating_sub(1);
    let mut alpha = -INFINITY;
    let mut best: Option<(Move, Value)> = None;
    for next_move in position.generate_moves() {
        let child = position.make_move(next_move.piece(), next_move.to(), false);
        let score = -negamax(state, &child, child_depth, -INFINITY, -alpha, false);
        tracing::trace!(%next_move, score, "root move");
        // Strict comparison keeps the earliest of equally scored moves.
        if best.as_ref().map_or(true, |&(_, best_score)| score > best_score) {
            best = Some((next_move, score));
        }
        alpha = alpha.max(score);
    }
    best
}

/// Returns the score of the node from the point of view of the `maximizing`
/// side: the root's evaluation at maximizing nodes and its negation otherwise.
///
/// Nodes without legal moves (checkmate or stalemate) are leaves just like
/// the nodes at the depth horizon.
pub(super) fn negamax(
    state: &mut State,
    position: &Position,
    depth: Depth,
    mut alpha: Value,
    beta: Value,
    maximizing: bool,
) -> Value {
    state.visit();
    let sign = if maximizing { 1 } else { -1 };
    let leaf = || sign * evaluate_with(position, state.root(), state.profile());

    if depth == 0 {
        return leaf();
    }
    let moves = position.generate_moves();
    if moves.is_empty() {
        return leaf();
    }

    let child_depth = depth - 1;
    let mut best = -INFINITY;
    for next_move in &moves {
        let child = position.make_move(next_move.piece(), next_move.to(), false);
        let score = -negamax(state, &child, child_depth, -beta, -alpha, !maximizing);
        best = best.max(score);
        alpha = alpha.max(score);
        if alpha >= beta {
            state.cutoff();
            break;
        }
    }
    best
}
