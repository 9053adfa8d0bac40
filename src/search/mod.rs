//! Chooses a move for the automated player with a depth-bounded [Minimax]
//! search with Alpha-Beta pruning.
//!
//! [Minimax]: https://www.chessprogramming.org/Minimax

use std::num::NonZeroU8;
use std::time::{Duration, Instant};

use anyhow::bail;

use crate::chess::core::{Move, Player};
use crate::chess::position::Position;
use crate::evaluation::{Profile, Value};

mod minimax;
mod state;

use state::State;

/// Search depth in plies.
pub type Depth = u8;

/// How far the search looks ahead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Limit {
    /// Fixed number of plies.
    Depth(NonZeroU8),
    /// Deepens one ply at a time until every line ends in checkmate or
    /// stalemate, the move time runs out or [`Depth::MAX`] plies are reached.
    /// Without a move time, positions where both sides can shuffle pieces
    /// forever are only cut off by the ply ceiling.
    Exhaustive,
}

impl Limit {
    /// Creates a fixed depth limit, failing on zero plies.
    pub fn depth(plies: Depth) -> anyhow::Result<Self> {
        match NonZeroU8::new(plies) {
            Some(plies) => Ok(Self::Depth(plies)),
            None => bail!("search depth must be at least 1 ply"),
        }
    }

    /// Deepest ply the search may reach.
    const fn plies(self) -> Depth {
        match self {
            Self::Depth(plies) => plies.get(),
            Self::Exhaustive => Depth::MAX,
        }
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self::Depth(NonZeroU8::MIN.saturating_add(2))
    }
}

/// Outcome of a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// First move of the principal line.
    pub best_move: Move,
    /// Evaluation of the principal line from the searching player's point of
    /// view.
    pub score: Value,
    /// Number of visited positions, including the root.
    pub nodes: u64,
    /// Number of nodes where the remaining moves were pruned.
    pub cutoffs: u64,
}

/// Configured search: the lookahead limit, the evaluator and an optional
/// time budget per move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Searcher {
    limit: Limit,
    profile: Profile,
    movetime: Option<Duration>,
}

impl Searcher {
    /// Creates a searcher with the [`Profile::Basic`] evaluator.
    #[must_use]
    pub const fn new(limit: Limit) -> Self {
        Self::with_profile(limit, Profile::Basic)
    }

    /// Creates a searcher with the given evaluator profile.
    #[must_use]
    pub const fn with_profile(limit: Limit, profile: Profile) -> Self {
        Self {
            limit,
            profile,
            movetime: None,
        }
    }

    /// Bounds the time [`Searcher::find_best_move`] spends on a move. The
    /// search then deepens iteratively and stops at the first iteration that
    /// starts after the budget is spent.
    #[must_use]
    pub const fn with_movetime(self, movetime: Duration) -> Self {
        Self {
            movetime: Some(movetime),
            ..self
        }
    }

    /// Configured lookahead.
    #[must_use]
    pub const fn limit(&self) -> Limit {
        self.limit
    }

    /// Configured evaluator profile.
    #[must_use]
    pub const fn profile(&self) -> Profile {
        self.profile
    }

    /// Configured time budget per move.
    #[must_use]
    pub const fn movetime(&self) -> Option<Duration> {
        self.movetime
    }

    /// Picks the best move of `color` in the position.
    ///
    /// Returns `Ok(None)` when `color` has no legal moves: the caller tells
    /// checkmate from stalemate via [`Position::king_in_check`]. The result is
    /// deterministic for a fixed depth: of the moves with the same score, the
    /// first generated one is returned.
    ///
    /// A fixed depth without a move time is searched directly. Otherwise the
    /// search deepens iteratively like [`Searcher::search_until`].
    ///
    /// # Errors
    ///
    /// If it is not `color`'s turn in the position.
    pub fn find_best_move(
        &self,
        position: &Position,
        color: Player,
    ) -> anyhow::Result<Option<SearchResult>> {
        match (self.limit, self.movetime) {
            (Limit::Depth(plies), None) => self.search(position, color, plies.get()),
            (_, movetime) => {
                let deadline = movetime.and_then(|movetime| Instant::now().checked_add(movetime));
                self.deepen(position, color, deadline)
            },
        }
    }

    /// Iterative deepening: searches with depth 1, 2, ... up to the limit and
    /// returns the result of the deepest completed iteration. The deadline is
    /// checked only between iterations, the first iteration always runs.
    ///
    /// # Errors
    ///
    /// If it is not `color`'s turn in the position.
    pub fn search_until(
        &self,
        position: &Position,
        color: Player,
        deadline: Instant,
    ) -> anyhow::Result<Option<SearchResult>> {
        self.deepen(position, color, Some(deadline))
    }

    fn deepen(
        &self,
        position: &Position,
        color: Player,
        deadline: Option<Instant>,
    ) -> anyhow::Result<Option<SearchResult>> {
        let Some(mut result) = self.search(position, color, 1)? else {
            return Ok(None);
        };
        for depth in 2..=self.limit.plies() {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                tracing::debug!(depth, "search deadline reached");
                break;
            }
            let previous_nodes = result.nodes;
            match self.search(position, color, depth)? {
                Some(deeper) => result = deeper,
                None => break,
            }
            // Every line already ended before the horizon.
            if result.nodes == previous_nodes {
                break;
            }
        }
        Ok(Some(result))
    }

    fn search(
        &self,
        position: &Position,
        color: Player,
        depth: Depth,
    ) -> anyhow::Result<Option<SearchResult>> {
        if position.side_to_move() != color {
            bail!("can not search for {color}, it is {}'s turn", position.side_to_move());
        }
        let mut state = State::new(color, self.profile);
        let Some((best_move, score)) = minimax::best_move(&mut state, position, depth) else {
            return Ok(None);
        };
        tracing::debug!(
            depth,
            score,
            nodes = state.nodes(),
            cutoffs = state.cutoffs(),
            %best_move,
            "search finished"
        );
        Ok(Some(SearchResult {
            best_move,
            score,
            nodes: state.nodes(),
            cutoffs: state.cutoffs(),
        }))
    }
}
