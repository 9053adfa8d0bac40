use crate::chess::core::Player;
use crate::evaluation::Profile;

/// Bookkeeping shared by every node of a single search: the fixed
/// perspective of the root, the evaluator profile and the statistics.
pub(super) struct State {
    root: Player,
    profile: Profile,
    nodes: u64,
    cutoffs: u64,
}

impl State {
    pub(super) const fn new(root: Player, profile: Profile) -> Self {
        Self {
            root,
            profile,
            nodes: 0,
            cutoffs: 0,
        }
    }

    #[must_use]
    pub(super) const fn root(&self) -> Player {
        self.root
    }

    #[must_use]
    pub(super) const fn profile(&self) -> Profile {
        self.profile
    }

    pub(super) fn visit(&mut self) {
        self.nodes += 1;
    }

    /// Records that the remaining siblings of a node were skipped.
    pub(super) fn cutoff(&mut self) {
        self.cutoffs += 1;
    }

    #[must_use]
    pub(super) const fn nodes(&self) -> u64 {
        self.nodes
    }

    #[must_use]
    pub(super) const fn cutoffs(&self) -> u64 {
        self.cutoffs
    }
}
