//! Chess rules core with legal move generation and an Alpha-Beta search
//! opponent.
//!
//! The crate is split into layers, leaves first:
//!
//! - [`chess`] is the board model: pieces, squares, the position with its
//!   move generation, attack detection and terminal-state queries.
//! - [`evaluation`] scores a position from a player's point of view.
//! - [`search`] picks a move for a player with depth-bounded Minimax.
//! - [`Engine`] is the text console driving a game between a human and the
//!   searcher.

pub mod chess;
pub mod evaluation;
pub mod search;

mod engine;
pub use engine::Engine;
use shadow_rs::shadow;

shadow!(build);

/// Build profile. Produced by `build.rs`.
const PROFILE: &str = include_str!(concat!(env!("OUT_DIR"), "/profile"));

/// Returns the full engine version that can be used to identify how it was
/// built in the first place.
#[must_use]
pub fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints information about the engine version and the build on startup.
pub fn print_engine_info() {
    println!("Knightfall {}", engine_version());
    println!("Build profile: {PROFILE}, release: {}", !shadow_rs::is_debug());
    if !shadow_rs::git_clean() {
        println!("Warning: built with uncommitted changes");
    }
    println!();
}
