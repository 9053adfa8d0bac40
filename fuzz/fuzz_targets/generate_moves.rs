#![no_main]
use std::collections::HashSet;

use knightfall::chess::core::Player;
use knightfall::chess::position::Position;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;

// Every input byte picks one of the legal moves: the game is played until the
// input runs out or the game is over.
fuzz_target!(|data: &[u8]| {
    let mut position = Position::starting();
    for &choice in data {
        let moves = position.generate_moves();
        let side = position.side_to_move();
        assert_eq!(moves.is_empty(), !position.has_any_legal_move(side));
        if moves.is_empty() {
            assert!(position.is_checkmate(side) || position.is_stalemate(side));
            break;
        }
        let next_move = &moves[usize::from(choice) % moves.len()];
        let next = position
            .play(next_move)
            .expect("generated moves are legal");

        let squares: HashSet<_> = next.pieces().map(|piece| piece.square()).collect();
        assert_eq!(squares.len(), next.pieces().count());
        assert!(!next.king_in_check(side));
        for player in [Player::White, Player::Black] {
            let king = next.king(player).expect("kings are never captured");
            assert_eq!(
                next.is_attacked(king.square(), player.opponent()),
                next.king_in_check(player)
            );
        }
        position = next;
    }
});
