//! Commands understood by the interactive console.

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Command {
    /// Print the board diagram.
    Display,
    /// List the legal moves of the side to move.
    Moves,
    /// Play a move given in coordinate notation (`e2e4`, `a7a8q`).
    Play(String),
    /// Let the searcher pick a move for the side to move.
    Go,
    /// Set up the position from a piece placement and the side to move.
    SetPosition { placement: String, side: String },
    /// Start a new game from the standard starting position.
    NewGame,
    Help,
    Quit,
    Unknown(String),
}

/// Bare moves are accepted without the `move` prefix: `e2e4`.
fn looks_like_move(token: &str) -> bool {
    let bytes = token.as_bytes();
    matches!(bytes.len(), 4 | 5)
        && matches!(bytes[0], b'a'..=b'h')
        && matches!(bytes[1], b'1'..=b'8')
        && matches!(bytes[2], b'a'..=b'h')
        && matches!(bytes[3], b'1'..=b'8')
}

impl Command {
    pub(super) fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();

        match parts.as_slice() {
            ["d" | "board"] => Self::Display,
            ["moves"] => Self::Moves,
            ["move", next_move] => Self::Play((*next_move).to_string()),
            [next_move] if looks_like_move(next_move) => Self::Play((*next_move).to_string()),
            ["go"] => Self::Go,
            ["position", "startpos"] | ["new"] => Self::NewGame,
            ["position", placement, side] => Self::SetPosition {
                placement: (*placement).to_string(),
                side: (*side).to_string(),
            },
            ["help"] => Self::Help,
            ["quit" | "exit"] => Self::Quit,
            _ => Self::Unknown(input.trim().to_string()),
        }
    }
}
