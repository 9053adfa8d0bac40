//! The engine puts all pieces together: it keeps the current game, reads
//! commands from the input stream and answers with the searcher's moves when
//! it plays the side to move.
//!
//! This is a plain text console for playing against the engine and debugging
//! it, not an implementation of the Universal Chess Interface.
//!
//! [`Engine::run`] is the "main loop" of the engine.

use std::io::{BufRead, Write};

use anyhow::Context;
use itertools::Itertools;

use crate::chess::core::Player;
use crate::chess::position::Position;
use crate::engine::command::Command;
use crate::search::Searcher;

mod command;

const HELP: &str = "commands: d | moves | move <e2e4> | <e2e4> | go | new | \
                    position <placement> <w|b> | quit";

/// The Engine connects the game state, the searcher and the I/O.
pub struct Engine<'a, R: BufRead, W: Write> {
    position: Position,
    searcher: Searcher,
    engine_side: Option<Player>,
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> Engine<'a, R, W> {
    /// Creates a new instance of the engine with starting position and provided
    /// I/O. The engine replies automatically whenever `engine_side` is on move;
    /// with `None` it only moves on `go`.
    #[must_use]
    pub fn new(
        input: &'a mut R,
        output: &'a mut W,
        searcher: Searcher,
        engine_side: Option<Player>,
    ) -> Self {
        Self {
            position: Position::starting(),
            searcher,
            engine_side,
            input,
            output,
        }
    }

    /// Current game state.
    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Continuously reads the input stream and executes the commands until
    /// "quit" is sent or the input ends.
    ///
    /// Illegal moves and malformed commands are reported to the output and do
    /// not end the session. Only I/O failures are returned as errors.
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.reply_if_engine_turn()?;
        loop {
            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("reading from input")?;
            if read == 0 {
                break;
            }
            match Command::parse(&line) {
                Command::Display => self.handle_display()?,
                Command::Moves => self.handle_moves()?,
                Command::Play(next_move) => self.handle_play(&next_move)?,
                Command::Go => self.handle_go()?,
                Command::SetPosition { placement, side } => {
                    self.handle_position(&placement, &side)?;
                },
                Command::NewGame => {
                    tracing::info!("new game");
                    self.position = Position::starting();
                    self.reply_if_engine_turn()?;
                },
                Command::Help => writeln!(self.output, "{HELP}")?,
                Command::Quit => break,
                Command::Unknown(command) if command.is_empty() => {},
                Command::Unknown(command) => {
                    writeln!(self.output, "unknown command: {command}")?;
                },
            }
            self.output.flush()?;
        }
        Ok(())
    }

    fn handle_display(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "{:?}", self.position)?;
        writeln!(self.output, "{} to move", self.position.side_to_move())?;
        Ok(())
    }

    fn handle_moves(&mut self) -> anyhow::Result<()> {
        let moves = self.position.generate_moves();
        writeln!(self.output, "{}", moves.iter().join(" "))?;
        Ok(())
    }

    fn handle_play(&mut self, input: &str) -> anyhow::Result<()> {
        let next_move = match self.position.parse_move(input) {
            Ok(next_move) => next_move,
            Err(error) => {
                tracing::warn!(%error, "rejected move");
                writeln!(self.output, "error: {error}")?;
                return Ok(());
            },
        };
        self.position = self.position.play(&next_move)?;
        if self.report_status()? {
            self.reply_if_engine_turn()?;
        }
        Ok(())
    }

    fn handle_go(&mut self) -> anyhow::Result<()> {
        let _ = self.engine_move()?;
        Ok(())
    }

    fn handle_position(&mut self, placement: &str, side: &str) -> anyhow::Result<()> {
        let position = Player::try_from(side)
            .and_then(|side| Position::from_placement(placement, side));
        match position {
            Ok(position) => {
                tracing::info!(%position, "position set up");
                self.position = position;
                if self.report_status()? {
                    self.reply_if_engine_turn()?;
                }
            },
            Err(error) => {
                tracing::warn!(%error, "rejected position");
                writeln!(self.output, "error: {error}")?;
            },
        }
        Ok(())
    }

    fn reply_if_engine_turn(&mut self) -> anyhow::Result<()> {
        if self.engine_side == Some(self.position.side_to_move()) {
            let _ = self.engine_move()?;
        }
        Ok(())
    }

    /// Lets the searcher play for the side to move. Returns `false` if there
    /// was no legal move to play.
    fn engine_move(&mut self) -> anyhow::Result<bool> {
        let side = self.position.side_to_move();
        let Some(result) = self.searcher.find_best_move(&self.position, side)? else {
            let _ = self.report_status()?;
            return Ok(false);
        };
        writeln!(
            self.output,
            "engine plays {} (score {}, {} nodes)",
            result.best_move, result.score, result.nodes
        )?;
        self.position = self.position.play(&result.best_move)?;
        let _ = self.report_status()?;
        Ok(true)
    }

    /// Reports check, checkmate or stalemate of the side to move. Returns
    /// `true` if the game goes on.
    fn report_status(&mut self) -> anyhow::Result<bool> {
        let side = self.position.side_to_move();
        if self.position.is_checkmate(side) {
            tracing::info!(winner = %side.opponent(), "checkmate");
            writeln!(self.output, "checkmate, {} wins", side.opponent())?;
            return Ok(false);
        }
        if self.position.is_stalemate(side) {
            tracing::info!("stalemate");
            writeln!(self.output, "stalemate")?;
            return Ok(false);
        }
        if self.position.king_in_check(side) {
            writeln!(self.output, "check")?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::search::Limit;

    fn run(commands: &str, engine_side: Option<Player>) -> (String, Position) {
        let mut input = Cursor::new(commands.as_bytes().to_vec());
        let mut output = Vec::new();
        let searcher = Searcher::new(Limit::depth(1).unwrap());
        let mut engine = Engine::new(&mut input, &mut output, searcher, engine_side);
        engine.run().unwrap();
        let position = engine.position().clone();
        (String::from_utf8(output).unwrap(), position)
    }

    #[test]
    fn fools_mate() {
        let (output, position) = run("f2f3\ne7e5\nmove g2g4\nd8h4\n", None);
        assert_eq!(output, "checkmate, black wins\n");
        assert!(position.is_checkmate(Player::White));
    }

    #[test]
    fn rejects_illegal_moves() {
        let (output, position) = run("e2e5\ne7e5\nquit\ne2e4\n", None);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines, [
            "error: illegal move: e2e5",
            "error: illegal move: pe7 belongs to black",
        ]);
        assert_eq!(position.to_string(), Position::starting().to_string());
    }

    #[test]
    fn engine_replies() {
        let (output, position) = run("e2e4\n", Some(Player::Black));
        assert!(output.starts_with("engine plays "), "{output}");
        assert_eq!(position.side_to_move(), Player::White);
    }

    #[test]
    fn engine_opens_as_white() {
        let (output, position) = run("", Some(Player::White));
        assert!(output.starts_with("engine plays "), "{output}");
        assert_eq!(position.side_to_move(), Player::Black);
    }

    #[test]
    fn go_and_moves() {
        let (output, _) = run("position 7k/8/6K1/8/8/8/8/8 b\nmoves\ngo\n", None);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "h8g8");
        assert!(lines[1].starts_with("engine plays h8g8"), "{output}");
    }

    #[test]
    fn stalemate_is_reported() {
        let (output, _) = run("position 7k/5Q2/6K1/8/8/8/8/8 b\ngo\n", None);
        assert_eq!(output, "stalemate\nstalemate\n");
    }

    #[test]
    fn display_and_unknown() {
        let (output, _) = run("d\n\nfoo\nhelp\n", None);
        assert!(output.contains("white to move\n"));
        assert!(output.contains("unknown command: foo\n"));
        assert!(output.contains(HELP));
    }

    #[test]
    fn invalid_position() {
        let (output, position) = run("position 8/8/8 w\n", None);
        assert!(output.starts_with("error: "), "{output}");
        assert_eq!(position.to_string(), Position::starting().to_string());
    }
}
