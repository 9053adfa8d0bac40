//! Implementation of the chess rules: board representation, attack detection,
//! legal move generation and terminal state queries.

pub mod attacks;
pub mod core;
pub mod movegen;
pub mod position;
