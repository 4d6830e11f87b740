//! Board representation, move generation, and static evaluation.

pub mod error;
pub mod types;
pub mod variant;

mod attack;
mod attack_tables;
mod eval;
mod fen;
mod make_unmake;
mod movegen;
mod san;
mod state;
#[cfg(test)]
mod tests;
mod validate;

pub use fen::START_FEN;
pub use state::Board;
pub use variant::Variant;
