//! Client-side view state.
//!
//! # Invariants
//! - Local state changes before the store call and is restored when the
//!   store call fails.

pub mod optimistic;
pub mod todo_board;
