//! # Game Implementations Module
//!
//! Each game implements the `GameState` trait so the search engine, the
//! players and the controller can drive it.
//!
//! ## Supported Games
//! - **Gomoku**: exactly five in a row on a square board of size 5 or more
//! - **Othello (Reversi)**: disc flipping with passes on an even board from 4x4 to 16x16
//!
//! Boards store their cells in a [`BitPack`](crate::bitpack::BitPack) and
//! walk lines through a [`LineTable`](lines::LineTable) built once per board.
//! Moves are `(row, col)` pairs, 0-based in code and 1-based in text.

pub mod gomoku;
pub mod lines;
pub mod othello;
