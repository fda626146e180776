//! The `chess` crate implements the rules of chess on generalized boards.
//!
//! Boards may have anywhere from 3 to 127 ranks and files, and the piece set extends the
//! orthodox six kinds with the archbishop (knight + bishop), chancellor (knight + rook) and
//! empress (knight + queen). Board states round-trip through an X-FEN text representation that
//! accommodates the variant dimensions.
//!
//! Move geometry is pre-expanded into positional piece flyweights (see
//! [`PositionalPiece`](struct.PositionalPiece.html)), so move generation walks absolute sink
//! positions instead of re-checking board bounds on every step.
//
//  Copyright 2026 The capablanca developers
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
#![warn(missing_docs, missing_debug_implementations, unused_extern_crates)]

use std::fmt;
use std::mem;
use std::ops;
use std::str::FromStr;
use std::convert::TryFrom;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A board position, counted file-wise from the bottom-left corner, so that
/// `rank = position / file_count` and `file = position % file_count`. The value
/// [`NO_POSITION`](constant.NO_POSITION.html) denotes the absence of a position.
pub type Position = i16;

/// The `Position` value denoting "none".
pub const NO_POSITION: Position = -1;

/// A move as an array of positions in visiting order: `[source, sink]` for ordinary moves, and
/// `[king_source, rook_source, king_sink]` for castling.
pub type Move = Vec<Position>;

/// Returns the coordinate name of the given position, with the file as a base-36 letter and the
/// rank as a 1-based number, or `-` for [`NO_POSITION`](constant.NO_POSITION.html).
pub fn position_name(position: Position, file_count: u8) -> String {
    if position < 0 {
        return "-".to_string();
    }

    let rank = position / Position::from(file_count);
    let file = position % Position::from(file_count);
    match std::char::from_digit(file as u32 + 10, 36) {
        Some(c) => format!("{}{}", c, rank + 1),
        None => format!("({},{})", file, rank + 1),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Which side a piece or player is on, based on the color of the pieces for that side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    /// The number of colors
    pub const COUNT: usize = 2;
}

impl ops::Not for Color {
    type Output = Color;

    /// Returns the opposite color
    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => 'w'.fmt(f),
            Color::Black => 'b'.fmt(f),
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "w" | "W" => Ok(Color::White),
            "b" | "B" => Ok(Color::Black),
            _ => Err(Error::ParseError),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::White
    }
}

impl From<Color> for usize {
    fn from(value: Color) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A relative motion step as `(rank, file)` increments from a piece's current location. Vectors
/// describe direction only; restrictions such as pawn capture rules are applied when the
/// positional flyweights are expanded.
pub type Vector = (i8, i8);

const PAWN_SINGLES: [Vector; 3] = [(1, -1), (1, 0), (1, 1)];
const KING_SINGLES: [Vector; 8] =
    [(0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1)];
const KNIGHT_SINGLES: [Vector; 8] =
    [(1, -2), (2, -1), (2, 1), (1, 2), (-1, 2), (-2, 1), (-2, -1), (-1, -2)];
const BISHOP_RAYS: [Vector; 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];
const ROOK_RAYS: [Vector; 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const QUEEN_RAYS: [Vector; 8] =
    [(0, -1), (1, 0), (0, 1), (-1, 0), (1, -1), (1, 1), (-1, 1), (-1, -1)];
const NO_VECTORS: [Vector; 0] = [];

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The kind of a chess piece, carrying its character alias, base rating and relative motion
/// vectors. The base ratings in cents follow Hans Berliner's system values, with the compound
/// pieces rated between rook and queen.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum PieceType {
    // discriminants are spelled out so nothing can go wrong when we use transmute later
    Pawn = 0,
    King = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    Archbishop = 6,
    Chancellor = 7,
    Empress = 8,
}

impl PieceType {
    /// The number of piece types
    pub const COUNT: usize = PieceType::Empress as usize + 1;

    /// Returns the type's upper-case character alias.
    pub fn alias(self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::King => 'K',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::Archbishop => 'A',
            PieceType::Chancellor => 'C',
            PieceType::Empress => 'E',
        }
    }

    /// Returns the type for the given upper-case character alias.
    pub fn from_alias(alias: char) -> Result<PieceType> {
        match alias {
            'P' => Ok(PieceType::Pawn),
            'K' => Ok(PieceType::King),
            'N' => Ok(PieceType::Knight),
            'B' => Ok(PieceType::Bishop),
            'R' => Ok(PieceType::Rook),
            'Q' => Ok(PieceType::Queen),
            'A' => Ok(PieceType::Archbishop),
            'C' => Ok(PieceType::Chancellor),
            'E' => Ok(PieceType::Empress),
            _ => Err(Error::UnknownAlias(alias)),
        }
    }

    /// Returns the type's base rating in cents, before any positional adjustment.
    pub fn base_rating(self) -> i32 {
        match self {
            PieceType::Pawn => 100,
            PieceType::King => 10_000,
            PieceType::Knight => 320,
            PieceType::Bishop => 330,
            PieceType::Rook => 510,
            PieceType::Queen => 880,
            PieceType::Archbishop => 750,
            PieceType::Chancellor => 800,
            PieceType::Empress => 1_000,
        }
    }

    /// Returns the relative single-step motion vectors. Pawn vectors point in white's forward
    /// direction and are mirrored for black during flyweight expansion.
    pub fn single_vectors(self) -> &'static [Vector] {
        match self {
            PieceType::Pawn => &PAWN_SINGLES,
            PieceType::King => &KING_SINGLES,
            PieceType::Knight
            | PieceType::Archbishop
            | PieceType::Chancellor
            | PieceType::Empress => &KNIGHT_SINGLES,
            _ => &NO_VECTORS,
        }
    }

    /// Returns the relative continuous (ray) motion vectors.
    pub fn continuous_vectors(self) -> &'static [Vector] {
        match self {
            PieceType::Bishop | PieceType::Archbishop => &BISHOP_RAYS,
            PieceType::Rook | PieceType::Chancellor => &ROOK_RAYS,
            PieceType::Queen | PieceType::Empress => &QUEEN_RAYS,
            _ => &NO_VECTORS,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.alias().fmt(f)
    }
}

impl FromStr for PieceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => PieceType::from_alias(c.to_ascii_uppercase()),
            _ => Err(Error::ParseError),
        }
    }
}

impl Default for PieceType {
    fn default() -> Self {
        PieceType::Pawn
    }
}

impl TryFrom<usize> for PieceType {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        if value < Self::COUNT {
            unsafe { Ok(mem::transmute::<u8, PieceType>(value as u8)) }
        } else {
            Err(Error::PositionOutOfRange)
        }
    }
}

impl From<PieceType> for usize {
    fn from(value: PieceType) -> Self {
        value as Self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
mod piece;
pub use crate::piece::{PieceTable, PositionalPiece};

mod board;
pub use crate::board::{Board, PieceMatrix};

pub mod error;
pub use crate::error::{Error, Result};

pub mod xfen;
pub mod variations;

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod color_tests {
    use super::Color;

    #[test]
    fn display_trait_works() {
        assert_eq!(format!("{}", Color::White), "w");
        assert_eq!(format!("{}", Color::Black), "b");
    }

    #[test]
    fn fromstr_trait_works() {
        assert_eq!("w".parse::<Color>().unwrap(), Color::White);
        assert_eq!("B".parse::<Color>().unwrap(), Color::Black);
        assert!("x".parse::<Color>().is_err());
        assert!("wb".parse::<Color>().is_err());
    }

    #[test]
    fn not_swaps_sides() {
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(!Color::Black, Color::White);
    }

    #[test]
    fn default_is_white() {
        assert_eq!(Color::White, Default::default());
    }

    #[test]
    fn to_usize_is_correct() {
        assert_eq!(usize::from(Color::White), 0);
        assert_eq!(usize::from(Color::Black), 1);
    }
}


#[cfg(test)]
mod position_tests {
    use super::{position_name, NO_POSITION};

    #[test]
    fn position_names_use_letter_and_one_based_rank() {
        assert_eq!(position_name(0, 8), "a1");
        assert_eq!(position_name(63, 8), "h8");
        assert_eq!(position_name(4, 8), "e1");
        assert_eq!(position_name(43, 8), "d6");
        assert_eq!(position_name(9, 10), "j1");
        assert_eq!(position_name(NO_POSITION, 8), "-");
    }
}
