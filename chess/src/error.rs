//! Defines the error type used throughout the rules library
//
//  Copyright 2026 The capablanca developers
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::result;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The result type used throughout the rules library.
pub type Result<T> = result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// An error raised by a board, codec or flyweight operation.
///
/// The first group of variants reports bad arguments, from malformed X-FEN text to structurally
/// impossible moves. `DimensionMismatch` and `NoDefaultSetup` instead report that a board was
/// asked to reset into a state its fixed dimensions cannot hold.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// A section of an X-FEN text representation cannot be parsed
    ParseError,
    /// A character is not a known piece alias
    UnknownAlias(char),
    /// A square index lies outside the board
    PositionOutOfRange,
    /// A rank or file count lies outside the supported range
    InvalidDimensions,
    /// A move has the wrong shape, an empty source square, or moves a passive piece
    InvalidMove,
    /// A side is missing its king, or has more than one
    InvalidKingCount,
    /// The passive king could be captured immediately
    KingCapturable,
    /// A pawn stands on its far rank without having promoted
    InvalidPawnRank,
    /// Castling rights are set without the matching king and rook placement
    InvalidCastlingFlags,
    /// The en-passant target does not match a passing pawn
    InvalidEnPassant,
    /// Reset text describes a board of different dimensions
    DimensionMismatch,
    /// No default setup exists for the board's dimensions
    NoDefaultSetup,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ParseError => "cannot parse board text".fmt(f),
            Error::UnknownAlias(c) => write!(f, "{}: unknown piece alias", c),
            Error::PositionOutOfRange => "position out of range".fmt(f),
            Error::InvalidDimensions => "rank or file count out of range".fmt(f),
            Error::InvalidMove => "structurally invalid move".fmt(f),
            Error::InvalidKingCount => "missing king or multiple kings of the same color".fmt(f),
            Error::KingCapturable => "passive king can be captured".fmt(f),
            Error::InvalidPawnRank => "pawn on its far rank".fmt(f),
            Error::InvalidCastlingFlags => "castling flags without matching pieces".fmt(f),
            Error::InvalidEnPassant => "en-passant target without passing pawn".fmt(f),
            Error::DimensionMismatch => "text describes a board of different dimensions".fmt(f),
            Error::NoDefaultSetup => "no default setup for these dimensions".fmt(f),
        }
    }
}

impl std::error::Error for Error { }
