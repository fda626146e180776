//! Move events emitted to user-interface collaborators
//
//  Copyright 2026 The capablanca developers
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use chess::{Board, Error, Move, PieceType, Position, Result};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A record describing one successfully performed move, for delivery to interested collaborators
/// such as a board view. The engine core only produces these records; delivering them is the
/// collaborator's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEvent {
    piece_type: PieceType,
    move_positions: Move,
    capture: bool,
    game_over: bool,
    rating: i32,
}

impl MoveEvent {
    /// Creates a new instance.
    pub fn new(
        piece_type: PieceType,
        move_positions: Move,
        capture: bool,
        game_over: bool,
        rating: i32,
    ) -> MoveEvent {
        MoveEvent { piece_type, move_positions, capture, game_over, rating }
    }

    /// Performs the given move on the board and returns the resulting event. The game counts as
    /// over once a king has been captured; draws and mates are the analyzer's business and can
    /// be recognized by its sentinel ratings instead.
    pub fn apply(board: &mut Board, move_positions: &[Position]) -> Result<MoveEvent> {
        if move_positions.is_empty() {
            return Err(Error::InvalidMove);
        }
        let piece_type = match board.piece_at(move_positions[0])? {
            Some(piece) => piece.piece_type(),
            None => return Err(Error::InvalidMove),
        };
        let capture = move_positions.len() == 2
            && (board.piece_at(move_positions[1])?.is_some()
                || (piece_type == PieceType::Pawn
                    && move_positions[1] == board.en_passant_target()));

        board.perform_move(move_positions)?;

        let rating = board.rating();
        let game_over = rating == Board::WIN || rating == -Board::WIN;
        Ok(MoveEvent::new(piece_type, move_positions.to_vec(), capture, game_over, rating))
    }

    /// Returns the type of the piece that moved.
    pub fn piece_type(&self) -> PieceType {
        self.piece_type
    }

    /// Returns the move as a sequence of visited positions, including the start position.
    pub fn move_positions(&self) -> &[Position] {
        &self.move_positions
    }

    /// Returns whether a piece was captured.
    pub fn capture(&self) -> bool {
        self.capture
    }

    /// Returns whether the game is over.
    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// Returns the projected rating after the move.
    pub fn rating(&self) -> i32 {
        self.rating
    }
}
