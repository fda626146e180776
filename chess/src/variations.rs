//! Module for counting and printing the number of legal variations from a given board
//
//  Copyright 2026 The capablanca developers
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use crate::{position_name, Board, PieceType, Position};

/// Prints the number of variations of the given `depth` for each legal move from `board`,
/// returning the total.
pub fn print(board: &Board, depth: usize) -> usize {
    if depth < 1 {
        return 1;
    }

    let mut total = 0;

    for move_positions in board.active_moves() {
        if let Some(next) = make(board, &move_positions) {
            let count = count(&next, depth - 1);
            total += count;
            println!("\t{:7}\t{:12}\t{}", move_name(&move_positions, board.file_count()), count, next);
        }
    }

    total
}

/// Counts the number of legal variations of the given `depth` from `board`.
pub fn count(board: &Board, depth: usize) -> usize {
    if depth < 1 {
        return 1;
    }

    let mut total = 0;

    for move_positions in board.active_moves() {
        if let Some(next) = make(board, &move_positions) {
            total += count(&next, depth - 1);
        }
    }

    total
}

/// Applies the given move to a clone of `board` and returns the clone, or `None` if the move
/// would lose the mover's king to the immediate counter-capture.
pub fn make(board: &Board, move_positions: &[Position]) -> Option<Board> {
    let mut next = board.clone();
    next.perform_move(move_positions).ok()?;

    let mover = !next.active_color();
    let king = *next.positions(true, Some(mover), Some(PieceType::King)).first()?;
    if next.is_position_threatened(king, next.active_color()).expect("INFALLIBLE") {
        None
    } else {
        Some(next)
    }
}

fn move_name(move_positions: &[Position], file_count: u8) -> String {
    let names: Vec<String> = move_positions
        .iter()
        .map(|&position| position_name(position, file_count))
        .collect();
    names.join("-")
}
