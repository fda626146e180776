//! Encoding and decoding of X-FEN single-line board representations
//!
//! X-FEN extends Forsyth-Edwards Notation to boards of arbitrary dimensions: empty runs may have
//! multiple digits, ranks may hold more than eight squares, and the en-passant file is written as
//! a base-36 letter. Six whitespace-separated sections describe the pieces (top rank first), the
//! active color, the castling abilities, the en-passant target, the reversible move clock and the
//! 1-based full-move index.
//
//  Copyright 2026 The capablanca developers
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use crate::board::PieceMatrix;
use crate::error::{Error, Result};
use crate::{position_name, Board, Color, Position, NO_POSITION};

const SECTION_COUNT: usize = 6;

// empty runs beyond any legal file count indicate garbage, not a wide board
const RUN_LIMIT: usize = 0x4000;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Returns the board described by the given X-FEN text representation. The board dimensions
/// follow from the piece section; every rank row must describe the same number of files.
pub fn decode(xfen: &str) -> Result<Board> {
    let sections: Vec<&str> = xfen.split_whitespace().collect();
    if sections.len() != SECTION_COUNT {
        return Err(Error::ParseError);
    }

    let piece_matrix = decode_piece_matrix(sections[0])?;
    let active_color: Color = sections[1].parse()?;
    let castling_abilities = decode_castling(sections[2])?;
    let en_passant_target =
        decode_en_passant(sections[3], piece_matrix.len(), piece_matrix[0].len())?;
    let reversible_move_clock = decode_reversible_move_clock(sections[4])?;
    let move_clock = decode_move_clock(sections[5], active_color)?;

    Board::new(
        &piece_matrix,
        move_clock,
        reversible_move_clock,
        castling_abilities,
        en_passant_target,
    )
}

/// Returns the X-FEN text representation of the given board.
pub fn encode(board: &Board) -> String {
    let mut text = String::new();

    let matrix = board.to_characters();
    for (rank_index, row) in matrix.iter().enumerate().rev() {
        let mut empty_count = 0;
        for &alias in row {
            match alias {
                Some(alias) => {
                    if empty_count > 0 {
                        text.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    text.push(alias);
                }
                None => empty_count += 1,
            }
        }
        if empty_count > 0 {
            text.push_str(&empty_count.to_string());
        }
        text.push(if rank_index == 0 { ' ' } else { '/' });
    }

    text.push(if board.white_active() { 'w' } else { 'b' });
    text.push(' ');

    let abilities = board.castling_abilities();
    if abilities == 0 {
        text.push('-');
    } else {
        if abilities & Board::CASTLE_WHITE_RIGHT != 0 {
            text.push('K');
        }
        if abilities & Board::CASTLE_WHITE_LEFT != 0 {
            text.push('Q');
        }
        if abilities & Board::CASTLE_BLACK_RIGHT != 0 {
            text.push('k');
        }
        if abilities & Board::CASTLE_BLACK_LEFT != 0 {
            text.push('q');
        }
    }
    text.push(' ');

    text.push_str(&position_name(board.en_passant_target(), board.file_count()));
    text.push(' ');

    text.push_str(&board.reversible_move_clock().to_string());
    text.push(' ');

    text.push_str(&(i32::from(board.move_clock()) / 2 + 1).to_string());
    text
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Decodes the piece section into a matrix in natural rank order (bottom rank first), inverting
/// the top-first order of the text.
fn decode_piece_matrix(section: &str) -> Result<PieceMatrix> {
    let rows: Vec<&str> = section.split('/').collect();
    let file_count = decode_file_count(rows[0])?;
    if file_count == 0 {
        return Err(Error::ParseError);
    }

    let mut matrix = vec![vec![None; file_count]; rows.len()];
    for (rank_index, row) in rows.iter().rev().enumerate() {
        let mut file_index = 0;
        let mut empty_count = 0;
        for character in row.chars() {
            if let Some(digit) = character.to_digit(10) {
                empty_count = 10 * empty_count + digit as usize;
                if empty_count > RUN_LIMIT {
                    return Err(Error::ParseError);
                }
            } else {
                file_index += empty_count;
                empty_count = 0;
                if file_index >= file_count {
                    return Err(Error::ParseError);
                }
                matrix[rank_index][file_index] = Some(character);
                file_index += 1;
            }
        }
        if file_index + empty_count != file_count {
            return Err(Error::ParseError);
        }
    }

    Ok(matrix)
}

/// Returns the number of files described by one rank row.
fn decode_file_count(row: &str) -> Result<usize> {
    let mut file_count = 0;
    let mut empty_count = 0;
    for character in row.chars() {
        if let Some(digit) = character.to_digit(10) {
            empty_count = 10 * empty_count + digit as usize;
            if empty_count > RUN_LIMIT {
                return Err(Error::ParseError);
            }
        } else {
            file_count += empty_count + 1;
            empty_count = 0;
        }
    }
    Ok(file_count + empty_count)
}

/// Decodes the castling section into white-left, white-right, black-left and black-right
/// abilities.
fn decode_castling(section: &str) -> Result<[bool; 4]> {
    let mut abilities = [false; 4];
    if section == "-" {
        return Ok(abilities);
    }

    for character in section.chars() {
        match character {
            'Q' => abilities[0] = true,
            'K' => abilities[1] = true,
            'q' => abilities[2] = true,
            'k' => abilities[3] = true,
            _ => return Err(Error::ParseError),
        }
    }
    Ok(abilities)
}

/// Decodes the en-passant section: `-` for none, or a base-36 file letter followed by a 1-based
/// rank number.
fn decode_en_passant(section: &str, rank_count: usize, file_count: usize) -> Result<Position> {
    if section == "-" {
        return Ok(NO_POSITION);
    }

    let mut characters = section.chars();
    let file = match characters.next().and_then(|c| c.to_digit(36)) {
        Some(digit) if digit >= 10 => (digit - 10) as Position,
        _ => return Err(Error::ParseError),
    };
    let rank: Position = characters.as_str().parse().map_err(|_| Error::ParseError)?;

    if rank < 1 || rank > rank_count as Position || file >= file_count as Position {
        return Err(Error::ParseError);
    }
    Ok((rank - 1) * file_count as Position + file)
}

/// Decodes the reversible move clock, which must lie in `[0, 127]`.
fn decode_reversible_move_clock(section: &str) -> Result<i8> {
    match section.parse::<i8>() {
        Ok(clock) if clock >= 0 => Ok(clock),
        _ => Err(Error::ParseError),
    }
}

/// Decodes the half-move clock from the 1-based full-move index: the index decremented by one,
/// doubled, and incremented by one if black is active.
fn decode_move_clock(section: &str, active_color: Color) -> Result<i16> {
    let move_index: i32 = section.parse().map_err(|_| Error::ParseError)?;
    let move_clock = ((move_index - 1) << 1) + if active_color == Color::White { 0 } else { 1 };

    if move_index < 1 || move_clock > i32::from(i16::max_value()) {
        return Err(Error::ParseError);
    }
    Ok(move_clock as i16)
}
