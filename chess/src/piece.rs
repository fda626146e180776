//! Positional piece flyweights and their process-global cache
//
//  Copyright 2026 The capablanca developers
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use lazy_static::lazy_static;
use crate::error::{Error, Result};
use crate::{Color, PieceType, Position};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A piece bound to a specific board dimension, color, type and position.
///
/// Positional pieces pre-expand their geometrically valid moves into absolute sink positions, so
/// move generation never re-checks board bounds. Each sink position is masked with a move tag in
/// its two leading bits:
///
/// - [`MOVE_NORMAL`](#associatedconstant.MOVE_NORMAL): no special handling required
/// - [`MOVE_CAPTURE_FORBIDDEN`](#associatedconstant.MOVE_CAPTURE_FORBIDDEN): only onto empty
///   squares
/// - [`MOVE_CAPTURE_REQUIRED`](#associatedconstant.MOVE_CAPTURE_REQUIRED): only when capturing
/// - [`MOVE_CASTLING`](#associatedconstant.MOVE_CASTLING): castling, subject to the board's
///   castling checks
///
/// Masking works because positions never exceed `127 * 127`, which fits in 14 bits; unmask with
/// `position = masked & MASK_POSITION`.
///
/// Instances live in a process-global cache keyed by board dimension and are shared as
/// [`Arc`](std::sync::Arc)s; two lookups with equal parameters observe the same allocation, so
/// equality can be decided by identity.
#[derive(Debug)]
pub struct PositionalPiece {
    rank_count: u8,
    file_count: u8,
    color: Color,
    piece_type: PieceType,
    position: Position,
    sink_positions: Vec<Vec<u16>>,
    sink_bitboard: Vec<u64>,
    rating: i32,
}

impl PositionalPiece {
    /// Bit mask extracting the board position from a masked sink position.
    pub const MASK_POSITION: u16 = 0x3fff;
    /// Move tag for moves without special restrictions.
    pub const MOVE_NORMAL: u16 = 0x0000;
    /// Move tag for moves permitted only onto empty squares.
    pub const MOVE_CAPTURE_FORBIDDEN: u16 = 0x4000;
    /// Move tag for moves permitted only when capturing.
    pub const MOVE_CAPTURE_REQUIRED: u16 = 0x8000;
    /// Move tag for castling moves.
    pub const MOVE_CASTLING: u16 = 0xc000;

    fn new(
        rank_count: u8,
        file_count: u8,
        color: Color,
        piece_type: PieceType,
        position: Position,
    ) -> PositionalPiece {
        let sink_positions = sink_positions(rank_count, file_count, color, piece_type, position);
        let sink_bitboard = sink_bitboard(rank_count, file_count, &sink_positions);
        let rating = rating(rank_count, file_count, color, piece_type, position, &sink_bitboard);

        PositionalPiece {
            rank_count,
            file_count,
            color,
            piece_type,
            position,
            sink_positions,
            sink_bitboard,
            rating,
        }
    }

    /// Returns the number of ranks of the boards this piece is bound to.
    pub fn rank_count(&self) -> u8 {
        self.rank_count
    }

    /// Returns the number of files of the boards this piece is bound to.
    pub fn file_count(&self) -> u8 {
        self.file_count
    }

    /// Returns the piece's color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns the piece's type.
    pub fn piece_type(&self) -> PieceType {
        self.piece_type
    }

    /// Returns the piece's position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Returns the piece's character alias, upper-case for white and lower-case for black.
    pub fn alias(&self) -> char {
        match self.color {
            Color::White => self.piece_type.alias(),
            Color::Black => self.piece_type.alias().to_ascii_lowercase(),
        }
    }

    /// Returns the masked sink positions, one inner sequence per move direction. Continuous
    /// movement produces sequences of subsequent steps; single-step movement produces sequences
    /// of length one.
    pub fn sink_positions(&self) -> &[Vec<u16>] {
        &self.sink_positions
    }

    /// Returns the sink position bitboard, one bit per reachable position, stored as 64-bit
    /// words. The bitboard loses direction information, so it cannot drive move generation, but
    /// it answers reachability queries in constant time.
    pub fn sink_bitboard(&self) -> &[u64] {
        &self.sink_bitboard
    }

    /// Returns `true` if the given position is reachable within a single move, ignoring
    /// blocking pieces.
    pub fn reaches(&self, position: Position) -> bool {
        debug_assert!(position >= 0);
        let position = position as usize;
        self.sink_bitboard[position >> 6] & (1 << (position & 63)) != 0
    }

    /// Returns the piece's rating in cents, adjusted for both color and position: positive for
    /// white pieces, negative for black ones.
    pub fn rating(&self) -> i32 {
        self.rating
    }

    /// Returns the ordinal identifying this piece among all pieces of its board dimension.
    pub fn ordinal(&self) -> i32 {
        ((usize::from(self.color) as i32) << 18)
            | ((usize::from(self.piece_type) as i32) << 14)
            | i32::from(self.position)
    }

    /// Returns the fully populated flyweight table for the given board dimension, creating it on
    /// first use. The first caller populates the table behind the write lock; once present, a
    /// dimension is served through the shared read path, and all lookups through the returned
    /// handle touch no lock at all.
    pub fn values(rank_count: u8, file_count: u8) -> Result<Arc<PieceTable>> {
        if rank_count < 1 || file_count < 1 || rank_count > 127 || file_count > 127 {
            return Err(Error::InvalidDimensions);
        }
        let key = (u16::from(rank_count) << 7) | u16::from(file_count);

        if let Some(table) = TABLES.read().expect("INFALLIBLE").get(&key) {
            return Ok(Arc::clone(table));
        }

        let mut tables = TABLES.write().expect("INFALLIBLE");
        let table = tables
            .entry(key)
            .or_insert_with(|| Arc::new(PieceTable::new(rank_count, file_count)));
        Ok(Arc::clone(table))
    }

    /// Returns the cached flyweight for the given dimension, color, type and position.
    pub fn value_of(
        rank_count: u8,
        file_count: u8,
        color: Color,
        piece_type: PieceType,
        position: Position,
    ) -> Result<Arc<PositionalPiece>> {
        let table = PositionalPiece::values(rank_count, file_count)?;
        if position < 0 || position >= i16::from(rank_count) * i16::from(file_count) {
            return Err(Error::PositionOutOfRange);
        }
        Ok(Arc::clone(table.piece(color, piece_type, position)))
    }

    /// Returns the cached flyweight for the given dimension, character alias and position, with
    /// upper-case aliases meaning white and lower-case black.
    pub fn value_of_alias(
        rank_count: u8,
        file_count: u8,
        alias: char,
        position: Position,
    ) -> Result<Arc<PositionalPiece>> {
        let color = if alias.is_uppercase() { Color::White } else { Color::Black };
        let piece_type = PieceType::from_alias(alias.to_ascii_uppercase())
            .map_err(|_| Error::UnknownAlias(alias))?;
        PositionalPiece::value_of(rank_count, file_count, color, piece_type, position)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The flyweight table for one board dimension, holding every `(color, type, position)`
/// combination. Tables are created fully populated and never change afterwards.
#[derive(Debug)]
pub struct PieceTable {
    field_count: usize,
    pieces: Vec<Arc<PositionalPiece>>,
}

lazy_static! {
    static ref TABLES: RwLock<HashMap<u16, Arc<PieceTable>>> = RwLock::new(HashMap::new());
}

impl PieceTable {
    fn new(rank_count: u8, file_count: u8) -> PieceTable {
        let field_count = usize::from(rank_count) * usize::from(file_count);
        let mut pieces = Vec::with_capacity(Color::COUNT * PieceType::COUNT * field_count);

        for &color in &[Color::White, Color::Black] {
            for &piece_type in &PIECE_TYPES {
                for position in 0..field_count {
                    pieces.push(Arc::new(PositionalPiece::new(
                        rank_count,
                        file_count,
                        color,
                        piece_type,
                        position as Position,
                    )));
                }
            }
        }

        PieceTable { field_count, pieces }
    }

    /// Returns the flyweight for the given color, type and position. The position must lie on
    /// the table's board dimension.
    pub fn piece(&self, color: Color, piece_type: PieceType, position: Position) -> &Arc<PositionalPiece> {
        debug_assert!(position >= 0 && (position as usize) < self.field_count);
        let index = (usize::from(color) * PieceType::COUNT + usize::from(piece_type))
            * self.field_count
            + position as usize;
        &self.pieces[index]
    }
}

const PIECE_TYPES: [PieceType; PieceType::COUNT] = [
    PieceType::Pawn,
    PieceType::King,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Rook,
    PieceType::Queen,
    PieceType::Archbishop,
    PieceType::Chancellor,
    PieceType::Empress,
];

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Expands the geometrically valid sink positions for a piece with the given properties.
fn sink_positions(
    rank_count: u8,
    file_count: u8,
    color: Color,
    piece_type: PieceType,
    position: Position,
) -> Vec<Vec<u16>> {
    let files = i16::from(file_count);
    let ranks = i16::from(rank_count);
    let source_rank = position / files;
    let source_file = position % files;
    let reverse_rank = ranks - source_rank - 1;
    let reverse_file = files - source_file - 1;
    let white = color == Color::White;

    let mut result: Vec<Vec<u16>> = Vec::new();

    if piece_type == PieceType::Pawn {
        for &(rank_step, file_step) in piece_type.single_vectors() {
            let rank_step = if white { i16::from(rank_step) } else { -i16::from(rank_step) };
            let sink_rank = source_rank + rank_step;
            let sink_file = source_file + i16::from(file_step);

            if sink_rank >= 0 && sink_rank < ranks && sink_file >= 0 && sink_file < files {
                let sink = (sink_rank * files + sink_file) as u16;
                if file_step == 0 {
                    let start_rank = if white { source_rank } else { reverse_rank };
                    if ranks >= 4 && start_rank <= 1 {
                        // the double-step square mirrors the source across the single step
                        let double = ((sink as i16) << 1) - position;
                        result.push(vec![
                            sink | PositionalPiece::MOVE_CAPTURE_FORBIDDEN,
                            double as u16 | PositionalPiece::MOVE_CAPTURE_FORBIDDEN,
                        ]);
                    } else {
                        result.push(vec![sink | PositionalPiece::MOVE_CAPTURE_FORBIDDEN]);
                    }
                } else {
                    result.push(vec![sink | PositionalPiece::MOVE_CAPTURE_REQUIRED]);
                }
            }
        }
        return result;
    }

    if piece_type == PieceType::King {
        // castling targets exist only for kings on their home rank's middle file
        let home_rank = if white { source_rank } else { reverse_rank };
        if home_rank == 0 && source_file == files / 2 {
            let castling_distance = (files - 1) / 2 - 1;
            result.push(vec![(position - castling_distance) as u16 | PositionalPiece::MOVE_CASTLING]);
            result.push(vec![(position + castling_distance) as u16 | PositionalPiece::MOVE_CASTLING]);
        }
    }

    for &(rank_step, file_step) in piece_type.single_vectors() {
        let sink_rank = source_rank + i16::from(rank_step);
        let sink_file = source_file + i16::from(file_step);

        if sink_rank >= 0 && sink_rank < ranks && sink_file >= 0 && sink_file < files {
            result.push(vec![(sink_rank * files + sink_file) as u16]);
        }
    }

    for &(rank_step, file_step) in piece_type.continuous_vectors() {
        let rank_step = i16::from(rank_step);
        let file_step = i16::from(file_step);

        let rank_limit = match rank_step {
            0 => i16::max_value(),
            step if step < 0 => source_rank,
            _ => reverse_rank,
        };
        let file_limit = match file_step {
            0 => i16::max_value(),
            step if step < 0 => source_file,
            _ => reverse_file,
        };

        let length = rank_limit.min(file_limit);
        if length > 0 {
            let mut sequence = Vec::with_capacity(length as usize);
            for step in 1..=length {
                let sink_rank = source_rank + step * rank_step;
                let sink_file = source_file + step * file_step;
                sequence.push((sink_rank * files + sink_file) as u16);
            }
            result.push(sequence);
        }
    }

    result
}

/// Collects the union of all sink positions into a bitboard.
fn sink_bitboard(rank_count: u8, file_count: u8, sink_positions: &[Vec<u16>]) -> Vec<u64> {
    let field_count = usize::from(rank_count) * usize::from(file_count);
    let mut bitboard = vec![0u64; ((field_count - 1) >> 6) + 1];

    for sequence in sink_positions {
        for &masked in sequence {
            let position = (masked & PositionalPiece::MASK_POSITION) as usize;
            bitboard[position >> 6] |= 1 << (position & 63);
        }
    }

    bitboard
}

/// Calculates the color- and position-adjusted rating in cents.
fn rating(
    rank_count: u8,
    file_count: u8,
    color: Color,
    piece_type: PieceType,
    position: Position,
    sink_bitboard: &[u64],
) -> i32 {
    use PieceType::*;

    let files = i32::from(file_count);
    let ranks = i32::from(rank_count);
    let source_rank = i32::from(position) / files;
    let source_file = i32::from(position) % files;
    let reverse_rank = ranks - source_rank - 1;
    let reverse_file = files - source_file - 1;
    let white = color == Color::White;

    let mut rating = match piece_type {
        Archbishop | Chancellor => 700,
        Bishop | Knight => 300,
        _ => piece_type.base_rating(),
    };

    match piece_type {
        // prefer centralized pawn advancement by increasing the rating up to 100%
        Pawn => {
            let half_file_count = files >> 1;
            let advancement = if white { source_rank } else { reverse_rank } - 1;
            let centralization =
                if source_file < half_file_count { source_file } else { reverse_file };
            let normalizer = ranks + half_file_count - 4;
            if normalizer > 0 {
                rating = rating * (normalizer + advancement + centralization) / normalizer;
            }
        }

        // adjust the rating for the number of reachable positions
        Knight | Bishop | Archbishop | Chancellor => {
            let sink_count: u32 = sink_bitboard.iter().map(|word| word.count_ones()).sum();
            rating += 50 * sink_count as i32 / (ranks + files - 2);
        }

        // prefer a king on its home rank
        King => {
            if (if white { source_rank } else { reverse_rank }) == 0 {
                rating += 50;
            }
        }

        _ => {}
    }

    if white {
        rating
    } else {
        -rating
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use super::PositionalPiece;
    use crate::{Color, PieceType};

    fn unmasked(piece: &PositionalPiece) -> Vec<Vec<i16>> {
        piece
            .sink_positions()
            .iter()
            .map(|sequence| {
                sequence
                    .iter()
                    .map(|&masked| (masked & PositionalPiece::MASK_POSITION) as i16)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn lookups_return_the_same_allocation() {
        let first =
            PositionalPiece::value_of(8, 8, Color::White, PieceType::Knight, 1).unwrap();
        let second =
            PositionalPiece::value_of(8, 8, Color::White, PieceType::Knight, 1).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let other = PositionalPiece::value_of(8, 8, Color::Black, PieceType::Knight, 1).unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn lookups_agree_across_threads() {
        let local = PositionalPiece::value_of(6, 6, Color::Black, PieceType::Queen, 17).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    PositionalPiece::value_of(6, 6, Color::Black, PieceType::Queen, 17).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert!(Arc::ptr_eq(&local, &handle.join().unwrap()));
        }
    }

    #[test]
    fn dimension_bounds_are_enforced() {
        assert!(PositionalPiece::values(0, 8).is_err());
        assert!(PositionalPiece::values(8, 128).is_err());
        assert!(PositionalPiece::value_of(8, 8, Color::White, PieceType::Rook, 64).is_err());
        assert!(PositionalPiece::value_of(8, 8, Color::White, PieceType::Rook, -1).is_err());
        assert!(PositionalPiece::value_of_alias(8, 8, 'x', 0).is_err());
    }

    #[test]
    fn corner_knight_reaches_two_positions() {
        let knight = PositionalPiece::value_of(8, 8, Color::White, PieceType::Knight, 0).unwrap();
        let mut sinks: Vec<i16> = unmasked(&knight).into_iter().flatten().collect();
        sinks.sort();
        assert_eq!(sinks, vec![10, 17]); // c2 and b3
        let bit_count: u32 = knight.sink_bitboard().iter().map(|w| w.count_ones()).sum();
        assert_eq!(bit_count, 2);
    }

    #[test]
    fn rook_rays_run_to_the_board_edge() {
        // rook on d4 of an 8x8 board
        let rook = PositionalPiece::value_of(8, 8, Color::White, PieceType::Rook, 27).unwrap();
        let rays = unmasked(&rook);
        assert_eq!(rays.len(), 4);
        assert!(rays.contains(&vec![26, 25, 24])); // west to a4
        assert!(rays.contains(&vec![35, 43, 51, 59])); // north to d8
        assert!(rays.contains(&vec![28, 29, 30, 31])); // east to h4
        assert!(rays.contains(&vec![19, 11, 3])); // south to d1
    }

    #[test]
    fn archbishop_combines_knight_and_bishop_motion() {
        let archbishop =
            PositionalPiece::value_of(8, 8, Color::White, PieceType::Archbishop, 27).unwrap();
        let singles = archbishop.sink_positions().iter().filter(|s| s.len() == 1).count();
        let rays = archbishop.sink_positions().iter().filter(|s| s.len() > 1).count();
        assert_eq!(singles, 8); // full knight circle around d4
        assert_eq!(rays, 4); // four diagonals
    }

    #[test]
    fn pawn_on_start_rank_gets_a_double_step_ray() {
        // white pawn on e2
        let pawn = PositionalPiece::value_of(8, 8, Color::White, PieceType::Pawn, 12).unwrap();
        let forward: Vec<_> = pawn
            .sink_positions()
            .iter()
            .filter(|s| s.iter().all(|&m| {
                m & !PositionalPiece::MASK_POSITION == PositionalPiece::MOVE_CAPTURE_FORBIDDEN
            }))
            .collect();
        assert_eq!(forward.len(), 1);
        assert_eq!(
            forward[0]
                .iter()
                .map(|&m| (m & PositionalPiece::MASK_POSITION) as i16)
                .collect::<Vec<_>>(),
            vec![20, 28] // e3 then e4
        );

        // white pawn on e4 only steps a single square
        let advanced = PositionalPiece::value_of(8, 8, Color::White, PieceType::Pawn, 28).unwrap();
        let forward: Vec<_> = advanced
            .sink_positions()
            .iter()
            .filter(|s| s[0] & !PositionalPiece::MASK_POSITION
                == PositionalPiece::MOVE_CAPTURE_FORBIDDEN)
            .collect();
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].len(), 1);
    }

    #[test]
    fn pawn_captures_are_marked_capture_required() {
        // black pawn on d7 moves down the board
        let pawn = PositionalPiece::value_of(8, 8, Color::Black, PieceType::Pawn, 51).unwrap();
        let mut captures: Vec<i16> = pawn
            .sink_positions()
            .iter()
            .flatten()
            .filter(|&&m| {
                m & !PositionalPiece::MASK_POSITION == PositionalPiece::MOVE_CAPTURE_REQUIRED
            })
            .map(|&m| (m & PositionalPiece::MASK_POSITION) as i16)
            .collect();
        captures.sort();
        assert_eq!(captures, vec![42, 44]); // c6 and e6
    }

    #[test]
    fn home_king_gets_castling_targets() {
        // white king on e1
        let king = PositionalPiece::value_of(8, 8, Color::White, PieceType::King, 4).unwrap();
        let mut targets: Vec<i16> = king
            .sink_positions()
            .iter()
            .flatten()
            .filter(|&&m| m & !PositionalPiece::MASK_POSITION == PositionalPiece::MOVE_CASTLING)
            .map(|&m| (m & PositionalPiece::MASK_POSITION) as i16)
            .collect();
        targets.sort();
        assert_eq!(targets, vec![2, 6]); // c1 and g1

        // a king off its home square has no castling targets
        let wandered = PositionalPiece::value_of(8, 8, Color::White, PieceType::King, 28).unwrap();
        assert!(wandered.sink_positions().iter().flatten().all(|&m| {
            m & !PositionalPiece::MASK_POSITION != PositionalPiece::MOVE_CASTLING
        }));

        // black king on e8
        let black = PositionalPiece::value_of(8, 8, Color::Black, PieceType::King, 60).unwrap();
        let mut targets: Vec<i16> = black
            .sink_positions()
            .iter()
            .flatten()
            .filter(|&&m| m & !PositionalPiece::MASK_POSITION == PositionalPiece::MOVE_CASTLING)
            .map(|&m| (m & PositionalPiece::MASK_POSITION) as i16)
            .collect();
        targets.sort();
        assert_eq!(targets, vec![58, 62]); // c8 and g8
    }

    #[test]
    fn ratings_adjust_for_position_and_color() {
        // white pawn on e2: 100 * (8 + 0 + 3) / 8
        let pawn = PositionalPiece::value_of(8, 8, Color::White, PieceType::Pawn, 12).unwrap();
        assert_eq!(pawn.rating(), 137);

        // advancing to e4 raises the rating: 100 * (8 + 2 + 3) / 8
        let advanced = PositionalPiece::value_of(8, 8, Color::White, PieceType::Pawn, 28).unwrap();
        assert_eq!(advanced.rating(), 162);

        // the mirrored black pawn rates the exact negative
        let mirrored = PositionalPiece::value_of(8, 8, Color::Black, PieceType::Pawn, 52).unwrap();
        assert_eq!(mirrored.rating(), -137);

        // knight on b1: normalized 300 plus 50 * 3 / 14 mobility
        let knight = PositionalPiece::value_of(8, 8, Color::White, PieceType::Knight, 1).unwrap();
        assert_eq!(knight.rating(), 310);

        // king on its home rank gets the +50 bonus
        let king = PositionalPiece::value_of(8, 8, Color::White, PieceType::King, 4).unwrap();
        assert_eq!(king.rating(), 10_050);
        let roaming = PositionalPiece::value_of(8, 8, Color::White, PieceType::King, 28).unwrap();
        assert_eq!(roaming.rating(), 10_000);
    }

    #[test]
    fn ordinals_separate_color_type_and_position() {
        let white = PositionalPiece::value_of(8, 8, Color::White, PieceType::Rook, 7).unwrap();
        let black = PositionalPiece::value_of(8, 8, Color::Black, PieceType::Rook, 7).unwrap();
        assert_eq!(white.ordinal(), (4 << 14) | 7);
        assert_eq!(black.ordinal(), (1 << 18) | (4 << 14) | 7);
    }
}
