//! The board state machine: construction, move generation, move execution and rating
//
//  Copyright 2026 The capablanca developers
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use crate::error::{Error, Result};
use crate::piece::{PieceTable, PositionalPiece};
use crate::{xfen, Color, Move, PieceType, Position, NO_POSITION};

use Color::*;
use PieceType::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A game-neutral matrix of piece aliases, rank-major with the bottom rank first; `None` marks an
/// empty square.
pub type PieceMatrix = Vec<Vec<Option<char>>>;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The mutable state of a chess game on a board of fixed dimensions.
///
/// A board holds flyweight [`PositionalPiece`](struct.PositionalPiece.html)s in a position-indexed
/// array, together with the move clocks, castling abilities, the en-passant target and cached
/// king positions. Cloning copies the array but shares the flyweights, so clones are cheap and
/// independently mutable.
///
/// # Instantiation
/// There are three typical ways of creating a `Board`:
///  -  [`empty`](#method.empty) creates a piece-less shell for the given dimensions, usually
///     followed by [`reset`](#method.reset).
///  -  [`new`](#method.new) builds a board from a piece matrix and game state, validating the
///     result.
///  -  [`xfen::decode`](xfen/fn.decode.html) (also available through `str::parse`) decodes an
///     X-FEN text representation.
///
/// # Moves
/// [`active_moves`](#method.active_moves) enumerates the moves of the side to move, and
/// [`perform_move`](#method.perform_move) executes one of them. Move execution checks structure
/// only, never legality; a search layer discards move sequences that would lose the king one ply
/// deeper.
#[derive(Clone)]
pub struct Board {
    rank_count: u8,
    file_count: u8,
    table: Arc<PieceTable>,
    pieces: Vec<Option<Arc<PositionalPiece>>>,
    move_clock: i16,
    reversible_move_clock: i8,
    castling_abilities: u8,
    en_passant_target: Position,
    white_king_position: Position,
    black_king_position: Position,
}

impl Board {
    /// Boards need at least 3 ranks to leave a rank between two single-rank armies.
    pub const MIN_RANK_COUNT: u8 = 3;
    /// Boards need at least 3 files to avoid negative castling distances; kings castle on the
    /// spot on boards with 3 and 4 files.
    pub const MIN_FILE_COUNT: u8 = 3;
    /// Positions must fit the 14 low bits of a masked sink position.
    pub const MAX_RANK_COUNT: u8 = 127;
    /// Positions must fit the 14 low bits of a masked sink position.
    pub const MAX_FILE_COUNT: u8 = 127;

    /// The castling-ability bit for the right of the white king to castle to the left.
    pub const CASTLE_WHITE_LEFT: u8 = 0b0001;
    /// The castling-ability bit for the right of the white king to castle to the right.
    pub const CASTLE_WHITE_RIGHT: u8 = 0b0010;
    /// The castling-ability bit for the right of the black king to castle to the left.
    pub const CASTLE_BLACK_LEFT: u8 = 0b0100;
    /// The castling-ability bit for the right of the black king to castle to the right.
    pub const CASTLE_BLACK_RIGHT: u8 = 0b1000;

    /// The rating of a finished game won by white; black wins are rated with the negative.
    pub const WIN: i32 = i32::max_value();
    /// The rating of a finished drawn game.
    pub const DRAW: i32 = i32::min_value();

    /// The default setups for eight-rank boards with three to ten files.
    pub const DEFAULT_EIGHT_RANK_SETUPS: [&'static str; 8] = [
        "rkr/ppp/3/3/3/3/PPP/RKR w KQkq - 0 1",
        "rekr/pppp/4/4/4/4/PPPP/REKR w KQkq - 0 1",
        "rckcr/ppppp/5/5/5/5/PPPPP/RCKCR w KQkq - 0 1",
        "raqkar/pppppp/6/6/6/6/PPPPPP/RAQKAR w KQkq - 0 1",
        "rnqkanr/ppppppp/7/7/7/7/PPPPPPP/RNQKANR w KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "rnbqkbncr/ppppppppp/9/9/9/9/PPPPPPPPP/RNBQKBNCR w KQkq - 0 1",
        "rnabqkbanr/pppppppppp/10/10/10/10/PPPPPPPPPP/RNABQKBANR w KQkq - 0 1",
    ];

    /// Creates an empty board with the given dimensions. The result has no kings and therefore
    /// fails the validity rules; populate it with [`reset`](#method.reset).
    pub fn empty(rank_count: u8, file_count: u8) -> Result<Board> {
        if rank_count < Board::MIN_RANK_COUNT
            || file_count < Board::MIN_FILE_COUNT
            || rank_count > Board::MAX_RANK_COUNT
            || file_count > Board::MAX_FILE_COUNT
        {
            return Err(Error::InvalidDimensions);
        }

        let table = PositionalPiece::values(rank_count, file_count)?;
        Ok(Board {
            rank_count,
            file_count,
            table,
            pieces: vec![None; usize::from(rank_count) * usize::from(file_count)],
            move_clock: 0,
            reversible_move_clock: 0,
            castling_abilities: 0,
            en_passant_target: NO_POSITION,
            white_king_position: NO_POSITION,
            black_king_position: NO_POSITION,
        })
    }

    /// Creates a board with the given properties and validates it.
    ///
    /// The castling abilities are given as white-left, white-right, black-left, black-right.
    /// The en-passant target is the position a passing pawn skipped, or
    /// [`NO_POSITION`](constant.NO_POSITION.html).
    pub fn new(
        piece_matrix: &[Vec<Option<char>>],
        move_clock: i16,
        reversible_move_clock: i8,
        castling_abilities: [bool; 4],
        en_passant_target: Position,
    ) -> Result<Board> {
        if piece_matrix.len() > usize::from(Board::MAX_RANK_COUNT)
            || piece_matrix.len() < usize::from(Board::MIN_RANK_COUNT)
            || piece_matrix[0].len() > usize::from(Board::MAX_FILE_COUNT)
        {
            return Err(Error::InvalidDimensions);
        }
        let mut board = Board::empty(piece_matrix.len() as u8, piece_matrix[0].len() as u8)?;

        if move_clock < 0 || reversible_move_clock < 0 {
            return Err(Error::ParseError);
        }
        let field_count = board.pieces.len() as Position;
        if en_passant_target < NO_POSITION || en_passant_target >= field_count {
            return Err(Error::PositionOutOfRange);
        }

        board.move_clock = move_clock;
        board.reversible_move_clock = reversible_move_clock;
        board.en_passant_target = en_passant_target;
        if castling_abilities[0] { board.castling_abilities |= Board::CASTLE_WHITE_LEFT; }
        if castling_abilities[1] { board.castling_abilities |= Board::CASTLE_WHITE_RIGHT; }
        if castling_abilities[2] { board.castling_abilities |= Board::CASTLE_BLACK_LEFT; }
        if castling_abilities[3] { board.castling_abilities |= Board::CASTLE_BLACK_RIGHT; }

        let mut position: Position = 0;
        for row in piece_matrix {
            if row.len() != usize::from(board.file_count) {
                return Err(Error::InvalidDimensions);
            }
            for &alias in row {
                if let Some(alias) = alias {
                    let piece = PositionalPiece::value_of_alias(
                        board.rank_count,
                        board.file_count,
                        alias,
                        position,
                    )?;
                    if piece.piece_type() == King {
                        if board.king_position(piece.color()) != NO_POSITION {
                            return Err(Error::InvalidKingCount);
                        }
                        board.set_king_position(piece.color(), position);
                    }
                    board.pieces[position as usize] = Some(piece);
                }
                position += 1;
            }
        }

        board.validate()?;
        Ok(board)
    }

    /// Returns the number of ranks on the board.
    pub fn rank_count(&self) -> u8 {
        self.rank_count
    }

    /// Returns the number of files on the board.
    pub fn file_count(&self) -> u8 {
        self.file_count
    }

    /// Returns the number of pieces on the board.
    pub fn piece_count(&self) -> usize {
        self.pieces.iter().filter(|piece| piece.is_some()).count()
    }

    /// Returns the total number of half-moves performed.
    pub fn move_clock(&self) -> i16 {
        self.move_clock
    }

    /// Returns the number of half-moves performed since the last pawn move or capture. A value
    /// above 100 triggers the fifty-move rule.
    pub fn reversible_move_clock(&self) -> i8 {
        self.reversible_move_clock
    }

    /// Returns the four castling abilities as a bit field, see the `CASTLE_*` constants.
    pub fn castling_abilities(&self) -> u8 {
        self.castling_abilities
    }

    /// Returns the position a passing pawn just skipped and where it can now be captured en
    /// passant, or [`NO_POSITION`](constant.NO_POSITION.html).
    pub fn en_passant_target(&self) -> Position {
        self.en_passant_target
    }

    /// Returns `true` if white is the side to move.
    pub fn white_active(&self) -> bool {
        self.move_clock & 1 == 0
    }

    /// Returns the color of the side to move.
    pub fn active_color(&self) -> Color {
        if self.white_active() { White } else { Black }
    }

    /// Returns the piece at the given position, or `None` if the position is empty.
    pub fn piece_at(&self, position: Position) -> Result<Option<&Arc<PositionalPiece>>> {
        if position < 0 || position as usize >= self.pieces.len() {
            return Err(Error::PositionOutOfRange);
        }
        Ok(self.pieces[position as usize].as_ref())
    }

    /// Returns all positions holding pieces that match the given filters, with `None` filters
    /// matching any color or type. If `any` is `true`, at most the first match is returned.
    /// King lookups are answered from the cached king positions.
    pub fn positions(
        &self,
        any: bool,
        color: Option<Color>,
        piece_type: Option<PieceType>,
    ) -> Vec<Position> {
        let mut result = Vec::new();

        if piece_type == Some(King) {
            match color {
                Some(color) => {
                    if self.king_position(color) != NO_POSITION {
                        result.push(self.king_position(color));
                    }
                }
                None => {
                    for &position in &[self.white_king_position, self.black_king_position] {
                        if position != NO_POSITION {
                            result.push(position);
                        }
                    }
                }
            }
            if any {
                result.truncate(1);
            }
            return result;
        }

        for (position, piece) in self.pieces.iter().enumerate() {
            if let Some(piece) = piece {
                if color.map_or(true, |c| piece.color() == c)
                    && piece_type.map_or(true, |t| piece.piece_type() == t)
                {
                    result.push(position as Position);
                    if any {
                        break;
                    }
                }
            }
        }
        result
    }

    /// Returns the board rating in cents: the sum of all piece ratings, or ±[`WIN`](#associatedconstant.WIN)
    /// once a king has been captured.
    pub fn rating(&self) -> i32 {
        if self.white_king_position == NO_POSITION {
            return -Board::WIN;
        }
        if self.black_king_position == NO_POSITION {
            return Board::WIN;
        }

        self.pieces.iter().flatten().map(|piece| piece.rating()).sum()
    }

    /// Returns whether the given side could capture a piece at the given position with its next
    /// move.
    ///
    /// The test runs in reverse: if a piece on position A can capture on position B, a similar
    /// piece on B could capture on A, so walking knight, bishop and rook rays from the queried
    /// position covers every piece kind. An empty en-passant target also counts as threatened
    /// by the side to move.
    pub fn is_position_threatened(&self, position: Position, color: Color) -> Result<bool> {
        if position < 0 || position as usize >= self.pieces.len() {
            return Err(Error::PositionOutOfRange);
        }
        Ok(self.threatened(position, color))
    }

    fn threatened(&self, position: Position, color: Color) -> bool {
        let mask = PositionalPiece::MASK_POSITION;

        // pieces that capture like knights
        let knight = self.table.piece(color, Knight, position);
        for sequence in knight.sink_positions() {
            let sink = (sequence[0] & mask) as usize;
            if let Some(piece) = &self.pieces[sink] {
                if piece.color() == color {
                    match piece.piece_type() {
                        Knight | Archbishop | Chancellor | Empress => return true,
                        _ => {}
                    }
                }
            }
        }

        // pieces that capture like bishops, plus king and pawn on the adjacent diagonal; pawn
        // capture is additionally constrained by direction
        let bishop = self.table.piece(color, Bishop, position);
        for sequence in bishop.sink_positions() {
            for (index, &masked) in sequence.iter().enumerate() {
                let sink = (masked & mask) as Position;
                let piece = match &self.pieces[sink as usize] {
                    Some(piece) => piece,
                    None => continue,
                };

                if piece.color() == color {
                    match piece.piece_type() {
                        Bishop | Archbishop | Queen | Empress => return true,
                        King if index == 0 => return true,
                        Pawn if index == 0 && ((color == White) != (position < sink)) => {
                            return true
                        }
                        _ => {}
                    }
                }
                break;
            }
        }

        // pieces that capture like rooks, plus the adjacent king
        let rook = self.table.piece(color, Rook, position);
        for sequence in rook.sink_positions() {
            for (index, &masked) in sequence.iter().enumerate() {
                let sink = (masked & mask) as usize;
                let piece = match &self.pieces[sink] {
                    Some(piece) => piece,
                    None => continue,
                };

                if piece.color() == color {
                    match piece.piece_type() {
                        Rook | Chancellor | Queen | Empress => return true,
                        King if index == 0 => return true,
                        _ => {}
                    }
                }
                break;
            }
        }

        position == self.en_passant_target && self.active_color() == color
    }

    /// Returns all moves of the side to move as position arrays in visiting order:
    /// `[source, sink]`, or `[king_source, rook_source, king_sink]` for castling.
    ///
    /// Moves are pseudo-legal: a move may still expose its own king, which the search layer
    /// detects by the king capture it permits one ply deeper. Once a capture of the passive
    /// king is available, only king-capturing moves are returned. After 100 reversible
    /// half-moves the fifty-move rule stops play: the first non-pawn piece considered empties
    /// the result.
    pub fn active_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();

        let active = self.active_color();
        if self.king_position(active) == NO_POSITION {
            return moves;
        }

        let mut must_capture_king = false;
        for piece in self.pieces.iter().flatten() {
            if piece.color() != active {
                continue;
            }
            if piece.piece_type() != Pawn && self.reversible_move_clock > 100 {
                moves.clear();
                return moves;
            }
            must_capture_king = self.collect_moves(&mut moves, piece, must_capture_king);
        }
        moves
    }

    /// Collects the moves of one piece, honoring and propagating the must-capture-king state.
    fn collect_moves(
        &self,
        moves: &mut Vec<Move>,
        piece: &Arc<PositionalPiece>,
        mut must_capture_king: bool,
    ) -> bool {
        let mask = PositionalPiece::MASK_POSITION;
        let active = piece.color();
        let source = piece.position();

        for sequence in piece.sink_positions() {
            for &masked in sequence {
                let sink = (masked & mask) as Position;

                if masked & !mask != PositionalPiece::MOVE_CASTLING {
                    let can_capture = masked & PositionalPiece::MOVE_CAPTURE_FORBIDDEN == 0;
                    let can_occupy = masked & PositionalPiece::MOVE_CAPTURE_REQUIRED == 0;

                    match &self.pieces[sink as usize] {
                        Some(target)
                            if target.color() != active && target.piece_type() == King =>
                        {
                            if can_capture {
                                if !must_capture_king {
                                    moves.clear();
                                }
                                moves.push(vec![source, sink]);
                                must_capture_king = true;
                            }
                            break;
                        }
                        Some(target) => {
                            if can_capture && !must_capture_king && target.color() != active {
                                moves.push(vec![source, sink]);
                            }
                            break;
                        }
                        None => {
                            if (can_occupy || sink == self.en_passant_target)
                                && !must_capture_king
                            {
                                moves.push(vec![source, sink]);
                            }
                        }
                    }
                } else if !must_capture_king {
                    self.collect_castling(moves, active, source, sink);
                }
            }
        }

        must_capture_king
    }

    /// Collects a castling move if the matching ability is present, the squares between rook
    /// and king are empty, and the king neither starts from nor crosses a threatened position.
    /// The king's sink itself may be threatened; the search layer rejects that case one ply
    /// deeper.
    fn collect_castling(
        &self,
        moves: &mut Vec<Move>,
        active: Color,
        source: Position,
        sink: Position,
    ) {
        let files = Position::from(self.file_count);
        let passive = !active;
        let shift = if active == White { 0 } else { 2 };

        if sink <= source {
            let mut permitted = self.castling_abilities & (Board::CASTLE_WHITE_LEFT << shift) != 0;

            let mut position = sink + (files & 1) - 1;
            while permitted && position < source {
                permitted &= self.pieces[position as usize].is_none();
                position += 1;
            }
            let mut position = sink + 1;
            while permitted && position <= source {
                permitted &= !self.threatened(position, passive);
                position += 1;
            }

            if permitted {
                let rook_source = sink - ((files + 1) & 1) - 1;
                moves.push(vec![source, rook_source, sink]);
            }
        } else {
            let mut permitted = self.castling_abilities & (Board::CASTLE_WHITE_RIGHT << shift) != 0;

            let mut position = sink;
            while permitted && position > source {
                permitted &= self.pieces[position as usize].is_none();
                position -= 1;
            }
            let mut position = sink - 1;
            while permitted && position >= source {
                permitted &= !self.threatened(position, passive);
                position -= 1;
            }

            if permitted {
                moves.push(vec![source, sink + 1, sink]);
            }
        }
    }

    /// Performs the given move without checking its legality, only its structure: the positions
    /// must be on the board, the source must hold an active piece, and castling requires the
    /// matching king and rook.
    ///
    /// All state transitions of the game follow from here: captures (including en passant),
    /// pawn double-steps establishing a new en-passant target, automatic promotion to queen on
    /// the far rank, castling execution, castling-ability maintenance, king tracking and the
    /// move clocks.
    pub fn perform_move(&mut self, move_positions: &[Position]) -> Result<()> {
        let field_count = self.pieces.len() as Position;
        for &position in move_positions {
            if position < 0 || position >= field_count {
                return Err(Error::PositionOutOfRange);
            }
        }

        let white_active = self.white_active();
        let active = self.active_color();
        let files = Position::from(self.file_count);

        match *move_positions {
            [king_source, rook_source, king_sink] => {
                let king_matches = self.pieces[king_source as usize].as_ref().map_or(false, |p| {
                    p.color() == active && p.piece_type() == King
                });
                let rook_matches = self.pieces[rook_source as usize].as_ref().map_or(false, |p| {
                    p.color() == active && p.piece_type() == Rook
                });
                if !king_matches || !rook_matches {
                    return Err(Error::InvalidMove);
                }

                self.en_passant_target = NO_POSITION;
                self.move_clock = self.move_clock.saturating_add(1);
                self.reversible_move_clock = 0;

                let rook_sink = king_sink + if rook_source < king_source { 1 } else { -1 };
                self.pieces[king_source as usize] = None;
                self.pieces[rook_source as usize] = None;
                self.pieces[king_sink as usize] =
                    Some(Arc::clone(self.table.piece(active, King, king_sink)));
                self.pieces[rook_sink as usize] =
                    Some(Arc::clone(self.table.piece(active, Rook, rook_sink)));
                self.set_king_position(active, king_sink);
                self.castling_abilities &= !castling_mask(active);
                Ok(())
            }

            [source, sink] => {
                let source_piece = match &self.pieces[source as usize] {
                    Some(piece) if piece.color() == active => Arc::clone(piece),
                    _ => return Err(Error::InvalidMove),
                };
                let capture_piece = self.pieces[sink as usize].clone();
                if let Some(piece) = &capture_piece {
                    if piece.color() == active {
                        return Err(Error::InvalidMove);
                    }
                }

                let en_passant_target = self.en_passant_target;
                self.en_passant_target = NO_POSITION;
                self.move_clock = self.move_clock.saturating_add(1);
                self.reversible_move_clock = self.reversible_move_clock.saturating_add(1);

                let mut sink_type = source_piece.piece_type();
                match sink_type {
                    Pawn => {
                        if capture_piece.is_none() {
                            if sink == en_passant_target {
                                // the passing pawn sits one rank beyond the skipped position
                                let capture_position =
                                    sink + if sink > source { -files } else { files };
                                self.pieces[capture_position as usize] = None;
                            } else if (source - sink).abs() == 2 * files {
                                self.establish_en_passant_target(active, source, sink);
                            }
                        }

                        if sink < files || sink >= field_count - files {
                            sink_type = Queen;
                        }
                        self.reversible_move_clock = 0;
                    }

                    Rook => {
                        if white_active {
                            if source == 0 {
                                self.castling_abilities &= !Board::CASTLE_WHITE_LEFT;
                            } else if source == files - 1 {
                                self.castling_abilities &= !Board::CASTLE_WHITE_RIGHT;
                            }
                        } else if source == field_count - files {
                            self.castling_abilities &= !Board::CASTLE_BLACK_LEFT;
                        } else if source == field_count - 1 {
                            self.castling_abilities &= !Board::CASTLE_BLACK_RIGHT;
                        }
                    }

                    King => {
                        self.castling_abilities &= !castling_mask(active);
                        self.set_king_position(active, sink);
                    }

                    _ => {}
                }

                if let Some(capture) = &capture_piece {
                    match capture.piece_type() {
                        King => {
                            self.castling_abilities &= !castling_mask(!active);
                            self.set_king_position(!active, NO_POSITION);
                        }
                        Rook => {
                            if white_active {
                                if sink == field_count - files {
                                    self.castling_abilities &= !Board::CASTLE_BLACK_LEFT;
                                } else if sink == field_count - 1 {
                                    self.castling_abilities &= !Board::CASTLE_BLACK_RIGHT;
                                }
                            } else if sink == 0 {
                                self.castling_abilities &= !Board::CASTLE_WHITE_LEFT;
                            } else if sink == files - 1 {
                                self.castling_abilities &= !Board::CASTLE_WHITE_RIGHT;
                            }
                        }
                        _ => {}
                    }
                    self.reversible_move_clock = 0;
                }

                self.pieces[source as usize] = None;
                self.pieces[sink as usize] =
                    Some(Arc::clone(self.table.piece(active, sink_type, sink)));
                Ok(())
            }

            _ => Err(Error::InvalidMove),
        }
    }

    /// Establishes the en-passant target after a pawn double-step, but only if a passive pawn
    /// next to the sink can actually reach the skipped position.
    fn establish_en_passant_target(&mut self, active: Color, source: Position, sink: Position) {
        let files = Position::from(self.file_count);
        let target = (source + sink) / 2;
        let sink_file = sink % files;

        for &offset in &[-1, 1] {
            let neighbor_file = sink_file + offset;
            if neighbor_file < 0 || neighbor_file >= files {
                continue;
            }
            if let Some(neighbor) = &self.pieces[(sink + offset) as usize] {
                if neighbor.color() != active
                    && neighbor.piece_type() == Pawn
                    && neighbor.reaches(target)
                {
                    self.en_passant_target = target;
                    break;
                }
            }
        }
    }

    /// Resets the board to the given X-FEN text representation, or to the typical setup for its
    /// dimensions if none is given. All fields are overwritten together; on error the board is
    /// unchanged.
    pub fn reset(&mut self, text: Option<&str>) -> Result<()> {
        let text = match text {
            Some(text) => text,
            None => {
                if self.rank_count != 8 || self.file_count > 10 {
                    return Err(Error::NoDefaultSetup);
                }
                Board::DEFAULT_EIGHT_RANK_SETUPS
                    [usize::from(self.file_count - Board::MIN_FILE_COUNT)]
            }
        };

        let template = xfen::decode(text)?;
        if template.rank_count != self.rank_count || template.file_count != self.file_count {
            return Err(Error::DimensionMismatch);
        }

        *self = template;
        Ok(())
    }

    /// Returns a game-neutral character matrix of the board's pieces, rank-major with the
    /// bottom rank first.
    pub fn to_characters(&self) -> PieceMatrix {
        let files = usize::from(self.file_count);
        let mut matrix = vec![vec![None; files]; usize::from(self.rank_count)];

        for (position, piece) in self.pieces.iter().enumerate() {
            if let Some(piece) = piece {
                matrix[position / files][position % files] = Some(piece.alias());
            }
        }
        matrix
    }

    /// Returns whether this board fulfills the validity rules:
    ///
    /// - no white pawn on the top rank and no black pawn on the bottom rank,
    /// - an en-passant target is an empty position with the matching passive pawn one rank
    ///   beyond it,
    /// - castling abilities require the king on the middle file of its home rank and the
    ///   matching rook in its corner,
    /// - both kings present, and the passive king not capturable.
    fn validate(&self) -> Result<()> {
        let files = usize::from(self.file_count);
        let field_count = self.pieces.len();

        for position in 0..files {
            if let Some(piece) = &self.pieces[position] {
                if piece.color() == Black && piece.piece_type() == Pawn {
                    return Err(Error::InvalidPawnRank);
                }
            }
        }
        for position in field_count - files..field_count {
            if let Some(piece) = &self.pieces[position] {
                if piece.color() == White && piece.piece_type() == Pawn {
                    return Err(Error::InvalidPawnRank);
                }
            }
        }

        if self.en_passant_target != NO_POSITION {
            if self.pieces[self.en_passant_target as usize].is_some() {
                return Err(Error::InvalidEnPassant);
            }
            let offset = if self.white_active() { -(files as Position) } else { files as Position };
            let pawn_position = self.en_passant_target + offset;
            if pawn_position < 0 || pawn_position as usize >= field_count {
                return Err(Error::InvalidEnPassant);
            }
            match &self.pieces[pawn_position as usize] {
                Some(piece)
                    if piece.color() != self.active_color() && piece.piece_type() == Pawn => {}
                _ => return Err(Error::InvalidEnPassant),
            }
        }

        self.validate_castling(White, 0)?;
        self.validate_castling(Black, field_count - files)?;

        if self.white_king_position == NO_POSITION || self.black_king_position == NO_POSITION {
            return Err(Error::InvalidKingCount);
        }

        let passive = !self.active_color();
        if self.threatened(self.king_position(passive), self.active_color()) {
            return Err(Error::KingCapturable);
        }
        Ok(())
    }

    /// Checks one side's castling abilities against its home rank starting at `offset`.
    fn validate_castling(&self, color: Color, offset: usize) -> Result<()> {
        let files = usize::from(self.file_count);
        let (left, right) = match color {
            White => (Board::CASTLE_WHITE_LEFT, Board::CASTLE_WHITE_RIGHT),
            Black => (Board::CASTLE_BLACK_LEFT, Board::CASTLE_BLACK_RIGHT),
        };

        if self.castling_abilities & (left | right) == 0 {
            return Ok(());
        }

        let expects = |position: usize, piece_type: PieceType| -> bool {
            self.pieces[position].as_ref().map_or(false, |piece| {
                piece.color() == color && piece.piece_type() == piece_type
            })
        };

        if !expects(offset + (files >> 1), King) {
            return Err(Error::InvalidCastlingFlags);
        }
        if self.castling_abilities & left != 0 && !expects(offset, Rook) {
            return Err(Error::InvalidCastlingFlags);
        }
        if self.castling_abilities & right != 0 && !expects(offset + files - 1, Rook) {
            return Err(Error::InvalidCastlingFlags);
        }
        Ok(())
    }

    fn king_position(&self, color: Color) -> Position {
        match color {
            White => self.white_king_position,
            Black => self.black_king_position,
        }
    }

    fn set_king_position(&mut self, color: Color, position: Position) {
        match color {
            White => self.white_king_position = position,
            Black => self.black_king_position = position,
        }
    }
}

/// Returns the combined castling-ability bits of the given side.
fn castling_mask(color: Color) -> u8 {
    match color {
        White => Board::CASTLE_WHITE_LEFT | Board::CASTLE_WHITE_RIGHT,
        Black => Board::CASTLE_BLACK_LEFT | Board::CASTLE_BLACK_RIGHT,
    }
}

impl fmt::Display for Board {
    /// Writes out the board state using X-FEN.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        xfen::encode(self).fmt(f)
    }
}

impl fmt::Debug for Board {
    /// Writes out the board state using X-FEN.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        xfen::encode(self).fmt(f)
    }
}

impl FromStr for Board {
    type Err = Error;

    /// Parses a board from an X-FEN text representation.
    fn from_str(s: &str) -> Result<Self> {
        xfen::decode(s)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    fn board(xfen: &str) -> Board {
        xfen.parse().expect("valid xfen")
    }

    #[test]
    fn dimension_limits_are_enforced() {
        assert_eq!(Board::empty(2, 8).unwrap_err(), Error::InvalidDimensions);
        assert_eq!(Board::empty(8, 2).unwrap_err(), Error::InvalidDimensions);
        assert_eq!(Board::empty(128, 8).unwrap_err(), Error::InvalidDimensions);
        assert_eq!(Board::empty(8, 128).unwrap_err(), Error::InvalidDimensions);
        assert!(Board::empty(3, 3).is_ok());
    }

    #[test]
    fn reset_applies_the_default_setup_for_the_dimension() {
        let mut board = Board::empty(8, 8).unwrap();
        board.reset(None).unwrap();
        assert_eq!(
            board.to_string(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );

        let mut board = Board::empty(8, 10).unwrap();
        board.reset(None).unwrap();
        assert_eq!(
            board.to_string(),
            "rnabqkbanr/pppppppppp/10/10/10/10/PPPPPPPPPP/RNABQKBANR w KQkq - 0 1"
        );

        let mut board = Board::empty(10, 8).unwrap();
        assert_eq!(board.reset(None).unwrap_err(), Error::NoDefaultSetup);
    }

    #[test]
    fn reset_rejects_incompatible_dimensions() {
        let mut board = Board::empty(8, 8).unwrap();
        assert_eq!(
            board.reset(Some("rkr/ppp/3/3/3/3/PPP/RKR w KQkq - 0 1")).unwrap_err(),
            Error::DimensionMismatch
        );
    }

    #[test]
    fn invalid_boards_are_rejected_with_the_specific_error() {
        // white pawn on the top rank
        assert_eq!(
            "P3k3/8/8/8/8/8/8/4K3 w - - 0 1".parse::<Board>().unwrap_err(),
            Error::InvalidPawnRank
        );
        // black pawn on the bottom rank
        assert_eq!(
            "4k3/8/8/8/8/8/8/p3K3 w - - 0 1".parse::<Board>().unwrap_err(),
            Error::InvalidPawnRank
        );
        // missing black king
        assert_eq!(
            "8/8/8/8/8/8/8/4K3 w - - 0 1".parse::<Board>().unwrap_err(),
            Error::InvalidKingCount
        );
        // two white kings
        assert_eq!(
            "4k3/8/8/8/8/8/8/2K1K3 w - - 0 1".parse::<Board>().unwrap_err(),
            Error::InvalidKingCount
        );
        // passive king capturable by the active side
        assert_eq!(
            "4k3/4R3/8/8/8/8/8/4K3 w - - 0 1".parse::<Board>().unwrap_err(),
            Error::KingCapturable
        );
        // castling flags without the rook in its corner
        assert_eq!(
            "4k3/8/8/8/8/8/8/4K3 w K - 0 1".parse::<Board>().unwrap_err(),
            Error::InvalidCastlingFlags
        );
        // en-passant target without the passing pawn
        assert_eq!(
            "4k3/8/8/8/8/8/8/4K3 w - d6 0 1".parse::<Board>().unwrap_err(),
            Error::InvalidEnPassant
        );
    }

    #[test]
    fn position_filters_work() {
        let board = board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");

        assert_eq!(board.piece_count(), 32);
        assert_eq!(board.positions(false, Some(White), Some(Pawn)).len(), 8);
        assert_eq!(board.positions(false, None, Some(Knight)).len(), 4);
        assert_eq!(board.positions(false, Some(Black), None).len(), 16);
        assert_eq!(board.positions(true, Some(White), Some(King)), vec![4]);
        assert_eq!(board.positions(false, None, Some(King)), vec![4, 60]);

        let any = board.positions(true, Some(Black), Some(Rook));
        assert_eq!(any.len(), 1);
        assert!(board.positions(false, Some(Black), Some(Rook)).contains(&any[0]));
    }

    #[test]
    fn rating_sums_piece_ratings_and_reports_wins() {
        let start_board = board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_eq!(start_board.rating(), 0);

        // white is a queen up
        let queen_up_board = board("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1");
        assert!(queen_up_board.rating() > 800);
        assert!(queen_up_board.rating() < Board::WIN);

        // capturing a king ends the game with the full win rating
        let mut board = board("4k3/8/8/8/8/8/r7/4K3 w - - 0 1");
        board.perform_move(&[4, 12]).unwrap(); // the king steps into the rook's path
        board.perform_move(&[8, 12]).unwrap(); // the rook captures it
        assert_eq!(board.rating(), -Board::WIN);
        assert!(board.positions(true, Some(White), Some(King)).is_empty());
        assert!(board.active_moves().is_empty());
    }

    #[test]
    fn threat_detection_covers_all_motion_kinds() {
        let board = board("4k3/8/8/8/2n5/8/3P4/4K3 w - - 0 1");

        // the black knight on c4 attacks d2
        assert!(board.is_position_threatened(11, Black).unwrap());
        // the white pawn on d2 attacks c3 and e3, but not d3
        assert!(board.is_position_threatened(18, White).unwrap());
        assert!(board.is_position_threatened(20, White).unwrap());
        assert!(!board.is_position_threatened(19, White).unwrap());
        // the white king attacks its neighborhood
        assert!(board.is_position_threatened(3, White).unwrap());

        assert!(board.is_position_threatened(-1, White).is_err());
        assert!(board.is_position_threatened(64, White).is_err());
    }

    #[test]
    fn sliding_threats_are_blocked_by_interposed_pieces() {
        let board = board("4k3/8/8/8/4r3/8/4P3/4K3 w - - 0 1");

        // the rook on e4 attacks down to e3, but the pawn shields e2 and e1
        assert!(board.is_position_threatened(20, Black).unwrap());
        assert!(!board.is_position_threatened(4, Black).unwrap());
        // the pawn itself is attacked
        assert!(board.is_position_threatened(12, Black).unwrap());
    }

    #[test]
    fn king_moves_drop_castling_abilities() {
        let mut board = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        board.perform_move(&[4, 12]).unwrap(); // Ke1-e2
        assert_eq!(
            board.castling_abilities(),
            Board::CASTLE_BLACK_LEFT | Board::CASTLE_BLACK_RIGHT
        );
    }

    #[test]
    fn rook_moves_drop_their_castling_ability() {
        let mut board = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        board.perform_move(&[0, 8]).unwrap(); // Ra1-a2
        board.perform_move(&[63, 55]).unwrap(); // Rh8-h7
        assert_eq!(
            board.castling_abilities(),
            Board::CASTLE_WHITE_RIGHT | Board::CASTLE_BLACK_LEFT
        );
    }

    #[test]
    fn corner_rook_captures_drop_the_opponents_ability() {
        let mut board = board("r3k2r/8/8/8/8/7Q/8/R3K2R w KQkq - 0 1");
        board.perform_move(&[23, 63]).unwrap(); // Qh3xh8
        assert_eq!(
            board.castling_abilities(),
            Board::CASTLE_WHITE_LEFT | Board::CASTLE_WHITE_RIGHT | Board::CASTLE_BLACK_LEFT
        );
    }

    #[test]
    fn performing_a_castling_move_relocates_king_and_rook() {
        let mut board = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        board.perform_move(&[4, 7, 6]).unwrap(); // white castles to the right

        assert_eq!(board.piece_at(6).unwrap().unwrap().piece_type(), King);
        assert_eq!(board.piece_at(5).unwrap().unwrap().piece_type(), Rook);
        assert!(board.piece_at(4).unwrap().is_none());
        assert!(board.piece_at(7).unwrap().is_none());
        assert_eq!(
            board.castling_abilities(),
            Board::CASTLE_BLACK_LEFT | Board::CASTLE_BLACK_RIGHT
        );
        assert_eq!(board.reversible_move_clock(), 0);

        board.perform_move(&[60, 56, 58]).unwrap(); // black castles to the left
        assert_eq!(board.piece_at(58).unwrap().unwrap().piece_type(), King);
        assert_eq!(board.piece_at(59).unwrap().unwrap().piece_type(), Rook);
        assert_eq!(board.castling_abilities(), 0);
    }

    #[test]
    fn structurally_bad_moves_are_rejected() {
        let mut board = board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");

        assert_eq!(board.perform_move(&[12]).unwrap_err(), Error::InvalidMove);
        assert_eq!(
            board.perform_move(&[12, 20, 28, 36]).unwrap_err(),
            Error::PositionOutOfRange
        );
        assert_eq!(board.perform_move(&[-1, 20]).unwrap_err(), Error::PositionOutOfRange);
        assert_eq!(board.perform_move(&[12, 64]).unwrap_err(), Error::PositionOutOfRange);
        // empty source
        assert_eq!(board.perform_move(&[20, 28]).unwrap_err(), Error::InvalidMove);
        // passive piece
        assert_eq!(board.perform_move(&[52, 44]).unwrap_err(), Error::InvalidMove);
        // castling without the rook on the named position
        assert_eq!(board.perform_move(&[4, 5, 6]).unwrap_err(), Error::InvalidMove);

        // failed moves leave the board untouched
        assert_eq!(
            board.to_string(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }
}
