//! Minimax analysis of chess boards
//
//  Copyright 2026 The capablanca developers
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::thread;
use log::debug;
use rand::Rng;
use chess::{Board, Color, Move, PieceType, Position};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The result of a minimax board analysis: the next moves predicted under best play by both
/// sides, and the board rating after performing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePrediction {
    rating: i32,
    moves: Vec<Option<Move>>,
}

impl MovePrediction {
    /// Creates a new instance with the given projected rating and no moves.
    pub fn new(rating: i32) -> MovePrediction {
        MovePrediction { rating, moves: Vec::new() }
    }

    /// Returns the predicted board rating in cents.
    pub fn rating(&self) -> i32 {
        self.rating
    }

    /// Returns the predicted moves. Terminal predictions are padded with `None` to the search
    /// depth.
    pub fn moves(&self) -> &[Option<Move>] {
        &self.moves
    }

    /// Returns the number of predicted moves before the first `None`.
    pub fn move_count(&self) -> usize {
        self.moves.iter().position(Option::is_none).unwrap_or_else(|| self.moves.len())
    }
}

impl fmt::Display for MovePrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} rates {:+.2}", self.moves, 0.01 * f64::from(self.rating))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// An error in requesting an analysis with a search depth below one
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InvalidDepthError;

impl fmt::Display for InvalidDepthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "analysis depth must be at least one".fmt(f)
    }
}

impl std::error::Error for InvalidDepthError { }

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Board analyzers predict move sequences following the minimax principle. Analyzers must be
/// stateless so that a single instance can serve multiple boards at the same time.
pub trait Analyzer {
    /// Recursively analyzes the valid moves and counter moves up to the given search depth,
    /// beginning with the given board's active color. The result contains the next `depth`
    /// half-moves predicted under optimum play from both sides, and the board rating after
    /// performing said moves.
    fn predict_moves(
        &self,
        board: &Board,
        depth: usize,
    ) -> Result<MovePrediction, InvalidDepthError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A single-threaded minimax analyzer.
#[derive(Debug, Copy, Clone, Default)]
pub struct Minimax;

impl Minimax {
    /// Creates a new instance.
    pub fn new() -> Minimax {
        Minimax
    }
}

impl Analyzer for Minimax {
    fn predict_moves(
        &self,
        board: &Board,
        depth: usize,
    ) -> Result<MovePrediction, InvalidDepthError> {
        if depth < 1 {
            return Err(InvalidDepthError);
        }

        debug!("analyzing {} to depth {}", board, depth);
        Ok(predict(board, depth))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A minimax analyzer that fans the first search ply out over one worker thread per candidate
/// move, awaiting all workers before aggregating their results. Deeper plies run single-threaded
/// within each worker.
#[derive(Debug, Copy, Clone, Default)]
pub struct ParallelMinimax;

impl ParallelMinimax {
    /// Creates a new instance.
    pub fn new() -> ParallelMinimax {
        ParallelMinimax
    }
}

impl Analyzer for ParallelMinimax {
    fn predict_moves(
        &self,
        board: &Board,
        depth: usize,
    ) -> Result<MovePrediction, InvalidDepthError> {
        if depth < 1 {
            return Err(InvalidDepthError);
        }

        debug!("analyzing {} to depth {} across workers", board, depth);
        Ok(predict_parallel(board, depth))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Recursively predicts the active side's best continuation.
fn predict(board: &Board, depth: usize) -> MovePrediction {
    let white_active = board.white_active();
    let mut alternatives: Vec<MovePrediction> = Vec::new();

    for candidate in board.active_moves() {
        let prediction = match evaluate_candidate(board, candidate, depth) {
            Some(prediction) => prediction,
            None => continue,
        };
        collect_alternative(white_active, prediction, &mut alternatives);
    }

    finish(board, depth, alternatives)
}

/// Predicts the active side's best continuation, evaluating first-ply candidates on worker
/// threads.
fn predict_parallel(board: &Board, depth: usize) -> MovePrediction {
    let white_active = board.white_active();
    let active = board.active_color();
    let mut alternatives: Vec<MovePrediction> = Vec::new();
    let mut pending: Vec<(Move, Board)> = Vec::new();

    for candidate in board.active_moves() {
        if captures_king(board, &candidate, !active) {
            let mut prediction =
                MovePrediction::new(if white_active { Board::WIN } else { -Board::WIN });
            prediction.moves.push(Some(candidate));
            collect_alternative(white_active, prediction, &mut alternatives);
            continue;
        }

        let mut next = board.clone();
        next.perform_move(&candidate).expect("INFALLIBLE");
        if depth > 1 {
            pending.push((candidate, next));
        } else if let Some(prediction) = evaluate_applied(candidate, &next, depth, active) {
            collect_alternative(white_active, prediction, &mut alternatives);
        }
    }

    let counters: Vec<MovePrediction> = if pending.is_empty() {
        Vec::new()
    } else {
        thread::scope(|scope| {
            let handles: Vec<_> = pending
                .iter()
                .map(|(_, next)| scope.spawn(move || predict(next, depth - 1)))
                .collect();
            handles.into_iter().map(|handle| handle.join().expect("INFALLIBLE")).collect()
        })
    };

    for ((candidate, next), mut counter) in pending.into_iter().zip(counters) {
        if let Some(Some(counter_move)) = counter.moves.first() {
            if captures_king(&next, counter_move, active) {
                continue;
            }
        }
        counter.moves.insert(0, Some(candidate));
        collect_alternative(white_active, counter, &mut alternatives);
    }

    finish(board, depth, alternatives)
}

/// Evaluates a single candidate move, or returns `None` if the candidate would lose its own
/// king.
fn evaluate_candidate(board: &Board, candidate: Move, depth: usize) -> Option<MovePrediction> {
    let active = board.active_color();

    // a move capturing the opposing king decides the game outright
    if captures_king(board, &candidate, !active) {
        let mut prediction =
            MovePrediction::new(if active == Color::White { Board::WIN } else { -Board::WIN });
        prediction.moves.push(Some(candidate));
        return Some(prediction);
    }

    let mut next = board.clone();
    next.perform_move(&candidate).expect("INFALLIBLE");
    evaluate_applied(candidate, &next, depth, active)
}

/// Completes the evaluation of a candidate already applied to `next`. Recursion covers the
/// remaining depth; at the horizon, a candidate leaving the mover's king capturable is as
/// illegal as one whose refutation was searched.
fn evaluate_applied(
    candidate: Move,
    next: &Board,
    depth: usize,
    mover: Color,
) -> Option<MovePrediction> {
    if depth > 1 {
        let mut prediction = predict(next, depth - 1);
        if let Some(Some(counter_move)) = prediction.moves.first() {
            if captures_king(next, counter_move, mover) {
                return None;
            }
        }
        prediction.moves.insert(0, Some(candidate));
        Some(prediction)
    } else {
        if let Some(&king) = next.positions(true, Some(mover), Some(PieceType::King)).first() {
            if next.is_position_threatened(king, !mover).expect("INFALLIBLE") {
                return None;
            }
        }
        let mut prediction = MovePrediction::new(next.rating());
        prediction.moves.push(Some(candidate));
        Some(prediction)
    }
}

/// Returns `true` if the given move captures a king of the given color on `board`.
fn captures_king(board: &Board, move_positions: &[Position], color: Color) -> bool {
    if move_positions.len() != 2 {
        return false; // castling moves never capture
    }
    board
        .piece_at(move_positions[1])
        .expect("INFALLIBLE")
        .map_or(false, |piece| piece.color() == color && piece.piece_type() == PieceType::King)
}

/// Keeps the running set of equally-best alternatives up to date.
fn collect_alternative(
    white_active: bool,
    prediction: MovePrediction,
    alternatives: &mut Vec<MovePrediction>,
) {
    let comparison = compare_predictions(white_active, &prediction, alternatives.first());
    if comparison > 0 {
        alternatives.clear();
    }
    if comparison >= 0 {
        alternatives.push(prediction);
    }
}

/// Picks uniformly among the best alternatives, or builds the terminal prediction when no
/// candidate survived: a checked or missing active king means the active side lost, anything
/// else is a stalemate draw.
fn finish(board: &Board, depth: usize, mut alternatives: Vec<MovePrediction>) -> MovePrediction {
    if alternatives.is_empty() {
        let white_active = board.white_active();
        let king = board.positions(true, Some(board.active_color()), Some(PieceType::King));
        let checked_or_missing = match king.first() {
            Some(&position) => board
                .is_position_threatened(position, !board.active_color())
                .expect("INFALLIBLE"),
            None => true,
        };

        let rating = if checked_or_missing {
            if white_active { -Board::WIN } else { Board::WIN }
        } else {
            Board::DRAW
        };
        return MovePrediction { rating, moves: vec![None; depth] };
    }

    let index = rand::thread_rng().gen_range(0, alternatives.len());
    alternatives.swap_remove(index)
}

/// Compares two move predictions to decide which one is more desirable from the given
/// perspective: `1` if the left alternative is better, `-1` if the right one is, and `0` if
/// both are equally preferable. A missing right alternative always loses. Tied win ratings
/// prefer the faster mate, tied loss ratings the longer defense.
pub fn compare_predictions(
    white: bool,
    left: &MovePrediction,
    right: Option<&MovePrediction>,
) -> i32 {
    let right = match right {
        Some(right) => right,
        None => return 1,
    };

    if left.rating != right.rating {
        return if (left.rating > right.rating) == white { 1 } else { -1 };
    }
    if left.rating != Board::WIN && left.rating != -Board::WIN {
        return 0;
    }

    let win = if white { Board::WIN } else { -Board::WIN };
    let comparison = (right.move_count() as i64 - left.move_count() as i64).signum() as i32;
    if left.rating == win { comparison } else { -comparison }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use chess::Board;
    use super::{compare_predictions, MovePrediction};

    fn prediction(rating: i32, moves: usize) -> MovePrediction {
        let mut prediction = MovePrediction::new(rating);
        prediction.moves = (0..moves).map(|i| Some(vec![i as i16, i as i16 + 8])).collect();
        prediction
    }

    #[test]
    fn anything_beats_a_missing_alternative() {
        assert_eq!(compare_predictions(true, &prediction(-500, 1), None), 1);
        assert_eq!(compare_predictions(false, &prediction(Board::WIN, 1), None), 1);
    }

    #[test]
    fn ratings_decide_by_perspective() {
        let better = prediction(300, 1);
        let worse = prediction(-200, 1);
        assert_eq!(compare_predictions(true, &better, Some(&worse)), 1);
        assert_eq!(compare_predictions(true, &worse, Some(&better)), -1);
        assert_eq!(compare_predictions(false, &better, Some(&worse)), -1);
        assert_eq!(compare_predictions(false, &worse, Some(&better)), 1);
    }

    #[test]
    fn equal_ordinary_ratings_are_ties() {
        assert_eq!(
            compare_predictions(true, &prediction(150, 1), Some(&prediction(150, 3))),
            0
        );
    }

    #[test]
    fn comparison_is_antisymmetric() {
        let cases = [
            (prediction(300, 1), prediction(-200, 2)),
            (prediction(0, 1), prediction(0, 2)),
            (prediction(Board::WIN, 1), prediction(Board::WIN, 3)),
            (prediction(-Board::WIN, 2), prediction(-Board::WIN, 4)),
        ];
        for white in &[true, false] {
            for (left, right) in &cases {
                assert_eq!(
                    compare_predictions(*white, left, Some(right)),
                    -compare_predictions(*white, right, Some(left))
                );
            }
        }
    }

    #[test]
    fn winning_prefers_the_faster_mate() {
        let fast = prediction(Board::WIN, 1);
        let slow = prediction(Board::WIN, 3);
        assert_eq!(compare_predictions(true, &fast, Some(&slow)), 1);
        assert_eq!(compare_predictions(true, &slow, Some(&fast)), -1);

        let fast = prediction(-Board::WIN, 1);
        let slow = prediction(-Board::WIN, 3);
        assert_eq!(compare_predictions(false, &fast, Some(&slow)), 1);
    }

    #[test]
    fn losing_prefers_the_longer_defense() {
        let quick_loss = prediction(-Board::WIN, 1);
        let long_loss = prediction(-Board::WIN, 3);
        assert_eq!(compare_predictions(true, &long_loss, Some(&quick_loss)), 1);
        assert_eq!(compare_predictions(true, &quick_loss, Some(&long_loss)), -1);

        let quick_loss = prediction(Board::WIN, 1);
        let long_loss = prediction(Board::WIN, 3);
        assert_eq!(compare_predictions(false, &long_loss, Some(&quick_loss)), 1);
    }

    #[test]
    fn move_count_stops_at_the_first_missing_move() {
        let mut padded = MovePrediction::new(0);
        padded.moves = vec![Some(vec![12, 28]), None, None];
        assert_eq!(padded.move_count(), 1);
        assert_eq!(padded.moves().len(), 3);

        assert_eq!(prediction(0, 3).move_count(), 3);
        assert_eq!(MovePrediction::new(0).move_count(), 0);
    }
}
